//! Server configuration, loaded once from the process environment.

use std::collections::HashSet;
use std::time::Duration;

use anyhow::Context;

use crate::wire::Nick;

/// Resolved, validated configuration for one server run.
///
/// Unlike the teacher's process-lifetime `static SERVER_CONFIG: RwLock<_>`,
/// this is threaded explicitly as an `Arc<ServerConfig>` to the instance,
/// the acceptor, and every session: nothing in this relay ever mutates
/// configuration after startup, so a global mutable cell would only be an
/// unused capability.
pub struct ServerConfig {
    pub logging_level: String,
    pub server_nick: Nick,
    pub ping_interval: Duration,
    pub max_missed_pongs: u32,
    pub supported_games: HashSet<[u8; 4]>,
    pub max_players: usize,
    pub port: u16,
}

fn env_or_default(name: &str, default: &str) -> String {
    std::env::var(name).unwrap_or_else(|_| default.to_string())
}

fn parse_env<T: std::str::FromStr>(name: &str, default: &str) -> anyhow::Result<T>
where
    T::Err: std::error::Error + Send + Sync + 'static,
{
    env_or_default(name, default)
        .parse()
        .with_context(|| format!("failed to parse {name} as a number"))
}

/// Pads `s` to exactly 8 bytes with trailing spaces, truncating if it is
/// already longer, matching `ServerNick`'s derivation from configuration.
fn pad_nick(s: &str) -> Nick {
    let mut bytes = [b' '; 8];
    let src = s.as_bytes();
    let len = src.len().min(8);
    bytes[..len].copy_from_slice(&src[..len]);
    Nick::from_wire(bytes)
}

fn parse_supported_games(raw: &str) -> HashSet<[u8; 4]> {
    raw.split(',')
        .filter_map(|tag| {
            let trimmed = tag.trim();
            if trimmed.len() != 4 {
                tracing::warn!(tag = trimmed, "ignoring malformed game tag in SUPPORTED_GAMES");
                return None;
            }
            let mut bytes = [0u8; 4];
            bytes.copy_from_slice(trimmed.as_bytes());
            Some(bytes)
        })
        .collect()
}

impl ServerConfig {
    pub fn from_env() -> anyhow::Result<ServerConfig> {
        let logging_level = env_or_default("LOGGING_LEVEL", "WARNING");
        let server_nick = pad_nick(&env_or_default("SERVER_NAME", "servname"));
        let ping_interval = Duration::from_secs(parse_env::<u64>("PING_TIME", "5")?);
        let max_missed_pongs: u32 = parse_env("MAX_MISSED_PONGS", "2")?;
        let supported_games =
            parse_supported_games(&env_or_default("SUPPORTED_GAMES", "BPR1, BPR2, BPG1, BPG2"));
        let max_players: usize = parse_env("MAX_PLAYERS", "9")?;
        let port: u16 = parse_env("PORT", "4096")?;

        let config = ServerConfig {
            logging_level,
            server_nick,
            ping_interval,
            max_missed_pongs,
            supported_games,
            max_players,
            port,
        };

        config.report();
        Ok(config)
    }

    /// Logs the resolved configuration once at startup, mirroring the
    /// original's per-variable startup banner.
    fn report(&self) {
        tracing::info!(
            logging_level = %self.logging_level,
            server_nick = %self.server_nick,
            ping_interval_secs = self.ping_interval.as_secs(),
            max_missed_pongs = self.max_missed_pongs,
            max_players = self.max_players,
            port = self.port,
            "resolved server configuration",
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pad_nick_space_pads_short_names() {
        let nick = pad_nick("srv");
        assert_eq!(nick.as_bytes(), b"srv     ");
    }

    #[test]
    fn pad_nick_truncates_long_names() {
        let nick = pad_nick("way-too-long-name");
        assert_eq!(nick.as_bytes(), b"way-too-");
    }

    #[test]
    fn parse_supported_games_trims_whitespace() {
        let games = parse_supported_games("BPR1, BPR2 ,BPG1");
        assert!(games.contains(b"BPR1"));
        assert!(games.contains(b"BPR2"));
        assert!(games.contains(b"BPG1"));
        assert_eq!(games.len(), 3);
    }
}
