use std::fmt;

/// 8-character player handle, left-justified and space-padded.
///
/// Equality and hashing operate on the padded byte form, matching the
/// registry's use of the nick as a unique key straight off the wire.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct Nick([u8; 8]);

/// 6-character map identifier, compared bytewise.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct MapId([u8; 6]);

impl Nick {
    /// Characters a nick may contain before space-padding is applied.
    fn is_allowed_char(b: u8) -> bool {
        b.is_ascii_alphanumeric() || matches!(b, b'.' | b'_' | b' ' | b'-')
    }

    /// Builds a `Nick` from the raw 8-byte field taken straight off the wire.
    /// Does not validate the character class; callers check that separately
    /// against [`Nick::has_valid_chars`] per the admission rules.
    pub fn from_wire(bytes: [u8; 8]) -> Nick {
        Nick(bytes)
    }

    pub fn has_valid_chars(&self) -> bool {
        self.0.iter().all(|&b| Self::is_allowed_char(b))
    }

    pub fn as_bytes(&self) -> &[u8; 8] {
        &self.0
    }
}

impl MapId {
    pub fn from_wire(bytes: [u8; 6]) -> MapId {
        MapId(bytes)
    }

    pub fn as_bytes(&self) -> &[u8; 6] {
        &self.0
    }
}

impl fmt::Debug for Nick {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Nick({:?})", String::from_utf8_lossy(&self.0))
    }
}

impl fmt::Display for Nick {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", String::from_utf8_lossy(&self.0))
    }
}

impl fmt::Debug for MapId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "MapId({:?})", String::from_utf8_lossy(&self.0))
    }
}

impl fmt::Display for MapId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", String::from_utf8_lossy(&self.0))
    }
}
