//! Memory access kinds.

use core::fmt;
use core::str::FromStr;

/// The kind of a single memory reference.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AccessKind {
    /// A read. Instruction fetches are folded into this kind.
    Load,
    /// A write.
    Store,
    /// A read followed by a write to the same location.
    Modify,
}

impl AccessKind {
    /// Returns whether this access writes to the page, leaving it dirty.
    #[inline]
    pub const fn is_write(self) -> bool {
        matches!(self, AccessKind::Store | AccessKind::Modify)
    }
}

/// Error returned when an access kind letter is not recognised.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ParseAccessError(pub char);

impl fmt::Display for ParseAccessError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unknown access type '{}'", self.0)
    }
}

impl std::error::Error for ParseAccessError {}

impl TryFrom<char> for AccessKind {
    type Error = ParseAccessError;

    fn try_from(value: char) -> Result<Self, Self::Error> {
        match value {
            'I' | 'L' => Ok(AccessKind::Load),
            'S' => Ok(AccessKind::Store),
            'M' => Ok(AccessKind::Modify),
            other => Err(ParseAccessError(other)),
        }
    }
}

impl FromStr for AccessKind {
    type Err = ParseAccessError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut chars = s.chars();
        match (chars.next(), chars.next()) {
            (Some(c), None) => AccessKind::try_from(c),
            (Some(c), Some(_)) => Err(ParseAccessError(c)),
            (None, _) => Err(ParseAccessError(' ')),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_trace_letters() {
        assert_eq!(AccessKind::try_from('I'), Ok(AccessKind::Load));
        assert_eq!(AccessKind::try_from('L'), Ok(AccessKind::Load));
        assert_eq!(AccessKind::try_from('S'), Ok(AccessKind::Store));
        assert_eq!(AccessKind::try_from('M'), Ok(AccessKind::Modify));
        assert_eq!(AccessKind::try_from('X'), Err(ParseAccessError('X')));
    }

    #[test]
    fn parses_from_str() {
        assert_eq!("S".parse::<AccessKind>(), Ok(AccessKind::Store));
        assert!("SS".parse::<AccessKind>().is_err());
        assert!("".parse::<AccessKind>().is_err());
    }

    #[test]
    fn writes_dirty_the_page() {
        assert!(!AccessKind::Load.is_write());
        assert!(AccessKind::Store.is_write());
        assert!(AccessKind::Modify.is_write());
    }
}
