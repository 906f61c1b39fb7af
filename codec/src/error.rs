//! Error types for codec operations

use thiserror::Error;

/// Error type for codec operations
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum Error {
    #[error("unexpected end of buffer reading {0}: needed {1} bytes, {2} remaining")]
    EndOfBuffer(&'static str, usize, usize), // field, needed, remaining
    #[error("extra data found: {0} bytes")]
    ExtraData(usize),
    #[error("invalid data in {0}: {1}")]
    InvalidData(&'static str, String), // context, message
    #[error("invalid address: {0:?}")]
    InvalidAddress(String),
    #[error("invalid label: {0:?}")]
    InvalidLabel(String),
    #[error("unknown protocol tag: {0:?}")]
    UnknownProtocolTag(char),
    #[error("unknown frame kind: {0:?}")]
    UnknownFrameKind(char),
}

impl Error {
    /// Returns true if the error indicates a sender using a protocol the receiver
    /// was never configured for (rather than a damaged unit).
    ///
    /// Malformed units are discarded by the receiver. Fatal errors stop the receiving node.
    pub fn is_fatal(&self) -> bool {
        matches!(
            self,
            Error::UnknownProtocolTag(_) | Error::UnknownFrameKind(_)
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fatal_classification() {
        assert!(Error::UnknownProtocolTag('7').is_fatal());
        assert!(Error::UnknownFrameKind('X').is_fatal());
        assert!(!Error::EndOfBuffer("destination", 5, 2).is_fatal());
        assert!(!Error::InvalidData("flag", "expected digit".into()).is_fatal());
        assert!(!Error::InvalidAddress("H-1".into()).is_fatal());
    }
}
