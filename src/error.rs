//! Error model for the super-user gate.
//! Decision paths never surface these; they collapse every failure to a deny.
//! Administrative operations (add/delete/enumerate) propagate them so tooling
//! can report something actionable.

use std::io;

use thiserror::Error;

/// A single allow-list line could not be decoded.
#[derive(Debug, Clone, Copy, Error, PartialEq, Eq)]
pub enum ParseError {
    #[error("extended entry has a missing or non-numeric kind code")]
    InvalidKind,
    #[error("extended entry is missing its exported name or display name")]
    Truncated,
    #[error("extended entry exported name is not valid base64")]
    BadEncoding,
    #[error("line is not valid UTF-8")]
    InvalidUtf8,
}

/// An identity cannot be written as an allow-list line.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum FormatError {
    #[error("name is empty")]
    Empty,
    #[error("name starts with a space")]
    LeadingSpace,
    #[error("entry contains an embedded newline")]
    EmbeddedNewline,
    #[error("entry is {len} bytes, longer than the {max} byte limit")]
    TooLong { len: usize, max: usize },
    #[error("sentinel identities are never stored")]
    Unencodable,
}

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("user list i/o failed: {0}")]
    Io(#[from] io::Error),
    #[error("user list line {line} is malformed: {source}")]
    Corrupt { line: usize, source: ParseError },
    #[error("user list line {line} is {len} bytes, longer than supported")]
    LineTooLong { line: usize, len: usize },
    #[error("identity is not in the user list")]
    NotFound,
    #[error("identity is already in the user list")]
    AlreadyExists,
    #[error("invalid identity: {0}")]
    InvalidArgument(#[from] FormatError),
    #[error("timed out waiting for the user list lock")]
    Busy,
}

impl StoreError {
    /// Historical status code for administrative callers.
    pub fn errno(&self) -> i32 {
        match self {
            StoreError::Io(_) | StoreError::Corrupt { .. } => libc_codes::EIO,
            StoreError::LineTooLong { .. } => libc_codes::ERANGE,
            StoreError::NotFound => libc_codes::ENOENT,
            StoreError::AlreadyExists => libc_codes::EEXIST,
            StoreError::InvalidArgument(_) => libc_codes::EINVAL,
            StoreError::Busy => libc_codes::EBUSY,
        }
    }

    pub fn is_not_found(&self) -> bool { matches!(self, StoreError::NotFound) }
}

pub type StoreResult<T> = Result<T, StoreError>;

/// The RPC layer could not produce ticket or token details for a call.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ExtractionError {
    #[error("call carries no ticket")]
    NoTicket,
    #[error("call carries no token")]
    NoToken,
    #[error("malformed security data: {0}")]
    Malformed(String),
}

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum RealmError {
    #[error("realm '{0}' is longer than supported")]
    RealmTooLong(String),
    #[error("realm lookup failed: {0}")]
    Lookup(String),
}

// POSIX values; kept local so the crate does not pull in libc for six numbers.
mod libc_codes {
    pub const ENOENT: i32 = 2;
    pub const EIO: i32 = 5;
    pub const EBUSY: i32 = 16;
    pub const EEXIST: i32 = 17;
    pub const EINVAL: i32 = 22;
    pub const ERANGE: i32 = 34;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn errno_mapping() {
        assert_eq!(StoreError::NotFound.errno(), 2);
        assert_eq!(StoreError::AlreadyExists.errno(), 17);
        assert_eq!(StoreError::InvalidArgument(FormatError::Empty).errno(), 22);
        assert_eq!(StoreError::LineTooLong { line: 3, len: 4000 }.errno(), 34);
        assert_eq!(StoreError::Corrupt { line: 1, source: ParseError::Truncated }.errno(), 5);
        assert_eq!(StoreError::Busy.errno(), 16);
        let io = StoreError::from(io::Error::new(io::ErrorKind::Other, "disk"));
        assert_eq!(io.errno(), 5);
    }

    #[test]
    fn messages_name_the_line() {
        let e = StoreError::Corrupt { line: 7, source: ParseError::InvalidKind };
        let msg = e.to_string();
        assert!(msg.contains("line 7"), "{msg}");
        assert!(msg.contains("kind code"), "{msg}");
    }
}
