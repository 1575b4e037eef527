// src/error.rs
use std::io;
use thiserror::Error;

/// Failures produced while decoding a common frame header.
///
/// The decoder never panics on malformed input; every failure path ends up here.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum HeaderError {
    #[error("Invalid sync byte: expected 0xAA, found 0x{found:02X}")]
    InvalidSyncByte { found: u8 },

    #[error("Invalid frame length: {declared} bytes declared")]
    InvalidLength { declared: usize },

    #[error("Need {0} more bytes to decode header")]
    NeedMoreBytes(usize),

    #[error("Length overflow: computed {computed}, maximum {max}")]
    Overflow { computed: usize, max: usize },

    #[error("Invalid nominal frame rate: {0}")]
    InvalidFrameRate(u16),
}

/// How a caller should react to a [`HeaderError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorClass {
    /// The current byte position cannot start a valid frame; scan forward for the next sync byte.
    Malformed,
    /// More bytes are needed before the header can be decoded.
    Incomplete,
    /// The caller supplied an unusable configuration value.
    Configuration,
}

impl HeaderError {
    pub fn class(&self) -> ErrorClass {
        match self {
            HeaderError::InvalidSyncByte { .. }
            | HeaderError::InvalidLength { .. }
            | HeaderError::Overflow { .. } => ErrorClass::Malformed,
            HeaderError::NeedMoreBytes(_) => ErrorClass::Incomplete,
            HeaderError::InvalidFrameRate(_) => ErrorClass::Configuration,
        }
    }

    /// True when the same position can be retried once more bytes arrive.
    pub fn is_retriable(&self) -> bool {
        self.class() == ErrorClass::Incomplete
    }

    pub fn requires_resync(&self) -> bool {
        self.class() == ErrorClass::Malformed
    }
}

/// Failures surfaced by the stream-level readers.
#[derive(Error, Debug)]
pub enum StreamError {
    #[error("Header error: {0}")]
    Header(#[from] HeaderError),

    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    #[error("Connection closed with {buffered} bytes of an incomplete frame")]
    ConnectionClosed { buffered: usize },
}

pub type Result<T> = std::result::Result<T, HeaderError>;

pub type StreamResult<T> = std::result::Result<T, StreamError>;
