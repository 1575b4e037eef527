// src/lib.rs
//! # pdcstream-rs
//!
//! Decoding of the common frame header used by PDCstream synchrophasor data
//! concentrators, plus the stream-level plumbing needed to cut frames out of a
//! continuous byte stream.
//!
//! ## Features
//!
//! - **Header decoding**: sync byte, packet number, word count and the data-frame time tag
//! - **Epoch handling**: NTP time tags for revision 0 devices, Unix time tags after that,
//!   and a best-effort guess before any configuration frame has been seen
//! - **Legacy firmware**: optional single-byte word count
//! - **Lock-free decoding**: configuration snapshots are published by swapping an `Arc`
//! - **Stream reassembly**: sans-io assembler, blocking and async readers, capture files
//!
//! ## Quick Start
//!
//! ### Decoding a header
//!
//! ```rust
//! use pdcstream_rs::*;
//!
//! fn main() -> Result<()> {
//!     let bytes = [0xAA, 0x01, 0x00, 0x0A, 0x5A, 0x00, 0x00, 0x00, 0x00, 0x05];
//!
//!     // No configuration frame seen yet: the timestamp is provisional
//!     let header = decode(&bytes, 0, None, false)?;
//!     assert_eq!(header.frame_kind, FrameKind::DataFrame);
//!     assert_eq!(header.frame_length_bytes, 20);
//!     assert!(header.is_provisional());
//!
//!     // Once the configuration is known, timestamps include the sample offset
//!     let context = FrameContext::new(30, Revision::Revision2)?;
//!     let header = decode(&bytes, 0, Some(&context), false)?;
//!     assert!(!header.is_provisional());
//!     Ok(())
//! }
//! ```
//!
//! ### Reading a stream
//!
//! ```rust,no_run
//! use pdcstream_rs::*;
//! use std::net::TcpStream;
//! use std::sync::Arc;
//!
//! fn main() -> StreamResult<()> {
//!     let socket = TcpStream::connect("10.0.0.5:3360")?;
//!     let context = Arc::new(ContextCell::new());
//!     let mut reader = FrameReader::new(socket, Arc::clone(&context));
//!
//!     while let Some(frame) = reader.read_frame()? {
//!         if frame.kind() == FrameKind::ConfigurationFrame {
//!             // Parse the configuration body, then publish what it announced
//!             context.update(30, Revision::Revision2)?;
//!         }
//!     }
//!     Ok(())
//! }
//! ```

// Modules
pub mod error;
pub mod types;
pub mod header;
pub mod context;
pub mod frame;
pub mod reader;
pub mod measurement;

// Re-export commonly used types at the crate root for convenience
pub use error::{ErrorClass, HeaderError, Result, StreamError, StreamResult};

pub use types::{
    Epoch,
    FrameKind,
    Revision,
    Timestamp,
    TimestampSource,
    TICKS_PER_SECOND,
};

pub use header::{
    build_frame,
    decode,
    encode,
    encode_extended,
    encode_into,
    DecodedHeader,
    DecoderOptions,
    HeaderDecoder,
};

pub use context::{ContextCell, FrameContext};

pub use frame::{ChecksumVerifier, Frame, NoChecksum};

pub use reader::{
    CaptureFile,
    FrameAssembler,
    FrameReader,
    ReadState,
};

#[cfg(feature = "async")]
pub use reader::AsyncFrameReader;

pub use measurement::{Dimension, MeasurementValue, Quantity, Unit};

// Prelude module for glob imports
pub mod prelude {
    //! Convenient imports for common use cases.
    //!
    //! ```rust
    //! use pdcstream_rs::prelude::*;
    //! ```

    pub use crate::context::{ContextCell, FrameContext};
    pub use crate::error::{HeaderError, Result, StreamError, StreamResult};
    pub use crate::header::{decode, DecodedHeader, HeaderDecoder};
    pub use crate::reader::FrameReader;
    pub use crate::types::{FrameKind, Revision, Timestamp};

    #[cfg(feature = "async")]
    pub use crate::reader::AsyncFrameReader;
}

/// The library version
pub const LIBRARY_VERSION: &str = env!("CARGO_PKG_VERSION");

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version_constant() {
        assert!(!LIBRARY_VERSION.is_empty());
    }

    #[test]
    fn test_header_constants() {
        assert_eq!(header::SYNC_BYTE, 0xAA);
        assert_eq!(header::COMMON_HEADER_LENGTH, 4);
        assert_eq!(header::TIME_TAG_LENGTH, 6);
        assert_eq!(header::TRAILER_LENGTH, 2);
        assert_eq!(header::NTP_HEURISTIC_THRESHOLD, 3_155_673_600);
    }

    #[test]
    fn test_crate_root_decode() {
        let header = decode(&[0xAA, 0x00, 0x00, 0x05], 0, None, false).unwrap();
        assert_eq!(header.frame_kind, FrameKind::ConfigurationFrame);
        assert_eq!(header.data_length_bytes, 4);
    }

    #[test]
    fn test_context_cell_feeds_decoder() {
        let cell = ContextCell::new();
        cell.update(25, Revision::Revision0).unwrap();

        let bytes = [0xAA, 0x09, 0x00, 0x08, 0xBC, 0x19, 0x1E, 0x80, 0x00, 0x01];
        let snapshot = cell.load();
        let header = decode(&bytes, 0, snapshot.as_deref(), false).unwrap();

        assert_eq!(header.timestamp_source, TimestampSource::TimeTag);
        assert_eq!(header.timestamp.subsec_nanos(), 40_000_000);
    }

    #[test]
    fn test_measurement_exports() {
        let q = MeasurementValue(90.0).in_unit(Unit::Degrees);
        assert_eq!(q.dimension(), Dimension::Angle);
    }
}
