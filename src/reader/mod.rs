// src/reader/mod.rs
mod assembler;
mod capture;
mod stream;

#[cfg(feature = "async")]
mod async_stream;

pub use assembler::{FrameAssembler, ReadState};
pub use capture::{CaptureFile, CaptureFrames};
pub use stream::{FrameReader, Frames};

#[cfg(feature = "async")]
pub use async_stream::AsyncFrameReader;
