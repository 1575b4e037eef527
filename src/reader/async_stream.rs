// src/reader/async_stream.rs
// Only compiled with feature = "async"
use crate::context::ContextCell;
use crate::error::{StreamError, StreamResult};
use crate::frame::{ChecksumVerifier, Frame, NoChecksum};
use crate::header::DecoderOptions;
use crate::reader::assembler::FrameAssembler;
use std::sync::Arc;
use tokio::io::{AsyncRead, AsyncReadExt};
use tracing::debug;

const READ_CHUNK_SIZE: usize = 8192;

/// Async counterpart of [`FrameReader`](crate::reader::FrameReader) for tokio byte sources.
///
/// Decoding itself never awaits; the reader only suspends while waiting for input.
pub struct AsyncFrameReader<R: AsyncRead + Unpin> {
    inner: R,
    assembler: FrameAssembler,
    context: Arc<ContextCell>,
    verifier: Box<dyn ChecksumVerifier>,
    read_buf: Vec<u8>,
}

impl<R: AsyncRead + Unpin> AsyncFrameReader<R> {
    pub fn new(inner: R, context: Arc<ContextCell>) -> Self {
        Self::with_options(inner, DecoderOptions::default(), context)
    }

    pub fn with_options(inner: R, options: DecoderOptions, context: Arc<ContextCell>) -> Self {
        AsyncFrameReader {
            inner,
            assembler: FrameAssembler::with_options(options),
            context,
            verifier: Box::new(NoChecksum),
            read_buf: vec![0u8; READ_CHUNK_SIZE],
        }
    }

    pub fn with_verifier(mut self, verifier: impl ChecksumVerifier + 'static) -> Self {
        self.verifier = Box::new(verifier);
        self
    }

    /// Wait for the next complete frame; `Ok(None)` at a clean end of input
    pub async fn read_frame(&mut self) -> StreamResult<Option<Frame>> {
        loop {
            let context = self.context.load();
            if let Some(frame) = self.assembler.next_frame(context.as_deref(), self.verifier.as_ref()) {
                return Ok(Some(frame));
            }

            let read = self.inner.read(&mut self.read_buf).await?;
            if read == 0 {
                let buffered = self.assembler.buffered();
                if buffered > 0 {
                    debug!(buffered, "input ended inside a frame");
                    return Err(StreamError::ConnectionClosed { buffered });
                }
                return Ok(None);
            }

            self.assembler.push(&self.read_buf[..read]);
        }
    }

    pub fn context(&self) -> &Arc<ContextCell> {
        &self.context
    }

    pub fn assembler(&self) -> &FrameAssembler {
        &self.assembler
    }

    pub fn into_inner(self) -> R {
        self.inner
    }
}
