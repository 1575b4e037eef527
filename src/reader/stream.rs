// src/reader/stream.rs
use crate::context::ContextCell;
use crate::error::{StreamError, StreamResult};
use crate::frame::{ChecksumVerifier, Frame, NoChecksum};
use crate::header::DecoderOptions;
use crate::reader::assembler::FrameAssembler;
use std::io::{ErrorKind, Read};
use std::sync::Arc;
use tracing::debug;

const READ_CHUNK_SIZE: usize = 8192;

/// Blocking frame reader over any byte source.
///
/// Data-frame headers are decoded against whatever context is published in the
/// shared [`ContextCell`] at the moment the header arrives. After a configuration
/// frame has been parsed, publish its frame rate and revision with
/// [`ContextCell::update`].
///
/// # Example
///
/// ```
/// use pdcstream_rs::context::ContextCell;
/// use pdcstream_rs::reader::FrameReader;
/// use std::io::Cursor;
/// use std::sync::Arc;
///
/// let bytes = vec![0xAA, 0x00, 0x00, 0x04, 0x01, 0x02, 0x00, 0x00];
/// let mut reader = FrameReader::new(Cursor::new(bytes), Arc::new(ContextCell::new()));
///
/// let frame = reader.read_frame().unwrap().unwrap();
/// assert_eq!(&frame.payload[..], &[0x01, 0x02]);
/// assert!(reader.read_frame().unwrap().is_none());
/// ```
pub struct FrameReader<R: Read> {
    inner: R,
    assembler: FrameAssembler,
    context: Arc<ContextCell>,
    verifier: Box<dyn ChecksumVerifier>,
    read_buf: Vec<u8>,
}

impl<R: Read> FrameReader<R> {
    pub fn new(inner: R, context: Arc<ContextCell>) -> Self {
        Self::with_options(inner, DecoderOptions::default(), context)
    }

    pub fn with_options(inner: R, options: DecoderOptions, context: Arc<ContextCell>) -> Self {
        FrameReader {
            inner,
            assembler: FrameAssembler::with_options(options),
            context,
            verifier: Box::new(NoChecksum),
            read_buf: vec![0u8; READ_CHUNK_SIZE],
        }
    }

    /// Reject frames whose trailer does not verify
    pub fn with_verifier(mut self, verifier: impl ChecksumVerifier + 'static) -> Self {
        self.verifier = Box::new(verifier);
        self
    }

    /// Read until the next complete frame.
    ///
    /// Returns `Ok(None)` at a clean end of input and `ConnectionClosed` when the
    /// input ends inside a frame.
    pub fn read_frame(&mut self) -> StreamResult<Option<Frame>> {
        loop {
            let context = self.context.load();
            if let Some(frame) = self.assembler.next_frame(context.as_deref(), self.verifier.as_ref()) {
                return Ok(Some(frame));
            }

            let read = match self.inner.read(&mut self.read_buf) {
                Ok(read) => read,
                Err(err) if err.kind() == ErrorKind::Interrupted => continue,
                Err(err) => return Err(err.into()),
            };

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

    /// Iterate frames until end of input or the first error
    pub fn frames(&mut self) -> Frames<'_, R> {
        Frames { reader: self, done: false }
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

/// Iterator returned by [`FrameReader::frames`]
pub struct Frames<'a, R: Read> {
    reader: &'a mut FrameReader<R>,
    done: bool,
}

impl<R: Read> Iterator for Frames<'_, R> {
    type Item = StreamResult<Frame>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }
        match self.reader.read_frame() {
            Ok(Some(frame)) => Some(Ok(frame)),
            Ok(None) => {
                self.done = true;
                None
            }
            Err(err) => {
                self.done = true;
                Some(Err(err))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{FrameKind, Revision, TimestampSource};
    use std::io::Cursor;

    /// Hands out at most `chunk` bytes per read call
    struct Trickle {
        data: Vec<u8>,
        position: usize,
        chunk: usize,
    }

    impl Read for Trickle {
        fn read(&mut self, buf: &mut [u8]) -> std::io::Result<usize> {
            let end = (self.position + self.chunk.min(buf.len())).min(self.data.len());
            let count = end - self.position;
            buf[..count].copy_from_slice(&self.data[self.position..end]);
            self.position = end;
            Ok(count)
        }
    }

    fn stream() -> Vec<u8> {
        let mut bytes = vec![0xAA, 0x00, 0x00, 0x04, 0x30, 0x1E, 0x00, 0x00];
        bytes.extend_from_slice(&[0xAA, 0x01, 0x00, 0x06, 0x00, 0x00, 0x01, 0x00, 0x00, 0x03, 0x00, 0x00]);
        bytes
    }

    #[test]
    fn test_reads_frames_across_small_chunks() {
        let cell = Arc::new(ContextCell::new());
        let source = Trickle { data: stream(), position: 0, chunk: 3 };
        let mut reader = FrameReader::new(source, Arc::clone(&cell));

        let config = reader.read_frame().unwrap().unwrap();
        assert_eq!(config.kind(), FrameKind::ConfigurationFrame);

        // Stand-in for parsing the configuration body: rate 30, revision 2
        cell.update(config.payload[1] as u16, Revision::Revision2).unwrap();

        let data = reader.read_frame().unwrap().unwrap();
        assert_eq!(data.header.timestamp_source, TimestampSource::TimeTag);
        assert_eq!(data.header.timestamp.unix_seconds(), 256);
        assert_eq!(data.header.timestamp.subsec_nanos(), 99_999_900);

        assert!(reader.read_frame().unwrap().is_none());
    }

    #[test]
    fn test_truncated_input() {
        let mut bytes = stream();
        bytes.truncate(bytes.len() - 1);
        let mut reader = FrameReader::new(Cursor::new(bytes), Arc::new(ContextCell::new()));

        assert!(reader.read_frame().unwrap().is_some());
        match reader.read_frame() {
            Err(StreamError::ConnectionClosed { buffered }) => assert_eq!(buffered, 11),
            other => panic!("expected ConnectionClosed, got {:?}", other),
        }
    }

    #[test]
    fn test_frames_iterator_with_verifier() {
        let source = Cursor::new(stream());
        let mut reader = FrameReader::new(source, Arc::new(ContextCell::new()))
            .with_verifier(|image: &[u8]| image[1] != 0);

        let frames: Vec<_> = reader.frames().collect::<Result<_, _>>().unwrap();
        assert_eq!(frames.len(), 1);
        assert_eq!(frames[0].kind(), FrameKind::DataFrame);
        assert!(frames[0].header.is_provisional());
        assert_eq!(reader.assembler().rejected_frames(), 1);
    }
}
