// src/reader/capture.rs
use crate::context::ContextCell;
use crate::frame::Frame;
use crate::header::{DecoderOptions, HeaderDecoder, SYNC_BYTE};
use bytes::Bytes;
use std::fs;
use std::io;
use std::path::Path;
use tracing::warn;

#[cfg(feature = "mmap")]
use memmap2::Mmap;

/// A recorded PDCstream byte stream held in memory.
///
/// Frames are decoded in place with [`HeaderDecoder`] at successive offsets; each
/// yielded frame copies only its own bytes.
pub struct CaptureFile<B: AsRef<[u8]> = Vec<u8>> {
    data: B,
    decoder: HeaderDecoder,
}

impl CaptureFile<Vec<u8>> {
    pub fn open(path: impl AsRef<Path>) -> io::Result<Self> {
        Ok(Self::from_bytes(fs::read(path)?))
    }
}

/// Memory-mapped capture files (requires "mmap" feature)
#[cfg(feature = "mmap")]
impl CaptureFile<Mmap> {
    pub fn open_mmap(path: impl AsRef<Path>) -> io::Result<Self> {
        let file = fs::File::open(path)?;
        let mmap = unsafe { Mmap::map(&file)? };
        Ok(Self::from_bytes(mmap))
    }
}

impl<B: AsRef<[u8]>> CaptureFile<B> {
    pub fn from_bytes(data: B) -> Self {
        CaptureFile {
            data,
            decoder: HeaderDecoder::default(),
        }
    }

    pub fn with_options(mut self, options: DecoderOptions) -> Self {
        self.decoder = HeaderDecoder::new(options);
        self
    }

    pub fn len(&self) -> usize {
        self.data.as_ref().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Iterate the frames of the capture.
    ///
    /// The context published in `context` is loaded for every frame, so the caller
    /// may update it after each configuration frame it parses.
    pub fn frames<'a>(&'a self, context: &'a ContextCell) -> CaptureFrames<'a> {
        CaptureFrames {
            data: self.data.as_ref(),
            decoder: &self.decoder,
            context,
            offset: 0,
            skipped_bytes: 0,
        }
    }
}

/// Iterator returned by [`CaptureFile::frames`]
pub struct CaptureFrames<'a> {
    data: &'a [u8],
    decoder: &'a HeaderDecoder,
    context: &'a ContextCell,
    offset: usize,
    skipped_bytes: usize,
}

impl CaptureFrames<'_> {
    /// Offset of the next byte to be examined
    pub fn offset(&self) -> usize {
        self.offset
    }

    /// Bytes passed over while looking for frame starts
    pub fn skipped_bytes(&self) -> usize {
        self.skipped_bytes
    }

    fn skip_to_next_sync(&mut self, from: usize) {
        let next = self.data[from.min(self.data.len())..]
            .iter()
            .position(|b| *b == SYNC_BYTE)
            .map_or(self.data.len(), |position| from + position);
        self.skipped_bytes += next - self.offset;
        self.offset = next;
    }
}

impl Iterator for CaptureFrames<'_> {
    type Item = Frame;

    fn next(&mut self) -> Option<Frame> {
        loop {
            if self.offset >= self.data.len() {
                return None;
            }
            if self.data[self.offset] != SYNC_BYTE {
                self.skip_to_next_sync(self.offset);
                continue;
            }

            let context = self.context.load();
            let header = match self.decoder.decode(self.data, self.offset, context.as_deref()) {
                Ok(header) => header,
                Err(err) if err.is_retriable() => return None,
                Err(err) => {
                    warn!(offset = self.offset, error = %err, "skipping malformed header");
                    self.skip_to_next_sync(self.offset + 1);
                    continue;
                }
            };

            let range = match header.frame_range(self.offset) {
                Ok(range) if range.end <= self.data.len() => range,
                _ => {
                    warn!(
                        offset = self.offset,
                        frame_length = header.frame_length_bytes,
                        "capture ends inside a frame"
                    );
                    return None;
                }
            };

            self.offset = range.end;
            let image = Bytes::copy_from_slice(&self.data[range]);
            return Some(Frame::from_image(header, image));
        }
    }
}
