// src/reader/assembler.rs
use crate::context::FrameContext;
use crate::error::HeaderError;
use crate::frame::{ChecksumVerifier, Frame};
use crate::header::{DecodedHeader, DecoderOptions, HeaderDecoder, SYNC_BYTE};
use bytes::{Buf, BytesMut};
use tracing::{debug, trace, warn};

/// Where the assembler stands in the current frame
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReadState {
    /// Scanning for the next sync byte
    AwaitingSync,
    /// Sync byte found, waiting for enough bytes to decode the header
    AwaitingHeaderBytes,
    /// Header decoded, waiting until this many frame bytes are buffered
    AwaitingPayload(usize),
    /// A frame was just handed out
    FrameReady,
}

/// Cuts complete frames out of arbitrarily chunked input.
///
/// The assembler performs no I/O: feed it bytes with [`push`](Self::push) and pull
/// frames with [`next_frame`](Self::next_frame). Malformed headers and frames rejected
/// by the checksum verifier cost one byte each; scanning then resumes at the next
/// sync byte.
///
/// # Example
///
/// ```
/// use pdcstream_rs::frame::NoChecksum;
/// use pdcstream_rs::reader::FrameAssembler;
///
/// let mut assembler = FrameAssembler::new();
/// assembler.push(&[0x00, 0xAA, 0x00, 0x00]);
/// assert!(assembler.next_frame(None, &NoChecksum).is_none());
///
/// assembler.push(&[0x04, 0x01, 0x02, 0xFF, 0xFF]);
/// let frame = assembler.next_frame(None, &NoChecksum).unwrap();
/// assert_eq!(&frame.payload[..], &[0x01, 0x02]);
/// assert_eq!(assembler.discarded_bytes(), 1);
/// ```
#[derive(Debug)]
pub struct FrameAssembler {
    buffer: BytesMut,
    decoder: HeaderDecoder,
    state: ReadState,
    pending: Option<DecodedHeader>,
    discarded_bytes: u64,
    rejected_frames: u64,
    frames: u64,
}

impl Default for FrameAssembler {
    fn default() -> Self {
        Self::new()
    }
}

impl FrameAssembler {
    pub fn new() -> Self {
        Self::with_options(DecoderOptions::default())
    }

    pub fn with_options(options: DecoderOptions) -> Self {
        FrameAssembler {
            buffer: BytesMut::with_capacity(8192),
            decoder: HeaderDecoder::new(options),
            state: ReadState::AwaitingSync,
            pending: None,
            discarded_bytes: 0,
            rejected_frames: 0,
            frames: 0,
        }
    }

    pub fn push(&mut self, data: &[u8]) {
        self.buffer.extend_from_slice(data);
    }

    /// Produce the next complete frame, or `None` until more bytes are pushed.
    ///
    /// `context` is consulted when a data-frame header is decoded; pass the snapshot
    /// that is current for this device.
    pub fn next_frame(
        &mut self,
        context: Option<&FrameContext>,
        verifier: &dyn ChecksumVerifier,
    ) -> Option<Frame> {
        loop {
            match self.state {
                ReadState::AwaitingSync | ReadState::FrameReady => {
                    match self.buffer.iter().position(|b| *b == SYNC_BYTE) {
                        Some(position) => {
                            self.discard(position);
                            self.state = ReadState::AwaitingHeaderBytes;
                        }
                        None => {
                            let garbage = self.buffer.len();
                            self.discard(garbage);
                            self.state = ReadState::AwaitingSync;
                            return None;
                        }
                    }
                }
                ReadState::AwaitingHeaderBytes => match self.decoder.decode(&self.buffer, 0, context) {
                    Ok(header) => {
                        self.state = ReadState::AwaitingPayload(header.frame_length_bytes);
                        self.pending = Some(header);
                    }
                    Err(HeaderError::NeedMoreBytes(missing)) => {
                        trace!(missing, "waiting for header bytes");
                        return None;
                    }
                    Err(err) => {
                        warn!(
                            error = %err,
                            discarded_bytes = self.discarded_bytes,
                            "malformed frame header, resynchronizing"
                        );
                        self.resync();
                    }
                },
                ReadState::AwaitingPayload(frame_length) => {
                    if self.buffer.len() < frame_length {
                        trace!(
                            buffered = self.buffer.len(),
                            frame_length,
                            "waiting for frame bytes"
                        );
                        return None;
                    }

                    if !verifier.verify(&self.buffer[..frame_length]) {
                        warn!(
                            frame_length,
                            discarded_bytes = self.discarded_bytes,
                            "checksum rejected frame, resynchronizing"
                        );
                        self.rejected_frames += 1;
                        self.resync();
                        continue;
                    }

                    let Some(header) = self.pending.take() else {
                        self.state = ReadState::AwaitingHeaderBytes;
                        continue;
                    };
                    let image = self.buffer.split_to(frame_length).freeze();
                    self.state = ReadState::FrameReady;
                    self.frames += 1;
                    debug!(
                        kind = %header.frame_kind,
                        packet_number = header.packet_number,
                        frame_length,
                        "frame complete"
                    );
                    return Some(Frame::from_image(header, image));
                }
            }
        }
    }

    pub fn state(&self) -> ReadState {
        self.state
    }

    /// Bytes held for a frame that is not complete yet
    pub fn buffered(&self) -> usize {
        self.buffer.len()
    }

    /// Bytes skipped while resynchronizing
    pub fn discarded_bytes(&self) -> u64 {
        self.discarded_bytes
    }

    /// Frames dropped because the checksum verifier rejected them
    pub fn rejected_frames(&self) -> u64 {
        self.rejected_frames
    }

    pub fn frames_assembled(&self) -> u64 {
        self.frames
    }

    /// Drop all buffered input and start over at the next sync byte
    pub fn reset(&mut self) {
        self.buffer.clear();
        self.pending = None;
        self.state = ReadState::AwaitingSync;
    }

    fn resync(&mut self) {
        self.pending = None;
        self.discard(1);
        self.state = ReadState::AwaitingSync;
    }

    fn discard(&mut self, count: usize) {
        if count == 0 {
            return;
        }
        let count = count.min(self.buffer.len());
        self.buffer.advance(count);
        self.discarded_bytes += count as u64;
    }
}
