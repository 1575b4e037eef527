// src/header/decoder.rs
use super::{
    DecodedHeader, COMMON_HEADER_LENGTH, DATA_HEADER_LENGTH, MAX_DATA_LENGTH,
    NTP_HEURISTIC_THRESHOLD, SYNC_BYTE, TIME_TAG_LENGTH, TRAILER_LENGTH,
};
use crate::context::FrameContext;
use crate::error::{HeaderError, Result};
use crate::types::{Epoch, FrameKind, Timestamp, TimestampSource};
use byteorder::{BigEndian, ByteOrder};

/// Settings supplied by the surrounding application
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DecoderOptions {
    /// Largest payload accepted before the header is rejected. Default: [`MAX_DATA_LENGTH`].
    pub max_data_length: usize,
    /// Read the word count from the single byte at offset 3 instead of a big-endian u16.
    ///
    /// Some device firmware writes the count this way.
    pub legacy_byte_count_quirk: bool,
}

impl Default for DecoderOptions {
    fn default() -> Self {
        DecoderOptions {
            max_data_length: MAX_DATA_LENGTH,
            legacy_byte_count_quirk: false,
        }
    }
}

impl DecoderOptions {
    /// Set the payload limit; values above the protocol maximum are clamped to it
    pub fn with_max_data_length(mut self, max_data_length: usize) -> Self {
        self.max_data_length = max_data_length.min(MAX_DATA_LENGTH);
        self
    }

    pub fn with_legacy_byte_count_quirk(mut self, enabled: bool) -> Self {
        self.legacy_byte_count_quirk = enabled;
        self
    }
}

/// Decodes common frame headers.
///
/// The decoder holds only its options, so one instance can be shared freely between
/// readers on different threads. Each call borrows the caller's current context.
///
/// # Example
///
/// ```
/// use pdcstream_rs::header::HeaderDecoder;
/// use pdcstream_rs::types::FrameKind;
///
/// let decoder = HeaderDecoder::default();
/// let header = decoder.decode(&[0xAA, 0x00, 0x00, 0x0A], 0, None).unwrap();
///
/// assert_eq!(header.frame_kind, FrameKind::ConfigurationFrame);
/// assert_eq!(header.frame_length_bytes, 20);
/// assert_eq!(header.data_length_bytes, 14);
/// ```
#[derive(Debug, Clone, Copy, Default)]
pub struct HeaderDecoder {
    options: DecoderOptions,
}

impl HeaderDecoder {
    pub fn new(options: DecoderOptions) -> Self {
        HeaderDecoder {
            options: options.with_max_data_length(options.max_data_length),
        }
    }

    pub fn options(&self) -> &DecoderOptions {
        &self.options
    }

    /// Decode the header starting at `buffer[offset]`.
    ///
    /// # Arguments
    ///
    /// * `buffer` - Bytes received so far
    /// * `offset` - Position of the (expected) sync byte
    /// * `context` - Snapshot of the last configuration frame, if one has been parsed
    ///
    /// # Returns
    ///
    /// The decoded header, or `NeedMoreBytes(n)` when fewer than the required header bytes
    /// are available. Configuration frames need 4 bytes, data frames 10.
    pub fn decode(
        &self,
        buffer: &[u8],
        offset: usize,
        context: Option<&FrameContext>,
    ) -> Result<DecodedHeader> {
        let available = buffer.len().saturating_sub(offset);
        if available < COMMON_HEADER_LENGTH {
            return Err(HeaderError::NeedMoreBytes(COMMON_HEADER_LENGTH - available));
        }
        let bytes = &buffer[offset..];

        if bytes[0] != SYNC_BYTE {
            return Err(HeaderError::InvalidSyncByte { found: bytes[0] });
        }

        let packet_number = bytes[1];
        let frame_kind = FrameKind::from_packet_number(packet_number);

        let word_count = if self.options.legacy_byte_count_quirk {
            bytes[3] as u16
        } else {
            BigEndian::read_u16(&bytes[2..4])
        };

        let frame_length_bytes = 2 * word_count as usize;
        let data_length_bytes = frame_length_bytes
            .checked_sub(COMMON_HEADER_LENGTH + TRAILER_LENGTH)
            .filter(|length| *length <= self.options.max_data_length)
            .ok_or(HeaderError::InvalidLength {
                declared: frame_length_bytes,
            })?;

        let mut header = DecodedHeader {
            frame_kind,
            packet_number,
            word_count,
            frame_length_bytes,
            data_length_bytes,
            sample_number: None,
            second_of_century: None,
            timestamp: Timestamp::UNIX_EPOCH,
            timestamp_source: TimestampSource::CaptureTime,
            is_partial: true,
        };

        match frame_kind {
            FrameKind::ConfigurationFrame => {
                header.timestamp = Timestamp::now();
            }
            FrameKind::DataFrame => {
                // The time tag counts toward the payload, so it must fit inside the frame
                if data_length_bytes < TIME_TAG_LENGTH {
                    return Err(HeaderError::InvalidLength {
                        declared: frame_length_bytes,
                    });
                }
                if available < DATA_HEADER_LENGTH {
                    return Err(HeaderError::NeedMoreBytes(DATA_HEADER_LENGTH - available));
                }

                let second_of_century = BigEndian::read_u32(&bytes[4..8]);
                let sample_number = BigEndian::read_i16(&bytes[8..10]);
                let (timestamp, source) =
                    resolve_timestamp(second_of_century, sample_number, context);

                header.second_of_century = Some(second_of_century);
                header.sample_number = Some(sample_number);
                header.timestamp = timestamp;
                header.timestamp_source = source;
            }
        }

        Ok(header)
    }
}

/// Decode with default limits; the free-function form of [`HeaderDecoder::decode`].
pub fn decode(
    buffer: &[u8],
    offset: usize,
    context: Option<&FrameContext>,
    legacy_byte_count_quirk: bool,
) -> Result<DecodedHeader> {
    HeaderDecoder::new(DecoderOptions::default().with_legacy_byte_count_quirk(legacy_byte_count_quirk))
        .decode(buffer, offset, context)
}

/// Turn a data-frame time tag into an absolute timestamp.
///
/// Without a context the epoch is guessed from the magnitude of the time tag and the
/// sample offset is ignored, since ticks-per-frame is unknown.
pub(crate) fn resolve_timestamp(
    second_of_century: u32,
    sample_number: i16,
    context: Option<&FrameContext>,
) -> (Timestamp, TimestampSource) {
    match context {
        None => {
            let epoch = if second_of_century > NTP_HEURISTIC_THRESHOLD {
                Epoch::Ntp
            } else {
                Epoch::Unix
            };
            (
                Timestamp::from_time_tag(second_of_century, epoch),
                TimestampSource::Provisional,
            )
        }
        Some(ctx) => {
            let base = Timestamp::from_time_tag(second_of_century, ctx.revision().time_tag_epoch());
            let offset = sample_number as i64 * ctx.ticks_per_frame();
            (base.add_ticks(offset), TimestampSource::TimeTag)
        }
    }
}
