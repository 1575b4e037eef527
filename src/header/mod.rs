// src/header/mod.rs
mod decoder;
mod encoder;

pub use decoder::{decode, DecoderOptions, HeaderDecoder};
pub use encoder::{build_frame, encode, encode_extended, encode_into};

use crate::context::FrameContext;
use crate::error::{HeaderError, Result};
use crate::types::{FrameKind, Timestamp, TimestampSource};
use std::num::NonZeroU8;
use std::ops::Range;

/// Every frame starts with this byte
pub const SYNC_BYTE: u8 = 0xAA;

/// Sync byte, packet number and word count
pub const COMMON_HEADER_LENGTH: usize = 4;

/// Second-of-century (u32) and sample number (i16) following the common header of data frames
pub const TIME_TAG_LENGTH: usize = 6;

/// Full header length of a data frame
pub const DATA_HEADER_LENGTH: usize = COMMON_HEADER_LENGTH + TIME_TAG_LENGTH;

/// Checksum trailer closing every frame
pub const TRAILER_LENGTH: usize = 2;

/// Largest frame a 16-bit word count can declare
pub const MAX_FRAME_LENGTH: usize = 2 * u16::MAX as usize;

/// Largest payload a 16-bit word count can declare
pub const MAX_DATA_LENGTH: usize = MAX_FRAME_LENGTH - COMMON_HEADER_LENGTH - TRAILER_LENGTH;

/// Time tags above this value are taken as NTP seconds when no configuration is known.
///
/// This is 2000-01-01 00:00:00 UTC counted from 1900. Existing senders depend on
/// this exact cut-over; do not adjust it.
pub const NTP_HEURISTIC_THRESHOLD: u32 = 3_155_673_600;

/// The common frame header of one PDCstream frame.
///
/// A decoded header describes only the start of a frame (`is_partial` is always set);
/// `frame_length_bytes` tells the caller how much of the stream belongs to this frame.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DecodedHeader {
    pub frame_kind: FrameKind,
    pub packet_number: u8,
    pub word_count: u16,
    pub frame_length_bytes: usize,
    pub data_length_bytes: usize,
    /// Data frames only
    pub sample_number: Option<i16>,
    /// Raw wire time tag, data frames only
    pub second_of_century: Option<u32>,
    pub timestamp: Timestamp,
    pub timestamp_source: TimestampSource,
    pub is_partial: bool,
}

impl DecodedHeader {
    /// Header for an outgoing configuration frame carrying `data_length` payload bytes.
    pub fn configuration(data_length: usize) -> Result<Self> {
        let word_count = word_count_for(data_length)?;
        Ok(DecodedHeader {
            frame_kind: FrameKind::ConfigurationFrame,
            packet_number: 0,
            word_count,
            frame_length_bytes: 2 * word_count as usize,
            data_length_bytes: data_length,
            sample_number: None,
            second_of_century: None,
            timestamp: Timestamp::now(),
            timestamp_source: TimestampSource::CaptureTime,
            is_partial: true,
        })
    }

    /// Header for an outgoing data frame.
    ///
    /// The timestamp is derived exactly as the decoder would derive it for the same
    /// wire bytes and context.
    pub fn data(
        packet_number: NonZeroU8,
        data_length: usize,
        second_of_century: u32,
        sample_number: i16,
        context: Option<&FrameContext>,
    ) -> Result<Self> {
        let word_count = word_count_for(data_length)?;
        if data_length < TIME_TAG_LENGTH {
            return Err(HeaderError::InvalidLength {
                declared: 2 * word_count as usize,
            });
        }
        let (timestamp, timestamp_source) =
            decoder::resolve_timestamp(second_of_century, sample_number, context);

        Ok(DecodedHeader {
            frame_kind: FrameKind::DataFrame,
            packet_number: packet_number.get(),
            word_count,
            frame_length_bytes: 2 * word_count as usize,
            data_length_bytes: data_length,
            sample_number: Some(sample_number),
            second_of_century: Some(second_of_century),
            timestamp,
            timestamp_source,
            is_partial: true,
        })
    }

    /// Number of header bytes on the wire (4 for configuration frames, 10 for data frames)
    pub fn header_length(&self) -> usize {
        match self.frame_kind {
            FrameKind::ConfigurationFrame => COMMON_HEADER_LENGTH,
            FrameKind::DataFrame => DATA_HEADER_LENGTH,
        }
    }

    /// Byte range of the whole frame when the header starts at `offset`
    pub fn frame_range(&self, offset: usize) -> Result<Range<usize>> {
        let end = offset
            .checked_add(self.frame_length_bytes)
            .ok_or(HeaderError::Overflow {
                computed: self.frame_length_bytes,
                max: usize::MAX - offset,
            })?;
        Ok(offset..end)
    }

    /// Byte range of the payload that follows the common header.
    ///
    /// For data frames the payload starts with the time tag, matching how
    /// `data_length_bytes` is counted.
    pub fn payload_range(&self, offset: usize) -> Result<Range<usize>> {
        let frame = self.frame_range(offset)?;
        Ok(frame.start + COMMON_HEADER_LENGTH..frame.end - TRAILER_LENGTH)
    }

    /// True when the timestamp relied on the epoch guess rather than a known revision
    pub fn is_provisional(&self) -> bool {
        self.timestamp_source == TimestampSource::Provisional
    }
}

fn word_count_for(data_length: usize) -> Result<u16> {
    let frame_length = data_length
        .checked_add(COMMON_HEADER_LENGTH + TRAILER_LENGTH)
        .ok_or(HeaderError::Overflow {
            computed: data_length,
            max: MAX_DATA_LENGTH,
        })?;

    if frame_length > MAX_FRAME_LENGTH {
        return Err(HeaderError::Overflow {
            computed: frame_length,
            max: MAX_FRAME_LENGTH,
        });
    }
    if frame_length % 2 != 0 {
        return Err(HeaderError::InvalidLength { declared: frame_length });
    }

    Ok((frame_length / 2) as u16)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Revision;

    #[test]
    fn test_header_constants() {
        assert_eq!(SYNC_BYTE, 0xAA);
        assert_eq!(COMMON_HEADER_LENGTH, 4);
        assert_eq!(DATA_HEADER_LENGTH, 10);
        assert_eq!(MAX_FRAME_LENGTH, 131_070);
        assert_eq!(MAX_DATA_LENGTH, 131_064);
    }

    #[test]
    fn test_configuration_builder() {
        let header = DecodedHeader::configuration(14).unwrap();
        assert_eq!(header.word_count, 10);
        assert_eq!(header.frame_length_bytes, 20);
        assert_eq!(header.header_length(), 4);
        assert_eq!(header.timestamp_source, TimestampSource::CaptureTime);
        assert!(header.is_partial);
    }

    #[test]
    fn test_builder_rejects_odd_and_oversized() {
        assert_eq!(
            DecodedHeader::configuration(13),
            Err(HeaderError::InvalidLength { declared: 19 })
        );
        assert_eq!(
            DecodedHeader::configuration(MAX_DATA_LENGTH + 2),
            Err(HeaderError::Overflow { computed: MAX_FRAME_LENGTH + 2, max: MAX_FRAME_LENGTH })
        );
        assert!(matches!(
            DecodedHeader::configuration(usize::MAX),
            Err(HeaderError::Overflow { .. })
        ));
    }

    #[test]
    fn test_data_builder_uses_context() {
        let ctx = FrameContext::new(30, Revision::Revision2).unwrap();
        let packet = NonZeroU8::new(3).unwrap();
        let header = DecodedHeader::data(packet, 14, 1_000, 15, Some(&ctx)).unwrap();

        assert_eq!(header.frame_kind, FrameKind::DataFrame);
        assert_eq!(header.packet_number, 3);
        assert_eq!(header.header_length(), 10);
        assert_eq!(header.timestamp.unix_seconds(), 1_000);
        assert_eq!(header.timestamp.subsec_nanos(), 499_999_500);
        assert!(!header.is_provisional());
    }

    #[test]
    fn test_data_builder_requires_room_for_time_tag() {
        let packet = NonZeroU8::new(1).unwrap();
        assert_eq!(
            DecodedHeader::data(packet, 0, 10, 0, None),
            Err(HeaderError::InvalidLength { declared: 6 })
        );
        assert_eq!(
            DecodedHeader::data(packet, 2, 10, 0, None),
            Err(HeaderError::InvalidLength { declared: 8 })
        );
        assert_eq!(DecodedHeader::data(packet, 6, 10, 0, None).unwrap().word_count, 6);
    }

    #[test]
    fn test_frame_and_payload_ranges() {
        let header = DecodedHeader::configuration(14).unwrap();
        assert_eq!(header.frame_range(100).unwrap(), 100..120);
        assert_eq!(header.payload_range(100).unwrap(), 104..118);
        assert!(matches!(
            header.frame_range(usize::MAX - 5),
            Err(HeaderError::Overflow { .. })
        ));
    }
}
