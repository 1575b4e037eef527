// src/header/encoder.rs
use super::{DecodedHeader, COMMON_HEADER_LENGTH, DATA_HEADER_LENGTH, SYNC_BYTE, TRAILER_LENGTH};
use crate::error::{HeaderError, Result};
use crate::types::FrameKind;
use byteorder::{BigEndian, ByteOrder};
use bytes::{BufMut, Bytes, BytesMut};

/// Serialize the common header: sync byte, packet number, big-endian word count.
pub fn encode(header: &DecodedHeader) -> [u8; COMMON_HEADER_LENGTH] {
    let mut bytes = [0u8; COMMON_HEADER_LENGTH];
    bytes[0] = SYNC_BYTE;
    bytes[1] = header.packet_number;
    BigEndian::write_u16(&mut bytes[2..4], header.word_count);
    bytes
}

/// Serialize a data-frame header including its time tag.
///
/// Returns `None` for configuration frames, which carry no time tag.
pub fn encode_extended(header: &DecodedHeader) -> Option<[u8; DATA_HEADER_LENGTH]> {
    if header.frame_kind != FrameKind::DataFrame {
        return None;
    }

    let mut bytes = [0u8; DATA_HEADER_LENGTH];
    bytes[..COMMON_HEADER_LENGTH].copy_from_slice(&encode(header));
    BigEndian::write_u32(&mut bytes[4..8], header.second_of_century.unwrap_or_default());
    BigEndian::write_i16(&mut bytes[8..10], header.sample_number.unwrap_or_default());
    Some(bytes)
}

/// Append the full wire header (4 or 10 bytes) to `dst`
pub fn encode_into(header: &DecodedHeader, dst: &mut BytesMut) {
    match encode_extended(header) {
        Some(bytes) => dst.put_slice(&bytes),
        None => dst.put_slice(&encode(header)),
    }
}

/// Assemble a complete frame image: common header, payload and trailer.
///
/// For data frames the payload must begin with the 6-byte time tag; use
/// [`encode_extended`] output for that or pass the raw payload of a received frame.
/// The trailer is written verbatim; computing it is up to the checksum provider.
pub fn build_frame(header: &DecodedHeader, payload: &[u8], trailer: [u8; TRAILER_LENGTH]) -> Result<Bytes> {
    if payload.len() != header.data_length_bytes {
        return Err(HeaderError::InvalidLength {
            declared: header.frame_length_bytes,
        });
    }

    let mut dst = BytesMut::with_capacity(header.frame_length_bytes);
    dst.put_slice(&encode(header));
    dst.put_slice(payload);
    dst.put_slice(&trailer);
    Ok(dst.freeze())
}
