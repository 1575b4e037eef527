// src/frame.rs
use crate::header::{DecodedHeader, COMMON_HEADER_LENGTH, TIME_TAG_LENGTH, TRAILER_LENGTH};
use crate::types::FrameKind;
use bytes::Bytes;

/// A complete frame cut from the stream.
///
/// `payload` holds everything between the common header and the trailer. For data
/// frames it starts with the time tag already reflected in `header`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Frame {
    pub header: DecodedHeader,
    pub payload: Bytes,
    pub trailer: [u8; TRAILER_LENGTH],
    image: Bytes,
}

impl Frame {
    /// Split a frame image whose length equals `header.frame_length_bytes`.
    pub(crate) fn from_image(mut header: DecodedHeader, image: Bytes) -> Self {
        let trailer_start = image.len() - TRAILER_LENGTH;
        let payload = image.slice(COMMON_HEADER_LENGTH..trailer_start);
        let trailer = [image[trailer_start], image[trailer_start + 1]];
        header.is_partial = false;

        Frame {
            header,
            payload,
            trailer,
            image,
        }
    }

    /// The whole frame as received, header and trailer included
    pub fn image(&self) -> &Bytes {
        &self.image
    }

    pub fn total_length(&self) -> usize {
        self.image.len()
    }

    pub fn kind(&self) -> FrameKind {
        self.header.frame_kind
    }

    /// Measurement cells of a data frame, or the configuration body of a configuration frame
    pub fn cell_data(&self) -> Bytes {
        match self.header.frame_kind {
            FrameKind::DataFrame => self.payload.slice(TIME_TAG_LENGTH.min(self.payload.len())..),
            FrameKind::ConfigurationFrame => self.payload.clone(),
        }
    }
}

/// Checks the trailer of a complete frame image.
///
/// The checksum algorithm lives outside this crate; readers only hand over frames whose
/// length matches the declared frame length.
pub trait ChecksumVerifier: Send + Sync {
    fn verify(&self, frame_image: &[u8]) -> bool;
}

/// Accepts every frame
#[derive(Debug, Clone, Copy, Default)]
pub struct NoChecksum;

impl ChecksumVerifier for NoChecksum {
    fn verify(&self, _frame_image: &[u8]) -> bool {
        true
    }
}

impl<F> ChecksumVerifier for F
where
    F: Fn(&[u8]) -> bool + Send + Sync,
{
    fn verify(&self, frame_image: &[u8]) -> bool {
        self(frame_image)
    }
}
