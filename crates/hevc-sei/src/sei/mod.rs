//! SEI message syntax: `sei_message()` headers and the decoded payloads.

use std::io;

use bytes_util::{BitReader, BitWriter};
use tracing::trace;

use crate::error::{DecodeError, ReadContext, Result, Unsupported};

mod depth_rep_info_element;
mod depth_representation_info;

pub use depth_rep_info_element::*;
pub use depth_representation_info::*;

/// `payloadType` of the depth representation information message.
pub const DEPTH_REPRESENTATION_INFO: u8 = 177;

/// Byte value announcing an extended (multi-byte) type or size.
const EXTENSION_BYTE: u8 = 0xFF;

/// Header of one `sei_message()`.
///
/// Only single-byte types and sizes are supported, so both fields stay below 255.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SeiPayloadHeader {
    /// `payloadType`
    pub payload_type: u8,
    /// `payloadSize` in RBSP bytes.
    pub payload_size: u8,
}

impl SeiPayloadHeader {
    /// Reads `last_payload_type_byte` and `last_payload_size_byte`.
    ///
    /// A `0xFF` in either position means a multi-byte value and fails with
    /// [`DecodeError::UnsupportedFeature`].
    pub fn parse(bit_reader: &mut BitReader<'_>) -> Result<Self> {
        let payload_type = bit_reader.read_u8().or_truncated("sei payload type")?;
        if payload_type == EXTENSION_BYTE {
            return Err(DecodeError::UnsupportedFeature(
                Unsupported::MultiBytePayloadType,
            ));
        }

        let payload_size = bit_reader.read_u8().or_truncated("sei payload size")?;
        if payload_size == EXTENSION_BYTE {
            return Err(DecodeError::UnsupportedFeature(
                Unsupported::MultiBytePayloadSize,
            ));
        }

        Ok(Self {
            payload_type,
            payload_size,
        })
    }
}

/// A decoded SEI message.
///
/// Payload types without a variant are skipped by the decoder.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[non_exhaustive]
pub enum SeiMessage {
    /// Payload type 177.
    DepthRepresentationInfo(DepthRepresentationInfo),
}

impl SeiMessage {
    /// Returns the `payloadType` of this message.
    pub fn payload_type(&self) -> u8 {
        match self {
            SeiMessage::DepthRepresentationInfo(_) => DEPTH_REPRESENTATION_INFO,
        }
    }

    /// Decodes the payload of a message with the given type.
    ///
    /// `payload` holds exactly `payloadSize` RBSP bytes. Returns `Ok(None)`
    /// for payload types that have no decoder.
    pub fn parse(payload_type: u8, payload: &[u8]) -> Result<Option<Self>> {
        let mut bit_reader = BitReader::new(payload);

        match payload_type {
            DEPTH_REPRESENTATION_INFO => Ok(Some(SeiMessage::DepthRepresentationInfo(
                DepthRepresentationInfo::parse(&mut bit_reader)?,
            ))),
            _ => {
                trace!(payload_type, size = payload.len(), "ignoring sei payload");
                Ok(None)
            }
        }
    }

    /// Writes the payload bytes, terminated by payload alignment bits when
    /// the message does not end on a byte boundary.
    pub fn mux_payload(&self) -> io::Result<Vec<u8>> {
        let mut bit_writer = BitWriter::new();

        match self {
            SeiMessage::DepthRepresentationInfo(info) => info.mux(&mut bit_writer)?,
        }

        if !bit_writer.is_aligned() {
            // payload_bit_equal_to_one, then zeros up to the boundary
            bit_writer.write_bit(true)?;
        }

        bit_writer.finish()
    }
}

#[cfg(test)]
#[cfg_attr(all(test, coverage_nightly), coverage(off))]
mod tests {
    use super::*;
    use crate::DepthRepresentationType;

    #[test]
    fn test_payload_header() {
        let data = [0xB1, 0x09];
        let mut reader = BitReader::new(&data);

        assert_eq!(
            SeiPayloadHeader::parse(&mut reader).unwrap(),
            SeiPayloadHeader {
                payload_type: DEPTH_REPRESENTATION_INFO,
                payload_size: 9,
            }
        );
    }

    #[test]
    fn test_payload_header_multi_byte() {
        let data = [0xFF, 0x01, 0x02];
        let mut reader = BitReader::new(&data);
        assert!(matches!(
            SeiPayloadHeader::parse(&mut reader),
            Err(DecodeError::UnsupportedFeature(
                Unsupported::MultiBytePayloadType
            ))
        ));

        let data = [0xB1, 0xFF, 0x05];
        let mut reader = BitReader::new(&data);
        assert!(matches!(
            SeiPayloadHeader::parse(&mut reader),
            Err(DecodeError::UnsupportedFeature(
                Unsupported::MultiBytePayloadSize
            ))
        ));

        let data = [0xB1];
        let mut reader = BitReader::new(&data);
        assert!(matches!(
            SeiPayloadHeader::parse(&mut reader),
            Err(DecodeError::TruncatedInput("sei payload size"))
        ));
    }

    #[test]
    fn test_unknown_payload_type_is_skipped() {
        // user_data_unregistered
        assert_eq!(SeiMessage::parse(5, &[0xAA; 20]).unwrap(), None);
        assert_eq!(SeiMessage::parse(137, &[]).unwrap(), None);
    }

    #[test]
    fn test_mux_payload_alignment() {
        let message = SeiMessage::DepthRepresentationInfo(DepthRepresentationInfo::new(
            DepthRepresentationType::UniformInverseZ,
        ));

        // 0000 1 then alignment 1 00
        assert_eq!(message.mux_payload().unwrap(), vec![0b0000_1100]);
        assert_eq!(message.payload_type(), DEPTH_REPRESENTATION_INFO);

        let payload = message.mux_payload().unwrap();
        assert_eq!(
            SeiMessage::parse(DEPTH_REPRESENTATION_INFO, &payload).unwrap(),
            Some(message)
        );
    }
}
