use std::io::{self, Write};

use byteorder::{BigEndian, ByteOrder, WriteBytesExt};
use bytes_util::{BitReader, BitWriter};
use tracing::{debug, warn};

use crate::error::{DecodeError, ReadContext, Result};
use crate::rbsp::{more_rbsp_data, nal_to_rbsp, rbsp_to_nal};
use crate::{NALUnitHeader, NALUnitType, SeiMessage, SeiPayloadHeader};

/// Size of the big-endian length fields framing the array and each NAL unit.
const LENGTH_SIZE: usize = 4;

/// Options of the [`AuxSeiDecoder`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(default)
)]
pub struct AuxSeiOptions {
    /// Stop after the first NAL unit and its first SEI message, like older
    /// HEIF readers did. Further NAL units in the array are not visited.
    pub first_nal_only: bool,
    /// Record a malformed message as a [`SeiWarning`] and keep scanning instead
    /// of failing the whole array. Framing errors (lengths, NAL sizes, SEI
    /// headers) still fail.
    pub skip_malformed_messages: bool,
}

/// A message that failed to decode and was skipped.
#[derive(Debug)]
pub struct SeiWarning {
    /// Byte offset of the NAL unit size field in the input.
    pub nal_offset: usize,
    /// `payloadType` of the skipped message.
    pub payload_type: u8,
    /// Why it was skipped.
    pub error: DecodeError,
}

/// Everything decoded from one auxiliary SEI array.
#[derive(Debug, Default)]
pub struct AuxSeiReport {
    /// Decoded messages in stream order.
    pub messages: Vec<SeiMessage>,
    /// Messages skipped with [`AuxSeiOptions::skip_malformed_messages`].
    pub warnings: Vec<SeiWarning>,
}

/// One length-prefixed NAL unit of the array.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuxNalUnit<'a> {
    /// Byte offset of the size field in the input.
    pub offset: usize,
    /// Declared NAL unit size in bytes, validated against the array.
    pub size: u32,
    /// The two header bytes.
    pub header: NALUnitHeader,
    /// NAL unit bytes after the header, emulation prevention included.
    pub payload: &'a [u8],
}

/// Decoder for the SEI arrays stored with HEIF auxiliary images.
///
/// Layout: `[u32 length][u32 nal_size][nal unit]...`, all big endian. The
/// length counts the bytes after itself.
#[derive(Debug, Clone, Default)]
pub struct AuxSeiDecoder {
    options: AuxSeiOptions,
}

impl AuxSeiDecoder {
    /// Creates a decoder with the given options.
    pub fn new(options: AuxSeiOptions) -> Self {
        Self { options }
    }

    /// Returns the options of this decoder.
    pub fn options(&self) -> &AuxSeiOptions {
        &self.options
    }

    /// Splits the array into its NAL units.
    ///
    /// Fails if the length prefix or any NAL size points past the data.
    pub fn nal_units<'a>(&self, data: &'a [u8]) -> Result<Vec<AuxNalUnit<'a>>> {
        if data.len() < LENGTH_SIZE {
            return Err(DecodeError::TruncatedInput("sei array length"));
        }

        let declared = BigEndian::read_u32(data);
        let available = data.len() - LENGTH_SIZE;
        if declared as usize > available {
            return Err(DecodeError::LengthOutOfRange {
                declared,
                available,
            });
        }

        let end = LENGTH_SIZE + declared as usize;
        let mut offset = LENGTH_SIZE;
        let mut units = Vec::new();

        while offset < end {
            let mut bit_reader = BitReader::new(&data[offset..end]);

            let size = bit_reader.read_bits(32).or_truncated("nal unit size")? as u32;
            let body = bit_reader.remaining_bytes();
            if size as usize > body.len() || (size as usize) < NALUnitHeader::SIZE {
                return Err(DecodeError::TruncatedNal {
                    offset,
                    declared: size,
                    available: body.len(),
                });
            }

            let header = NALUnitHeader::parse(&mut bit_reader)?;
            let payload = &body[NALUnitHeader::SIZE..size as usize];

            debug!(
                offset,
                size,
                nal_unit_type = header.nal_unit_type.code(),
                "found nal unit"
            );

            units.push(AuxNalUnit {
                offset,
                size,
                header,
                payload,
            });

            offset += LENGTH_SIZE + size as usize;

            if self.options.first_nal_only {
                break;
            }
        }

        Ok(units)
    }

    /// Decodes every supported SEI message in the array.
    pub fn decode(&self, data: &[u8]) -> Result<AuxSeiReport> {
        let mut report = AuxSeiReport::default();

        for nal in self.nal_units(data)? {
            if nal.header.nal_unit_type.is_sei() {
                self.decode_sei_rbsp(&nal, &mut report)?;
            }
        }

        Ok(report)
    }

    fn decode_sei_rbsp(&self, nal: &AuxNalUnit<'_>, report: &mut AuxSeiReport) -> Result<()> {
        let rbsp = nal_to_rbsp(nal.payload);
        let mut bit_reader = BitReader::new(&rbsp);

        while more_rbsp_data(bit_reader.remaining_bytes()) {
            let header = SeiPayloadHeader::parse(&mut bit_reader)?;

            let start = bit_reader.byte_position();
            let payload = rbsp
                .get(start..start + header.payload_size as usize)
                .ok_or(DecodeError::TruncatedInput("sei payload"))?;

            match SeiMessage::parse(header.payload_type, payload) {
                Ok(Some(message)) => {
                    debug!(
                        nal_offset = nal.offset,
                        payload_type = header.payload_type,
                        "decoded sei message"
                    );
                    report.messages.push(message);
                }
                Ok(None) => {}
                Err(error) if self.options.skip_malformed_messages => {
                    warn!(
                        nal_offset = nal.offset,
                        payload_type = header.payload_type,
                        %error,
                        "skipping malformed sei message"
                    );
                    report.warnings.push(SeiWarning {
                        nal_offset: nal.offset,
                        payload_type: header.payload_type,
                        error,
                    });
                }
                Err(error) => return Err(error),
            }

            bit_reader.skip_bits(header.payload_size as u64 * 8)?;

            if self.options.first_nal_only {
                break;
            }
        }

        Ok(())
    }
}

/// Decodes every supported SEI message of an auxiliary SEI array.
///
/// Scans all NAL units up to the declared length. The first error aborts the
/// whole call, so no partial message is ever returned. Use [`AuxSeiDecoder`]
/// for the resilient or single-NAL modes.
pub fn decode_aux_sei(data: &[u8]) -> Result<Vec<SeiMessage>> {
    AuxSeiDecoder::default()
        .decode(data)
        .map(|report| report.messages)
}

/// Builds an auxiliary SEI array holding each message in its own prefix SEI NAL unit.
pub fn mux_aux_sei(messages: &[SeiMessage]) -> io::Result<Vec<u8>> {
    let header = NALUnitHeader {
        nal_unit_type: NALUnitType::PrefixSeiNut,
        nuh_layer_id: 0,
        nuh_temporal_id_plus1: 1,
    };

    let mut units = BitWriter::new();
    for message in messages {
        let payload = message.mux_payload()?;
        let payload_size = u8::try_from(payload.len())
            .ok()
            .filter(|size| *size != u8::MAX)
            .ok_or_else(|| {
                io::Error::new(
                    io::ErrorKind::InvalidInput,
                    format!("sei payload of {} bytes needs a multi-byte size", payload.len()),
                )
            })?;

        let mut rbsp = vec![message.payload_type(), payload_size];
        rbsp.extend_from_slice(&payload);
        let nal_payload = rbsp_to_nal(&rbsp);

        units.write_u32::<BigEndian>((NALUnitHeader::SIZE + nal_payload.len()) as u32)?;
        units.write_all(&header.to_bytes())?;
        units.write_all(&nal_payload)?;
    }

    let units = units.finish()?;
    let mut data = BitWriter::new();
    data.write_u32::<BigEndian>(units.len() as u32)?;
    data.write_all(&units)?;

    data.finish()
}

#[cfg(test)]
#[cfg_attr(all(test, coverage_nightly), coverage(off))]
mod tests {
    use super::*;
    use crate::{DepthRepresentationInfo, DepthRepresentationType};

    fn depth_message(ty: DepthRepresentationType) -> SeiMessage {
        SeiMessage::DepthRepresentationInfo(DepthRepresentationInfo::new(ty))
    }

    #[test]
    fn test_single_message_without_bounds() {
        let data = [
            0x00, 0x00, 0x00, 0x09, // array length
            0x00, 0x00, 0x00, 0x05, // nal size
            0x4E, 0x01, // prefix sei
            0xB1, 0x01, // payload type 177, size 1
            0b0000_1100,
        ];

        let messages = decode_aux_sei(&data).unwrap();
        assert_eq!(
            messages,
            vec![depth_message(DepthRepresentationType::UniformInverseZ)]
        );
    }

    #[test]
    fn test_array_length_checks() {
        assert!(matches!(
            decode_aux_sei(&[0x00, 0x00, 0x00]),
            Err(DecodeError::TruncatedInput("sei array length"))
        ));

        assert!(matches!(
            decode_aux_sei(&[0x00, 0x00, 0x00, 0x05, 0x00, 0x00, 0x00, 0x01]),
            Err(DecodeError::LengthOutOfRange {
                declared: 5,
                available: 4
            })
        ));

        assert!(matches!(
            decode_aux_sei(&[0xFF, 0xFF, 0xFF, 0xFF]),
            Err(DecodeError::LengthOutOfRange { .. })
        ));

        // An empty array is fine
        assert!(decode_aux_sei(&[0, 0, 0, 0]).unwrap().is_empty());
    }

    #[test]
    fn test_nal_size_checks() {
        // nal claims 9 bytes, 4 remain within the array
        let data = [
            0x00, 0x00, 0x00, 0x08, 0x00, 0x00, 0x00, 0x09, 0x4E, 0x01, 0xB1, 0x01,
        ];
        assert!(matches!(
            decode_aux_sei(&data),
            Err(DecodeError::TruncatedNal {
                offset: 4,
                declared: 9,
                available: 4
            })
        ));

        // nal too short to hold its header
        let data = [0x00, 0x00, 0x00, 0x05, 0x00, 0x00, 0x00, 0x01, 0x4E];
        assert!(matches!(
            decode_aux_sei(&data),
            Err(DecodeError::TruncatedNal { declared: 1, .. })
        ));

        // size field itself cut short by the array length
        let data = [0x00, 0x00, 0x00, 0x02, 0x00, 0x00, 0x00, 0x00];
        assert!(matches!(
            decode_aux_sei(&data),
            Err(DecodeError::TruncatedInput("nal unit size"))
        ));
    }

    #[test]
    fn test_payload_size_past_nal() {
        let data = [
            0x00, 0x00, 0x00, 0x09, 0x00, 0x00, 0x00, 0x05, 0x4E, 0x01, 0xB1, 0x04, 0x0C,
        ];
        assert!(matches!(
            decode_aux_sei(&data),
            Err(DecodeError::TruncatedInput("sei payload"))
        ));
    }

    #[test]
    fn test_non_sei_nal_is_skipped() {
        // AUD (type 35) followed by a suffix SEI
        let data = [
            0x00, 0x00, 0x00, 0x10, //
            0x00, 0x00, 0x00, 0x03, 0x46, 0x01, 0x50, //
            0x00, 0x00, 0x00, 0x05, 0x50, 0x01, 0xB1, 0x01, 0b0000_1100,
        ];

        let decoder = AuxSeiDecoder::default();
        let units = decoder.nal_units(&data).unwrap();
        assert_eq!(units.len(), 2);
        assert_eq!(units[0].header.nal_unit_type, NALUnitType::AudNut);
        assert_eq!(units[0].payload, &[0x50]);
        assert_eq!(units[1].offset, 11);
        assert_eq!(units[1].header.nal_unit_type, NALUnitType::SuffixSeiNut);

        let report = decoder.decode(&data).unwrap();
        assert_eq!(
            report.messages,
            vec![depth_message(DepthRepresentationType::UniformInverseZ)]
        );
    }

    #[test]
    fn test_multiple_nal_units_and_messages() {
        let messages = vec![
            depth_message(DepthRepresentationType::UniformInverseZ),
            depth_message(DepthRepresentationType::UniformZ),
            SeiMessage::DepthRepresentationInfo(DepthRepresentationInfo {
                z_near: Some(0.5),
                z_far: Some(100.0),
                ..DepthRepresentationInfo::new(DepthRepresentationType::UniformDisparity)
            }),
        ];

        let data = mux_aux_sei(&messages).unwrap();
        assert_eq!(decode_aux_sei(&data).unwrap(), messages);

        let legacy = AuxSeiDecoder::new(AuxSeiOptions {
            first_nal_only: true,
            ..Default::default()
        });
        let report = legacy.decode(&data).unwrap();
        assert_eq!(report.messages, messages[..1]);
        assert!(report.warnings.is_empty());
    }

    #[test]
    fn test_two_messages_in_one_nal() {
        // unknown type 5 with 2 bytes, then depth info, then rbsp trailing bits
        let data = [
            0x00, 0x00, 0x00, 0x0E, //
            0x00, 0x00, 0x00, 0x0A, 0x4E, 0x01, //
            0x05, 0x02, 0xAA, 0xBB, //
            0xB1, 0x01, 0b0000_1100, //
            0x80,
        ];

        let report = AuxSeiDecoder::default().decode(&data).unwrap();
        assert_eq!(
            report.messages,
            vec![depth_message(DepthRepresentationType::UniformInverseZ)]
        );

        let legacy = AuxSeiDecoder::new(AuxSeiOptions {
            first_nal_only: true,
            ..Default::default()
        });
        assert!(legacy.decode(&data).unwrap().messages.is_empty());
    }

    #[test]
    fn test_skip_malformed_messages() {
        let bad = [
            // flags 0000, ue(v) "00101" -> type 4
            0x00, 0x00, 0x00, 0x06, 0x4E, 0x01, 0xB1, 0x02, 0b0000_0010, 0b1000_0000,
        ];
        let good = mux_aux_sei(&[depth_message(DepthRepresentationType::UniformZ)]).unwrap();

        let mut data = Vec::new();
        data.extend_from_slice(&((bad.len() + good.len() - 4) as u32).to_be_bytes());
        data.extend_from_slice(&bad);
        data.extend_from_slice(&good[4..]);

        assert!(matches!(
            decode_aux_sei(&data),
            Err(DecodeError::InvalidEnumValue { value: 4, .. })
        ));

        let resilient = AuxSeiDecoder::new(AuxSeiOptions {
            skip_malformed_messages: true,
            ..Default::default()
        });
        let report = resilient.decode(&data).unwrap();
        assert_eq!(
            report.messages,
            vec![depth_message(DepthRepresentationType::UniformZ)]
        );
        assert_eq!(report.warnings.len(), 1);
        assert_eq!(report.warnings[0].nal_offset, 4);
        assert_eq!(report.warnings[0].payload_type, 177);
        assert!(matches!(
            report.warnings[0].error,
            DecodeError::InvalidEnumValue { value: 4, .. }
        ));
    }

    #[test]
    fn test_emulation_prevention_is_removed() {
        // d_max = +0 with a 32 bit mantissa is a run of zero bytes
        let message = SeiMessage::DepthRepresentationInfo(DepthRepresentationInfo {
            d_max: Some(0.0),
            disparity_reference_view: Some(0),
            ..DepthRepresentationInfo::new(DepthRepresentationType::UniformInverseZ)
        });

        let data = mux_aux_sei(std::slice::from_ref(&message)).unwrap();
        assert!(data[8..].windows(3).any(|w| w == [0, 0, 3]));
        assert_eq!(decode_aux_sei(&data).unwrap(), vec![message]);
    }

    #[test]
    fn test_mux_empty() {
        assert_eq!(mux_aux_sei(&[]).unwrap(), vec![0, 0, 0, 0]);
    }
}
