use bytes_util::BitReader;

use crate::NALUnitType;
use crate::error::{ReadContext, Result};

/// NAL unit header.
///
/// The type is taken as the upper seven bits of the first byte, the way HEIF
/// readers locate SEI units inside an auxiliary array. The remaining fields
/// are decoded for diagnostics only and are not validated.
///
/// - ISO/IEC 23008-2 - 7.3.1.2
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct NALUnitHeader {
    /// Specifies the type of RBSP data structure contained in the NAL unit.
    pub nal_unit_type: NALUnitType,
    /// Identifier of the layer the NAL unit belongs or applies to.
    ///
    /// Nominally in range \[0, 63\].
    pub nuh_layer_id: u8,
    /// This value minus 1 specifies a temporal identifier for the NAL unit.
    pub nuh_temporal_id_plus1: u8,
}

impl NALUnitHeader {
    /// Size of the header in bytes.
    pub const SIZE: usize = 2;

    /// Parses the two header bytes.
    pub fn parse(bit_reader: &mut BitReader<'_>) -> Result<Self> {
        let first = bit_reader.read_u8().or_truncated("nal unit header")?;
        let second = bit_reader.read_u8().or_truncated("nal unit header")?;

        Ok(Self {
            nal_unit_type: NALUnitType::from(first >> 1),
            nuh_layer_id: ((first & 1) << 5) | (second >> 3),
            nuh_temporal_id_plus1: second & 0b111,
        })
    }

    /// Returns the temporal id of the NAL unit, `None` if `nuh_temporal_id_plus1` is 0.
    pub fn temporal_id(&self) -> Option<u8> {
        self.nuh_temporal_id_plus1.checked_sub(1)
    }

    /// Returns the two header bytes.
    pub fn to_bytes(&self) -> [u8; 2] {
        [
            (self.nal_unit_type.code() << 1) | (self.nuh_layer_id >> 5),
            (self.nuh_layer_id << 3) | (self.nuh_temporal_id_plus1 & 0b111),
        ]
    }
}
