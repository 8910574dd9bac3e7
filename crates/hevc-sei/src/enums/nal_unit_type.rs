/// NAL (Network Abstraction Layer) unit types as defined by ISO/IEC 23008-2 Table 7-1.
///
/// Only the non-VCL types are named individually. Codes are taken from the upper
/// seven bits of the first header byte, so a set `forbidden_zero_bit` shows up
/// as a code of 64 or more and lands in [`NALUnitType::Forbidden`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum NALUnitType {
    /// Coded slice segment of any picture type (0..=31).
    ///
    /// NAL unit type class: VCL
    Vcl(u8),
    /// Video parameter set
    VpsNut,
    /// Sequence parameter set
    SpsNut,
    /// Picture parameter set
    PpsNut,
    /// Access unit delimiter
    AudNut,
    /// End of sequence
    EosNut,
    /// End of bitstream
    EobNut,
    /// Filler data
    FdNut,
    /// Supplemental enhancement information placed before the picture data
    PrefixSeiNut,
    /// Supplemental enhancement information placed after the picture data
    SuffixSeiNut,
    /// Reserved non-VCL types (41..=47)
    Reserved(u8),
    /// Unspecified non-VCL types (48..=63)
    Unspecified(u8),
    /// Codes with `forbidden_zero_bit` set (64..=127)
    Forbidden(u8),
}

impl From<u8> for NALUnitType {
    fn from(value: u8) -> Self {
        match value {
            0..=31 => NALUnitType::Vcl(value),
            32 => NALUnitType::VpsNut,
            33 => NALUnitType::SpsNut,
            34 => NALUnitType::PpsNut,
            35 => NALUnitType::AudNut,
            36 => NALUnitType::EosNut,
            37 => NALUnitType::EobNut,
            38 => NALUnitType::FdNut,
            39 => NALUnitType::PrefixSeiNut,
            40 => NALUnitType::SuffixSeiNut,
            41..=47 => NALUnitType::Reserved(value),
            48..=63 => NALUnitType::Unspecified(value),
            _ => NALUnitType::Forbidden(value),
        }
    }
}

impl NALUnitType {
    /// Returns the numeric code of this type.
    pub fn code(&self) -> u8 {
        match *self {
            NALUnitType::Vcl(code)
            | NALUnitType::Reserved(code)
            | NALUnitType::Unspecified(code)
            | NALUnitType::Forbidden(code) => code,
            NALUnitType::VpsNut => 32,
            NALUnitType::SpsNut => 33,
            NALUnitType::PpsNut => 34,
            NALUnitType::AudNut => 35,
            NALUnitType::EosNut => 36,
            NALUnitType::EobNut => 37,
            NALUnitType::FdNut => 38,
            NALUnitType::PrefixSeiNut => 39,
            NALUnitType::SuffixSeiNut => 40,
        }
    }

    /// Returns `true` for coded slice segments.
    pub fn is_vcl(&self) -> bool {
        matches!(self, NALUnitType::Vcl(_))
    }

    /// Returns `true` for prefix and suffix SEI NAL units.
    pub fn is_sei(&self) -> bool {
        matches!(self, NALUnitType::PrefixSeiNut | NALUnitType::SuffixSeiNut)
    }
}
