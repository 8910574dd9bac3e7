use crate::error::DecodeError;

/// Representation of the samples of an auxiliary depth picture.
///
/// Semantics of `depth_representation_type` in the depth representation information
/// SEI message of ISO/IEC 23008-2.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[repr(u8)]
pub enum DepthRepresentationType {
    /// Samples are uniformly quantized inverse depth (1/Z).
    UniformInverseZ = 0,
    /// Samples are uniformly quantized disparity.
    UniformDisparity = 1,
    /// Samples are uniformly quantized depth (Z).
    UniformZ = 2,
    /// Samples are disparity mapped through a piecewise linear response curve.
    NonuniformDisparity = 3,
}

impl DepthRepresentationType {
    /// Returns the code of this type in the bitstream.
    pub fn code(&self) -> u8 {
        *self as u8
    }
}

impl TryFrom<u64> for DepthRepresentationType {
    type Error = DecodeError;

    fn try_from(value: u64) -> Result<Self, Self::Error> {
        match value {
            0 => Ok(DepthRepresentationType::UniformInverseZ),
            1 => Ok(DepthRepresentationType::UniformDisparity),
            2 => Ok(DepthRepresentationType::UniformZ),
            3 => Ok(DepthRepresentationType::NonuniformDisparity),
            _ => Err(DecodeError::InvalidEnumValue {
                field: "depth_representation_type",
                value,
            }),
        }
    }
}
