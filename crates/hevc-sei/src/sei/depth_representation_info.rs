use std::io;

use bytes_util::{BitReader, BitWriter};
use expgolomb::{BitReaderExpGolombExt, BitWriterExpGolombExt, size_of_exp_golomb};
use tracing::debug;

use super::depth_rep_info_element::{DepthRepInfoElement, decode_float_element};
use crate::DepthRepresentationType;
use crate::error::{DecodeError, ReadContext, Result};

/// Mantissa length used when muxing depth bounds.
const MUX_MANTISSA_LEN: u8 = 32;

/// Non-uniform disparity response curve left in the payload undecoded.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct UnparsedNonlinearModel {
    /// Bits between the depth bounds and `payload_bit_equal_to_one`.
    pub remaining_bits: u64,
}

/// Depth representation information SEI message (payload type 177).
///
/// Describes how the samples of an auxiliary depth picture map to depth or
/// disparity. Every bound is present exactly when its `has_*` flag was set
/// in the bitstream, see [`Self::has_z_near`] and friends.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct DepthRepresentationInfo {
    /// How sample values are to be interpreted.
    pub depth_representation_type: DepthRepresentationType,
    /// View used as reference for disparity, only coded with `d_min` or `d_max`.
    pub disparity_reference_view: Option<u32>,
    /// Nearest depth plane.
    pub z_near: Option<f64>,
    /// Farthest depth plane.
    pub z_far: Option<f64>,
    /// Minimum disparity.
    pub d_min: Option<f64>,
    /// Maximum disparity.
    pub d_max: Option<f64>,
    /// Set exactly for [`DepthRepresentationType::NonuniformDisparity`], whose curve is not decoded.
    pub nonlinear_model: Option<UnparsedNonlinearModel>,
}

impl DepthRepresentationInfo {
    /// Version of this message layout.
    pub const VERSION: u8 = 1;

    /// Creates a message without bounds.
    ///
    /// A non-uniform disparity message gets an empty curve.
    pub fn new(depth_representation_type: DepthRepresentationType) -> Self {
        Self {
            depth_representation_type,
            disparity_reference_view: None,
            z_near: None,
            z_far: None,
            d_min: None,
            d_max: None,
            nonlinear_model: (depth_representation_type
                == DepthRepresentationType::NonuniformDisparity)
                .then_some(UnparsedNonlinearModel { remaining_bits: 0 }),
        }
    }

    /// Decodes the message from a cursor positioned just past the SEI payload header.
    ///
    /// On success exactly the flags, the type, the optional reference view and
    /// the present bounds have been consumed. Anything after them (the
    /// non-uniform curve, payload alignment) is left in the cursor. For
    /// [`DepthRepresentationType::NonuniformDisparity`] the size of the curve is
    /// recorded in [`Self::nonlinear_model`]. The cursor is expected to end with
    /// the payload, so the last set bit is taken as `payload_bit_equal_to_one`.
    pub fn parse(bit_reader: &mut BitReader<'_>) -> Result<Self> {
        let has_z_near = bit_reader.read_bit().or_truncated("z_near_flag")?;
        let has_z_far = bit_reader.read_bit().or_truncated("z_far_flag")?;
        let has_d_min = bit_reader.read_bit().or_truncated("d_min_flag")?;
        let has_d_max = bit_reader.read_bit().or_truncated("d_max_flag")?;

        let depth_representation_type = bit_reader
            .read_exp_golomb()
            .or_malformed_uvlc("depth_representation_type")?;
        let depth_representation_type = DepthRepresentationType::try_from(depth_representation_type)?;

        let disparity_reference_view = if has_d_min || has_d_max {
            let view = bit_reader
                .read_exp_golomb()
                .or_malformed_uvlc("disparity_ref_view_id")?;
            Some(
                u32::try_from(view)
                    .map_err(|_| DecodeError::MalformedUvlc("disparity_ref_view_id"))?,
            )
        } else {
            None
        };

        let mut read_bound = |present: bool| -> Result<Option<f64>> {
            if present {
                decode_float_element(bit_reader).map(Some)
            } else {
                Ok(None)
            }
        };

        let z_near = read_bound(has_z_near)?;
        let z_far = read_bound(has_z_far)?;
        let d_min = read_bound(has_d_min)?;
        let d_max = read_bound(has_d_max)?;

        let nonlinear_model = (depth_representation_type
            == DepthRepresentationType::NonuniformDisparity)
            .then(|| UnparsedNonlinearModel {
                remaining_bits: bits_before_payload_alignment(bit_reader),
            });

        if let Some(model) = nonlinear_model {
            debug!(
                remaining_bits = model.remaining_bits,
                "non-uniform disparity curve left undecoded"
            );
        }

        Ok(Self {
            depth_representation_type,
            disparity_reference_view,
            z_near,
            z_far,
            d_min,
            d_max,
            nonlinear_model,
        })
    }

    /// Always [`Self::VERSION`].
    pub fn version(&self) -> u8 {
        Self::VERSION
    }

    /// `z_near_flag`
    pub fn has_z_near(&self) -> bool {
        self.z_near.is_some()
    }

    /// `z_far_flag`
    pub fn has_z_far(&self) -> bool {
        self.z_far.is_some()
    }

    /// `d_min_flag`
    pub fn has_d_min(&self) -> bool {
        self.d_min.is_some()
    }

    /// `d_max_flag`
    pub fn has_d_max(&self) -> bool {
        self.d_max.is_some()
    }

    /// Disparity reference view with the legacy default of 0 when not coded.
    pub fn disparity_reference_view_or_default(&self) -> u32 {
        self.disparity_reference_view.unwrap_or_default()
    }

    fn bounds(&self) -> [Option<f64>; 4] {
        [self.z_near, self.z_far, self.d_min, self.d_max]
    }

    fn reference_view_to_mux(&self) -> Option<u32> {
        (self.has_d_min() || self.has_d_max()).then(|| self.disparity_reference_view_or_default())
    }

    /// Writes the message bits, without payload alignment.
    ///
    /// Bounds are written with 32 bit mantissas. The curve of a non-uniform
    /// disparity message is not kept, so only an empty one can be written.
    pub fn mux(&self, bit_writer: &mut BitWriter) -> io::Result<()> {
        if let Some(model) = self.nonlinear_model.filter(|model| model.remaining_bits > 0) {
            return Err(io::Error::new(
                io::ErrorKind::InvalidInput,
                format!(
                    "non-uniform disparity curve of {} bits was not decoded and cannot be written",
                    model.remaining_bits
                ),
            ));
        }

        for bound in self.bounds() {
            bit_writer.write_bit(bound.is_some())?;
        }

        bit_writer.write_exp_golomb(self.depth_representation_type.code() as u64)?;

        if let Some(view) = self.reference_view_to_mux() {
            bit_writer.write_exp_golomb(view as u64)?;
        }

        for bound in self.bounds().into_iter().flatten() {
            DepthRepInfoElement::from_f64(bound, MUX_MANTISSA_LEN)?.mux(bit_writer)?;
        }

        Ok(())
    }

    /// Returns the number of bits [`Self::mux`] writes.
    pub fn bit_size(&self) -> u64 {
        4 + size_of_exp_golomb(self.depth_representation_type.code() as u64)
            + self
                .reference_view_to_mux()
                .map_or(0, |view| size_of_exp_golomb(view as u64))
            + self.bounds().iter().flatten().count() as u64 * (13 + MUX_MANTISSA_LEN as u64)
    }
}

/// Number of bits from the cursor position up to the last set bit of the
/// underlying data, 0 when that bit lies before the cursor.
fn bits_before_payload_alignment(bit_reader: &BitReader<'_>) -> u64 {
    let data = bit_reader.get_ref();
    let Some(index) = data.iter().rposition(|byte| *byte != 0) else {
        return 0;
    };

    let last_set_bit = index as u64 * 8 + 7 - data[index].trailing_zeros() as u64;
    last_set_bit.saturating_sub(bit_reader.bit_position())
}

/// Decodes a depth representation information message, see [`DepthRepresentationInfo::parse`].
pub fn decode_depth_rep_info(bit_reader: &mut BitReader<'_>) -> Result<DepthRepresentationInfo> {
    DepthRepresentationInfo::parse(bit_reader)
}

#[cfg(test)]
#[cfg_attr(all(test, coverage_nightly), coverage(off))]
mod tests {
    use super::*;

    fn mux(info: &DepthRepresentationInfo) -> Vec<u8> {
        let mut bit_writer = BitWriter::new();
        info.mux(&mut bit_writer).unwrap();
        assert_eq!(bit_writer.bit_len(), info.bit_size());
        bit_writer.finish().unwrap()
    }

    #[test]
    fn test_no_flags_uniform_inverse_z() {
        // flags 0000, ue(v) "1" -> 0
        let data = [0b0000_1000];
        let mut reader = BitReader::new(&data);
        let info = decode_depth_rep_info(&mut reader).unwrap();

        assert_eq!(info.version(), 1);
        assert!(!info.has_z_near());
        assert!(!info.has_z_far());
        assert!(!info.has_d_min());
        assert!(!info.has_d_max());
        assert_eq!(
            info.depth_representation_type,
            DepthRepresentationType::UniformInverseZ
        );
        assert_eq!(info.depth_representation_type.code(), 0);
        assert_eq!(info.disparity_reference_view, None);
        assert_eq!(info.disparity_reference_view_or_default(), 0);
        assert_eq!(info.nonlinear_model, None);
        assert_eq!(reader.bit_position(), 5);
    }

    #[test]
    fn test_disparity_bounds() {
        let data = [0x35, 0x1E, 0x78, 0xC8, 0x01, 0x03, 0xC5, 0xD0, 0x20];
        let mut reader = BitReader::new(&data);
        let info = DepthRepresentationInfo::parse(&mut reader).unwrap();

        insta::assert_debug_snapshot!(info, @r"
        DepthRepresentationInfo {
            depth_representation_type: UniformDisparity,
            disparity_reference_view: Some(
                0,
            ),
            z_near: None,
            z_far: None,
            d_min: Some(
                0.548828125,
            ),
            d_max: Some(
                2.181640625,
            ),
            nonlinear_model: None,
        }
        ");

        // payload_bit_equal_to_one and zero bits remain
        assert_eq!(reader.bit_position(), 58);
        assert_eq!(reader.read_bits(6).unwrap(), 0b100000);
    }

    #[test]
    fn test_invalid_representation_type() {
        // flags 0000, ue(v) "00101" -> 4
        let data = [0b0000_0010, 0b1000_0000];
        let mut reader = BitReader::new(&data);

        assert!(matches!(
            DepthRepresentationInfo::parse(&mut reader),
            Err(DecodeError::InvalidEnumValue {
                field: "depth_representation_type",
                value: 4
            })
        ));
    }

    #[test]
    fn test_malformed_uvlc() {
        // flags 0000 followed by nothing but zeros
        let data = [0u8; 6];
        let mut reader = BitReader::new(&data);

        assert!(matches!(
            DepthRepresentationInfo::parse(&mut reader),
            Err(DecodeError::MalformedUvlc("depth_representation_type"))
        ));

        // d_min set, type 1, reference view cut short
        let data = [0b0010_0100, 0b0000_0000];
        let mut reader = BitReader::new(&data);

        assert!(matches!(
            DepthRepresentationInfo::parse(&mut reader),
            Err(DecodeError::MalformedUvlc("disparity_ref_view_id"))
        ));
    }

    #[test]
    fn test_truncated_bound() {
        let data = [0x35, 0x1E, 0x78];
        let mut reader = BitReader::new(&data);

        assert!(matches!(
            DepthRepresentationInfo::parse(&mut reader),
            Err(DecodeError::TruncatedInput("da_mantissa"))
        ));
    }

    #[test]
    fn test_unspecified_bound() {
        let mut bit_writer = BitWriter::new();
        for flag in [true, false, false, false] {
            bit_writer.write_bit(flag).unwrap();
        }
        bit_writer.write_exp_golomb(2).unwrap();
        DepthRepInfoElement {
            sign: false,
            exponent: 127,
            mantissa_len: 1,
            mantissa: 0,
        }
        .mux(&mut bit_writer)
        .unwrap();
        let data = bit_writer.finish().unwrap();

        let mut reader = BitReader::new(&data);
        assert!(matches!(
            DepthRepresentationInfo::parse(&mut reader),
            Err(DecodeError::UnspecifiedValue)
        ));
    }

    #[test]
    fn test_nonuniform_disparity_reports_remaining_bits() {
        let info = DepthRepresentationInfo {
            d_max: Some(4.5),
            disparity_reference_view: Some(3),
            ..DepthRepresentationInfo::new(DepthRepresentationType::NonuniformDisparity)
        };

        let mut bit_writer = BitWriter::new();
        info.mux(&mut bit_writer).unwrap();
        // stand-in for the curve
        bit_writer.write_bits(0b1011_0110_1, 9).unwrap();
        // payload_bit_equal_to_one
        bit_writer.write_bit(true).unwrap();
        let consumed = info.bit_size();
        let data = bit_writer.finish().unwrap();

        let mut reader = BitReader::new(&data);
        let decoded = DepthRepresentationInfo::parse(&mut reader).unwrap();

        assert_eq!(reader.bit_position(), consumed);
        assert_eq!(
            decoded.nonlinear_model,
            Some(UnparsedNonlinearModel { remaining_bits: 9 })
        );
        assert_eq!(decoded.d_max, Some(4.5));
        assert_eq!(decoded.disparity_reference_view, Some(3));
    }

    #[test]
    fn test_nonuniform_disparity_without_curve() {
        let info = DepthRepresentationInfo::new(DepthRepresentationType::NonuniformDisparity);
        assert_eq!(
            info.nonlinear_model,
            Some(UnparsedNonlinearModel { remaining_bits: 0 })
        );

        // flags 0000, ue(v) "00100" -> 3, then payload alignment
        let data = [0b0000_0010, 0b0100_0000];
        let mut reader = BitReader::new(&data);
        let decoded = DepthRepresentationInfo::parse(&mut reader).unwrap();

        assert_eq!(reader.bit_position(), 9);
        assert_eq!(decoded, info);

        let mut bit_writer = BitWriter::new();
        info.mux(&mut bit_writer).unwrap();
        assert_eq!(bit_writer.bit_len(), info.bit_size());

        let undecoded = DepthRepresentationInfo {
            nonlinear_model: Some(UnparsedNonlinearModel { remaining_bits: 12 }),
            ..info
        };
        let mut bit_writer = BitWriter::new();
        assert!(undecoded.mux(&mut bit_writer).is_err());
    }

    #[test]
    fn test_mux_round_trip_all_flag_combinations() {
        let values = [0.25, -3.75, 1234.5678, 1e-6];

        for flags in 0..16u8 {
            for ty in 0..4u64 {
                let pick = |bit: u8, value: f64| (flags & (1 << bit) != 0).then_some(value);
                let mut info =
                    DepthRepresentationInfo::new(DepthRepresentationType::try_from(ty).unwrap());
                info.z_near = pick(3, values[0]);
                info.z_far = pick(2, values[1]);
                info.d_min = pick(1, values[2]);
                info.d_max = pick(0, values[3]);
                if info.has_d_min() || info.has_d_max() {
                    info.disparity_reference_view = Some(flags as u32 * 7);
                }

                let data = mux(&info);
                let mut reader = BitReader::new(&data);
                let decoded = DepthRepresentationInfo::parse(&mut reader).unwrap();

                assert_eq!(reader.bit_position(), info.bit_size());
                assert_eq!(decoded.depth_representation_type, info.depth_representation_type);
                assert_eq!(decoded.disparity_reference_view, info.disparity_reference_view);
                assert_eq!(decoded.nonlinear_model, info.nonlinear_model);

                for (got, want) in decoded.bounds().into_iter().zip(info.bounds()) {
                    match (got, want) {
                        (Some(got), Some(want)) => {
                            assert!((got - want).abs() <= want.abs() * 2f64.powi(-32))
                        }
                        (None, None) => {}
                        other => panic!("flag mismatch for flags {flags:04b}: {other:?}"),
                    }
                }
            }
        }
    }
}
