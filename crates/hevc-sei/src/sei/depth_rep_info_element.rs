use std::io;

use bytes_util::{BitReader, BitWriter};

use crate::error::{DecodeError, ReadContext, Result};

/// Exponent value whose element is unspecified.
pub const UNSPECIFIED_EXPONENT: u8 = 127;

/// Exponent bias of the normalized range.
const EXPONENT_BIAS: i32 = 31;

/// `depth_rep_info_element()`: the floating point encoding used for the
/// depth and disparity bounds.
///
/// Layout: `sign`(1) `exponent`(7) `mantissa_len_minus1`(5) `mantissa`(mantissa_len).
///
/// | exponent | value |
/// |----------|-------|
/// | 1..=126  | `2^(exponent-31) * (1 + mantissa / 2^mantissa_len)` |
/// | 0        | `2^-(30+mantissa_len) * mantissa` |
/// | 127      | unspecified |
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DepthRepInfoElement {
    /// `true` for negative values.
    pub sign: bool,
    /// 7 bit exponent.
    pub exponent: u8,
    /// Number of mantissa bits, always in 1..=32.
    pub mantissa_len: u8,
    /// Mantissa, `mantissa_len` bits wide.
    pub mantissa: u32,
}

impl DepthRepInfoElement {
    /// Reads one element (13 + `mantissa_len` bits).
    pub fn parse(bit_reader: &mut BitReader<'_>) -> Result<Self> {
        let start = bit_reader.bit_position();
        let element = Self::read_fields(bit_reader);
        if element.is_err() {
            bit_reader.seek_bits(start as i64 - bit_reader.bit_position() as i64)?;
        }

        element
    }

    fn read_fields(bit_reader: &mut BitReader<'_>) -> Result<Self> {
        let sign = bit_reader.read_bit().or_truncated("da_sign_flag")?;
        let exponent = bit_reader.read_bits(7).or_truncated("da_exponent")? as u8;
        // 5 bits can only describe 1..=32 so no range check is needed
        let mantissa_len = bit_reader
            .read_bits(5)
            .or_truncated("da_mantissa_len_minus1")? as u8
            + 1;
        let mantissa = bit_reader
            .read_bits(mantissa_len)
            .or_truncated("da_mantissa")? as u32;

        Ok(Self {
            sign,
            exponent,
            mantissa_len,
            mantissa,
        })
    }

    /// Returns the numeric value, `None` for the unspecified exponent 127.
    pub fn value(&self) -> Option<f64> {
        if self.exponent == UNSPECIFIED_EXPONENT {
            return None;
        }

        let mantissa = self.mantissa as f64;
        let len = self.mantissa_len as i32;

        let value = if self.exponent > 0 {
            2f64.powi(self.exponent as i32 - EXPONENT_BIAS) * (1.0 + mantissa / 2f64.powi(len))
        } else {
            2f64.powi(-(EXPONENT_BIAS - 1 + len)) * mantissa
        };

        Some(if self.sign { -value } else { value })
    }

    /// Encodes `value` with a mantissa of `mantissa_len` bits, rounding to nearest.
    ///
    /// Fails for non-finite values, magnitudes of `2^96` and above, and
    /// mantissa lengths outside 1..=32.
    pub fn from_f64(value: f64, mantissa_len: u8) -> io::Result<Self> {
        if !value.is_finite() {
            return Err(io::Error::new(
                io::ErrorKind::InvalidInput,
                format!("{value} cannot be encoded as a depth representation element"),
            ));
        }

        if !(1..=32).contains(&mantissa_len) {
            return Err(io::Error::new(
                io::ErrorKind::InvalidInput,
                format!("mantissa length {mantissa_len} is out of range [1, 32]"),
            ));
        }

        let sign = value < 0.0;
        let magnitude = value.abs();
        let scale = 2f64.powi(mantissa_len as i32);

        let mut exponent = exponent_of(magnitude);
        let mantissa = if exponent > 0 {
            let fraction = magnitude / 2f64.powi(exponent - EXPONENT_BIAS) - 1.0;
            (fraction * scale).round()
        } else {
            exponent = 0;
            (magnitude * 2f64.powi(EXPONENT_BIAS - 1 + mantissa_len as i32)).round()
        };

        // Rounding can carry into the next binade
        let mantissa = if mantissa >= scale {
            exponent += 1;
            0.0
        } else {
            mantissa
        };

        if exponent >= UNSPECIFIED_EXPONENT as i32 {
            return Err(io::Error::new(
                io::ErrorKind::InvalidInput,
                format!("{value} is too large for a depth representation element"),
            ));
        }

        Ok(Self {
            sign,
            exponent: exponent as u8,
            mantissa_len,
            mantissa: mantissa as u32,
        })
    }

    /// Writes the element.
    pub fn mux(&self, bit_writer: &mut BitWriter) -> io::Result<()> {
        bit_writer.write_bit(self.sign)?;
        bit_writer.write_bits(self.exponent as u64, 7)?;
        bit_writer.write_bits(self.mantissa_len as u64 - 1, 5)?;
        bit_writer.write_bits(self.mantissa as u64, self.mantissa_len)?;

        Ok(())
    }

    /// Returns the size of the element in bits.
    pub fn bit_size(&self) -> u64 {
        13 + self.mantissa_len as u64
    }
}

/// Biased exponent of the binade holding `magnitude`, 0 or less for the
/// denormal range.
fn exponent_of(magnitude: f64) -> i32 {
    if magnitude == 0.0 {
        return 0;
    }

    let mut exponent = magnitude.log2().floor() as i32;
    // log2 can be off by one ulp around powers of two
    if 2f64.powi(exponent) > magnitude {
        exponent -= 1;
    } else if 2f64.powi(exponent + 1) <= magnitude {
        exponent += 1;
    }

    exponent + EXPONENT_BIAS
}

/// Reads one `depth_rep_info_element()` and returns its value.
///
/// Fails with [`DecodeError::UnspecifiedValue`] for exponent 127.
pub fn decode_float_element(bit_reader: &mut BitReader<'_>) -> Result<f64> {
    DepthRepInfoElement::parse(bit_reader)?
        .value()
        .ok_or(DecodeError::UnspecifiedValue)
}
