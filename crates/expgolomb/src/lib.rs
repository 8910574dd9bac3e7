//! A set of helper functions to encode and decode exponential-golomb values.
//!
//! This crate extends upon the [`BitReader`] and [`BitWriter`] from the
//! [`bytes-util`](bytes_util) crate to provide functionality
//! for reading and writing Exp-Golomb encoded numbers (`ue(v)` / `se(v)`).
//!
//! ```rust
//! # fn test() -> std::io::Result<()> {
//! use expgolomb::{BitReaderExpGolombExt, BitWriterExpGolombExt};
//! use bytes_util::{BitReader, BitWriter};
//!
//! let mut bit_writer = BitWriter::default();
//! bit_writer.write_exp_golomb(0)?;
//! bit_writer.write_exp_golomb(1)?;
//! bit_writer.write_exp_golomb(2)?;
//!
//! let data: Vec<u8> = bit_writer.finish()?;
//!
//! let mut bit_reader = BitReader::new(&data);
//!
//! let result = bit_reader.read_exp_golomb()?;
//! assert_eq!(result, 0);
//!
//! let result = bit_reader.read_exp_golomb()?;
//! assert_eq!(result, 1);
//!
//! let result = bit_reader.read_exp_golomb()?;
//! assert_eq!(result, 2);
//! # Ok(())
//! # }
//! # test().expect("failed to run test");
//! ```
//!
//! ## License
//!
//! This project is licensed under the [MIT](./LICENSE.MIT) or
//! [Apache-2.0](./LICENSE.Apache-2.0) license. You can choose between one of
//! them if you use this work.
//!
//! `SPDX-License-Identifier: MIT OR Apache-2.0`
#![cfg_attr(all(coverage_nightly, test), feature(coverage_attribute))]
#![deny(missing_docs)]
#![deny(unsafe_code)]

use std::io;

use bytes_util::{BitReader, BitWriter};

/// Longest prefix accepted by [`BitReaderExpGolombExt::read_exp_golomb`].
///
/// 32 leading zeros are enough for every value of a 32 bit `ue(v)` field.
pub const MAX_LEADING_ZEROS: u32 = 32;

/// Extension trait for reading Exp-Golomb encoded numbers from a bit reader
///
/// See: <https://en.wikipedia.org/wiki/Exponential-Golomb_coding>
///
/// - [`BitReader`]
pub trait BitReaderExpGolombExt {
    /// Reads an Exp-Golomb encoded number.
    ///
    /// Fails with [`io::ErrorKind::InvalidData`] if the prefix is longer than
    /// [`MAX_LEADING_ZEROS`] and with [`io::ErrorKind::UnexpectedEof`] if the
    /// code is cut short. The reader does not move on failure.
    fn read_exp_golomb(&mut self) -> io::Result<u64>;

    /// Reads a signed Exp-Golomb encoded number
    fn read_signed_exp_golomb(&mut self) -> io::Result<i64> {
        let exp_glob = self.read_exp_golomb()?;

        if exp_glob % 2 == 0 {
            Ok(-((exp_glob / 2) as i64))
        } else {
            Ok((exp_glob / 2) as i64 + 1)
        }
    }
}

impl BitReaderExpGolombExt for BitReader<'_> {
    fn read_exp_golomb(&mut self) -> io::Result<u64> {
        let start = self.bit_position();

        let result = read_code(self);
        if result.is_err() {
            let back = start as i64 - self.bit_position() as i64;
            self.seek_bits(back)?;
        }

        result
    }
}

fn read_code(reader: &mut BitReader<'_>) -> io::Result<u64> {
    let mut leading_zeros = 0;
    while !reader.read_bit()? {
        leading_zeros += 1;
        if leading_zeros > MAX_LEADING_ZEROS {
            return Err(io::Error::new(
                io::ErrorKind::InvalidData,
                format!("exp-golomb prefix longer than {MAX_LEADING_ZEROS} zeros"),
            ));
        }
    }

    let suffix = reader.read_bits(leading_zeros as u8)?;

    Ok((1u64 << leading_zeros) + suffix - 1)
}

/// Extension trait for writing Exp-Golomb encoded numbers to a bit writer
///
/// See: <https://en.wikipedia.org/wiki/Exponential-Golomb_coding>
///
/// - [`BitWriter`]
pub trait BitWriterExpGolombExt {
    /// Writes an Exp-Golomb encoded number
    fn write_exp_golomb(&mut self, input: u64) -> io::Result<()>;

    /// Writes a signed Exp-Golomb encoded number
    fn write_signed_exp_golomb(&mut self, number: i64) -> io::Result<()> {
        let number = if number <= 0 {
            -number as u64 * 2
        } else {
            number as u64 * 2 - 1
        };

        self.write_exp_golomb(number)
    }
}

impl BitWriterExpGolombExt for BitWriter {
    fn write_exp_golomb(&mut self, input: u64) -> io::Result<()> {
        let leading_zeros = (size_of_exp_golomb(input) / 2) as u8;
        if leading_zeros as u32 > MAX_LEADING_ZEROS {
            return Err(io::Error::new(
                io::ErrorKind::InvalidInput,
                format!("{input} needs more than {MAX_LEADING_ZEROS} leading zeros"),
            ));
        }

        self.write_bits(0, leading_zeros)?;
        self.write_bits(input + 1, leading_zeros + 1)?;

        Ok(())
    }
}

/// Returns the number of bits that a signed Exp-Golomb encoded number would take up.
///
/// See: <https://en.wikipedia.org/wiki/Exponential-Golomb_coding>
pub fn size_of_signed_exp_golomb(number: i64) -> u64 {
    let number = if number <= 0 {
        -number as u64 * 2
    } else {
        number as u64 * 2 - 1
    };

    size_of_exp_golomb(number)
}

/// Returns the number of bits that an Exp-Golomb encoded number would take up.
///
/// See: <https://en.wikipedia.org/wiki/Exponential-Golomb_coding>
pub fn size_of_exp_golomb(number: u64) -> u64 {
    let leading_zeros = 127 - (number as u128 + 1).leading_zeros() as u64;

    leading_zeros * 2 + 1
}
