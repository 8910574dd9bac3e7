use std::io;

/// A reader that reads individual bits from a borrowed byte slice.
///
/// The reader never mutates the slice. Every read either consumes exactly the
/// requested number of bits or fails with [`io::ErrorKind::UnexpectedEof`]
/// and leaves the position where it was.
#[derive(Debug, Clone)]
#[must_use]
pub struct BitReader<'a> {
    data: &'a [u8],
    bit_pos: u64,
}

impl<'a> BitReader<'a> {
    /// Create a new BitReader positioned at the first bit of `data`
    pub const fn new(data: &'a [u8]) -> Self {
        Self { data, bit_pos: 0 }
    }

    /// Reads a single bit
    pub fn read_bit(&mut self) -> io::Result<bool> {
        self.ensure_remaining(1)?;
        let bit = self.bit_at(self.bit_pos);
        self.bit_pos += 1;
        Ok(bit)
    }

    /// Reads `count` bits (at most 64) as an unsigned big-endian number.
    pub fn read_bits(&mut self, count: u8) -> io::Result<u64> {
        if count > 64 {
            return Err(io::Error::new(
                io::ErrorKind::InvalidInput,
                format!("cannot read {count} bits into a u64"),
            ));
        }

        self.ensure_remaining(count as u64)?;

        let mut bits = 0u64;
        for _ in 0..count {
            bits = (bits << 1) | self.bit_at(self.bit_pos) as u64;
            self.bit_pos += 1;
        }

        Ok(bits)
    }

    /// Reads a whole byte, aligned or not
    pub fn read_u8(&mut self) -> io::Result<u8> {
        Ok(self.read_bits(8)? as u8)
    }

    /// Skips `count` bits
    pub fn skip_bits(&mut self, count: u64) -> io::Result<()> {
        self.ensure_remaining(count)?;
        self.bit_pos += count;
        Ok(())
    }

    /// Seeks a number of bits forward or backward.
    /// Returns the new position in bits.
    pub fn seek_bits(&mut self, count: i64) -> io::Result<u64> {
        let target = self.bit_pos as i128 + count as i128;
        if target < 0 || target > self.bit_len() as i128 {
            return Err(io::Error::new(
                io::ErrorKind::UnexpectedEof,
                format!(
                    "seek by {count} bits from {} leaves the buffer of {} bits",
                    self.bit_pos,
                    self.bit_len()
                ),
            ));
        }

        self.bit_pos = target as u64;
        Ok(self.bit_pos)
    }

    /// Aligns the reader to the next byte boundary
    #[inline(always)]
    pub fn align(&mut self) {
        // Never moves past the end since the slice length is a whole number of bytes
        self.bit_pos = self.bit_pos.div_ceil(8) * 8;
    }

    /// Returns the bytes from the current byte position to the end.
    ///
    /// If the reader is not aligned the partially read byte is included.
    #[must_use]
    pub fn remaining_bytes(&self) -> &'a [u8] {
        &self.data[self.byte_position()..]
    }

    fn ensure_remaining(&self, count: u64) -> io::Result<()> {
        if count > self.remaining_bits() {
            return Err(io::Error::new(
                io::ErrorKind::UnexpectedEof,
                format!(
                    "need {count} bits at bit {}, only {} left",
                    self.bit_pos,
                    self.remaining_bits()
                ),
            ));
        }

        Ok(())
    }

    #[inline(always)]
    fn bit_at(&self, pos: u64) -> bool {
        let byte = self.data[(pos / 8) as usize];
        (byte >> (7 - (pos % 8))) & 1 == 1
    }
}

impl<'a> BitReader<'a> {
    /// Returns the underlying slice
    #[inline(always)]
    #[must_use]
    pub const fn get_ref(&self) -> &'a [u8] {
        self.data
    }

    /// Returns the total length of the underlying slice in bits
    #[inline(always)]
    #[must_use]
    pub const fn bit_len(&self) -> u64 {
        self.data.len() as u64 * 8
    }

    /// Returns the current position in bits from the start of the slice
    #[inline(always)]
    #[must_use]
    pub const fn bit_position(&self) -> u64 {
        self.bit_pos
    }

    /// Returns the index of the byte holding the next bit to be read
    #[inline(always)]
    #[must_use]
    pub const fn byte_position(&self) -> usize {
        (self.bit_pos / 8) as usize
    }

    /// Returns the number of bits that can still be read
    #[inline(always)]
    #[must_use]
    pub const fn remaining_bits(&self) -> u64 {
        self.bit_len() - self.bit_pos
    }

    /// Returns the current bit position inside the current byte (0-7)
    #[inline(always)]
    #[must_use]
    pub const fn bit_pos(&self) -> u8 {
        (self.bit_pos % 8) as u8
    }

    /// Checks if the reader is aligned to the byte boundary
    #[inline(always)]
    #[must_use]
    pub const fn is_aligned(&self) -> bool {
        self.bit_pos % 8 == 0
    }
}
