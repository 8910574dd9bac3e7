use std::io;

/// A writer that packs individual bits into a growing byte buffer
#[derive(Debug, Default, Clone)]
#[must_use]
pub struct BitWriter {
    data: Vec<u8>,
    bit_len: u64,
}

impl BitWriter {
    /// Creates an empty BitWriter
    pub const fn new() -> Self {
        Self {
            data: Vec::new(),
            bit_len: 0,
        }
    }

    /// Writes a single bit to the buffer
    pub fn write_bit(&mut self, bit: bool) -> io::Result<()> {
        if self.is_aligned() {
            self.data.push(0);
        }

        if bit {
            let last = self.data.len() - 1;
            self.data[last] |= 1 << (7 - self.bit_pos());
        }

        self.bit_len += 1;

        Ok(())
    }

    /// Writes the low `count` bits of `bits` (the most significant bit is
    /// written first)
    pub fn write_bits(&mut self, bits: u64, count: u8) -> io::Result<()> {
        if count > 64 {
            return Err(io::Error::new(
                io::ErrorKind::InvalidInput,
                format!("cannot write {count} bits from a u64"),
            ));
        }

        if count != 64 && bits > (1 << count as u64) - 1 {
            return Err(io::Error::new(
                io::ErrorKind::InvalidData,
                format!("{bits} does not fit in {count} bits"),
            ));
        }

        for i in (0..count).rev() {
            self.write_bit((bits >> i) & 1 == 1)?;
        }

        Ok(())
    }

    /// Pads with zero bits up to the next byte boundary
    pub fn align(&mut self) -> io::Result<()> {
        if !self.is_aligned() {
            self.write_bits(0, 8 - self.bit_pos())?;
        }

        Ok(())
    }

    /// Aligns the writer and returns the written bytes
    pub fn finish(mut self) -> io::Result<Vec<u8>> {
        self.align()?;
        Ok(self.data)
    }

    /// Returns the number of bits written so far
    #[inline(always)]
    #[must_use]
    pub const fn bit_len(&self) -> u64 {
        self.bit_len
    }

    /// Returns the current bit position inside the last byte (0-7)
    #[inline(always)]
    #[must_use]
    pub const fn bit_pos(&self) -> u8 {
        (self.bit_len % 8) as u8
    }

    /// Checks if the writer is aligned to the byte boundary
    #[inline(always)]
    #[must_use]
    pub const fn is_aligned(&self) -> bool {
        self.bit_len % 8 == 0
    }

    /// Returns the bytes written so far, the last one possibly partial
    #[inline(always)]
    #[must_use]
    pub fn get_ref(&self) -> &[u8] {
        &self.data
    }
}

impl io::Write for BitWriter {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        if self.is_aligned() {
            self.data.extend_from_slice(buf);
            self.bit_len += buf.len() as u64 * 8;
            return Ok(buf.len());
        }

        for byte in buf {
            self.write_bits(*byte as u64, 8)?;
        }

        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}
