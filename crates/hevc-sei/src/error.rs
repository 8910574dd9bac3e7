use std::{fmt, io};

/// Features of the SEI syntax that are recognised but not decoded.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Unsupported {
    /// `payload_type` coded with one or more `0xFF` extension bytes (type ≥ 255).
    MultiBytePayloadType,
    /// `payload_size` coded with one or more `0xFF` extension bytes (size ≥ 255).
    MultiBytePayloadSize,
}

impl fmt::Display for Unsupported {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Unsupported::MultiBytePayloadType => write!(f, "multi-byte sei payload type"),
            Unsupported::MultiBytePayloadSize => write!(f, "multi-byte sei payload size"),
        }
    }
}

/// Errors that can occur when decoding an auxiliary SEI array.
#[derive(Debug, thiserror::Error)]
pub enum DecodeError {
    /// Fewer bytes or bits were available than a field requires.
    #[error("truncated input while reading {0}")]
    TruncatedInput(&'static str),
    /// The SEI array length prefix is larger than the buffer behind it.
    #[error("sei array length {declared} exceeds the {available} bytes available")]
    LengthOutOfRange {
        /// Length read from the prefix.
        declared: u32,
        /// Bytes following the prefix.
        available: usize,
    },
    /// A NAL unit claims more bytes than remain in the array.
    #[error("nal unit at offset {offset} claims {declared} bytes, {available} available")]
    TruncatedNal {
        /// Byte offset of the NAL size field in the input.
        offset: usize,
        /// NAL size read from the stream.
        declared: u32,
        /// Bytes actually left for the NAL unit.
        available: usize,
    },
    /// An exp-Golomb code could not be decoded.
    #[error("malformed exp-golomb code for {0}")]
    MalformedUvlc(&'static str),
    /// A decoded integer has no meaning for the field it belongs to.
    #[error("invalid value {value} for {field}")]
    InvalidEnumValue {
        /// Name of the syntax element.
        field: &'static str,
        /// Decoded value.
        value: u64,
    },
    /// The stream uses a syntax feature that is not decoded.
    #[error("unsupported feature: {0}")]
    UnsupportedFeature(Unsupported),
    /// A depth representation element carries the reserved exponent 127.
    #[error("depth representation element has an unspecified value (exponent 127)")]
    UnspecifiedValue,
    /// Any other io error from the bit cursor.
    #[error("io error: {0}")]
    Io(#[from] io::Error),
}

/// Result type for SEI decoding operations
pub type Result<T> = std::result::Result<T, DecodeError>;

/// Attaches the name of the syntax element being read to a cursor error.
pub(crate) trait ReadContext<T> {
    /// Maps end of data to [`DecodeError::TruncatedInput`].
    fn or_truncated(self, field: &'static str) -> Result<T>;

    /// Maps any exp-Golomb failure to [`DecodeError::MalformedUvlc`].
    fn or_malformed_uvlc(self, field: &'static str) -> Result<T>;
}

impl<T> ReadContext<T> for io::Result<T> {
    fn or_truncated(self, field: &'static str) -> Result<T> {
        self.map_err(|err| match err.kind() {
            io::ErrorKind::UnexpectedEof => DecodeError::TruncatedInput(field),
            _ => DecodeError::Io(err),
        })
    }

    fn or_malformed_uvlc(self, field: &'static str) -> Result<T> {
        self.map_err(|_| DecodeError::MalformedUvlc(field))
    }
}
