//! Error types for stripe decoding

use thiserror::Error;

/// Errors that can occur while building or parsing a schema
#[derive(Debug, Error)]
pub enum SchemaError {
    /// The type description could not be parsed
    #[error("Invalid type description: {0}")]
    InvalidType(String),
    /// The type name is not one of the known ORC types
    #[error("Unknown type: {0}")]
    UnknownType(String),
}

/// Errors that can occur while decompressing stream blocks
#[derive(Debug, Error)]
pub enum CodecError {
    /// Unsupported or disabled compression kind
    #[error("Unsupported compression: {0}")]
    UnsupportedCodec(String),
    /// The codec rejected the compressed payload
    #[error("Decompression error: {0}")]
    DecompressionError(String),
    /// The block framing itself is broken (truncated header, bad length)
    #[error("Corrupt compression block: {0}")]
    CorruptBlock(String),
}

/// Errors raised when the encoded column data violates the format.
///
/// Every variant carries enough context to name the offending stream or
/// column, since a parse error deep inside a stripe is useless without it.
#[derive(Debug, Error)]
pub enum ParseError {
    /// A required substream was absent from the stripe
    #[error("{0}")]
    MissingStream(String),
    /// A stream ended before the decoder got the bytes it needed
    #[error("Unexpected end of stream: {0}")]
    UnexpectedEof(String),
    /// A varint ran past the width of its accumulator
    #[error("Invalid varint encoding: {0}")]
    InvalidVarint(String),
    /// A length value that must be non-negative was negative
    #[error("Negative length: {0}")]
    NegativeLength(String),
    /// A dictionary entry index fell outside the dictionary
    #[error("Entry index out of range: {0}")]
    InvalidDictionaryIndex(String),
    /// The gap between stored and declared decimal scale is too large
    #[error("Decimal scale out of range: {0}")]
    ScaleOutOfRange(String),
    /// A decimal value exceeded the representable range
    #[error("Decimal overflow: {0}")]
    DecimalOverflow(String),
    /// The column encoding kind is not valid for this column type
    #[error("Unknown encoding: {0}")]
    UnknownEncoding(String),
    /// The supplied batch variant does not match the decoder
    #[error("Batch type mismatch: {0}")]
    TypeMismatch(String),
    /// No seek positions were registered for a column
    #[error("Missing seek positions for column {0}")]
    MissingPosition(u64),
    /// Catch-all for values that violate the format in some other way
    #[error("Invalid data: {0}")]
    InvalidData(String),
}

/// Top-level error type for the crate
#[derive(Debug, Error)]
pub enum OrcError {
    /// Format-level parse error
    #[error("Parse error: {0}")]
    Parse(#[from] ParseError),

    /// Schema error
    #[error("Schema error: {0}")]
    Schema(#[from] SchemaError),

    /// Codec error
    #[error("Codec error: {0}")]
    Codec(#[from] CodecError),

    /// A type or encoding combination the factory does not handle
    #[error("Not implemented: {0}")]
    Unsupported(String),

    /// A schema-evolution conversion would lose information
    #[error("Schema evolution overflow: {0}")]
    EvolutionOverflow(String),

    /// A timezone name could not be resolved
    #[error("Unknown timezone: {0}")]
    UnknownTimezone(String),
}

/// Result alias used throughout the crate
pub type Result<T> = std::result::Result<T, OrcError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_error_display() {
        let err = ParseError::MissingStream("DATA stream not found in Boolean column 3".into());
        assert_eq!(err.to_string(), "DATA stream not found in Boolean column 3");

        let err = ParseError::MissingPosition(7);
        assert!(err.to_string().contains("column 7"));
    }

    #[test]
    fn test_error_conversion() {
        let parse = ParseError::InvalidData("bad tag".into());
        let top: OrcError = parse.into();
        assert!(matches!(top, OrcError::Parse(_)));
        assert!(top.to_string().contains("bad tag"));
    }
}
