//! Run-length decoders for ORC integer, byte and boolean streams
//!
//! ORC stores integers in one of two RLE flavors; which one a column uses
//! is implied by its encoding kind (DIRECT/DICTIONARY use v1, the `_V2`
//! kinds use v2). Byte streams and the boolean present bits have their own
//! simpler run-length scheme.
//!
//! All decoders share the same contract: `next(values, not_null)` fills
//! exactly one slot per output element, but only slots marked present
//! consume a value from the stream; `skip(n)` discards `n` values; `seek`
//! repositions the underlying stream and then consumes one extra position
//! naming how many values (or bits) to discard inside the run.

mod byte;
mod v1;
mod v2;

pub use byte::{BooleanRleDecoder, ByteRleDecoder};
pub use v1::RleV1Decoder;
pub use v2::RleV2Decoder;

use crate::error::Result;
use crate::stream::{PositionProvider, SeekableStream};
use crate::stripe::ColumnEncodingKind;

/// The two RLE flavors used by integer streams.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RleVersion {
    V1,
    V2,
}

impl RleVersion {
    /// The RLE version implied by a column encoding kind.
    pub fn for_encoding(kind: ColumnEncodingKind) -> Self {
        match kind {
            ColumnEncodingKind::Direct | ColumnEncodingKind::Dictionary => RleVersion::V1,
            ColumnEncodingKind::DirectV2 | ColumnEncodingKind::DictionaryV2 => RleVersion::V2,
        }
    }
}

/// A run-length decoder producing 64-bit integers.
pub trait IntegerRleDecoder: Send {
    /// Decode one value into every slot of `values` whose `not_null` byte
    /// is set (or every slot when no mask is given). Null slots are left
    /// untouched.
    fn next(&mut self, values: &mut [i64], not_null: Option<&[u8]>) -> Result<()>;

    /// Discard the next `num_values` values.
    fn skip(&mut self, num_values: u64) -> Result<()>;

    /// Reposition from recorded row-group positions.
    fn seek(&mut self, position: &mut PositionProvider) -> Result<()>;
}

/// Create an integer RLE decoder of the requested version.
pub fn create_rle_decoder(
    stream: Box<dyn SeekableStream>,
    signed: bool,
    version: RleVersion,
) -> Box<dyn IntegerRleDecoder> {
    match version {
        RleVersion::V1 => Box::new(RleV1Decoder::new(stream, signed)),
        RleVersion::V2 => Box::new(RleV2Decoder::new(stream, signed)),
    }
}

/// Create a byte RLE decoder.
pub fn create_byte_rle_decoder(stream: Box<dyn SeekableStream>) -> ByteRleDecoder {
    ByteRleDecoder::new(stream)
}

/// Create a boolean RLE decoder over a byte RLE bit stream.
pub fn create_boolean_rle_decoder(stream: Box<dyn SeekableStream>) -> BooleanRleDecoder {
    BooleanRleDecoder::new(stream)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version_for_encoding() {
        assert_eq!(
            RleVersion::for_encoding(ColumnEncodingKind::Direct),
            RleVersion::V1
        );
        assert_eq!(
            RleVersion::for_encoding(ColumnEncodingKind::Dictionary),
            RleVersion::V1
        );
        assert_eq!(
            RleVersion::for_encoding(ColumnEncodingKind::DirectV2),
            RleVersion::V2
        );
        assert_eq!(
            RleVersion::for_encoding(ColumnEncodingKind::DictionaryV2),
            RleVersion::V2
        );
    }
}
