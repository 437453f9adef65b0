//! The column decoders
//!
//! One decoder per column in the selected schema, built by [`build_decoder`]
//! and arranged in a tree isomorphic to the type tree. Per `next` call a
//! decoder establishes its null mask from its PRESENT stream and the
//! parent's mask, decodes payload values for the present rows, and recurses
//! into its children with the row count the composite semantics dictate.
//!
//! `skip` mirrors `next` without producing values, and `seek_to_row_group`
//! repositions every owned substream from recorded index positions.

mod decimal;
mod nested;
mod numeric;
mod string;
mod timestamp;

use std::sync::atomic::Ordering;
use std::sync::Arc;

use crate::error::{ParseError, Result};
use crate::rle::{create_boolean_rle_decoder, BooleanRleDecoder};
use crate::schema::{OrcType, TypeKind};
use crate::stream::{PositionMap, SeekableStream};
use crate::stripe::{ColumnEncodingKind, DecoderOptions, ReaderMetrics, StreamKind, StripeStreams};
use crate::vector::{BatchBase, ColumnVectorBatch};

pub use decimal::{
    Decimal128ColumnDecoder, Decimal64ColumnDecoder, Decimal64V2ColumnDecoder,
    DecimalHive11ColumnDecoder,
};
pub use nested::{ListColumnDecoder, MapColumnDecoder, StructColumnDecoder, UnionColumnDecoder};
pub use numeric::{
    BooleanColumnDecoder, ByteColumnDecoder, DoubleColumnDecoder, IntegerColumnDecoder,
};
pub use string::{StringDictionaryColumnDecoder, StringDirectColumnDecoder};
pub use timestamp::TimestampColumnDecoder;

/// Decodes one column of a stripe into vector batches.
pub trait ColumnDecoder: Send {
    /// Decode exactly `num_values` logical rows into `batch`.
    ///
    /// `incoming_mask` is the parent's null mask over the same rows; a row
    /// is present only if both the mask and this column's PRESENT stream
    /// say so.
    fn next(
        &mut self,
        batch: &mut ColumnVectorBatch,
        num_values: u64,
        incoming_mask: Option<&[u8]>,
    ) -> Result<()>;

    /// Like `next`, but dictionary-encoded string columns produce indices
    /// plus a shared dictionary handle instead of materialized bytes.
    fn next_encoded(
        &mut self,
        batch: &mut ColumnVectorBatch,
        num_values: u64,
        incoming_mask: Option<&[u8]>,
    ) -> Result<()> {
        self.next(batch, num_values, incoming_mask)
    }

    /// Advance past `num_values` rows, returning how many were non-null.
    fn skip(&mut self, num_values: u64) -> Result<u64>;

    /// Reposition every owned substream for a row-group jump.
    fn seek_to_row_group(&mut self, positions: &mut PositionMap) -> Result<()>;
}

impl std::fmt::Debug for dyn ColumnDecoder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("dyn ColumnDecoder")
    }
}

/// Shared PRESENT-stream handling embedded in every decoder.
pub(crate) struct PresentReader {
    column_id: u64,
    decoder: Option<BooleanRleDecoder>,
    metrics: Arc<ReaderMetrics>,
}

impl PresentReader {
    pub(crate) fn new(ty: &OrcType, stripe: &dyn StripeStreams) -> Result<Self> {
        let column_id = ty.column_id();
        let decoder = stripe
            .stream(column_id, StreamKind::Present)?
            .map(create_boolean_rle_decoder);
        Ok(PresentReader {
            column_id,
            decoder,
            metrics: stripe.metrics(),
        })
    }

    pub(crate) fn column_id(&self) -> u64 {
        self.column_id
    }

    /// Establish the batch's null mask for `num_values` rows.
    ///
    /// With a PRESENT stream the mask is its bits ANDed with the incoming
    /// mask; without one the incoming mask is copied verbatim; with
    /// neither, every row is present.
    pub(crate) fn read_mask(
        &mut self,
        base: &mut BatchBase,
        num_values: u64,
        incoming_mask: Option<&[u8]>,
    ) -> Result<()> {
        let n = num_values as usize;
        base.num_elements = n;
        self.metrics
            .values_decoded
            .fetch_add(num_values, Ordering::Relaxed);
        if let Some(decoder) = &mut self.decoder {
            decoder.next(&mut base.not_null[..n], incoming_mask)?;
            base.has_nulls = base.not_null[..n].iter().any(|&b| b == 0);
        } else if let Some(mask) = incoming_mask {
            base.not_null[..n].copy_from_slice(mask);
            base.has_nulls = true;
        } else {
            base.not_null[..n].fill(1);
            base.has_nulls = false;
        }
        Ok(())
    }

    /// Page through `num_values` mask bits, returning the non-null count.
    pub(crate) fn skip(&mut self, num_values: u64) -> Result<u64> {
        let Some(decoder) = &mut self.decoder else {
            return Ok(num_values);
        };
        const BUFFER_SIZE: usize = 32768;
        let mut buffer = [0u8; BUFFER_SIZE];
        let mut non_null = num_values;
        let mut remaining = num_values;
        while remaining > 0 {
            let chunk = (remaining as usize).min(BUFFER_SIZE);
            decoder.next(&mut buffer[..chunk], None)?;
            non_null -= buffer[..chunk].iter().filter(|&&b| b == 0).count() as u64;
            remaining -= chunk as u64;
        }
        Ok(non_null)
    }

    pub(crate) fn seek(&mut self, positions: &mut PositionMap) -> Result<()> {
        self.metrics.row_group_seeks.fetch_add(1, Ordering::Relaxed);
        if let Some(decoder) = &mut self.decoder {
            decoder.seek(positions.position(self.column_id)?)?;
        }
        Ok(())
    }
}

/// Fetch a stream that must exist for this column, in the manner of the
/// payload streams.
pub(crate) fn required_stream(
    stripe: &dyn StripeStreams,
    column_id: u64,
    kind: StreamKind,
    context: &str,
) -> Result<Box<dyn SeekableStream>> {
    stripe.stream(column_id, kind)?.ok_or_else(|| {
        ParseError::MissingStream(format!(
            "{} stream not found in {} column {}",
            kind, context, column_id
        ))
        .into()
    })
}

/// Largest precision a decimal can have and still fit in 64 bits.
pub(crate) const MAX_PRECISION_64: u32 = 18;

/// Build the decoder for a type node within a stripe.
///
/// Dispatches on the type kind, the column encoding, and the decimal
/// layout flags; delegates to a converting wrapper when the stripe's
/// schema evolution says this node is read as a different type.
pub fn build_decoder(
    ty: &OrcType,
    stripe: &dyn StripeStreams,
    options: &DecoderOptions,
) -> Result<Box<dyn ColumnDecoder>> {
    if options.convert_to_read_type {
        if let Some(evolution) = stripe.schema_evolution() {
            if evolution.needs_conversion(ty) {
                return crate::convert::build_converting_decoder(ty, stripe, options);
            }
        }
    }
    build_physical_decoder(ty, stripe, options)
}

/// Build the decoder for the file type, ignoring schema evolution.
pub(crate) fn build_physical_decoder(
    ty: &OrcType,
    stripe: &dyn StripeStreams,
    options: &DecoderOptions,
) -> Result<Box<dyn ColumnDecoder>> {
    match ty.kind() {
        TypeKind::Boolean => Ok(Box::new(BooleanColumnDecoder::new(ty, stripe)?)),
        TypeKind::Byte => Ok(Box::new(ByteColumnDecoder::new(ty, stripe)?)),
        TypeKind::Short | TypeKind::Int | TypeKind::Long | TypeKind::Date => {
            Ok(Box::new(IntegerColumnDecoder::new(ty, stripe)?))
        }
        TypeKind::Float => Ok(Box::new(DoubleColumnDecoder::new(ty, stripe, 4)?)),
        TypeKind::Double => Ok(Box::new(DoubleColumnDecoder::new(ty, stripe, 8)?)),
        TypeKind::Timestamp => Ok(Box::new(TimestampColumnDecoder::new(ty, stripe, false)?)),
        TypeKind::TimestampInstant => {
            Ok(Box::new(TimestampColumnDecoder::new(ty, stripe, true)?))
        }
        TypeKind::String
        | TypeKind::Binary
        | TypeKind::Char
        | TypeKind::Varchar
        | TypeKind::Geometry
        | TypeKind::Geography => {
            let encoding = stripe.encoding(ty.column_id())?;
            match encoding.kind {
                ColumnEncodingKind::Dictionary | ColumnEncodingKind::DictionaryV2 => Ok(Box::new(
                    StringDictionaryColumnDecoder::new(ty, stripe)?,
                )),
                ColumnEncodingKind::Direct | ColumnEncodingKind::DirectV2 => {
                    Ok(Box::new(StringDirectColumnDecoder::new(ty, stripe)?))
                }
            }
        }
        TypeKind::Decimal => {
            // precision 0 marks a Hive 0.11 file with no declared precision
            if ty.precision() == 0 {
                return Ok(Box::new(DecimalHive11ColumnDecoder::new(ty, stripe)?));
            }
            if ty.precision() <= MAX_PRECISION_64 {
                if stripe.decimal_as_long() {
                    return Ok(Box::new(Decimal64V2ColumnDecoder::new(ty, stripe)?));
                }
                return Ok(Box::new(Decimal64ColumnDecoder::new(ty, stripe)?));
            }
            Ok(Box::new(Decimal128ColumnDecoder::new(ty, stripe)?))
        }
        TypeKind::List => Ok(Box::new(ListColumnDecoder::new(ty, stripe, options)?)),
        TypeKind::Map => Ok(Box::new(MapColumnDecoder::new(ty, stripe, options)?)),
        TypeKind::Struct => Ok(Box::new(StructColumnDecoder::new(ty, stripe, options)?)),
        TypeKind::Union => Ok(Box::new(UnionColumnDecoder::new(ty, stripe, options)?)),
    }
}
