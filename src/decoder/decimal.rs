//! Decoders for the three decimal vintages
//!
//! The v1 layout stores each value as a zig-zag varint in DATA with its
//! scale in SECONDARY; the decoder rescales every value to the column's
//! declared scale before storing it. Values that need more than 64 bits
//! use the same framing with an `i128` accumulator. Hive 0.11 files carry
//! no declared precision or scale at all: the scale is forced stripe-wide
//! by the reader, and values beyond 38 digits are either an error or are
//! demoted to null, per policy. The v2 layout is plain RLE v2 longs
//! already at the declared scale.

use std::sync::Arc;

use crate::decoder::{required_stream, ColumnDecoder, PresentReader, MAX_PRECISION_64};
use crate::error::{ParseError, Result};
use crate::rle::{create_rle_decoder, IntegerRleDecoder, RleVersion};
use crate::schema::OrcType;
use crate::stream::{PositionMap, StreamCursor};
use crate::stripe::{StreamKind, StripeStreams, WarningSink};
use crate::vector::ColumnVectorBatch;

const POWERS_OF_TEN: [i64; 19] = [
    1,
    10,
    100,
    1_000,
    10_000,
    100_000,
    1_000_000,
    10_000_000,
    100_000_000,
    1_000_000_000,
    10_000_000_000,
    100_000_000_000,
    1_000_000_000_000,
    10_000_000_000_000,
    100_000_000_000_000,
    1_000_000_000_000_000,
    10_000_000_000_000_000,
    100_000_000_000_000_000,
    1_000_000_000_000_000_000,
];

/// +/- 99999999999999999999999999999999999999, the Hive 0.11 value range.
const HIVE11_MAX: i128 = 99_999_999_999_999_999_999_999_999_999_999_999_999;

/// Undo zig-zag over 128 bits.
#[inline]
fn unzigzag_i128(value: u128) -> i128 {
    ((value >> 1) as i128) ^ -((value & 1) as i128)
}

/// Rescale a 128-bit value in chunks of at most 10^18, wrapping on
/// overflow the way the 64-bit chunked arithmetic does.
fn scale_i128(mut value: i128, scale: u32, mut current: u32) -> i128 {
    while scale > current {
        let adjust = MAX_PRECISION_64.min(scale - current);
        value = value.wrapping_mul(POWERS_OF_TEN[adjust as usize] as i128);
        current += adjust;
    }
    while current > scale {
        let adjust = MAX_PRECISION_64.min(current - scale);
        value /= POWERS_OF_TEN[adjust as usize] as i128;
        current -= adjust;
    }
    value
}

/// Checked variant of [`scale_i128`]; `None` means overflow.
fn scale_i128_checked(mut value: i128, scale: u32, mut current: u32) -> Option<i128> {
    while scale > current {
        let adjust = MAX_PRECISION_64.min(scale - current);
        value = value.checked_mul(POWERS_OF_TEN[adjust as usize] as i128)?;
        current += adjust;
    }
    while current > scale {
        let adjust = MAX_PRECISION_64.min(current - scale);
        value /= POWERS_OF_TEN[adjust as usize] as i128;
        current -= adjust;
    }
    Some(value)
}

/// Decoder for decimals with precision 1..=18 in the varint layout.
pub struct Decimal64ColumnDecoder {
    present: PresentReader,
    cursor: StreamCursor,
    scales: Box<dyn IntegerRleDecoder>,
    precision: i32,
    scale: i32,
}

impl Decimal64ColumnDecoder {
    pub fn new(ty: &OrcType, stripe: &dyn StripeStreams) -> Result<Self> {
        let present = PresentReader::new(ty, stripe)?;
        let version = RleVersion::for_encoding(stripe.encoding(ty.column_id())?.kind);
        let data = required_stream(stripe, ty.column_id(), StreamKind::Data, "Decimal64")?;
        let secondary =
            required_stream(stripe, ty.column_id(), StreamKind::Secondary, "Decimal64")?;
        Ok(Decimal64ColumnDecoder {
            present,
            cursor: StreamCursor::new(data),
            scales: create_rle_decoder(secondary, true, version),
            precision: ty.precision() as i32,
            scale: ty.scale() as i32,
        })
    }

    /// Read one varint value and rescale it from `current_scale` to the
    /// column scale. A single-step adjustment beyond 18 digits cannot be
    /// represented and is a parse error.
    fn read_int64(cursor: &mut StreamCursor, scale: i32, current_scale: i32) -> Result<i64> {
        let mut value: u64 = 0;
        let mut offset: u32 = 0;
        loop {
            let byte = cursor.read_u8()?;
            if offset < 64 {
                value |= ((byte & 0x7F) as u64) << offset;
            } else {
                return Err(ParseError::InvalidVarint(cursor.name()).into());
            }
            offset += 7;
            if byte & 0x80 == 0 {
                break;
            }
        }
        let mut value = crate::stream::unzigzag(value);
        if scale > current_scale && (scale - current_scale) as u32 <= MAX_PRECISION_64 {
            value = value.wrapping_mul(POWERS_OF_TEN[(scale - current_scale) as usize]);
        } else if scale < current_scale && (current_scale - scale) as u32 <= MAX_PRECISION_64 {
            value /= POWERS_OF_TEN[(current_scale - scale) as usize];
        } else if scale != current_scale {
            return Err(ParseError::ScaleOutOfRange(format!(
                "cannot adjust scale {} to {} in {}",
                current_scale,
                scale,
                cursor.name()
            ))
            .into());
        }
        Ok(value)
    }

    /// Advance past `count` varints by counting terminator bytes.
    fn skip_varints(cursor: &mut StreamCursor, count: u64) -> Result<()> {
        let mut skipped = 0;
        while skipped < count {
            if cursor.read_u8()? & 0x80 == 0 {
                skipped += 1;
            }
        }
        Ok(())
    }
}

impl ColumnDecoder for Decimal64ColumnDecoder {
    fn next(
        &mut self,
        batch: &mut ColumnVectorBatch,
        num_values: u64,
        incoming_mask: Option<&[u8]>,
    ) -> Result<()> {
        let n = num_values as usize;
        if n > batch.base().capacity {
            batch.resize(n);
        }
        self.present.read_mask(batch.base_mut(), num_values, incoming_mask)?;
        let b = batch.as_decimal64_mut()?;
        {
            let mask = if b.base.has_nulls {
                Some(&b.base.not_null[..n])
            } else {
                None
            };
            self.scales.next(&mut b.read_scales[..n], mask)?;
        }
        b.precision = self.precision;
        b.scale = self.scale;
        for i in 0..n {
            if b.base.has_nulls && b.base.not_null[i] == 0 {
                continue;
            }
            b.values[i] =
                Self::read_int64(&mut self.cursor, self.scale, b.read_scales[i] as i32)?;
        }
        Ok(())
    }

    fn skip(&mut self, num_values: u64) -> Result<u64> {
        let non_null = self.present.skip(num_values)?;
        Self::skip_varints(&mut self.cursor, non_null)?;
        self.scales.skip(non_null)?;
        Ok(non_null)
    }

    fn seek_to_row_group(&mut self, positions: &mut PositionMap) -> Result<()> {
        self.present.seek(positions)?;
        self.cursor.seek(positions.position(self.present.column_id())?)?;
        self.scales
            .seek(positions.position(self.present.column_id())?)
    }
}

/// Read one 128-bit zig-zag varint and rescale it.
fn read_int128(cursor: &mut StreamCursor, scale: u32, current_scale: u32) -> Result<i128> {
    let mut value: u128 = 0;
    let mut offset: u32 = 0;
    loop {
        let byte = cursor.read_u8()?;
        if offset >= 128 {
            return Err(ParseError::InvalidVarint(cursor.name()).into());
        }
        value |= ((byte & 0x7F) as u128) << offset;
        offset += 7;
        if byte & 0x80 == 0 {
            break;
        }
    }
    Ok(scale_i128(unzigzag_i128(value), scale, current_scale))
}

/// Decoder for decimals with precision 19..=38 in the varint layout.
pub struct Decimal128ColumnDecoder {
    present: PresentReader,
    cursor: StreamCursor,
    scales: Box<dyn IntegerRleDecoder>,
    precision: i32,
    scale: i32,
}

impl Decimal128ColumnDecoder {
    pub fn new(ty: &OrcType, stripe: &dyn StripeStreams) -> Result<Self> {
        let present = PresentReader::new(ty, stripe)?;
        let version = RleVersion::for_encoding(stripe.encoding(ty.column_id())?.kind);
        let data = required_stream(stripe, ty.column_id(), StreamKind::Data, "Decimal128")?;
        let secondary =
            required_stream(stripe, ty.column_id(), StreamKind::Secondary, "Decimal128")?;
        Ok(Decimal128ColumnDecoder {
            present,
            cursor: StreamCursor::new(data),
            scales: create_rle_decoder(secondary, true, version),
            precision: ty.precision() as i32,
            scale: ty.scale() as i32,
        })
    }
}

impl ColumnDecoder for Decimal128ColumnDecoder {
    fn next(
        &mut self,
        batch: &mut ColumnVectorBatch,
        num_values: u64,
        incoming_mask: Option<&[u8]>,
    ) -> Result<()> {
        let n = num_values as usize;
        if n > batch.base().capacity {
            batch.resize(n);
        }
        self.present.read_mask(batch.base_mut(), num_values, incoming_mask)?;
        let b = batch.as_decimal128_mut()?;
        {
            let mask = if b.base.has_nulls {
                Some(&b.base.not_null[..n])
            } else {
                None
            };
            self.scales.next(&mut b.read_scales[..n], mask)?;
        }
        b.precision = self.precision;
        b.scale = self.scale;
        for i in 0..n {
            if b.base.has_nulls && b.base.not_null[i] == 0 {
                continue;
            }
            b.values[i] = read_int128(
                &mut self.cursor,
                self.scale as u32,
                b.read_scales[i] as u32,
            )?;
        }
        Ok(())
    }

    fn skip(&mut self, num_values: u64) -> Result<u64> {
        let non_null = self.present.skip(num_values)?;
        Decimal64ColumnDecoder::skip_varints(&mut self.cursor, non_null)?;
        self.scales.skip(non_null)?;
        Ok(non_null)
    }

    fn seek_to_row_group(&mut self, positions: &mut PositionMap) -> Result<()> {
        self.present.seek(positions)?;
        self.cursor.seek(positions.position(self.present.column_id())?)?;
        self.scales
            .seek(positions.position(self.present.column_id())?)
    }
}

/// Decoder for Hive 0.11 decimal columns.
///
/// The stripe forces a scale onto every value; precision is whatever the
/// (precision-less) type says. Overflow past 38 digits is detected while
/// the varint is read — the stream is still drained so later rows stay
/// aligned — and again by a final range check.
pub struct DecimalHive11ColumnDecoder {
    present: PresentReader,
    cursor: StreamCursor,
    scales: Box<dyn IntegerRleDecoder>,
    precision: i32,
    scale: i32,
    throw_on_overflow: bool,
    warnings: Arc<dyn WarningSink>,
}

impl DecimalHive11ColumnDecoder {
    pub fn new(ty: &OrcType, stripe: &dyn StripeStreams) -> Result<Self> {
        let present = PresentReader::new(ty, stripe)?;
        let version = RleVersion::for_encoding(stripe.encoding(ty.column_id())?.kind);
        let data = required_stream(stripe, ty.column_id(), StreamKind::Data, "DecimalHive11")?;
        let secondary =
            required_stream(stripe, ty.column_id(), StreamKind::Secondary, "DecimalHive11")?;
        Ok(DecimalHive11ColumnDecoder {
            present,
            cursor: StreamCursor::new(data),
            scales: create_rle_decoder(secondary, true, version),
            precision: ty.precision() as i32,
            scale: stripe.forced_scale_on_hive11_decimal(),
            throw_on_overflow: stripe.throw_on_hive11_decimal_overflow(),
            warnings: stripe.warning_sink(),
        })
    }

    /// Read one value; `None` means it overflowed 38 digits. The stream
    /// is always drained to the varint terminator.
    fn read_checked(&mut self, current_scale: i32) -> Result<Option<i128>> {
        let mut value: u128 = 0;
        let mut offset: u32 = 0;
        let mut fits = true;
        loop {
            let byte = self.cursor.read_u8()?;
            let work = (byte & 0x7F) as u128;
            // flag values that ran past 128 bits but keep consuming bytes
            // so the stream stays aligned
            if offset > 128 || (offset == 126 && work > 3) {
                fits = false;
            }
            if fits {
                value |= work << offset;
            }
            offset += 7;
            if byte & 0x80 == 0 {
                break;
            }
        }
        if !fits {
            return Ok(None);
        }
        let value = unzigzag_i128(value);
        let Some(scaled) = scale_i128_checked(value, self.scale as u32, current_scale as u32)
        else {
            return Ok(None);
        };
        if scaled < -HIVE11_MAX || scaled > HIVE11_MAX {
            return Ok(None);
        }
        Ok(Some(scaled))
    }
}

impl ColumnDecoder for DecimalHive11ColumnDecoder {
    fn next(
        &mut self,
        batch: &mut ColumnVectorBatch,
        num_values: u64,
        incoming_mask: Option<&[u8]>,
    ) -> Result<()> {
        let n = num_values as usize;
        if n > batch.base().capacity {
            batch.resize(n);
        }
        self.present.read_mask(batch.base_mut(), num_values, incoming_mask)?;
        let b = batch.as_decimal128_mut()?;
        {
            let mask = if b.base.has_nulls {
                Some(&b.base.not_null[..n])
            } else {
                None
            };
            self.scales.next(&mut b.read_scales[..n], mask)?;
        }
        b.precision = self.precision;
        b.scale = self.scale;
        for i in 0..n {
            if b.base.has_nulls && b.base.not_null[i] == 0 {
                continue;
            }
            match self.read_checked(b.read_scales[i] as i32)? {
                Some(value) => b.values[i] = value,
                None => {
                    if self.throw_on_overflow {
                        return Err(ParseError::DecimalOverflow(
                            "Hive 0.11 decimal was more than 38 digits".to_string(),
                        )
                        .into());
                    }
                    self.warnings
                        .warn("Hive 0.11 decimal with more than 38 digits replaced by NULL");
                    b.base.not_null[i] = 0;
                    b.base.has_nulls = true;
                }
            }
        }
        Ok(())
    }

    fn skip(&mut self, num_values: u64) -> Result<u64> {
        let non_null = self.present.skip(num_values)?;
        Decimal64ColumnDecoder::skip_varints(&mut self.cursor, non_null)?;
        self.scales.skip(non_null)?;
        Ok(non_null)
    }

    fn seek_to_row_group(&mut self, positions: &mut PositionMap) -> Result<()> {
        self.present.seek(positions)?;
        self.cursor.seek(positions.position(self.present.column_id())?)?;
        self.scales
            .seek(positions.position(self.present.column_id())?)
    }
}

/// Decoder for the DIRECT_V2 decimal-as-long layout: values arrive as
/// ordinary signed RLE v2 longs already at the declared scale.
pub struct Decimal64V2ColumnDecoder {
    present: PresentReader,
    values: Box<dyn IntegerRleDecoder>,
    precision: i32,
    scale: i32,
}

impl Decimal64V2ColumnDecoder {
    pub fn new(ty: &OrcType, stripe: &dyn StripeStreams) -> Result<Self> {
        let present = PresentReader::new(ty, stripe)?;
        let data = required_stream(stripe, ty.column_id(), StreamKind::Data, "Decimal64V2")?;
        Ok(Decimal64V2ColumnDecoder {
            present,
            values: create_rle_decoder(data, true, RleVersion::V2),
            precision: ty.precision() as i32,
            scale: ty.scale() as i32,
        })
    }
}

impl ColumnDecoder for Decimal64V2ColumnDecoder {
    fn next(
        &mut self,
        batch: &mut ColumnVectorBatch,
        num_values: u64,
        incoming_mask: Option<&[u8]>,
    ) -> Result<()> {
        let n = num_values as usize;
        if n > batch.base().capacity {
            batch.resize(n);
        }
        self.present.read_mask(batch.base_mut(), num_values, incoming_mask)?;
        let b = batch.as_decimal64_mut()?;
        {
            let mask = if b.base.has_nulls {
                Some(&b.base.not_null[..n])
            } else {
                None
            };
            self.values.next(&mut b.values[..n], mask)?;
        }
        b.precision = self.precision;
        b.scale = self.scale;
        Ok(())
    }

    fn skip(&mut self, num_values: u64) -> Result<u64> {
        let non_null = self.present.skip(num_values)?;
        self.values.skip(non_null)?;
        Ok(non_null)
    }

    fn seek_to_row_group(&mut self, positions: &mut PositionMap) -> Result<()> {
        self.present.seek(positions)?;
        self.values
            .seek(positions.position(self.present.column_id())?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unzigzag_i128() {
        assert_eq!(unzigzag_i128(0), 0);
        assert_eq!(unzigzag_i128(1), -1);
        assert_eq!(unzigzag_i128(2), 1);
        assert_eq!(unzigzag_i128(3), -2);
    }

    #[test]
    fn test_scale_i128() {
        assert_eq!(scale_i128(123, 3, 1), 12300);
        assert_eq!(scale_i128(12345, 1, 3), 123);
        assert_eq!(scale_i128(5, 20, 0), 500_000_000_000_000_000_000);
        assert_eq!(scale_i128(-7, 2, 0), -700);
    }

    #[test]
    fn test_scale_i128_checked_overflow() {
        assert_eq!(scale_i128_checked(123, 3, 1), Some(12300));
        assert!(scale_i128_checked(HIVE11_MAX, 19, 0).is_none());
    }

    #[test]
    fn test_hive11_range() {
        assert_eq!(HIVE11_MAX.to_string(), "9".repeat(38));
    }
}
