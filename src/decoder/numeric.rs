//! Decoders for boolean, byte, integer and floating-point columns

use crate::decoder::{required_stream, ColumnDecoder, PresentReader};
use crate::error::{ParseError, Result};
use crate::rle::{
    create_boolean_rle_decoder, create_byte_rle_decoder, create_rle_decoder, BooleanRleDecoder,
    ByteRleDecoder, IntegerRleDecoder, RleVersion,
};
use crate::schema::OrcType;
use crate::stream::{PositionMap, StreamCursor};
use crate::stripe::{StreamKind, StripeStreams};
use crate::vector::{BatchBase, ColumnVectorBatch, NumericVectorBatch};

/// Copy a byte scratch buffer into a (possibly wider) integer array,
/// sign-extending each value.
fn expand_bytes<T: Copy + From<i8>>(scratch: &[u8], data: &mut [T]) {
    for (slot, byte) in data.iter_mut().zip(scratch) {
        *slot = T::from(*byte as i8);
    }
}

fn payload_mask(base: &BatchBase, n: usize) -> Option<&[u8]> {
    if base.has_nulls {
        Some(&base.not_null[..n])
    } else {
        None
    }
}

/// Decoder for BOOLEAN columns: PRESENT + DATA in boolean RLE.
pub struct BooleanColumnDecoder {
    present: PresentReader,
    rle: BooleanRleDecoder,
    scratch: Vec<u8>,
}

impl BooleanColumnDecoder {
    pub fn new(ty: &OrcType, stripe: &dyn StripeStreams) -> Result<Self> {
        let present = PresentReader::new(ty, stripe)?;
        let stream = required_stream(stripe, ty.column_id(), StreamKind::Data, "Boolean")?;
        Ok(BooleanColumnDecoder {
            present,
            rle: create_boolean_rle_decoder(stream),
            scratch: Vec::new(),
        })
    }
}

impl ColumnDecoder for BooleanColumnDecoder {
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
        self.scratch.resize(n, 0);
        match batch {
            ColumnVectorBatch::Long(b) => {
                self.rle
                    .next(&mut self.scratch[..n], payload_mask(&b.base, n))?;
                expand_bytes(&self.scratch[..n], &mut b.data[..n]);
            }
            ColumnVectorBatch::Byte(b) => {
                self.rle
                    .next(&mut self.scratch[..n], payload_mask(&b.base, n))?;
                expand_bytes(&self.scratch[..n], &mut b.data[..n]);
            }
            _ => {
                return Err(ParseError::TypeMismatch(
                    "Boolean column expects a Long or Byte batch".to_string(),
                )
                .into())
            }
        }
        Ok(())
    }

    fn skip(&mut self, num_values: u64) -> Result<u64> {
        let non_null = self.present.skip(num_values)?;
        self.rle.skip(non_null)?;
        Ok(non_null)
    }

    fn seek_to_row_group(&mut self, positions: &mut PositionMap) -> Result<()> {
        self.present.seek(positions)?;
        self.rle.seek(positions.position(self.present.column_id())?)
    }
}

/// Decoder for BYTE (tinyint) columns: PRESENT + DATA in byte RLE.
pub struct ByteColumnDecoder {
    present: PresentReader,
    rle: ByteRleDecoder,
    scratch: Vec<u8>,
}

impl ByteColumnDecoder {
    pub fn new(ty: &OrcType, stripe: &dyn StripeStreams) -> Result<Self> {
        let present = PresentReader::new(ty, stripe)?;
        let stream = required_stream(stripe, ty.column_id(), StreamKind::Data, "Byte")?;
        Ok(ByteColumnDecoder {
            present,
            rle: create_byte_rle_decoder(stream),
            scratch: Vec::new(),
        })
    }
}

impl ColumnDecoder for ByteColumnDecoder {
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
        self.scratch.resize(n, 0);
        match batch {
            ColumnVectorBatch::Long(b) => {
                self.rle
                    .next(&mut self.scratch[..n], payload_mask(&b.base, n))?;
                expand_bytes(&self.scratch[..n], &mut b.data[..n]);
            }
            ColumnVectorBatch::Byte(b) => {
                self.rle
                    .next(&mut self.scratch[..n], payload_mask(&b.base, n))?;
                expand_bytes(&self.scratch[..n], &mut b.data[..n]);
            }
            _ => {
                return Err(ParseError::TypeMismatch(
                    "Byte column expects a Long or Byte batch".to_string(),
                )
                .into())
            }
        }
        Ok(())
    }

    fn skip(&mut self, num_values: u64) -> Result<u64> {
        let non_null = self.present.skip(num_values)?;
        self.rle.skip(non_null)?;
        Ok(non_null)
    }

    fn seek_to_row_group(&mut self, positions: &mut PositionMap) -> Result<()> {
        self.present.seek(positions)?;
        self.rle.seek(positions.position(self.present.column_id())?)
    }
}

/// Decoder for SHORT / INT / LONG / DATE columns: PRESENT + DATA in signed
/// integer RLE of the version the column encoding implies.
pub struct IntegerColumnDecoder {
    present: PresentReader,
    rle: Box<dyn IntegerRleDecoder>,
    scratch: Vec<i64>,
}

impl IntegerColumnDecoder {
    pub fn new(ty: &OrcType, stripe: &dyn StripeStreams) -> Result<Self> {
        let present = PresentReader::new(ty, stripe)?;
        let version = RleVersion::for_encoding(stripe.encoding(ty.column_id())?.kind);
        let stream = required_stream(stripe, ty.column_id(), StreamKind::Data, "Integer")?;
        Ok(IntegerColumnDecoder {
            present,
            rle: create_rle_decoder(stream, true, version),
            scratch: Vec::new(),
        })
    }

    fn decode_narrow<T: Copy>(
        scratch: &[i64],
        data: &mut NumericVectorBatch<T>,
        n: usize,
        cast: impl Fn(i64) -> T,
    ) {
        for (slot, value) in data.data[..n].iter_mut().zip(&scratch[..n]) {
            *slot = cast(*value);
        }
    }
}

impl ColumnDecoder for IntegerColumnDecoder {
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
        match batch {
            ColumnVectorBatch::Long(b) => {
                let mask = payload_mask(&b.base, n);
                self.rle.next(&mut b.data[..n], mask)?;
            }
            ColumnVectorBatch::Int(b) => {
                self.scratch.resize(n, 0);
                self.rle
                    .next(&mut self.scratch[..n], payload_mask(&b.base, n))?;
                Self::decode_narrow(&self.scratch, b, n, |v| v as i32);
            }
            ColumnVectorBatch::Short(b) => {
                self.scratch.resize(n, 0);
                self.rle
                    .next(&mut self.scratch[..n], payload_mask(&b.base, n))?;
                Self::decode_narrow(&self.scratch, b, n, |v| v as i16);
            }
            _ => {
                return Err(ParseError::TypeMismatch(
                    "Integer column expects a Long, Int or Short batch".to_string(),
                )
                .into())
            }
        }
        Ok(())
    }

    fn skip(&mut self, num_values: u64) -> Result<u64> {
        let non_null = self.present.skip(num_values)?;
        self.rle.skip(non_null)?;
        Ok(non_null)
    }

    fn seek_to_row_group(&mut self, positions: &mut PositionMap) -> Result<()> {
        self.present.seek(positions)?;
        self.rle.seek(positions.position(self.present.column_id())?)
    }
}

/// Decoder for FLOAT and DOUBLE columns: PRESENT + DATA as little-endian
/// IEEE-754 values, 4 or 8 bytes each.
///
/// When a batch has no nulls the values are copied straight out of the
/// buffered chunk; the byte-assembly fallback only runs at chunk
/// boundaries.
pub struct DoubleColumnDecoder {
    present: PresentReader,
    cursor: StreamCursor,
    bytes_per_value: usize,
}

impl DoubleColumnDecoder {
    pub fn new(ty: &OrcType, stripe: &dyn StripeStreams, bytes_per_value: usize) -> Result<Self> {
        let present = PresentReader::new(ty, stripe)?;
        let stream = required_stream(stripe, ty.column_id(), StreamKind::Data, "Double")?;
        Ok(DoubleColumnDecoder {
            present,
            cursor: StreamCursor::new(stream),
            bytes_per_value,
        })
    }

    fn read_f32(&mut self) -> Result<f32> {
        if self.cursor.buffered() >= 4 {
            let chunk = self.cursor.chunk_remaining();
            let bits = [chunk[0], chunk[1], chunk[2], chunk[3]];
            self.cursor.consume(4);
            Ok(f32::from_le_bytes(bits))
        } else {
            let mut bits = [0u8; 4];
            self.cursor.read_into(&mut bits)?;
            Ok(f32::from_le_bytes(bits))
        }
    }

    fn read_f64(&mut self) -> Result<f64> {
        if self.cursor.buffered() >= 8 {
            let chunk = self.cursor.chunk_remaining();
            let mut bits = [0u8; 8];
            bits.copy_from_slice(&chunk[..8]);
            self.cursor.consume(8);
            Ok(f64::from_le_bytes(bits))
        } else {
            let mut bits = [0u8; 8];
            self.cursor.read_into(&mut bits)?;
            Ok(f64::from_le_bytes(bits))
        }
    }

    /// Bulk copy of contiguous doubles when no null mask interleaves.
    fn read_doubles_dense(&mut self, out: &mut [f64]) -> Result<()> {
        let mut filled = 0;
        while filled < out.len() {
            let chunk = self.cursor.chunk_remaining();
            let whole = (chunk.len() / 8).min(out.len() - filled);
            if whole == 0 {
                out[filled] = self.read_f64()?;
                filled += 1;
                continue;
            }
            for (slot, bytes) in out[filled..filled + whole]
                .iter_mut()
                .zip(chunk.chunks_exact(8))
            {
                let mut bits = [0u8; 8];
                bits.copy_from_slice(bytes);
                *slot = f64::from_le_bytes(bits);
            }
            self.cursor.consume(whole * 8);
            filled += whole;
        }
        Ok(())
    }
}

impl ColumnDecoder for DoubleColumnDecoder {
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
        match batch {
            ColumnVectorBatch::Double(b) => {
                if self.bytes_per_value == 4 {
                    match payload_mask(&b.base, n) {
                        Some(mask) => {
                            for i in 0..n {
                                if mask[i] != 0 {
                                    b.data[i] = self.read_f32()? as f64;
                                }
                            }
                        }
                        None => {
                            for slot in &mut b.data[..n] {
                                *slot = self.read_f32()? as f64;
                            }
                        }
                    }
                } else {
                    match b.base.has_nulls {
                        true => {
                            for i in 0..n {
                                if b.base.not_null[i] != 0 {
                                    b.data[i] = self.read_f64()?;
                                }
                            }
                        }
                        false => self.read_doubles_dense(&mut b.data[..n])?,
                    }
                }
            }
            ColumnVectorBatch::Float(b) => {
                if self.bytes_per_value != 4 {
                    return Err(ParseError::TypeMismatch(
                        "Double column expects a Double batch".to_string(),
                    )
                    .into());
                }
                match payload_mask(&b.base, n) {
                    Some(mask) => {
                        for i in 0..n {
                            if mask[i] != 0 {
                                b.data[i] = self.read_f32()?;
                            }
                        }
                    }
                    None => {
                        for slot in &mut b.data[..n] {
                            *slot = self.read_f32()?;
                        }
                    }
                }
            }
            _ => {
                return Err(ParseError::TypeMismatch(
                    "Floating-point column expects a Double or Float batch".to_string(),
                )
                .into())
            }
        }
        Ok(())
    }

    fn skip(&mut self, num_values: u64) -> Result<u64> {
        let non_null = self.present.skip(num_values)?;
        self.cursor
            .skip_bytes(non_null * self.bytes_per_value as u64)?;
        Ok(non_null)
    }

    fn seek_to_row_group(&mut self, positions: &mut PositionMap) -> Result<()> {
        self.present.seek(positions)?;
        self.cursor
            .seek(positions.position(self.present.column_id())?)
    }
}
