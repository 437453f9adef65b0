//! Decoders for the composite types: struct, list, map, union
//!
//! Composite decoders own their selected children. A struct hands its own
//! mask down with the same row count; list and map turn their LENGTH
//! stream into prefix-sum offsets and recurse with the total child count;
//! a union counts rows per tag and gives each child its own count.
//! Children always track their own nullability, so the recursion passes
//! no incoming mask except in the struct case.

use crate::decoder::{
    build_decoder, required_stream, ColumnDecoder, PresentReader,
};
use crate::error::{ParseError, Result};
use crate::rle::{create_byte_rle_decoder, create_rle_decoder, ByteRleDecoder, IntegerRleDecoder, RleVersion};
use crate::schema::OrcType;
use crate::stream::PositionMap;
use crate::stripe::{ColumnEncodingKind, DecoderOptions, StreamKind, StripeStreams};
use crate::vector::ColumnVectorBatch;

const LENGTH_CHUNK: usize = 1024;

/// Build decoders for the selected children of a composite type, one slot
/// per child so batch fields stay aligned index-for-index.
fn build_children(
    ty: &OrcType,
    stripe: &dyn StripeStreams,
    options: &DecoderOptions,
) -> Result<Vec<Option<Box<dyn ColumnDecoder>>>> {
    let selected = stripe.selected_columns();
    ty.subtypes()
        .iter()
        .map(|child| {
            let selected = selected
                .get(child.column_id() as usize)
                .copied()
                .unwrap_or(false);
            if selected {
                build_decoder(child, stripe, options).map(Some)
            } else {
                Ok(None)
            }
        })
        .collect()
}

/// Decoder for STRUCT columns: no payload stream beyond PRESENT.
pub struct StructColumnDecoder {
    present: PresentReader,
    children: Vec<Option<Box<dyn ColumnDecoder>>>,
}

impl StructColumnDecoder {
    pub fn new(ty: &OrcType, stripe: &dyn StripeStreams, options: &DecoderOptions) -> Result<Self> {
        match stripe.encoding(ty.column_id())?.kind {
            ColumnEncodingKind::Direct => {}
            other => {
                return Err(ParseError::UnknownEncoding(format!(
                    "{:?} is not a valid encoding for a Struct column",
                    other
                ))
                .into())
            }
        }
        Ok(StructColumnDecoder {
            present: PresentReader::new(ty, stripe)?,
            children: build_children(ty, stripe, options)?,
        })
    }

    fn next_internal(
        &mut self,
        batch: &mut ColumnVectorBatch,
        num_values: u64,
        incoming_mask: Option<&[u8]>,
        encoded: bool,
    ) -> Result<()> {
        let n = num_values as usize;
        if n > batch.base().capacity {
            batch.resize(n);
        }
        self.present.read_mask(batch.base_mut(), num_values, incoming_mask)?;
        let b = batch.as_struct_mut()?;
        let mask = if b.base.has_nulls {
            Some(&b.base.not_null[..n])
        } else {
            None
        };
        for (decoder, field) in self.children.iter_mut().zip(b.fields.iter_mut()) {
            if let Some(decoder) = decoder {
                if encoded {
                    decoder.next_encoded(field, num_values, mask)?;
                } else {
                    decoder.next(field, num_values, mask)?;
                }
            }
        }
        Ok(())
    }
}

impl ColumnDecoder for StructColumnDecoder {
    fn next(
        &mut self,
        batch: &mut ColumnVectorBatch,
        num_values: u64,
        incoming_mask: Option<&[u8]>,
    ) -> Result<()> {
        self.next_internal(batch, num_values, incoming_mask, false)
    }

    fn next_encoded(
        &mut self,
        batch: &mut ColumnVectorBatch,
        num_values: u64,
        incoming_mask: Option<&[u8]>,
    ) -> Result<()> {
        self.next_internal(batch, num_values, incoming_mask, true)
    }

    fn skip(&mut self, num_values: u64) -> Result<u64> {
        let non_null = self.present.skip(num_values)?;
        for decoder in self.children.iter_mut().flatten() {
            decoder.skip(non_null)?;
        }
        Ok(non_null)
    }

    fn seek_to_row_group(&mut self, positions: &mut PositionMap) -> Result<()> {
        self.present.seek(positions)?;
        for decoder in self.children.iter_mut().flatten() {
            decoder.seek_to_row_group(positions)?;
        }
        Ok(())
    }
}

/// Decoder for LIST columns: PRESENT + LENGTH, one child.
pub struct ListColumnDecoder {
    present: PresentReader,
    lengths: Box<dyn IntegerRleDecoder>,
    child: Option<Box<dyn ColumnDecoder>>,
    scratch: Vec<i64>,
}

impl ListColumnDecoder {
    pub fn new(ty: &OrcType, stripe: &dyn StripeStreams, options: &DecoderOptions) -> Result<Self> {
        let present = PresentReader::new(ty, stripe)?;
        let version = RleVersion::for_encoding(stripe.encoding(ty.column_id())?.kind);
        let stream = required_stream(stripe, ty.column_id(), StreamKind::Length, "List")?;
        let child_type = ty.subtype(0);
        let child = if stripe
            .selected_columns()
            .get(child_type.column_id() as usize)
            .copied()
            .unwrap_or(false)
        {
            Some(build_decoder(child_type, stripe, options)?)
        } else {
            None
        };
        Ok(ListColumnDecoder {
            present,
            lengths: create_rle_decoder(stream, false, version),
            child,
            scratch: Vec::new(),
        })
    }

    fn next_internal(
        &mut self,
        batch: &mut ColumnVectorBatch,
        num_values: u64,
        incoming_mask: Option<&[u8]>,
        encoded: bool,
    ) -> Result<()> {
        let n = num_values as usize;
        if n > batch.base().capacity {
            batch.resize(n);
        }
        self.present.read_mask(batch.base_mut(), num_values, incoming_mask)?;
        let b = batch.as_list_mut()?;
        {
            let mask = if b.base.has_nulls {
                Some(&b.base.not_null[..n])
            } else {
                None
            };
            self.lengths.next(&mut b.offsets[..n], mask)?;
        }

        // convert lengths to offsets in place; null rows are zero-width
        let mut total_children: i64 = 0;
        for i in 0..n {
            if !b.base.has_nulls || b.base.not_null[i] != 0 {
                let length = b.offsets[i];
                b.offsets[i] = total_children;
                total_children += length;
            } else {
                b.offsets[i] = total_children;
            }
        }
        b.offsets[n] = total_children;

        if let Some(child) = &mut self.child {
            if encoded {
                child.next_encoded(&mut b.elements, total_children as u64, None)?;
            } else {
                child.next(&mut b.elements, total_children as u64, None)?;
            }
        }
        Ok(())
    }

    /// Drain `count` lengths and return their sum.
    fn drain_lengths(&mut self, count: u64) -> Result<u64> {
        self.scratch.resize(LENGTH_CHUNK, 0);
        let mut total: u64 = 0;
        let mut done: u64 = 0;
        while done < count {
            let step = ((count - done) as usize).min(LENGTH_CHUNK);
            self.lengths.next(&mut self.scratch[..step], None)?;
            total += self.scratch[..step].iter().map(|&l| l as u64).sum::<u64>();
            done += step as u64;
        }
        Ok(total)
    }
}

impl ColumnDecoder for ListColumnDecoder {
    fn next(
        &mut self,
        batch: &mut ColumnVectorBatch,
        num_values: u64,
        incoming_mask: Option<&[u8]>,
    ) -> Result<()> {
        self.next_internal(batch, num_values, incoming_mask, false)
    }

    fn next_encoded(
        &mut self,
        batch: &mut ColumnVectorBatch,
        num_values: u64,
        incoming_mask: Option<&[u8]>,
    ) -> Result<()> {
        self.next_internal(batch, num_values, incoming_mask, true)
    }

    fn skip(&mut self, num_values: u64) -> Result<u64> {
        let non_null = self.present.skip(num_values)?;
        if self.child.is_some() {
            let total_children = self.drain_lengths(non_null)?;
            if let Some(child) = &mut self.child {
                child.skip(total_children)?;
            }
        } else {
            self.lengths.skip(non_null)?;
        }
        Ok(non_null)
    }

    fn seek_to_row_group(&mut self, positions: &mut PositionMap) -> Result<()> {
        self.present.seek(positions)?;
        self.lengths
            .seek(positions.position(self.present.column_id())?)?;
        if let Some(child) = &mut self.child {
            child.seek_to_row_group(positions)?;
        }
        Ok(())
    }
}

/// Decoder for MAP columns: PRESENT + LENGTH, key and value children.
pub struct MapColumnDecoder {
    present: PresentReader,
    lengths: Box<dyn IntegerRleDecoder>,
    keys: Option<Box<dyn ColumnDecoder>>,
    elements: Option<Box<dyn ColumnDecoder>>,
    scratch: Vec<i64>,
}

impl MapColumnDecoder {
    pub fn new(ty: &OrcType, stripe: &dyn StripeStreams, options: &DecoderOptions) -> Result<Self> {
        let present = PresentReader::new(ty, stripe)?;
        let version = RleVersion::for_encoding(stripe.encoding(ty.column_id())?.kind);
        let stream = required_stream(stripe, ty.column_id(), StreamKind::Length, "Map")?;
        let selected = stripe.selected_columns();
        let key_type = ty.subtype(0);
        let keys = if selected
            .get(key_type.column_id() as usize)
            .copied()
            .unwrap_or(false)
        {
            Some(build_decoder(key_type, stripe, options)?)
        } else {
            None
        };
        let element_type = ty.subtype(1);
        let elements = if selected
            .get(element_type.column_id() as usize)
            .copied()
            .unwrap_or(false)
        {
            Some(build_decoder(element_type, stripe, options)?)
        } else {
            None
        };
        Ok(MapColumnDecoder {
            present,
            lengths: create_rle_decoder(stream, false, version),
            keys,
            elements,
            scratch: Vec::new(),
        })
    }

    fn next_internal(
        &mut self,
        batch: &mut ColumnVectorBatch,
        num_values: u64,
        incoming_mask: Option<&[u8]>,
        encoded: bool,
    ) -> Result<()> {
        let n = num_values as usize;
        if n > batch.base().capacity {
            batch.resize(n);
        }
        self.present.read_mask(batch.base_mut(), num_values, incoming_mask)?;
        let b = batch.as_map_mut()?;
        {
            let mask = if b.base.has_nulls {
                Some(&b.base.not_null[..n])
            } else {
                None
            };
            self.lengths.next(&mut b.offsets[..n], mask)?;
        }

        let mut total_children: i64 = 0;
        for i in 0..n {
            if !b.base.has_nulls || b.base.not_null[i] != 0 {
                let length = b.offsets[i];
                b.offsets[i] = total_children;
                total_children += length;
            } else {
                b.offsets[i] = total_children;
            }
        }
        b.offsets[n] = total_children;

        if let Some(keys) = &mut self.keys {
            if encoded {
                keys.next_encoded(&mut b.keys, total_children as u64, None)?;
            } else {
                keys.next(&mut b.keys, total_children as u64, None)?;
            }
        }
        if let Some(elements) = &mut self.elements {
            if encoded {
                elements.next_encoded(&mut b.elements, total_children as u64, None)?;
            } else {
                elements.next(&mut b.elements, total_children as u64, None)?;
            }
        }
        Ok(())
    }
}

impl ColumnDecoder for MapColumnDecoder {
    fn next(
        &mut self,
        batch: &mut ColumnVectorBatch,
        num_values: u64,
        incoming_mask: Option<&[u8]>,
    ) -> Result<()> {
        self.next_internal(batch, num_values, incoming_mask, false)
    }

    fn next_encoded(
        &mut self,
        batch: &mut ColumnVectorBatch,
        num_values: u64,
        incoming_mask: Option<&[u8]>,
    ) -> Result<()> {
        self.next_internal(batch, num_values, incoming_mask, true)
    }

    fn skip(&mut self, num_values: u64) -> Result<u64> {
        let non_null = self.present.skip(num_values)?;
        if self.keys.is_some() || self.elements.is_some() {
            self.scratch.resize(LENGTH_CHUNK, 0);
            let mut total: u64 = 0;
            let mut done: u64 = 0;
            while done < non_null {
                let step = ((non_null - done) as usize).min(LENGTH_CHUNK);
                self.lengths.next(&mut self.scratch[..step], None)?;
                total += self.scratch[..step].iter().map(|&l| l as u64).sum::<u64>();
                done += step as u64;
            }
            if let Some(keys) = &mut self.keys {
                keys.skip(total)?;
            }
            if let Some(elements) = &mut self.elements {
                elements.skip(total)?;
            }
        } else {
            self.lengths.skip(non_null)?;
        }
        Ok(non_null)
    }

    fn seek_to_row_group(&mut self, positions: &mut PositionMap) -> Result<()> {
        self.present.seek(positions)?;
        self.lengths
            .seek(positions.position(self.present.column_id())?)?;
        if let Some(keys) = &mut self.keys {
            keys.seek_to_row_group(positions)?;
        }
        if let Some(elements) = &mut self.elements {
            elements.seek_to_row_group(positions)?;
        }
        Ok(())
    }
}

/// Decoder for UNION columns: PRESENT + DATA tag bytes, one child per
/// alternative.
pub struct UnionColumnDecoder {
    present: PresentReader,
    tags: ByteRleDecoder,
    children: Vec<Option<Box<dyn ColumnDecoder>>>,
    counts: Vec<i64>,
    scratch: Vec<u8>,
}

impl UnionColumnDecoder {
    pub fn new(ty: &OrcType, stripe: &dyn StripeStreams, options: &DecoderOptions) -> Result<Self> {
        let present = PresentReader::new(ty, stripe)?;
        let stream = required_stream(stripe, ty.column_id(), StreamKind::Data, "Union")?;
        let children = build_children(ty, stripe, options)?;
        let num_children = children.len();
        Ok(UnionColumnDecoder {
            present,
            tags: create_byte_rle_decoder(stream),
            children,
            counts: vec![0; num_children],
            scratch: Vec::new(),
        })
    }

    fn next_internal(
        &mut self,
        batch: &mut ColumnVectorBatch,
        num_values: u64,
        incoming_mask: Option<&[u8]>,
        encoded: bool,
    ) -> Result<()> {
        let n = num_values as usize;
        if n > batch.base().capacity {
            batch.resize(n);
        }
        self.present.read_mask(batch.base_mut(), num_values, incoming_mask)?;
        let b = batch.as_union_mut()?;
        {
            let mask = if b.base.has_nulls {
                Some(&b.base.not_null[..n])
            } else {
                None
            };
            self.tags.next(&mut b.tags[..n], mask)?;
        }

        self.counts.fill(0);
        let num_children = self.children.len();
        for i in 0..n {
            if b.base.has_nulls && b.base.not_null[i] == 0 {
                continue;
            }
            let tag = b.tags[i] as usize;
            if tag >= num_children {
                return Err(ParseError::InvalidData(format!(
                    "union tag {} out of range for {} children",
                    tag, num_children
                ))
                .into());
            }
            b.offsets[i] = self.counts[tag] as u64;
            self.counts[tag] += 1;
        }

        for (tag, decoder) in self.children.iter_mut().enumerate() {
            if let Some(decoder) = decoder {
                let count = self.counts[tag] as u64;
                if encoded {
                    decoder.next_encoded(&mut b.children[tag], count, None)?;
                } else {
                    decoder.next(&mut b.children[tag], count, None)?;
                }
            }
        }
        Ok(())
    }
}

impl ColumnDecoder for UnionColumnDecoder {
    fn next(
        &mut self,
        batch: &mut ColumnVectorBatch,
        num_values: u64,
        incoming_mask: Option<&[u8]>,
    ) -> Result<()> {
        self.next_internal(batch, num_values, incoming_mask, false)
    }

    fn next_encoded(
        &mut self,
        batch: &mut ColumnVectorBatch,
        num_values: u64,
        incoming_mask: Option<&[u8]>,
    ) -> Result<()> {
        self.next_internal(batch, num_values, incoming_mask, true)
    }

    fn skip(&mut self, num_values: u64) -> Result<u64> {
        let non_null = self.present.skip(num_values)?;
        self.counts.fill(0);
        self.scratch.resize(LENGTH_CHUNK, 0);
        let mut done: u64 = 0;
        while done < non_null {
            let step = ((non_null - done) as usize).min(LENGTH_CHUNK);
            self.tags.next(&mut self.scratch[..step], None)?;
            for &tag in &self.scratch[..step] {
                if tag as usize >= self.counts.len() {
                    return Err(ParseError::InvalidData(format!(
                        "union tag {} out of range for {} children",
                        tag,
                        self.counts.len()
                    ))
                    .into());
                }
                self.counts[tag as usize] += 1;
            }
            done += step as u64;
        }
        for (tag, decoder) in self.children.iter_mut().enumerate() {
            if let Some(decoder) = decoder {
                if self.counts[tag] != 0 {
                    decoder.skip(self.counts[tag] as u64)?;
                }
            }
        }
        Ok(non_null)
    }

    fn seek_to_row_group(&mut self, positions: &mut PositionMap) -> Result<()> {
        self.present.seek(positions)?;
        self.tags.seek(positions.position(self.present.column_id())?)?;
        for decoder in self.children.iter_mut().flatten() {
            decoder.seek_to_row_group(positions)?;
        }
        Ok(())
    }
}
