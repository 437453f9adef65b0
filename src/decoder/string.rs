//! Decoders for string-family columns (string, char, varchar, binary,
//! geometry, geography), in both direct and dictionary encodings

use std::sync::Arc;

use bytes::Bytes;

use crate::decoder::{required_stream, ColumnDecoder, PresentReader};
use crate::error::{ParseError, Result};
use crate::rle::{create_rle_decoder, IntegerRleDecoder, RleVersion};
use crate::schema::OrcType;
use crate::stream::{PositionMap, StreamCursor};
use crate::stripe::{StreamKind, StripeStreams};
use crate::vector::{ColumnVectorBatch, StringDictionary};

const LENGTH_CHUNK: usize = 1024;

/// Decoder for directly-encoded string columns: PRESENT + LENGTH + DATA.
///
/// Lengths are decoded first; the batch blob is then sized to the exact
/// byte total of the present rows and filled from the DATA stream,
/// draining any bytes carried over from the previous call.
pub struct StringDirectColumnDecoder {
    present: PresentReader,
    lengths: Box<dyn IntegerRleDecoder>,
    blob: StreamCursor,
    scratch: Vec<i64>,
}

impl StringDirectColumnDecoder {
    pub fn new(ty: &OrcType, stripe: &dyn StripeStreams) -> Result<Self> {
        let present = PresentReader::new(ty, stripe)?;
        let version = RleVersion::for_encoding(stripe.encoding(ty.column_id())?.kind);
        let length_stream =
            required_stream(stripe, ty.column_id(), StreamKind::Length, "StringDirect")?;
        let data_stream =
            required_stream(stripe, ty.column_id(), StreamKind::Data, "StringDirect")?;
        Ok(StringDirectColumnDecoder {
            present,
            lengths: create_rle_decoder(length_stream, false, version),
            blob: StreamCursor::new(data_stream),
            scratch: Vec::new(),
        })
    }
}

impl ColumnDecoder for StringDirectColumnDecoder {
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
        let b = batch.as_string_mut()?;
        {
            let mask = if b.base.has_nulls {
                Some(&b.base.not_null[..n])
            } else {
                None
            };
            self.lengths.next(&mut b.lengths[..n], mask)?;
        }

        let mut total_length: u64 = 0;
        for i in 0..n {
            if b.base.has_nulls && b.base.not_null[i] == 0 {
                b.lengths[i] = 0;
                continue;
            }
            if b.lengths[i] < 0 {
                return Err(ParseError::NegativeLength(format!(
                    "string length {} in {}",
                    b.lengths[i],
                    self.blob.name()
                ))
                .into());
            }
            total_length += b.lengths[i] as u64;
        }

        let mut buffer = vec![0u8; total_length as usize];
        self.blob.read_into(&mut buffer)?;
        b.blob = Bytes::from(buffer);

        let mut offset: u64 = 0;
        for i in 0..n {
            b.starts[i] = offset;
            if !b.base.has_nulls || b.base.not_null[i] != 0 {
                offset += b.lengths[i] as u64;
            }
        }
        Ok(())
    }

    fn skip(&mut self, num_values: u64) -> Result<u64> {
        let non_null = self.present.skip(num_values)?;
        self.scratch.resize(LENGTH_CHUNK, 0);
        let mut total_bytes: u64 = 0;
        let mut done: u64 = 0;
        while done < non_null {
            let step = ((non_null - done) as usize).min(LENGTH_CHUNK);
            self.lengths.next(&mut self.scratch[..step], None)?;
            for &length in &self.scratch[..step] {
                if length < 0 {
                    return Err(ParseError::NegativeLength(format!(
                        "string length {} in {}",
                        length,
                        self.blob.name()
                    ))
                    .into());
                }
                total_bytes += length as u64;
            }
            done += step as u64;
        }
        self.blob.skip_bytes(total_bytes)?;
        Ok(non_null)
    }

    fn seek_to_row_group(&mut self, positions: &mut PositionMap) -> Result<()> {
        self.present.seek(positions)?;
        self.blob.seek(positions.position(self.present.column_id())?)?;
        self.lengths
            .seek(positions.position(self.present.column_id())?)
    }
}

/// Decoder for dictionary-encoded string columns.
///
/// The dictionary is built once per stripe from LENGTH + DICTIONARY_DATA;
/// DATA then supplies per-row entry indices. `next_encoded` hands batches
/// the indices plus a shared handle to the dictionary instead of
/// materializing the bytes.
pub struct StringDictionaryColumnDecoder {
    present: PresentReader,
    indices: Box<dyn IntegerRleDecoder>,
    dictionary: Arc<StringDictionary>,
    scratch: Vec<i64>,
}

impl StringDictionaryColumnDecoder {
    pub fn new(ty: &OrcType, stripe: &dyn StripeStreams) -> Result<Self> {
        let present = PresentReader::new(ty, stripe)?;
        let column_id = ty.column_id();
        let encoding = stripe.encoding(column_id)?;
        let version = RleVersion::for_encoding(encoding.kind);
        let dictionary_size = encoding.dictionary_size as usize;

        let data_stream =
            required_stream(stripe, column_id, StreamKind::Data, "StringDictionary")?;
        let indices = create_rle_decoder(data_stream, false, version);

        // build the dictionary eagerly; it is shared for the stripe's life
        let mut offsets = vec![0i64; dictionary_size + 1];
        if dictionary_size > 0 {
            let length_stream =
                required_stream(stripe, column_id, StreamKind::Length, "StringDictionary")?;
            let mut length_rle = create_rle_decoder(length_stream, false, version);
            length_rle.next(&mut offsets[1..], None)?;
            for i in 1..offsets.len() {
                if offsets[i] < 0 {
                    return Err(ParseError::NegativeLength(format!(
                        "dictionary entry length {} in column {}",
                        offsets[i], column_id
                    ))
                    .into());
                }
                offsets[i] += offsets[i - 1];
            }
        }
        let blob_size = offsets[dictionary_size] as usize;
        let mut blob = vec![0u8; blob_size];
        if blob_size > 0 {
            let blob_stream = required_stream(
                stripe,
                column_id,
                StreamKind::DictionaryData,
                "StringDictionary",
            )?;
            StreamCursor::new(blob_stream).read_into(&mut blob)?;
        }

        Ok(StringDictionaryColumnDecoder {
            present,
            indices,
            dictionary: Arc::new(StringDictionary {
                offsets,
                blob: Bytes::from(blob),
            }),
            scratch: Vec::new(),
        })
    }
}

impl ColumnDecoder for StringDictionaryColumnDecoder {
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
        let b = batch.as_string_mut()?;
        self.scratch.resize(n, 0);
        {
            let mask = if b.base.has_nulls {
                Some(&b.base.not_null[..n])
            } else {
                None
            };
            self.indices.next(&mut self.scratch[..n], mask)?;
        }

        let dictionary_count = self.dictionary.len() as i64;
        b.blob = self.dictionary.blob.clone();
        for i in 0..n {
            if b.base.has_nulls && b.base.not_null[i] == 0 {
                b.starts[i] = 0;
                b.lengths[i] = 0;
                continue;
            }
            let entry = self.scratch[i];
            if entry < 0 || entry >= dictionary_count {
                return Err(ParseError::InvalidDictionaryIndex(format!(
                    "entry {} of {} in column {}",
                    entry,
                    dictionary_count,
                    self.present.column_id()
                ))
                .into());
            }
            b.starts[i] = self.dictionary.offsets[entry as usize] as u64;
            b.lengths[i] = self.dictionary.offsets[entry as usize + 1]
                - self.dictionary.offsets[entry as usize];
        }
        Ok(())
    }

    fn next_encoded(
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
        batch.base_mut().is_encoded = true;
        let b = batch.as_encoded_string_mut()?;
        b.dictionary = Some(Arc::clone(&self.dictionary));
        let mask = if b.base.has_nulls {
            Some(&b.base.not_null[..n])
        } else {
            None
        };
        self.indices.next(&mut b.index[..n], mask)?;
        Ok(())
    }

    fn skip(&mut self, num_values: u64) -> Result<u64> {
        let non_null = self.present.skip(num_values)?;
        self.indices.skip(non_null)?;
        Ok(non_null)
    }

    fn seek_to_row_group(&mut self, positions: &mut PositionMap) -> Result<()> {
        self.present.seek(positions)?;
        self.indices
            .seek(positions.position(self.present.column_id())?)
    }
}
