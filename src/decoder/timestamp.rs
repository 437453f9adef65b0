//! Decoder for TIMESTAMP and TIMESTAMP_INSTANT columns
//!
//! DATA carries seconds relative to the writer's epoch (2015-01-01 in the
//! writer's zone); SECONDARY carries nanoseconds with the trailing-zero
//! multiplier packed into the low three bits. When reader and writer zones
//! differ, values are adjusted to the same wall-clock time, re-examining
//! the reader zone once in case the first adjustment crossed a DST
//! boundary. TIMESTAMP_INSTANT pins both zones to GMT.

use crate::decoder::{required_stream, ColumnDecoder, PresentReader};
use crate::error::Result;
use crate::rle::{create_rle_decoder, IntegerRleDecoder, RleVersion};
use crate::schema::OrcType;
use crate::stream::PositionMap;
use crate::stripe::{StreamKind, StripeStreams, Timezone};
use crate::vector::ColumnVectorBatch;

pub struct TimestampColumnDecoder {
    present: PresentReader,
    seconds: Box<dyn IntegerRleDecoder>,
    nanos: Box<dyn IntegerRleDecoder>,
    writer_timezone: Timezone,
    reader_timezone: Timezone,
    epoch_offset: i64,
    same_timezone: bool,
}

impl TimestampColumnDecoder {
    pub fn new(ty: &OrcType, stripe: &dyn StripeStreams, is_instant: bool) -> Result<Self> {
        let present = PresentReader::new(ty, stripe)?;
        let writer_timezone = if is_instant {
            Timezone::utc()
        } else {
            stripe.writer_timezone().clone()
        };
        let reader_timezone = if is_instant {
            Timezone::utc()
        } else {
            stripe.reader_timezone().clone()
        };
        let version = RleVersion::for_encoding(stripe.encoding(ty.column_id())?.kind);
        let data = required_stream(stripe, ty.column_id(), StreamKind::Data, "Timestamp")?;
        let secondary =
            required_stream(stripe, ty.column_id(), StreamKind::Secondary, "Timestamp")?;
        Ok(TimestampColumnDecoder {
            present,
            seconds: create_rle_decoder(data, true, version),
            nanos: create_rle_decoder(secondary, false, version),
            epoch_offset: writer_timezone.epoch(),
            same_timezone: writer_timezone == reader_timezone,
            writer_timezone,
            reader_timezone,
        })
    }
}

impl ColumnDecoder for TimestampColumnDecoder {
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
        let b = batch.as_timestamp_mut()?;
        {
            let mask = if b.base.has_nulls {
                Some(&b.base.not_null[..n])
            } else {
                None
            };
            self.seconds.next(&mut b.data[..n], mask)?;
            self.nanos.next(&mut b.nanoseconds[..n], mask)?;
        }

        for i in 0..n {
            if b.base.has_nulls && b.base.not_null[i] == 0 {
                continue;
            }
            // low three bits count the trailing decimal zeros removed
            let zeros = b.nanoseconds[i] & 0x7;
            b.nanoseconds[i] >>= 3;
            if zeros != 0 {
                for _ in 0..=zeros {
                    b.nanoseconds[i] *= 10;
                }
            }
            let mut writer_time = b.data[i] + self.epoch_offset;
            if !self.same_timezone {
                let writer_variant = self.writer_timezone.variant(writer_time);
                let reader_variant = self.reader_timezone.variant(writer_time);
                if !writer_variant.has_same_rule(&reader_variant) {
                    // if the first adjustment crosses a DST boundary the
                    // reader offset has to be re-evaluated at the new time
                    let adjusted_time =
                        writer_time + writer_variant.gmt_offset - reader_variant.gmt_offset;
                    let adjusted_reader = self.reader_timezone.variant(adjusted_time);
                    writer_time =
                        writer_time + writer_variant.gmt_offset - adjusted_reader.gmt_offset;
                }
            }
            b.data[i] = writer_time;
            if b.data[i] < 0 && b.nanoseconds[i] > 999_999 {
                b.data[i] -= 1;
            }
        }
        Ok(())
    }

    fn skip(&mut self, num_values: u64) -> Result<u64> {
        let non_null = self.present.skip(num_values)?;
        self.seconds.skip(non_null)?;
        self.nanos.skip(non_null)?;
        Ok(non_null)
    }

    fn seek_to_row_group(&mut self, positions: &mut PositionMap) -> Result<()> {
        self.present.seek(positions)?;
        self.seconds
            .seek(positions.position(self.present.column_id())?)?;
        self.nanos
            .seek(positions.position(self.present.column_id())?)
    }
}
