//! An in-memory [`StripeStreams`] implementation
//!
//! Serves decoders from already-materialized stream bytes. This is what
//! the crate's own tests decode against, and it is equally usable by a
//! caller that has assembled stream bytes some other way.

use std::collections::HashMap;
use std::sync::Arc;

use bytes::Bytes;

use crate::convert::SchemaEvolution;
use crate::error::{ParseError, Result};
use crate::stream::{MemoryStream, SeekableStream};
use crate::stripe::{
    ColumnEncoding, ReaderMetrics, StreamKind, StripeStreams, Timezone, TracingWarningSink,
    WarningSink,
};

/// Builder for [`MemoryStripe`].
pub struct MemoryStripeBuilder {
    streams: HashMap<(u64, StreamKind), Bytes>,
    encodings: HashMap<u64, ColumnEncoding>,
    selected: Option<Vec<bool>>,
    writer_timezone: Timezone,
    reader_timezone: Timezone,
    forced_scale_on_hive11: i32,
    throw_on_hive11_overflow: bool,
    decimal_as_long: bool,
    evolution: Option<SchemaEvolution>,
    chunk_size: Option<usize>,
    sink: Arc<dyn WarningSink>,
    max_column_id: u64,
}

impl MemoryStripeBuilder {
    pub fn new() -> Self {
        MemoryStripeBuilder {
            streams: HashMap::new(),
            encodings: HashMap::new(),
            selected: None,
            writer_timezone: Timezone::utc(),
            reader_timezone: Timezone::utc(),
            forced_scale_on_hive11: 6,
            throw_on_hive11_overflow: true,
            decimal_as_long: false,
            evolution: None,
            chunk_size: None,
            sink: Arc::new(TracingWarningSink),
            max_column_id: 0,
        }
    }

    /// Register the bytes of one substream.
    pub fn stream(mut self, column_id: u64, kind: StreamKind, data: impl Into<Bytes>) -> Self {
        self.max_column_id = self.max_column_id.max(column_id);
        self.streams.insert((column_id, kind), data.into());
        self
    }

    /// Register the encoding of one column. Columns without a registered
    /// encoding report DIRECT.
    pub fn encoding(mut self, column_id: u64, encoding: ColumnEncoding) -> Self {
        self.max_column_id = self.max_column_id.max(column_id);
        self.encodings.insert(column_id, encoding);
        self
    }

    /// Override the projected-columns mask (default: everything selected).
    pub fn selected(mut self, selected: Vec<bool>) -> Self {
        self.selected = Some(selected);
        self
    }

    pub fn writer_timezone(mut self, zone: Timezone) -> Self {
        self.writer_timezone = zone;
        self
    }

    pub fn reader_timezone(mut self, zone: Timezone) -> Self {
        self.reader_timezone = zone;
        self
    }

    pub fn forced_scale_on_hive11(mut self, scale: i32) -> Self {
        self.forced_scale_on_hive11 = scale;
        self
    }

    pub fn throw_on_hive11_overflow(mut self, throw: bool) -> Self {
        self.throw_on_hive11_overflow = throw;
        self
    }

    pub fn decimal_as_long(mut self, as_long: bool) -> Self {
        self.decimal_as_long = as_long;
        self
    }

    pub fn schema_evolution(mut self, evolution: SchemaEvolution) -> Self {
        self.evolution = Some(evolution);
        self
    }

    /// Serve stream bytes in chunks of at most this size, to exercise
    /// decoder carry-over paths.
    pub fn chunk_size(mut self, chunk_size: usize) -> Self {
        self.chunk_size = Some(chunk_size);
        self
    }

    pub fn warning_sink(mut self, sink: Arc<dyn WarningSink>) -> Self {
        self.sink = sink;
        self
    }

    pub fn build(self) -> MemoryStripe {
        let column_count = self.max_column_id as usize + 1;
        MemoryStripe {
            streams: self.streams,
            encodings: self.encodings,
            selected: self.selected.unwrap_or_else(|| vec![true; column_count]),
            writer_timezone: self.writer_timezone,
            reader_timezone: self.reader_timezone,
            forced_scale_on_hive11: self.forced_scale_on_hive11,
            throw_on_hive11_overflow: self.throw_on_hive11_overflow,
            decimal_as_long: self.decimal_as_long,
            evolution: self.evolution,
            chunk_size: self.chunk_size,
            sink: self.sink,
            metrics: Arc::new(ReaderMetrics::default()),
        }
    }
}

impl Default for MemoryStripeBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// A stripe whose streams live in memory.
pub struct MemoryStripe {
    streams: HashMap<(u64, StreamKind), Bytes>,
    encodings: HashMap<u64, ColumnEncoding>,
    selected: Vec<bool>,
    writer_timezone: Timezone,
    reader_timezone: Timezone,
    forced_scale_on_hive11: i32,
    throw_on_hive11_overflow: bool,
    decimal_as_long: bool,
    evolution: Option<SchemaEvolution>,
    chunk_size: Option<usize>,
    sink: Arc<dyn WarningSink>,
    metrics: Arc<ReaderMetrics>,
}

impl MemoryStripe {
    pub fn builder() -> MemoryStripeBuilder {
        MemoryStripeBuilder::new()
    }
}

impl StripeStreams for MemoryStripe {
    fn selected_columns(&self) -> &[bool] {
        &self.selected
    }

    fn encoding(&self, column_id: u64) -> Result<ColumnEncoding> {
        Ok(self
            .encodings
            .get(&column_id)
            .copied()
            .unwrap_or_else(ColumnEncoding::direct))
    }

    fn stream(
        &self,
        column_id: u64,
        kind: StreamKind,
    ) -> Result<Option<Box<dyn SeekableStream>>> {
        if column_id as usize >= self.selected.len() {
            return Err(ParseError::InvalidData(format!(
                "column {} out of range",
                column_id
            ))
            .into());
        }
        Ok(self.streams.get(&(column_id, kind)).map(|data| {
            let name = format!("{} stream of column {}", kind, column_id);
            let mut stream = MemoryStream::new(data.clone(), name);
            if let Some(chunk_size) = self.chunk_size {
                stream = stream.with_chunk_size(chunk_size);
            }
            Box::new(stream) as Box<dyn SeekableStream>
        }))
    }

    fn writer_timezone(&self) -> &Timezone {
        &self.writer_timezone
    }

    fn reader_timezone(&self) -> &Timezone {
        &self.reader_timezone
    }

    fn forced_scale_on_hive11_decimal(&self) -> i32 {
        self.forced_scale_on_hive11
    }

    fn throw_on_hive11_decimal_overflow(&self) -> bool {
        self.throw_on_hive11_overflow
    }

    fn decimal_as_long(&self) -> bool {
        self.decimal_as_long
    }

    fn schema_evolution(&self) -> Option<&SchemaEvolution> {
        self.evolution.as_ref()
    }

    fn warning_sink(&self) -> Arc<dyn WarningSink> {
        Arc::clone(&self.sink)
    }

    fn metrics(&self) -> Arc<ReaderMetrics> {
        Arc::clone(&self.metrics)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_streams_and_defaults() {
        let stripe = MemoryStripe::builder()
            .stream(2, StreamKind::Data, Bytes::from_static(&[1, 2, 3]))
            .encoding(2, ColumnEncoding::direct_v2())
            .build();

        assert_eq!(stripe.selected_columns(), &[true, true, true]);
        assert_eq!(stripe.encoding(2).unwrap(), ColumnEncoding::direct_v2());
        // unregistered columns default to DIRECT
        assert_eq!(stripe.encoding(0).unwrap(), ColumnEncoding::direct());

        let mut stream = stripe.stream(2, StreamKind::Data).unwrap().unwrap();
        assert_eq!(stream.next_chunk().unwrap().unwrap().as_ref(), &[1, 2, 3]);
        assert!(stripe.stream(2, StreamKind::Present).unwrap().is_none());
        assert!(stream.name().contains("DATA"));
    }
}
