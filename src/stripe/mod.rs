//! The stripe-side interface the column decoders consume
//!
//! A [`StripeStreams`] hands out the per-column byte streams, column
//! encodings, timezones and policy flags one stripe's decoders need. The
//! crate ships [`MemoryStripe`], an implementation over already-materialized
//! stream bytes; file readers provide their own.

mod memory;
mod timezone;

use std::fmt;
use std::sync::atomic::AtomicU64;
use std::sync::Arc;

use crate::convert::SchemaEvolution;
use crate::error::{ParseError, Result};
use crate::stream::SeekableStream;

pub use memory::{MemoryStripe, MemoryStripeBuilder};
pub use timezone::{Timezone, TimezoneVariant};

/// The kinds of substreams a column can own.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StreamKind {
    /// Present bit-stream; 1 = value present
    Present,
    /// Main payload stream
    Data,
    /// Lengths for strings, lists and maps; dictionary entry lengths
    Length,
    /// The dictionary blob for dictionary-encoded columns
    DictionaryData,
    /// Secondary payload: nanoseconds, decimal scales
    Secondary,
}

impl fmt::Display for StreamKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            StreamKind::Present => "PRESENT",
            StreamKind::Data => "DATA",
            StreamKind::Length => "LENGTH",
            StreamKind::DictionaryData => "DICTIONARY_DATA",
            StreamKind::Secondary => "SECONDARY",
        };
        f.write_str(name)
    }
}

/// How a column's streams are encoded.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColumnEncodingKind {
    /// Direct encoding with RLE v1 integer streams
    Direct,
    /// Direct encoding with RLE v2 integer streams
    DirectV2,
    /// Dictionary encoding with RLE v1 integer streams
    Dictionary,
    /// Dictionary encoding with RLE v2 integer streams
    DictionaryV2,
}

impl ColumnEncodingKind {
    /// Parse the wire code from the stripe footer.
    pub fn from_code(code: u32) -> Result<Self> {
        match code {
            0 => Ok(ColumnEncodingKind::Direct),
            1 => Ok(ColumnEncodingKind::Dictionary),
            2 => Ok(ColumnEncodingKind::DirectV2),
            3 => Ok(ColumnEncodingKind::DictionaryV2),
            other => Err(ParseError::UnknownEncoding(format!(
                "unknown column encoding code {}",
                other
            ))
            .into()),
        }
    }

    /// Whether the column stores values through a dictionary.
    pub fn is_dictionary(&self) -> bool {
        matches!(
            self,
            ColumnEncodingKind::Dictionary | ColumnEncodingKind::DictionaryV2
        )
    }
}

/// The stripe footer's encoding record for one column.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ColumnEncoding {
    pub kind: ColumnEncodingKind,
    /// Number of dictionary entries; zero for direct encodings
    pub dictionary_size: u32,
}

impl ColumnEncoding {
    pub fn direct() -> Self {
        ColumnEncoding {
            kind: ColumnEncodingKind::Direct,
            dictionary_size: 0,
        }
    }

    pub fn direct_v2() -> Self {
        ColumnEncoding {
            kind: ColumnEncodingKind::DirectV2,
            dictionary_size: 0,
        }
    }

    pub fn dictionary(dictionary_size: u32) -> Self {
        ColumnEncoding {
            kind: ColumnEncodingKind::Dictionary,
            dictionary_size,
        }
    }

    pub fn dictionary_v2(dictionary_size: u32) -> Self {
        ColumnEncoding {
            kind: ColumnEncodingKind::DictionaryV2,
            dictionary_size,
        }
    }
}

/// Options controlling decoder and batch construction.
#[derive(Debug, Clone)]
pub struct DecoderOptions {
    /// Produce narrow numeric arrays for narrow column types instead of
    /// widening everything to 64 bits
    pub tight_numeric: bool,
    /// Produce dictionary-index batches for string-family columns
    pub encoded_vectors: bool,
    /// Error on schema-evolution conversions that would lose information
    /// instead of nulling the row
    pub throw_on_schema_evolution_overflow: bool,
    /// Consult the stripe's schema evolution and wrap decoders in
    /// converters where the read type differs
    pub convert_to_read_type: bool,
}

impl Default for DecoderOptions {
    fn default() -> Self {
        DecoderOptions {
            tight_numeric: false,
            encoded_vectors: false,
            throw_on_schema_evolution_overflow: false,
            convert_to_read_type: true,
        }
    }
}

impl DecoderOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_tight_numeric(mut self, tight_numeric: bool) -> Self {
        self.tight_numeric = tight_numeric;
        self
    }

    pub fn with_encoded_vectors(mut self, encoded_vectors: bool) -> Self {
        self.encoded_vectors = encoded_vectors;
        self
    }

    pub fn with_throw_on_schema_evolution_overflow(mut self, throw: bool) -> Self {
        self.throw_on_schema_evolution_overflow = throw;
        self
    }

    pub fn with_convert_to_read_type(mut self, convert: bool) -> Self {
        self.convert_to_read_type = convert;
        self
    }
}

/// Counters a reader can watch while decoding.
#[derive(Debug, Default)]
pub struct ReaderMetrics {
    /// Logical rows handed to `next` across all decoders
    pub values_decoded: AtomicU64,
    /// Row-group seeks performed
    pub row_group_seeks: AtomicU64,
}

/// Sink for non-fatal decode warnings.
///
/// The only warning the decoders emit today is the Hive 0.11 decimal
/// overflow that policy demotes to null.
pub trait WarningSink: Send + Sync {
    fn warn(&self, message: &str);
}

/// Default sink: forwards to `tracing`.
#[derive(Debug, Default)]
pub struct TracingWarningSink;

impl WarningSink for TracingWarningSink {
    fn warn(&self, message: &str) {
        tracing::warn!(target: "freighter", "{message}");
    }
}

/// Access to the streams and metadata of one stripe.
///
/// A decoder tree is built against one stripe and owns the streams it
/// pulled; dropping the tree releases them.
pub trait StripeStreams {
    /// Which columns are projected, indexed by column id.
    fn selected_columns(&self) -> &[bool];

    /// The encoding record of a column.
    fn encoding(&self, column_id: u64) -> Result<ColumnEncoding>;

    /// Open a substream of a column. Returns `None` when the stream was
    /// not stored or not projected; the decoders decide whether that is
    /// an error.
    fn stream(
        &self,
        column_id: u64,
        kind: StreamKind,
    ) -> Result<Option<Box<dyn SeekableStream>>>;

    /// The timezone the file was written in.
    fn writer_timezone(&self) -> &Timezone;

    /// The timezone timestamps should be adjusted to.
    fn reader_timezone(&self) -> &Timezone;

    /// The scale forced onto Hive 0.11 decimal columns, which carry none.
    fn forced_scale_on_hive11_decimal(&self) -> i32 {
        6
    }

    /// Whether Hive 0.11 decimal overflow is an error (`true`) or demotes
    /// the row to null with a warning (`false`).
    fn throw_on_hive11_decimal_overflow(&self) -> bool {
        true
    }

    /// Whether DIRECT_V2 decimals are stored as plain RLE v2 longs.
    fn decimal_as_long(&self) -> bool {
        false
    }

    /// Schema evolution mapping, when the read schema differs from the
    /// file schema.
    fn schema_evolution(&self) -> Option<&SchemaEvolution> {
        None
    }

    /// Where decode warnings go.
    fn warning_sink(&self) -> Arc<dyn WarningSink> {
        Arc::new(TracingWarningSink)
    }

    /// Shared decode counters.
    fn metrics(&self) -> Arc<ReaderMetrics> {
        Arc::new(ReaderMetrics::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_encoding_codes() {
        assert_eq!(
            ColumnEncodingKind::from_code(0).unwrap(),
            ColumnEncodingKind::Direct
        );
        assert_eq!(
            ColumnEncodingKind::from_code(3).unwrap(),
            ColumnEncodingKind::DictionaryV2
        );
        assert!(ColumnEncodingKind::from_code(4).is_err());
        assert!(ColumnEncodingKind::Dictionary.is_dictionary());
        assert!(!ColumnEncodingKind::DirectV2.is_dictionary());
    }

    #[test]
    fn test_stream_kind_display() {
        assert_eq!(StreamKind::DictionaryData.to_string(), "DICTIONARY_DATA");
        assert_eq!(StreamKind::Present.to_string(), "PRESENT");
    }

    #[test]
    fn test_decoder_options_builder() {
        let options = DecoderOptions::new()
            .with_tight_numeric(true)
            .with_convert_to_read_type(false);
        assert!(options.tight_numeric);
        assert!(!options.convert_to_read_type);
        assert!(!options.encoded_vectors);
    }
}
