//! Column vector batches
//!
//! Decoded rows land in a tree of vector batches shaped like the read
//! schema. Every batch carries a capacity, the number of decoded elements,
//! and a byte-mask of present values (`1` = present); composite batches own
//! their child batches.
//!
//! String batches keep their bytes in a single shared [`Bytes`] blob and
//! describe each value as a `(start, length)` span into it. For dictionary
//! encoded columns the blob *is* the stripe dictionary, shared by reference,
//! so a batch stays valid for as long as anything holds the handle.

use std::sync::Arc;

use bytes::Bytes;

use crate::error::{ParseError, Result};
use crate::schema::{OrcType, TypeKind};
use crate::stripe::DecoderOptions;

/// Fields shared by every batch variant.
#[derive(Debug, Clone, Default)]
pub struct BatchBase {
    /// Allocated element capacity
    pub capacity: usize,
    /// Number of decoded elements
    pub num_elements: usize,
    /// Whether any element in `0..num_elements` is null
    pub has_nulls: bool,
    /// Whether string values are dictionary indices rather than bytes
    pub is_encoded: bool,
    /// Present mask, one byte per element, `1` = present
    pub not_null: Vec<u8>,
}

impl BatchBase {
    fn with_capacity(capacity: usize) -> Self {
        BatchBase {
            capacity,
            num_elements: 0,
            has_nulls: false,
            is_encoded: false,
            not_null: vec![1; capacity],
        }
    }

    fn resize(&mut self, capacity: usize) {
        if capacity > self.capacity {
            self.not_null.resize(capacity, 1);
            self.capacity = capacity;
        }
    }
}

/// Batch of fixed-width numeric values.
#[derive(Debug, Clone, Default)]
pub struct NumericVectorBatch<T> {
    pub base: BatchBase,
    /// Decoded values; slots for null rows are unspecified
    pub data: Vec<T>,
}

impl<T: Copy + Default> NumericVectorBatch<T> {
    pub fn with_capacity(capacity: usize) -> Self {
        NumericVectorBatch {
            base: BatchBase::with_capacity(capacity),
            data: vec![T::default(); capacity],
        }
    }

    fn resize(&mut self, capacity: usize) {
        self.data.resize(capacity.max(self.data.len()), T::default());
        self.base.resize(capacity);
    }
}

pub type LongVectorBatch = NumericVectorBatch<i64>;
pub type IntVectorBatch = NumericVectorBatch<i32>;
pub type ShortVectorBatch = NumericVectorBatch<i16>;
pub type ByteVectorBatch = NumericVectorBatch<i8>;
pub type DoubleVectorBatch = NumericVectorBatch<f64>;
pub type FloatVectorBatch = NumericVectorBatch<f32>;

/// Batch of timestamps: absolute seconds plus nanoseconds in `[0, 10^9)`.
#[derive(Debug, Clone, Default)]
pub struct TimestampVectorBatch {
    pub base: BatchBase,
    /// Seconds since the UNIX epoch
    pub data: Vec<i64>,
    /// Sub-second component
    pub nanoseconds: Vec<i64>,
}

impl TimestampVectorBatch {
    pub fn with_capacity(capacity: usize) -> Self {
        TimestampVectorBatch {
            base: BatchBase::with_capacity(capacity),
            data: vec![0; capacity],
            nanoseconds: vec![0; capacity],
        }
    }

    fn resize(&mut self, capacity: usize) {
        self.data.resize(capacity.max(self.data.len()), 0);
        self.nanoseconds.resize(capacity.max(self.nanoseconds.len()), 0);
        self.base.resize(capacity);
    }
}

/// A stripe string dictionary: a blob plus entry offsets.
///
/// `offsets` has one more entry than the dictionary has strings;
/// entry `i` is `blob[offsets[i]..offsets[i + 1]]`.
#[derive(Debug, Clone, Default)]
pub struct StringDictionary {
    pub offsets: Vec<i64>,
    pub blob: Bytes,
}

impl StringDictionary {
    /// Number of entries.
    pub fn len(&self) -> usize {
        self.offsets.len().saturating_sub(1)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// The bytes of entry `i`.
    pub fn entry(&self, i: usize) -> &[u8] {
        &self.blob[self.offsets[i] as usize..self.offsets[i + 1] as usize]
    }
}

/// Batch of strings (or binary / char / varchar values).
///
/// Values are spans into `blob`. For null rows the span is empty.
#[derive(Debug, Clone, Default)]
pub struct StringVectorBatch {
    pub base: BatchBase,
    /// Backing bytes for all values in this batch
    pub blob: Bytes,
    /// Start offset of each value within `blob`
    pub starts: Vec<u64>,
    /// Length in bytes of each value
    pub lengths: Vec<i64>,
}

impl StringVectorBatch {
    pub fn with_capacity(capacity: usize) -> Self {
        StringVectorBatch {
            base: BatchBase::with_capacity(capacity),
            blob: Bytes::new(),
            starts: vec![0; capacity],
            lengths: vec![0; capacity],
        }
    }

    fn resize(&mut self, capacity: usize) {
        self.starts.resize(capacity.max(self.starts.len()), 0);
        self.lengths.resize(capacity.max(self.lengths.len()), 0);
        self.base.resize(capacity);
    }

    /// The bytes of row `i`. Empty for null rows.
    pub fn value(&self, i: usize) -> &[u8] {
        let start = self.starts[i] as usize;
        let end = start + self.lengths[i] as usize;
        &self.blob[start..end]
    }
}

/// Batch of dictionary indices plus a shared handle to the dictionary.
#[derive(Debug, Clone, Default)]
pub struct EncodedStringVectorBatch {
    pub base: BatchBase,
    /// Dictionary entry index of each row
    pub index: Vec<i64>,
    /// The stripe dictionary the indices point into
    pub dictionary: Option<Arc<StringDictionary>>,
}

impl EncodedStringVectorBatch {
    pub fn with_capacity(capacity: usize) -> Self {
        EncodedStringVectorBatch {
            base: BatchBase::with_capacity(capacity),
            index: vec![0; capacity],
            dictionary: None,
        }
    }

    fn resize(&mut self, capacity: usize) {
        self.index.resize(capacity.max(self.index.len()), 0);
        self.base.resize(capacity);
    }

    /// The bytes of row `i`, looked up through the dictionary.
    pub fn value(&self, i: usize) -> Option<&[u8]> {
        self.dictionary
            .as_ref()
            .map(|dict| dict.entry(self.index[i] as usize))
    }
}

/// Batch of decimals that fit in 64 bits.
#[derive(Debug, Clone, Default)]
pub struct Decimal64VectorBatch {
    pub base: BatchBase,
    /// Unscaled values, rescaled to `scale`
    pub values: Vec<i64>,
    /// Scratch: the per-value scales read from the file
    pub read_scales: Vec<i64>,
    /// Declared precision of the column
    pub precision: i32,
    /// Declared scale the values have been adjusted to
    pub scale: i32,
}

impl Decimal64VectorBatch {
    pub fn with_capacity(capacity: usize) -> Self {
        Decimal64VectorBatch {
            base: BatchBase::with_capacity(capacity),
            values: vec![0; capacity],
            read_scales: vec![0; capacity],
            precision: 0,
            scale: 0,
        }
    }

    fn resize(&mut self, capacity: usize) {
        self.values.resize(capacity.max(self.values.len()), 0);
        self.read_scales.resize(capacity.max(self.read_scales.len()), 0);
        self.base.resize(capacity);
    }
}

/// Batch of decimals up to 38 digits, stored as `i128`.
#[derive(Debug, Clone, Default)]
pub struct Decimal128VectorBatch {
    pub base: BatchBase,
    pub values: Vec<i128>,
    pub read_scales: Vec<i64>,
    pub precision: i32,
    pub scale: i32,
}

impl Decimal128VectorBatch {
    pub fn with_capacity(capacity: usize) -> Self {
        Decimal128VectorBatch {
            base: BatchBase::with_capacity(capacity),
            values: vec![0; capacity],
            read_scales: vec![0; capacity],
            precision: 0,
            scale: 0,
        }
    }

    fn resize(&mut self, capacity: usize) {
        self.values.resize(capacity.max(self.values.len()), 0);
        self.read_scales.resize(capacity.max(self.read_scales.len()), 0);
        self.base.resize(capacity);
    }
}

/// Batch of lists: offsets into one child batch.
///
/// `offsets[i]..offsets[i + 1]` is the element range of row `i`;
/// `offsets[num_elements]` is the total child count.
#[derive(Debug, Clone)]
pub struct ListVectorBatch {
    pub base: BatchBase,
    pub offsets: Vec<i64>,
    pub elements: Box<ColumnVectorBatch>,
}

impl ListVectorBatch {
    pub fn new(capacity: usize, elements: ColumnVectorBatch) -> Self {
        ListVectorBatch {
            base: BatchBase::with_capacity(capacity),
            offsets: vec![0; capacity + 1],
            elements: Box::new(elements),
        }
    }

    fn resize(&mut self, capacity: usize) {
        self.offsets.resize((capacity + 1).max(self.offsets.len()), 0);
        self.base.resize(capacity);
    }
}

/// Batch of maps: offsets into the key and value child batches.
#[derive(Debug, Clone)]
pub struct MapVectorBatch {
    pub base: BatchBase,
    pub offsets: Vec<i64>,
    pub keys: Box<ColumnVectorBatch>,
    pub elements: Box<ColumnVectorBatch>,
}

impl MapVectorBatch {
    pub fn new(capacity: usize, keys: ColumnVectorBatch, elements: ColumnVectorBatch) -> Self {
        MapVectorBatch {
            base: BatchBase::with_capacity(capacity),
            offsets: vec![0; capacity + 1],
            keys: Box::new(keys),
            elements: Box::new(elements),
        }
    }

    fn resize(&mut self, capacity: usize) {
        self.offsets.resize((capacity + 1).max(self.offsets.len()), 0);
        self.base.resize(capacity);
    }
}

/// Batch of structs: one child batch per field, all the same length.
#[derive(Debug, Clone)]
pub struct StructVectorBatch {
    pub base: BatchBase,
    pub fields: Vec<ColumnVectorBatch>,
}

impl StructVectorBatch {
    pub fn new(capacity: usize, fields: Vec<ColumnVectorBatch>) -> Self {
        StructVectorBatch {
            base: BatchBase::with_capacity(capacity),
            fields,
        }
    }

    fn resize(&mut self, capacity: usize) {
        self.base.resize(capacity);
    }
}

/// Batch of unions: a tag per row plus an offset into the tagged child.
#[derive(Debug, Clone)]
pub struct UnionVectorBatch {
    pub base: BatchBase,
    /// Which child each row belongs to
    pub tags: Vec<u8>,
    /// Index of the row within its child batch
    pub offsets: Vec<u64>,
    pub children: Vec<ColumnVectorBatch>,
}

impl UnionVectorBatch {
    pub fn new(capacity: usize, children: Vec<ColumnVectorBatch>) -> Self {
        UnionVectorBatch {
            base: BatchBase::with_capacity(capacity),
            tags: vec![0; capacity],
            offsets: vec![0; capacity],
            children,
        }
    }

    fn resize(&mut self, capacity: usize) {
        self.tags.resize(capacity.max(self.tags.len()), 0);
        self.offsets.resize(capacity.max(self.offsets.len()), 0);
        self.base.resize(capacity);
    }
}

/// A decoded column batch of any type.
#[derive(Debug, Clone)]
pub enum ColumnVectorBatch {
    Long(LongVectorBatch),
    Int(IntVectorBatch),
    Short(ShortVectorBatch),
    Byte(ByteVectorBatch),
    Double(DoubleVectorBatch),
    Float(FloatVectorBatch),
    Timestamp(TimestampVectorBatch),
    String(StringVectorBatch),
    EncodedString(EncodedStringVectorBatch),
    Decimal64(Decimal64VectorBatch),
    Decimal128(Decimal128VectorBatch),
    List(ListVectorBatch),
    Map(MapVectorBatch),
    Struct(StructVectorBatch),
    Union(UnionVectorBatch),
}

macro_rules! batch_accessor {
    ($name:ident, $variant:ident, $batch:ty, $label:expr) => {
        /// Checked access to the expected batch variant.
        pub fn $name(&mut self) -> Result<&mut $batch> {
            match self {
                ColumnVectorBatch::$variant(b) => Ok(b),
                other => Err(ParseError::TypeMismatch(format!(
                    "expected {} batch, found {}",
                    $label,
                    other.kind_name()
                ))
                .into()),
            }
        }
    };
}

impl ColumnVectorBatch {
    /// Shared fields of the batch.
    pub fn base(&self) -> &BatchBase {
        match self {
            ColumnVectorBatch::Long(b) => &b.base,
            ColumnVectorBatch::Int(b) => &b.base,
            ColumnVectorBatch::Short(b) => &b.base,
            ColumnVectorBatch::Byte(b) => &b.base,
            ColumnVectorBatch::Double(b) => &b.base,
            ColumnVectorBatch::Float(b) => &b.base,
            ColumnVectorBatch::Timestamp(b) => &b.base,
            ColumnVectorBatch::String(b) => &b.base,
            ColumnVectorBatch::EncodedString(b) => &b.base,
            ColumnVectorBatch::Decimal64(b) => &b.base,
            ColumnVectorBatch::Decimal128(b) => &b.base,
            ColumnVectorBatch::List(b) => &b.base,
            ColumnVectorBatch::Map(b) => &b.base,
            ColumnVectorBatch::Struct(b) => &b.base,
            ColumnVectorBatch::Union(b) => &b.base,
        }
    }

    /// Mutable access to the shared fields.
    pub fn base_mut(&mut self) -> &mut BatchBase {
        match self {
            ColumnVectorBatch::Long(b) => &mut b.base,
            ColumnVectorBatch::Int(b) => &mut b.base,
            ColumnVectorBatch::Short(b) => &mut b.base,
            ColumnVectorBatch::Byte(b) => &mut b.base,
            ColumnVectorBatch::Double(b) => &mut b.base,
            ColumnVectorBatch::Float(b) => &mut b.base,
            ColumnVectorBatch::Timestamp(b) => &mut b.base,
            ColumnVectorBatch::String(b) => &mut b.base,
            ColumnVectorBatch::EncodedString(b) => &mut b.base,
            ColumnVectorBatch::Decimal64(b) => &mut b.base,
            ColumnVectorBatch::Decimal128(b) => &mut b.base,
            ColumnVectorBatch::List(b) => &mut b.base,
            ColumnVectorBatch::Map(b) => &mut b.base,
            ColumnVectorBatch::Struct(b) => &mut b.base,
            ColumnVectorBatch::Union(b) => &mut b.base,
        }
    }

    /// Grow the batch (and its payload arrays) to hold `capacity` elements.
    pub fn resize(&mut self, capacity: usize) {
        match self {
            ColumnVectorBatch::Long(b) => b.resize(capacity),
            ColumnVectorBatch::Int(b) => b.resize(capacity),
            ColumnVectorBatch::Short(b) => b.resize(capacity),
            ColumnVectorBatch::Byte(b) => b.resize(capacity),
            ColumnVectorBatch::Double(b) => b.resize(capacity),
            ColumnVectorBatch::Float(b) => b.resize(capacity),
            ColumnVectorBatch::Timestamp(b) => b.resize(capacity),
            ColumnVectorBatch::String(b) => b.resize(capacity),
            ColumnVectorBatch::EncodedString(b) => b.resize(capacity),
            ColumnVectorBatch::Decimal64(b) => b.resize(capacity),
            ColumnVectorBatch::Decimal128(b) => b.resize(capacity),
            ColumnVectorBatch::List(b) => b.resize(capacity),
            ColumnVectorBatch::Map(b) => b.resize(capacity),
            ColumnVectorBatch::Struct(b) => b.resize(capacity),
            ColumnVectorBatch::Union(b) => b.resize(capacity),
        }
    }

    fn kind_name(&self) -> &'static str {
        match self {
            ColumnVectorBatch::Long(_) => "Long",
            ColumnVectorBatch::Int(_) => "Int",
            ColumnVectorBatch::Short(_) => "Short",
            ColumnVectorBatch::Byte(_) => "Byte",
            ColumnVectorBatch::Double(_) => "Double",
            ColumnVectorBatch::Float(_) => "Float",
            ColumnVectorBatch::Timestamp(_) => "Timestamp",
            ColumnVectorBatch::String(_) => "String",
            ColumnVectorBatch::EncodedString(_) => "EncodedString",
            ColumnVectorBatch::Decimal64(_) => "Decimal64",
            ColumnVectorBatch::Decimal128(_) => "Decimal128",
            ColumnVectorBatch::List(_) => "List",
            ColumnVectorBatch::Map(_) => "Map",
            ColumnVectorBatch::Struct(_) => "Struct",
            ColumnVectorBatch::Union(_) => "Union",
        }
    }

    batch_accessor!(as_long_mut, Long, LongVectorBatch, "Long");
    batch_accessor!(as_int_mut, Int, IntVectorBatch, "Int");
    batch_accessor!(as_short_mut, Short, ShortVectorBatch, "Short");
    batch_accessor!(as_byte_mut, Byte, ByteVectorBatch, "Byte");
    batch_accessor!(as_double_mut, Double, DoubleVectorBatch, "Double");
    batch_accessor!(as_float_mut, Float, FloatVectorBatch, "Float");
    batch_accessor!(as_timestamp_mut, Timestamp, TimestampVectorBatch, "Timestamp");
    batch_accessor!(as_string_mut, String, StringVectorBatch, "String");
    batch_accessor!(
        as_encoded_string_mut,
        EncodedString,
        EncodedStringVectorBatch,
        "EncodedString"
    );
    batch_accessor!(as_decimal64_mut, Decimal64, Decimal64VectorBatch, "Decimal64");
    batch_accessor!(as_decimal128_mut, Decimal128, Decimal128VectorBatch, "Decimal128");
    batch_accessor!(as_list_mut, List, ListVectorBatch, "List");
    batch_accessor!(as_map_mut, Map, MapVectorBatch, "Map");
    batch_accessor!(as_struct_mut, Struct, StructVectorBatch, "Struct");
    batch_accessor!(as_union_mut, Union, UnionVectorBatch, "Union");
}

impl OrcType {
    /// Build the batch tree a decoder for this type writes into.
    ///
    /// `options.tight_numeric` selects narrow numeric arrays for narrow
    /// column types; `options.encoded_vectors` makes string-family columns
    /// produce dictionary-index batches for `next_encoded`.
    pub fn create_row_batch(&self, capacity: usize, options: &DecoderOptions) -> ColumnVectorBatch {
        match self.kind() {
            TypeKind::Boolean | TypeKind::Byte => {
                if options.tight_numeric {
                    ColumnVectorBatch::Byte(ByteVectorBatch::with_capacity(capacity))
                } else {
                    ColumnVectorBatch::Long(LongVectorBatch::with_capacity(capacity))
                }
            }
            TypeKind::Short => {
                if options.tight_numeric {
                    ColumnVectorBatch::Short(ShortVectorBatch::with_capacity(capacity))
                } else {
                    ColumnVectorBatch::Long(LongVectorBatch::with_capacity(capacity))
                }
            }
            TypeKind::Int => {
                if options.tight_numeric {
                    ColumnVectorBatch::Int(IntVectorBatch::with_capacity(capacity))
                } else {
                    ColumnVectorBatch::Long(LongVectorBatch::with_capacity(capacity))
                }
            }
            TypeKind::Long | TypeKind::Date => {
                ColumnVectorBatch::Long(LongVectorBatch::with_capacity(capacity))
            }
            TypeKind::Float => {
                if options.tight_numeric {
                    ColumnVectorBatch::Float(FloatVectorBatch::with_capacity(capacity))
                } else {
                    ColumnVectorBatch::Double(DoubleVectorBatch::with_capacity(capacity))
                }
            }
            TypeKind::Double => {
                ColumnVectorBatch::Double(DoubleVectorBatch::with_capacity(capacity))
            }
            TypeKind::String
            | TypeKind::Binary
            | TypeKind::Char
            | TypeKind::Varchar
            | TypeKind::Geometry
            | TypeKind::Geography => {
                if options.encoded_vectors {
                    ColumnVectorBatch::EncodedString(EncodedStringVectorBatch::with_capacity(
                        capacity,
                    ))
                } else {
                    ColumnVectorBatch::String(StringVectorBatch::with_capacity(capacity))
                }
            }
            TypeKind::Timestamp | TypeKind::TimestampInstant => {
                ColumnVectorBatch::Timestamp(TimestampVectorBatch::with_capacity(capacity))
            }
            TypeKind::Decimal => {
                // precision 0 is the Hive 0.11 layout which can need 128 bits
                if self.precision() > 0 && self.precision() <= 18 {
                    ColumnVectorBatch::Decimal64(Decimal64VectorBatch::with_capacity(capacity))
                } else {
                    ColumnVectorBatch::Decimal128(Decimal128VectorBatch::with_capacity(capacity))
                }
            }
            TypeKind::List => ColumnVectorBatch::List(ListVectorBatch::new(
                capacity,
                self.subtype(0).create_row_batch(capacity, options),
            )),
            TypeKind::Map => ColumnVectorBatch::Map(MapVectorBatch::new(
                capacity,
                self.subtype(0).create_row_batch(capacity, options),
                self.subtype(1).create_row_batch(capacity, options),
            )),
            TypeKind::Struct => ColumnVectorBatch::Struct(StructVectorBatch::new(
                capacity,
                self.subtypes()
                    .iter()
                    .map(|child| child.create_row_batch(capacity, options))
                    .collect(),
            )),
            TypeKind::Union => ColumnVectorBatch::Union(UnionVectorBatch::new(
                capacity,
                self.subtypes()
                    .iter()
                    .map(|child| child.create_row_batch(capacity, options))
                    .collect(),
            )),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::parse_type;

    #[test]
    fn test_batch_resize_grows_arrays() {
        let mut batch = ColumnVectorBatch::Long(LongVectorBatch::with_capacity(4));
        batch.resize(16);
        assert_eq!(batch.base().capacity, 16);
        assert_eq!(batch.as_long_mut().unwrap().data.len(), 16);

        // shrinking is a no-op
        batch.resize(2);
        assert_eq!(batch.base().capacity, 16);
    }

    #[test]
    fn test_batch_accessor_mismatch() {
        let mut batch = ColumnVectorBatch::Long(LongVectorBatch::with_capacity(1));
        let err = batch.as_string_mut().unwrap_err();
        assert!(err.to_string().contains("expected String batch"));
    }

    #[test]
    fn test_create_row_batch_shapes() {
        let ty = parse_type("struct<a:int,b:array<string>,c:decimal(10,2),d:decimal(20,2)>")
            .unwrap();
        let options = DecoderOptions::default();
        let mut batch = ty.create_row_batch(8, &options);

        let root = batch.as_struct_mut().unwrap();
        assert_eq!(root.fields.len(), 4);
        assert!(matches!(root.fields[0], ColumnVectorBatch::Long(_)));
        assert!(matches!(root.fields[2], ColumnVectorBatch::Decimal64(_)));
        assert!(matches!(root.fields[3], ColumnVectorBatch::Decimal128(_)));

        let list = root.fields[1].as_list_mut().unwrap();
        assert_eq!(list.offsets.len(), 9);
        assert!(matches!(*list.elements, ColumnVectorBatch::String(_)));
    }

    #[test]
    fn test_create_row_batch_tight() {
        let ty = parse_type("struct<a:int,b:smallint,c:boolean,d:float>").unwrap();
        let options = DecoderOptions::default().with_tight_numeric(true);
        let mut batch = ty.create_row_batch(4, &options);
        let root = batch.as_struct_mut().unwrap();
        assert!(matches!(root.fields[0], ColumnVectorBatch::Int(_)));
        assert!(matches!(root.fields[1], ColumnVectorBatch::Short(_)));
        assert!(matches!(root.fields[2], ColumnVectorBatch::Byte(_)));
        assert!(matches!(root.fields[3], ColumnVectorBatch::Float(_)));
    }

    #[test]
    fn test_string_batch_spans() {
        let mut batch = StringVectorBatch::with_capacity(3);
        batch.blob = Bytes::from_static(b"foohi");
        batch.starts = vec![0, 3, 3];
        batch.lengths = vec![3, 0, 2];
        assert_eq!(batch.value(0), b"foo");
        assert_eq!(batch.value(1), b"");
        assert_eq!(batch.value(2), b"hi");
    }

    #[test]
    fn test_dictionary_entries() {
        let dict = StringDictionary {
            offsets: vec![0, 1, 3, 6],
            blob: Bytes::from_static(b"abbccc"),
        };
        assert_eq!(dict.len(), 3);
        assert_eq!(dict.entry(0), b"a");
        assert_eq!(dict.entry(1), b"bb");
        assert_eq!(dict.entry(2), b"ccc");
    }
}
