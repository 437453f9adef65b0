//! Schema-evolution conversion
//!
//! When the read schema differs from the file schema, the decoder factory
//! wraps the physical decoder for the file type in a [`ConvertingDecoder`]
//! that decodes into a file-typed scratch batch and converts row by row
//! into the requested batch. Numeric conversions are supported; narrowing
//! that would lose information either errors or nulls the row, per the
//! throw-on-overflow option.

use std::collections::HashMap;
use std::sync::Arc;

use crate::decoder::{build_physical_decoder, ColumnDecoder};
use crate::error::{OrcError, Result};
use crate::schema::{OrcType, TypeKind};
use crate::stream::PositionMap;
use crate::stripe::{DecoderOptions, StripeStreams, WarningSink};
use crate::vector::{ColumnVectorBatch, NumericVectorBatch};

/// Maps file columns to the (different) types the caller wants to read.
#[derive(Debug, Clone, Default)]
pub struct SchemaEvolution {
    read_types: HashMap<u64, OrcType>,
}

impl SchemaEvolution {
    /// Compare a read schema against the file schema and record every
    /// subtree whose kind differs. The two trees are matched positionally.
    pub fn new(read_type: &OrcType, file_type: &OrcType) -> Self {
        let mut read_types = HashMap::new();
        collect_conversions(read_type, file_type, &mut read_types);
        SchemaEvolution { read_types }
    }

    /// Whether this file column must be converted while reading.
    pub fn needs_conversion(&self, file_type: &OrcType) -> bool {
        self.read_types.contains_key(&file_type.column_id())
    }

    /// The type the column is read as, when it differs from the file.
    pub fn read_type(&self, column_id: u64) -> Option<&OrcType> {
        self.read_types.get(&column_id)
    }
}

fn collect_conversions(read: &OrcType, file: &OrcType, out: &mut HashMap<u64, OrcType>) {
    if read.kind() != file.kind() {
        out.insert(file.column_id(), read.clone());
        return;
    }
    for (read_child, file_child) in read.subtypes().iter().zip(file.subtypes()) {
        collect_conversions(read_child, file_child, out);
    }
}

fn integer_bounds(kind: TypeKind) -> Option<(i64, i64)> {
    match kind {
        TypeKind::Boolean => Some((0, 1)),
        TypeKind::Byte => Some((i8::MIN as i64, i8::MAX as i64)),
        TypeKind::Short => Some((i16::MIN as i64, i16::MAX as i64)),
        TypeKind::Int => Some((i32::MIN as i64, i32::MAX as i64)),
        TypeKind::Long | TypeKind::Date => Some((i64::MIN, i64::MAX)),
        _ => None,
    }
}

fn is_numeric(kind: TypeKind) -> bool {
    integer_bounds(kind).is_some() || matches!(kind, TypeKind::Float | TypeKind::Double)
}

/// Build a converting wrapper for a file column the evolution map says is
/// read as a different type.
pub fn build_converting_decoder(
    file_type: &OrcType,
    stripe: &dyn StripeStreams,
    options: &DecoderOptions,
) -> Result<Box<dyn ColumnDecoder>> {
    let evolution = stripe
        .schema_evolution()
        .ok_or_else(|| OrcError::Unsupported("no schema evolution registered".to_string()))?;
    let read_type = evolution
        .read_type(file_type.column_id())
        .ok_or_else(|| {
            OrcError::Unsupported(format!(
                "no read type recorded for column {}",
                file_type.column_id()
            ))
        })?
        .clone();

    if !is_numeric(file_type.kind()) || !is_numeric(read_type.kind()) {
        return Err(OrcError::Unsupported(format!(
            "conversion from {:?} to {:?} is not implemented",
            file_type.kind(),
            read_type.kind()
        )));
    }

    // the scratch batch is always the wide (non-tight) layout
    let scratch_options = options
        .clone()
        .with_tight_numeric(false)
        .with_encoded_vectors(false);
    let inner = build_physical_decoder(file_type, stripe, options)?;
    Ok(Box::new(ConvertingDecoder {
        inner,
        scratch: file_type.create_row_batch(0, &scratch_options),
        read_kind: read_type.kind(),
        column_id: file_type.column_id(),
        throw_on_overflow: options.throw_on_schema_evolution_overflow,
        warnings: stripe.warning_sink(),
    }))
}

/// Wraps a physical decoder and converts its output to the read type.
pub struct ConvertingDecoder {
    inner: Box<dyn ColumnDecoder>,
    scratch: ColumnVectorBatch,
    read_kind: TypeKind,
    column_id: u64,
    throw_on_overflow: bool,
    warnings: Arc<dyn WarningSink>,
}

impl ConvertingDecoder {
    /// Value of present row `i` of the scratch batch as a double.
    fn source_value(&self, i: usize) -> f64 {
        match &self.scratch {
            ColumnVectorBatch::Long(b) => b.data[i] as f64,
            ColumnVectorBatch::Double(b) => b.data[i],
            _ => 0.0,
        }
    }

    fn source_is_integer(&self) -> bool {
        matches!(self.scratch, ColumnVectorBatch::Long(_))
    }

    /// Convert one row into an integer of the target bounds, or report
    /// that it does not fit.
    fn convert_integer(&self, i: usize, lower: i64, upper: i64) -> Option<i64> {
        if self.source_is_integer() {
            let value = match &self.scratch {
                ColumnVectorBatch::Long(b) => b.data[i],
                _ => 0,
            };
            (lower..=upper).contains(&value).then_some(value)
        } else {
            let value = self.source_value(i).trunc();
            if value >= lower as f64 && value <= upper as f64 {
                Some(value as i64)
            } else {
                None
            }
        }
    }

    fn overflow(&self, batch_base: &mut crate::vector::BatchBase, i: usize) -> Result<()> {
        if self.throw_on_overflow {
            return Err(OrcError::EvolutionOverflow(format!(
                "value in column {} does not fit the read type",
                self.column_id
            )));
        }
        self.warnings.warn("schema evolution narrowed a value to NULL");
        batch_base.not_null[i] = 0;
        batch_base.has_nulls = true;
        Ok(())
    }

    fn fill_integer<T: Copy + Default>(
        &self,
        n: usize,
        lower: i64,
        upper: i64,
        cast: impl Fn(i64) -> T,
        select: impl for<'a> Fn(&'a mut ColumnVectorBatch) -> Result<&'a mut NumericVectorBatch<T>>,
        batch: &mut ColumnVectorBatch,
    ) -> Result<()> {
        let out = select(batch)?;
        for i in 0..n {
            if out.base.has_nulls && out.base.not_null[i] == 0 {
                continue;
            }
            match self.convert_integer(i, lower, upper) {
                Some(value) => out.data[i] = cast(value),
                None => self.overflow(&mut out.base, i)?,
            }
        }
        Ok(())
    }
}

impl ColumnDecoder for ConvertingDecoder {
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
        if n > self.scratch.base().capacity {
            self.scratch.resize(n);
        }
        // decode the file representation, then convert row by row
        self.inner.next(&mut self.scratch, num_values, incoming_mask)?;

        {
            let source = self.scratch.base();
            let target = batch.base_mut();
            target.num_elements = source.num_elements;
            target.has_nulls = source.has_nulls;
            target.not_null[..n].copy_from_slice(&source.not_null[..n]);
        }

        match self.read_kind {
            TypeKind::Boolean | TypeKind::Byte | TypeKind::Short | TypeKind::Int
            | TypeKind::Long | TypeKind::Date => {
                let (lower, upper) = integer_bounds(self.read_kind).unwrap_or((i64::MIN, i64::MAX));
                match batch {
                    ColumnVectorBatch::Long(_) => self.fill_integer(
                        n,
                        lower,
                        upper,
                        |v| v,
                        |b| b.as_long_mut(),
                        batch,
                    ),
                    ColumnVectorBatch::Int(_) => self.fill_integer(
                        n,
                        lower,
                        upper,
                        |v| v as i32,
                        |b| b.as_int_mut(),
                        batch,
                    ),
                    ColumnVectorBatch::Short(_) => self.fill_integer(
                        n,
                        lower,
                        upper,
                        |v| v as i16,
                        |b| b.as_short_mut(),
                        batch,
                    ),
                    ColumnVectorBatch::Byte(_) => self.fill_integer(
                        n,
                        lower,
                        upper,
                        |v| v as i8,
                        |b| b.as_byte_mut(),
                        batch,
                    ),
                    _ => Err(OrcError::Unsupported(
                        "integer conversion needs an integer batch".to_string(),
                    )),
                }
            }
            TypeKind::Double => {
                let out = batch.as_double_mut()?;
                for i in 0..n {
                    if out.base.has_nulls && out.base.not_null[i] == 0 {
                        continue;
                    }
                    out.data[i] = self.source_value(i);
                }
                Ok(())
            }
            TypeKind::Float => {
                let out = batch.as_float_mut()?;
                for i in 0..n {
                    if out.base.has_nulls && out.base.not_null[i] == 0 {
                        continue;
                    }
                    out.data[i] = self.source_value(i) as f32;
                }
                Ok(())
            }
            other => Err(OrcError::Unsupported(format!(
                "conversion into {:?} is not implemented",
                other
            ))),
        }
    }

    fn skip(&mut self, num_values: u64) -> Result<u64> {
        self.inner.skip(num_values)
    }

    fn seek_to_row_group(&mut self, positions: &mut PositionMap) -> Result<()> {
        self.inner.seek_to_row_group(positions)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::parse_type;

    #[test]
    fn test_collect_conversions() {
        let file = parse_type("struct<a:int,b:struct<c:smallint,d:string>>").unwrap();
        let read = parse_type("struct<a:bigint,b:struct<c:smallint,d:string>>").unwrap();
        let evolution = SchemaEvolution::new(&read, &file);

        assert!(evolution.needs_conversion(file.subtype(0)));
        assert!(!evolution.needs_conversion(&file));
        assert!(!evolution.needs_conversion(file.subtype(1).subtype(0)));
        assert_eq!(
            evolution.read_type(1).map(|t| t.kind()),
            Some(TypeKind::Long)
        );
    }

    #[test]
    fn test_integer_bounds() {
        assert_eq!(integer_bounds(TypeKind::Byte), Some((-128, 127)));
        assert_eq!(integer_bounds(TypeKind::Boolean), Some((0, 1)));
        assert!(integer_bounds(TypeKind::String).is_none());
    }
}
