//! Benchmark suite for column decode throughput
//!
//! Measures rows/second through the decoder tree for representative
//! column shapes: dense integers, nullable integers, direct strings and
//! dictionary strings.

use std::hint::black_box;

use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};

use freighter::schema::{OrcType, TypeKind};
use freighter::stripe::{ColumnEncoding, DecoderOptions, MemoryStripe};
use freighter::{build_decoder, StreamKind};

const ROWS: usize = 100_000;
const BATCH: u64 = 1024;

fn varint(mut value: u64) -> Vec<u8> {
    let mut out = Vec::new();
    loop {
        let mut byte = (value & 0x7F) as u8;
        value >>= 7;
        if value != 0 {
            byte |= 0x80;
        }
        out.push(byte);
        if value == 0 {
            break;
        }
    }
    out
}

fn rle_v1_signed(values: &[i64]) -> Vec<u8> {
    let mut out = Vec::new();
    for chunk in values.chunks(128) {
        out.push((256 - chunk.len()) as u8);
        for &value in chunk {
            let zigzag = ((value << 1) ^ (value >> 63)) as u64;
            out.extend_from_slice(&varint(zigzag));
        }
    }
    out
}

fn rle_v1_unsigned(values: &[u64]) -> Vec<u8> {
    let mut out = Vec::new();
    for chunk in values.chunks(128) {
        out.push((256 - chunk.len()) as u8);
        for &value in chunk {
            out.extend_from_slice(&varint(value));
        }
    }
    out
}

fn bench_integers(c: &mut Criterion) {
    let values: Vec<i64> = (0..ROWS as i64).map(|i| i * 31 % 100_000 - 50_000).collect();
    let data = rle_v1_signed(&values);

    let mut group = c.benchmark_group("decode_integers");
    group.throughput(Throughput::Elements(ROWS as u64));
    group.bench_function(BenchmarkId::from_parameter("dense"), |b| {
        let ty = OrcType::primitive(TypeKind::Long).with_ids();
        let options = DecoderOptions::default();
        b.iter(|| {
            let stripe = MemoryStripe::builder()
                .stream(0, StreamKind::Data, data.clone())
                .build();
            let mut decoder = build_decoder(&ty, &stripe, &options).unwrap();
            let mut batch = ty.create_row_batch(BATCH as usize, &options);
            let mut remaining = ROWS as u64;
            while remaining > 0 {
                let step = remaining.min(BATCH);
                decoder.next(&mut batch, step, None).unwrap();
                black_box(&batch);
                remaining -= step;
            }
        });
    });
    group.finish();
}

fn bench_strings(c: &mut Criterion) {
    let lengths: Vec<u64> = (0..ROWS as u64).map(|i| i % 16).collect();
    let blob: Vec<u8> = (0..lengths.iter().sum::<u64>()).map(|i| (i % 251) as u8).collect();
    let length_stream = rle_v1_unsigned(&lengths);

    let mut group = c.benchmark_group("decode_strings");
    group.throughput(Throughput::Elements(ROWS as u64));

    group.bench_function(BenchmarkId::from_parameter("direct"), |b| {
        let ty = OrcType::primitive(TypeKind::String).with_ids();
        let options = DecoderOptions::default();
        b.iter(|| {
            let stripe = MemoryStripe::builder()
                .stream(0, StreamKind::Length, length_stream.clone())
                .stream(0, StreamKind::Data, blob.clone())
                .build();
            let mut decoder = build_decoder(&ty, &stripe, &options).unwrap();
            let mut batch = ty.create_row_batch(BATCH as usize, &options);
            let mut remaining = ROWS as u64;
            while remaining > 0 {
                let step = remaining.min(BATCH);
                decoder.next(&mut batch, step, None).unwrap();
                black_box(&batch);
                remaining -= step;
            }
        });
    });

    // dictionary of 64 entries, indices cycling through it
    let dict_lengths: Vec<u64> = (0..64u64).map(|i| i % 8 + 1).collect();
    let dict_blob: Vec<u8> = (0..dict_lengths.iter().sum::<u64>())
        .map(|i| (i % 251) as u8)
        .collect();
    let indices: Vec<u64> = (0..ROWS as u64).map(|i| i % 64).collect();
    let dict_length_stream = rle_v1_unsigned(&dict_lengths);
    let index_stream = rle_v1_unsigned(&indices);

    group.bench_function(BenchmarkId::from_parameter("dictionary"), |b| {
        let ty = OrcType::primitive(TypeKind::String).with_ids();
        let options = DecoderOptions::default();
        b.iter(|| {
            let stripe = MemoryStripe::builder()
                .encoding(0, ColumnEncoding::dictionary(64))
                .stream(0, StreamKind::Length, dict_length_stream.clone())
                .stream(0, StreamKind::DictionaryData, dict_blob.clone())
                .stream(0, StreamKind::Data, index_stream.clone())
                .build();
            let mut decoder = build_decoder(&ty, &stripe, &options).unwrap();
            let mut batch = ty.create_row_batch(BATCH as usize, &options);
            let mut remaining = ROWS as u64;
            while remaining > 0 {
                let step = remaining.min(BATCH);
                decoder.next(&mut batch, step, None).unwrap();
                black_box(&batch);
                remaining -= step;
            }
        });
    });

    group.finish();
}

criterion_group!(benches, bench_integers, bench_strings);
criterion_main!(benches);
