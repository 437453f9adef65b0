//! Compression codec support for ORC stream blocks
//!
//! ORC compresses streams in independent blocks. Each block starts with a
//! 3-byte little-endian header holding `(length << 1) | is_original`; when
//! the low bit is set the block bytes are stored uncompressed. Row-group
//! positions into a compressed stream therefore come in pairs: the offset
//! of a block header, then an offset into that block's uncompressed bytes.

use bytes::Bytes;

use crate::error::{CodecError, ParseError, Result};
use crate::stream::{PositionProvider, SeekableStream};

#[cfg(feature = "zlib")]
use std::io::Read;

/// Compression applied to the blocks of a stream.
///
/// The numeric codes match the ORC postscript values.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CompressionKind {
    /// No compression (streams are raw; no block framing)
    #[default]
    None,
    /// Raw DEFLATE (the format calls it zlib, but there is no zlib wrapper)
    Zlib,
    /// Raw snappy blocks
    Snappy,
    /// LZO (not supported by this crate)
    Lzo,
    /// LZ4 block format
    Lz4,
    /// Zstandard
    Zstd,
}

impl CompressionKind {
    /// Parse a postscript compression code.
    pub fn from_code(code: u8) -> Result<Self> {
        match code {
            0 => Ok(CompressionKind::None),
            1 => Ok(CompressionKind::Zlib),
            2 => Ok(CompressionKind::Snappy),
            3 => Ok(CompressionKind::Lzo),
            4 => Ok(CompressionKind::Lz4),
            5 => Ok(CompressionKind::Zstd),
            other => Err(CodecError::UnsupportedCodec(format!(
                "unknown compression code {}",
                other
            ))
            .into()),
        }
    }

    /// Canonical name of the codec.
    pub fn name(&self) -> &'static str {
        match self {
            CompressionKind::None => "none",
            CompressionKind::Zlib => "zlib",
            CompressionKind::Snappy => "snappy",
            CompressionKind::Lzo => "lzo",
            CompressionKind::Lz4 => "lz4",
            CompressionKind::Zstd => "zstd",
        }
    }

    /// Decompress one block. `max_size` bounds the uncompressed output and
    /// is normally the writer's compression block size.
    pub fn decompress(&self, data: &[u8], max_size: usize) -> std::result::Result<Vec<u8>, CodecError> {
        match self {
            CompressionKind::None => Ok(data.to_vec()),

            #[cfg(feature = "zlib")]
            CompressionKind::Zlib => decompress_zlib(data),
            #[cfg(not(feature = "zlib"))]
            CompressionKind::Zlib => Err(CodecError::UnsupportedCodec(
                "zlib codec not enabled; enable the 'zlib' feature".to_string(),
            )),

            #[cfg(feature = "snappy")]
            CompressionKind::Snappy => decompress_snappy(data),
            #[cfg(not(feature = "snappy"))]
            CompressionKind::Snappy => Err(CodecError::UnsupportedCodec(
                "snappy codec not enabled; enable the 'snappy' feature".to_string(),
            )),

            CompressionKind::Lzo => Err(CodecError::UnsupportedCodec(
                "LZO compression is not supported".to_string(),
            )),

            #[cfg(feature = "lz4")]
            CompressionKind::Lz4 => decompress_lz4(data, max_size),
            #[cfg(not(feature = "lz4"))]
            CompressionKind::Lz4 => Err(CodecError::UnsupportedCodec(
                "lz4 codec not enabled; enable the 'lz4' feature".to_string(),
            )),

            #[cfg(feature = "zstd")]
            CompressionKind::Zstd => decompress_zstd(data),
            #[cfg(not(feature = "zstd"))]
            CompressionKind::Zstd => Err(CodecError::UnsupportedCodec(
                "zstd codec not enabled; enable the 'zstd' feature".to_string(),
            )),
        }
    }
}

/// Decompress raw DEFLATE data.
#[cfg(feature = "zlib")]
fn decompress_zlib(data: &[u8]) -> std::result::Result<Vec<u8>, CodecError> {
    let mut decoder = flate2::read::DeflateDecoder::new(data);
    let mut decompressed = Vec::new();
    decoder
        .read_to_end(&mut decompressed)
        .map_err(|e| CodecError::DecompressionError(format!("zlib: {}", e)))?;
    Ok(decompressed)
}

/// Decompress a raw snappy block.
#[cfg(feature = "snappy")]
fn decompress_snappy(data: &[u8]) -> std::result::Result<Vec<u8>, CodecError> {
    snap::raw::Decoder::new()
        .decompress_vec(data)
        .map_err(|e| CodecError::DecompressionError(format!("snappy: {}", e)))
}

/// Decompress an LZ4 block. The uncompressed size is not stored, so the
/// output buffer is sized to the compression block size.
#[cfg(feature = "lz4")]
fn decompress_lz4(data: &[u8], max_size: usize) -> std::result::Result<Vec<u8>, CodecError> {
    let mut output = vec![0u8; max_size];
    let written = lz4_flex::block::decompress_into(data, &mut output)
        .map_err(|e| CodecError::DecompressionError(format!("lz4: {}", e)))?;
    output.truncate(written);
    Ok(output)
}

/// Decompress a zstd frame.
#[cfg(feature = "zstd")]
fn decompress_zstd(data: &[u8]) -> std::result::Result<Vec<u8>, CodecError> {
    zstd::stream::decode_all(data)
        .map_err(|e| CodecError::DecompressionError(format!("zstd: {}", e)))
}

/// Default compression block size used when the writer did not record one.
pub const DEFAULT_BLOCK_SIZE: usize = 256 * 1024;

/// A [`SeekableStream`] over block-compressed stream bytes.
///
/// Each `next_chunk` yields one decompressed block (original blocks come
/// back zero-copy). Seeking consumes two positions: the byte offset of a
/// block header, then the offset into that block's uncompressed bytes.
pub struct DecompressedStream {
    kind: CompressionKind,
    data: Bytes,
    offset: usize,
    pending: Bytes,
    block_size: usize,
    name: String,
}

impl DecompressedStream {
    pub fn new(
        kind: CompressionKind,
        data: Bytes,
        block_size: usize,
        name: impl Into<String>,
    ) -> Self {
        DecompressedStream {
            kind,
            data,
            offset: 0,
            pending: Bytes::new(),
            block_size: block_size.max(1),
            name: name.into(),
        }
    }

    /// Read the block at the current offset and advance past it.
    fn read_block(&mut self) -> Result<Option<Bytes>> {
        if self.offset >= self.data.len() {
            return Ok(None);
        }
        if self.offset + 3 > self.data.len() {
            return Err(CodecError::CorruptBlock(format!(
                "truncated block header in {}",
                self.name
            ))
            .into());
        }
        let b = &self.data[self.offset..];
        let header = (b[0] as usize) | (b[1] as usize) << 8 | (b[2] as usize) << 16;
        let is_original = header & 1 == 1;
        let length = header >> 1;
        let start = self.offset + 3;
        let end = start + length;
        if end > self.data.len() {
            return Err(CodecError::CorruptBlock(format!(
                "block of {} bytes overruns {}",
                length, self.name
            ))
            .into());
        }
        self.offset = end;
        if is_original {
            Ok(Some(self.data.slice(start..end)))
        } else {
            let decompressed = self
                .kind
                .decompress(&self.data[start..end], self.block_size)?;
            Ok(Some(Bytes::from(decompressed)))
        }
    }
}

impl SeekableStream for DecompressedStream {
    fn next_chunk(&mut self) -> Result<Option<Bytes>> {
        if !self.pending.is_empty() {
            return Ok(Some(std::mem::take(&mut self.pending)));
        }
        self.read_block()
    }

    fn skip(&mut self, bytes: u64) -> Result<()> {
        let mut remaining = bytes;
        while remaining > 0 {
            if self.pending.is_empty() {
                self.pending = match self.read_block()? {
                    Some(block) => block,
                    None => return Err(ParseError::UnexpectedEof(self.name.clone()).into()),
                };
                continue;
            }
            let step = (self.pending.len() as u64).min(remaining);
            self.pending = self.pending.slice(step as usize..);
            remaining -= step;
        }
        Ok(())
    }

    fn seek(&mut self, position: &mut PositionProvider) -> Result<()> {
        let block_offset = position.next()? as usize;
        if block_offset > self.data.len() {
            return Err(ParseError::InvalidData(format!(
                "seek past end of {}",
                self.name
            ))
            .into());
        }
        self.offset = block_offset;
        self.pending = Bytes::new();
        let uncompressed_offset = position.next()?;
        if uncompressed_offset > 0 {
            self.skip(uncompressed_offset)?;
        }
        Ok(())
    }

    fn name(&self) -> String {
        self.name.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_compression_kind_codes() {
        assert_eq!(CompressionKind::from_code(0).unwrap(), CompressionKind::None);
        assert_eq!(CompressionKind::from_code(1).unwrap(), CompressionKind::Zlib);
        assert_eq!(CompressionKind::from_code(5).unwrap(), CompressionKind::Zstd);
        assert!(CompressionKind::from_code(9).is_err());
        assert_eq!(CompressionKind::Lz4.name(), "lz4");
    }

    #[test]
    fn test_lzo_unsupported() {
        let err = CompressionKind::Lzo.decompress(&[0], 16).unwrap_err();
        assert!(err.to_string().contains("LZO"));
    }

    /// Frame a payload as one original (uncompressed) block.
    fn original_block(payload: &[u8]) -> Vec<u8> {
        let header = (payload.len() << 1) | 1;
        let mut out = vec![
            (header & 0xFF) as u8,
            ((header >> 8) & 0xFF) as u8,
            ((header >> 16) & 0xFF) as u8,
        ];
        out.extend_from_slice(payload);
        out
    }

    #[test]
    fn test_original_blocks_roundtrip() {
        let mut data = original_block(b"hello ");
        data.extend_from_slice(&original_block(b"world"));
        let mut stream = DecompressedStream::new(
            CompressionKind::Zlib,
            Bytes::from(data),
            DEFAULT_BLOCK_SIZE,
            "test",
        );
        assert_eq!(stream.next_chunk().unwrap().unwrap().as_ref(), b"hello ");
        assert_eq!(stream.next_chunk().unwrap().unwrap().as_ref(), b"world");
        assert!(stream.next_chunk().unwrap().is_none());
    }

    #[test]
    fn test_skip_across_blocks() {
        let mut data = original_block(b"abc");
        data.extend_from_slice(&original_block(b"defgh"));
        let mut stream = DecompressedStream::new(
            CompressionKind::Zlib,
            Bytes::from(data),
            DEFAULT_BLOCK_SIZE,
            "test",
        );
        stream.skip(5).unwrap();
        assert_eq!(stream.next_chunk().unwrap().unwrap().as_ref(), b"fgh");
    }

    #[test]
    fn test_seek_to_block_and_offset() {
        let first = original_block(b"abc");
        let second = original_block(b"defgh");
        let mut data = first.clone();
        data.extend_from_slice(&second);
        let mut stream = DecompressedStream::new(
            CompressionKind::Zlib,
            Bytes::from(data),
            DEFAULT_BLOCK_SIZE,
            "test",
        );
        // position pair: header offset of the second block, 2 bytes in
        let mut provider = PositionProvider::new(vec![first.len() as u64, 2]);
        stream.seek(&mut provider).unwrap();
        assert_eq!(stream.next_chunk().unwrap().unwrap().as_ref(), b"fgh");
    }

    #[test]
    fn test_truncated_header() {
        let mut stream = DecompressedStream::new(
            CompressionKind::Zlib,
            Bytes::from_static(&[0x08, 0x00]),
            DEFAULT_BLOCK_SIZE,
            "test",
        );
        assert!(stream.next_chunk().is_err());
    }

    #[cfg(feature = "zlib")]
    #[test]
    fn test_zlib_block_roundtrip() {
        use std::io::Write;

        let payload = b"a longer payload that deflate can actually shrink, \
                        a longer payload that deflate can actually shrink";
        let mut encoder =
            flate2::write::DeflateEncoder::new(Vec::new(), flate2::Compression::default());
        encoder.write_all(payload).unwrap();
        let compressed = encoder.finish().unwrap();

        let header = compressed.len() << 1; // low bit clear: compressed
        let mut data = vec![
            (header & 0xFF) as u8,
            ((header >> 8) & 0xFF) as u8,
            ((header >> 16) & 0xFF) as u8,
        ];
        data.extend_from_slice(&compressed);

        let mut stream = DecompressedStream::new(
            CompressionKind::Zlib,
            Bytes::from(data),
            DEFAULT_BLOCK_SIZE,
            "test",
        );
        assert_eq!(stream.next_chunk().unwrap().unwrap().as_ref(), payload);
    }
}
