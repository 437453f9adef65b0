//! Seekable byte streams and row-group seek cursors
//!
//! A decoder pulls its bytes from [`SeekableStream`]s handed out by the
//! stripe. Chunks come back as [`Bytes`], so a decoder can hold on to the
//! tail of a chunk across `next` calls without borrowing from the stream.
//! [`StreamCursor`] wraps a stream with exactly that carry-over bookkeeping
//! plus the small-read helpers (single bytes, varints, exact fills) the
//! decoders share.
//!
//! Row-group seeks are driven by [`PositionProvider`]s: each column gets a
//! sequence of integer checkpoints which its streams consume in a fixed
//! order (byte offset for plain streams, compressed-block offset plus
//! uncompressed offset for compressed ones, then per-encoding sub-cursors
//! such as run offsets and bit positions).

use std::collections::HashMap;

use bytes::Bytes;

use crate::error::{ParseError, Result};

/// A byte stream that supports sequential chunked reads, skipping, and
/// repositioning from recorded index positions.
pub trait SeekableStream: Send {
    /// Return the next chunk of the stream, or `None` at end of stream.
    fn next_chunk(&mut self) -> Result<Option<Bytes>>;

    /// Advance the stream by exactly `bytes` bytes.
    fn skip(&mut self, bytes: u64) -> Result<()>;

    /// Reposition the stream from the next recorded positions.
    fn seek(&mut self, position: &mut PositionProvider) -> Result<()>;

    /// Diagnostic name of the stream, used in error messages.
    fn name(&self) -> String;
}

/// Yields the recorded seek checkpoints for one column, in order.
#[derive(Debug, Clone)]
pub struct PositionProvider {
    positions: Vec<u64>,
    index: usize,
}

impl PositionProvider {
    pub fn new(positions: Vec<u64>) -> Self {
        PositionProvider { positions, index: 0 }
    }

    /// Consume the next checkpoint.
    pub fn next(&mut self) -> Result<u64> {
        let value = self.positions.get(self.index).copied().ok_or_else(|| {
            ParseError::InvalidData("ran out of seek positions".to_string())
        })?;
        self.index += 1;
        Ok(value)
    }
}

/// Per-column seek checkpoints for one row group.
#[derive(Debug, Default)]
pub struct PositionMap {
    providers: HashMap<u64, PositionProvider>,
}

impl PositionMap {
    pub fn new() -> Self {
        PositionMap::default()
    }

    /// Register the checkpoint list for a column.
    pub fn insert(&mut self, column_id: u64, positions: Vec<u64>) {
        self.providers
            .insert(column_id, PositionProvider::new(positions));
    }

    /// The provider for a column. Streams of the same column share one
    /// provider and consume from it in declared order.
    pub fn position(&mut self, column_id: u64) -> Result<&mut PositionProvider> {
        self.providers
            .get_mut(&column_id)
            .ok_or_else(|| ParseError::MissingPosition(column_id).into())
    }
}

/// An uncompressed in-memory stream.
///
/// Chunk size is configurable so tests can force values to straddle chunk
/// boundaries; by default the whole remainder comes back as one chunk.
pub struct MemoryStream {
    data: Bytes,
    offset: usize,
    chunk_size: usize,
    name: String,
}

impl MemoryStream {
    pub fn new(data: Bytes, name: impl Into<String>) -> Self {
        let chunk_size = data.len().max(1);
        MemoryStream {
            data,
            offset: 0,
            chunk_size,
            name: name.into(),
        }
    }

    pub fn with_chunk_size(mut self, chunk_size: usize) -> Self {
        self.chunk_size = chunk_size.max(1);
        self
    }
}

impl SeekableStream for MemoryStream {
    fn next_chunk(&mut self) -> Result<Option<Bytes>> {
        if self.offset >= self.data.len() {
            return Ok(None);
        }
        let end = (self.offset + self.chunk_size).min(self.data.len());
        let chunk = self.data.slice(self.offset..end);
        self.offset = end;
        Ok(Some(chunk))
    }

    fn skip(&mut self, bytes: u64) -> Result<()> {
        let remaining = (self.data.len() - self.offset) as u64;
        if bytes > remaining {
            return Err(ParseError::UnexpectedEof(self.name.clone()).into());
        }
        self.offset += bytes as usize;
        Ok(())
    }

    fn seek(&mut self, position: &mut PositionProvider) -> Result<()> {
        let offset = position.next()? as usize;
        if offset > self.data.len() {
            return Err(ParseError::InvalidData(format!(
                "seek past end of {}",
                self.name
            ))
            .into());
        }
        self.offset = offset;
        Ok(())
    }

    fn name(&self) -> String {
        self.name.clone()
    }
}

/// Wraps a stream with carry-over chunk state and small-read helpers.
///
/// The cursor owns the current chunk, so bytes left over from one decode
/// call are still there for the next one. A seek drops the carry-over.
pub struct StreamCursor {
    stream: Box<dyn SeekableStream>,
    chunk: Bytes,
    position: usize,
}

impl StreamCursor {
    pub fn new(stream: Box<dyn SeekableStream>) -> Self {
        StreamCursor {
            stream,
            chunk: Bytes::new(),
            position: 0,
        }
    }

    pub fn name(&self) -> String {
        self.stream.name()
    }

    /// Bytes buffered in the current chunk.
    pub fn buffered(&self) -> usize {
        self.chunk.len() - self.position
    }

    /// The unread remainder of the current chunk.
    pub fn chunk_remaining(&self) -> &[u8] {
        &self.chunk[self.position..]
    }

    /// Mark `n` bytes of the current chunk as consumed.
    pub fn consume(&mut self, n: usize) {
        debug_assert!(n <= self.buffered());
        self.position += n;
    }

    /// Pull chunks until at least one unread byte is buffered.
    fn fill(&mut self) -> Result<()> {
        while self.position == self.chunk.len() {
            match self.stream.next_chunk()? {
                Some(chunk) => {
                    self.chunk = chunk;
                    self.position = 0;
                }
                None => {
                    return Err(ParseError::UnexpectedEof(self.stream.name()).into());
                }
            }
        }
        Ok(())
    }

    /// Read a single byte.
    pub fn read_u8(&mut self) -> Result<u8> {
        self.fill()?;
        let byte = self.chunk[self.position];
        self.position += 1;
        Ok(byte)
    }

    /// Fill `out` completely, pulling as many chunks as needed.
    pub fn read_into(&mut self, out: &mut [u8]) -> Result<()> {
        let mut filled = 0;
        while filled < out.len() {
            self.fill()?;
            let available = self.buffered().min(out.len() - filled);
            out[filled..filled + available]
                .copy_from_slice(&self.chunk[self.position..self.position + available]);
            self.position += available;
            filled += available;
        }
        Ok(())
    }

    /// Skip `bytes` bytes, draining the buffered chunk before asking the
    /// stream to skip the rest in bounded steps.
    pub fn skip_bytes(&mut self, bytes: u64) -> Result<()> {
        let buffered = self.buffered() as u64;
        if bytes <= buffered {
            self.position += bytes as usize;
            return Ok(());
        }
        let mut remaining = bytes - buffered;
        self.chunk = Bytes::new();
        self.position = 0;
        let cap = i32::MAX as u64;
        while remaining != 0 {
            let step = remaining.min(cap);
            self.stream.skip(step)?;
            remaining -= step;
        }
        Ok(())
    }

    /// Reposition the underlying stream and drop the carry-over chunk.
    pub fn seek(&mut self, position: &mut PositionProvider) -> Result<()> {
        self.stream.seek(position)?;
        self.chunk = Bytes::new();
        self.position = 0;
        Ok(())
    }

    /// Decode an unsigned base-128 varint.
    pub fn read_vulong(&mut self) -> Result<u64> {
        let mut result: u64 = 0;
        let mut shift: u32 = 0;
        loop {
            let byte = self.read_u8()?;
            result |= ((byte & 0x7F) as u64) << shift;
            if byte & 0x80 == 0 {
                return Ok(result);
            }
            shift += 7;
            if shift >= 64 {
                return Err(ParseError::InvalidVarint(self.stream.name()).into());
            }
        }
    }

    /// Decode a signed, zig-zag mapped varint.
    pub fn read_vslong(&mut self) -> Result<i64> {
        self.read_vulong().map(unzigzag)
    }

    /// Skip one varint without decoding it.
    pub fn skip_vint(&mut self) -> Result<()> {
        while self.read_u8()? & 0x80 != 0 {}
        Ok(())
    }
}

/// Undo the zig-zag mapping `(n << 1) ^ (n >> 63)`.
#[inline]
pub fn unzigzag(value: u64) -> i64 {
    ((value >> 1) as i64) ^ -((value & 1) as i64)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cursor_over(data: &'static [u8], chunk_size: usize) -> StreamCursor {
        StreamCursor::new(Box::new(
            MemoryStream::new(Bytes::from_static(data), "test").with_chunk_size(chunk_size),
        ))
    }

    #[test]
    fn test_read_u8_across_chunks() {
        let mut cursor = cursor_over(&[1, 2, 3, 4, 5], 2);
        for expected in 1..=5u8 {
            assert_eq!(cursor.read_u8().unwrap(), expected);
        }
        assert!(matches!(
            cursor.read_u8().unwrap_err(),
            crate::error::OrcError::Parse(ParseError::UnexpectedEof(_))
        ));
    }

    #[test]
    fn test_read_into_across_chunks() {
        let mut cursor = cursor_over(b"hello world", 3);
        let mut out = [0u8; 11];
        cursor.read_into(&mut out).unwrap();
        assert_eq!(&out, b"hello world");
    }

    #[test]
    fn test_skip_bytes_uses_buffer_first() {
        let mut cursor = cursor_over(&[0, 1, 2, 3, 4, 5, 6, 7], 4);
        cursor.read_u8().unwrap();
        cursor.skip_bytes(5).unwrap();
        assert_eq!(cursor.read_u8().unwrap(), 6);
    }

    #[test]
    fn test_read_vulong() {
        // 0, 1, 127, 128, 16384
        let mut cursor = cursor_over(&[0x00, 0x01, 0x7F, 0x80, 0x01, 0x80, 0x80, 0x01], 1);
        assert_eq!(cursor.read_vulong().unwrap(), 0);
        assert_eq!(cursor.read_vulong().unwrap(), 1);
        assert_eq!(cursor.read_vulong().unwrap(), 127);
        assert_eq!(cursor.read_vulong().unwrap(), 128);
        assert_eq!(cursor.read_vulong().unwrap(), 16384);
    }

    #[test]
    fn test_read_vslong() {
        let mut cursor = cursor_over(&[0x00, 0x01, 0x02, 0x03, 0x04], 5);
        assert_eq!(cursor.read_vslong().unwrap(), 0);
        assert_eq!(cursor.read_vslong().unwrap(), -1);
        assert_eq!(cursor.read_vslong().unwrap(), 1);
        assert_eq!(cursor.read_vslong().unwrap(), -2);
        assert_eq!(cursor.read_vslong().unwrap(), 2);
    }

    #[test]
    fn test_vulong_overflow() {
        let mut cursor = cursor_over(&[0xFF; 11], 11);
        assert!(matches!(
            cursor.read_vulong().unwrap_err(),
            crate::error::OrcError::Parse(ParseError::InvalidVarint(_))
        ));
    }

    #[test]
    fn test_memory_stream_seek() {
        let mut stream = MemoryStream::new(Bytes::from_static(&[9, 8, 7, 6]), "s");
        let mut provider = PositionProvider::new(vec![2]);
        stream.seek(&mut provider).unwrap();
        assert_eq!(stream.next_chunk().unwrap().unwrap().as_ref(), &[7, 6]);
    }

    #[test]
    fn test_position_map() {
        let mut map = PositionMap::new();
        map.insert(3, vec![10, 20]);
        let provider = map.position(3).unwrap();
        assert_eq!(provider.next().unwrap(), 10);
        // the same provider is handed out again, already advanced
        let provider = map.position(3).unwrap();
        assert_eq!(provider.next().unwrap(), 20);
        assert!(provider.next().is_err());
        assert!(map.position(4).is_err());
    }
}
