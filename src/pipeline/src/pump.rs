use std::io::{ErrorKind, Read, Write};

use memchr::memchr;
use memchr::memrchr;
use log::trace;

use crate::LineTranslator;
use crate::error::PumpError;

/// Longest input record the converter is expected to encounter.
pub const MAX_LINE_LENGTH: usize = 4096;

/// Number of maximum-length records batched into one downstream write.
pub const MAX_LINES_PER_BATCH: usize = 64;

/// Size of the upstream read buffer of a line-translating worker.
pub const SRC_BUFFER_SIZE: usize = MAX_LINE_LENGTH * MAX_LINES_PER_BATCH;

/// Initial output-buffer headroom relative to the read buffer. WIG fixedStep
/// declarations and multi-allelic VCF records may emit several BED lines per
/// input record.
pub const DST_EXPANSION_FACTOR: usize = 4;

/// Copy bytes from `reader` to `writer` until EOF. No parsing.
///
/// Serves both raw ends of a chain: feeding process stdin into the first pipe,
/// and draining the last pipe back out to process stdout. Dropping `writer` on
/// return is what propagates EOF to the next stage.
///
/// A broken pipe on the write side means the downstream stage stopped reading
/// (e.g. a helper exited); this is treated as end-of-stream, not as an error.
pub fn forward_bytes<R: Read, W: Write>(mut reader: R, mut writer: W) -> Result<(), PumpError> {
    let mut buf = vec![0_u8; SRC_BUFFER_SIZE];
    loop {
        let n = match reader.read(&mut buf) {
            Ok(0)  => break,
            Ok(n)  => n,
            Err(e) if e.kind() == ErrorKind::Interrupted => continue,
            Err(e) => return Err(e.into()),
        };
        match writer.write_all(&buf[..n]) {
            Ok(())                                       => (),
            Err(e) if e.kind() == ErrorKind::BrokenPipe  => break,
            Err(e)                                       => return Err(e.into()),
        }
    }
    flush_quietly(&mut writer)
}

/// Line-batched translating worker: the middle stage of every chain.
///
/// Reads from `reader` into a bounded buffer, partitions the filled region at
/// the last newline, hands each complete record to `xlate`, and writes the
/// accumulated output downstream in a single call per batch. Bytes after the
/// last newline are preserved as a remainder for the next read, so a record
/// split across two reads is never lost or truncated.
///
/// A record that ends exactly at the buffer boundary (newline included)
/// translates normally. A filled buffer with no newline at all means the input
/// carries a record longer than [`SRC_BUFFER_SIZE`] and aborts the conversion.
///
/// # Errors
/// - [`PumpError::LineTooLong`] when a full buffer contains no record terminator.
/// - [`PumpError::Translate`] when `xlate` rejects a record.
/// - [`PumpError::Io`] on any upstream read or downstream write failure other
///   than a broken pipe (which terminates cleanly, like EOF).
pub fn translate_lines<R, W, T>(mut reader: R, mut writer: W, xlate: &mut T) -> Result<(), PumpError>
where
    R: Read,
    W: Write,
    T: LineTranslator,
{
    let mut src = vec![0_u8; SRC_BUFFER_SIZE];
    let mut dst = Vec::with_capacity(SRC_BUFFER_SIZE * DST_EXPANSION_FACTOR);
    let mut remainder = 0_usize;

    loop {
        let n = match reader.read(&mut src[remainder..]) {
            Ok(0)  => break,
            Ok(n)  => n,
            Err(e) if e.kind() == ErrorKind::Interrupted => continue,
            Err(e) => return Err(e.into()),
        };
        let filled = remainder + n;

        // Index one past the last newline: everything before it is a whole
        // number of records, everything after it carries over to the next read.
        let split = match memrchr(b'\n', &src[..filled]) {
            Some(last)                      => last + 1,
            None if filled == src.len()     => return Err(PumpError::LineTooLong(src.len())),
            None                            => 0,
        };

        dst.clear();
        let mut offset = 0_usize;
        while offset < split {
            let end = offset + memchr(b'\n', &src[offset..split])
                .unwrap_or(split - offset);
            xlate.translate(&src[offset..end], &mut dst)?;
            offset = end + 1;
        }

        if !write_batch(&mut writer, &dst)? {
            return Ok(())
        }

        src.copy_within(split..filled, 0);
        remainder = filled - split;
        trace!("batch of {split} bytes translated, {remainder} byte remainder");
    }

    // Unterminated trailing record at EOF.
    if remainder > 0 {
        dst.clear();
        xlate.translate(&src[..remainder], &mut dst)?;
        write_batch(&mut writer, &dst)?;
    }
    flush_quietly(&mut writer)
}

/// Write one batch downstream. Returns `Ok(false)` when the peer is gone.
fn write_batch<W: Write>(writer: &mut W, batch: &[u8]) -> Result<bool, PumpError> {
    if batch.is_empty() {
        return Ok(true)
    }
    match writer.write_all(batch) {
        Ok(())                                      => Ok(true),
        Err(e) if e.kind() == ErrorKind::BrokenPipe => Ok(false),
        Err(e)                                      => Err(e.into()),
    }
}

fn flush_quietly<W: Write>(writer: &mut W) -> Result<(), PumpError> {
    match writer.flush() {
        Ok(())                                      => Ok(()),
        Err(e) if e.kind() == ErrorKind::BrokenPipe => Ok(()),
        Err(e)                                      => Err(e.into()),
    }
}
