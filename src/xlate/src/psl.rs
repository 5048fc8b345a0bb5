use std::io::Write;

use pipeline::LineTranslator;

use crate::XlateError;
use crate::fields::{self, Fields};

const FORMAT: &str = "psl";
const FIELD_COUNT: usize = 21;
// Headered PSL begins with a five-line layout preamble (version line, two
// column-name rows, separator dashes, blank).
const HEADER_LINES: u32 = 5;

// Field indices of interest within a 21-field PSL record.
const MATCHES: usize = 0;
const STRAND: usize = 8;
const Q_NAME: usize = 9;
const T_NAME: usize = 13;
const T_START: usize = 15;
const T_END: usize = 16;
const BLOCK_COUNT: usize = 17;
const BLOCK_SIZES: usize = 18;
const Q_STARTS: usize = 19;
const T_STARTS: usize = 20;

/// PSL to BED translator.
///
/// One BED line per record: `tName, tStart, tEnd, qName, matches, strand`,
/// followed by the remaining PSL fields in their original order. In split
/// mode, every alignment block becomes its own BED line instead, with a
/// trailing column naming the block index.
pub struct PslXlate {
    headered: bool,
    keep_header: bool,
    split: bool,
    header_seen: u32,
    tabs: Vec<usize>,
    block_sizes: Vec<u64>,
    q_starts: Vec<u64>,
    t_starts: Vec<u64>,
}

impl PslXlate {
    #[must_use]
    pub fn new(headered: bool, keep_header: bool, split: bool) -> Self {
        Self {
            headered,
            keep_header,
            split,
            header_seen: 0,
            tabs: Vec::new(),
            block_sizes: Vec::new(),
            q_starts: Vec::new(),
            t_starts: Vec::new(),
        }
    }
}

/// Parse one of the comma-separated u64 lists (`blockSizes`, `qStarts`,
/// `tStarts`). PSL lists end with a trailing comma, which parses as an empty
/// final element and is skipped.
fn parse_list(raw: &[u8], out: &mut Vec<u64>, field: &'static str) -> Result<(), XlateError> {
    out.clear();
    for piece in raw.split(|&byte| byte == b',') {
        if piece.is_empty() {
            continue
        }
        let value = std::str::from_utf8(piece)
            .ok()
            .and_then(|repr| repr.parse().ok())
            .ok_or_else(|| XlateError::invalid(FORMAT, field, raw))?;
        out.push(value);
    }
    Ok(())
}

fn emit_lead(dst: &mut Vec<u8>, fields: &Fields, start: &[u8], stop: &[u8]) {
    dst.extend_from_slice(fields.get(T_NAME));
    dst.push(b'\t');
    dst.extend_from_slice(start);
    dst.push(b'\t');
    dst.extend_from_slice(stop);
    dst.push(b'\t');
    dst.extend_from_slice(fields.get(Q_NAME));
    dst.push(b'\t');
    dst.extend_from_slice(fields.get(MATCHES));
    dst.push(b'\t');
    dst.extend_from_slice(fields.get(STRAND));
}

impl LineTranslator for PslXlate {
    fn translate(&mut self, src: &[u8], dst: &mut Vec<u8>) -> anyhow::Result<()> {
        if self.headered && self.header_seen < HEADER_LINES {
            if self.keep_header {
                crate::push_header_line(dst, self.header_seen, src)?;
            }
            self.header_seen += 1;
            return Ok(())
        }
        if src.is_empty() {
            return Ok(())
        }

        let fields = fields::scan(src, &mut self.tabs);
        if fields.count() != FIELD_COUNT {
            return Err(XlateError::FieldCount {
                format: FORMAT,
                expected: "exactly 21",
                found: fields.count(),
            }
            .into())
        }

        if !self.split {
            emit_lead(dst, &fields, fields.get(T_START), fields.get(T_END));
            // Remaining fields, in PSL order.
            for idx in [1, 2, 3, 4, 5, 6, 7, 10, 11, 12, 14, BLOCK_COUNT, BLOCK_SIZES, Q_STARTS, T_STARTS] {
                dst.push(b'\t');
                dst.extend_from_slice(fields.get(idx));
            }
            dst.push(b'\n');
            return Ok(())
        }

        let block_count: usize = fields.parse(FORMAT, "blockCount", BLOCK_COUNT)?;
        parse_list(fields.get(BLOCK_SIZES), &mut self.block_sizes, "blockSizes")?;
        parse_list(fields.get(Q_STARTS), &mut self.q_starts, "qStarts")?;
        parse_list(fields.get(T_STARTS), &mut self.t_starts, "tStarts")?;
        for (list, field) in [
            (&self.block_sizes, "blockSizes"),
            (&self.q_starts, "qStarts"),
            (&self.t_starts, "tStarts"),
        ] {
            if list.len() != block_count {
                return Err(XlateError::invalid(FORMAT, field, fields.get(BLOCK_COUNT)).into())
            }
        }

        for block in 0..block_count {
            let start = self.t_starts[block];
            let stop = start + self.block_sizes[block];
            emit_lead(dst, &fields, start.to_string().as_bytes(), stop.to_string().as_bytes());
            write!(dst, "\t{block}")?;
            dst.push(b'\n');
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    const RECORD: &[u8] = b"50\t1\t0\t0\t0\t0\t1\t10\t+\tquery1\t60\t0\t51\tchr7\t1000\t100\t161\t2\t25,26,\t0,25,\t100,135,";

    fn translate(xlate: &mut PslXlate, src: &[u8]) -> Vec<u8> {
        let mut dst = Vec::new();
        xlate.translate(src, &mut dst).unwrap();
        dst
    }

    #[test]
    fn basic_column_mapping() {
        let mut xlate = PslXlate::new(false, false, false);
        let bed = translate(&mut xlate, RECORD);
        assert!(bed.starts_with(b"chr7\t100\t161\tquery1\t50\t+\t"));
        assert!(bed.ends_with(b"\t2\t25,26,\t0,25,\t100,135,\n"));
    }

    #[test]
    fn split_emits_one_line_per_block() {
        let mut xlate = PslXlate::new(false, false, true);
        let bed = translate(&mut xlate, RECORD);
        let lines: Vec<&[u8]> = bed.split(|&b| b == b'\n').filter(|l| !l.is_empty()).collect();
        assert_eq!(lines.len(), 2);
        assert_eq!(lines[0], b"chr7\t100\t125\tquery1\t50\t+\t0".as_slice());
        assert_eq!(lines[1], b"chr7\t135\t161\tquery1\t50\t+\t1".as_slice());
    }

    #[test]
    fn headered_mode_skips_the_preamble() {
        let mut xlate = PslXlate::new(true, false, false);
        for line in [
            b"psLayout version 3".as_slice(),
            b"",
            b"match\tmis-\trep.\tN's",
            b"     \tmatch\tmatch\t   ",
            b"---------------------------------",
        ] {
            assert!(translate(&mut xlate, line).is_empty());
        }
        assert!(translate(&mut xlate, RECORD).starts_with(b"chr7\t100\t161\t"));
    }

    #[test]
    fn headered_keep_header_preserves_the_preamble() {
        let mut xlate = PslXlate::new(true, true, false);
        assert_eq!(
            translate(&mut xlate, b"psLayout version 3"),
            b"_header\t0\t1\tpsLayout version 3\n"
        );
    }

    #[test]
    fn block_list_length_mismatch_is_an_error() {
        // Claims three blocks while listing two.
        let mut xlate = PslXlate::new(false, false, true);
        let record = String::from_utf8_lossy(RECORD).replace("\t2\t25,26,", "\t3\t25,26,");
        let mut dst = Vec::new();
        assert!(xlate.translate(record.as_bytes(), &mut dst).is_err());
    }

    #[test]
    fn wrong_field_count_is_an_error() {
        let mut xlate = PslXlate::new(false, false, false);
        let mut dst = Vec::new();
        assert!(xlate.translate(b"50\t1\t0", &mut dst).is_err());
    }
}
