use std::io::Write;

use memchr::memchr;
use pipeline::LineTranslator;

use crate::fields;

const FORMAT: &str = "gff";
const FIELD_COUNT: usize = 9;
const FASTA_PRAGMA: &[u8] = b"##FASTA";
const ZERO_LENGTH_ATTRIBUTE: &[u8] = b";zero_length_insertion=True";

/// GFF3 to BED translator.
///
/// GFF fields: seqid, source, type, start, end, score, strand, phase,
/// attributes (both coordinates 1-based, inclusive). The emitted BED line is
/// `seqid, start-1, end, id, score, strand, source, type, phase, attributes`,
/// with `id` extracted from the `ID=` attribute.
///
/// A `##FASTA` pragma ends record territory: everything after it is ignored.
pub struct GffXlate {
    keep_header: bool,
    header_idx: u32,
    in_fasta: bool,
    tabs: Vec<usize>,
}

impl GffXlate {
    #[must_use]
    pub fn new(keep_header: bool) -> Self {
        Self { keep_header, header_idx: 0, in_fasta: false, tabs: Vec::new() }
    }
}

/// Value of the `ID=` attribute, if present.
fn attribute_id(attributes: &[u8]) -> Option<&[u8]> {
    let mut offset = 0;
    while offset < attributes.len() {
        let end = memchr(b';', &attributes[offset..]).map_or(attributes.len(), |idx| offset + idx);
        if let Some(value) = attributes[offset..end].trim_ascii_start().strip_prefix(b"ID=") {
            return Some(value)
        }
        offset = end + 1;
    }
    None
}

impl LineTranslator for GffXlate {
    fn translate(&mut self, src: &[u8], dst: &mut Vec<u8>) -> anyhow::Result<()> {
        if self.in_fasta || src.is_empty() {
            return Ok(())
        }
        if src == FASTA_PRAGMA {
            self.in_fasta = true;
            return Ok(())
        }
        if src[0] == b'#' {
            // `##` pragmas (e.g. `##gff-version 3`) and plain comments.
            if self.keep_header {
                crate::push_header_line(dst, self.header_idx, src)?;
                self.header_idx += 1;
            }
            return Ok(())
        }

        let fields = fields::scan(src, &mut self.tabs);
        if fields.count() != FIELD_COUNT {
            return Err(crate::XlateError::FieldCount {
                format: FORMAT,
                expected: "exactly 9",
                found: fields.count(),
            }
            .into())
        }

        let start: u64 = fields.parse(FORMAT, "start", 3)?;
        let end: u64 = fields.parse(FORMAT, "end", 4)?;

        // A start past the end marks a zero-length insertion between the two
        // coordinates; swap them and annotate the attributes column.
        let zero_length = start > end;
        let (from, to) = if zero_length {
            (end.saturating_sub(1), start)
        } else {
            (start.saturating_sub(1), end)
        };

        dst.extend_from_slice(fields.get(0)); // seqid
        write!(dst, "\t{from}\t{to}\t")?;
        match attribute_id(fields.get(8)) {
            Some(id) => dst.extend_from_slice(id),
            None     => dst.push(b'.'),
        }
        dst.push(b'\t');
        dst.extend_from_slice(fields.get(5)); // score
        dst.push(b'\t');
        dst.extend_from_slice(fields.get(6)); // strand
        dst.push(b'\t');
        dst.extend_from_slice(fields.get(1)); // source
        dst.push(b'\t');
        dst.extend_from_slice(fields.get(2)); // type
        dst.push(b'\t');
        dst.extend_from_slice(fields.get(7)); // phase
        dst.push(b'\t');
        dst.extend_from_slice(fields.get(8)); // attributes
        if zero_length {
            dst.extend_from_slice(ZERO_LENGTH_ATTRIBUTE);
        }
        dst.push(b'\n');
        Ok(())
    }
}
