use std::io::Write;

use memchr::memchr;
use pipeline::LineTranslator;

use crate::fields;

const FORMAT: &str = "gtf";
const FIELD_MIN: usize = 9;
const FIELD_MAX: usize = 10;
// Unlike GFF, GTF attribute entries are joined by "; " (delimiter plus space).
const ZERO_LENGTH_ATTRIBUTE: &[u8] = b"; zero_length_insertion=True";

/// GTF to BED translator.
///
/// GTF fields: seqname, source, feature, start, end, score, strand, frame,
/// attributes, plus an optional trailing comments field. Column mapping is the
/// same as GFF, with `id` extracted from the `gene_id "..."` attribute and the
/// comments field carried through as a final column when present.
pub struct GtfXlate {
    keep_header: bool,
    header_idx: u32,
    tabs: Vec<usize>,
}

impl GtfXlate {
    #[must_use]
    pub fn new(keep_header: bool) -> Self {
        Self { keep_header, header_idx: 0, tabs: Vec::new() }
    }
}

/// Value of the `gene_id "..."` attribute, unquoted, if present.
fn attribute_gene_id(attributes: &[u8]) -> Option<&[u8]> {
    let mut offset = 0;
    while offset < attributes.len() {
        let end = memchr(b';', &attributes[offset..]).map_or(attributes.len(), |idx| offset + idx);
        if let Some(value) = attributes[offset..end].trim_ascii().strip_prefix(b"gene_id") {
            let value = value.trim_ascii_start();
            let value = value.strip_prefix(b"\"").unwrap_or(value);
            let value = value.strip_suffix(b"\"").unwrap_or(value);
            return Some(value)
        }
        offset = end + 1;
    }
    None
}

impl LineTranslator for GtfXlate {
    fn translate(&mut self, src: &[u8], dst: &mut Vec<u8>) -> anyhow::Result<()> {
        if src.is_empty() {
            return Ok(())
        }
        if src[0] == b'#' {
            if self.keep_header {
                crate::push_header_line(dst, self.header_idx, src)?;
                self.header_idx += 1;
            }
            return Ok(())
        }

        let fields = fields::scan(src, &mut self.tabs);
        if fields.count() < FIELD_MIN || fields.count() > FIELD_MAX {
            return Err(crate::XlateError::FieldCount {
                format: FORMAT,
                expected: "9 to 10",
                found: fields.count(),
            }
            .into())
        }

        let start: u64 = fields.parse(FORMAT, "start", 3)?;
        let end: u64 = fields.parse(FORMAT, "end", 4)?;

        let zero_length = start > end;
        let (from, to) = if zero_length {
            (end.saturating_sub(1), start)
        } else {
            (start.saturating_sub(1), end)
        };

        dst.extend_from_slice(fields.get(0)); // seqname
        write!(dst, "\t{from}\t{to}\t")?;
        match attribute_gene_id(fields.get(8)) {
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
        dst.extend_from_slice(fields.get(2)); // feature
        dst.push(b'\t');
        dst.extend_from_slice(fields.get(7)); // frame
        dst.push(b'\t');
        dst.extend_from_slice(fields.get(8)); // attributes
        if zero_length {
            dst.extend_from_slice(ZERO_LENGTH_ATTRIBUTE);
        }
        if fields.count() == FIELD_MAX {
            dst.push(b'\t');
            dst.extend_from_slice(fields.get(9)); // comments
        }
        dst.push(b'\n');
        Ok(())
    }
}
