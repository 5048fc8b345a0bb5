use std::io::Write;

use pipeline::LineTranslator;

use crate::fields::{self, Fields};

const FORMAT: &str = "vcf";

/// Variant class of one REF/ALT pair.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum AltClass {
    Snv,
    Insertion,
    Deletion,
    /// Angle-bracketed symbolic allele (`<DEL>`, `<INS:ME>`, ...), opaque to
    /// classification.
    Symbolic,
    Complex,
}

fn is_acgtn(byte: u8) -> bool {
    matches!(byte.to_ascii_uppercase(), b'A' | b'C' | b'G' | b'T' | b'N')
}

fn classify(reference: &[u8], alt: &[u8]) -> AltClass {
    if alt.first() == Some(&b'<') && alt.last() == Some(&b'>') {
        return AltClass::Symbolic
    }
    if reference.len() == 1 && alt.len() == 1 && is_acgtn(reference[0]) && is_acgtn(alt[0]) {
        return AltClass::Snv
    }
    if alt.len() > reference.len() && alt.starts_with(reference) {
        return AltClass::Insertion
    }
    if reference.len() > alt.len() && reference.starts_with(alt) {
        return AltClass::Deletion
    }
    AltClass::Complex
}

/// VCF to BED translator.
///
/// Every alternate allele of a record yields one BED line (unless splitting is
/// disabled): `CHROM, POS-1, stop, ID, QUAL, ., REF, alt, FILTER, INFO`, with
/// FORMAT and sample columns carried through verbatim when present.
///
/// Coordinates: `stop` is `POS` for SNVs and insertions, `POS-1 + |REF|`
/// otherwise, so deletions span the removed reference bases.
pub struct VcfXlate {
    do_not_split: bool,
    snvs: bool,
    insertions: bool,
    deletions: bool,
    keep_header: bool,
    header_idx: u32,
    tabs: Vec<usize>,
}

impl VcfXlate {
    #[must_use]
    pub fn new(do_not_split: bool, snvs: bool, insertions: bool, deletions: bool, keep_header: bool) -> Self {
        Self { do_not_split, snvs, insertions, deletions, keep_header, header_idx: 0, tabs: Vec::new() }
    }
}

fn keeps(class: AltClass, snvs: bool, insertions: bool, deletions: bool) -> bool {
    let any_filter = snvs || insertions || deletions;
    match class {
        AltClass::Snv       => !any_filter || snvs,
        AltClass::Insertion => !any_filter || insertions,
        AltClass::Deletion  => !any_filter || deletions,
        // Symbolic and complex alleles match no class filter.
        AltClass::Symbolic | AltClass::Complex => !any_filter,
    }
}

fn emit(dst: &mut Vec<u8>, fields: &Fields, start: u64, stop: u64, alt: &[u8]) -> anyhow::Result<()> {
    dst.extend_from_slice(fields.get(0)); // CHROM
    write!(dst, "\t{start}\t{stop}\t")?;
    dst.extend_from_slice(fields.get(2)); // ID
    dst.push(b'\t');
    dst.extend_from_slice(fields.get(5)); // QUAL, as the score column
    dst.extend_from_slice(b"\t.\t");      // variants carry no strand
    dst.extend_from_slice(fields.get(3)); // REF
    dst.push(b'\t');
    dst.extend_from_slice(alt);
    dst.push(b'\t');
    dst.extend_from_slice(fields.get(6)); // FILTER
    dst.push(b'\t');
    dst.extend_from_slice(fields.get(7)); // INFO
    if fields.count() > 8 {
        dst.push(b'\t');
        dst.extend_from_slice(fields.tail(8)); // FORMAT + samples
    }
    dst.push(b'\n');
    Ok(())
}

impl LineTranslator for VcfXlate {
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

        let (snvs, insertions, deletions) = (self.snvs, self.insertions, self.deletions);
        let fields = fields::scan(src, &mut self.tabs);
        fields.require(FORMAT, "at least 8", 8)?;

        let pos: u64 = fields.parse(FORMAT, "POS", 1)?;
        let start = pos.saturating_sub(1);
        let reference = fields.get(3);
        let alt_column = fields.get(4);
        if alt_column == b"." {
            // Monomorphic reference record: nothing to report.
            return Ok(())
        }

        let mut emit_allele = |alt: &[u8], dst: &mut Vec<u8>| -> anyhow::Result<()> {
            if alt.is_empty() || alt == b"." {
                return Ok(())
            }
            let class = classify(reference, alt);
            if !keeps(class, snvs, insertions, deletions) {
                return Ok(())
            }
            let stop = match class {
                AltClass::Insertion | AltClass::Snv => pos,
                _ => start + reference.len() as u64,
            };
            emit(dst, &fields, start, stop, alt)
        };

        if self.do_not_split {
            emit_allele(alt_column, dst)
        } else {
            for alt in alt_column.split(|&byte| byte == b',') {
                emit_allele(alt, dst)?;
            }
            Ok(())
        }
    }
}
