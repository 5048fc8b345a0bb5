use std::io::Write;

use pipeline::LineTranslator;

use crate::UNMAPPED_READ_CHR_NAME;
use crate::fields::{self, Fields};

pub mod cigar;
use cigar::CigarOp;

const FORMAT: &str = "sam";
const HEADER_PREFIX: u8 = b'@';
const FLAG_UNMAPPED: u32 = 0x4;
const FLAG_REVERSE_STRAND: u32 = 0x10;

/// SAM to BED translator. Also serves BAM input, which reaches the translator
/// as SAM text via the upstream decoder stage.
///
/// Field layout of a SAM record:
///
/// | Index | Field                                    |
/// |-------|------------------------------------------|
/// | 0..10 | QNAME FLAG RNAME POS MAPQ CIGAR RNEXT PNEXT TLEN SEQ QUAL |
/// | 11+   | optional TAG:TYPE:VALUE fields           |
///
/// The emitted BED line is `RNAME, POS-1, POS-1+span, QNAME, FLAG, strand`
/// followed by fields 4..=10 and any optional fields verbatim, where `span`
/// is the CIGAR-derived reference span of the alignment.
pub struct SamXlate {
    all_reads: bool,
    keep_header: bool,
    split: bool,
    header_idx: u32,
    tabs: Vec<usize>,
    ops: Vec<CigarOp>,
}

impl SamXlate {
    #[must_use]
    pub fn new(all_reads: bool, keep_header: bool, split: bool) -> Self {
        Self { all_reads, keep_header, split, header_idx: 0, tabs: Vec::new(), ops: Vec::new() }
    }
}

/// Strand of the alignment: bit 0x10 of FLAG marks the reverse strand.
fn strand_of(flag: u32) -> char {
    if flag & FLAG_REVERSE_STRAND != 0 { '-' } else { '+' }
}

fn emit(
    dst: &mut Vec<u8>,
    fields: &Fields,
    chrom: &[u8],
    start: u64,
    stop: u64,
    strand: char,
) -> anyhow::Result<()> {
    dst.extend_from_slice(chrom);
    write!(dst, "\t{start}\t{stop}\t")?;
    dst.extend_from_slice(fields.get(0)); // QNAME
    dst.push(b'\t');
    dst.extend_from_slice(fields.get(1)); // FLAG, as the score column
    write!(dst, "\t{strand}\t")?;
    dst.extend_from_slice(fields.tail(4)); // MAPQ..QUAL + optional fields
    dst.push(b'\n');
    Ok(())
}

/// Emit one BED line per maximal block between `N` (skipped region)
/// operations. Blocks grow over the reference-consuming ops `M D = X`; an `N`
/// closes the current block and opens the next one past the skip.
fn emit_split(
    dst: &mut Vec<u8>,
    fields: &Fields,
    start: u64,
    strand: char,
    ops: &[CigarOp],
) -> anyhow::Result<()> {
    let mut block_start = start;
    let mut block_span: u64 = 0;
    for op in ops {
        match op.op {
            b'M' | b'D' | b'=' | b'X' => block_span += u64::from(op.bases),
            b'N' => {
                if block_span > 0 {
                    emit(dst, fields, fields.get(2), block_start, block_start + block_span, strand)?;
                }
                block_start += block_span + u64::from(op.bases);
                block_span = 0;
            }
            _ => (),
        }
    }
    if block_span > 0 {
        emit(dst, fields, fields.get(2), block_start, block_start + block_span, strand)?;
    }
    Ok(())
}

impl LineTranslator for SamXlate {
    fn translate(&mut self, src: &[u8], dst: &mut Vec<u8>) -> anyhow::Result<()> {
        if src.is_empty() {
            return Ok(())
        }
        if src[0] == HEADER_PREFIX {
            if self.keep_header {
                crate::push_header_line(dst, self.header_idx, src)?;
                self.header_idx += 1;
            }
            return Ok(())
        }

        let fields = fields::scan(src, &mut self.tabs);
        fields.require(FORMAT, "at least 11", 11)?;
        let flag: u32 = fields.parse(FORMAT, "FLAG", 1)?;
        let strand = strand_of(flag);

        if flag & FLAG_UNMAPPED != 0 {
            if !self.all_reads {
                return Ok(())
            }
            // Unmapped reads have no coordinates; park them on a synthetic
            // chromosome with the minimal half-open interval.
            return emit(dst, &fields, UNMAPPED_READ_CHR_NAME.as_bytes(), 0, 1, strand)
        }

        let pos: u64 = fields.parse(FORMAT, "POS", 3)?;
        let start = pos.saturating_sub(1);
        cigar::parse(fields.get(5), &mut self.ops)?;

        if self.split && self.ops.iter().any(|op| op.op == b'N') {
            return emit_split(dst, &fields, start, strand, &self.ops)
        }

        let span = cigar::reference_span(&self.ops);
        // A `*` CIGAR on a mapped read spans nothing; clamp to the minimal
        // nonempty interval.
        let stop = if span == 0 { start + 1 } else { start + span };
        emit(dst, &fields, fields.get(2), start, stop, strand)
    }
}
