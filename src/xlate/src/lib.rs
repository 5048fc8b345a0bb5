pub mod fields;
pub mod sam;
pub mod gff;
pub mod gtf;
pub mod psl;
pub mod vcf;
pub mod wig;

mod error;
pub use error::XlateError;

use std::io::Write;

use parser::{Cli, InputFormat};
use pipeline::LineTranslator;

/// Synthetic chromosome carrying preserved header lines.
pub const HEADER_CHR_NAME: &str = "_header";

/// Synthetic chromosome carrying unmapped reads (SAM/BAM, with --all-reads).
pub const UNMAPPED_READ_CHR_NAME: &str = "_unmapped";

/// Append one preserved header line as a pseudo-BED element.
///
/// Headers keep their order of appearance through the `[idx, idx+1)`
/// interval, which survives a later pass through sort-bed.
pub(crate) fn push_header_line(dst: &mut Vec<u8>, idx: u32, line: &[u8]) -> anyhow::Result<()> {
    write!(dst, "{HEADER_CHR_NAME}\t{idx}\t{}\t", idx + 1)?;
    dst.extend_from_slice(line);
    dst.push(b'\n');
    Ok(())
}

/// Sum type over the per-format translators.
///
/// One variant is selected at startup from the parsed command line and then
/// driven record-by-record by the pipeline pump.
pub enum Translator {
    Sam(sam::SamXlate),
    Gff(gff::GffXlate),
    Gtf(gtf::GtfXlate),
    Psl(psl::PslXlate),
    Vcf(vcf::VcfXlate),
    Wig(wig::WigXlate),
}

impl Translator {
    /// Select and configure the translator for the requested input format.
    ///
    /// BAM input is decoded to SAM text upstream of the translator, so both
    /// formats share the SAM translator.
    #[must_use]
    pub fn new(cli: &Cli) -> Self {
        match cli.input {
            InputFormat::Bam | InputFormat::Sam => {
                Self::Sam(sam::SamXlate::new(cli.sam.all_reads, cli.keep_header, cli.split))
            }
            InputFormat::Gff => Self::Gff(gff::GffXlate::new(cli.keep_header)),
            InputFormat::Gtf => Self::Gtf(gtf::GtfXlate::new(cli.keep_header)),
            InputFormat::Psl => {
                Self::Psl(psl::PslXlate::new(cli.psl.headered, cli.keep_header, cli.split))
            }
            InputFormat::Vcf => Self::Vcf(vcf::VcfXlate::new(
                cli.vcf.do_not_split,
                cli.vcf.snvs,
                cli.vcf.insertions,
                cli.vcf.deletions,
                cli.keep_header,
            )),
            InputFormat::Wig => {
                Self::Wig(wig::WigXlate::new(cli.wig.multisplit.clone(), cli.keep_header))
            }
        }
    }
}

impl LineTranslator for Translator {
    fn translate(&mut self, src: &[u8], dst: &mut Vec<u8>) -> anyhow::Result<()> {
        match self {
            Self::Sam(xlate) => xlate.translate(src, dst),
            Self::Gff(xlate) => xlate.translate(src, dst),
            Self::Gtf(xlate) => xlate.translate(src, dst),
            Self::Psl(xlate) => xlate.translate(src, dst),
            Self::Vcf(xlate) => xlate.translate(src, dst),
            Self::Wig(xlate) => xlate.translate(src, dst),
        }
    }
}
