use std::fmt::{self, Display, Formatter};
use std::path::PathBuf;

use clap::{ArgEnum, Parser};
use serde::Serialize;
use log::{debug, warn};
use anyhow::Result;

mod error;
pub use error::ParserError;

/// Genomic formats accepted on the standard input stream.
#[derive(ArgEnum, Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum InputFormat {
    Bam,
    Gff,
    Gtf,
    Psl,
    Sam,
    Vcf,
    Wig,
}

impl Display for InputFormat {
    fn fmt(&self, f: &mut Formatter) -> fmt::Result {
        let repr = match self {
            Self::Bam => "bam",
            Self::Gff => "gff",
            Self::Gtf => "gtf",
            Self::Psl => "psl",
            Self::Sam => "sam",
            Self::Vcf => "vcf",
            Self::Wig => "wig",
        };
        write!(f, "{repr}")
    }
}

/// Formats written on the standard output stream.
#[derive(ArgEnum, Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum OutputFormat {
    Bed,
    Starch,
}

impl Display for OutputFormat {
    fn fmt(&self, f: &mut Formatter) -> fmt::Result {
        match self {
            Self::Bed    => write!(f, "bed"),
            Self::Starch => write!(f, "starch"),
        }
    }
}

/// Convert common binary and text genomic formats to BED or BEDOPS Starch.
///
/// Data is read from the standard input and written to the standard output:{n}
///
///     samtools view -b [sample.bam] | conv2bed-rs --input bam > sample.bed{n}
///
/// Conversion of BAM input, sorting, and Starch compression are delegated to
/// the 'samtools', 'sort-bed' and 'starch' binaries, which must be reachable
/// through PATH when required.
#[allow(clippy::struct_excessive_bools)]
#[derive(Parser, Debug, Serialize)]
#[clap(name="conv2bed-rs", author, version, about, long_about = None)]
pub struct Cli {
    /// Genomic format of the input stream (required).
    #[clap(short='i', long, arg_enum)]
    pub input: InputFormat,

    /// Format of the output stream.
    #[clap(short='o', long, arg_enum, default_value("bed"))]
    pub output: OutputFormat,

    /// Do not sort converted data with sort-bed.
    ///
    /// Note that this flag is not compatible with '--output starch', as Starch
    /// archives require lexicographically sorted BED input.
    #[clap(short='d', long)]
    pub do_not_sort: bool,

    /// Preserve the header section as pseudo-BED elements.
    ///
    /// Header lines are re-emitted on the synthetic '_header' chromosome, one
    /// element per line, in their order of appearance.
    #[clap(short='k', long)]
    pub keep_header: bool,

    /// Split records into separate BED elements.
    ///
    /// For BAM/SAM input, reads containing an 'N' CIGAR operation are split at
    /// each skipped region. For PSL input, every alignment block becomes its
    /// own BED element.
    #[clap(short='s', long)]
    pub split: bool,

    #[clap(flatten)]
    pub sam: SamArgs,

    #[clap(flatten)]
    pub psl: PslArgs,

    #[clap(flatten)]
    pub vcf: VcfArgs,

    #[clap(flatten)]
    pub wig: WigArgs,

    #[clap(flatten)]
    pub sort: SortArgs,

    #[clap(flatten)]
    pub starch: StarchArgs,

    /// Set the verbosity level (--verbose --verbose ...)
    ///
    /// Set the verbosity level of this program. Multiple levels allowed {n}
    ///
    /// --verbose: Info  |  --verbose --verbose: Debug  | (3x): Trace {n}
    ///
    /// Note that the program will still output warnings by default, even when
    /// this flag is off. Use --quiet/-q to disable them. All diagnostics go to
    /// the standard error stream, never to standard output.
    #[clap(long, parse(from_occurrences))]
    pub verbose: u8,

    /// Disable warnings.
    ///
    /// By default, warnings are emitted to the console even when verbose mode
    /// is off. Use this argument to disable this. Only errors will be displayed.
    #[clap(short='q', long)]
    pub quiet: bool,
}

/// BAM/SAM specific options.
#[derive(Parser, Debug, Default, Serialize)]
pub struct SamArgs {
    /// Include both unmapped and mapped reads in output.
    ///
    /// Unmapped reads are emitted on the synthetic '_unmapped' chromosome with
    /// the minimal [0, 1) interval. By default they are dropped.
    #[clap(short='a', long)]
    pub all_reads: bool,
}

/// PSL specific options.
#[derive(Parser, Debug, Default, Serialize)]
pub struct PslArgs {
    /// Convert headered PSL input to BED (default is headerless).
    ///
    /// Headered PSL files begin with a five-line layout preamble, which must be
    /// skipped (or preserved, with --keep-header) before record conversion.
    #[clap(short='p', long)]
    pub headered: bool,
}

/// VCF specific options.
#[allow(clippy::struct_excessive_bools)]
#[derive(Parser, Debug, Default, Serialize)]
pub struct VcfArgs {
    /// Report only single nucleotide variants.
    #[clap(short='v', long)]
    pub snvs: bool,

    /// Report only insertion variants.
    #[clap(short='t', long)]
    pub insertions: bool,

    /// Report only deletion variants.
    #[clap(short='n', long)]
    pub deletions: bool,

    /// Do not split multi-allelic records into one BED element per alternate allele.
    #[clap(long)]
    pub do_not_split: bool,
}

/// WIG specific options.
#[derive(Parser, Debug, Default, Serialize)]
pub struct WigArgs {
    /// Prefix section ids with [basename].
    ///
    /// A single WIG input may contain multiple sections. With this option, the
    /// id column of every element reads '[basename].[section].[line]', so that
    /// downstream tools may demultiplex sections into separate outputs.
    #[clap(short='b', long, value_name="basename")]
    pub multisplit: Option<String>,
}

/// sort-bed pass-through options.
#[derive(Parser, Debug, Serialize)]
pub struct SortArgs {
    /// Set aside [value] of memory for sorting BED output.
    ///
    /// For example, [value] can be 8G, 8000M or 8000000000 to specify 8 GB of
    /// memory.
    #[clap(short='m', long, default_value("2G"))]
    pub max_mem: String,

    /// Temporary directory for sort data.
    ///
    /// Optionally sets [dir] as the temporary directory for sort data, when
    /// used in conjunction with --max-mem, instead of the operating system
    /// default temporary directory.
    #[clap(short='r', long, value_name="dir")]
    pub sort_tmpdir: Option<PathBuf>,
}

/// starch pass-through options.
#[derive(Parser, Debug, Default, Serialize)]
pub struct StarchArgs {
    /// Compress intermediate data with bzip2 when writing Starch output (default).
    #[clap(short='z', long)]
    pub starch_bzip2: bool,

    /// Compress intermediate data with gzip when writing Starch output.
    #[clap(short='g', long)]
    pub starch_gzip: bool,

    /// Add a note to the Starch archive metadata.
    #[clap(short='e', long, value_name="note")]
    pub starch_note: Option<String>,
}

impl Cli {
    /// Ensure the requested flag combination describes a runnable pipeline.
    ///
    /// # Errors
    /// - `UnsortedStarch` when `--do-not-sort` is combined with
    ///   `--output starch`: Starch archives require sorted BED input.
    /// - `StarchCompressionConflict` when both `--starch-bzip2` and
    ///   `--starch-gzip` are requested.
    /// - `HeaderlessKeepHeader` when `--keep-header` is requested on PSL input
    ///   without `--headered`: headerless PSL carries nothing to preserve.
    pub fn validate(&self) -> Result<(), ParserError> {
        if self.do_not_sort && self.output == OutputFormat::Starch {
            return Err(ParserError::UnsortedStarch)
        }
        if self.starch.starch_bzip2 && self.starch.starch_gzip {
            return Err(ParserError::StarchCompressionConflict)
        }
        if self.keep_header && self.input == InputFormat::Psl && !self.psl.headered {
            return Err(ParserError::HeaderlessKeepHeader)
        }

        if self.wig.multisplit.is_some() && self.input != InputFormat::Wig {
            warn!("--multisplit only applies to WIG input. Ignoring.");
        }
        if self.output == OutputFormat::Bed
            && (self.starch.starch_bzip2 || self.starch.starch_gzip || self.starch.starch_note.is_some())
        {
            warn!("--starch-* arguments only apply to '--output starch'. Ignoring.");
        }
        Ok(())
    }

    /// Whether the converted stream runs through sort-bed.
    #[must_use]
    pub fn sort_requested(&self) -> bool {
        !self.do_not_sort
    }

    /// Serialize command line arguments into the debug log.
    ///
    /// # Errors
    /// Returns an error if `serde_yaml` fails to parse `Self` to a string.
    pub fn serialize(&self) -> Result<()> {
        let serialized = serde_yaml::to_string(&self)
            .map_err(|err| anyhow::anyhow!("Failed to serialize command line arguments. got [{err}]"))?;
        debug!("\n---- Command line args ----\n{}\n---", serialized);
        Ok(())
    }
}
