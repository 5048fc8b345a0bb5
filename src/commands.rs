use std::fmt::Write;
use std::path::Path;

use parser::Cli;

/// Decode BAM on stdin to headered SAM text on stdout.
#[must_use]
pub fn bam_to_sam(samtools: &Path) -> String {
    format!("{} view -h -", samtools.display())
}

/// Sort BED on stdin lexicographically (chromosome, then start, then stop).
#[must_use]
pub fn sort_bed(sort_bed: &Path, cli: &Cli) -> String {
    let mut cmd = format!("{} --max-mem {}", sort_bed.display(), cli.sort.max_mem);
    if let Some(tmpdir) = &cli.sort.sort_tmpdir {
        let _ = write!(cmd, " --tmpdir {}", tmpdir.display());
    }
    cmd.push_str(" -");
    cmd
}

/// Compress sorted BED on stdin into a Starch archive on stdout.
#[must_use]
pub fn starch(starch: &Path, cli: &Cli) -> String {
    let mut cmd = starch.display().to_string();
    if cli.starch.starch_gzip {
        cmd.push_str(" --gzip");
    } else if cli.starch.starch_bzip2 {
        cmd.push_str(" --bzip2");
    }
    if let Some(note) = &cli.starch.starch_note {
        let _ = write!(cmd, " --note=\"{note}\"");
    }
    cmd.push_str(" -");
    cmd
}
