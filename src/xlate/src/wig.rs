use std::io::Write;

use pipeline::LineTranslator;

use crate::XlateError;

const FORMAT: &str = "wig";
const DEFAULT_SPAN: u64 = 1;

/// Step mode of the current WIG section.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Step {
    Variable,
    Fixed,
}

/// WIG to BED translator.
///
/// A WIG stream is a sequence of sections, each introduced by a
/// `variableStep` or `fixedStep` declaration that governs how the following
/// data lines map to intervals:
///
/// - `variableStep chrom=C [span=S]`: data lines are `pos value`; each emits
///   `C, pos-1, pos-1+S`.
/// - `fixedStep chrom=C start=P step=T [span=S]`: data lines are a bare
///   `value`; the k-th (0-based) emits `C, P-1+k*T, P-1+k*T+S`.
///
/// The id column numbers data lines within their section (`id.1`, `id.2`,
/// ...); with a multisplit basename it reads `basename.section.line`, so each
/// section can be demultiplexed downstream. `track`, `browser` and comment
/// lines are metadata, dropped unless header preservation is on.
pub struct WigXlate {
    basename: Option<String>,
    keep_header: bool,
    header_idx: u32,
    section: u32,
    pos_lines: u64,
    span: u64,
    step: u64,
    start_pos: u64,
    chrom: String,
    mode: Option<Step>,
}

impl WigXlate {
    #[must_use]
    pub fn new(basename: Option<String>, keep_header: bool) -> Self {
        Self {
            basename,
            keep_header,
            header_idx: 0,
            section: 0,
            pos_lines: 0,
            span: DEFAULT_SPAN,
            step: 1,
            start_pos: 1,
            chrom: String::new(),
            mode: None,
        }
    }

    fn begin_section(&mut self, src: &[u8], mode: Step) -> Result<(), XlateError> {
        let line = std::str::from_utf8(src)
            .map_err(|_| XlateError::invalid(FORMAT, "declaration", src))?;

        let mut chrom = None;
        let mut span = DEFAULT_SPAN;
        let mut start = None;
        let mut step = None;
        for (key, value) in line.split_ascii_whitespace().skip(1).filter_map(|tok| tok.split_once('=')) {
            match key {
                "chrom" => chrom = Some(value),
                "span"  => {
                    span = value.parse()
                        .map_err(|_| XlateError::invalid(FORMAT, "span", value.as_bytes()))?;
                }
                "start" => {
                    start = Some(value.parse()
                        .map_err(|_| XlateError::invalid(FORMAT, "start", value.as_bytes()))?);
                }
                "step"  => {
                    step = Some(value.parse()
                        .map_err(|_| XlateError::invalid(FORMAT, "step", value.as_bytes()))?);
                }
                _ => (),
            }
        }

        self.chrom = chrom
            .ok_or_else(|| XlateError::invalid(FORMAT, "chrom", src))?
            .to_owned();
        self.span = span;
        if mode == Step::Fixed {
            self.start_pos = start.ok_or_else(|| XlateError::invalid(FORMAT, "start", src))?;
            self.step = step.ok_or_else(|| XlateError::invalid(FORMAT, "step", src))?;
        }
        self.section += 1;
        self.pos_lines = 0;
        self.mode = Some(mode);
        Ok(())
    }

    fn emit(&mut self, dst: &mut Vec<u8>, start: u64, value: &str) -> anyhow::Result<()> {
        self.pos_lines += 1;
        let stop = start + self.span;
        write!(dst, "{}\t{start}\t{stop}\t", self.chrom)?;
        match &self.basename {
            Some(base) => write!(dst, "{base}.{}.{}", self.section, self.pos_lines)?,
            None       => write!(dst, "id.{}", self.pos_lines)?,
        }
        writeln!(dst, "\t{value}")?;
        Ok(())
    }
}

impl LineTranslator for WigXlate {
    fn translate(&mut self, src: &[u8], dst: &mut Vec<u8>) -> anyhow::Result<()> {
        if src.is_empty() {
            return Ok(())
        }
        if src[0] == b'#' || src.starts_with(b"track") || src.starts_with(b"browser") {
            if self.keep_header {
                crate::push_header_line(dst, self.header_idx, src)?;
                self.header_idx += 1;
            }
            return Ok(())
        }
        if src.starts_with(b"variableStep") {
            self.begin_section(src, Step::Variable)?;
            return Ok(())
        }
        if src.starts_with(b"fixedStep") {
            self.begin_section(src, Step::Fixed)?;
            return Ok(())
        }

        let Some(mode) = self.mode else {
            return Err(XlateError::WigOrphanData.into())
        };
        let line = std::str::from_utf8(src)
            .map_err(|_| XlateError::invalid(FORMAT, "data", src))?;
        let mut tokens = line.split_ascii_whitespace();

        match mode {
            Step::Variable => {
                let pos: u64 = tokens
                    .next()
                    .and_then(|tok| tok.parse().ok())
                    .ok_or_else(|| XlateError::invalid(FORMAT, "position", src))?;
                let value = tokens
                    .next()
                    .ok_or_else(|| XlateError::invalid(FORMAT, "value", src))?;
                self.emit(dst, pos.saturating_sub(1), value)
            }
            Step::Fixed => {
                let value = tokens
                    .next()
                    .ok_or_else(|| XlateError::invalid(FORMAT, "value", src))?;
                let start = self.start_pos.saturating_sub(1) + self.pos_lines * self.step;
                self.emit(dst, start, value)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn translate_all(xlate: &mut WigXlate, lines: &[&[u8]]) -> Vec<u8> {
        let mut dst = Vec::new();
        for line in lines {
            xlate.translate(line, &mut dst).unwrap();
        }
        dst
    }

    #[test]
    fn fixed_step_expands_declared_intervals() {
        let mut xlate = WigXlate::new(None, false);
        let bed = translate_all(
            &mut xlate,
            &[b"fixedStep chrom=chrX start=10 step=2 span=5", b"0.1", b"0.2", b"0.3"],
        );
        assert_eq!(
            bed,
            b"chrX\t9\t14\tid.1\t0.1\nchrX\t11\t16\tid.2\t0.2\nchrX\t13\t18\tid.3\t0.3\n".to_vec()
        );
    }

    #[test]
    fn fixed_step_span_defaults_to_one() {
        let mut xlate = WigXlate::new(None, false);
        let bed = translate_all(&mut xlate, &[b"fixedStep chrom=chr1 start=100 step=10", b"1"]);
        assert_eq!(bed, b"chr1\t99\t100\tid.1\t1\n".to_vec());
    }

    #[test]
    fn variable_step_uses_declared_positions() {
        let mut xlate = WigXlate::new(None, false);
        let bed = translate_all(
            &mut xlate,
            &[b"variableStep chrom=chr2 span=3", b"300\t12.5", b"310\t13.5"],
        );
        assert_eq!(
            bed,
            b"chr2\t299\t302\tid.1\t12.5\nchr2\t309\t312\tid.2\t13.5\n".to_vec()
        );
    }

    #[test]
    fn sections_renumber_and_reset_line_counters() {
        let mut xlate = WigXlate::new(Some("signal".into()), false);
        let bed = translate_all(
            &mut xlate,
            &[
                b"variableStep chrom=chr1",
                b"5 1.0",
                b"fixedStep chrom=chr2 start=1 step=1",
                b"2.0",
            ],
        );
        assert_eq!(
            bed,
            b"chr1\t4\t5\tsignal.1.1\t1.0\nchr2\t0\t1\tsignal.2.1\t2.0\n".to_vec()
        );
    }

    #[test]
    fn metadata_lines_respect_keep_header() {
        let metadata: &[&[u8]] = &[b"track type=wiggle_0 name=cov", b"browser position chr1", b"# produced upstream"];

        let mut dropped = WigXlate::new(None, false);
        assert!(translate_all(&mut dropped, metadata).is_empty());

        let mut kept = WigXlate::new(None, true);
        let bed = translate_all(&mut kept, metadata);
        assert!(bed.starts_with(b"_header\t0\t1\ttrack type=wiggle_0 name=cov\n"));
        assert_eq!(bed.iter().filter(|&&b| b == b'\n').count(), 3);
    }

    #[test]
    fn data_before_any_declaration_is_an_error() {
        let mut xlate = WigXlate::new(None, false);
        let mut dst = Vec::new();
        assert!(xlate.translate(b"0.5", &mut dst).is_err());
    }

    #[test]
    fn fixed_step_requires_start_and_step() {
        let mut xlate = WigXlate::new(None, false);
        let mut dst = Vec::new();
        assert!(xlate.translate(b"fixedStep chrom=chr1 start=10", &mut dst).is_err());
        assert!(xlate.translate(b"fixedStep chrom=chr1 step=10", &mut dst).is_err());
    }

    #[test]
    fn declaration_without_chrom_is_an_error() {
        let mut xlate = WigXlate::new(None, false);
        let mut dst = Vec::new();
        assert!(xlate.translate(b"variableStep span=5", &mut dst).is_err());
    }
}
