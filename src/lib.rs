pub mod commands;
pub mod deps;

use std::io::{self, PipeReader, Read};
use std::process::{Child, ChildStdout, Stdio};
use std::thread::{self, JoinHandle};

use anyhow::{Context, Result, anyhow};
use log::{debug, info};

use parser::{Cli, InputFormat, OutputFormat};
use pipeline::{PumpError, pipes, pump, spawn};
use xlate::Translator;

/// Output end of the most recently wired stage, feeding the next one.
///
/// Helper children consume it as their stdin; worker threads consume it as a
/// reader. Either way the parent gives up its handle, so EOF propagates as
/// soon as the producing stage finishes.
enum StageOutput {
    Pipe(PipeReader),
    Child(ChildStdout),
}

impl StageOutput {
    fn into_stdio(self) -> Stdio {
        match self {
            Self::Pipe(rx)   => Stdio::from(rx),
            Self::Child(out) => Stdio::from(out),
        }
    }

    fn into_reader(self) -> Box<dyn Read + Send> {
        match self {
            Self::Pipe(rx)   => Box::new(rx),
            Self::Child(out) => Box::new(out),
        }
    }
}

type Worker = (&'static str, JoinHandle<Result<(), PumpError>>);

fn spawn_worker<F>(name: &'static str, body: F) -> Result<Worker>
where
    F: FnOnce() -> Result<(), PumpError> + Send + 'static,
{
    let handle = thread::Builder::new()
        .name(name.to_owned())
        .spawn(body)
        .with_context(|| format!("Failed to spawn the '{name}' worker thread"))?;
    Ok((name, handle))
}

fn spawn_child(
    name: &'static str,
    cmd: &str,
    stdin: StageOutput,
    children: &mut Vec<(&'static str, Child)>,
) -> Result<StageOutput> {
    let mut child = spawn::stage(cmd, stdin.into_stdio())
        .with_context(|| format!("Failed to spawn the '{name}' stage"))?;
    let stdout = child
        .stdout
        .take()
        .ok_or_else(|| anyhow!("the '{name}' stage spawned without a piped stdout"))?;
    children.push((name, child));
    Ok(StageOutput::Child(stdout))
}

/// Compose and drive one conversion chain.
///
/// Layout, with helper children in brackets and the optional stages dropped
/// according to the input format, sort toggle and output format:
///
///   stdin -> [samtools view] -> translate -> [sort-bed] -> [starch] -> stdout
///
/// Children are spawned first, wired stdout-to-stdin over anonymous pipes;
/// worker threads (stdin feed, line translator, stdout drain) then start and
/// are joined once the stream runs dry. Every child is awaited and its exit
/// status gates the overall result.
pub fn run(cli: &Cli) -> Result<()> {
    // ----------------------------- Sanity checks, before any pipe opens.
    cli.validate()?;
    let helpers = deps::Helpers::discover(cli)?;

    let bam_cmd = helpers.samtools.as_deref().map(commands::bam_to_sam);
    let sort_cmd = helpers.sort_bed.as_deref().map(|path| commands::sort_bed(path, cli));
    let starch_cmd = helpers.starch.as_deref().map(|path| commands::starch(path, cli));
    debug_assert_eq!(bam_cmd.is_some(), cli.input == InputFormat::Bam);
    debug_assert_eq!(starch_cmd.is_some(), cli.output == OutputFormat::Starch);

    let mut children: Vec<(&'static str, Child)> = Vec::new();

    // ----------------------------- Allocate pipes and spawn children.
    let (feed_rx, feed_tx) = pipes::pair().context("Failed to allocate the stdin feed pipe")?;
    let (bed_rx, bed_tx) = pipes::pair().context("Failed to allocate the translator output pipe")?;

    let xlate_src = match &bam_cmd {
        Some(cmd) => spawn_child(deps::SAMTOOLS, cmd, StageOutput::Pipe(feed_rx), &mut children)?,
        None      => StageOutput::Pipe(feed_rx),
    };
    let mut tail = match &sort_cmd {
        Some(cmd) => spawn_child(deps::SORT_BED, cmd, StageOutput::Pipe(bed_rx), &mut children)?,
        None      => StageOutput::Pipe(bed_rx),
    };
    if let Some(cmd) = &starch_cmd {
        tail = spawn_child(deps::STARCH, cmd, tail, &mut children)?;
    }

    // ----------------------------- Start worker threads.
    info!("Converting {} to {}...", cli.input, cli.output);
    let mut workers: Vec<Worker> = Vec::new();

    workers.push(spawn_worker("stdin-feed", move || {
        let stdin = io::stdin();
        pump::forward_bytes(stdin.lock(), feed_tx)
    })?);

    let mut translator = Translator::new(cli);
    let xlate_reader = xlate_src.into_reader();
    workers.push(spawn_worker("translate", move || {
        pump::translate_lines(xlate_reader, bed_tx, &mut translator)
    })?);

    let tail_reader = tail.into_reader();
    workers.push(spawn_worker("stdout-drain", move || {
        let stdout = io::stdout();
        pump::forward_bytes(tail_reader, stdout.lock())
    })?);

    // ----------------------------- Join threads, await children.
    let mut failure: Option<anyhow::Error> = None;
    for (name, handle) in workers {
        match handle.join() {
            Ok(Ok(())) => debug!("worker '{name}' completed"),
            Ok(Err(error)) => {
                if failure.is_none() {
                    failure = Some(anyhow::Error::new(error).context(format!("'{name}' stage failed")));
                }
            }
            Err(_) => {
                if failure.is_none() {
                    failure = Some(anyhow!("worker thread '{name}' panicked"));
                }
            }
        }
    }
    for (name, mut child) in children {
        let status = child
            .wait()
            .with_context(|| format!("Failed to await the '{name}' stage"))?;
        if !status.success() && failure.is_none() {
            failure = Some(anyhow!("child stage '{name}' exited with {status}"));
        }
    }

    match failure {
        Some(error) => Err(error),
        None        => Ok(()),
    }
}
