use std::io::Read;
use std::process::Stdio;
use std::thread;

use clap::Parser;
use parser::Cli;
use pipeline::{pipes, pump, spawn};
use xlate::Translator;

pub fn cli(args: &[&str]) -> Cli {
    Cli::parse_from(std::iter::once("conv2bed-rs").chain(args.iter().copied()))
}

/// Drive `input` through the line-translating pump configured by `args`.
pub fn convert(args: &[&str], input: &[u8]) -> Vec<u8> {
    let cli = cli(args);
    let mut translator = Translator::new(&cli);
    let mut output = Vec::new();
    pump::translate_lines(input, &mut output, &mut translator).unwrap();
    output
}

/// Drive `input` through a full chain: feed thread, decoder child, translator
/// thread, sorter child, compressor child, drain thread.
///
/// `cat -` stands in for the three helper binaries, so the test exercises the
/// pipe wiring, thread lifecycle and child reaping of the deepest chain shape
/// without requiring samtools, sort-bed or starch on the host.
pub fn convert_through_chain(args: &[&str], input: Vec<u8>) -> Vec<u8> {
    let cli = cli(args);

    let (feed_rx, feed_tx) = pipes::pair().unwrap();
    let (bed_rx, bed_tx) = pipes::pair().unwrap();

    // Children first, wired stdout-to-stdin.
    let mut decoder = spawn::stage("cat -", Stdio::from(feed_rx)).unwrap();
    let decoder_out = decoder.stdout.take().unwrap();
    let mut sorter = spawn::stage("cat -", Stdio::from(bed_rx)).unwrap();
    let sorter_out = sorter.stdout.take().unwrap();
    let mut compressor = spawn::stage("cat -", Stdio::from(sorter_out)).unwrap();
    let mut compressor_out = compressor.stdout.take().unwrap();

    // Then the three worker threads.
    let feeder = thread::spawn(move || pump::forward_bytes(input.as_slice(), feed_tx));
    let translator = thread::spawn(move || {
        let mut translator = Translator::new(&cli);
        pump::translate_lines(decoder_out, bed_tx, &mut translator)
    });
    let drain = thread::spawn(move || {
        let mut output = Vec::new();
        compressor_out.read_to_end(&mut output).map(|_| output)
    });

    feeder.join().unwrap().unwrap();
    translator.join().unwrap().unwrap();
    let output = drain.join().unwrap().unwrap();

    for mut child in [decoder, sorter, compressor] {
        assert!(child.wait().unwrap().success());
    }
    output
}
