use std::process;

use clap::Parser;

#[macro_use]
extern crate log;

/// Parse command line arguments and run the conversion pipeline.
fn main() {
    // ----------------------------- Run CLI Parser
    let cli = parser::Cli::parse();

    // ----------------------------- Init logger.
    logger::init(cli.verbose + (!cli.quiet as u8));

    // ----------------------------- Serialize command line arguments
    if let Err(e) = cli.serialize() {
        warn!("{e}");
    }

    // ----------------------------- Run conversion.
    match conv2bed_rs::run(&cli) {
        Ok(()) => (),
        Err(e) => {
            error!("{e:?}");
            process::exit(1);
        }
    };
}
