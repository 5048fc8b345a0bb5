use log::{Level, LevelFilter};
use env_logger::{Builder, Env, fmt::Color};
use std::io::Write;

/// Initialize the process-wide logger.
///
/// Verbosity maps to a [`LevelFilter`]:
/// `0` -> Error | `1` -> Warn | `2` -> Info | `3` -> Debug | `4+` -> Trace
///
/// The filter may be overriden at runtime through the `CONV2BED_LOG`
/// environment variable.
///
/// Note that all records are written to the standard error stream: standard
/// output is reserved for BED/Starch data and must never be polluted by
/// diagnostics.
pub fn init(verbosity: u8) {
    let env = Env::default().filter("CONV2BED_LOG");
    Builder::new()
        .filter_level(u8_to_loglevel(verbosity))
        .format(|buf, record| {
            let traceback = if record.level() == Level::Error {
                format!("(@ {}:{}) ", record.file().unwrap_or("unknown"), record.line().unwrap_or(0))
            } else {
                String::new()
            };

            let mut level_style = buf.style();
            let color = match record.level() {
                Level::Error => Color::Red,
                Level::Warn  => Color::Yellow,
                Level::Info  => Color::Green,
                Level::Debug => Color::Blue,
                Level::Trace => Color::Cyan,
            };
            level_style.set_color(color).set_bold(true);

            writeln!(
                buf,
                "[{} {: <5} {}] {traceback}{}",
                chrono::Local::now().format("%Y-%m-%dT%H:%M:%S"),
                level_style.value(record.level()),
                record.target(),
                record.args()
            )
        })
        .parse_env(env)
        .try_init()
        .ok(); // A second init (e.g. within tests) is harmless.
}

/// Reset the maximum log level after initialization.
pub fn set_level(verbosity: u8) {
    log::set_max_level(u8_to_loglevel(verbosity));
}

fn u8_to_loglevel(verbosity: u8) -> LevelFilter {
    match verbosity {
        0            => LevelFilter::Error,
        1            => LevelFilter::Warn,
        2            => LevelFilter::Info,
        3            => LevelFilter::Debug,
        4..= u8::MAX => LevelFilter::Trace,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn log_level() {
        init(0);
        for level in 0..u8::MAX {
            set_level(level);

            let expected_level = match level {
                0           => LevelFilter::Error,
                1           => LevelFilter::Warn,
                2           => LevelFilter::Info,
                3           => LevelFilter::Debug,
                4..=u8::MAX => LevelFilter::Trace,
            };

            assert_eq!(log::max_level(), expected_level);
        }
    }
}
