use std::io;
use std::process::{Child, Command, Stdio};

use log::debug;

/// Launch one helper stage of the conversion chain.
///
/// The command runs under `/bin/sh -c`, which lets the composer hand over a
/// pre-assembled command string (helper path, flags, trailing `-` for stdin
/// convention) without re-implementing shell tokenization. Command strings are
/// assembled from helper paths vetted at startup, never from input data.
///
/// The child reads the previous stage through `stdin` and exposes its output
/// as a piped stdout for the next stage to consume. stderr is left attached to
/// the parent's so helper diagnostics reach the console.
///
/// # Errors
/// Returns the underlying I/O error if the process cannot be spawned. An exec
/// failure inside the shell is not reported here: the child exits nonzero and
/// the next stage observes EOF, which the composer turns into an error when it
/// collects exit statuses.
pub fn stage(cmd: &str, stdin: Stdio) -> io::Result<Child> {
    debug!("spawning stage: /bin/sh -c '{cmd}'");
    Command::new("/bin/sh")
        .arg("-c")
        .arg(cmd)
        .stdin(stdin)
        .stdout(Stdio::piped())
        .stderr(Stdio::inherit())
        .spawn()
}
