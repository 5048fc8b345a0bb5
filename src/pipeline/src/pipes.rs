use std::io::{self, PipeReader, PipeWriter};

/// Upper bound on the number of in-process pipes a single conversion chain
/// may request.
///
/// The deepest chain in use is:
///
///   stdin -> bam decoder -> translator -> sort-bed -> starch -> stdout
///
/// which requires four anonymous pipes between in-process stages (helper
/// children are wired stdout-to-stdin directly and need none of their own).
/// A deeper chain requires raising this bound.
pub const MAX_PIPES: usize = 4;

/// Allocate one anonymous pipe.
///
/// Both ends are created close-on-exec; [`std::process::Command`] re-opens
/// exactly the ends a child stage must inherit, so descriptors can never leak
/// into an unrelated grandchild.
pub fn pair() -> io::Result<(PipeReader, PipeWriter)> {
    io::pipe()
}

/// Allocate the `n` pipes of one conversion chain.
///
/// # Panics
/// Panics if `n` exceeds [`MAX_PIPES`]: a chain deeper than every composition
/// in use is a programming error, not a runtime condition.
pub fn chain(n: usize) -> io::Result<Vec<(PipeReader, PipeWriter)>> {
    assert!(n <= MAX_PIPES, "a conversion chain may use at most {MAX_PIPES} pipes");
    (0..n).map(|_| pair()).collect()
}
