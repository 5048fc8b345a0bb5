pub mod pipes;
pub mod spawn;
pub mod pump;

mod error;
pub use error::PumpError;

/// Capability interface of a per-record format translator.
///
/// `src` is exactly one record, without its terminating newline. The
/// translator appends zero or more complete `\n`-terminated lines to `dst`.
/// A record never straddles two downstream writes: the pump flushes `dst`
/// only between whole batches of records.
///
/// Translators are stateful (header counters, WIG section state), hence the
/// `&mut self` receiver.
pub trait LineTranslator {
    fn translate(&mut self, src: &[u8], dst: &mut Vec<u8>) -> anyhow::Result<()>;
}
