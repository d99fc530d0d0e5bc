use thiserror::Error;

/// Errors the core itself can produce.
///
/// `BusError` is deliberately absent: the `Bus` trait is infallible, and a fault in a
/// memory-mapped device (an unmapped mapper region, say) is that collaborator's problem to
/// surface however it sees fit, not this crate's.
#[derive(Error, Debug, PartialEq, Eq)]
pub enum Error {
    #[error("illegal opcode {opcode:#04x} at {pc:#06x}")]
    IllegalOpcode { opcode: u8, pc: u16 },
}
