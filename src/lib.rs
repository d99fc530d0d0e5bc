//! A cycle-counted emulation core for the MOS Technology 6502 as it appears inside the Ricoh
//! 2A03: registers, status flags, addressing modes, the 151 legal opcodes, and the
//! `RESET`/`NMI`/`IRQ`/`BRK` interrupt sequences.
//!
//! The 2A03 drops the 6502's decimal mode and this crate follows suit; it also doesn't emulate
//! the handful of undocumented opcodes real 6502/2A03 silicon happens to execute. A [`Cpu`] talks
//! to memory exclusively through the [`Bus`] trait, so it has no opinion on what's actually wired
//! up behind it — [`memory_map::MemoryMap`] is the NES-shaped `Bus` implementation, and
//! [`bus::FlatBus`] is a flat 64KB space handy for testing the CPU in isolation.

pub mod addressing;
pub mod bus;
pub mod cpu;
pub mod error;
pub mod instruction;
pub mod interrupt;
pub mod memory_map;
pub mod opcode;
pub mod register;
pub mod status;

pub use bus::Bus;
pub use cpu::Cpu;
pub use error::Error;
pub use opcode::Opcode;
pub use register::Register;
pub use status::{Status, StatusFlag};

pub type Result<A> = std::result::Result<A, Error>;
