/// The four ways a 6502 can redirect control flow to a vector: a cold reset, the two hardware
/// interrupt lines, and the software interrupt triggered by the `BRK` opcode.
#[derive(PartialEq, Eq, Clone, Copy, Debug)]
pub enum Interrupt {
    Reset,
    Nmi,
    Irq,
    Brk,
}

pub const NMI_VECTOR_ADDRESS: u16 = 0xFFFA;
pub const RESET_VECTOR_ADDRESS: u16 = 0xFFFC;
pub const IRQ_VECTOR_ADDRESS: u16 = 0xFFFE;

impl Interrupt {
    /// Only `Irq` is suppressed by the `InterruptDisable` flag. `Nmi` is edge-triggered and
    /// always serviced; `Reset` and `Brk` aren't subject to masking either.
    pub fn maskable(&self) -> bool {
        *self == Interrupt::Irq
    }

    pub fn vector_address(&self) -> u16 {
        match self {
            Interrupt::Nmi => NMI_VECTOR_ADDRESS,
            Interrupt::Reset => RESET_VECTOR_ADDRESS,
            Interrupt::Irq => IRQ_VECTOR_ADDRESS,
            Interrupt::Brk => IRQ_VECTOR_ADDRESS,
        }
    }
}
