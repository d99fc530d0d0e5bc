/// Identifies one of the CPU's architectural registers for the generic
/// read/write/transfer helpers on `Cpu`.
#[derive(PartialEq, Eq, Clone, Copy, Debug)]
pub enum Register {
    A,
    X,
    Y,
    P,
    SP,
}
