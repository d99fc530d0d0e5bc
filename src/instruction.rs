use crate::addressing::AddressingMode;
use crate::opcode::Opcode;

/// One row of the fixed 256-entry decode table: everything the dispatcher needs to know about
/// an opcode byte before it resolves an address or runs a handler.
#[derive(Clone, Copy, Debug)]
pub struct DecodeEntry {
    pub opcode: Opcode,
    pub mode: AddressingMode,

    /// Cycles this instruction costs when no page boundary is crossed and (for branches) the
    /// branch isn't taken.
    pub base_cycles: u8,

    /// True for read instructions (`LDA`, `ADC`, `CMP`, ...) whose `AbsoluteX`/`AbsoluteY`/
    /// `IndirectIndexed` forms pay one extra cycle when address resolution crosses a page
    /// boundary. `STA` and the read-modify-write instructions use these same addressing modes
    /// but pay a fixed higher `base_cycles` instead, so this is `false` for them.
    pub page_cross_eligible: bool,

    /// True for the eight conditional branch instructions, whose cycle cost depends on whether
    /// the branch was taken and whether the branch target crosses a page boundary. The dispatcher
    /// applies `+1` if taken, and a further `+1` if taken and the target's page differs from the
    /// page of the instruction after the branch.
    pub is_branch: bool,
}

const fn entry(opcode: Opcode, mode: AddressingMode, base_cycles: u8) -> Option<DecodeEntry> {
    Some(DecodeEntry { opcode, mode, base_cycles, page_cross_eligible: false, is_branch: false })
}

const fn read_entry(opcode: Opcode, mode: AddressingMode, base_cycles: u8) -> Option<DecodeEntry> {
    Some(DecodeEntry { opcode, mode, base_cycles, page_cross_eligible: true, is_branch: false })
}

const fn branch_entry(opcode: Opcode, mode: AddressingMode) -> Option<DecodeEntry> {
    Some(DecodeEntry { opcode, mode, base_cycles: 2, page_cross_eligible: false, is_branch: true })
}

use AddressingMode::*;
use Opcode::*;

/// The fixed opcode-byte -> decode-entry table.
///
/// Only the 151 legal 6502 opcodes are populated; the remaining 105 byte values decode to
/// `None`, which the dispatcher turns into `Error::IllegalOpcode`. This core does not emulate
/// the undocumented opcodes the Ricoh 2A03 also happens to execute.
pub static DECODE_TABLE: [Option<DecodeEntry>; 256] = [
    /*0x00*/ entry(BRK, Implied, 7),
    /*0x01*/ read_entry(ORA, IndexedIndirect, 6),
    /*0x02*/ None,
    /*0x03*/ None,
    /*0x04*/ None,
    /*0x05*/ read_entry(ORA, ZeroPage, 3),
    /*0x06*/ entry(ASL, ZeroPage, 5),
    /*0x07*/ None,
    /*0x08*/ entry(PHP, Implied, 3),
    /*0x09*/ read_entry(ORA, Immediate, 2),
    /*0x0A*/ entry(ASL, Accumulator, 2),
    /*0x0B*/ None,
    /*0x0C*/ None,
    /*0x0D*/ read_entry(ORA, Absolute, 4),
    /*0x0E*/ entry(ASL, Absolute, 6),
    /*0x0F*/ None,

    /*0x10*/ branch_entry(BPL, Relative),
    /*0x11*/ read_entry(ORA, IndirectIndexed, 5),
    /*0x12*/ None,
    /*0x13*/ None,
    /*0x14*/ None,
    /*0x15*/ read_entry(ORA, ZeroPageX, 4),
    /*0x16*/ entry(ASL, ZeroPageX, 6),
    /*0x17*/ None,
    /*0x18*/ entry(CLC, Implied, 2),
    /*0x19*/ read_entry(ORA, AbsoluteY, 4),
    /*0x1A*/ None,
    /*0x1B*/ None,
    /*0x1C*/ None,
    /*0x1D*/ read_entry(ORA, AbsoluteX, 4),
    /*0x1E*/ entry(ASL, AbsoluteX, 7),
    /*0x1F*/ None,

    /*0x20*/ entry(JSR, Absolute, 6),
    /*0x21*/ read_entry(AND, IndexedIndirect, 6),
    /*0x22*/ None,
    /*0x23*/ None,
    /*0x24*/ read_entry(BIT, ZeroPage, 3),
    /*0x25*/ read_entry(AND, ZeroPage, 3),
    /*0x26*/ entry(ROL, ZeroPage, 5),
    /*0x27*/ None,
    /*0x28*/ entry(PLP, Implied, 4),
    /*0x29*/ read_entry(AND, Immediate, 2),
    /*0x2A*/ entry(ROL, Accumulator, 2),
    /*0x2B*/ None,
    /*0x2C*/ read_entry(BIT, Absolute, 4),
    /*0x2D*/ read_entry(AND, Absolute, 4),
    /*0x2E*/ entry(ROL, Absolute, 6),
    /*0x2F*/ None,

    /*0x30*/ branch_entry(BMI, Relative),
    /*0x31*/ read_entry(AND, IndirectIndexed, 5),
    /*0x32*/ None,
    /*0x33*/ None,
    /*0x34*/ None,
    /*0x35*/ read_entry(AND, ZeroPageX, 4),
    /*0x36*/ entry(ROL, ZeroPageX, 6),
    /*0x37*/ None,
    /*0x38*/ entry(SEC, Implied, 2),
    /*0x39*/ read_entry(AND, AbsoluteY, 4),
    /*0x3A*/ None,
    /*0x3B*/ None,
    /*0x3C*/ None,
    /*0x3D*/ read_entry(AND, AbsoluteX, 4),
    /*0x3E*/ entry(ROL, AbsoluteX, 7),
    /*0x3F*/ None,

    /*0x40*/ entry(RTI, Implied, 6),
    /*0x41*/ read_entry(EOR, IndexedIndirect, 6),
    /*0x42*/ None,
    /*0x43*/ None,
    /*0x44*/ None,
    /*0x45*/ read_entry(EOR, ZeroPage, 3),
    /*0x46*/ entry(LSR, ZeroPage, 5),
    /*0x47*/ None,
    /*0x48*/ entry(PHA, Implied, 3),
    /*0x49*/ read_entry(EOR, Immediate, 2),
    /*0x4A*/ entry(LSR, Accumulator, 2),
    /*0x4B*/ None,
    /*0x4C*/ entry(JMP, Absolute, 3),
    /*0x4D*/ read_entry(EOR, Absolute, 4),
    /*0x4E*/ entry(LSR, Absolute, 6),
    /*0x4F*/ None,

    /*0x50*/ branch_entry(BVC, Relative),
    /*0x51*/ read_entry(EOR, IndirectIndexed, 5),
    /*0x52*/ None,
    /*0x53*/ None,
    /*0x54*/ None,
    /*0x55*/ read_entry(EOR, ZeroPageX, 4),
    /*0x56*/ entry(LSR, ZeroPageX, 6),
    /*0x57*/ None,
    /*0x58*/ entry(CLI, Implied, 2),
    /*0x59*/ read_entry(EOR, AbsoluteY, 4),
    /*0x5A*/ None,
    /*0x5B*/ None,
    /*0x5C*/ None,
    /*0x5D*/ read_entry(EOR, AbsoluteX, 4),
    /*0x5E*/ entry(LSR, AbsoluteX, 7),
    /*0x5F*/ None,

    /*0x60*/ entry(RTS, Implied, 6),
    /*0x61*/ read_entry(ADC, IndexedIndirect, 6),
    /*0x62*/ None,
    /*0x63*/ None,
    /*0x64*/ None,
    /*0x65*/ read_entry(ADC, ZeroPage, 3),
    /*0x66*/ entry(ROR, ZeroPage, 5),
    /*0x67*/ None,
    /*0x68*/ entry(PLA, Implied, 4),
    /*0x69*/ read_entry(ADC, Immediate, 2),
    /*0x6A*/ entry(ROR, Accumulator, 2),
    /*0x6B*/ None,
    /*0x6C*/ entry(JMP, Indirect, 5),
    /*0x6D*/ read_entry(ADC, Absolute, 4),
    /*0x6E*/ entry(ROR, Absolute, 6),
    /*0x6F*/ None,

    /*0x70*/ branch_entry(BVS, Relative),
    /*0x71*/ read_entry(ADC, IndirectIndexed, 5),
    /*0x72*/ None,
    /*0x73*/ None,
    /*0x74*/ None,
    /*0x75*/ read_entry(ADC, ZeroPageX, 4),
    /*0x76*/ entry(ROR, ZeroPageX, 6),
    /*0x77*/ None,
    /*0x78*/ entry(SEI, Implied, 2),
    /*0x79*/ read_entry(ADC, AbsoluteY, 4),
    /*0x7A*/ None,
    /*0x7B*/ None,
    /*0x7C*/ None,
    /*0x7D*/ read_entry(ADC, AbsoluteX, 4),
    /*0x7E*/ entry(ROR, AbsoluteX, 7),
    /*0x7F*/ None,

    /*0x80*/ None,
    /*0x81*/ entry(STA, IndexedIndirect, 6),
    /*0x82*/ None,
    /*0x83*/ None,
    /*0x84*/ entry(STY, ZeroPage, 3),
    /*0x85*/ entry(STA, ZeroPage, 3),
    /*0x86*/ entry(STX, ZeroPage, 3),
    /*0x87*/ None,
    /*0x88*/ entry(DEY, Implied, 2),
    /*0x89*/ None,
    /*0x8A*/ entry(TXA, Implied, 2),
    /*0x8B*/ None,
    /*0x8C*/ entry(STY, Absolute, 4),
    /*0x8D*/ entry(STA, Absolute, 4),
    /*0x8E*/ entry(STX, Absolute, 4),
    /*0x8F*/ None,

    /*0x90*/ branch_entry(BCC, Relative),
    /*0x91*/ entry(STA, IndirectIndexed, 6),
    /*0x92*/ None,
    /*0x93*/ None,
    /*0x94*/ entry(STY, ZeroPageX, 4),
    /*0x95*/ entry(STA, ZeroPageX, 4),
    /*0x96*/ entry(STX, ZeroPageY, 4),
    /*0x97*/ None,
    /*0x98*/ entry(TYA, Implied, 2),
    /*0x99*/ entry(STA, AbsoluteY, 5),
    /*0x9A*/ entry(TXS, Implied, 2),
    /*0x9B*/ None,
    /*0x9C*/ None,
    /*0x9D*/ entry(STA, AbsoluteX, 5),
    /*0x9E*/ None,
    /*0x9F*/ None,

    /*0xA0*/ read_entry(LDY, Immediate, 2),
    /*0xA1*/ read_entry(LDA, IndexedIndirect, 6),
    /*0xA2*/ read_entry(LDX, Immediate, 2),
    /*0xA3*/ None,
    /*0xA4*/ read_entry(LDY, ZeroPage, 3),
    /*0xA5*/ read_entry(LDA, ZeroPage, 3),
    /*0xA6*/ read_entry(LDX, ZeroPage, 3),
    /*0xA7*/ None,
    /*0xA8*/ entry(TAY, Implied, 2),
    /*0xA9*/ read_entry(LDA, Immediate, 2),
    /*0xAA*/ entry(TAX, Implied, 2),
    /*0xAB*/ None,
    /*0xAC*/ read_entry(LDY, Absolute, 4),
    /*0xAD*/ read_entry(LDA, Absolute, 4),
    /*0xAE*/ read_entry(LDX, Absolute, 4),
    /*0xAF*/ None,

    /*0xB0*/ branch_entry(BCS, Relative),
    /*0xB1*/ read_entry(LDA, IndirectIndexed, 5),
    /*0xB2*/ None,
    /*0xB3*/ None,
    /*0xB4*/ read_entry(LDY, ZeroPageX, 4),
    /*0xB5*/ read_entry(LDA, ZeroPageX, 4),
    /*0xB6*/ read_entry(LDX, ZeroPageY, 4),
    /*0xB7*/ None,
    /*0xB8*/ entry(CLV, Implied, 2),
    /*0xB9*/ read_entry(LDA, AbsoluteY, 4),
    /*0xBA*/ entry(TSX, Implied, 2),
    /*0xBB*/ None,
    /*0xBC*/ read_entry(LDY, AbsoluteX, 4),
    /*0xBD*/ read_entry(LDA, AbsoluteX, 4),
    /*0xBE*/ read_entry(LDX, AbsoluteY, 4),
    /*0xBF*/ None,

    /*0xC0*/ read_entry(CPY, Immediate, 2),
    /*0xC1*/ read_entry(CMP, IndexedIndirect, 6),
    /*0xC2*/ None,
    /*0xC3*/ None,
    /*0xC4*/ read_entry(CPY, ZeroPage, 3),
    /*0xC5*/ read_entry(CMP, ZeroPage, 3),
    /*0xC6*/ entry(DEC, ZeroPage, 5),
    /*0xC7*/ None,
    /*0xC8*/ entry(INY, Implied, 2),
    /*0xC9*/ read_entry(CMP, Immediate, 2),
    /*0xCA*/ entry(DEX, Implied, 2),
    /*0xCB*/ None,
    /*0xCC*/ read_entry(CPY, Absolute, 4),
    /*0xCD*/ read_entry(CMP, Absolute, 4),
    /*0xCE*/ entry(DEC, Absolute, 6),
    /*0xCF*/ None,

    /*0xD0*/ branch_entry(BNE, Relative),
    /*0xD1*/ read_entry(CMP, IndirectIndexed, 5),
    /*0xD2*/ None,
    /*0xD3*/ None,
    /*0xD4*/ None,
    /*0xD5*/ read_entry(CMP, ZeroPageX, 4),
    /*0xD6*/ entry(DEC, ZeroPageX, 6),
    /*0xD7*/ None,
    /*0xD8*/ entry(CLD, Implied, 2),
    /*0xD9*/ read_entry(CMP, AbsoluteY, 4),
    /*0xDA*/ None,
    /*0xDB*/ None,
    /*0xDC*/ None,
    /*0xDD*/ read_entry(CMP, AbsoluteX, 4),
    /*0xDE*/ entry(DEC, AbsoluteX, 7),
    /*0xDF*/ None,

    /*0xE0*/ read_entry(CPX, Immediate, 2),
    /*0xE1*/ read_entry(SBC, IndexedIndirect, 6),
    /*0xE2*/ None,
    /*0xE3*/ None,
    /*0xE4*/ read_entry(CPX, ZeroPage, 3),
    /*0xE5*/ read_entry(SBC, ZeroPage, 3),
    /*0xE6*/ entry(INC, ZeroPage, 5),
    /*0xE7*/ None,
    /*0xE8*/ entry(INX, Implied, 2),
    /*0xE9*/ read_entry(SBC, Immediate, 2),
    /*0xEA*/ entry(NOP, Implied, 2),
    /*0xEB*/ None,
    /*0xEC*/ read_entry(CPX, Absolute, 4),
    /*0xED*/ read_entry(SBC, Absolute, 4),
    /*0xEE*/ entry(INC, Absolute, 6),
    /*0xEF*/ None,

    /*0xF0*/ branch_entry(BEQ, Relative),
    /*0xF1*/ read_entry(SBC, IndirectIndexed, 5),
    /*0xF2*/ None,
    /*0xF3*/ None,
    /*0xF4*/ None,
    /*0xF5*/ read_entry(SBC, ZeroPageX, 4),
    /*0xF6*/ entry(INC, ZeroPageX, 6),
    /*0xF7*/ None,
    /*0xF8*/ entry(SED, Implied, 2),
    /*0xF9*/ read_entry(SBC, AbsoluteY, 4),
    /*0xFA*/ None,
    /*0xFB*/ None,
    /*0xFC*/ None,
    /*0xFD*/ read_entry(SBC, AbsoluteX, 4),
    /*0xFE*/ entry(INC, AbsoluteX, 7),
    /*0xFF*/ None,
];
