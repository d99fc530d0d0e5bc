use crate::addressing::{self, Target};
use crate::bus::Bus;
use crate::error::Error;
use crate::instruction::DECODE_TABLE;
use crate::interrupt::Interrupt;
use crate::opcode::Opcode;
use crate::register::Register;
use crate::status::{Status, StatusFlag};

pub type Result<A> = std::result::Result<A, Error>;

const STACK_START_ADDRESS: u16 = 0x0100;

/// `Cpu` emulates the functionality of the MOS Technology 6502 microprocessor, minus its decimal
/// mode — the NES's Ricoh 2A03 drops decimal mode entirely, so this core never implements it.
///
/// Unlike a per-clock-cycle simulation, `Cpu` executes one whole instruction per call to
/// [`Cpu::step`] and reports how many clock cycles that instruction would have consumed. Callers
/// that need cycle-level timing (driving a PPU/APU in lockstep, say) accumulate the returned
/// counts themselves; this core doesn't track sub-instruction state.
#[derive(Debug)]
pub struct Cpu {
    /// The accumulator. Primary storage for arithmetic and logical operations.
    pub a: u8,

    /// General purpose index register, mainly used for memory offsets and loop counters.
    pub x: u8,

    /// General purpose index register, mainly used for memory offsets and loop counters.
    pub y: u8,

    /// The processor status register.
    pub p: Status,

    /// The program counter: the address of the next instruction to execute.
    pub pc: u16,

    /// The stack pointer. The 6502 stack is descending and lives at `0x0100`-`0x01FF`; `sp` is
    /// the low byte of the next free slot.
    pub sp: u8,

    /// Total cycles elapsed since the CPU was constructed (or since it was last reset to zero by
    /// a caller that wants to measure from some other epoch).
    pub cycles: u64,

    nmi_pending: bool,
    irq_pending: bool,
}

impl Cpu {
    pub fn new() -> Cpu {
        Cpu {
            a: 0,
            x: 0,
            y: 0,
            p: Status::default(),
            pc: 0,
            sp: 0,
            cycles: 0,
            nmi_pending: false,
            irq_pending: false,
        }
    }

    /// Simulates the `RESET` line: takes effect immediately rather than waiting for the next
    /// [`Cpu::step`], since a real reset interrupts whatever the CPU was doing.
    pub fn reset(&mut self, bus: &mut impl Bus) {
        self.service_interrupt(bus, Interrupt::Reset);
        self.cycles += 7;
        log::debug!("cpu reset, pc set to {:#06x}", self.pc);
    }

    /// Raises the non-maskable interrupt line. Serviced at the start of the next [`Cpu::step`].
    pub fn nmi(&mut self) {
        self.nmi_pending = true;
    }

    /// Raises the maskable interrupt line. Serviced at the start of the next [`Cpu::step`] if
    /// [`StatusFlag::InterruptDisable`] is clear.
    pub fn irq(&mut self) {
        self.irq_pending = true;
    }

    /// Executes exactly one whole instruction (or, if a pending `NMI`/`IRQ` is serviced instead,
    /// one interrupt sequence) and returns the number of cycles it cost.
    ///
    /// Returns [`Error::IllegalOpcode`] if the byte at `pc` doesn't decode to one of the 151
    /// legal opcodes. `pc` is left pointing at the offending byte so a caller can inspect or skip
    /// it.
    pub fn step(&mut self, bus: &mut impl Bus) -> Result<u32> {
        if self.nmi_pending {
            self.nmi_pending = false;
            log::debug!("servicing NMI at pc {:#06x}", self.pc);
            self.service_interrupt(bus, Interrupt::Nmi);
            self.cycles += 7;
            return Ok(7);
        }

        if self.irq_pending && !self.p.get(StatusFlag::InterruptDisable) {
            self.irq_pending = false;
            log::debug!("servicing IRQ at pc {:#06x}", self.pc);
            self.service_interrupt(bus, Interrupt::Irq);
            self.cycles += 7;
            return Ok(7);
        }

        let opcode_byte = bus.read_u8(self.pc);
        let decoded = DECODE_TABLE[opcode_byte as usize].ok_or_else(|| {
            log::warn!("illegal opcode {:#04x} at {:#06x}", opcode_byte, self.pc);
            Error::IllegalOpcode { opcode: opcode_byte, pc: self.pc }
        })?;

        // BRK is a two-byte instruction (the second byte is a discarded signature byte) that
        // otherwise behaves exactly like a hardware interrupt, so it's handled before generic
        // address resolution rather than given its own addressing mode.
        if decoded.opcode == Opcode::BRK {
            self.pc = self.pc.wrapping_add(2);
            self.service_interrupt(bus, Interrupt::Brk);
            self.cycles += decoded.base_cycles as u64;
            return Ok(decoded.base_cycles as u32);
        }

        let (target, length, page_crossed) =
            addressing::resolve(self.pc, self.x, self.y, decoded.mode, bus);
        self.pc = self.pc.wrapping_add(length);

        let branch_taken = self.execute(bus, decoded.opcode, target);

        let mut cycles = decoded.base_cycles as u32;
        if decoded.page_cross_eligible && page_crossed {
            cycles += 1;
        }
        if decoded.is_branch && branch_taken {
            cycles += 1;
            if page_crossed {
                cycles += 1;
            }
        }

        self.cycles += cycles as u64;
        Ok(cycles)
    }

    /// Steps the CPU until `self.cycles >= target_cycles`. Useful for driving the CPU forward by
    /// a fixed budget without a caller having to loop on [`Cpu::step`] itself.
    pub fn run_until(&mut self, bus: &mut impl Bus, target_cycles: u64) -> Result<u64> {
        while self.cycles < target_cycles {
            self.step(bus)?;
        }
        Ok(self.cycles)
    }

    /// Pushes the current `pc` (for non-`Reset` interrupts) and, for `Reset`, just retreats the
    /// stack pointer the same three bytes a real reset would have spent without writing them.
    fn service_interrupt(&mut self, bus: &mut impl Bus, interrupt: Interrupt) {
        if interrupt == Interrupt::Reset {
            self.sp = self.sp.wrapping_sub(3);
            self.p.set(StatusFlag::DecimalMode, false);
            self.p.set(StatusFlag::Unused, true);
        } else {
            self.push_stack_u16(bus, self.pc);

            let mut status = self.p;
            status.set(StatusFlag::Break, interrupt == Interrupt::Brk);
            status.set(StatusFlag::Unused, true);
            self.push_stack_u8(bus, status.0);
        }

        self.p.set(StatusFlag::InterruptDisable, true);
        self.pc = bus.read_u16(interrupt.vector_address());
    }

    fn execute(&mut self, bus: &mut impl Bus, opcode: Opcode, target: Target) -> bool {
        match opcode {
            Opcode::LDA => self.op_load(bus, Register::A, target),
            Opcode::LDX => self.op_load(bus, Register::X, target),
            Opcode::LDY => self.op_load(bus, Register::Y, target),
            Opcode::STA => self.op_store(bus, Register::A, target),
            Opcode::STX => self.op_store(bus, Register::X, target),
            Opcode::STY => self.op_store(bus, Register::Y, target),
            Opcode::TAX => self.op_transfer(Register::A, Register::X),
            Opcode::TAY => self.op_transfer(Register::A, Register::Y),
            Opcode::TXA => self.op_transfer(Register::X, Register::A),
            Opcode::TYA => self.op_transfer(Register::Y, Register::A),

            Opcode::TSX => self.op_transfer(Register::SP, Register::X),
            Opcode::TXS => self.op_transfer(Register::X, Register::SP),
            Opcode::PHA => self.op_push_stack(bus, Register::A),
            Opcode::PHP => self.op_push_stack(bus, Register::P),
            Opcode::PLA => self.op_pull_stack(bus, Register::A),
            Opcode::PLP => self.op_pull_stack(bus, Register::P),

            Opcode::AND => self.op_logical(bus, target, |a, b| a & b),
            Opcode::EOR => self.op_logical(bus, target, |a, b| a ^ b),
            Opcode::ORA => self.op_logical(bus, target, |a, b| a | b),
            Opcode::BIT => self.op_bit(bus, target),

            Opcode::ADC => self.op_add(bus, target),
            Opcode::SBC => self.op_sub(bus, target),
            Opcode::CMP => self.op_compare(bus, Register::A, target),
            Opcode::CPX => self.op_compare(bus, Register::X, target),
            Opcode::CPY => self.op_compare(bus, Register::Y, target),

            Opcode::INC => { self.modify_target(bus, target, |v| v.wrapping_add(1)); false }
            Opcode::INX => { self.modify_register(Register::X, |x| x.wrapping_add(1)); false }
            Opcode::INY => { self.modify_register(Register::Y, |y| y.wrapping_add(1)); false }
            Opcode::DEC => { self.modify_target(bus, target, |v| v.wrapping_sub(1)); false }
            Opcode::DEX => { self.modify_register(Register::X, |x| x.wrapping_sub(1)); false }
            Opcode::DEY => { self.modify_register(Register::Y, |y| y.wrapping_sub(1)); false }

            Opcode::ASL => self.op_shift_left(bus, target),
            Opcode::LSR => self.op_shift_right(bus, target),
            Opcode::ROL => self.op_rotate_left(bus, target),
            Opcode::ROR => self.op_rotate_right(bus, target),

            Opcode::JMP => { self.pc = self.target_address(target); false }
            Opcode::JSR => self.op_jump_subroutine(bus, target),
            Opcode::RTS => self.op_return(bus),

            Opcode::BCS => self.op_branch_if(target, self.p.get(StatusFlag::Carry)),
            Opcode::BCC => self.op_branch_if(target, !self.p.get(StatusFlag::Carry)),
            Opcode::BEQ => self.op_branch_if(target, self.p.get(StatusFlag::Zero)),
            Opcode::BNE => self.op_branch_if(target, !self.p.get(StatusFlag::Zero)),
            Opcode::BMI => self.op_branch_if(target, self.p.get(StatusFlag::Negative)),
            Opcode::BPL => self.op_branch_if(target, !self.p.get(StatusFlag::Negative)),
            Opcode::BVS => self.op_branch_if(target, self.p.get(StatusFlag::Overflow)),
            Opcode::BVC => self.op_branch_if(target, !self.p.get(StatusFlag::Overflow)),

            Opcode::CLC => { self.p.set(StatusFlag::Carry, false); false }
            Opcode::CLD => { self.p.set(StatusFlag::DecimalMode, false); false }
            Opcode::CLI => { self.p.set(StatusFlag::InterruptDisable, false); false }
            Opcode::CLV => { self.p.set(StatusFlag::Overflow, false); false }
            Opcode::SEC => { self.p.set(StatusFlag::Carry, true); false }
            Opcode::SED => { self.p.set(StatusFlag::DecimalMode, true); false }
            Opcode::SEI => { self.p.set(StatusFlag::InterruptDisable, true); false }

            Opcode::NOP => { let _ = self.read_target(bus, target); false }
            Opcode::RTI => self.op_return_from_interrupt(bus),

            Opcode::BRK => unreachable!("BRK is serviced before address resolution in step()"),
        }
    }

    fn read_register(&self, register: Register) -> u8 {
        match register {
            Register::A => self.a,
            Register::X => self.x,
            Register::Y => self.y,
            Register::P => self.p.0,
            Register::SP => self.sp,
        }
    }

    /// Write a value to a register, updating `Zero`/`Negative` unless the register is `P` or
    /// `SP` (writes to those don't feed back into the flags they themselves hold).
    fn write_register(&mut self, register: Register, value: u8) {
        let register_ref = match register {
            Register::A => &mut self.a,
            Register::X => &mut self.x,
            Register::Y => &mut self.y,
            Register::P => &mut self.p.0,
            Register::SP => &mut self.sp,
        };

        *register_ref = value;

        if register != Register::P && register != Register::SP {
            self.p.set(StatusFlag::Zero, value == 0);
            self.p.set(StatusFlag::Negative, value & 0b1000_0000 > 0);
        }

        // `P` has no physical storage for `Break`/`Unused` — any write to it (`PLP`, `RTI`)
        // always reads back `Break = 0, Unused = 1` regardless of what was pulled.
        if register == Register::P {
            self.p.set(StatusFlag::Break, false);
            self.p.set(StatusFlag::Unused, true);
        }
    }

    fn modify_register(&mut self, register: Register, f: impl FnOnce(u8) -> u8) {
        let value = self.read_register(register);
        self.write_register(register, f(value));
    }

    fn read_target(&self, bus: &impl Bus, target: Target) -> u8 {
        match target {
            Target::Accumulator => self.a,
            Target::Address(address) => bus.read_u8(address),
            Target::Implied => 0,
        }
    }

    fn write_target(&mut self, bus: &mut impl Bus, target: Target, value: u8) {
        match target {
            Target::Accumulator => self.write_register(Register::A, value),
            Target::Address(address) => bus.write_u8(address, value),
            Target::Implied => {}
        }
    }

    /// Reads, transforms, and writes back `target`, leaving `Zero`/`Negative` set from the
    /// result. Returns `(original_value, result)` so callers like the shift/rotate instructions
    /// can derive `Carry` from the bit that fell off the original value.
    fn modify_target(&mut self, bus: &mut impl Bus, target: Target, f: impl FnOnce(u8) -> u8) -> (u8, u8) {
        let value = self.read_target(bus, target);
        let result = f(value);

        match target {
            Target::Accumulator => self.a = result,
            Target::Address(address) => bus.write_u8(address, result),
            Target::Implied => {}
        }

        self.p.set(StatusFlag::Zero, result == 0);
        self.p.set(StatusFlag::Negative, result & 0b1000_0000 > 0);

        (value, result)
    }

    fn target_address(&self, target: Target) -> u16 {
        match target {
            Target::Address(address) => address,
            _ => panic!("instruction expected an addressed target"),
        }
    }

    fn push_stack_u8(&mut self, bus: &mut impl Bus, value: u8) {
        bus.write_u8(STACK_START_ADDRESS + self.sp as u16, value);
        self.sp = self.sp.wrapping_sub(1);
    }

    fn pull_stack_u8(&mut self, bus: &impl Bus) -> u8 {
        self.sp = self.sp.wrapping_add(1);
        bus.read_u8(STACK_START_ADDRESS + self.sp as u16)
    }

    /// Pushes the high byte first, then the low byte — the order the 6502 pushes return
    /// addresses and interrupt vectors in.
    fn push_stack_u16(&mut self, bus: &mut impl Bus, value: u16) {
        let [lo, hi] = value.to_le_bytes();
        self.push_stack_u8(bus, hi);
        self.push_stack_u8(bus, lo);
    }

    fn pull_stack_u16(&mut self, bus: &impl Bus) -> u16 {
        let lo = self.pull_stack_u8(bus);
        let hi = self.pull_stack_u8(bus);
        u16::from_le_bytes([lo, hi])
    }

    fn op_load(&mut self, bus: &impl Bus, register: Register, target: Target) -> bool {
        let value = self.read_target(bus, target);
        self.write_register(register, value);
        false
    }

    fn op_store(&mut self, bus: &mut impl Bus, register: Register, target: Target) -> bool {
        let value = self.read_register(register);
        self.write_target(bus, target, value);
        false
    }

    fn op_transfer(&mut self, source: Register, target: Register) -> bool {
        let value = self.read_register(source);
        self.write_register(target, value);
        false
    }

    fn op_push_stack(&mut self, bus: &mut impl Bus, source: Register) -> bool {
        let mut value = self.read_register(source);

        // Pushing `P` (via `PHP`, or the implicit push in `BRK`) always writes `Break = 1` to
        // the stack, even though `Break` reads back as `0` once pulled into `P`.
        if source == Register::P {
            let mut status = Status(value);
            status.set(StatusFlag::Break, true);
            value = status.0;
        }

        self.push_stack_u8(bus, value);
        false
    }

    fn op_pull_stack(&mut self, bus: &impl Bus, target: Register) -> bool {
        let value = self.pull_stack_u8(bus);
        self.write_register(target, value);
        false
    }

    fn op_logical(&mut self, bus: &impl Bus, target: Target, f: fn(u8, u8) -> u8) -> bool {
        let value = self.read_target(bus, target);
        let result = f(self.a, value);
        self.write_register(Register::A, result);
        false
    }

    fn op_bit(&mut self, bus: &impl Bus, target: Target) -> bool {
        let value = self.read_target(bus, target);
        let result = value & self.a;

        self.p.set(StatusFlag::Zero, result == 0);
        self.p.set(StatusFlag::Overflow, value & 0b0100_0000 > 0);
        self.p.set(StatusFlag::Negative, value & 0b1000_0000 > 0);
        false
    }

    fn op_add(&mut self, bus: &impl Bus, target: Target) -> bool {
        let rhs = self.read_target(bus, target);
        self.add(rhs);
        false
    }

    /// `ADC`'s arithmetic: `A = A + rhs + Carry`, with `Carry` and `Overflow` both recomputed
    /// from the addition.
    fn add(&mut self, rhs: u8) {
        let lhs = self.a;
        let carry: u8 = self.p.get(StatusFlag::Carry).into();

        let (result, result_overflow) = lhs.overflowing_add(rhs);
        let (result, carry_overflow) = result.overflowing_add(carry);

        self.p.set(StatusFlag::Carry, result_overflow || carry_overflow);

        // Signed overflow happens only when both operands share a sign and the result's sign
        // differs from theirs — e.g. positive + positive = negative.
        let lhs_sign = lhs & 0b1000_0000;
        let rhs_sign = rhs & 0b1000_0000;
        let result_sign = result & 0b1000_0000;
        let overflow = (lhs_sign == rhs_sign) && (lhs_sign != result_sign);
        self.p.set(StatusFlag::Overflow, overflow);

        self.write_register(Register::A, result);
    }

    fn op_sub(&mut self, bus: &impl Bus, target: Target) -> bool {
        let rhs = self.read_target(bus, target);
        self.subtract(rhs);
        false
    }

    /// `SBC`'s arithmetic: `A = A - rhs - (1 - Carry)`, expressed as borrow-form subtraction so
    /// `Carry` reads "no borrow occurred" on completion, matching `ADC`'s polarity.
    fn subtract(&mut self, rhs: u8) {
        let lhs = self.a;
        let carry: u8 = self.p.get(StatusFlag::Carry).into();

        let (result, result_overflow) = lhs.overflowing_sub(rhs);
        let (result, carry_overflow) = result.overflowing_sub(1 - carry);

        self.p.set(StatusFlag::Carry, !(result_overflow || carry_overflow));

        let lhs_sign = lhs & 0b1000_0000;
        let rhs_sign = rhs & 0b1000_0000;
        let result_sign = result & 0b1000_0000;
        let overflow = (lhs_sign != rhs_sign) && (lhs_sign != result_sign);
        self.p.set(StatusFlag::Overflow, overflow);

        self.write_register(Register::A, result);
    }

    fn op_compare(&mut self, bus: &impl Bus, register: Register, target: Target) -> bool {
        let register_value = self.read_register(register);
        let value = self.read_target(bus, target);
        let result = register_value.wrapping_sub(value);

        self.p.set(StatusFlag::Carry, register_value >= value);
        self.p.set(StatusFlag::Zero, result == 0);
        self.p.set(StatusFlag::Negative, result & 0b1000_0000 > 0);
        false
    }

    fn op_shift_left(&mut self, bus: &mut impl Bus, target: Target) -> bool {
        let (value, _) = self.modify_target(bus, target, |v| v.wrapping_shl(1));
        self.p.set(StatusFlag::Carry, value & 0b1000_0000 > 0);
        false
    }

    fn op_shift_right(&mut self, bus: &mut impl Bus, target: Target) -> bool {
        let (value, _) = self.modify_target(bus, target, |v| v.wrapping_shr(1));
        self.p.set(StatusFlag::Carry, value & 0b0000_0001 > 0);
        false
    }

    fn op_rotate_left(&mut self, bus: &mut impl Bus, target: Target) -> bool {
        let carry_in = u8::from(self.p.get(StatusFlag::Carry));
        let (value, _) = self.modify_target(bus, target, |v| v.wrapping_shl(1) | carry_in);
        self.p.set(StatusFlag::Carry, value & 0b1000_0000 > 0);
        false
    }

    fn op_rotate_right(&mut self, bus: &mut impl Bus, target: Target) -> bool {
        let carry_in = u8::from(self.p.get(StatusFlag::Carry)) << 7;
        let (value, _) = self.modify_target(bus, target, |v| v.wrapping_shr(1) | carry_in);
        self.p.set(StatusFlag::Carry, value & 0b0000_0001 > 0);
        false
    }

    fn op_jump_subroutine(&mut self, bus: &mut impl Bus, target: Target) -> bool {
        let address = self.target_address(target);

        // `pc` has already been advanced past all three bytes of the `JSR` instruction, so
        // subtracting 1 gives the address of the instruction's last byte — what `RTS` expects.
        let return_address = self.pc.wrapping_sub(1);
        self.push_stack_u16(bus, return_address);

        self.pc = address;
        false
    }

    fn op_return(&mut self, bus: &impl Bus) -> bool {
        let address = self.pull_stack_u16(bus);
        self.pc = address.wrapping_add(1);
        false
    }

    fn op_return_from_interrupt(&mut self, bus: &impl Bus) -> bool {
        let p = self.pull_stack_u8(bus);
        let pc = self.pull_stack_u16(bus);
        self.write_register(Register::P, p);
        self.pc = pc;
        false
    }

    fn op_branch_if(&mut self, target: Target, condition: bool) -> bool {
        if condition {
            self.pc = self.target_address(target);
        }
        condition
    }
}

impl Default for Cpu {
    fn default() -> Cpu {
        Cpu::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bus::FlatBus;

    #[test]
    fn program_counter_is_initialized_from_reset_vector() {
        let mut bus = FlatBus::new().with_reset_vector(0xFF00);
        let mut cpu = Cpu::new();
        cpu.reset(&mut bus);
        assert_eq!(cpu.pc, 0xFF00);
    }

    #[test]
    fn lda_immediate_sets_negative_flag() {
        let mut bus = FlatBus::new().with_program(&[0xA9, 0x80]); // LDA #$80
        let mut cpu = Cpu::new();
        cpu.reset(&mut bus);
        let cycles = cpu.step(&mut bus).unwrap();

        assert_eq!(cpu.a, 0x80);
        assert!(cpu.p.get(StatusFlag::Negative));
        assert!(!cpu.p.get(StatusFlag::Zero));
        assert_eq!(cycles, 2);
    }

    #[test]
    fn adc_sets_carry_and_overflow_on_signed_overflow() {
        // 0x7F (+127) + 0x01 (+1) overflows into a negative result, but no unsigned carry.
        let mut bus = FlatBus::new().with_program(&[0xA9, 0x7F, 0x69, 0x01]); // LDA #$7F; ADC #$01
        let mut cpu = Cpu::new();
        cpu.reset(&mut bus);
        cpu.step(&mut bus).unwrap(); // LDA
        cpu.step(&mut bus).unwrap(); // ADC

        assert_eq!(cpu.a, 0x80);
        assert!(!cpu.p.get(StatusFlag::Carry));
        assert!(cpu.p.get(StatusFlag::Overflow));
        assert!(cpu.p.get(StatusFlag::Negative));
    }

    #[test]
    fn absolute_x_pays_page_cross_penalty() {
        let mut bus = FlatBus::new().with_program(&[0xBD, 0xFF, 0x10]); // LDA $10FF,X
        bus.write_u8(0x1100, 0x42);
        let mut cpu = Cpu::new();
        cpu.reset(&mut bus);
        cpu.x = 0x01;
        let cycles = cpu.step(&mut bus).unwrap();

        assert_eq!(cpu.a, 0x42);
        assert_eq!(cycles, 5); // 4 base + 1 page-cross
    }

    #[test]
    fn branch_taken_across_page_costs_two_extra_cycles() {
        // CLC at the tail of page 0x02, followed by a BCC whose +127 displacement carries the
        // target past the end of the page it's branching from.
        let mut bus = FlatBus::new().with_reset_vector(0x02F0);
        bus.write_u8(0x02F0, 0x18); // CLC
        bus.write_u8(0x02F1, 0x90); // BCC
        bus.write_u8(0x02F2, 0x7F); // +127 -> instruction_after = 0x02F3, target = 0x0372 (crosses page)

        let mut cpu = Cpu::new();
        cpu.reset(&mut bus);
        cpu.step(&mut bus).unwrap(); // CLC
        let cycles = cpu.step(&mut bus).unwrap(); // BCC, taken, page-crossed

        assert_eq!(cpu.pc, 0x0372);
        assert_eq!(cycles, 4); // 2 base + 1 taken + 1 page-cross
    }

    #[test]
    fn jsr_rts_round_trips_through_the_stack() {
        let mut bus = FlatBus::new()
            .with_reset_vector(0xF000)
            .with_memory_at(0xF000, &[0x20, 0x00, 0x02]) // JSR $0200
            .with_memory_at(0x0200, &[0x60]); // RTS

        let mut cpu = Cpu::new();
        cpu.reset(&mut bus);
        cpu.sp = 0xFF;

        cpu.step(&mut bus).unwrap(); // JSR
        assert_eq!(cpu.pc, 0x0200);
        assert_eq!(bus.read_u8(0x01FF), 0xF0);
        assert_eq!(bus.read_u8(0x01FE), 0x02);

        cpu.step(&mut bus).unwrap(); // RTS
        assert_eq!(cpu.pc, 0xF003);
        assert_eq!(cpu.sp, 0xFF);
    }

    #[test]
    fn brk_rti_round_trips_status_and_pc() {
        let mut bus = FlatBus::new()
            .with_reset_vector(0xF000)
            .with_memory_at(0xF000, &[0x00, 0x00]) // BRK
            .with_memory_at(0xFFFE, &[0x00, 0x02]); // IRQ/BRK vector -> 0x0200
        bus.write_u8(0x0200, 0x40); // RTI

        let mut cpu = Cpu::new();
        cpu.reset(&mut bus);
        cpu.sp = 0xFF;
        cpu.p.set(StatusFlag::Carry, true);

        cpu.step(&mut bus).unwrap(); // BRK
        assert_eq!(cpu.pc, 0x0200);
        assert!(cpu.p.get(StatusFlag::InterruptDisable));

        cpu.step(&mut bus).unwrap(); // RTI
        assert_eq!(cpu.pc, 0xF002);
        assert!(cpu.p.get(StatusFlag::Carry));
        assert!(!cpu.p.get(StatusFlag::Break));
        assert!(cpu.p.get(StatusFlag::Unused));
    }

    #[test]
    fn reset_clears_decimal_flag_even_on_a_warm_reset() {
        let mut bus = FlatBus::new().with_reset_vector(0xFF00);
        let mut cpu = Cpu::new();
        cpu.reset(&mut bus);
        cpu.p.set(StatusFlag::DecimalMode, true);

        cpu.reset(&mut bus);

        assert!(!cpu.p.get(StatusFlag::DecimalMode));
        assert!(cpu.p.get(StatusFlag::Unused));
    }

    #[test]
    fn cpx_compares_x_not_y() {
        let mut bus = FlatBus::new().with_program(&[0xE0, 0x05]); // CPX #$05
        let mut cpu = Cpu::new();
        cpu.reset(&mut bus);
        cpu.x = 0x05;
        cpu.y = 0x00;
        cpu.step(&mut bus).unwrap();

        assert!(cpu.p.get(StatusFlag::Zero));
    }

    #[test]
    fn tya_sets_flags_from_accumulator_not_x() {
        let mut bus = FlatBus::new().with_program(&[0x98]); // TYA
        let mut cpu = Cpu::new();
        cpu.reset(&mut bus);
        cpu.y = 0x00;
        cpu.x = 0xFF;
        cpu.step(&mut bus).unwrap();

        assert_eq!(cpu.a, 0x00);
        assert!(cpu.p.get(StatusFlag::Zero));
    }

    #[test]
    fn illegal_opcode_is_reported_without_advancing_pc() {
        let mut bus = FlatBus::new().with_program(&[0x02]); // illegal
        let mut cpu = Cpu::new();
        cpu.reset(&mut bus);
        let pc_before = cpu.pc;
        let result = cpu.step(&mut bus);

        assert_eq!(result, Err(Error::IllegalOpcode { opcode: 0x02, pc: pc_before }));
        assert_eq!(cpu.pc, pc_before);
    }

    /// ADC should behave as 9-bit addition for every representable input: the low 8 bits of
    /// `a + rhs + carry_in` land in `A`, and `Carry` out reflects whether that sum overflowed 8
    /// bits, for every possible `(a, rhs, carry_in)` triple.
    #[test]
    fn adc_is_9_bit_addition_for_all_inputs() {
        for a in 0..=255u16 {
            for rhs in 0..=255u16 {
                for carry_in in [false, true] {
                    let mut bus = FlatBus::new().with_program(&[0x69, rhs as u8]); // ADC #$rhs
                    let mut cpu = Cpu::new();
                    cpu.reset(&mut bus);
                    cpu.a = a as u8;
                    cpu.p.set(StatusFlag::Carry, carry_in);

                    cpu.step(&mut bus).unwrap();

                    let expected = a + rhs + carry_in as u16;
                    assert_eq!(cpu.a, (expected & 0xFF) as u8);
                    assert_eq!(cpu.p.get(StatusFlag::Carry), expected > 0xFF);
                }
            }
        }
    }

    /// Rotating a byte left then right (or right then left) through the same carry value
    /// restores both the byte and the carry flag.
    #[test]
    fn rol_ror_round_trip_restores_value_and_carry() {
        for value in 0..=255u8 {
            for carry_in in [false, true] {
                let mut bus = FlatBus::new().with_program(&[0x2A, 0x6A]); // ROL A; ROR A
                let mut cpu = Cpu::new();
                cpu.reset(&mut bus);
                cpu.a = value;
                cpu.p.set(StatusFlag::Carry, carry_in);

                cpu.step(&mut bus).unwrap(); // ROL A
                cpu.step(&mut bus).unwrap(); // ROR A

                assert_eq!(cpu.a, value);
                assert_eq!(cpu.p.get(StatusFlag::Carry), carry_in);
            }
        }
    }

    /// `CMP` sets `Carry` iff the register is greater than or equal to the operand, for every
    /// representable pair.
    #[test]
    fn cmp_carry_matches_greater_or_equal_for_all_pairs() {
        for register_value in 0..=255u16 {
            for operand in 0..=255u16 {
                let mut bus = FlatBus::new().with_program(&[0xC9, operand as u8]); // CMP #$operand
                let mut cpu = Cpu::new();
                cpu.reset(&mut bus);
                cpu.a = register_value as u8;

                cpu.step(&mut bus).unwrap();

                assert_eq!(cpu.p.get(StatusFlag::Carry), register_value >= operand);
                assert_eq!(cpu.p.get(StatusFlag::Zero), register_value == operand);
            }
        }
    }

    #[test]
    fn scenario_lda_immediate_at_pc_zero() {
        let mut bus = FlatBus::new().with_memory_at(0x0000, &[0xA9, 0x80]);
        let mut cpu = Cpu::new();

        let cycles = cpu.step(&mut bus).unwrap();

        assert_eq!(cpu.a, 0x80);
        assert!(cpu.p.get(StatusFlag::Negative));
        assert!(!cpu.p.get(StatusFlag::Zero));
        assert_eq!(cpu.pc, 0x0002);
        assert_eq!(cycles, 2);
    }

    #[test]
    fn scenario_adc_zero_page_carry_and_overflow() {
        let mut bus = FlatBus::new().with_memory_at(0x0000, &[0x65, 0x10]);
        bus.write_u8(0x0010, 0x50);
        let mut cpu = Cpu::new();
        cpu.a = 0x50;

        let cycles = cpu.step(&mut bus).unwrap();

        assert_eq!(cpu.a, 0xA0);
        assert!(!cpu.p.get(StatusFlag::Carry));
        assert!(!cpu.p.get(StatusFlag::Zero));
        assert!(cpu.p.get(StatusFlag::Negative));
        assert!(cpu.p.get(StatusFlag::Overflow));
        assert_eq!(cycles, 3);
    }

    #[test]
    fn scenario_absolute_x_page_cross() {
        let mut bus = FlatBus::new().with_memory_at(0x0000, &[0xBD, 0xFF, 0x10]);
        bus.write_u8(0x1100, 0x42);
        let mut cpu = Cpu::new();
        cpu.x = 0x01;

        let cycles = cpu.step(&mut bus).unwrap();

        assert_eq!(cpu.a, 0x42);
        assert_eq!(cycles, 5);
    }

    #[test]
    fn scenario_beq_taken_across_page() {
        let mut bus = FlatBus::new().with_memory_at(0x00F0, &[0xF0, 0x20]);
        let mut cpu = Cpu::new();
        cpu.pc = 0x00F0;
        cpu.p.set(StatusFlag::Zero, true);

        let cycles = cpu.step(&mut bus).unwrap();

        assert_eq!(cpu.pc, 0x0112);
        assert_eq!(cycles, 4);
    }

    #[test]
    fn scenario_jsr_rts_round_trip() {
        let mut bus = FlatBus::new()
            .with_memory_at(0x0600, &[0x20, 0x00, 0x08])
            .with_memory_at(0x0800, &[0x60]);
        let mut cpu = Cpu::new();
        cpu.pc = 0x0600;
        cpu.sp = 0xFF;

        cpu.step(&mut bus).unwrap(); // JSR
        assert_eq!(cpu.pc, 0x0800);
        assert_eq!(cpu.sp, 0xFD);
        assert_eq!(bus.read_u8(0x01FF), 0x06);
        assert_eq!(bus.read_u8(0x01FE), 0x02);

        cpu.step(&mut bus).unwrap(); // RTS
        assert_eq!(cpu.pc, 0x0603);
        assert_eq!(cpu.sp, 0xFF);
    }

    #[test]
    fn scenario_brk_rti_round_trip() {
        let mut bus = FlatBus::new()
            .with_memory_at(0xFFFE, &[0x00, 0x90])
            .with_memory_at(0x0400, &[0x00, 0x00]);
        bus.write_u8(0x9000, 0x40); // RTI
        let mut cpu = Cpu::new();
        cpu.pc = 0x0400;
        cpu.sp = 0xFF;
        cpu.p.set(StatusFlag::InterruptDisable, false);
        let interrupt_disable_before = cpu.p.get(StatusFlag::InterruptDisable);

        cpu.step(&mut bus).unwrap(); // BRK
        assert_eq!(cpu.pc, 0x9000);
        assert_eq!(cpu.sp, 0xFC);
        assert!(cpu.p.get(StatusFlag::InterruptDisable));
        let status_on_stack = bus.read_u8(0x01FD);
        assert!(status_on_stack & 0b0001_0000 > 0); // B
        assert!(status_on_stack & 0b0010_0000 > 0); // U

        cpu.step(&mut bus).unwrap(); // RTI
        assert_eq!(cpu.pc, 0x0402);
        assert_eq!(cpu.sp, 0xFF);
        assert_eq!(cpu.p.get(StatusFlag::InterruptDisable), interrupt_disable_before);
    }
}
