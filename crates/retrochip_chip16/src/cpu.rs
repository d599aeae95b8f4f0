//! Fetch-decode-execute core.
//!
//! Every instruction is a 4-byte word and completes in exactly one
//! [`step`](Cpu::step). The PC is advanced past the instruction before it
//! executes, so control-flow opcodes simply overwrite it. Reserved and
//! unknown opcodes execute as no-ops; the interpreter never halts itself.

mod alu;
mod flags;
mod opcode;

pub use flags::Flags;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::graphics::Graphics;
use crate::memory::{Memory, STACK_START};

use opcode::Opcode;

pub const NUM_REGS: usize = 16;

pub struct Cpu {
    pc: u16,
    sp: u16,
    regs: [u16; NUM_REGS],
    flags: Flags,
    rng: StdRng,
}

impl Default for Cpu {
    fn default() -> Self {
        Cpu::with_rng(StdRng::from_entropy())
    }
}

impl Cpu {
    /// A CPU whose RND opcode draws a reproducible sequence.
    pub fn with_seed(seed: u64) -> Self {
        Cpu::with_rng(StdRng::seed_from_u64(seed))
    }

    fn with_rng(rng: StdRng) -> Self {
        Cpu {
            pc: 0,
            sp: STACK_START,
            regs: [0; NUM_REGS],
            flags: Flags::empty(),
            rng,
        }
    }

    /// Power-on state: PC 0, SP at the stack base, registers and flags
    /// cleared. The random sequence is not re-seeded.
    pub fn reset(&mut self) {
        self.pc = 0;
        self.sp = STACK_START;
        self.regs = [0; NUM_REGS];
        self.flags = Flags::empty();
    }

    #[inline]
    pub fn pc(&self) -> u16 {
        self.pc
    }

    pub fn set_pc(&mut self, pc: u16) {
        self.pc = pc;
    }

    #[inline]
    pub fn sp(&self) -> u16 {
        self.sp
    }

    #[inline]
    pub fn flags(&self) -> Flags {
        self.flags
    }

    pub fn set_flags(&mut self, flags: Flags) {
        self.flags = flags;
    }

    #[inline]
    pub fn reg(&self, index: usize) -> u16 {
        assert!(index < NUM_REGS, "invalid register index: {}", index);
        self.regs[index]
    }

    pub fn set_reg(&mut self, index: usize, value: u16) {
        assert!(index < NUM_REGS, "invalid register index: {}", index);
        self.regs[index] = value;
    }

    /// Executes exactly one instruction: fetch at PC, advance PC by 4, then
    /// run the opcode's behavior against memory and the display.
    pub fn step(&mut self, memory: &mut Memory, graphics: &mut Graphics) {
        let op = Opcode(memory.read_opcode(self.pc));
        self.pc = self.pc.wrapping_add(4);
        self.execute(op, memory, graphics);
    }

    fn execute(&mut self, op: Opcode, memory: &mut Memory, graphics: &mut Graphics) {
        match op.code() {
            // NOP
            0x00 => (),
            // CLS
            0x01 => graphics.clear(),
            // VBLNK - raise the frame flag
            0x02 => graphics.set_vblank(true),
            // BGC N
            0x03 => graphics.set_bg(op.n()),
            // SPR HHLL - LL source bytes wide, HH rows tall
            0x04 => graphics.set_sprite_size(op.ll(), op.hh()),
            // DRW RX, RY, HHLL
            0x05 => {
                let hit = graphics.draw_sprite(
                    memory,
                    op.hhll(),
                    (self.regs[op.x()] as i16).into(),
                    (self.regs[op.y()] as i16).into(),
                );
                self.flags.set(Flags::CARRY, hit);
            }
            // DRW RX, RY, RZ
            0x06 => {
                let hit = graphics.draw_sprite(
                    memory,
                    self.regs[op.z()],
                    (self.regs[op.x()] as i16).into(),
                    (self.regs[op.y()] as i16).into(),
                );
                self.flags.set(Flags::CARRY, hit);
            }
            // RND RX, HHLL - uniform in [0, HHLL]
            0x07 => self.regs[op.x()] = self.rng.gen_range(0..=op.hhll()),
            // FLIP
            0x08 => {
                let (horizontal, vertical) = op.flip_bits();
                graphics.set_flip(horizontal, vertical);
            }
            // SND0/SND1/SND2/SND3/SNP/SNG - accepted, no audible effect
            0x09..=0x0E => (),

            // JMP HHLL
            0x10 => self.pc = op.hhll(),
            // JMC HHLL
            0x11 => {
                if self.flags.contains(Flags::CARRY) {
                    self.pc = op.hhll();
                }
            }
            // Jx HHLL
            0x12 => {
                if self.condition(op.x()) {
                    self.pc = op.hhll();
                }
            }
            // JME RX, RY, HHLL
            0x13 => {
                if self.regs[op.x()] == self.regs[op.y()] {
                    self.pc = op.hhll();
                }
            }
            // CALL HHLL
            0x14 => self.call(memory, op.hhll()),
            // RET
            0x15 => self.pc = self.pop_word(memory),
            // JMP RX
            0x16 => self.pc = self.regs[op.x()],
            // Cx HHLL
            0x17 => {
                if self.condition(op.x()) {
                    self.call(memory, op.hhll());
                }
            }
            // CALL RX
            0x18 => self.call(memory, self.regs[op.x()]),

            // LDI RX, HHLL
            0x20 => self.regs[op.x()] = op.hhll(),
            // LDI SP, HHLL
            0x21 => self.sp = op.hhll(),
            // LDM RX, HHLL
            0x22 => self.regs[op.x()] = memory.read_word(op.hhll()),
            // LDM RX, RY
            0x23 => self.regs[op.x()] = memory.read_word(self.regs[op.y()]),
            // MOV RX, RY
            0x24 => self.regs[op.x()] = self.regs[op.y()],

            // STM RX, HHLL
            0x30 => memory.write_word(op.hhll(), self.regs[op.x()]),
            // STM RX, RY
            0x31 => memory.write_word(self.regs[op.y()], self.regs[op.x()]),

            // ADDI RX, HHLL
            0x40 => self.regs[op.x()] = self.alu_add(self.regs[op.x()], op.hhll()),
            // ADD RX, RY
            0x41 => self.regs[op.x()] = self.alu_add(self.regs[op.x()], self.regs[op.y()]),
            // ADD RX, RY, RZ
            0x42 => self.regs[op.z()] = self.alu_add(self.regs[op.x()], self.regs[op.y()]),

            // SUBI RX, HHLL
            0x50 => self.regs[op.x()] = self.alu_sub(self.regs[op.x()], op.hhll()),
            // SUB RX, RY
            0x51 => self.regs[op.x()] = self.alu_sub(self.regs[op.x()], self.regs[op.y()]),
            // SUB RX, RY, RZ
            0x52 => self.regs[op.z()] = self.alu_sub(self.regs[op.x()], self.regs[op.y()]),
            // CMPI RX, HHLL - flags only
            0x53 => {
                self.alu_sub(self.regs[op.x()], op.hhll());
            }
            // CMP RX, RY
            0x54 => {
                self.alu_sub(self.regs[op.x()], self.regs[op.y()]);
            }

            // ANDI RX, HHLL
            0x60 => self.regs[op.x()] = self.alu_and(self.regs[op.x()], op.hhll()),
            // AND RX, RY
            0x61 => self.regs[op.x()] = self.alu_and(self.regs[op.x()], self.regs[op.y()]),
            // AND RX, RY, RZ
            0x62 => self.regs[op.z()] = self.alu_and(self.regs[op.x()], self.regs[op.y()]),
            // TSTI RX, HHLL - flags only
            0x63 => {
                self.alu_and(self.regs[op.x()], op.hhll());
            }
            // TST RX, RY
            0x64 => {
                self.alu_and(self.regs[op.x()], self.regs[op.y()]);
            }

            // ORI RX, HHLL
            0x70 => self.regs[op.x()] = self.alu_or(self.regs[op.x()], op.hhll()),
            // OR RX, RY
            0x71 => self.regs[op.x()] = self.alu_or(self.regs[op.x()], self.regs[op.y()]),
            // OR RX, RY, RZ
            0x72 => self.regs[op.z()] = self.alu_or(self.regs[op.x()], self.regs[op.y()]),

            // XORI RX, HHLL
            0x80 => self.regs[op.x()] = self.alu_xor(self.regs[op.x()], op.hhll()),
            // XOR RX, RY
            0x81 => self.regs[op.x()] = self.alu_xor(self.regs[op.x()], self.regs[op.y()]),
            // XOR RX, RY, RZ
            0x82 => self.regs[op.z()] = self.alu_xor(self.regs[op.x()], self.regs[op.y()]),

            // MULI RX, HHLL
            0x90 => self.regs[op.x()] = self.alu_mul(self.regs[op.x()], op.hhll()),
            // MUL RX, RY
            0x91 => self.regs[op.x()] = self.alu_mul(self.regs[op.x()], self.regs[op.y()]),
            // MUL RX, RY, RZ
            0x92 => self.regs[op.z()] = self.alu_mul(self.regs[op.x()], self.regs[op.y()]),

            // DIVI RX, HHLL
            0xA0 => self.regs[op.x()] = self.alu_div(self.regs[op.x()], op.hhll()),
            // DIV RX, RY
            0xA1 => self.regs[op.x()] = self.alu_div(self.regs[op.x()], self.regs[op.y()]),
            // DIV RX, RY, RZ
            0xA2 => self.regs[op.z()] = self.alu_div(self.regs[op.x()], self.regs[op.y()]),
            // MODI RX, HHLL / REMI RX, HHLL
            0xA3 | 0xA6 => self.regs[op.x()] = self.alu_rem(self.regs[op.x()], op.hhll()),
            // MOD RX, RY / REM RX, RY
            0xA4 | 0xA7 => self.regs[op.x()] = self.alu_rem(self.regs[op.x()], self.regs[op.y()]),
            // MOD RX, RY, RZ / REM RX, RY, RZ
            0xA5 | 0xA8 => self.regs[op.z()] = self.alu_rem(self.regs[op.x()], self.regs[op.y()]),

            // SHL RX, N
            0xB0 => self.regs[op.x()] = self.alu_shl(self.regs[op.x()], u16::from(op.n())),
            // SHR RX, N
            0xB1 => self.regs[op.x()] = self.alu_shr(self.regs[op.x()], u16::from(op.n())),
            // SAR RX, N
            0xB2 => self.regs[op.x()] = self.alu_sar(self.regs[op.x()], u16::from(op.n())),
            // SHL RX, RY
            0xB3 => self.regs[op.x()] = self.alu_shl(self.regs[op.x()], self.regs[op.y()]),
            // SHR RX, RY
            0xB4 => self.regs[op.x()] = self.alu_shr(self.regs[op.x()], self.regs[op.y()]),
            // SAR RX, RY
            0xB5 => self.regs[op.x()] = self.alu_sar(self.regs[op.x()], self.regs[op.y()]),

            // PUSH RX
            0xC0 => {
                let value = self.regs[op.x()];
                self.push_word(memory, value);
            }
            // POP RX
            0xC1 => self.regs[op.x()] = self.pop_word(memory),
            // PUSHALL - R0 first
            0xC2 => {
                for index in 0..NUM_REGS {
                    let value = self.regs[index];
                    self.push_word(memory, value);
                }
            }
            // POPALL - R15 first
            0xC3 => {
                for index in (0..NUM_REGS).rev() {
                    self.regs[index] = self.pop_word(memory);
                }
            }
            // PUSHF - flag byte at [SP], SP still moves a whole word
            0xC4 => {
                memory.write_byte(self.sp, self.flags.bits());
                self.sp = self.sp.wrapping_add(2);
            }
            // POPF
            0xC5 => {
                self.sp = self.sp.wrapping_sub(2);
                self.flags = Flags::from_bits_truncate(memory.read_byte(self.sp));
            }

            // PAL HHLL
            0xD0 => graphics.load_palette(memory, op.hhll()),
            // PAL RX
            0xD1 => graphics.load_palette(memory, self.regs[op.x()]),

            // NOTI RX, HHLL
            0xE0 => self.regs[op.x()] = self.alu_not(op.hhll()),
            // NOT RX
            0xE1 => self.regs[op.x()] = self.alu_not(self.regs[op.x()]),
            // NOT RX, RY
            0xE2 => self.regs[op.x()] = self.alu_not(self.regs[op.y()]),
            // NEGI RX, HHLL
            0xE3 => self.regs[op.x()] = self.alu_neg(op.hhll()),
            // NEG RX
            0xE4 => self.regs[op.x()] = self.alu_neg(self.regs[op.x()]),
            // NEG RX, RY
            0xE5 => self.regs[op.x()] = self.alu_neg(self.regs[op.y()]),

            // Reserved opcodes execute as NOP
            other => {
                log::warn!(
                    "reserved opcode {:#04x} at {:#06x}, ignored",
                    other,
                    self.pc.wrapping_sub(4)
                );
            }
        }
    }

    /// Pushes the current PC and transfers control to `target`.
    fn call(&mut self, memory: &mut Memory, target: u16) {
        let return_address = self.pc;
        self.push_word(memory, return_address);
        self.pc = target;
    }

    fn push_word(&mut self, memory: &mut Memory, value: u16) {
        memory.write_word(self.sp, value);
        self.sp = self.sp.wrapping_add(2);
    }

    fn pop_word(&mut self, memory: &Memory) -> u16 {
        self.sp = self.sp.wrapping_sub(2);
        memory.read_word(self.sp)
    }

    /// One of 16 flag-combination tests used by Jx and Cx.
    fn condition(&self, code: usize) -> bool {
        let carry = self.flags.contains(Flags::CARRY);
        let zero = self.flags.contains(Flags::ZERO);
        let overflow = self.flags.contains(Flags::OVERFLOW);
        let negative = self.flags.contains(Flags::NEGATIVE);
        match code {
            // Z - equal
            0x0 => zero,
            // NZ - not equal
            0x1 => !zero,
            // N - negative
            0x2 => negative,
            // NN - not negative
            0x3 => !negative,
            // P - positive
            0x4 => !negative && !zero,
            // O - overflow
            0x5 => overflow,
            // NO - no overflow
            0x6 => !overflow,
            // A - unsigned greater than
            0x7 => !carry && !zero,
            // AE - unsigned greater than or equal
            0x8 => !carry,
            // B - unsigned less than
            0x9 => carry,
            // BE - unsigned less than or equal
            0xA => carry || zero,
            // G - signed greater than
            0xB => overflow == negative && !zero,
            // GE - signed greater than or equal
            0xC => overflow == negative,
            // L - signed less than
            0xD => overflow != negative,
            // LE - signed less than or equal
            0xE => overflow != negative || zero,
            // reserved
            _ => false,
        }
    }
}
