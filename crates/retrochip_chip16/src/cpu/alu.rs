use super::{Cpu, Flags};

/// ALU helpers. Each returns the 16-bit result and recomputes the flags the
/// operation defines; data movement and control flow never touch flags.
///
/// Registers hold raw 16-bit patterns. Arithmetic runs on the unsigned
/// pattern; signedness only enters through the N and O rules, which use the
/// two's-complement reading of the same bits.
impl Cpu {
    pub(super) fn alu_add(&mut self, a: u16, b: u16) -> u16 {
        let wide = u32::from(a) + u32::from(b);
        let result = wide as u16;
        self.flags.set(Flags::CARRY, wide > 0xFFFF);
        self.flags.set(Flags::ZERO, result == 0);
        self.flags
            .set(Flags::OVERFLOW, sign(a) == sign(b) && sign(result) != sign(a));
        self.flags.set(Flags::NEGATIVE, sign(result));
        result
    }

    /// Subtraction, also used by CMP. Carry is the sign bit of the result;
    /// overflow follows the two's-complement subtraction rule (operand signs
    /// differ and the result's sign differs from the minuend's).
    pub(super) fn alu_sub(&mut self, a: u16, b: u16) -> u16 {
        let result = a.wrapping_sub(b);
        self.flags.set(Flags::CARRY, sign(result));
        self.flags.set(Flags::ZERO, result == 0);
        self.flags
            .set(Flags::OVERFLOW, sign(a) != sign(b) && sign(result) != sign(a));
        self.flags.set(Flags::NEGATIVE, sign(result));
        result
    }

    pub(super) fn alu_mul(&mut self, a: u16, b: u16) -> u16 {
        let wide = u32::from(a) * u32::from(b);
        let result = wide as u16;
        self.flags.set(Flags::CARRY, wide > 0xFFFF);
        self.flags.set(Flags::ZERO, result == 0);
        self.flags.set(Flags::NEGATIVE, sign(result));
        result
    }

    /// Unsigned division. Carry reports an inexact division (non-zero
    /// remainder). A zero divisor yields 0 with carry clear; the hardware
    /// has no trap mechanism, so nothing else is signaled.
    pub(super) fn alu_div(&mut self, a: u16, b: u16) -> u16 {
        let (result, inexact) = if b == 0 { (0, false) } else { (a / b, a % b != 0) };
        self.flags.set(Flags::CARRY, inexact);
        self.flags.set(Flags::ZERO, result == 0);
        self.flags.set(Flags::NEGATIVE, sign(result));
        result
    }

    /// Unsigned remainder. A zero divisor yields 0. Carry and overflow are
    /// left unchanged.
    pub(super) fn alu_rem(&mut self, a: u16, b: u16) -> u16 {
        let result = if b == 0 { 0 } else { a % b };
        self.set_zn(result);
        result
    }

    pub(super) fn alu_and(&mut self, a: u16, b: u16) -> u16 {
        let result = a & b;
        self.set_zn(result);
        result
    }

    pub(super) fn alu_or(&mut self, a: u16, b: u16) -> u16 {
        let result = a | b;
        self.set_zn(result);
        result
    }

    pub(super) fn alu_xor(&mut self, a: u16, b: u16) -> u16 {
        let result = a ^ b;
        self.set_zn(result);
        result
    }

    pub(super) fn alu_not(&mut self, value: u16) -> u16 {
        let result = !value;
        self.set_zn(result);
        result
    }

    pub(super) fn alu_neg(&mut self, value: u16) -> u16 {
        let result = value.wrapping_neg();
        self.set_zn(result);
        result
    }

    /// Logical left shift. Register-held counts can exceed the register
    /// width; everything shifts out to 0.
    pub(super) fn alu_shl(&mut self, value: u16, count: u16) -> u16 {
        let result = if count < 16 { value << count } else { 0 };
        self.set_zn(result);
        result
    }

    pub(super) fn alu_shr(&mut self, value: u16, count: u16) -> u16 {
        let result = if count < 16 { value >> count } else { 0 };
        self.set_zn(result);
        result
    }

    /// Arithmetic right shift; counts past the width saturate to the sign
    /// fill.
    pub(super) fn alu_sar(&mut self, value: u16, count: u16) -> u16 {
        let result = ((value as i16) >> count.min(15)) as u16;
        self.set_zn(result);
        result
    }

    /// Logic and shift operations update Zero and Negative only.
    pub(super) fn set_zn(&mut self, result: u16) {
        self.flags.set(Flags::ZERO, result == 0);
        self.flags.set(Flags::NEGATIVE, sign(result));
    }
}

/// Sign bit of the two's-complement reading.
#[inline]
fn sign(value: u16) -> bool {
    (value as i16) < 0
}
