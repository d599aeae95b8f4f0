bitflags::bitflags! {
    /// CPU condition flags.
    ///
    /// The packed byte layout (used by PUSHF/POPF) is fixed:
    /// - bit 1: C (carry / borrow)
    /// - bit 2: Z (zero)
    /// - bit 6: O (signed overflow)
    /// - bit 7: N (negative, result bit 15)
    ///
    /// The remaining bits are always zero.
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct Flags: u8 {
        const CARRY = 1 << 1;
        const ZERO = 1 << 2;
        const OVERFLOW = 1 << 6;
        const NEGATIVE = 1 << 7;
    }
}
