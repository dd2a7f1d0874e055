use std::fmt;

/// # Opcodes
///
/// Chip-8 opcodes are 16 bits each, stored big-endian in memory. Their behavior is cased on:
/// - `[g___]` the group; applies to all opcodes
/// - `[___n]` specific behavior within the arithmetic group
/// - `[__kk]` specific behavior within the clear/return, key and misc groups
///
/// Nibbles not used to select the operation carry its operands.
/// - `[_adr]` a 12-bit address
/// - `[__kk]` a byte that is assigned to and/or compared with Vx
/// - `[_x__]` the register Vx, or the range of registers V0..=Vx
/// - `[__y_]` the register Vy
/// - `[___n]` a sprite height
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash)]
pub struct Opcode(pub u16);

impl Opcode {
    /// Combines the two bytes of an instruction as they appear in memory.
    pub fn from_bytes(high: u8, low: u8) -> Self {
        Opcode(u16::from_be_bytes([high, low]))
    }

    /// `[g___]`
    pub fn group(self) -> u8 {
        ((self.0 & 0xF000) >> 12) as u8
    }

    /// `[_x__]`
    pub fn x(self) -> usize {
        ((self.0 & 0x0F00) >> 8) as usize
    }

    /// `[__y_]`
    pub fn y(self) -> usize {
        ((self.0 & 0x00F0) >> 4) as usize
    }

    /// `[___n]`
    pub fn n(self) -> u8 {
        (self.0 & 0x000F) as u8
    }

    /// `[__kk]`
    pub fn kk(self) -> u8 {
        (self.0 & 0x00FF) as u8
    }

    /// `[_adr]`
    pub fn addr(self) -> u16 {
        self.0 & 0x0FFF
    }
}

impl From<u16> for Opcode {
    fn from(word: u16) -> Self {
        Opcode(word)
    }
}

impl fmt::Display for Opcode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:#06X}", self.0)
    }
}
