use rand::RngCore;

use crate::error::Chip8Error;
use crate::opcode::Opcode;
use crate::operations::*;
use crate::state::State;

/// Every instruction the interpreter understands, with its operands already pulled out of the opcode.
///
/// `x` and `y` index registers, `kk` is an immediate byte, `addr` a 12-bit address and `n` a sprite height.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Instruction {
    /// 00E0
    Clear,
    /// 00EE
    Return,
    /// 1nnn
    Jump { addr: u16 },
    /// 2nnn
    Call { addr: u16 },
    /// 3xkk
    SkipEqual { x: usize, kk: u8 },
    /// 4xkk
    SkipNotEqual { x: usize, kk: u8 },
    /// 5xy0
    SkipRegistersEqual { x: usize, y: usize },
    /// 6xkk
    Load { x: usize, kk: u8 },
    /// 7xkk
    Add { x: usize, kk: u8 },
    /// 8xy0
    Move { x: usize, y: usize },
    /// 8xy1
    Or { x: usize, y: usize },
    /// 8xy2
    And { x: usize, y: usize },
    /// 8xy3
    Xor { x: usize, y: usize },
    /// 8xy4
    AddRegisters { x: usize, y: usize },
    /// 8xy5
    SubtractXY { x: usize, y: usize },
    /// 8xy6
    ShiftRight { x: usize },
    /// 8xy7
    SubtractYX { x: usize, y: usize },
    /// 8xyE
    ShiftLeft { x: usize },
    /// 9xy0
    SkipRegistersNotEqual { x: usize, y: usize },
    /// Annn
    LoadIndex { addr: u16 },
    /// Bnnn
    JumpOffset { addr: u16 },
    /// Cxkk
    Random { x: usize, kk: u8 },
    /// Dxyn
    Draw { x: usize, y: usize, n: u8 },
    /// Ex9E
    SkipKeyPressed { x: usize },
    /// ExA1
    SkipKeyNotPressed { x: usize },
    /// Fx07
    LoadDelayTimer { x: usize },
    /// Fx0A
    WaitForKey { x: usize },
    /// Fx15
    SetDelayTimer { x: usize },
    /// Fx18
    SetSoundTimer { x: usize },
    /// Fx1E
    AddIndex { x: usize },
    /// Fx29
    LoadSprite { x: usize },
    /// Fx33
    Bcd { x: usize },
    /// Fx55
    RegisterDump { x: usize },
    /// Fx65
    RegisterLoad { x: usize },
    /// Anything else; skipped over
    Unknown(Opcode),
}

/// Selects the Instruction for a given Opcode.
///
/// The group nibble picks one of 16 families. Groups 0, E and F are then cased on the low byte and
/// group 8 on the low nibble. Anything that doesn't match becomes `Instruction::Unknown`.
pub fn decode(op: Opcode) -> Instruction {
    use Instruction::*;

    let (x, y, kk, addr) = (op.x(), op.y(), op.kk(), op.addr());
    match op.group() {
        0x0 => match kk {
            0xE0 => Clear,
            0xEE => Return,
            _ => Unknown(op),
        },
        0x1 => Jump { addr },
        0x2 => Call { addr },
        0x3 => SkipEqual { x, kk },
        0x4 => SkipNotEqual { x, kk },
        // The low nibble of 5xy0 and 9xy0 is not checked
        0x5 => SkipRegistersEqual { x, y },
        0x6 => Load { x, kk },
        0x7 => Add { x, kk },
        0x8 => decode_arithmetic(op),
        0x9 => SkipRegistersNotEqual { x, y },
        0xA => LoadIndex { addr },
        0xB => JumpOffset { addr },
        0xC => Random { x, kk },
        0xD => Draw { x, y, n: op.n() },
        0xE => match kk {
            0x9E => SkipKeyPressed { x },
            0xA1 => SkipKeyNotPressed { x },
            _ => Unknown(op),
        },
        0xF => decode_misc(op),
        _ => Unknown(op),
    }
}

/// 8xyn
fn decode_arithmetic(op: Opcode) -> Instruction {
    use Instruction::*;

    let (x, y) = (op.x(), op.y());
    match op.n() {
        0x0 => Move { x, y },
        0x1 => Or { x, y },
        0x2 => And { x, y },
        0x3 => Xor { x, y },
        0x4 => AddRegisters { x, y },
        0x5 => SubtractXY { x, y },
        0x6 => ShiftRight { x },
        0x7 => SubtractYX { x, y },
        0xE => ShiftLeft { x },
        _ => Unknown(op),
    }
}

/// Fxkk
fn decode_misc(op: Opcode) -> Instruction {
    use Instruction::*;

    let x = op.x();
    match op.kk() {
        0x07 => LoadDelayTimer { x },
        0x0A => WaitForKey { x },
        0x15 => SetDelayTimer { x },
        0x18 => SetSoundTimer { x },
        0x1E => AddIndex { x },
        0x29 => LoadSprite { x },
        0x33 => Bcd { x },
        0x55 => RegisterDump { x },
        0x65 => RegisterLoad { x },
        _ => Unknown(op),
    }
}

impl Instruction {
    pub fn is_recognized(&self) -> bool {
        !matches!(self, Instruction::Unknown(_))
    }

    /// Runs the instruction against `state`, producing the next state.
    /// On error `state` is untouched and nothing is produced.
    pub fn execute(self, state: &State, rng: &mut dyn RngCore) -> Result<State, Chip8Error> {
        use Instruction::*;

        let next = match self {
            Clear => clr(state),
            Return => rts(state)?,
            Jump { addr } => jump(addr, state),
            Call { addr } => call(addr, state)?,
            SkipEqual { x, kk } => ske(x, kk, state),
            SkipNotEqual { x, kk } => skne(x, kk, state),
            SkipRegistersEqual { x, y } => skre(x, y, state),
            Load { x, kk } => load(x, kk, state),
            Add { x, kk } => add(x, kk, state),
            Move { x, y } => mv(x, y, state),
            Or { x, y } => or(x, y, state),
            And { x, y } => and(x, y, state),
            Xor { x, y } => xor(x, y, state),
            AddRegisters { x, y } => addr(x, y, state),
            SubtractXY { x, y } => sub(x, y, state),
            ShiftRight { x } => shr(x, state),
            SubtractYX { x, y } => subn(x, y, state),
            ShiftLeft { x } => shl(x, state),
            SkipRegistersNotEqual { x, y } => skrne(x, y, state),
            LoadIndex { addr } => loadi(addr, state),
            JumpOffset { addr } => jumpi(addr, state),
            Random { x, kk } => random(x, kk, state, rng),
            Draw { x, y, n } => draw(x, y, n, state)?,
            SkipKeyPressed { x } => skpr(x, state),
            SkipKeyNotPressed { x } => skup(x, state),
            LoadDelayTimer { x } => moved(x, state),
            WaitForKey { x } => keyd(x, state),
            SetDelayTimer { x } => loads(x, state),
            SetSoundTimer { x } => ld(x, state),
            AddIndex { x } => addi(x, state),
            LoadSprite { x } => ldspr(x, state),
            Bcd { x } => bcd(x, state)?,
            RegisterDump { x } => stor(x, state)?,
            RegisterLoad { x } => read(x, state)?,
            Unknown(_) => skip(state),
        };
        Ok(next)
    }
}

#[cfg(test)]
mod test_instruction {
    use super::*;
    use Instruction::*;

    fn decoded(word: u16) -> Instruction {
        decode(Opcode(word))
    }

    #[test]
    fn test_decodes_clear_and_return() {
        assert_eq!(decoded(0x00E0), Clear);
        assert_eq!(decoded(0x00EE), Return);
    }

    #[test]
    fn test_decodes_addressed() {
        assert_eq!(decoded(0x1ABC), Jump { addr: 0xABC });
        assert_eq!(decoded(0x2123), Call { addr: 0x123 });
        assert_eq!(decoded(0xAABC), LoadIndex { addr: 0xABC });
        assert_eq!(decoded(0xB010), JumpOffset { addr: 0x010 });
    }

    #[test]
    fn test_decodes_immediates() {
        assert_eq!(decoded(0x3A05), SkipEqual { x: 0xA, kk: 0x05 });
        assert_eq!(decoded(0x4111), SkipNotEqual { x: 0x1, kk: 0x11 });
        assert_eq!(decoded(0x6122), Load { x: 0x1, kk: 0x22 });
        assert_eq!(decoded(0x7FFF), Add { x: 0xF, kk: 0xFF });
        assert_eq!(decoded(0xC30F), Random { x: 0x3, kk: 0x0F });
    }

    #[test]
    fn test_decodes_arithmetic_group() {
        assert_eq!(decoded(0x8120), Move { x: 1, y: 2 });
        assert_eq!(decoded(0x8121), Or { x: 1, y: 2 });
        assert_eq!(decoded(0x8122), And { x: 1, y: 2 });
        assert_eq!(decoded(0x8123), Xor { x: 1, y: 2 });
        assert_eq!(decoded(0x8124), AddRegisters { x: 1, y: 2 });
        assert_eq!(decoded(0x8125), SubtractXY { x: 1, y: 2 });
        assert_eq!(decoded(0x8126), ShiftRight { x: 1 });
        assert_eq!(decoded(0x8127), SubtractYX { x: 1, y: 2 });
        assert_eq!(decoded(0x812E), ShiftLeft { x: 1 });
    }

    #[test]
    fn test_decodes_draw_and_keys() {
        assert_eq!(decoded(0xD125), Draw { x: 1, y: 2, n: 5 });
        assert_eq!(decoded(0xE19E), SkipKeyPressed { x: 1 });
        assert_eq!(decoded(0xE1A1), SkipKeyNotPressed { x: 1 });
    }

    #[test]
    fn test_decodes_misc_group() {
        assert_eq!(decoded(0xF107), LoadDelayTimer { x: 1 });
        assert_eq!(decoded(0xF10A), WaitForKey { x: 1 });
        assert_eq!(decoded(0xF115), SetDelayTimer { x: 1 });
        assert_eq!(decoded(0xF118), SetSoundTimer { x: 1 });
        assert_eq!(decoded(0xF11E), AddIndex { x: 1 });
        assert_eq!(decoded(0xF129), LoadSprite { x: 1 });
        assert_eq!(decoded(0xF133), Bcd { x: 1 });
        assert_eq!(decoded(0xF355), RegisterDump { x: 3 });
        assert_eq!(decoded(0xF365), RegisterLoad { x: 3 });
    }

    #[test]
    fn test_unknown_sub_selectors() {
        for word in [0x0000, 0x00E1, 0x0123, 0x8128, 0x812F, 0xE19F, 0xF1FF, 0xF100] {
            assert_eq!(decoded(word), Unknown(Opcode(word)), "{:#06X}", word);
            assert!(!decoded(word).is_recognized());
        }
    }

    #[test]
    fn test_skip_registers_ignores_low_nibble() {
        assert_eq!(decoded(0x512F), SkipRegistersEqual { x: 1, y: 2 });
        assert_eq!(decoded(0x912F), SkipRegistersNotEqual { x: 1, y: 2 });
    }
}
