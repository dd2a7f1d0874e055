use thiserror::Error;

use crate::opcode::Opcode;

/// Everything that can stop the Chip-8 from advancing.
///
/// Aside from `ProgramTooLarge` and `Io` (raised while loading), these are contract violations by
/// the running program. A `step` that fails leaves the machine exactly as it was before the call.
#[derive(Debug, Error)]
pub enum Chip8Error {
    #[error("program is {size} bytes but at most {max} bytes fit in memory")]
    ProgramTooLarge { size: usize, max: usize },

    #[error("failed to read program: {0}")]
    Io(#[from] std::io::Error),

    #[error("pc {pc:#06X} points past the end of memory")]
    FetchOutOfBounds { pc: u16 },

    #[error("{opcode} at pc {pc:#06X} accessed memory out of bounds at {address:#06X}")]
    MemoryOutOfBounds {
        opcode: Opcode,
        pc: u16,
        address: usize,
    },

    #[error("{opcode} at pc {pc:#06X} overflowed the call stack")]
    StackOverflow { opcode: Opcode, pc: u16 },

    #[error("{opcode} at pc {pc:#06X} returned with an empty call stack")]
    StackUnderflow { opcode: Opcode, pc: u16 },
}
