use log::debug;

use crate::constants::{
    DISPLAY_HEIGHT, DISPLAY_WIDTH, KEY_COUNT, MAX_PROGRAM_SIZE, MEMORY_SIZE, PROGRAM_START,
    SPRITE_SHEET, STACK_DEPTH,
};
use crate::error::Chip8Error;
use crate::opcode::Opcode;

/// The FrameBuffer is stored row-major and indexed as `y * DISPLAY_WIDTH + x`.
/// A cell is off when 0 and on otherwise.
pub type FrameBuffer = [u8; DISPLAY_WIDTH * DISPLAY_HEIGHT];

/// A snapshot of the Chip8 internal state
///
/// ## CPU
/// Registers
/// - (v) 16 primary 8-bit registers (V0..VF)
///     - the first 15 (V0..VE) are general purpose registers
///     - the 16th (VF) doubles as the carry/borrow/collision flag
/// - (i) a 16-bit index register, used as a memory address
/// - (opcode) the instruction word fetched by the current cycle
///
/// Counter
/// - (pc) a 16-bit program counter, starting at 0x200
///
/// Stack
/// - 16 return addresses
/// - (sp) the number of return addresses currently saved
///
/// Timers
/// - 2 8-bit timers (delay & sound), each decremented once per cycle while nonzero
///
/// ## Memory
/// - 4096 bytes of addressable memory
///     - 0x000..0x050 holds the sprite sheet
///     - 0x200.. holds the program
/// - 64x32 byte frame buffer
///
/// ## Input
/// - the pressed status of keys 0..F, written by the host between cycles
#[derive(Copy, Clone)]
pub struct State {
    pub opcode: Opcode,
    pub v: [u8; 16],
    pub i: u16,
    pub pc: u16,
    pub sp: u8,
    pub stack: [u16; STACK_DEPTH],
    pub delay_timer: u8,
    pub sound_timer: u8,
    pub memory: [u8; MEMORY_SIZE],
    pub frame_buffer: FrameBuffer,
    pub draw_flag: bool,
    pub keypad: [bool; KEY_COUNT],
}

impl State {
    pub fn new() -> Self {
        let mut memory = [0; MEMORY_SIZE];
        memory[..SPRITE_SHEET.len()].copy_from_slice(&SPRITE_SHEET);

        State {
            opcode: Opcode::default(),
            v: [0; 16],
            i: 0,
            pc: PROGRAM_START,
            sp: 0,
            stack: [0; STACK_DEPTH],
            delay_timer: 0,
            sound_timer: 0,
            memory,
            frame_buffer: [0; DISPLAY_WIDTH * DISPLAY_HEIGHT],
            draw_flag: false,
            keypad: [false; KEY_COUNT],
        }
    }

    /// Copies a program into memory starting at `PROGRAM_START`.
    ///
    /// # Arguments
    /// * `program` raw big-endian instruction words, at most `MAX_PROGRAM_SIZE` bytes
    pub fn load(&mut self, program: &[u8]) -> Result<(), Chip8Error> {
        if program.len() > MAX_PROGRAM_SIZE {
            return Err(Chip8Error::ProgramTooLarge {
                size: program.len(),
                max: MAX_PROGRAM_SIZE,
            });
        }
        let start = PROGRAM_START as usize;
        self.memory[start..start + program.len()].copy_from_slice(program);
        debug!("loaded {} byte program at {:#06X}", program.len(), start);
        Ok(())
    }

    /// Reads the instruction word at `pc` without advancing.
    pub fn fetch(&self) -> Result<Opcode, Chip8Error> {
        let pc = self.pc as usize;
        match (self.memory.get(pc), self.memory.get(pc + 1)) {
            (Some(&high), Some(&low)) => Ok(Opcode::from_bytes(high, low)),
            _ => Err(Chip8Error::FetchOutOfBounds { pc: self.pc }),
        }
    }

    /// Decrements both timers by one, never below zero.
    pub fn tick_timers(&mut self) {
        self.delay_timer = self.delay_timer.saturating_sub(1);
        self.sound_timer = self.sound_timer.saturating_sub(1);
    }
}

impl Default for State {
    fn default() -> Self {
        Self::new()
    }
}
