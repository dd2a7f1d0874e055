use std::io::Read;

use log::{trace, warn};
use rand::rngs::StdRng;
use rand::SeedableRng;

use crate::constants::{KEY_COUNT, MAX_PROGRAM_SIZE};
use crate::error::Chip8Error;
use crate::instruction::{decode, Instruction};
use crate::opcode::Opcode;
use crate::state::{FrameBuffer, State};

/// What a single call to `Chip8::step` did.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct Step {
    /// Where the instruction was fetched from
    pub pc: u16,
    pub opcode: Opcode,
    pub instruction: Instruction,
    /// The timer tick at the end of the step took the sound timer from nonzero to zero
    pub sound_stopped: bool,
}

impl Step {
    pub fn is_recognized(&self) -> bool {
        self.instruction.is_recognized()
    }
}

/// # Chip-8
/// Chip-8 is a virtual machine and corresponding interpreted language.
///
/// Tracks:
///  - current `state`
///  - a random number generator for `Cxkk`
///
/// Supplies interfaces for:
/// - loading roms
/// - pressing and releasing keys
/// - advancing the CPU and its timers
/// - inspecting its frame buffer for rendering by some display
/// - inspecting its timers for playing sound
pub struct Chip8 {
    state: State,
    rng: StdRng,
}

impl Chip8 {
    pub fn new() -> Self {
        Chip8 {
            state: State::new(),
            rng: StdRng::from_entropy(),
        }
    }

    /// A Chip-8 whose random numbers are reproducible
    ///
    /// # Arguments
    /// * `seed` seeds the generator used by `Cxkk`
    pub fn with_seed(seed: u64) -> Self {
        Chip8 {
            state: State::new(),
            rng: StdRng::seed_from_u64(seed),
        }
    }

    /// Puts the machine back into its initial state; any loaded program is lost
    pub fn reset(&mut self) {
        self.state = State::new();
    }

    /// Load a program from raw bytes
    ///
    /// # Arguments
    /// * `program` at most `MAX_PROGRAM_SIZE` bytes of instructions
    pub fn load(&mut self, program: &[u8]) -> Result<(), Chip8Error> {
        self.state.load(program)
    }

    /// Load a rom from a source file
    /// Reads at most `MAX_PROGRAM_SIZE` bytes; anything beyond that is left unread.
    /// Returns the number of bytes loaded.
    ///
    /// # Arguments
    /// * `reader` a file reader that contains a ROM
    pub fn load_rom(&mut self, reader: &mut dyn Read) -> Result<usize, Chip8Error> {
        let mut program = Vec::with_capacity(MAX_PROGRAM_SIZE);
        reader
            .take(MAX_PROGRAM_SIZE as u64)
            .read_to_end(&mut program)?;
        self.load(&program)?;
        Ok(program.len())
    }

    /// Returns the FrameBuffer if the display should be redrawn
    pub fn get_frame(&self) -> Option<&FrameBuffer> {
        if self.state.draw_flag {
            Some(&self.state.frame_buffer)
        } else {
            None
        }
    }

    /// Unsets the draw flag once the current frame has been rendered
    pub fn frame_drawn(&mut self) {
        self.state.draw_flag = false;
    }

    pub fn frame_buffer(&self) -> &FrameBuffer {
        &self.state.frame_buffer
    }

    pub fn state(&self) -> &State {
        &self.state
    }

    pub fn delay_timer(&self) -> u8 {
        self.state.delay_timer
    }

    pub fn sound_timer(&self) -> u8 {
        self.state.sound_timer
    }

    /// Set the pressed status of key
    ///
    /// # Arguments
    /// * `key` the 8-bit representation of the key that was pressed
    pub fn key_press(&mut self, key: u8) {
        self.set_key(key, true);
    }

    /// Unset the pressed status of key
    ///
    /// # Arguments
    /// * `key` the 8-bit representation of the key that was released
    pub fn key_release(&mut self, key: u8) {
        self.set_key(key, false);
    }

    fn set_key(&mut self, key: u8, pressed: bool) {
        match self.state.keypad.get_mut(key as usize) {
            Some(status) => *status = pressed,
            None => warn!("ignoring key {:#04X}; only 0x0..{:#X} exist", key, KEY_COUNT),
        }
    }

    /// Advances the machine by a single cycle
    /// - gets and executes the next opcode
    /// - decrements the timers
    ///
    /// Waiting on a keypress (`Fx0A`) still completes the cycle; the PC just doesn't move.
    /// If the instruction fails the state is left as it was before the call.
    pub fn step(&mut self) -> Result<Step, Chip8Error> {
        let pc = self.state.pc;
        let opcode = self.state.fetch()?;
        let instruction = decode(opcode);
        trace!(
            "{} v{:02X?} i{:04X} pc{:04X}",
            opcode,
            self.state.v,
            self.state.i,
            pc
        );
        if !instruction.is_recognized() {
            warn!("unknown opcode {} at pc {:#06X}", opcode, pc);
        }

        let current = State {
            opcode,
            ..self.state
        };
        let mut next = instruction.execute(&current, &mut self.rng)?;

        let sound_was_on = next.sound_timer > 0;
        next.tick_timers();
        self.state = next;

        Ok(Step {
            pc,
            opcode,
            instruction,
            sound_stopped: sound_was_on && self.state.sound_timer == 0,
        })
    }
}

impl Default for Chip8 {
    fn default() -> Self {
        Self::new()
    }
}
