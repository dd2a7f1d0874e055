pub use chip8::{Chip8, Step};
pub use constants::CLOCK_SPEED;
pub use error::Chip8Error;
pub use instruction::{decode, Instruction};
pub use opcode::Opcode;

mod chip8;
pub mod constants;
mod error;
mod instruction;
mod opcode;
mod operations;
pub mod state;
