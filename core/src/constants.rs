/// Width of the display in pixels
pub const DISPLAY_WIDTH: usize = 64;

/// Height of the display in pixels
pub const DISPLAY_HEIGHT: usize = 32;

/// Bytes of addressable memory (0x000..=0xFFF)
pub const MEMORY_SIZE: usize = 4096;

/// Programs are loaded here; everything below it is reserved for the interpreter
pub const PROGRAM_START: u16 = 0x200;

/// The largest program that fits between `PROGRAM_START` and the end of memory
pub const MAX_PROGRAM_SIZE: usize = MEMORY_SIZE - PROGRAM_START as usize;

/// Maximum number of nested subroutine calls
pub const STACK_DEPTH: usize = 16;

/// Number of keys on the hexadecimal keypad
pub const KEY_COUNT: usize = 16;

/// Bytes per glyph in `SPRITE_SHEET`
pub const SPRITE_HEIGHT: u16 = 5;

/// Nanoseconds between CPU cycles when the host doesn't ask for another pace (~500Hz)
pub const CLOCK_SPEED: u64 = 2_000_000;

/// # Sprite sheet
/// Glyphs for the hex digits 0..F, installed at address 0x000.
///
/// Each glyph is 5 rows tall and each row is a byte whose high nibble holds the 4 visible pixels.
/// ```text
/// 0xF0  ####
/// 0x90  #  #
/// 0x90  #  #
/// 0x90  #  #
/// 0xF0  ####
/// ```
pub const SPRITE_SHEET: [u8; 80] = [
    0xF0, 0x90, 0x90, 0x90, 0xF0, // 0
    0x20, 0x60, 0x20, 0x20, 0x70, // 1
    0xF0, 0x10, 0xF0, 0x80, 0xF0, // 2
    0xF0, 0x10, 0xF0, 0x10, 0xF0, // 3
    0x90, 0x90, 0xF0, 0x10, 0x10, // 4
    0xF0, 0x80, 0xF0, 0x10, 0xF0, // 5
    0xF0, 0x80, 0xF0, 0x90, 0xF0, // 6
    0xF0, 0x10, 0x20, 0x40, 0x40, // 7
    0xF0, 0x90, 0xF0, 0x90, 0xF0, // 8
    0xF0, 0x90, 0xF0, 0x10, 0xF0, // 9
    0xF0, 0x90, 0xF0, 0x90, 0x90, // A
    0xE0, 0x90, 0xE0, 0x90, 0xE0, // B
    0xF0, 0x80, 0x80, 0x80, 0xF0, // C
    0xE0, 0x90, 0x90, 0x90, 0xE0, // D
    0xF0, 0x80, 0xF0, 0x80, 0xF0, // E
    0xF0, 0x80, 0xF0, 0x80, 0x80, // F
];
