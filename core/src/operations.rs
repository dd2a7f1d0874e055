use std::ops::Range;

use log::debug;
use rand::RngCore;

use crate::constants::{DISPLAY_HEIGHT, DISPLAY_WIDTH, MEMORY_SIZE, SPRITE_HEIGHT, STACK_DEPTH};
use crate::error::Chip8Error;
use crate::state::State;

/// Every instruction that doesn't jump moves on to the next one
const NEXT: u16 = 0x2;
/// Skipping passes over the next instruction
const SKIP: u16 = 0x4;

/// Checks that `len` bytes starting at I are addressable and returns them as a range.
fn memory_at_i(state: &State, len: usize) -> Result<Range<usize>, Chip8Error> {
    let start = state.i as usize;
    let end = start + len;
    if end > MEMORY_SIZE {
        return Err(Chip8Error::MemoryOutOfBounds {
            opcode: state.opcode,
            pc: state.pc,
            address: end - 1,
        });
    }
    Ok(start..end)
}

fn skip_if(condition: bool, state: &State) -> State {
    let pc = if condition {
        state.pc + SKIP
    } else {
        state.pc + NEXT
    };
    State { pc, ..*state }
}

/// clear
pub fn clr(state: &State) -> State {
    State {
        pc: state.pc + NEXT,
        frame_buffer: [0; DISPLAY_WIDTH * DISPLAY_HEIGHT],
        draw_flag: true,
        ..*state
    }
}

/// PC = STACK.pop()
pub fn rts(state: &State) -> Result<State, Chip8Error> {
    if state.sp == 0 {
        return Err(Chip8Error::StackUnderflow {
            opcode: state.opcode,
            pc: state.pc,
        });
    }
    let sp = state.sp - 0x1;
    Ok(State {
        pc: state.stack[sp as usize] + NEXT,
        sp,
        ..*state
    })
}

/// PC = addr
pub fn jump(addr: u16, state: &State) -> State {
    State { pc: addr, ..*state }
}

/// STACK.push(PC); PC = addr
pub fn call(addr: u16, state: &State) -> Result<State, Chip8Error> {
    if state.sp as usize >= STACK_DEPTH {
        return Err(Chip8Error::StackOverflow {
            opcode: state.opcode,
            pc: state.pc,
        });
    }
    let mut stack = state.stack;
    stack[state.sp as usize] = state.pc;
    Ok(State {
        pc: addr,
        sp: state.sp + 0x1,
        stack,
        ..*state
    })
}

/// if Vx == kk then skip
pub fn ske(x: usize, kk: u8, state: &State) -> State {
    skip_if(state.v[x] == kk, state)
}

/// if Vx != kk then skip
pub fn skne(x: usize, kk: u8, state: &State) -> State {
    skip_if(state.v[x] != kk, state)
}

/// if Vx == Vy then skip
pub fn skre(x: usize, y: usize, state: &State) -> State {
    skip_if(state.v[x] == state.v[y], state)
}

/// if Vx != Vy then skip
pub fn skrne(x: usize, y: usize, state: &State) -> State {
    skip_if(state.v[x] != state.v[y], state)
}

/// Vx = kk
pub fn load(x: usize, kk: u8, state: &State) -> State {
    let mut v = state.v;
    v[x] = kk;
    State {
        pc: state.pc + NEXT,
        v,
        ..*state
    }
}

/// Vx += kk
/// Overflow wraps and VF is left alone
pub fn add(x: usize, kk: u8, state: &State) -> State {
    let mut v = state.v;
    v[x] = v[x].wrapping_add(kk);
    State {
        pc: state.pc + NEXT,
        v,
        ..*state
    }
}

/// Applies `f(Vx, Vy)` to the registers, storing the result in Vx
fn alu(x: usize, y: usize, state: &State, f: impl Fn(u8, u8) -> u8) -> State {
    let mut v = state.v;
    v[x] = f(v[x], v[y]);
    State {
        pc: state.pc + NEXT,
        v,
        ..*state
    }
}

/// Writes `flag(Vx, Vy)` to VF, then stores `f(Vx, Vy)` in Vx.
/// The result reads the registers after VF is written, so an operand in VF sees the flag.
fn alu_flagged(
    x: usize,
    y: usize,
    state: &State,
    flag: impl Fn(u8, u8) -> bool,
    f: impl Fn(u8, u8) -> u8,
) -> State {
    let mut v = state.v;
    v[0xF] = flag(v[x], v[y]) as u8;
    v[x] = f(v[x], v[y]);
    State {
        pc: state.pc + NEXT,
        v,
        ..*state
    }
}

/// Vx = Vy
pub fn mv(x: usize, y: usize, state: &State) -> State {
    alu(x, y, state, |_, vy| vy)
}

/// Vx |= Vy
pub fn or(x: usize, y: usize, state: &State) -> State {
    alu(x, y, state, |vx, vy| vx | vy)
}

/// Vx &= Vy
pub fn and(x: usize, y: usize, state: &State) -> State {
    alu(x, y, state, |vx, vy| vx & vy)
}

/// Vx ^= Vy
pub fn xor(x: usize, y: usize, state: &State) -> State {
    alu(x, y, state, |vx, vy| vx ^ vy)
}

/// Vx += Vy; VF = carry
/// The sum is taken before VF is written
pub fn addr(x: usize, y: usize, state: &State) -> State {
    let (sum, carry) = state.v[x].overflowing_add(state.v[y]);
    let mut v = state.v;
    v[0xF] = carry as u8;
    v[x] = sum;
    State {
        pc: state.pc + NEXT,
        v,
        ..*state
    }
}

/// VF = Vx > Vy; Vx -= Vy
pub fn sub(x: usize, y: usize, state: &State) -> State {
    alu_flagged(x, y, state, |vx, vy| vx > vy, |vx, vy| vx.wrapping_sub(vy))
}

/// VF = the bit shifted out; Vx >>= 1
pub fn shr(x: usize, state: &State) -> State {
    alu_flagged(x, x, state, |vx, _| vx & 0x1 == 0x1, |vx, _| vx >> 1)
}

/// VF = Vy > Vx; Vx = Vy - Vx
pub fn subn(x: usize, y: usize, state: &State) -> State {
    alu_flagged(x, y, state, |vx, vy| vy > vx, |vx, vy| vy.wrapping_sub(vx))
}

/// VF = the bit shifted out; Vx <<= 1
pub fn shl(x: usize, state: &State) -> State {
    alu_flagged(x, x, state, |vx, _| (vx >> 7) & 0x1 == 0x1, |vx, _| vx << 1)
}

/// I = addr
pub fn loadi(addr: u16, state: &State) -> State {
    State {
        pc: state.pc + NEXT,
        i: addr,
        ..*state
    }
}

/// PC = V0 + addr
pub fn jumpi(addr: u16, state: &State) -> State {
    State {
        pc: addr + u16::from(state.v[0x0]),
        ..*state
    }
}

/// Vx = rand_byte & kk
pub fn random(x: usize, kk: u8, state: &State, rng: &mut dyn RngCore) -> State {
    let rand_byte = rng.next_u32() as u8;
    let mut v = state.v;
    v[x] = rand_byte & kk;
    State {
        pc: state.pc + NEXT,
        v,
        ..*state
    }
}

/// draw_sprite(x=Vx y=Vy size=n)
/// XORs the sprite in memory I..I+n onto the FrameBuffer at (Vx, Vy).
/// Pixels past the right or bottom edge are clipped rather than wrapped.
/// Sets VF if any pixel is erased.
pub fn draw(x: usize, y: usize, n: u8, state: &State) -> Result<State, Chip8Error> {
    let sprite = &state.memory[memory_at_i(state, n as usize)?];
    let (left, top) = (state.v[x] as usize, state.v[y] as usize);

    let mut v = state.v;
    let mut frame_buffer = state.frame_buffer;
    let mut clipped = false;

    // Reset the flag (used for collision detection)
    v[0xF] = 0x0;

    for (row, byte) in sprite.iter().enumerate() {
        let py = top + row;
        for bit in 0..8 {
            let px = left + bit;
            if px >= DISPLAY_WIDTH || py >= DISPLAY_HEIGHT {
                clipped = true;
                continue;
            }
            let pixel = (byte >> (7 - bit)) & 0x1;
            let cell = &mut frame_buffer[py * DISPLAY_WIDTH + px];
            if pixel == 0x1 && *cell != 0x0 {
                v[0xF] = 0x1;
            }
            *cell = if (*cell != 0x0) ^ (pixel == 0x1) { 0x1 } else { 0x0 };
        }
    }
    if clipped {
        debug!(
            "{} at pc {:#06X} clipped a sprite at ({}, {})",
            state.opcode, state.pc, left, top
        );
    }

    Ok(State {
        pc: state.pc + NEXT,
        draw_flag: true,
        v,
        frame_buffer,
        ..*state
    })
}

/// Keys beyond F can never be pressed
fn is_pressed(state: &State, key: u8) -> bool {
    state.keypad.get(key as usize).copied().unwrap_or(false)
}

/// if Vx.pressed then skip
pub fn skpr(x: usize, state: &State) -> State {
    skip_if(is_pressed(state, state.v[x]), state)
}

/// if !Vx.pressed then skip
pub fn skup(x: usize, state: &State) -> State {
    skip_if(!is_pressed(state, state.v[x]), state)
}

/// Vx = DT
pub fn moved(x: usize, state: &State) -> State {
    let mut v = state.v;
    v[x] = state.delay_timer;
    State {
        pc: state.pc + NEXT,
        v,
        ..*state
    }
}

/// await keypress for Vx
/// Leaves the PC in place until a key is down, so the instruction runs again on the next cycle.
/// When several keys are down the highest wins.
pub fn keyd(x: usize, state: &State) -> State {
    match state.keypad.iter().rposition(|&pressed| pressed) {
        Some(key) => {
            let mut v = state.v;
            v[x] = key as u8;
            State {
                pc: state.pc + NEXT,
                v,
                ..*state
            }
        }
        None => *state,
    }
}

/// DT = Vx
pub fn loads(x: usize, state: &State) -> State {
    State {
        pc: state.pc + NEXT,
        delay_timer: state.v[x],
        ..*state
    }
}

/// ST = Vx
pub fn ld(x: usize, state: &State) -> State {
    State {
        pc: state.pc + NEXT,
        sound_timer: state.v[x],
        ..*state
    }
}

/// I += Vx; VF = I > 0xFFF
/// I itself is not truncated to the address space
pub fn addi(x: usize, state: &State) -> State {
    let i = state.i.wrapping_add(u16::from(state.v[x]));
    let mut v = state.v;
    v[0xF] = (i > 0x0FFF) as u8;
    State {
        pc: state.pc + NEXT,
        i,
        v,
        ..*state
    }
}

/// I = Vx * 5
/// Set I to the memory address of the glyph for Vx
/// See constants::SPRITE_SHEET for more details
pub fn ldspr(x: usize, state: &State) -> State {
    State {
        pc: state.pc + NEXT,
        i: u16::from(state.v[x]) * SPRITE_HEIGHT,
        ..*state
    }
}

/// mem[I..I+3] = bcd(Vx)
/// Store BCD repr of Vx in memory starting at address I
pub fn bcd(x: usize, state: &State) -> Result<State, Chip8Error> {
    let value = state.v[x];
    let bcd = [value / 100, value / 10 % 10, value % 10];
    let mut memory = state.memory;
    memory[memory_at_i(state, bcd.len())?].copy_from_slice(&bcd);
    Ok(State {
        pc: state.pc + NEXT,
        memory,
        ..*state
    })
}

/// mem[I..=I+x] = V0..=Vx; I += x + 1
pub fn stor(x: usize, state: &State) -> Result<State, Chip8Error> {
    let range = memory_at_i(state, x + 1)?;
    let mut memory = state.memory;
    memory[range].copy_from_slice(&state.v[..=x]);
    Ok(State {
        pc: state.pc + NEXT,
        i: state.i + x as u16 + 1,
        memory,
        ..*state
    })
}

/// V0..=Vx = mem[I..=I+x]; I += x + 1
pub fn read(x: usize, state: &State) -> Result<State, Chip8Error> {
    let range = memory_at_i(state, x + 1)?;
    let mut v = state.v;
    v[..=x].copy_from_slice(&state.memory[range]);
    Ok(State {
        pc: state.pc + NEXT,
        i: state.i + x as u16 + 1,
        v,
        ..*state
    })
}

/// Unrecognised opcodes are passed over
pub fn skip(state: &State) -> State {
    State {
        pc: state.pc + NEXT,
        ..*state
    }
}
