use std::fs::File;
use std::io::{BufReader, Write};
use std::path::PathBuf;
use std::time::{Duration, Instant};

use anyhow::{anyhow, Context};
use log::{debug, info};
use sdl2::event::Event;
use sdl2::keyboard::Keycode;

use chip8_core::Chip8;
use display::Display;

use crate::keymap::keymap;

/// The ASCII bell; rung when the sound timer runs out
fn beep() {
    print!("\x07");
    if let Err(e) = std::io::stdout().flush() {
        debug!("failed to ring the bell: {}", e);
    }
}

pub fn run(rom: PathBuf, cycle_nanos: u64, scale: u32) -> anyhow::Result<()> {
    let mut chip8: Chip8 = Chip8::new();

    // Get SDL2 context
    let sdl: sdl2::Sdl = sdl2::init().map_err(|e| anyhow!(e))?;
    let mut display: Display = Display::new(&sdl, scale).map_err(|e| anyhow!(e))?;
    let mut events = sdl.event_pump().map_err(|e| anyhow!(e))?;

    // Load ROM
    let file = File::open(&rom).with_context(|| format!("unable to open {}", rom.display()))?;
    let mut reader = BufReader::new(file);
    let size = chip8.load_rom(&mut reader)?;
    info!("loaded {} byte ROM from {}", size, rom.display());

    // Start from a blank screen
    display
        .render(chip8.frame_buffer())
        .map_err(|e| anyhow!(e))?;

    // Set initial timing
    let cycle_time: Duration = Duration::from_nanos(cycle_nanos);
    let mut last_cycle: Instant = Instant::now();

    // Whether or not the clock speed should be respected
    let mut fast_forward: bool = false;

    'event: loop {
        // If the draw flag is set, render the current frame and unset it
        if let Some(frame) = chip8.get_frame() {
            display.render(frame).map_err(|e| anyhow!(e))?;
            chip8.frame_drawn();
        }

        // Handle input
        for event in events.poll_iter() {
            match event {
                Event::Quit { .. } => break 'event,
                Event::KeyDown {
                    keycode: Some(key), ..
                } => match (key, keymap(key)) {
                    (_, Some(kc)) => chip8.key_press(kc),
                    (Keycode::Space, _) => fast_forward = true,
                    (Keycode::Escape, _) => break 'event,
                    _ => continue,
                },
                Event::KeyUp {
                    keycode: Some(key), ..
                } => match (key, keymap(key)) {
                    (_, Some(kc)) => chip8.key_release(kc),
                    (Keycode::Space, _) => fast_forward = false,
                    _ => continue,
                },
                _ => continue,
            };
        }

        // Update state
        let step = chip8.step()?;
        if step.sound_stopped {
            beep();
        }

        // Handle timing
        let current_time = Instant::now();
        let elapsed_cycle_time = current_time - last_cycle;
        if !fast_forward && cycle_time > elapsed_cycle_time {
            std::thread::sleep(cycle_time - elapsed_cycle_time);
        }
        last_cycle = Instant::now();
    }
    Ok(())
}
