use std::path::PathBuf;

use clap::Parser;

use chip8_core::CLOCK_SPEED;

mod keymap;
mod run;

/// Runs a Chip-8 ROM in an SDL2 window
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Args {
    /// Path to the ROM file to run
    rom: PathBuf,

    /// Nanoseconds between CPU cycles
    #[arg(short, long, default_value_t = CLOCK_SPEED)]
    cycle_nanos: u64,

    /// Size of each Chip-8 pixel on screen
    #[arg(short, long, default_value_t = 10)]
    scale: u32,
}

fn main() -> anyhow::Result<()> {
    env_logger::init();
    let args = Args::parse();
    run::run(args.rom, args.cycle_nanos, args.scale)
}
