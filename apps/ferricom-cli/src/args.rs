use std::path::PathBuf;

use clap::Parser;

/// Headless ferricom frontend: runs a ROM for a fixed number of frames and
/// reports a framebuffer digest.
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct Args {
    /// Path to the NES ROM file (iNES v1)
    #[arg(required = true)]
    pub rom: PathBuf,

    /// Number of frames to emulate before exiting
    #[arg(long, default_value_t = 60)]
    pub frames: u64,

    /// Increase log verbosity (-v: debug, -vv: trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,
}
