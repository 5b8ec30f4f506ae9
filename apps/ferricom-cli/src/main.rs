mod args;

use std::time::Instant;

use anyhow::{Context, Result};
use clap::Parser;
use ferricom_core::Nes;
use tracing::info;
use tracing_subscriber::EnvFilter;

use crate::args::Args;

fn main() -> Result<()> {
    let args = Args::parse();
    init_logging(args.verbose);

    let mut nes = Nes::from_file(&args.rom)
        .with_context(|| format!("loading ROM {}", args.rom.display()))?;
    info!(
        mapper = nes.cartridge().mapper().name(),
        battery = nes.cartridge().battery_backed(),
        "cartridge inserted"
    );

    let start = Instant::now();
    let mut audio_samples = 0usize;
    for _ in 0..args.frames {
        nes.step_frame();
        audio_samples += nes.take_audio_samples().len();
    }
    let elapsed = start.elapsed();

    println!(
        "ran {} frames in {:.3}s ({:.1} fps), {} cpu cycles, {} audio samples",
        nes.frame_number(),
        elapsed.as_secs_f64(),
        nes.frame_number() as f64 / elapsed.as_secs_f64().max(1e-9),
        nes.cpu_cycles(),
        audio_samples,
    );
    println!("framebuffer digest: {:016x}", framebuffer_digest(&nes));

    Ok(())
}

fn init_logging(verbosity: u8) {
    let default = match verbosity {
        0 => "info",
        1 => "debug",
        _ => "trace",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt().with_env_filter(filter).init();
}

/// FNV-1a over the final frame, handy for comparing headless runs.
fn framebuffer_digest(nes: &Nes) -> u64 {
    let mut hash = 0xcbf2_9ce4_8422_2325u64;
    for pixel in nes.framebuffer().iter() {
        for byte in pixel.to_le_bytes() {
            hash ^= u64::from(byte);
            hash = hash.wrapping_mul(0x0000_0100_0000_01B3);
        }
    }
    hash
}
