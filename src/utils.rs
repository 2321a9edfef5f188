// Copyright 2025 N. Dornseif
//
// Dual-licensed under Apache 2.0 and MIT terms.

//! Misc utility functions.

use std::time::{SystemTime, UNIX_EPOCH};
use std::{fs::File, io::BufWriter, io::Write, path::Path};

use rand::rngs::StdRng;
use rand::SeedableRng;

/// Build an RNG from OS entropy, falling back to a clock-derived seed
/// if the OS source cannot be read.
pub fn entropy_rng() -> StdRng {
    StdRng::try_from_os_rng().unwrap_or_else(|_| StdRng::seed_from_u64(clock_seed()))
}

/// Nanosecond wall-clock reading, usable as a last-resort seed.
pub fn clock_seed() -> u64 {
    match SystemTime::now().duration_since(UNIX_EPOCH) {
        Ok(elapsed) => elapsed.as_nanos() as u64,
        Err(e) => e.duration().as_nanos() as u64,
    }
}

/// Write a sequence to a text file, one value per line.
pub fn write_sequence(file_path: &str, values: &[f64]) -> std::io::Result<()> {
    let path = Path::new(file_path);
    let file = File::create(path)?;
    let mut writer = BufWriter::new(file);
    for value in values {
        writeln!(writer, "{value}")?;
    }
    Ok(())
}
