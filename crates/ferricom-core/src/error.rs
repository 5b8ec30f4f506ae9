use thiserror::Error;

use crate::cartridge::header::NES_HEADER_LEN;

#[derive(Debug, Error)]
pub enum Error {
    /// Provided buffer is shorter than the 16-byte header.
    #[error("header expected {NES_HEADER_LEN} bytes, got {actual}")]
    TooShort { actual: usize },

    /// Magic number ("NES<EOF>") is missing.
    #[error("missing NES magic bytes")]
    InvalidMagic,

    /// A ROM section (trainer/PRG/CHR) is shorter than advertised.
    #[error("{section} section expected {expected} bytes, got {actual}")]
    SectionTooShort {
        section: &'static str,
        expected: usize,
        actual: usize,
    },

    /// The header names a mapper outside the supported set (0-4).
    #[error("unsupported mapper {mapper}")]
    UnsupportedMapper { mapper: u8 },

    /// Wrapper for I/O errors raised while reading ROMs from disk.
    #[error("i/o error while reading cartridge: {0}")]
    Io(#[from] std::io::Error),
}
