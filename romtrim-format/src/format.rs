//! The detection rule table: which file extensions carry which copier
//! header, and the evidence required before one is trimmed.

use std::fmt;
use std::path::Path;

pub mod signatures {
    /// "NES" + 0x1A, shared by `.nes` and `.fcn` images.
    pub const NES: &[u8] = &[0x4e, 0x45, 0x53, 0x1a];
    /// "FDS" + 0x1A.
    pub const FDS: &[u8] = &[0x46, 0x44, 0x53, 0x1a];
    pub const LYNX: &[u8] = b"LYNX";
    /// Expected at offset 1, not 0.
    pub const ATARI7800: &[u8] = b"ATARI7800";
}

/// File extensions with a known header rule, without the leading dot.
pub const ROM_EXTENSIONS: &[&str] = &["nes", "fds", "fcn", "a78", "lnx", "smc", "j64"];

#[derive(Clone, Copy, Eq, PartialEq)]
pub enum RomFormat {
    Nes,
    Fds,
    Lynx,
    Atari7800,
    Snes,
    Jaguar,
}

impl RomFormat {
    pub fn from_extension(ext: &str) -> Option<RomFormat> {
        use RomFormat::*;

        let format = match ext.to_ascii_lowercase().as_str() {
            "nes" | "fcn" => Nes,
            "fds" => Fds,
            "lnx" => Lynx,
            "a78" => Atari7800,
            "smc" => Snes,
            "j64" => Jaguar,
            _ => return None,
        };

        Some(format)
    }

    /// Bytes removed from the front of the stream when the rule matches.
    pub const fn header_len(self) -> u64 {
        use RomFormat::*;

        match self {
            Nes | Fds => 16,
            Lynx => 64,
            Atari7800 => 128,
            Snes => 512,
            Jaguar => 8192,
        }
    }

    /// Chunk granularity of a headerless image of this format.
    pub const fn modulus(self) -> u64 {
        use RomFormat::*;

        match self {
            Nes | Lynx | Atari7800 | Snes => 1024,
            Fds => 65500,
            Jaguar => 1048576,
        }
    }

    /// Expected `len % modulus` when a header is present. For Jaguar this is
    /// unrelated to the header length; that mismatch is part of the rule.
    pub const fn remainder(self) -> u64 {
        use RomFormat::*;

        match self {
            Nes | Fds => 16,
            Lynx => 64,
            Atari7800 => 128,
            Snes => 512,
            Jaguar => 0,
        }
    }

    /// Magic bytes expected at the given offset within the header, if any.
    /// SNES and Jaguar are detected on the size modulus alone.
    pub fn signature(self) -> Option<(usize, &'static [u8])> {
        use RomFormat::*;

        match self {
            Nes => Some((0, signatures::NES)),
            Fds => Some((0, signatures::FDS)),
            Lynx => Some((0, signatures::LYNX)),
            Atari7800 => Some((1, signatures::ATARI7800)),
            Snes | Jaguar => None,
        }
    }

    /// Whether a stream of `len` bytes beginning with `header` carries this
    /// format's copier header. `header` may be shorter than 16 bytes; a
    /// buffer too short to hold the signature never matches.
    pub fn matches(self, len: u64, header: &[u8]) -> bool {
        if len % self.modulus() != self.remainder() {
            return false;
        }

        // Never match a header the stream cannot contain (a zero-length
        // `.j64` stream passes the modulus test but has nothing to trim).
        if len < self.header_len() {
            return false;
        }

        match self.signature() {
            Some((offset, sig)) => header
                .get(offset..offset + sig.len())
                .map(|bytes| bytes == sig)
                .unwrap_or(false),
            None => true,
        }
    }
}

impl fmt::Display for RomFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        use RomFormat::*;

        let s = match self {
            Nes => "NES",
            Fds => "Famicom Disk System",
            Lynx => "Atari Lynx",
            Atari7800 => "Atari 7800",
            Snes => "Super Nintendo",
            Jaguar => "Atari Jaguar",
        };

        write!(f, "{}", s)
    }
}

impl fmt::Debug for RomFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(self, f)
    }
}

/// Select and evaluate the rule for `filename`, returning the format whose
/// header is present at the front of the stream.
pub fn detect(filename: &str, len: u64, header: &[u8]) -> Option<RomFormat> {
    let ext = Path::new(filename).extension()?.to_str()?;
    let format = RomFormat::from_extension(ext)?;

    if format.matches(len, header) {
        Some(format)
    } else {
        None
    }
}
