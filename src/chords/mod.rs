//! Chord practice-track naming.
//!
//! The reference site names each track `<root><suffix>.mp3`, for
//! example `Bbmin7.mp3` or `Fsharp7b9b13.mp3`. This module parses
//! those names, orders them for track numbering, and produces the
//! display names written into the ID3 tags.

pub mod fetch;
pub mod tag;

use std::cmp::Ordering;

use thiserror::Error;

const MP3_SUFFIX: &str = ".mp3";

/// A file name that does not follow the chord naming convention.
/// Raised before any file is touched or any external command runs.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ChordError {
    #[error("bad chord file name: {0}")]
    BadFileName(String),
    #[error("unknown chord root in file name: {0}")]
    UnknownRoot(String),
    #[error("unknown chord suffix in file name: {0}")]
    UnknownSuffix(String),
}

/// Chord root, ordered by walking the circle of fourths up from C.
/// The discriminants are the literal weight table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Root {
    C = 0,
    F = 1,
    Bb = 2,
    Eb = 3,
    Ab = 4,
    Db = 5,
    Fsharp = 6,
    B = 7,
    E = 8,
    A = 9,
    D = 10,
    G = 11,
}

impl Root {
    pub fn weight(self) -> u8 {
        self as u8
    }

    /// The spelling used in file names.
    pub fn token(self) -> &'static str {
        match self {
            Root::C => "C",
            Root::F => "F",
            Root::Bb => "Bb",
            Root::Eb => "Eb",
            Root::Ab => "Ab",
            Root::Db => "Db",
            Root::Fsharp => "Fsharp",
            Root::B => "B",
            Root::E => "E",
            Root::A => "A",
            Root::D => "D",
            Root::G => "G",
        }
    }

    /// The spelling used in tags. The proper unicode sharp (U+266F)
    /// would be nicer, but iTunes doesn't grok it.
    pub fn display(self) -> &'static str {
        match self {
            Root::Fsharp => "F#",
            other => other.token(),
        }
    }

    fn from_token(token: &str) -> Option<Self> {
        Some(match token {
            "C" => Root::C,
            "F" => Root::F,
            "Bb" => Root::Bb,
            "Eb" => Root::Eb,
            "Ab" => Root::Ab,
            "Db" => Root::Db,
            "Fsharp" => Root::Fsharp,
            "B" => Root::B,
            "E" => Root::E,
            "A" => Root::A,
            "D" => Root::D,
            "G" => Root::G,
            _ => return None,
        })
    }
}

/// Chord quality suffix. The discriminants are the literal weight
/// table; suffix order trumps root order when sorting tracks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Suffix {
    Maj7 = 0,
    Min7 = 1,
    Dom7 = 2,
    Min7b5 = 3,
    Dom7b9b13 = 4,
    Dom7b913 = 5,
}

impl Suffix {
    pub fn weight(self) -> u8 {
        self as u8
    }

    /// The spelling used in file names.
    pub fn token(self) -> &'static str {
        match self {
            Suffix::Maj7 => "Maj7",
            Suffix::Min7 => "min7",
            Suffix::Dom7 => "7",
            Suffix::Min7b5 => "min7b5",
            Suffix::Dom7b9b13 => "7b9b13",
            Suffix::Dom7b913 => "7b913",
        }
    }

    /// The spelling used in tags.
    pub fn display(self) -> &'static str {
        match self {
            Suffix::Maj7 => "Maj7",
            Suffix::Min7 => "-7",
            Suffix::Dom7 => "7",
            Suffix::Min7b5 => "-7(b5)",
            Suffix::Dom7b9b13 => "7(b9,b13)",
            Suffix::Dom7b913 => "7(b9,13)",
        }
    }

    fn from_token(token: &str) -> Option<Self> {
        Some(match token {
            "Maj7" => Suffix::Maj7,
            "min7" => Suffix::Min7,
            "7" => Suffix::Dom7,
            "min7b5" => Suffix::Min7b5,
            "7b9b13" => Suffix::Dom7b9b13,
            "7b913" => Suffix::Dom7b913,
            _ => return None,
        })
    }
}

/// A chord track, parsed from its file name.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChordFile {
    pub root: Root,
    pub suffix: Suffix,
}

impl ChordFile {
    /// Parse a file name like `Bbmin7.mp3`.
    pub fn parse(file_name: &str) -> Result<Self, ChordError> {
        let stem = file_name
            .strip_suffix(MP3_SUFFIX)
            .ok_or_else(|| ChordError::BadFileName(file_name.to_string()))?;

        // The root is one character, two when flattened, or the
        // six-character `Fsharp`.
        let bytes = stem.as_bytes();
        let root_len = if bytes.len() >= 2 && bytes[1] == b'b' {
            2
        } else if stem.get(1..).is_some_and(|rest| rest.starts_with("sharp")) {
            6
        } else {
            1
        };
        if bytes.len() < root_len || !stem.is_char_boundary(root_len) {
            return Err(ChordError::UnknownRoot(file_name.to_string()));
        }
        let (root_token, suffix_token) = stem.split_at(root_len);

        let root = Root::from_token(root_token)
            .ok_or_else(|| ChordError::UnknownRoot(file_name.to_string()))?;
        let suffix = Suffix::from_token(suffix_token)
            .ok_or_else(|| ChordError::UnknownSuffix(file_name.to_string()))?;
        Ok(ChordFile { root, suffix })
    }

    /// The file name this chord was (or would be) stored under.
    pub fn file_name(&self) -> String {
        format!("{}{}{}", self.root.token(), self.suffix.token(), MP3_SUFFIX)
    }

    /// The chord name written into the song tag.
    pub fn display_name(&self) -> String {
        format!("{}{}", self.root.display(), self.suffix.display())
    }
}

impl Ord for ChordFile {
    fn cmp(&self, other: &Self) -> Ordering {
        (self.suffix, self.root).cmp(&(other.suffix, other.root))
    }
}

impl PartialOrd for ChordFile {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}
