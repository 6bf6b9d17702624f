//! Write ID3 tags on downloaded chord tracks via the external
//! `id3tag` tool.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use thiserror::Error;

use crate::chords::ChordFile;
use crate::util::process::{find_executable, ProcessBuilder};

pub const ARTIST: &str = "Paul Del Nero";
pub const ALBUM: &str = "Playing the Changes";

/// Where `id3tag` usually lives when it is not on PATH.
const DEFAULT_TAGGER: &str = "/usr/local/bin/id3tag";

#[derive(Debug, Error)]
pub enum TagError {
    #[error("`{command}` exited with status {code}")]
    CommandFailed { command: String, code: i32 },
}

/// Runs the external tagger.
#[derive(Debug, Clone)]
pub struct Tagger {
    program: PathBuf,
}

impl Tagger {
    /// Find `id3tag` on PATH, falling back to the conventional install
    /// location.
    pub fn locate() -> Self {
        let program =
            find_executable("id3tag").unwrap_or_else(|| PathBuf::from(DEFAULT_TAGGER));
        Tagger { program }
    }

    pub fn with_program(program: impl Into<PathBuf>) -> Self {
        Tagger {
            program: program.into(),
        }
    }

    /// Tag one track with its chord name and position in the album.
    pub fn tag(&self, path: &Path, chord: &ChordFile, track: usize, total: usize) -> Result<()> {
        let cmd = ProcessBuilder::new(&self.program)
            .arg(format!("--artist={ARTIST}"))
            .arg(format!("--album={ALBUM}"))
            .arg(format!("--song={}", chord.display_name()))
            .arg(format!("--track={track}"))
            .arg(format!("--total={total}"))
            .arg(path);
        tracing::debug!("running {}", cmd.display_command());
        let status = cmd.status()?;
        if !status.success() {
            return Err(TagError::CommandFailed {
                command: cmd.display_command(),
                code: status.code().unwrap_or(-1),
            }
            .into());
        }
        Ok(())
    }
}

/// Tag every `.mp3` in `dir` in chord order.
///
/// All file names are parsed up front; a single malformed name aborts
/// the run before any tagger command executes, so a half-tagged album
/// is never left behind.
pub fn update_tags(dir: &Path, tagger: &Tagger) -> Result<usize> {
    let mut chords = Vec::new();
    for entry in std::fs::read_dir(dir)
        .with_context(|| format!("failed to read directory {}", dir.display()))?
    {
        let entry = entry?;
        let name = entry.file_name();
        let name = name.to_string_lossy();
        if !name.ends_with(".mp3") {
            continue;
        }
        let chord = ChordFile::parse(&name)
            .with_context(|| format!("unrecognized track name {name}"))?;
        chords.push(chord);
    }
    chords.sort();

    let total = chords.len();
    for (i, chord) in chords.iter().enumerate() {
        let path = dir.join(chord.file_name());
        tagger.tag(&path, chord, i + 1, total)?;
        tracing::info!("{}: tagged as \"{}\" ({}/{})", chord.file_name(), chord.display_name(), i + 1, total);
    }
    tracing::info!("Updated {total} mp3(s)");
    Ok(total)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn malformed_name_aborts_before_tagging() {
        let tmp = TempDir::new().unwrap();
        std::fs::write(tmp.path().join("CMaj7.mp3"), b"").unwrap();
        std::fs::write(tmp.path().join("CMajor7.mp3"), b"").unwrap();

        // `false` would fail loudly if it were ever invoked; the parse
        // error must win first.
        let tagger = Tagger::with_program("false");
        let err = update_tags(tmp.path(), &tagger).unwrap_err();
        assert!(err.to_string().contains("CMajor7.mp3"));
    }

    #[test]
    fn tags_in_chord_order_with_track_numbers() {
        let tmp = TempDir::new().unwrap();
        for name in ["G7.mp3", "CMaj7.mp3", "Bbmin7.mp3", "notes.txt"] {
            std::fs::write(tmp.path().join(name), b"").unwrap();
        }

        // `true` accepts any arguments, so tagging "succeeds".
        let tagger = Tagger::with_program("true");
        let total = update_tags(tmp.path(), &tagger).unwrap();
        assert_eq!(total, 3);
    }

    #[test]
    fn failed_command_surfaces_exit_code() {
        let tmp = TempDir::new().unwrap();
        std::fs::write(tmp.path().join("CMaj7.mp3"), b"").unwrap();

        let tagger = Tagger::with_program("false");
        let err = update_tags(tmp.path(), &tagger).unwrap_err();
        let err = err.downcast::<TagError>().unwrap();
        assert!(matches!(err, TagError::CommandFailed { code: 1, .. }));
    }
}
