//! Download and tag the chord practice tracks.

use std::path::Path;

use anyhow::{Context, Result};
use url::Url;

use crate::chords::{fetch, tag};
use crate::util;

/// Fetch every track into `dest`, then (re)write the ID3 tags of all
/// mp3 files found there. Returns the number of files tagged.
pub fn fetch_tracks(dest: &Path) -> Result<usize> {
    let base = Url::parse(fetch::INDEX_URL).context("bad index URL")?;
    util::fs::ensure_dir(dest)?;

    fetch::fetch_all(&base, dest)?;

    let tagger = tag::Tagger::locate();
    tag::update_tags(dest, &tagger)
}
