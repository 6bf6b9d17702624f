//! Download chord practice tracks from the reference site.

use std::fs::File;
use std::path::Path;

use anyhow::{bail, Context, Result};
use indicatif::{ProgressBar, ProgressStyle};
use regex::Regex;
use reqwest::blocking::Client;
use url::Url;

/// Index page listing the downloadable tracks.
pub const INDEX_URL: &str = "http://www.playingthechanges.com/";

/// Pull the relative `downloads/...mp3` links out of the index page,
/// in page order with duplicates removed.
pub fn scrape_track_links(html: &str) -> Vec<String> {
    let link = Regex::new(r#"downloads/[^\s"'<>]*\.mp3"#).unwrap();
    let mut seen = std::collections::HashSet::new();
    link.find_iter(html)
        .map(|m| m.as_str().to_string())
        .filter(|l| seen.insert(l.clone()))
        .collect()
}

/// Fetch the index page from `base` and download every linked track
/// into `dest`. Tracks already on disk are skipped.
pub fn fetch_all(base: &Url, dest: &Path) -> Result<Vec<String>> {
    let client = Client::new();

    tracing::debug!("fetching index {base}");
    let resp = client
        .get(base.as_str())
        .send()
        .with_context(|| format!("failed to fetch {base}"))?;
    if !resp.status().is_success() {
        bail!("failed to fetch {}: HTTP {}", base, resp.status());
    }
    let html = resp.text().context("failed to read index page")?;

    let links = scrape_track_links(&html);
    if links.is_empty() {
        bail!("no track links found at {base}");
    }

    let pb = ProgressBar::new(links.len() as u64);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("{spinner:.green} [{bar:40.cyan/blue}] {pos}/{len} {msg}")
            .unwrap()
            .progress_chars("#>-"),
    );

    let mut fetched = Vec::new();
    for link in &links {
        let url = base
            .join(link)
            .with_context(|| format!("bad track link {link}"))?;
        let name = url
            .path_segments()
            .and_then(|mut s| s.next_back())
            .unwrap_or_default()
            .to_string();
        if name.is_empty() {
            bail!("track link {link} has no file name");
        }
        pb.set_message(name.clone());

        let target = dest.join(&name);
        if target.exists() {
            tracing::debug!("{name}: already downloaded");
            pb.inc(1);
            continue;
        }

        let mut resp = client
            .get(url.as_str())
            .send()
            .with_context(|| format!("failed to fetch {url}"))?;
        if !resp.status().is_success() {
            bail!("failed to fetch {}: HTTP {}", url, resp.status());
        }
        let mut file = File::create(&target)
            .with_context(|| format!("failed to create {}", target.display()))?;
        resp.copy_to(&mut file)
            .with_context(|| format!("failed to download {url}"))?;

        fetched.push(name);
        pb.inc(1);
    }
    pb.finish_with_message("done");

    tracing::info!("downloaded {} track(s), {} already present", fetched.len(), links.len() - fetched.len());
    Ok(fetched)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn scrapes_links_in_order_without_duplicates() {
        let html = r#"
            <a href="downloads/CMaj7.mp3">CMaj7</a>
            <a href="downloads/Bbmin7.mp3">Bbmin7</a>
            <a href="downloads/CMaj7.mp3">again</a>
            <a href="other/readme.txt">not a track</a>
        "#;
        assert_eq!(
            scrape_track_links(html),
            vec!["downloads/CMaj7.mp3", "downloads/Bbmin7.mp3"]
        );
    }

    #[test]
    fn scrape_ignores_pages_without_links() {
        assert!(scrape_track_links("<html><body>nothing</body></html>").is_empty());
    }
}
