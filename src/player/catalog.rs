// Track catalog, scanned once at startup from the media directory.

use std::fs;
use std::path::{Path, PathBuf};

use crate::shared::MAX_TRACKS;

#[derive(Clone, Debug)]
pub struct Track {
    pub name: String,
    pub size_bytes: u64,
}

#[derive(Clone, Debug, Default)]
pub struct Catalog {
    dir: PathBuf,
    tracks: Vec<Track>,
}

impl Catalog {
    /// Collect up to MAX_TRACKS `.WAV` entries from `dir`, sorted by name.
    /// Directory read order is not stable on hosted filesystems, so the
    /// sort keeps track numbering reproducible across runs.
    pub fn scan(dir: &Path) -> std::io::Result<Self> {
        let mut tracks = Vec::new();
        for entry in fs::read_dir(dir)? {
            let entry = entry?;
            let name = entry.file_name().to_string_lossy().into_owned();
            if !is_wav(&name) {
                continue;
            }
            let size_bytes = entry.metadata()?.len();
            tracks.push(Track { name, size_bytes });
        }
        tracks.sort_by(|a, b| a.name.cmp(&b.name));
        tracks.truncate(MAX_TRACKS);
        Ok(Self {
            dir: dir.to_path_buf(),
            tracks,
        })
    }

    pub fn len(&self) -> usize {
        self.tracks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tracks.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&Track> {
        self.tracks.get(index)
    }

    pub fn tracks(&self) -> &[Track] {
        &self.tracks
    }

    pub fn path_of(&self, index: usize) -> Option<PathBuf> {
        self.tracks.get(index).map(|t| self.dir.join(&t.name))
    }

    #[cfg(test)]
    pub fn push_for_test(&mut self, name: &str, size_bytes: u64) {
        self.tracks.push(Track {
            name: name.to_string(),
            size_bytes,
        });
    }

    /// Startup listing on the console.
    pub fn print_listing(&self) {
        for track in &self.tracks {
            println!("Name: {}, Size: {}", track.name, track.size_bytes);
        }
    }
}

/// The trailing ".WAV" match is case-sensitive, exactly as the filesystem
/// stores it; a bare ".WAV" with no stem does not count.
fn is_wav(name: &str) -> bool {
    name.len() > 4 && name.ends_with(".WAV")
}
