//! Range store: wholesale persistence of a workspace's range set.
//!
//! The backing file is a pretty-printed JSON array read and written in one
//! piece. Other processes may rewrite it at any time, so the cached copy is
//! dropped whenever the file's modification time differs from what this
//! store last saw.

use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::time::SystemTime;

use log::{debug, warn};
use ulid::Ulid;

use crate::error::{RangeError, RangeResult};
use crate::range::{NewRange, Range, RangeUpdate};

/// Default location of the range set, relative to the workspace root.
pub const DEFAULT_RANGES_FILE: &str = ".vscode/nvtx_ranges.json";

#[derive(Debug)]
struct Snapshot {
    ranges: Vec<Range>,
    modified: Option<SystemTime>,
}

/// Owner of one persisted range set.
#[derive(Debug)]
pub struct RangeStore {
    path: PathBuf,
    cache: Option<Snapshot>,
}

impl RangeStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            cache: None,
        }
    }

    /// Store at `ranges_file` inside `root`; absolute paths are used as-is.
    pub fn for_workspace(root: &Path, ranges_file: impl AsRef<Path>) -> Self {
        Self::new(path_clean::clean(root.join(ranges_file)))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Forget the cached copy so the next access reads the file.
    pub fn invalidate(&mut self) {
        self.cache = None;
    }

    /// Read the range set from disk, bypassing the cache.
    ///
    /// A missing or blank file is an empty set.
    pub fn read_all(&self) -> RangeResult<Vec<Range>> {
        let content = match fs::read_to_string(&self.path) {
            Ok(content) => content,
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(err) => return Err(RangeError::storage_read(&self.path, err)),
        };
        if content.trim().is_empty() {
            return Ok(Vec::new());
        }
        serde_json::from_str(&content).map_err(|err| RangeError::storage_read(&self.path, err))
    }

    /// Replace the file with `ranges`, creating parent directories.
    ///
    /// The write goes through a sibling temporary file so readers never see
    /// a partial document.
    pub fn write_all(&mut self, ranges: &[Range]) -> RangeResult<()> {
        let dir = self
            .path
            .parent()
            .filter(|parent| !parent.as_os_str().is_empty())
            .unwrap_or_else(|| Path::new("."));
        fs::create_dir_all(dir).map_err(|err| RangeError::storage_write(&self.path, err))?;

        let json = to_pretty_json(ranges).map_err(|err| RangeError::storage_write(&self.path, err))?;
        let mut tmp = tempfile::NamedTempFile::new_in(dir)
            .map_err(|err| RangeError::storage_write(&self.path, err))?;
        tmp.write_all(json.as_bytes())
            .map_err(|err| RangeError::storage_write(&self.path, err))?;
        tmp.persist(&self.path)
            .map_err(|err| RangeError::storage_write(&self.path, err.error))?;

        debug!(
            target: "nvtx_ranges::store",
            "Wrote {} ranges to {}",
            ranges.len(),
            self.path.display()
        );
        self.cache = Some(Snapshot {
            ranges: ranges.to_vec(),
            modified: self.modified(),
        });
        Ok(())
    }

    /// Current range set, served from cache while the file is untouched.
    pub fn load(&mut self) -> RangeResult<Vec<Range>> {
        let modified = self.modified();
        if let Some(snapshot) = &self.cache
            && snapshot.modified == modified
        {
            return Ok(snapshot.ranges.clone());
        }

        let ranges = self.read_all()?;
        self.cache = Some(Snapshot {
            ranges: ranges.clone(),
            modified,
        });
        Ok(ranges)
    }

    /// Like [`load`](Self::load), but an unreadable file counts as empty.
    pub fn load_or_empty(&mut self) -> Vec<Range> {
        self.load().unwrap_or_else(|err| {
            warn!(target: "nvtx_ranges::store", "{}", err);
            Vec::new()
        })
    }

    /// Ranges annotating `file_path`.
    pub fn ranges_for_file(&mut self, file_path: &Path) -> RangeResult<Vec<Range>> {
        Ok(self
            .load()?
            .into_iter()
            .filter(|range| range.belongs_to(file_path))
            .collect())
    }

    /// Append a new range with a fresh id.
    pub fn create(&mut self, input: NewRange) -> RangeResult<Range> {
        let mut ranges = self.load()?;
        let mut id = Ulid::new().to_string();
        while ranges.iter().any(|range| range.id == id) {
            id = Ulid::new().to_string();
        }
        let range = input.into_range(id);
        ranges.push(range.clone());
        self.write_all(&ranges)?;
        Ok(range)
    }

    /// Remove a range. Returns `false` when the id is unknown.
    pub fn delete(&mut self, id: &str) -> RangeResult<bool> {
        let mut ranges = self.load()?;
        let before = ranges.len();
        ranges.retain(|range| range.id != id);
        if ranges.len() == before {
            return Ok(false);
        }
        self.write_all(&ranges)?;
        Ok(true)
    }

    /// Apply a partial update. Returns `false` when the id is unknown.
    pub fn update(&mut self, id: &str, update: RangeUpdate) -> RangeResult<bool> {
        self.modify(id, |range| {
            update.apply_to(range);
            range.clamp();
        })
    }

    /// Flip the enabled flag. Returns `false` when the id is unknown.
    pub fn toggle_enabled(&mut self, id: &str) -> RangeResult<bool> {
        self.modify(id, |range| range.enabled = !range.enabled)
    }

    fn modify(&mut self, id: &str, change: impl FnOnce(&mut Range)) -> RangeResult<bool> {
        let mut ranges = self.load()?;
        let Some(range) = ranges.iter_mut().find(|range| range.id == id) else {
            return Ok(false);
        };
        change(range);
        self.write_all(&ranges)?;
        Ok(true)
    }

    fn modified(&self) -> Option<SystemTime> {
        fs::metadata(&self.path)
            .and_then(|meta| meta.modified())
            .ok()
    }
}

fn to_pretty_json(ranges: &[Range]) -> serde_json::Result<String> {
    let mut json = serde_json::to_string_pretty(ranges)?;
    json.push('\n');
    Ok(json)
}
