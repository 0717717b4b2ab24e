//! Persisted range records.
//!
//! Field names and 1-indexed line numbers are shared with the external
//! rewriting tool, so the serde attributes here are part of a stable format.

use serde::{Deserialize, Serialize};
use std::path::Path;

/// Shape of a range: a span of lines or a single-line marker.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RangeKind {
    Block,
    Event,
}

/// A named line span anchored in one source file.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Range {
    pub id: String,
    pub name: String,
    pub file_path: String,
    #[serde(rename = "type")]
    pub kind: RangeKind,
    /// 1-indexed.
    pub start_line: u32,
    /// 1-indexed, only present for block ranges.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub end_line: Option<u32>,
    #[serde(rename = "isEnabled", default = "default_enabled")]
    pub enabled: bool,
}

fn default_enabled() -> bool {
    true
}

impl Range {
    /// Last line covered by the range (the start line for events).
    pub fn last_line(&self) -> u32 {
        self.end_line.unwrap_or(self.start_line)
    }

    /// Whether this range annotates `path`.
    ///
    /// Both sides are lexically normalized so `a/./b.py` and `a/b.py` match.
    pub fn belongs_to(&self, path: &Path) -> bool {
        path_clean::clean(&self.file_path) == path_clean::clean(path)
    }

    /// Restore `startLine >= 1` and `endLine >= startLine`.
    pub fn clamp(&mut self) {
        self.start_line = self.start_line.max(1);
        if let Some(end) = self.end_line {
            self.end_line = Some(end.max(self.start_line));
        }
    }
}

/// Input for creating a range; the store assigns the id.
#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewRange {
    pub name: String,
    pub file_path: String,
    pub start_line: u32,
    #[serde(default)]
    pub end_line: Option<u32>,
    #[serde(rename = "type", default)]
    pub kind: Option<RangeKind>,
    #[serde(rename = "isEnabled", default = "default_enabled")]
    pub enabled: bool,
}

impl NewRange {
    /// A block range over `start_line..=end_line`.
    pub fn block(
        name: impl Into<String>,
        file_path: impl Into<String>,
        start_line: u32,
        end_line: u32,
    ) -> Self {
        Self {
            name: name.into(),
            file_path: file_path.into(),
            start_line,
            end_line: Some(end_line),
            kind: Some(RangeKind::Block),
            enabled: true,
        }
    }

    /// An event marker on `line`.
    pub fn event(name: impl Into<String>, file_path: impl Into<String>, line: u32) -> Self {
        Self {
            name: name.into(),
            file_path: file_path.into(),
            start_line: line,
            end_line: None,
            kind: Some(RangeKind::Event),
            enabled: true,
        }
    }

    /// The kind to store: explicit, or inferred from the presence of `endLine`.
    pub fn resolved_kind(&self) -> RangeKind {
        self.kind.unwrap_or(if self.end_line.is_some() {
            RangeKind::Block
        } else {
            RangeKind::Event
        })
    }

    pub(crate) fn into_range(self, id: String) -> Range {
        let kind = self.resolved_kind();
        Range {
            id,
            name: self.name,
            file_path: self.file_path,
            kind,
            start_line: self.start_line,
            end_line: match kind {
                RangeKind::Block => self.end_line,
                RangeKind::Event => None,
            },
            enabled: self.enabled,
        }
    }
}

/// Partial update applied by `RangeStore::update`. Absent fields are kept.
#[derive(Clone, Debug, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RangeUpdate {
    pub name: Option<String>,
    pub start_line: Option<u32>,
    pub end_line: Option<u32>,
    #[serde(rename = "isEnabled")]
    pub enabled: Option<bool>,
}

impl RangeUpdate {
    pub fn rename(name: impl Into<String>) -> Self {
        Self {
            name: Some(name.into()),
            ..Default::default()
        }
    }

    pub(crate) fn apply_to(self, range: &mut Range) {
        if let Some(name) = self.name {
            range.name = name;
        }
        if let Some(start) = self.start_line {
            range.start_line = start;
        }
        if let Some(end) = self.end_line
            && range.kind == RangeKind::Block
        {
            range.end_line = Some(end);
        }
        if let Some(enabled) = self.enabled {
            range.enabled = enabled;
        }
    }
}
