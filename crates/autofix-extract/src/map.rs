use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::ErrorRecord;

/// How two maps combine when both have an entry for the same path
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MergePolicy {
    /// The later map's entry replaces the earlier one
    #[default]
    Overwrite,
    /// Entries are appended, earlier map first
    Concatenate,
}

impl std::str::FromStr for MergePolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "overwrite" => Ok(MergePolicy::Overwrite),
            "concatenate" | "concat" => Ok(MergePolicy::Concatenate),
            _ => Err(format!("Unknown merge policy: {}", s)),
        }
    }
}

/// Errors grouped by file path. Paths keep first-seen order, records keep
/// parse order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FileErrorMap {
    entries: IndexMap<String, Vec<ErrorRecord>>,
}

impl FileErrorMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a record under its own file path
    pub fn push(&mut self, record: ErrorRecord) {
        self.entries
            .entry(record.file_path().to_string())
            .or_default()
            .push(record);
    }

    pub fn get(&self, path: &str) -> Option<&[ErrorRecord]> {
        self.entries.get(path).map(Vec::as_slice)
    }

    pub fn paths(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &[ErrorRecord])> {
        self.entries
            .iter()
            .map(|(path, records)| (path.as_str(), records.as_slice()))
    }

    /// Number of files with at least one error
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn total_errors(&self) -> usize {
        self.entries.values().map(Vec::len).sum()
    }

    /// Fold `later` into `self`.
    pub fn merge(&mut self, later: FileErrorMap, policy: MergePolicy) {
        for (path, records) in later.entries {
            match policy {
                MergePolicy::Overwrite => {
                    self.entries.insert(path, records);
                }
                MergePolicy::Concatenate => {
                    self.entries.entry(path).or_default().extend(records);
                }
            }
        }
    }

    /// Render as `File: <path>` headings followed by `  - <error>` lines
    pub fn render_report(&self) -> String {
        let mut lines = Vec::new();
        for (path, records) in &self.entries {
            lines.push(format!("File: {}", path));
            for record in records {
                lines.push(format!("  - {}", record.describe()));
            }
        }
        lines.join("\n")
    }
}

impl FromIterator<ErrorRecord> for FileErrorMap {
    fn from_iter<T: IntoIterator<Item = ErrorRecord>>(iter: T) -> Self {
        let mut map = FileErrorMap::new();
        for record in iter {
            map.push(record);
        }
        map
    }
}
