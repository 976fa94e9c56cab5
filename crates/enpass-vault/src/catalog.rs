//! Entry filtering and single-entry lookup.
//!
//! Works on the rows as the store returns them, so an item with several
//! fields shows up once per field. Order is never changed.

use crate::entries::Entry;
use crate::error::VaultError;

/// Selects entries by field type and title.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EntryFilter {
    /// Exact field type to keep. `None` or `""` keeps every type.
    pub entry_type: Option<String>,
    /// Keep entries whose title contains any of these, ignoring case.
    /// Empty keeps every title.
    pub titles: Vec<String>,
}

impl EntryFilter {
    /// Filter that keeps everything.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Restrict to one field type.
    #[must_use]
    pub fn with_type(mut self, entry_type: impl Into<String>) -> Self {
        self.entry_type = Some(entry_type.into());
        self
    }

    /// Add a title substring.
    #[must_use]
    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.titles.push(title.into());
        self
    }

    fn matches_type(&self, entry: &Entry) -> bool {
        match self.entry_type.as_deref() {
            None | Some("") => true,
            Some(wanted) => entry.entry_type == wanted,
        }
    }

    fn matches_title(&self, entry: &Entry) -> bool {
        if self.titles.is_empty() {
            return true;
        }
        let title = entry.title.to_lowercase();
        self.titles
            .iter()
            .any(|needle| title.contains(&needle.to_lowercase()))
    }

    /// Whether `entry` passes the type and title filters.
    #[must_use]
    pub fn matches(&self, entry: &Entry) -> bool {
        self.matches_type(entry) && self.matches_title(entry)
    }
}

/// Drop deleted entries, then apply `filter`. Store order is kept.
#[must_use]
pub fn list(entries: Vec<Entry>, filter: &EntryFilter) -> Vec<Entry> {
    let total = entries.len();
    let kept: Vec<Entry> = entries
        .into_iter()
        .filter(|e| !e.is_deleted())
        .filter(|e| filter.matches(e))
        .collect();
    tracing::debug!(total, kept = kept.len(), "filtered entries");
    kept
}

/// Pick one entry out of an already filtered list.
///
/// Trashed and deleted entries are skipped. With `unique`, a second
/// candidate is an error instead of being ignored.
///
/// # Errors
///
/// - [`VaultError::EntryNotFound`] if nothing is left
/// - [`VaultError::AmbiguousMatch`] if `unique` and more than one is left
pub fn find_one(entries: Vec<Entry>, unique: bool) -> Result<Entry, VaultError> {
    let mut candidates = entries
        .into_iter()
        .filter(|e| !e.is_trashed() && !e.is_deleted());

    let first = candidates.next().ok_or(VaultError::EntryNotFound)?;
    if unique && candidates.next().is_some() {
        return Err(VaultError::AmbiguousMatch);
    }
    Ok(first)
}
