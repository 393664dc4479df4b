//! Per-notebook context selections.
//!
//! Every source and note shown on a notebook page carries a [`ContextMode`]
//! that decides how much of it goes into the chat context. Modes are
//! assigned by [`ContextSelections::reconcile_sources`] and
//! [`ContextSelections::reconcile_notes`] the first time an item is seen,
//! and are sticky from then on:
//!
//! - a new source defaults to [`ContextMode::Insights`] when it has at least
//!   one insight, otherwise [`ContextMode::Full`];
//! - a new note always defaults to [`ContextMode::Full`];
//! - a recorded mode (default or user choice) is never overwritten by a
//!   later refresh, even if the item's insight count changes.
//!
//! Selections for items that disappear from the notebook are kept. The map is
//! bounded by how many items a notebook has ever shown during the session.

use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};
use std::fmt;

use crate::models::{Note, Source};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ContextMode {
    Off,
    Insights,
    Full,
}

impl ContextMode {
    pub fn default_for_source(source: &Source) -> Self {
        if source.insights_count > 0 {
            ContextMode::Insights
        } else {
            ContextMode::Full
        }
    }

    pub fn default_for_note(_note: &Note) -> Self {
        ContextMode::Full
    }

    /// Status string understood by the backend's `context_config`.
    pub fn as_status(&self) -> &'static str {
        match self {
            ContextMode::Off => "not in context",
            ContextMode::Insights => "insights",
            ContextMode::Full => "full content",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "off" | "not in context" => Some(ContextMode::Off),
            "insights" => Some(ContextMode::Insights),
            "full" | "full content" => Some(ContextMode::Full),
            _ => None,
        }
    }
}

impl fmt::Display for ContextMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            ContextMode::Off => "off",
            ContextMode::Insights => "insights",
            ContextMode::Full => "full",
        };
        f.pad(s)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ContextSelections {
    sources: HashMap<String, ContextMode>,
    notes: HashMap<String, ContextMode>,
}

impl ContextSelections {
    pub fn new() -> Self {
        Self::default()
    }

    /// Assign defaults to sources seen for the first time.
    ///
    /// Returns how many sources received a default.
    pub fn reconcile_sources(&mut self, sources: &[Source]) -> usize {
        let mut assigned = 0;
        for source in sources {
            if !self.sources.contains_key(&source.id) {
                self.sources
                    .insert(source.id.clone(), ContextMode::default_for_source(source));
                assigned += 1;
            }
        }
        assigned
    }

    /// Assign defaults to notes seen for the first time.
    pub fn reconcile_notes(&mut self, notes: &[Note]) -> usize {
        let mut assigned = 0;
        for note in notes {
            if !self.notes.contains_key(&note.id) {
                self.notes
                    .insert(note.id.clone(), ContextMode::default_for_note(note));
                assigned += 1;
            }
        }
        assigned
    }

    pub fn set_source_mode(&mut self, source_id: &str, mode: ContextMode) {
        self.sources.insert(source_id.to_string(), mode);
    }

    /// Notes have no insights; only `Off` and `Full` are accepted.
    ///
    /// Returns `false` (and records nothing) for `Insights`.
    pub fn set_note_mode(&mut self, note_id: &str, mode: ContextMode) -> bool {
        if mode == ContextMode::Insights {
            return false;
        }
        self.notes.insert(note_id.to_string(), mode);
        true
    }

    pub fn source_mode(&self, source_id: &str) -> Option<ContextMode> {
        self.sources.get(source_id).copied()
    }

    pub fn note_mode(&self, note_id: &str) -> Option<ContextMode> {
        self.notes.get(note_id).copied()
    }

    pub fn tracked_sources(&self) -> usize {
        self.sources.len()
    }

    pub fn tracked_notes(&self) -> usize {
        self.notes.len()
    }

    /// Serialize into the backend's `context_config` object.
    ///
    /// Only `sources` and `notes` (the items currently listed) are emitted;
    /// modes recorded for items that have since disappeared stay in memory
    /// but are never sent. Keys are emitted in sorted order.
    pub fn context_config(&self, sources: &[Source], notes: &[Note]) -> serde_json::Value {
        let sources: BTreeMap<&str, &str> = sources
            .iter()
            .filter_map(|s| {
                let mode = self.sources.get(&s.id)?;
                Some((s.id.as_str(), mode.as_status()))
            })
            .collect();
        let notes: BTreeMap<&str, &str> = notes
            .iter()
            .filter_map(|n| {
                let mode = self.notes.get(&n.id)?;
                Some((n.id.as_str(), mode.as_status()))
            })
            .collect();
        serde_json::json!({ "sources": sources, "notes": notes })
    }
}
