//! Panel visibility on the notebook page.
//!
//! Each panel has its own boolean. The grid span is never stored: it is
//! recomputed from the open set on every call, so it cannot drift from the
//! toggles.

use std::collections::BTreeMap;
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Panel {
    Sources,
    Notes,
    Prompts,
    Chat,
}

impl Panel {
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "sources" => Some(Panel::Sources),
            "notes" => Some(Panel::Notes),
            "prompts" => Some(Panel::Prompts),
            "chat" => Some(Panel::Chat),
            _ => None,
        }
    }
}

impl fmt::Display for Panel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Panel::Sources => "sources",
            Panel::Notes => "notes",
            Panel::Prompts => "prompts",
            Panel::Chat => "chat",
        };
        f.pad(s)
    }
}

/// Which panels a page offers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Layout {
    /// Sources and notes.
    Standard,
    /// Sources, notes, prompts and chat.
    Extended,
}

impl Layout {
    pub fn panels(&self) -> &'static [Panel] {
        match self {
            Layout::Standard => &[Panel::Sources, Panel::Notes],
            Layout::Extended => &[Panel::Sources, Panel::Notes, Panel::Prompts, Panel::Chat],
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PanelState {
    layout: Layout,
    open: BTreeMap<Panel, bool>,
}

impl PanelState {
    /// All panels of `layout` start open.
    pub fn new(layout: Layout) -> Self {
        let open = layout.panels().iter().map(|p| (*p, true)).collect();
        Self { layout, open }
    }

    pub fn layout(&self) -> Layout {
        self.layout
    }

    /// Flip one panel. Panels outside the layout are ignored.
    ///
    /// Returns the new state of the panel, or `None` when ignored.
    pub fn toggle(&mut self, panel: Panel) -> Option<bool> {
        let slot = self.open.get_mut(&panel)?;
        *slot = !*slot;
        Some(*slot)
    }

    pub fn set(&mut self, panel: Panel, open: bool) -> bool {
        match self.open.get_mut(&panel) {
            Some(slot) => {
                *slot = open;
                true
            }
            None => false,
        }
    }

    pub fn is_open(&self, panel: Panel) -> bool {
        self.open.get(&panel).copied().unwrap_or(false)
    }

    pub fn open_panels(&self) -> Vec<Panel> {
        self.open
            .iter()
            .filter(|(_, open)| **open)
            .map(|(p, _)| *p)
            .collect()
    }

    /// Grid columns for the current open set.
    pub fn grid_span(&self) -> usize {
        grid_span(&self.open_panels())
    }
}

/// Columns needed for `open` panels: one per panel, and one for the empty
/// state when nothing is open.
pub fn grid_span(open: &[Panel]) -> usize {
    open.len().max(1)
}
