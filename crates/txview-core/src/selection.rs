//! Selection state for the detail overlay

use serde::{Deserialize, Serialize};

use crate::pipeline::MonthSection;

/// What closed the detail overlay
///
/// All triggers lead to the same transition; the trigger is only logged.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum CloseTrigger {
    /// Close button
    #[default]
    Explicit,
    /// Keyboard cancel
    Escape,
    /// Click outside the overlay
    Backdrop,
}

impl std::str::FromStr for CloseTrigger {
    type Err = String;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "explicit" | "close" => Ok(CloseTrigger::Explicit),
            "escape" | "esc" => Ok(CloseTrigger::Escape),
            "backdrop" | "outside" => Ok(CloseTrigger::Backdrop),
            _ => Err(format!("Invalid close trigger: {}", s)),
        }
    }
}

impl std::fmt::Display for CloseTrigger {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CloseTrigger::Explicit => write!(f, "explicit"),
            CloseTrigger::Escape => write!(f, "escape"),
            CloseTrigger::Backdrop => write!(f, "backdrop"),
        }
    }
}

/// At most one transaction open in the detail overlay
///
/// Only the id is held; the record itself is always resolved against the
/// current sections so the overlay never shows a stale copy.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Selection {
    current: Option<String>,
}

impl Selection {
    pub fn new() -> Self {
        Self::default()
    }

    /// Open a transaction, replacing any previous selection
    pub fn select(&mut self, id: impl Into<String>) {
        let id = id.into();
        if let Some(previous) = self.current.as_deref() {
            if previous != id {
                log::debug!("Selection replaced: {} -> {}", previous, id);
            }
        }
        self.current = Some(id);
    }

    /// Close the overlay; no-op when nothing is selected
    pub fn clear(&mut self, trigger: CloseTrigger) {
        if let Some(id) = self.current.take() {
            log::debug!("Selection {} cleared ({})", id, trigger);
        }
    }

    pub fn current(&self) -> Option<&str> {
        self.current.as_deref()
    }

    pub fn is_open(&self) -> bool {
        self.current.is_some()
    }

    /// Drop the selection if its transaction is no longer rendered.
    /// Returns true when the selection was cleared.
    pub fn retain_visible(&mut self, sections: &[MonthSection]) -> bool {
        let Some(id) = self.current.as_deref() else {
            return false;
        };
        let visible = sections
            .iter()
            .any(|section| section.rows.iter().any(|tx| tx.id == id));
        if !visible {
            log::debug!("Selection {} no longer has a backing record", id);
            self.current = None;
        }
        !visible
    }
}
