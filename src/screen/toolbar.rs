//! Toolbar intents
//!
//! The toolbar holds no state. Whether a button is enabled is derived from the
//! screen each time it is asked.

use std::fmt;

/// A toolbar button press
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ToolbarAction {
    Save,
    Add,
    AddMany,
    Refresh,
    AutoSizeColumns,
    SizeColumnsToFit,
}

impl ToolbarAction {
    /// Buttons in display order
    pub const ALL: [ToolbarAction; 6] = [
        ToolbarAction::Save,
        ToolbarAction::Add,
        ToolbarAction::AddMany,
        ToolbarAction::Refresh,
        ToolbarAction::AutoSizeColumns,
        ToolbarAction::SizeColumnsToFit,
    ];

    pub fn label(self) -> &'static str {
        match self {
            ToolbarAction::Save => "Save",
            ToolbarAction::Add => "Add",
            ToolbarAction::AddMany => "Add many",
            ToolbarAction::Refresh => "Refresh",
            ToolbarAction::AutoSizeColumns => "Auto-size",
            ToolbarAction::SizeColumnsToFit => "Fit",
        }
    }

    /// Whether the button accepts presses
    ///
    /// Only save is ever disabled, while a write is outstanding. The other
    /// intents are silent no-ops when their preconditions fail.
    pub fn is_enabled(self, write_in_flight: bool) -> bool {
        !(self == ToolbarAction::Save && write_in_flight)
    }
}

impl fmt::Display for ToolbarAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.label())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_only_save_disabled_while_writing() {
        for action in ToolbarAction::ALL {
            let expected = action != ToolbarAction::Save;
            assert_eq!(action.is_enabled(true), expected, "{action}");
            assert!(action.is_enabled(false));
        }
    }
}
