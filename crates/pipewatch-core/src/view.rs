//! Tab selection.

use serde::Serialize;

/// Tabs of the dashboard, in tab-bar order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum View {
    /// Processing and analyzer stats
    #[default]
    Stats,
    /// Most recent motion and temperature events
    Events,
    /// Consistency check status, counts and diffs
    Consistency,
}

impl View {
    /// Get the display name for this view
    #[must_use]
    pub const fn name(&self) -> &'static str {
        match self {
            Self::Stats => "Stats",
            Self::Events => "Events",
            Self::Consistency => "Consistency",
        }
    }

    /// Get all views in tab order
    #[must_use]
    pub const fn all() -> &'static [Self] {
        &[Self::Stats, Self::Events, Self::Consistency]
    }

    /// Get the index of this view in the tab order
    #[must_use]
    pub const fn index(&self) -> usize {
        match self {
            Self::Stats => 0,
            Self::Events => 1,
            Self::Consistency => 2,
        }
    }

    /// View at `index`, if any
    #[must_use]
    pub fn from_index(index: usize) -> Option<Self> {
        Self::all().get(index).copied()
    }

    /// Get the next view (wraps around)
    #[must_use]
    pub const fn next(&self) -> Self {
        match self {
            Self::Stats => Self::Events,
            Self::Events => Self::Consistency,
            Self::Consistency => Self::Stats,
        }
    }

    /// Get the previous view (wraps around)
    #[must_use]
    pub const fn prev(&self) -> Self {
        match self {
            Self::Stats => Self::Consistency,
            Self::Events => Self::Stats,
            Self::Consistency => Self::Events,
        }
    }
}

/// Exclusive tab selection. Exactly one view is active.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct ViewState {
    active: View,
}

impl ViewState {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub const fn active(&self) -> View {
        self.active
    }

    #[must_use]
    pub fn is_active(&self, view: View) -> bool {
        self.active == view
    }

    /// Activate `view`, deactivating every other
    pub fn select(&mut self, view: View) {
        self.active = view;
    }

    pub fn select_next(&mut self) {
        self.active = self.active.next();
    }

    pub fn select_prev(&mut self) {
        self.active = self.active.prev();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn view_navigation_wraps() {
        assert_eq!(View::Stats.next(), View::Events);
        assert_eq!(View::Consistency.next(), View::Stats);
        assert_eq!(View::Stats.prev(), View::Consistency);
        assert_eq!(View::Events.prev(), View::Stats);
    }

    #[test]
    fn index_matches_tab_order() {
        for (idx, view) in View::all().iter().enumerate() {
            assert_eq!(view.index(), idx);
            assert_eq!(View::from_index(idx), Some(*view));
        }
        assert_eq!(View::from_index(3), None);
    }

    #[test]
    fn initial_state_is_default_view() {
        let state = ViewState::new();
        assert_eq!(state.active(), View::Stats);
    }

    #[test]
    fn select_is_exclusive() {
        let mut state = ViewState::new();
        state.select(View::Consistency);
        let active: Vec<_> = View::all()
            .iter()
            .filter(|v| state.is_active(**v))
            .collect();
        assert_eq!(active, vec![&View::Consistency]);

        state.select_next();
        assert_eq!(state.active(), View::Stats);
        state.select_prev();
        assert_eq!(state.active(), View::Consistency);
    }
}
