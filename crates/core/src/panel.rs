//! Per-tab panel state.
//!
//! Tracks, for each tab, whether the summary panel is enabled and whether a
//! capture session is currently running. The viewport capturer is shared by
//! every tab of a window, so overlapping sessions on one tab are refused
//! instead of racing for it.

use std::collections::HashMap;

use crate::error::Error;

/// Identifier of a browser tab.
pub type TabId = String;

/// State record for one tab.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PanelState {
    pub enabled: bool,
    pub in_flight: bool,
}

/// Explicit owner of all per-tab panel states.
#[derive(Debug, Default)]
pub struct PanelStates {
    tabs: HashMap<TabId, PanelState>,
}

impl PanelStates {
    pub fn new() -> Self {
        Self::default()
    }

    /// Current state of a tab; unknown tabs are disabled and idle.
    pub fn get(&self, tab: &str) -> PanelState {
        self.tabs.get(tab).copied().unwrap_or_default()
    }

    pub fn is_enabled(&self, tab: &str) -> bool {
        self.get(tab).enabled
    }

    /// A tab finished loading: the panel becomes available on it.
    pub fn on_tab_updated(&mut self, tab: &str) {
        self.tabs.entry(tab.to_string()).or_default().enabled = true;
    }

    /// Toggle the panel for a tab, returning the new enabled flag.
    pub fn toggle(&mut self, tab: &str) -> bool {
        let state = self.tabs.entry(tab.to_string()).or_default();
        state.enabled = !state.enabled;
        tracing::debug!(tab, enabled = state.enabled, "panel toggled");
        state.enabled
    }

    /// Mark a capture session as started on `tab`.
    ///
    /// # Errors
    ///
    /// Returns `Error::SessionInFlight` if a session is already running.
    pub fn begin_session(&mut self, tab: &str) -> Result<(), Error> {
        let state = self.tabs.entry(tab.to_string()).or_default();
        if state.in_flight {
            return Err(Error::SessionInFlight(tab.to_string()));
        }
        state.in_flight = true;
        Ok(())
    }

    /// Mark the capture session on `tab` as finished.
    pub fn end_session(&mut self, tab: &str) {
        if let Some(state) = self.tabs.get_mut(tab) {
            state.in_flight = false;
        }
    }

    /// Forget a closed tab.
    pub fn remove(&mut self, tab: &str) {
        self.tabs.remove(tab);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unknown_tab_is_disabled() {
        let states = PanelStates::new();
        assert_eq!(states.get("1"), PanelState::default());
        assert!(!states.is_enabled("1"));
    }

    #[test]
    fn test_toggle_flips_enabled() {
        let mut states = PanelStates::new();
        states.on_tab_updated("1");
        assert!(states.is_enabled("1"));
        assert!(!states.toggle("1"));
        assert!(states.toggle("1"));
    }

    #[test]
    fn test_tabs_are_independent() {
        let mut states = PanelStates::new();
        states.toggle("1");
        assert!(states.is_enabled("1"));
        assert!(!states.is_enabled("2"));
    }

    #[test]
    fn test_overlapping_session_rejected() {
        let mut states = PanelStates::new();
        states.begin_session("1").unwrap();
        assert!(matches!(states.begin_session("1"), Err(Error::SessionInFlight(_))));
        assert!(states.begin_session("2").is_ok());

        states.end_session("1");
        assert!(states.begin_session("1").is_ok());
    }

    #[test]
    fn test_remove_forgets_tab() {
        let mut states = PanelStates::new();
        states.on_tab_updated("1");
        states.remove("1");
        assert!(!states.is_enabled("1"));
    }
}
