//! Capture session guard.
//!
//! A tab runs at most one capture session at a time. The guard marks the
//! session in [`PanelStates`] when acquired and clears it when dropped, so
//! an early return or a failed capture cannot leave the tab stuck.

use std::sync::{Arc, Mutex, PoisonError};

use pagelens_core::{Error, PanelStates};

/// Shared per-tab panel states.
pub type SharedPanels = Arc<Mutex<PanelStates>>;

/// Running capture session on one tab.
pub struct SessionGuard {
    panels: SharedPanels,
    tab: String,
}

impl SessionGuard {
    /// Start a session on `tab`.
    ///
    /// # Errors
    ///
    /// Returns `Error::SessionInFlight` if the tab already runs one.
    pub fn acquire(panels: &SharedPanels, tab: &str) -> Result<Self, Error> {
        let mut states = panels.lock().unwrap_or_else(PoisonError::into_inner);
        states.begin_session(tab)?;
        states.on_tab_updated(tab);
        tracing::debug!(tab, "capture session acquired");
        Ok(Self { panels: Arc::clone(panels), tab: tab.to_string() })
    }

    pub fn tab(&self) -> &str {
        &self.tab
    }
}

impl Drop for SessionGuard {
    fn drop(&mut self) {
        self.panels
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .end_session(&self.tab);
        tracing::debug!(tab = %self.tab, "capture session released");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn panels() -> SharedPanels {
        Arc::new(Mutex::new(PanelStates::new()))
    }

    #[test]
    fn test_second_session_on_same_tab_rejected() {
        let panels = panels();
        let _guard = SessionGuard::acquire(&panels, "tab-1").unwrap();

        let second = SessionGuard::acquire(&panels, "tab-1");
        assert!(matches!(second, Err(Error::SessionInFlight(_))));
        assert!(SessionGuard::acquire(&panels, "tab-2").is_ok());
    }

    #[test]
    fn test_drop_releases_session() {
        let panels = panels();
        {
            let guard = SessionGuard::acquire(&panels, "tab-1").unwrap();
            assert_eq!(guard.tab(), "tab-1");
            assert!(panels.lock().unwrap().get("tab-1").in_flight);
        }
        assert!(!panels.lock().unwrap().get("tab-1").in_flight);
        assert!(SessionGuard::acquire(&panels, "tab-1").is_ok());
    }

    #[test]
    fn test_poisoned_panel_state_is_recovered() {
        let panels = panels();
        let holder = Arc::clone(&panels);
        let _ = std::thread::spawn(move || {
            let _states = holder.lock().unwrap();
            panic!("panicked while holding panel state");
        })
        .join();
        assert!(panels.is_poisoned());

        let guard = SessionGuard::acquire(&panels, "tab-1");
        assert!(guard.is_ok());
        drop(guard);
        assert!(SessionGuard::acquire(&panels, "tab-1").is_ok());
    }

    #[test]
    fn test_acquire_enables_panel() {
        let panels = panels();
        let _guard = SessionGuard::acquire(&panels, "tab-1").unwrap();
        assert!(panels.lock().unwrap().is_enabled("tab-1"));
    }
}
