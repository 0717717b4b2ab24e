//! Settings management for the LSP server.
//!
//! `SettingsManager` holds the workspace root, the resolved settings and the
//! client capabilities. All three are set during `initialize()`; settings
//! can be replaced later by `workspace/didChangeConfiguration`.

use arc_swap::ArcSwap;
use std::path::PathBuf;
use std::sync::{Arc, OnceLock};
use tower_lsp_server::ls_types::ClientCapabilities;

use crate::config::WorkspaceSettings;

use super::client::{check_code_lens_refresh_support, check_watched_files_registration_support};

/// Centralized manager for workspace settings, capabilities, and root path.
///
/// # Thread Safety
///
/// - `ArcSwap` for atomic updates to settings and root_path
/// - `OnceLock` for one-time initialization of capabilities
pub(crate) struct SettingsManager {
    root_path: ArcSwap<Option<PathBuf>>,
    settings: ArcSwap<WorkspaceSettings>,
    /// Client capabilities from initialize() - immutable after initialization.
    client_capabilities: OnceLock<ClientCapabilities>,
}

impl std::fmt::Debug for SettingsManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SettingsManager")
            .field("root_path", &self.root_path.load_full())
            .field("settings", &self.settings.load_full())
            .field("client_capabilities", &"OnceLock<ClientCapabilities>")
            .finish()
    }
}

impl Default for SettingsManager {
    fn default() -> Self {
        Self::new()
    }
}

impl SettingsManager {
    pub(crate) fn new() -> Self {
        Self {
            root_path: ArcSwap::new(Arc::new(None)),
            settings: ArcSwap::new(Arc::new(WorkspaceSettings::default())),
            client_capabilities: OnceLock::new(),
        }
    }

    /// Store client capabilities from initialize().
    ///
    /// Subsequent calls are ignored (OnceLock semantics).
    pub(crate) fn set_capabilities(&self, caps: ClientCapabilities) {
        // initialize() is called exactly once per session
        let _ = self.client_capabilities.set(caps);
    }

    pub(crate) fn set_root_path(&self, path: Option<PathBuf>) {
        self.root_path.store(Arc::new(path));
    }

    pub(crate) fn root_path(&self) -> Arc<Option<PathBuf>> {
        self.root_path.load_full()
    }

    pub(crate) fn load_settings(&self) -> Arc<WorkspaceSettings> {
        self.settings.load_full()
    }

    pub(crate) fn apply_settings(&self, settings: WorkspaceSettings) {
        self.settings.store(Arc::new(settings));
    }

    /// Returns true only if client declared workspace.codeLens.refreshSupport.
    /// Returns false if initialize() hasn't been called yet (OnceLock is empty).
    pub(crate) fn supports_code_lens_refresh(&self) -> bool {
        self.client_capabilities
            .get()
            .map(check_code_lens_refresh_support)
            .unwrap_or(false)
    }

    /// Returns true if the client accepts dynamic registration of
    /// workspace/didChangeWatchedFiles.
    pub(crate) fn supports_watched_files_registration(&self) -> bool {
        self.client_capabilities
            .get()
            .map(check_watched_files_registration_support)
            .unwrap_or(false)
    }
}
