use std::path::{Path, PathBuf};

use serde_json::Value;
use tokio::sync::Mutex;
use tower_lsp_server::jsonrpc::Result;
use tower_lsp_server::ls_types::*;
use tower_lsp_server::{Client, LanguageServer};
use url::Url;

use crate::batch::process_change;
use crate::config::WorkspaceSettings;
use crate::document::DocumentStore;
use crate::error::RangeError;
use crate::notify::ChangeNotifier;
use crate::store::RangeStore;

use super::client::{ClientNotifier, forward_change_signals};
use super::code_lens::build_code_lenses;
use super::commands::{self, to_jsonrpc_error};
use super::settings::{SettingsSource, load_settings};
use super::settings_manager::SettingsManager;
use super::text_sync::apply_content_changes_with_edits;

const WATCH_REGISTRATION_ID: &str = "nvtx-ranges-file-watcher";

/// Convert an LSP URI into a `url::Url`.
pub(crate) fn uri_to_url(uri: &Uri) -> std::result::Result<Url, url::ParseError> {
    Url::parse(uri.as_str())
}

fn uri_to_path(uri: &Uri) -> Option<PathBuf> {
    uri_to_url(uri).ok()?.to_file_path().ok()
}

/// Workspace root: the first workspace folder, else the deprecated `rootUri`.
fn workspace_root(params: &InitializeParams) -> Option<PathBuf> {
    #[allow(deprecated)]
    let root_uri = params.root_uri.as_ref();

    params
        .workspace_folders
        .as_ref()
        .and_then(|folders| folders.first())
        .and_then(|folder| uri_to_path(&folder.uri))
        .or_else(|| root_uri.and_then(uri_to_path))
}

/// Registration of a watcher for the range file.
fn range_file_watcher(path: &Path) -> Option<Registration> {
    let options = DidChangeWatchedFilesRegistrationOptions {
        watchers: vec![FileSystemWatcher {
            glob_pattern: GlobPattern::String(path.display().to_string()),
            kind: None,
        }],
    };
    Some(Registration {
        id: WATCH_REGISTRATION_ID.to_string(),
        method: "workspace/didChangeWatchedFiles".to_string(),
        register_options: Some(serde_json::to_value(options).ok()?),
    })
}

/// Language server keeping NVTX ranges anchored while files are edited.
pub struct RangeServer {
    client: Client,
    settings_manager: SettingsManager,
    documents: DocumentStore,
    /// `None` until a workspace root is known. Held for the whole of every
    /// read-modify-write cycle so cycles never interleave.
    store: Mutex<Option<RangeStore>>,
    notifier: ChangeNotifier,
}

impl std::fmt::Debug for RangeServer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RangeServer")
            .field("client", &self.client)
            .field("settings_manager", &self.settings_manager)
            .field("documents", &"DocumentStore")
            .finish_non_exhaustive()
    }
}

impl RangeServer {
    pub fn new(client: Client) -> Self {
        Self {
            client,
            settings_manager: SettingsManager::new(),
            documents: DocumentStore::new(),
            store: Mutex::new(None),
            notifier: ChangeNotifier::new(),
        }
    }

    fn client_notifier(&self) -> ClientNotifier {
        ClientNotifier::new(self.client.clone())
    }

    /// Point the store at the range file named by `settings`.
    async fn retarget_store(&self, settings: &WorkspaceSettings) {
        let root = self.settings_manager.root_path();
        let mut store = self.store.lock().await;
        *store = root
            .as_deref()
            .map(|root| RangeStore::for_workspace(root, &settings.ranges_file));
    }

    async fn reload_settings(&self, source: SettingsSource, value: Option<Value>) {
        let root = self.settings_manager.root_path();
        let outcome = load_settings(root.as_deref(), value.map(|value| (source, value)));
        self.client_notifier()
            .log_settings_events(&outcome.events)
            .await;
        self.retarget_store(&outcome.settings).await;
        self.settings_manager.apply_settings(outcome.settings);
    }
}

impl LanguageServer for RangeServer {
    async fn initialize(&self, params: InitializeParams) -> Result<InitializeResult> {
        self.settings_manager
            .set_capabilities(params.capabilities.clone());

        let root_path = workspace_root(&params);
        if root_path.is_none() {
            self.client_notifier()
                .show_error(RangeError::MissingWorkspace.to_string())
                .await;
        }
        self.settings_manager.set_root_path(root_path);

        self.reload_settings(
            SettingsSource::InitializationOptions,
            params.initialization_options,
        )
        .await;

        Ok(InitializeResult {
            server_info: Some(ServerInfo {
                name: "nvtx-ranges".to_string(),
                version: Some(env!("CARGO_PKG_VERSION").to_string()),
            }),
            capabilities: ServerCapabilities {
                text_document_sync: Some(TextDocumentSyncCapability::Options(
                    TextDocumentSyncOptions {
                        open_close: Some(true),
                        change: Some(TextDocumentSyncKind::INCREMENTAL),
                        will_save: None,
                        will_save_wait_until: None,
                        save: None,
                    },
                )),
                code_lens_provider: Some(CodeLensOptions {
                    resolve_provider: Some(false),
                }),
                execute_command_provider: Some(ExecuteCommandOptions {
                    commands: commands::ALL.iter().map(|c| c.to_string()).collect(),
                    work_done_progress_options: WorkDoneProgressOptions::default(),
                }),
                ..ServerCapabilities::default()
            },
            offset_encoding: None,
        })
    }

    async fn initialized(&self, _: InitializedParams) {
        tokio::spawn(forward_change_signals(
            self.client.clone(),
            self.notifier.subscribe(),
            self.settings_manager.supports_code_lens_refresh(),
        ));
        self.client_notifier().log_info("nvtx-ranges initialized").await;

        if !self.settings_manager.supports_watched_files_registration() {
            return;
        }
        let watcher = {
            let store = self.store.lock().await;
            store
                .as_ref()
                .and_then(|store| range_file_watcher(store.path()))
        };
        if let Some(registration) = watcher
            && let Err(err) = self.client.register_capability(vec![registration]).await
        {
            self.client_notifier()
                .log_warning(format!("Failed to watch the range file: {}", err))
                .await;
        }
    }

    async fn shutdown(&self) -> Result<()> {
        Ok(())
    }

    async fn did_open(&self, params: DidOpenTextDocumentParams) {
        let Ok(url) = uri_to_url(&params.text_document.uri) else {
            log::warn!(target: "nvtx_ranges::lsp", "Invalid URI in didOpen: {}", params.text_document.uri.as_str());
            return;
        };
        self.documents
            .insert(url, params.text_document.text);
        self.notifier.active_document_changed();
    }

    async fn did_close(&self, params: DidCloseTextDocumentParams) {
        if let Ok(url) = uri_to_url(&params.text_document.uri) {
            self.documents.remove(&url);
        }
    }

    async fn did_change(&self, params: DidChangeTextDocumentParams) {
        let Ok(url) = uri_to_url(&params.text_document.uri) else {
            log::warn!(target: "nvtx_ranges::lsp", "Invalid URI in didChange: {}", params.text_document.uri.as_str());
            return;
        };
        let Some(old_text) = self.documents.text(&url) else {
            log::warn!(target: "nvtx_ranges::lsp", "didChange for a document that is not open: {}", url);
            return;
        };

        let (new_text, edits) =
            apply_content_changes_with_edits(&old_text, params.content_changes);
        self.documents.update(url.clone(), new_text);

        if edits.is_empty() {
            return;
        }
        let Ok(file_path) = url.to_file_path() else {
            return;
        };

        let mut guard = self.store.lock().await;
        let Some(store) = guard.as_mut() else {
            return;
        };
        // Unreadable range file: leave it alone rather than overwrite it
        let ranges = match store.load() {
            Ok(ranges) => ranges,
            Err(err) => {
                self.client_notifier().log_warning(err.to_string()).await;
                return;
            }
        };

        let outcome = process_change(&file_path, &old_text, &edits, ranges);
        if !outcome.changed {
            return;
        }
        match store.write_all(&outcome.ranges) {
            Ok(()) => self.notifier.ranges_changed(),
            Err(err) => self.client_notifier().show_error(err.to_string()).await,
        }
    }

    async fn did_change_watched_files(&self, params: DidChangeWatchedFilesParams) {
        let mut guard = self.store.lock().await;
        let Some(store) = guard.as_mut() else {
            return;
        };
        let touched = params.changes.iter().any(|change| {
            uri_to_path(&change.uri)
                .is_some_and(|path| path_clean::clean(path) == store.path())
        });
        if !touched {
            return;
        }

        store.invalidate();
        if let Err(err) = store.load() {
            self.client_notifier().show_error(err.to_string()).await;
        }
        self.notifier.ranges_changed();
    }

    async fn did_change_configuration(&self, params: DidChangeConfigurationParams) {
        self.reload_settings(SettingsSource::ClientConfiguration, Some(params.settings))
            .await;
        self.notifier.ranges_changed();
    }

    async fn code_lens(&self, params: CodeLensParams) -> Result<Option<Vec<CodeLens>>> {
        let settings = self.settings_manager.load_settings();
        if !settings.code_lens {
            return Ok(None);
        }
        let Some(file_path) = uri_to_path(&params.text_document.uri) else {
            return Ok(None);
        };

        let mut guard = self.store.lock().await;
        let Some(store) = guard.as_mut() else {
            return Ok(None);
        };
        let ranges = match store.ranges_for_file(&file_path) {
            Ok(ranges) => ranges,
            Err(err) => {
                self.client_notifier().log_warning(err.to_string()).await;
                Vec::new()
            }
        };

        Ok(Some(build_code_lenses(&ranges, &settings)))
    }

    async fn execute_command(&self, params: ExecuteCommandParams) -> Result<Option<Value>> {
        let mut guard = self.store.lock().await;
        let Some(store) = guard.as_mut() else {
            return Err(to_jsonrpc_error(RangeError::MissingWorkspace));
        };

        let outcome = commands::execute(store, &params.command, params.arguments)
            .map_err(to_jsonrpc_error)?;
        if outcome.changed {
            self.notifier.ranges_changed();
        }
        Ok(Some(outcome.value))
    }
}
