//! Client notification abstraction for LSP communication.
//!
//! `ClientNotifier` wraps `tower_lsp_server::Client` and centralizes
//! client-facing communication: log and show messages, settings events and
//! code lens refresh requests. `forward_change_signals` bridges the
//! in-process `ChangeNotifier` to the client.

use tokio::sync::broadcast::{self, error::RecvError};
use tower_lsp_server::Client;
use tower_lsp_server::ls_types::{ClientCapabilities, MessageType};

use crate::lsp::{SettingsEvent, SettingsEventKind};
use crate::notify::ChangeSignal;

use super::protocol::{ActiveDocumentChanged, RangesChanged, SignalParams};

/// Check if client capabilities indicate code lens refresh support.
///
/// Extracted as a pure function so it can be tested without a `Client`.
/// Returns `false` for any missing capability in the chain.
pub(crate) fn check_code_lens_refresh_support(caps: &ClientCapabilities) -> bool {
    caps.workspace
        .as_ref()
        .and_then(|w| w.code_lens.as_ref())
        .and_then(|cl| cl.refresh_support)
        .unwrap_or(false)
}

/// Check if the client lets the server register file watchers dynamically.
pub(crate) fn check_watched_files_registration_support(caps: &ClientCapabilities) -> bool {
    caps.workspace
        .as_ref()
        .and_then(|w| w.did_change_watched_files.as_ref())
        .and_then(|dcwf| dcwf.dynamic_registration)
        .unwrap_or(false)
}

/// Wrapper around LSP client for centralized notification handling.
#[derive(Clone, Debug)]
pub(crate) struct ClientNotifier {
    client: Client,
}

impl ClientNotifier {
    pub(crate) fn new(client: Client) -> Self {
        Self { client }
    }

    /// Log a message to the client at the specified severity level.
    pub(crate) async fn log(&self, level: MessageType, message: impl Into<String>) {
        self.client.log_message(level, message.into()).await;
    }

    pub(crate) async fn log_info(&self, message: impl Into<String>) {
        self.log(MessageType::INFO, message).await;
    }

    pub(crate) async fn log_warning(&self, message: impl Into<String>) {
        self.log(MessageType::WARNING, message).await;
    }

    /// Show an error to the user (window/showMessage) and log it.
    pub(crate) async fn show_error(&self, message: impl Into<String>) {
        let message = message.into();
        log::error!(target: "nvtx_ranges::lsp", "{}", message);
        self.client.show_message(MessageType::ERROR, message).await;
    }

    /// Handle settings events by logging messages at appropriate levels.
    pub(crate) async fn log_settings_events(&self, events: &[SettingsEvent]) {
        for event in events {
            let message_type = match event.kind {
                SettingsEventKind::Info => MessageType::INFO,
                SettingsEventKind::Warning => MessageType::WARNING,
            };
            self.client
                .log_message(message_type, event.message.clone())
                .await;
        }
    }
}

/// Forward change signals to the client until the notifier is dropped.
///
/// "Ranges changed" asks the client to refresh code lenses (when it
/// supports that) and sends `nvtxRanges/rangesChanged`; "active document
/// changed" sends `nvtxRanges/activeDocumentChanged`.
pub(crate) async fn forward_change_signals(
    client: Client,
    mut receiver: broadcast::Receiver<ChangeSignal>,
    code_lens_refresh: bool,
) {
    loop {
        let signal = match receiver.recv().await {
            Ok(signal) => signal,
            Err(RecvError::Lagged(skipped)) => {
                // Signals carry no payload; one refresh covers the skipped ones
                log::debug!(target: "nvtx_ranges::notify", "Coalesced {} change signals", skipped);
                ChangeSignal::RangesChanged
            }
            Err(RecvError::Closed) => break,
        };

        match signal {
            ChangeSignal::RangesChanged => {
                if code_lens_refresh && let Err(err) = client.code_lens_refresh().await {
                    log::debug!(target: "nvtx_ranges::notify", "codeLens/refresh failed: {}", err);
                }
                client
                    .send_notification::<RangesChanged>(SignalParams::default())
                    .await;
            }
            ChangeSignal::ActiveDocumentChanged => {
                client
                    .send_notification::<ActiveDocumentChanged>(SignalParams::default())
                    .await;
            }
        }
    }
}
