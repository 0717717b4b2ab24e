//! Custom notifications sent to the client.

use serde::{Deserialize, Serialize};
use tower_lsp_server::ls_types::notification::Notification;

/// Empty payload of the change notifications.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SignalParams {}

/// `nvtxRanges/rangesChanged`: the persisted range set changed.
#[derive(Debug)]
pub enum RangesChanged {}

impl Notification for RangesChanged {
    type Params = SignalParams;
    const METHOD: &'static str = "nvtxRanges/rangesChanged";
}

/// `nvtxRanges/activeDocumentChanged`: a document was opened or focused.
#[derive(Debug)]
pub enum ActiveDocumentChanged {}

impl Notification for ActiveDocumentChanged {
    type Params = SignalParams;
    const METHOD: &'static str = "nvtxRanges/activeDocumentChanged";
}
