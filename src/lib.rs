pub mod adjust;
pub mod batch;
pub mod config;
pub mod document;
pub mod error;
pub mod lsp;
pub mod notify;
pub mod plan;
pub mod range;
pub mod store;
pub mod text;

pub use adjust::{Adjustment, LineEdit, LineSource, Placement, adjust};
pub use batch::{BatchOutcome, process_change};
pub use error::{RangeError, RangeResult};
pub use range::{NewRange, Range, RangeKind, RangeUpdate, Validation, validate};
pub use store::{DEFAULT_RANGES_FILE, RangeStore};

// Re-export the main server implementation
pub use lsp::RangeServer;
