mod client;
mod code_lens;
pub mod commands;
mod lsp_impl;
pub mod protocol;
mod settings;
mod settings_manager;
mod text_sync;

pub use lsp_impl::RangeServer;
pub use settings::{
    SettingsEvent, SettingsEventKind, SettingsLoadOutcome, SettingsSource, load_settings,
};
