//! `workspace/executeCommand` handlers.
//!
//! Dispatch is a plain function over a `RangeStore` so it can be tested
//! without a running server.

use std::path::Path;

use serde::de::DeserializeOwned;
use serde_json::{Value, json};
use tower_lsp_server::jsonrpc;

use crate::error::{RangeError, RangeResult};
use crate::range::{NewRange, RangeUpdate, validate};
use crate::store::RangeStore;

pub const CREATE: &str = "nvtxRanges.create";
pub const DELETE: &str = "nvtxRanges.delete";
pub const RENAME: &str = "nvtxRanges.rename";
pub const UPDATE: &str = "nvtxRanges.update";
pub const TOGGLE: &str = "nvtxRanges.toggle";
pub const LIST: &str = "nvtxRanges.list";
pub const RELOAD: &str = "nvtxRanges.reload";

/// Every command advertised in the server capabilities.
pub const ALL: [&str; 7] = [CREATE, DELETE, RENAME, UPDATE, TOGGLE, LIST, RELOAD];

#[derive(Debug, PartialEq)]
pub(crate) struct CommandOutcome {
    pub value: Value,
    /// Whether observers should be told the range set changed.
    pub changed: bool,
}

impl CommandOutcome {
    fn read(value: Value) -> Self {
        Self {
            value,
            changed: false,
        }
    }

    fn write(value: Value) -> Self {
        Self {
            value,
            changed: true,
        }
    }

    fn existed(existed: bool) -> Self {
        Self {
            value: Value::Bool(existed),
            changed: existed,
        }
    }
}

pub(crate) fn execute(
    store: &mut RangeStore,
    command: &str,
    arguments: Vec<Value>,
) -> RangeResult<CommandOutcome> {
    let mut args = Arguments::new(command, arguments);

    match command {
        CREATE => {
            let input: NewRange = args.required("range")?;
            let candidate = input.clone().into_range("pending".to_string());
            let validation = validate(&candidate);
            if !validation.valid {
                return Err(RangeError::invalid(validation.errors));
            }
            let range = store.create(input)?;
            Ok(CommandOutcome::write(to_value(&range)?))
        }
        DELETE => {
            let id: String = args.required("id")?;
            Ok(CommandOutcome::existed(store.delete(&id)?))
        }
        RENAME => {
            let id: String = args.required("id")?;
            let name: String = args.required("name")?;
            if name.trim().is_empty() {
                return Err(RangeError::invalid(vec!["name must not be empty".to_string()]));
            }
            Ok(CommandOutcome::existed(
                store.update(&id, RangeUpdate::rename(name))?,
            ))
        }
        UPDATE => {
            let id: String = args.required("id")?;
            let update: RangeUpdate = args.required("update")?;
            if update.name.as_deref().is_some_and(|name| name.trim().is_empty()) {
                return Err(RangeError::invalid(vec!["name must not be empty".to_string()]));
            }
            Ok(CommandOutcome::existed(store.update(&id, update)?))
        }
        TOGGLE => {
            let id: String = args.required("id")?;
            Ok(CommandOutcome::existed(store.toggle_enabled(&id)?))
        }
        LIST => {
            let file: Option<String> = args.optional("filePath")?;
            let ranges = match file {
                Some(file) => store.ranges_for_file(Path::new(&file))?,
                None => store.load()?,
            };
            Ok(CommandOutcome::read(to_value(&ranges)?))
        }
        RELOAD => {
            store.invalidate();
            let count = store.load()?.len();
            Ok(CommandOutcome::write(json!(count)))
        }
        other => Err(RangeError::invalid(vec![format!("unknown command: {other}")])),
    }
}

/// Convert a failure into the JSON-RPC error returned to the client.
pub(crate) fn to_jsonrpc_error(err: RangeError) -> jsonrpc::Error {
    match err {
        RangeError::Invalid { .. } => {
            jsonrpc::Error::invalid_params(err.to_string())
        }
        other => {
            let mut error = jsonrpc::Error::internal_error();
            error.message = other.to_string().into();
            error
        }
    }
}

fn to_value<T: serde::Serialize>(value: &T) -> RangeResult<Value> {
    serde_json::to_value(value).map_err(|err| RangeError::invalid(vec![err.to_string()]))
}

/// Positional command arguments.
struct Arguments {
    command: String,
    values: std::vec::IntoIter<Value>,
}

impl Arguments {
    fn new(command: &str, values: Vec<Value>) -> Self {
        Self {
            command: command.to_string(),
            values: values.into_iter(),
        }
    }

    fn required<T: DeserializeOwned>(&mut self, name: &str) -> RangeResult<T> {
        self.optional(name)?.ok_or_else(|| {
            RangeError::invalid(vec![format!("{}: missing argument `{}`", self.command, name)])
        })
    }

    fn optional<T: DeserializeOwned>(&mut self, name: &str) -> RangeResult<Option<T>> {
        match self.values.next() {
            None | Some(Value::Null) => Ok(None),
            Some(value) => serde_json::from_value(value).map(Some).map_err(|err| {
                RangeError::invalid(vec![format!(
                    "{}: invalid argument `{}`: {}",
                    self.command, name, err
                )])
            }),
        }
    }
}
