//! End-to-end tests driving the nvtx-ranges language server over stdio.
//!
//! Each test spawns the binary, performs the initialize handshake against a
//! temporary workspace and checks what ends up in the range file.

mod helpers;

use helpers::lsp_client::LspClient;
use serde_json::{Value, json};
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;
use url::Url;

const RANGES_FILE: &str = ".vscode/nvtx_ranges.json";

fn file_uri(path: &Path) -> String {
    Url::from_file_path(path)
        .expect("absolute path converts to a file URI")
        .to_string()
}

/// Initialize against `root` and wait until the server is ready to forward
/// change signals.
fn initialize(client: &mut LspClient, root: Option<&Path>) -> Value {
    let root_uri = root.map(file_uri);
    let response = client.send_request(
        "initialize",
        json!({
            "processId": std::process::id(),
            "rootUri": root_uri,
            "capabilities": {}
        }),
    );
    client.send_notification("initialized", json!({}));
    loop {
        let message = client.wait_for_notification("window/logMessage");
        if message["params"]["message"] == "nvtx-ranges initialized" {
            break;
        }
    }
    response
}

/// A Python file of `lines` lines inside `dir`.
fn write_source(dir: &TempDir, lines: usize) -> (PathBuf, String) {
    let path = dir.path().join("train.py");
    let text: String = (1..=lines).map(|i| format!("line_{i} = {i}\n")).collect();
    fs::write(&path, &text).expect("failed to write source file");
    (path, text)
}

fn open(client: &mut LspClient, path: &Path, text: &str) {
    client.send_notification(
        "textDocument/didOpen",
        json!({
            "textDocument": {
                "uri": file_uri(path),
                "languageId": "python",
                "version": 1,
                "text": text
            }
        }),
    );
    client.wait_for_notification("nvtxRanges/activeDocumentChanged");
}

fn execute(client: &mut LspClient, command: &str, arguments: Value) -> Value {
    client.send_request(
        "workspace/executeCommand",
        json!({ "command": command, "arguments": arguments }),
    )
}

fn stored_ranges(dir: &TempDir) -> Vec<Value> {
    let content =
        fs::read_to_string(dir.path().join(RANGES_FILE)).expect("range file should exist");
    serde_json::from_str(&content).expect("range file should be a JSON array")
}

#[test]
fn initialize_advertises_sync_code_lens_and_commands() {
    let workspace = TempDir::new().unwrap();
    let mut client = LspClient::new();

    let response = initialize(&mut client, Some(workspace.path()));
    let capabilities = &response["result"]["capabilities"];

    assert_eq!(capabilities["textDocumentSync"]["change"], 2);
    assert!(capabilities.get("codeLensProvider").is_some());
    let commands = capabilities["executeCommandProvider"]["commands"]
        .as_array()
        .expect("commands should be an array");
    assert!(commands.contains(&json!("nvtxRanges.create")));
    assert!(commands.contains(&json!("nvtxRanges.toggle")));
}

#[test]
fn missing_workspace_is_reported_and_blocks_commands() {
    let mut client = LspClient::new();
    initialize(&mut client, None);

    let message = client.wait_for_notification("window/showMessage");
    assert_eq!(message["params"]["type"], 1);
    assert!(
        message["params"]["message"]
            .as_str()
            .unwrap()
            .contains("No workspace folder")
    );

    let response = execute(&mut client, "nvtxRanges.list", json!([]));
    assert!(response.get("error").is_some(), "response: {response}");
}

#[test]
fn edit_above_range_shifts_persisted_lines() {
    let workspace = TempDir::new().unwrap();
    let (source, text) = write_source(&workspace, 20);
    let mut client = LspClient::new();
    initialize(&mut client, Some(workspace.path()));

    let created = execute(
        &mut client,
        "nvtxRanges.create",
        json!([{
            "name": "forward",
            "filePath": source.to_string_lossy(),
            "startLine": 10,
            "endLine": 15
        }]),
    );
    assert_eq!(created["result"]["type"], "block");
    client.wait_for_notification("nvtxRanges/rangesChanged");

    open(&mut client, &source, &text);

    // Two new lines at line 5 (0-indexed 4), column 0
    client.send_notification(
        "textDocument/didChange",
        json!({
            "textDocument": { "uri": file_uri(&source), "version": 2 },
            "contentChanges": [{
                "range": {
                    "start": { "line": 4, "character": 0 },
                    "end": { "line": 4, "character": 0 }
                },
                "text": "import torch\nimport os\n"
            }]
        }),
    );
    client.wait_for_notification("nvtxRanges/rangesChanged");

    let ranges = stored_ranges(&workspace);
    assert_eq!(ranges.len(), 1);
    assert_eq!(ranges[0]["startLine"], 12);
    assert_eq!(ranges[0]["endLine"], 17);

    let listed = execute(
        &mut client,
        "nvtxRanges.list",
        json!([source.to_string_lossy()]),
    );
    assert_eq!(listed["result"][0]["startLine"], 12);
}

#[test]
fn edits_in_other_files_leave_ranges_alone() {
    let workspace = TempDir::new().unwrap();
    let (source, _) = write_source(&workspace, 20);
    let other = workspace.path().join("other.py");
    let other_text = "x = 1\ny = 2\n";
    fs::write(&other, other_text).unwrap();

    let mut client = LspClient::new();
    initialize(&mut client, Some(workspace.path()));
    execute(
        &mut client,
        "nvtxRanges.create",
        json!([{
            "name": "step",
            "filePath": source.to_string_lossy(),
            "startLine": 3
        }]),
    );

    open(&mut client, &other, other_text);
    client.send_notification(
        "textDocument/didChange",
        json!({
            "textDocument": { "uri": file_uri(&other), "version": 2 },
            "contentChanges": [{ "text": "\n\n\nx = 1\ny = 2\n" }]
        }),
    );

    let listed = execute(&mut client, "nvtxRanges.list", json!([]));
    assert_eq!(listed["result"][0]["startLine"], 3);
    assert_eq!(stored_ranges(&workspace)[0]["startLine"], 3);
}

#[test]
fn code_lens_follows_toggle() {
    let workspace = TempDir::new().unwrap();
    let (source, text) = write_source(&workspace, 20);
    let mut client = LspClient::new();
    initialize(&mut client, Some(workspace.path()));

    let created = execute(
        &mut client,
        "nvtxRanges.create",
        json!([{
            "name": "loss",
            "filePath": source.to_string_lossy(),
            "startLine": 4,
            "endLine": 6
        }]),
    );
    let id = created["result"]["id"].clone();
    open(&mut client, &source, &text);

    let lens_params = json!({ "textDocument": { "uri": file_uri(&source) } });
    let lenses = client.send_request("textDocument/codeLens", lens_params.clone());
    let lens = &lenses["result"][0];
    assert_eq!(lens["range"]["start"]["line"], 3);
    assert_eq!(lens["command"]["command"], "nvtxRanges.toggle");
    assert_eq!(lens["command"]["arguments"][0], id);

    let toggled = execute(&mut client, "nvtxRanges.toggle", json!([id]));
    assert_eq!(toggled["result"], true);

    let lenses = client.send_request("textDocument/codeLens", lens_params);
    assert!(
        lenses["result"][0]["command"]["title"]
            .as_str()
            .unwrap()
            .ends_with("(disabled)")
    );
}

#[test]
fn external_rewrite_is_visible_after_watch_notification() {
    let workspace = TempDir::new().unwrap();
    let (source, _) = write_source(&workspace, 20);
    let mut client = LspClient::new();
    initialize(&mut client, Some(workspace.path()));

    let ranges_path = workspace.path().join(RANGES_FILE);
    fs::create_dir_all(ranges_path.parent().unwrap()).unwrap();
    fs::write(
        &ranges_path,
        serde_json::to_string_pretty(&json!([{
            "id": "external",
            "name": "from-tool",
            "filePath": source.to_string_lossy(),
            "type": "event",
            "startLine": 7,
            "isEnabled": true
        }]))
        .unwrap(),
    )
    .unwrap();

    client.send_notification(
        "workspace/didChangeWatchedFiles",
        json!({ "changes": [{ "uri": file_uri(&ranges_path), "type": 2 }] }),
    );
    client.wait_for_notification("nvtxRanges/rangesChanged");

    let listed = execute(&mut client, "nvtxRanges.list", json!([]));
    assert_eq!(listed["result"][0]["id"], "external");
}

#[test]
fn invalid_create_is_rejected_with_invalid_params() {
    let workspace = TempDir::new().unwrap();
    let mut client = LspClient::new();
    initialize(&mut client, Some(workspace.path()));

    let response = execute(
        &mut client,
        "nvtxRanges.create",
        json!([{ "name": "", "filePath": "/ws/t.py", "startLine": 8, "endLine": 2 }]),
    );
    assert_eq!(response["error"]["code"], -32602);
    assert!(!workspace.path().join(RANGES_FILE).exists());
}

#[test]
fn shutdown_succeeds() {
    let workspace = TempDir::new().unwrap();
    let mut client = LspClient::new();
    initialize(&mut client, Some(workspace.path()));

    let response = client.send_request("shutdown", json!(null));
    assert!(response.get("result").is_some());
}
