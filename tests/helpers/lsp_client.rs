//! LSP client for E2E tests.
//!
//! Provides a simple LSP client that communicates with the nvtx-ranges
//! binary via stdin/stdout using JSON-RPC 2.0 protocol.

// These methods are shared across multiple test binaries but not all tests use every method.
// Allow dead_code to suppress per-binary warnings.
#![allow(dead_code)]

use serde_json::{Value, json};
use std::collections::VecDeque;
use std::io::{BufRead, BufReader, Read, Write};
use std::process::{Child, ChildStdin, ChildStdout, Command, Stdio};
use std::time::{Duration, Instant};
use tempfile::TempDir;

const MAX_MESSAGES: u32 = 1000;
const TIMEOUT: Duration = Duration::from_secs(30);

/// LSP client for communicating with the nvtx-ranges binary.
///
/// Handles JSON-RPC 2.0 message framing with Content-Length headers,
/// request/response matching, and server-initiated notifications.
/// Notifications read while waiting for a response are buffered so tests
/// can assert on them afterwards.
pub struct LspClient {
    child: Child,
    stdin: Option<ChildStdin>,
    stdout: BufReader<ChildStdout>,
    request_id: i64,
    notifications: VecDeque<Value>,
    /// Empty user config directory so the host's config never leaks in.
    _config_home: TempDir,
}

impl LspClient {
    /// Spawn the nvtx-ranges binary and create a new LSP client.
    pub fn new() -> Self {
        Self::with_debug(false)
    }

    /// Spawn the nvtx-ranges binary; `debug` forwards debug logs to stderr.
    pub fn with_debug(debug: bool) -> Self {
        let config_home = TempDir::new().expect("Failed to create config home");

        // `CARGO_BIN_EXE_nvtx-ranges` is set by Cargo's test harness for integration tests
        let mut cmd = Command::new(env!("CARGO_BIN_EXE_nvtx-ranges"));
        cmd.env("XDG_CONFIG_HOME", config_home.path())
            .stdin(Stdio::piped())
            .stdout(Stdio::piped());

        if debug {
            cmd.env("RUST_LOG", "debug").stderr(Stdio::inherit());
        } else {
            cmd.stderr(Stdio::null());
        }

        let mut child = cmd.spawn().expect("Failed to spawn nvtx-ranges binary");

        let stdin = child.stdin.take().expect("Failed to get stdin");
        let stdout = BufReader::new(child.stdout.take().expect("Failed to get stdout"));

        Self {
            child,
            stdin: Some(stdin),
            stdout,
            request_id: 0,
            notifications: VecDeque::new(),
            _config_home: config_home,
        }
    }

    /// Send an LSP request and return the response.
    pub fn send_request(&mut self, method: &str, params: Value) -> Value {
        self.request_id += 1;
        let request_id = self.request_id;

        // Build request - some methods like "shutdown" don't take params
        let mut request = serde_json::Map::new();
        request.insert("jsonrpc".to_string(), json!("2.0"));
        request.insert("id".to_string(), json!(request_id));
        request.insert("method".to_string(), json!(method));

        // Only add params if it's not null
        if !params.is_null() {
            request.insert("params".to_string(), params);
        }

        self.send_message(&Value::Object(request));
        self.receive_response_for_id(request_id)
    }

    /// Send an LSP notification (no response expected).
    pub fn send_notification(&mut self, method: &str, params: Value) {
        let mut notification = serde_json::Map::new();
        notification.insert("jsonrpc".to_string(), json!("2.0"));
        notification.insert("method".to_string(), json!(method));

        if !params.is_null() {
            notification.insert("params".to_string(), params);
        }

        self.send_message(&Value::Object(notification));
    }

    /// Wait for a server notification with the given method.
    ///
    /// Buffered notifications are checked first; earlier notifications with
    /// other methods stay buffered.
    pub fn wait_for_notification(&mut self, method: &str) -> Value {
        if let Some(index) = self
            .notifications
            .iter()
            .position(|message| message["method"] == method)
        {
            return self
                .notifications
                .remove(index)
                .expect("index from position is in bounds");
        }

        let start_time = Instant::now();
        for _ in 0..MAX_MESSAGES {
            if start_time.elapsed() > TIMEOUT {
                break;
            }
            let Some(message) = self.next_notification() else {
                continue;
            };
            if message["method"] == method {
                return message;
            }
            self.notifications.push_back(message);
        }
        panic!("Timeout waiting for notification {}", method);
    }

    /// Drop every buffered notification.
    pub fn clear_notifications(&mut self) {
        self.notifications.clear();
    }

    /// Send a JSON-RPC message with Content-Length header.
    fn send_message(&mut self, message: &Value) {
        let body = serde_json::to_string(message).expect("Failed to serialize message");
        let header = format!("Content-Length: {}\r\n\r\n", body.len());

        let stdin = self.stdin.as_mut().expect("stdin already closed");
        stdin
            .write_all(header.as_bytes())
            .expect("Failed to write header");
        stdin
            .write_all(body.as_bytes())
            .expect("Failed to write body");
        stdin.flush().expect("Failed to flush stdin");
    }

    /// Receive an LSP response for a specific request id.
    ///
    /// Notifications are buffered; server-to-client requests are answered
    /// with a null result. Times out after 30 seconds or 1000 messages.
    fn receive_response_for_id(&mut self, expected_id: i64) -> Value {
        let start_time = Instant::now();
        let mut message_count = 0u32;

        loop {
            if start_time.elapsed() > TIMEOUT {
                panic!(
                    "Timeout waiting for response with id {}. Elapsed: {:?}",
                    expected_id,
                    start_time.elapsed()
                );
            }
            if message_count >= MAX_MESSAGES {
                panic!(
                    "Exceeded maximum message threshold ({}) waiting for response with id {}",
                    MAX_MESSAGES, expected_id
                );
            }

            let message = self.receive_message();
            message_count += 1;

            match (message.get("id"), message.get("method")) {
                (Some(id), None) if id.as_i64() == Some(expected_id) => return message,
                (Some(_), None) => {}
                (Some(id), Some(_)) => self.reply_null(id.clone()),
                (None, _) => self.notifications.push_back(message),
            }
        }
    }

    /// Next server notification, answering any server request on the way.
    fn next_notification(&mut self) -> Option<Value> {
        let message = self.receive_message();
        match (message.get("id"), message.get("method")) {
            (None, Some(_)) => Some(message),
            (Some(id), Some(_)) => {
                self.reply_null(id.clone());
                None
            }
            _ => None,
        }
    }

    fn reply_null(&mut self, id: Value) {
        self.send_message(&json!({ "jsonrpc": "2.0", "id": id, "result": null }));
    }

    /// Receive a single LSP message with Content-Length framing.
    fn receive_message(&mut self) -> Value {
        let mut header = String::new();
        loop {
            header.clear();
            let read = self
                .stdout
                .read_line(&mut header)
                .expect("Failed to read header line");
            if read == 0 {
                panic!("Server closed stdout");
            }

            if header == "\r\n" {
                continue;
            }

            if header.starts_with("Content-Length:") {
                let len: usize = header
                    .trim_start_matches("Content-Length:")
                    .trim()
                    .parse()
                    .expect("Invalid Content-Length");

                // Read empty line
                let mut empty = String::new();
                self.stdout
                    .read_line(&mut empty)
                    .expect("Failed to read empty line");

                let mut body = vec![0u8; len];
                self.stdout
                    .read_exact(&mut body)
                    .expect("Failed to read body");

                return serde_json::from_slice(&body).expect("Failed to parse response");
            }
        }
    }
}

impl Drop for LspClient {
    fn drop(&mut self) {
        let _ = self.child.kill();
    }
}
