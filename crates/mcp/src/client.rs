//! Stdio connection to one tool server

use std::collections::{BTreeMap, HashMap};
use std::process::Stdio;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex as StdMutex};

use serde_json::{json, Value};
use tokio::io::{AsyncBufReadExt, AsyncRead, AsyncWrite, AsyncWriteExt, BufReader};
use tokio::process::{Child, Command};
use tokio::sync::{oneshot, Mutex};
use tokio::task::JoinHandle;
use tracing::{debug, trace, warn};

use crate::protocol::{
    initialize_params, CallToolResult, Incoming, InitializeResult, JsonRpcRequest,
    JsonRpcResponse, McpTool, ToolsListResult,
};
use crate::{McpError, Result};

/// In-flight requests keyed by id. `None` once the server output has closed.
type PendingMap = Arc<StdMutex<Option<HashMap<u64, oneshot::Sender<JsonRpcResponse>>>>>;

type Writer = Box<dyn AsyncWrite + Send + Unpin>;

/// JSON-RPC client for a single tool server
///
/// Requests may be issued concurrently from many tasks; responses are
/// matched back to their caller by id.
pub struct McpClient {
    writer: Mutex<Writer>,
    pending: PendingMap,
    next_id: AtomicU64,
    reader: JoinHandle<()>,
    child: Mutex<Option<Child>>,
}

impl McpClient {
    /// Launch a server process and connect to its stdin/stdout
    pub fn spawn(command: &str, args: &[String], env: &BTreeMap<String, String>) -> Result<Self> {
        debug!("spawning tool server: {} {:?}", command, args);

        let mut child = Command::new(command)
            .args(args)
            .envs(env)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::null())
            .kill_on_drop(true)
            .spawn()
            .map_err(|source| McpError::Spawn {
                command: command.to_string(),
                source,
            })?;

        let stdin = child.stdin.take().ok_or(McpError::Closed)?;
        let stdout = child.stdout.take().ok_or(McpError::Closed)?;

        let mut client = Self::from_streams(stdout, stdin);
        client.child = Mutex::new(Some(child));
        Ok(client)
    }

    /// Connect over an arbitrary pair of byte streams
    pub fn from_streams<R, W>(reader: R, writer: W) -> Self
    where
        R: AsyncRead + Send + Unpin + 'static,
        W: AsyncWrite + Send + Unpin + 'static,
    {
        let pending: PendingMap = Arc::new(StdMutex::new(Some(HashMap::new())));
        let reader = tokio::spawn(read_loop(reader, pending.clone()));

        Self {
            writer: Mutex::new(Box::new(writer)),
            pending,
            next_id: AtomicU64::new(1),
            reader,
            child: Mutex::new(None),
        }
    }

    /// Perform the `initialize` handshake
    pub async fn initialize(
        &self,
        client_name: &str,
        client_version: &str,
    ) -> Result<InitializeResult> {
        let result = self
            .request(
                "initialize",
                Some(initialize_params(client_name, client_version)),
            )
            .await?;
        let init: InitializeResult = serde_json::from_value(result)?;
        debug!(
            "connected to {} {} (protocol {})",
            init.server_info.name, init.server_info.version, init.protocol_version
        );

        self.notify("notifications/initialized", None).await?;
        Ok(init)
    }

    /// All tools the server exposes, following pagination
    pub async fn list_tools(&self) -> Result<Vec<McpTool>> {
        let mut tools = Vec::new();
        let mut cursor: Option<String> = None;

        loop {
            let params = cursor.as_ref().map(|c| json!({ "cursor": c }));
            let result = self.request("tools/list", params).await?;
            let page: ToolsListResult = serde_json::from_value(result)?;
            tools.extend(page.tools);

            match page.next_cursor {
                Some(next) if !next.is_empty() => cursor = Some(next),
                _ => break,
            }
        }

        Ok(tools)
    }

    /// Invoke a tool. Tool-level failures come back as `is_error`.
    pub async fn call_tool(&self, name: &str, arguments: Value) -> Result<CallToolResult> {
        let result = self
            .request(
                "tools/call",
                Some(json!({ "name": name, "arguments": arguments })),
            )
            .await?;
        Ok(serde_json::from_value(result)?)
    }

    /// Send a request and wait for the matching response
    pub async fn request(&self, method: &str, params: Option<Value>) -> Result<Value> {
        let id = self.next_id.fetch_add(1, Ordering::SeqCst);
        let (tx, rx) = oneshot::channel();

        {
            let mut guard = self.pending.lock().unwrap_or_else(|e| e.into_inner());
            match guard.as_mut() {
                Some(map) => map.insert(id, tx),
                None => return Err(McpError::Closed),
            };
        }

        trace!("-> {} #{}", method, id);
        if let Err(e) = self.send(&JsonRpcRequest::new(id, method, params)).await {
            self.forget(id);
            return Err(e);
        }

        let response = rx.await.map_err(|_| McpError::Closed)?;
        response.into_result()
    }

    /// Send a notification; no response is expected
    pub async fn notify(&self, method: &str, params: Option<Value>) -> Result<()> {
        self.send(&JsonRpcRequest::notification(method, params)).await
    }

    /// Whether the server output is still open
    pub fn is_connected(&self) -> bool {
        self.pending
            .lock()
            .map(|guard| guard.is_some())
            .unwrap_or(false)
    }

    /// Stop the reader and terminate the server process
    pub async fn shutdown(&self) {
        self.reader.abort();
        close_pending(&self.pending);

        if let Some(mut child) = self.child.lock().await.take() {
            if let Err(e) = child.kill().await {
                warn!("failed to stop tool server: {}", e);
            }
        }
    }

    async fn send(&self, message: &JsonRpcRequest) -> Result<()> {
        let mut line = serde_json::to_string(message)?;
        line.push('\n');

        let mut writer = self.writer.lock().await;
        writer.write_all(line.as_bytes()).await?;
        writer.flush().await?;
        Ok(())
    }

    fn forget(&self, id: u64) {
        let mut guard = self.pending.lock().unwrap_or_else(|e| e.into_inner());
        if let Some(map) = guard.as_mut() {
            map.remove(&id);
        }
    }
}

impl Drop for McpClient {
    fn drop(&mut self) {
        self.reader.abort();
    }
}

async fn read_loop<R>(reader: R, pending: PendingMap)
where
    R: AsyncRead + Unpin,
{
    let mut lines = BufReader::new(reader).lines();

    loop {
        match lines.next_line().await {
            Ok(Some(line)) => {
                let line = line.trim();
                if line.is_empty() {
                    continue;
                }
                match Incoming::parse(line) {
                    Ok(Incoming::Response(response)) => deliver(&pending, response),
                    Ok(Incoming::Notification { method }) => {
                        trace!("server notification: {}", method)
                    }
                    Ok(Incoming::Request { id, method }) => {
                        debug!("ignoring server request {} ({})", method, id)
                    }
                    Err(_) => debug!("skipping non-protocol output: {}", line),
                }
            }
            Ok(None) => {
                debug!("tool server closed its output");
                break;
            }
            Err(e) => {
                warn!("tool server read error: {}", e);
                break;
            }
        }
    }

    close_pending(&pending);
}

fn deliver(pending: &PendingMap, response: JsonRpcResponse) {
    let Some(id) = response.id.as_u64() else {
        debug!("response with foreign id {}", response.id);
        return;
    };

    let sender = {
        let mut guard = pending.lock().unwrap_or_else(|e| e.into_inner());
        guard.as_mut().and_then(|map| map.remove(&id))
    };

    match sender {
        Some(tx) => {
            let _ = tx.send(response);
        }
        None => debug!("response for unknown request #{}", id),
    }
}

/// Drop every waiting sender so callers observe `Closed`
fn close_pending(pending: &PendingMap) {
    let mut guard = pending.lock().unwrap_or_else(|e| e.into_inner());
    guard.take();
}
