//! Human I/O
//!
//! Every read or write to the terminal goes through `UserChannel`, which
//! holds an async mutex for the whole operation. A clarification question
//! and its reply therefore never interleave with tool activity lines
//! printed by concurrent dispatch tasks.

use async_trait::async_trait;
use std::sync::Arc;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader, Lines, Stdin, Stdout};
use tokio::sync::Mutex;
use tracing::warn;

/// Line-oriented text front-end
#[async_trait]
pub trait HumanIo: Send {
    async fn present(&mut self, text: &str);

    /// Show `prompt` and wait for one line; `None` at end of input
    async fn read_line(&mut self, prompt: &str) -> Option<String>;
}

/// Shared, serialized access to a `HumanIo`
#[derive(Clone)]
pub struct UserChannel {
    io: Arc<Mutex<Box<dyn HumanIo>>>,
}

impl UserChannel {
    pub fn new(io: impl HumanIo + 'static) -> Self {
        Self {
            io: Arc::new(Mutex::new(Box::new(io))),
        }
    }

    pub async fn say(&self, text: &str) {
        self.io.lock().await.present(text).await;
    }

    /// Present a question and wait for the reply under one lock
    pub async fn ask(&self, question: &str) -> Option<String> {
        let mut io = self.io.lock().await;
        io.present(question).await;
        io.read_line("> ").await
    }

    pub async fn prompt(&self, label: &str) -> Option<String> {
        self.io.lock().await.read_line(label).await
    }
}

/// Terminal front-end over tokio stdin/stdout
pub struct ConsoleIo {
    stdin: Lines<BufReader<Stdin>>,
    stdout: Stdout,
}

impl ConsoleIo {
    pub fn new() -> Self {
        Self {
            stdin: BufReader::new(tokio::io::stdin()).lines(),
            stdout: tokio::io::stdout(),
        }
    }

    async fn write(&mut self, text: &str) {
        let result = async {
            self.stdout.write_all(text.as_bytes()).await?;
            self.stdout.flush().await
        }
        .await;
        if let Err(e) = result {
            warn!("failed to write to stdout: {}", e);
        }
    }
}

impl Default for ConsoleIo {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl HumanIo for ConsoleIo {
    async fn present(&mut self, text: &str) {
        self.write(&format!("{}\n", text)).await;
    }

    async fn read_line(&mut self, prompt: &str) -> Option<String> {
        self.write(prompt).await;
        match self.stdin.next_line().await {
            Ok(line) => line,
            Err(e) => {
                warn!("failed to read stdin: {}", e);
                None
            }
        }
    }
}
