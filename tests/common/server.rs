//! Test server management.
//!
//! Spawns relayd on an ephemeral port with a throwaway config and word list,
//! and exposes its console (stdin/stdout).

use std::net::SocketAddr;
use std::process::{ExitStatus, Stdio};
use std::time::Duration;

use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader, Lines};
use tokio::process::{Child, ChildStdin, ChildStdout, Command};
use tokio::time::timeout;

use super::client::TestClient;

const STARTUP_TIMEOUT: Duration = Duration::from_secs(10);
const CONSOLE_TIMEOUT: Duration = Duration::from_secs(5);

/// A running relayd process.
pub struct TestServer {
    child: Child,
    console_in: ChildStdin,
    console_out: Lines<BufReader<ChildStdout>>,
    addr: SocketAddr,
    _dir: tempfile::TempDir,
}

impl TestServer {
    /// Spawn a server that filters `bad_words`.
    pub async fn spawn(bad_words: &[&str]) -> anyhow::Result<Self> {
        let dir = tempfile::tempdir()?;

        let words_path = dir.path().join("bad_words.txt");
        std::fs::write(&words_path, bad_words.join("\n"))?;

        let config_path = dir.path().join("relayd.toml");
        let config = format!(
            r#"
[server]
name = "test.relay"

[listen]
host = "127.0.0.1"
port = 0
fallback_ports = []

[moderation]
word_list = "{}"
warning_threshold = 3
"#,
            words_path.display()
        );
        std::fs::write(&config_path, config)?;

        let mut child = Command::new(env!("CARGO_BIN_EXE_relayd"))
            .arg("-conf")
            .arg(&config_path)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::null())
            .kill_on_drop(true)
            .spawn()?;

        let console_in = child
            .stdin
            .take()
            .ok_or_else(|| anyhow::anyhow!("no stdin"))?;
        let stdout = child
            .stdout
            .take()
            .ok_or_else(|| anyhow::anyhow!("no stdout"))?;
        let mut console_out = BufReader::new(stdout).lines();

        // The first console line announces the bound address.
        let addr = loop {
            let line = timeout(STARTUP_TIMEOUT, console_out.next_line())
                .await??
                .ok_or_else(|| anyhow::anyhow!("server exited during startup"))?;
            if let Some(addr) = line.strip_prefix("Server listening on ") {
                break addr.parse()?;
            }
        };

        Ok(Self {
            child,
            console_in,
            console_out,
            addr,
            _dir: dir,
        })
    }

    #[allow(dead_code)]
    pub fn address(&self) -> SocketAddr {
        self.addr
    }

    /// Connect, register under `name` and consume the welcome lines.
    pub async fn join(&self, name: &str) -> anyhow::Result<TestClient> {
        let mut client = TestClient::connect(self.addr).await?;
        client.negotiate(name).await?;
        client
            .recv_until(|l| l == "[SERVER]: Type \"exit\" to leave.")
            .await?;
        Ok(client)
    }

    /// Type one line into the operator console.
    #[allow(dead_code)]
    pub async fn admin(&mut self, line: &str) -> anyhow::Result<()> {
        self.console_in.write_all(line.as_bytes()).await?;
        self.console_in.write_all(b"\n").await?;
        self.console_in.flush().await?;
        Ok(())
    }

    /// Read console output until a line satisfies `predicate`.
    #[allow(dead_code)]
    pub async fn console_until<F>(&mut self, mut predicate: F) -> anyhow::Result<Vec<String>>
    where
        F: FnMut(&str) -> bool,
    {
        let mut lines = Vec::new();
        loop {
            let line = timeout(CONSOLE_TIMEOUT, self.console_out.next_line())
                .await??
                .ok_or_else(|| anyhow::anyhow!("console closed; saw {lines:?}"))?;
            let done = predicate(&line);
            lines.push(line);
            if done {
                return Ok(lines);
            }
        }
    }

    /// Run `/servershutdown` and wait for the process to exit.
    #[allow(dead_code)]
    pub async fn shutdown(mut self) -> anyhow::Result<(Vec<String>, ExitStatus)> {
        self.admin("/servershutdown").await?;
        let lines = self.console_until(|l| l == "Server successfully shut down.").await?;
        let status = timeout(STARTUP_TIMEOUT, self.child.wait()).await??;
        Ok((lines, status))
    }
}
