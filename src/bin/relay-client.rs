//! Terminal client for relayd.
//!
//! Prompts for a name, then prints server lines while sending whatever is
//! typed. Typing `exit` leaves. The process always exits with status 1.

use async_trait::async_trait;
use futures_util::{SinkExt, StreamExt};
use relay_proto::cli::{ClientOptions, PORT_POOL};
use relay_proto::{NameSource, Session, SessionError, connect};
use tokio::io::{AsyncBufReadExt, BufReader, Lines, Stdin};
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

type TerminalLines = Lines<BufReader<Stdin>>;

/// Reads candidate names from the terminal, showing the server's reason
/// for each rejection.
struct TerminalNames<'a> {
    input: &'a mut TerminalLines,
}

#[async_trait]
impl<'a> NameSource for TerminalNames<'a> {
    async fn next_name(&mut self, reason: Option<&str>) -> Result<String, SessionError> {
        if let Some(reason) = reason {
            println!("{reason}");
        }
        println!("Enter a name (leave blank to join anonymously):");
        match self.input.next_line().await? {
            Some(name) => Ok(name),
            None => Err(SessionError::NoName),
        }
    }
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let options = ClientOptions::from_args(std::env::args().skip(1));
    if let Err(e) = run(&options).await {
        error!(error = %e, "Client stopped");
        println!("Disconnected: {e}");
    }

    // Stdin may still be blocked in a read; leave without joining it.
    std::process::exit(1);
}

async fn run(options: &ClientOptions) -> anyhow::Result<()> {
    let stream = connect(&options.host, options.port, &PORT_POOL).await?;
    let mut input = BufReader::new(tokio::io::stdin()).lines();

    let session = Session::negotiate(stream, &mut TerminalNames { input: &mut input }).await?;
    info!(name = session.name(), peer = %session.peer_addr(), "Joined");
    let (mut reader, mut writer) = session.split();

    let incoming = async {
        while let Some(line) = reader.next().await {
            let line = line?;
            if !line.trim().is_empty() {
                println!("{line}");
            }
        }
        println!("Server has shut down.");
        anyhow::Ok(())
    };

    let outgoing = async {
        while let Some(line) = input.next_line().await? {
            let leaving = line.trim().eq_ignore_ascii_case("exit");
            writer.send(line).await?;
            if leaving {
                break;
            }
        }
        anyhow::Ok(())
    };

    tokio::select! {
        result = incoming => result,
        result = outgoing => result,
    }
}
