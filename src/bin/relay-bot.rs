//! Canned-response bot for relayd.
//!
//! Joins under a fixed name and answers broadcasts of the form
//! `bot <command>`. A refused name or a closed connection ends the process
//! with status 1.

use std::net::SocketAddr;

use futures_util::{SinkExt, StreamExt};
use relay_proto::cli::{ClientOptions, PORT_POOL};
use relay_proto::{ChatLine, FixedName, Session, connect};
use tracing::{debug, error, info};
use tracing_subscriber::EnvFilter;

const BOT_PREFIX: &str = "[BOT] ";

/// Build the bot's answer to one server line, if it is addressed to the bot.
fn reply(line: &str, host: &str, server: SocketAddr) -> Option<Vec<String>> {
    let chat = ChatLine::parse(line)?;
    let mut words = chat.text.split_whitespace();
    if !words.next()?.eq_ignore_ascii_case("bot") {
        return None;
    }

    let lines = match words.next()?.to_lowercase().as_str() {
        "help" => vec![
            "Hey! You can get responses from me by typing \"bot <command>\".".to_string(),
            "Commands available:".to_string(),
            "\"bot help\" - I will send this message.".to_string(),
            "\"bot hello\" - I will say hello back!".to_string(),
            "\"bot server_details\" - I will give you information about the server.".to_string(),
        ],
        "hello" => vec!["Hello! How's your day been so far? :)".to_string()],
        "server_details" => vec![
            format!("Name of the host: {host}"),
            format!("IP address of the server: {}", server.ip()),
            format!("The port you are connected to: {}", server.port()),
        ],
        _ => vec![
            "Invalid command. Type in \"bot help\" to see a list of available commands."
                .to_string(),
        ],
    };

    Some(lines.into_iter().map(|l| format!("{BOT_PREFIX}{l}")).collect())
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let options = ClientOptions::from_args(std::env::args().skip(1));
    if let Err(e) = run(&options).await {
        error!(error = %e, "Bot stopped");
        println!("Disconnected: {e}");
    }
    std::process::exit(1);
}

async fn run(options: &ClientOptions) -> anyhow::Result<()> {
    let stream = connect(&options.host, options.port, &PORT_POOL).await?;
    let session = Session::negotiate(stream, &mut FixedName::new(&options.bot_name)).await?;
    let server = session.peer_addr();
    info!(name = session.name(), %server, "Bot joined");

    let (mut reader, mut writer) = session.split();
    while let Some(line) = reader.next().await {
        let line = line?;
        if let Some(answer) = reply(&line, &options.host, server) {
            debug!(request = %line, "Answering");
            for out in answer {
                writer.feed(out).await?;
            }
            writer.flush().await?;
        }
    }

    println!("Server has shut down.");
    Ok(())
}
