//! Session negotiation against an in-process listener that plays the server
//! side of the handshake.

use futures_util::{SinkExt, StreamExt};
use relay_proto::{FixedName, Handshake, NameSource, SessionError, Session, connect, framed};
use tokio::net::TcpListener;

/// Serves one handshake: rejects every candidate in `taken`, accepts the
/// first other one, then sends `after` as a regular line.
async fn serve_once(listener: TcpListener, taken: Vec<&'static str>, after: &'static str) {
    let (stream, _) = listener.accept().await.unwrap();
    let (mut reader, mut writer) = framed(stream, 512);

    writer.send(Handshake::Prompt(None).to_string()).await.unwrap();
    while let Some(Ok(candidate)) = reader.next().await {
        if taken.iter().any(|t| t.eq_ignore_ascii_case(&candidate)) {
            let reject = Handshake::Prompt(Some("Name is already taken.".into()));
            writer.send(reject.to_string()).await.unwrap();
            continue;
        }
        writer
            .send(Handshake::Accepted(candidate).to_string())
            .await
            .unwrap();
        writer.send(after.to_string()).await.unwrap();
        return;
    }
}

struct Scripted {
    names: Vec<&'static str>,
    reasons: Vec<Option<String>>,
}

#[async_trait::async_trait]
impl NameSource for Scripted {
    async fn next_name(&mut self, reason: Option<&str>) -> Result<String, SessionError> {
        self.reasons.push(reason.map(str::to_string));
        if self.names.is_empty() {
            return Err(SessionError::NoName);
        }
        Ok(self.names.remove(0).to_string())
    }
}

#[tokio::test]
async fn negotiation_retries_until_accepted() {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let port = listener.local_addr().unwrap().port();
    let server = tokio::spawn(serve_once(listener, vec!["alice"], "[SERVER]: welcome"));

    let stream = connect("127.0.0.1", port, &[]).await.unwrap();
    let mut names = Scripted {
        names: vec!["ALICE", "bob"],
        reasons: Vec::new(),
    };
    let session = Session::negotiate(stream, &mut names).await.unwrap();

    assert_eq!(session.name(), "bob");
    assert_eq!(
        names.reasons,
        vec![None, Some("Name is already taken.".to_string())]
    );

    let (mut reader, _writer) = session.split();
    assert_eq!(
        reader.next().await.unwrap().unwrap(),
        "[SERVER]: welcome"
    );
    server.await.unwrap();
}

#[tokio::test]
async fn fixed_name_gives_up_after_rejection() {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let port = listener.local_addr().unwrap().port();
    let server = tokio::spawn(serve_once(listener, vec!["ChatBot"], ""));

    let stream = connect("127.0.0.1", port, &[]).await.unwrap();
    let err = Session::negotiate(stream, &mut FixedName::new("chatbot"))
        .await
        .unwrap_err();
    assert!(matches!(err, SessionError::NameRejected(_)));

    server.abort();
}

#[tokio::test]
async fn connect_falls_back_to_listening_port() {
    let dead = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    let dead_port = dead.local_addr().unwrap().port();
    drop(dead);

    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let live_port = listener.local_addr().unwrap().port();

    let stream = connect("127.0.0.1", dead_port, &[live_port]).await.unwrap();
    assert_eq!(stream.peer_addr().unwrap().port(), live_port);
}

#[tokio::test]
async fn server_closing_mid_handshake_is_reported() {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let port = listener.local_addr().unwrap().port();
    let server = tokio::spawn(async move {
        let (stream, _) = listener.accept().await.unwrap();
        drop(stream);
    });

    let stream = connect("127.0.0.1", port, &[]).await.unwrap();
    server.await.unwrap();
    let err = Session::negotiate(stream, &mut FixedName::new("carol"))
        .await
        .unwrap_err();
    assert!(
        matches!(err, SessionError::Closed | SessionError::Io(_) | SessionError::Protocol(_)),
        "unexpected error: {err}"
    );
}
