//! End-to-end scenarios against a scripted debugger server on loopback.

use std::time::Duration;

use foxrdp::protocol::ActorMessage;
use foxrdp::{Error, Session, SessionConfig};
use foxrdp_runtime::{FrameReader, FrameWriter, TransportConfig};
use serde_json::json;
use tokio::net::TcpListener;
use tokio::net::tcp::{OwnedReadHalf, OwnedWriteHalf};
use tokio::sync::mpsc;

struct FakeServer {
	reader: FrameReader<OwnedReadHalf>,
	writer: FrameWriter<OwnedWriteHalf>,
}

impl FakeServer {
	async fn expect(&mut self, to: &str, kind: &str) -> ActorMessage {
		let message: ActorMessage = tokio::time::timeout(Duration::from_secs(2), self.reader.recv())
			.await
			.expect("timed out waiting for command")
			.unwrap();
		assert_eq!((message.to.as_str(), message.kind.as_str()), (to, kind));
		message
	}

	async fn push(&mut self, value: serde_json::Value) {
		self.writer.send(&value).await.unwrap();
	}
}

async fn connect() -> (Session, FakeServer) {
	let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
	let config = SessionConfig {
		port: listener.local_addr().unwrap().port(),
		..SessionConfig::default()
	};

	let (session, accepted) = tokio::join!(Session::connect(&config), listener.accept());
	let (socket, _) = accepted.unwrap();
	let (read_half, write_half) = socket.into_split();
	let server = FakeServer {
		reader: FrameReader::new(read_half, TransportConfig::default()),
		writer: FrameWriter::new(write_half, false),
	};
	(session.unwrap(), server)
}

async fn next_pulse(rx: &mut mpsc::Receiver<()>) {
	tokio::time::timeout(Duration::from_secs(2), rx.recv())
		.await
		.expect("timed out waiting for pulse")
		.expect("relay destination closed");
}

#[tokio::test]
async fn listing_then_navigation() {
	let (session, mut server) = connect().await;
	server
		.push(json!({"from": "root", "applicationType": "browser", "traits": {}}))
		.await;

	let (list_tx, mut list_rx) = mpsc::channel(4);
	session.root().tab_list_changed().register(&list_tx);

	session.begin().unwrap();
	server.expect("root", "listTabs").await;
	server
		.push(json!({
			"from": "root",
			"tabs": [{"actor": "tab1", "selected": true, "title": "A", "url": "http://a"}]
		}))
		.await;
	server.expect("tab1", "getTarget").await;
	next_pulse(&mut list_rx).await;

	let tabs = session.tabs();
	assert_eq!(tabs.len(), 1);
	let tab = tabs[0].clone();
	assert_eq!(tab.title(), "A");
	assert_eq!(tab.url(), "http://a");
	assert!(tab.selected());

	let (state_tx, mut state_rx) = mpsc::channel(4);
	tab.state_changed().register(&state_tx);

	server
		.push(json!({"from": "tab1", "type": "tabNavigated", "state": "start", "title": "A", "url": "http://a/next"}))
		.await;
	next_pulse(&mut state_rx).await;
	assert!(tab.navigating());

	server
		.push(json!({"from": "tab1", "type": "tabNavigated", "state": "stop", "title": "A", "url": "http://a/next"}))
		.await;
	server.expect("tab1", "getFavicon").await;
	next_pulse(&mut state_rx).await;
	assert!(!tab.navigating());
	assert_eq!(tab.url(), "http://a/next");

	let (icon_tx, mut icon_rx) = mpsc::channel(4);
	tab.favicon_changed().register(&icon_tx);
	server.push(json!({"from": "tab1", "favicon": [137, 80, 78, 71]})).await;
	next_pulse(&mut icon_rx).await;
	assert_eq!(tab.favicon().as_deref(), Some(&[137u8, 80, 78, 71][..]));

	session.close().await.unwrap();
}

#[tokio::test]
async fn frame_attach_and_focus() {
	let (session, mut server) = connect().await;
	session.begin().unwrap();
	server.expect("root", "listTabs").await;
	server
		.push(json!({"from": "root", "tabs": [{"actor": "tab1", "title": "A", "url": "http://a"}]}))
		.await;
	server.expect("tab1", "getTarget").await;

	let (state_tx, mut state_rx) = mpsc::channel(4);
	let tab = loop {
		if let Some(tab) = session.root().tab("tab1") {
			break tab;
		}
		tokio::time::sleep(Duration::from_millis(5)).await;
	};
	tab.state_changed().register(&state_tx);

	server
		.push(json!({"from": "tab1", "frame": {"actor": "frame1", "title": "A2", "url": "http://a"}}))
		.await;
	server.expect("frame1", "attach").await;
	next_pulse(&mut state_rx).await;
	assert_eq!(tab.title(), "A2");

	tab.set_focus().unwrap();
	server.expect("frame1", "focus").await;

	tab.navigate_to("http://b").unwrap();
	let navigate = server.expect("frame1", "navigateTo").await;
	assert_eq!(navigate.url, "http://b");

	session.close().await.unwrap();
}

#[tokio::test]
async fn server_hangup_is_reported() {
	let (session, server) = connect().await;
	drop(server);

	let result = tokio::time::timeout(Duration::from_secs(2), session.wait())
		.await
		.expect("dispatch loop did not stop");
	assert!(matches!(result, Err(Error::Closed)));
}

#[tokio::test]
async fn abandoned_wait_leaves_the_error_for_close() {
	let (session, server) = connect().await;
	let pending = tokio::time::timeout(Duration::ZERO, session.wait()).await;
	assert!(pending.is_err(), "loop ended before the server hung up");

	drop(server);
	tokio::time::sleep(Duration::from_millis(200)).await;

	let result = tokio::time::timeout(Duration::from_secs(2), session.close())
		.await
		.expect("close did not return");
	assert!(matches!(result, Err(Error::Closed)));
}

#[tokio::test]
async fn outcome_is_delivered_once() {
	let (session, server) = connect().await;
	let abandoned = tokio::select! {
		_ = session.wait() => false,
		_ = tokio::time::sleep(Duration::from_millis(20)) => true,
	};
	assert!(abandoned);

	drop(server);
	let first = tokio::time::timeout(Duration::from_secs(2), session.wait())
		.await
		.expect("dispatch loop did not stop");
	assert!(matches!(first, Err(Error::Closed)));
	assert!(session.wait().await.is_ok());
	assert!(session.close().await.is_ok());
}

#[tokio::test]
async fn connect_failure_is_a_connection_error() {
	let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
	let port = listener.local_addr().unwrap().port();
	drop(listener);

	let config = SessionConfig {
		port,
		..SessionConfig::default()
	};
	let result = Session::connect(&config).await;
	assert!(matches!(result, Err(Error::Connection(_))));
}
