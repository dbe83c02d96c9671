use foxrdp_protocol::ActorMessage;
use tokio::io::{AsyncReadExt, AsyncWriteExt, duplex};

use super::*;

fn frame(value: &serde_json::Value) -> Vec<u8> {
	let body = serde_json::to_vec(value).unwrap();
	let mut out = format!("{}:", body.len()).into_bytes();
	out.extend_from_slice(&body);
	out
}

#[tokio::test]
async fn test_send_writes_decimal_length_prefix() {
	let (client, mut server) = duplex(1024);
	let mut writer = FrameWriter::new(client, false);

	writer
		.send(&ActorMessage::command("root", "listTabs"))
		.await
		.unwrap();
	drop(writer);

	let mut written = Vec::new();
	server.read_to_end(&mut written).await.unwrap();

	let expected = br#"{"to":"root","type":"listTabs"}"#;
	let mut framed = format!("{}:", expected.len()).into_bytes();
	framed.extend_from_slice(expected);
	assert_eq!(written, framed);
}

#[tokio::test]
async fn test_multiple_frames_in_sequence() {
	let (mut server, client) = duplex(4096);
	let mut reader = FrameReader::new(client, TransportConfig::default());

	let messages = vec![
		serde_json::json!({"from": "root", "type": "tabListChanged"}),
		serde_json::json!({"from": "tab1", "type": "tabNavigated", "state": "start"}),
		serde_json::json!({"from": "tab1", "type": "tabNavigated", "state": "stop"}),
	];
	for msg in &messages {
		server.write_all(&frame(msg)).await.unwrap();
	}

	for expected in &messages {
		let received: serde_json::Value = reader.recv().await.unwrap();
		assert_eq!(&received, expected);
	}
}

#[tokio::test]
async fn test_partial_reads_are_reassembled() {
	let (mut server, client) = duplex(4096);
	let mut reader = FrameReader::new(client, TransportConfig::default());

	let bytes = frame(&serde_json::json!({"from": "tab1", "title": "Split"}));
	let task = tokio::spawn(async move {
		for chunk in bytes.chunks(3) {
			server.write_all(chunk).await.unwrap();
			server.flush().await.unwrap();
			tokio::task::yield_now().await;
		}
		server
	});

	let msg: ActorMessage = reader.recv().await.unwrap();
	assert_eq!(msg.from, "tab1");
	assert_eq!(msg.title, "Split");
	let _ = task.await;
}

#[tokio::test]
async fn test_large_frame_grows_buffer() {
	let (mut server, client) = duplex(1024 * 1024);
	let mut reader = FrameReader::new(client, TransportConfig::default());
	assert_eq!(reader.buffer_len(), DEFAULT_INITIAL_BUFFER_LEN);

	let large_title = "x".repeat(100_000);
	let message = serde_json::json!({"from": "tab1", "title": large_title});
	server.write_all(&frame(&message)).await.unwrap();

	let small = serde_json::json!({"from": "tab1"});
	server.write_all(&frame(&small)).await.unwrap();

	let received: serde_json::Value = reader.recv().await.unwrap();
	assert_eq!(received, message);
	let grown = reader.buffer_len();
	assert!(grown > 100_000);

	// A smaller frame afterwards must reuse the grown buffer.
	let received: serde_json::Value = reader.recv().await.unwrap();
	assert_eq!(received, small);
	assert_eq!(reader.buffer_len(), grown);
}

#[tokio::test]
async fn test_malformed_length_prefix() {
	let (mut server, client) = duplex(1024);
	let mut reader = FrameReader::new(client, TransportConfig::default());

	server.write_all(b"12x:{}").await.unwrap();

	let result = reader.recv::<serde_json::Value>().await;
	assert!(matches!(result, Err(Error::Framing(_))), "got {result:?}");
}

#[tokio::test]
async fn test_empty_length_prefix() {
	let (mut server, client) = duplex(1024);
	let mut reader = FrameReader::new(client, TransportConfig::default());

	server.write_all(b":{}").await.unwrap();

	let result = reader.recv::<serde_json::Value>().await;
	assert!(matches!(result, Err(Error::Framing(_))));
}

#[tokio::test]
async fn test_length_over_limit_is_rejected() {
	let (mut server, client) = duplex(1024);
	let config = TransportConfig {
		max_frame_len: 16,
		..TransportConfig::default()
	};
	let mut reader = FrameReader::new(client, config);

	server.write_all(b"17:").await.unwrap();

	let result = reader.recv::<serde_json::Value>().await;
	assert!(matches!(result, Err(Error::Framing(msg)) if msg.contains("limit")));
}

#[tokio::test]
async fn test_truncated_payload() {
	let (mut server, client) = duplex(1024);
	let mut reader = FrameReader::new(client, TransportConfig::default());

	server.write_all(b"20:{\"from\":").await.unwrap();
	drop(server);

	let result = reader.recv::<serde_json::Value>().await;
	assert!(matches!(result, Err(Error::Framing(msg)) if msg.contains("20 byte")));
}

#[tokio::test]
async fn test_truncated_prefix() {
	let (mut server, client) = duplex(1024);
	let mut reader = FrameReader::new(client, TransportConfig::default());

	server.write_all(b"42").await.unwrap();
	drop(server);

	let result = reader.recv::<serde_json::Value>().await;
	assert!(matches!(result, Err(Error::Framing(_))));
}

#[tokio::test]
async fn test_clean_eof_reports_closed() {
	let (server, client) = duplex(1024);
	let mut reader = FrameReader::new(client, TransportConfig::default());
	drop(server);

	let result = reader.recv::<serde_json::Value>().await;
	assert!(matches!(result, Err(Error::Closed)));
}

#[tokio::test]
async fn test_invalid_json_payload() {
	let (mut server, client) = duplex(1024);
	let mut reader = FrameReader::new(client, TransportConfig::default());

	server.write_all(b"5:{nope").await.unwrap();

	let result = reader.recv::<ActorMessage>().await;
	assert!(matches!(result, Err(Error::Encoding(_))));
}

#[tokio::test]
async fn test_round_trip_over_tcp() {
	let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
	let port = listener.local_addr().unwrap().port();

	let server = tokio::spawn(async move {
		let (mut socket, _) = listener.accept().await.unwrap();
		socket
			.write_all(&frame(&serde_json::json!({"from": "root", "applicationType": "browser"})))
			.await
			.unwrap();
		let mut buf = vec![0u8; 34];
		socket.read_exact(&mut buf).await.unwrap();
		buf
	});

	let (mut reader, mut writer) = dial("127.0.0.1", port, TransportConfig::default())
		.await
		.unwrap();
	let greeting: ActorMessage = reader.recv().await.unwrap();
	assert_eq!(greeting.from, "root");

	writer
		.send(&ActorMessage::command("root", "listTabs"))
		.await
		.unwrap();
	let written = server.await.unwrap();
	assert!(written.starts_with(b"31:"));
}
