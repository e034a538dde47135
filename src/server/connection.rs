//! Connection handling
//!
//! Manages one client connection: reads protocol lines, maps each request to
//! exactly one engine call and writes the formatted response.

use crate::protocol::{parse_line, ParseError, Request};
use crate::snapshot;
use crate::store::StoreEngine;
use anyhow::bail;
use bytes::BytesMut;
use std::path::Path;
use std::sync::Arc;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpStream;
use tracing::debug;

const PROMPT: &str = "idis> ";

const HELP_TEXT: &str = "Available commands:\n\
    SET key value1 [value2 ...]\n\
    SETUQ key value1 [value2 ...]\n\
    GET key\n\
    GETUQ key\n\
    GETKEY value\n\
    DELETE key\n\
    REMOVE key value\n\
    EXISTS key\n\
    EXPIRE key ttl_in_seconds\n\
    TTL key\n\
    RAND key count\n\
    DELALL\n\
    DUMP filepath\n\
    LOADDUMP filepath\n\
    HELP\n\
    EXIT\n";

/// Connection handler
pub struct Connection {
    /// TCP stream
    stream: TcpStream,

    /// Read buffer; complete lines are extracted as they arrive
    read_buffer: BytesMut,
}

impl Connection {
    /// Create a new connection handler
    pub fn new(stream: TcpStream) -> Self {
        Connection {
            stream,
            read_buffer: BytesMut::with_capacity(4096),
        }
    }

    /// Handle the connection
    ///
    /// Reads lines from the client, dispatches them to the engine and sends
    /// responses until the client disconnects or sends EXIT.
    pub async fn handle(&mut self, engine: Arc<StoreEngine>) -> anyhow::Result<()> {
        self.send(PROMPT).await?;

        loop {
            let n = self.stream.read_buf(&mut self.read_buffer).await?;

            // Connection closed
            if n == 0 {
                if self.read_buffer.is_empty() {
                    return Ok(());
                }
                bail!("connection reset by peer");
            }

            while let Some(line) = next_line(&mut self.read_buffer) {
                debug!("Received line: {}", line);

                match parse_line(&line) {
                    Ok(Request::Exit) => {
                        self.send("Bye!\n").await?;
                        return Ok(());
                    }
                    Ok(request) => {
                        let response = apply(&engine, request);
                        self.send(&response).await?;
                    }
                    Err(ParseError::Empty) => {}
                    Err(e) => {
                        self.send(&format!("{}\n", e)).await?;
                    }
                }

                self.send(PROMPT).await?;
            }
        }
    }

    /// Write a response to the client
    async fn send(&mut self, response: &str) -> anyhow::Result<()> {
        self.stream.write_all(response.as_bytes()).await?;
        self.stream.flush().await?;
        Ok(())
    }
}

/// Extract the next complete line from the buffer, if any
fn next_line(buffer: &mut BytesMut) -> Option<String> {
    let newline = buffer.iter().position(|&b| b == b'\n')?;
    let line = buffer.split_to(newline + 1);
    let text = String::from_utf8_lossy(&line[..newline]);
    Some(text.trim_end_matches('\r').to_string())
}

/// Execute one request against the engine and format the response
pub fn apply(engine: &StoreEngine, request: Request) -> String {
    match request {
        Request::Set { key, values } => {
            engine.set(&key, values);
            "OK\n".to_string()
        }
        Request::SetUnique { key, values } => {
            engine.set_unique(&key, values);
            "OK\n".to_string()
        }
        Request::Get { key } => match engine.get(&key) {
            Ok(values) => format!("Values: {}\n", values.join(", ")),
            Err(e) => format!("{}\n", e),
        },
        Request::GetUnique { key } => match engine.get_unique(&key) {
            Ok(values) => format!("Values: {}\n", values.join(", ")),
            Err(e) => format!("{}\n", e),
        },
        Request::GetKey { value } => match engine.keys_for_value(&value) {
            Ok(keys) => format!("Keys: {}\n", keys.join(", ")),
            Err(e) => format!("{}\n", e),
        },
        Request::Delete { key } => match engine.delete(&key) {
            Ok(()) => "Deleted\n".to_string(),
            Err(e) => format!("{}\n", e),
        },
        Request::Remove { key, value } => match engine.remove_value(&key, &value) {
            Ok(()) => "Removed\n".to_string(),
            Err(e) => format!("{}\n", e),
        },
        Request::Exists { key } => {
            if engine.exists(&key) {
                "1\n".to_string()
            } else {
                "0\n".to_string()
            }
        }
        Request::Expire { key, ttl } => match engine.expire(&key, ttl) {
            Ok(()) => "OK\n".to_string(),
            Err(e) => format!("{}\n", e),
        },
        Request::Ttl { key } => match engine.ttl(&key) {
            Ok(remaining) => format!("TTL: {} seconds\n", remaining.as_secs()),
            Err(e) => format!("{}\n", e),
        },
        Request::Rand { key, count } => match engine.random_values(&key, count) {
            Ok(values) => format!("Values: {}\n", values.join(", ")),
            Err(e) => format!("{}\n", e),
        },
        Request::DeleteAll => {
            engine.delete_all();
            "OK\n".to_string()
        }
        Request::Dump { path } => match snapshot::dump_to_file(engine, Path::new(&path)) {
            Ok(()) => format!("Data dumped to file: {}\n", path),
            Err(e) => format!("{}\n", e),
        },
        Request::LoadDump { path } => match snapshot::load_from_dump(engine, Path::new(&path)) {
            Ok(()) => format!("Data successfully loaded from file: {}\n", path),
            Err(e) => format!("{}\n", e),
        },
        Request::Help => HELP_TEXT.to_string(),
        Request::Exit => "Bye!\n".to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[test]
    fn test_next_line_handles_partial_and_crlf() {
        let mut buffer = BytesMut::from(&b"GET fr"[..]);
        assert_eq!(next_line(&mut buffer), None);

        buffer.extend_from_slice(b"uits\r\nEXISTS k\n");
        assert_eq!(next_line(&mut buffer), Some("GET fruits".to_string()));
        assert_eq!(next_line(&mut buffer), Some("EXISTS k".to_string()));
        assert_eq!(next_line(&mut buffer), None);
    }

    #[test]
    fn test_apply_set_get_remove_flow() {
        let engine = StoreEngine::new();

        let response = apply(&engine, parse_line("SET fruits apple banana").unwrap());
        assert_eq!(response, "OK\n");

        let response = apply(&engine, parse_line("GET fruits").unwrap());
        assert_eq!(response, "Values: apple, banana\n");

        let response = apply(&engine, parse_line("REMOVE fruits apple").unwrap());
        assert_eq!(response, "Removed\n");

        let response = apply(&engine, parse_line("GETKEY banana").unwrap());
        assert_eq!(response, "Keys: fruits\n");
    }

    #[test]
    fn test_apply_surfaces_engine_errors() {
        let engine = StoreEngine::new();

        assert_eq!(
            apply(&engine, parse_line("GET missing").unwrap()),
            "key not found\n"
        );
        assert_eq!(apply(&engine, parse_line("EXISTS missing").unwrap()), "0\n");

        engine.set("k", vec!["a".to_string(), "b".to_string()]);
        assert_eq!(
            apply(&engine, parse_line("RAND k 5").unwrap()),
            "invalid count value\n"
        );
    }

    #[test]
    fn test_apply_expire_then_ttl() {
        let engine = StoreEngine::new();
        engine.set("k", vec!["a".to_string()]);

        assert_eq!(
            apply(
                &engine,
                Request::Expire {
                    key: "k".to_string(),
                    ttl: Duration::ZERO,
                },
            ),
            "OK\n"
        );
        assert_eq!(
            apply(&engine, parse_line("TTL k").unwrap()),
            "key has expired\n"
        );
        assert_eq!(apply(&engine, parse_line("EXISTS k").unwrap()), "0\n");
    }

    #[test]
    fn test_apply_dump_and_loaddump() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("dump.json");
        let path_str = path.display().to_string();

        let engine = StoreEngine::new();
        engine.set("k", vec!["v".to_string()]);

        let response = apply(&engine, Request::Dump { path: path_str.clone() });
        assert!(response.starts_with("Data dumped to file:"));

        engine.delete_all();
        let response = apply(&engine, Request::LoadDump { path: path_str });
        assert!(response.starts_with("Data successfully loaded"));
        assert_eq!(engine.get("k").unwrap(), vec!["v".to_string()]);
    }
}
