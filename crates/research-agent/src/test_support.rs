//! Test doubles shared by the unit tests

use async_trait::async_trait;
use research_llm::{CompletionRequest, CompletionResponse, LLMError, LLMProvider};
use std::sync::Mutex;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpListener;

/// LLM provider that returns one fixed reply and records every request
pub(crate) struct ScriptedProvider {
    reply: Option<String>,
    requests: Mutex<Vec<CompletionRequest>>,
}

impl ScriptedProvider {
    pub(crate) fn replying(reply: impl Into<String>) -> Self {
        Self {
            reply: Some(reply.into()),
            requests: Mutex::new(Vec::new()),
        }
    }

    /// Every call fails as if the model endpoint were down
    pub(crate) fn failing() -> Self {
        Self {
            reply: None,
            requests: Mutex::new(Vec::new()),
        }
    }

    pub(crate) fn requests(&self) -> Vec<CompletionRequest> {
        self.requests.lock().unwrap().clone()
    }
}

#[async_trait]
impl LLMProvider for ScriptedProvider {
    async fn complete(&self, request: CompletionRequest) -> research_llm::Result<CompletionResponse> {
        self.requests.lock().unwrap().push(request);
        match &self.reply {
            Some(reply) => Ok(CompletionResponse::from_text(reply.clone())),
            None => Err(LLMError::RequestFailed("connection refused".to_string())),
        }
    }

    fn name(&self) -> &str {
        "scripted"
    }
}

/// Serve `count` HTTP requests with the same canned response
///
/// Returns the base URL (`http://127.0.0.1:<port>`) and a handle resolving
/// to the raw request heads that were received.
pub(crate) async fn serve_canned(
    status: &str,
    content_type: &str,
    body: &str,
    count: usize,
) -> (String, tokio::task::JoinHandle<Vec<String>>) {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();

    let response = format!(
        "HTTP/1.1 {status}\r\nContent-Type: {content_type}\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{body}",
        body.len()
    );

    let handle = tokio::spawn(async move {
        let mut heads = Vec::with_capacity(count);
        for _ in 0..count {
            let (mut socket, _) = listener.accept().await.unwrap();
            let mut buf = vec![0u8; 8192];
            let mut read = 0;
            // Read until the end of the request head; GET requests carry no body
            loop {
                let n = socket.read(&mut buf[read..]).await.unwrap();
                read += n;
                if n == 0 || buf[..read].windows(4).any(|w| w == b"\r\n\r\n") || read == buf.len() {
                    break;
                }
            }
            heads.push(String::from_utf8_lossy(&buf[..read]).into_owned());
            socket.write_all(response.as_bytes()).await.unwrap();
            socket.shutdown().await.ok();
        }
        heads
    });

    (format!("http://{addr}"), handle)
}

/// Base URL of a port nothing listens on
pub(crate) async fn refused_base_url() -> String {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);
    format!("http://{addr}")
}
