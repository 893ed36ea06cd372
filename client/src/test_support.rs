//! Scripted doubles shared by the unit tests.

use std::collections::{HashMap, VecDeque};
use std::sync::Mutex;
use std::time::Duration;

use bytes::Bytes;
use tokio::time::Instant;

use crate::fetch::{HttpTransport, RawResponse, TransportFuture};

#[derive(Debug, Clone)]
pub enum Reply {
    Response(RawResponse),
    Error(String),
    Hang,
}

impl Reply {
    pub fn status(status: u16, body: &str) -> Self {
        Self::Response(RawResponse {
            status,
            retry_after: None,
            body: Bytes::copy_from_slice(body.as_bytes()),
        })
    }

    pub fn json(body: &str) -> Self {
        Self::status(200, body)
    }

    pub fn bytes(body: Vec<u8>) -> Self {
        Self::Response(RawResponse {
            status: 200,
            retry_after: None,
            body: Bytes::from(body),
        })
    }
}

struct Call {
    url: String,
    at: Instant,
    headers: Vec<(&'static str, String)>,
}

#[derive(Default)]
pub struct ScriptedTransport {
    queued: Mutex<HashMap<String, VecDeque<Reply>>>,
    fallback: Mutex<HashMap<String, Reply>>,
    calls: Mutex<Vec<Call>>,
}

impl ScriptedTransport {
    /// Queue a one-shot reply for `url`.
    pub fn push(&self, url: &str, reply: Reply) {
        self.queued
            .lock()
            .unwrap()
            .entry(url.to_string())
            .or_default()
            .push_back(reply);
    }

    /// Reply used once the queue for `url` is drained.
    pub fn always(&self, url: &str, reply: Reply) {
        self.fallback.lock().unwrap().insert(url.to_string(), reply);
    }

    pub fn call_count(&self, url: &str) -> usize {
        self.calls
            .lock()
            .unwrap()
            .iter()
            .filter(|call| call.url == url)
            .count()
    }

    pub fn call_gaps(&self, url: &str) -> Vec<Duration> {
        let calls = self.calls.lock().unwrap();
        let times: Vec<Instant> = calls
            .iter()
            .filter(|call| call.url == url)
            .map(|call| call.at)
            .collect();
        times.windows(2).map(|pair| pair[1] - pair[0]).collect()
    }

    pub fn last_headers(&self) -> Vec<(&'static str, String)> {
        self.calls
            .lock()
            .unwrap()
            .last()
            .map(|call| call.headers.clone())
            .unwrap_or_default()
    }

    fn next_reply(&self, url: &str) -> Reply {
        if let Some(reply) = self
            .queued
            .lock()
            .unwrap()
            .get_mut(url)
            .and_then(VecDeque::pop_front)
        {
            return reply;
        }
        self.fallback
            .lock()
            .unwrap()
            .get(url)
            .cloned()
            .unwrap_or_else(|| Reply::Error(format!("no scripted reply for {url}")))
    }
}

impl HttpTransport for ScriptedTransport {
    fn get<'a>(
        &'a self,
        url: &'a str,
        headers: &'a [(&'static str, String)],
    ) -> TransportFuture<'a> {
        self.calls.lock().unwrap().push(Call {
            url: url.to_string(),
            at: Instant::now(),
            headers: headers.to_vec(),
        });
        let reply = self.next_reply(url);
        Box::pin(async move {
            match reply {
                Reply::Response(resp) => Ok(resp),
                Reply::Error(message) => Err(message),
                Reply::Hang => std::future::pending().await,
            }
        })
    }
}
