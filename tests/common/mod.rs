//! Shared test transport: scripted replies, recorded requests.

#![allow(dead_code)]

use std::collections::VecDeque;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use godpanel::platform::{MemoryNavigator, MemoryStore};
use godpanel::transport::{HttpRequest, HttpResponse, Transport, TransportError};
use godpanel::{ApiClient, ApiClientBuilder, CacheConfig, ClientConfig, RetryPolicy};
use serde_json::Value;
use tokio::time::Instant;

pub type Reply = Result<HttpResponse, TransportError>;

type Responder = Box<dyn Fn(&HttpRequest) -> Reply + Send + Sync>;

/// Transport answering from a closure and recording every attempt.
pub struct MockTransport {
    responder: Responder,
    latency: Duration,
    log: Mutex<Vec<(Instant, HttpRequest)>>,
}

impl MockTransport {
    pub fn new(responder: impl Fn(&HttpRequest) -> Reply + Send + Sync + 'static) -> Self {
        Self {
            responder: Box::new(responder),
            latency: Duration::ZERO,
            log: Mutex::new(Vec::new()),
        }
    }

    /// Always 200 with `body`.
    pub fn ok(body: Value) -> Self {
        Self::new(move |_| Ok(HttpResponse::new(200, body.clone())))
    }

    /// Always `status` with `body`.
    pub fn status(status: u16, body: Value) -> Self {
        Self::new(move |_| Ok(HttpResponse::new(status, body.clone())))
    }

    /// Replies in order; the last one repeats once the script runs out.
    pub fn scripted(replies: Vec<Reply>) -> Self {
        let queue = Mutex::new(VecDeque::from(replies));
        Self::new(move |_| {
            let mut queue = queue.lock().unwrap();
            if queue.len() > 1 {
                queue.pop_front().unwrap()
            } else {
                queue.front().cloned().expect("empty script")
            }
        })
    }

    /// Delay every reply by `latency`.
    pub fn with_latency(mut self, latency: Duration) -> Self {
        self.latency = latency;
        self
    }

    pub fn calls(&self) -> usize {
        self.log.lock().unwrap().len()
    }

    pub fn requests(&self) -> Vec<HttpRequest> {
        self.log.lock().unwrap().iter().map(|(_, r)| r.clone()).collect()
    }

    pub fn last_request(&self) -> HttpRequest {
        self.requests().pop().expect("no request recorded")
    }

    /// When each attempt reached the transport.
    pub fn call_times(&self) -> Vec<Instant> {
        self.log.lock().unwrap().iter().map(|(t, _)| *t).collect()
    }
}

#[async_trait]
impl Transport for MockTransport {
    fn name(&self) -> &str {
        "mock"
    }

    async fn send(&self, request: &HttpRequest) -> Reply {
        self.log
            .lock()
            .unwrap()
            .push((Instant::now(), request.clone()));
        if !self.latency.is_zero() {
            tokio::time::sleep(self.latency).await;
        }
        (self.responder)(request)
    }
}

pub fn ok(body: Value) -> Reply {
    Ok(HttpResponse::new(200, body))
}

pub fn status(status: u16) -> Reply {
    Ok(HttpResponse::new(status, Value::Null))
}

/// Everything a pipeline test wants to look at afterwards.
pub struct Harness {
    pub client: ApiClient,
    pub transport: Arc<MockTransport>,
    pub store: Arc<MemoryStore>,
    pub navigator: Arc<MemoryNavigator>,
}

impl Harness {
    pub fn new(transport: MockTransport) -> Self {
        Self::with(transport, |builder| builder)
    }

    /// Build with extra builder configuration applied on top of the defaults.
    pub fn with(
        transport: MockTransport,
        configure: impl FnOnce(ApiClientBuilder) -> ApiClientBuilder,
    ) -> Self {
        let transport = Arc::new(transport);
        let store = Arc::new(MemoryStore::new());
        let navigator = Arc::new(MemoryNavigator::new("/dashboard"));
        let builder = ApiClient::builder()
            .config(ClientConfig::new().cache(CacheConfig::new()))
            .transport(transport.clone())
            .store(store.clone())
            .navigator(navigator.clone());
        let client = configure(builder).build().expect("client builds");
        Self {
            client,
            transport,
            store,
            navigator,
        }
    }

    /// Harness whose client never retries.
    pub fn without_retries(transport: MockTransport) -> Self {
        Self::with(transport, |b| b.retry(RetryPolicy::disabled()))
    }
}
