#![allow(dead_code)]

use async_trait::async_trait;
use news_aggregator::{Extractor, Record, Transport, TransportError};
use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Mutex, Once};

static INIT: Once = Once::new();

pub fn init_tracing() {
    INIT.call_once(|| {
        tracing_subscriber::fmt()
            .with_max_level(tracing::Level::DEBUG)
            .with_test_writer()
            .try_init()
            .ok();
    });
}

pub const LIPUTAN6: &str = "https://www.liputan6.com/";
pub const BISNIS: &str = "https://www.bisnis.com/";

/// Replays a fixed list of results, then repeats `fallback` forever.
pub struct ScriptedTransport {
    script: Mutex<VecDeque<Result<String, TransportError>>>,
    fallback: Result<String, TransportError>,
    calls: AtomicUsize,
}

impl ScriptedTransport {
    pub fn new(
        script: Vec<Result<String, TransportError>>,
        fallback: Result<String, TransportError>,
    ) -> Self {
        Self {
            script: Mutex::new(script.into()),
            fallback,
            calls: AtomicUsize::new(0),
        }
    }

    pub fn always(result: Result<String, TransportError>) -> Self {
        Self::new(Vec::new(), result)
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl Transport for ScriptedTransport {
    async fn get(&self, _url: &str) -> Result<String, TransportError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let next = self.script.lock().unwrap().pop_front();
        next.unwrap_or_else(|| self.fallback.clone())
    }
}

/// Never answers; only the fetcher's own timeout ends a call.
#[derive(Default)]
pub struct HangingTransport {
    calls: AtomicUsize,
}

impl HangingTransport {
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl Transport for HangingTransport {
    async fn get(&self, _url: &str) -> Result<String, TransportError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        std::future::pending().await
    }
}

/// Panics on every call.
#[derive(Default)]
pub struct PanickingTransport {
    calls: AtomicUsize,
}

impl PanickingTransport {
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl Transport for PanickingTransport {
    async fn get(&self, _url: &str) -> Result<String, TransportError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        panic!("transport exploded");
    }
}

/// Returns the same records for every document.
pub struct StubExtractor {
    records: Vec<Record>,
    calls: AtomicUsize,
}

impl StubExtractor {
    pub fn new(records: Vec<Record>) -> Self {
        Self {
            records,
            calls: AtomicUsize::new(0),
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

impl Extractor for StubExtractor {
    fn name(&self) -> &str {
        "stub"
    }

    fn extract(&self, _raw_content: &str) -> Vec<Record> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.records.clone()
    }
}

/// Panics on every call.
#[derive(Default)]
pub struct PanickingExtractor {
    calls: AtomicUsize,
}

impl PanickingExtractor {
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

impl Extractor for PanickingExtractor {
    fn name(&self) -> &str {
        "panicking"
    }

    fn extract(&self, _raw_content: &str) -> Vec<Record> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        panic!("extractor exploded");
    }
}

pub fn site_a_record() -> Record {
    Record::new("SiteA", "T1", "D1", "2023-01-01").unwrap()
}

pub fn ok_body() -> Result<String, TransportError> {
    Ok("<html></html>".to_string())
}
