//! Shared fakes for integration tests.
#![allow(dead_code)]

use async_trait::async_trait;
use price_cache::{CacheBackend, CacheKey, Error, ErrorContext, PredictionError, PredictionRequest, PredictionService, Price};
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Mutex;
use std::time::Duration;

/// Backend that records every write and can be switched into failure modes.
#[derive(Default)]
pub struct FakeCache {
    entries: Mutex<HashMap<String, String>>,
    writes: Mutex<Vec<(String, String, Option<Duration>)>>,
    pub fail_reads: AtomicBool,
    pub fail_writes: AtomicBool,
    pub reads: AtomicUsize,
}

impl FakeCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn seed(&self, key: &str, value: &str) {
        self.entries
            .lock()
            .unwrap()
            .insert(key.to_string(), value.to_string());
    }

    pub fn value(&self, key: &str) -> Option<String> {
        self.entries.lock().unwrap().get(key).cloned()
    }

    pub fn writes(&self) -> Vec<(String, String, Option<Duration>)> {
        self.writes.lock().unwrap().clone()
    }

    fn down() -> Error {
        Error::cache_with_context("connection reset", ErrorContext::new().with_source("fake_cache"))
    }
}

#[async_trait]
impl CacheBackend for FakeCache {
    async fn get(&self, key: &CacheKey) -> price_cache::Result<Option<String>> {
        self.reads.fetch_add(1, Ordering::SeqCst);
        if self.fail_reads.load(Ordering::SeqCst) {
            return Err(Self::down());
        }
        Ok(self.value(key.as_str()))
    }

    async fn set(&self, key: &CacheKey, value: &str, ttl: Option<Duration>) -> price_cache::Result<()> {
        self.writes
            .lock()
            .unwrap()
            .push((key.to_string(), value.to_string(), ttl));
        if self.fail_writes.load(Ordering::SeqCst) {
            return Err(Self::down());
        }
        self.seed(key.as_str(), value);
        Ok(())
    }

    async fn delete(&self, key: &CacheKey) -> price_cache::Result<bool> {
        Ok(self.entries.lock().unwrap().remove(key.as_str()).is_some())
    }

    fn name(&self) -> &'static str {
        "fake"
    }
}

/// Inference service that returns a scripted outcome and counts calls.
pub struct ScriptedService {
    outcome: Result<f64, PredictionError>,
    delay: Duration,
    calls: AtomicUsize,
    seen: Mutex<Vec<PredictionRequest>>,
}

impl ScriptedService {
    pub fn returning(raw: f64) -> Self {
        Self::new(Ok(raw))
    }

    pub fn failing(err: PredictionError) -> Self {
        Self::new(Err(err))
    }

    fn new(outcome: Result<f64, PredictionError>) -> Self {
        Self {
            outcome,
            delay: Duration::ZERO,
            calls: AtomicUsize::new(0),
            seen: Mutex::new(Vec::new()),
        }
    }

    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn seen(&self) -> Vec<PredictionRequest> {
        self.seen.lock().unwrap().clone()
    }
}

#[async_trait]
impl PredictionService for ScriptedService {
    async fn predict(&self, request: &PredictionRequest) -> Result<Price, PredictionError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.seen.lock().unwrap().push(request.clone());
        if !self.delay.is_zero() {
            tokio::time::sleep(self.delay).await;
        }
        match &self.outcome {
            Ok(raw) => Price::from_f64(*raw).ok_or_else(|| {
                PredictionError::internal_with_context("not finite", ErrorContext::new())
            }),
            Err(e) => Err(e.clone()),
        }
    }
}

pub fn sample_request() -> PredictionRequest {
    PredictionRequest::new(3, "A1", 1500.0, 1950)
}
