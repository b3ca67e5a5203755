//! Test doubles shared by the server modules.

use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use serde_json::{json, Value};

use eventcast_core::source::{HttpFetch, HttpResponse, Result};

/// One GET issued against a [`FakeFetcher`].
#[derive(Debug, Clone, PartialEq)]
pub struct RecordedCall {
    pub url: String,
    pub query: Vec<(String, String)>,
}

impl RecordedCall {
    pub fn param(&self, name: &str) -> Option<&str> {
        self.query
            .iter()
            .find(|(key, _)| key == name)
            .map(|(_, value)| value.as_str())
    }
}

type Responder = Box<dyn Fn(&RecordedCall) -> HttpResponse + Send + Sync>;

/// Replays canned upstream responses and records every call.
pub struct FakeFetcher {
    responder: Mutex<Responder>,
    calls: Mutex<Vec<RecordedCall>>,
}

impl FakeFetcher {
    pub fn new(responder: impl Fn(&RecordedCall) -> HttpResponse + Send + Sync + 'static) -> Arc<Self> {
        Arc::new(Self {
            responder: Mutex::new(Box::new(responder)),
            calls: Mutex::new(Vec::new()),
        })
    }

    /// Always answers 200 with `body`.
    pub fn ok(body: impl Into<String>) -> Arc<Self> {
        let body = body.into();
        Self::new(move |_| HttpResponse::new(200, body.clone()))
    }

    /// Always answers with `status` and `body`.
    pub fn failing(status: u16, body: &'static str) -> Arc<Self> {
        Self::new(move |_| HttpResponse::new(status, body))
    }

    pub fn calls(&self) -> Vec<RecordedCall> {
        self.calls.lock().unwrap().clone()
    }

    pub fn call_count(&self) -> usize {
        self.calls.lock().unwrap().len()
    }
}

#[async_trait]
impl HttpFetch for FakeFetcher {
    async fn get(&self, url: &str, query: &[(String, String)]) -> Result<HttpResponse> {
        let call = RecordedCall {
            url: url.to_string(),
            query: query.to_vec(),
        };
        let response = {
            let responder = self.responder.lock().unwrap();
            (*responder)(&call)
        };
        self.calls.lock().unwrap().push(call);
        Ok(response)
    }
}

/// A raw connpass event record starting on the given day of January 2024.
pub fn connpass_event(id: i64, day: u32, title: &str) -> Value {
    json!({
        "event_id": id,
        "title": title,
        "catch": "",
        "description": format!("About {title}"),
        "event_url": format!("https://example.connpass.com/event/{id}/"),
        "hash_tag": "",
        "started_at": format!("2024-01-{day:02}T19:00:00+09:00"),
        "ended_at": format!("2024-01-{day:02}T21:00:00+09:00"),
        "updated_at": "2023-12-01T10:00:00+09:00",
        "limit": 30,
        "accepted": 10,
        "waiting": 0,
        "owner_display_name": "organizer",
        "place": "Community Hall",
        "address": "Yamanashi Kofu",
        "lat": "35.6622",
        "lon": "138.5683",
        "series": {"id": 42, "title": "Kofu.rs", "url": "https://kofurs.connpass.com/"}
    })
}

/// A connpass events page wrapping `events`.
pub fn connpass_page(events: Vec<Value>) -> String {
    json!({
        "results_returned": events.len(),
        "results_available": events.len(),
        "results_start": 1,
        "events": events,
    })
    .to_string()
}
