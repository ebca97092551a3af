//! In-memory requester for unit tests

use async_trait::async_trait;
use std::collections::{HashMap, VecDeque};
use std::sync::Mutex;

use super::QueryParams;
use super::http::{HttpResponse, Requester};

/// Answers by URL (query string ignored). One-shot responses are consumed
/// first, then the standing response; unknown URLs get `None`.
#[derive(Default)]
pub(crate) struct ScriptedRequester {
    once: Mutex<HashMap<String, VecDeque<Option<HttpResponse>>>>,
    standing: Mutex<HashMap<String, HttpResponse>>,
    calls: Mutex<Vec<(String, QueryParams)>>,
}

impl ScriptedRequester {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn respond(&self, url: &str, response: HttpResponse) {
        self.standing
            .lock()
            .unwrap()
            .insert(url.to_string(), response);
    }

    pub(crate) fn respond_json(&self, url: &str, body: serde_json::Value) {
        self.respond(url, HttpResponse::new(200, body.to_string()));
    }

    pub(crate) fn respond_once(&self, url: &str, response: Option<HttpResponse>) {
        self.once
            .lock()
            .unwrap()
            .entry(url.to_string())
            .or_default()
            .push_back(response);
    }

    pub(crate) fn calls(&self, url: &str) -> usize {
        self.calls
            .lock()
            .unwrap()
            .iter()
            .filter(|(called, _)| called == url)
            .count()
    }

    pub(crate) fn params_for(&self, url: &str) -> Vec<QueryParams> {
        self.calls
            .lock()
            .unwrap()
            .iter()
            .filter(|(called, _)| called == url)
            .map(|(_, params)| params.clone())
            .collect()
    }
}

#[async_trait]
impl Requester for ScriptedRequester {
    async fn get(&self, url: &str, params: &QueryParams) -> Option<HttpResponse> {
        self.calls
            .lock()
            .unwrap()
            .push((url.to_string(), params.clone()));

        if let Some(queued) = self
            .once
            .lock()
            .unwrap()
            .get_mut(url)
            .and_then(|queue| queue.pop_front())
        {
            return queued;
        }

        self.standing.lock().unwrap().get(url).cloned()
    }
}
