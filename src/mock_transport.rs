//! This module provides a scripted [`Transport`], so that the SDK can be exercised without any network

use std::collections::HashMap;
use std::error::Error;
use std::sync::Mutex;

use async_trait::async_trait;
use serde_json::Value;

use crate::loader::{Response, Transport};
use crate::utils::lock;

/// What the mock will do when a given URL is requested
#[derive(Clone, Debug)]
enum MockBehaviour {
    Respond(Response),
    /// Simulate a connection failure
    Fail,
}

/// A request that has been received by a [`MockTransport`]
#[derive(Clone, Debug, PartialEq)]
pub struct RecordedRequest {
    pub url: String,
    pub authorization: String,
}

/// Answers requests from a table of canned responses, and records every request it receives.
///
/// URLs that have not been scripted get a `404`.
#[derive(Debug, Default)]
pub struct MockTransport {
    routes: Mutex<HashMap<String, MockBehaviour>>,
    requests: Mutex<Vec<RecordedRequest>>,
}

impl MockTransport {
    pub fn new() -> Self {
        Self::default()
    }

    /// Answer `url` with `status` and a JSON body. This replaces any previous behaviour for this URL.
    pub fn respond(&self, url: &str, status: u16, body: Value) {
        self.respond_raw(url, status, &body.to_string());
    }

    /// Answer `url` with `status` and an arbitrary body
    pub fn respond_raw(&self, url: &str, status: u16, body: &str) {
        let response = Response { status, body: body.to_string() };
        lock(&self.routes).insert(url.to_string(), MockBehaviour::Respond(response));
    }

    /// Make requests to `url` fail as if the server was unreachable
    pub fn fail(&self, url: &str) {
        lock(&self.routes).insert(url.to_string(), MockBehaviour::Fail);
    }

    pub fn requests(&self) -> Vec<RecordedRequest> {
        lock(&self.requests).clone()
    }

    /// How many times `url` has been requested
    pub fn request_count(&self, url: &str) -> usize {
        lock(&self.requests).iter().filter(|r| r.url == url).count()
    }

    pub fn clear_requests(&self) {
        lock(&self.requests).clear();
    }
}

#[async_trait]
impl Transport for MockTransport {
    async fn get(&self, url: &str, authorization: &str) -> Result<Response, Box<dyn Error + Send + Sync>> {
        lock(&self.requests).push(RecordedRequest {
            url: url.to_string(),
            authorization: authorization.to_string(),
        });

        let behaviour = lock(&self.routes).get(url).cloned();
        match behaviour {
            Some(MockBehaviour::Respond(response)) => {
                log::debug!("Mock transport: answering {} with {}", url, response.status);
                Ok(response)
            },
            Some(MockBehaviour::Fail) => {
                log::debug!("Mock transport: failing {}", url);
                Err(format!("Mocked connection failure for {}", url).into())
            },
            None => {
                log::debug!("Mock transport: {} is not scripted", url);
                Ok(Response { status: 404, body: String::from("{}") })
            },
        }
    }
}
