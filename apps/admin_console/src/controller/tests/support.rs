use std::{
    collections::{HashMap, VecDeque},
    sync::{Arc, Mutex},
};

use async_trait::async_trait;
use client_core::{decode_error_body, ConsoleTransport, RequestDescriptor, TransportError};
use url::Url;

use crate::page::Page;

use super::FragmentSwapController;

pub const BASE: &str = "http://console.local/openkim/";

pub const START_PAGE: &str = r#"<html><head>
<meta name="_csrf" content="t0k3n"/>
<meta name="_csrf_header" content="X-CSRF-TOKEN"/>
</head><body></body></html>"#;

pub enum Reply {
    Body(String),
    Fail(u16, String),
}

/// Transport that records every request and answers from per-route scripts.
/// Unscripted routes answer with an empty body.
#[derive(Default)]
pub struct FakeTransport {
    requests: Mutex<Vec<RequestDescriptor>>,
    replies: Mutex<HashMap<&'static str, VecDeque<Reply>>>,
}

impl FakeTransport {
    pub fn reply(&self, endpoint: &'static str, body: &str) {
        self.push(endpoint, Reply::Body(body.to_string()));
    }

    pub fn fail(&self, endpoint: &'static str, status: u16, body: &str) {
        self.push(endpoint, Reply::Fail(status, body.to_string()));
    }

    fn push(&self, endpoint: &'static str, reply: Reply) {
        self.replies
            .lock()
            .expect("replies")
            .entry(endpoint)
            .or_default()
            .push_back(reply);
    }

    pub fn requests(&self) -> Vec<RequestDescriptor> {
        self.requests.lock().expect("requests").clone()
    }

    pub fn names(&self) -> Vec<&'static str> {
        self.requests().iter().map(|r| r.endpoint.name()).collect()
    }
}

#[async_trait]
impl ConsoleTransport for FakeTransport {
    async fn send(&self, request: RequestDescriptor) -> Result<String, TransportError> {
        let name = request.endpoint.name();
        let shape = request.endpoint.error_body();
        self.requests.lock().expect("requests").push(request);
        let reply = self
            .replies
            .lock()
            .expect("replies")
            .get_mut(name)
            .and_then(VecDeque::pop_front);
        match reply {
            None => Ok(String::new()),
            Some(Reply::Body(body)) => Ok(body),
            Some(Reply::Fail(status, body)) => Err(decode_error_body(shape, name, status, body)),
        }
    }
}

/// Controller over a page that already carries the CSRF meta tags.
pub fn console() -> (FragmentSwapController, Arc<FakeTransport>) {
    let transport = Arc::new(FakeTransport::default());
    let mut page = Page::with_base(Url::parse(BASE).expect("url"));
    page.load_document(START_PAGE);
    page.record_patches(true);
    let controller = FragmentSwapController::new(transport.clone(), page).expect("controller");
    (controller, transport)
}
