use async_trait::async_trait;
use reqwest::Client;
use tracing::{debug, warn};

pub mod csrf;
pub mod endpoint;
pub mod error;
pub mod request;

pub use csrf::CsrfToken;
pub use endpoint::{Endpoint, ErrorBody, Method, PayloadKind};
pub use error::{decode_error_body, TransportError};
pub use request::{FilePart, MultipartForm, Payload, RequestDescriptor};

/// Seam between the console controller and the server. A successful call
/// yields the response body: a markup fragment, or text the caller ignores.
#[async_trait]
pub trait ConsoleTransport: Send + Sync {
    async fn send(&self, request: RequestDescriptor) -> Result<String, TransportError>;
}

pub struct HttpTransport {
    http: Client,
}

impl HttpTransport {
    /// Client with a cookie store so the server session survives between
    /// calls.
    pub fn new() -> reqwest::Result<Self> {
        let http = Client::builder().cookie_store(true).build()?;
        Ok(Self { http })
    }
}

#[async_trait]
impl ConsoleTransport for HttpTransport {
    async fn send(&self, request: RequestDescriptor) -> Result<String, TransportError> {
        let RequestDescriptor {
            endpoint,
            method,
            url,
            payload,
            csrf,
        } = request;
        let name = endpoint.name();
        let network = |detail: String| TransportError::Network {
            endpoint: name,
            detail,
        };

        let mut builder = match method {
            Method::Get => self.http.get(url.clone()),
            Method::Post => self.http.post(url.clone()),
        };
        if let Some(csrf) = &csrf {
            builder = builder.header(csrf.header_name.as_str(), csrf.value.as_str());
        }
        builder = match payload {
            Payload::Empty => builder,
            Payload::Json(value) => builder.json(&value),
            Payload::Form(pairs) => builder.form(&pairs),
            Payload::Multipart(form) => {
                builder.multipart(form.into_reqwest().map_err(|e| network(e.to_string()))?)
            }
        };

        debug!(endpoint = name, method = method.as_str(), %url, "console request");
        let response = builder.send().await.map_err(|e| network(e.to_string()))?;
        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| network(format!("failed to read response body: {e}")))?;

        if status.is_success() {
            debug!(endpoint = name, status = status.as_u16(), "console response");
            Ok(body)
        } else {
            warn!(endpoint = name, status = status.as_u16(), "console request failed");
            Err(decode_error_body(
                endpoint.error_body(),
                name,
                status.as_u16(),
                body,
            ))
        }
    }
}

#[cfg(test)]
#[path = "tests/lib_tests.rs"]
mod tests;
