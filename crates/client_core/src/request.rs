//! Request descriptors: method, target URL, payload and CSRF pair.

use serde_json::Value;
use url::Url;

use crate::{
    csrf::CsrfToken,
    endpoint::{Endpoint, Method, PayloadKind},
    error::TransportError,
};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FilePart {
    pub field: String,
    pub filename: String,
    pub bytes: Vec<u8>,
    pub mime_type: Option<String>,
}

/// Multipart body: file parts first, then text parts, in insertion order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MultipartForm {
    files: Vec<FilePart>,
    texts: Vec<(String, String)>,
}

impl MultipartForm {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn append_file(&mut self, file: FilePart) {
        self.files.push(file);
    }

    pub fn append_text(&mut self, name: impl Into<String>, value: impl Into<String>) {
        self.texts.push((name.into(), value.into()));
    }

    /// Replaces every text part named `name` with a single value.
    pub fn set_text(&mut self, name: &str, value: impl Into<String>) {
        self.texts.retain(|(existing, _)| existing != name);
        self.texts.push((name.to_string(), value.into()));
    }

    pub fn texts(&self) -> &[(String, String)] {
        &self.texts
    }

    pub fn files(&self) -> &[FilePart] {
        &self.files
    }

    pub(crate) fn into_reqwest(self) -> reqwest::Result<reqwest::multipart::Form> {
        let mut form = reqwest::multipart::Form::new();
        for file in self.files {
            let mut part = reqwest::multipart::Part::bytes(file.bytes).file_name(file.filename);
            if let Some(mime_type) = file.mime_type {
                part = part.mime_str(&mime_type)?;
            }
            form = form.part(file.field, part);
        }
        for (name, value) in self.texts {
            form = form.text(name, value);
        }
        Ok(form)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Payload {
    Empty,
    Json(Value),
    Form(Vec<(String, String)>),
    Multipart(MultipartForm),
}

impl Payload {
    pub fn kind(&self) -> PayloadKind {
        match self {
            Self::Empty => PayloadKind::Empty,
            Self::Json(_) => PayloadKind::Json,
            Self::Form(_) => PayloadKind::Form,
            Self::Multipart(_) => PayloadKind::Multipart,
        }
    }
}

fn payload_kind_name(kind: PayloadKind) -> &'static str {
    match kind {
        PayloadKind::Empty => "empty",
        PayloadKind::Json => "json",
        PayloadKind::Form => "url-encoded",
        PayloadKind::Multipart => "multipart",
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct RequestDescriptor {
    pub endpoint: Endpoint,
    pub method: Method,
    pub url: Url,
    pub payload: Payload,
    pub csrf: Option<CsrfToken>,
}

impl RequestDescriptor {
    /// Joins the container's base action with the endpoint suffix. A base
    /// without trailing slash is treated as a directory.
    pub fn build(
        base_action: &Url,
        endpoint: Endpoint,
        payload: Payload,
        csrf: Option<&CsrfToken>,
    ) -> Result<Self, TransportError> {
        let expected = endpoint.payload_kind();
        if payload.kind() != expected {
            return Err(TransportError::PayloadMismatch {
                endpoint: endpoint.name(),
                expected: payload_kind_name(expected),
            });
        }

        let mut url = base_action.clone();
        url.set_query(None);
        url.set_fragment(None);
        {
            let mut segments = url
                .path_segments_mut()
                .map_err(|()| TransportError::InvalidUrl {
                    endpoint: endpoint.name(),
                    detail: format!("{base_action} cannot carry a path"),
                })?;
            segments.pop_if_empty();
            for segment in endpoint.path_segments() {
                segments.push(&segment);
            }
        }

        let csrf = if endpoint.requires_csrf() {
            if csrf.is_none() {
                tracing::warn!(
                    endpoint = endpoint.name(),
                    "mutating request without csrf token"
                );
            }
            csrf.cloned()
        } else {
            None
        };

        Ok(Self {
            method: endpoint.method(),
            endpoint,
            url,
            payload,
            csrf,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use shared::domain::KonnektorId;

    fn base() -> Url {
        Url::parse("http://console.local/openkim/").expect("url")
    }

    fn csrf() -> CsrfToken {
        CsrfToken::new("X-CSRF-TOKEN", "secret")
    }

    #[test]
    fn concatenates_base_action_and_suffix() {
        let request = RequestDescriptor::build(
            &base(),
            Endpoint::KonnektorDelete {
                konnektor: KonnektorId::new("1234"),
            },
            Payload::Empty,
            Some(&csrf()),
        )
        .expect("request");
        assert_eq!(
            request.url.as_str(),
            "http://console.local/openkim/konnektor/loeschen/1234"
        );
        assert_eq!(request.method, Method::Get);
        assert!(request.csrf.is_none());
    }

    #[test]
    fn base_without_trailing_slash_is_a_directory() {
        let base = Url::parse("http://console.local/openkim").expect("url");
        let request =
            RequestDescriptor::build(&base, Endpoint::ConfigOverview, Payload::Empty, None)
                .expect("request");
        assert_eq!(
            request.url.as_str(),
            "http://console.local/openkim/konfiguration/uebersicht"
        );
    }

    #[test]
    fn dynamic_segments_are_percent_encoded() {
        let request = RequestDescriptor::build(
            &base(),
            Endpoint::NtpTest {
                konnektor: KonnektorId::new("a b/c"),
            },
            Payload::Empty,
            Some(&csrf()),
        )
        .expect("request");
        assert_eq!(
            request.url.as_str(),
            "http://console.local/openkim/ntp/testen/a%20b%2Fc"
        );
        assert_eq!(request.csrf, Some(csrf()));
    }

    #[test]
    fn rejects_payload_of_the_wrong_kind() {
        let err = RequestDescriptor::build(
            &base(),
            Endpoint::KonnektorSave,
            Payload::Json(serde_json::json!({})),
            Some(&csrf()),
        )
        .expect_err("mismatch");
        assert!(matches!(
            err,
            TransportError::PayloadMismatch {
                expected: "multipart",
                ..
            }
        ));
    }

    #[test]
    fn set_text_overrides_serialized_checkbox_value() {
        let mut form = MultipartForm::new();
        form.append_text("activated", "on");
        form.append_text("ip", "10.0.0.1");
        form.set_text("activated", "true");
        assert_eq!(
            form.texts(),
            [
                ("ip".to_string(), "10.0.0.1".to_string()),
                ("activated".to_string(), "true".to_string()),
            ]
        );
    }
}
