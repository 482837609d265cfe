//! Catalogue of the server routes the console calls.

use std::borrow::Cow;

use shared::domain::{DnsRecordType, KonnektorId, LogId, LogKind, OperationId, WebserviceId};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Method {
    Get,
    Post,
}

impl Method {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Get => "GET",
            Self::Post => "POST",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PayloadKind {
    Empty,
    Json,
    Form,
    Multipart,
}

/// How a failing endpoint reports its error.
///
/// Endpoints that render a fragment on success also render their failure as
/// markup or text; endpoints called for a side effect answer with a JSON
/// envelope carrying `message`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorBody {
    JsonMessage,
    RawText,
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Endpoint {
    DashboardOverview,
    DashboardRefresh,
    ConfigOverview,
    ConfigServerStatus,
    ConfigLoad,
    ConfigSave,
    MinimalConfigLoad,
    MinimalConfigSave,
    KeystoreDelete,
    KeystoreCreateSelfsigned,
    KeystoreNotSelfsignedForm,
    KeystoreNotSelfsignedSave,
    KonnektorLoad {
        konnektor: KonnektorId,
        refresh: bool,
    },
    KonnektorDelete {
        konnektor: KonnektorId,
    },
    KonnektorSave,
    LogOverview {
        kind: LogKind,
        log: Option<LogId>,
    },
    VzdSearch {
        konnektor: KonnektorId,
        with_certificates: bool,
    },
    DnsTest {
        konnektor: KonnektorId,
        record_type: DnsRecordType,
    },
    NtpTest {
        konnektor: KonnektorId,
    },
    WebserviceOverview {
        konnektor: KonnektorId,
        webservice: WebserviceId,
    },
    VerifyPinOverview,
    WebserviceExecute,
    PipelineTestOverview,
    PipelineTestOperation {
        operation: OperationId,
    },
    PipelineTestExecute,
    ChangePassword,
    Login,
    Logout,
    /// A full server-rendered page, read at bootstrap for its meta tags and
    /// controls.
    Document {
        path: String,
    },
}

impl Endpoint {
    /// Stable route name for logs, without dynamic segments.
    pub fn name(&self) -> &'static str {
        match self {
            Self::DashboardOverview => "dashboard/uebersicht",
            Self::DashboardRefresh => "dashboard/uebersicht/aktualisieren",
            Self::ConfigOverview => "konfiguration/uebersicht",
            Self::ConfigServerStatus => "konfiguration/serverstatus",
            Self::ConfigLoad => "konfiguration/lade",
            Self::ConfigSave => "konfiguration/speichern",
            Self::MinimalConfigLoad => "minimalkonfiguration/lade",
            Self::MinimalConfigSave => "minimalkonfiguration/speichern",
            Self::KeystoreDelete => "openkimkeystore/loeschen",
            Self::KeystoreCreateSelfsigned => "openkimkeystore/erstelle/selfsigned",
            Self::KeystoreNotSelfsignedForm | Self::KeystoreNotSelfsignedSave => {
                "openkimkeystore/erstelle/notselfsigned"
            }
            Self::KonnektorLoad { .. } => "konnektor/lade",
            Self::KonnektorDelete { .. } => "konnektor/loeschen",
            Self::KonnektorSave => "konnektor/speichern",
            Self::LogOverview { .. } => "log/uebersicht",
            Self::VzdSearch { .. } => "vzd/suchen",
            Self::DnsTest { .. } => "dns/testen",
            Self::NtpTest { .. } => "ntp/testen",
            Self::WebserviceOverview { .. } | Self::VerifyPinOverview => "konnwebservice/uebersicht",
            Self::WebserviceExecute => "konnwebservice/ausfuehren",
            Self::PipelineTestOverview => "pipelineoperationtest/uebersicht",
            Self::PipelineTestOperation { .. } => "pipelineoperationtest/lade",
            Self::PipelineTestExecute => "pipelineoperationtest/execute",
            Self::ChangePassword => "user/changePwd",
            Self::Login => "login",
            Self::Logout => "logout",
            Self::Document { .. } => "document",
        }
    }

    /// Path segments appended to a container's base action, unencoded.
    pub fn path_segments(&self) -> Vec<Cow<'_, str>> {
        if let Self::Document { path } = self {
            return path
                .split('/')
                .filter(|segment| !segment.is_empty())
                .map(Cow::Borrowed)
                .collect();
        }
        let mut segments: Vec<Cow<'_, str>> =
            self.name().split('/').map(Cow::Borrowed).collect();
        match self {
            Self::KonnektorLoad { konnektor, refresh } => {
                segments.push(Cow::Borrowed(konnektor.as_str()));
                segments.push(Cow::Owned(refresh.to_string()));
            }
            Self::KonnektorDelete { konnektor } | Self::NtpTest { konnektor } => {
                segments.push(Cow::Borrowed(konnektor.as_str()));
            }
            Self::LogOverview { kind, log } => {
                segments.push(Cow::Borrowed(kind.as_path_segment()));
                if let Some(log) = log {
                    segments.push(Cow::Borrowed(log.as_str()));
                }
            }
            Self::VzdSearch {
                konnektor,
                with_certificates,
            } => {
                segments.push(Cow::Borrowed(konnektor.as_str()));
                segments.push(Cow::Owned(with_certificates.to_string()));
            }
            Self::DnsTest {
                konnektor,
                record_type,
            } => {
                segments.push(Cow::Borrowed(konnektor.as_str()));
                segments.push(Cow::Borrowed(record_type.as_str()));
            }
            Self::WebserviceOverview {
                konnektor,
                webservice,
            } => {
                segments.push(Cow::Borrowed(konnektor.as_str()));
                segments.push(Cow::Borrowed(webservice.as_str()));
            }
            Self::PipelineTestOperation { operation } => {
                segments.push(Cow::Borrowed(operation.as_str()));
            }
            _ => {}
        }
        segments
    }

    /// Relative suffix as it appears after the base action.
    pub fn relative_path(&self) -> String {
        self.path_segments().join("/")
    }

    pub fn method(&self) -> Method {
        match self {
            Self::DashboardOverview
            | Self::DashboardRefresh
            | Self::ConfigOverview
            | Self::ConfigServerStatus
            | Self::ConfigLoad
            | Self::MinimalConfigLoad
            | Self::KeystoreDelete
            | Self::KeystoreCreateSelfsigned
            | Self::KeystoreNotSelfsignedForm
            | Self::KonnektorLoad { .. }
            | Self::KonnektorDelete { .. }
            | Self::LogOverview { .. }
            | Self::WebserviceOverview { .. }
            | Self::PipelineTestOverview
            | Self::PipelineTestOperation { .. }
            | Self::Document { .. } => Method::Get,
            Self::ConfigSave
            | Self::MinimalConfigSave
            | Self::KeystoreNotSelfsignedSave
            | Self::KonnektorSave
            | Self::VzdSearch { .. }
            | Self::DnsTest { .. }
            | Self::NtpTest { .. }
            | Self::VerifyPinOverview
            | Self::WebserviceExecute
            | Self::PipelineTestExecute
            | Self::ChangePassword
            | Self::Login
            | Self::Logout => Method::Post,
        }
    }

    pub fn payload_kind(&self) -> PayloadKind {
        match self {
            Self::ConfigSave
            | Self::MinimalConfigSave
            | Self::KonnektorSave
            | Self::PipelineTestExecute => PayloadKind::Multipart,
            Self::KeystoreNotSelfsignedSave
            | Self::VerifyPinOverview
            | Self::WebserviceExecute
            | Self::ChangePassword => PayloadKind::Json,
            Self::VzdSearch { .. } | Self::DnsTest { .. } | Self::Login => PayloadKind::Form,
            _ => PayloadKind::Empty,
        }
    }

    pub fn error_body(&self) -> ErrorBody {
        match self {
            Self::ConfigSave
            | Self::MinimalConfigSave
            | Self::KeystoreDelete
            | Self::KeystoreCreateSelfsigned
            | Self::KeystoreNotSelfsignedSave
            | Self::KonnektorDelete { .. }
            | Self::KonnektorSave
            | Self::PipelineTestOverview
            | Self::PipelineTestOperation { .. }
            | Self::PipelineTestExecute
            | Self::ChangePassword => ErrorBody::JsonMessage,
            _ => ErrorBody::RawText,
        }
    }

    /// Mutating requests carry the CSRF header.
    pub fn requires_csrf(&self) -> bool {
        self.method() == Method::Post
    }
}
