//! Action outcomes and error modeling reported to the console host.

use client_core::TransportError;
use shared::error::ErrorCode;

use crate::page::form::InvalidControl;

#[derive(Debug, Clone)]
pub enum ConsoleEvent {
    ActionFinished {
        command: &'static str,
        outcome: ActionOutcome,
    },
    ActionAborted {
        command: &'static str,
        reason: String,
    },
    LoggedOut,
}

#[derive(Debug, Clone)]
pub enum ActionOutcome {
    Completed,
    /// Validation blocked the request; nothing was sent.
    Invalid {
        form: String,
        controls: Vec<InvalidControl>,
    },
    /// The request failed and the error is shown on the page.
    Failed(UiError),
}

impl ActionOutcome {
    pub fn is_completed(&self) -> bool {
        matches!(self, Self::Completed)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UiErrorCategory {
    Auth,
    Transport,
    Validation,
    Server,
    Unknown,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UiErrorContext {
    Bootstrap,
    Login,
    Dashboard,
    Config,
    MinimalConfig,
    Keystore,
    Konnektor,
    Log,
    Directory,
    Dns,
    Ntp,
    Webservice,
    PipelineTest,
    ChangePassword,
}

#[derive(Debug, Clone)]
pub struct UiError {
    category: UiErrorCategory,
    context: UiErrorContext,
    message: String,
}

impl UiError {
    pub fn from_transport(context: UiErrorContext, err: &TransportError) -> Self {
        let api_error = err.to_api_error();
        let category = match api_error.code {
            ErrorCode::Unauthorized | ErrorCode::Forbidden => UiErrorCategory::Auth,
            ErrorCode::Transport => UiErrorCategory::Transport,
            ErrorCode::Validation => UiErrorCategory::Validation,
            ErrorCode::NotFound | ErrorCode::Internal => UiErrorCategory::Server,
        };
        Self {
            category,
            context,
            message: api_error.message,
        }
    }

    pub fn new(
        category: UiErrorCategory,
        context: UiErrorContext,
        message: impl Into<String>,
    ) -> Self {
        Self {
            category,
            context,
            message: message.into(),
        }
    }

    pub fn requires_reauth(&self) -> bool {
        self.category == UiErrorCategory::Auth
    }

    pub fn category(&self) -> UiErrorCategory {
        self.category
    }

    pub fn context(&self) -> UiErrorContext {
        self.context
    }

    pub fn message(&self) -> &str {
        &self.message
    }
}
