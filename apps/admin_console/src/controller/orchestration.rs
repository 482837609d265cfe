//! Command orchestration from host events to the single controller worker.

use std::{
    collections::HashSet,
    sync::{Arc, Mutex, PoisonError},
};

use shared::{
    domain::{KonnektorId, LogId, LogKind, OperationId, WebserviceId},
    protocol::VerifyPinRequest,
};
use thiserror::Error;
use tokio::sync::mpsc::{self, error::TrySendError, Receiver, Sender, UnboundedSender};

use crate::error::ConsoleError;

use super::{
    actions::FragmentSwapController,
    events::{ActionOutcome, ConsoleEvent},
};

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum ConsoleCommand {
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
    SelectKonnektorForDelete {
        konnektor: KonnektorId,
    },
    KonnektorDelete,
    KonnektorSave,
    KonnektorRules,
    LogOverview {
        kind: LogKind,
        log: Option<LogId>,
    },
    VzdSearch {
        konnektor: KonnektorId,
    },
    VzdClose,
    DnsTest {
        konnektor: KonnektorId,
    },
    DnsClose,
    WebserviceOverview {
        konnektor: KonnektorId,
        webservice: WebserviceId,
    },
    VerifyPinOverview(VerifyPinRequest),
    WebserviceExecute {
        form: String,
    },
    NtpTest {
        konnektor: KonnektorId,
    },
    NtpClose,
    PipelineTestOverview,
    PipelineTestOperationLoad {
        operation: OperationId,
    },
    PipelineTestOperationExecute,
    ChangePassword,
    Logout,
    SetValue {
        control: String,
        value: String,
    },
    SetChecked {
        control: String,
        checked: bool,
    },
    TogglePasswordVisibility {
        control: String,
    },
    ToggleSection {
        section: String,
    },
}

impl ConsoleCommand {
    pub fn name(&self) -> &'static str {
        match self {
            Self::DashboardOverview => "dashboard_overview",
            Self::DashboardRefresh => "dashboard_refresh",
            Self::ConfigOverview => "config_overview",
            Self::ConfigServerStatus => "config_server_status",
            Self::ConfigLoad => "config_load",
            Self::ConfigSave => "config_save",
            Self::MinimalConfigLoad => "minimal_config_load",
            Self::MinimalConfigSave => "minimal_config_save",
            Self::KeystoreDelete => "keystore_delete",
            Self::KeystoreCreateSelfsigned => "keystore_create_selfsigned",
            Self::KeystoreNotSelfsignedForm => "keystore_notselfsigned_form",
            Self::KeystoreNotSelfsignedSave => "keystore_notselfsigned_save",
            Self::KonnektorLoad { .. } => "konnektor_load",
            Self::SelectKonnektorForDelete { .. } => "select_konnektor_for_delete",
            Self::KonnektorDelete => "konnektor_delete",
            Self::KonnektorSave => "konnektor_save",
            Self::KonnektorRules => "konnektor_rules",
            Self::LogOverview { .. } => "log_overview",
            Self::VzdSearch { .. } => "vzd_search",
            Self::VzdClose => "vzd_close",
            Self::DnsTest { .. } => "dns_test",
            Self::DnsClose => "dns_close",
            Self::WebserviceOverview { .. } => "konn_webservice_overview",
            Self::VerifyPinOverview(_) => "verify_pin_overview",
            Self::WebserviceExecute { .. } => "konn_webservice_execute",
            Self::NtpTest { .. } => "ntp_test",
            Self::NtpClose => "ntp_close",
            Self::PipelineTestOverview => "pipeline_test_overview",
            Self::PipelineTestOperationLoad { .. } => "pipeline_test_operation_load",
            Self::PipelineTestOperationExecute => "pipeline_test_operation_execute",
            Self::ChangePassword => "change_password",
            Self::Logout => "logout",
            Self::SetValue { .. } => "set_value",
            Self::SetChecked { .. } => "set_checked",
            Self::TogglePasswordVisibility { .. } => "toggle_password_visibility",
            Self::ToggleSection { .. } => "toggle_section",
        }
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum DispatchError {
    #[error("{0} is already queued or running")]
    Duplicate(&'static str),
    #[error("console command queue is full")]
    Full,
    #[error("console worker stopped")]
    Closed,
}

type Pending = Arc<Mutex<HashSet<ConsoleCommand>>>;

fn lock(pending: &Pending) -> std::sync::MutexGuard<'_, HashSet<ConsoleCommand>> {
    pending.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Host side of the command queue. A command equal to one still queued or
/// running is rejected.
#[derive(Clone)]
pub struct CommandQueue {
    tx: Sender<ConsoleCommand>,
    pending: Pending,
}

pub struct CommandReceiver {
    rx: Receiver<ConsoleCommand>,
    pending: Pending,
}

pub fn command_queue(capacity: usize) -> (CommandQueue, CommandReceiver) {
    let (tx, rx) = mpsc::channel(capacity.max(1));
    let pending = Pending::default();
    (
        CommandQueue {
            tx,
            pending: Arc::clone(&pending),
        },
        CommandReceiver { rx, pending },
    )
}

impl CommandQueue {
    pub fn dispatch(&self, cmd: ConsoleCommand) -> Result<(), DispatchError> {
        let name = cmd.name();
        if !lock(&self.pending).insert(cmd.clone()) {
            return Err(DispatchError::Duplicate(name));
        }
        match self.tx.try_send(cmd) {
            Ok(()) => Ok(()),
            Err(TrySendError::Full(cmd)) => {
                lock(&self.pending).remove(&cmd);
                Err(DispatchError::Full)
            }
            Err(TrySendError::Closed(cmd)) => {
                lock(&self.pending).remove(&cmd);
                Err(DispatchError::Closed)
            }
        }
    }

    pub fn is_pending(&self, cmd: &ConsoleCommand) -> bool {
        lock(&self.pending).contains(cmd)
    }
}

/// Queues `cmd` and reports a rejected dispatch through `status`.
pub fn dispatch_console_command(queue: &CommandQueue, cmd: ConsoleCommand, status: &mut String) {
    let cmd_name = cmd.name();
    match queue.dispatch(cmd) {
        Ok(()) => tracing::debug!(command = cmd_name, "queued console command"),
        Err(DispatchError::Duplicate(_)) => {
            tracing::debug!(command = cmd_name, "ignored duplicate console command");
            *status = "Action is already running; please wait".to_string();
        }
        Err(DispatchError::Full) => {
            *status = "Console command queue is full; please retry".to_string();
        }
        Err(DispatchError::Closed) => {
            *status = "Console worker stopped; reload the page".to_string();
        }
    }
}

/// Runs one command against the controller.
pub async fn execute(
    controller: &mut FragmentSwapController,
    cmd: ConsoleCommand,
) -> Result<ActionOutcome, ConsoleError> {
    let done = |result: Result<(), ConsoleError>| result.map(|()| ActionOutcome::Completed);
    match cmd {
        ConsoleCommand::DashboardOverview => controller.dashboard_overview().await,
        ConsoleCommand::DashboardRefresh => controller.dashboard_refresh().await,
        ConsoleCommand::ConfigOverview => controller.config_overview().await,
        ConsoleCommand::ConfigServerStatus => controller.config_server_status().await,
        ConsoleCommand::ConfigLoad => controller.config_load().await,
        ConsoleCommand::ConfigSave => controller.config_save().await,
        ConsoleCommand::MinimalConfigLoad => controller.minimal_config_load().await,
        ConsoleCommand::MinimalConfigSave => controller.minimal_config_save().await,
        ConsoleCommand::KeystoreDelete => controller.keystore_delete().await,
        ConsoleCommand::KeystoreCreateSelfsigned => controller.keystore_create_selfsigned().await,
        ConsoleCommand::KeystoreNotSelfsignedForm => controller.keystore_notselfsigned_form().await,
        ConsoleCommand::KeystoreNotSelfsignedSave => controller.keystore_notselfsigned_save().await,
        ConsoleCommand::KonnektorLoad { konnektor, refresh } => {
            controller.konnektor_load(konnektor, refresh).await
        }
        ConsoleCommand::SelectKonnektorForDelete { konnektor } => {
            controller.select_konnektor_for_delete(konnektor);
            Ok(ActionOutcome::Completed)
        }
        ConsoleCommand::KonnektorDelete => controller.konnektor_delete().await,
        ConsoleCommand::KonnektorSave => controller.konnektor_save().await,
        ConsoleCommand::KonnektorRules => {
            controller.konnektor_rules();
            Ok(ActionOutcome::Completed)
        }
        ConsoleCommand::LogOverview { kind, log } => controller.log_overview(kind, log).await,
        ConsoleCommand::VzdSearch { konnektor } => controller.vzd_search(konnektor).await,
        ConsoleCommand::VzdClose => done(controller.vzd_close()),
        ConsoleCommand::DnsTest { konnektor } => controller.dns_test(konnektor).await,
        ConsoleCommand::DnsClose => done(controller.dns_close()),
        ConsoleCommand::WebserviceOverview {
            konnektor,
            webservice,
        } => {
            controller
                .konn_webservice_overview(konnektor, webservice)
                .await
        }
        ConsoleCommand::VerifyPinOverview(request) => controller.verify_pin_overview(request).await,
        ConsoleCommand::WebserviceExecute { form } => {
            controller.konn_webservice_execute(&form).await
        }
        ConsoleCommand::NtpTest { konnektor } => controller.ntp_test(konnektor).await,
        ConsoleCommand::NtpClose => done(controller.ntp_close()),
        ConsoleCommand::PipelineTestOverview => controller.pipeline_test_overview().await,
        ConsoleCommand::PipelineTestOperationLoad { operation } => {
            controller.pipeline_test_operation_load(operation).await
        }
        ConsoleCommand::PipelineTestOperationExecute => {
            controller.pipeline_test_operation_execute().await
        }
        ConsoleCommand::ChangePassword => controller.change_password().await,
        ConsoleCommand::Logout => controller.logout().await,
        ConsoleCommand::SetValue { control, value } => {
            done(controller.page_mut().set_value(&control, value).map_err(Into::into))
        }
        ConsoleCommand::SetChecked { control, checked } => done(
            controller
                .page_mut()
                .set_checked(&control, checked)
                .map_err(Into::into),
        ),
        ConsoleCommand::TogglePasswordVisibility { control } => done(
            controller
                .page_mut()
                .toggle_password_visibility(&control)
                .map(|_| ())
                .map_err(Into::into),
        ),
        ConsoleCommand::ToggleSection { section } => {
            controller.page_mut().toggle_section(&section);
            Ok(ActionOutcome::Completed)
        }
    }
}

/// Worker loop: runs queued commands one after another until every queue
/// handle is dropped, then hands the controller back.
pub async fn run_console(
    mut controller: FragmentSwapController,
    mut commands: CommandReceiver,
    events: UnboundedSender<ConsoleEvent>,
) -> FragmentSwapController {
    while let Some(cmd) = commands.rx.recv().await {
        let name = cmd.name();
        let signs_out = matches!(cmd, ConsoleCommand::Logout | ConsoleCommand::ChangePassword);
        let result = execute(&mut controller, cmd.clone()).await;
        lock(&commands.pending).remove(&cmd);
        let patches = controller.page_mut().drain_patches();
        tracing::trace!(command = name, patches = patches.len(), "page patched");

        match result {
            Ok(outcome) => {
                let signed_out = signs_out && outcome.is_completed();
                let _ = events.send(ConsoleEvent::ActionFinished {
                    command: name,
                    outcome,
                });
                if signed_out {
                    let _ = events.send(ConsoleEvent::LoggedOut);
                }
            }
            Err(err) => {
                tracing::error!(command = name, %err, "console command aborted");
                let _ = events.send(ConsoleEvent::ActionAborted {
                    command: name,
                    reason: err.to_string(),
                });
            }
        }
    }
    tracing::debug!("console command queue closed");
    controller
}

#[cfg(test)]
#[path = "tests/orchestration_tests.rs"]
mod tests;
