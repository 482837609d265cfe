use super::*;

use crate::{controller::test_support::console, page::region::RegionId};

fn finished(events: &[ConsoleEvent]) -> Vec<&'static str> {
    events
        .iter()
        .filter_map(|event| match event {
            ConsoleEvent::ActionFinished { command, .. } => Some(*command),
            _ => None,
        })
        .collect()
}

async fn drain(mut rx: mpsc::UnboundedReceiver<ConsoleEvent>) -> Vec<ConsoleEvent> {
    let mut events = Vec::new();
    while let Some(event) = rx.recv().await {
        events.push(event);
    }
    events
}

#[test]
fn equal_command_is_rejected_while_pending() {
    let (queue, _commands) = command_queue(8);
    let load = ConsoleCommand::KonnektorLoad {
        konnektor: KonnektorId::new("4f1c"),
        refresh: false,
    };

    queue.dispatch(load.clone()).expect("first");
    assert_eq!(
        queue.dispatch(load.clone()),
        Err(DispatchError::Duplicate("konnektor_load"))
    );
    assert!(queue.is_pending(&load));

    queue
        .dispatch(ConsoleCommand::KonnektorLoad {
            konnektor: KonnektorId::new("4f1c"),
            refresh: true,
        })
        .expect("different arguments");
}

#[test]
fn full_queue_releases_the_rejected_command() {
    let (queue, _commands) = command_queue(1);
    queue
        .dispatch(ConsoleCommand::DashboardOverview)
        .expect("first");

    assert_eq!(
        queue.dispatch(ConsoleCommand::ConfigOverview),
        Err(DispatchError::Full)
    );
    assert!(!queue.is_pending(&ConsoleCommand::ConfigOverview));
}

#[test]
fn closed_queue_reports_stopped_worker() {
    let (queue, commands) = command_queue(4);
    drop(commands);

    assert_eq!(
        queue.dispatch(ConsoleCommand::NtpClose),
        Err(DispatchError::Closed)
    );
}

#[test]
fn rejected_dispatch_is_reported_through_status() {
    let (queue, _commands) = command_queue(4);
    let mut status = String::new();

    dispatch_console_command(&queue, ConsoleCommand::DashboardRefresh, &mut status);
    assert!(status.is_empty());
    dispatch_console_command(&queue, ConsoleCommand::DashboardRefresh, &mut status);
    assert_eq!(status, "Action is already running; please wait");
}

#[tokio::test]
async fn worker_runs_commands_in_order_and_returns_the_controller() {
    let (controller, transport) = console();
    transport.reply("dashboard/uebersicht", "<p>eins</p>");
    let (queue, commands) = command_queue(8);
    let (event_tx, mut event_rx) = mpsc::unbounded_channel();
    let worker = tokio::spawn(run_console(controller, commands, event_tx));

    queue
        .dispatch(ConsoleCommand::DashboardOverview)
        .expect("dashboard");
    queue
        .dispatch(ConsoleCommand::SelectKonnektorForDelete {
            konnektor: KonnektorId::new("4f1c"),
        })
        .expect("select");
    queue
        .dispatch(ConsoleCommand::KonnektorDelete)
        .expect("delete");

    let mut events = Vec::new();
    while events.len() < 3 {
        events.push(event_rx.recv().await.expect("event"));
    }
    assert!(!queue.is_pending(&ConsoleCommand::KonnektorDelete));
    drop(queue);
    let controller = worker.await.expect("worker");

    assert_eq!(
        finished(&events),
        [
            "dashboard_overview",
            "select_konnektor_for_delete",
            "konnektor_delete"
        ]
    );
    assert_eq!(
        transport.names(),
        [
            "dashboard/uebersicht",
            "konnektor/loeschen",
            "konfiguration/uebersicht",
            "konfiguration/serverstatus"
        ]
    );
    let dashboard = controller
        .page()
        .region(&RegionId::Dashboard)
        .expect("dashboard");
    assert_eq!(dashboard.content(), "<p>eins</p>");
    assert!(controller.page().patches().is_empty());
}

#[tokio::test]
async fn finished_command_can_be_queued_again() {
    let (controller, _transport) = console();
    let (queue, commands) = command_queue(4);
    let (event_tx, mut event_rx) = mpsc::unbounded_channel();
    let worker = tokio::spawn(run_console(controller, commands, event_tx));

    queue.dispatch(ConsoleCommand::NtpClose).expect("first");
    let first = event_rx.recv().await.expect("event");
    assert!(matches!(
        first,
        ConsoleEvent::ActionFinished {
            command: "ntp_close",
            ..
        }
    ));
    queue.dispatch(ConsoleCommand::NtpClose).expect("again");
    drop(queue);

    worker.await.expect("worker");
    assert_eq!(finished(&drain(event_rx).await), ["ntp_close"]);
}

#[tokio::test]
async fn logout_emits_logged_out_after_completion() {
    let (controller, transport) = console();
    transport.reply("logout", "<html></html>");
    transport.fail("logout", 500, "kaputt");
    let (queue, commands) = command_queue(4);
    let (event_tx, event_rx) = mpsc::unbounded_channel();

    queue.dispatch(ConsoleCommand::Logout).expect("logout");
    drop(queue);
    let controller = run_console(controller, commands, event_tx).await;
    let events = drain(event_rx).await;
    assert!(matches!(events.last(), Some(ConsoleEvent::LoggedOut)));

    let (queue, commands) = command_queue(4);
    let (event_tx, event_rx) = mpsc::unbounded_channel();
    queue.dispatch(ConsoleCommand::Logout).expect("logout");
    drop(queue);
    run_console(controller, commands, event_tx).await;
    let events = drain(event_rx).await;
    assert_eq!(events.len(), 1);
    assert!(matches!(
        events[0],
        ConsoleEvent::ActionFinished {
            outcome: ActionOutcome::Failed(_),
            ..
        }
    ));
}

#[tokio::test]
async fn page_errors_abort_the_command_but_not_the_worker() {
    let (controller, _transport) = console();
    let (queue, commands) = command_queue(4);
    let (event_tx, event_rx) = mpsc::unbounded_channel();

    queue
        .dispatch(ConsoleCommand::SetValue {
            control: "missing".to_string(),
            value: "x".to_string(),
        })
        .expect("set");
    queue.dispatch(ConsoleCommand::KonnektorDelete).expect("delete");
    queue.dispatch(ConsoleCommand::DnsClose).expect("close");
    drop(queue);
    run_console(controller, commands, event_tx).await;
    let events = drain(event_rx).await;

    assert_eq!(events.len(), 3);
    assert!(matches!(
        &events[0],
        ConsoleEvent::ActionAborted { command: "set_value", reason } if reason.contains("missing")
    ));
    assert!(matches!(
        events[1],
        ConsoleEvent::ActionAborted {
            command: "konnektor_delete",
            ..
        }
    ));
    assert_eq!(finished(&events), ["dns_close"]);
}
