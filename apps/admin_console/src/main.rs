use std::sync::Arc;

use admin_console::{
    config::load_settings,
    controller::{
        command_queue, run_console, ActionOutcome, ConsoleCommand, ConsoleEvent,
        FragmentSwapController,
    },
    page::{
        form::{Control, ControlKind},
        Page,
    },
};
use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use client_core::{
    csrf::{CSRF_HEADER_META, CSRF_TOKEN_META},
    HttpTransport,
};
use shared::domain::{KonnektorId, LogId, LogKind, OperationId, WebserviceId};
use tokio::sync::mpsc;
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "admin-console", about = "Drives the OpenKIM admin console headlessly")]
struct Args {
    /// Overrides the configured base URL.
    #[arg(long)]
    base_url: Option<String>,
    #[arg(long, requires = "password")]
    username: Option<String>,
    #[arg(long, requires = "username")]
    password: Option<String>,
    #[command(subcommand)]
    action: Action,
}

#[derive(Subcommand, Debug)]
enum Action {
    Dashboard {
        #[arg(long)]
        refresh: bool,
    },
    Config,
    MinimalConfig,
    Konnektor {
        id: String,
        #[arg(long)]
        refresh: bool,
    },
    DeleteKonnektor {
        id: String,
    },
    Log {
        #[arg(value_parser = ["SMTP", "POP3"])]
        kind: String,
        id: Option<String>,
    },
    Vzd {
        konnektor: String,
        #[arg(long, default_value = "")]
        search: String,
        #[arg(long)]
        with_certs: bool,
    },
    Dns {
        konnektor: String,
        domain: String,
        #[arg(long, default_value = "A")]
        record_type: String,
    },
    Ntp {
        konnektor: String,
    },
    Webservice {
        konnektor: String,
        webservice: String,
    },
    PipelineTest {
        operation: Option<String>,
    },
}

impl Action {
    /// Commands the action expands to, in order. Search inputs the action
    /// carries are placed on the page first.
    fn commands(self, page: &mut Page) -> Vec<ConsoleCommand> {
        match self {
            Action::Dashboard { refresh: false } => vec![ConsoleCommand::DashboardOverview],
            Action::Dashboard { refresh: true } => vec![ConsoleCommand::DashboardRefresh],
            Action::Config => vec![ConsoleCommand::ConfigOverview],
            Action::MinimalConfig => vec![ConsoleCommand::MinimalConfigLoad],
            Action::Konnektor { id, refresh } => vec![ConsoleCommand::KonnektorLoad {
                konnektor: KonnektorId::new(id),
                refresh,
            }],
            Action::DeleteKonnektor { id } => vec![
                ConsoleCommand::SelectKonnektorForDelete {
                    konnektor: KonnektorId::new(id),
                },
                ConsoleCommand::KonnektorDelete,
            ],
            Action::Log { kind, id } => vec![ConsoleCommand::LogOverview {
                kind: if kind == "POP3" {
                    LogKind::Pop3
                } else {
                    LogKind::Smtp
                },
                log: id.map(LogId::new),
            }],
            Action::Vzd {
                konnektor,
                search,
                with_certs,
            } => {
                page.insert_control(Control::new(ControlKind::Text).with_id("search").with_value(search));
                page.insert_control(
                    Control::new(ControlKind::Checkbox)
                        .with_id("searchWithCerts")
                        .checked(with_certs),
                );
                vec![ConsoleCommand::VzdSearch {
                    konnektor: KonnektorId::new(konnektor),
                }]
            }
            Action::Dns {
                konnektor,
                domain,
                record_type,
            } => {
                page.insert_control(Control::new(ControlKind::Text).with_id("domain").with_value(domain));
                page.insert_control(
                    Control::new(ControlKind::Select)
                        .with_id("recordType")
                        .with_value(record_type),
                );
                vec![ConsoleCommand::DnsTest {
                    konnektor: KonnektorId::new(konnektor),
                }]
            }
            Action::Ntp { konnektor } => vec![ConsoleCommand::NtpTest {
                konnektor: KonnektorId::new(konnektor),
            }],
            Action::Webservice {
                konnektor,
                webservice,
            } => vec![ConsoleCommand::WebserviceOverview {
                konnektor: KonnektorId::new(konnektor),
                webservice: WebserviceId::new(webservice),
            }],
            Action::PipelineTest { operation: None } => {
                vec![ConsoleCommand::PipelineTestOverview]
            }
            Action::PipelineTest {
                operation: Some(operation),
            } => vec![ConsoleCommand::PipelineTestOperationLoad {
                operation: OperationId::new(operation),
            }],
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();
    let mut settings = load_settings()?;
    if let Some(base_url) = args.base_url {
        settings.base_url = base_url;
    }

    let filter = EnvFilter::try_new(&settings.log_filter).unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt().with_env_filter(filter).init();

    let transport = Arc::new(HttpTransport::new().context("failed to build http client")?);
    let page = settings.build_page()?;
    let mut controller =
        FragmentSwapController::new(transport, page)?.with_navigation(settings.navigation());

    if let (Some(username), Some(password)) = (args.username, args.password) {
        require(controller.bootstrap("login").await?, "login page")?;
        let page = controller.page_mut();
        page.set_value("username", username)
            .context("login page has no username field")?;
        page.set_value("password", password)
            .context("login page has no password field")?;
        require(controller.login().await?, "login")?;
    }

    require(
        controller.bootstrap(&settings.start_path).await?,
        "start page",
    )?;
    if controller.page().csrf_token().is_none() {
        if let (Some(header), Some(token)) = (&settings.csrf_header, &settings.csrf_token) {
            let page = controller.page_mut();
            page.set_meta(CSRF_HEADER_META, header.as_str());
            page.set_meta(CSRF_TOKEN_META, token.as_str());
        }
    }

    let planned = args.action.commands(controller.page_mut());
    let (queue, commands) = command_queue(settings.queue_capacity);
    let (event_tx, mut event_rx) = mpsc::unbounded_channel();
    let worker = tokio::spawn(run_console(controller, commands, event_tx));

    for command in planned {
        queue.dispatch(command)?;
    }
    drop(queue);

    let mut failed = false;
    while let Some(event) = event_rx.recv().await {
        match event {
            ConsoleEvent::ActionFinished { command, outcome } => match outcome {
                ActionOutcome::Completed => tracing::info!(command, "done"),
                ActionOutcome::Invalid { form, controls } => {
                    failed = true;
                    eprintln!("{command}: form {form} is invalid ({} fields)", controls.len());
                }
                ActionOutcome::Failed(err) => {
                    failed = true;
                    eprintln!("{command}: {}", err.message());
                }
            },
            ConsoleEvent::ActionAborted { command, reason } => {
                failed = true;
                eprintln!("{command}: {reason}");
            }
            ConsoleEvent::LoggedOut => println!("signed out"),
        }
    }

    let controller = worker.await.context("console worker panicked")?;
    let mut regions: Vec<_> = controller
        .page()
        .regions()
        .iter()
        .filter(|(_, region)| region.is_visible() && !region.content().is_empty())
        .collect();
    regions.sort_by(|a, b| a.0.cmp(b.0));
    for (id, region) in regions {
        println!("--- #{} ---", id.dom_id());
        println!("{}", region.content().trim());
    }

    if failed {
        std::process::exit(1);
    }
    Ok(())
}

fn require(outcome: ActionOutcome, step: &str) -> Result<()> {
    match outcome {
        ActionOutcome::Completed => Ok(()),
        ActionOutcome::Invalid { form, .. } => bail!("{step}: form {form} is incomplete"),
        ActionOutcome::Failed(err) => {
            if err.requires_reauth() {
                bail!("{step}: not signed in ({})", err.message())
            }
            bail!("{step}: {}", err.message())
        }
    }
}
