mod command;
mod helper;
mod render;

use std::sync::Arc;

use anyhow::Result;
use colored::Colorize;
use rustyline::Editor;
use rustyline::history::DefaultHistory;

use hearth_application::{AssistantSession, DispatchOutcome, RejectReason};
use hearth_core::config::AssistantConfig;
use hearth_core::context::IdentityProvider;
use hearth_core::conversation::ConversationService;
use hearth_infrastructure::ConfigService;
use hearth_interaction::{HttpConversationService, HttpIdentityProvider};

use command::Command;
use helper::CliHelper;
use render::{render_events, report_outcome};

fn init_tracing(config: &AssistantConfig) {
    // Logs go to stderr so they do not interleave with the chat on stdout.
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| config.log_level.as_str().into()),
        )
        .with_writer(std::io::stderr)
        .init();
}

/// Runs a command against the session in the background so the prompt stays
/// responsive while the assistant is busy.
fn spawn_command(session: &AssistantSession, command: Command) {
    let session = session.clone();
    tokio::spawn(async move {
        let outcome = match command {
            Command::Chat(text) => session.submit_text(text).await,
            Command::Reply(n) => {
                let replies = session.latest_quick_replies().await;
                match replies.into_iter().nth(n - 1) {
                    Some(reply) => session.select_quick_reply(reply).await,
                    None => {
                        println!("{}", format!("No quick reply #{}.", n).yellow());
                        return;
                    }
                }
            }
            Command::Action(n) => {
                let actions = session.latest_actions().await;
                match actions.into_iter().nth(n - 1) {
                    Some(action) => session.invoke_action(action).await,
                    None => {
                        println!("{}", format!("No action #{}.", n).yellow());
                        return;
                    }
                }
            }
            Command::Confirm => match session.active_issue_draft().await {
                Some((message_id, _)) => session.confirm_issue_draft(&message_id).await,
                None => DispatchOutcome::Rejected(RejectReason::NotActionable),
            },
            Command::Modify => match session.active_issue_draft().await {
                Some((message_id, _)) => session.modify_issue_draft(&message_id).await,
                None => DispatchOutcome::Rejected(RejectReason::NotActionable),
            },
            Command::Reset => {
                if let Err(e) = session.reset().await {
                    println!("{}", format!("Reset failed: {}", e).red());
                }
                return;
            }
            Command::Quit | Command::Unknown(_) => return,
        };
        report_outcome(&outcome);
    });
}

#[tokio::main]
async fn main() -> Result<()> {
    let config_service = ConfigService::new_default()?;
    let config = config_service.get_config()?;
    init_tracing(&config);
    tracing::debug!("Loaded config from {}", config_service.path().display());

    let identity: Arc<dyn IdentityProvider> = Arc::new(HttpIdentityProvider::from_config(&config));
    let service: Arc<dyn ConversationService> =
        Arc::new(HttpConversationService::from_config(&config));

    println!("{}", "=== Hearth Assistant ===".bright_magenta().bold());
    println!(
        "{}",
        "Chat freely. Commands: /reply <n>, /action <n>, /confirm, /modify, /reset, /quit."
            .bright_black()
    );
    println!();

    let (session, events) = match AssistantSession::open(identity, service, config).await {
        Ok(opened) => opened,
        Err(e) if e.is_context_unavailable() => {
            eprintln!("{}", format!("Could not identify you: {}", e).red());
            return Ok(());
        }
        Err(e) => return Err(e.into()),
    };
    let renderer = tokio::spawn(render_events(session.clone(), events));

    let mut rl: Editor<CliHelper, DefaultHistory> = Editor::new()?;
    rl.set_helper(Some(CliHelper::new()));

    loop {
        match rl.readline(">> ") {
            Ok(line) => {
                let Some(command) = Command::parse(&line) else {
                    continue;
                };
                let _ = rl.add_history_entry(line.as_str());

                match command {
                    Command::Quit => {
                        println!("{}", "Goodbye!".bright_green());
                        break;
                    }
                    Command::Unknown(input) => {
                        println!("{}", format!("Unknown command: {}", input).bright_black());
                    }
                    command => spawn_command(&session, command),
                }
            }
            Err(rustyline::error::ReadlineError::Interrupted) => {
                println!("{}", "CTRL-C detected. Type /quit to exit.".yellow());
            }
            Err(rustyline::error::ReadlineError::Eof) => {
                println!("{}", "CTRL-D detected. Exiting...".bright_green());
                break;
            }
            Err(err) => {
                eprintln!("{}", format!("Error: {:?}", err).red());
                break;
            }
        }
    }

    session.close();
    let _ = renderer.await;

    Ok(())
}
