use colored::Colorize;
use hearth_application::{AssistantSession, DispatchOutcome, RejectReason, SessionEvent};
use hearth_core::conversation::{Message, MessageMetadata, Sender};
use tokio::sync::mpsc;

/// Prints session events until the session closes.
pub async fn render_events(
    session: AssistantSession,
    mut events: mpsc::UnboundedReceiver<SessionEvent>,
) {
    while let Some(event) = events.recv().await {
        match event {
            SessionEvent::Opened { role } => {
                println!(
                    "{}",
                    format!("Connected as {}.", role.as_str()).bright_black()
                );
            }
            SessionEvent::BusyChanged { busy: true } => {
                println!("{}", "assistant is typing...".bright_black());
            }
            SessionEvent::BusyChanged { busy: false } => {}
            SessionEvent::MessagesAppended { ids } => {
                let messages = session.messages().await;
                for message in messages.iter().filter(|m| ids.contains(&m.id)) {
                    print_message(message);
                }
            }
            SessionEvent::ScrollToLatest { .. } => {}
            SessionEvent::DispatchFailed { error } if error.is_dispatch_failure() => {
                println!("{}", format!("Could not reach the assistant: {}", error).red());
            }
            SessionEvent::DispatchFailed { error } => {
                println!("{}", format!("Error: {}", error).red());
            }
            SessionEvent::IssueDraftActivated { .. } => {
                println!(
                    "{}",
                    "Type /confirm to create this issue or /modify to change it.".bright_yellow()
                );
            }
            SessionEvent::Reset => {
                println!("{}", "Conversation reset.".bright_black());
            }
            SessionEvent::Closed => break,
        }
    }
}

pub fn print_message(message: &Message) {
    match message.sender {
        Sender::User => println!("{}", format!("> {}", message.content).green()),
        Sender::Assistant => {
            for line in message.content.lines() {
                println!("{}", line.bright_blue());
            }
        }
    }

    match &message.metadata {
        MessageMetadata::None => {}
        MessageMetadata::QuickReplies(replies) => {
            for (i, reply) in replies.iter().enumerate() {
                println!("  {}", format!("[{}] {}", i + 1, reply.text).cyan());
            }
        }
        MessageMetadata::Actions(actions) => {
            for (i, action) in actions.iter().enumerate() {
                println!("  {}", format!("({}) {}", i + 1, action.label).magenta());
            }
        }
        MessageMetadata::IssueDraft(draft) => {
            println!("{}", "Suggested issue:".bright_yellow());
            println!("  {}", format!("Title:    {}", draft.suggested_title).yellow());
            println!("  {}", format!("Details:  {}", draft.suggested_description).yellow());
            println!("  {}", format!("Category: {}", draft.suggested_category).yellow());
            println!("  {}", format!("Priority: {}", draft.suggested_priority).yellow());
        }
    }
    println!();
}

/// Explains outcomes the event stream does not already cover.
pub fn report_outcome(outcome: &DispatchOutcome) {
    match outcome {
        DispatchOutcome::Rejected(RejectReason::Busy) => {
            println!("{}", "Still waiting for the previous reply.".yellow());
        }
        DispatchOutcome::Rejected(RejectReason::NotActionable) => {
            println!("{}", "There is no issue draft to act on.".yellow());
        }
        DispatchOutcome::Rejected(RejectReason::Closed) => {
            println!("{}", "The conversation is closed.".yellow());
        }
        DispatchOutcome::Rejected(RejectReason::NotOpen) => {
            println!("{}", "Reconnecting, try again in a moment.".yellow());
        }
        // Failures arrive as events.
        _ => {}
    }
}
