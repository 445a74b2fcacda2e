/// A line typed at the prompt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Free text for the assistant.
    Chat(String),
    /// `/reply <n>`: pick the n-th quick reply (1-based).
    Reply(usize),
    /// `/action <n>`: invoke the n-th action (1-based).
    Action(usize),
    Confirm,
    Modify,
    Reset,
    Quit,
    /// Anything that starts with `/` but is not understood.
    Unknown(String),
}

pub const COMMANDS: &[&str] = &[
    "/reply", "/action", "/confirm", "/modify", "/reset", "/quit",
];

impl Command {
    pub fn parse(line: &str) -> Option<Self> {
        let trimmed = line.trim();
        if trimmed.is_empty() {
            return None;
        }
        if trimmed == "quit" || trimmed == "exit" {
            return Some(Command::Quit);
        }
        if !trimmed.starts_with('/') {
            return Some(Command::Chat(trimmed.to_string()));
        }

        let mut parts = trimmed.split_whitespace();
        let name = parts.next().unwrap_or_default();
        let index = parts
            .next()
            .and_then(|n| n.parse::<usize>().ok())
            .filter(|n| *n > 0);
        let command = match (name, index) {
            ("/reply", Some(n)) => Command::Reply(n),
            ("/action", Some(n)) => Command::Action(n),
            ("/confirm", _) => Command::Confirm,
            ("/modify", _) => Command::Modify,
            ("/reset", _) => Command::Reset,
            ("/quit", _) | ("/exit", _) => Command::Quit,
            _ => Command::Unknown(trimmed.to_string()),
        };
        Some(command)
    }
}
