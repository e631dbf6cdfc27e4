#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CommandBinding {
    pub verb: &'static str,
    pub usage: &'static str,
    pub action: &'static str,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShellAction {
    Help,
    Quit,
}

pub const SHELL_BINDINGS: [CommandBinding; 2] = [
    CommandBinding {
        verb: "help",
        usage: "help",
        action: "list commands",
    },
    CommandBinding {
        verb: "quit",
        usage: "quit",
        action: "save and leave",
    },
];

/// Form fields in a command line are separated by `;`, one slot per input
/// field.
pub const SLOT_SEPARATOR: char = ';';

pub fn shell_action_for_verb(verb: &str) -> Option<ShellAction> {
    match verb {
        "help" | "?" => Some(ShellAction::Help),
        "quit" | "exit" => Some(ShellAction::Quit),
        _ => None,
    }
}

/// Splits a line into a lowercased verb and the untouched remainder.
/// Blank lines yield `None`.
pub fn split_command(line: &str) -> Option<(String, &str)> {
    let line = line.trim();
    if line.is_empty() {
        return None;
    }
    match line.split_once(char::is_whitespace) {
        Some((verb, rest)) => Some((verb.to_ascii_lowercase(), rest.trim())),
        None => Some((line.to_ascii_lowercase(), "")),
    }
}

/// Reads exactly `count` trimmed form slots; missing slots are empty and
/// extra text stays in the last slot.
pub fn form_slots(args: &str, count: usize) -> Vec<&str> {
    let mut slots = args
        .splitn(count.max(1), SLOT_SEPARATOR)
        .map(str::trim)
        .collect::<Vec<_>>();
    slots.resize(count, "");
    slots
}

pub fn controls_legend(bindings: &[CommandBinding]) -> String {
    let mut all = bindings.to_vec();
    all.extend(SHELL_BINDINGS);
    let parts = all
        .iter()
        .map(|binding| format!("{} ({})", binding.usage, binding.action))
        .collect::<Vec<_>>();
    format!("Commands: {}", parts.join("  "))
}
