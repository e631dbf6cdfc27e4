//! The interactive loop shared by every desk.
//!
//! Each input line is one command. Recoverable failures (bad input, lookup
//! misses) are printed and the loop continues; persistence failures are
//! logged and swallowed. Only terminal I/O failures end a session early.

use crate::commands::{
    controls_legend, shell_action_for_verb, split_command, CommandBinding, ShellAction,
};
use crate::errors::DeskError;
use crate::logging::SessionLog;
use crate::runtime::Terminal;
use crate::types::AppKind;
use serde_json::json;
use std::path::PathBuf;

pub trait Desk {
    fn app(&self) -> AppKind;
    fn bindings(&self) -> &'static [CommandBinding];
    fn handle(&mut self, verb: &str, args: &str) -> Result<Vec<String>, DeskError>;

    /// Restores persisted records. `Ok(None)` for desks that keep nothing.
    fn load(&mut self) -> Result<Option<usize>, DeskError> {
        Ok(None)
    }

    fn save(&mut self) -> Result<Option<usize>, DeskError> {
        Ok(None)
    }

    fn data_file(&self) -> Option<PathBuf> {
        None
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SessionSummary {
    pub commands: usize,
    pub rejected: usize,
    pub loaded: Option<usize>,
    pub saved: Option<usize>,
}

/// Runs one session to completion. Records are saved even when the terminal
/// fails mid-session; the terminal error is returned after the save.
pub fn run_session(
    desk: &mut dyn Desk,
    terminal: &dyn Terminal,
    log: &SessionLog,
) -> Result<SessionSummary, DeskError> {
    let app = desk.app();
    let mut summary = SessionSummary::default();
    let data_file = desk.data_file().map(|path| path.display().to_string());
    let mut terminal_error = None;

    log.info(
        "session_start",
        json!({ "app": app.as_str(), "data_file": data_file }),
    );

    match desk.load() {
        Ok(Some(count)) => {
            summary.loaded = Some(count);
            log.info("records_loaded", json!({ "count": count, "data_file": data_file }));
        }
        Ok(None) => {}
        Err(error) => {
            log.error(
                "load_failed",
                json!({ "error": error.to_string(), "data_file": data_file }),
            );
            terminal_error = terminal
                .write_line(&format!("warning: could not load records: {error}"))
                .err();
        }
    }

    if terminal_error.is_none() {
        if let Err(error) = converse(desk, terminal, log, &mut summary) {
            log.error("terminal_failed", json!({ "error": error.to_string() }));
            terminal_error = Some(error);
        }
    }

    match desk.save() {
        Ok(Some(count)) => {
            summary.saved = Some(count);
            log.info("records_saved", json!({ "count": count, "data_file": data_file }));
        }
        Ok(None) => {}
        Err(error) => {
            log.error(
                "save_failed",
                json!({ "error": error.to_string(), "data_file": data_file }),
            );
            if terminal_error.is_none() {
                terminal_error = terminal
                    .write_line(&format!("warning: could not save records: {error}"))
                    .err();
            }
        }
    }

    log.info(
        "session_end",
        json!({ "commands": summary.commands, "rejected": summary.rejected }),
    );
    match terminal_error {
        Some(error) => Err(error),
        None => Ok(summary),
    }
}

fn converse(
    desk: &mut dyn Desk,
    terminal: &dyn Terminal,
    log: &SessionLog,
    summary: &mut SessionSummary,
) -> Result<(), DeskError> {
    terminal.write_line(&format!("{} (type 'help' for commands)", desk.app().title()))?;
    if terminal.stdin_is_tty() {
        terminal.write_line(&controls_legend(desk.bindings()))?;
    }

    loop {
        let line = match terminal.read_line() {
            Ok(Some(line)) => line,
            Ok(None) => break,
            Err(error) if error.is_recoverable() => {
                summary.rejected += 1;
                log.warn("input_rejected", json!({ "message": error.to_string() }));
                terminal.write_line(&format!("error: {error}"))?;
                continue;
            }
            Err(error) => return Err(error),
        };
        let Some((verb, args)) = split_command(&line) else {
            continue;
        };
        match shell_action_for_verb(&verb) {
            Some(ShellAction::Quit) => break,
            Some(ShellAction::Help) => {
                terminal.write_line(&controls_legend(desk.bindings()))?;
                continue;
            }
            None => {}
        }

        summary.commands += 1;
        match desk.handle(&verb, args) {
            Ok(lines) => {
                log.info("command", json!({ "verb": verb }));
                for reply in lines {
                    terminal.write_line(&reply)?;
                }
            }
            Err(error) if error.is_recoverable() => {
                summary.rejected += 1;
                log.warn(
                    "command_rejected",
                    json!({ "verb": verb, "kind": error.kind(), "message": error.to_string() }),
                );
                terminal.write_line(&format!("error: {error}"))?;
            }
            Err(error) => {
                summary.rejected += 1;
                log.error(
                    "command_failed",
                    json!({ "verb": verb, "error": error.to_string() }),
                );
                terminal.write_line(&format!("error: {error}"))?;
            }
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::run_session;
    use crate::atm::Atm;
    use crate::logging::SessionLog;
    use crate::errors::DeskError;
    use crate::runtime::{FakeTerminal, NON_UTF8_INPUT};

    #[test]
    fn rejected_commands_do_not_end_the_session() {
        let terminal = FakeTerminal::with_input([
            "withdraw 10",
            "deposit abc",
            "",
            "frobnicate",
            "deposit 25",
            "balance",
            "quit",
            "deposit 1000",
        ]);
        let mut atm = Atm::default();
        let summary = run_session(&mut atm, &terminal, &SessionLog::disabled()).expect("session");

        assert_eq!(summary.commands, 5);
        assert_eq!(summary.rejected, 3);
        assert_eq!(summary.saved, None);
        assert_eq!(atm.check_balance(), 25);
        let lines = terminal.written_lines();
        assert!(lines.contains(&"error: Insufficient balance for withdrawal.".to_string()));
        assert!(lines.contains(&"error: Invalid amount.".to_string()));
        assert!(lines.contains(&"error: Unknown command: frobnicate".to_string()));
        assert_eq!(lines.last().map(String::as_str), Some("Current Balance: 25"));
    }

    #[test]
    fn help_prints_legend_without_counting_as_command() {
        let terminal = FakeTerminal::with_input(["help"]);
        let mut atm = Atm::default();
        let summary = run_session(&mut atm, &terminal, &SessionLog::disabled()).expect("session");
        assert_eq!(summary.commands, 0);
        let lines = terminal.written_lines();
        assert!(lines.iter().any(|line| line.contains("withdraw <amount>")));
    }

    #[test]
    fn interactive_terminal_gets_legend_up_front() {
        let terminal = FakeTerminal::new(true);
        let mut atm = Atm::default();
        run_session(&mut atm, &terminal, &SessionLog::disabled()).expect("session");
        let lines = terminal.written_lines();
        assert_eq!(lines.len(), 2);
        assert!(lines[1].starts_with("Commands: "));
    }

    #[test]
    fn undecodable_input_line_is_rejected_and_reading_continues() {
        let terminal = FakeTerminal::with_input(["deposit 10"]);
        terminal.push_read_error(DeskError::InvalidInput(NON_UTF8_INPUT.to_string()));
        terminal.push_line("deposit 5");
        let mut atm = Atm::default();

        let summary = run_session(&mut atm, &terminal, &SessionLog::disabled()).expect("session");

        assert_eq!(summary.commands, 2);
        assert_eq!(summary.rejected, 1);
        assert_eq!(atm.check_balance(), 15);
        assert!(terminal
            .written_lines()
            .contains(&format!("error: {NON_UTF8_INPUT}")));
    }
}
