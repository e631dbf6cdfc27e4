use crate::commands::CommandBinding;
use crate::errors::DeskError;
use crate::shell::Desk;
use crate::types::AppKind;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GuessRules {
    pub min: i32,
    pub max: i32,
    pub max_attempts: u32,
}

impl Default for GuessRules {
    fn default() -> Self {
        Self {
            min: 1,
            max: 100,
            max_attempts: 7,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GuessOutcome {
    TooLow,
    TooHigh,
    Correct { attempts: u32 },
    OutOfAttempts { answer: i32 },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GuessAction {
    Start,
    NewRound,
    Guess,
    Score,
}

pub const GUESS_BINDINGS: [CommandBinding; 4] = [
    CommandBinding {
        verb: "start",
        usage: "start",
        action: "start game",
    },
    CommandBinding {
        verb: "new",
        usage: "new",
        action: "new round",
    },
    CommandBinding {
        verb: "guess",
        usage: "guess <n>",
        action: "submit guess",
    },
    CommandBinding {
        verb: "score",
        usage: "score",
        action: "show score",
    },
];

pub fn action_for_verb(verb: &str) -> Option<GuessAction> {
    match verb {
        "start" => Some(GuessAction::Start),
        "new" | "round" => Some(GuessAction::NewRound),
        "guess" | "g" => Some(GuessAction::Guess),
        "score" => Some(GuessAction::Score),
        _ => None,
    }
}

/// Session state for the guessing game. One generator lives for the whole
/// session so a fixed seed replays the same sequence of targets.
pub struct GuessGame {
    rules: GuessRules,
    rng: StdRng,
    target: i32,
    attempts: u32,
    rounds: u32,
    rounds_won: u32,
    started: bool,
    in_progress: bool,
}

impl GuessGame {
    /// Fails on an empty range (`min > max`) or a zero attempt limit.
    pub fn new(rules: GuessRules, seed: u64) -> Result<Self, DeskError> {
        if rules.min > rules.max {
            return Err(DeskError::InvalidConfig(format!(
                "guess range {}..={} is empty",
                rules.min, rules.max
            )));
        }
        if rules.max_attempts == 0 {
            return Err(DeskError::InvalidConfig(
                "guess.max_attempts must be greater than zero".to_string(),
            ));
        }
        Ok(Self {
            rules,
            rng: StdRng::seed_from_u64(seed),
            target: 0,
            attempts: 0,
            rounds: 0,
            rounds_won: 0,
            started: false,
            in_progress: false,
        })
    }

    pub fn start(&mut self) -> Result<(), DeskError> {
        if self.started {
            return Err(DeskError::InvalidInput(
                "The game has already started.".to_string(),
            ));
        }
        self.started = true;
        self.new_round()
    }

    pub fn new_round(&mut self) -> Result<(), DeskError> {
        if !self.started {
            return Err(DeskError::InvalidInput(
                "Start the game first.".to_string(),
            ));
        }
        if self.in_progress {
            return Err(DeskError::InvalidInput(
                "Finish the current round first.".to_string(),
            ));
        }
        self.target = self.rng.gen_range(self.rules.min..=self.rules.max);
        self.attempts = 0;
        self.in_progress = true;
        self.rounds += 1;
        Ok(())
    }

    pub fn guess(&mut self, text: &str) -> Result<GuessOutcome, DeskError> {
        if !self.in_progress {
            return Err(DeskError::InvalidInput(
                "No round in progress.".to_string(),
            ));
        }
        let value: i32 = text.trim().parse().map_err(|_| {
            DeskError::InvalidInput("Invalid input. Please enter a valid number.".to_string())
        })?;
        self.attempts += 1;

        if value == self.target {
            self.in_progress = false;
            self.rounds_won += 1;
            return Ok(GuessOutcome::Correct {
                attempts: self.attempts,
            });
        }
        if self.attempts >= self.rules.max_attempts {
            self.in_progress = false;
            return Ok(GuessOutcome::OutOfAttempts {
                answer: self.target,
            });
        }
        if value < self.target {
            Ok(GuessOutcome::TooLow)
        } else {
            Ok(GuessOutcome::TooHigh)
        }
    }

    pub fn rules(&self) -> GuessRules {
        self.rules
    }

    pub fn attempts(&self) -> u32 {
        self.attempts
    }

    pub fn rounds(&self) -> u32 {
        self.rounds
    }

    pub fn rounds_won(&self) -> u32 {
        self.rounds_won
    }

    pub fn in_progress(&self) -> bool {
        self.in_progress
    }

    fn round_banner(&self) -> String {
        format!(
            "Round {}: guess the number between {} and {}. You have {} chances.",
            self.rounds, self.rules.min, self.rules.max, self.rules.max_attempts
        )
    }

    fn score_line(&self) -> String {
        format!("Score: {}", self.rounds_won)
    }
}

pub fn describe_outcome(outcome: GuessOutcome) -> String {
    match outcome {
        GuessOutcome::TooLow => "Try again. Your guess is too low.".to_string(),
        GuessOutcome::TooHigh => "Try again. Your guess is too high.".to_string(),
        GuessOutcome::Correct { attempts } => {
            format!("Congratulations! You guessed the number in {attempts} attempts.")
        }
        GuessOutcome::OutOfAttempts { answer } => format!(
            "You have reached the maximum number of attempts. The correct number was: {answer}"
        ),
    }
}

impl Desk for GuessGame {
    fn app(&self) -> AppKind {
        AppKind::Guess
    }

    fn bindings(&self) -> &'static [CommandBinding] {
        &GUESS_BINDINGS
    }

    fn handle(&mut self, verb: &str, args: &str) -> Result<Vec<String>, DeskError> {
        let Some(action) = action_for_verb(verb) else {
            return Err(DeskError::InvalidInput(format!("Unknown command: {verb}")));
        };
        match action {
            GuessAction::Start => {
                self.start()?;
                Ok(vec![self.round_banner()])
            }
            GuessAction::NewRound => {
                self.new_round()?;
                Ok(vec![self.round_banner()])
            }
            GuessAction::Guess => {
                let outcome = self.guess(args)?;
                let mut lines = vec![describe_outcome(outcome)];
                if !self.in_progress {
                    lines.push(self.score_line());
                }
                Ok(lines)
            }
            GuessAction::Score => Ok(vec![format!(
                "{} (rounds played: {})",
                self.score_line(),
                self.rounds
            )]),
        }
    }
}
