use crate::commands::CommandBinding;
use crate::errors::DeskError;
use crate::shell::Desk;
use crate::types::AppKind;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BankAccount {
    balance: i64,
}

impl BankAccount {
    pub fn with_balance(balance: i64) -> Self {
        Self { balance }
    }

    pub fn balance(&self) -> i64 {
        self.balance
    }
}

#[derive(Debug, Clone, Default)]
pub struct Atm {
    account: BankAccount,
}

impl Atm {
    pub fn new(account: BankAccount) -> Self {
        Self { account }
    }

    pub fn deposit(&mut self, amount: i64) -> Result<i64, DeskError> {
        if amount <= 0 {
            return Err(DeskError::InvalidInput(
                "Invalid amount for deposit.".to_string(),
            ));
        }
        self.account.balance = self
            .account
            .balance
            .checked_add(amount)
            .ok_or_else(|| DeskError::InvalidInput("Invalid amount for deposit.".to_string()))?;
        Ok(self.account.balance)
    }

    pub fn withdraw(&mut self, amount: i64) -> Result<i64, DeskError> {
        if amount <= 0 {
            return Err(DeskError::InvalidInput(
                "Invalid amount for withdrawal.".to_string(),
            ));
        }
        if self.account.balance < amount {
            return Err(DeskError::InvalidInput(
                "Insufficient balance for withdrawal.".to_string(),
            ));
        }
        self.account.balance -= amount;
        Ok(self.account.balance)
    }

    pub fn check_balance(&self) -> i64 {
        self.account.balance()
    }
}

pub fn parse_amount(text: &str) -> Result<i64, DeskError> {
    text.trim()
        .parse()
        .map_err(|_| DeskError::InvalidInput("Invalid amount.".to_string()))
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AtmAction {
    Deposit,
    Withdraw,
    Balance,
}

pub const ATM_BINDINGS: [CommandBinding; 3] = [
    CommandBinding {
        verb: "deposit",
        usage: "deposit <amount>",
        action: "deposit",
    },
    CommandBinding {
        verb: "withdraw",
        usage: "withdraw <amount>",
        action: "withdraw",
    },
    CommandBinding {
        verb: "balance",
        usage: "balance",
        action: "show balance",
    },
];

pub fn action_for_verb(verb: &str) -> Option<AtmAction> {
    match verb {
        "deposit" => Some(AtmAction::Deposit),
        "withdraw" => Some(AtmAction::Withdraw),
        "balance" => Some(AtmAction::Balance),
        _ => None,
    }
}

impl Desk for Atm {
    fn app(&self) -> AppKind {
        AppKind::Atm
    }

    fn bindings(&self) -> &'static [CommandBinding] {
        &ATM_BINDINGS
    }

    fn handle(&mut self, verb: &str, args: &str) -> Result<Vec<String>, DeskError> {
        let Some(action) = action_for_verb(verb) else {
            return Err(DeskError::InvalidInput(format!("Unknown command: {verb}")));
        };
        match action {
            AtmAction::Deposit => {
                let balance = self.deposit(parse_amount(args)?)?;
                Ok(vec![format!(
                    "Deposit successful. Current balance: {balance}"
                )])
            }
            AtmAction::Withdraw => {
                let balance = self.withdraw(parse_amount(args)?)?;
                Ok(vec![format!(
                    "Withdrawal successful. Current balance: {balance}"
                )])
            }
            AtmAction::Balance => Ok(vec![format!(
                "Current Balance: {}",
                self.check_balance()
            )]),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{parse_amount, Atm, BankAccount};

    #[test]
    fn deposit_then_withdraw() {
        let mut atm = Atm::default();
        assert_eq!(atm.deposit(500).expect("deposit"), 500);
        assert_eq!(atm.withdraw(200).expect("withdraw"), 300);
        assert_eq!(atm.check_balance(), 300);
    }

    #[test]
    fn non_positive_amounts_are_rejected() {
        let mut atm = Atm::new(BankAccount::with_balance(100));
        assert_eq!(
            atm.deposit(0).expect_err("zero").to_string(),
            "Invalid amount for deposit."
        );
        assert_eq!(
            atm.withdraw(-5).expect_err("negative").to_string(),
            "Invalid amount for withdrawal."
        );
        assert_eq!(atm.check_balance(), 100);
    }

    #[test]
    fn overdraft_is_refused() {
        let mut atm = Atm::new(BankAccount::with_balance(50));
        let err = atm.withdraw(51).expect_err("overdraft");
        assert_eq!(err.to_string(), "Insufficient balance for withdrawal.");
        assert_eq!(atm.withdraw(50).expect("exact"), 0);
    }

    #[test]
    fn amount_must_be_numeric() {
        assert_eq!(parse_amount(" 42 ").expect("parse"), 42);
        assert_eq!(
            parse_amount("4k").expect_err("bad").to_string(),
            "Invalid amount."
        );
    }
}
