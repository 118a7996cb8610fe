//! A minimal example demonstrating ordered event dispatch.
//!
//! Run with: `cargo run --example quickstart`

// NB: the 'ANCHOR's support embedding in mdbook in docs/ directory.

// ANCHOR: full_example
use std::sync::LazyLock;

use cascade::{Aggregate, Apply, Chain, Chained, DomainEvent, EventKind};

// ANCHOR: events
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AccountOpened {
    pub initial_balance: i64,
}

impl DomainEvent for AccountOpened {
    const KIND: &'static str = "account.opened";
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FundsDeposited {
    pub amount: i64,
}

impl DomainEvent for FundsDeposited {
    const KIND: &'static str = "account.deposited";
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AccountFrozen;

impl DomainEvent for AccountFrozen {
    const KIND: &'static str = "account.frozen";
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum AccountEvent {
    Opened(AccountOpened),
    Deposited(FundsDeposited),
    Frozen(AccountFrozen),
}

impl AccountEvent {
    fn as_opened(&self) -> Option<&AccountOpened> {
        match self {
            Self::Opened(e) => Some(e),
            _ => None,
        }
    }

    fn as_deposited(&self) -> Option<&FundsDeposited> {
        match self {
            Self::Deposited(e) => Some(e),
            _ => None,
        }
    }
}

impl EventKind for AccountEvent {
    fn kind(&self) -> &'static str {
        match self {
            Self::Opened(_) => AccountOpened::KIND,
            Self::Deposited(_) => FundsDeposited::KIND,
            Self::Frozen(_) => AccountFrozen::KIND,
        }
    }
}
// ANCHOR_END: events

// ANCHOR: aggregate
#[derive(Debug, Default)]
pub struct Account {
    balance: i64,
}

impl Aggregate for Account {
    type Event = AccountEvent;

    const KIND: &'static str = "account";
}

impl Apply<AccountOpened> for Account {
    fn apply(&mut self, event: &AccountOpened) {
        self.balance = event.initial_balance;
    }
}

impl Apply<FundsDeposited> for Account {
    fn apply(&mut self, event: &FundsDeposited) {
        self.balance += event.amount;
    }
}
// ANCHOR_END: aggregate

// ANCHOR: chain
static ACCOUNT_CHAIN: LazyLock<Chain<Account>> = LazyLock::new(|| {
    Chain::<Account>::builder()
        .on(AccountEvent::as_opened)
        .on(AccountEvent::as_deposited)
        .exclusive()
        .build()
        .expect("account chain is valid")
});

impl Chained for Account {
    fn chain() -> &'static Chain<Self> {
        &ACCOUNT_CHAIN
    }
}
// ANCHOR_END: chain

// ANCHOR: main
fn main() -> Result<(), Box<dyn std::error::Error>> {
    let mut account = Account::default();

    let applied = account.replay([
        AccountEvent::Opened(AccountOpened { initial_balance: 0 }),
        AccountEvent::Deposited(FundsDeposited { amount: 100 }),
    ])?;
    println!("Applied {applied} events, balance: {}", account.balance);
    assert_eq!(account.balance, 100);

    // No handler covers freezing yet: the event comes back as an error.
    let err = account
        .apply_event(AccountEvent::Frozen(AccountFrozen))
        .unwrap_err();
    println!("{err}");

    let uncovered = Account::chain().uncovered(&[
        AccountOpened::KIND,
        FundsDeposited::KIND,
        AccountFrozen::KIND,
    ]);
    println!("Kinds without a handler: {uncovered:?}");

    Ok(())
}
// ANCHOR_END: main
// ANCHOR_END: full_example
