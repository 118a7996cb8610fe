//! A single chain serving many aggregates at once, and its manifest.

use std::sync::Arc;

use cascade::{Aggregate, Apply, Chain, DomainEvent, EventKind};

#[derive(Debug, Clone, PartialEq, Eq)]
struct Deposited {
    amount: u64,
}

impl DomainEvent for Deposited {
    const KIND: &'static str = "wallet.deposited";
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct Withdrawn {
    amount: u64,
}

impl DomainEvent for Withdrawn {
    const KIND: &'static str = "wallet.withdrawn";
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum WalletEvent {
    Deposited(Deposited),
    Withdrawn(Withdrawn),
}

impl WalletEvent {
    fn as_deposited(&self) -> Option<&Deposited> {
        match self {
            Self::Deposited(e) => Some(e),
            Self::Withdrawn(_) => None,
        }
    }

    fn as_withdrawn(&self) -> Option<&Withdrawn> {
        match self {
            Self::Withdrawn(e) => Some(e),
            Self::Deposited(_) => None,
        }
    }
}

impl EventKind for WalletEvent {
    fn kind(&self) -> &'static str {
        match self {
            Self::Deposited(_) => Deposited::KIND,
            Self::Withdrawn(_) => Withdrawn::KIND,
        }
    }
}

#[derive(Debug, Default)]
struct Wallet {
    balance: u64,
}

impl Aggregate for Wallet {
    type Event = WalletEvent;

    const KIND: &'static str = "wallet";
}

impl Apply<Deposited> for Wallet {
    fn apply(&mut self, event: &Deposited) {
        self.balance += event.amount;
    }
}

impl Apply<Withdrawn> for Wallet {
    fn apply(&mut self, event: &Withdrawn) {
        self.balance -= event.amount;
    }
}

fn wallet_chain() -> Chain<Wallet> {
    Chain::<Wallet>::builder()
        .on(WalletEvent::as_deposited)
        .on(WalletEvent::as_withdrawn)
        .exclusive()
        .build()
        .unwrap()
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn one_chain_serves_concurrent_aggregates() {
    let chain = Arc::new(wallet_chain());

    let tasks: Vec<_> = (1..=16_u64)
        .map(|n| {
            let chain = Arc::clone(&chain);
            tokio::spawn(async move {
                let mut wallet = Wallet::default();
                let history = (0..n).flat_map(|_| {
                    [
                        WalletEvent::Deposited(Deposited { amount: 10 }),
                        WalletEvent::Withdrawn(Withdrawn { amount: 3 }),
                    ]
                });
                let applied = chain.replay(&mut wallet, history).unwrap();
                (n, applied, wallet.balance)
            })
        })
        .collect();

    for task in tasks {
        let (n, applied, balance) = task.await.unwrap();
        assert_eq!(applied as u64, n * 2);
        assert_eq!(balance, n * 7);
    }
}

#[test]
fn manifest_serializes_to_json() {
    let manifest = wallet_chain().manifest();
    let json = serde_json::to_value(&manifest).unwrap();

    assert_eq!(
        json,
        serde_json::json!({
            "aggregate": "wallet",
            "handlers": [
                { "position": 0, "name": "wallet.deposited", "kinds": ["wallet.deposited"] },
                { "position": 1, "name": "wallet.withdrawn", "kinds": ["wallet.withdrawn"] },
            ]
        })
    );
}
