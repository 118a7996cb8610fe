#![doc = include_str!("../README.md")]

#[cfg(feature = "test-util")]
pub use cascade_core::test;
pub use cascade_core::{
    aggregate,
    aggregate::{Aggregate, Apply, Chained},
    chain,
    chain::{Applied, Chain, ChainBuilder, Dispatch, Manifest},
    error,
    error::{BuildError, ReplayError, UnhandledEvent},
    event,
    event::{DomainEvent, EventKind},
    handler,
    handler::TryApply,
};
