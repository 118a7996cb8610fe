//! Core traits and types for the Cascade event dispatch library.
//!
//! This crate provides the building blocks for applying domain events to
//! aggregates through an ordered chain of handlers:
//!
//! - [`aggregate`] - The mutated side (`Aggregate`, `Apply`, `Chained`)
//! - [`event`] - Event kind markers (`DomainEvent`, `EventKind`)
//! - [`handler`] - Handler nodes (`TryApply`, `Variant`, `FnHandler`)
//! - [`chain`] - Ordered dispatch and assembly (`Chain`, `ChainBuilder`)
//! - [`error`] - `UnhandledEvent`, `ReplayError` and `BuildError`
//!
//! Most users should depend on the [`cascade`](https://docs.rs/cascade) crate,
//! which re-exports these types with a cleaner API surface.

pub mod aggregate;
pub mod chain;
pub mod error;
pub mod event;
pub mod handler;
