//! Event plumbing shared by the domain crates.
//!
//! Contains the [`Event`] contract, the [`EventEnvelope`] stream unit, and a
//! minimal pub/sub [`EventBus`] with an in-memory implementation for tests
//! and single-process use.

pub mod bus;
pub mod envelope;
pub mod event;
pub mod in_memory_bus;

pub use bus::{EventBus, Subscription};
pub use envelope::EventEnvelope;
pub use event::Event;
pub use in_memory_bus::{InMemoryBusError, InMemoryEventBus};
