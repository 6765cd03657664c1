//! Event publishing/subscription abstraction (mechanics only).
//!
//! This module provides a small **pub/sub** surface for distributing domain
//! events to consumers (loggers, projections, UI observers, etc.).
//!
//! The bus is intentionally lightweight:
//!
//! - **Transport-agnostic**: works with in-memory channels today, anything else later
//! - **Broadcast semantics**: every subscriber receives a copy of every published message
//! - **No persistence**: the bus distributes events, it does not store them

use std::sync::Arc;
use std::sync::mpsc::Receiver;
use std::time::Duration;

/// A subscription to an event stream.
///
/// Each subscription gets a copy of all messages published after it was
/// created (broadcast semantics). Subscriptions are designed for
/// single-threaded consumption; hand one receiver to one consumer.
///
/// ```ignore
/// let subscription = bus.subscribe();
///
/// loop {
///     match subscription.recv_timeout(Duration::from_secs(1)) {
///         Ok(event) => process(event)?,
///         Err(std::sync::mpsc::RecvTimeoutError::Timeout) => continue,
///         Err(std::sync::mpsc::RecvTimeoutError::Disconnected) => break,
///     }
/// }
/// ```
#[derive(Debug)]
pub struct Subscription<M> {
    receiver: Receiver<M>,
}

impl<M> Subscription<M> {
    pub fn new(receiver: Receiver<M>) -> Self {
        Self { receiver }
    }

    /// Block until the next message is available.
    pub fn recv(&self) -> Result<M, std::sync::mpsc::RecvError> {
        self.receiver.recv()
    }

    /// Try to receive a message without blocking.
    pub fn try_recv(&self) -> Result<M, std::sync::mpsc::TryRecvError> {
        self.receiver.try_recv()
    }

    /// Block for up to `timeout` waiting for a message.
    pub fn recv_timeout(&self, timeout: Duration) -> Result<M, std::sync::mpsc::RecvTimeoutError> {
        self.receiver.recv_timeout(timeout)
    }

    /// Drain every message that is already buffered, without blocking.
    pub fn drain(&self) -> Vec<M> {
        let mut messages = Vec::new();
        while let Ok(message) = self.receiver.try_recv() {
            messages.push(message);
        }
        messages
    }
}

/// Domain-agnostic event bus (pub/sub abstraction).
///
/// Implementations fan each published message out to every live subscriber.
/// Messages are delivered in publish order per publisher; consumers that need
/// a total order should serialize publishing through a single writer.
///
/// `publish()` can fail (bus poisoned, transport down). Failures surface to
/// the caller, which decides whether to retry or drop the message.
pub trait EventBus<M>: Send + Sync {
    type Error: core::fmt::Debug + Send + Sync + 'static;

    fn publish(&self, message: M) -> Result<(), Self::Error>;

    fn subscribe(&self) -> Subscription<M>;
}

impl<M, B> EventBus<M> for Arc<B>
where
    B: EventBus<M> + ?Sized,
{
    type Error = B::Error;

    fn publish(&self, message: M) -> Result<(), Self::Error> {
        (**self).publish(message)
    }

    fn subscribe(&self) -> Subscription<M> {
        (**self).subscribe()
    }
}
