//! Cart domain module (reversible, inventory-backed).
//!
//! Every mutation is a [`CartCommand`] value executed through the
//! [`CommandInvoker`], which keeps the LIFO history behind single-step undo.
//! [`CartSession`] ties cart, catalog, history, and event publishing together
//! behind one facade.

pub mod cart;
pub mod command;
pub mod event;
pub mod invoker;
pub mod session;

pub use cart::Cart;
pub use command::{AddItem, CartCommand, ChangeQuantity, CommandKind, RemoveItem};
pub use event::{CartEvent, ItemAdded, ItemRemoved, OperationUndone, QuantityChanged};
pub use invoker::CommandInvoker;
pub use session::CartSession;
