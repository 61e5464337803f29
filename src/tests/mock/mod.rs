//! Scripted stand-ins for the chains the engine talks to.

pub mod node;

pub use self::node::{Connector, Node, ReceiptMode};
