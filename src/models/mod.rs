//! Data models for channel messages, mediator events, and connections.

pub mod connection;
pub mod message;
pub mod proxy;

pub use connection::*;
pub use message::*;
pub use proxy::*;
