//! Business logic: channel membership, mediator client, and event routing.

pub mod channel;
pub mod proxy;
pub mod router;

#[cfg(test)]
pub(crate) mod mock_mediator;

pub use channel::ChannelService;
pub use proxy::{ProxyClient, ProxyOutcome};
pub use router::EventRouter;
