//! `padbot-driver` – mirrors one Padbot robot into memory.
//!
//! Two background pollers keep a [`Snapshot`] of the robot's `/health` and
//! `/status` endpoints fresh. Property reads are answered from that snapshot
//! without touching the network; writing `robotLocation` sends a
//! fire-and-forget `/navigation` command.
//!
//! # Modules
//!
//! - [`driver`] – [`PadbotDriver`]: lifecycle (initialize / shutdown) and the
//!   property read/write mapping.
//! - [`adapter`] – [`ProtocolDriver`]: the JSON-blob contract the host
//!   platform drives the mapper through.
//! - [`gateway`] – [`Gateway`] trait and its `reqwest` implementation
//!   [`HttpGateway`].
//! - [`state`] – [`Snapshot`]: lock-free, atomically swapped status record
//!   plus the health flag.
//! - `poller` – the health and status loops, each with its own stop channel.
//! - [`dispatch`] – [`Dispatcher`]: one detached task per navigation command.
//! - [`events`] – [`DispatchEvents`]: broadcast channel reporting what became
//!   of each navigation command.
//! - [`config`] – [`DriverConfig`]: poll period, timeouts, buffer sizes.

pub mod adapter;
pub mod config;
pub mod dispatch;
pub mod driver;
pub mod events;
pub mod gateway;
pub(crate) mod poller;
pub mod state;

#[cfg(test)]
mod mock;

pub use adapter::{PROTOCOL_NAME, ProtocolDriver};
pub use config::DriverConfig;
pub use dispatch::Dispatcher;
pub use driver::PadbotDriver;
pub use events::DispatchEvents;
pub use gateway::{Gateway, GatewayError, HttpGateway};
pub use state::Snapshot;
