//! State management module.
//!
//! Registries own all mutable state and are reached only by message
//! passing; the [`Matrix`] bundles their handles.

pub mod channel;
mod matrix;
pub mod nick;
pub mod output;
mod user;

pub use channel::{ChannelRegistry, ChannelRequest, MessageKind};
pub use matrix::{Matrix, ServerInfo};
pub use nick::NickRegistry;
pub use output::{Delivery, DeliveryExit, OutputQueue, OutputReceiver, spawn_delivery};
pub use user::{User, UserId};
