//! 实时变更协议
//!
//! 这些类型在 kafe-server 和 kafe-client 之间共享：
//!
//! ```text
//!  write (HTTP) ──► store ──► ChangeHub (per store) ──► ws session ──► client reducer
//!                                  │ seq + 1 per event        │ scope filter
//! ```
//!
//! - [`ChangeEvent`]: typed insert / update / delete per entity
//! - [`ChangeEnvelope`]: event plus per-store sequence number
//! - [`SubscriptionScope`]: dashboard (whole store) or table session filter
//! - [`LiveServerMessage`] / [`LiveClientCommand`]: WebSocket frames

pub mod event;
pub mod scope;
pub mod ws;

pub use event::*;
pub use scope::*;
pub use ws::*;
