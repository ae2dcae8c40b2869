//! Kafe Client - sessions over the kafe-server API
//!
//! - [`HttpClient`] / [`OrderingApi`]: REST calls, envelope unwrapping
//! - [`cart`]: customer cart with pluggable persistence
//! - [`sync`]: live feed subscription, reducers, optimistic overlay
//! - [`session`]: customer table session and staff dashboard session

pub mod api;
pub mod cart;
pub mod config;
pub mod error;
pub mod http;
pub mod notice;
pub mod session;
pub mod sync;

pub use api::OrderingApi;
pub use cart::{CartItem, CartStorage, CartStore, FileCartStorage, MemoryCartStorage};
pub use config::ClientConfig;
pub use error::{ClientError, ClientResult};
pub use http::HttpClient;
pub use notice::Notice;
pub use session::{CustomerSession, DashboardSession, SettlementOutcome};
pub use sync::{ConnectionStatus, LiveState, LiveSubscription, SyncFrame};

// Re-export shared types for convenience
pub use shared::error::{ApiResponse, ErrorCode};
