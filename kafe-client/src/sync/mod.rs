//! 实时同步 (client side)
//!
//! ```text
//!  LiveSubscription ──SyncFrame──► reducer ──► LiveState ──► Optimistic::view ──► UI
//!   (ws worker)                      │
//!                                    └──► Vec<Notice> (sound / toast)
//! ```

mod optimistic;
mod reducer;
mod status;
mod subscription;

pub use optimistic::{Optimistic, kitchen_queue};
pub use reducer::{LiveState, apply_envelope, apply_frame, apply_snapshot, reduce};
pub use status::{ConnectionStatus, status_channel};
pub use subscription::{LiveSubscription, live_url};

use shared::live::{ChangeEnvelope, LiveSnapshot};

/// One item of the live feed stream
#[derive(Debug, Clone, PartialEq)]
pub enum SyncFrame {
    /// Full state of the scope; replaces everything mirrored so far
    Snapshot(LiveSnapshot),
    Change(ChangeEnvelope),
}
