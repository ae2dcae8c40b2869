//! Live feed connection status (badge)

use tokio::sync::watch;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum ConnectionStatus {
    #[default]
    Connecting,
    /// Snapshot received, changes flowing
    Subscribed,
    /// No frame within the heartbeat timeout
    TimedOut,
    Error(String),
    /// Stopped on request
    Closed,
}

impl ConnectionStatus {
    pub fn is_live(&self) -> bool {
        matches!(self, Self::Subscribed)
    }

    pub fn label(&self) -> &str {
        match self {
            Self::Connecting => "connecting",
            Self::Subscribed => "live",
            Self::TimedOut => "timed out",
            Self::Error(_) => "error",
            Self::Closed => "closed",
        }
    }
}

impl std::fmt::Display for ConnectionStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Error(reason) => write!(f, "error: {reason}"),
            other => f.write_str(other.label()),
        }
    }
}

/// Status channel; the sender stays with the worker
pub fn status_channel() -> (watch::Sender<ConnectionStatus>, watch::Receiver<ConnectionStatus>) {
    watch::channel(ConnectionStatus::Connecting)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_labels() {
        assert!(ConnectionStatus::Subscribed.is_live());
        assert!(!ConnectionStatus::TimedOut.is_live());
        assert_eq!(
            ConnectionStatus::Error("refused".into()).to_string(),
            "error: refused"
        );
        assert_eq!(ConnectionStatus::default().label(), "connecting");
    }

    #[test]
    fn test_channel_starts_connecting() {
        let (tx, rx) = status_channel();
        assert_eq!(*rx.borrow(), ConnectionStatus::Connecting);
        tx.send_replace(ConnectionStatus::Subscribed);
        assert!(rx.borrow().is_live());
    }
}
