//! Client configuration

use std::path::PathBuf;
use std::time::Duration;

/// Default file the cart is persisted to
pub const CART_FILE_NAME: &str = "smartkafe-cart.json";

/// Client configuration for connecting to kafe-server
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Server base URL (e.g., "http://localhost:8080")
    pub base_url: String,

    /// Request timeout in seconds
    pub timeout: u64,

    /// Where the customer cart is persisted
    pub cart_path: PathBuf,

    /// First reconnect delay of the live feed
    pub reconnect_initial: Duration,

    /// Reconnect delay cap
    pub reconnect_max: Duration,

    /// Silence after which the live feed counts as timed out
    pub heartbeat_timeout: Duration,
}

impl ClientConfig {
    /// Create a new client configuration
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            timeout: 30,
            cart_path: PathBuf::from(CART_FILE_NAME),
            reconnect_initial: Duration::from_secs(1),
            reconnect_max: Duration::from_secs(30),
            heartbeat_timeout: Duration::from_secs(45),
        }
    }

    /// Set the request timeout
    pub fn with_timeout(mut self, seconds: u64) -> Self {
        self.timeout = seconds;
        self
    }

    /// Set the cart file
    pub fn with_cart_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.cart_path = path.into();
        self
    }

    /// Set reconnect backoff bounds
    pub fn with_reconnect(mut self, initial: Duration, max: Duration) -> Self {
        self.reconnect_initial = initial;
        self.reconnect_max = max.max(initial);
        self
    }

    /// Set the heartbeat timeout
    pub fn with_heartbeat_timeout(mut self, timeout: Duration) -> Self {
        self.heartbeat_timeout = timeout;
        self
    }

    /// Create an HTTP client from this configuration
    pub fn build_http_client(&self) -> crate::ClientResult<crate::HttpClient> {
        crate::HttpClient::new(self)
    }
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self::new("http://localhost:8080")
    }
}
