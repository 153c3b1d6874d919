//! Per-IP rate limiting for the HTTP surface.
//!
//! Two token buckets are configured: a general one for every route and a
//! stricter one layered over `/user` and `/social`, where credentials are
//! submitted.
//!
//! # Environment Variables
//!
//! - `RATE_LIMIT_ENABLED`: Turn the limiter off entirely (default: true)
//! - `RATE_LIMIT_GENERAL_PER_SECOND`: Replenish interval for general endpoints (default: 2)
//! - `RATE_LIMIT_GENERAL_BURST_SIZE`: Burst size for general endpoints (default: 30)
//! - `RATE_LIMIT_AUTH_PER_SECOND`: Replenish interval for auth endpoints (default: 10)
//! - `RATE_LIMIT_AUTH_BURST_SIZE`: Burst size for auth endpoints (default: 5)
//!
//! Clients are keyed by their peer address ([`PeerIpKeyExtractor`]).
//! Forwarding headers are ignored, so the server must be started with
//! `into_make_service_with_connect_info::<SocketAddr>()`.

use governor::middleware::NoOpMiddleware;
use tower_governor::governor::{GovernorConfig, GovernorConfigBuilder};
use tower_governor::key_extractor::PeerIpKeyExtractor;

pub type IpGovernorConfig = GovernorConfig<PeerIpKeyExtractor, NoOpMiddleware>;

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RateLimitConfig {
    pub enabled: bool,

    /// Seconds between token replenishments for general endpoints.
    pub general_per_second: u64,

    /// Maximum tokens that can accumulate for general endpoints.
    pub general_burst_size: u32,

    /// Seconds between token replenishments for credential endpoints.
    pub auth_per_second: u64,

    /// Maximum tokens that can accumulate for credential endpoints.
    pub auth_burst_size: u32,
}

impl Default for RateLimitConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            general_per_second: 2,
            general_burst_size: 30,
            auth_per_second: 10,
            auth_burst_size: 5,
        }
    }
}

impl RateLimitConfig {
    #[must_use]
    pub fn from_env() -> Self {
        Self {
            enabled: std::env::var("RATE_LIMIT_ENABLED")
                .map(|v| v.to_lowercase() != "false" && v != "0")
                .unwrap_or(true),
            general_per_second: std::env::var("RATE_LIMIT_GENERAL_PER_SECOND")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(2),
            general_burst_size: std::env::var("RATE_LIMIT_GENERAL_BURST_SIZE")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(30),
            auth_per_second: std::env::var("RATE_LIMIT_AUTH_PER_SECOND")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(10),
            auth_burst_size: std::env::var("RATE_LIMIT_AUTH_BURST_SIZE")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(5),
        }
    }

    pub fn disabled() -> Self {
        Self {
            enabled: false,
            ..Self::default()
        }
    }

    /// Returns `None` when the limiter is disabled or the values are zero.
    #[must_use]
    pub fn general_governor_config(&self) -> Option<IpGovernorConfig> {
        self.build(self.general_per_second, self.general_burst_size)
    }

    /// Returns `None` when the limiter is disabled or the values are zero.
    #[must_use]
    pub fn auth_governor_config(&self) -> Option<IpGovernorConfig> {
        self.build(self.auth_per_second, self.auth_burst_size)
    }

    fn build(&self, per_second: u64, burst_size: u32) -> Option<IpGovernorConfig> {
        if !self.enabled {
            return None;
        }

        GovernorConfigBuilder::default()
            .per_second(per_second)
            .burst_size(burst_size)
            .key_extractor(PeerIpKeyExtractor)
            .finish()
    }
}
