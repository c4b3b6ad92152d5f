//! Declarative throttling configuration.
//!
//! [`ThrottleConfig`] describes the policies to enforce (any number of fixed-window quotas plus
//! an optional token bucket) in a serde-friendly shape so services can load it alongside the
//! rest of their settings. [`ThrottleConfig::build`] validates it and produces the
//! [`CompositeLimiter`] that enforces all policies together.

// self
use crate::{
	_prelude::*,
	error::ConfigError,
	limit::{CompositeLimiter, Limiter, Quota},
};
#[cfg(feature = "governor")] use crate::limit::TokenBucket;

/// Policies enforced on every outbound request.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ThrottleConfig {
	/// Fail-fast fixed-window quotas.
	pub quotas: Vec<QuotaConfig>,
	/// Blocking token bucket.
	#[cfg(feature = "governor")]
	pub token_bucket: Option<TokenBucketConfig>,
}
impl ThrottleConfig {
	/// Adds a fixed-window quota.
	pub fn with_quota(mut self, window_ms: u64, max_permits: u32) -> Self {
		self.quotas.push(QuotaConfig { window_ms, max_permits });

		self
	}

	/// Sets the token bucket.
	#[cfg(feature = "governor")]
	pub fn with_token_bucket(mut self, period_ms: u64, burst: u32) -> Self {
		self.token_bucket = Some(TokenBucketConfig { period_ms, burst });

		self
	}

	/// Validates the configuration and builds one limiter enforcing every policy.
	pub fn build(&self) -> Result<CompositeLimiter, ConfigError> {
		let mut limiters = Vec::<Arc<dyn Limiter>>::with_capacity(self.quotas.len() + 1);

		for quota in &self.quotas {
			limiters.push(Arc::new(quota.build()?));
		}

		#[cfg(feature = "governor")]
		if let Some(bucket) = &self.token_bucket {
			limiters.push(Arc::new(bucket.build()?));
		}

		Ok(CompositeLimiter::new(limiters))
	}
}

/// Fixed-window quota settings.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuotaConfig {
	/// Window length in milliseconds.
	pub window_ms: u64,
	/// Permits granted per window.
	pub max_permits: u32,
}
impl QuotaConfig {
	/// Builds the configured [`Quota`].
	pub fn build(&self) -> Result<Quota, ConfigError> {
		Quota::new(millis("window_ms", self.window_ms)?, self.max_permits)
	}
}

/// Token bucket settings.
#[cfg(feature = "governor")]
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenBucketConfig {
	/// Interval between replenished cells in milliseconds.
	pub period_ms: u64,
	/// Maximum number of cells held at once.
	pub burst: u32,
}
#[cfg(feature = "governor")]
impl TokenBucketConfig {
	/// Builds the configured [`TokenBucket`].
	pub fn build(&self) -> Result<TokenBucket, ConfigError> {
		TokenBucket::with_period(millis("period_ms", self.period_ms)?, self.burst)
	}
}

fn millis(field: &'static str, millis: u64) -> Result<Duration, ConfigError> {
	i64::try_from(millis)
		.map(Duration::milliseconds)
		.map_err(|_| ConfigError::DurationOutOfRange { field, millis })
}
