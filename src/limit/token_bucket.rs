//! Blocking token bucket backed by `governor`'s GCRA limiter.

// std
use std::num::NonZeroU32;
// crates.io
use governor::{DefaultDirectRateLimiter, Quota as GovernorQuota, RateLimiter};
// self
use crate::{
	_prelude::*,
	error::ConfigError,
	limit::{LimitFuture, Limiter, WaitContext},
	obs::{self, LimiterKind, PermitOutcome},
};

/// Token bucket that waits for replenishment instead of failing.
///
/// Waits honour the caller's [`WaitContext`]: a cancelled or expired context abandons the wait
/// with [`Error::Cancelled`] or [`Error::DeadlineExceeded`] without consuming a cell.
pub struct TokenBucket(DefaultDirectRateLimiter);
impl TokenBucket {
	/// Wraps a `governor` quota.
	pub fn new(quota: GovernorQuota) -> Self {
		Self(RateLimiter::direct(quota))
	}

	/// Replenishes `rate` cells per second, holding at most `burst` at once.
	pub fn per_second(rate: NonZeroU32, burst: NonZeroU32) -> Self {
		Self::new(GovernorQuota::per_second(rate).allow_burst(burst))
	}

	/// Replenishes one cell every `period`, holding at most `burst` at once.
	pub fn with_period(period: Duration, burst: u32) -> Result<Self, ConfigError> {
		let invalid = || ConfigError::InvalidRate { period, burst };
		let period = StdDuration::try_from(period).map_err(|_| invalid())?;
		let burst = NonZeroU32::new(burst).ok_or_else(invalid)?;
		let quota = GovernorQuota::with_period(period).ok_or_else(invalid)?.allow_burst(burst);

		Ok(Self::new(quota))
	}
}
impl Limiter for TokenBucket {
	fn wait<'a>(&'a self, context: &'a WaitContext) -> LimitFuture<'a> {
		Box::pin(async move {
			let result = context
				.guard(async {
					self.0.until_ready().await;

					Ok(())
				})
				.await;

			obs::record_permit_outcome(LimiterKind::TokenBucket, PermitOutcome::of(&result));

			result
		})
	}
}
impl Debug for TokenBucket {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str("TokenBucket(..)")
	}
}

#[cfg(test)]
mod tests {
	// self
	use super::*;

	#[test]
	fn with_period_validates_inputs() {
		assert!(TokenBucket::with_period(Duration::milliseconds(10), 1).is_ok());
		assert_eq!(
			TokenBucket::with_period(Duration::ZERO, 1).expect_err("Zero period is invalid."),
			ConfigError::InvalidRate { period: Duration::ZERO, burst: 1 }
		);
		assert!(TokenBucket::with_period(Duration::milliseconds(-1), 1).is_err());
		assert!(TokenBucket::with_period(Duration::milliseconds(10), 0).is_err());
	}

	#[tokio::test]
	async fn blocks_until_replenished() {
		let bucket = TokenBucket::with_period(Duration::milliseconds(50), 1)
			.expect("Token bucket parameters should be valid.");
		let context = WaitContext::new();
		let started = Instant::now();

		bucket.wait(&context).await.expect("Burst cell should be available.");
		bucket.wait(&context).await.expect("Replenished cell should be granted.");

		assert!(started.elapsed() >= StdDuration::from_millis(40));
	}

	#[tokio::test]
	async fn deadline_abandons_wait() {
		let bucket = TokenBucket::with_period(Duration::seconds(10), 1)
			.expect("Token bucket parameters should be valid.");

		bucket.wait(&WaitContext::new()).await.expect("Burst cell should be available.");

		let context = WaitContext::new().with_timeout(StdDuration::from_millis(20));
		let err = bucket.wait(&context).await.expect_err("Empty bucket should hit the deadline.");

		assert!(matches!(err, Error::DeadlineExceeded));
	}
}
