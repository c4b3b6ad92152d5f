//! Fail-fast fixed-window quota.
//!
//! A [`Quota`] grants at most `max_permits` permits per window. Windows sit on a fixed grid that
//! starts when the quota is built; when a call lands past the active window the counter resets
//! and the window start jumps to the grid slot containing "now", no matter how many windows went
//! by unobserved. Once the budget is spent every call fails with [`Error::QuotaExceeded`] right
//! away instead of waiting for the next window.

// self
use crate::{
	_prelude::*,
	error::ConfigError,
	limit::{LimitFuture, Limiter, WaitContext},
	obs::{self, LimiterKind, PermitOutcome},
};

/// Fixed-window permit budget that never blocks.
#[derive(Debug)]
pub struct Quota {
	window: Duration,
	window_std: StdDuration,
	max_permits: u32,
	state: Mutex<QuotaWindow>,
}
impl Quota {
	/// Creates a quota granting `max_permits` permits per `window`.
	///
	/// A zero `max_permits` yields a quota that rejects every request.
	pub fn new(window: Duration, max_permits: u32) -> Result<Self, ConfigError> {
		let window_std = StdDuration::try_from(window)
			.ok()
			.filter(|window| !window.is_zero())
			.ok_or(ConfigError::NonPositiveWindow { window })?;

		Ok(Self {
			window,
			window_std,
			max_permits,
			state: Mutex::new(QuotaWindow { start: Instant::now(), count: 0 }),
		})
	}

	/// Length of each window.
	pub fn window(&self) -> Duration {
		self.window
	}

	/// Permits granted per window.
	pub fn max_permits(&self) -> u32 {
		self.max_permits
	}

	/// Permits still available in the current window.
	pub fn remaining(&self) -> u32 {
		self.remaining_at(Instant::now())
	}

	/// Permits still available in the window containing `now`.
	pub fn remaining_at(&self, now: Instant) -> u32 {
		let mut state = self.state.lock();

		state.roll(now, self.window_std);

		self.max_permits.saturating_sub(state.count)
	}

	/// Consumes one permit from the current window or fails immediately.
	pub fn try_acquire(&self) -> Result<()> {
		self.try_acquire_at(Instant::now())
	}

	/// Consumes one permit from the window containing `now` or fails immediately.
	///
	/// Instants earlier than the active window start count against the active window.
	pub fn try_acquire_at(&self, now: Instant) -> Result<()> {
		let mut state = self.state.lock();

		state.roll(now, self.window_std);

		if state.count < self.max_permits {
			state.count += 1;

			return Ok(());
		}

		let retry_after = state.time_to_rollover(now, self.window_std);

		Err(Error::QuotaExceeded {
			retry_after: Duration::try_from(retry_after).unwrap_or(Duration::MAX),
		})
	}
}
impl Limiter for Quota {
	fn wait<'a>(&'a self, context: &'a WaitContext) -> LimitFuture<'a> {
		Box::pin(async move {
			let result = context.check().and_then(|()| self.try_acquire());

			obs::record_permit_outcome(LimiterKind::Quota, PermitOutcome::of(&result));

			result
		})
	}
}

#[derive(Debug)]
struct QuotaWindow {
	start: Instant,
	count: u32,
}
impl QuotaWindow {
	fn roll(&mut self, now: Instant, window: StdDuration) {
		let elapsed = now.saturating_duration_since(self.start);

		if elapsed < window {
			return;
		}

		// Land on the grid slot containing `now`.
		let offset = elapsed.as_nanos() % window.as_nanos();
		let offset = StdDuration::from_nanos(u64::try_from(offset).unwrap_or(u64::MAX));

		self.start = now.checked_sub(offset).unwrap_or(now);
		self.count = 0;
	}

	fn time_to_rollover(&self, now: Instant, window: StdDuration) -> StdDuration {
		window.saturating_sub(now.saturating_duration_since(self.start))
	}
}

#[cfg(test)]
mod tests {
	// self
	use super::*;

	fn ms(value: u64) -> StdDuration {
		StdDuration::from_millis(value)
	}

	fn quota(window_ms: i64, max_permits: u32) -> (Quota, Instant) {
		let quota = Quota::new(Duration::milliseconds(window_ms), max_permits)
			.expect("Quota parameters should be valid.");
		let start = quota.state.lock().start;

		(quota, start)
	}

	fn assert_window(quota: &Quota, now: Instant) {
		quota.try_acquire_at(now).expect("First permit of the window should be granted.");
		quota.try_acquire_at(now).expect("Second permit of the window should be granted.");

		for _ in 0..2 {
			let err = quota.try_acquire_at(now).expect_err("Spent window should reject.");

			assert!(err.is_quota_exceeded(), "Unexpected error: {err:?}.");
		}
	}

	#[test]
	fn window_budget_resets_on_rollover() {
		let (quota, start) = quota(10, 2);

		assert_window(&quota, start);
		assert_window(&quota, start + ms(10));
		assert_window(&quota, start + ms(30));
	}

	#[test]
	fn rollover_skips_idle_windows_and_stays_on_grid() {
		let (quota, start) = quota(10, 1);

		quota.try_acquire_at(start + ms(3)).expect("Permit should be granted.");
		quota.try_acquire_at(start + ms(47)).expect("Idle windows should not carry state.");

		assert_eq!(quota.state.lock().start, start + ms(40));

		let err = quota.try_acquire_at(start + ms(49)).expect_err("Window 40..50 is spent.");

		assert_eq!(err.retry_after(), Some(Duration::milliseconds(1)));
		assert!(quota.try_acquire_at(start + ms(50)).is_ok());
	}

	#[test]
	fn remaining_tracks_consumption() {
		let (quota, start) = quota(1_000, 3);

		assert_eq!(quota.remaining_at(start), 3);

		quota.try_acquire_at(start).expect("Permit should be granted.");

		assert_eq!(quota.remaining_at(start + ms(5)), 2);
		assert_eq!(quota.remaining_at(start + ms(1_000)), 3);
	}

	#[test]
	fn zero_capacity_always_rejects() {
		let (quota, start) = quota(10, 0);

		assert!(quota.try_acquire_at(start).is_err());
		assert!(quota.try_acquire_at(start + ms(25)).is_err());
	}

	#[test]
	fn non_positive_window_is_rejected() {
		for window in [Duration::ZERO, Duration::milliseconds(-5)] {
			let err = Quota::new(window, 1).expect_err("Non-positive windows must be rejected.");

			assert_eq!(err, ConfigError::NonPositiveWindow { window });
		}
	}

	#[tokio::test]
	async fn wait_honours_cancelled_context_without_consuming() {
		let (quota, _) = quota(60_000, 1);
		let context = WaitContext::new();

		context.cancel();

		let err = quota.wait(&context).await.expect_err("Cancelled context should fail.");

		assert!(matches!(err, Error::Cancelled));
		assert_eq!(quota.remaining(), 1);
		assert!(quota.wait(&WaitContext::new()).await.is_ok());
	}
}
