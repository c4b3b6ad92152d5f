//! Optional observability helpers for limiters and throttled transports.
//!
//! # Feature Flags
//!
//! - Enable `tracing` to emit structured spans named `http_throttle` with a `stage` field
//!   (`wait`, `execute`, `send`).
//! - Enable `metrics` to increment `http_throttle_permit_total` (labeled by `limiter` +
//!   `outcome`) for every permit decision and `http_throttle_request_total` (labeled by
//!   `outcome`) for every throttled request.

mod metrics;
mod tracing;

pub use self::metrics::*;
pub use self::tracing::*;

// self
use crate::_prelude::*;

/// Limiter variants observed by the crate.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum LimiterKind {
	/// Fail-fast fixed-window quota.
	Quota,
	/// Blocking token bucket.
	TokenBucket,
	/// Composite of other limiters.
	Composite,
}
impl LimiterKind {
	/// Returns a stable label suitable for span or metric fields.
	pub const fn as_str(self) -> &'static str {
		match self {
			LimiterKind::Quota => "quota",
			LimiterKind::TokenBucket => "token_bucket",
			LimiterKind::Composite => "composite",
		}
	}
}
impl Display for LimiterKind {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str(self.as_str())
	}
}

/// Outcome labels recorded for each permit request.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum PermitOutcome {
	/// Permit granted.
	Granted,
	/// Policy refused the permit.
	Rejected,
	/// Caller cancelled or its deadline elapsed.
	Cancelled,
}
impl PermitOutcome {
	/// Classifies the result of a [`Limiter::wait`](crate::limit::Limiter::wait) call.
	pub fn of(result: &Result<()>) -> Self {
		match result {
			Ok(()) => PermitOutcome::Granted,
			Err(e) if e.is_cancellation() => PermitOutcome::Cancelled,
			Err(_) => PermitOutcome::Rejected,
		}
	}

	/// Returns a stable label suitable for span or metric fields.
	pub const fn as_str(self) -> &'static str {
		match self {
			PermitOutcome::Granted => "granted",
			PermitOutcome::Rejected => "rejected",
			PermitOutcome::Cancelled => "cancelled",
		}
	}
}
impl Display for PermitOutcome {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str(self.as_str())
	}
}

/// Outcome labels recorded for each request passing through a throttled transport.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum RequestOutcome {
	/// Limiter refused; no network call was made.
	Throttled,
	/// Request was forwarded and the transport returned a response.
	Forwarded,
	/// Request was forwarded and the transport failed.
	TransportFailed,
}
impl RequestOutcome {
	/// Returns a stable label suitable for span or metric fields.
	pub const fn as_str(self) -> &'static str {
		match self {
			RequestOutcome::Throttled => "throttled",
			RequestOutcome::Forwarded => "forwarded",
			RequestOutcome::TransportFailed => "transport_failed",
		}
	}
}
impl Display for RequestOutcome {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str(self.as_str())
	}
}
