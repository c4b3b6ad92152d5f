//! Throttling error types shared across limiters, configuration, and transports.

// self
use crate::_prelude::*;

/// Crate-wide result type alias returning [`Error`] by default.
pub type Result<T, E = Error> = std::result::Result<T, E>;

type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Canonical throttling error exposed by public APIs.
///
/// Limiters report their own variant and composites surface a member's error unchanged, so
/// callers can tell quota exhaustion apart from cancellation or a custom policy rejection.
#[derive(Debug, ThisError)]
pub enum Error {
	/// Local configuration problem.
	#[error(transparent)]
	Config(#[from] ConfigError),
	/// Transport failure raised by the underlying HTTP transport.
	#[error(transparent)]
	Transport(#[from] TransportError),

	/// Fixed-window budget for the current period is spent.
	#[error("Quota exceeded for the current window; retry in {retry_after}.")]
	QuotaExceeded {
		/// Time left until the active window rolls over.
		retry_after: Duration,
	},
	/// Caller cancelled the permit request.
	#[error("Permit request was cancelled.")]
	Cancelled,
	/// Caller deadline elapsed before a permit was granted.
	#[error("Deadline elapsed before a permit was granted.")]
	DeadlineExceeded,
	/// Custom limiter refused the permit.
	#[error("Limiter policy rejected the request.")]
	Policy {
		/// Limiter-specific failure.
		#[source]
		source: BoxError,
	},
}
impl Error {
	/// Wraps a limiter-specific failure inside [`Error::Policy`].
	pub fn policy(src: impl 'static + Send + Sync + std::error::Error) -> Self {
		Self::Policy { source: Box::new(src) }
	}

	/// Returns `true` when the error reports an exhausted quota window.
	pub fn is_quota_exceeded(&self) -> bool {
		matches!(self, Self::QuotaExceeded { .. })
	}

	/// Returns `true` when the caller's cancellation signal or deadline fired.
	pub fn is_cancellation(&self) -> bool {
		matches!(self, Self::Cancelled | Self::DeadlineExceeded)
	}

	/// Retry hint carried by quota failures.
	pub fn retry_after(&self) -> Option<Duration> {
		match self {
			Self::QuotaExceeded { retry_after } => Some(*retry_after),
			_ => None,
		}
	}
}

/// Configuration and validation failures raised while building limiters.
#[derive(Debug, PartialEq, Eq, ThisError)]
pub enum ConfigError {
	/// Quota windows must be strictly positive.
	#[error("Quota window must be positive, got {window}.")]
	NonPositiveWindow {
		/// Rejected window duration.
		window: Duration,
	},
	/// Token bucket replenishment settings are unusable.
	#[error("Token bucket needs a positive period and a non-zero burst, got {period} and {burst}.")]
	InvalidRate {
		/// Rejected replenishment period.
		period: Duration,
		/// Rejected burst size.
		burst: u32,
	},
	/// Configured millisecond value cannot be represented as a duration.
	#[error("The {field} value of {millis}ms exceeds the supported range.")]
	DurationOutOfRange {
		/// Configuration field that overflowed.
		field: &'static str,
		/// Raw millisecond value.
		millis: u64,
	},
}

/// Transport-level failures (network, IO).
#[derive(Debug, ThisError)]
pub enum TransportError {
	/// Underlying HTTP client reported a network failure.
	#[error("Network error occurred while executing the request.")]
	Network {
		/// Transport-specific network error.
		#[source]
		source: BoxError,
	},
	/// Underlying IO failure surfaced during transport.
	#[error("I/O error occurred while executing the request.")]
	Io(#[from] std::io::Error),
}
impl TransportError {
	/// Wraps a transport-specific network error.
	pub fn network(src: impl 'static + Send + Sync + std::error::Error) -> Self {
		Self::Network { source: Box::new(src) }
	}
}
#[cfg(feature = "reqwest")]
impl From<ReqwestError> for TransportError {
	fn from(e: ReqwestError) -> Self {
		Self::network(e)
	}
}
