// self
use crate::obs::{LimiterKind, PermitOutcome, RequestOutcome};

/// Records a permit decision via the global metrics recorder (when enabled).
pub fn record_permit_outcome(kind: LimiterKind, outcome: PermitOutcome) {
	#[cfg(feature = "metrics")]
	{
		metrics::counter!(
			"http_throttle_permit_total",
			"limiter" => kind.as_str(),
			"outcome" => outcome.as_str()
		)
		.increment(1);
	}

	#[cfg(not(feature = "metrics"))]
	{
		let _ = (kind, outcome);
	}
}

/// Records how a throttled request ended via the global metrics recorder (when enabled).
pub fn record_request_outcome(outcome: RequestOutcome) {
	#[cfg(feature = "metrics")]
	{
		metrics::counter!("http_throttle_request_total", "outcome" => outcome.as_str())
			.increment(1);
	}

	#[cfg(not(feature = "metrics"))]
	{
		let _ = outcome;
	}
}
