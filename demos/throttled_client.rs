//! Throttles a reqwest client with an hourly quota and a per-second token bucket.
//!
//! 1. Build a [`Quota`] that fails fast once 36 000 requests were made within the hour.
//! 2. Build a [`TokenBucket`] that blocks so no more than 99 requests leave per second.
//! 3. Hand both to [`ThrottledTransport::new`], which evaluates them as one composite.
//! 4. Tell quota exhaustion apart from other failures through [`Error::is_quota_exceeded`].

// std
use std::{num::NonZeroU32, sync::Arc};
// crates.io
use color_eyre::{Result, eyre::eyre};
use time::Duration;
// self
use http_throttle::{
	error::Error,
	limit::{Limiter, Quota, TokenBucket},
	transport::{ReqwestThrottledTransport, ThrottledTransport},
};

#[tokio::main]
async fn main() -> Result<()> {
	color_eyre::install()?;

	let per_second = NonZeroU32::new(99).ok_or_else(|| eyre!("Rate must be non-zero."))?;
	let burst = NonZeroU32::MIN;
	let transport: ReqwestThrottledTransport = ThrottledTransport::new([
		Arc::new(Quota::new(Duration::HOUR, 36_000)?) as Arc<dyn Limiter>,
		Arc::new(TokenBucket::per_second(per_second, burst)) as Arc<dyn Limiter>,
	]);
	let request = http::Request::get("https://www.rust-lang.org/").body(Vec::new())?;

	match transport.execute(request).await {
		Ok(response) => println!("Upstream answered with {}.", response.status()),
		Err(e) if e.is_quota_exceeded() => {
			println!("Hourly quota spent; retry in {:?}.", e.retry_after());
		},
		Err(Error::Transport(e)) => println!("Transport failed: {e}."),
		Err(e) => return Err(e.into()),
	}

	Ok(())
}
