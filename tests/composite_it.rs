#![cfg(feature = "governor")]

// std
use std::{
	sync::Arc,
	time::{Duration as StdDuration, Instant},
};
// crates.io
use time::Duration;
// self
use http_throttle::limit::{CompositeLimiter, Limiter, Quota, TokenBucket, WaitContext};

#[tokio::test]
async fn quota_and_token_bucket_are_both_enforced() {
	let limiter = CompositeLimiter::new([
		Arc::new(Quota::new(Duration::seconds(2), 101).expect("Quota should build."))
			as Arc<dyn Limiter>,
		Arc::new(
			TokenBucket::with_period(Duration::milliseconds(10), 1)
				.expect("Token bucket should build."),
		) as Arc<dyn Limiter>,
	]);
	let context = WaitContext::new();
	let started = Instant::now();

	for i in 0..101 {
		limiter.wait(&context).await.unwrap_or_else(|e| panic!("Wait {i} failed: {e:?}."));
	}

	let elapsed = started.elapsed();

	assert!(elapsed >= StdDuration::from_millis(990), "101 waits took {elapsed:?}.");

	let err = limiter.wait(&context).await.expect_err("Quota should be spent.");

	assert!(err.is_quota_exceeded(), "Unexpected error: {err:?}.");
}

#[tokio::test]
async fn spent_quota_does_not_shorten_blocking_members() {
	let bucket = Arc::new(
		TokenBucket::with_period(Duration::milliseconds(200), 1)
			.expect("Token bucket should build."),
	);
	let quota = Arc::new(Quota::new(Duration::HOUR, 0).expect("Quota should build."));
	let context = WaitContext::new();

	bucket.wait(&context).await.expect("Burst cell should be available.");

	let limiter =
		CompositeLimiter::new([bucket as Arc<dyn Limiter>, quota as Arc<dyn Limiter>]);
	let started = Instant::now();
	let err = limiter.wait(&context).await.expect_err("Spent quota must fail the composite.");
	let elapsed = started.elapsed();

	assert!(err.is_quota_exceeded(), "Unexpected error: {err:?}.");
	assert!(elapsed >= StdDuration::from_millis(150), "Composite returned after {elapsed:?}.");
}

#[tokio::test]
async fn shared_quota_is_enforced_across_composites() {
	let quota = Arc::new(Quota::new(Duration::HOUR, 3).expect("Quota should build."));
	let first = CompositeLimiter::new([quota.clone() as Arc<dyn Limiter>]);
	let second = CompositeLimiter::new([quota.clone() as Arc<dyn Limiter>]);
	let context = WaitContext::new();

	first.wait(&context).await.expect("Permit 1 should be granted.");
	second.wait(&context).await.expect("Permit 2 should be granted.");
	first.wait(&context).await.expect("Permit 3 should be granted.");

	assert!(second.wait(&context).await.is_err());
	assert_eq!(quota.remaining(), 0);
}
