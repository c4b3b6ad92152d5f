// std
use std::{
	sync::{
		Arc,
		atomic::{AtomicUsize, Ordering},
	},
	thread,
	time::Duration as StdDuration,
};
// crates.io
use time::Duration;
use tokio::sync::Barrier;
// self
use http_throttle::{
	error::Error,
	limit::{Limiter, Quota, WaitContext},
};

async fn assert_window(quota: &Quota) {
	let context = WaitContext::new();

	quota.wait(&context).await.expect("First permit of the window should be granted.");
	quota.wait(&context).await.expect("Second permit of the window should be granted.");

	for _ in 0..2 {
		match quota.wait(&context).await {
			Err(Error::QuotaExceeded { retry_after }) => {
				assert!(retry_after <= Duration::milliseconds(100));
			},
			other => panic!("Spent window should fail with QuotaExceeded, got {other:?}."),
		}
	}
}

#[tokio::test]
async fn quota_budget_resets_every_window() {
	let quota =
		Quota::new(Duration::milliseconds(100), 2).expect("Quota parameters should be valid.");

	assert_window(&quota).await;
	tokio::time::sleep(StdDuration::from_millis(100)).await;
	assert_window(&quota).await;
	tokio::time::sleep(StdDuration::from_millis(200)).await;
	assert_window(&quota).await;
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn concurrent_waits_never_over_grant() {
	const CAPACITY: u32 = 10;
	const CALLERS: usize = 64;

	let quota = Arc::new(Quota::new(Duration::HOUR, CAPACITY).expect("Quota should build."));
	let barrier = Arc::new(Barrier::new(CALLERS));
	let handles = (0..CALLERS)
		.map(|_| {
			let quota = Arc::clone(&quota);
			let barrier = Arc::clone(&barrier);

			tokio::spawn(async move {
				barrier.wait().await;
				quota.wait(&WaitContext::new()).await
			})
		})
		.collect::<Vec<_>>();
	let mut granted = 0;
	let mut rejected = 0;

	for handle in handles {
		match handle.await.expect("Permit task should not panic.") {
			Ok(()) => granted += 1,
			Err(e) if e.is_quota_exceeded() => rejected += 1,
			Err(e) => panic!("Unexpected error: {e:?}."),
		}
	}

	assert_eq!(granted, CAPACITY as usize);
	assert_eq!(rejected, CALLERS - CAPACITY as usize);
}

#[test]
fn concurrent_threads_never_over_grant() {
	let quota = Quota::new(Duration::HOUR, 25).expect("Quota should build.");
	let granted = AtomicUsize::new(0);

	thread::scope(|scope| {
		for _ in 0..16 {
			scope.spawn(|| {
				for _ in 0..10 {
					if quota.try_acquire().is_ok() {
						granted.fetch_add(1, Ordering::SeqCst);
					}
				}
			});
		}
	});

	assert_eq!(granted.load(Ordering::SeqCst), 25);
	assert_eq!(quota.remaining(), 0);
}
