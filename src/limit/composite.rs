//! Composite limiter that enforces several independent policies at once.
//!
//! [`CompositeLimiter::wait`] asks every member concurrently and resolves only after all of them
//! have answered; a fast rejection from one member never cuts short a slow member that is still
//! waiting. Failures land in a mutex-guarded single-assignment slot where the first one to
//! complete wins and later ones are dropped, so the reported error is the earliest observed
//! refusal rather than whichever member happened to finish last.

// crates.io
use futures::future;
// self
use crate::{
	_prelude::*,
	limit::{LimitFuture, Limiter, WaitContext},
	obs::{self, LimiterKind, PermitOutcome},
};

/// Limiter that succeeds only when every member succeeds.
///
/// The composite holds no state of its own; members keep theirs. An empty composite always
/// grants.
#[derive(Clone, Default)]
pub struct CompositeLimiter {
	limiters: Vec<Arc<dyn Limiter>>,
}
impl CompositeLimiter {
	/// Creates a composite from the provided member limiters.
	pub fn new<I>(limiters: I) -> Self
	where
		I: IntoIterator<Item = Arc<dyn Limiter>>,
	{
		Self { limiters: limiters.into_iter().collect() }
	}

	/// Appends a member limiter.
	pub fn with_limiter(mut self, limiter: impl 'static + Limiter) -> Self {
		self.limiters.push(Arc::new(limiter));

		self
	}

	/// Number of member limiters.
	pub fn len(&self) -> usize {
		self.limiters.len()
	}

	/// Returns `true` when the composite has no members.
	pub fn is_empty(&self) -> bool {
		self.limiters.is_empty()
	}
}
impl FromIterator<Arc<dyn Limiter>> for CompositeLimiter {
	fn from_iter<I>(iter: I) -> Self
	where
		I: IntoIterator<Item = Arc<dyn Limiter>>,
	{
		Self::new(iter)
	}
}
impl Limiter for CompositeLimiter {
	fn wait<'a>(&'a self, context: &'a WaitContext) -> LimitFuture<'a> {
		Box::pin(async move {
			let slot = FailureSlot::default();

			future::join_all(self.limiters.iter().map(|limiter| {
				let slot = &slot;

				async move {
					if let Err(e) = limiter.wait(context).await {
						slot.offer(e);
					}
				}
			}))
			.await;

			let result = match slot.take() {
				Some(e) => Err(e),
				None => Ok(()),
			};

			obs::record_permit_outcome(LimiterKind::Composite, PermitOutcome::of(&result));

			result
		})
	}
}
impl Debug for CompositeLimiter {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("CompositeLimiter").field("members", &self.limiters.len()).finish()
	}
}

/// Single-assignment slot shared by concurrently evaluated members.
#[derive(Debug, Default)]
struct FailureSlot(Mutex<Option<Error>>);
impl FailureSlot {
	/// Keeps `error` only when no earlier failure was recorded.
	fn offer(&self, error: Error) {
		let mut slot = self.0.lock();

		if slot.is_none() {
			*slot = Some(error);
		}
	}

	fn take(&self) -> Option<Error> {
		self.0.lock().take()
	}
}
