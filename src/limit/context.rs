//! Cancellation and deadline signals carried by every permit request.

// std
use std::future;
// crates.io
use tokio_util::sync::CancellationToken;
// self
use crate::_prelude::*;

/// Ephemeral "may I proceed" request state shared with every limiter asked for a permit.
///
/// The context is cheap to clone; clones observe the same cancellation token. Attach one to an
/// outbound [`http::Request`] through its extensions so the throttled transport waits on the
/// request's own signal.
#[derive(Clone, Debug, Default)]
pub struct WaitContext {
	cancellation: CancellationToken,
	deadline: Option<Instant>,
}
impl WaitContext {
	/// Creates a context that is never cancelled and has no deadline.
	pub fn new() -> Self {
		Self::default()
	}

	/// Uses `token` as the cancellation signal.
	pub fn with_cancellation(mut self, token: CancellationToken) -> Self {
		self.cancellation = token;

		self
	}

	/// Gives up waiting at `deadline`.
	pub fn with_deadline(mut self, deadline: Instant) -> Self {
		self.deadline = Some(deadline);

		self
	}

	/// Gives up waiting once `timeout` has elapsed from now.
	pub fn with_timeout(self, timeout: StdDuration) -> Self {
		match Instant::now().checked_add(timeout) {
			Some(deadline) => self.with_deadline(deadline),
			None => self,
		}
	}

	/// Cancellation token observed by limiters.
	pub fn cancellation(&self) -> &CancellationToken {
		&self.cancellation
	}

	/// Deadline observed by limiters, if any.
	pub fn deadline(&self) -> Option<Instant> {
		self.deadline
	}

	/// Fires the cancellation signal for this context and all of its clones.
	pub fn cancel(&self) {
		self.cancellation.cancel();
	}

	/// Returns `true` once the cancellation signal has fired.
	pub fn is_cancelled(&self) -> bool {
		self.cancellation.is_cancelled()
	}

	/// Fails when the signal already fired or the deadline already passed.
	pub fn check(&self) -> Result<()> {
		if self.is_cancelled() {
			return Err(Error::Cancelled);
		}
		if self.deadline.is_some_and(|deadline| deadline <= Instant::now()) {
			return Err(Error::DeadlineExceeded);
		}

		Ok(())
	}

	/// Runs a blocking wait until it finishes or the context gives up on it.
	///
	/// Cancellation wins over the deadline, and both win over a wait that becomes ready in the
	/// same poll.
	pub async fn guard<F, T>(&self, wait: F) -> Result<T>
	where
		F: Future<Output = Result<T>>,
	{
		self.check()?;

		let deadline = async {
			match self.deadline {
				Some(deadline) => tokio::time::sleep_until(deadline.into()).await,
				None => future::pending::<()>().await,
			}
		};

		tokio::select! {
			biased;

			_ = self.cancellation.cancelled() => Err(Error::Cancelled),
			_ = deadline => Err(Error::DeadlineExceeded),
			result = wait => result,
		}
	}
}
