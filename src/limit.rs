//! The limiter capability and its built-in variants.
//!
//! Every policy implements [`Limiter`], a single "wait until permitted, or fail" operation.
//! A [`Quota`] answers immediately, a [`TokenBucket`] (feature `governor`) blocks until a cell
//! is available, and a [`CompositeLimiter`] asks all of its members at once. Because the three
//! share one contract they can be nested and combined freely without any of them knowing how
//! the others behave.

pub mod composite;
pub mod context;
pub mod quota;
#[cfg(feature = "governor")] pub mod token_bucket;

pub use composite::*;
pub use context::*;
pub use quota::*;
#[cfg(feature = "governor")] pub use token_bucket::*;

// self
use crate::_prelude::*;

/// Boxed future returned by [`Limiter::wait`].
pub type LimitFuture<'a> = Pin<Box<dyn Future<Output = Result<()>> + 'a + Send>>;

/// Anything that can be asked "may this request proceed now?".
///
/// Implementations either resolve once a permit is granted or fail with their own error kind
/// ([`Error::QuotaExceeded`], [`Error::Cancelled`], [`Error::DeadlineExceeded`], or
/// [`Error::Policy`]). Blocking implementations must honour the [`WaitContext`] so callers can
/// abandon the wait; [`WaitContext::guard`] does the racing for them.
pub trait Limiter
where
	Self: Send + Sync,
{
	/// Resolves once the caller may proceed, or with the reason it may not.
	fn wait<'a>(&'a self, context: &'a WaitContext) -> LimitFuture<'a>;
}
impl<L> Limiter for Arc<L>
where
	L: ?Sized + Limiter,
{
	fn wait<'a>(&'a self, context: &'a WaitContext) -> LimitFuture<'a> {
		(**self).wait(context)
	}
}
impl<L> Limiter for Box<L>
where
	L: ?Sized + Limiter,
{
	fn wait<'a>(&'a self, context: &'a WaitContext) -> LimitFuture<'a> {
		(**self).wait(context)
	}
}
