//! Throttled HTTP transport.
//!
//! [`HttpTransport`] is the crate's only dependency on an HTTP stack: take a fully formed
//! [`HttpRequest`], return an [`HttpResponse`] or a [`TransportError`]. [`ThrottledTransport`]
//! sits in front of any implementation and asks its [`Limiter`] for a permit before the request
//! is handed over. A refused permit aborts the request before any network I/O; a granted one
//! forwards the request untouched and returns the transport's answer untouched.
//!
//! The permit wait observes the request's own [`WaitContext`], read from
//! [`http::Request::extensions`]. Requests without one wait on a context that never cancels.

// std
#[cfg(feature = "reqwest")] use std::ops::Deref;
// self
use crate::{
	_prelude::*,
	error::TransportError,
	limit::{CompositeLimiter, Limiter, WaitContext},
	obs::{self, RequestOutcome, ThrottleSpan},
};
#[cfg(feature = "reqwest")] use crate::{config::ThrottleConfig, error::ConfigError};

/// Outbound request handed to an [`HttpTransport`].
pub type HttpRequest = http::Request<Vec<u8>>;
/// Response produced by an [`HttpTransport`].
pub type HttpResponse = http::Response<Vec<u8>>;

/// Boxed future returned by [`HttpTransport::execute`].
pub type TransportFuture<'a> =
	Pin<Box<dyn Future<Output = Result<HttpResponse, TransportError>> + 'a + Send>>;

/// Abstraction over HTTP transports that perform the actual network call.
///
/// Implementations must be `Send + Sync + 'static` so a single transport can be shared behind
/// `Arc` by many throttled clients, and the returned futures must be `Send` so callers can hop
/// executors.
pub trait HttpTransport
where
	Self: 'static + Send + Sync,
{
	/// Executes `request` and returns the upstream response.
	fn execute(&self, request: HttpRequest) -> TransportFuture<'_>;
}

/// Thin wrapper around [`ReqwestClient`], used as the default transport.
#[cfg(feature = "reqwest")]
#[derive(Clone, Debug, Default)]
pub struct ReqwestTransport(pub ReqwestClient);
#[cfg(feature = "reqwest")]
impl ReqwestTransport {
	/// Wraps an existing reqwest [`ReqwestClient`].
	pub fn with_client(client: ReqwestClient) -> Self {
		Self(client)
	}
}
#[cfg(feature = "reqwest")]
impl AsRef<ReqwestClient> for ReqwestTransport {
	fn as_ref(&self) -> &ReqwestClient {
		&self.0
	}
}
#[cfg(feature = "reqwest")]
impl Deref for ReqwestTransport {
	type Target = ReqwestClient;

	fn deref(&self) -> &Self::Target {
		&self.0
	}
}
#[cfg(feature = "reqwest")]
impl HttpTransport for ReqwestTransport {
	fn execute(&self, request: HttpRequest) -> TransportFuture<'_> {
		let client = self.0.clone();

		Box::pin(async move {
			let response = client.execute(request.try_into()?).await?;
			let status = response.status();
			let version = response.version();
			let headers = response.headers().to_owned();
			let mut response_new = HttpResponse::new(response.bytes().await?.to_vec());

			*response_new.status_mut() = status;
			*response_new.version_mut() = version;
			*response_new.headers_mut() = headers;

			Ok(response_new)
		})
	}
}

#[cfg(feature = "reqwest")]
/// Throttled transport specialized for the crate's default reqwest stack.
pub type ReqwestThrottledTransport = ThrottledTransport<ReqwestTransport>;

/// Transport adapter that gates every request through a [`Limiter`].
pub struct ThrottledTransport<T>
where
	T: ?Sized + HttpTransport,
{
	/// Transport used to make the actual requests.
	pub transport: Arc<T>,
	/// Limiter consulted before every request.
	pub limiter: Arc<dyn Limiter>,
}
impl<T> ThrottledTransport<T>
where
	T: ?Sized + HttpTransport,
{
	/// Throttles `transport` with every limiter in `limiters`, evaluated as one composite.
	pub fn with_transport<I>(transport: impl Into<Arc<T>>, limiters: I) -> Self
	where
		I: IntoIterator<Item = Arc<dyn Limiter>>,
	{
		Self::with_limiter(transport, CompositeLimiter::new(limiters))
	}

	/// Throttles `transport` with a single limiter.
	pub fn with_limiter(transport: impl Into<Arc<T>>, limiter: impl 'static + Limiter) -> Self {
		Self { transport: transport.into(), limiter: Arc::new(limiter) }
	}

	/// Waits for a permit, then forwards `request` to the underlying transport.
	///
	/// Limiter failures are returned unchanged and the transport is never called; transport
	/// failures surface as [`Error::Transport`].
	pub async fn execute(&self, request: HttpRequest) -> Result<HttpResponse> {
		let context = request.extensions().get::<WaitContext>().cloned().unwrap_or_default();

		ThrottleSpan::new("execute")
			.instrument(async move {
				self.acquire(&context).await?;

				let result = self.transport.execute(request).await;

				match &result {
					Ok(_) => obs::record_request_outcome(RequestOutcome::Forwarded),
					Err(_) => obs::record_request_outcome(RequestOutcome::TransportFailed),
				}

				result.map_err(Error::from)
			})
			.await
	}

	async fn acquire(&self, context: &WaitContext) -> Result<()> {
		let result = self.limiter.wait(context).await;

		if result.is_err() {
			obs::record_request_outcome(RequestOutcome::Throttled);
		}

		result
	}
}
#[cfg(feature = "reqwest")]
impl ThrottledTransport<ReqwestTransport> {
	/// Throttles a default reqwest transport with every limiter in `limiters`.
	pub fn new<I>(limiters: I) -> Self
	where
		I: IntoIterator<Item = Arc<dyn Limiter>>,
	{
		Self::with_transport(ReqwestTransport::default(), limiters)
	}

	/// Throttles a default reqwest transport with the limiters described by `config`.
	pub fn from_config(config: &ThrottleConfig) -> Result<Self, ConfigError> {
		Ok(Self::with_limiter(ReqwestTransport::default(), config.build()?))
	}

	/// Waits for a permit, then sends a native reqwest request.
	///
	/// The permit wait gives up once the request's own timeout elapses.
	pub async fn send(&self, request: reqwest::Request) -> Result<reqwest::Response> {
		let context = match request.timeout() {
			Some(timeout) => WaitContext::new().with_timeout(*timeout),
			None => WaitContext::new(),
		};

		ThrottleSpan::new("send")
			.instrument(async move {
				self.acquire(&context).await?;

				let result = self.transport.0.execute(request).await;

				match &result {
					Ok(_) => obs::record_request_outcome(RequestOutcome::Forwarded),
					Err(_) => obs::record_request_outcome(RequestOutcome::TransportFailed),
				}

				result.map_err(|e| TransportError::from(e).into())
			})
			.await
	}
}
impl<T> Clone for ThrottledTransport<T>
where
	T: ?Sized + HttpTransport,
{
	fn clone(&self) -> Self {
		Self { transport: Arc::clone(&self.transport), limiter: Arc::clone(&self.limiter) }
	}
}
impl<T> Debug for ThrottledTransport<T>
where
	T: ?Sized + HttpTransport,
{
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("ThrottledTransport").finish_non_exhaustive()
	}
}
