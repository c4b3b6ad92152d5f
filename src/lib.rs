//! Outbound request throttling for HTTP clients: fail-fast fixed-window quotas, composite
//! limiters that evaluate every policy concurrently, and a transport adapter that asks for a
//! permit before any network I/O happens.

#![deny(clippy::all, missing_docs, unused_crate_dependencies)]

pub mod config;
pub mod error;
pub mod limit;
pub mod obs;
pub mod transport;

mod _prelude {
	pub use std::{
		error::Error as StdError,
		fmt::{Debug, Display, Formatter, Result as FmtResult},
		future::Future,
		pin::Pin,
		sync::Arc,
		time::{Duration as StdDuration, Instant},
	};

	pub use parking_lot::Mutex;
	#[cfg(feature = "reqwest")]
	pub use reqwest::{Client as ReqwestClient, Error as ReqwestError};
	pub use serde::{Deserialize, Serialize};
	pub use thiserror::Error as ThisError;
	pub use time::Duration;

	pub use crate::error::{Error, Result};
}

#[cfg(feature = "governor")] pub use governor;
pub use http;
#[cfg(feature = "reqwest")] pub use reqwest;
#[cfg(test)] use {color_eyre as _, httpmock as _, serde_json as _};
