//! HTTP-based `RouteOracle` for the pedestrian route service.
//!
//! The [`RouteOracle`] trait is synchronous to keep the core library
//! embeddable in synchronous contexts. This oracle bridges the async HTTP
//! calls to the sync interface by blocking on a Tokio runtime internally.
//!
//! # Example
//!
//! ```no_run
//! use safestep_data::routing::HttpRouteOracle;
//! use safestep_core::RouteOracle;
//! use geo::Coord;
//!
//! let oracle = HttpRouteOracle::new("https://apis.openapi.sk.com", "app-key")?;
//! let route = oracle.request_route(
//!     Coord { x: 126.9780, y: 37.5665 },
//!     Coord { x: 126.9920, y: 37.5700 },
//!     &[],
//! )?;
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

use std::time::Duration;

use geo::Coord;
use reqwest::Client;
use safestep_core::{MAX_DETOUR_WAYPOINTS, RouteOracle, RouteOracleError, RouteResult};
use thiserror::Error;
use tokio::runtime::{Handle, Runtime, RuntimeFlavor};

use super::tmap::{PedestrianRequest, PedestrianResponse};

/// Error type for [`HttpRouteOracle`] construction failures.
#[derive(Debug, Error)]
pub enum OracleBuildError {
    /// Failed to build the HTTP client.
    #[error("failed to build HTTP client: {0}")]
    HttpClient(#[source] reqwest::Error),
    /// Failed to build the Tokio runtime.
    #[error("failed to build Tokio runtime: {0}")]
    Runtime(#[source] std::io::Error),
}

/// Default user agent for routing requests.
pub const DEFAULT_USER_AGENT: &str = "safestep-routing/0.1";

/// Default base URL of the pedestrian route service.
pub const DEFAULT_BASE_URL: &str = "https://apis.openapi.sk.com";

/// Default per-request timeout in seconds.
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

const PEDESTRIAN_ROUTE_PATH: &str = "tmap/routes/pedestrian?version=1";

/// Configuration for [`HttpRouteOracle`].
#[derive(Clone)]
pub struct HttpRouteOracleConfig {
    /// Base URL of the service (e.g., `"https://apis.openapi.sk.com"`).
    pub base_url: String,
    /// API key sent in the `appKey` header.
    pub app_key: String,
    /// Per-request timeout. Expiry counts as a failed request.
    pub timeout: Duration,
    /// User agent string for requests.
    pub user_agent: String,
    /// Display name sent for the origin.
    pub start_name: String,
    /// Display name sent for the destination.
    pub end_name: String,
}

impl std::fmt::Debug for HttpRouteOracleConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HttpRouteOracleConfig")
            .field("base_url", &self.base_url)
            .field("app_key", &"<redacted>")
            .field("timeout", &self.timeout)
            .field("user_agent", &self.user_agent)
            .field("start_name", &self.start_name)
            .field("end_name", &self.end_name)
            .finish()
    }
}

impl Default for HttpRouteOracleConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_owned(),
            app_key: String::new(),
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
            user_agent: DEFAULT_USER_AGENT.to_owned(),
            start_name: "origin".to_owned(),
            end_name: "destination".to_owned(),
        }
    }
}

impl HttpRouteOracleConfig {
    /// Create a new configuration with the given base URL and API key.
    #[must_use]
    pub fn new(base_url: impl Into<String>, app_key: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            app_key: app_key.into(),
            ..Default::default()
        }
    }

    /// Set the request timeout.
    #[must_use]
    pub const fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Set the user agent string.
    #[must_use]
    pub fn with_user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = user_agent.into();
        self
    }
}

/// HTTP-based route oracle for the pedestrian route service.
///
/// Each call issues exactly one request; there are no retries. Transport
/// errors, timeouts, non-success statuses and undecodable bodies are all
/// returned as [`RouteOracleError`] so the optimiser can drop that
/// permutation.
///
/// # Runtime behaviour
///
/// When called from outside any Tokio runtime, or from a `current_thread`
/// runtime, the oracle blocks on its own stored runtime. When called from
/// within a multi-threaded runtime it uses that runtime's handle with
/// [`tokio::task::block_in_place`] to avoid nested runtime panics.
/// The stored runtime may be driven from several threads at once, which is
/// how the optimiser requests detours concurrently.
pub struct HttpRouteOracle {
    client: Client,
    config: HttpRouteOracleConfig,
    runtime: Runtime,
}

impl std::fmt::Debug for HttpRouteOracle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HttpRouteOracle")
            .field("client", &self.client)
            .field("config", &self.config)
            .field("runtime", &"<tokio::runtime::Runtime>")
            .finish()
    }
}

impl HttpRouteOracle {
    /// Create a new oracle with default configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client or Tokio runtime fails to build.
    pub fn new(
        base_url: impl Into<String>,
        app_key: impl Into<String>,
    ) -> Result<Self, OracleBuildError> {
        Self::with_config(HttpRouteOracleConfig::new(base_url, app_key))
    }

    /// Create a new oracle with explicit configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client or Tokio runtime fails to build.
    pub fn with_config(config: HttpRouteOracleConfig) -> Result<Self, OracleBuildError> {
        let client = Client::builder()
            .user_agent(&config.user_agent)
            .connect_timeout(config.timeout)
            .timeout(config.timeout)
            .build()
            .map_err(OracleBuildError::HttpClient)?;
        let runtime = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
            .map_err(OracleBuildError::Runtime)?;
        Ok(Self {
            client,
            config,
            runtime,
        })
    }

    /// Active configuration.
    #[must_use]
    pub const fn config(&self) -> &HttpRouteOracleConfig {
        &self.config
    }

    fn route_url(&self) -> String {
        format!(
            "{}/{PEDESTRIAN_ROUTE_PATH}",
            self.config.base_url.trim_end_matches('/')
        )
    }

    async fn fetch_route_async(
        &self,
        start: Coord<f64>,
        end: Coord<f64>,
        via: &[Coord<f64>],
    ) -> Result<RouteResult, RouteOracleError> {
        let url = self.route_url();
        let body = PedestrianRequest::new(
            start,
            end,
            via,
            &self.config.start_name,
            &self.config.end_name,
        );

        let response = self
            .client
            .post(&url)
            .header("accept", "application/json")
            .header("appKey", &self.config.app_key)
            .json(&body)
            .send()
            .await
            .map_err(|err| self.convert_reqwest_error(&err, &url))?;

        let status = response.status();
        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            return Err(RouteOracleError::HttpError {
                url,
                status: status.as_u16(),
                message,
            });
        }

        let payload: serde_json::Value = response
            .json()
            .await
            .map_err(|err| self.convert_reqwest_error(&err, &url))?;
        convert_response(payload)
    }

    fn convert_reqwest_error(&self, error: &reqwest::Error, url: &str) -> RouteOracleError {
        if error.is_timeout() {
            return RouteOracleError::Timeout {
                url: url.to_owned(),
                timeout: self.config.timeout,
            };
        }

        if let Some(status) = error.status() {
            return RouteOracleError::HttpError {
                url: url.to_owned(),
                status: status.as_u16(),
                message: error.to_string(),
            };
        }

        if error.is_decode() {
            return RouteOracleError::ParseError {
                message: error.to_string(),
            };
        }

        RouteOracleError::NetworkError {
            url: url.to_owned(),
            message: error.to_string(),
        }
    }
}

/// Convert a raw service payload into a [`RouteResult`].
///
/// A missing `totalTime`, or one that is not a representable duration,
/// yields `total_time: None`, which the optimiser treats as infinitely slow.
fn convert_response(payload: serde_json::Value) -> Result<RouteResult, RouteOracleError> {
    let parsed: PedestrianResponse = serde_json::from_value(payload.clone())
        .map_err(|err| RouteOracleError::ParseError {
            message: err.to_string(),
        })?;

    let total_time = parsed
        .total_time_secs()
        .and_then(|secs| Duration::try_from_secs_f64(secs).ok());

    Ok(RouteResult {
        total_time,
        path: parsed.path(),
        payload,
    })
}

impl RouteOracle for HttpRouteOracle {
    /// Fetch one route through `via`.
    ///
    /// # Runtime requirements
    ///
    /// When called from within an existing Tokio runtime, the runtime should
    /// be multi-threaded. Inside a `current_thread` runtime the call falls
    /// back to the oracle's own runtime and blocks the caller's thread.
    fn request_route(
        &self,
        start: Coord<f64>,
        end: Coord<f64>,
        via: &[Coord<f64>],
    ) -> Result<RouteResult, RouteOracleError> {
        if via.len() > MAX_DETOUR_WAYPOINTS {
            return Err(RouteOracleError::TooManyWaypoints {
                count: via.len(),
                max: MAX_DETOUR_WAYPOINTS,
            });
        }
        log::debug!("requesting pedestrian route via {} point(s)", via.len());

        let future = self.fetch_route_async(start, end, via);
        match Handle::try_current() {
            Ok(handle) if handle.runtime_flavor() == RuntimeFlavor::MultiThread => {
                tokio::task::block_in_place(|| handle.block_on(future))
            }
            // No runtime detected, or current_thread runtime: use our own runtime.
            _ => self.runtime.block_on(future),
        }
    }
}
