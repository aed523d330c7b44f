use std::time::Duration;

use thiserror::Error;

/// Errors from [`crate::oracle::RouteOracle::request_route`].
///
/// Every variant means "no route available" for the permutation that was
/// requested; the optimiser decides whether that is fatal.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RouteOracleError {
    /// More via points were supplied than the oracle accepts.
    #[error("at most {max} via points are supported, got {count}")]
    TooManyWaypoints {
        /// Number of via points supplied.
        count: usize,
        /// Maximum accepted.
        max: usize,
    },
    /// The request did not complete before the configured timeout.
    #[error("request to {url} timed out after {timeout:?}")]
    Timeout {
        /// Endpoint that was queried.
        url: String,
        /// Configured per-request timeout.
        timeout: Duration,
    },
    /// The service answered with a non-success HTTP status.
    #[error("request to {url} failed with status {status}: {message}")]
    HttpError {
        /// Endpoint that was queried.
        url: String,
        /// HTTP status code.
        status: u16,
        /// Error detail.
        message: String,
    },
    /// The request failed at the transport level.
    #[error("request to {url} failed: {message}")]
    NetworkError {
        /// Endpoint that was queried.
        url: String,
        /// Error detail.
        message: String,
    },
    /// The response body could not be decoded.
    #[error("failed to parse routing response: {message}")]
    ParseError {
        /// Error detail.
        message: String,
    },
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case(Duration::from_millis(250), "250ms")]
    #[case(Duration::from_secs(30), "30s")]
    fn timeout_message_keeps_sub_second_precision(
        #[case] timeout: Duration,
        #[case] expected: &str,
    ) {
        let err = RouteOracleError::Timeout {
            url: "http://routes.test".to_owned(),
            timeout,
        };
        assert_eq!(
            err.to_string(),
            format!("request to http://routes.test timed out after {expected}")
        );
    }
}
