//! Error taxonomy for the remote data client.

use reqwest::StatusCode;

/// Errors surfaced by `DogApiClient`.
///
/// An empty result list is not an error; it decodes to an empty `Vec` and is
/// handled by the caller (end-of-collection, no search matches).
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
  /// Transport-level failure (DNS, connect, timeout, TLS).
  #[error("network error: {0}")]
  Network(#[source] reqwest::Error),

  /// The server answered with a non-2xx status.
  #[error("{endpoint} returned {status}")]
  Status { endpoint: String, status: StatusCode },

  /// The request was rejected before any fetch was issued.
  #[error("invalid argument: {0}")]
  InvalidArgument(String),

  /// The response body was not the JSON we expected.
  #[error("failed to decode response from {endpoint}: {source}")]
  Decode {
    endpoint: String,
    #[source]
    source: reqwest::Error,
  },
}

impl ApiError {
  /// True when the failure is worth retrying (network or server-side).
  pub fn is_retryable(&self) -> bool {
    match self {
      ApiError::Network(_) => true,
      ApiError::Status { status, .. } => status.is_server_error(),
      ApiError::InvalidArgument(_) | ApiError::Decode { .. } => false,
    }
  }

  /// Render for the status line; only failures a retry can help get the
  /// retry-key hint.
  pub fn status_line(&self) -> String {
    if self.is_retryable() {
      format!("{} (press 'r' to retry)", self)
    } else {
      self.to_string()
    }
  }
}

/// Parse a breed id from user input, rejecting it before any fetch.
pub fn parse_breed_id(input: &str) -> Result<u64, ApiError> {
  input
    .trim()
    .parse::<u64>()
    .map_err(|_| ApiError::InvalidArgument(format!("'{}' is not a numeric breed id", input.trim())))
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn test_parse_breed_id_valid() {
    assert_eq!(parse_breed_id("264").unwrap(), 264);
    assert_eq!(parse_breed_id("  7 ").unwrap(), 7);
  }

  #[test]
  fn test_parse_breed_id_rejects_non_numeric() {
    let err = parse_breed_id("bulldog").unwrap_err();
    assert!(matches!(err, ApiError::InvalidArgument(_)));
    assert!(!err.is_retryable());
  }

  #[test]
  fn test_server_errors_are_retryable() {
    let err = ApiError::Status {
      endpoint: "/breeds".to_string(),
      status: StatusCode::BAD_GATEWAY,
    };
    assert!(err.is_retryable());

    let err = ApiError::Status {
      endpoint: "/breeds/999999".to_string(),
      status: StatusCode::NOT_FOUND,
    };
    assert!(!err.is_retryable());
  }

  #[test]
  fn test_status_line_hints_retry_only_when_useful() {
    let err = ApiError::Status {
      endpoint: "/breeds".to_string(),
      status: StatusCode::SERVICE_UNAVAILABLE,
    };
    assert!(err.status_line().contains("press 'r' to retry"));

    let err = ApiError::InvalidArgument("'pug' is not a numeric breed id".to_string());
    assert!(!err.status_line().contains("press 'r'"));
  }
}
