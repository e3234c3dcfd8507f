//! HTTP client adapter for the `openidconnect` crate.

use std::future::Future;
use std::pin::Pin;

use openidconnect::AsyncHttpClient;

/// Error type for the outbound HTTP adapter.
#[derive(Debug)]
pub enum HttpClientError {
    /// Transport-level failure.
    Reqwest(reqwest::Error),
    /// Response could not be assembled.
    Http(http::Error),
}

impl std::fmt::Display for HttpClientError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Reqwest(e) => write!(f, "{e}"),
            Self::Http(e) => write!(f, "{e}"),
        }
    }
}

impl std::error::Error for HttpClientError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Reqwest(e) => Some(e),
            Self::Http(e) => Some(e),
        }
    }
}

/// Bridges `reqwest` to the `openidconnect` `AsyncHttpClient` trait.
pub(crate) struct ReqwestHttpClient(pub(crate) reqwest::Client);

impl<'c> AsyncHttpClient<'c> for ReqwestHttpClient {
    type Error = HttpClientError;
    type Future =
        Pin<Box<dyn Future<Output = Result<http::Response<Vec<u8>>, Self::Error>> + Send + 'c>>;

    fn call(&'c self, request: http::Request<Vec<u8>>) -> Self::Future {
        Box::pin(async move {
            let (parts, body) = request.into_parts();
            let response = self
                .0
                .request(parts.method, parts.uri.to_string())
                .headers(parts.headers)
                .body(body)
                .send()
                .await
                .map_err(HttpClientError::Reqwest)?;

            let status = response.status();
            let headers = response.headers().clone();
            let body_bytes = response.bytes().await.map_err(HttpClientError::Reqwest)?;

            let mut http_response = http::Response::builder()
                .status(status)
                .body(body_bytes.to_vec())
                .map_err(HttpClientError::Http)?;
            *http_response.headers_mut() = headers;

            Ok(http_response)
        })
    }
}
