use std::time::Duration;

use reqwest_middleware::{ClientBuilder, ClientWithMiddleware};
use reqwest_retry::{policies::ExponentialBackoff, RetryTransientMiddleware};
use reqwest_retry_after::RetryAfterMiddleware;

pub(crate) const REQUEST_TIMEOUT: Duration = Duration::from_secs(60);

const MAX_TRANSIENT_RETRIES: u32 = 2;

/// Client for unbilled endpoints: bounded transient retry plus Retry-After
/// compliance.
pub(crate) fn retrying_client(timeout: Duration) -> ClientWithMiddleware {
    let retry_policy = ExponentialBackoff::builder().build_with_max_retries(MAX_TRANSIENT_RETRIES);

    ClientBuilder::new(plain_client(timeout))
        .with(RetryAfterMiddleware::new())
        .with(RetryTransientMiddleware::new_with_policy(retry_policy))
        .build()
}

/// Client for billed endpoints. No retry middleware: a billed request must
/// not be repeated outside the operator's control.
pub(crate) fn plain_client(timeout: Duration) -> reqwest::Client {
    reqwest::Client::builder()
        .timeout(timeout)
        .build()
        .unwrap_or_else(|_| reqwest::Client::new())
}
