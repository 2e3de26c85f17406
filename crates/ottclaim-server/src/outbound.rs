//! HTTP client for calls to external providers.

/// Build a client for provider calls.
pub fn http_client() -> Result<reqwest::Client, reqwest::Error> {
    // reqwest is built with rustls-no-provider; `Err` means a provider is
    // already installed.
    let _ = rustls::crypto::ring::default_provider().install_default();
    reqwest::Client::builder().build()
}
