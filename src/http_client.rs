use once_cell::sync::Lazy;
use reqwest::Client;

/// Shared HTTP client. Idle pooling is disabled so every swap opens its own
/// upstream connection; no timeout beyond reqwest's defaults.
pub static HTTP_CLIENT: Lazy<Client> = Lazy::new(|| {
    Client::builder()
        .pool_max_idle_per_host(0)
        .build()
        .expect("Failed to create HTTP client")
});
