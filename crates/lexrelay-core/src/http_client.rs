use reqwest::Client;

const DISABLE_SYSTEM_PROXY_ENV: &str = "LEXRELAY_DISABLE_SYSTEM_PROXY";

/// Shared reqwest client for relay and provider traffic.
pub fn build_http_client() -> Client {
    if should_disable_system_proxy() {
        Client::builder()
            .no_proxy()
            .build()
            .unwrap_or_else(|_| Client::new())
    } else {
        Client::new()
    }
}

fn should_disable_system_proxy() -> bool {
    if std::env::var_os(DISABLE_SYSTEM_PROXY_ENV).is_some() {
        return true;
    }

    cfg!(test)
}
