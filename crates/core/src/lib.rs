pub mod domain;
pub mod gateway;
pub mod prefs;
pub mod workflow;

pub mod config {
    use anyhow::Context;

    #[derive(Debug, Clone)]
    pub struct Settings {
        pub gateway_base_url: Option<String>,
        pub gateway_timeout_secs: Option<u64>,
        pub gateway_retries: Option<u32>,
        pub prefs_path: Option<String>,
        pub sentry_dsn: Option<String>,
    }

    impl Settings {
        pub fn from_env() -> anyhow::Result<Self> {
            Ok(Self {
                gateway_base_url: std::env::var("GROWTHAI_GATEWAY_URL").ok(),
                gateway_timeout_secs: parse_var("GROWTHAI_TIMEOUT_SECS"),
                gateway_retries: parse_var("GROWTHAI_RETRIES"),
                prefs_path: std::env::var("GROWTHAI_PREFS_PATH").ok(),
                sentry_dsn: std::env::var("SENTRY_DSN").ok(),
            })
        }

        pub fn require_gateway_base_url(&self) -> anyhow::Result<&str> {
            self.gateway_base_url
                .as_deref()
                .context("GROWTHAI_GATEWAY_URL is required")
        }
    }

    fn parse_var<T: std::str::FromStr>(key: &str) -> Option<T> {
        std::env::var(key).ok().and_then(|raw| raw.parse().ok())
    }
}
