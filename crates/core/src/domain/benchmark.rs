use serde::{Deserialize, Serialize};

/// A published industry study a recommendation can cite as evidence.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Benchmark {
    pub id: String,
    pub title: String,
    pub year: i32,
    pub key_finding: String,
    pub source: String,
    pub source_url: String,
}

/// Server-side filters for the benchmark listing. `None` means unfiltered.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BenchmarkQuery {
    pub platform: Option<String>,
    pub metric_type: Option<String>,
}

impl BenchmarkQuery {
    /// Query-string pairs, omitting unset filters entirely.
    pub fn params(&self) -> Vec<(&'static str, String)> {
        let mut params = Vec::new();
        if let Some(platform) = &self.platform {
            params.push(("platform", platform.clone()));
        }
        if let Some(metric_type) = &self.metric_type {
            params.push(("metric_type", metric_type.clone()));
        }
        params
    }
}
