use uuid::Uuid;

use crate::domain::benchmark::{Benchmark, BenchmarkQuery};
use crate::domain::recommendation::{Recommendation, RecommendationKind};
use crate::gateway::AnalysisGateway;
use crate::workflow::WorkflowError;

/// Holds the recommendation list from the most recent analysis, along with
/// the benchmark library its citations resolve against.
#[derive(Debug, Default)]
pub struct RecommendationStore {
    recommendations: Vec<Recommendation>,
    benchmarks: Vec<Benchmark>,
}

impl RecommendationStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace both lists wholesale. Previous contents are discarded.
    pub fn replace(&mut self, recommendations: Vec<Recommendation>, benchmarks: Vec<Benchmark>) {
        self.recommendations = recommendations;
        self.benchmarks = benchmarks;
    }

    /// Reload from the service. Recommendations must fetch successfully or
    /// the store is left untouched; a benchmark failure only degrades
    /// citations, it never blocks the reload.
    pub async fn load(&mut self, gateway: &dyn AnalysisGateway) -> Result<(), WorkflowError> {
        let recommendations = gateway.recommendations().await?;
        self.recommendations = recommendations;
        match gateway.benchmarks(&BenchmarkQuery::default()).await {
            Ok(benchmarks) => self.benchmarks = benchmarks,
            Err(err) => {
                tracing::warn!(error = %err, "benchmark fetch failed; citations will not resolve");
            }
        }
        Ok(())
    }

    pub fn recommendations(&self) -> &[Recommendation] {
        &self.recommendations
    }

    pub fn benchmarks(&self) -> &[Benchmark] {
        &self.benchmarks
    }

    pub fn len(&self) -> usize {
        self.recommendations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.recommendations.is_empty()
    }

    pub fn get(&self, id: Uuid) -> Option<&Recommendation> {
        self.recommendations.iter().find(|rec| rec.id == id)
    }

    /// The stored list narrowed by `filter`, original order preserved. The
    /// stored list itself is never mutated by filtering.
    pub fn filtered(&self, filter: &RecommendationFilter) -> Vec<&Recommendation> {
        self.recommendations
            .iter()
            .filter(|rec| filter.matches(rec))
            .collect()
    }

    /// Benchmarks cited by `recommendation`, in benchmark-library order.
    /// Unknown ids resolve to nothing.
    pub fn citations<'a>(&'a self, recommendation: &Recommendation) -> Vec<&'a Benchmark> {
        self.benchmarks
            .iter()
            .filter(|benchmark| {
                recommendation
                    .source_ids
                    .iter()
                    .any(|id| id == &benchmark.id)
            })
            .collect()
    }
}

/// View filter over the recommendation list. A default filter passes every
/// recommendation.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RecommendationFilter {
    /// `None` shows every rule type.
    pub kind: Option<RecommendationKind>,
    /// `None` shows every platform. A recommendation without a platform in
    /// its details fails any specific platform filter.
    pub platform: Option<String>,
    /// Minimum whole-percent confidence, 0..=100.
    pub min_confidence_pct: u8,
}

impl RecommendationFilter {
    pub fn matches(&self, recommendation: &Recommendation) -> bool {
        if let Some(kind) = &self.kind {
            if recommendation.kind != *kind {
                return false;
            }
        }
        if recommendation.confidence_pct() < self.min_confidence_pct {
            return false;
        }
        match &self.platform {
            None => true,
            Some(platform) => {
                recommendation.details.platform.as_deref() == Some(platform.as_str())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use uuid::Uuid;

    fn rec(kind: RecommendationKind, confidence: f64, platform: Option<&str>) -> Recommendation {
        let mut value = serde_json::json!({
            "id": Uuid::new_v4(),
            "type": String::from(kind),
            "title": "t",
            "description": "d",
            "confidence": confidence,
            "why_fired": "w",
            "details": {}
        });
        if let Some(platform) = platform {
            value["details"]["platform"] = platform.into();
        }
        serde_json::from_value(value).unwrap()
    }

    fn bench(id: &str) -> Benchmark {
        serde_json::from_value(serde_json::json!({
            "id": id,
            "title": id,
            "year": 2023,
            "key_finding": "k",
            "source": "s",
            "source_url": "https://example.com"
        }))
        .unwrap()
    }

    #[test]
    fn default_filter_passes_everything_in_order() {
        let mut store = RecommendationStore::new();
        store.replace(
            vec![
                rec(RecommendationKind::Fatigue, 0.9, Some("meta")),
                rec(RecommendationKind::Reallocation, 0.4, None),
                rec(RecommendationKind::Fatigue, 0.6, Some("google")),
            ],
            vec![],
        );
        let all: Vec<Uuid> = store.recommendations().iter().map(|r| r.id).collect();
        let filtered: Vec<Uuid> = store
            .filtered(&RecommendationFilter::default())
            .iter()
            .map(|r| r.id)
            .collect();
        assert_eq!(filtered, all);
        assert_eq!(store.len(), 3);
    }

    #[test]
    fn kind_and_confidence_and_platform_combine() {
        let mut store = RecommendationStore::new();
        store.replace(
            vec![
                rec(RecommendationKind::Fatigue, 0.9, Some("meta")),
                rec(RecommendationKind::Fatigue, 0.55, Some("meta")),
                rec(RecommendationKind::Reallocation, 0.95, Some("meta")),
                rec(RecommendationKind::Fatigue, 0.9, Some("google")),
            ],
            vec![],
        );
        let filter = RecommendationFilter {
            kind: Some(RecommendationKind::Fatigue),
            platform: Some("meta".into()),
            min_confidence_pct: 60,
        };
        let hits = store.filtered(&filter);
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].confidence, 0.9);
    }

    #[test]
    fn confidence_threshold_compares_rounded_percent() {
        // 0.846 rounds to 85 and passes a threshold of 85.
        let rec = rec(RecommendationKind::Fatigue, 0.846, None);
        let filter = RecommendationFilter {
            min_confidence_pct: 85,
            ..Default::default()
        };
        assert!(filter.matches(&rec));
        let stricter = RecommendationFilter {
            min_confidence_pct: 86,
            ..Default::default()
        };
        assert!(!stricter.matches(&rec));
    }

    #[test]
    fn platformless_recommendation_fails_specific_platform_filter() {
        let no_platform = rec(RecommendationKind::Reallocation, 0.9, None);
        let filter = RecommendationFilter {
            platform: Some("meta".into()),
            ..Default::default()
        };
        assert!(!filter.matches(&no_platform));
        assert!(RecommendationFilter::default().matches(&no_platform));
    }

    #[test]
    fn filtering_is_idempotent_and_non_destructive() {
        let mut store = RecommendationStore::new();
        store.replace(
            vec![
                rec(RecommendationKind::Fatigue, 0.9, Some("meta")),
                rec(RecommendationKind::Reallocation, 0.3, None),
            ],
            vec![],
        );
        let filter = RecommendationFilter {
            min_confidence_pct: 50,
            ..Default::default()
        };
        let first: Vec<Uuid> = store.filtered(&filter).iter().map(|r| r.id).collect();
        let second: Vec<Uuid> = store.filtered(&filter).iter().map(|r| r.id).collect();
        assert_eq!(first, second);
        assert_eq!(store.len(), 2);
    }

    #[test]
    fn citations_resolve_in_library_order_and_skip_unknown_ids() {
        let mut store = RecommendationStore::new();
        let mut cited = rec(RecommendationKind::Fatigue, 0.9, None);
        cited.source_ids = vec!["bench_007".into(), "bench_001".into(), "bench_999".into()];
        store.replace(
            vec![cited.clone()],
            vec![bench("bench_001"), bench("bench_007")],
        );
        let citations = store.citations(&cited);
        let ids: Vec<&str> = citations.iter().map(|b| b.id.as_str()).collect();
        assert_eq!(ids, vec!["bench_001", "bench_007"]);
    }

    #[test]
    fn replace_is_wholesale() {
        let mut store = RecommendationStore::new();
        store.replace(vec![rec(RecommendationKind::Fatigue, 0.9, None)], vec![bench("a")]);
        store.replace(vec![], vec![]);
        assert!(store.is_empty());
        assert!(store.benchmarks().is_empty());
    }
}
