use std::time::Duration;

use serde_json::json;
use wiremock::matchers::{body_json, method, path, query_param, query_param_is_missing};
use wiremock::{Mock, MockServer, ResponseTemplate};

use growthai_core::domain::benchmark::BenchmarkQuery;
use growthai_core::domain::feedback::FeedbackJudgment;
use growthai_core::domain::recommendation::RecommendationKind;
use growthai_core::domain::simulation::{MetricValue, SimulatedAction};
use growthai_core::domain::upload::ExportFile;
use growthai_core::gateway::http::HttpAnalysisGateway;
use growthai_core::gateway::{AnalysisGateway, GatewayError};

fn test_gateway(server: &MockServer) -> HttpAnalysisGateway {
    HttpAnalysisGateway::with_options(server.uri(), Duration::from_secs(5), 2).unwrap()
}

fn csv_file() -> ExportFile {
    ExportFile::new("june.csv", b"Date,Campaign Name,Platform\n".to_vec())
}

#[tokio::test]
async fn upload_decodes_the_report_and_caps_the_preview() {
    let server = MockServer::start().await;
    let preview: Vec<serde_json::Value> = (0..25)
        .map(|i| {
            json!({
                "date": "2024-06-01",
                "campaign_name": format!("Campaign {i}"),
                "platform": "meta",
                "spend": 100.0 + i as f64,
                "ctr": 0.02,
                "cpa": 250.0,
                "roas": 2.5
            })
        })
        .collect();
    Mock::given(method("POST"))
        .and(path("/api/upload-csv"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "cleaned_rows": 46,
            "dropped_rows": 5,
            "duplicates_merged": 3,
            "warnings": ["5 zero-spend rows dropped"],
            "preview": preview
        })))
        .expect(1)
        .mount(&server)
        .await;

    let report = test_gateway(&server).upload_csv(&csv_file()).await.unwrap();
    assert_eq!(report.cleaned_rows, 46);
    assert_eq!(report.dropped_rows, 5);
    assert_eq!(report.duplicates_merged, 3);
    assert_eq!(report.warnings.len(), 1);
    assert_eq!(report.preview.len(), 20);
}

#[tokio::test]
async fn upload_rejection_carries_the_service_detail() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/upload-csv"))
        .respond_with(
            ResponseTemplate::new(400).set_body_json(json!({"detail": "No file uploaded"})),
        )
        .expect(1)
        .mount(&server)
        .await;

    let err = test_gateway(&server).upload_csv(&csv_file()).await.unwrap_err();
    match &err {
        GatewayError::Status { status, detail, .. } => {
            assert_eq!(*status, 400);
            assert_eq!(detail.as_deref(), Some("No file uploaded"));
        }
        other => panic!("expected Status error, got {other:?}"),
    }
    assert_eq!(err.display_message("Failed to upload CSV"), "No file uploaded");
}

#[tokio::test]
async fn campaigns_decode_into_normalized_rows() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/campaigns"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            {
                "date": "2024-06-01",
                "campaign_name": "Summer Sale",
                "platform": "meta",
                "spend": 5200.0,
                "ctr": 0.024,
                "cpa": 81.25,
                "roas": 3.8
            }
        ])))
        .mount(&server)
        .await;

    let rows = test_gateway(&server).campaigns().await.unwrap();
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0].campaign_name, "Summer Sale");
}

#[tokio::test]
async fn analyze_tolerates_an_empty_ack_body() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/analyze"))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&server)
        .await;

    let ack = test_gateway(&server).analyze().await.unwrap();
    assert!(ack.status.is_none());
}

#[tokio::test]
async fn recommendations_parse_known_and_unknown_kinds() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/recommendations"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            {
                "id": "11111111-1111-1111-1111-111111111111",
                "type": "fatigue",
                "title": "Refresh creative for Summer Sale",
                "description": "CTR is sliding.",
                "confidence": 0.86,
                "why_fired": "CTR fell 28%",
                "details": {"platform": "meta", "campaign_name": "Summer Sale"},
                "source_ids": ["bench_001"]
            },
            {
                "id": "22222222-2222-2222-2222-222222222222",
                "type": "budget_cap",
                "title": "Raise the cap on Brand Search",
                "description": "Campaign is budget limited.",
                "confidence": 0.7,
                "why_fired": "Spend hit its cap 6 of 7 days"
            }
        ])))
        .mount(&server)
        .await;

    let recommendations = test_gateway(&server).recommendations().await.unwrap();
    assert_eq!(recommendations.len(), 2);
    assert_eq!(recommendations[0].kind, RecommendationKind::Fatigue);
    assert_eq!(
        recommendations[1].kind,
        RecommendationKind::Other("budget_cap".to_string())
    );
}

#[tokio::test]
async fn out_of_range_confidence_is_a_contract_violation() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/recommendations"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            {
                "id": "11111111-1111-1111-1111-111111111111",
                "type": "fatigue",
                "title": "t",
                "description": "d",
                "confidence": 1.5,
                "why_fired": "w"
            }
        ])))
        .mount(&server)
        .await;

    let err = test_gateway(&server).recommendations().await.unwrap_err();
    assert!(matches!(err, GatewayError::Contract { .. }));
}

#[tokio::test]
async fn benchmark_filters_are_sent_only_when_set() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/benchmarks"))
        .and(query_param("platform", "meta"))
        .and(query_param("metric_type", "ctr"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .expect(1)
        .mount(&server)
        .await;

    let query = BenchmarkQuery {
        platform: Some("meta".into()),
        metric_type: Some("ctr".into()),
    };
    test_gateway(&server).benchmarks(&query).await.unwrap();
}

#[tokio::test]
async fn unfiltered_benchmark_listing_has_no_query_params() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/benchmarks"))
        .and(query_param_is_missing("platform"))
        .and(query_param_is_missing("metric_type"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            {
                "id": "bench_001",
                "title": "Creative fatigue in paid social",
                "year": 2023,
                "key_finding": "CTR declines after two weeks.",
                "source": "Example Research",
                "source_url": "https://example.com/study"
            }
        ])))
        .expect(1)
        .mount(&server)
        .await;

    let benchmarks = test_gateway(&server)
        .benchmarks(&BenchmarkQuery::default())
        .await
        .unwrap();
    assert_eq!(benchmarks.len(), 1);
}

#[tokio::test]
async fn unknown_benchmark_id_resolves_to_none() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/benchmarks/bench_001"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "id": "bench_001",
            "title": "Creative fatigue in paid social",
            "year": 2023,
            "key_finding": "CTR declines after two weeks.",
            "source": "Example Research",
            "source_url": "https://example.com/study"
        })))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/benchmarks/bench_999"))
        .respond_with(ResponseTemplate::new(404).set_body_json(json!({"detail": "Not found"})))
        .expect(1)
        .mount(&server)
        .await;

    let gateway = test_gateway(&server);
    assert!(gateway.benchmark_by_id("bench_001").await.unwrap().is_some());
    assert!(gateway.benchmark_by_id("bench_999").await.unwrap().is_none());
}

#[tokio::test]
async fn feedback_posts_the_exact_wire_shape() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/feedback"))
        .and(body_json(json!({
            "recommendation_id": "11111111-1111-1111-1111-111111111111",
            "recommendation_type": "fatigue",
            "is_useful": true
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"status": "recorded"})))
        .expect(1)
        .mount(&server)
        .await;

    let judgment = FeedbackJudgment {
        recommendation_id: "11111111-1111-1111-1111-111111111111".parse().unwrap(),
        recommendation_type: RecommendationKind::Fatigue,
        is_useful: true,
    };
    let ack = test_gateway(&server).submit_feedback(&judgment).await.unwrap();
    assert_eq!(ack.status.as_deref(), Some("recorded"));
}

#[tokio::test]
async fn evaluation_metrics_keep_the_service_breakdown_order() {
    let server = MockServer::start().await;
    // Raw body: a serde_json round-trip would sort the keys and hide the
    // document order this test is about.
    let body = r#"{
        "total_feedback": 9,
        "useful_count": 6,
        "overall_precision": 0.667,
        "by_type": {
            "reallocation": {"precision": 0.75, "useful": 3, "total": 4},
            "fatigue": {"precision": 0.6, "useful": 3, "total": 5}
        }
    }"#;
    Mock::given(method("GET"))
        .and(path("/api/evaluation/metrics"))
        .respond_with(ResponseTemplate::new(200).set_body_raw(body, "application/json"))
        .mount(&server)
        .await;

    let metrics = test_gateway(&server).evaluation_metrics().await.unwrap();
    let kinds: Vec<&str> = metrics.by_type.iter().map(|(kind, _)| kind).collect();
    assert_eq!(kinds, vec!["reallocation", "fatigue"]);
}

#[tokio::test]
async fn simulate_sends_the_target_as_query_params() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/simulate"))
        .and(query_param("campaign_name", "Summer Sale"))
        .and(query_param("action", "refresh_creative"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "current_metrics": {"avg_daily_spend": 5300.0, "avg_roas": 2.8, "avg_cpa": "N/A"},
            "projected_metrics": {
                "roas": {"median": 3.1, "p5": 2.6, "p95": 3.7},
                "daily_revenue_lift": {"median": 1200.0, "p5": -200.0, "p95": 2900.0}
            },
            "confidence_interval": "90%",
            "impact_summary": "Projected to lift ROAS."
        })))
        .expect(1)
        .mount(&server)
        .await;

    let report = test_gateway(&server)
        .simulate("Summer Sale", SimulatedAction::RefreshCreative)
        .await
        .unwrap();
    assert_eq!(report.current_metrics.avg_cpa, MetricValue::Text("N/A".into()));
    assert!(report.projected_metrics.cpa.is_none());
}

#[tokio::test]
async fn transient_read_failures_are_retried() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/recommendations"))
        .respond_with(ResponseTemplate::new(503))
        .up_to_n_times(1)
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/recommendations"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .expect(1)
        .mount(&server)
        .await;

    let recommendations = test_gateway(&server).recommendations().await.unwrap();
    assert!(recommendations.is_empty());
}

#[tokio::test]
async fn writes_are_never_retried() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/feedback"))
        .respond_with(ResponseTemplate::new(500))
        .expect(1)
        .mount(&server)
        .await;

    let judgment = FeedbackJudgment {
        recommendation_id: "11111111-1111-1111-1111-111111111111".parse().unwrap(),
        recommendation_type: RecommendationKind::Fatigue,
        is_useful: false,
    };
    let err = test_gateway(&server).submit_feedback(&judgment).await.unwrap_err();
    assert!(matches!(err, GatewayError::Status { status: 500, .. }));
}

#[tokio::test]
async fn unreachable_service_reports_a_transport_error() {
    let gateway =
        HttpAnalysisGateway::with_options("http://127.0.0.1:9", Duration::from_secs(1), 1)
            .unwrap();
    let err = gateway.campaigns().await.unwrap_err();
    assert!(matches!(err, GatewayError::Transport { .. }));
}
