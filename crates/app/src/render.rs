use growthai_core::domain::benchmark::Benchmark;
use growthai_core::domain::feedback::FeedbackJudgment;
use growthai_core::domain::recommendation::Recommendation;
use growthai_core::domain::simulation::RangeBarLayout;
use growthai_core::domain::upload::UploadReport;
use growthai_core::prefs::Theme;
use growthai_core::workflow::evaluation::{EvaluationRefresher, EvaluationSummary};
use growthai_core::workflow::simulate::SimulationView;
use growthai_core::workflow::upload::UploadOutcome;

const BAR_WIDTH: usize = 40;

pub fn header(theme: Theme) {
    let theme = match theme {
        Theme::Light => "light",
        Theme::Dark => "dark",
    };
    println!("GrowthAI ad-spend review ({theme} theme)\n");
}

pub fn upload_outcome(outcome: &UploadOutcome) {
    match outcome {
        UploadOutcome::Completed(report) => upload_report(report),
        UploadOutcome::Busy => println!("An upload is already running; nothing submitted"),
    }
}

fn upload_report(report: &UploadReport) {
    println!(
        "CSV processed: {} clean rows, {} dropped, {} duplicates merged",
        report.cleaned_rows, report.dropped_rows, report.duplicates_merged
    );
    for warning in &report.warnings {
        println!("  warning: {warning}");
    }
    if !report.preview.is_empty() {
        println!("  preview ({} rows):", report.preview.len());
        for row in report.preview.iter().take(5) {
            println!(
                "    {} | {:<20} | {:<8} | spend {:>8.0} | ctr {:.2}% | roas {:.2}x",
                row.date,
                row.campaign_name,
                row.platform,
                row.spend,
                row.ctr * 100.0,
                row.roas
            );
        }
        if report.preview.len() > 5 {
            println!("    ... and {} more", report.preview.len() - 5);
        }
    }
}

pub fn recommendation(
    position: usize,
    rec: &Recommendation,
    citations: &[&Benchmark],
    judgment: Option<&FeedbackJudgment>,
) {
    println!(
        "{position}. [{}] {} ({}% confidence, {})",
        rec.kind.label(),
        rec.title,
        rec.confidence_pct(),
        rec.confidence_tier()
    );
    println!("   platform: {}", rec.details.platform_label());
    println!("   {}", rec.description);
    println!("   why this fired: {}", rec.why_fired);
    for (key, value) in &rec.trigger_metrics {
        println!("     {}: {}", key.replace('_', " "), plain_value(value));
    }
    if !rec.projected_impact.is_empty() {
        println!("   projected impact: {}", rec.projected_impact);
    }
    for benchmark in citations {
        println!(
            "   source: {} ({}) - {} <{}>",
            benchmark.title, benchmark.year, benchmark.key_finding, benchmark.source_url
        );
    }
    match judgment {
        Some(judgment) if judgment.is_useful => println!("   rated: useful"),
        Some(_) => println!("   rated: not useful"),
        None => println!("   rated: not yet"),
    }
    println!();
}

pub fn evaluation(refresher: &EvaluationRefresher) {
    println!("Recommendation quality");
    match refresher.summary() {
        Some(EvaluationSummary::NoData) => {
            println!("  No feedback yet. Rate a few recommendations and come back.");
        }
        Some(EvaluationSummary::Ready(digest)) => {
            println!(
                "  Overall precision: {}% ({} of {} rated useful)",
                digest.overall_pct, digest.useful_count, digest.total_feedback
            );
            for row in &digest.rows {
                println!(
                    "    {:<22} {:>3}% ({}/{}){}",
                    row.kind.label(),
                    row.pct,
                    row.useful,
                    row.total,
                    if row.low_sample { "  (small sample)" } else { "" }
                );
            }
            if let Some(top) = &digest.top_rule {
                println!("  Best performing rule: {}", top.kind.label());
            }
            if digest.rows.iter().any(|row| row.low_sample) {
                println!("  Figures from fewer than 5 ratings are preliminary.");
            }
        }
        None => match refresher.last_error() {
            Some(message) => println!("  {message}"),
            None => println!("  Metrics not loaded yet."),
        },
    }
}

pub fn simulation(view: &SimulationView) {
    match view {
        SimulationView::Closed => println!("(no simulation open)"),
        SimulationView::Running { campaign_name, action } => {
            println!("Simulating {action} for \"{campaign_name}\"...");
        }
        SimulationView::Errored(message) => println!("Simulation failed: {message}"),
        SimulationView::Complete(report) => {
            println!("What-if simulation");
            println!(
                "  current: spend \u{20b9}{:.0}/day, roas {:.2}x, cpa {}",
                report.current_metrics.avg_daily_spend,
                report.current_metrics.avg_roas,
                report.current_metrics.avg_cpa
            );
            let roas = &report.projected_metrics.roas;
            println!(
                "  projected roas: {:.2}x  (p5 {:.2}x .. p95 {:.2}x)",
                roas.median, roas.p5, roas.p95
            );
            println!("    {}", interval_bar(&RangeBarLayout::non_negative(roas)));
            let lift = &report.projected_metrics.daily_revenue_lift;
            println!(
                "  daily revenue lift: \u{20b9}{:.0}  (p5 \u{20b9}{:.0} .. p95 \u{20b9}{:.0})",
                lift.median, lift.p5, lift.p95
            );
            println!("    {}", interval_bar(&RangeBarLayout::signed(lift)));
            if let Some(cpa) = &report.projected_metrics.cpa {
                println!(
                    "  projected cpa: \u{20b9}{:.0} ({:.0}% lower)",
                    cpa.median, cpa.reduction_pct
                );
            }
            if !report.confidence_interval.is_empty() {
                println!("  interval: {}", report.confidence_interval);
            }
            if !report.impact_summary.is_empty() {
                println!("  {}", report.impact_summary);
            }
            println!("  Projections come from 1,000 bootstrap resamples of recent daily data.");
        }
    }
}

/// Draw the p5..p95 band and median dot on a fixed-width ASCII track.
fn interval_bar(layout: &RangeBarLayout) -> String {
    let cell = |pct: f64| -> usize {
        let slot = (pct / 100.0 * BAR_WIDTH as f64).round();
        slot.max(0.0).min((BAR_WIDTH - 1) as f64) as usize
    };
    let mut track = vec!['-'; BAR_WIDTH];
    let start = cell(layout.left_pct);
    let end = cell(layout.left_pct + layout.width_pct);
    for slot in track.iter_mut().take(end + 1).skip(start) {
        *slot = '=';
    }
    track[cell(layout.dot_pct)] = 'o';
    track.into_iter().collect()
}

fn plain_value(value: &serde_json::Value) -> String {
    match value {
        serde_json::Value::String(text) => text.clone(),
        other => other.to_string(),
    }
}
