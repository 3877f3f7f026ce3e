use anyhow::Context;
use clap::Parser;
use growthai_core::config::Settings;
use growthai_core::domain::recommendation::RecommendationKind;
use growthai_core::domain::upload::ExportFile;
use growthai_core::gateway::http::HttpAnalysisGateway;
use growthai_core::prefs::{FilePreferenceStore, PreferenceStore, Theme};
use growthai_core::workflow::session::{WorkflowSession, WorkflowStep};
use growthai_core::workflow::store::RecommendationFilter;
use growthai_core::workflow::upload::UploadOutcome;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod render;

const DEFAULT_PREFS_PATH: &str = ".growthai/prefs.json";

#[derive(Debug, Parser)]
#[command(name = "growthai")]
struct Args {
    /// Path to an ad-platform CSV export. Defaults to the bundled demo dataset.
    #[arg(long)]
    csv: Option<std::path::PathBuf>,

    /// Only list recommendations for this platform (e.g. meta, google).
    #[arg(long)]
    platform: Option<String>,

    /// Only list recommendations of this rule type (fatigue or reallocation).
    #[arg(long = "type")]
    kind: Option<String>,

    /// Hide recommendations below this confidence percentage.
    #[arg(long, default_value_t = 0, value_parser = clap::value_parser!(u8).range(0..=100))]
    min_confidence: u8,

    /// Simulate the n-th recommendation of the filtered list (1-based).
    #[arg(long, value_parser = clap::value_parser!(u64).range(1..))]
    simulate: Option<u64>,

    /// Rate the first filtered recommendation and show the evaluation panel.
    #[arg(long, value_parser = ["useful", "not-useful"])]
    feedback: Option<String>,

    /// Persist a display theme before running.
    #[arg(long, value_parser = ["light", "dark"])]
    theme: Option<String>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    let settings = Settings::from_env()?;
    let _sentry_guard = init_sentry(&settings);

    tracing_subscriber::registry()
        .with(EnvFilter::from_default_env())
        .with(tracing_subscriber::fmt::layer())
        .with(sentry_tracing::layer())
        .init();

    let args = Args::parse();

    let prefs = apply_theme(&settings, args.theme.as_deref())?;
    render::header(prefs.theme);

    let gateway = HttpAnalysisGateway::from_settings(&settings)?;
    let mut session = WorkflowSession::new(std::sync::Arc::new(gateway));

    let result = run(&mut session, &args).await;
    if let Err(err) = &result {
        sentry_anyhow::capture_anyhow(err);
        tracing::error!(error = %err, "workflow run failed");
    }
    result
}

async fn run(session: &mut WorkflowSession, args: &Args) -> anyhow::Result<()> {
    let outcome = match ingest(session, args).await {
        Ok(outcome) => outcome,
        Err(err) => {
            if let Some(message) = session.upload().last_error().await {
                eprintln!("upload failed: {message}");
            }
            return Err(err);
        }
    };
    render::upload_outcome(&outcome);

    let found = match session.analyze().await {
        Ok(found) => found,
        Err(err) => {
            if let Some(message) = session.last_error() {
                eprintln!("analysis failed: {message}");
            }
            return Err(err.into());
        }
    };
    println!("\nFound {found} optimization opportunities");

    let filter = build_filter(args);
    let listed = session.filtered(&filter);
    println!(
        "Showing {} of {} recommendations\n",
        listed.len(),
        session.store().len()
    );
    let mut ids = Vec::with_capacity(listed.len());
    for (index, rec) in listed.iter().enumerate() {
        render::recommendation(
            index + 1,
            rec,
            &session.citations(rec),
            session.feedback().judgment(rec.id),
        );
        ids.push(rec.id);
    }

    if let Some(choice) = args.feedback.as_deref() {
        match ids.first() {
            Some(&id) => {
                let judgment = session.submit_feedback(id, choice == "useful").await?;
                println!(
                    "Recorded {} feedback for {}",
                    if judgment.is_useful { "useful" } else { "not useful" },
                    judgment.recommendation_id
                );
                session.navigate(WorkflowStep::Evaluation)?;
                println!();
                render::evaluation(session.evaluation());
            }
            None => println!("No recommendation matched the filter; feedback skipped"),
        }
    }

    if let Some(position) = args.simulate {
        let selected = usize::try_from(position - 1)
            .ok()
            .and_then(|index| ids.get(index));
        let Some(&id) = selected else {
            anyhow::bail!(
                "--simulate {position} is out of range; the filtered list has {} entries",
                ids.len()
            );
        };
        session.navigate(WorkflowStep::Recommendations)?;
        let view = session.simulate(id).await?;
        println!();
        render::simulation(view);
        session.close_simulation();
    }

    Ok(())
}

async fn ingest(session: &mut WorkflowSession, args: &Args) -> anyhow::Result<UploadOutcome> {
    match &args.csv {
        Some(path) => {
            let bytes = std::fs::read(path)
                .with_context(|| format!("failed to read {}", path.display()))?;
            let name = path
                .file_name()
                .and_then(|name| name.to_str())
                .unwrap_or("export.csv")
                .to_string();
            session.select_file(ExportFile::new(name, bytes)).await?;
            Ok(session.submit_upload().await?)
        }
        None => {
            println!("No CSV supplied; loading the bundled demo dataset");
            Ok(session.load_sample().await?)
        }
    }
}

fn build_filter(args: &Args) -> RecommendationFilter {
    RecommendationFilter {
        kind: args.kind.clone().map(RecommendationKind::from),
        platform: args.platform.clone(),
        min_confidence_pct: args.min_confidence,
    }
}

fn apply_theme(
    settings: &Settings,
    requested: Option<&str>,
) -> anyhow::Result<growthai_core::prefs::DisplayPrefs> {
    let path = settings
        .prefs_path
        .clone()
        .unwrap_or_else(|| DEFAULT_PREFS_PATH.to_string());
    let store = FilePreferenceStore::new(path);
    let mut prefs = store.load();
    if let Some(requested) = requested {
        prefs.theme = match requested {
            "dark" => Theme::Dark,
            _ => Theme::Light,
        };
        store.save(&prefs)?;
        tracing::info!(path = %store.path().display(), theme = requested, "display theme saved");
    }
    Ok(prefs)
}

fn init_sentry(settings: &Settings) -> Option<sentry::ClientInitGuard> {
    let dsn = settings.sentry_dsn.as_deref()?;
    Some(sentry::init((
        dsn,
        sentry::ClientOptions {
            release: sentry::release_name!(),
            ..Default::default()
        },
    )))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn simulate_position_is_one_based() {
        let args = Args::try_parse_from(["growthai", "--simulate", "3"]).unwrap();
        assert_eq!(args.simulate, Some(3));
        assert!(Args::try_parse_from(["growthai", "--simulate", "0"]).is_err());
    }

    #[test]
    fn confidence_threshold_is_a_percentage() {
        let args = Args::try_parse_from(["growthai", "--min-confidence", "85"]).unwrap();
        assert_eq!(args.min_confidence, 85);
        assert!(Args::try_parse_from(["growthai", "--min-confidence", "101"]).is_err());
    }
}
