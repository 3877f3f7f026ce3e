use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Upper bound on preview rows retained from an ingest response.
pub const PREVIEW_ROWS: usize = 20;

const SAMPLE_FILE_NAME: &str = "sample.csv";
const SAMPLE_CSV: &str = include_str!("../../assets/sample.csv");

/// A raw ad-platform export chosen by the user, held in memory until submission.
#[derive(Debug, Clone)]
pub struct ExportFile {
    pub name: String,
    pub bytes: Vec<u8>,
}

impl ExportFile {
    pub fn new(name: impl Into<String>, bytes: Vec<u8>) -> Self {
        Self {
            name: name.into(),
            bytes,
        }
    }

    /// The demo dataset shipped with the binary, wrapped as if the user had picked it.
    pub fn bundled_sample() -> Self {
        Self::new(SAMPLE_FILE_NAME, SAMPLE_CSV.as_bytes().to_vec())
    }

    pub fn is_csv(&self) -> bool {
        self.name.ends_with(".csv")
    }
}

/// Outcome of server-side cleaning for one uploaded export.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UploadReport {
    pub cleaned_rows: u64,
    pub dropped_rows: u64,
    pub duplicates_merged: u64,
    #[serde(default)]
    pub warnings: Vec<String>,
    #[serde(default)]
    pub preview: Vec<CampaignRow>,
}

/// One normalized daily campaign row as echoed back by the ingest endpoint.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CampaignRow {
    pub date: NaiveDate,
    pub campaign_name: String,
    pub platform: String,
    pub spend: f64,
    pub ctr: f64,
    pub cpa: f64,
    pub roas: f64,
}
