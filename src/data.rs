//! Dataset loading
//!
//! The dashboard consumes five CSV tables produced by the upstream QA pipeline.
//! They share no keys beyond the `asesor` string and are read fresh on every
//! render pass.
//!
//! Four tables have a fixed schema and are deserialized straight into records.
//! Per-call results are open-ended (one count column and one `<cat>_ok` column
//! per checklist category), so each row is kept as a header → cell map.

use crate::error::LoadError;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};
use std::fs::File;
use std::path::{Path, PathBuf};

pub const ADVISOR_SCORES_FILE: &str = "puntaje_promedio_por_asesor.csv";
pub const CATEGORY_DETAIL_FILE: &str = "promedio_conteo_por_categoria.csv";
pub const SENTIMENT_FILE: &str = "sentimiento_general.csv";
pub const ADVISOR_POLARITY_FILE: &str = "polaridad_por_asesor.csv";
pub const CALL_RESULTS_FILE: &str = "resultados_por_asesor.csv";
pub const DEFAULT_LOGO: &str = "images/CUN-1200X1200.png";

/// Mean QA score per advisor, as a fraction in 0..1
///
/// Numeric cells in the fixed tables may be blank (an upstream mean over an
/// empty group). Blank reads as `None`; any other non-numeric text is an error.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct AdvisorScore {
    pub asesor: String,
    pub puntaje_promedio: Option<f64>,
}

/// Mean count of one checklist category for one advisor
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct CategoryDetail {
    pub asesor: String,
    pub categoria: String,
    pub promedio_conteo: Option<f64>,
}

/// Raw sentiment of a single call
#[derive(Debug, Clone, Copy, PartialEq, Deserialize, Serialize)]
pub struct SentimentSample {
    pub polarity: Option<f64>,
    pub subjectivity: Option<f64>,
}

/// Mean sentiment polarity per advisor
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct AdvisorPolarity {
    pub asesor: String,
    pub polarity: Option<f64>,
}

/// One evaluated call.
///
/// `asesor` and `archivo` are always present. Everything else lives in
/// `fields` exactly as read, so missing categories can fall back to defaults
/// at display time.
#[derive(Debug, Clone, PartialEq)]
pub struct CallRecord {
    pub asesor: String,
    pub archivo: String,
    pub puntaje: Option<f64>,
    fields: HashMap<String, String>,
}

impl CallRecord {
    pub fn new(asesor: &str, archivo: &str) -> Self {
        Self {
            asesor: asesor.to_string(),
            archivo: archivo.to_string(),
            puntaje: None,
            fields: HashMap::new(),
        }
    }

    pub fn with_field(mut self, column: &str, value: &str) -> Self {
        if column == "puntaje" {
            self.puntaje = value.trim().parse().ok();
        }
        self.fields.insert(column.to_string(), value.to_string());
        self
    }

    /// Cell value for `column`; `None` when the column is absent or the cell is blank
    pub fn get(&self, column: &str) -> Option<&str> {
        self.fields
            .get(column)
            .map(|v| v.as_str())
            .filter(|v| !v.trim().is_empty())
    }
}

/// Where each input lives on disk
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DataPaths {
    pub advisor_scores: PathBuf,
    pub category_detail: PathBuf,
    pub sentiment: PathBuf,
    pub advisor_polarity: PathBuf,
    pub call_results: PathBuf,
    pub logo: PathBuf,
}

impl DataPaths {
    /// The five standard file names inside `dir`, with the default logo
    pub fn in_dir<P: AsRef<Path>>(dir: P) -> Self {
        let dir = dir.as_ref();
        Self {
            advisor_scores: dir.join(ADVISOR_SCORES_FILE),
            category_detail: dir.join(CATEGORY_DETAIL_FILE),
            sentiment: dir.join(SENTIMENT_FILE),
            advisor_polarity: dir.join(ADVISOR_POLARITY_FILE),
            call_results: dir.join(CALL_RESULTS_FILE),
            logo: PathBuf::from(DEFAULT_LOGO),
        }
    }

    pub fn with_logo<P: Into<PathBuf>>(mut self, logo: P) -> Self {
        self.logo = logo.into();
        self
    }
}

impl Default for DataPaths {
    fn default() -> Self {
        Self::in_dir("data")
    }
}

/// All five tables, loaded for one render pass
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Datasets {
    pub advisor_scores: Vec<AdvisorScore>,
    pub category_detail: Vec<CategoryDetail>,
    pub sentiment: Vec<SentimentSample>,
    pub advisor_polarity: Vec<AdvisorPolarity>,
    pub call_results: Vec<CallRecord>,
}

impl Datasets {
    /// Read every table. The first failure aborts the whole load.
    pub fn load(paths: &DataPaths) -> Result<Self, LoadError> {
        let datasets = Self {
            advisor_scores: read_table(&paths.advisor_scores, &["asesor", "puntaje_promedio"])?,
            category_detail: load_category_detail(&paths.category_detail)?,
            sentiment: read_table(&paths.sentiment, &["polarity", "subjectivity"])?,
            advisor_polarity: read_table(&paths.advisor_polarity, &["asesor", "polarity"])?,
            call_results: load_call_results(&paths.call_results)?,
        };

        log::info!(
            "Loaded {} advisor scores, {} category cells, {} sentiment rows, {} polarity rows, {} calls",
            datasets.advisor_scores.len(),
            datasets.category_detail.len(),
            datasets.sentiment.len(),
            datasets.advisor_polarity.len(),
            datasets.call_results.len()
        );

        Ok(datasets)
    }
}

/// Read the logo image so the page never references a missing asset
pub fn load_logo(path: &Path) -> Result<Vec<u8>, LoadError> {
    std::fs::read(path).map_err(|source| LoadError::Io { path: path.to_path_buf(), source })
}

/// Content type for the logo, from its extension
pub fn logo_mime(path: &Path) -> &'static str {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or("")
        .to_lowercase();

    match ext.as_str() {
        "png" => "image/png",
        "jpg" | "jpeg" => "image/jpeg",
        "gif" => "image/gif",
        "svg" => "image/svg+xml",
        "webp" => "image/webp",
        _ => "application/octet-stream",
    }
}

fn open_reader(path: &Path) -> Result<csv::Reader<File>, LoadError> {
    let file = File::open(path).map_err(|source| LoadError::Io { path: path.to_path_buf(), source })?;
    Ok(csv::Reader::from_reader(file))
}

fn csv_error(path: &Path) -> impl Fn(csv::Error) -> LoadError + '_ {
    move |source| LoadError::Csv { path: path.to_path_buf(), source }
}

fn require_columns(path: &Path, headers: &csv::StringRecord, required: &[&str]) -> Result<(), LoadError> {
    for column in required {
        if !headers.iter().any(|h| h == *column) {
            return Err(LoadError::MissingColumn {
                path: path.to_path_buf(),
                column: column.to_string(),
            });
        }
    }
    Ok(())
}

fn read_table<T: DeserializeOwned>(path: &Path, required: &[&str]) -> Result<Vec<T>, LoadError> {
    let mut reader = open_reader(path)?;
    let headers = reader.headers().map_err(csv_error(path))?.clone();
    require_columns(path, &headers, required)?;

    reader
        .deserialize::<T>()
        .map(|row| row.map_err(csv_error(path)))
        .collect()
}

fn load_category_detail(path: &Path) -> Result<Vec<CategoryDetail>, LoadError> {
    let rows: Vec<CategoryDetail> = read_table(path, &["asesor", "categoria", "promedio_conteo"])?;

    let mut seen = HashSet::new();
    for row in &rows {
        if !seen.insert((row.asesor.as_str(), row.categoria.as_str())) {
            return Err(LoadError::DuplicateCell {
                path: path.to_path_buf(),
                asesor: row.asesor.clone(),
                categoria: row.categoria.clone(),
            });
        }
    }

    Ok(rows)
}

fn load_call_results(path: &Path) -> Result<Vec<CallRecord>, LoadError> {
    let mut reader = open_reader(path)?;
    let headers = reader.headers().map_err(csv_error(path))?.clone();
    require_columns(path, &headers, &["asesor", "archivo"])?;

    let mut calls = Vec::new();
    for record in reader.records() {
        let record = record.map_err(csv_error(path))?;
        let line = record.position().map(|p| p.line()).unwrap_or(0);

        let fields: HashMap<String, String> = headers
            .iter()
            .zip(record.iter())
            .map(|(h, v)| (h.to_string(), v.to_string()))
            .collect();

        let puntaje = match fields.get("puntaje").map(|v| v.trim()) {
            Some(v) if !v.is_empty() => Some(v.parse::<f64>().map_err(|_| LoadError::InvalidNumber {
                path: path.to_path_buf(),
                line,
                column: "puntaje".to_string(),
                value: v.to_string(),
            })?),
            _ => None,
        };

        calls.push(CallRecord {
            asesor: fields.get("asesor").cloned().unwrap_or_default(),
            archivo: fields.get("archivo").cloned().unwrap_or_default(),
            puntaje,
            fields,
        });
    }

    Ok(calls)
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    static FIXTURE_COUNTER: AtomicUsize = AtomicUsize::new(0);

    /// A fresh directory under the system temp dir for one test's CSV files
    pub(crate) fn fixture_dir(name: &str) -> PathBuf {
        let n = FIXTURE_COUNTER.fetch_add(1, Ordering::SeqCst);
        let dir = std::env::temp_dir().join(format!("callboard-{}-{}-{}", name, std::process::id(), n));
        std::fs::create_dir_all(&dir).unwrap();
        dir
    }

    /// Write all five standard tables into `dir`
    pub(crate) fn write_standard_tables(dir: &Path, call_results: &str) {
        std::fs::write(dir.join(ADVISOR_SCORES_FILE), "asesor,puntaje_promedio\nB,0.65\nA,0.80\n").unwrap();
        std::fs::write(
            dir.join(CATEGORY_DETAIL_FILE),
            "asesor,categoria,promedio_conteo\nA,saludo,1.0\nA,cierre,2.5\nB,saludo,0.5\n",
        )
        .unwrap();
        std::fs::write(dir.join(SENTIMENT_FILE), "polarity,subjectivity\n0.2,0.4\n-0.4,0.8\n").unwrap();
        std::fs::write(dir.join(ADVISOR_POLARITY_FILE), "asesor,polarity\nA,0.15\nB,-0.05\n").unwrap();
        std::fs::write(dir.join(CALL_RESULTS_FILE), call_results).unwrap();
    }

    const CALLS: &str = "asesor,archivo,saludo,saludo_ok,efectiva,puntaje\n\
                         A,x.wav,1,✅,❌,72.3\n\
                         B,y.wav,0,❌,✅,\n";

    // ==========================================================================
    // LOADING TESTS
    // ==========================================================================

    #[test]
    fn test_load_all_tables() {
        let dir = fixture_dir("load-all");
        write_standard_tables(&dir, CALLS);

        let data = Datasets::load(&DataPaths::in_dir(&dir)).unwrap();

        assert_eq!(data.advisor_scores.len(), 2);
        assert_eq!(data.advisor_scores[0].asesor, "B");
        assert_eq!(data.category_detail.len(), 3);
        assert_eq!(data.sentiment[1].polarity, Some(-0.4));
        assert_eq!(data.advisor_polarity[1].asesor, "B");
        assert_eq!(data.call_results.len(), 2);
    }

    #[test]
    fn test_call_record_keeps_dynamic_columns() {
        let dir = fixture_dir("calls");
        write_standard_tables(&dir, CALLS);

        let data = Datasets::load(&DataPaths::in_dir(&dir)).unwrap();
        let first = &data.call_results[0];

        assert_eq!(first.asesor, "A");
        assert_eq!(first.archivo, "x.wav");
        assert_eq!(first.get("saludo"), Some("1"));
        assert_eq!(first.get("saludo_ok"), Some("✅"));
        assert_eq!(first.get("cierre"), None);
        assert_eq!(first.puntaje, Some(72.3));

        // Blank puntaje cell is absent, not an error
        assert_eq!(data.call_results[1].puntaje, None);
    }

    #[test]
    fn test_extra_columns_are_ignored() {
        let dir = fixture_dir("extra");
        write_standard_tables(&dir, CALLS);
        std::fs::write(
            dir.join(ADVISOR_SCORES_FILE),
            "asesor,llamadas,puntaje_promedio\nA,12,0.9\n",
        )
        .unwrap();

        let data = Datasets::load(&DataPaths::in_dir(&dir)).unwrap();
        assert_eq!(data.advisor_scores, vec![AdvisorScore { asesor: "A".into(), puntaje_promedio: Some(0.9) }]);
    }

    #[test]
    fn test_blank_sentiment_cell_is_skipped_not_fatal() {
        let dir = fixture_dir("blank-sentiment");
        write_standard_tables(&dir, CALLS);
        std::fs::write(dir.join(SENTIMENT_FILE), "polarity,subjectivity\n0.2,0.4\n,0.8\n").unwrap();

        let data = Datasets::load(&DataPaths::in_dir(&dir)).unwrap();
        assert_eq!(data.sentiment.len(), 2);
        assert_eq!(data.sentiment[1], SentimentSample { polarity: None, subjectivity: Some(0.8) });
    }

    #[test]
    fn test_blank_numeric_cells_in_fixed_tables() {
        let dir = fixture_dir("blank-cells");
        write_standard_tables(&dir, CALLS);
        std::fs::write(dir.join(ADVISOR_SCORES_FILE), "asesor,puntaje_promedio\nA,\nB,0.7\n").unwrap();
        std::fs::write(
            dir.join(CATEGORY_DETAIL_FILE),
            "asesor,categoria,promedio_conteo\nA,saludo,\nA,cierre,1.5\n",
        )
        .unwrap();
        std::fs::write(dir.join(ADVISOR_POLARITY_FILE), "asesor,polarity\nA,\n").unwrap();

        let data = Datasets::load(&DataPaths::in_dir(&dir)).unwrap();
        assert_eq!(data.advisor_scores[0].puntaje_promedio, None);
        assert_eq!(data.advisor_scores[1].puntaje_promedio, Some(0.7));
        assert_eq!(data.category_detail[0].promedio_conteo, None);
        assert_eq!(data.category_detail[1].promedio_conteo, Some(1.5));
        assert_eq!(data.advisor_polarity[0].polarity, None);
    }

    #[test]
    fn test_header_only_call_results_is_empty() {
        let dir = fixture_dir("empty-calls");
        write_standard_tables(&dir, "asesor,archivo,puntaje\n");

        let data = Datasets::load(&DataPaths::in_dir(&dir)).unwrap();
        assert!(data.call_results.is_empty());
    }

    // ==========================================================================
    // FAILURE TESTS
    // ==========================================================================
    //
    // Any problem with any table aborts the load.
    // ==========================================================================

    #[test]
    fn test_missing_file_is_io_error() {
        let dir = fixture_dir("missing");
        write_standard_tables(&dir, CALLS);
        std::fs::remove_file(dir.join(SENTIMENT_FILE)).unwrap();

        let err = Datasets::load(&DataPaths::in_dir(&dir)).unwrap_err();
        assert!(matches!(err, LoadError::Io { .. }));
        assert!(err.path().ends_with(SENTIMENT_FILE));
    }

    #[test]
    fn test_missing_column_is_reported() {
        let dir = fixture_dir("no-column");
        write_standard_tables(&dir, CALLS);
        std::fs::write(dir.join(ADVISOR_POLARITY_FILE), "asesor,score\nA,0.1\n").unwrap();

        match Datasets::load(&DataPaths::in_dir(&dir)).unwrap_err() {
            LoadError::MissingColumn { column, .. } => assert_eq!(column, "polarity"),
            other => panic!("unexpected error: {}", other),
        }
    }

    #[test]
    fn test_missing_column_detected_even_without_rows() {
        let dir = fixture_dir("no-column-empty");
        write_standard_tables(&dir, "asesor,puntaje\n");

        match Datasets::load(&DataPaths::in_dir(&dir)).unwrap_err() {
            LoadError::MissingColumn { column, .. } => assert_eq!(column, "archivo"),
            other => panic!("unexpected error: {}", other),
        }
    }

    #[test]
    fn test_non_numeric_score_is_csv_error() {
        let dir = fixture_dir("bad-number");
        write_standard_tables(&dir, CALLS);
        std::fs::write(dir.join(ADVISOR_SCORES_FILE), "asesor,puntaje_promedio\nA,high\n").unwrap();

        let err = Datasets::load(&DataPaths::in_dir(&dir)).unwrap_err();
        assert!(matches!(err, LoadError::Csv { .. }));
    }

    #[test]
    fn test_non_numeric_sentiment_is_csv_error() {
        let dir = fixture_dir("bad-sentiment");
        write_standard_tables(&dir, CALLS);
        std::fs::write(dir.join(SENTIMENT_FILE), "polarity,subjectivity\n0.2,0.4\nneutral,0.8\n").unwrap();

        let err = Datasets::load(&DataPaths::in_dir(&dir)).unwrap_err();
        assert!(matches!(err, LoadError::Csv { .. }));
    }

    #[test]
    fn test_non_numeric_puntaje_is_rejected() {
        let dir = fixture_dir("bad-puntaje");
        write_standard_tables(&dir, "asesor,archivo,puntaje\nA,x.wav,setenta\n");

        match Datasets::load(&DataPaths::in_dir(&dir)).unwrap_err() {
            LoadError::InvalidNumber { line, value, .. } => {
                assert_eq!(line, 2);
                assert_eq!(value, "setenta");
            }
            other => panic!("unexpected error: {}", other),
        }
    }

    #[test]
    fn test_ragged_row_is_csv_error() {
        let dir = fixture_dir("ragged");
        write_standard_tables(&dir, "asesor,archivo,puntaje\nA,x.wav\n");

        let err = Datasets::load(&DataPaths::in_dir(&dir)).unwrap_err();
        assert!(matches!(err, LoadError::Csv { .. }));
    }

    #[test]
    fn test_duplicate_category_cell_is_rejected() {
        let dir = fixture_dir("dup");
        write_standard_tables(&dir, CALLS);
        std::fs::write(
            dir.join(CATEGORY_DETAIL_FILE),
            "asesor,categoria,promedio_conteo\nA,saludo,1\nA,saludo,2\n",
        )
        .unwrap();

        let err = Datasets::load(&DataPaths::in_dir(&dir)).unwrap_err();
        assert!(matches!(err, LoadError::DuplicateCell { .. }));
    }

    // ==========================================================================
    // PATHS AND LOGO
    // ==========================================================================

    #[test]
    fn test_default_paths() {
        let paths = DataPaths::default();
        assert_eq!(paths.advisor_scores, PathBuf::from("data").join(ADVISOR_SCORES_FILE));
        assert_eq!(paths.call_results, PathBuf::from("data").join(CALL_RESULTS_FILE));
        assert_eq!(paths.logo, PathBuf::from(DEFAULT_LOGO));
    }

    #[test]
    fn test_logo_mime() {
        assert_eq!(logo_mime(Path::new("images/CUN-1200X1200.png")), "image/png");
        assert_eq!(logo_mime(Path::new("logo.JPG")), "image/jpeg");
        assert_eq!(logo_mime(Path::new("logo")), "application/octet-stream");
    }

    #[test]
    fn test_missing_logo_is_io_error() {
        let err = load_logo(Path::new("/definitely/not/here.png")).unwrap_err();
        assert!(matches!(err, LoadError::Io { .. }));
    }

    #[test]
    fn test_call_record_builder() {
        let call = CallRecord::new("A", "x.wav")
            .with_field("puntaje", "88.5")
            .with_field("cierre", " ");
        assert_eq!(call.puntaje, Some(88.5));
        assert_eq!(call.get("cierre"), None);
    }
}
