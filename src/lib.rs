//! Callboard - QA dashboard for call-center advisors
//!
//! Callboard renders a single page over metrics that an upstream pipeline has
//! already computed: mean score per advisor, checklist category counts,
//! call sentiment, and per-call pass/fail results. It does no scoring or
//! sentiment analysis of its own; it reads five CSV tables and turns them
//! into charts.
//!
//! # The page, top to bottom
//!
//! | Figure | Source table | Notes |
//! |--------|--------------|-------|
//! | Ranked score bars | advisor scores | highest first, labels like `80.00%` |
//! | Category heatmap | category detail | advisor × category, fixed domain 0..2 |
//! | Polarity gauge | overall sentiment | mean polarity on -1..1, delta vs 0 |
//! | Subjectivity gauge | overall sentiment | mean subjectivity on 0..1, delta vs 0.5 |
//! | Polarity bars | advisor polarity | horizontal, input order |
//! | Drill-down | per-call results | one collapsible section per advisor |
//!
//! # Quick Start
//!
//! ```no_run
//! use callboard::{dashboard, DataPaths};
//!
//! let paths = DataPaths::in_dir("data");
//! let board = dashboard::load(&paths, "Dashboard").expect("inputs readable");
//!
//! for bar in &board.score_bars {
//!     println!("{}: {}", bar.asesor, bar.label);
//! }
//! ```
//!
//! # Modules
//!
//! - [`data`]: dataset records and CSV loading
//! - [`dashboard`]: figure models, drill-down and HTML output
//! - [`serve`]: live view over HTTP
//! - [`config`]: optional JSON config

pub mod config;
pub mod dashboard;
pub mod data;
pub mod error;
pub mod serve;

pub use config::DashboardConfig;
pub use dashboard::Dashboard;
pub use data::{DataPaths, Datasets};
pub use error::LoadError;

#[cfg(test)]
mod tests {
    use super::*;

    // ==========================================================================
    // PUBLIC API TESTS
    // ==========================================================================

    #[test]
    fn test_public_exports() {
        let _paths: DataPaths = DataPaths::default();
        let _config: DashboardConfig = DashboardConfig::default();
        let board: Dashboard = Dashboard::build(&Datasets::default(), config::DEFAULT_TITLE);
        assert_eq!(board.title, config::DEFAULT_TITLE);
    }

    #[test]
    fn test_checklist_accessible() {
        assert_eq!(dashboard::drilldown::CHECKLIST.len(), 6);
        assert_eq!(dashboard::drilldown::PASS, "✅");
    }
}
