//! Dashboard assembly and page output
//!
//! A render pass is strictly linear:
//!
//! 1. load the five tables ([`crate::data::Datasets::load`])
//! 2. derive every figure ([`Dashboard::build`])
//! 3. write the page ([`html::write`])
//!
//! Nothing is cached between passes. The live server and the `render`
//! command both go through [`load`] and differ only in where the page goes.
//!
//! # Usage
//!
//! ```ignore
//! use callboard::{dashboard, DataPaths};
//!
//! let paths = DataPaths::default();
//! let board = dashboard::load(&paths, "Dashboard")?;
//! dashboard::generate("dashboard.html", &board, "logo.png")?;
//! ```

pub mod charts;
pub mod drilldown;
pub mod html;

use crate::data::{DataPaths, Datasets};
use crate::error::LoadError;
use charts::{Gauge, Heatmap, PolarityBar, ScoreBar};
use drilldown::DrillDown;
use serde::Serialize;
use std::io;
use std::path::Path;

/// Everything the page shows, top to bottom
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Dashboard {
    pub title: String,
    pub generated: String,
    pub score_bars: Vec<ScoreBar>,
    pub heatmap: Heatmap,
    pub polarity_gauge: Gauge,
    pub subjectivity_gauge: Gauge,
    pub polarity_bars: Vec<PolarityBar>,
    pub drilldown: DrillDown,
}

impl Dashboard {
    pub fn build(data: &Datasets, title: &str) -> Self {
        Self {
            title: title.to_string(),
            generated: chrono::Local::now().format("%Y-%m-%d %H:%M:%S").to_string(),
            score_bars: charts::rank_scores(&data.advisor_scores),
            heatmap: charts::pivot_categories(&data.category_detail),
            polarity_gauge: charts::polarity_gauge(&data.sentiment),
            subjectivity_gauge: charts::subjectivity_gauge(&data.sentiment),
            polarity_bars: charts::polarity_bars(&data.advisor_polarity),
            drilldown: drilldown::build(&data.call_results),
        }
    }
}

/// Load every input (logo included) and build the dashboard
pub fn load(paths: &DataPaths, title: &str) -> Result<Dashboard, LoadError> {
    let data = Datasets::load(paths)?;
    if !paths.logo.is_file() {
        return Err(LoadError::Io {
            path: paths.logo.clone(),
            source: io::Error::new(io::ErrorKind::NotFound, "logo image not found"),
        });
    }
    Ok(Dashboard::build(&data, title))
}

/// Write the page to `path`, referencing the logo at `logo_src`
pub fn generate<P: AsRef<Path>>(path: P, dashboard: &Dashboard, logo_src: &str) -> io::Result<()> {
    let mut file = std::fs::File::create(path.as_ref())?;
    html::write(&mut file, dashboard, logo_src)
}
