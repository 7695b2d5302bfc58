use anyhow::Context;
use callboard::config::DEFAULT_TITLE;
use callboard::dashboard::drilldown::DrillDown;
use callboard::data::DEFAULT_LOGO;
use callboard::serve::ServeOptions;
use callboard::{dashboard, Dashboard, DashboardConfig, DataPaths};
use clap::{Args as ClapArgs, Parser, Subcommand};
use log::LevelFilter;
use std::path::{Path, PathBuf};

#[derive(Parser, Debug)]
#[command(name = "callboard")]
#[command(author, version, about = "QA dashboard over precomputed call-center metrics")]
struct Args {
    #[command(subcommand)]
    command: Option<Command>,

    #[command(flatten)]
    inputs: InputArgs,
}

#[derive(ClapArgs, Debug)]
struct InputArgs {
    /// Directory holding the five CSV tables
    #[arg(long, global = true, default_value = "data")]
    data_dir: PathBuf,

    /// Logo image shown in the page header
    #[arg(long, global = true, default_value = DEFAULT_LOGO)]
    logo: PathBuf,

    /// JSON config overriding title and individual paths
    #[arg(long, global = true)]
    config: Option<PathBuf>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Serve the live dashboard (default)
    Serve {
        /// Port to listen on
        #[arg(short, long, default_value = "8501")]
        port: u16,

        /// Don't open a browser
        #[arg(long)]
        no_open: bool,
    },

    /// Write a static snapshot of the dashboard
    Render {
        /// Output HTML file
        #[arg(short, long, default_value = "dashboard.html")]
        output: PathBuf,

        /// Open the page when done
        #[arg(long)]
        open: bool,
    },

    /// Print the headline numbers to the terminal
    Summary,
}

fn main() -> anyhow::Result<()> {
    env_logger::Builder::default()
        .filter_level(LevelFilter::Error)
        .parse_env(env_logger::Env::default().filter_or("CALLBOARD_LOG", "error,callboard=info"))
        .init();

    let args = Args::parse();
    let (paths, title) = resolve_inputs(&args.inputs)?;

    match args.command.unwrap_or(Command::Serve { port: 8501, no_open: false }) {
        Command::Serve { port, no_open } => {
            callboard::serve::start(ServeOptions { port, paths, title, open_browser: !no_open })
                .context("server error")?;
        }
        Command::Render { output, open } => render(&paths, &title, &output, open)?,
        Command::Summary => {
            let board = dashboard::load(&paths, &title)?;
            print_summary(&board);
        }
    }

    Ok(())
}

fn resolve_inputs(inputs: &InputArgs) -> anyhow::Result<(DataPaths, String)> {
    match inputs.config {
        Some(ref config_path) => {
            let config = DashboardConfig::from_file(config_path)?;
            log::info!("Using config {}", config_path.display());
            Ok((config.resolve_paths(&inputs.data_dir, &inputs.logo), config.title().to_string()))
        }
        None => Ok((
            DataPaths::in_dir(&inputs.data_dir).with_logo(&inputs.logo),
            DEFAULT_TITLE.to_string(),
        )),
    }
}

fn render(paths: &DataPaths, title: &str, output: &Path, open: bool) -> anyhow::Result<()> {
    let board = dashboard::load(paths, title)?;

    // The page references the logo by file name, so it travels with the HTML
    let logo_name = paths
        .logo
        .file_name()
        .context("logo path has no file name")?
        .to_string_lossy()
        .to_string();
    let out_dir = match output.parent() {
        Some(p) if !p.as_os_str().is_empty() => p.to_path_buf(),
        _ => PathBuf::from("."),
    };
    std::fs::create_dir_all(&out_dir).with_context(|| format!("cannot create {}", out_dir.display()))?;

    let logo_dest = out_dir.join(&logo_name);
    if !same_file(&paths.logo, &logo_dest) {
        std::fs::copy(&paths.logo, &logo_dest)
            .with_context(|| format!("cannot copy logo to {}", logo_dest.display()))?;
    }

    dashboard::generate(output, &board, &logo_name)
        .with_context(|| format!("failed to write {}", output.display()))?;
    eprintln!("\x1b[32mDashboard saved: {}\x1b[0m", output.display());

    if open {
        if let Err(e) = open::that(output) {
            eprintln!("Failed to open dashboard: {}", e);
        }
    }

    Ok(())
}

fn same_file(a: &Path, b: &Path) -> bool {
    match (a.canonicalize(), b.canonicalize()) {
        (Ok(x), Ok(y)) => x == y,
        _ => false,
    }
}

fn print_summary(board: &Dashboard) {
    eprintln!("\x1b[1m{}\x1b[0m", board.title);
    eprintln!("{}", "─".repeat(70));

    println!("Puntaje promedio por asesor:");
    for bar in &board.score_bars {
        let color = match bar.value {
            Some(v) if v >= 0.8 => "\x1b[32m",
            Some(v) if v >= 0.6 => "\x1b[33m",
            Some(_) => "\x1b[31m",
            None => "\x1b[2m",
        };
        let label = if bar.value.is_some() { bar.label.as_str() } else { "—" };
        println!("  {}{:>8}\x1b[0m  {}", color, label, bar.asesor);
    }

    println!();
    println!(
        "Polaridad promedio:      {} ({})",
        board.polarity_gauge.value_label, board.polarity_gauge.delta_label
    );
    println!(
        "Subjetividad promedio:   {} ({})",
        board.subjectivity_gauge.value_label, board.subjectivity_gauge.delta_label
    );

    println!();
    match board.drilldown {
        DrillDown::Empty { ref warning } => println!("\x1b[33m{}\x1b[0m", warning),
        DrillDown::Sections { ref sections } => {
            println!("Llamadas por asesor:");
            for section in sections {
                let effective = section.calls.iter().filter(|c| c.effective).count();
                println!(
                    "  {:<30} {:>4} llamadas  {:>4} efectivas",
                    section.asesor,
                    section.calls.len(),
                    effective
                );
            }
        }
    }
}
