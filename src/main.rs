use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use clap::Parser;
use eframe::egui;

use sales_dashboard::app::SalesDashboardApp;
use sales_dashboard::data::{LoadOptions, RowPolicy};
use sales_dashboard::state::AppState;

/// Superstore sales dashboard.
#[derive(Debug, Parser)]
#[command(version, about)]
struct Cli {
    /// Orders file: Latin-1 `.csv` or `.parquet`.
    #[arg(default_value = "data/superstore_dataset.csv")]
    data: PathBuf,

    /// Abort on the first row with an unparseable date or sales amount
    /// instead of skipping it.
    #[arg(long)]
    strict: bool,

    /// CSV field delimiter.
    #[arg(long, default_value_t = ',')]
    delimiter: char,
}

impl Cli {
    fn load_options(&self) -> Result<LoadOptions> {
        if !self.delimiter.is_ascii() {
            bail!("delimiter must be a single ASCII character, got {:?}", self.delimiter);
        }
        Ok(LoadOptions {
            delimiter: self.delimiter as u8,
            row_policy: if self.strict {
                RowPolicy::Strict
            } else {
                RowPolicy::Permissive
            },
        })
    }
}

fn main() -> Result<()> {
    env_logger::init();
    let cli = Cli::parse();

    // Load before any window opens; a bad source is fatal.
    let mut state = AppState::new(cli.load_options()?);
    state
        .open_path(&cli.data)
        .with_context(|| format!("loading {}", cli.data.display()))?;

    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([1280.0, 820.0])
            .with_min_inner_size([720.0, 480.0]),
        ..Default::default()
    };

    eframe::run_native(
        "Superstore Sales Dashboard",
        options,
        Box::new(|_cc| Ok(Box::new(SalesDashboardApp::new(state)))),
    )
    .map_err(|e| anyhow::anyhow!("{e}"))
}
