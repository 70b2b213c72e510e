//! CLI definition and dispatch.

use clap::{Parser, Subcommand};
use std::io::Write;
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use crate::adapters::csv_adapter::CsvAdapter;
use crate::adapters::file_config_adapter::FileConfigAdapter;
use crate::adapters::svg_surface::SvgSurface;
use crate::domain::candle::Candle;
use crate::domain::chart_state::ChartStore;
use crate::domain::error::ChartError;
use crate::domain::indicator::{IndicatorKind, IndicatorOutput, IndicatorSpec, compute_all};
use crate::domain::regime::{MarketState, compute_market_state};
use crate::domain::settings::ChartSettings;
use crate::domain::settings_validation::validate_chart_config;
use crate::domain::viewport::clamp_candle_width;
use crate::ports::candle_port::CandlePort;
use crate::ports::surface_port::SurfacePort;

#[derive(Parser, Debug)]
#[command(name = "candlechart", about = "Candlestick chart engine")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Plan one frame and write it as SVG
    Render {
        #[arg(short, long)]
        data: PathBuf,
        #[arg(short, long)]
        config: Option<PathBuf>,
        #[arg(short, long)]
        output: Option<PathBuf>,
        #[arg(long, allow_negative_numbers = true)]
        offset: Option<f64>,
        #[arg(long)]
        candle_width: Option<f64>,
    },
    /// Print the latest value of each indicator and the market regime
    Indicators {
        #[arg(short, long)]
        data: PathBuf,
        #[arg(short, long)]
        config: Option<PathBuf>,
    },
    /// Validate a chart configuration
    Validate {
        #[arg(short, long)]
        config: PathBuf,
    },
}

pub fn run(cli: Cli) -> ExitCode {
    match cli.command {
        Command::Render {
            data,
            config,
            output,
            offset,
            candle_width,
        } => run_render(&data, config.as_ref(), output.as_ref(), offset, candle_width),
        Command::Indicators { data, config } => run_indicators(&data, config.as_ref()),
        Command::Validate { config } => run_validate(&config),
    }
}

pub fn load_config(path: &PathBuf) -> Result<FileConfigAdapter, ExitCode> {
    FileConfigAdapter::from_file(path).map_err(|e| {
        let err = ChartError::ConfigParse {
            file: path.display().to_string(),
            reason: e.to_string(),
        };
        eprintln!("error: {err}");
        ExitCode::from(&err)
    })
}

/// Settings from `path`, or the defaults when no config file is given.
pub fn load_settings(path: Option<&PathBuf>) -> Result<ChartSettings, ExitCode> {
    let Some(path) = path else {
        return Ok(ChartSettings::default());
    };
    eprintln!("Loading config from {}", path.display());
    let adapter = load_config(path)?;
    ChartSettings::from_config(&adapter).map_err(|e| {
        eprintln!("error: {e}");
        ExitCode::from(&e)
    })
}

/// Reads candles from a CSV file path.
pub fn load_candles(path: &Path) -> Result<Vec<Candle>, ChartError> {
    let file_name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .ok_or_else(|| ChartError::Data {
            reason: format!("not a file path: {}", path.display()),
        })?;
    let dir = path.parent().map(Path::to_path_buf).unwrap_or_default();
    CsvAdapter::new(dir).fetch_candles(&file_name)
}

fn run_render(
    data: &Path,
    config: Option<&PathBuf>,
    output: Option<&PathBuf>,
    offset: Option<f64>,
    candle_width: Option<f64>,
) -> ExitCode {
    let mut settings = match load_settings(config) {
        Ok(s) => s,
        Err(code) => return code,
    };
    if let Some(offset) = offset {
        settings.offset = Some(offset);
    }
    if let Some(width) = candle_width {
        settings.candle_width = clamp_candle_width(width);
    }

    eprintln!("Loading candles from {}", data.display());
    let candles = match load_candles(data) {
        Ok(c) => c,
        Err(e) => {
            eprintln!("error: {e}");
            return (&e).into();
        }
    };
    eprintln!("  {} candles", candles.len());

    let mut store = ChartStore::new(settings);
    store.set_candles(candles);
    let Some(plan) = store.take_frame() else {
        let err = ChartError::Render {
            reason: "no frame was planned".into(),
        };
        eprintln!("error: {err}");
        return (&err).into();
    };
    let range = store.visible_range();
    eprintln!(
        "Planned {} draw ops for candles {}..{} ({} regime)",
        plan.ops.len(),
        range.start,
        range.end,
        store.market().regime
    );

    let mut surface = match output {
        Some(path) => SvgSurface::to_file(path.clone()),
        None => SvgSurface::new(),
    };
    if let Err(e) = surface.present(&plan) {
        eprintln!("error: {e}");
        return (&e).into();
    }

    match output {
        Some(path) => {
            eprintln!("Chart written to: {}", path.display());
            ExitCode::SUCCESS
        }
        None => {
            let mut stdout = std::io::stdout().lock();
            match stdout.write_all(surface.document().as_bytes()) {
                Ok(()) => ExitCode::SUCCESS,
                Err(e) => {
                    let err = ChartError::Io(e);
                    eprintln!("error: {err}");
                    (&err).into()
                }
            }
        }
    }
}

/// One line per indicator output line: latest defined value or `-`.
pub fn format_indicator_report(outputs: &[IndicatorOutput]) -> Vec<String> {
    outputs
        .iter()
        .map(|out| {
            let values: Vec<String> = out
                .lines
                .iter()
                .map(|line| {
                    let latest = line.values.iter().rev().find(|v| v.is_finite());
                    match latest {
                        Some(v) => format!("{}={:.4}", line.name, v),
                        None => format!("{}=-", line.name),
                    }
                })
                .collect();
            format!("{}: {}", out.spec, values.join(" "))
        })
        .collect()
}

pub fn format_market_state(market: &MarketState) -> String {
    match market.direction {
        Some(direction) => format!("regime: {} ({:?})", market.regime, direction).to_lowercase(),
        None => format!("regime: {}", market.regime),
    }
}

fn run_indicators(data: &Path, config: Option<&PathBuf>) -> ExitCode {
    let settings = match load_settings(config) {
        Ok(s) => s,
        Err(code) => return code,
    };
    let candles = match load_candles(data) {
        Ok(c) => c,
        Err(e) => {
            eprintln!("error: {e}");
            return (&e).into();
        }
    };

    let specs = if settings.indicators.is_empty() {
        IndicatorKind::ALL
            .iter()
            .map(|&kind| IndicatorSpec::new(kind))
            .collect()
    } else {
        settings.indicators.clone()
    };
    let outputs = compute_all(&candles, &specs);
    for line in format_indicator_report(&outputs) {
        println!("{}", line);
    }
    println!("{}", format_market_state(&compute_market_state(&candles)));
    eprintln!("{} candles, {} indicators", candles.len(), outputs.len());
    ExitCode::SUCCESS
}

fn run_validate(config_path: &PathBuf) -> ExitCode {
    eprintln!("Validating config: {}", config_path.display());
    let adapter = match load_config(config_path) {
        Ok(a) => a,
        Err(code) => return code,
    };
    if let Err(e) = validate_chart_config(&adapter) {
        eprintln!("error: {e}");
        return (&e).into();
    }
    let settings = match ChartSettings::from_config(&adapter) {
        Ok(s) => s,
        Err(e) => {
            eprintln!("error: {e}");
            return (&e).into();
        }
    };

    eprintln!(
        "  {}x{} {} {} chart",
        settings.width, settings.height, settings.theme, settings.chart_type
    );
    for spec in &settings.indicators {
        eprintln!("  indicator: {}", spec);
    }
    eprintln!("\nChart configuration is valid.");
    ExitCode::SUCCESS
}
