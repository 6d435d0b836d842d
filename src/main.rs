//! Line Groups - grouped 3D line chart generator
//!
//! CLI commands:
//! - render: Generate data and export the interactive HTML chart
//! - figure: Export the plotly.js figure as JSON
//! - summary: Print groups, colors and button ranges

mod config;
mod dataset;
mod figure;
mod html;
mod logging;
mod palette;

use anyhow::Context;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

use config::{CliOverrides, Config, EnvOverrides, DEFAULT_CONFIG_PATH};
use dataset::Dataset;
use figure::Figure;

#[derive(Parser)]
#[command(name = "line_groups")]
#[command(about = "Interactive 3D line charts of grouped synthetic data")]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Path to plot.yaml config [default: plot.yaml]
    #[arg(short, long)]
    config: Option<PathBuf>,
}

#[derive(Subcommand)]
enum Commands {
    /// Generate data and write the HTML chart
    Render {
        /// Output HTML file
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Random seed
        #[arg(long)]
        seed: Option<u64>,

        /// Do not open the chart in a browser
        #[arg(long)]
        no_open: bool,
    },

    /// Write the figure (traces + layout) as JSON
    Figure {
        /// Output JSON file (stdout if omitted)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Random seed
        #[arg(long)]
        seed: Option<u64>,

        /// Single-line JSON instead of pretty-printed
        #[arg(long)]
        compact: bool,
    },

    /// Print groups and what each toggle button shows
    Summary,
}

fn main() -> anyhow::Result<()> {
    let env = EnvOverrides::load()?;
    logging::init_logging(&env.log_dir)?;
    tracing::info!("Line Groups starting up");

    let cli = Cli::parse();
    tracing::debug!("CLI args parsed: config={:?}", cli.config);

    let mut config = match &cli.config {
        Some(path) => Config::load_or_default(path, true)?,
        None => Config::load_or_default(DEFAULT_CONFIG_PATH, false)?,
    };
    config.apply_env(&env);

    match cli.command {
        Commands::Render { output, seed, no_open } => {
            config.apply_cli(&CliOverrides { output, seed, no_open });
            render(&config)?;
        }

        Commands::Figure { output, seed, compact } => {
            config.apply_cli(&CliOverrides {
                seed,
                ..CliOverrides::default()
            });
            export_figure(&config, output.as_deref(), compact)?;
        }

        Commands::Summary => {
            print_summary(&config)?;
        }
    }

    Ok(())
}

/// Validate, generate and assemble the figure
fn build_figure(config: &Config) -> anyhow::Result<(Dataset, Figure)> {
    config.validate()?;

    let dataset = Dataset::generate(&config.data)?;
    let figure = Figure::build(&dataset, &config.chart);
    tracing::info!(
        groups = dataset.num_groups,
        traces = figure.trace_count(),
        buttons = figure.toggles().len(),
        "Figure assembled"
    );

    Ok((dataset, figure))
}

/// Full pipeline: data -> traces -> buttons -> HTML file
fn render(config: &Config) -> anyhow::Result<()> {
    let (_, figure) = build_figure(config)?;

    let page = html::render(&figure);
    html::write_html(&config.chart.output, &page)?;

    println!(
        "Wrote {} traces to {}",
        figure.trace_count(),
        config.chart.output.display()
    );

    if config.chart.auto_open {
        html::open_in_browser(&config.chart.output);
    }

    Ok(())
}

fn export_figure(
    config: &Config,
    output: Option<&std::path::Path>,
    compact: bool,
) -> anyhow::Result<()> {
    let (_, figure) = build_figure(config)?;
    let json = if compact {
        figure.to_json()
    } else {
        figure.to_json_pretty()?
    };

    match output {
        Some(path) => {
            std::fs::write(path, &json).with_context(|| format!("writing {:?}", path))?;
            tracing::info!(path = ?path, "Figure JSON written");
        }
        None => println!("{}", json),
    }

    Ok(())
}

fn print_summary(config: &Config) -> anyhow::Result<()> {
    let (dataset, figure) = build_figure(config)?;

    println!(
        "{} rows, {} groups x {} lines x {} points (seed {})",
        dataset.len(),
        dataset.num_groups,
        dataset.lines_per_group,
        dataset.points_per_line,
        config.data.seed
    );
    println!();

    for group in dataset.groups() {
        let color = palette::color_for(&config.chart.palette, group);
        let first = group * dataset.lines_per_group;
        let last = first + dataset.lines_per_group - 1;
        println!(
            "  Group {:<3} {}  rows {:?}  traces {}..={}",
            group,
            color,
            dataset.group_range(group),
            first,
            last
        );
    }
    println!();

    for toggle in figure.toggles() {
        println!("  [{}] shows {} traces -> \"{}\"", toggle.label, toggle.shown(), toggle.title);
    }

    Ok(())
}
