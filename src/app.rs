use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand, ValueEnum};
use log::{info, warn};

use crate::binning::{luminosity_function, make_hess, HessBins};
use crate::color::{ColorMapName, LogNorm};
use crate::data::filter::detected_only;
use crate::data::instrument::Instrument;
use crate::data::loader::load_cmd;
use crate::data::model::{CmdData, FilterNames, YFilter};
use crate::envcheck;
use crate::error::PhotometryError;
use crate::render::cmd::CmdFigure;
use crate::render::hess::{write_count_image, HessFigure};
use crate::render::lf::{LfFigure, YScale};
use crate::render::{self, AxisLabels, Limits};
use crate::stats;
use crate::style::PlotStyle;

// ---------------------------------------------------------------------------
// Command line
// ---------------------------------------------------------------------------

#[derive(Parser, Debug)]
#[command(
    name = "photplot",
    version,
    about = "Color-magnitude diagrams, luminosity functions and Hess diagrams from photometry tables",
    long_about = None
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Plot a photometry table
    Plot(PlotArgs),
    /// Summary statistics for every column of a numeric CSV file
    Stats(StatsArgs),
    /// Check that the toolchain and fonts needed for plotting are present
    CheckEnv(CheckEnvArgs),
}

/// Which plot to make.
#[derive(Copy, Clone, Debug, PartialEq, Eq, ValueEnum)]
pub enum PlotType {
    /// Color-magnitude diagram with error bars
    Cmd,
    /// Hess diagram (2D density)
    Hess,
    /// Luminosity function
    Lf,
}

#[derive(Args, Debug)]
pub struct PlotArgs {
    /// Photometry table (.parquet, .csv or .json)
    pub file: PathBuf,

    /// Which plot to make
    #[arg(short, long, value_enum, ignore_case = true, default_value_t = PlotType::Cmd)]
    pub plot_type: PlotType,

    /// Comma separated names of the two filters, used for axis labels
    #[arg(short, long, default_value = "V,I")]
    pub filters: FilterNames,

    /// Filter whose magnitude goes on the y axis (or into the LF)
    #[arg(short, long, default_value = "I")]
    pub yfilter: String,

    /// Hess diagram or LF magnitude bin width
    #[arg(short = 'm', long, default_value_t = 0.05)]
    pub binsize: f64,

    /// Hess diagram color bin width
    #[arg(short, long, default_value_t = 0.1)]
    pub cbinsize: f64,

    /// x axis limits, "left,right"
    #[arg(long, value_parser = Limits::parse, allow_hyphen_values = true)]
    pub xlim: Option<Limits>,

    /// y axis limits, "bottom,top"; magnitude axes are reversed when omitted
    #[arg(long, value_parser = Limits::parse, allow_hyphen_values = true)]
    pub ylim: Option<Limits>,

    /// LF count axis scale (log or linear)
    #[arg(long, default_value = "log")]
    pub yscale: YScale,

    /// Draw a colorbar next to the Hess diagram
    #[arg(short = 'x', long)]
    pub colorbar: bool,

    /// Lower bound of the Hess log color scale
    #[arg(long)]
    pub vmin: Option<f64>,

    /// Upper bound of the Hess log color scale
    #[arg(long)]
    pub vmax: Option<f64>,

    /// Camera override (ACS, WFPC2, UVIS, IR); otherwise read from the file header
    #[arg(long)]
    pub camera: Option<Instrument>,

    /// JSON plot style file
    #[arg(long)]
    pub style: Option<PathBuf>,

    /// Hess colormap (gray, gray_r, heat); overrides the style file
    #[arg(long)]
    pub colormap: Option<ColorMapName>,

    /// Also write the raw Hess count grid as a 16-bit PNG
    #[arg(long)]
    pub grid_out: Option<PathBuf>,

    /// Skip error bars on the CMD
    #[arg(long)]
    pub no_errorbars: bool,

    /// Output image; the format follows the extension (png, jpg, bmp, svg)
    #[arg(short, long, default_value = "data_plot.png")]
    pub outfile: PathBuf,
}

#[derive(Args, Debug)]
pub struct StatsArgs {
    /// CSV file with a header row
    pub file: PathBuf,

    /// Output CSV; defaults to processed-<file> next to the input
    #[arg(short, long)]
    pub outfile: Option<PathBuf>,
}

#[derive(Args, Debug)]
pub struct CheckEnvArgs {
    /// JSON plot style file whose font should be checked
    #[arg(long)]
    pub style: Option<PathBuf>,
}

// ---------------------------------------------------------------------------
// Dispatch
// ---------------------------------------------------------------------------

pub fn run(cli: Cli) -> Result<()> {
    match cli.command {
        Command::Plot(args) => run_plot(&args),
        Command::Stats(args) => run_stats(&args),
        Command::CheckEnv(args) => run_check_env(&args),
    }
}

fn load_style(path: Option<&PathBuf>) -> Result<PlotStyle> {
    match path {
        Some(p) => PlotStyle::from_json_file(p),
        None => Ok(PlotStyle::default()),
    }
}

/// Load the table, pick the y filter and drop undetected stars.
fn load_detected(args: &PlotArgs) -> Result<(CmdData, YFilter)> {
    let which = YFilter::resolve(&args.yfilter, &args.filters)?;
    let data = load_cmd(&args.file, which, args.camera)
        .with_context(|| format!("loading {}", args.file.display()))?;
    let data = detected_only(&data);
    if data.is_empty() {
        return Err(PhotometryError::EmptySelection.into());
    }
    info!("{} stars detected in both filters", data.len());
    Ok((data, which))
}

fn plot_style(args: &PlotArgs) -> Result<PlotStyle> {
    let mut style = load_style(args.style.as_ref())?;
    if let Some(colormap) = args.colormap {
        style.colormap = colormap;
    }
    Ok(style)
}

fn run_plot(args: &PlotArgs) -> Result<()> {
    let style = plot_style(args)?;
    let (data, which) = load_detected(args)?;
    let ylabel = args.filters.label(which).to_string();
    let cmd_labels = AxisLabels {
        x: args.filters.color_label(),
        y: ylabel.clone(),
    };

    match args.plot_type {
        PlotType::Cmd => {
            let fig = CmdFigure {
                data: &data,
                labels: cmd_labels,
                xlim: args.xlim,
                ylim: args.ylim,
                error_bars: !args.no_errorbars,
            };
            render::save(&fig, &args.outfile, &style)?;
        }
        PlotType::Hess => {
            let bins = HessBins::new(args.binsize, Some(args.cbinsize));
            let hess = make_hess(&data.color, &data.mag, &bins)?;
            if let Some(grid) = &args.grid_out {
                write_count_image(&hess, grid)?;
            }
            let fig = HessFigure {
                hess: &hess,
                labels: cmd_labels,
                xlim: args.xlim,
                ylim: args.ylim,
                norm: LogNorm::for_counts(hess.counts(), args.vmin, args.vmax),
                colorbar: args.colorbar,
            };
            render::save(&fig, &args.outfile, &style)?;
        }
        PlotType::Lf => {
            if args.ylim.is_some() {
                warn!("--ylim is ignored for luminosity functions");
            }
            let lf = luminosity_function(&data.mag, args.binsize, None)?;
            let fig = LfFigure {
                lf: &lf,
                labels: AxisLabels {
                    x: ylabel,
                    y: "#".to_string(),
                },
                xlim: args.xlim,
                yscale: args.yscale,
            };
            render::save(&fig, &args.outfile, &style)?;
        }
    }

    println!("wrote {}", args.outfile.display());
    Ok(())
}

fn run_stats(args: &StatsArgs) -> Result<()> {
    let output = args
        .outfile
        .clone()
        .unwrap_or_else(|| stats::default_output_path(&args.file));
    let summary = stats::summarize_file(&args.file, &output)
        .with_context(|| format!("summarizing {}", args.file.display()))?;
    info!("{} columns summarized", summary.len());
    println!("wrote {}", output.display());
    Ok(())
}

fn run_check_env(args: &CheckEnvArgs) -> Result<()> {
    let style = load_style(args.style.as_ref())?;
    let checks = envcheck::run_checks(&style.font_family);

    for check in &checks {
        println!("-------------------");
        let verdict = if check.passed { "Passed" } else { "Failed" };
        println!("{} {verdict}: {}", check.name, check.detail);
    }
    println!("-------------------");

    let failed = checks.iter().filter(|c| !c.passed).count();
    anyhow::ensure!(failed == 0, "{failed} environment check(s) failed");
    Ok(())
}
