// CTSim-rs
// Copyright (c) 2024 The CTSim-rs Developers.
//
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

#![warn(rust_2018_idioms)]
#![forbid(unsafe_code)]

//! `ct-sim`: the command-line front end over the CT simulator core crates.
//! Subcommands mirror the pipeline stages directly: `rasterize` a phantom to an
//! image, `project` a phantom through a scanner to a sinogram, `reconstruct` a
//! sinogram back to an image, and `check` a reconstruction against ground truth.

mod cancel;
mod check;
mod orchestrate;
mod phantom_source;

use cancel::CancelFlag;
use clap::{Parser, Subcommand, ValueEnum};
use ct_backproject::{InterpMode, Roi, StrategyKind};
use ct_core::diagnostics::{Diagnostics, ReportLevel};
use ct_core::error::{construction_error, CtError, Result};
use ct_filter::{Domain, FilterKind};
use ct_projection::{io::read_projection, io::write_projection, Geometry};
use ct_reconstruct::{fourier_reconstruct, FilterMethod, ReconstructConfig};
use ct_scanner::{Scanner, ScannerConfig};
use std::fs::File;
use std::io::{BufReader, BufWriter};
use std::path::PathBuf;
use std::time::Duration;

#[derive(Parser)]
#[command(name = "ct-sim", version, about = "CT simulator: rasterize, project, reconstruct, check")]
struct Cli {
    #[command(subcommand)]
    command: Command,

    /// Number of worker threads to divide work across (§5 "N Reconstructors over
    /// disjoint view ranges"). Defaults to the available parallelism.
    #[arg(long, global = true)]
    workers: Option<usize>,

    /// How verbosely to report clamped domain errors and progress.
    #[arg(long, global = true, value_enum, default_value_t = TraceLevel::Silent)]
    trace_level: TraceLevel,

    /// Cancel the running operation after this many seconds and write out whatever
    /// partial result has accumulated so far (§5 "Cancellation ... Timeouts are the
    /// orchestrator's responsibility").
    #[arg(long, global = true)]
    timeout_secs: Option<u64>,
}

#[derive(Subcommand)]
enum Command {
    /// Rasterize a phantom into a real-valued image.
    Rasterize {
        /// Built-in phantom name (shepp-logan, hollow-circle, two-hollow-circles) or
        /// a path to a phantom text format file.
        #[arg(long)]
        phantom: String,
        #[arg(long, default_value_t = 256)]
        nx: usize,
        #[arg(long, default_value_t = 256)]
        ny: usize,
        #[arg(long, default_value_t = 1.0)]
        view_ratio: f64,
        #[arg(long, default_value_t = 2)]
        sample: usize,
        #[arg(long)]
        output: PathBuf,
    },
    /// Forward-project a phantom through a configured scanner into a sinogram.
    Project {
        #[arg(long)]
        phantom: String,
        #[arg(long, value_enum, default_value_t = GeometryArg::Parallel)]
        geometry: GeometryArg,
        #[arg(long, default_value_t = 367)]
        n_det: usize,
        #[arg(long, default_value_t = 320)]
        n_view: usize,
        #[arg(long, default_value_t = 1.0)]
        view_ratio: f64,
        #[arg(long, default_value_t = 2.0)]
        scan_ratio: f64,
        #[arg(long, default_value_t = 1)]
        n_sample: usize,
        /// Source-to-rotation-axis distance; required for equilinear/equiangular.
        #[arg(long, default_value_t = 0.0)]
        focal_length: f64,
        #[arg(long)]
        output: PathBuf,
    },
    /// Reconstruct an image from a sinogram via filtered backprojection.
    Reconstruct {
        #[arg(long)]
        input: PathBuf,
        #[arg(long, default_value_t = 256)]
        nx: usize,
        #[arg(long, default_value_t = 256)]
        ny: usize,
        #[arg(long, default_value = "ram-lak")]
        filter_kind: String,
        #[arg(long, default_value_t = 0.0)]
        filter_param: f64,
        #[arg(long, value_enum, default_value_t = DomainArg::Spatial)]
        filter_domain: DomainArg,
        #[arg(long, value_enum, default_value_t = FilterMethodArg::Convolution)]
        filter_method: FilterMethodArg,
        #[arg(long, default_value_t = 0)]
        zeropad: usize,
        #[arg(long, value_enum, default_value_t = InterpArg::Linear)]
        interp: InterpArg,
        #[arg(long, default_value_t = 1)]
        pre_interp_factor: usize,
        #[arg(long, value_enum, default_value_t = StrategyArg::Table)]
        backproject: StrategyArg,
        /// Restrict backprojection to `xmin,xmax,ymin,ymax` in world coordinates.
        #[arg(long)]
        roi: Option<String>,
        #[arg(long, default_value_t = false)]
        rebin_to_parallel: bool,
        #[arg(long)]
        output: PathBuf,
    },
    /// Reconstruct an image from a sinogram via the direct Fourier (central-slice)
    /// method instead of filtered backprojection (§2 "Fourier path").
    FourierReconstruct {
        #[arg(long)]
        input: PathBuf,
        #[arg(long, default_value_t = 256)]
        nx: usize,
        #[arg(long, default_value_t = 256)]
        ny: usize,
        #[arg(long)]
        output: PathBuf,
    },
    /// Score a reconstructed image against a ground-truth rasterized phantom (§4.2,
    /// §8 scenario 4).
    Check {
        #[arg(long)]
        target: PathBuf,
        #[arg(long)]
        reference: PathBuf,
        #[arg(long, default_value_t = 0.08)]
        max_d: f64,
    },
}

#[derive(Clone, Copy, ValueEnum)]
enum TraceLevel {
    Silent,
    Summary,
    Verbose,
}

impl From<TraceLevel> for ReportLevel {
    fn from(level: TraceLevel) -> Self {
        match level {
            TraceLevel::Silent => ReportLevel::Silent,
            TraceLevel::Summary => ReportLevel::Summary,
            TraceLevel::Verbose => ReportLevel::Verbose,
        }
    }
}

#[derive(Clone, Copy, ValueEnum)]
enum GeometryArg {
    Parallel,
    Equilinear,
    Equiangular,
}

#[derive(Clone, Copy, ValueEnum)]
enum DomainArg {
    Spatial,
    Frequency,
}

impl From<DomainArg> for Domain {
    fn from(domain: DomainArg) -> Self {
        match domain {
            DomainArg::Spatial => Domain::Spatial,
            DomainArg::Frequency => Domain::Frequency,
        }
    }
}

#[derive(Clone, Copy, ValueEnum)]
enum FilterMethodArg {
    Convolution,
    Frequency,
    Table,
}

impl From<FilterMethodArg> for FilterMethod {
    fn from(method: FilterMethodArg) -> Self {
        match method {
            FilterMethodArg::Convolution => FilterMethod::Convolution,
            FilterMethodArg::Frequency => FilterMethod::Frequency,
            FilterMethodArg::Table => FilterMethod::Table,
        }
    }
}

#[derive(Clone, Copy, ValueEnum)]
enum InterpArg {
    Nearest,
    Linear,
    Cubic,
}

impl From<InterpArg> for InterpMode {
    fn from(interp: InterpArg) -> Self {
        match interp {
            InterpArg::Nearest => InterpMode::Nearest,
            InterpArg::Linear => InterpMode::Linear,
            InterpArg::Cubic => InterpMode::Cubic,
        }
    }
}

#[derive(Clone, Copy, ValueEnum)]
enum StrategyArg {
    Trig,
    Table,
    Diff,
    IntDiff,
}

impl From<StrategyArg> for StrategyKind {
    fn from(strategy: StrategyArg) -> Self {
        match strategy {
            StrategyArg::Trig => StrategyKind::Trig,
            StrategyArg::Table => StrategyKind::Table,
            StrategyArg::Diff => StrategyKind::Diff,
            StrategyArg::IntDiff => StrategyKind::IntDiff,
        }
    }
}

fn parse_roi(spec: &str) -> Result<Roi> {
    let parts: Vec<&str> = spec.split(',').collect();
    if parts.len() != 4 {
        return construction_error("--roi expects \"xmin,xmax,ymin,ymax\"");
    }
    let mut values = [0.0f64; 4];
    for (slot, token) in values.iter_mut().zip(parts.iter()) {
        *slot = token.trim().parse().map_err(|_| CtError::Construction("--roi values must be numbers"))?;
    }
    Ok(Roi { x_min: values[0], x_max: values[1], y_min: values[2], y_max: values[3] })
}

fn workers_or_default(workers: Option<usize>) -> usize {
    workers.unwrap_or_else(|| std::thread::available_parallelism().map(|n| n.get()).unwrap_or(1))
}

fn run_rasterize(
    phantom_spec: &str,
    nx: usize,
    ny: usize,
    view_ratio: f64,
    sample: usize,
    output: &PathBuf,
    workers: usize,
    trace_level: ReportLevel,
    cancel: &CancelFlag,
) -> Result<()> {
    let mut diagnostics = Diagnostics::new(trace_level);
    let phantom = phantom_source::resolve(phantom_spec, &mut diagnostics)?;
    log::info!("rasterizing \"{}\" at {}x{}", phantom_spec, nx, ny);

    let image =
        orchestrate::rasterize_parallel(&phantom, nx, ny, view_ratio, sample, workers, trace_level, cancel);

    let mut writer = BufWriter::new(File::create(output)?);
    ct_image::io::write_image(&mut writer, &image)?;
    log::info!("wrote {}", output.display());
    Ok(())
}

#[allow(clippy::too_many_arguments)]
fn run_project(
    phantom_spec: &str,
    geometry: GeometryArg,
    n_det: usize,
    n_view: usize,
    view_ratio: f64,
    scan_ratio: f64,
    n_sample: usize,
    focal_length: f64,
    output: &PathBuf,
    workers: usize,
    trace_level: ReportLevel,
    cancel: &CancelFlag,
) -> Result<()> {
    let mut diagnostics = Diagnostics::new(trace_level);
    let phantom = phantom_source::resolve(phantom_spec, &mut diagnostics)?;

    let geometry = match geometry {
        GeometryArg::Parallel => Geometry::Parallel,
        GeometryArg::Equilinear => Geometry::Equilinear,
        GeometryArg::Equiangular => Geometry::Equiangular,
    };
    if geometry.is_divergent() && focal_length <= 0.0 {
        return construction_error("divergent geometries require --focal-length > 0");
    }

    let mut config = if geometry.is_divergent() {
        ScannerConfig::fan(geometry, n_det, n_view, focal_length)
    } else {
        ScannerConfig::parallel(n_det, n_view)
    };
    config.view_ratio = view_ratio;
    config.scan_ratio = scan_ratio;
    config.n_sample = n_sample;

    let scanner = Scanner::new(config);
    log::info!("projecting \"{}\" over {} views, {} detectors", phantom_spec, n_view, n_det);
    let projection = orchestrate::project_parallel(&scanner, &phantom, workers, trace_level, cancel);

    let mut writer = BufWriter::new(File::create(output)?);
    write_projection(&mut writer, &projection)?;
    log::info!("wrote {}", output.display());
    Ok(())
}

#[allow(clippy::too_many_arguments)]
fn run_reconstruct(
    input: &PathBuf,
    nx: usize,
    ny: usize,
    filter_kind: &str,
    filter_param: f64,
    filter_domain: DomainArg,
    filter_method: FilterMethodArg,
    zeropad: usize,
    interp: InterpArg,
    pre_interp_factor: usize,
    backproject: StrategyArg,
    roi: Option<String>,
    rebin_to_parallel: bool,
    output: &PathBuf,
    workers: usize,
    trace_level: ReportLevel,
    cancel: &CancelFlag,
) -> Result<()> {
    let mut reader = BufReader::new(File::open(input)?);
    let projection = read_projection(&mut reader)?;

    let kind = FilterKind::from_name(filter_kind)
        .ok_or(CtError::Construction("unrecognised filter kind"))?;

    let roi = roi.map(|spec| parse_roi(&spec)).transpose()?;

    let mut config = ReconstructConfig::new(nx, ny, kind, backproject.into());
    config.filter_param = filter_param;
    config.filter_domain = filter_domain.into();
    config.filter_method = filter_method.into();
    config.zeropad = zeropad;
    config.interp = interp.into();
    config.pre_interp_factor = pre_interp_factor.max(1);
    config.roi = roi;
    config.rebin_to_parallel = rebin_to_parallel;
    config.trace_level = trace_level;

    log::info!("reconstructing {}x{} image from {} views", nx, ny, projection.n_view());
    let image = orchestrate::reconstruct_parallel(&projection, &config, workers, cancel)?;

    let mut writer = BufWriter::new(File::create(output)?);
    ct_image::io::write_image(&mut writer, &image)?;
    log::info!("wrote {}", output.display());
    Ok(())
}

fn run_fourier_reconstruct(input: &PathBuf, nx: usize, ny: usize, output: &PathBuf) -> Result<()> {
    let mut reader = BufReader::new(File::open(input)?);
    let projection = read_projection(&mut reader)?;

    log::info!("fourier-reconstructing {}x{} image from {} views", nx, ny, projection.n_view());
    let image = fourier_reconstruct(&projection, nx, ny)?;

    let mut writer = BufWriter::new(File::create(output)?);
    ct_image::io::write_image(&mut writer, &image)?;
    log::info!("wrote {}", output.display());
    Ok(())
}

fn main() -> Result<()> {
    pretty_env_logger::init();
    let cli = Cli::parse();

    let cancel = CancelFlag::new();
    if let Some(secs) = cli.timeout_secs {
        cancel.cancel_after(Duration::from_secs(secs));
    }
    let workers = workers_or_default(cli.workers);
    let trace_level: ReportLevel = cli.trace_level.into();

    match cli.command {
        Command::Rasterize { phantom, nx, ny, view_ratio, sample, output } => {
            run_rasterize(&phantom, nx, ny, view_ratio, sample, &output, workers, trace_level, &cancel)
        }
        Command::Project {
            phantom,
            geometry,
            n_det,
            n_view,
            view_ratio,
            scan_ratio,
            n_sample,
            focal_length,
            output,
        } => run_project(
            &phantom, geometry, n_det, n_view, view_ratio, scan_ratio, n_sample, focal_length,
            &output, workers, trace_level, &cancel,
        ),
        Command::Reconstruct {
            input,
            nx,
            ny,
            filter_kind,
            filter_param,
            filter_domain,
            filter_method,
            zeropad,
            interp,
            pre_interp_factor,
            backproject,
            roi,
            rebin_to_parallel,
            output,
        } => run_reconstruct(
            &input, nx, ny, &filter_kind, filter_param, filter_domain, filter_method, zeropad,
            interp, pre_interp_factor, backproject, roi, rebin_to_parallel, &output, workers,
            trace_level, &cancel,
        ),
        Command::FourierReconstruct { input, nx, ny, output } => {
            run_fourier_reconstruct(&input, nx, ny, &output)
        }
        Command::Check { target, reference, max_d } => {
            let result = check::run(&target, &reference, max_d)?;
            if !result.passed {
                std::process::exit(1);
            }
            Ok(())
        }
    }
}
