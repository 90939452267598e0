//! Command-line surface (component A3).
//!
//! Two subcommands: `drape` runs the full pipeline against a laminate plan,
//! a grid, and a material database; `plot` is a non-rendering stand-in that
//! writes a textual summary of one scalar field (real plotting is a
//! Non-goal of this crate).

use std::path::PathBuf;

use clap::{Parser, Subcommand};

use crate::config::Config;
use crate::error::{DrapeError, DrapeResult};
use crate::material::MaterialDb;
use crate::mesh::{JsonMesh, Mesh};
use crate::orchestrator::drape as run_drape;
use crate::plan::LaminatePlan;

#[derive(Parser)]
#[command(name = "drape")]
#[command(about = "Deterministic, vectorized ply-draping engine for composite laminate meshes")]
#[command(version)]
pub struct Cli {
    /// Path to an optional drape.toml overriding built-in defaults.
    #[arg(long = "config", global = true, value_name = "PATH")]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand)]
pub enum Command {
    /// Drape a laminate plan over a mesh and write the annotated grid.
    Drape(DrapeArgs),

    /// Summarize one scalar field of a grid (textual stand-in for plotting).
    Plot(PlotArgs),
}

#[derive(clap::Args)]
pub struct DrapeArgs {
    /// Laminate plan document (YAML or JSON).
    #[arg(long = "lamplan", value_name = "PATH")]
    pub lamplan: PathBuf,

    /// Mesh grid document (YAML or JSON).
    #[arg(long = "grid", value_name = "PATH")]
    pub grid: PathBuf,

    /// Material database document (YAML or JSON).
    #[arg(long = "matdb", value_name = "PATH")]
    pub matdb: PathBuf,

    /// Path to write the annotated grid to.
    #[arg(long = "output", value_name = "PATH")]
    pub output: PathBuf,

    /// Force sequential ply evaluation, overriding the config default.
    #[arg(long = "sequential")]
    pub sequential: bool,

    /// Raise the log level to debug.
    #[arg(long = "verbose")]
    pub verbose: bool,
}

#[derive(clap::Args)]
pub struct PlotArgs {
    /// Mesh grid document (YAML or JSON).
    #[arg(long = "grid", value_name = "PATH")]
    pub grid: PathBuf,

    /// Path to write the textual summary to.
    #[arg(long = "output", value_name = "PATH")]
    pub output: PathBuf,

    /// Scalar cell field to summarize.
    #[arg(long = "scalar", value_name = "FIELD")]
    pub scalar: String,

    /// Unused placeholder for the real plotter's x-axis field (Non-goal: rendering).
    #[arg(long = "x-axis", value_name = "FIELD")]
    pub x_axis: Option<String>,

    /// Unused placeholder for the real plotter's y-axis field (Non-goal: rendering).
    #[arg(long = "y-axis", value_name = "FIELD")]
    pub y_axis: Option<String>,

    /// Raise the log level to debug.
    #[arg(long = "verbose")]
    pub verbose: bool,
}

pub fn execute_drape(args: DrapeArgs, config: &Config) -> DrapeResult<()> {
    let plan = LaminatePlan::load(&args.lamplan)?;
    let mut mesh = JsonMesh::load(&args.grid)?;
    let matdb = MaterialDb::load(&args.matdb)?;

    let deterministic = args.sequential || !config.parallel;
    log::info!(
        "draping {} ply definition(s) over {} cell(s) ({})",
        plan.plies.len(),
        mesh.num_cells(),
        if deterministic { "sequential" } else { "parallel" }
    );

    run_drape(&plan, &mut mesh, &matdb, deterministic)?;
    mesh.save(&args.output)?;
    log::info!("wrote annotated grid to {}", args.output.display());
    Ok(())
}

pub fn execute_plot(args: PlotArgs) -> DrapeResult<()> {
    let mesh = JsonMesh::load(&args.grid)?;
    let values = mesh.cell_field(&args.scalar)?;

    let count = values.len();
    let min = values.iter().cloned().fold(f64::INFINITY, f64::min);
    let max = values.iter().cloned().fold(f64::NEG_INFINITY, f64::max);
    let mean = if count == 0 {
        0.0
    } else {
        values.iter().sum::<f64>() / count as f64
    };

    let summary = format!(
        "field: {}\ncount: {count}\nmin: {min}\nmax: {max}\nmean: {mean}\n",
        args.scalar
    );
    std::fs::write(&args.output, summary).map_err(DrapeError::from)?;
    log::info!("wrote summary of '{}' to {}", args.scalar, args.output.display());
    Ok(())
}
