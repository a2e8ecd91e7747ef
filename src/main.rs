use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};

use gdp_atlas::config::RunConfig;
use gdp_atlas::data::loader::load_plot_countries;
use gdp_atlas::pipeline::{MapBuilder, render_years};

#[derive(Parser)]
#[command(name = "gdp-atlas", about = "Map GDP onto plot-library country codes", version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Log at debug level (RUST_LOG still takes precedence)
    #[arg(long, short = 'v', global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Join plot countries to GDP rows by country name
    Name(RunArgs),
    /// Join plot countries to GDP rows by translated country code
    Code(RunArgs),
}

#[derive(clap::Args)]
struct RunArgs {
    /// Run configuration (JSON)
    #[arg(long, short = 'c')]
    config: PathBuf,

    /// Year to render; repeatable. Defaults to the config's "years"
    #[arg(long = "year", short = 'y')]
    years: Vec<String>,

    /// Directory for the rendered map documents
    #[arg(long, short = 'o', default_value = ".")]
    out_dir: PathBuf,
}

fn init_logging(verbose: bool) {
    let default = if verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default)).init();
}

fn run(cli: Cli) -> Result<bool> {
    let (by_code, args) = match cli.command {
        Commands::Name(args) => (false, args),
        Commands::Code(args) => (true, args),
    };

    let cfg = RunConfig::load(&args.config)?;
    let years = cfg.select_years(&args.years)?;
    let plot_countries = load_plot_countries(&cfg.plot_countries)?;

    let builder = if by_code {
        let codeinfo = cfg
            .codeinfo
            .as_ref()
            .context("the code join needs a \"codeinfo\" section in the config")?;
        MapBuilder::by_code(&cfg.gdpinfo, codeinfo, &plot_countries)?
    } else {
        MapBuilder::by_name(&cfg.gdpinfo, &plot_countries)?
    };

    std::fs::create_dir_all(&args.out_dir)
        .with_context(|| format!("creating {}", args.out_dir.display()))?;

    let report = render_years(&builder, &years, &args.out_dir);
    log::info!(
        "{} of {} years rendered",
        report.rendered.len(),
        years.len()
    );
    Ok(report.is_success())
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    match run(cli) {
        Ok(true) => ExitCode::SUCCESS,
        Ok(false) => ExitCode::FAILURE,
        Err(e) => {
            log::error!("{e:#}");
            ExitCode::FAILURE
        }
    }
}
