mod loader;
mod reports;
mod runner;
mod util;

use anyhow::{Context, Result};
use clap::Parser;
use colored::Colorize;
use idledig_game::{CatalogLoader, EngineCfg, MissionEngine};
use std::fs::File;
use std::io::{BufWriter, Write, stdout};
use std::path::PathBuf;
use std::time::Instant;

use loader::CliCatalogLoader;
use runner::{RunPlan, Runner, SeedResult};
use util::{resolve_seeds, split_csv};

#[derive(Debug, Parser)]
#[command(name = "idledig-tester", version = "0.1.0")]
#[command(about = "Drives IdleDig mission sessions live and offline and checks they agree")]
struct Args {
    /// Mission pool JSON (defaults to the bundled pool)
    #[arg(long)]
    catalog: Option<PathBuf>,

    /// Seeds to run (comma-separated, decimal or 0x-hex; 0 = entropy)
    #[arg(long, default_value = "1337")]
    seeds: String,

    /// Seconds of live play per seed
    #[arg(long, default_value_t = 300.0)]
    live_seconds: f64,

    /// Frame delta used for live play
    #[arg(long, default_value_t = 0.25)]
    frame: f64,

    /// Seconds of offline catch-up after the live span
    #[arg(long, default_value_t = 3_600.0)]
    offline: f64,

    /// Output report format
    #[arg(long, default_value = "console")]
    #[arg(value_parser = ["json", "markdown", "console"])]
    report: String,

    /// Print every log entry as it was recorded
    #[arg(short, long)]
    verbose: bool,

    /// Optional path to write the report output instead of stdout
    #[arg(long)]
    output: Option<PathBuf>,

    /// List the missions in the pool and exit
    #[arg(long)]
    list_missions: bool,
}

fn main() -> Result<()> {
    env_logger::init();
    let args = Args::parse();
    let loader = CliCatalogLoader::new(args.catalog.clone());

    if maybe_list_missions(&args, &loader)? {
        return Ok(());
    }

    announce_banner();

    let start_time = Instant::now();
    let seeds = resolve_seeds(&split_csv(&args.seeds))?;
    let plan = RunPlan {
        live_seconds: args.live_seconds,
        frame_seconds: args.frame,
        offline_seconds: args.offline,
    };
    log::info!(
        "running {} seed(s) against {}: {:.1}s live at {}s frames, {:.1}s offline",
        seeds.len(),
        loader.describe(),
        plan.live_seconds,
        plan.frame_seconds,
        plan.offline_seconds
    );

    let runner = Runner::new(MissionEngine::new(loader, EngineCfg::default()), args.verbose);
    let mut results = Vec::with_capacity(seeds.len());
    for seed in seeds {
        let result = runner.run_seed(seed, plan)?;
        if result.parity_ok {
            println!("✅ seed {} - {:?}", seed.to_string().green(), result.duration);
        } else {
            eprintln!("❌ seed {} - parity failure", seed.to_string().red());
        }
        results.push(result);
    }

    write_reports(&args, &results, start_time)?;

    if results.iter().any(|r| !r.parity_ok) {
        std::process::exit(1);
    }

    Ok(())
}

fn maybe_list_missions(args: &Args, loader: &CliCatalogLoader) -> Result<bool> {
    if !args.list_missions {
        return Ok(false);
    }
    let catalog = loader
        .load_catalog()
        .with_context(|| format!("failed to load {}", loader.describe()))?;
    let mut output_target = OutputTarget::new(args.output.clone())?;
    writeln!(output_target.writer(), "Available missions:")?;
    for mission in catalog.iter() {
        writeln!(
            output_target.writer(),
            "  {:25} - {} ({}s, success {:.0}%, partial {:.0}%)",
            mission.mission_id,
            mission.display_name,
            mission.effective_duration(),
            mission.effective_success_chance() * 100.0,
            mission.effective_partial_success_chance() * 100.0
        )?;
    }
    output_target.flush_inner()?;
    Ok(true)
}

fn announce_banner() {
    println!("{}", "⛏️  IdleDig Mission Tester".bright_cyan().bold());
    println!("{}", "==========================".cyan());
}

fn write_reports(args: &Args, results: &[SeedResult], start_time: Instant) -> Result<()> {
    let mut output_target = OutputTarget::new(args.output.clone())?;

    match args.report.as_str() {
        "json" => reports::generate_json_report(&mut output_target, results)?,
        "markdown" => reports::generate_markdown_report(&mut output_target, results)?,
        _ => {
            reports::generate_console_report(&mut output_target, results, start_time.elapsed())?;
            writeln!(&mut output_target, "🏁 Total time: {:?}", start_time.elapsed())?;
        }
    }

    output_target.flush_inner()?;
    Ok(())
}

enum OutputTarget {
    Stdout(BufWriter<std::io::Stdout>),
    File(BufWriter<File>),
}

impl OutputTarget {
    fn new(path: Option<PathBuf>) -> Result<Self> {
        if let Some(path) = path {
            let file = File::create(&path)
                .with_context(|| format!("failed to create {}", path.display()))?;
            Ok(Self::File(BufWriter::new(file)))
        } else {
            Ok(Self::Stdout(BufWriter::new(stdout())))
        }
    }

    fn writer(&mut self) -> &mut dyn Write {
        match self {
            Self::Stdout(w) => w,
            Self::File(w) => w,
        }
    }

    fn flush_inner(&mut self) -> std::io::Result<()> {
        match self {
            Self::Stdout(w) => w.flush(),
            Self::File(w) => w.flush(),
        }
    }
}

impl Write for OutputTarget {
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        self.writer().write(buf)
    }

    fn flush(&mut self) -> std::io::Result<()> {
        self.flush_inner()
    }
}
