use clap::Parser;
use tracing_subscriber::EnvFilter;

use chronovyan_bench::{BenchmarkReport, DebtBenchmark, Scenario};
use chronovyan_core::ChronovyanError;

#[derive(Debug, Parser)]
#[command(name = "debt-bench")]
#[command(about = "Benchmark temporal debt repayment strategies")]
struct Args {
    /// Standard scenario to run, or "all"
    #[arg(long, default_value = "all")]
    scenario: String,

    /// Run strategies in parallel
    #[arg(long)]
    parallel: bool,

    /// Print JSON instead of the text report
    #[arg(long)]
    json: bool,

    #[arg(long, default_value = "warn")]
    log: String,
}

fn run_scenario(name: &str, parallel: bool) -> Result<BenchmarkReport, ChronovyanError> {
    let mut bench = DebtBenchmark::new();
    bench.load_scenario(name)?;
    let results = if parallel {
        bench.run_all_strategies_parallel()
    } else {
        bench.run_all_strategies()
    };
    Ok(BenchmarkReport::new(bench.scenario().map(str::to_string), results))
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(&args.log))
        .with_writer(std::io::stderr)
        .init();

    let names: Vec<&str> = if args.scenario == "all" {
        Scenario::names().collect()
    } else {
        vec![args.scenario.as_str()]
    };

    let mut reports = Vec::with_capacity(names.len());
    for name in names {
        tracing::info!(scenario = name, parallel = args.parallel, "running benchmark");
        reports.push(run_scenario(name, args.parallel)?);
    }

    if args.json {
        println!("{}", serde_json::to_string_pretty(&reports)?);
    } else {
        for report in &reports {
            println!("{}", report.render());
        }
    }

    Ok(())
}
