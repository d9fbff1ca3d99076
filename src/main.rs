use battle_sim::{run, CliOptions};
use std::env;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

fn usage() -> ! {
    eprintln!(
        "Usage: cargo run --release -- [--scenario scenario.json] [--runs N] [--seed SEED] \
[--output summary.csv] [--replay replay.json]"
    );
    std::process::exit(1);
}

fn parse_args() -> anyhow::Result<CliOptions> {
    let mut scenario_path = PathBuf::from("scenario.json");
    let mut runs = 100usize;
    let mut seed = 0u64;
    let mut output_path = PathBuf::from("summary.csv");
    let mut replay_path = None;

    let mut args = env::args().skip(1);
    while let Some(arg) = args.next() {
        match arg.as_str() {
            "--scenario" => {
                scenario_path = args.next().map(PathBuf::from).ok_or_else(|| {
                    anyhow::anyhow!("--scenario requires a path (e.g. --scenario scenario.json)")
                })?;
            }
            "--runs" => {
                let val = args
                    .next()
                    .ok_or_else(|| anyhow::anyhow!("--runs requires a number"))?;
                runs = val.parse()?;
            }
            "--seed" => {
                let val = args
                    .next()
                    .ok_or_else(|| anyhow::anyhow!("--seed requires a number"))?;
                seed = val.parse()?;
            }
            "--output" => {
                output_path = args.next().map(PathBuf::from).ok_or_else(|| {
                    anyhow::anyhow!("--output requires a path (e.g. --output summary.csv)")
                })?;
            }
            "--replay" => {
                replay_path = Some(args.next().map(PathBuf::from).ok_or_else(|| {
                    anyhow::anyhow!("--replay requires a path (e.g. --replay replay.json)")
                })?);
            }
            "--help" | "-h" => usage(),
            other => return Err(anyhow::anyhow!("Unknown argument {other}")),
        }
    }

    Ok(CliOptions {
        scenario_path,
        runs,
        seed,
        output_path,
        replay_path,
    })
}

fn main() -> anyhow::Result<()> {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt().with_env_filter(env_filter).with_writer(std::io::stderr).init();
    let opts = parse_args()?;
    run(opts)
}
