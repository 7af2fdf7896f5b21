use clap::{arg, command, Parser};
use fa2_token_manager::{config::load_config, pipeline::DeploymentReport};
use log::{error, info, warn};
use std::error::Error;
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use tokio_util::sync::CancellationToken;

const CONFIGS_DIR: &str = "deployment/configs";

#[derive(Debug, Clone, clap::ValueEnum, Default)]
pub enum TargetEnv {
    Testnet,
    Mainnet,
    #[default]
    Local,
}

#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Args {
    /// Environment config to use
    #[arg(short, long, default_value = "local")]
    target_env: TargetEnv,
    /// Extra config file merged on top of the environment config
    #[arg(short, long)]
    config: Option<PathBuf>,
    /// Directory the deployment report is written to
    #[arg(short, long, default_value = "deployment/results")]
    output_dir: PathBuf,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error>> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .target(env_logger::Target::Stdout)
        .init();

    let args = Args::parse();

    let files = config_files(Path::new(CONFIGS_DIR), &args.target_env, args.config)?;
    let config = load_config(&files)?;

    let cancel = CancellationToken::new();
    let on_interrupt = cancel.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            warn!("Interrupted, cancelling deployment");
            on_interrupt.cancel();
        }
    });

    let report = match fa2_token_manager::deploy_token(&config, cancel).await {
        Ok(report) => report,
        Err(e) => {
            error!("Deployment failed: {e}");
            return Err(e.into());
        }
    };

    write_result(&args.output_dir, &report)?;

    Ok(())
}

/// config files for the environment, in the order they are merged
fn config_files(
    configs_dir: &Path,
    target_env: &TargetEnv,
    extra: Option<PathBuf>,
) -> Result<Vec<PathBuf>, Box<dyn Error>> {
    let mut files = match target_env {
        TargetEnv::Local => vec![configs_dir.join("local").join("config.toml")],
        TargetEnv::Testnet => env_files(&configs_dir.join("testnet"))?,
        TargetEnv::Mainnet => env_files(&configs_dir.join("mainnet"))?,
    };

    files.extend(extra);

    Ok(files)
}

fn env_files(dir: &Path) -> Result<Vec<PathBuf>, Box<dyn Error>> {
    let pattern = dir.join("**").join("*");
    let mut files = vec![];

    for path in glob::glob(&pattern.to_string_lossy())? {
        let path = path?;
        if !path.is_dir() {
            files.push(path);
        }
    }

    Ok(files)
}

fn write_result(output_dir: &Path, report: &DeploymentReport) -> Result<PathBuf, Box<dyn Error>> {
    if !output_dir.exists() {
        fs::create_dir_all(output_dir)?;
    }

    // Construct the full file path
    let file_name = format!("token-{}.json", report.contract_address);
    let file_path = output_dir.join(file_name);

    // Serialize the data to a string
    let content = serde_json::to_string_pretty(report)?;

    let mut file = fs::File::create(&file_path)?;
    file.write_all(content.as_bytes())?;

    info!(
        "Token was deployed successfully and the report written to: {}",
        file_path.display()
    );

    Ok(file_path)
}
