use std::path::PathBuf;

use clap::{Parser, Subcommand};
use serde_json::json;

use ci_dispatcher::config::load_config;
use ci_dispatcher::dispatcher::{Agent, JobBase};
use ci_dispatcher::observability::logging;
use ci_dispatcher::results::{Request, ResultClient};

#[derive(Parser)]
#[command(name = "dispatch-cli")]
#[command(about = "Inspect cluster dispatching and report job results", long_about = None)]
struct Cli {
    #[arg(long, default_value = "warn")]
    log_level: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Load and validate a dispatcher config
    Check {
        #[arg(short, long)]
        config: PathBuf,
    },
    /// Pick the cluster for a job
    Resolve {
        #[arg(short, long)]
        config: PathBuf,
        #[arg(short, long)]
        job: String,
        #[arg(short, long, default_value = "kubernetes")]
        agent: Agent,
        /// File the job is declared in
        #[arg(short, long, default_value = "")]
        path: String,
    },
    /// Show which build farm a cluster belongs to
    Farm {
        #[arg(short, long)]
        config: PathBuf,
        #[arg(long)]
        cluster: String,
    },
    /// Send one job result to a result aggregator
    Report {
        #[arg(short, long, default_value = "http://localhost:8080")]
        url: String,
        #[arg(long)]
        username: String,
        #[arg(long)]
        password_file: PathBuf,
        #[arg(long)]
        job_name: String,
        #[arg(long = "type")]
        kind: String,
        #[arg(long)]
        state: String,
        #[arg(long)]
        reason: String,
        #[arg(long)]
        cluster: String,
    },
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    logging::init_logging(&cli.log_level)?;

    match cli.command {
        Commands::Check { config } => {
            let config = load_config(&config)?;
            let summary = json!({
                "default": config.default_cluster(),
                "nonKubernetes": config.non_kubernetes(),
                "groups": config.groups().keys().collect::<Vec<_>>(),
                "buildFarm": config
                    .build_farm_providers()
                    .map(|p| (p.to_string(), json!(config.build_farm_clusters(p.as_str()).collect::<Vec<_>>())))
                    .collect::<serde_json::Map<_, _>>(),
            });
            print_json(&summary)?;
        }
        Commands::Resolve { config, job, agent, path } => {
            let config = load_config(&config)?;
            let assignment = config.determine_cluster_for_job(&JobBase::new(job, agent), &path);
            print_json(&json!(assignment))?;
        }
        Commands::Farm { config, cluster } => {
            let config = load_config(&config)?;
            if let Some(provider) = config.is_in_build_farm(&cluster) {
                println!("{}", provider);
            }
        }
        Commands::Report {
            url,
            username,
            password_file,
            job_name,
            kind,
            state,
            reason,
            cluster,
        } => {
            let password = std::fs::read_to_string(&password_file)?;
            let client = ResultClient::new(url, username, password.trim_end_matches(['\r', '\n']));
            let request = Request {
                job_name,
                kind,
                state,
                reason,
                cluster,
            };
            client.report(&request).await?;
            println!("reported");
        }
    }

    Ok(())
}

fn print_json(value: &serde_json::Value) -> Result<(), Box<dyn std::error::Error>> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}
