/// Component reconciler
use crate::Error::*;
use clap::{Parser, Subcommand};
use devconsole::{config, controller, manifest};
use kube::CustomResourceExt;
use log::{error, info};
use thiserror::Error;

/// Build and deploy Components on OpenShift.
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Cli {
    /// Path to the configuration file.
    #[arg(long)]
    config: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Reconcile Components in the cluster of the current kube context until interrupted.
    Run {
        /// Only watch this namespace. Defaults to all namespaces.
        #[arg(long)]
        namespace: Option<String>,
    },
    /// Print the Component CustomResourceDefinition.
    Crd,
    /// Print the objects a Component manifest would produce, without touching a cluster.
    Render {
        /// Component manifest.
        file: String,

        /// Override the manifest's namespace.
        #[arg(long)]
        namespace: Option<String>,
    },
}

#[derive(Error, Debug)]
pub enum Error {
    #[error("configuration file: {0}")]
    Config(#[from] config::Error),

    #[error("kubernetes client: {0}")]
    KubeClient(#[from] kube::Error),

    #[error("serialize: {0}")]
    Serialize(#[from] serde_yaml::Error),

    #[error("render: {0}")]
    Render(#[from] manifest::Error),
}

/// Read configuration file from disk and merge it with the
/// `default.toml` built-in config.
///
/// If a configuration file name is not set explicitly, this function will
/// detect whether a config file with the default file name exists in the
/// working directory. If it does, it is used implicitly.
fn read_config(args: &Cli) -> Result<config::File, Error> {
    const DEFAULT_CONFIG_FILE: &str = "devconsole.toml";

    let config_file = match &args.config {
        None => std::fs::metadata(DEFAULT_CONFIG_FILE)
            .map(|metadata| metadata.is_file())
            .unwrap_or(false)
            .then(|| DEFAULT_CONFIG_FILE.to_string()),
        Some(c) => Some(c.clone()),
    };

    Ok(if let Some(config_file) = config_file {
        info!("Using configuration file {config_file}");
        config::File::default_with_user_config_file(&config_file)?
    } else {
        config::File::default()
    })
}

#[tokio::main]
async fn main() {
    match run().await {
        Ok(_) => std::process::exit(0),
        Err(err) => {
            error!("fatal: {}", err);
            std::process::exit(1)
        }
    }
}

async fn run() -> Result<(), Error> {
    env_logger::init();

    let args = Cli::parse();
    let cfg = read_config(&args)?;

    match args.command {
        Commands::Run { namespace } => {
            info!("devconsole {}", env!("CARGO_PKG_VERSION"));
            info!(
                "{} runtime images, shared namespace {}",
                cfg.runtime_images().len(),
                cfg.shared_namespace
            );
            let client = kube::Client::try_default().await.map_err(KubeClient)?;
            controller::run(client, &cfg, namespace.as_deref()).await;
            Ok(())
        }
        Commands::Crd => {
            print!("{}", serde_yaml::to_string(&devconsole::component::Component::crd())?);
            Ok(())
        }
        Commands::Render { file, namespace } => {
            let component = manifest::parse_file(&file, namespace.as_deref())?;
            print!("{}", manifest::render(&component, &cfg.runtime_images())?);
            Ok(())
        }
    }
}
