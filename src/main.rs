use std::net::SocketAddr;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use invoicer::config::{self, Config, FileConfig};
use invoicer::{build_router, AppState, Category, Customer, Entity, Invoice, Product, Repository};

#[derive(Parser)]
#[command(version, about)]
struct Cli {
    /// INI file to read settings from [default: $XDG_CONFIG_HOME/invoicer/config.ini]
    #[arg(long, env = "INVOICER_CONFIG", global = true)]
    config: Option<PathBuf>,

    /// Directory holding the JSON data files [default: $XDG_DATA_HOME/invoicer]
    #[arg(long, env = "INVOICER_DATA_DIR", global = true)]
    data_dir: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Serve the HTTP API.
    Serve {
        /// Address to listen on [default: 127.0.0.1:5000]
        #[arg(long, env = "INVOICER_BIND")]
        bind: Option<SocketAddr>,
    },
    /// Print every stored item of one kind.
    List { kind: Kind },
}

#[derive(Clone, Copy, ValueEnum)]
enum Kind {
    Products,
    Categories,
    Customers,
    Invoices,
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let cli = Cli::parse();

    let file = match &cli.config {
        Some(path) => FileConfig::load(path)?,
        None => match config::default_config_file()? {
            Some(path) => FileConfig::load(&path)?,
            None => FileConfig::default(),
        },
    };
    let bind = match &cli.command {
        Command::Serve { bind } => *bind,
        Command::List { .. } => None,
    };
    let config = Config::resolve(cli.data_dir, bind, file)?;
    log::debug!("Using {config:?}");

    match cli.command {
        Command::Serve { .. } => serve(config),
        Command::List { kind } => match kind {
            Kind::Products => list::<Product>(&config.data_dir),
            Kind::Categories => list::<Category>(&config.data_dir),
            Kind::Customers => list::<Customer>(&config.data_dir),
            Kind::Invoices => list::<Invoice>(&config.data_dir),
        },
    }
}

fn serve(config: Config) -> Result<()> {
    let state = AppState::open(&config.data_dir)
        .with_context(|| format!("Opening data in {:?}", config.data_dir))?;
    let rt = tokio::runtime::Runtime::new()?;
    rt.block_on(async {
        let listener = tokio::net::TcpListener::bind(config.bind)
            .await
            .with_context(|| format!("Binding {}", config.bind))?;
        log::info!(
            "Serving {:?} on http://{}",
            config.data_dir,
            listener.local_addr()?
        );
        axum::serve(listener, build_router(state))
            .with_graceful_shutdown(shutdown_signal())
            .await?;
        log::info!("Shut down");
        Ok(())
    })
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        log::error!("Failed to listen for ctrl-c: {e}");
        std::future::pending::<()>().await;
    }
}

fn list<T: Entity + tabled::Tabled>(dir: &Path) -> Result<()> {
    let repo = Repository::<T>::open(dir)?;
    let items = repo.get_all();
    if items.is_empty() {
        println!("No {} found", T::COLLECTION);
    } else {
        println!("{}", tabled::Table::new(items));
    }
    Ok(())
}
