use std::path::PathBuf;

use clap::Parser;
use configs::{AppConfig, LogFormat};
use dotenvy::dotenv;
use tracing::{error, info};
use uuid::Uuid;

#[derive(Parser, Debug)]
#[command(name = "flies-server", version, about = "Contest participant roster API")]
struct Cli {
    /// Settings file (.json or .toml); defaults are used when omitted
    #[arg(long = "config", short = 'c', env = "CONFIG_PATH")]
    config: Option<PathBuf>,
    /// Settings file given positionally; wins over --config
    settings: Option<PathBuf>,
}

fn init_logging(format: LogFormat) {
    match format {
        LogFormat::Compact => common::utils::logging::init_logging_default(),
        LogFormat::Json => common::utils::logging::init_logging_json(),
    }
    info!(service = "server", event = "logger_init", "tracing subscriber initialized");
}

fn load_config(cli: Cli) -> anyhow::Result<AppConfig> {
    let path = cli.settings.or(cli.config);
    configs::load(path.as_deref())
}

fn main() -> std::process::ExitCode {
    // .env first so RUST_LOG and the override variables are visible
    dotenv().ok();
    let cli = Cli::parse();

    let config = match load_config(cli) {
        Ok(cfg) => cfg,
        Err(e) => {
            init_logging(LogFormat::Compact);
            error!(service = "server", event = "config_invalid", error = %format!("{e:#}"), "cannot load settings");
            return std::process::ExitCode::FAILURE;
        }
    };
    init_logging(config.logging.format);

    let service_id = Uuid::new_v4();
    let pid = std::process::id();
    let version = env!("CARGO_PKG_VERSION");

    std::panic::set_hook(Box::new(move |info| {
        error!(
            service = "server",
            event = "panic",
            %service_id,
            pid,
            message = %info,
            "unhandled panic occurred"
        );
    }));

    let mut builder = tokio::runtime::Builder::new_multi_thread();
    builder.enable_all();
    if let Some(w) = config.server.worker_threads {
        builder.worker_threads(w);
    }
    let rt = match builder.build() {
        Ok(rt) => rt,
        Err(e) => {
            error!(service = "server", event = "runtime_build_failed", error = %e, "failed to build tokio runtime");
            return std::process::ExitCode::FAILURE;
        }
    };

    info!(
        service = "server",
        event = "start",
        %service_id,
        pid,
        version,
        directory = %config.storage.participants_directory.display(),
        addr = %config.bind_addr(),
        "server service starting"
    );

    rt.block_on(async move {
        match server::run(config).await {
            Ok(()) => {
                info!(service = "server", event = "stop", %service_id, pid, "server stopped normally");
                std::process::ExitCode::SUCCESS
            }
            Err(e) => {
                error!(service = "server", event = "run_failed", error = %format!("{e:#}"), "server::run returned error");
                std::process::ExitCode::FAILURE
            }
        }
    })
}
