use common::utils::logging::{init_logging, LogFormat};
use configs::AppConfig;
use dotenvy::dotenv;
use tracing::{error, info, warn};
use uuid::Uuid;

fn main() -> std::process::ExitCode {
    // .env first so HOST / PORT / DATABASE_URL / RUST_LOG are visible to the config loader
    dotenv().ok();

    let config = match AppConfig::load() {
        Ok(cfg) => cfg,
        Err(e) => {
            init_logging(false, LogFormat::Compact);
            error!(service = "promotions", event = "config_invalid", error = %e, "cannot load configuration");
            return std::process::ExitCode::FAILURE;
        }
    };

    let format = config.server.log_format.parse::<LogFormat>();
    init_logging(config.server.debug, format.as_ref().copied().unwrap_or_default());
    if let Err(e) = format {
        warn!(error = %e, "falling back to compact log format");
    }

    let service_id = Uuid::new_v4();
    let pid = std::process::id();
    let version = env!("CARGO_PKG_VERSION");

    std::panic::set_hook(Box::new(move |info| {
        error!(
            service = "promotions",
            event = "panic",
            %service_id,
            pid,
            message = %info,
            "unhandled panic occurred"
        );
    }));

    let worker_threads = config.server.worker_threads;
    let mut builder = tokio::runtime::Builder::new_multi_thread();
    builder.enable_all();
    if let Some(w) = worker_threads { builder.worker_threads(w); }

    let rt = match builder.build() {
        Ok(rt) => rt,
        Err(e) => {
            error!(service = "promotions", event = "runtime_build_failed", error = %e, "failed to build tokio runtime");
            return std::process::ExitCode::FAILURE;
        }
    };

    info!(
        service = "promotions",
        event = "start",
        %service_id,
        pid,
        version,
        threads = worker_threads.unwrap_or_default(),
        "promotions service starting"
    );

    // server::run stops on Ctrl+C after draining in-flight requests
    match rt.block_on(server::run(config)) {
        Ok(()) => {
            info!(service = "promotions", event = "stop", %service_id, pid, "promotions service stopped");
            std::process::ExitCode::SUCCESS
        }
        Err(e) => {
            error!(service = "promotions", event = "run_failed", error = %e, "server::run returned error");
            std::process::ExitCode::FAILURE
        }
    }
}
