use std::process::ExitCode;

use dotenvy::dotenv;
use tracing::{error, info};
use uuid::Uuid;

fn init_logging() {
    // 提前加载 .env，使得 RUST_LOG / LOG_FORMAT 生效
    dotenv().ok();
    server::startup::init_logging();
}

/// Worker threads from config, else `TOKIO_WORKER_THREADS`, else tokio's default.
fn worker_threads() -> Option<usize> {
    match configs::AppConfig::load_or_default() {
        Ok(cfg) => cfg.server.worker_threads,
        Err(e) => {
            error!(event = "config_invalid", error = %e, "falling back to TOKIO_WORKER_THREADS");
            std::env::var("TOKIO_WORKER_THREADS").ok().and_then(|v| v.parse::<usize>().ok())
        }
    }
}

fn main() -> ExitCode {
    init_logging();

    let instance = Uuid::new_v4();
    let pid = std::process::id();
    let version = env!("CARGO_PKG_VERSION");

    std::panic::set_hook(Box::new(move |info| {
        error!(service = "store", event = "panic", %instance, pid, message = %info, "unhandled panic occurred");
    }));

    let threads = worker_threads();
    let mut builder = tokio::runtime::Builder::new_multi_thread();
    builder.enable_all();
    if let Some(w) = threads {
        builder.worker_threads(w);
    }
    let rt = match builder.build() {
        Ok(rt) => rt,
        Err(e) => {
            error!(service = "store", event = "runtime_build_failed", error = %e, "failed to build tokio runtime");
            return ExitCode::FAILURE;
        }
    };

    info!(service = "store", event = "start", %instance, pid, version, threads = threads.unwrap_or_default(), "resource store starting");

    rt.block_on(async move {
        let task = tokio::spawn(server::run());
        tokio::select! {
            res = task => match res {
                Ok(Ok(())) => {
                    info!(service = "store", event = "stop", %instance, "resource store stopped");
                    ExitCode::SUCCESS
                }
                Ok(Err(e)) => {
                    error!(service = "store", event = "run_failed", error = %e, "resource store exited with error");
                    ExitCode::FAILURE
                }
                Err(e) => {
                    error!(service = "store", event = "task_join_error", error = %e, "server task join error");
                    ExitCode::FAILURE
                }
            },
            _ = tokio::signal::ctrl_c() => {
                // 直接退出；每次写入都是原子替换，不会留下半截文件
                info!(service = "store", event = "shutdown_signal", %instance, "received Ctrl+C, shutting down");
                ExitCode::SUCCESS
            }
        }
    })
}
