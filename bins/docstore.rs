use clap::Parser;
use configs::LogFormat;
use dotenvy::dotenv;
use server::cli::Cli;
use tracing::{error, info};
use uuid::Uuid;

fn main() -> std::process::ExitCode {
    // 提前加载 .env，使得 RUST_LOG / CONFIG_PATH 等环境变量生效
    dotenv().ok();
    let cli = Cli::parse();

    let cfg = match cli.load_config() {
        Ok(cfg) => cfg,
        Err(e) => {
            eprintln!("docstore: invalid configuration: {e:#}");
            return std::process::ExitCode::FAILURE;
        }
    };

    let log_path = cfg.logging.path.as_deref();
    let logging = match cfg.logging.format {
        LogFormat::Compact => common::utils::logging::init_logging_default(log_path),
        LogFormat::Json => common::utils::logging::init_logging_json(log_path),
    };
    if let Err(e) = logging {
        eprintln!("docstore: cannot open log output: {e}");
        return std::process::ExitCode::FAILURE;
    }
    info!(service = "docstore", event = "logger_init", "tracing subscriber initialized");

    // 基础服务上下文
    let service_id = Uuid::new_v4();
    let pid = std::process::id();
    let version = env!("CARGO_PKG_VERSION");

    // Panic 钩子：捕获异常并输出错误日志
    std::panic::set_hook(Box::new(move |info| {
        error!(
            service = "docstore",
            event = "panic",
            %service_id,
            pid,
            message = %info,
            "unhandled panic occurred"
        );
    }));

    let worker_threads = cfg.server.worker_threads;
    let mut builder = tokio::runtime::Builder::new_multi_thread();
    builder.enable_all();
    if let Some(w) = worker_threads { builder.worker_threads(w); }

    let rt = match builder.build() {
        Ok(rt) => rt,
        Err(e) => {
            error!(service = "docstore", event = "runtime_build_failed", error = %e, "failed to build tokio runtime");
            return std::process::ExitCode::FAILURE;
        }
    };

    info!(
        service = "docstore",
        event = "start",
        %service_id,
        pid,
        version,
        bind = %cfg.bind_addr(),
        threads = worker_threads.unwrap_or_default(),
        segments = cfg.store.segments,
        "docstore starting"
    );

    // server::run 内部处理 Ctrl+C / SIGTERM 优雅停机
    match rt.block_on(server::run(cfg)) {
        Ok(()) => {
            info!(service = "docstore", event = "stop", %service_id, pid, "docstore stopped normally");
            std::process::ExitCode::SUCCESS
        }
        Err(e) => {
            error!(service = "docstore", event = "run_failed", %service_id, error = %format!("{e:#}"), "docstore exited with error");
            std::process::ExitCode::FAILURE
        }
    }
}
