#![deny(warnings)]

mod routes;

use anyhow::Context;
use clap::Parser;
use soullens_core::analysis::EmotionService;
use soullens_core::config::{
    resolve_bind, resolve_origins, resolve_port, resolve_string_with_default,
    resolve_upload_limit, Env, ServerConfig, StdEnv, DEFAULT_HOST, ENV_HOST,
};
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "soullens")]
#[command(about = "Emotion tagging for short texts and uploaded audio clips")]
struct Args {
    /// Bind address (IP literal). Falls back to SOULLENS_HOST, then 0.0.0.0.
    #[arg(long)]
    host: Option<String>,

    /// Falls back to SOULLENS_PORT, then 8000.
    #[arg(long)]
    port: Option<u16>,

    /// Browser origin allowed by CORS; repeat for several, `*` for any.
    /// Falls back to the comma-separated SOULLENS_ALLOWED_ORIGINS.
    #[arg(long = "allowed-origin")]
    allowed_origins: Vec<String>,

    /// Maximum request body size. Falls back to SOULLENS_MAX_UPLOAD_MB, then 25.
    #[arg(long)]
    max_upload_mb: Option<u64>,

    #[arg(long, default_value = "info")]
    log_level: String,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();
    init_tracing(&args.log_level)?;

    let env = StdEnv;
    let cfg = build_config(args, &env)?;

    tracing::info!(
        bind = %cfg.bind,
        origins = ?cfg.allowed_origins,
        max_upload_mb = cfg.upload_limit.max_mb,
        "config loaded"
    );

    serve(cfg).await
}

async fn serve(cfg: ServerConfig) -> anyhow::Result<()> {
    let service = Arc::new(EmotionService::default());
    let app = routes::router(service, &cfg)?;

    let listener = tokio::net::TcpListener::bind(cfg.bind)
        .await
        .with_context(|| format!("failed to bind {}", cfg.bind))?;
    tracing::info!(addr = %cfg.bind, "listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("server error")?;

    tracing::info!("server stopped");
    Ok(())
}

async fn shutdown_signal() {
    match tokio::signal::ctrl_c().await {
        Ok(()) => tracing::info!("shutdown requested"),
        Err(e) => {
            tracing::error!(error = %e, "cannot listen for ctrl-c; running until killed");
            std::future::pending::<()>().await;
        }
    }
}

fn init_tracing(level: &str) -> anyhow::Result<()> {
    let filter = EnvFilter::builder()
        .with_default_directive(
            level
                .parse()
                .with_context(|| format!("invalid --log-level: {level}"))?,
        )
        .from_env_lossy();

    tracing_subscriber::fmt().with_env_filter(filter).init();
    Ok(())
}

fn build_config(args: Args, env: &impl Env) -> anyhow::Result<ServerConfig> {
    let host = resolve_string_with_default(args.host, ENV_HOST, env, DEFAULT_HOST);
    let port = resolve_port(args.port, env)?;

    Ok(ServerConfig {
        bind: resolve_bind(&host, port)?,
        allowed_origins: resolve_origins(args.allowed_origins, env)?,
        upload_limit: resolve_upload_limit(args.max_upload_mb, env)?,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use soullens_core::config::{AllowedOrigin, MapEnv, ENV_ALLOWED_ORIGINS, ENV_PORT};

    fn parse(argv: &[&str]) -> Args {
        Args::try_parse_from(std::iter::once("soullens").chain(argv.iter().copied()))
            .expect("valid args")
    }

    #[test]
    fn defaults_without_flags_or_env() {
        let cfg = build_config(parse(&[]), &MapEnv::default()).expect("valid config");
        assert_eq!(cfg, ServerConfig::default());
    }

    #[test]
    fn flags_override_env() {
        let env = MapEnv::default()
            .with_var(ENV_PORT, "9000")
            .with_var(ENV_ALLOWED_ORIGINS, "http://from-env.example");
        let args = parse(&[
            "--host",
            "127.0.0.1",
            "--port",
            "8080",
            "--allowed-origin",
            "https://a.example",
            "--allowed-origin",
            "https://b.example",
        ]);
        let cfg = build_config(args, &env).expect("valid config");
        assert_eq!(cfg.bind.to_string(), "127.0.0.1:8080");
        assert_eq!(
            cfg.allowed_origins,
            vec![
                AllowedOrigin::Exact("https://a.example".to_owned()),
                AllowedOrigin::Exact("https://b.example".to_owned()),
            ]
        );
    }

    #[test]
    fn env_used_when_flags_missing() {
        let env = MapEnv::default()
            .with_var(ENV_PORT, "9000")
            .with_var(ENV_ALLOWED_ORIGINS, "*");
        let cfg = build_config(parse(&[]), &env).expect("valid config");
        assert_eq!(cfg.bind.port(), 9000);
        assert!(cfg.allows_any_origin());
    }

    #[test]
    fn zero_upload_limit_is_rejected() {
        let args = parse(&["--max-upload-mb", "0"]);
        let err = build_config(args, &MapEnv::default()).unwrap_err();
        assert!(err.to_string().contains("upload limit"));
    }
}
