//! Gateway main entry point
//!
//! This is the HTTP gateway that receives external requests
//! and routes them to the cashbook service via InProcess calls.

use auth::Role;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use gateway_lib::{build_router, initialize_app_state, GatewayConfig};

fn init_tracing() {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "gateway=info,cashbook_service=info,tower_http=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();
}

async fn run_server() -> anyhow::Result<()> {
    init_tracing();

    // Load configuration
    let config = GatewayConfig::from_env();
    tracing::info!("Starting Gateway v{}", config.version);
    if config.uses_development_secret() {
        tracing::warn!("JWT_SECRET not set, using the development secret");
    }

    let (state, storage) = initialize_app_state(&config).await?;
    let app = build_router(state, config.request_timeout());

    let listener = tokio::net::TcpListener::bind(&config.http_addr).await?;
    tracing::info!("HTTP server listening on {}", listener.local_addr()?);

    axum::serve(listener, app)
        .with_graceful_shutdown(async {
            let _ = tokio::signal::ctrl_c().await;
            tracing::info!("Shutdown signal received");
        })
        .await?;

    storage.close().await;
    tracing::info!("Gateway stopped");
    Ok(())
}

/// Mint a token with the configured secret and print it to stdout.
fn issue_token(args: &[String]) -> anyhow::Result<()> {
    let mut subject = None;
    let mut name = None;
    let mut role = Role::Employee;

    let mut i = 0;
    while i < args.len() {
        match args[i].as_str() {
            "--admin" => {
                role = Role::Admin;
                i += 1;
            }
            "--name" if i + 1 < args.len() => {
                name = Some(args[i + 1].clone());
                i += 2;
            }
            other if subject.is_none() && !other.starts_with("--") => {
                subject = Some(other.to_string());
                i += 1;
            }
            other => anyhow::bail!("unexpected argument: {}", other),
        }
    }

    let subject = subject.ok_or_else(|| anyhow::anyhow!("issue-token requires a subject"))?;
    let config = GatewayConfig::from_env();
    if config.uses_development_secret() {
        eprintln!("warning: signing with the development secret");
    }

    let token = config.jwt.issue(&subject, name.as_deref(), role)?;
    println!("{}", token);
    Ok(())
}

fn main() -> anyhow::Result<()> {
    let args: Vec<String> = std::env::args().collect();

    if args.len() > 1 {
        match args[1].as_str() {
            "run" => {}
            "issue-token" => return issue_token(&args[2..]),
            "--help" | "-h" => {
                print_help();
                return Ok(());
            }
            other => {
                eprintln!("Unknown command: {}", other);
                print_help();
                std::process::exit(2);
            }
        }
    }

    let runtime = tokio::runtime::Runtime::new()?;
    runtime.block_on(run_server())
}

fn print_help() {
    println!("Gateway - HTTP API for the employee cashbook");
    println!();
    println!("Usage:");
    println!("  gateway                                   Run the HTTP server");
    println!("  gateway run                               Run the HTTP server");
    println!("  gateway issue-token <subject> [--admin] [--name <name>]");
    println!("                                            Print a signed bearer token");
    println!();
    println!("Environment Variables:");
    println!("  GATEWAY_HTTP_ADDR        HTTP listen address (default: 127.0.0.1:8080)");
    println!("  JWT_SECRET               Token signing secret (default: development secret)");
    println!("  JWT_ISSUER               Token issuer (default: cashbook)");
    println!("  JWT_EXPIRES_IN_SECS      Token lifetime (default: 86400)");
    println!("  REQUEST_TIMEOUT_SECS     Per-request timeout (default: 30)");
    println!("  CASHBOOK_CARRY_POLICY    Ledger carry policy: credit | clamp (default: credit)");
    println!("  DATABASE_HOST            MySQL host; unset keeps records in memory");
    println!("  DATABASE_PORT, DATABASE_NAME, DATABASE_USER, DATABASE_PASSWORD,");
    println!("  DATABASE_MAX_CONNECTIONS MySQL connection settings");
}
