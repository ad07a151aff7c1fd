use std::net::SocketAddr;
use std::sync::Arc;

use axum::routing::get;
use clap::Parser;
use tower_http::cors::{AllowOrigin, CorsLayer};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod api;
mod cli;
mod config;
mod errors;
mod middleware;
mod models;
mod notification;
mod store;
mod tenancy;

use notification::brevo::{BrevoMailer, SendOutcome};
use notification::templates::{Recipient, TestMessage};
use store::postgres::PgStore;
use tenancy::origins::OriginRegistry;
use tenancy::resolver::TenancyState;

/// Shared application state passed to handlers and middleware.
pub struct AppState {
    pub db: PgStore,
    pub mailer: BrevoMailer,
    pub origins: Arc<OriginRegistry>,
    pub config: config::Config,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    use opentelemetry::KeyValue;
    use opentelemetry_sdk::{trace as sdktrace, Resource};

    // OTLP export is opt-in: only wired up when an endpoint is configured.
    let telemetry_layer = if std::env::var("OTEL_EXPORTER_OTLP_ENDPOINT").is_ok() {
        let tracer = opentelemetry_otlp::new_pipeline()
            .tracing()
            .with_exporter(opentelemetry_otlp::new_exporter().tonic())
            .with_trace_config(sdktrace::config().with_resource(Resource::new(vec![
                KeyValue::new("service.name", "gestor-edge"),
            ])))
            .install_batch(opentelemetry_sdk::runtime::Tokio)
            .expect("failed to install OpenTelemetry tracer");
        Some(tracing_opentelemetry::layer().with_tracer(tracer))
    } else {
        None
    };

    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG")
                .unwrap_or_else(|_| "gestor_edge=debug,tower_http=debug".into()),
        ))
        .with(tracing_subscriber::fmt::layer())
        .with(telemetry_layer)
        .init();

    let cfg = config::load()?;
    let args = cli::Cli::parse();

    let result = match args.command {
        Some(cli::Commands::Serve { port }) => run_server(cfg, port).await,
        Some(cli::Commands::Tenant { command }) => {
            let db = PgStore::connect(&cfg.database_url).await?;
            handle_tenant_command(command, &db).await
        }
        Some(cli::Commands::Mail { command }) => handle_mail_command(command, &cfg).await,
        None => {
            let port = cfg.port;
            run_server(cfg, port).await
        }
    };

    if let Err(ref e) = result {
        eprintln!("Error: {:?}", e);
    }
    result
}

async fn run_server(cfg: config::Config, port: u16) -> anyhow::Result<()> {
    tracing::info!("Connecting to database...");
    let db = PgStore::connect(&cfg.database_url).await?;

    tracing::info!("Running migrations...");
    db.migrate().await?;

    let origins = Arc::new(OriginRegistry::new(cfg.allowed_origins.clone()));
    let mailer = BrevoMailer::new(&cfg.mail);

    let state = Arc::new(AppState {
        db: db.clone(),
        mailer,
        origins: origins.clone(),
        config: cfg,
    });

    let tenancy_state = TenancyState {
        pool: db.pool().clone(),
        origins: origins.clone(),
    };

    // The allow-list predicate consults the registry on every evaluation,
    // so origins registered mid-flight by the tenant middleware apply to
    // the same request's CORS decision.
    let cors = {
        use axum::http::{HeaderName, Method};
        let origins = origins.clone();
        CorsLayer::new()
            .allow_origin(AllowOrigin::predicate(move |origin, _| {
                origin.to_str().map(|o| origins.contains(o)).unwrap_or(false)
            }))
            .allow_methods([
                Method::GET,
                Method::POST,
                Method::PUT,
                Method::DELETE,
                Method::PATCH,
                Method::OPTIONS,
            ])
            .allow_headers([
                HeaderName::from_static("content-type"),
                HeaderName::from_static("authorization"),
                HeaderName::from_static("x-admin-key"),
            ])
            .allow_credentials(true)
    };

    let app = axum::Router::new()
        // Health endpoints (no auth)
        .route("/healthz", get(|| async { "ok" }))
        .route("/readyz", get(readiness_check))
        // Management API — nested under /api/v1
        .nest("/api/v1", api::api_router(state.clone()))
        .with_state(state.clone())
        .layer(tower_http::trace::TraceLayer::new_for_http())
        .layer(cors)
        .layer(axum::middleware::from_fn(
            tenancy::headers::tenant_identity_headers,
        ))
        // Outermost: the tenant must be resolved before CORS is evaluated
        // and before responses are annotated.
        .layer(axum::middleware::from_fn_with_state(
            tenancy_state,
            tenancy::resolver::tenant_context,
        ));

    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    let listener = tokio::net::TcpListener::bind(addr).await?;
    tracing::info!("gestor-edge listening on {}", addr);
    axum::serve(listener, app).await?;

    Ok(())
}

async fn readiness_check() -> &'static str {
    "ok"
}

async fn handle_tenant_command(cmd: cli::TenantCommands, db: &PgStore) -> anyhow::Result<()> {
    match cmd {
        cli::TenantCommands::List => {
            let tenants = db.list_tenants().await?;
            if tenants.is_empty() {
                println!("No tenants found.");
            } else {
                println!("{:<38} {:<20} NAME", "ID", "SLUG");
                for t in tenants {
                    println!("{:<38} {:<20} {}", t.id, t.slug, t.name);
                }
            }
        }
    }
    Ok(())
}

async fn handle_mail_command(cmd: cli::MailCommands, cfg: &config::Config) -> anyhow::Result<()> {
    match cmd {
        cli::MailCommands::Test { to, name } => {
            let mailer = BrevoMailer::new(&cfg.mail);
            let recipient = Recipient { email: to, name };

            match mailer.send(&TestMessage, &recipient).await? {
                None => println!("Mail delivery is disabled (no API key configured)."),
                Some(SendOutcome::Delivered { status, message_id }) => {
                    println!(
                        "Delivered (status {}, message id: {}).",
                        status,
                        message_id.as_deref().unwrap_or("-")
                    );
                }
                Some(SendOutcome::Rejected { status, error }) => {
                    println!("Provider refused the message (status {}): {}", status, error);
                }
            }
        }
    }
    Ok(())
}
