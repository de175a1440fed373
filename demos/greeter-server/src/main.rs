use axum::routing::get;
use routekit::prelude::*;
use tokio::signal;
use tower_http::trace::TraceLayer;

mod controllers;
mod greeters;

use controllers::{HomeController, StatusController};
use greeters::{EnglishGreeter, NestedGreeter, SpanishGreeter};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "greeter_server=debug,routekit=debug,tower_http=debug".into()),
        )
        .init();

    tracing::info!("Starting greeter server...");

    let config = ConfigService::from_env();
    let host = config.get_or("HOST", "0.0.0.0");
    let port = config.get_parsed::<u16>("PORT")?.unwrap_or(3000);

    // 1. Services
    let mut container = ContainerBuilder::new()
        .provide::<EnglishGreeter>()
        .provide::<SpanishGreeter>()
        .provide::<NestedGreeter>()
        .instance(config)
        .build()?;

    // 2. Controllers
    let mut controllers = Controllers::<AppState>::new();
    controllers
        .bind::<HomeController>(&mut container)?
        .bind::<StatusController>(&mut container)?;

    let state = AppState::new(container);

    // 3. An api with every controller, plus its route table
    let table = controllers.route_table(&IncludeOptions::default());
    let api = controllers
        .attach_all(Router::new(), &IncludeOptions::default())?
        .route(
            "/routes",
            get(move || {
                let table = table.clone();
                async move { Json(table) }
            }),
        );

    // 4. Another api mounting only the home controller
    let other_api = controllers.attach::<HomeController>(
        Router::new(),
        &IncludeOptions::new().prefix("/other").tag("other"),
    )?;

    let app = api
        .merge(other_api)
        .layer(TraceLayer::new_for_http())
        .with_state(state);

    let addr = format!("{}:{}", host, port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!("Server running on http://{}", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            tracing::error!("Failed to install Ctrl+C handler: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
            }
            Err(e) => {
                tracing::error!("Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => tracing::info!("Received Ctrl+C signal"),
        _ = terminate => tracing::info!("Received SIGTERM signal"),
    }
}
