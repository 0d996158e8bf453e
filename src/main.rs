use dotenvy::dotenv;
use hallpass::logging::{init_tracing, shutdown_tracer};
use hallpass::metrics::init_metrics;
use hallpass::modules::notifications::reminders::spawn_reminder_task;
use hallpass::router::init_router;
use hallpass::state::{AppConfig, init_app_state};
use tracing::info;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenv().ok();
    init_tracing()?;

    let config = AppConfig::from_env();
    let state = init_app_state(&config).await?.with_metrics(init_metrics());

    let reminders = spawn_reminder_task(
        state.store.clone(),
        state.notifications.clone(),
        config.notifications.reminder_interval,
    );

    let app = init_router(state);
    let address = config.server.address();
    let listener = tokio::net::TcpListener::bind(&address).await?;

    info!(%address, "server listening");
    info!("Swagger UI available at http://{address}/swagger-ui");
    info!("Scalar UI available at http://{address}/scalar");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    reminders.abort();
    shutdown_tracer();
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    info!("shutdown signal received");
}
