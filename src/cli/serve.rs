//! HTTP server command handler.

use std::net::SocketAddr;

use color_eyre::Result;

use crate::config::Config;
use crate::context::Context;
use crate::http;
use crate::services::SearchService;

use super::App;

impl App {
    /// Run the HTTP API until Ctrl-C.
    pub async fn run_serve(&self, host: Option<String>, port: Option<u16>) -> Result<()> {
        let mut config = Config::load()?;
        if let Some(host) = host {
            config.server.host = host;
        }
        if let Some(port) = port {
            config.server.port = port;
        }
        let addr: SocketAddr = format!("{}:{}", config.server.host, config.server.port)
            .parse()
            .map_err(|e| {
                color_eyre::eyre::eyre!(
                    "Invalid address {}:{}: {}",
                    config.server.host,
                    config.server.port,
                    e
                )
            })?;

        let ctx = Context::from_config(config).await?;

        if ctx.config.embedding.load_on_start {
            let search = ctx.resolve::<SearchService>();
            tokio::spawn(async move {
                match search.build_index().await {
                    Ok(count) => tracing::info!(messages = count, "Similarity index ready"),
                    Err(e) => tracing::warn!(error = %e, "Similarity index unavailable"),
                }
            });
        } else {
            tracing::info!("Similarity index disabled (embedding.load_on_start = false)");
        }

        let app = http::router(ctx);
        let listener = tokio::net::TcpListener::bind(addr)
            .await
            .map_err(|e| color_eyre::eyre::eyre!("Failed to bind to {}: {}", addr, e))?;

        tracing::info!("commgraph listening on http://{}", addr);

        axum::serve(listener, app)
            .with_graceful_shutdown(shutdown_signal())
            .await
            .map_err(|e| {
                tracing::error!(error = %e, "HTTP server error");
                color_eyre::eyre::eyre!("HTTP server error: {}", e)
            })?;

        tracing::info!("HTTP server shutting down");
        Ok(())
    }
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::warn!(error = %e, "Failed to listen for Ctrl-C");
        std::future::pending::<()>().await;
    }
}
