use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;

use clap::{Parser, Subcommand};
use tracing::{error, info};

use crate::app_state::AppState;
use crate::config_loader::{load_config, ConfigOverrides, ServeMode};
use crate::errors::PredictError;
use crate::model_artifact::ModelArtifact;

/// Top-level CLI interface for predictd
#[derive(Parser)]
#[command(
    name = "predictd",
    version,
    about = "Serve predictions from a pre-trained model artifact"
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Load the model artifact and serve GET /predict
    Serve {
        /// Host/IP to bind
        #[arg(long)]
        host: Option<String>,
        /// Port to bind
        #[arg(long)]
        port: Option<u16>,
        /// Path to the model artifact
        #[arg(long)]
        model: Option<PathBuf>,
        /// `scalar` (?x=) or `sample` (random reference-dataset row)
        #[arg(long)]
        mode: Option<ServeMode>,
    },

    /// Print an artifact's metadata as JSON
    Inspect {
        #[arg(long)]
        model: PathBuf,
    },
}

pub fn dispatch(cli: Cli) -> ExitCode {
    match cli.command {
        Commands::Serve {
            host,
            port,
            model,
            mode,
        } => serve(ConfigOverrides {
            host,
            port,
            model_path: model,
            mode,
        }),
        Commands::Inspect { model } => inspect(model),
    }
}

fn serve(overrides: ConfigOverrides) -> ExitCode {
    let config = match load_config(overrides).map_err(|e| PredictError::config(e.to_string())) {
        Ok(cfg) => cfg,
        Err(e) => {
            error!("{e}");
            return ExitCode::FAILURE;
        }
    };

    // The model is loaded before anything binds; a bad artifact means no server.
    let state = match AppState::from_config(&config) {
        Ok(st) => Arc::new(st),
        Err(e) => {
            error!(model_path = %config.model_path.display(), "Failed to load model: {e}");
            return ExitCode::FAILURE;
        }
    };

    let app = crate::predictweb::build_predict_router(state);
    let addr = config.bind_addr();

    let rt = match tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
    {
        Ok(rt) => rt,
        Err(e) => {
            error!("Failed to build Tokio runtime: {e}");
            return ExitCode::FAILURE;
        }
    };

    rt.block_on(async move {
        let listener = match tokio::net::TcpListener::bind(&addr).await {
            Ok(l) => l,
            Err(e) => {
                error!("Failed to bind {addr}: {e}");
                return ExitCode::FAILURE;
            }
        };
        info!(mode = %config.mode, "HTTP server listening on http://{addr}");
        match axum::serve(listener, app)
            .with_graceful_shutdown(shutdown_signal())
            .await
        {
            Ok(()) => ExitCode::SUCCESS,
            Err(e) => {
                error!("Server error: {e}");
                ExitCode::FAILURE
            }
        }
    })
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        error!("Failed to listen for shutdown signal: {e}");
        std::future::pending::<()>().await;
    }
    info!("shutdown signal received");
}

fn inspect(model: PathBuf) -> ExitCode {
    let loaded = match ModelArtifact::load(&model) {
        Ok(m) => m,
        Err(e) => {
            error!("Failed to load model: {e}");
            return ExitCode::FAILURE;
        }
    };
    let report = serde_json::json!({
        "path": loaded.path,
        "format_version": loaded.artifact.format_version,
        "kind": loaded.artifact.estimator.kind(),
        "n_features": loaded.artifact.n_features,
        "feature_names": loaded.artifact.feature_names,
        "trained_at": loaded.artifact.trained_at,
        "sha256": loaded.sha256,
    });
    match serde_json::to_string_pretty(&report) {
        Ok(s) => {
            println!("{s}");
            ExitCode::SUCCESS
        }
        Err(e) => {
            error!("Failed to render report: {e}");
            ExitCode::FAILURE
        }
    }
}
