//! # Etiket CLI
//!
//! Command-line interface for the label layout engine.
//!
//! ## Usage
//!
//! ```bash
//! # Run the HTTP API
//! etiket serve --listen 0.0.0.0:8080 --data-file data/layouts.json
//!
//! # Render the default style against the mock shipment
//! etiket preview
//!
//! # Render a stored layout against a shipment and save the barcode
//! etiket preview --layout layout.json --context shipment.json --svg barcode.svg
//!
//! # Print the safe-default style
//! etiket defaults
//! ```

use clap::{Parser, Subcommand};
use serde::de::DeserializeOwned;
use std::path::{Path, PathBuf};

use etiket::{
    EtiketError, LayoutStyle, ShipmentRenderContext,
    render,
    server::{self, ServerConfig},
};

/// Etiket - Shipping label layout engine
#[derive(Parser, Debug)]
#[command(name = "etiket")]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Run the HTTP API
    Serve {
        /// Address to listen on
        #[arg(long, env = "ETIKET_LISTEN", default_value = "127.0.0.1:8080")]
        listen: String,

        /// JSON file holding stored layouts
        #[arg(long, env = "ETIKET_DATA_FILE", default_value = "data/layouts.json")]
        data_file: PathBuf,

        /// Directory for uploaded logos
        #[arg(long, env = "ETIKET_ASSET_DIR", default_value = "data/assets")]
        asset_dir: PathBuf,

        /// Public URL the asset directory is served under
        /// (defaults to http://<listen>/assets)
        #[arg(long, env = "ETIKET_PUBLIC_URL")]
        public_url: Option<String>,
    },

    /// Render a layout and print its visual tree as JSON
    Preview {
        /// Layout or style JSON (defaults to the safe-default style)
        #[arg(long, value_name = "FILE")]
        layout: Option<PathBuf>,

        /// Shipment context JSON (defaults to the mock shipment)
        #[arg(long, value_name = "FILE")]
        context: Option<PathBuf>,

        /// Also write the barcode as SVG
        #[arg(long, value_name = "FILE")]
        svg: Option<PathBuf>,
    },

    /// Print the safe-default style as JSON
    Defaults,
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "etiket=info,tower_http=info".into()),
        )
        .with_writer(std::io::stderr)
        .init();

    if let Err(e) = run().await {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

async fn run() -> Result<(), EtiketError> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Serve {
            listen,
            data_file,
            asset_dir,
            public_url,
        } => {
            let public_base_url =
                public_url.unwrap_or_else(|| format!("http://{}/assets", listen));
            server::serve(ServerConfig {
                listen_addr: listen,
                data_file,
                asset_dir,
                public_base_url,
            })
            .await
        }

        Commands::Preview {
            layout,
            context,
            svg,
        } => {
            // A stored layout parses as a style: the extra fields are ignored
            let style = match layout {
                Some(path) => read_json::<LayoutStyle>(&path).await?.normalized(),
                None => LayoutStyle::default(),
            };
            let context = match context {
                Some(path) => read_json::<ShipmentRenderContext>(&path).await?,
                None => ShipmentRenderContext::mock(),
            };

            let tree = render::render(&style, &context);
            for diagnostic in &tree.diagnostics {
                tracing::warn!(?diagnostic, "render warning");
            }

            if let Some(path) = svg {
                match tree.barcode_symbol() {
                    Some(symbol) => {
                        tokio::fs::write(&path, symbol.to_svg()).await?;
                        tracing::info!(path = %path.display(), "barcode written");
                    }
                    None => tracing::warn!("no barcode to write"),
                }
            }

            print_json(&tree)
        }

        Commands::Defaults => print_json(&LayoutStyle::default()),
    }
}

async fn read_json<T: DeserializeOwned>(path: &Path) -> Result<T, EtiketError> {
    let bytes = tokio::fs::read(path).await?;
    serde_json::from_slice(&bytes)
        .map_err(|e| EtiketError::validation(path.display().to_string(), e.to_string()))
}

fn print_json<T: serde::Serialize>(value: &T) -> Result<(), EtiketError> {
    let json = serde_json::to_string_pretty(value)
        .map_err(|e| EtiketError::Transport(format!("Failed to encode JSON: {}", e)))?;
    println!("{}", json);
    Ok(())
}
