//! mlogx Language Server Protocol (LSP) Server
//!
//! Provides, for mlogx files:
//! - Diagnostics from the compiler on every change
//! - Hover listing the overloads of a command
//! - Completion of command names

use tower_lsp::{LspService, Server};
use tracing_subscriber::prelude::*;
use tracing_subscriber::{fmt, EnvFilter};

mod analysis;
mod backend;
mod document;
mod utils;

use backend::MlogxBackend;

#[tokio::main]
async fn main() {
    // stdout carries the protocol
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| "mlogx_lsp=info,mlogx=warn".into()))
        .with(fmt::layer().with_writer(std::io::stderr))
        .init();

    let stdin = tokio::io::stdin();
    let stdout = tokio::io::stdout();

    let (service, socket) = LspService::new(MlogxBackend::new);
    Server::new(stdin, stdout, socket).serve(service).await;
}
