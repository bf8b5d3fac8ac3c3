//! Stores labelled face images uploaded over HTTP as JSON.
//!
//! The `face_store` binary serves `POST /upload` and `GET /get_data` over a
//! SQLite table; the `uploader` binary encodes an image and posts it.

pub mod actions;
pub mod config;
pub mod dtos;
pub mod errors;
pub mod models;
pub mod uploader;

/// Installs the fmt subscriber, honouring `RUST_LOG` and defaulting to `info`.
pub fn init_tracing() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();
}
