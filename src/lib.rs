//! # Gazette
//!
//! Categorized news feeds over a headless content store.
//!
//! ## Architecture
//!
//! ```text
//! CategorizedFeed / DetailView → QueryClient → DocumentStore (HTTP) → Document → RecordBuilder → UI
//! ```
//!
//! - [`client`]: Query transport, result cache and typed decoding
//! - [`query`]: Query expressions, parameters and reference expansion
//! - [`asset`]: Display URLs for image and file assets
//! - [`view`]: Per-view state machines and render records
//!
//! ## Quick Start
//!
//! ```bash
//! # List configured views
//! gazette views
//!
//! # One category
//! gazette feed sports
//!
//! # Every view, concurrently
//! gazette front --json
//!
//! # One article
//! gazette show 3f2a9c1e-0b7d-4c55-9e0a-1d2b3c4d5e6f
//! ```

/// Application context and error handling.
///
/// The [`AppContext`](app::AppContext) struct wires together the store,
/// query client and record builder from configuration.
pub mod app;

/// Asset reference parsing and URL derivation.
pub mod asset;

/// Command-line interface using clap.
///
/// - `views` - List configured views
/// - `feed <category>` - Show one categorized feed
/// - `front` - Show every configured view
/// - `show <id>` - Show one article
pub mod cli;

/// Document store access.
///
/// - [`DocumentStore`](client::DocumentStore): Async trait for the transport
/// - [`HttpStore`](client::HttpStore): reqwest-based query API client
/// - [`QueryClient`](client::QueryClient): Validation, caching and decoding
pub mod client;

/// Configuration loaded from `~/.config/gazette/config.toml`.
pub mod config;

/// Core domain models.
///
/// - [`Document`](domain::Document): A news document with expanded author
/// - [`Block`](domain::Block): Rich-text body block
/// - [`Author`](domain::Author): Expanded author reference
pub mod domain;

/// Query expressions and parameters.
pub mod query;

/// View state and render records.
///
/// - [`CategorizedFeed`](view::CategorizedFeed): One query per activation, latest wins
/// - [`DetailView`](view::DetailView): Single document by id
/// - [`RecordBuilder`](view::RecordBuilder): Documents to render-ready records
pub mod view;
