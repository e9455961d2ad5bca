//! This crate provides a statistics panel for a weather station. It queries a
//! relational database of meteorological readings, fits descriptive
//! statistics and serves the results as charts embedded in dynamically
//! generated HTML pages.
//!
//! The panel is built on top of a number of open source components.
//!
//! * [Tokio](tokio), the most popular asynchronous Rust runtime.
//! * [Axum](axum) web framework, built by the Tokio team. Axum performs well in [various](https://github.com/programatik29/rust-web-benchmarks/blob/master/result/hello-world.md) [benchmarks](https://web-frameworks-benchmark.netlify.app/result?l=rust)
//!   and is built on top of various popular components, including the [hyper] HTTP library.
//! * [SQLx](sqlx) for queries against the MySQL sample table.
//! * [plotters] renders histograms and scatter charts into PNG images.

pub mod app;
pub mod app_state;
pub mod cli;
pub mod datastore;
pub mod error;
pub mod metrics;
pub mod models;
pub mod render;
pub mod resource_manager;
pub mod server;
pub mod stats;
#[cfg(test)]
pub mod test_utils;
pub mod tracing;
