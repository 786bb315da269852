//! Type layout explorer.
//!
//! Prints the layout and classification of the types in a built-in
//! catalogue, as an annotated table with a byte map or as JSON.

pub mod catalogue;
pub mod options;
pub mod report;

pub use catalogue::{Catalogue, Entry, Topic};
pub use options::{parse_args, Format, Options};
pub use report::{build_reports, render, render_list, BaseRow, Report};

use std::sync::Once;

static TRACING_INIT: Once = Once::new();

/// Install a `tracing` subscriber driven by `RUST_LOG`.
///
/// Does nothing when `RUST_LOG` is unset.
pub fn init_tracing() {
    TRACING_INIT.call_once(|| {
        use tracing_subscriber::{fmt, prelude::*, EnvFilter};

        if std::env::var("RUST_LOG").is_ok() {
            tracing_subscriber::registry()
                .with(
                    fmt::layer()
                        .with_target(true)
                        .with_level(true)
                        .with_writer(std::io::stderr),
                )
                .with(EnvFilter::from_default_env())
                .init();
        }
    });
}
