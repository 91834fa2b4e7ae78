//! Tracing initialization for tests and binaries
//!
//! The library only emits events; subscribers are installed here, filtered by
//! `RUST_LOG`.

#[cfg(test)]
use once_cell::sync::Lazy;

/// Install a test-writer subscriber, defaulting to `tdhosa=warn`
///
/// Targets worth filtering on with `RUST_LOG`:
/// - `tdhosa::grid=debug` for frequency and phase grid sizes
/// - `tdhosa::estimator=debug` for sweep counts and finished levels
/// - `tdhosa::estimator::maximizer=trace` for the peak of every phase scan
/// - `tdhosa::estimator::assemble=warn` for bins left unresolved
/// - `tdhosa::progress=info` for progress milestones
///
/// Repeated calls reuse the first subscriber.
#[cfg(test)]
pub fn init_test_tracing() {
    static TRACING: Lazy<()> = Lazy::new(|| {
        use tracing_subscriber::{fmt, EnvFilter};

        let filter = EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| EnvFilter::new("tdhosa=warn"));

        fmt()
            .with_env_filter(filter)
            .with_target(true)
            .with_thread_ids(false)
            .with_line_number(true)
            .with_test_writer()
            .try_init()
            .ok();
    });

    Lazy::force(&TRACING);
}

/// Install the stderr subscriber used by `tdspec`
///
/// Defaults to `tdhosa=info`. Thread ids identify the rayon worker that
/// evaluated a bin. Stdout is left to the binaries' own output.
pub fn init_tracing() {
    use tracing_subscriber::{fmt, EnvFilter};

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("tdhosa=info"));

    fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_thread_ids(true)
        .with_line_number(true)
        .with_writer(std::io::stderr)
        .init();
}
