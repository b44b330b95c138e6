use tracing_subscriber::{
    fmt::format::Format, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter,
};

/// Install the console subscriber. Later calls keep the first subscriber.
pub fn init_telemetry() {
    // Console: compact format, filter from RUST_LOG when set.
    let console_fmt = tracing_subscriber::fmt::layer().event_format(
        Format::default()
            .compact()
            .with_target(false)
            .without_time(),
    );
    let installed = tracing_subscriber::registry()
        .with(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "mediagate=debug,tower_http=debug".into()),
        )
        .with(console_fmt)
        .try_init();

    if installed.is_ok() {
        tracing::info!("Tracing initialized");
    }
}
