use tracing_subscriber::EnvFilter;

/// Workspace crates whose events are shown.
const CRATE_TARGETS: &[&str] = &[
    "aquifer",
    "aquifer_convolve",
    "aquifer_model",
    "aquifer_noise",
    "aquifer_params",
    "aquifer_recharge",
    "aquifer_rfunc",
    "aquifer_series",
    "aquifer_solve",
    "aquifer_stats",
];

/// Level for a `-v` count: none warn, `-v` info, `-vv` debug, more trace.
fn level(verbosity: u8) -> &'static str {
    match verbosity {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    }
}

/// Filter directive enabling `level` for every workspace crate and nothing
/// else (argmin and friends stay quiet).
fn directives(verbosity: u8) -> String {
    let level = level(verbosity);
    CRATE_TARGETS
        .iter()
        .map(|t| format!("{t}={level}"))
        .collect::<Vec<_>>()
        .join(",")
}

/// Installs the global subscriber. `RUST_LOG` overrides the CLI flag.
pub fn init(verbosity: u8) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(directives(verbosity)));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(verbosity >= 2)
        .init();
}
