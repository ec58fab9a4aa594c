//! Telemetry logic.
//! Support logging and metrics descriptions.

use metrics::Unit;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

pub const USERS_CREATED: &str = "users_created_total";
pub const AUTHENTICATIONS: &str = "authentications_total";

/// Install the global `tracing` subscriber.
///
/// `RUST_LOG` takes precedence over `level`.
pub fn setup_logging(
    level: &str,
) -> Result<(), tracing_subscriber::util::TryInitError> {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(level))
        .unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::registry()
        .with(filter)
        .with(
            tracing_subscriber::fmt::layer()
                .with_target(true)
                .with_line_number(true),
        )
        .try_init()
}

/// Register descriptions for account counters.
pub fn describe_metrics() {
    metrics::describe_counter!(
        USERS_CREATED,
        Unit::Count,
        "Accounts created, labelled by superuser status."
    );
    metrics::describe_counter!(
        AUTHENTICATIONS,
        Unit::Count,
        "Password authentications, labelled by outcome."
    );
}

/// Count a created account.
pub fn record_user_created(is_superuser: bool) {
    metrics::counter!(USERS_CREATED, "superuser" => is_superuser.to_string())
        .increment(1);
}

/// Count an authentication attempt.
pub fn record_authentication(success: bool) {
    let outcome = if success { "success" } else { "failure" };
    metrics::counter!(AUTHENTICATIONS, "outcome" => outcome).increment(1);
}
