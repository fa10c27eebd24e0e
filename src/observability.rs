use std::net::SocketAddr;

use crate::sql::Command;

// ── Booking metrics ─────────────────────────────────────────────

/// Counter: reservation attempts. Labels: outcome (booked, full, rejected).
pub const RESERVATIONS_TOTAL: &str = "tablebook_reservations_total";

/// Counter: cancellation attempts. Labels: outcome (cancelled, not_found).
pub const CANCELLATIONS_TOTAL: &str = "tablebook_cancellations_total";

// ── RED metrics (request-driven) ────────────────────────────────

/// Counter: total queries executed. Labels: command, status.
pub const QUERIES_TOTAL: &str = "tablebook_queries_total";

/// Histogram: query latency in seconds. Labels: command.
pub const QUERY_DURATION_SECONDS: &str = "tablebook_query_duration_seconds";

// ── USE metrics (resource utilization) ──────────────────────────

/// Gauge: active TCP connections.
pub const CONNECTIONS_ACTIVE: &str = "tablebook_connections_active";

/// Counter: total connections accepted.
pub const CONNECTIONS_TOTAL: &str = "tablebook_connections_total";

/// Counter: connections rejected due to limit.
pub const CONNECTIONS_REJECTED_TOTAL: &str = "tablebook_connections_rejected_total";

/// Gauge: restaurants with a loaded ledger.
pub const TENANTS_ACTIVE: &str = "tablebook_tenants_active";

/// Counter: logins refused for an unknown user.
pub const AUTH_FAILURES_TOTAL: &str = "tablebook_auth_failures_total";

/// Install Prometheus metrics exporter on the given port. No-op if port is None.
pub fn init(port: Option<u16>) -> Result<(), metrics_exporter_prometheus::BuildError> {
    let Some(port) = port else { return Ok(()) };
    let addr: SocketAddr = ([0, 0, 0, 0], port).into();
    metrics_exporter_prometheus::PrometheusBuilder::new()
        .with_http_listener(addr)
        .install()?;
    tracing::info!("metrics endpoint: http://0.0.0.0:{port}/metrics");
    Ok(())
}

/// Map a Command variant to a short label for metrics.
pub fn command_label(cmd: &Command) -> &'static str {
    match cmd {
        Command::InsertReservations { .. } => "insert_reservations",
        Command::DeleteReservation { .. } => "delete_reservation",
        Command::SelectReservation { .. } => "select_reservation",
        Command::SelectFreeTables { .. } => "select_free_tables",
        Command::SelectReservationCounts => "select_reservation_counts",
        Command::SelectAvailability { .. } => "select_availability",
    }
}
