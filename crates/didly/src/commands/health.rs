//! Health command handler.

use std::time::Duration;

use didly_core::{HealthStatus, Session};

use crate::cli::{GlobalOpts, HealthArgs, OutputFormat};
use crate::error::CliError;
use crate::output;

#[derive(serde::Serialize)]
struct HealthReport<'a> {
    backend: String,
    status: HealthStatus,
    label: &'a str,
    checked_at: String,
}

pub async fn handle(
    session: &Session,
    args: HealthArgs,
    global: &GlobalOpts,
) -> Result<(), CliError> {
    if !args.watch {
        let status = session.check_health().await;
        print_status(session, status, global);
        return if status == HealthStatus::Online {
            Ok(())
        } else {
            Err(CliError::ConnectionFailed {
                reason: format!("health check against {} failed", session.backend_label()),
            })
        };
    }

    let mut ticker = tokio::time::interval(Duration::from_secs(args.interval.max(1)));
    loop {
        tokio::select! {
            _ = ticker.tick() => {
                let status = session.check_health().await;
                print_status(session, status, global);
            }
            _ = tokio::signal::ctrl_c() => {
                tracing::debug!("health watch interrupted");
                return Ok(());
            }
        }
    }
}

fn print_status(session: &Session, status: HealthStatus, global: &GlobalOpts) {
    let now = chrono::Local::now().format("%H:%M:%S").to_string();
    let report = HealthReport {
        backend: session.backend_label(),
        status,
        label: status.label(),
        checked_at: now,
    };
    let color = output::should_color(global.color);
    let out = match global.output {
        OutputFormat::Table => format!(
            "[{}] {} ({})",
            report.checked_at,
            output::health_label(status, color),
            report.backend
        ),
        format => output::render_single(format, &report, |_| String::new(), |r| {
            r.label.to_owned()
        }),
    };
    output::print_output(&out, global.quiet);
}
