//! Console report.

use std::fmt::Write;

use crate::uptime::Report;

const TIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Render the plain-text uptime report.
pub fn render_text(report: &Report, db_path: &str) -> Result<String, std::fmt::Error> {
    let mut out = String::new();
    write_report(&mut out, report, db_path)?;
    Ok(out)
}

fn write_report(out: &mut String, report: &Report, db_path: &str) -> std::fmt::Result {
    let range = &report.time_range;
    let requests = &report.request_uptime;
    let windows = &report.window_uptime;

    writeln!(out, "Service Uptime Report")?;
    writeln!(out, "Database: {}", db_path)?;
    writeln!(out, "Time Window: {} seconds", windows.window_size_seconds)?;
    writeln!(out, "{}", "=".repeat(50))?;

    writeln!(out, "Data Range:")?;
    writeln!(out, "  Start: {}", range.start.format(TIME_FORMAT))?;
    writeln!(out, "  End:   {}", range.end.format(TIME_FORMAT))?;
    writeln!(out, "  Duration: {:.1} minutes", range.duration_minutes())?;
    writeln!(out, "  Total Requests: {}", range.total)?;
    writeln!(out)?;

    writeln!(out, "Uptime by Requests:")?;
    writeln!(out, "  Successful: {} / {}", requests.successful, requests.total)?;
    writeln!(out, "  Uptime: {:.2}%", requests.percentage)?;
    writeln!(out)?;

    writeln!(out, "Uptime by Time ({}s windows):", windows.window_size_seconds)?;
    writeln!(out, "  Up Windows: {} / {}", windows.up_windows, windows.total_windows)?;
    writeln!(out, "  Uptime: {:.2}%", windows.percentage)?;
    writeln!(out)?;

    if !report.errors.is_empty() {
        writeln!(out, "Error Summary:")?;
        for error in report.errors.iter() {
            writeln!(
                out,
                "  {}: {} requests ({:.2}%)",
                status_label(error.status_code),
                error.count,
                error.percentage_of(requests.total)
            )?;
        }
        writeln!(out)?;
    }

    writeln!(out, "Summary:")?;
    writeln!(out, "  Overall Request Success Rate: {:.2}%", requests.percentage)?;
    writeln!(out, "  Overall Time-based Uptime: {:.2}%", windows.percentage)?;
    Ok(())
}

/// Human label for a status code; 0 means no response was received.
pub fn status_label(status_code: u16) -> String {
    if status_code == crate::uptime::TRANSPORT_FAILURE_STATUS {
        "No response".to_string()
    } else {
        format!("HTTP {}", status_code)
    }
}
