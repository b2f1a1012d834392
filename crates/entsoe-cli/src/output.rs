use std::io::{self, Write};

use entsoe_core::{Normalized, RequestWindow};
use serde::Serialize;

use crate::error::CliError;

#[derive(Serialize)]
struct DryRunReport<'a> {
    period_start: &'a str,
    period_end: &'a str,
    count: usize,
    #[serde(flatten)]
    normalized: &'a Normalized,
}

/// Print a dry run to stdout, as text or JSON.
pub fn render(window: &RequestWindow, normalized: &Normalized, json: bool) -> Result<(), CliError> {
    let stdout = io::stdout();
    let mut out = stdout.lock();
    if json {
        render_json(&mut out, window, normalized)
    } else {
        render_text(&mut out, window, normalized)
    }
}

fn render_text(
    out: &mut impl Write,
    window: &RequestWindow,
    normalized: &Normalized,
) -> Result<(), CliError> {
    writeln!(
        out,
        "Dry run for {}..{}: parsed {} price point(s); nothing was stored.",
        window.start(),
        window.end(),
        normalized.len()
    )?;
    for fallback in &normalized.fallbacks {
        writeln!(
            out,
            "warning: unknown resolution '{}' in series {} period {}, defaulting to 1h",
            fallback.code, fallback.series_index, fallback.period_index
        )?;
    }
    for point in &normalized.points {
        writeln!(out, "{} -> {:.2} c/kWh", point.time, point.price)?;
    }
    Ok(())
}

fn render_json(
    out: &mut impl Write,
    window: &RequestWindow,
    normalized: &Normalized,
) -> Result<(), CliError> {
    let report = DryRunReport {
        period_start: window.start(),
        period_end: window.end(),
        count: normalized.len(),
        normalized,
    };
    serde_json::to_writer_pretty(&mut *out, &report)?;
    writeln!(out)?;
    Ok(())
}
