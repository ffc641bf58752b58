//! Conversion between human readable size strings such as `12.5gb` and byte counts.

use error_stack::{report, Report};
use thiserror::Error;

const KB: f64 = 1024.0;
const MB: f64 = KB * 1024.0;
const GB: f64 = MB * 1024.0;
const TB: f64 = GB * 1024.0;
const PB: f64 = TB * 1024.0;

// Longest suffix first, "b" must not match inside "kb".
const UNITS: &[(&str, f64)] = &[
    ("pb", PB),
    ("tb", TB),
    ("gb", GB),
    ("mb", MB),
    ("kb", KB),
    ("b", 1.0),
];

const FORMAT_UNITS: &[(&str, f64)] = &[("GB", GB), ("MB", MB), ("KB", KB), ("B", 1.0)];

#[derive(Debug, Error)]
#[error("invalid size string")]
pub struct SizeParseError;

/// Parse a size string into bytes, failing on a malformed numeric part.
pub fn try_parse_size(text: &str) -> error_stack::Result<f64, SizeParseError> {
    let normalized = text.trim().to_ascii_lowercase();
    if normalized.is_empty() || normalized == "0" {
        return Ok(0.0);
    }

    let (number, multiplier) = UNITS
        .iter()
        .find_map(|(suffix, multiplier)| {
            normalized
                .strip_suffix(suffix)
                .map(|number| (number, *multiplier))
        })
        .unwrap_or((normalized.as_str(), 1.0));

    let value = number
        .trim()
        .parse::<f64>()
        .map_err(|err| Report::new(SizeParseError).attach_printable(err.to_string()))?;

    if !value.is_finite() || value < 0.0 {
        return Err(report!(SizeParseError).attach_printable("not a non-negative number"));
    }

    Ok(value * multiplier)
}

/// Parse a size string into bytes. A malformed value is logged and counts as zero.
pub fn parse_size(text: &str) -> f64 {
    match try_parse_size(text) {
        Ok(bytes) => bytes,
        Err(report) => {
            tracing::warn!(size = text, "Could not parse size, assuming 0 bytes: {report:?}");
            0.0
        }
    }
}

/// Format bytes with two decimals and the largest fitting unit up to GB, e.g. `1.50KB`.
pub fn format_size(bytes: f64) -> String {
    FORMAT_UNITS
        .iter()
        .find(|(_, divisor)| bytes >= *divisor)
        .map(|(unit, divisor)| format!("{:.2}{unit}", bytes / divisor))
        .unwrap_or_else(|| format!("{bytes:.2}B"))
}
