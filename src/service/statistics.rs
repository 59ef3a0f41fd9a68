use std::collections::BTreeMap;

use crate::domain::models::{Metric, ResourceBreakdown, ResourceStatistics, ResourceTypeTotals};
use crate::domain::probes::ResourceProbe;

const UNITS: [&str; 9] = ["Bytes", "KB", "MB", "GB", "TB", "PB", "EB", "ZB", "YB"];

/// Human-readable, 1024-based size with up to two decimals (`1.5 KB`, `0 Bytes`).
pub fn format_bytes(bytes: u64) -> String {
    if bytes == 0 {
        return "0 Bytes".to_string();
    }

    let mut value = bytes as f64;
    let mut unit = 0;
    while value >= 1024.0 && unit < UNITS.len() - 1 {
        value /= 1024.0;
        unit += 1;
    }

    let formatted = format!("{:.2}", value);
    let trimmed = formatted.trim_end_matches('0').trim_end_matches('.');
    format!("{} {}", trimmed, UNITS[unit])
}

fn format_millis(ms: Option<f64>) -> Metric {
    match ms {
        Some(v) if v.is_finite() => Metric::new(format!("{}ms", v.round() as i64)),
        _ => Metric::not_available(),
    }
}

/// Group captured responses by resource type and total their sizes.
/// Entries without a type land in `other`; zero sizes count but add nothing.
pub fn summarize_resources(probe: &ResourceProbe) -> ResourceStatistics {
    let mut by_type: BTreeMap<String, ResourceTypeTotals> = BTreeMap::new();
    let mut total_size = 0u64;

    for entry in &probe.entries {
        let kind = entry
            .resource_type
            .as_deref()
            .filter(|t| !t.is_empty())
            .unwrap_or("other");
        let totals = by_type.entry(kind.to_string()).or_default();
        totals.count += 1;
        if entry.byte_size > 0 {
            totals.size += entry.byte_size;
            total_size += entry.byte_size;
        }
    }

    ResourceStatistics {
        load_time: format_millis(probe.timing.load_event_end_ms),
        dom_content_loaded: format_millis(probe.timing.dom_content_loaded_ms),
        page_size: format_bytes(probe.document_size),
        total_size: format_bytes(total_size),
        resources: ResourceBreakdown {
            total: probe.entries.len(),
            by_type,
        },
    }
}
