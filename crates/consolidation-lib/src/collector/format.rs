//! Display helpers shared by report renderers

use chrono::{DateTime, Utc};
use k8s_openapi::apimachinery::pkg::apis::meta::v1::Time;

/// Format a utilization percentage, e.g. `85%`
pub fn format_utilization(percent: u64) -> String {
    format!("{}%", percent)
}

/// Format the time since `created` the way kubectl prints AGE
/// (`45s`, `12m`, `3h`, `9d`). Missing timestamps render as `<unknown>`.
pub fn format_age(created: Option<&Time>, now: DateTime<Utc>) -> String {
    let Some(Time(created)) = created else {
        return "<unknown>".to_string();
    };

    let secs = (now - *created).num_seconds().max(0);

    match secs {
        s if s < 60 => format!("{}s", s),
        s if s < 60 * 60 => format!("{}m", s / 60),
        s if s < 24 * 60 * 60 => format!("{}h", s / 3600),
        s => format!("{}d", s / 86_400),
    }
}
