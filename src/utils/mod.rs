use url::Url;

/// Format duration in human-readable format
pub fn format_duration(seconds: f64) -> String {
    let total_seconds = seconds.max(0.0).round() as u64;
    let hours = total_seconds / 3600;
    let minutes = (total_seconds % 3600) / 60;
    let secs = total_seconds % 60;

    if hours > 0 {
        format!("{}h {}m {}s", hours, minutes, secs)
    } else if minutes > 0 {
        format!("{}m {}s", minutes, secs)
    } else {
        format!("{}s", secs)
    }
}

/// Extract domain from URL for display purposes
pub fn extract_domain(url: &str) -> Option<String> {
    Url::parse(url).ok()?.host_str().map(|host| {
        host.strip_prefix("www.")
            .unwrap_or(host)
            .to_string()
    })
}

/// Whether a URL list entry looks like an http(s) URL. Other entries are still handed
/// to the extractor, which also understands bare IDs and search prefixes.
pub fn is_web_url(entry: &str) -> bool {
    Url::parse(entry)
        .map(|url| matches!(url.scheme(), "http" | "https"))
        .unwrap_or(false)
}
