//! Tracking snippet rendering.
//!
//! The snippet always registers the catch-all site and records a page view;
//! a second tracker is added only when the location matched a site.

use std::fmt::Write;

use crate::config::SnippetConfig;
use crate::registry::SiteId;

/// Where the analytics endpoint and client script live.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TrackerEndpoint {
    base_url: String,
    tracker_path: String,
    script_path: String,
}

impl TrackerEndpoint {
    /// Build an endpoint from a base URL such as `https://stats.example.com`.
    pub fn new(
        base_url: impl Into<String>,
        tracker_path: impl Into<String>,
        script_path: impl Into<String>,
    ) -> Self {
        let base_url = base_url.into();
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            tracker_path: tracker_path.into(),
            script_path: script_path.into(),
        }
    }

    /// Build an endpoint using the configured paths.
    pub fn from_config(base_url: impl Into<String>, config: &SnippetConfig) -> Self {
        Self::new(base_url, config.tracker_path.as_str(), config.script_path.as_str())
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// URL page views are sent to.
    pub fn tracker_url(&self) -> String {
        format!("{}{}", self.base_url, self.tracker_path)
    }

    /// URL of the client script.
    pub fn script_url(&self) -> String {
        format!("{}{}", self.base_url, self.script_path)
    }
}

/// Render the tracking snippet for a page.
pub fn render(catch_all: SiteId, matched: Option<SiteId>, endpoint: &TrackerEndpoint) -> String {
    let tracker_url = escape_js(&endpoint.tracker_url());
    let script_url = escape_js(&endpoint.script_url());

    let mut out = String::with_capacity(512);
    out.push_str("<script type='text/javascript' defer='defer'>\n");
    out.push_str("    var _paq = _paq || [];\n");
    let _ = writeln!(out, "    _paq.push(['setTrackerUrl', '{}']);", tracker_url);
    let _ = writeln!(out, "    _paq.push(['setSiteId', {}]);", catch_all);
    out.push_str("    _paq.push(['disableCookies']);\n");
    out.push_str("    _paq.push(['enableLinkTracking']);\n");
    out.push_str("    _paq.push(['trackPageView']);\n");
    if let Some(site_id) = matched {
        let _ = writeln!(out, "    _paq.push(['addTracker', '{}', {}]);", tracker_url, site_id);
    }
    out.push_str("</script>\n");
    let _ = writeln!(
        out,
        "<script type='text/javascript' defer='defer' src='{}'></script>",
        script_url
    );
    out
}

/// Escape a value for a single-quoted string inside an inline script.
fn escape_js(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    for c in value.chars() {
        match c {
            '\\' => out.push_str("\\\\"),
            '\'' => out.push_str("\\'"),
            '"' => out.push_str("\\\""),
            '<' => out.push_str("\\x3C"),
            '>' => out.push_str("\\x3E"),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            _ => out.push(c),
        }
    }
    out
}
