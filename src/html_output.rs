//! HTML output format for per-venue release reports
//!
//! One self-contained page per venue with embedded CSS: the daily release
//! time table, the ranked business-hours distribution, and the zoom table
//! when a fine pass ran.

use crate::analyzer::VenueAnalysis;
use crate::trends::WEEKDAY_LABELS;
use crate::venues::VenueCatalog;
use chrono::Datelike;

/// HTML report renderer
#[derive(Debug, Clone, Copy)]
pub struct HtmlReport {
    /// Ranking rows shown in the distribution table
    top: usize,
}

impl HtmlReport {
    pub fn new(top: usize) -> Self {
        Self { top }
    }

    /// Escape HTML special characters to prevent XSS
    fn escape_html(text: &str) -> String {
        text.replace('&', "&amp;")
            .replace('<', "&lt;")
            .replace('>', "&gt;")
            .replace('"', "&quot;")
            .replace('\'', "&#39;")
    }

    /// Generate embedded CSS styles
    fn generate_styles(color: &str) -> String {
        format!(
            r#"
        * {{
            margin: 0;
            padding: 0;
            box-sizing: border-box;
        }}
        body {{
            font-family: 'Segoe UI', Tahoma, Geneva, Verdana, sans-serif;
            background: white;
            padding: 20px;
            color: #333;
        }}
        .container {{
            max-width: 1000px;
            margin: 0 auto;
            border-radius: 20px;
            box-shadow: 0 20px 40px rgba(0,0,0,0.1);
            overflow: hidden;
        }}
        .header {{
            background: #667eea;
            color: white;
            padding: 40px;
            text-align: center;
        }}
        .header h1 {{
            font-size: 2.5em;
            margin-bottom: 10px;
        }}
        .header p {{
            font-size: 1.1em;
            opacity: 0.9;
        }}
        .content {{
            padding: 40px;
        }}
        .summary-table {{
            width: 100%;
            border-collapse: collapse;
            margin: 20px 0;
            border-radius: 10px;
            overflow: hidden;
            box-shadow: 0 5px 15px rgba(0,0,0,0.1);
        }}
        .summary-table th, .summary-table td {{
            padding: 12px 15px;
            text-align: left;
            border-bottom: 1px solid #eee;
        }}
        .summary-table th {{
            background: #667eea;
            color: white;
            font-weight: 600;
        }}
        .summary-table tr:hover {{
            background: #f8f9fa;
        }}
        .time-list {{
            display: flex;
            flex-wrap: wrap;
            gap: 8px;
        }}
        .time-tag {{
            background: {color};
            color: white;
            padding: 6px 12px;
            border-radius: 15px;
            font-size: 0.9em;
            font-weight: 700;
        }}
        .date-cell {{
            font-weight: 600;
            color: #667eea;
        }}
        .footer {{
            margin-top: 20px;
            font-size: 0.8em;
            color: #888;
            text-align: center;
        }}
        "#
        )
    }

    fn daily_rows(analysis: &VenueAnalysis) -> String {
        let mut rows = String::new();
        for (date, times) in &analysis.daily_times {
            let weekday = WEEKDAY_LABELS[date.weekday().num_days_from_monday() as usize];
            let tags: String = times
                .iter()
                .map(|time| format!(r#"<span class="time-tag">{}</span>"#, time.format("%H:%M")))
                .collect();
            rows.push_str(&format!(
                r#"<tr><td class="date-cell">{} ({})</td><td><div class="time-list">{}</div></td></tr>
"#,
                date.format("%Y-%m-%d"),
                weekday,
                tags
            ));
        }
        rows
    }

    fn distribution_rows(&self, analysis: &VenueAnalysis) -> String {
        let mut rows = String::new();
        for ranked in analysis.distribution.ranking.iter().take(self.top) {
            rows.push_str(&format!(
                "<tr><td>{}</td><td>{}</td><td>{:.1}%</td></tr>\n",
                ranked.bucket.label(),
                ranked.count,
                ranked.percentage
            ));
        }
        rows
    }

    fn zoom_section(analysis: &VenueAnalysis) -> String {
        let Some(zoom) = &analysis.zoom else {
            return String::new();
        };
        let mut rows = String::new();
        for (bucket, stat) in zoom
            .distribution
            .buckets
            .iter()
            .filter(|(_, stat)| stat.count > 0)
        {
            rows.push_str(&format!(
                "<tr><td>{}</td><td>{}</td><td>{:.1}%</td></tr>\n",
                bucket.label(),
                stat.count,
                stat.percentage
            ));
        }
        format!(
            r#"<h2>Busiest window in detail: {} ({} releases)</h2>
<table class="summary-table">
<thead><tr><th>Minute</th><th>Releases</th><th>Share</th></tr></thead>
<tbody>
{}</tbody>
</table>
"#,
            zoom.focus.label(),
            zoom.window_events,
            rows
        )
    }

    /// Render the full page for one venue
    pub fn render(&self, analysis: &VenueAnalysis, catalog: &VenueCatalog) -> String {
        let name = Self::escape_html(catalog.display_name(&analysis.venue_id));
        let code = Self::escape_html(&analysis.venue_id);
        let color = catalog.color(&analysis.venue_id);

        format!(
            r#"<!DOCTYPE html>
<html lang="en">
<head>
<meta charset="UTF-8">
<meta name="viewport" content="width=device-width, initial-scale=1.0">
<title>{name} - slot release analysis</title>
<style>{styles}</style>
</head>
<body>
<div class="container">
<div class="header">
<h1>{name}</h1>
<p>{code} &middot; slot release times</p>
<p>{kept} distinct releases from {raw} signals ({rate:.1}% merged)</p>
</div>
<div class="content">
<h2>Release time distribution ({window_total} releases in window)</h2>
<table class="summary-table">
<thead><tr><th>Window</th><th>Releases</th><th>Share</th></tr></thead>
<tbody>
{distribution}</tbody>
</table>
{zoom}<h2>Releases by date</h2>
<table class="summary-table">
<thead><tr><th>Date</th><th>Release times</th></tr></thead>
<tbody>
{daily}</tbody>
</table>
<p class="footer">generated by slotdist {version}</p>
</div>
</div>
</body>
</html>
"#,
            name = name,
            code = code,
            styles = Self::generate_styles(color),
            kept = analysis.kept.len(),
            raw = analysis.raw_releases,
            rate = analysis.removal_rate(),
            window_total = analysis.distribution.total_events,
            distribution = self.distribution_rows(analysis),
            zoom = Self::zoom_section(analysis),
            daily = Self::daily_rows(analysis),
            version = env!("CARGO_PKG_VERSION"),
        )
    }

    /// File name for a venue page, safe for the filesystem
    pub fn file_name(analysis: &VenueAnalysis, catalog: &VenueCatalog) -> String {
        let name = catalog.display_name(&analysis.venue_id);
        let safe: String = name
            .chars()
            .map(|c| {
                if c.is_alphanumeric() {
                    c
                } else {
                    '-'
                }
            })
            .collect();
        format!("{}_{}_report.html", analysis.venue_id, safe)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analyzer::{analyze_venue, AnalyzerConfig};
    use crate::event::ReleaseEvent;
    use chrono::{Duration, NaiveDate};

    fn analysis(zoom: bool) -> VenueAnalysis {
        let events = [
            ReleaseEvent {
                venue_id: "C060".to_string(),
                observed_at: NaiveDate::from_ymd_opt(2025, 6, 1)
                    .unwrap()
                    .and_hms_opt(11, 2, 0)
                    .unwrap(),
                slot_label: "slot".to_string(),
            },
            ReleaseEvent {
                venue_id: "C060".to_string(),
                observed_at: NaiveDate::from_ymd_opt(2025, 6, 2)
                    .unwrap()
                    .and_hms_opt(13, 30, 0)
                    .unwrap(),
                slot_label: "slot".to_string(),
            },
        ];
        let config = AnalyzerConfig {
            zoom_width: zoom.then(|| Duration::minutes(1)),
            ..AnalyzerConfig::default()
        };
        analyze_venue("C060", &events, &config).unwrap()
    }

    #[test]
    fn test_page_contains_sections() {
        let page = HtmlReport::new(10).render(&analysis(false), &VenueCatalog::default());
        assert!(page.contains("<!DOCTYPE html>"));
        assert!(page.contains("Release time distribution"));
        assert!(page.contains("Releases by date"));
        assert!(page.contains("11:00~11:15"));
        assert!(page.contains("2025-06-01 (Sun)"));
        assert!(!page.contains("Busiest window in detail"));
    }

    #[test]
    fn test_zoom_section_rendered_when_present() {
        let page = HtmlReport::new(10).render(&analysis(true), &VenueCatalog::default());
        assert!(page.contains("Busiest window in detail"));
    }

    #[test]
    fn test_catalog_color_is_embedded() {
        let catalog: VenueCatalog =
            toml::from_str("[venues.C060]\nname = \"Ireland Live Music\"\ncolor = \"#ff6b6b\"\n")
                .unwrap();
        let page = HtmlReport::new(10).render(&analysis(false), &catalog);
        assert!(page.contains("#ff6b6b"));
        assert!(page.contains("<h1>Ireland Live Music</h1>"));
    }

    #[test]
    fn test_escape_html() {
        assert_eq!(
            HtmlReport::escape_html("<b>\"a\" & 'b'</b>"),
            "&lt;b&gt;&quot;a&quot; &amp; &#39;b&#39;&lt;/b&gt;"
        );
    }

    #[test]
    fn test_display_name_is_escaped() {
        let catalog: VenueCatalog =
            toml::from_str("[venues.C060]\nname = \"<script>alert(1)</script>\"\n").unwrap();
        let page = HtmlReport::new(10).render(&analysis(false), &catalog);
        assert!(!page.contains("<script>alert(1)</script>"));
        assert!(page.contains("&lt;script&gt;"));
    }

    #[test]
    fn test_file_name_is_sanitized() {
        let catalog: VenueCatalog =
            toml::from_str("[venues.C060]\nname = \"Ireland Live/Music (2025)\"\n").unwrap();
        let name = HtmlReport::file_name(&analysis(false), &catalog);
        assert_eq!(name, "C060_Ireland-Live-Music--2025-_report.html");
    }

    #[test]
    fn test_time_tags_present_per_release() {
        let page = HtmlReport::new(10).render(&analysis(false), &VenueCatalog::default());
        assert_eq!(page.matches("time-tag\">").count(), 2);
    }
}
