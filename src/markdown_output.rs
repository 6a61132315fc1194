//! Markdown report output
//!
//! The long-form analysis report: deduplication effect table, ranked
//! distribution per venue, weekday shares, and regularity notes.

use crate::analyzer::VenueAnalysis;
use crate::dedup::DedupPolicy;
use crate::trends::WEEKDAY_LABELS;
use crate::venues::VenueCatalog;
use chrono::Duration;

/// Markdown report renderer
#[derive(Debug, Clone, Copy)]
pub struct MarkdownReport {
    top: usize,
}

impl MarkdownReport {
    pub fn new(top: usize) -> Self {
        Self { top }
    }

    /// Render the full report for all venues
    pub fn render(
        &self,
        analyses: &[VenueAnalysis],
        catalog: &VenueCatalog,
        interval: Duration,
        policy: DedupPolicy,
    ) -> String {
        let mut out = String::new();

        out.push_str("# Slot release analysis\n\n");
        out.push_str(&format!(
            "Duplicate release signals within {} minutes of an accepted event are \
merged into it (policy: {}).\n\n",
            interval.num_minutes(),
            policy.name()
        ));

        out.push_str("## Deduplication effect\n\n");
        out.push_str("| Venue | Raw signals | Distinct releases | Removed |\n");
        out.push_str("|-------|-------------|-------------------|--------|\n");
        for analysis in analyses {
            out.push_str(&format!(
                "| {} ({}) | {} | {} | {:.1}% |\n",
                catalog.display_name(&analysis.venue_id),
                analysis.venue_id,
                analysis.raw_releases,
                analysis.kept.len(),
                analysis.removal_rate()
            ));
        }
        out.push('\n');

        for analysis in analyses {
            self.render_venue(&mut out, analysis, catalog);
        }

        out
    }

    fn render_venue(&self, out: &mut String, analysis: &VenueAnalysis, catalog: &VenueCatalog) {
        out.push_str(&format!(
            "## {} ({})\n\n",
            catalog.display_name(&analysis.venue_id),
            analysis.venue_id
        ));
        out.push_str(&format!(
            "**Distinct releases in window**: {}\n\n",
            analysis.distribution.total_events
        ));

        out.push_str("| Release window | Count | Share |\n|----------------|-------|-------|\n");
        for ranked in analysis.distribution.ranking.iter().take(self.top) {
            out.push_str(&format!(
                "| {} | {} | {:.1}% |\n",
                ranked.bucket.label(),
                ranked.count,
                ranked.percentage
            ));
        }
        if analysis.distribution.ranking.is_empty() {
            out.push_str("| (none) | 0 | 0.0% |\n");
        }
        out.push('\n');

        if let Some(top) = analysis.distribution.busiest() {
            out.push_str(&format!(
                "**Most frequent release window**: {} ({:.1}%)\n\n",
                top.bucket.label(),
                top.percentage
            ));
        }

        if let Some(zoom) = &analysis.zoom {
            out.push_str(&format!(
                "### Inside {} ({} releases)\n\n",
                zoom.focus.label(),
                zoom.window_events
            ));
            out.push_str("| Minute | Count |\n|--------|-------|\n");
            for (bucket, stat) in zoom
                .distribution
                .buckets
                .iter()
                .filter(|(_, stat)| stat.count > 0)
            {
                out.push_str(&format!("| {} | {} |\n", bucket.label(), stat.count));
            }
            out.push('\n');
        }

        if analysis.weekday.total > 0 {
            out.push_str("### Weekday pattern\n\n");
            out.push_str("| Weekday | Releases | Share |\n|---------|----------|-------|\n");
            for (index, label) in WEEKDAY_LABELS.iter().enumerate() {
                out.push_str(&format!(
                    "| {} | {} | {:.1}% |\n",
                    label,
                    analysis.weekday.counts[index],
                    analysis.weekday.percentage(index)
                ));
            }
            out.push('\n');
        }

        if !analysis.regularity.gaps_days.is_empty() {
            out.push_str("### Regularity\n\n");
            out.push_str(&format!(
                "- Mean gap between release dates: {:.1} days\n",
                analysis.regularity.gap_stats.mean
            ));
            out.push_str(&format!(
                "- Median gap: {:.1} days, most common gap: {} days\n",
                analysis.regularity.gap_stats.median,
                analysis.regularity.gap_stats.mode
            ));
            out.push_str(&format!(
                "- Longest run of consecutive release days: {}\n",
                analysis.regularity.max_consecutive_days
            ));
            for (slot, count) in analysis.regularity.slot_counts.iter().take(3) {
                out.push_str(&format!("- Slot {}: {} releases\n", slot, count));
            }
            out.push('\n');
        }
    }
}
