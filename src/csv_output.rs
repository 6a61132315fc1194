//! CSV output format for spreadsheet analysis and machine parsing

use crate::analyzer::VenueAnalysis;
use crate::venues::VenueCatalog;

/// One (venue, bucket) row of the distribution export
#[derive(Debug, Clone)]
pub struct CsvRow {
    pub venue_code: String,
    pub venue_name: String,
    pub bucket_start: String,
    pub bucket_end: String,
    pub count: u64,
    pub percentage: f64,
}

/// CSV output formatter
#[derive(Debug, Default)]
pub struct CsvOutput {
    rows: Vec<CsvRow>,
}

impl CsvOutput {
    pub fn new() -> Self {
        Self::default()
    }

    /// Collect the coarse distribution rows of every venue
    pub fn from_analyses(analyses: &[VenueAnalysis], catalog: &VenueCatalog) -> Self {
        let mut output = Self::new();
        for analysis in analyses {
            let name = catalog.display_name(&analysis.venue_id).to_string();
            for (bucket, stat) in &analysis.distribution.buckets {
                output.add_row(CsvRow {
                    venue_code: analysis.venue_id.clone(),
                    venue_name: name.clone(),
                    bucket_start: bucket.start.format("%H:%M").to_string(),
                    bucket_end: bucket.end.format("%H:%M").to_string(),
                    count: stat.count,
                    percentage: stat.percentage,
                });
            }
        }
        output
    }

    pub fn add_row(&mut self, row: CsvRow) {
        self.rows.push(row);
    }

    fn header() -> &'static str {
        "venue_code,venue_name,bucket_start,bucket_end,count,percentage"
    }

    /// Escape CSV field (handle commas, quotes, newlines)
    fn escape_field(field: &str) -> String {
        if field.contains(',') || field.contains('"') || field.contains('\n') {
            format!("\"{}\"", field.replace('"', "\"\""))
        } else {
            field.to_string()
        }
    }

    /// Render the complete CSV document
    pub fn render(&self) -> String {
        let mut lines = vec![Self::header().to_string()];
        for row in &self.rows {
            lines.push(format!(
                "{},{},{},{},{},{:.4}",
                Self::escape_field(&row.venue_code),
                Self::escape_field(&row.venue_name),
                row.bucket_start,
                row.bucket_end,
                row.count,
                row.percentage
            ));
        }
        lines.join("\n") + "\n"
    }
}
