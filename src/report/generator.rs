//! Markdown and JSON dashboard reports.
//!
//! The Markdown report has one section per dashboard tab: main analysis,
//! states, and company responses.

use crate::models::{Dashboard, DashboardMetadata, ResponseClass, SampleRow, SummaryTable};
use anyhow::Result;

/// Width of the longest text bar, in characters.
const BAR_WIDTH: usize = 30;

/// Presentation switches for the Markdown report.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MarkdownOptions {
    /// Draw a text bar next to each count.
    pub bars: bool,
}

impl Default for MarkdownOptions {
    fn default() -> Self {
        Self { bars: true }
    }
}

/// Generate a complete Markdown report.
pub fn generate_markdown_report(dashboard: &Dashboard, options: MarkdownOptions) -> String {
    let mut output = String::new();
    let n = dashboard.metadata.top_n;

    output.push_str("# Customer Complaints Dashboard\n\n");
    output.push_str(&generate_metadata_section(&dashboard.metadata));
    output.push_str(&generate_table_of_contents(dashboard));

    // Main analysis
    output.push_str("## Main Analysis\n\n");
    output.push_str(&generate_table_section(
        "Monthly Complaint Volume",
        "Month",
        &dashboard.monthly_volume,
        options,
    ));
    output.push_str(&generate_table_section(
        &format!("Top {} Complained Products", n),
        "Product",
        &dashboard.top_products,
        options,
    ));
    output.push_str(&generate_table_section(
        &format!("Top {} Companies by Complaints", n),
        "Company",
        &dashboard.top_companies,
        options,
    ));
    if !dashboard.sample.is_empty() {
        output.push_str(&generate_sample_section(&dashboard.sample));
    }

    // States
    output.push_str("## States Analysis\n\n");
    output.push_str(&generate_table_section(
        &format!("Top {} States by Complaint Volume", n),
        "State",
        &dashboard.top_states,
        options,
    ));

    // Responses
    output.push_str("## Company Response Analysis\n\n");
    output.push_str(&generate_response_section(&dashboard.responses));

    output.push_str(&generate_footer());

    output
}

/// Generate the metadata section.
fn generate_metadata_section(metadata: &DashboardMetadata) -> String {
    let mut section = String::new();
    let filters = &metadata.filters;

    section.push_str("## Filters\n\n");
    section.push_str(&format!("- **Source:** `{}`\n", metadata.source));
    section.push_str(&format!(
        "- **Generated:** {}\n",
        metadata.generated_at.format("%Y-%m-%d %H:%M:%S UTC")
    ));
    section.push_str(&format!(
        "- **Date Range:** {} to {}\n",
        filters.start, filters.end
    ));
    section.push_str(&format!("- **Product:** {}\n", filters.product));
    section.push_str(&format!("- **Company:** {}\n", filters.company));
    section.push_str(&format!(
        "- **Complaints:** {} of {}\n",
        metadata.filtered_records, metadata.dataset_records
    ));
    section.push('\n');

    section
}

/// Generate the table of contents.
fn generate_table_of_contents(dashboard: &Dashboard) -> String {
    let mut toc = String::new();

    toc.push_str("## Table of Contents\n\n");
    toc.push_str("- [Filters](#filters)\n");
    toc.push_str("- [Main Analysis](#main-analysis)\n");
    if !dashboard.sample.is_empty() {
        toc.push_str("  - [Sample Complaint Records](#sample-complaint-records)\n");
    }
    toc.push_str("- [States Analysis](#states-analysis)\n");
    toc.push_str("- [Company Response Analysis](#company-response-analysis)\n");
    toc.push('\n');

    toc
}

/// Generate a key/count table under a heading.
fn generate_table_section(
    title: &str,
    key_header: &str,
    table: &SummaryTable,
    options: MarkdownOptions,
) -> String {
    let mut section = String::new();

    section.push_str(&format!("### {}\n\n", title));

    if table.is_empty() {
        section.push_str("No complaints match the current filters.\n\n");
        return section;
    }

    let max = table.max_count();
    if options.bars {
        section.push_str(&format!("| {} | Count | |\n", key_header));
        section.push_str("|:---|---:|:---|\n");
    } else {
        section.push_str(&format!("| {} | Count |\n", key_header));
        section.push_str("|:---|---:|\n");
    }

    for row in &table.rows {
        if options.bars {
            section.push_str(&format!(
                "| {} | {} | `{}` |\n",
                escape_cell(&row.key),
                row.count,
                text_bar(row.count, max)
            ));
        } else {
            section.push_str(&format!("| {} | {} |\n", escape_cell(&row.key), row.count));
        }
    }
    section.push('\n');

    section
}

/// Generate the sample records table.
fn generate_sample_section(sample: &[SampleRow]) -> String {
    let mut section = String::new();

    section.push_str("### Sample Complaint Records\n\n");
    section.push_str("| Date received | Product | Company | Issue |\n");
    section.push_str("|:---|:---|:---|:---|\n");

    for row in sample {
        section.push_str(&format!(
            "| {} | {} | {} | {} |\n",
            row.date,
            cell_or_dash(row.product.as_deref()),
            cell_or_dash(row.company.as_deref()),
            cell_or_dash(row.issue.as_deref()),
        ));
    }
    section.push('\n');

    section
}

/// Generate the positive/negative response breakdown.
fn generate_response_section(responses: &SummaryTable) -> String {
    let mut section = String::new();

    section.push_str("### Company Response Types\n\n");

    let total = responses.total();
    if total == 0 {
        section.push_str("No complaints match the current filters.\n\n");
        return section;
    }

    section.push_str("| Response | Count | Share |\n");
    section.push_str("|:---|---:|---:|\n");

    for row in &responses.rows {
        let emoji = match row.key.as_str() {
            "Positive" => ResponseClass::Positive.emoji(),
            _ => ResponseClass::Negative.emoji(),
        };
        let share = row.count as f64 / total as f64 * 100.0;
        section.push_str(&format!(
            "| {} {} | {} | {:.1}% |\n",
            emoji, row.key, row.count, share
        ));
    }
    section.push('\n');

    section
}

/// Generate the report footer.
fn generate_footer() -> String {
    let mut footer = String::new();

    footer.push_str("---\n\n");
    footer.push_str("*Report generated by complaint-lens*\n");

    footer
}

/// A bar of block characters proportional to `count / max`.
fn text_bar(count: usize, max: usize) -> String {
    if max == 0 {
        return String::new();
    }
    // Any non-zero count gets at least one block.
    let width = ((count * BAR_WIDTH) as f64 / max as f64).round() as usize;
    "█".repeat(width.max(usize::from(count > 0)))
}

fn escape_cell(value: &str) -> String {
    value.replace('|', "\\|").replace('\n', " ")
}

fn cell_or_dash(value: Option<&str>) -> String {
    value.map(escape_cell).unwrap_or_else(|| "-".to_string())
}

/// Generate a JSON report.
pub fn generate_json_report(dashboard: &Dashboard) -> Result<String> {
    serde_json::to_string_pretty(dashboard).map_err(Into::into)
}
