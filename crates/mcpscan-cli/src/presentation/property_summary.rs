//! Property value summary rendering.

use std::fmt;

use mcpscan_core::PropertySummary;
use mcpscan_core::services::PropertyDetails;

use super::markdown::table_row;

/// Properties with at most this many distinct values list all of them.
const LIST_ALL_VALUES_UP_TO: usize = 20;

/// The markdown property summary written next to the JSON summary.
pub fn property_summary_markdown(org: &str, summary: &PropertySummary) -> String {
    PropertySummaryMarkdown { org, summary }.to_string()
}

struct PropertySummaryMarkdown<'a> {
    org: &'a str,
    summary: &'a PropertySummary,
}

impl fmt::Display for PropertySummaryMarkdown<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let overall = &self.summary.overall_summary;
        writeln!(f, "# Repository Property Summary - {}\n", self.org)?;
        writeln!(f, "*Generated: {}*\n", overall.analysis_timestamp)?;

        f.write_str("## Overall Summary\n\n")?;
        writeln!(
            f,
            "- **Total repositories analyzed:** {}",
            overall.total_repositories_analyzed
        )?;
        writeln!(
            f,
            "- **Repositories with properties:** {}",
            overall.repositories_with_properties
        )?;
        writeln!(
            f,
            "- **Repositories without properties:** {}",
            overall.repositories_without_properties
        )?;
        writeln!(f, "- **Total properties found:** {}", overall.total_properties_found)?;
        writeln!(f, "- **Unique property names:** {}", overall.property_count)?;
        writeln!(f, "- **Property coverage:** {:.1}%\n", overall.coverage())?;

        f.write_str("## Property Names\n\n")?;
        for (i, name) in overall.unique_property_names.iter().enumerate() {
            writeln!(f, "{}. `{name}`", i + 1)?;
        }

        for (name, details) in &self.summary.property_details {
            writeln!(f)?;
            write_property(f, name, details)?;
        }
        Ok(())
    }
}

fn write_property(f: &mut fmt::Formatter<'_>, name: &str, details: &PropertyDetails) -> fmt::Result {
    writeln!(f, "## {name}\n")?;
    writeln!(
        f,
        "- Repositories with this property: {}",
        details.total_repos_with_property
    )?;
    writeln!(f, "- Unique values: {}", details.unique_value_count)?;

    if let Some(stats) = &details.numeric_stats {
        f.write_str("\n**Numeric statistics**\n\n")?;
        writeln!(f, "- Total: {:.1}", stats.total)?;
        writeln!(f, "- Average: {:.2}", stats.avg)?;
        writeln!(f, "- Min: {:.1}", stats.min)?;
        writeln!(f, "- Max: {:.1}", stats.max)?;
        writeln!(f, "- Non-zero values: {}", stats.count_non_zero)?;
        writeln!(f, "- Zero values: {}", stats.count_zero)?;
    }

    f.write_str("\n| Value | Repositories | Share | Examples |\n")?;
    f.write_str("|-------|--------------|-------|----------|\n")?;
    for common in &details.most_common_with_examples {
        let mut examples = common.example_repositories.join(", ");
        if common.unlisted() > 0 {
            examples.push_str(&format!(" (and {} others)", common.unlisted()));
        }
        writeln!(
            f,
            "{}",
            table_row(&[
                format!("`{}`", common.value.replace('|', "\\|")),
                common.count.to_string(),
                format!("{:.1}%", common.percentage),
                examples,
            ])
        )?;
    }

    if details.unique_value_count <= LIST_ALL_VALUES_UP_TO {
        let values: Vec<String> = details
            .all_unique_values
            .iter()
            .map(|value| format!("`{value}`"))
            .collect();
        writeln!(f, "\nAll unique values: {}", values.join(", "))?;
    }
    Ok(())
}
