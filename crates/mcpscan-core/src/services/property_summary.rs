//! Organization-wide analysis of custom property values.
//!
//! Unlike [`build_report`](super::build_report), nothing here knows what the
//! properties mean: every property name found on any repository gets value
//! counts, and numeric statistics when some of its values parse as numbers.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::domain::RepositoryProperties;

/// Most common values kept per property.
pub const MOST_COMMON_LIMIT: usize = 10;
/// Example repositories kept per common value.
pub const EXAMPLE_REPOSITORIES: usize = 5;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OverallPropertySummary {
    pub total_repositories_analyzed: usize,
    pub repositories_with_properties: usize,
    pub repositories_without_properties: usize,
    pub total_properties_found: usize,
    /// Sorted
    pub unique_property_names: Vec<String>,
    pub property_count: usize,
    pub analysis_timestamp: String,
}

impl OverallPropertySummary {
    /// Percentage of repositories carrying at least one property.
    #[allow(clippy::cast_precision_loss)]
    pub fn coverage(&self) -> f64 {
        if self.total_repositories_analyzed == 0 {
            return 0.0;
        }
        self.repositories_with_properties as f64 / self.total_repositories_analyzed as f64 * 100.0
    }
}

/// One frequent value of a property.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CommonValue {
    pub value: String,
    pub count: usize,
    /// Share of the repositories having the property, one decimal
    pub percentage: f64,
    /// First repositories seen with this value
    pub example_repositories: Vec<String>,
}

impl CommonValue {
    /// Repositories with this value that are not listed as examples.
    pub fn unlisted(&self) -> usize {
        self.count.saturating_sub(self.example_repositories.len())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct NumericStats {
    pub min: f64,
    pub max: f64,
    pub avg: f64,
    pub total: f64,
    pub count_non_zero: usize,
    pub count_zero: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PropertyDetails {
    pub total_repos_with_property: usize,
    pub unique_value_count: usize,
    /// Most frequent first; ties keep first-seen order
    pub most_common_with_examples: Vec<CommonValue>,
    /// Sorted
    pub all_unique_values: Vec<String>,
    /// Present when at least one value is a finite number
    #[serde(skip_serializing_if = "Option::is_none")]
    pub numeric_stats: Option<NumericStats>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PropertySummary {
    pub overall_summary: OverallPropertySummary,
    /// Keyed by property name
    pub property_details: BTreeMap<String, PropertyDetails>,
}

#[derive(Default)]
struct Accumulator {
    repositories: usize,
    /// `(value, repositories)` in first-seen order
    values: Vec<(String, Vec<String>)>,
    numbers: Vec<f64>,
}

impl Accumulator {
    fn add(&mut self, value: &str, repository: &str) {
        self.repositories += 1;
        match self.values.iter_mut().find(|(known, _)| known == value) {
            Some((_, repos)) => repos.push(repository.to_string()),
            None => self
                .values
                .push((value.to_string(), vec![repository.to_string()])),
        }
        if let Some(number) = parse_number(value) {
            self.numbers.push(number);
        }
    }

    #[allow(clippy::cast_precision_loss)]
    fn finish(mut self) -> PropertyDetails {
        let mut all_unique_values: Vec<String> =
            self.values.iter().map(|(value, _)| value.clone()).collect();
        all_unique_values.sort();

        // Stable: equal counts stay in first-seen order
        self.values.sort_by(|a, b| b.1.len().cmp(&a.1.len()));
        let total = self.repositories;
        let most_common_with_examples = self
            .values
            .into_iter()
            .take(MOST_COMMON_LIMIT)
            .map(|(value, mut repos)| {
                let count = repos.len();
                repos.truncate(EXAMPLE_REPOSITORIES);
                CommonValue {
                    value,
                    count,
                    percentage: round1(count as f64 / total as f64 * 100.0),
                    example_repositories: repos,
                }
            })
            .collect();

        PropertyDetails {
            total_repos_with_property: total,
            unique_value_count: all_unique_values.len(),
            most_common_with_examples,
            all_unique_values,
            numeric_stats: numeric_stats(&self.numbers),
        }
    }
}

/// Analyze every property value stored across `repositories`.
pub fn summarize_properties(
    repositories: &[RepositoryProperties],
    now: DateTime<Utc>,
) -> PropertySummary {
    tracing::info!(count = repositories.len(), "Analyzing repository properties");

    let mut accumulators: BTreeMap<String, Accumulator> = BTreeMap::new();
    let mut with_properties = 0;
    let mut total_properties = 0;

    for repo in repositories {
        if repo.properties.is_empty() {
            continue;
        }
        with_properties += 1;
        total_properties += repo.properties.len();

        for (name, value) in &repo.properties {
            accumulators
                .entry(name.clone())
                .or_default()
                .add(value, &repo.repository_full_name);
        }
    }

    let property_details: BTreeMap<String, PropertyDetails> = accumulators
        .into_iter()
        .map(|(name, acc)| (name, acc.finish()))
        .collect();

    PropertySummary {
        overall_summary: OverallPropertySummary {
            total_repositories_analyzed: repositories.len(),
            repositories_with_properties: with_properties,
            repositories_without_properties: repositories.len() - with_properties,
            total_properties_found: total_properties,
            unique_property_names: property_details.keys().cloned().collect(),
            property_count: property_details.len(),
            analysis_timestamp: now.to_rfc3339(),
        },
        property_details,
    }
}

fn parse_number(value: &str) -> Option<f64> {
    value.trim().parse::<f64>().ok().filter(|n| n.is_finite())
}

#[allow(clippy::cast_precision_loss, clippy::float_cmp)]
fn numeric_stats(numbers: &[f64]) -> Option<NumericStats> {
    if numbers.is_empty() {
        return None;
    }
    let total: f64 = numbers.iter().sum();
    let count_zero = numbers.iter().filter(|n| **n == 0.0).count();
    Some(NumericStats {
        min: numbers.iter().copied().fold(f64::INFINITY, f64::min),
        max: numbers.iter().copied().fold(f64::NEG_INFINITY, f64::max),
        avg: total / numbers.len() as f64,
        total,
        count_non_zero: numbers.len() - count_zero,
        count_zero,
    })
}

fn round1(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}
