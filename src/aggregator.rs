// src/aggregator.rs

use crate::color::{language_color, DEFAULT_LANGUAGE_COLOR};
use crate::model::*;
use std::cmp::Ordering;

/// Merges per-repository byte maps into one language distribution.
///
/// Repositories without an entry in `languages_by_repo` (their fetch failed)
/// contribute an empty map. Totals are accumulated completely before any
/// percentage is computed, so the result does not depend on iteration order.
/// When no bytes were reported at all the result is empty.
pub fn aggregate(repos: &[Repository], languages_by_repo: &LanguagesByRepo) -> LanguageStats {
    let empty = ByteMap::new();
    let mut stats = LanguageStats::new();
    let mut total: u64 = 0;

    // Pass 1: accumulate
    for repo in repos {
        let bytes = languages_by_repo.get(&repo.name).unwrap_or(&empty);
        for (language, &size) in bytes {
            let stat = stats.entry(language.clone()).or_insert_with(|| LanguageStat {
                name: language.clone(),
                color: language_color(language).unwrap_or(DEFAULT_LANGUAGE_COLOR),
                total_bytes: 0,
                percentage: 0.0,
            });
            stat.total_bytes += size;
            total += size;
        }
    }

    if total == 0 {
        if !stats.is_empty() {
            tracing::debug!("{} languages reported zero bytes, dropping them", stats.len());
        }
        return LanguageStats::new();
    }

    // Pass 2: normalize
    for stat in stats.values_mut() {
        stat.percentage = stat.total_bytes as f64 * 100.0 / total as f64;
    }

    stats
}

/// Stats sorted by total bytes, largest first; ties broken by name
pub fn ranked(stats: &LanguageStats) -> Vec<&LanguageStat> {
    let mut sorted: Vec<&LanguageStat> = stats.values().collect();
    sorted.sort_by(|a, b| match b.total_bytes.cmp(&a.total_bytes) {
        Ordering::Equal => a.name.cmp(&b.name),
        other => other,
    });
    sorted
}

/// Headline numbers shown next to a visualization
#[derive(Debug, Clone, PartialEq)]
pub struct ProfileSummary {
    pub repo_count: usize,
    pub total_stars: u64,
    pub top_language: String,
    /// Up to five languages for the legend, largest first
    pub legend: Vec<LanguageStat>,
}

const LEGEND_SIZE: usize = 5;

pub fn summarize(repos: &[Repository], stats: &LanguageStats) -> ProfileSummary {
    let sorted = ranked(stats);
    ProfileSummary {
        repo_count: repos.len(),
        total_stars: repos.iter().map(|r| r.star_count as u64).sum(),
        top_language: sorted.first().map_or_else(|| "None".to_string(), |s| s.name.clone()),
        legend: sorted.into_iter().take(LEGEND_SIZE).cloned().collect(),
    }
}
