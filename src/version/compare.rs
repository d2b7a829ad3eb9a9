//! Dotted numeric version ordering
//!
//! This is the single ordering rule used wherever a "latest" version or build
//! is picked. It is purely numeric: each dot-separated segment is read as its
//! leading digits, so pre-release suffixes ("1.0.0-SNAPSHOT", "23w44a") are
//! ordered by their numeric prefix only and a segment without digits counts
//! as `0`.

use std::cmp::Ordering;

use crate::provider::VersionOrder;

/// Numeric value of one version segment: its leading digits, or 0
fn segment_value(segment: &str) -> u64 {
    let digits_end = segment
        .find(|c: char| !c.is_ascii_digit())
        .unwrap_or(segment.len());
    segment[..digits_end].parse().unwrap_or(0)
}

/// Compare two versions for a newest-first ordering.
///
/// Returns `Ordering::Less` when `a` is newer than `b`, so that
/// `slice.sort_by(|a, b| compare_versions(a, b))` sorts descending. Missing
/// segments count as `0`, making "1.20" and "1.20.0" equal.
pub fn compare_versions(a: &str, b: &str) -> Ordering {
    let parts_a: Vec<u64> = a.split('.').map(segment_value).collect();
    let parts_b: Vec<u64> = b.split('.').map(segment_value).collect();

    for i in 0..parts_a.len().max(parts_b.len()) {
        let part_a = parts_a.get(i).copied().unwrap_or(0);
        let part_b = parts_b.get(i).copied().unwrap_or(0);
        match part_b.cmp(&part_a) {
            Ordering::Equal => continue,
            other => return other,
        }
    }

    Ordering::Equal
}

/// Compare `#1234`-style build labels, highest first
pub fn compare_build_numbers(a: &str, b: &str) -> Ordering {
    compare_versions(a.trim_start_matches('#'), b.trim_start_matches('#'))
}

/// Sort versions newest first. The sort is stable, so versions that compare
/// equal keep their relative input order.
pub fn sort_descending(versions: &mut [String]) {
    versions.sort_by(|a, b| compare_versions(a, b));
}

/// Order labels according to a provider's listing policy
pub fn order_labels<T>(items: &mut [T], order: VersionOrder, label: impl Fn(&T) -> &str) {
    match order {
        VersionOrder::Descending => items.sort_by(|a, b| compare_versions(label(a), label(b))),
        VersionOrder::BuildNumber => {
            items.sort_by(|a, b| compare_build_numbers(label(a), label(b)))
        }
        VersionOrder::Upstream => {}
    }
}

/// Newest version in a list, or `None` if the list is empty
pub fn latest(versions: &[String]) -> Option<String> {
    versions
        .iter()
        .min_by(|a, b| compare_versions(a, b))
        .cloned()
}
