//! Grouping and statistics over parsed bug documents.
//!
//! Every grouping keeps member keys in read order. Groups within a
//! dimension are ordered by descending count; ties keep the order in
//! which their value first appeared.

use crate::models::{AnalysisEntry, Dimension, Group, Grouping, IssueKey};
use std::collections::HashMap;

/// Group entries by one dimension.
pub fn group_by(entries: &[AnalysisEntry], dimension: Dimension) -> Grouping {
    let mut groups: Vec<Group> = Vec::new();
    let mut index: HashMap<&str, usize> = HashMap::new();

    for entry in entries {
        let value = entry.value_for(dimension);
        let slot = *index.entry(value).or_insert_with(|| {
            groups.push(Group {
                name: value.to_string(),
                count: 0,
                keys: Vec::new(),
            });
            groups.len() - 1
        });

        let group = &mut groups[slot];
        group.count += 1;
        group.keys.push(entry.key.clone());
    }

    // Stable, so ties stay in first-seen order
    groups.sort_by_key(|g| std::cmp::Reverse(g.count));

    Grouping { dimension, groups }
}

/// Group entries by every dimension, in report order.
pub fn group_all(entries: &[AnalysisEntry]) -> Vec<Grouping> {
    Dimension::ALL
        .iter()
        .map(|&dimension| group_by(entries, dimension))
        .collect()
}

/// Keys of entries with neither description nor comments.
pub fn empty_bugs(entries: &[AnalysisEntry]) -> Vec<IssueKey> {
    entries
        .iter()
        .filter(|e| !e.has_content())
        .map(|e| e.key.clone())
        .collect()
}

/// Generate a text summary of one grouping, largest groups first.
pub fn generate_summary_text(grouping: &Grouping) -> String {
    let mut lines = Vec::new();

    lines.push(format!("By {}:", grouping.dimension));
    for group in &grouping.groups {
        lines.push(format!("- {}: {}", group.name, group.count));
    }

    lines.join("\n")
}
