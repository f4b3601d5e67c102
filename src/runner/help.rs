//! Help listing for described targets

use crate::runner::Registry;

/// Columns between the longest target name and its description
const GAP: usize = 2;

/// Described targets as `(name, description)`, sorted by name
pub fn render(registry: &Registry) -> Vec<(String, String)> {
    let mut entries: Vec<(String, String)> = registry
        .all()
        .filter_map(|target| {
            target
                .description
                .as_ref()
                .filter(|d| !d.trim().is_empty())
                .map(|d| (target.name.clone(), d.trim().to_string()))
        })
        .collect();
    entries.sort();
    entries
}

/// One line per entry, names padded to a common column
pub fn format_help(entries: &[(String, String)]) -> String {
    let width = entries
        .iter()
        .map(|(name, _)| name.chars().count())
        .max()
        .unwrap_or(0)
        + GAP;

    entries
        .iter()
        .map(|(name, description)| format!("{:<width$}{}\n", name, description, width = width))
        .collect()
}
