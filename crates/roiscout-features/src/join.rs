//! Left join of census tables onto the SEIFA suburb list.

use std::collections::HashMap;

use roiscout_common::{Column, FeatureTable, Result};
use serde::Serialize;
use tracing::{debug, info};

/// Match counts for one joined table.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct JoinStats {
    pub label: String,
    pub matched: usize,
    pub unmatched: usize,
}

/// Left-join `right` onto `left` by suburb code.
///
/// Every row of `left` is kept in order. Rows without a match get missing
/// values in every joined column. When `right` repeats a code the first
/// occurrence wins. A column name already present on the left is suffixed
/// with `_{label}`.
pub fn left_join(left: &FeatureTable, right: &FeatureTable, label: &str) -> Result<(FeatureTable, JoinStats)> {
    let mut index: HashMap<&str, usize> = HashMap::with_capacity(right.len());
    for (row, code) in right.codes().iter().enumerate() {
        index.entry(code.as_str()).or_insert(row);
    }

    let lookup: Vec<Option<usize>> = left
        .codes()
        .iter()
        .map(|code| index.get(code.as_str()).copied())
        .collect();
    let matched = lookup.iter().filter(|m| m.is_some()).count();

    let mut out = left.clone();
    for name in right.column_names() {
        let source = right.column(name).unwrap_or_default();
        let joined: Column = lookup
            .iter()
            .map(|m| m.and_then(|r| source[r]))
            .collect();
        let target = if out.has_column(name) {
            debug!("{}: column '{}' already present, suffixing", label, name);
            format!("{}_{}", name, label)
        } else {
            name.clone()
        };
        out.insert_column(target, joined)?;
    }

    let stats = JoinStats {
        label: label.to_string(),
        matched,
        unmatched: left.len() - matched,
    };
    info!(
        "Joined {}: {} matched, {} unmatched of {} suburbs",
        label,
        stats.matched,
        stats.unmatched,
        left.len()
    );
    Ok((out, stats))
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn table(codes: &[&str], col: &str, values: &[Option<f64>]) -> FeatureTable {
        let mut t = FeatureTable::new(
            codes.iter().map(|c| c.to_string()).collect(),
            vec![None; codes.len()],
        )
        .unwrap();
        t.insert_column(col, values.to_vec()).unwrap();
        t
    }

    #[test]
    fn test_left_join_keeps_all_left_rows() {
        let left = table(&["1", "2", "3"], "a", &[Some(1.0), Some(2.0), Some(3.0)]);
        let right = table(&["3", "1", "9"], "b", &[Some(30.0), Some(10.0), Some(90.0)]);
        let (joined, stats) = left_join(&left, &right, "G02").unwrap();
        assert_eq!(joined.len(), 3);
        assert_eq!(joined.column("b").unwrap(), &[Some(10.0), None, Some(30.0)]);
        assert_eq!(stats, JoinStats { label: "G02".into(), matched: 2, unmatched: 1 });
    }

    #[test]
    fn test_duplicate_right_code_first_wins() {
        let left = table(&["1"], "a", &[Some(1.0)]);
        let right = table(&["1", "1"], "b", &[Some(5.0), Some(6.0)]);
        let (joined, _) = left_join(&left, &right, "G01").unwrap();
        assert_eq!(joined.column("b").unwrap(), &[Some(5.0)]);
    }

    #[test]
    fn test_colliding_column_is_suffixed() {
        let left = table(&["1"], "a", &[Some(1.0)]);
        let right = table(&["1"], "a", &[Some(2.0)]);
        let (joined, _) = left_join(&left, &right, "G02").unwrap();
        assert_eq!(joined.column("a").unwrap(), &[Some(1.0)]);
        assert_eq!(joined.column("a_G02").unwrap(), &[Some(2.0)]);
    }
}
