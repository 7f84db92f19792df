use crate::models::{BranchRecord, FilterSelection};

/// Applies the three optional equality constraints with logical AND.
/// An empty result is a valid table, not an error.
pub fn apply(table: &[BranchRecord], selection: &FilterSelection) -> Vec<BranchRecord> {
    table
        .iter()
        .filter(|row| {
            selection
                .salesman
                .as_ref()
                .map_or(true, |v| &row.salesman == v)
                && selection.city.as_ref().map_or(true, |v| &row.city == v)
                && selection
                    .branch_status
                    .as_ref()
                    .map_or(true, |v| &row.branch_status == v)
        })
        .cloned()
        .collect()
}
