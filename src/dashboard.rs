use std::collections::HashSet;

use crate::charts;
use crate::filter;
use crate::metrics;
use crate::models::{BranchRecord, FilterOptions, FilterSelection, OutputBundle};

/// The whole recompute cycle as a pure function: filter once, then derive
/// every KPI and chart dataset from the same subset. The UI layer swaps in
/// the returned bundle wholesale; nothing is rendered piecemeal.
pub fn render(table: &[BranchRecord], selection: &FilterSelection) -> OutputBundle {
    let rows = filter::apply(table, selection);
    OutputBundle {
        kpis: metrics::kpi_summary(&rows),
        city_low_eval: charts::city_low_eval(&rows),
        city_low_club: charts::city_low_club(&rows),
        salesperson_low: charts::salesperson_low(&rows),
        deactivation_pie: charts::deactivation_pie(&rows),
        status_low_eval: charts::status_low_eval(&rows),
        status_low_club: charts::status_low_club(&rows),
        orders_per_day_hist: charts::orders_per_day_hist(&rows),
        revenue_per_day_stats: charts::revenue_per_day_stats(&rows),
        subscription_hist: charts::subscription_hist(&rows),
        negative_charge_pie: charts::negative_charge_pie(&rows),
        no_data_days_pie: charts::no_data_days_pie(&rows),
        tenure_hist: charts::tenure_hist(&rows),
    }
}

/// Owns the loaded table (read-only after construction) and the current
/// selection. Every selection change runs one synchronous recomputation.
pub struct Dashboard {
    table: Vec<BranchRecord>,
    selection: FilterSelection,
}

impl Dashboard {
    pub fn new(table: Vec<BranchRecord>) -> Self {
        Dashboard {
            table,
            selection: FilterSelection::default(),
        }
    }

    pub fn table(&self) -> &[BranchRecord] {
        &self.table
    }

    pub fn selection(&self) -> &FilterSelection {
        &self.selection
    }

    pub fn set_selection(&mut self, selection: FilterSelection) -> OutputBundle {
        self.selection = selection;
        render(&self.table, &self.selection)
    }

    pub fn filter_options(&self) -> FilterOptions {
        filter_options(&self.table)
    }
}

/// Distinct values in first-seen order, prefixed with the "All" sentinel.
pub fn filter_options(table: &[BranchRecord]) -> FilterOptions {
    fn distinct<'a>(values: impl Iterator<Item = &'a str>) -> Vec<String> {
        let mut seen = HashSet::new();
        let mut options = vec!["All".to_string()];
        for value in values {
            if seen.insert(value) {
                options.push(value.to_string());
            }
        }
        options
    }

    FilterOptions {
        salespeople: distinct(table.iter().map(|r| r.salesman.as_str())),
        cities: distinct(table.iter().map(|r| r.city.as_str())),
        branch_statuses: distinct(table.iter().map(|r| r.branch_status.as_str())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_table() -> Vec<BranchRecord> {
        vec![
            BranchRecord::sample("Avery", "Haifa", "active"),
            BranchRecord::sample("Jules", "Acre", "closed"),
            BranchRecord::sample("Avery", "Haifa", "active"),
        ]
    }

    #[test]
    fn render_produces_twelve_charts() {
        let bundle = render(&sample_table(), &FilterSelection::default());
        assert_eq!(bundle.charts().len(), 12);
    }

    #[test]
    fn selection_change_replaces_whole_bundle() {
        let mut dashboard = Dashboard::new(sample_table());
        let before = dashboard.set_selection(FilterSelection::default());

        let after = dashboard.set_selection(FilterSelection::new(
            Some("Jules".to_string()),
            None,
            None,
        ));

        assert_eq!(before.kpis.both, 3);
        assert_eq!(after.kpis.both, 1);
        assert_eq!(dashboard.selection().salesman.as_deref(), Some("Jules"));
    }

    #[test]
    fn empty_selection_result_still_renders_everything() {
        let bundle = render(
            &sample_table(),
            &FilterSelection::new(Some("Nobody".to_string()), None, None),
        );
        assert_eq!(bundle.kpis.both, 0);
        for chart in bundle.charts() {
            assert!(!chart.categories.is_empty());
        }
    }

    #[test]
    fn options_are_deduplicated_behind_the_all_sentinel() {
        let options = filter_options(&sample_table());
        assert_eq!(options.salespeople, vec!["All", "Avery", "Jules"]);
        assert_eq!(options.cities, vec!["All", "Haifa", "Acre"]);
        assert_eq!(options.branch_statuses, vec!["All", "active", "closed"]);
    }

    #[test]
    fn table_is_untouched_by_recomputation() {
        let mut dashboard = Dashboard::new(sample_table());
        dashboard.set_selection(FilterSelection::new(None, Some("Acre".to_string()), None));
        assert_eq!(dashboard.table().len(), 3);
    }
}
