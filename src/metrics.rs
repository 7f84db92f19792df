use std::collections::HashMap;

use crate::models::{BranchRecord, DeactivationQuadrant, KpiSummary};

/// Adoption ratio at or below this is treated as deactivated, everywhere.
pub const DEACTIVATION_THRESHOLD: f64 = 0.05;

pub fn is_low(ratio: f64) -> bool {
    ratio <= DEACTIVATION_THRESHOLD
}

pub fn both_subset(rows: &[BranchRecord]) -> Vec<&BranchRecord> {
    rows.iter()
        .filter(|r| r.smart_evaluation && r.smart_club)
        .collect()
}

pub fn kpi_summary(rows: &[BranchRecord]) -> KpiSummary {
    let both = both_subset(rows);
    KpiSummary {
        both: both.len(),
        only_eval: rows
            .iter()
            .filter(|r| r.smart_evaluation && !r.smart_club)
            .count(),
        only_club: rows
            .iter()
            .filter(|r| r.smart_club && !r.smart_evaluation)
            .count(),
        eval_low: both.iter().filter(|r| is_low(r.eval_ratio)).count(),
        club_low: both.iter().filter(|r| is_low(r.club_ratio)).count(),
        both_low: both
            .iter()
            .filter(|r| is_low(r.eval_ratio) && is_low(r.club_ratio))
            .count(),
    }
}

pub fn deactivation_quadrant(rows: &[BranchRecord]) -> DeactivationQuadrant {
    let both = both_subset(rows);
    DeactivationQuadrant {
        only_eval_low: both
            .iter()
            .filter(|r| is_low(r.eval_ratio) && !is_low(r.club_ratio))
            .count(),
        only_club_low: both
            .iter()
            .filter(|r| !is_low(r.eval_ratio) && is_low(r.club_ratio))
            .count(),
        both_low: both
            .iter()
            .filter(|r| is_low(r.eval_ratio) && is_low(r.club_ratio))
            .count(),
        both_active: both
            .iter()
            .filter(|r| !is_low(r.eval_ratio) && !is_low(r.club_ratio))
            .count(),
    }
}

/// Groups in first-seen row order, then sorts descending by count.
/// The sort is stable, so tied groups keep their original order.
fn grouped_counts(
    rows: &[BranchRecord],
    include: impl Fn(&BranchRecord) -> bool,
    key: impl Fn(&BranchRecord) -> &str,
    weight: impl Fn(&BranchRecord) -> usize,
) -> Vec<(String, usize)> {
    let mut groups: Vec<(String, usize)> = Vec::new();
    let mut index: HashMap<String, usize> = HashMap::new();

    for row in rows.iter().filter(|r| include(r)) {
        let name = key(row);
        let slot = match index.get(name) {
            Some(&i) => i,
            None => {
                index.insert(name.to_string(), groups.len());
                groups.push((name.to_string(), 0));
                groups.len() - 1
            }
        };
        groups[slot].1 += weight(row);
    }

    groups.sort_by(|a, b| b.1.cmp(&a.1));
    groups
}

pub fn low_eval_by_city(rows: &[BranchRecord]) -> Vec<(String, usize)> {
    grouped_counts(
        rows,
        |r| r.smart_evaluation,
        |r| &r.city,
        |r| usize::from(is_low(r.eval_ratio)),
    )
}

pub fn low_club_by_city(rows: &[BranchRecord]) -> Vec<(String, usize)> {
    grouped_counts(
        rows,
        |r| r.smart_club,
        |r| &r.city,
        |r| usize::from(is_low(r.club_ratio)),
    )
}

pub fn low_eval_by_status(rows: &[BranchRecord]) -> Vec<(String, usize)> {
    grouped_counts(
        rows,
        |r| r.smart_evaluation,
        |r| &r.branch_status,
        |r| usize::from(is_low(r.eval_ratio)),
    )
}

pub fn low_club_by_status(rows: &[BranchRecord]) -> Vec<(String, usize)> {
    grouped_counts(
        rows,
        |r| r.smart_club,
        |r| &r.branch_status,
        |r| usize::from(is_low(r.club_ratio)),
    )
}

/// Eval-low plus club-low per salesperson, within the both-products subset.
pub fn combined_low_by_salesman(rows: &[BranchRecord]) -> Vec<(String, usize)> {
    grouped_counts(
        rows,
        |r| r.smart_evaluation && r.smart_club,
        |r| &r.salesman,
        |r| usize::from(is_low(r.eval_ratio)) + usize::from(is_low(r.club_ratio)),
    )
}

/// Rows without orders or without a measured window are excluded, not zeroed.
pub fn orders_per_day(rows: &[BranchRecord]) -> Vec<f64> {
    rows.iter()
        .filter(|r| r.order_count > 0 && r.f_days > 0)
        .map(|r| r.order_count as f64 / r.f_days as f64)
        .collect()
}

pub fn revenue_per_day(rows: &[BranchRecord]) -> Vec<f64> {
    rows.iter()
        .filter(|r| r.revenue > 0.0 && r.f_days > 0)
        .map(|r| r.revenue / r.f_days as f64)
        .collect()
}

/// Zero rates count; only null is excluded.
pub fn subscription_rates(rows: &[BranchRecord]) -> Vec<f64> {
    rows.iter().filter_map(|r| r.subscription_rate).collect()
}

pub fn tenure_days(rows: &[BranchRecord]) -> Vec<f64> {
    rows.iter().filter_map(|r| r.client_tenure_days).collect()
}

pub fn days_since_last_invoice(rows: &[BranchRecord]) -> Vec<i64> {
    rows.iter()
        .filter_map(|r| r.days_since_last_invoice)
        .collect()
}

pub fn mean(values: &[f64]) -> Option<f64> {
    if values.is_empty() {
        return None;
    }
    Some(values.iter().sum::<f64>() / values.len() as f64)
}

pub fn median(values: &[f64]) -> Option<f64> {
    percentile(values, 0.5)
}

/// Linear interpolation between order statistics, as pandas `quantile` does.
pub fn percentile(values: &[f64], p: f64) -> Option<f64> {
    if values.is_empty() {
        return None;
    }
    let mut sorted = values.to_vec();
    sorted.sort_by(|a, b| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal));

    let rank = p.clamp(0.0, 1.0) * (sorted.len() - 1) as f64;
    let lo = rank.floor() as usize;
    let hi = rank.ceil() as usize;
    if lo == hi {
        return Some(sorted[lo]);
    }
    let fraction = rank - lo as f64;
    Some(sorted[lo] + (sorted[hi] - sorted[lo]) * fraction)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn branch(eval: bool, club: bool, eval_ratio: f64, club_ratio: f64) -> BranchRecord {
        BranchRecord {
            smart_evaluation: eval,
            smart_club: club,
            eval_ratio,
            club_ratio,
            ..BranchRecord::sample("Avery", "Haifa", "active")
        }
    }

    #[test]
    fn kpi_counts_match_flag_combinations() {
        let rows = vec![
            branch(true, true, 0.03, 0.10),
            branch(true, false, 0.5, 0.5),
            branch(false, true, 0.5, 0.5),
        ];

        let kpis = kpi_summary(&rows);
        assert_eq!(kpis.both, 1);
        assert_eq!(kpis.only_eval, 1);
        assert_eq!(kpis.only_club, 1);
        assert_eq!(kpis.eval_low, 1);
        assert_eq!(kpis.club_low, 0);
        assert_eq!(kpis.both_low, 0);
    }

    #[test]
    fn flag_counts_never_exceed_table_size() {
        let rows = vec![
            branch(true, true, 0.5, 0.5),
            branch(false, false, 0.5, 0.5),
            branch(true, false, 0.5, 0.5),
        ];
        let kpis = kpi_summary(&rows);
        assert!(kpis.both + kpis.only_eval + kpis.only_club <= rows.len());
    }

    #[test]
    fn shares_are_zero_without_both_subset() {
        let kpis = kpi_summary(&[branch(true, false, 0.01, 0.01)]);
        assert_eq!(kpis.eval_low_share(), 0.0);
        assert_eq!(kpis.club_low_share(), 0.0);
        assert_eq!(kpis.both_low_share(), 0.0);
    }

    #[test]
    fn shares_stay_within_percentage_bounds() {
        let rows = vec![
            branch(true, true, 0.01, 0.01),
            branch(true, true, 0.5, 0.01),
            branch(true, true, 0.5, 0.5),
        ];
        let kpis = kpi_summary(&rows);
        for share in [
            kpis.eval_low_share(),
            kpis.club_low_share(),
            kpis.both_low_share(),
        ] {
            assert!((0.0..=100.0).contains(&share));
        }
    }

    #[test]
    fn quadrant_partitions_both_subset_exactly() {
        let rows = vec![
            branch(true, true, 0.03, 0.10),
            branch(true, true, 0.10, 0.03),
            branch(true, true, 0.03, 0.03),
            branch(true, true, 0.10, 0.10),
            branch(true, false, 0.01, 0.01),
        ];

        let quadrant = deactivation_quadrant(&rows);
        assert_eq!(quadrant.only_eval_low, 1);
        assert_eq!(quadrant.only_club_low, 1);
        assert_eq!(quadrant.both_low, 1);
        assert_eq!(quadrant.both_active, 1);
        assert_eq!(quadrant.total(), kpi_summary(&rows).both);
    }

    #[test]
    fn threshold_boundary_counts_as_low() {
        let rows = vec![branch(true, true, 0.05, 0.0500001)];
        let kpis = kpi_summary(&rows);
        assert_eq!(kpis.eval_low, 1);
        assert_eq!(kpis.club_low, 0);
    }

    #[test]
    fn city_grouping_sorts_descending_with_stable_ties() {
        let mut rows = Vec::new();
        for city in ["Acre", "Haifa", "Haifa", "Jaffa"] {
            rows.push(BranchRecord {
                eval_ratio: 0.01,
                ..BranchRecord::sample("Avery", city, "active")
            });
        }

        let grouped = low_eval_by_city(&rows);
        assert_eq!(grouped[0], ("Haifa".to_string(), 2));
        // Acre and Jaffa tie at 1; first-seen order wins.
        assert_eq!(grouped[1].0, "Acre");
        assert_eq!(grouped[2].0, "Jaffa");
    }

    #[test]
    fn city_grouping_keeps_zero_count_groups() {
        let rows = vec![BranchRecord {
            eval_ratio: 0.9,
            ..BranchRecord::sample("Avery", "Haifa", "active")
        }];
        assert_eq!(low_eval_by_city(&rows), vec![("Haifa".to_string(), 0)]);
    }

    #[test]
    fn salesman_grouping_sums_both_ratios() {
        let rows = vec![
            BranchRecord {
                eval_ratio: 0.01,
                club_ratio: 0.01,
                ..BranchRecord::sample("Avery", "Haifa", "active")
            },
            BranchRecord {
                eval_ratio: 0.01,
                club_ratio: 0.5,
                ..BranchRecord::sample("Jules", "Haifa", "active")
            },
        ];

        let grouped = combined_low_by_salesman(&rows);
        assert_eq!(grouped[0], ("Avery".to_string(), 2));
        assert_eq!(grouped[1], ("Jules".to_string(), 1));
    }

    #[test]
    fn per_day_rates_exclude_guarded_rows() {
        let rows = vec![
            BranchRecord {
                order_count: 60,
                f_days: 30,
                revenue: 3000.0,
                ..BranchRecord::sample("Avery", "Haifa", "active")
            },
            BranchRecord {
                order_count: 0,
                f_days: 30,
                revenue: 0.0,
                ..BranchRecord::sample("Avery", "Haifa", "active")
            },
            BranchRecord {
                order_count: 10,
                f_days: 0,
                revenue: 500.0,
                ..BranchRecord::sample("Avery", "Haifa", "active")
            },
        ];

        assert_eq!(orders_per_day(&rows), vec![2.0]);
        assert_eq!(revenue_per_day(&rows), vec![100.0]);
    }

    #[test]
    fn subscription_keeps_zero_and_drops_null() {
        let rows = vec![
            BranchRecord {
                subscription_rate: Some(0.0),
                ..BranchRecord::sample("Avery", "Haifa", "active")
            },
            BranchRecord {
                subscription_rate: None,
                ..BranchRecord::sample("Avery", "Haifa", "active")
            },
        ];
        assert_eq!(subscription_rates(&rows), vec![0.0]);
    }

    #[test]
    fn percentiles_interpolate_linearly() {
        let values = vec![1.0, 2.0, 3.0, 4.0];
        assert_eq!(mean(&values), Some(2.5));
        assert_eq!(median(&values), Some(2.5));
        assert_eq!(percentile(&values, 0.25), Some(1.75));
        assert_eq!(percentile(&values, 0.75), Some(3.25));
    }

    #[test]
    fn statistics_are_none_on_empty_input() {
        assert_eq!(mean(&[]), None);
        assert_eq!(median(&[]), None);
        assert_eq!(percentile(&[], 0.75), None);
    }
}
