use std::fmt::Write;

use crate::metrics;
use crate::models::BranchRecord;

fn push_stat_line(output: &mut String, label: &str, values: &[f64], unit: &str) {
    match (metrics::mean(values), metrics::median(values)) {
        (Some(avg), Some(med)) => {
            let _ = writeln!(
                output,
                "- {label}: avg {avg:.1}{unit}, median {med:.1}{unit} across {} branches",
                values.len()
            );
        }
        _ => {
            let _ = writeln!(output, "- {label}: no data for this selection");
        }
    }
}

pub fn build_report(scope: Option<&str>, rows: &[BranchRecord]) -> String {
    let kpis = metrics::kpi_summary(rows);
    let quadrant = metrics::deactivation_quadrant(rows);

    let mut output = String::new();
    let scope_label = scope.unwrap_or("all branches");

    let _ = writeln!(output, "# Branch Adoption Report");
    let _ = writeln!(
        output,
        "Generated for {} ({} branches in selection)",
        scope_label,
        rows.len()
    );
    let _ = writeln!(output);
    let _ = writeln!(output, "## Product Adoption");
    let _ = writeln!(output, "- Both Eval & Club: {}", kpis.both);
    let _ = writeln!(output, "- Only Evaluation: {}", kpis.only_eval);
    let _ = writeln!(output, "- Only Club: {}", kpis.only_club);
    let _ = writeln!(
        output,
        "- Low Eval Rate (<=5%): {} ({:.1}%)",
        kpis.eval_low,
        kpis.eval_low_share()
    );
    let _ = writeln!(
        output,
        "- Low Club Rate (<=5%): {} ({:.1}%)",
        kpis.club_low,
        kpis.club_low_share()
    );
    let _ = writeln!(
        output,
        "- Both Rates Low (<=5%): {} ({:.1}%)",
        kpis.both_low,
        kpis.both_low_share()
    );

    let _ = writeln!(output);
    let _ = writeln!(output, "## Deactivation Mix");

    if kpis.both == 0 {
        let _ = writeln!(output, "No branches with both products in this selection.");
    } else {
        let _ = writeln!(output, "- Only Deactive Eval: {}", quadrant.only_eval_low);
        let _ = writeln!(output, "- Only Deactive Club: {}", quadrant.only_club_low);
        let _ = writeln!(output, "- Both Deactive: {}", quadrant.both_low);
        let _ = writeln!(output, "- Both Active: {}", quadrant.both_active);
    }

    let _ = writeln!(output);
    let _ = writeln!(output, "## Cities with Most Deactive Evaluation");

    let cities = metrics::low_eval_by_city(rows);
    if cities.is_empty() {
        let _ = writeln!(output, "No evaluation branches in this selection.");
    } else {
        for (city, count) in cities.iter().take(10) {
            let _ = writeln!(output, "- {city}: {count} deactive branches");
        }
    }

    let _ = writeln!(output);
    let _ = writeln!(output, "## Salespeople with Most Deactivation");

    let salespeople = metrics::combined_low_by_salesman(rows);
    if salespeople.is_empty() {
        let _ = writeln!(output, "No branches with both products in this selection.");
    } else {
        for (salesman, count) in salespeople.iter().take(10) {
            let _ = writeln!(output, "- {salesman}: {count} deactive ratios");
        }
    }

    let _ = writeln!(output);
    let _ = writeln!(output, "## Daily Activity");
    push_stat_line(
        &mut output,
        "Orders per day",
        &metrics::orders_per_day(rows),
        "",
    );
    push_stat_line(
        &mut output,
        "Revenue per day",
        &metrics::revenue_per_day(rows),
        "",
    );

    let _ = writeln!(output);
    let _ = writeln!(output, "## Client Tenure");
    push_stat_line(
        &mut output,
        "Tenure",
        &metrics::tenure_days(rows),
        " days",
    );

    output
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn report_covers_every_section() {
        let rows = vec![
            BranchRecord {
                eval_ratio: 0.03,
                club_ratio: 0.4,
                ..BranchRecord::sample("Avery", "Haifa", "active")
            },
            BranchRecord::sample("Jules", "Acre", "closed"),
        ];

        let report = build_report(Some("Avery"), &rows);
        assert!(report.contains("# Branch Adoption Report"));
        assert!(report.contains("Generated for Avery (2 branches in selection)"));
        assert!(report.contains("- Both Eval & Club: 2"));
        assert!(report.contains("- Haifa: 1 deactive branches"));
        assert!(report.contains("- Avery: 1 deactive ratios"));
        assert!(report.contains("## Client Tenure"));
    }

    #[test]
    fn empty_selection_reports_no_data_lines() {
        let report = build_report(None, &[]);
        assert!(report.contains("Generated for all branches (0 branches in selection)"));
        assert!(report.contains("No branches with both products in this selection."));
        assert!(report.contains("No evaluation branches in this selection."));
        assert!(report.contains("- Orders per day: no data for this selection"));
    }
}
