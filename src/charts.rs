use crate::metrics;
use crate::models::{Annotation, BranchRecord, ChartDataset, ChartKind};

const TOP_GROUPS: usize = 10;

// Lower bin edges; each bin is left-inclusive, right-exclusive, last unbounded.
const ORDERS_BIN_EDGES: [f64; 5] = [0.0, 101.0, 201.0, 301.0, 501.0];
const ORDERS_BIN_LABELS: [&str; 5] = ["0-100", "101-200", "201-300", "301-500", "500+"];
const SUBSCRIPTION_BIN_EDGES: [f64; 4] = [0.0, 0.5, 0.7, 0.9];
const SUBSCRIPTION_BIN_LABELS: [&str; 4] = ["0-50%", "50-70%", "70-90%", "90%+"];
const TENURE_BIN_EDGES: [f64; 6] = [0.0, 31.0, 61.0, 91.0, 181.0, 366.0];
const TENURE_BIN_LABELS: [&str; 6] = ["0-30", "31-60", "61-90", "91-180", "181-365", "365+"];
const DAY_BUCKET_LABELS: [&str; 4] = ["0 days", "1-7 days", "8-30 days", "30+ days"];

/// The one empty-input policy every builder applies: a dataset that still
/// renders, with the message as its title and a single labeled slot.
fn placeholder(kind: ChartKind, message: &str) -> ChartDataset {
    let value = if kind == ChartKind::Pie { 1.0 } else { 0.0 };
    ChartDataset {
        title: message.to_string(),
        kind,
        categories: vec!["No Data".to_string()],
        values: vec![value],
        annotations: Vec::new(),
    }
}

fn bar(title: &str, groups: Vec<(String, usize)>, cap: Option<usize>) -> ChartDataset {
    let take = cap.unwrap_or(groups.len());
    let (categories, values) = groups
        .into_iter()
        .take(take)
        .map(|(name, count)| (name, count as f64))
        .unzip();
    ChartDataset {
        title: title.to_string(),
        kind: ChartKind::Bar,
        categories,
        values,
        annotations: Vec::new(),
    }
}

fn bin_counts(values: &[f64], lower_edges: &[f64]) -> Vec<usize> {
    let mut counts = vec![0usize; lower_edges.len()];
    for &value in values {
        for i in (0..lower_edges.len()).rev() {
            if value >= lower_edges[i] {
                counts[i] += 1;
                break;
            }
        }
    }
    counts
}

fn histogram(
    title: &str,
    values: &[f64],
    lower_edges: &[f64],
    labels: &[&str],
    annotations: Vec<Annotation>,
) -> ChartDataset {
    ChartDataset {
        title: title.to_string(),
        kind: ChartKind::Histogram,
        categories: labels.iter().map(|l| l.to_string()).collect(),
        values: bin_counts(values, lower_edges)
            .into_iter()
            .map(|c| c as f64)
            .collect(),
        annotations,
    }
}

fn day_buckets(days: impl Iterator<Item = i64>) -> [usize; 4] {
    let mut counts = [0usize; 4];
    for day in days {
        if day == 0 {
            counts[0] += 1;
        } else if (1..=7).contains(&day) {
            counts[1] += 1;
        } else if (8..=30).contains(&day) {
            counts[2] += 1;
        } else if day > 30 {
            counts[3] += 1;
        }
    }
    counts
}

fn day_bucket_pie(title: &str, counts: [usize; 4]) -> ChartDataset {
    ChartDataset {
        title: title.to_string(),
        kind: ChartKind::Pie,
        categories: DAY_BUCKET_LABELS.iter().map(|l| l.to_string()).collect(),
        values: counts.iter().map(|&c| c as f64).collect(),
        annotations: Vec::new(),
    }
}

fn format_thousands(value: f64) -> String {
    let rounded = value.round() as i64;
    let digits = rounded.unsigned_abs().to_string();
    let mut out = String::new();
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(ch);
    }
    if rounded < 0 {
        format!("-{out}")
    } else {
        out
    }
}

/// Boundary policy: a value equal to a range's upper bound belongs to it.
fn tenure_bin_label(value: f64) -> &'static str {
    if value <= 30.0 {
        "0-30"
    } else if value <= 60.0 {
        "31-60"
    } else if value <= 90.0 {
        "61-90"
    } else if value <= 180.0 {
        "91-180"
    } else if value <= 365.0 {
        "181-365"
    } else {
        "365+"
    }
}

pub fn city_low_eval(rows: &[BranchRecord]) -> ChartDataset {
    let groups = metrics::low_eval_by_city(rows);
    if groups.is_empty() {
        return placeholder(ChartKind::Bar, "No Evaluation Data Available");
    }
    bar(
        "Top 10 Cities with Most Deactive Evaluation (Count)",
        groups,
        Some(TOP_GROUPS),
    )
}

pub fn city_low_club(rows: &[BranchRecord]) -> ChartDataset {
    let groups = metrics::low_club_by_city(rows);
    if groups.is_empty() {
        return placeholder(ChartKind::Bar, "No Club Data Available");
    }
    bar(
        "Top 10 Cities with Most Deactive Club (Count)",
        groups,
        Some(TOP_GROUPS),
    )
}

pub fn salesperson_low(rows: &[BranchRecord]) -> ChartDataset {
    let groups = metrics::combined_low_by_salesman(rows);
    if groups.is_empty() {
        return placeholder(
            ChartKind::Bar,
            "No Data Available for Both Club & Evaluation",
        );
    }
    bar(
        "Salesperson with Most Deactive Club & Evaluation",
        groups,
        Some(TOP_GROUPS),
    )
}

pub fn status_low_eval(rows: &[BranchRecord]) -> ChartDataset {
    let groups = metrics::low_eval_by_status(rows);
    if groups.is_empty() {
        return placeholder(ChartKind::Bar, "No Evaluation Data Available");
    }
    bar("Deactive Evaluation Count by Branch Status", groups, None)
}

pub fn status_low_club(rows: &[BranchRecord]) -> ChartDataset {
    let groups = metrics::low_club_by_status(rows);
    if groups.is_empty() {
        return placeholder(ChartKind::Bar, "No Club Data Available");
    }
    bar("Deactive Club Count by Branch Status", groups, None)
}

pub fn deactivation_pie(rows: &[BranchRecord]) -> ChartDataset {
    let quadrant = metrics::deactivation_quadrant(rows);
    if quadrant.total() == 0 {
        return placeholder(ChartKind::Pie, "No Data Available");
    }
    ChartDataset {
        title: "Deactive Status Distribution".to_string(),
        kind: ChartKind::Pie,
        categories: vec![
            "Only Deactive Eval".to_string(),
            "Only Deactive Club".to_string(),
            "Both Deactive".to_string(),
            "Both Active".to_string(),
        ],
        values: vec![
            quadrant.only_eval_low as f64,
            quadrant.only_club_low as f64,
            quadrant.both_low as f64,
            quadrant.both_active as f64,
        ],
        annotations: Vec::new(),
    }
}

pub fn orders_per_day_hist(rows: &[BranchRecord]) -> ChartDataset {
    let rates = metrics::orders_per_day(rows);
    if rates.is_empty() {
        return placeholder(ChartKind::Histogram, "No Order Data Available");
    }
    let annotations = vec![
        Annotation::new("AVG", format!("{:.1}", metrics::mean(&rates).unwrap_or(0.0))),
        Annotation::new(
            "MEDIAN",
            format!("{:.1}", metrics::median(&rates).unwrap_or(0.0)),
        ),
    ];
    histogram(
        "Orders Per Day Distribution",
        &rates,
        &ORDERS_BIN_EDGES,
        &ORDERS_BIN_LABELS,
        annotations,
    )
}

pub fn revenue_per_day_stats(rows: &[BranchRecord]) -> ChartDataset {
    let rates = metrics::revenue_per_day(rows);
    let stats: Option<[f64; 4]> = match (
        metrics::mean(&rates),
        metrics::percentile(&rates, 0.25),
        metrics::median(&rates),
        metrics::percentile(&rates, 0.75),
    ) {
        (Some(avg), Some(p25), Some(p50), Some(p75)) => Some([avg, p25, p50, p75]),
        _ => None,
    };
    let Some(stats) = stats else {
        return placeholder(ChartKind::Bar, "No Revenue Data Available");
    };

    let labels = [
        "Average",
        "25th Percentile",
        "50th Percentile (Median)",
        "75th Percentile",
    ];
    ChartDataset {
        title: "Revenue Per Day Statistics".to_string(),
        kind: ChartKind::Bar,
        categories: labels.iter().map(|l| l.to_string()).collect(),
        values: stats.to_vec(),
        annotations: labels
            .iter()
            .zip(stats.iter())
            .map(|(label, value)| Annotation::new(*label, format_thousands(*value)))
            .collect(),
    }
}

pub fn subscription_hist(rows: &[BranchRecord]) -> ChartDataset {
    let rates = metrics::subscription_rates(rows);
    if rates.is_empty() {
        return placeholder(ChartKind::Histogram, "No Subscription Data Available");
    }
    let annotations = vec![
        Annotation::new(
            "AVERAGE",
            format!("{:.1}%", metrics::mean(&rates).unwrap_or(0.0) * 100.0),
        ),
        Annotation::new(
            "MEDIAN",
            format!("{:.1}%", metrics::median(&rates).unwrap_or(0.0) * 100.0),
        ),
    ];
    histogram(
        "Subscription Distribution",
        &rates,
        &SUBSCRIPTION_BIN_EDGES,
        &SUBSCRIPTION_BIN_LABELS,
        annotations,
    )
}

pub fn negative_charge_pie(rows: &[BranchRecord]) -> ChartDataset {
    if rows.is_empty() {
        return placeholder(ChartKind::Pie, "No Data Available");
    }
    day_bucket_pie(
        "Negative Charge Days Distribution",
        day_buckets(rows.iter().map(|r| i64::from(r.negative_charge_days))),
    )
}

pub fn no_data_days_pie(rows: &[BranchRecord]) -> ChartDataset {
    if rows.is_empty() {
        return placeholder(ChartKind::Pie, "No Data Available");
    }
    day_bucket_pie(
        "Days with No Data Distribution",
        day_buckets(metrics::days_since_last_invoice(rows).into_iter()),
    )
}

pub fn tenure_hist(rows: &[BranchRecord]) -> ChartDataset {
    let tenures = metrics::tenure_days(rows);
    if tenures.is_empty() {
        return placeholder(ChartKind::Histogram, "No Tenure Data Available");
    }

    let avg = metrics::mean(&tenures).unwrap_or(0.0);
    let med = metrics::median(&tenures).unwrap_or(0.0);
    let p75 = metrics::percentile(&tenures, 0.75).unwrap_or(0.0);
    let annotations = vec![
        Annotation::new("AVERAGE", format!("{avg:.0} days")),
        Annotation::new("MEDIAN", format!("{med:.0} days")),
        Annotation::new("75TH PERCENTILE", format!("{p75:.0} days")),
        Annotation::new("AVERAGE BIN", tenure_bin_label(avg)),
        Annotation::new("MEDIAN BIN", tenure_bin_label(med)),
        Annotation::new("75TH PERCENTILE BIN", tenure_bin_label(p75)),
    ];
    histogram(
        "Client Tenure Days Distribution",
        &tenures,
        &TENURE_BIN_EDGES,
        &TENURE_BIN_LABELS,
        annotations,
    )
}
