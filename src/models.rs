use chrono::NaiveDate;
use serde::Serialize;

#[derive(Debug, Clone)]
pub struct BranchRecord {
    pub salesman: String,
    pub city: String,
    pub branch_status: String,
    pub smart_evaluation: bool,
    pub smart_club: bool,
    pub eval_ratio: f64,
    pub club_ratio: f64,
    pub order_count: u32,
    pub f_days: u32,
    pub revenue: f64,
    pub subscription_rate: Option<f64>,
    pub negative_charge_days: u32,
    pub last_invoice_date: Option<NaiveDate>,
    pub client_tenure_days: Option<f64>,
    /// Derived once at load time; None when the branch never invoiced.
    pub days_since_last_invoice: Option<i64>,
}

#[cfg(test)]
impl BranchRecord {
    pub(crate) fn sample(salesman: &str, city: &str, branch_status: &str) -> Self {
        BranchRecord {
            salesman: salesman.to_string(),
            city: city.to_string(),
            branch_status: branch_status.to_string(),
            smart_evaluation: true,
            smart_club: true,
            eval_ratio: 0.5,
            club_ratio: 0.5,
            order_count: 10,
            f_days: 30,
            revenue: 1000.0,
            subscription_rate: Some(0.8),
            negative_charge_days: 0,
            last_invoice_date: None,
            client_tenure_days: Some(100.0),
            days_since_last_invoice: Some(5),
        }
    }
}

/// One equality constraint per dropdown; None means the "All" sentinel.
#[derive(Debug, Clone, Default)]
pub struct FilterSelection {
    pub salesman: Option<String>,
    pub city: Option<String>,
    pub branch_status: Option<String>,
}

impl FilterSelection {
    pub fn new(
        salesman: Option<String>,
        city: Option<String>,
        branch_status: Option<String>,
    ) -> Self {
        fn normalize(value: Option<String>) -> Option<String> {
            value.filter(|v| v != "All")
        }
        FilterSelection {
            salesman: normalize(salesman),
            city: normalize(city),
            branch_status: normalize(branch_status),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct KpiSummary {
    pub both: usize,
    pub only_eval: usize,
    pub only_club: usize,
    pub eval_low: usize,
    pub club_low: usize,
    pub both_low: usize,
}

impl KpiSummary {
    fn share(&self, count: usize) -> f64 {
        if self.both == 0 {
            0.0
        } else {
            count as f64 / self.both as f64 * 100.0
        }
    }

    pub fn eval_low_share(&self) -> f64 {
        self.share(self.eval_low)
    }

    pub fn club_low_share(&self) -> f64 {
        self.share(self.club_low)
    }

    pub fn both_low_share(&self) -> f64 {
        self.share(self.both_low)
    }
}

/// 2x2 partition of the both-products subset by the deactivation threshold.
#[derive(Debug, Clone, Serialize)]
pub struct DeactivationQuadrant {
    pub only_eval_low: usize,
    pub only_club_low: usize,
    pub both_low: usize,
    pub both_active: usize,
}

impl DeactivationQuadrant {
    pub fn total(&self) -> usize {
        self.only_eval_low + self.only_club_low + self.both_low + self.both_active
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ChartKind {
    Bar,
    Pie,
    Histogram,
}

#[derive(Debug, Clone, Serialize)]
pub struct Annotation {
    pub label: String,
    pub value: String,
}

impl Annotation {
    pub fn new(label: impl Into<String>, value: impl Into<String>) -> Self {
        Annotation {
            label: label.into(),
            value: value.into(),
        }
    }
}

/// Chart-ready dataset handed to the rendering layer, which only draws it.
#[derive(Debug, Clone, Serialize)]
pub struct ChartDataset {
    pub title: String,
    pub kind: ChartKind,
    pub categories: Vec<String>,
    pub values: Vec<f64>,
    pub annotations: Vec<Annotation>,
}

/// Everything the view republishes on a filter change, as one atomic unit.
#[derive(Debug, Clone, Serialize)]
pub struct OutputBundle {
    pub kpis: KpiSummary,
    pub city_low_eval: ChartDataset,
    pub city_low_club: ChartDataset,
    pub salesperson_low: ChartDataset,
    pub deactivation_pie: ChartDataset,
    pub status_low_eval: ChartDataset,
    pub status_low_club: ChartDataset,
    pub orders_per_day_hist: ChartDataset,
    pub revenue_per_day_stats: ChartDataset,
    pub subscription_hist: ChartDataset,
    pub negative_charge_pie: ChartDataset,
    pub no_data_days_pie: ChartDataset,
    pub tenure_hist: ChartDataset,
}

impl OutputBundle {
    pub fn charts(&self) -> [&ChartDataset; 12] {
        [
            &self.city_low_eval,
            &self.city_low_club,
            &self.salesperson_low,
            &self.deactivation_pie,
            &self.status_low_eval,
            &self.status_low_club,
            &self.orders_per_day_hist,
            &self.revenue_per_day_stats,
            &self.subscription_hist,
            &self.negative_charge_pie,
            &self.no_data_days_pie,
            &self.tenure_hist,
        ]
    }
}

/// Dropdown contents for the UI layer: distinct values plus the "All" sentinel.
#[derive(Debug, Clone, Serialize)]
pub struct FilterOptions {
    pub salespeople: Vec<String>,
    pub cities: Vec<String>,
    pub branch_statuses: Vec<String>,
}
