use std::io::Read;
use std::path::Path;

use anyhow::Context;
use chrono::NaiveDate;

use crate::models::BranchRecord;

/// Column headers as exported from the source spreadsheet.
#[derive(serde::Deserialize)]
struct RawRow {
    salesman: String,
    city: String,
    #[serde(rename = "BranchStatus")]
    branch_status: String,
    #[serde(rename = "SmartEvaluation")]
    smart_evaluation: u8,
    #[serde(rename = "SmartClub")]
    smart_club: u8,
    eval_ratio: f64,
    #[serde(rename = "Club_ratio")]
    club_ratio: f64,
    #[serde(rename = "orderCount")]
    order_count: u32,
    #[serde(rename = "fDays")]
    f_days: u32,
    revenue: f64,
    #[serde(rename = "subscription")]
    subscription_rate: Option<f64>,
    #[serde(rename = "HowManydayschargeisNegetive")]
    negative_charge_days: u32,
    #[serde(rename = "lastfacture")]
    last_invoice_date: Option<NaiveDate>,
    #[serde(rename = "client_tenure_days")]
    client_tenure_days: Option<f64>,
}

impl RawRow {
    fn into_record(self, today: NaiveDate) -> BranchRecord {
        BranchRecord {
            days_since_last_invoice: self
                .last_invoice_date
                .map(|date| (today - date).num_days()),
            salesman: self.salesman,
            city: self.city,
            branch_status: self.branch_status,
            smart_evaluation: self.smart_evaluation == 1,
            smart_club: self.smart_club == 1,
            eval_ratio: self.eval_ratio,
            club_ratio: self.club_ratio,
            order_count: self.order_count,
            f_days: self.f_days,
            revenue: self.revenue,
            subscription_rate: self.subscription_rate,
            negative_charge_days: self.negative_charge_days,
            last_invoice_date: self.last_invoice_date,
            client_tenure_days: self.client_tenure_days,
        }
    }
}

/// Loads the whole table or fails startup; there is no partial-load recovery.
pub fn load_table(path: &Path, today: NaiveDate) -> anyhow::Result<Vec<BranchRecord>> {
    let file = std::fs::File::open(path)
        .with_context(|| format!("failed to open data source {}", path.display()))?;
    read_table(file, today)
        .with_context(|| format!("failed to load data source {}", path.display()))
}

pub fn read_table(input: impl Read, today: NaiveDate) -> anyhow::Result<Vec<BranchRecord>> {
    let mut reader = csv::Reader::from_reader(input);
    let mut table = Vec::new();

    for (index, result) in reader.deserialize::<RawRow>().enumerate() {
        let raw = result.with_context(|| format!("malformed row {}", index + 1))?;
        table.push(raw.into_record(today));
    }

    Ok(table)
}
