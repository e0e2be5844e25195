use chrono::{Local, NaiveDate};
use itertools::iproduct;

use super::address::NormalizedAddress;
use super::record::FilingRecord;
use crate::output::OutputRow;

pub const DEFAULT_DATE_FORMAT: &str = "%m/%d/%Y";

/// Per-run values stamped onto every row.
#[derive(Debug, Clone)]
pub struct RunContext {
    processed: String,
}

impl RunContext {
    pub fn new(date: NaiveDate, format: &str) -> Self {
        Self {
            processed: date.format(format).to_string(),
        }
    }

    pub fn today(format: &str) -> Self {
        Self::new(Local::now().date_naive(), format)
    }

    pub fn processed(&self) -> &str {
        &self.processed
    }
}

/// One row per (debtor, secured party) of a single filing.
pub fn expand(record: &FilingRecord, ctx: &RunContext) -> Vec<OutputRow> {
    let debtors: Vec<(&str, NormalizedAddress)> = record
        .debtors
        .iter()
        .map(|d| (d.name.as_str(), d.normalized_address()))
        .collect();
    let secured: Vec<(&str, NormalizedAddress)> = record
        .secured_parties
        .iter()
        .map(|s| (s.name.as_str(), s.normalized_address()))
        .collect();

    iproduct!(&debtors, &secured)
        .map(|((d_name, d), (s_name, s))| OutputRow {
            filing_number: record.filing_number.clone(),
            debtor_name: d_name.to_string(),
            debtor_street: d.street.clone(),
            debtor_city: d.city.clone(),
            debtor_state: d.state.clone(),
            debtor_zip: d.zip.clone(),
            filing_date: record.filing_date.clone(),
            secured_party_name: s_name.to_string(),
            secured_party_address: s.street.clone(),
            secured_party_city: s.city.clone(),
            secured_party_state: s.state.clone(),
            secured_party_zip: s.zip.clone(),
            lapse_date: record.lapse_date.clone(),
            official_designation: String::new(),
            official_name: String::new(),
            official_address: String::new(),
            processed: ctx.processed.clone(),
        })
        .collect()
}
