use std::io::Write;

use csv::Writer;
use tracing::{debug, info};

use crate::error::Result;

pub const OUTPUT_COLUMNS: [&str; 17] = [
    "filing_number",
    "debtor_name",
    "Debtor_Street",
    "Debtor_City",
    "Debtor_State",
    "Debtor_Zip",
    "filing_date",
    "secured_party_name",
    "secured_party_address",
    "secured_party_city",
    "secured_party_state",
    "secured_party_zip",
    "lapse_date",
    "official_designation",
    "official_name",
    "official_address",
    "Processed",
];

/// One (debtor, secured party) relationship within a filing.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OutputRow {
    pub filing_number: String,
    pub debtor_name: String,
    pub debtor_street: String,
    pub debtor_city: String,
    pub debtor_state: String,
    pub debtor_zip: String,
    pub filing_date: String,
    pub secured_party_name: String,
    pub secured_party_address: String,
    pub secured_party_city: String,
    pub secured_party_state: String,
    pub secured_party_zip: String,
    pub lapse_date: String,
    pub official_designation: String,
    pub official_name: String,
    pub official_address: String,
    pub processed: String,
}

impl OutputRow {
    /// Values in `OUTPUT_COLUMNS` order.
    pub fn values(&self) -> [&str; 17] {
        [
            &self.filing_number,
            &self.debtor_name,
            &self.debtor_street,
            &self.debtor_city,
            &self.debtor_state,
            &self.debtor_zip,
            &self.filing_date,
            &self.secured_party_name,
            &self.secured_party_address,
            &self.secured_party_city,
            &self.secured_party_state,
            &self.secured_party_zip,
            &self.lapse_date,
            &self.official_designation,
            &self.official_name,
            &self.official_address,
            &self.processed,
        ]
    }

    fn fields_mut(&mut self) -> [&mut String; 17] {
        [
            &mut self.filing_number,
            &mut self.debtor_name,
            &mut self.debtor_street,
            &mut self.debtor_city,
            &mut self.debtor_state,
            &mut self.debtor_zip,
            &mut self.filing_date,
            &mut self.secured_party_name,
            &mut self.secured_party_address,
            &mut self.secured_party_city,
            &mut self.secured_party_state,
            &mut self.secured_party_zip,
            &mut self.lapse_date,
            &mut self.official_designation,
            &mut self.official_name,
            &mut self.official_address,
            &mut self.processed,
        ]
    }

    /// Strip every quote character and surrounding whitespace from all fields.
    pub fn scrub(&mut self) {
        for field in self.fields_mut() {
            if field.contains('"') || field.trim().len() != field.len() {
                *field = field.replace('"', "").trim().to_string();
            }
        }
    }
}

pub fn write_rows<W: Write>(writer: W, rows: &[OutputRow]) -> Result<()> {
    debug!("Writing {} rows as CSV", rows.len());

    let mut wtr = Writer::from_writer(writer);
    wtr.write_record(OUTPUT_COLUMNS)?;
    for row in rows {
        wtr.write_record(row.values())?;
    }
    wtr.flush()?;

    info!("Wrote {} rows", rows.len());
    Ok(())
}
