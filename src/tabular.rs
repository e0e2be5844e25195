//! Tabular input: a CSV whose address columns are already separated per party.
//! Each configured address column gets parsed Street/City/State/Zip columns
//! inserted right after it; everything else passes through untouched.

use std::io::{Read, Write};

use csv::{ReaderBuilder, WriterBuilder};
use tracing::{debug, info, warn};

use crate::error::Result;
use crate::parser::address;

const PARTS: [&str; 4] = ["Street", "City", "State", "Zip"];

#[derive(Debug, Clone)]
pub struct TabularOptions {
    pub address_columns: Vec<String>,
    /// Keep only rows where some cell contains this text (case-insensitive).
    pub require: Option<String>,
}

#[derive(Debug, Default, PartialEq, Eq)]
pub struct TabularStats {
    pub rows_read: usize,
    pub rows_written: usize,
    pub addresses: usize,
}

/// `Debtor Address` → `Debtor`.
fn field_name(header: &str) -> &str {
    let header = header.trim();
    header.strip_suffix(" Address").unwrap_or(header)
}

pub fn normalize_table<R: Read, W: Write>(
    input: R,
    output: W,
    opts: &TabularOptions,
) -> Result<TabularStats> {
    let mut rdr = ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .from_reader(input);
    let mut wtr = WriterBuilder::new().flexible(true).from_writer(output);

    let headers = rdr.headers()?.clone();
    let targets: Vec<bool> = headers
        .iter()
        .map(|h| opts.address_columns.iter().any(|c| c == h.trim()))
        .collect();
    if !targets.contains(&true) {
        warn!(
            "None of the address columns {:?} found in header; copying rows unchanged",
            opts.address_columns
        );
    }

    let mut out_headers: Vec<String> = Vec::with_capacity(headers.len() + 8);
    for (h, is_address) in headers.iter().zip(&targets) {
        out_headers.push(h.to_string());
        if *is_address {
            let field = field_name(h);
            out_headers.extend(PARTS.iter().map(|p| format!("{} {}", field, p)));
        }
    }
    wtr.write_record(&out_headers)?;

    let needle = opts.require.as_ref().map(|s| s.to_uppercase());
    let mut stats = TabularStats::default();

    for result in rdr.records() {
        let record = result?;
        stats.rows_read += 1;

        if let Some(needle) = &needle {
            if !record.iter().any(|cell| cell.to_uppercase().contains(needle)) {
                debug!(row = stats.rows_read, "row filtered out");
                continue;
            }
        }

        let mut out: Vec<String> = Vec::with_capacity(out_headers.len());
        for (i, is_address) in targets.iter().enumerate() {
            let value = record.get(i).unwrap_or("");
            out.push(value.to_string());
            if *is_address {
                let parsed = address::normalize(value);
                out.extend([parsed.street, parsed.city, parsed.state, parsed.zip]);
                stats.addresses += 1;
            }
        }
        // ragged rows keep their trailing cells
        out.extend(record.iter().skip(targets.len()).map(str::to_string));

        wtr.write_record(&out)?;
        stats.rows_written += 1;
    }
    wtr.flush()?;

    info!(
        "Normalized {} addresses across {} of {} rows",
        stats.addresses, stats.rows_written, stats.rows_read
    );
    Ok(stats)
}
