pub mod address;
pub mod blocks;
pub mod expand;
pub mod record;

use tracing::{debug, warn};

use crate::output::OutputRow;
use blocks::SourceProfile;
use expand::RunContext;

#[derive(Debug, Default)]
pub struct Extracted {
    pub blocks: usize,
    /// Blocks that produced no rows because a party list was empty.
    pub partial: usize,
    pub rows: Vec<OutputRow>,
}

/// Three-pass pipeline: dump text → blocks → filing records → candidate rows.
///
/// Quote characters are removed from every line first; the portals dump
/// table cells as quoted CSV.
pub fn process_text(text: &str, profile: &SourceProfile, ctx: &RunContext) -> Extracted {
    let cleaned: Vec<String> = text.lines().map(|l| l.replace('"', "")).collect();
    let blocks = blocks::segment_blocks(cleaned.iter().map(String::as_str), profile);

    let mut out = Extracted {
        blocks: blocks.len(),
        ..Extracted::default()
    };

    for (i, block) in blocks.iter().enumerate() {
        let record = record::parse_block(block, profile);
        if record.filing_number.is_empty() {
            debug!(block = i, "no filing metadata line");
        }
        if record.debtors.is_empty() || record.secured_parties.is_empty() {
            warn!(
                block = i,
                filing = %record.filing_number,
                debtors = record.debtors.len(),
                secured = record.secured_parties.len(),
                "block yields no rows"
            );
            out.partial += 1;
            continue;
        }
        out.rows.extend(expand::expand(&record, ctx));
    }

    out
}

// ── Tests ──

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dedup::Deduplicator;
    use chrono::NaiveDate;

    fn ctx() -> RunContext {
        RunContext::new(
            NaiveDate::from_ymd_opt(2024, 1, 31).unwrap(),
            expand::DEFAULT_DATE_FORMAT,
        )
    }

    fn run(text: &str) -> Extracted {
        process_text(text, &SourceProfile::default(), &ctx())
    }

    #[test]
    fn single_block_scenario() {
        let text = [
            "Business, 01/01/2024, N/A, 12/31/2028, N/A, F0001234",
            "Debtor(s)",
            "ACME LLC",
            "123 Main St",
            "Springfield, IL 62704",
            "Secured Parties",
            "BIG BANK",
            "1 Bank Plaza, New York, NY 10005",
        ]
        .join("\n");
        let out = run(&text);
        assert_eq!(out.rows.len(), 1);
        let r = &out.rows[0];
        assert_eq!(r.filing_number, "F0001234");
        assert_eq!(r.filing_date, "01/01/2024");
        assert_eq!(r.lapse_date, "12/31/2028");
        assert_eq!(r.debtor_name, "ACME LLC");
        assert_eq!(r.debtor_street, "123 Main St");
        assert_eq!(r.debtor_city, "Springfield");
        assert_eq!(r.debtor_state, "IL");
        assert_eq!(r.debtor_zip, "62704");
        assert_eq!(r.secured_party_name, "BIG BANK");
        assert_eq!(r.secured_party_address, "1 Bank Plaza");
        assert_eq!(r.secured_party_city, "New York");
        assert_eq!(r.secured_party_state, "NY");
        assert_eq!(r.secured_party_zip, "10005");
        assert_eq!(r.processed, "01/31/2024");
    }

    #[test]
    fn quoted_dump_lines() {
        let text = "\"----Filing Type----\"\n\"Business, 01/01/2024, N/A, 12/31/2028, N/A, F7\"\n\"Debtor(s)\"\n\"A CO\"\n\"1 B St, Mobile, AL 36602\"\n\"\"\n\"Secured Parties\"\n\"C BANK\"\n\"2 D St, Mobile, AL 36602\"";
        let out = run(text);
        assert_eq!(out.blocks, 1);
        assert_eq!(out.rows.len(), 1);
        assert_eq!(out.rows[0].filing_number, "F7");
        assert!(out.rows[0].values().iter().all(|v| !v.contains('"')));
    }

    #[test]
    fn fixture_file() {
        let text = std::fs::read_to_string("tests/fixtures/al_dump.txt").unwrap();
        let out = run(&text);
        assert_eq!(out.blocks, 5);
        // F100: 2 debtors x 1 secured, F200: 1 x 2, F300: no secured parties,
        // F100 again as a repeat, plus a block without metadata.
        assert_eq!(out.partial, 1);
        assert_eq!(out.rows.len(), 2 + 2 + 2 + 1);

        let mut dedup = Deduplicator::new();
        let rows = dedup.dedup(out.rows);
        assert_eq!(rows.len(), 5);
        assert_eq!(dedup.dropped(), 2);
        assert_eq!(dedup.distinct_filings(), 2);

        let po = rows
            .iter()
            .find(|r| r.secured_party_name == "FIRST CAPITAL BANK")
            .unwrap();
        assert_eq!(po.secured_party_address, "PO BOX 1500");
        assert_eq!(po.secured_party_city, "Birmingham");

        let care_of = rows.iter().find(|r| r.debtor_name == "RIVER FARMS INC").unwrap();
        assert_eq!(care_of.debtor_street, "C/O JOHN SMITH, 45 Levee Rd");
        assert_eq!(care_of.debtor_state, "AL");

        let bare = rows.iter().find(|r| r.filing_number.is_empty()).unwrap();
        assert_eq!(bare.debtor_name, "NO META LLC");
        assert!(bare.filing_date.is_empty() && bare.lapse_date.is_empty());
    }

    #[test]
    fn rows_never_cross_blocks() {
        let text = std::fs::read_to_string("tests/fixtures/al_dump.txt").unwrap();
        let out = run(&text);
        for r in out.rows.iter().filter(|r| r.filing_number == "F200") {
            assert_eq!(r.debtor_name, "SOUTHERN LOGISTICS LLC");
        }
        for r in out.rows.iter().filter(|r| r.filing_number == "F100") {
            assert_eq!(r.secured_party_name, "FIRST CAPITAL BANK");
        }
    }
}
