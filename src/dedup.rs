use std::collections::HashSet;

use tracing::debug;

use crate::output::OutputRow;

/// Run-scoped duplicate filter over the full output column tuple.
#[derive(Debug, Default)]
pub struct Deduplicator {
    seen: HashSet<Vec<String>>,
    filings: HashSet<String>,
    dropped: usize,
}

impl Deduplicator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Scrubs the row and returns it unless an identical row was already admitted.
    pub fn admit(&mut self, mut row: OutputRow) -> Option<OutputRow> {
        row.scrub();
        let key: Vec<String> = row.values().iter().map(|v| v.to_string()).collect();
        if !self.seen.insert(key) {
            self.dropped += 1;
            debug!(filing = %row.filing_number, debtor = %row.debtor_name, "duplicate row dropped");
            return None;
        }
        if !row.filing_number.is_empty() {
            self.filings.insert(row.filing_number.clone());
        }
        Some(row)
    }

    pub fn dedup<I>(&mut self, rows: I) -> Vec<OutputRow>
    where
        I: IntoIterator<Item = OutputRow>,
    {
        rows.into_iter().filter_map(|row| self.admit(row)).collect()
    }

    pub fn dropped(&self) -> usize {
        self.dropped
    }

    pub fn distinct_filings(&self) -> usize {
        self.filings.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(filing: &str, debtor: &str) -> OutputRow {
        OutputRow {
            filing_number: filing.into(),
            debtor_name: debtor.into(),
            processed: "01/01/2024".into(),
            ..OutputRow::default()
        }
    }

    #[test]
    fn keeps_first_occurrence_in_order() {
        let mut d = Deduplicator::new();
        let out = d.dedup(vec![row("F1", "A"), row("F2", "B"), row("F1", "A"), row("F3", "C")]);
        let names: Vec<&str> = out.iter().map(|r| r.debtor_name.as_str()).collect();
        assert_eq!(names, vec!["A", "B", "C"]);
        assert_eq!(d.dropped(), 1);
        assert_eq!(d.distinct_filings(), 3);
    }

    #[test]
    fn quotes_and_padding_do_not_distinguish() {
        let mut d = Deduplicator::new();
        let out = d.dedup(vec![row("F1", "\"ACME\""), row("F1", " ACME ")]);
        assert_eq!(out.len(), 1);
        assert_eq!(out[0].debtor_name, "ACME");
    }

    #[test]
    fn any_column_difference_survives() {
        let mut d = Deduplicator::new();
        let mut other = row("F1", "A");
        other.secured_party_zip = "10005".into();
        let out = d.dedup(vec![row("F1", "A"), other]);
        assert_eq!(out.len(), 2);
        assert_eq!(d.distinct_filings(), 1);
    }

    #[test]
    fn seen_set_spans_calls() {
        let mut d = Deduplicator::new();
        assert_eq!(d.dedup(vec![row("F1", "A")]).len(), 1);
        assert!(d.dedup(vec![row("F1", "A")]).is_empty());
    }
}
