use tracing::debug;

use super::address::{self, NormalizedAddress};
use super::blocks::{classify_line, FilingMeta, Line, RawBlock, SourceProfile};

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NameAddressPair {
    pub name: String,
    pub address_line1: String,
    /// Only set when the line after the address independently reads as `City, ST 12345`.
    pub address_line2: Option<String>,
}

impl NameAddressPair {
    /// Both address lines joined the way a single-line address would read.
    pub fn address(&self) -> String {
        match &self.address_line2 {
            Some(line2) => format!("{}, {}", self.address_line1, line2),
            None => self.address_line1.clone(),
        }
    }

    pub fn normalized_address(&self) -> NormalizedAddress {
        address::normalize(&self.address())
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FilingRecord {
    pub filing_number: String,
    pub filing_date: String,
    pub lapse_date: String,
    pub debtors: Vec<NameAddressPair>,
    pub secured_parties: Vec<NameAddressPair>,
}

impl FilingRecord {
    /// First metadata line wins per field.
    fn absorb(&mut self, meta: FilingMeta) {
        if self.filing_number.is_empty() {
            self.filing_number = meta.filing_number;
        }
        if self.filing_date.is_empty() {
            self.filing_date = meta.filing_date;
        }
        if self.lapse_date.is_empty() {
            self.lapse_date = meta.lapse_date;
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum State {
    None,
    Debtor,
    Secured,
}

/// Line-indexed walk over one block.
pub struct RecordParser<'b, 'a> {
    lines: &'b [&'a str],
    profile: &'b SourceProfile,
    pos: usize,
    state: State,
    record: FilingRecord,
}

impl<'b, 'a> RecordParser<'b, 'a> {
    pub fn new(lines: &'b [&'a str], profile: &'b SourceProfile) -> Self {
        Self {
            lines,
            profile,
            pos: 0,
            state: State::None,
            record: FilingRecord::default(),
        }
    }

    #[cfg(test)]
    pub fn state(&self) -> State {
        self.state
    }

    #[cfg(test)]
    pub fn position(&self) -> usize {
        self.pos
    }

    pub fn is_done(&self) -> bool {
        self.pos >= self.lines.len()
    }

    /// Consume one line (plus any address lines a name pulls in).
    pub fn step(&mut self) {
        let Some(raw) = self.lines.get(self.pos) else {
            return;
        };

        match classify_line(raw, self.profile) {
            Line::Noise => {}
            Line::Marker => self.state = State::None,
            Line::Metadata(meta) => self.record.absorb(meta),
            Line::DebtorHeader => self.state = State::Debtor,
            Line::SecuredHeader => self.state = State::Secured,
            Line::Text(name) => match self.state {
                State::None => {}
                State::Debtor => {
                    let pair = self.take_pair(name);
                    self.record.debtors.push(pair);
                }
                State::Secured => {
                    let pair = self.take_pair(name);
                    self.record.secured_parties.push(pair);
                }
            },
        }
        self.pos += 1;
    }

    pub fn finish(mut self) -> FilingRecord {
        while !self.is_done() {
            self.step();
        }
        self.record
    }

    /// `name` sits at `pos`. Leaves `pos` on the last consumed line.
    fn take_pair(&mut self, name: String) -> NameAddressPair {
        let mut pair = NameAddressPair {
            name,
            ..NameAddressPair::default()
        };

        let Some(line1) = self.peek(1) else {
            return pair;
        };
        let kind = classify_line(line1, self.profile);
        if kind == Line::Noise || kind.starts_section() {
            return pair;
        }
        pair.address_line1 = line1.trim().to_string();
        self.pos += 1;

        if let Some(line2) = self.peek(1) {
            if address::is_city_state_zip_line(line2) {
                pair.address_line2 = Some(line2.trim().to_string());
                self.pos += 1;
            }
        }

        debug!(name = %pair.name, address = %pair.address(), state = ?self.state, "party");
        pair
    }

    fn peek(&self, ahead: usize) -> Option<&'a str> {
        self.lines.get(self.pos + ahead).copied()
    }
}

/// Parse one block into a filing record. Missing pieces stay empty.
pub fn parse_block(block: &RawBlock<'_>, profile: &SourceProfile) -> FilingRecord {
    RecordParser::new(&block.lines, profile).finish()
}

// ── Tests ──
