use serde::Deserialize;

/// Per-portal layout of a dumped result page.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct SourceProfile {
    /// A line starting with this opens a new filing block.
    pub boundary_marker: String,
    /// Prefixes that identify the comma-delimited filing metadata line.
    pub metadata_prefixes: Vec<String>,
    pub metadata_min_fields: usize,
    pub filing_date_field: usize,
    pub lapse_date_field: usize,
    pub filing_number_field: usize,
}

impl Default for SourceProfile {
    fn default() -> Self {
        Self {
            boundary_marker: "----Filing Type----".to_string(),
            metadata_prefixes: vec!["Business".to_string(), "Finance Statement".to_string()],
            metadata_min_fields: 6,
            filing_date_field: 1,
            lapse_date_field: 3,
            filing_number_field: 5,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FilingMeta {
    pub filing_number: String,
    pub filing_date: String,
    pub lapse_date: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Line {
    Marker,
    Metadata(FilingMeta),
    DebtorHeader,
    SecuredHeader,
    /// Blank lines, quote residue and navigation buttons.
    Noise,
    Text(String),
}

impl Line {
    /// Lines that must never be swallowed as someone's address.
    pub fn starts_section(&self) -> bool {
        matches!(self, Line::Marker | Line::DebtorHeader | Line::SecuredHeader)
    }
}

const DEBTOR_HEADERS: &[&str] = &["debtor(s)", "debtors", "debtor"];
const SECURED_HEADERS: &[&str] = &[
    "secured parties",
    "secured party(s)",
    "secured party(ies)",
    "secured party",
    "secured",
];
const NAV_RESIDUE: &[&str] = &["back", "new search"];

pub fn classify_line(raw: &str, profile: &SourceProfile) -> Line {
    let line = raw.trim();

    if is_noise(line) {
        return Line::Noise;
    }

    if line.starts_with(profile.boundary_marker.as_str()) {
        return Line::Marker;
    }

    if let Some(meta) = parse_metadata(line, profile) {
        return Line::Metadata(meta);
    }

    let header = line.trim_end_matches(':').trim().to_lowercase();
    if DEBTOR_HEADERS.contains(&header.as_str()) {
        return Line::DebtorHeader;
    }
    if SECURED_HEADERS.contains(&header.as_str()) {
        return Line::SecuredHeader;
    }

    Line::Text(line.to_string())
}

fn is_noise(line: &str) -> bool {
    line.is_empty()
        || line.chars().all(|c| c == '"')
        || NAV_RESIDUE.iter().any(|nav| line.eq_ignore_ascii_case(nav))
}

fn parse_metadata(line: &str, profile: &SourceProfile) -> Option<FilingMeta> {
    if !profile
        .metadata_prefixes
        .iter()
        .any(|p| line.starts_with(p.as_str()))
    {
        return None;
    }
    let fields: Vec<&str> = line.split(',').map(str::trim).collect();
    if fields.len() < profile.metadata_min_fields {
        return None;
    }
    let field = |i: usize| fields.get(i).map(|s| s.to_string()).unwrap_or_default();
    Some(FilingMeta {
        filing_date: field(profile.filing_date_field),
        lapse_date: field(profile.lapse_date_field),
        filing_number: field(profile.filing_number_field),
    })
}

/// One filing's worth of lines; the boundary marker, when present, is line 0.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawBlock<'a> {
    pub lines: Vec<&'a str>,
}

/// Split a dump into per-filing blocks on the boundary marker.
pub fn segment_blocks<'a, I>(lines: I, profile: &SourceProfile) -> Vec<RawBlock<'a>>
where
    I: IntoIterator<Item = &'a str>,
{
    let mut blocks = Vec::new();
    let mut current: Vec<&'a str> = Vec::new();

    for line in lines {
        if line.trim().starts_with(profile.boundary_marker.as_str()) {
            flush(&mut blocks, &mut current);
        }
        current.push(line);
    }
    flush(&mut blocks, &mut current);

    blocks
}

fn flush<'a>(blocks: &mut Vec<RawBlock<'a>>, current: &mut Vec<&'a str>) {
    // a preamble of blank lines before the first marker carries nothing
    if current.iter().all(|l| l.trim().is_empty()) {
        current.clear();
        return;
    }
    blocks.push(RawBlock {
        lines: std::mem::take(current),
    });
}

// ── Tests ──

#[cfg(test)]
mod tests {
    use super::*;

    fn profile() -> SourceProfile {
        SourceProfile::default()
    }

    fn lens(text: &str) -> Vec<usize> {
        segment_blocks(text.lines(), &profile())
            .iter()
            .map(|b| b.lines.len())
            .collect()
    }

    #[test]
    fn marker_opens_block() {
        let text = "----Filing Type----\nA\nB\n----Filing Type----\nC";
        let blocks = segment_blocks(text.lines(), &profile());
        assert_eq!(blocks.len(), 2);
        assert_eq!(blocks[0].lines, vec!["----Filing Type----", "A", "B"]);
        assert_eq!(blocks[1].lines, vec!["----Filing Type----", "C"]);
    }

    #[test]
    fn blank_preamble_is_dropped() {
        assert_eq!(lens("\n  \n----Filing Type----\nA"), vec![2]);
    }

    #[test]
    fn text_preamble_becomes_block() {
        assert_eq!(lens("stray\n----Filing Type----\nA"), vec![1, 2]);
    }

    #[test]
    fn no_marker_single_block() {
        assert_eq!(lens("A\nB\nC"), vec![3]);
    }

    #[test]
    fn trailing_marker_alone() {
        let text = "----Filing Type----\nA\n----Filing Type----";
        let blocks = segment_blocks(text.lines(), &profile());
        assert_eq!(blocks.len(), 2);
        assert_eq!(blocks[1].lines, vec!["----Filing Type----"]);
    }

    #[test]
    fn empty_input_no_blocks() {
        assert!(segment_blocks("".lines(), &profile()).is_empty());
    }

    #[test]
    fn indented_marker_still_splits() {
        assert_eq!(lens("  ----Filing Type----\nA\n\t----Filing Type----\nB"), vec![2, 2]);
    }

    #[test]
    fn metadata_line() {
        let line = classify_line(
            "Business, 01/01/2024, N/A, 12/31/2028, N/A, F0001234",
            &profile(),
        );
        assert_eq!(
            line,
            Line::Metadata(FilingMeta {
                filing_number: "F0001234".into(),
                filing_date: "01/01/2024".into(),
                lapse_date: "12/31/2028".into(),
            })
        );
    }

    #[test]
    fn short_metadata_is_text() {
        let line = classify_line("Business, 01/01/2024, N/A", &profile());
        assert!(matches!(line, Line::Text(_)));
    }

    #[test]
    fn finance_statement_prefix() {
        let line = classify_line("Finance Statement,02/02/2023,x,02/02/2028,y,AL-99", &profile());
        assert!(matches!(line, Line::Metadata(m) if m.filing_number == "AL-99"));
    }

    #[test]
    fn headers() {
        assert_eq!(classify_line("Debtor(s)", &profile()), Line::DebtorHeader);
        assert_eq!(classify_line("DEBTORS:", &profile()), Line::DebtorHeader);
        assert_eq!(classify_line("Secured Parties", &profile()), Line::SecuredHeader);
        assert_eq!(classify_line(" Secured ", &profile()), Line::SecuredHeader);
        assert!(matches!(classify_line("Secured Lending LLC", &profile()), Line::Text(_)));
    }

    #[test]
    fn noise_lines() {
        for l in ["", "   ", "\"\"", "Back", "New Search", "new search"] {
            assert_eq!(classify_line(l, &profile()), Line::Noise, "{l:?}");
        }
        assert!(matches!(classify_line("Backwoods Supply", &profile()), Line::Text(_)));
    }

    #[test]
    fn custom_marker() {
        let p = SourceProfile {
            boundary_marker: "=== Record ===".into(),
            ..SourceProfile::default()
        };
        let blocks = segment_blocks("=== Record ===\nA\n=== Record ===\nB".lines(), &p);
        assert_eq!(blocks.len(), 2);
        assert_eq!(classify_line("=== Record ===", &p), Line::Marker);
    }
}
