use std::fmt;
use std::sync::LazyLock;

use regex::Regex;
use serde::Serialize;
use tracing::debug;

static PO_BOX_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)P\.?\s*O\.?\s*BOX\s+(\d+)").unwrap());
static STATE_ZIP_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\b([A-Z]{2})\s+(\d{5})(?:-\d{4})?\b").unwrap());
static STATE_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\b([A-Z]{2})\b").unwrap());
static CITY_STATE_ZIP_LINE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[A-Za-z .'-]+,\s*[A-Z]{2}\s+\d{5}(?:-\d{4})?$").unwrap());

const CARE_OF: &str = "C/O";

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct NormalizedAddress {
    pub street: String,
    pub city: String,
    pub state: String,
    pub zip: String,
}

impl NormalizedAddress {
    pub fn is_empty(&self) -> bool {
        self.street.is_empty() && self.city.is_empty() && self.state.is_empty() && self.zip.is_empty()
    }

    fn street_only(street: &str) -> Self {
        Self {
            street: street.to_string(),
            ..Self::default()
        }
    }

    fn with_street(street: String, place: CityStateZip) -> Self {
        Self {
            street,
            city: place.city,
            state: place.state,
            zip: place.zip,
        }
    }
}

/// Renders back to `street, city, ST zip`. Empty fields keep their slot so
/// the text parses back to the same parts; a street-only address is just the street.
impl fmt::Display for NormalizedAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.city.is_empty() && self.state.is_empty() && self.zip.is_empty() {
            return f.write_str(&self.street);
        }
        let state_zip = format!("{} {}", self.state, self.zip);
        write!(f, "{}, {}, {}", self.street, self.city, state_zip.trim())
    }
}

/// Result of the city/state/zip sub-parse.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
struct CityStateZip {
    city: String,
    state: String,
    zip: String,
}

/// One branch of the address cascade. Exactly one is chosen per input.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Strategy {
    PoBox,
    CareOf,
    CommaSegmented,
    Simple,
    Fallback,
}

impl Strategy {
    /// Ordered gate checks. PO Box wins over Care-Of, which wins over commas.
    pub fn select(text: &str) -> Strategy {
        let upper = text.to_ascii_uppercase();
        if upper.starts_with("PO BOX") || upper.starts_with("P.O. BOX") {
            Strategy::PoBox
        } else if upper.contains(CARE_OF) {
            Strategy::CareOf
        } else if text.contains(',') {
            Strategy::CommaSegmented
        } else {
            Strategy::Simple
        }
    }

    /// Run this branch alone. `None` means the branch found nothing usable.
    pub fn apply(self, text: &str) -> Option<NormalizedAddress> {
        match self {
            Strategy::PoBox => parse_po_box(text),
            Strategy::CareOf => Some(parse_care_of(text)),
            Strategy::CommaSegmented => Some(parse_comma_segmented(text)),
            Strategy::Simple => parse_simple(text),
            Strategy::Fallback => Some(NormalizedAddress::street_only(text)),
        }
    }
}

/// Normalize one free-text address into street/city/state/zip.
pub fn normalize(raw: &str) -> NormalizedAddress {
    normalize_traced(raw).1
}

/// Same as [`normalize`] but also reports which branch produced the result.
pub fn normalize_traced(raw: &str) -> (Strategy, NormalizedAddress) {
    let text = raw.replace('"', "");
    let text = text.trim();
    if text.is_empty() {
        return (Strategy::Fallback, NormalizedAddress::default());
    }

    let strategy = Strategy::select(text);
    match strategy.apply(text) {
        Some(parsed) => {
            debug!(?strategy, input = text, "address parsed");
            (strategy, parsed)
        }
        None => {
            debug!(?strategy, input = text, "no usable match, falling back to street");
            (Strategy::Fallback, NormalizedAddress::street_only(text))
        }
    }
}

/// True when a whole line looks like `City, ST 12345` on its own.
pub fn is_city_state_zip_line(line: &str) -> bool {
    CITY_STATE_ZIP_LINE_RE.is_match(line.trim())
}

fn parse_po_box(text: &str) -> Option<NormalizedAddress> {
    let caps = PO_BOX_RE.captures(text)?;
    let whole = caps.get(0)?;
    let remaining = format!("{}{}", &text[..whole.start()], &text[whole.end()..]);
    let remaining = remaining.trim();
    let remaining = remaining.strip_prefix(',').unwrap_or(remaining).trim();

    Some(NormalizedAddress::with_street(
        format!("PO BOX {}", &caps[1]),
        extract_city_state_zip(remaining),
    ))
}

fn parse_care_of(text: &str) -> NormalizedAddress {
    // ASCII uppercasing keeps byte offsets aligned with `text`.
    let Some(idx) = text.to_ascii_uppercase().find(CARE_OF) else {
        return NormalizedAddress::street_only(text);
    };
    let care_of = text[..idx].trim();
    let rest = text[idx + CARE_OF.len()..].trim();

    let mut parsed = parse_comma_segmented(rest);
    parsed.street = if parsed.street.is_empty() {
        format!("C/O {}", care_of)
    } else {
        format!("C/O {}, {}", care_of, parsed.street)
    };
    parsed
}

fn parse_comma_segmented(text: &str) -> NormalizedAddress {
    let parts: Vec<&str> = text.split(',').map(str::trim).collect();
    match parts.as_slice() {
        [street, city, state_zip, ..] => {
            let tail = extract_city_state_zip(state_zip);
            NormalizedAddress {
                street: street.to_string(),
                city: city.to_string(),
                state: tail.state,
                zip: tail.zip,
            }
        }
        [street, city_state_zip] => {
            NormalizedAddress::with_street(street.to_string(), extract_city_state_zip(city_state_zip))
        }
        _ => NormalizedAddress::street_only(text),
    }
}

fn parse_simple(text: &str) -> Option<NormalizedAddress> {
    let place = extract_city_state_zip(text);
    if place.state.is_empty() {
        return None;
    }
    Some(NormalizedAddress::with_street(String::new(), place))
}

fn extract_city_state_zip(text: &str) -> CityStateZip {
    let text = text.trim();
    if text.is_empty() {
        return CityStateZip::default();
    }

    if let Some(caps) = STATE_ZIP_RE.captures(text) {
        let start = caps.get(0).map_or(0, |m| m.start());
        return CityStateZip {
            city: trim_city(&text[..start]),
            state: caps[1].to_string(),
            zip: caps[2].to_string(),
        };
    }

    if let Some(m) = STATE_RE.find(text) {
        let rest = format!("{} {}", &text[..m.start()], &text[m.end()..]);
        let rest = rest.split_whitespace().collect::<Vec<_>>().join(" ");
        return CityStateZip {
            city: trim_city(&rest),
            state: m.as_str().to_string(),
            zip: String::new(),
        };
    }

    CityStateZip {
        city: text.to_string(),
        ..CityStateZip::default()
    }
}

fn trim_city(s: &str) -> String {
    s.trim_end_matches(|c: char| c == ',' || c.is_whitespace())
        .trim_start()
        .to_string()
}
