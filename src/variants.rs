//! Turns free-form generated text into structured copy variants.
//!
//! Two campaign modes are supported: a single `title` slot per variant, or
//! header/CTA couples. Parsing is a pure function of the text, the mode and
//! the variant limit.

use std::fmt;
use std::str::FromStr;
use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

/// Slot filled in single-field mode
pub const TITLE_SLOT: &str = "title";
/// Header slot of a couple
pub const HEADER_SLOT: &str = "header";
/// Call-to-action slot of a couple
pub const CTA_SLOT: &str = "cta";

#[allow(clippy::expect_used)]
static ENUMERATION_MARKER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\d+[.)]\s*").expect("valid enumeration pattern"));

#[allow(clippy::expect_used)]
static HEADER_MARKER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)header:").expect("valid header pattern"));

#[allow(clippy::expect_used)]
static CTA_MARKER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)cta:").expect("valid cta pattern"));

/// Which slots a campaign fills per variant.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum CampaignMode {
    /// One `title` per variant
    #[default]
    SingleField,
    /// A `header` + `cta` couple per variant
    MultiField,
}

impl CampaignMode {
    /// The fixed slot names a variant of this mode carries, in order.
    pub fn slots(self) -> &'static [&'static str] {
        match self {
            Self::SingleField => &[TITLE_SLOT],
            Self::MultiField => &[HEADER_SLOT, CTA_SLOT],
        }
    }

    /// Stable identifier used in forms and on the command line.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::SingleField => "single-field",
            Self::MultiField => "multi-field",
        }
    }
}

impl fmt::Display for CampaignMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for CampaignMode {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "single-field" | "single" | "title" => Ok(Self::SingleField),
            "multi-field" | "multi" | "header-cta" => Ok(Self::MultiField),
            other => Err(format!(
                "unknown campaign mode {other:?}, expected single-field or multi-field"
            )),
        }
    }
}

/// Text bound to one named slot.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct VariantField {
    /// Slot name, one of [`CampaignMode::slots`]
    pub slot: &'static str,
    /// Generated copy for the slot
    pub text: String,
}

/// One generated copy option.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Variant {
    /// 0-based position in the generated sequence
    pub index: usize,
    /// Slot values, in the mode's slot order
    pub fields: Vec<VariantField>,
}

impl Variant {
    /// A single-field variant.
    pub fn title(index: usize, text: impl Into<String>) -> Self {
        Self {
            index,
            fields: vec![VariantField {
                slot: TITLE_SLOT,
                text: text.into(),
            }],
        }
    }

    /// A header/CTA couple.
    pub fn couple(index: usize, header: impl Into<String>, cta: impl Into<String>) -> Self {
        Self {
            index,
            fields: vec![
                VariantField {
                    slot: HEADER_SLOT,
                    text: header.into(),
                },
                VariantField {
                    slot: CTA_SLOT,
                    text: cta.into(),
                },
            ],
        }
    }

    /// Returns the text bound to `slot`, if any.
    pub fn field(&self, slot: &str) -> Option<&str> {
        self.fields
            .iter()
            .find(|field| field.slot == slot)
            .map(|field| field.text.as_str())
    }

    /// Human readable label, all slot values joined.
    pub fn label(&self) -> String {
        self.fields
            .iter()
            .map(|field| field.text.as_str())
            .collect::<Vec<_>>()
            .join(" / ")
    }
}

/// Result of one parse call.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ParsedVariants {
    /// Mode the text was parsed with
    pub mode: CampaignMode,
    /// Parsed variants, at most `requested` of them
    pub variants: Vec<Variant>,
    /// How many variants were asked for
    pub requested: usize,
}

impl ParsedVariants {
    /// True when nothing could be parsed.
    pub fn is_empty(&self) -> bool {
        self.variants.is_empty()
    }

    /// Number of parsed variants.
    pub fn len(&self) -> usize {
        self.variants.len()
    }

    /// How many variants are missing compared to the request, if any.
    pub fn shortfall(&self) -> Option<usize> {
        let missing = self.requested.saturating_sub(self.variants.len());
        (missing > 0).then_some(missing)
    }
}

/// Parses generated text into at most `limit` variants.
pub fn parse_variants(text: &str, mode: CampaignMode, limit: usize) -> ParsedVariants {
    let variants = match mode {
        CampaignMode::SingleField => parse_titles(text, limit),
        CampaignMode::MultiField => parse_couples(text, limit),
    };
    ParsedVariants {
        mode,
        variants,
        requested: limit,
    }
}

/// Strips a leading `12.` or `12)` marker. Anything else is kept as-is.
fn strip_enumeration(line: &str) -> &str {
    match ENUMERATION_MARKER.find(line) {
        Some(marker) => line[marker.end()..].trim(),
        None => line,
    }
}

fn parse_titles(text: &str, limit: usize) -> Vec<Variant> {
    text.lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(strip_enumeration)
        .filter(|title| !title.is_empty())
        .take(limit)
        .enumerate()
        .map(|(index, title)| Variant::title(index, title))
        .collect()
}

/// Line scanner state for header/CTA couples.
#[derive(Debug, PartialEq, Eq)]
enum CoupleState {
    AwaitingHeader,
    AwaitingCta { header: String },
}

impl CoupleState {
    /// A `Header:` marker always opens a fresh candidate.
    fn on_header(self, text: &str) -> Self {
        let text = text.trim();
        if text.is_empty() {
            Self::AwaitingHeader
        } else {
            Self::AwaitingCta {
                header: text.to_string(),
            }
        }
    }

    /// A `CTA:` marker commits the candidate only when a header is pending.
    fn on_cta(self, text: &str) -> (Self, Option<(String, String)>) {
        let text = text.trim();
        match self {
            Self::AwaitingCta { header } if !text.is_empty() => {
                (Self::AwaitingHeader, Some((header, text.to_string())))
            }
            other => (other, None),
        }
    }
}

fn parse_couples(text: &str, limit: usize) -> Vec<Variant> {
    let mut state = CoupleState::AwaitingHeader;
    let mut couples = Vec::new();

    for line in text.lines() {
        if couples.len() >= limit {
            break;
        }
        let header = HEADER_MARKER.find(line);
        let cta = CTA_MARKER.find(line);

        let committed = match (header, cta) {
            (Some(header), Some(cta)) if header.start() < cta.start() => {
                state = state.on_header(&line[header.end()..cta.start()]);
                let (next, committed) = state.on_cta(&line[cta.end()..]);
                state = next;
                committed
            }
            (Some(header), Some(cta)) => {
                let (next, committed) = state.on_cta(&line[cta.end()..header.start()]);
                state = next.on_header(&line[header.end()..]);
                committed
            }
            (Some(header), None) => {
                state = state.on_header(&line[header.end()..]);
                None
            }
            (None, Some(cta)) => {
                let (next, committed) = state.on_cta(&line[cta.end()..]);
                state = next;
                committed
            }
            (None, None) => None,
        };

        if let Some((header, cta)) = committed {
            couples.push(Variant::couple(couples.len(), header, cta));
        }
    }

    couples
}

#[cfg(test)]
mod tests {
    use super::*;

    fn titles(parsed: &ParsedVariants) -> Vec<&str> {
        parsed
            .variants
            .iter()
            .filter_map(|variant| variant.field(TITLE_SLOT))
            .collect()
    }

    #[test]
    fn strips_both_enumeration_styles() {
        let parsed = parse_variants(
            "1. Big Sale\n2) Save Now\nClearance",
            CampaignMode::SingleField,
            10,
        );
        assert_eq!(titles(&parsed), vec!["Big Sale", "Save Now", "Clearance"]);
        assert_eq!(parsed.variants[2].index, 2);
    }

    #[test]
    fn numbered_lines_keep_their_order() {
        let text = (1..=7)
            .map(|n| format!("{n}. Deal number {n}"))
            .collect::<Vec<_>>()
            .join("\n");
        let parsed = parse_variants(&text, CampaignMode::SingleField, 10);
        assert_eq!(parsed.len(), 7);
        for (position, variant) in parsed.variants.iter().enumerate() {
            assert_eq!(variant.index, position);
            assert_eq!(
                variant.field(TITLE_SLOT),
                Some(format!("Deal number {}", position + 1).as_str())
            );
        }
        assert_eq!(parsed.shortfall(), Some(3));
    }

    #[test]
    fn blank_lines_and_padding_are_ignored() {
        let parsed = parse_variants(
            "\n   1.   Doorbusters   \n\n\t2)Midnight Madness\n",
            CampaignMode::SingleField,
            10,
        );
        assert_eq!(titles(&parsed), vec!["Doorbusters", "Midnight Madness"]);
    }

    #[test]
    fn malformed_markers_pass_through_as_titles() {
        let parsed = parse_variants(
            "Dr. Deals\n- Bullet Bonanza\n10.5% off everything",
            CampaignMode::SingleField,
            10,
        );
        assert_eq!(
            titles(&parsed),
            vec!["Dr. Deals", "- Bullet Bonanza", "5% off everything"]
        );
    }

    #[test]
    fn output_never_exceeds_limit() {
        let text = (1..=25)
            .map(|n| format!("{n}. Line {n}"))
            .collect::<Vec<_>>()
            .join("\n");
        let parsed = parse_variants(&text, CampaignMode::SingleField, 10);
        assert_eq!(parsed.len(), 10);
        assert_eq!(parsed.shortfall(), None);

        let couples = (1..=25)
            .map(|n| format!("Header: H{n}\nCTA: C{n}"))
            .collect::<Vec<_>>()
            .join("\n");
        let parsed = parse_variants(&couples, CampaignMode::MultiField, 4);
        assert_eq!(parsed.len(), 4);
    }

    #[test]
    fn empty_input_yields_empty_sequence() {
        for mode in [CampaignMode::SingleField, CampaignMode::MultiField] {
            let parsed = parse_variants("  \n\n", mode, 10);
            assert!(parsed.is_empty());
            assert_eq!(parsed.shortfall(), Some(10));
        }
    }

    #[test]
    fn parses_header_cta_couples() {
        let parsed = parse_variants(
            "1. Header: SHOP NOW\n   CTA: Browse Today\n2. Header: WINTER DEALS\n   CTA: Explore",
            CampaignMode::MultiField,
            10,
        );
        assert_eq!(
            parsed.variants,
            vec![
                Variant::couple(0, "SHOP NOW", "Browse Today"),
                Variant::couple(1, "WINTER DEALS", "Explore"),
            ]
        );
    }

    #[test]
    fn cta_without_header_is_discarded() {
        let parsed = parse_variants(
            "CTA: Orphan\nHeader: First\nCTA: Go\nCTA: Second orphan\nHeader: Last\nCTA: Buy",
            CampaignMode::MultiField,
            10,
        );
        assert_eq!(
            parsed.variants,
            vec![Variant::couple(0, "First", "Go"), Variant::couple(1, "Last", "Buy")]
        );
    }

    #[test]
    fn markers_are_case_insensitive_and_noise_is_ignored() {
        let parsed = parse_variants(
            "Here are your couples:\nHEADER: Loud\nsome filler\ncta: quiet",
            CampaignMode::MultiField,
            10,
        );
        assert_eq!(parsed.variants, vec![Variant::couple(0, "Loud", "quiet")]);
    }

    #[test]
    fn a_new_header_replaces_an_uncommitted_one() {
        let parsed = parse_variants(
            "Header: Dropped\nHeader: Kept\nCTA: Act",
            CampaignMode::MultiField,
            10,
        );
        assert_eq!(parsed.variants, vec![Variant::couple(0, "Kept", "Act")]);
    }

    #[test]
    fn header_and_cta_on_one_line() {
        let parsed = parse_variants(
            "1. Header: Fast | CTA: Now",
            CampaignMode::MultiField,
            10,
        );
        assert_eq!(parsed.variants, vec![Variant::couple(0, "Fast |", "Now")]);
    }

    #[test]
    fn parsing_is_deterministic() {
        let text = "1. Header: A\nCTA: B\n2. Header: C\nCTA: D";
        assert_eq!(
            parse_variants(text, CampaignMode::MultiField, 10),
            parse_variants(text, CampaignMode::MultiField, 10)
        );
    }

    #[test]
    fn mode_round_trips_through_strings() {
        for mode in [CampaignMode::SingleField, CampaignMode::MultiField] {
            assert_eq!(mode.as_str().parse::<CampaignMode>(), Ok(mode));
        }
        assert!("banner".parse::<CampaignMode>().is_err());
    }

    #[test]
    fn labels_join_slot_values() {
        assert_eq!(Variant::couple(0, "Hi", "Go").label(), "Hi / Go");
        assert_eq!(Variant::title(0, "Solo").label(), "Solo");
    }
}
