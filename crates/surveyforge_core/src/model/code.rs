//! Hierarchical code generation for instruments and surveys.
//!
//! # Responsibility
//! - Derive the display code for a new instrument node from its level,
//!   parent code and sibling position.
//! - Derive the sequential survey code namespace (`SRV...`).
//!
//! # Invariants
//! - Codes are unique at generation time given an accurate sibling index.
//! - Codes are never reassigned or compacted after sibling deletion; a node
//!   code identifies the node for external references (links, exports).

use crate::model::instrument::NodeLevel;
use once_cell::sync::Lazy;
use regex::Regex;

/// First code number handed out to root-level sections (`L1001`).
const SECTION_BASE: u32 = 1001;
/// First suffix number handed out to level-2 children (`.201`).
const SUB_SECTION_BASE: u32 = 201;
/// First suffix number handed out to level-3 children (`.301`).
const GROUPING_BASE: u32 = 301;

static INSTRUMENT_CODE_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^L\d{4}(\.\d{3}){0,2}$").expect("instrument code pattern must compile")
});

static SURVEY_CODE_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^SRV\d{3,}$").expect("survey code pattern must compile"));

/// Builds the code for a node inserted at `level` as the `sibling_index`-th
/// child (0-based) of the parent identified by `parent_code`.
///
/// `parent_code` is ignored for root sections and required below them; the
/// tree layer guarantees that pairing before calling in.
pub fn instrument_code(level: NodeLevel, parent_code: Option<&str>, sibling_index: usize) -> String {
    let index = sibling_index as u32;
    match level {
        NodeLevel::Section => format!("L{:04}", SECTION_BASE + index),
        NodeLevel::SubSection => format!(
            "{}.{:03}",
            parent_code.unwrap_or_default(),
            SUB_SECTION_BASE + index
        ),
        NodeLevel::Grouping => format!(
            "{}.{:03}",
            parent_code.unwrap_or_default(),
            GROUPING_BASE + index
        ),
    }
}

/// Next sibling index that keeps codes unique under one parent.
///
/// Counting existing siblings would reuse the code of a deleted earlier
/// sibling; instead the index continues after the highest code already
/// handed out, so `.201, .202, delete .201, insert` yields `.203`.
pub fn next_sibling_index<'a>(
    level: NodeLevel,
    sibling_codes: impl IntoIterator<Item = &'a str>,
) -> usize {
    let base = match level {
        NodeLevel::Section => SECTION_BASE,
        NodeLevel::SubSection => SUB_SECTION_BASE,
        NodeLevel::Grouping => GROUPING_BASE,
    };
    sibling_codes
        .into_iter()
        .filter_map(code_number)
        .filter_map(|value| value.checked_sub(base))
        .map(|index| index as usize + 1)
        .max()
        .unwrap_or(0)
}

/// Numeric value of the last code segment (`L1001.203` -> `203`).
fn code_number(code: &str) -> Option<u32> {
    let segment = code.rsplit('.').next()?;
    segment.strip_prefix('L').unwrap_or(segment).parse().ok()
}

/// Builds the survey-level code for the `count`-th survey (1-based).
///
/// Survey codes live in their own namespace, distinct from instrument codes.
pub fn survey_code(count: usize) -> String {
    format!("SRV{:03}", count)
}

/// Returns whether `code` is a well-formed instrument code at any level.
pub fn is_instrument_code(code: &str) -> bool {
    INSTRUMENT_CODE_RE.is_match(code)
}

/// Returns whether `code` is a well-formed survey code.
pub fn is_survey_code(code: &str) -> bool {
    SURVEY_CODE_RE.is_match(code)
}

#[cfg(test)]
mod tests {
    use super::{
        instrument_code, is_instrument_code, is_survey_code, next_sibling_index, survey_code,
    };
    use crate::model::instrument::NodeLevel;

    #[test]
    fn section_codes_start_at_1001_and_step_per_sibling() {
        assert_eq!(instrument_code(NodeLevel::Section, None, 0), "L1001");
        assert_eq!(instrument_code(NodeLevel::Section, None, 1), "L1002");
        assert_eq!(instrument_code(NodeLevel::Section, None, 11), "L1012");
    }

    #[test]
    fn child_codes_extend_the_parent_code() {
        assert_eq!(
            instrument_code(NodeLevel::SubSection, Some("L1001"), 0),
            "L1001.201"
        );
        assert_eq!(
            instrument_code(NodeLevel::Grouping, Some("L1001.202"), 2),
            "L1001.202.303"
        );
    }

    #[test]
    fn sibling_index_continues_after_the_highest_existing_code() {
        assert_eq!(next_sibling_index(NodeLevel::Section, []), 0);
        assert_eq!(
            next_sibling_index(NodeLevel::Section, ["L1001", "L1002"]),
            2
        );
        // Earlier sibling deleted: the freed code must not be reused.
        assert_eq!(
            next_sibling_index(NodeLevel::SubSection, ["L1001.202"]),
            2
        );
        assert_eq!(
            next_sibling_index(NodeLevel::Grouping, ["L1001.201.301", "L1001.201.303"]),
            3
        );
    }

    #[test]
    fn survey_codes_are_zero_padded_without_truncation() {
        assert_eq!(survey_code(1), "SRV001");
        assert_eq!(survey_code(42), "SRV042");
        assert_eq!(survey_code(1000), "SRV1000");
    }

    #[test]
    fn code_patterns_accept_generated_codes_only() {
        assert!(is_instrument_code("L1001"));
        assert!(is_instrument_code("L1001.201.301"));
        assert!(!is_instrument_code("L1001.201.301.401"));
        assert!(!is_instrument_code("SRV001"));
        assert!(is_survey_code("SRV001"));
        assert!(!is_survey_code("SRV01"));
    }
}
