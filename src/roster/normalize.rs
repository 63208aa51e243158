//! Character search normalization.

use super::display_name;
use crate::models::{CandidateCharacter, RawCharacter};

/// Parse a locale-formatted item level such as `"1,620.83"`.
///
/// Unparseable and non-finite values count as zero.
pub fn parse_item_level(raw: &str) -> f64 {
    raw.replace(',', "")
        .trim()
        .parse()
        .ok()
        .filter(|v: &f64| v.is_finite())
        .unwrap_or(0.0)
}

/// Turn an account's sibling list into assignment candidates.
///
/// The highest item level is the main character (the later record wins a tie);
/// every other character is labelled `Name (Main)`. Output is sorted by item
/// level, highest first.
pub fn normalize_siblings(raw: Vec<RawCharacter>) -> Vec<CandidateCharacter> {
    let parsed: Vec<(RawCharacter, f64)> = raw
        .into_iter()
        .map(|c| {
            let level = parse_item_level(&c.item_avg_level);
            (c, level)
        })
        .collect();

    let Some(main) = parsed
        .iter()
        .reduce(|best, next| if best.1 > next.1 { best } else { next })
        .map(|(c, _)| c.character_name.clone())
    else {
        return Vec::new();
    };

    let mut candidates: Vec<CandidateCharacter> = parsed
        .into_iter()
        .map(|(c, parsed_item_level)| CandidateCharacter {
            display_name: display_name(&c.character_name, &main),
            name: c.character_name,
            class_name: c.character_class_name,
            level: c.character_level,
            item_level: c.item_avg_level,
            parsed_item_level,
            server_name: c.server_name,
        })
        .collect();

    candidates.sort_by(|a, b| b.parsed_item_level.total_cmp(&a.parsed_item_level));
    candidates
}
