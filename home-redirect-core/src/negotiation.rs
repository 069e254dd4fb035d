//! `Accept-Language` negotiation against the enabled site languages.
//!
//! Qualities are kept in thousandths so that `q=0.9` and `q=0.90` compare
//! equal. A generic tag missing from the header (`fr` when only `fr-CH` was
//! sent) is derived from its lowest-weighted specific tag, just below it, so
//! the specific tag still wins when the site offers both.

use regex::Regex;
use std::collections::HashMap;
use std::sync::OnceLock;

/// Quality of an entry without `;q=`.
const DEFAULT_QUALITY: f64 = 1000.0;

/// Gap between a specific tag and the generic tag derived from it.
const GENERIC_TAG_PENALTY: f64 = 0.1;

fn range_regex() -> &'static Regex {
    static RANGE_REGEX: OnceLock<Regex> = OnceLock::new();
    RANGE_REGEX.get_or_init(|| {
        Regex::new(r"^([a-zA-Z-]+|\*)(?:\s*;\s*q=([0-9.]+))?$").expect("Invalid regex pattern")
    })
}

/// Parse an `Accept-Language` value into lower-cased ranges and qualities.
///
/// Mappings are applied before qualities are merged, so two browser codes
/// mapped to the same site code keep the higher quality of the two.
pub fn parse_accept_language(
    header: &str,
    mappings: &HashMap<String, String>,
) -> HashMap<String, f64> {
    let mut ranges: HashMap<String, f64> = HashMap::new();

    for entry in header.split(',') {
        let Some(caps) = range_regex().captures(entry.trim()) else {
            continue;
        };

        let mut tag = caps[1].to_ascii_lowercase();
        if let Some(mapped) = mappings
            .iter()
            .find(|(browser, _)| browser.eq_ignore_ascii_case(&tag))
            .map(|(_, site)| site.to_ascii_lowercase())
        {
            tag = mapped;
        }

        let quality = match caps.get(2) {
            Some(q) => match q.as_str().parse::<f64>() {
                Ok(q) => (q * 1000.0).trunc(),
                Err(_) => continue,
            },
            None => DEFAULT_QUALITY,
        };

        let entry = ranges.entry(tag).or_insert(0.0);
        *entry = entry.max(quality);
    }

    let mut specific: Vec<(String, f64)> = ranges.iter().map(|(k, v)| (k.clone(), *v)).collect();
    specific.sort_by(|a, b| a.1.total_cmp(&b.1));

    for (tag, quality) in specific {
        let generic = generic_tag(&tag);
        if !generic.is_empty() && !ranges.contains_key(generic) {
            ranges.insert(generic.to_string(), quality - GENERIC_TAG_PENALTY);
        }
    }

    ranges
}

/// `zh-hant-tw` → `zh-hant`, `fr-ch` → `fr`.
///
/// Chinese script subtags are part of the generic tag since no site offers a
/// bare `zh`.
fn generic_tag(tag: &str) -> &str {
    if tag.len() > 7 && (tag.starts_with("zh-hant") || tag.starts_with("zh-hans")) {
        return &tag[..7];
    }
    tag.split('-').next().unwrap_or(tag)
}

/// Pick the site language the browser prefers most.
///
/// Each site language takes the quality of the longest declared range that
/// is a prefix of it (`pt-br` falls back to `pt`), or the `*` quality.
/// Only a quality strictly above zero can win; ties keep the language listed
/// first. Returns `None` when nothing matches.
pub fn best_matching_langcode<'a, I>(
    accept_language: &str,
    langcodes: I,
    mappings: &HashMap<String, String>,
) -> Option<&'a str>
where
    I: IntoIterator<Item = &'a str>,
{
    let ranges = parse_accept_language(accept_language, mappings);
    let wildcard = ranges.get("*").copied().unwrap_or(0.0);

    let mut best = None;
    let mut max_quality = 0.0;

    for langcode in langcodes {
        let lower = langcode.to_ascii_lowercase();
        let mut quality = wildcard;
        let mut prefix = lower.as_str();
        loop {
            if let Some(q) = ranges.get(prefix) {
                quality = *q;
                break;
            }
            match prefix.rfind('-') {
                Some(i) => prefix = &prefix[..i],
                None => break,
            }
        }

        if quality > max_quality {
            best = Some(langcode);
            max_quality = quality;
        }
    }

    best
}
