use std::collections::BTreeMap;

use serde::Serialize;

use crate::core::circuit::Subscriber;

const STF_TAG: &str = "STF";

/// A raw product token as shown on a subscriber card, with the category it
/// is counted under.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ProductBadge {
    pub label: String,
    pub tag: Option<String>,
}

fn raw_tokens(raw: &str) -> impl Iterator<Item = &str> {
    raw.split(|c: char| c == ',' || c.is_whitespace())
        .filter(|token| !token.is_empty())
}

/// Strip digits and non-word characters from a product code.
///
/// Returns `None` when nothing is left ("123", "--").
pub fn normalize_tag(token: &str) -> Option<String> {
    let tag: String = token
        .chars()
        .filter(|c| !c.is_ascii_digit())
        .filter(|c| c.is_ascii_alphanumeric() || *c == '_')
        .collect();
    (!tag.is_empty()).then_some(tag)
}

/// Normalized tags of a raw product field, in field order.
pub fn product_tags(raw: &str) -> Vec<String> {
    raw_tokens(raw).filter_map(normalize_tag).collect()
}

/// One badge per raw token, categorised by its normalized tag.
pub fn product_badges(raw: &str) -> Vec<ProductBadge> {
    raw_tokens(raw)
        .map(|token| ProductBadge {
            label: token.to_string(),
            tag: normalize_tag(token),
        })
        .collect()
}

/// Cover sheet counts: occurrences of each tag, sorted by tag.
pub fn product_counts(subscribers: &[Subscriber]) -> Vec<(String, usize)> {
    let mut counts: BTreeMap<String, usize> = BTreeMap::new();
    for subscriber in subscribers {
        for tag in product_tags(&subscriber.product) {
            *counts.entry(tag).or_default() += 1;
        }
    }
    counts.into_iter().collect()
}

pub fn is_stf_tag(tag: &str) -> bool {
    tag.eq_ignore_ascii_case(STF_TAG)
}

pub fn has_stf_product(subscriber: &Subscriber) -> bool {
    product_tags(&subscriber.product)
        .iter()
        .any(|tag| is_stf_tag(tag))
}

/// Subscribers left on screen, paired with their index in the circuit.
///
/// With `hide_stf` set, stops carrying any STF product are skipped. The
/// index stays the circuit index so delivery state lines up.
pub fn visible_subscribers(
    subscribers: &[Subscriber],
    hide_stf: bool,
) -> Vec<(usize, &Subscriber)> {
    subscribers
        .iter()
        .enumerate()
        .filter(|(_, subscriber)| !hide_stf || !has_stf_product(subscriber))
        .collect()
}
