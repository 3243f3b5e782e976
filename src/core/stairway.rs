use std::{collections::BTreeMap, sync::LazyLock};

use regex::Regex;

use crate::core::circuit::Subscriber;

/// "<street> <number> <LETTER>" optionally followed by a flat number.
static STAIRWAY_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(.+?\s+\d+)\s+([A-Z])(?:\s|$)").expect("stairway pattern is valid")
});

const RULE_WIDTH: usize = 80;

/// Split a full address into building address and stairway letter.
///
/// Only a single uppercase letter right after the house number counts as a
/// stairway, so notations like "as 4" or "lii 1" keep the whole address.
pub fn parse_stairway(address: &str) -> (String, Option<char>) {
    let address = address.trim_matches('"');
    match STAIRWAY_PATTERN.captures(address) {
        Some(caps) => {
            let base = caps[1].to_string();
            let letter = caps[2].chars().next();
            (base, letter)
        }
        None => (address.to_string(), None),
    }
}

#[derive(Debug, Clone)]
pub struct StairwayGroup<'a> {
    pub letter: Option<char>,
    /// Stops with their index in the circuit, in delivery order.
    pub stops: Vec<(usize, &'a Subscriber)>,
}

#[derive(Debug, Clone)]
pub struct Building<'a> {
    pub base_address: String,
    pub stairways: Vec<StairwayGroup<'a>>,
}

impl Building<'_> {
    pub fn has_stairways(&self) -> bool {
        self.stairways.iter().any(|group| group.letter.is_some())
    }

    pub fn stop_count(&self) -> usize {
        self.stairways.iter().map(|group| group.stops.len()).sum()
    }
}

/// Group a circuit's stops by building, then by stairway.
///
/// The address field as written in the file decides the building. Buildings
/// are sorted by address. Lettered stairways come first in letter
/// order, followed by stops without a stairway.
pub fn group_by_stairway(subscribers: &[Subscriber]) -> Vec<Building<'_>> {
    // `None` sorts before `Some`, so the unlettered group is keyed separately.
    let mut buildings: BTreeMap<String, (BTreeMap<char, Vec<_>>, Vec<_>)> = BTreeMap::new();
    for (index, subscriber) in subscribers.iter().enumerate() {
        let (base, letter) = parse_stairway(&subscriber.full_address);
        let (lettered, other) = buildings.entry(base).or_default();
        match letter {
            Some(letter) => lettered.entry(letter).or_default().push((index, subscriber)),
            None => other.push((index, subscriber)),
        }
    }

    buildings
        .into_iter()
        .map(|(base_address, (lettered, other))| {
            let mut stairways: Vec<StairwayGroup> = lettered
                .into_iter()
                .map(|(letter, stops)| StairwayGroup {
                    letter: Some(letter),
                    stops,
                })
                .collect();
            if !other.is_empty() {
                stairways.push(StairwayGroup {
                    letter: None,
                    stops: other,
                });
            }
            Building {
                base_address,
                stairways,
            }
        })
        .collect()
}

/// Plain-text delivery list grouped by building and stairway.
pub fn format_stairway_report(title: &str, buildings: &[Building<'_>]) -> String {
    let heavy = "=".repeat(RULE_WIDTH);
    let light = "-".repeat(RULE_WIDTH);
    let mut lines = vec![
        heavy.clone(),
        format!("{title} - grouped by stairway"),
        heavy.clone(),
    ];

    for building in buildings {
        let lettered = building.has_stairways();
        lines.push(String::new());
        lines.push(light.clone());
        if lettered {
            lines.push(format!("BUILDING: {}", building.base_address));
        } else {
            lines.push(format!("ADDRESS (no stairways): {}", building.base_address));
        }
        lines.push(light.clone());

        for group in &building.stairways {
            let indent = if lettered { "    " } else { "  " };
            if lettered {
                lines.push(String::new());
                lines.push(match group.letter {
                    Some(letter) => format!("  STAIRWAY {letter}:"),
                    None => "  Other addresses (no stairway):".to_string(),
                });
            }
            for (_, stop) in &group.stops {
                lines.push(format!(
                    "{indent}{:30} | {:25} | {}",
                    stop.full_address, stop.name, stop.product
                ));
            }
        }
    }

    let total: usize = buildings.iter().map(Building::stop_count).sum();
    lines.push(String::new());
    lines.push(heavy.clone());
    lines.push(format!("Total {total} orders"));
    lines.push(heavy);
    lines.join("\n")
}
