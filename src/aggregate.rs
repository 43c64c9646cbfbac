//! Deduplicating contact aggregation
//!
//! Groups input rows into logical contacts by a configurable composite key
//! and merges per-row attributes: destinations are normalized and
//! deduplicated by value, labels deduplicated preserving first-seen order,
//! variables merged last-write-wins. Pure over its inputs; rows without a
//! usable name are skipped with a warning rather than failing the batch.

use crate::model::{Contact, ContactMap, Destination, MappingConfig, Record};
use std::collections::{HashMap, HashSet};
use tracing::warn;

/// Normalize a raw destination value: strip every non-digit character, then
/// prefix with `+`. A leading `+` or letter-based extension in the source is
/// lost; a value without any digits normalizes to a bare `+`.
pub fn normalize_destination(raw: &str) -> String {
    let digits: String = raw.chars().filter(char::is_ascii_digit).collect();
    format!("+{digits}")
}

/// Collapse internal whitespace runs to single spaces and trim.
pub fn collapse_spaces(raw: &str) -> String {
    raw.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Non-empty raw values of `group_by_fields` in declared order, joined with
/// `-`. When none are present the key is the contact name itself.
fn group_key(record: &Record, mapping: &MappingConfig, name: &str) -> String {
    let fields: Vec<&str> = mapping
        .group_by_fields
        .iter()
        .map(|field| record.field(field))
        .filter(|value| !value.is_empty())
        .collect();

    if fields.is_empty() {
        name.to_string()
    } else {
        fields.join("-")
    }
}

/// Merge `records` into contacts grouped by the mapping's composite key.
///
/// Records are folded in input order into an owned accumulator map: the
/// first record seen for a key fixes the contact name, destinations and
/// labels accumulate, variables overwrite. A post-pass per group drops
/// duplicate labels (first-seen order kept) and duplicate destinations
/// (unique by normalized value only).
pub fn aggregate(records: &[Record], mapping: &MappingConfig) -> ContactMap {
    let mut groups: ContactMap = HashMap::new();

    for (row, record) in records.iter().enumerate() {
        let name = collapse_spaces(record.field(&mapping.name_field));
        if name.is_empty() {
            warn!(row, "record has empty name, skipping");
            continue;
        }

        let key = group_key(record, mapping, &name);
        let contact = groups.entry(key).or_insert_with(|| Contact {
            name: name.clone(),
            ..Contact::default()
        });

        contact.destinations.push(Destination {
            code: record.field(&mapping.code_field).to_string(),
            destination: normalize_destination(record.field(&mapping.destination_field)),
        });

        for field in &mapping.label_fields {
            contact.labels.push(record.field(field).to_string());
        }

        for field in &mapping.variable_fields {
            let value = record.field(field).to_string();
            if contact.variables.insert(field.clone(), value).is_some() {
                warn!(field = %field, "variable already exists, overwriting");
            }
        }
    }

    for contact in groups.values_mut() {
        dedup_labels(&mut contact.labels);
        dedup_destinations(&mut contact.destinations);
    }

    groups
}

fn dedup_labels(labels: &mut Vec<String>) {
    let mut seen = HashSet::with_capacity(labels.len());
    labels.retain(|label| seen.insert(label.clone()));
}

// TODO: decide whether uniqueness should also consider `code`; today a later
// row with the same destination value but a different code is dropped.
fn dedup_destinations(destinations: &mut Vec<Destination>) {
    let mut seen = HashSet::with_capacity(destinations.len());
    destinations.retain(|d| seen.insert(d.destination.clone()));
}
