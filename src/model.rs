//! Typed shapes for contact aggregation
//!
//! `Record` and `MappingConfig` are the plain input shapes the aggregation
//! core runs on; `Contact` and `Destination` are its output. The
//! `from_dynamic`/`into_dynamic` conversions are the single boundary step
//! between the host's loosely-typed values and these shapes.

use crate::error::{ContactsError, Result};
use crate::value::Dynamic;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// One input row as a string-keyed field mapping.
///
/// Fields the mapping configuration references may be absent; a missing
/// field reads as the empty string rather than failing the row.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Record(HashMap<String, String>);

impl Record {
    pub fn new() -> Self {
        Self::default()
    }

    /// Value of `name`, or `""` when the field is absent.
    pub fn field(&self, name: &str) -> &str {
        self.0.get(name).map(String::as_str).unwrap_or("")
    }

    pub fn set(&mut self, name: impl Into<String>, value: impl Into<String>) {
        self.0.insert(name.into(), value.into());
    }

    /// Decode one row from a host value. The row must be a map; every field
    /// value must be a string (null is tolerated and reads as empty).
    pub fn from_dynamic(value: &Dynamic) -> Result<Self> {
        let map = value
            .as_map()
            .ok_or_else(|| ContactsError::mismatch("map of string", value.type_name()))?;

        let mut fields = HashMap::with_capacity(map.len());
        for (name, field) in map {
            let value = match field {
                Dynamic::String(s) => s.clone(),
                Dynamic::Null => String::new(),
                other => return Err(ContactsError::mismatch("string", other.type_name())),
            };
            fields.insert(name.clone(), value);
        }

        Ok(Self(fields))
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for Record {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self(
            iter.into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        )
    }
}

/// Field-name bindings controlling extraction, grouping and labeling.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MappingConfig {
    /// Field supplying the contact display name. Rows with an empty name
    /// are skipped.
    pub name_field: String,
    /// Field supplying the destination type code.
    pub code_field: String,
    /// Field supplying the raw destination value.
    pub destination_field: String,
    /// Fields whose values become labels, in declared order.
    #[serde(default)]
    pub label_fields: Vec<String>,
    /// Fields whose values become named variables, in declared order.
    #[serde(default)]
    pub variable_fields: Vec<String>,
    /// Fields whose non-empty values, joined with `-`, form the group key.
    /// When empty the key falls back to the contact name.
    #[serde(default)]
    pub group_by_fields: Vec<String>,
}

impl MappingConfig {
    /// Decode the configuration object from a host value. Missing attributes
    /// default to empty; wrongly-typed attributes fail the call.
    pub fn from_dynamic(value: &Dynamic) -> Result<Self> {
        let map = value
            .as_map()
            .ok_or_else(|| ContactsError::mismatch("object", value.type_name()))?;

        Ok(Self {
            name_field: attr_string(map, "name_field")?,
            code_field: attr_string(map, "code_field")?,
            destination_field: attr_string(map, "destination_field")?,
            label_fields: attr_string_list(map, "label_fields")?,
            variable_fields: attr_string_list(map, "variable_fields")?,
            group_by_fields: attr_string_list(map, "group_by_fields")?,
        })
    }
}

fn attr_string(map: &HashMap<String, Dynamic>, name: &str) -> Result<String> {
    match map.get(name) {
        None | Some(Dynamic::Null) => Ok(String::new()),
        Some(Dynamic::String(s)) => Ok(s.clone()),
        Some(other) => Err(ContactsError::mismatch("string", other.type_name())),
    }
}

fn attr_string_list(map: &HashMap<String, Dynamic>, name: &str) -> Result<Vec<String>> {
    let list = match map.get(name) {
        None | Some(Dynamic::Null) => return Ok(Vec::new()),
        Some(Dynamic::List(l)) => l,
        Some(other) => return Err(ContactsError::mismatch("list of string", other.type_name())),
    };

    list.iter()
        .map(|v| {
            v.as_str()
                .map(str::to_string)
                .ok_or_else(|| ContactsError::mismatch("string", v.type_name()))
        })
        .collect()
}

/// A normalized phone-like value paired with a type code.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Destination {
    pub code: String,
    /// Normalized: every non-digit stripped, then prefixed with `+`.
    pub destination: String,
}

impl Destination {
    pub fn into_dynamic(self) -> Dynamic {
        Dynamic::Map(HashMap::from([
            ("code".to_string(), Dynamic::String(self.code)),
            ("destination".to_string(), Dynamic::String(self.destination)),
        ]))
    }
}

/// The aggregated result for one group key.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Contact {
    /// Taken from the first record seen for the key.
    pub name: String,
    /// Unique by normalized destination value, first occurrence wins.
    pub destinations: Vec<Destination>,
    /// Unique, first-seen order preserved.
    pub labels: Vec<String>,
    /// One entry per variable field, last write wins within the group.
    pub variables: HashMap<String, String>,
}

impl Contact {
    pub fn into_dynamic(self) -> Dynamic {
        Dynamic::Map(HashMap::from([
            ("name".to_string(), Dynamic::String(self.name)),
            (
                "labels".to_string(),
                Dynamic::List(self.labels.into_iter().map(Dynamic::String).collect()),
            ),
            (
                "variables".to_string(),
                Dynamic::Map(
                    self.variables
                        .into_iter()
                        .map(|(k, v)| (k, Dynamic::String(v)))
                        .collect(),
                ),
            ),
            (
                "destinations".to_string(),
                Dynamic::List(
                    self.destinations
                        .into_iter()
                        .map(Destination::into_dynamic)
                        .collect(),
                ),
            ),
        ]))
    }
}

/// Aggregation result keyed by group key. Unordered.
pub type ContactMap = HashMap<String, Contact>;
