//! Compression Module
//!
//! Lossy field pruning for cached API responses. Roster and team-list payloads
//! carry many fields the views never read back out of cache; pruning them to a
//! fixed allow-list trades fidelity for memory footprint.
//!
//! This is NOT reversible compression: dropped fields are gone. Callers must
//! not assume a cached value retains every field the original response had.

use serde_json::{Map, Value};

// == Allow-Lists ==
/// Fields retained per roster item. Everything else is dropped.
const ROSTER_FIELDS: &[&str] = &[
    "player_id",
    "name",
    "jersey_number",
    "position",
    "height",
    "age",
];

/// Fields retained per roster item under its nested `stats` object.
const ROSTER_STAT_FIELDS: &[&str] = &["ppg", "rpg", "apg"];

/// Fields retained per team in a team-list payload.
const TEAM_FIELDS: &[&str] = &[
    "id",
    "full_name",
    "abbreviation",
    "city",
    "conference",
    "division",
];

/// Marker inserted on pruned payloads, stripped again by [`decompress`].
const COMPRESSED_MARKER: &str = "_compressed";

// == Compress ==
/// Prunes recognized payload shapes down to their allow-lists.
///
/// Recognized shapes:
/// - roster-shaped: an object with a `roster` array (team detail responses)
/// - team-list-shaped: an object with a `teams` array
///
/// Other top-level fields of a recognized payload pass through untouched, and
/// unrecognized values pass through whole.
pub fn compress(value: Value) -> Value {
    let Value::Object(mut map) = value else {
        return value;
    };

    let mut pruned = false;

    if let Some(Value::Array(roster)) = map.get("roster") {
        let compact: Vec<Value> = roster.iter().map(prune_roster_item).collect();
        map.insert("roster".to_string(), Value::Array(compact));
        pruned = true;
    }

    if let Some(Value::Array(teams)) = map.get("teams") {
        let compact: Vec<Value> = teams
            .iter()
            .map(|team| prune_fields(team, TEAM_FIELDS))
            .collect();
        map.insert("teams".to_string(), Value::Array(compact));
        pruned = true;
    }

    if pruned {
        map.insert(COMPRESSED_MARKER.to_string(), Value::Bool(true));
    }

    Value::Object(map)
}

// == Decompress ==
/// Strips the compression marker. Pruning is lossy, so this cannot restore
/// dropped fields; it exists as the symmetry hook for a future real scheme.
pub fn decompress(mut value: Value) -> Value {
    if let Value::Object(ref mut map) = value {
        map.remove(COMPRESSED_MARKER);
    }
    value
}

// == Pruning Helpers ==
/// Keeps the roster allow-list plus a pruned `stats` sub-object when present.
fn prune_roster_item(item: &Value) -> Value {
    let mut compact = match prune_fields(item, ROSTER_FIELDS) {
        Value::Object(map) => map,
        other => return other,
    };

    if let Some(stats) = item.get("stats") {
        let kept = if stats.is_object() {
            prune_fields(stats, ROSTER_STAT_FIELDS)
        } else {
            Value::Null
        };
        compact.insert("stats".to_string(), kept);
    }

    Value::Object(compact)
}

/// Copies only the allow-listed fields out of an object. Non-objects pass
/// through unchanged.
fn prune_fields(value: &Value, allow: &[&str]) -> Value {
    let Value::Object(source) = value else {
        return value.clone();
    };

    let mut kept = Map::new();
    for &field in allow {
        if let Some(v) = source.get(field) {
            kept.insert(field.to_string(), v.clone());
        }
    }
    Value::Object(kept)
}
