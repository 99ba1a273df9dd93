//! Record extraction from response bodies
//!
//! Every extractor takes ownership of the parsed body and returns a lazy
//! iterator. Missing keys and non-object entries produce no records.

use super::definition::{ChildEvents, Extraction};
use crate::types::{JsonObject, JsonValue, Record};

/// Lazy, finite, single-pass record sequence
pub type Records = Box<dyn Iterator<Item = Record> + Send>;

/// Extract records from `body` according to `extraction`
pub(crate) fn extract(
    mut body: JsonObject,
    list_name: &str,
    extraction: &Extraction,
    cursor_field: Option<&str>,
) -> Records {
    let Some(payload) = body.remove(list_name) else {
        return Box::new(std::iter::empty());
    };

    match extraction {
        Extraction::List => objects(payload),
        Extraction::Object => match payload {
            JsonValue::Object(record) => Box::new(std::iter::once(record)),
            _ => Box::new(std::iter::empty()),
        },
        Extraction::RoutingConditions => routing_conditions(payload),
        Extraction::ChildEvents(config) => {
            child_events(payload, config.clone(), cursor_field.map(ToString::to_string))
        }
    }
}

/// Array entries that are JSON objects
fn objects(payload: JsonValue) -> Records {
    match payload {
        JsonValue::Array(items) => Box::new(items.into_iter().filter_map(into_object)),
        _ => Box::new(std::iter::empty()),
    }
}

fn into_object(value: JsonValue) -> Option<Record> {
    match value {
        JsonValue::Object(map) => Some(map),
        _ => None,
    }
}

fn routing_conditions(payload: JsonValue) -> Records {
    let JsonValue::Object(mut definitions) = payload else {
        return Box::new(std::iter::empty());
    };

    let mut groups = Vec::new();
    for (key, condition) in [("conditions_all", "all"), ("conditions_any", "any")] {
        if let Some(list) = definitions.remove(key) {
            groups.push((condition, list));
        }
    }

    Box::new(groups.into_iter().flat_map(|(condition, list)| {
        objects(list).map(move |mut record| {
            record.insert(
                "condition".to_string(),
                JsonValue::String(condition.to_string()),
            );
            record
        })
    }))
}

fn child_events(
    payload: JsonValue,
    config: ChildEvents,
    cursor_field: Option<String>,
) -> Records {
    Box::new(
        objects(payload)
            .flat_map(move |event| explode_event(event, &config, cursor_field.as_deref())),
    )
}

/// Turn one export event into its matching child records.
///
/// A child is kept when its own `event_type` matches, or when the parent
/// event itself is of the configured type. Each kept child gets the parent
/// fields merged in, and the parent's cursor value when it has none.
fn explode_event(
    mut event: Record,
    config: &ChildEvents,
    cursor_field: Option<&str>,
) -> Vec<Record> {
    let parent_matches = type_of(&event) == Some(config.event_type.as_str());

    let Some(JsonValue::Array(children)) = event.remove(&config.target_entity) else {
        return Vec::new();
    };

    children
        .into_iter()
        .filter_map(into_object)
        .filter(|child| parent_matches || type_of(child) == Some(config.event_type.as_str()))
        .map(|mut child| {
            for field in &config.parent_fields {
                let value = event.get(field).cloned().unwrap_or(JsonValue::Null);
                child.insert(field.clone(), value);
            }
            if let Some(field) = cursor_field {
                if !child.contains_key(field) {
                    if let Some(value) = event.get(field) {
                        child.insert(field.to_string(), value.clone());
                    }
                }
            }
            child
        })
        .collect()
}

/// `event_type` (children, audits) or `type` (export events)
fn type_of(record: &Record) -> Option<&str> {
    record
        .get("event_type")
        .or_else(|| record.get("type"))
        .and_then(JsonValue::as_str)
}
