//! Reshaping of raw result rows into what the events table expects.

use std::collections::{HashMap, HashSet};

use serde_json::{json, Map, Value};

use super::collaborators::ElementChainDecoder;
use super::models::Person;
use super::SELECT_STAR_FROM_EVENTS_FIELDS;
use crate::errors::HogQLError;

/// Replace the `*` tuple at `star_idx` with an object keyed by the star field names.
///
/// `properties` arrives as serialized JSON and is parsed; a non-empty
/// `elements_chain` is additionally decoded into an `elements` list.
pub fn expand_star_column(
    results: &mut [Vec<Value>],
    star_idx: usize,
    decoder: &dyn ElementChainDecoder,
) -> Result<(), HogQLError> {
    for row in results.iter_mut() {
        let width = row.len();
        let Some(cell) = row.get_mut(star_idx) else {
            return Err(HogQLError::validation(format!(
                "Expected the '*' column at position {}, but the row has {} column(s)",
                star_idx, width
            )));
        };
        let values = match cell.take() {
            Value::Array(values) => values,
            other => {
                return Err(HogQLError::validation(format!(
                    "Expected a tuple in the '*' column, found {}",
                    other
                )))
            }
        };

        let mut event: Map<String, Value> = SELECT_STAR_FROM_EVENTS_FIELDS
            .iter()
            .map(|field| field.to_string())
            .zip(values)
            .collect();
        if let Some(Value::String(raw)) = event.get("properties") {
            let properties: Value = serde_json::from_str(raw).map_err(HogQLError::execution)?;
            event.insert("properties".to_string(), properties);
        }
        let elements = match event.get("elements_chain") {
            Some(Value::String(chain)) if !chain.is_empty() => Some(decoder.decode_chain(chain)),
            _ => None,
        };
        if let Some(elements) = elements {
            event.insert(
                "elements".to_string(),
                serde_json::to_value(elements).map_err(HogQLError::execution)?,
            );
        }
        *cell = Value::Object(event);
    }
    Ok(())
}

fn distinct_id_of(cell: &Value) -> String {
    match cell {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

/// Unique distinct ids found in the given columns, in first-seen order.
pub fn collect_distinct_ids(results: &[Vec<Value>], columns: &[usize]) -> Vec<String> {
    let mut seen = HashSet::new();
    let mut distinct_ids = Vec::new();
    for row in results {
        for &idx in columns {
            if let Some(cell) = row.get(idx) {
                let distinct_id = distinct_id_of(cell);
                if seen.insert(distinct_id.clone()) {
                    distinct_ids.push(distinct_id);
                }
            }
        }
    }
    distinct_ids
}

/// Swap each distinct id in `columns` for a person summary.
///
/// Unknown distinct ids become `{"distinct_id": ...}`.
pub fn attach_persons(results: &mut [Vec<Value>], columns: &[usize], persons: &[Person]) {
    let mut by_distinct_id: HashMap<&str, &Person> = HashMap::new();
    for person in persons {
        for distinct_id in &person.distinct_ids {
            by_distinct_id.insert(distinct_id.as_str(), person);
        }
    }

    for row in results.iter_mut() {
        for &idx in columns {
            let Some(cell) = row.get_mut(idx) else {
                continue;
            };
            let distinct_id = distinct_id_of(cell);
            *cell = match by_distinct_id.get(distinct_id.as_str()) {
                Some(person) => json!({
                    "uuid": person.uuid,
                    "created_at": person.created_at,
                    "properties": person.properties.clone().unwrap_or_else(|| json!({})),
                    "distinct_id": distinct_id,
                }),
                None => json!({ "distinct_id": distinct_id }),
            };
        }
    }
}

/// Drop the lookahead row fetched with `limit` (the requested limit plus one).
/// Returns whether a further page exists.
pub fn trim_lookahead<T>(results: &mut Vec<T>, limit: usize) -> bool {
    let has_more = results.len() == limit;
    if has_more {
        results.truncate(limit.saturating_sub(1));
    }
    has_more
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::events_query::elements::DefaultElementChainDecoder;
    use chrono::{TimeZone, Utc};
    use uuid::Uuid;

    fn star_row(properties: &str, elements_chain: &str) -> Vec<Value> {
        vec![
            json!([
                "0186f4a0-0000-0000-0000-000000000001",
                "$pageview",
                properties,
                "2023-01-01 00:00:00",
                1,
                "user-1",
                elements_chain,
                "2023-01-01 00:00:01"
            ]),
            json!("$pageview"),
        ]
    }

    #[test]
    fn test_expand_star_column() {
        let mut results = vec![star_row(r#"{"$browser": "Chrome"}"#, "")];
        expand_star_column(&mut results, 0, &DefaultElementChainDecoder).unwrap();
        let event = results[0][0].as_object().unwrap();
        let keys: Vec<&str> = event.keys().map(String::as_str).collect();
        assert_eq!(keys, SELECT_STAR_FROM_EVENTS_FIELDS);
        assert_eq!(event["properties"], json!({"$browser": "Chrome"}));
        assert_eq!(event["distinct_id"], json!("user-1"));
        assert!(!event.contains_key("elements"));
        assert_eq!(results[0][1], json!("$pageview"));
    }

    #[test]
    fn test_expand_star_column_decodes_elements() {
        let mut results = vec![star_row("{}", r#"a:href="/x";body"#)];
        expand_star_column(&mut results, 0, &DefaultElementChainDecoder).unwrap();
        let elements = results[0][0]["elements"].as_array().unwrap();
        assert_eq!(elements.len(), 2);
        assert_eq!(elements[0]["tag_name"], json!("a"));
        assert_eq!(elements[0]["href"], json!("/x"));
        assert_eq!(elements[1]["order"], json!(1));
    }

    #[test]
    fn test_expand_star_column_rejects_bad_shapes() {
        let mut not_a_tuple = vec![vec![json!("oops")]];
        assert!(matches!(
            expand_star_column(&mut not_a_tuple, 0, &DefaultElementChainDecoder),
            Err(HogQLError::Validation(_))
        ));
        let mut bad_json = vec![star_row("{not json", "")];
        assert!(matches!(
            expand_star_column(&mut bad_json, 0, &DefaultElementChainDecoder),
            Err(HogQLError::Execution(_))
        ));
        let mut short_row = vec![vec![json!("a")]];
        let err = expand_star_column(&mut short_row, 1, &DefaultElementChainDecoder).unwrap_err();
        assert_eq!(
            err.to_string(),
            "Expected the '*' column at position 1, but the row has 1 column(s)"
        );
    }

    #[test]
    fn test_attach_persons() {
        let person = Person {
            id: 1,
            uuid: Uuid::nil(),
            created_at: Utc.with_ymd_and_hms(2022, 5, 1, 0, 0, 0).unwrap(),
            properties: None,
            distinct_ids: vec!["a".to_string(), "b".to_string()],
        };
        let mut results = vec![
            vec![json!("a"), json!("x")],
            vec![json!("b"), json!("y")],
            vec![json!("c"), json!("z")],
        ];
        assert_eq!(collect_distinct_ids(&results, &[0]), vec!["a", "b", "c"]);

        attach_persons(&mut results, &[0], &[person]);
        assert_eq!(
            results[0][0],
            json!({
                "uuid": "00000000-0000-0000-0000-000000000000",
                "created_at": "2022-05-01T00:00:00Z",
                "properties": {},
                "distinct_id": "a",
            })
        );
        assert_eq!(results[1][0]["distinct_id"], json!("b"));
        assert_eq!(results[2][0], json!({"distinct_id": "c"}));
        assert_eq!(results[2][1], json!("z"));
    }

    #[test]
    fn test_trim_lookahead() {
        let mut full: Vec<Value> = (0..11).map(|i| json!(i)).collect();
        assert!(trim_lookahead(&mut full, 11));
        assert_eq!(full.len(), 10);

        let mut short: Vec<Value> = (0..4).map(|i| json!(i)).collect();
        assert!(!trim_lookahead(&mut short, 11));
        assert_eq!(short.len(), 4);
    }
}
