//! Expansion of bracket-notation parameter keys into nested maps.
//!
//! The grammar follows the common HTML form conventions:
//!
//! | Key | Result |
//! |---|---|
//! | `name=v` | `{name: "v"}` (last value wins) |
//! | `user[name]=v` | `{user: {name: "v"}}` |
//! | `ids[]=1&ids[]=2` | `{ids: ["1", "2"]}` |
//! | `items[][url]=a&items[][url]=b` | `{items: [{url: "a"}, {url: "b"}]}` |
//! | `items[0][url]=a&items[1][url]=b` | `{items: [{url: "a"}, {url: "b"}]}` |
//!
//! Maps whose keys are all decimal indexes are turned into lists ordered by
//! index. A key with unbalanced brackets is kept verbatim as a plain name.
//! Values stay strings; coercion belongs to the contract.

use nestform_core::{Value, ValueMap};

#[derive(Debug, Clone, PartialEq, Eq)]
enum Segment {
    Key(String),
    Push,
}

/// Expands `(key, value)` pairs into a nested map.
///
/// Pairs must come in request order: a repeated key under `[]` starts the
/// next list element.
pub fn expand<'a, I>(pairs: I) -> ValueMap
where
    I: IntoIterator<Item = (&'a str, &'a str)>,
{
    let mut root = Value::Map(ValueMap::new());

    for (key, value) in pairs {
        insert(&mut root, &parse_key(key), value);
    }

    match listify(root) {
        Value::Map(map) => map,
        _ => ValueMap::new(),
    }
}

/// Splits `a[b][][c]` into `[Key(a), Key(b), Push, Key(c)]`.
fn parse_key(key: &str) -> Vec<Segment> {
    let Some(open) = key.find('[') else {
        return vec![Segment::Key(key.to_string())];
    };
    if open == 0 {
        return vec![Segment::Key(key.to_string())];
    }

    let mut segments = vec![Segment::Key(key[..open].to_string())];
    let mut rest = &key[open..];
    while !rest.is_empty() {
        let Some(inner) = rest.strip_prefix('[') else {
            return vec![Segment::Key(key.to_string())];
        };
        let Some(close) = inner.find(']') else {
            return vec![Segment::Key(key.to_string())];
        };
        let name = &inner[..close];
        segments.push(if name.is_empty() {
            Segment::Push
        } else {
            Segment::Key(name.to_string())
        });
        rest = &inner[close + 1..];
    }
    segments
}

fn insert(slot: &mut Value, segments: &[Segment], value: &str) {
    let Some((head, rest)) = segments.split_first() else {
        *slot = Value::String(value.to_string());
        return;
    };

    match head {
        Segment::Key(name) => {
            if !matches!(slot, Value::Map(_)) {
                *slot = Value::Map(ValueMap::new());
            }
            if let Value::Map(map) = slot {
                let child = map.entry(name.clone()).or_insert(Value::Null);
                insert(child, rest, value);
            }
        }
        Segment::Push => {
            if !matches!(slot, Value::List(_)) {
                *slot = Value::List(Vec::new());
            }
            let Value::List(items) = slot else {
                return;
            };
            match rest.first() {
                None => items.push(Value::String(value.to_string())),
                Some(Segment::Key(next)) => {
                    // A repeated key opens the next element.
                    let reuse = matches!(
                        items.last(),
                        Some(Value::Map(last)) if !last.contains_key(next)
                    );
                    if !reuse {
                        items.push(Value::Map(ValueMap::new()));
                    }
                    if let Some(last) = items.last_mut() {
                        insert(last, rest, value);
                    }
                }
                Some(Segment::Push) => {
                    let mut child = Value::Null;
                    insert(&mut child, rest, value);
                    items.push(child);
                }
            }
        }
    }
}

/// Converts index-keyed maps into lists, recursively.
fn listify(value: Value) -> Value {
    match value {
        Value::Map(map) => {
            let indexed = !map.is_empty()
                && map
                    .keys()
                    .all(|k| !k.is_empty() && k.bytes().all(|b| b.is_ascii_digit()));
            if indexed {
                let mut entries: Vec<(usize, Value)> = map
                    .into_iter()
                    .map(|(k, v)| (k.parse::<usize>().unwrap_or(usize::MAX), listify(v)))
                    .collect();
                entries.sort_by_key(|(idx, _)| *idx);
                Value::List(entries.into_iter().map(|(_, v)| v).collect())
            } else {
                Value::Map(map.into_iter().map(|(k, v)| (k, listify(v))).collect())
            }
        }
        Value::List(items) => Value::List(items.into_iter().map(listify).collect()),
        other => other,
    }
}
