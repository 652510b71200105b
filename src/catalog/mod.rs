// SPDX-License-Identifier: PMPL-1.0-or-later

//! Catalog model: one language's key -> string mapping.
//!
//! Locale files are nested JSON trees (`{"invoice": {"title": "Factura"}}`).
//! The rest of the pipeline works on the flat, dotted-key form
//! (`invoice.title -> Factura`). [`flatten`] and [`unflatten`] convert
//! between the two and refuse ambiguous input instead of silently picking
//! a winner.

use serde_json::{Map, Value};
use std::collections::BTreeMap;
use thiserror::Error;

/// Separator between path segments of a translation key.
pub const KEY_SEPARATOR: char = '.';

#[derive(Debug, Error, PartialEq, Eq)]
pub enum CatalogError {
    #[error("key collision: '{key}' is produced by more than one path")]
    KeyCollision { key: String },

    #[error("unsupported value at '{path}': only strings and nested objects are allowed")]
    UnsupportedLeaf { path: String },

    #[error("catalog root must be an object")]
    NotAnObject,

    #[error("path conflict at '{key}': key is both a value and a parent")]
    PathConflict { key: String },
}

/// Flat translation catalog, ordered by key.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Catalog {
    entries: BTreeMap<String, String>,
}

impl Catalog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.entries.get(key).map(String::as_str)
    }

    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<String>) -> Option<String> {
        self.entries.insert(key.into(), value.into())
    }

    pub fn remove(&mut self, key: &str) -> Option<String> {
        self.entries.remove(key)
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.entries.contains_key(key)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries
            .iter()
            .map(|(key, value)| (key.as_str(), value.as_str()))
    }
}

impl FromIterator<(String, String)> for Catalog {
    fn from_iter<I: IntoIterator<Item = (String, String)>>(iter: I) -> Self {
        Self {
            entries: iter.into_iter().collect(),
        }
    }
}

impl IntoIterator for Catalog {
    type Item = (String, String);
    type IntoIter = std::collections::btree_map::IntoIter<String, String>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.into_iter()
    }
}

/// Flatten a nested translation tree into dotted keys.
///
/// `null` leaves are treated as absent. Numbers, booleans and arrays are
/// rejected, as is any pair of paths that flatten to the same key.
pub fn flatten(nested: &Value) -> Result<Catalog, CatalogError> {
    let Value::Object(root) = nested else {
        return Err(CatalogError::NotAnObject);
    };
    let mut catalog = Catalog::new();
    flatten_into(root, "", &mut catalog)?;
    Ok(catalog)
}

fn flatten_into(map: &Map<String, Value>, prefix: &str, out: &mut Catalog) -> Result<(), CatalogError> {
    for (segment, value) in map {
        let path = if prefix.is_empty() {
            segment.clone()
        } else {
            format!("{}{}{}", prefix, KEY_SEPARATOR, segment)
        };
        match value {
            Value::Object(child) => flatten_into(child, &path, out)?,
            Value::String(text) => {
                if out.contains_key(&path) {
                    return Err(CatalogError::KeyCollision { key: path });
                }
                out.insert(path, text.clone());
            }
            Value::Null => {}
            _ => return Err(CatalogError::UnsupportedLeaf { path }),
        }
    }
    Ok(())
}

/// Rebuild the nested tree from a flat catalog.
pub fn unflatten(catalog: &Catalog) -> Result<Value, CatalogError> {
    let mut root = Map::new();
    for (key, value) in catalog.iter() {
        let segments: Vec<&str> = key.split(KEY_SEPARATOR).collect();
        if segments.iter().any(|segment| segment.is_empty()) {
            return Err(CatalogError::PathConflict {
                key: key.to_string(),
            });
        }
        insert_path(&mut root, &segments, value, key)?;
    }
    Ok(Value::Object(root))
}

fn insert_path(
    map: &mut Map<String, Value>,
    segments: &[&str],
    value: &str,
    key: &str,
) -> Result<(), CatalogError> {
    let conflict = || CatalogError::PathConflict {
        key: key.to_string(),
    };
    match segments {
        [] => Err(conflict()),
        [leaf] => {
            if map.contains_key(*leaf) {
                return Err(conflict());
            }
            map.insert((*leaf).to_string(), Value::String(value.to_string()));
            Ok(())
        }
        [head, rest @ ..] => {
            let child = map
                .entry((*head).to_string())
                .or_insert_with(|| Value::Object(Map::new()));
            match child {
                Value::Object(child_map) => insert_path(child_map, rest, value, key),
                _ => Err(conflict()),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_flatten_joins_nested_segments() {
        let nested = json!({
            "invoice": {"title": "Factura", "list": {"empty": "Sin facturas"}},
            "save": "Guardar"
        });
        let catalog = flatten(&nested).unwrap();
        assert_eq!(catalog.len(), 3);
        assert_eq!(catalog.get("invoice.title"), Some("Factura"));
        assert_eq!(catalog.get("invoice.list.empty"), Some("Sin facturas"));
        assert_eq!(catalog.get("save"), Some("Guardar"));
    }

    #[test]
    fn test_flatten_handles_deep_nesting() {
        let mut nested = json!("leaf");
        for depth in (0..64).rev() {
            let mut level = Map::new();
            level.insert(format!("n{}", depth), nested);
            nested = Value::Object(level);
        }
        let catalog = flatten(&nested).unwrap();
        assert_eq!(catalog.len(), 1);
        let key = catalog.keys().next().unwrap();
        assert_eq!(key.split('.').count(), 64);
    }

    #[test]
    fn test_round_trip_restores_tree() {
        let nested = json!({
            "clients": {
                "list": {"title": "Clientes"},
                "detail": {"title": "Cliente", "notes": "Notas"}
            },
            "common": {"ok": "Aceptar"}
        });
        let catalog = flatten(&nested).unwrap();
        assert_eq!(unflatten(&catalog).unwrap(), nested);
    }

    #[test]
    fn test_flatten_rejects_colliding_paths() {
        let nested = json!({"a.b": "dotted", "a": {"b": "nested"}});
        let err = flatten(&nested).unwrap_err();
        assert_eq!(
            err,
            CatalogError::KeyCollision {
                key: "a.b".to_string()
            }
        );
    }

    #[test]
    fn test_flatten_rejects_non_string_leaves() {
        let err = flatten(&json!({"count": 3})).unwrap_err();
        assert!(matches!(err, CatalogError::UnsupportedLeaf { path } if path == "count"));
        assert_eq!(flatten(&json!(["a"])).unwrap_err(), CatalogError::NotAnObject);
    }

    #[test]
    fn test_flatten_skips_null_leaves() {
        let catalog = flatten(&json!({"a": null, "b": "x"})).unwrap();
        assert_eq!(catalog.len(), 1);
        assert!(!catalog.contains_key("a"));
    }

    #[test]
    fn test_unflatten_rejects_leaf_parent_conflict() {
        let mut catalog = Catalog::new();
        catalog.insert("menu", "Menú");
        catalog.insert("menu.open", "Abrir");
        assert!(matches!(
            unflatten(&catalog),
            Err(CatalogError::PathConflict { .. })
        ));
    }

    #[test]
    fn test_unflatten_rejects_empty_segments() {
        let mut catalog = Catalog::new();
        catalog.insert("menu..open", "Abrir");
        assert!(unflatten(&catalog).is_err());
    }
}
