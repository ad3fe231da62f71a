use std::{
    collections::HashMap,
    sync::{Mutex, OnceLock},
};

use serde::{Deserialize, Serialize};

use crate::Vector3;

static DEBUG_MAP: OnceLock<Mutex<DebugMap>> = OnceLock::new();

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DebugColor {
    #[default]
    White,
    Cyan,
    Red,
    Green,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "data")]
pub enum DebugShape {
    Line {
        start: Vector3,
        end: Vector3,
        color: DebugColor,
    },
    Rect {
        center: Vector3,
        width: f64,
        height: f64,
        filled: bool,
        color: DebugColor,
    },
    Text {
        anchor: Vector3,
        text: String,
        color: DebugColor,
    },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "data")]
pub enum DebugValue {
    Shape(DebugShape),
    Number(f64),
    String(String),
}

/// A map of debug records.
///
/// # Key format
///
/// Keys are `snake_case`; the `.` character separates parts of the key, e.g.
/// `p{index}.target`.
pub type DebugMap = HashMap<String, DebugValue>;

/// Collects debug records. Until one is installed, all `debug_*` calls are no-ops.
#[derive(Clone, Copy, Debug)]
pub struct DebugSubscriber {
    map: &'static Mutex<DebugMap>,
}

impl DebugSubscriber {
    /// Install the global debug map, or attach to the one already installed.
    pub fn install() -> Self {
        Self {
            map: DEBUG_MAP.get_or_init(|| Mutex::new(HashMap::new())),
        }
    }

    /// Get a copy of the current debug map.
    pub fn get_copy(&self) -> DebugMap {
        match self.map.lock() {
            Ok(map) => map.clone(),
            Err(poisoned) => poisoned.into_inner().clone(),
        }
    }

    /// Take the current records, leaving the map empty.
    pub fn drain(&self) -> DebugMap {
        match self.map.lock() {
            Ok(mut map) => std::mem::take(&mut *map),
            Err(poisoned) => std::mem::take(&mut *poisoned.into_inner()),
        }
    }
}

fn with_map(f: impl FnOnce(&mut DebugMap)) {
    if let Some(map) = DEBUG_MAP.get() {
        if let Ok(mut map) = map.lock() {
            f(&mut map);
        }
    }
}

/// Record a debug message.
pub fn debug_record(key: impl Into<String>, value: DebugValue) {
    with_map(|map| {
        map.insert(key.into(), value);
    });
}

/// Remove a debug message.
pub fn debug_remove(key: impl Into<String>) {
    let key = key.into();
    with_map(|map| {
        map.remove(&key);
    });
}

/// Record a debug message with a line.
pub fn debug_line(key: impl Into<String>, start: Vector3, end: Vector3, color: DebugColor) {
    debug_record(key, DebugValue::Shape(DebugShape::Line { start, end, color }));
}

/// Record a debug message with a rectangle centered on a point.
pub fn debug_rect(
    key: impl Into<String>,
    center: Vector3,
    size: f64,
    filled: bool,
    color: DebugColor,
) {
    debug_record(
        key,
        DebugValue::Shape(DebugShape::Rect {
            center,
            width: size,
            height: size,
            filled,
            color,
        }),
    );
}

/// Record a debug message with text anchored in the world.
pub fn debug_text(key: impl Into<String>, anchor: Vector3, text: impl Into<String>) {
    debug_record(
        key,
        DebugValue::Shape(DebugShape::Text {
            anchor,
            text: text.into(),
            color: DebugColor::White,
        }),
    );
}

/// Record a debug message with a numeric value.
pub fn debug_value(key: impl Into<String>, value: f64) {
    debug_record(key, DebugValue::Number(value));
}

/// Record a debug message with a string.
pub fn debug_string(key: impl Into<String>, value: impl Into<String>) {
    debug_record(key, DebugValue::String(value.into()));
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_records_after_install() {
        let subscriber = DebugSubscriber::install();
        debug_value("test.records.speed", 1400.0);
        debug_line(
            "test.records.line",
            Vector3::zeros(),
            Vector3::x(),
            DebugColor::Cyan,
        );
        let map = subscriber.get_copy();
        assert_eq!(map.get("test.records.speed"), Some(&DebugValue::Number(1400.0)));
        assert!(matches!(
            map.get("test.records.line"),
            Some(DebugValue::Shape(DebugShape::Line { .. }))
        ));

        debug_remove("test.records.speed");
        assert!(!subscriber.get_copy().contains_key("test.records.speed"));
    }

    #[test]
    fn test_shape_serializes_tagged() {
        let value = DebugValue::String("kickoff".into());
        let json = serde_json::to_string(&value).unwrap();
        assert_eq!(json, r#"{"type":"String","data":"kickoff"}"#);
    }
}
