use crate::mouse_gestures::matcher::similarity;
use crate::mouse_gestures::pattern::Pattern;
use anyhow::anyhow;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::sync::Arc;

pub const SCHEMA_VERSION: u32 = 1;

/// Command reference handed to the dispatcher. The engine never inspects it.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct CommandRef {
    pub action: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub args: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct GestureRecord {
    pub label: String,
    pub pattern: Pattern,
    pub command: CommandRef,
    #[serde(default = "default_enabled")]
    pub enabled: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct GestureDb {
    #[serde(default = "default_schema_version")]
    pub schema_version: u32,
    #[serde(default)]
    pub gestures: Vec<GestureRecord>,
}

impl Default for GestureDb {
    fn default() -> Self {
        Self {
            schema_version: SCHEMA_VERSION,
            gestures: Vec::new(),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct GestureConflict {
    pub first: String,
    pub second: String,
    pub similarity: f64,
}

impl GestureRecord {
    pub fn new(label: impl Into<String>, pattern: Pattern, action: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            pattern,
            command: CommandRef {
                action: action.into(),
                args: None,
            },
            enabled: true,
        }
    }
}

impl GestureDb {
    /// Immutable view of the enabled gestures, in catalog order.
    pub fn snapshot(&self) -> Arc<[GestureRecord]> {
        self.gestures
            .iter()
            .filter(|gesture| gesture.enabled)
            .cloned()
            .collect()
    }

    pub fn validate(&self) -> anyhow::Result<()> {
        for gesture in &self.gestures {
            gesture
                .pattern
                .validate()
                .map_err(|err| anyhow!("gesture '{}' is malformed: {err}", gesture.label))?;
        }
        Ok(())
    }

    /// Pairs of enabled gestures close enough to be confused with each other.
    pub fn find_conflicts(&self, tolerance: f64) -> Vec<GestureConflict> {
        let enabled: Vec<&GestureRecord> =
            self.gestures.iter().filter(|gesture| gesture.enabled).collect();
        let mut conflicts = Vec::new();
        for (idx, first) in enabled.iter().enumerate() {
            for second in &enabled[idx + 1..] {
                let score = similarity(&first.pattern, &second.pattern);
                if score <= tolerance {
                    conflicts.push(GestureConflict {
                        first: first.label.clone(),
                        second: second.label.clone(),
                        similarity: score,
                    });
                }
            }
        }
        conflicts
    }
}

pub fn load_gestures(path: impl AsRef<Path>) -> anyhow::Result<GestureDb> {
    let content = std::fs::read_to_string(path).unwrap_or_default();
    if content.trim().is_empty() {
        return Ok(GestureDb::default());
    }
    let db: GestureDb = serde_json::from_str(&content)?;
    if db.schema_version != SCHEMA_VERSION {
        return Err(anyhow!(
            "Unsupported gesture schema version {}",
            db.schema_version
        ));
    }
    db.validate()?;
    Ok(db)
}

pub fn save_gestures(path: impl AsRef<Path>, db: &GestureDb) -> anyhow::Result<()> {
    let mut db = db.clone();
    db.schema_version = SCHEMA_VERSION;
    let json = serde_json::to_string_pretty(&db)?;
    std::fs::write(path, json)?;
    Ok(())
}

fn default_enabled() -> bool {
    true
}

fn default_schema_version() -> u32 {
    SCHEMA_VERSION
}
