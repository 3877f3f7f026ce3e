use std::fmt;

use serde::de::{MapAccess, Visitor};
use serde::ser::SerializeMap;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// Aggregate precision metrics for all feedback the service has collected.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EvaluationMetrics {
    pub total_feedback: u64,
    pub useful_count: u64,
    /// Fraction of judged recommendations rated useful, in `[0, 1]`.
    pub overall_precision: f64,
    #[serde(default)]
    pub by_type: TypeBreakdown,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TypeMetrics {
    pub precision: f64,
    pub useful: u64,
    pub total: u64,
}

/// Per-rule-type metrics keyed by the raw type string. Entries keep the
/// order the service emitted them in, which later tie-breaking depends on.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TypeBreakdown {
    entries: Vec<(String, TypeMetrics)>,
}

impl TypeBreakdown {
    pub fn from_entries(entries: Vec<(String, TypeMetrics)>) -> Self {
        let mut breakdown = Self::default();
        for (key, value) in entries {
            breakdown.insert(key, value);
        }
        breakdown
    }

    /// A repeated key keeps its original position but takes the new value.
    pub fn insert(&mut self, key: String, value: TypeMetrics) {
        match self.entries.iter_mut().find(|(existing, _)| *existing == key) {
            Some((_, slot)) => *slot = value,
            None => self.entries.push((key, value)),
        }
    }

    pub fn get(&self, key: &str) -> Option<&TypeMetrics> {
        self.entries
            .iter()
            .find(|(existing, _)| existing == key)
            .map(|(_, value)| value)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &TypeMetrics)> {
        self.entries.iter().map(|(key, value)| (key.as_str(), value))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl Serialize for TypeBreakdown {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let mut map = serializer.serialize_map(Some(self.entries.len()))?;
        for (key, value) in &self.entries {
            map.serialize_entry(key, value)?;
        }
        map.end()
    }
}

impl<'de> Deserialize<'de> for TypeBreakdown {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        struct BreakdownVisitor;

        impl<'de> Visitor<'de> for BreakdownVisitor {
            type Value = TypeBreakdown;

            fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str("a map of rule type to precision metrics")
            }

            fn visit_map<A>(self, mut access: A) -> Result<Self::Value, A::Error>
            where
                A: MapAccess<'de>,
            {
                let mut breakdown = TypeBreakdown::default();
                while let Some((key, value)) = access.next_entry::<String, TypeMetrics>()? {
                    breakdown.insert(key, value);
                }
                Ok(breakdown)
            }
        }

        deserializer.deserialize_map(BreakdownVisitor)
    }
}
