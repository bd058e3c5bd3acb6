use std::collections::BTreeMap;
use std::fmt;

/// Counters every context starts with.
pub const DEFAULT_COUNTERS: [&str; 3] = ["completion_tokens", "prompt_tokens", "total_tokens"];

/// Token usage accumulated over the life of a context.
///
/// Counters only ever grow: each successful response adds its own figures.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Usage {
    counters: BTreeMap<String, u64>,
}

impl Default for Usage {
    fn default() -> Self {
        Self {
            counters: DEFAULT_COUNTERS
                .iter()
                .map(|name| ((*name).to_string(), 0))
                .collect(),
        }
    }
}

impl Usage {
    pub fn get(&self, name: &str) -> u64 {
        self.counters.get(name).copied().unwrap_or(0)
    }

    pub fn add(&mut self, name: &str, value: u64) {
        let counter = self.counters.entry(name.to_string()).or_insert(0);
        *counter = counter.saturating_add(value);
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, u64)> {
        self.counters.iter().map(|(name, value)| (name.as_str(), *value))
    }
}

impl fmt::Display for Usage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let parts: Vec<String> = self
            .iter()
            .map(|(name, value)| format!("{name}={value}"))
            .collect();
        write!(f, "{}", parts.join(", "))
    }
}
