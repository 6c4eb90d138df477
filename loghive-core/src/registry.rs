use std::collections::HashMap;

use loghive_common::ColorPair;

/// Display attributes of a known producer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProducerInfo {
    pub colors: ColorPair,
    pub display_name: String,
}

/// Runtime-extensible mapping of severity names and producer identifiers
/// to display attributes.
///
/// Severity keys are stored lower-cased and looked up case-insensitively;
/// producer identifiers are kept verbatim. Inserting an existing key is a
/// no-op unless replacement is explicitly allowed.
#[derive(Debug, Clone, Default)]
pub struct Registry {
    severities: HashMap<String, ColorPair>,
    producers: HashMap<String, ProducerInfo>,
}

impl Registry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns false (and leaves the map untouched) on an empty name or an
    /// existing key without `allow_replace`.
    pub fn add_severity(&mut self, name: &str, colors: ColorPair, allow_replace: bool) -> bool {
        if name.is_empty() {
            return false;
        }
        let key = name.to_lowercase();
        if self.severities.contains_key(&key) && !allow_replace {
            return false;
        }
        self.severities.insert(key, colors);
        true
    }

    pub fn add_producer(
        &mut self,
        id: &str,
        colors: ColorPair,
        display_name: &str,
        allow_replace: bool,
    ) -> bool {
        if id.is_empty() {
            return false;
        }
        if self.producers.contains_key(id) && !allow_replace {
            return false;
        }
        self.producers.insert(
            id.to_owned(),
            ProducerInfo {
                colors,
                display_name: display_name.to_owned(),
            },
        );
        true
    }

    pub fn severity(&self, name: &str) -> Option<&ColorPair> {
        self.severities.get(&name.to_lowercase())
    }

    pub fn producer(&self, id: &str) -> Option<&ProducerInfo> {
        self.producers.get(id)
    }

    /// CSS decoration for a severity, empty when unknown.
    pub fn severity_flavor(&self, name: &str) -> String {
        self.severity(name).map(ColorPair::css).unwrap_or_default()
    }

    /// CSS decoration for a producer, empty when unknown.
    pub fn producer_flavor(&self, id: &str) -> String {
        self.producer(id)
            .map(|info| info.colors.css())
            .unwrap_or_default()
    }

    /// `"( nickname )"` suffix appended to the producer identifier in the
    /// rendered `from` field, empty when the producer is unknown.
    pub fn nickname(&self, id: &str) -> String {
        match self.producer(id) {
            Some(info) => format!("( {} )", info.display_name),
            None => String::new(),
        }
    }

    pub fn severities(&self) -> &HashMap<String, ColorPair> {
        &self.severities
    }

    pub fn producers(&self) -> &HashMap<String, ProducerInfo> {
        &self.producers
    }

    pub fn severity_count(&self) -> usize {
        self.severities.len()
    }

    pub fn producer_count(&self) -> usize {
        self.producers.len()
    }
}
