use chrono::{DateTime, Utc};
use loghive_common::ColorPair;
use serde::Serialize;
use serde_json::Value;
use tracing::*;

use crate::consts::INTERNAL_PRODUCER;
use crate::registry::Registry;

/// Rendering of entry timestamps in the JSON projection.
pub const TIMESTAMP_FORMAT: &str = "%H:%M:%S%.6f - %d/%m/%Y";

/// Cosmetic hints resolved once, when the entry is created.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Flavor {
    pub severity: String,
    pub user_shade: String,
}

/// One submitted status message. Immutable once created; destroyed only by
/// a full purge.
#[derive(Debug, Clone, Serialize)]
pub struct LogEntry {
    pub id: u64,
    #[serde(rename = "from")]
    pub from: String,
    pub severity: String,
    pub comment: String,
    #[serde(serialize_with = "serialize_timestamp")]
    pub timestamp: DateTime<Utc>,
    pub body: Option<Value>,
    pub flavor: Flavor,

    /// Raw producer identifier, before the nickname suffix.
    #[serde(skip)]
    pub producer: String,

    /// True only for entries the server generated about itself.
    #[serde(skip)]
    pub internal: bool,
}

fn serialize_timestamp<S>(timestamp: &DateTime<Utc>, serializer: S) -> Result<S::Ok, S::Error>
where
    S: serde::Serializer,
{
    serializer.collect_str(&timestamp.format(TIMESTAMP_FORMAT))
}

/// Filter selector for listing entries.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EntryFilter {
    Off,
    /// Case-insensitive equality on the severity text.
    Severity(String),
    /// Substring match on the rendered `from` field. Internal entries are
    /// always included.
    From(String),
}

impl EntryFilter {
    /// Parses the transport-level `f` / `ftgt` pair. A recognized kind
    /// without a target degrades to `Off`; an unrecognized kind is `None`
    /// and the store treats it as an error.
    pub fn parse(kind: Option<&str>, target: Option<&str>) -> Option<Self> {
        match kind {
            None | Some("off") => Some(Self::Off),
            Some("severity") => Some(match target {
                Some(target) => Self::Severity(target.to_owned()),
                None => Self::Off,
            }),
            Some("from") => Some(match target {
                Some(target) => Self::From(target.to_owned()),
                None => Self::Off,
            }),
            Some(_) => None,
        }
    }
}

/// Append-only in-memory sequence of log entries plus the registry its
/// display attributes come from. Volatile: rebuilt from scratch (and
/// optionally bulk-loaded) on every boot.
#[derive(Debug)]
pub struct EntryStore {
    registry: Registry,
    entries: Vec<LogEntry>,
    next_id: u64,
    accent: String,
    public: bool,
}

impl EntryStore {
    pub fn new(accent: String, public: bool) -> Self {
        Self {
            registry: Registry::new(),
            entries: Vec::new(),
            next_id: 0,
            accent,
            public,
        }
    }

    pub fn registry(&self) -> &Registry {
        &self.registry
    }

    /// Registry insert plus an internal info entry describing the change.
    /// `quiet` suppresses the entry during bulk startup loads.
    pub fn add_severity(
        &mut self,
        name: &str,
        colors: ColorPair,
        allow_replace: bool,
        quiet: bool,
    ) -> bool {
        let added = self.registry.add_severity(name, colors, allow_replace);
        if added && !quiet {
            let comment = format!("Severity class '{}' set", name.to_lowercase());
            self.add_internal("Information", &comment, None);
        }
        added
    }

    pub fn add_producer(
        &mut self,
        id: &str,
        colors: ColorPair,
        display_name: &str,
        allow_replace: bool,
        quiet: bool,
    ) -> bool {
        let added = self
            .registry
            .add_producer(id, colors, display_name, allow_replace);
        if added && !quiet {
            let comment = format!("Producer '{id}' registered as '{display_name}'");
            self.add_internal("Information", &comment, None);
        }
        added
    }

    /// Appends an entry. Never rejects input: unknown severities are kept
    /// as literal text, and an unknown producer is auto-registered with the
    /// caller's address as its display name.
    pub fn add(
        &mut self,
        from: &str,
        severity: &str,
        comment: &str,
        body: Option<Value>,
        remote_addr: Option<&str>,
    ) -> u64 {
        let mut registered = false;
        if from != INTERNAL_PRODUCER && self.registry.producer(from).is_none() {
            let display_name = remote_addr.unwrap_or(from).to_owned();
            self.registry
                .add_producer(from, ColorPair::default(), &display_name, false);
            registered = true;
        }
        let id = self.push(from, severity, comment, body, false);
        if registered {
            let nickname = self.registry.nickname(from);
            debug!(producer = from, "Auto-registered new producer");
            self.add_internal(
                "Warning",
                &format!("New server '{from}' {nickname} added"),
                None,
            );
        }
        id
    }

    /// Appends an entry attributed to the server itself, decorated with the
    /// configured accent shade.
    pub fn add_internal(&mut self, severity: &str, comment: &str, body: Option<Value>) -> u64 {
        self.push(INTERNAL_PRODUCER, severity, comment, body, true)
    }

    /// Catch-all record of an unexpected fault, with the offending input
    /// body for operator diagnosis.
    pub fn log_uncaught_exception(&mut self, error: &str, body: Option<Value>) -> u64 {
        self.add_internal("Critical", &format!("Uncaught exception: '{error}'"), body)
    }

    fn push(
        &mut self,
        from: &str,
        severity: &str,
        comment: &str,
        body: Option<Value>,
        internal: bool,
    ) -> u64 {
        let id = self.next_id;
        self.next_id += 1;
        let flavor = Flavor {
            severity: self.registry.severity_flavor(severity),
            user_shade: if internal {
                self.accent.clone()
            } else {
                self.registry.producer_flavor(from)
            },
        };
        self.entries.push(LogEntry {
            id,
            from: format!("{from}{}", self.registry.nickname(from)),
            severity: severity.to_owned(),
            comment: comment.to_owned(),
            timestamp: Utc::now(),
            body,
            flavor,
            producer: from.to_owned(),
            internal,
        });
        id
    }

    pub fn count(&self) -> usize {
        self.entries.len()
    }

    /// Clears all entries. The id counter is deliberately untouched so ids
    /// stay monotonic across purges.
    pub fn purge(&mut self) {
        self.entries.clear();
    }

    pub fn entries(&self) -> &[LogEntry] {
        &self.entries
    }

    /// (severities, producers, entries) counts.
    pub fn lists_count(&self) -> (usize, usize, usize) {
        (
            self.registry.severity_count(),
            self.registry.producer_count(),
            self.entries.len(),
        )
    }

    /// Lists entries matching the transport-level filter pair, in insertion
    /// order, restricted by the visibility rule: on a non-public instance
    /// with login required, a viewer only sees their own producer's entries
    /// plus internal ones.
    ///
    /// An unrecognized filter kind is recorded as an internal error entry
    /// and degrades to the viewer-or-internal subset on a public instance,
    /// or to everything on a private one.
    pub fn filtered(
        &mut self,
        kind: Option<&str>,
        target: Option<&str>,
        viewer: Option<&str>,
        login_required: bool,
    ) -> Vec<LogEntry> {
        let Some(filter) = EntryFilter::parse(kind, target) else {
            let bad = kind.unwrap_or_default().to_owned();
            warn!(filter = %bad, "Ignoring unknown entry filter");
            self.add_internal("Error", &format!("Unknown filter '{bad}'"), None);
            return if self.public {
                self.subset(viewer)
            } else {
                self.entries.clone()
            };
        };

        let restricted = !self.public && login_required && viewer.is_some();
        self.entries
            .iter()
            .filter(|entry| !restricted || Self::viewer_visible(entry, viewer))
            .filter(|entry| match &filter {
                EntryFilter::Off => true,
                EntryFilter::Severity(target) => {
                    entry.severity.to_lowercase() == target.to_lowercase()
                }
                EntryFilter::From(target) => {
                    entry.internal || entry.from.contains(target.as_str())
                }
            })
            .cloned()
            .collect()
    }

    fn subset(&self, viewer: Option<&str>) -> Vec<LogEntry> {
        self.entries
            .iter()
            .filter(|entry| Self::viewer_visible(entry, viewer))
            .cloned()
            .collect()
    }

    fn viewer_visible(entry: &LogEntry, viewer: Option<&str>) -> bool {
        entry.internal || viewer.is_some_and(|viewer| entry.producer == viewer)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn store() -> EntryStore {
        EntryStore::new("background-color: var(--accent-color);".to_owned(), true)
    }

    #[test]
    fn test_ids_increase_and_survive_purge() {
        let mut store = store();
        let a = store.add("A", "info", "first", None, None);
        let b = store.add("A", "info", "second", None, None);
        assert!(b > a);

        store.purge();
        assert_eq!(store.count(), 0);

        let c = store.add("A", "info", "third", None, None);
        assert!(c > b, "ids must not be reused across purges");
    }

    #[test]
    fn test_count_tracks_appends() {
        let mut store = store();
        store.add("A", "info", "one", None, None);
        store.add_internal("Success", "two", None);
        // The first add also auto-registered "A", which logs a warning.
        assert_eq!(store.count(), 3);
    }

    #[test]
    fn test_auto_registration_uses_remote_addr_as_display_name() {
        let mut store = store();
        store.add("http://a/", "info", "hello", None, Some("10.0.0.7"));
        let info = store.registry().producer("http://a/").unwrap();
        assert_eq!(info.display_name, "10.0.0.7");

        // The entry itself was created before the warning about it.
        assert_eq!(store.entries()[0].from, "http://a/( 10.0.0.7 )");
        let warning = &store.entries()[1];
        assert!(warning.internal);
        assert_eq!(warning.severity, "Warning");
    }

    #[test]
    fn test_internal_producer_is_never_auto_registered() {
        let mut store = store();
        store.add_internal("Information", "notice", None);
        assert!(store.registry().producer(INTERNAL_PRODUCER).is_none());
        assert_eq!(store.count(), 1);
    }

    #[test]
    fn test_internal_entries_carry_accent_shade() {
        let mut store = store();
        store.add_internal("Critical", "boom", None);
        assert_eq!(
            store.entries()[0].flavor.user_shade,
            "background-color: var(--accent-color);"
        );
    }

    #[test]
    fn test_unknown_severity_is_kept_as_literal_text() {
        let mut store = store();
        store.add("A", "Bizarre", "entry", None, None);
        let entry = &store.entries()[0];
        assert_eq!(entry.severity, "Bizarre");
        assert_eq!(entry.flavor.severity, "");
    }

    #[test]
    fn test_quiet_registry_changes_log_nothing() {
        let mut store = store();
        assert!(store.add_severity("error", ColorPair::default(), true, true));
        assert!(store.add_producer("http://a/", ColorPair::default(), "A", true, true));
        assert_eq!(store.count(), 0);

        assert!(store.add_severity("warning", ColorPair::default(), false, false));
        assert_eq!(store.count(), 1);
    }

    #[test]
    fn test_severity_filter_matches_case_insensitively() {
        let mut store = store();
        store.add("A", "error", "bad", None, None);
        store.add("B", "info", "fine", None, None);

        let matched = store.filtered(Some("severity"), Some("Error"), None, false);
        assert_eq!(matched.len(), 1);
        assert_eq!(matched[0].comment, "bad");
    }

    #[test]
    fn test_from_filter_is_substring_and_keeps_internal_entries() {
        let mut store = store();
        store.add("A", "error", "from a", None, None);
        store.add("B", "info", "from b", None, None);
        store.add_internal("Success", "notice", None);

        let matched = store.filtered(Some("from"), Some("B"), None, false);
        // The producer's entries plus every internal one, which here
        // includes the two auto-registration warnings.
        assert!(matched.iter().any(|e| e.comment == "from b"));
        assert!(matched.iter().any(|e| e.comment == "notice"));
        assert!(!matched.iter().any(|e| e.comment == "from a"));
        assert_eq!(matched.len(), 4);
    }

    #[test]
    fn test_visibility_restricts_private_instances() {
        let mut store = EntryStore::new(String::new(), false);
        store.add("A", "info", "a entry", None, None);
        store.add("B", "info", "b entry", None, None);
        store.add_internal("Success", "internal entry", None);

        let visible = store.filtered(None, None, Some("A"), true);
        let comments: Vec<_> = visible.iter().map(|e| e.comment.as_str()).collect();
        assert!(comments.contains(&"a entry"));
        assert!(comments.contains(&"internal entry"));
        assert!(!comments.contains(&"b entry"));
    }

    #[test]
    fn test_filter_narrows_within_visibility_subset() {
        let mut store = EntryStore::new(String::new(), false);
        store.add("A", "error", "a error", None, None);
        store.add("B", "error", "b error", None, None);

        let matched = store.filtered(Some("severity"), Some("error"), Some("A"), true);
        assert_eq!(matched.len(), 1);
        assert_eq!(matched[0].comment, "a error");
    }

    #[test]
    fn test_bad_filter_logs_error_and_falls_back_public() {
        let mut store = store();
        store.add("A", "info", "a entry", None, None);

        let before = store.count();
        let result = store.filtered(Some("bogus"), Some("x"), Some("A"), true);
        assert_eq!(store.count(), before + 1);
        let recorded = store.entries().last().unwrap();
        assert!(recorded.internal);
        assert_eq!(recorded.severity, "Error");

        // Public fallback: viewer-or-internal subset only.
        assert!(result.iter().all(|e| e.internal || e.producer == "A"));
    }

    #[test]
    fn test_bad_filter_falls_back_to_everything_on_private() {
        let mut store = EntryStore::new(String::new(), false);
        store.add("A", "info", "a entry", None, None);
        store.add("B", "info", "b entry", None, None);

        let result = store.filtered(Some("bogus"), Some("x"), Some("A"), true);
        // Everything, including the freshly recorded error entry.
        assert_eq!(result.len(), store.count());
    }

    #[test]
    fn test_json_projection_shape() {
        let mut store = store();
        store.add_severity("error", ColorPair::new(None, Some("#ff2211".into())), true, true);
        store.add("A", "error", "bad", Some(serde_json::json!({"k": "v"})), None);

        let value = serde_json::to_value(&store.entries()[0]).unwrap();
        assert_eq!(value["id"], 0);
        assert_eq!(value["from"], "A( A )");
        assert_eq!(value["severity"], "error");
        assert_eq!(value["comment"], "bad");
        assert_eq!(value["body"]["k"], "v");
        assert_eq!(value["flavor"]["severity"], "background-color:#ff2211;");
        assert!(value["timestamp"].as_str().unwrap().contains(" - "));
        assert!(value.get("internal").is_none());
        assert!(value.get("producer").is_none());
    }
}
