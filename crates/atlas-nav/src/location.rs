//! Visible location (URL) reconciliation
//!
//! The navigator writes the selected pair to an external location; the
//! location also feeds back into the navigator as a hint on first load.
//! Writes are suppressed when the target already matches either what is
//! displayed or what we wrote last, which breaks the write/read loop.

use crate::state::LocationPair;
use atlas_model::{DiagramId, EnvironmentId, WorkspaceId};
use parking_lot::Mutex;
use std::fmt;

/// Lowercase name with everything but word characters, spaces and
/// hyphens removed, and whitespace runs collapsed to `-`
#[must_use]
pub fn slugify(name: &str) -> String {
    let kept: String = name
        .to_lowercase()
        .chars()
        .filter(|c| c.is_alphanumeric() || *c == '_' || *c == '-' || c.is_whitespace())
        .collect();
    kept.split_whitespace().collect::<Vec<_>>().join("-")
}

/// Location derived from a selection
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Location {
    pub workspace: WorkspaceId,
    pub environment_id: Option<EnvironmentId>,
    pub diagram_id: Option<DiagramId>,
    pub environment_slug: Option<String>,
    pub diagram_slug: Option<String>,
}

impl Location {
    #[must_use]
    pub fn pair(&self) -> LocationPair {
        (self.environment_id.clone(), self.diagram_id.clone())
    }
}

impl fmt::Display for Location {
    /// `/workspaces/{ws}/diagrams/{diagram}?environmentId=..&env=..&diagram=..`
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "/workspaces/{}/diagrams", self.workspace)?;
        if let Some(diagram) = &self.diagram_id {
            write!(f, "/{diagram}")?;
        }
        let params: Vec<String> = [
            ("environmentId", self.environment_id.as_ref().map(EnvironmentId::as_str)),
            ("env", self.environment_slug.as_deref()),
            ("diagram", self.diagram_slug.as_deref()),
        ]
        .into_iter()
        .filter_map(|(key, value)| value.map(|v| format!("{key}={v}")))
        .collect();
        if !params.is_empty() {
            write!(f, "?{}", params.join("&"))?;
        }
        Ok(())
    }
}

/// Selection hints read from a location on first load
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LocationHint {
    pub environment_id: Option<EnvironmentId>,
    pub diagram_id: Option<DiagramId>,
    pub environment_slug: Option<String>,
    pub diagram_slug: Option<String>,
}

impl LocationHint {
    /// Parse a rendered [`Location`]; unknown parts are ignored
    #[must_use]
    pub fn parse(raw: &str) -> Self {
        let (path, query) = raw.split_once('?').unwrap_or((raw, ""));
        let mut hint = Self::default();

        let segments: Vec<&str> = path.split('/').filter(|s| !s.is_empty()).collect();
        if let Some(pos) = segments.iter().position(|s| *s == "diagrams") {
            hint.diagram_id = segments.get(pos + 1).map(|id| DiagramId::new(*id));
        }

        for pair in query.split('&') {
            let Some((key, value)) = pair.split_once('=') else {
                continue;
            };
            if value.is_empty() {
                continue;
            }
            match key {
                "environmentId" => hint.environment_id = Some(EnvironmentId::new(value)),
                "env" => hint.environment_slug = Some(value.to_string()),
                "diagram" => hint.diagram_slug = Some(value.to_string()),
                _ => {}
            }
        }
        hint
    }
}

/// Externally visible location (browser URL, window title, ...)
pub trait LocationSink: Send + Sync {
    /// Pair currently displayed, if any
    fn displayed(&self) -> Option<LocationPair>;

    /// Replace the displayed location
    fn replace(&self, location: &Location);
}

/// Writes the location only when the selection really moved
pub struct LocationReconciler {
    sink: std::sync::Arc<dyn LocationSink>,
    last_written: Mutex<Option<LocationPair>>,
}

impl fmt::Debug for LocationReconciler {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LocationReconciler")
            .field("last_written", &*self.last_written.lock())
            .finish_non_exhaustive()
    }
}

impl LocationReconciler {
    #[must_use]
    pub fn new(sink: std::sync::Arc<dyn LocationSink>) -> Self {
        Self {
            sink,
            last_written: Mutex::new(None),
        }
    }

    /// Write `target` unless its pair matches the displayed pair or our
    /// own last write; returns whether a write happened
    pub fn reconcile(&self, target: &Location) -> bool {
        let pair = target.pair();
        let mut last = self.last_written.lock();
        if last.as_ref() == Some(&pair) {
            return false;
        }
        if self.sink.displayed().as_ref() == Some(&pair) {
            *last = Some(pair);
            return false;
        }
        self.sink.replace(target);
        tracing::debug!(location = %target, "location updated");
        *last = Some(pair);
        true
    }
}

/// In-memory sink that records every write
#[derive(Debug, Default)]
pub struct MemoryLocation {
    writes: Mutex<Vec<Location>>,
    displayed: Mutex<Option<LocationPair>>,
}

impl MemoryLocation {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Simulate the user (or history navigation) changing the location
    pub fn display(&self, pair: LocationPair) {
        *self.displayed.lock() = Some(pair);
    }

    #[must_use]
    pub fn writes(&self) -> Vec<Location> {
        self.writes.lock().clone()
    }

    #[must_use]
    pub fn current(&self) -> Option<String> {
        self.writes.lock().last().map(ToString::to_string)
    }
}

impl LocationSink for MemoryLocation {
    fn displayed(&self) -> Option<LocationPair> {
        self.displayed.lock().clone()
    }

    fn replace(&self, location: &Location) {
        self.writes.lock().push(location.clone());
        *self.displayed.lock() = Some(location.pair());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    fn location(env: &str, diagram: Option<&str>) -> Location {
        Location {
            workspace: WorkspaceId::new("w"),
            environment_id: Some(EnvironmentId::new(env)),
            diagram_id: diagram.map(DiagramId::new),
            environment_slug: Some(slugify(env)),
            diagram_slug: diagram.map(slugify),
        }
    }

    #[test]
    fn slugify_names() {
        assert_eq!(slugify("Prod  EU (main)!"), "prod-eu-main");
        assert_eq!(slugify("  edge_net - v2 "), "edge_net---v2");
        assert_eq!(slugify(""), "");
    }

    #[test]
    fn render_and_parse() {
        let loc = Location {
            workspace: WorkspaceId::new("w1"),
            environment_id: Some(EnvironmentId::new("e1")),
            diagram_id: Some(DiagramId::new("d9")),
            environment_slug: Some("prod".into()),
            diagram_slug: Some("core-net".into()),
        };
        let rendered = loc.to_string();
        assert_eq!(
            rendered,
            "/workspaces/w1/diagrams/d9?environmentId=e1&env=prod&diagram=core-net"
        );

        let hint = LocationHint::parse(&rendered);
        assert_eq!(hint.environment_id, Some(EnvironmentId::new("e1")));
        assert_eq!(hint.diagram_id, Some(DiagramId::new("d9")));
        assert_eq!(hint.environment_slug.as_deref(), Some("prod"));
        assert_eq!(hint.diagram_slug.as_deref(), Some("core-net"));
    }

    #[test]
    fn parse_tolerates_partial_locations() {
        assert_eq!(LocationHint::parse(""), LocationHint::default());
        let hint = LocationHint::parse("/workspaces/w/diagrams?env=&environmentId=e2");
        assert_eq!(hint.environment_id, Some(EnvironmentId::new("e2")));
        assert!(hint.diagram_id.is_none());
        assert!(hint.environment_slug.is_none());
    }

    #[test]
    fn reconciler_skips_repeated_and_displayed_pairs() {
        let sink = Arc::new(MemoryLocation::new());
        let reconciler = LocationReconciler::new(sink.clone());

        assert!(reconciler.reconcile(&location("e1", Some("d1"))));
        assert!(!reconciler.reconcile(&location("e1", Some("d1"))));

        sink.display((Some(EnvironmentId::new("e2")), None));
        assert!(!reconciler.reconcile(&location("e2", None)));

        assert!(reconciler.reconcile(&location("e1", Some("d2"))));
        assert_eq!(sink.writes().len(), 2);
    }
}
