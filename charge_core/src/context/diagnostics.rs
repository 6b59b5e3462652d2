//! Recorded warnings.

use serde::Serialize;
use std::collections::VecDeque;
use std::fmt;

use item_rules::{KindId, Tick};

/// Category of a recorded warning.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DiagnosticKind {
    /// More than one family was eligible for a signal.
    Ambiguous,
    /// No family was eligible for a signal.
    Unresolvable,
    /// An interaction left the lookback window without being used.
    StaleInteraction,
    /// Stored state could not be decoded.
    MalformedState,
    /// A rule matched but its effect could not be built.
    InstantiateFailed,
    /// An amendment arrived with nothing to amend.
    NothingToAmend,
}

impl fmt::Display for DiagnosticKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            DiagnosticKind::Ambiguous => "ambiguous",
            DiagnosticKind::Unresolvable => "unresolvable",
            DiagnosticKind::StaleInteraction => "stale_interaction",
            DiagnosticKind::MalformedState => "malformed_state",
            DiagnosticKind::InstantiateFailed => "instantiate_failed",
            DiagnosticKind::NothingToAmend => "nothing_to_amend",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Diagnostic {
    pub tick: Tick,
    pub kind: DiagnosticKind,
    pub message: String,
    /// Families involved, if any.
    pub kinds: Vec<KindId>,
}

/// A bounded log of warnings, newest last.
#[derive(Debug, Clone)]
pub struct Diagnostics {
    entries: VecDeque<Diagnostic>,
    capacity: usize,
}

impl Default for Diagnostics {
    fn default() -> Self {
        Self::new(256)
    }
}

impl Diagnostics {
    pub fn new(capacity: usize) -> Self {
        Self {
            entries: VecDeque::new(),
            capacity: capacity.max(1),
        }
    }

    /// Log a warning and keep it for callers.
    pub fn record(
        &mut self,
        tick: Tick,
        kind: DiagnosticKind,
        message: impl Into<String>,
        kinds: Vec<KindId>,
    ) {
        let message = message.into();
        tracing::warn!(tick, diagnostic = %kind, kinds = ?kinds, "{message}");

        if self.entries.len() == self.capacity {
            self.entries.pop_front();
        }
        self.entries.push_back(Diagnostic {
            tick,
            kind,
            message,
            kinds,
        });
    }

    pub fn iter(&self) -> impl Iterator<Item = &Diagnostic> {
        self.entries.iter()
    }

    /// Number of recorded warnings of one category.
    pub fn count(&self, kind: DiagnosticKind) -> usize {
        self.entries.iter().filter(|d| d.kind == kind).count()
    }

    pub fn last(&self) -> Option<&Diagnostic> {
        self.entries.back()
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ring_drops_oldest() {
        let mut diagnostics = Diagnostics::new(2);
        diagnostics.record(1, DiagnosticKind::Ambiguous, "first", vec![]);
        diagnostics.record(2, DiagnosticKind::Unresolvable, "second", vec![]);
        diagnostics.record(3, DiagnosticKind::Unresolvable, "third", vec![]);

        assert_eq!(diagnostics.len(), 2);
        assert_eq!(diagnostics.count(DiagnosticKind::Ambiguous), 0);
        assert_eq!(diagnostics.count(DiagnosticKind::Unresolvable), 2);
        assert_eq!(diagnostics.last().map(|d| d.tick), Some(3));
    }
}
