use chrono::{DateTime, Utc};

/// Visual severity signal attached to a log entry. Style-agnostic stand-in
/// for whatever the UI renders (the original station screens used background
/// colors).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    Success,
    Error,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogEntry {
    pub text: String,
    pub severity: Option<Severity>,
    pub recorded_at: DateTime<Utc>,
}

/// Ordered, append-only record of operator-facing outcomes for one station
/// session. Pure in-memory sink, no failure modes.
#[derive(Debug, Default)]
pub struct SessionLog {
    entries: Vec<LogEntry>,
    severity: Option<Severity>,
}

impl SessionLog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append an entry. An entry carrying a severity also updates the
    /// session's latest severity signal.
    pub fn record(&mut self, text: impl Into<String>, severity: Option<Severity>) -> &LogEntry {
        if severity.is_some() {
            self.severity = severity;
        }
        self.entries.push(LogEntry {
            text: text.into(),
            severity,
            recorded_at: Utc::now(),
        });
        self.entries.last().expect("entry just pushed")
    }

    /// Drop all entries and reset the severity signal.
    pub fn clear(&mut self) {
        self.entries.clear();
        self.severity = None;
    }

    pub fn entries(&self) -> &[LogEntry] {
        &self.entries
    }

    /// Latest severity signal, if any entry since the last clear carried one.
    pub fn severity(&self) -> Option<Severity> {
        self.severity
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn record_appends_in_order() {
        let mut log = SessionLog::new();
        log.record("first", None);
        log.record("second", Some(Severity::Success));
        let texts: Vec<_> = log.entries().iter().map(|e| e.text.as_str()).collect();
        assert_eq!(texts, vec!["first", "second"]);
    }

    #[test]
    fn severity_tracks_latest_signal() {
        let mut log = SessionLog::new();
        assert_eq!(log.severity(), None);
        log.record("ok", Some(Severity::Success));
        log.record("progress", None);
        assert_eq!(log.severity(), Some(Severity::Success));
        log.record("failed", Some(Severity::Error));
        assert_eq!(log.severity(), Some(Severity::Error));
    }

    #[test]
    fn clear_resets_entries_and_severity() {
        let mut log = SessionLog::new();
        log.record("failed", Some(Severity::Error));
        log.clear();
        assert!(log.is_empty());
        assert_eq!(log.severity(), None);
    }
}
