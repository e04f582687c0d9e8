use license_tracker::prelude::*;
use std::sync::{Arc, Mutex};

/// One call made on the reporter
#[derive(Debug, Clone, PartialEq)]
pub enum ReportEvent {
    Message(String),
    Progress { current: usize, total: usize },
    Error(String),
    Completion(String),
}

/// Records every reporter call; clones share the same log
#[derive(Default, Clone)]
pub struct MockProgressReporter {
    events: Arc<Mutex<Vec<ReportEvent>>>,
}

impl MockProgressReporter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn events(&self) -> Vec<ReportEvent> {
        self.events.lock().unwrap().clone()
    }

    /// Text of plain messages and completions, in order
    pub fn get_messages(&self) -> Vec<String> {
        self.events()
            .into_iter()
            .filter_map(|event| match event {
                ReportEvent::Message(text) | ReportEvent::Completion(text) => Some(text),
                _ => None,
            })
            .collect()
    }

    pub fn get_errors(&self) -> Vec<String> {
        self.events()
            .into_iter()
            .filter_map(|event| match event {
                ReportEvent::Error(text) => Some(text),
                _ => None,
            })
            .collect()
    }

    fn push(&self, event: ReportEvent) {
        self.events.lock().unwrap().push(event);
    }
}

impl ProgressReporter for MockProgressReporter {
    fn report(&self, message: &str) {
        self.push(ReportEvent::Message(message.to_string()));
    }

    fn report_progress(&self, current: usize, total: usize, _message: Option<&str>) {
        self.push(ReportEvent::Progress { current, total });
    }

    fn report_error(&self, message: &str) {
        self.push(ReportEvent::Error(message.to_string()));
    }

    fn report_completion(&self, message: &str) {
        self.push(ReportEvent::Completion(message.to_string()));
    }
}
