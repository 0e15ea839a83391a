// src/core/cleanup.rs

use crate::core::crash::{self, CrashReport};
use anyhow::Result;
use std::fmt;

type Action = Box<dyn FnOnce() -> Result<()>>;

/// Deferred actions that must run once before the process exits.
///
/// The list is owned by the top-level run routine and lent out by `&mut` to
/// whoever needs to schedule something (e.g. removal of a temporary cache).
/// [`CleanupList::run`] drains it, so a second call is a no-op.
#[derive(Default)]
pub struct CleanupList {
    actions: Vec<(String, Action)>,
}

impl fmt::Debug for CleanupList {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list()
            .entries(self.actions.iter().map(|(label, _)| label))
            .finish()
    }
}

impl CleanupList {
    /// Creates an empty list.
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends an action. Actions run in the order they were scheduled.
    pub fn schedule(
        &mut self,
        label: impl Into<String>,
        action: impl FnOnce() -> Result<()> + 'static,
    ) {
        let label = label.into();
        log::debug!("Scheduled cleanup: {}", label);
        self.actions.push((label, Box::new(action)));
    }

    /// The number of pending actions.
    pub fn len(&self) -> usize {
        self.actions.len()
    }

    /// Whether nothing is pending.
    pub fn is_empty(&self) -> bool {
        self.actions.is_empty()
    }

    /// Runs every pending action in order, exactly once.
    ///
    /// A failing or panicking action does not stop the remaining ones; the first
    /// fault is returned as a crash report.
    pub fn run(&mut self) -> Result<(), CrashReport> {
        let mut first_fault = None;

        for (label, action) in std::mem::take(&mut self.actions) {
            log::debug!("Running cleanup: {}", label);
            let context = format!("cleanup '{}'", label);
            let fault = match crash::catch(&context, action) {
                Ok(Ok(())) => None,
                Ok(Err(e)) => Some(CrashReport::from_error(context, &e)),
                Err(report) => Some(report),
            };
            if let Some(report) = fault {
                log::debug!("Cleanup '{}' failed: {}", label, report.message);
                first_fault.get_or_insert(report);
            }
        }

        match first_fault {
            Some(report) => Err(report),
            None => Ok(()),
        }
    }
}
