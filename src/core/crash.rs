// src/core/crash.rs

//! Panic isolation for command handlers and scheduled cleanup.
//!
//! A panic inside [`catch`] is turned into a [`CrashReport`] carrying the panic
//! message, its source location and a backtrace, instead of tearing down the
//! process. Panics outside of [`catch`] still reach the previously installed hook.

use crate::constants::{BUG_REPORT_URL, PROGRAM_NAME, PROGRAM_VERSION};
use std::any::Any;
use std::backtrace::Backtrace;
use std::cell::{Cell, RefCell};
use std::fmt;
use std::panic::{self, AssertUnwindSafe};
use std::sync::Once;

/// A captured fault, ready to be shown to the user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CrashReport {
    /// What was running when the fault happened (e.g. `command 'list'`).
    pub context: String,
    /// The panic payload or error chain.
    pub message: String,
    /// Source location of the panic, if it was a panic.
    pub location: Option<String>,
    /// Rendered backtrace, if one was captured.
    pub backtrace: Option<String>,
}

impl CrashReport {
    /// A crash report for a fault that is an ordinary error rather than a panic.
    pub fn from_error(context: impl Into<String>, error: &anyhow::Error) -> Self {
        Self {
            context: context.into(),
            message: format!("{:#}", error),
            location: None,
            backtrace: None,
        }
    }
}

impl fmt::Display for CrashReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} {} bug (please report at {}).\n{}: {}",
            PROGRAM_NAME, PROGRAM_VERSION, BUG_REPORT_URL, self.context, self.message
        )?;
        if let Some(location) = &self.location {
            write!(f, "\n  at {}", location)?;
        }
        if let Some(backtrace) = &self.backtrace {
            write!(f, "\nstack traceback:\n{}", backtrace.trim_end())?;
        }
        Ok(())
    }
}

thread_local! {
    static CAPTURING: Cell<bool> = const { Cell::new(false) };
    static LAST_PANIC: RefCell<Option<(Option<String>, String)>> = const { RefCell::new(None) };
}

static INSTALL_HOOK: Once = Once::new();

fn install_hook() {
    INSTALL_HOOK.call_once(|| {
        let previous = panic::take_hook();
        panic::set_hook(Box::new(move |info| {
            if CAPTURING.with(Cell::get) {
                let location = info.location().map(|loc| loc.to_string());
                let backtrace = Backtrace::force_capture().to_string();
                LAST_PANIC.with(|slot| *slot.borrow_mut() = Some((location, backtrace)));
            } else {
                previous(info);
            }
        }));
    });
}

/// Runs `f`, converting a panic into a [`CrashReport`] labelled with `context`.
pub fn catch<R>(context: &str, f: impl FnOnce() -> R) -> Result<R, CrashReport> {
    install_hook();

    let was_capturing = CAPTURING.with(|flag| flag.replace(true));
    let result = panic::catch_unwind(AssertUnwindSafe(f));
    CAPTURING.with(|flag| flag.set(was_capturing));

    result.map_err(|payload| {
        let (location, backtrace) = LAST_PANIC
            .with(|slot| slot.borrow_mut().take())
            .unwrap_or_default();
        CrashReport {
            context: context.to_string(),
            message: payload_message(payload.as_ref()),
            location,
            backtrace: Some(backtrace).filter(|bt| !bt.is_empty()),
        }
    })
}

fn payload_message(payload: &(dyn Any + Send)) -> String {
    if let Some(message) = payload.downcast_ref::<&str>() {
        (*message).to_string()
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message.clone()
    } else {
        "unknown panic payload".to_string()
    }
}
