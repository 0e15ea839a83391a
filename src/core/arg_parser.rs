// EN: src/core/arg_parser.rs

use lazy_static::lazy_static;
use regex::Regex;
use std::collections::BTreeMap;
use thiserror::Error;

lazy_static! {
    /// `NAME=value`, where NAME is an uppercase identifier and the value is not empty.
    static ref ASSIGNMENT: Regex =
        Regex::new(r"(?s)^([A-Z_][A-Z0-9_]*)=(.+)$").expect("assignment pattern is valid");
}

/// Global flags that always carry a value. For these, `--flag value` is accepted
/// in addition to `--flag=value`.
const VALUE_FLAGS: &[&str] = &[
    "tree",
    "to",
    "server",
    "from",
    "only-server",
    "only-from",
    "only-sources",
    "only-sources-from",
    "deps-mode",
    "branch",
    "timeout",
];

/// Errors produced while splitting the argument list.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ArgError {
    /// An argument looked like `NAME=value` but was not a valid assignment.
    #[error("Invalid assignment: {0}")]
    InvalidAssignment(String),
    /// A value-taking flag was given without a value.
    #[error("Invalid argument: parameter to flag --{0} was not specified.")]
    MissingValue(String),
    /// A `--` token with no flag name.
    #[error("Invalid argument: '{0}' is not a valid flag.")]
    InvalidFlag(String),
}

/// Variables assigned on the command line (`NAME=value`).
pub type Variables = BTreeMap<String, String>;

/// The value of a single flag.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FlagValue {
    /// A valueless switch such as `--local`.
    Switch,
    /// A flag with a value such as `--tree=/opt/rocks`.
    Value(String),
}

/// The flags of one invocation, keyed by name without the leading `--`.
///
/// The map is mutated during resolution: aliases are folded into their
/// canonical names and the resolved tree is recorded under `tree`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Flags {
    entries: BTreeMap<String, FlagValue>,
}

impl Flags {
    /// Whether the flag was given, with or without a value.
    pub fn has(&self, name: &str) -> bool {
        self.entries.contains_key(name)
    }

    /// The value of a flag, if it was given with one.
    pub fn value(&self, name: &str) -> Option<&str> {
        match self.entries.get(name) {
            Some(FlagValue::Value(value)) => Some(value),
            _ => None,
        }
    }

    /// Sets a valueless switch.
    pub fn set_switch(&mut self, name: impl Into<String>) {
        self.entries.insert(name.into(), FlagValue::Switch);
    }

    /// Sets a flag value, replacing any previous one.
    pub fn set_value(&mut self, name: impl Into<String>, value: impl Into<String>) {
        self.entries
            .insert(name.into(), FlagValue::Value(value.into()));
    }

    /// Removes a flag, returning its previous value.
    pub fn remove(&mut self, name: &str) -> Option<FlagValue> {
        self.entries.remove(name)
    }

    /// Moves `alias` onto `canonical`. The alias wins over an explicit canonical
    /// flag, and the alias entry disappears.
    pub fn fold_alias(&mut self, alias: &str, canonical: &str) {
        if let Some(value) = self.entries.remove(alias) {
            log::debug!("Folding --{} into --{}", alias, canonical);
            self.entries.insert(canonical.to_string(), value);
        }
    }

    /// Iterates over the flags in name order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &FlagValue)> {
        self.entries.iter().map(|(name, value)| (name.as_str(), value))
    }

    /// Whether no flags were given.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// The result of flag parsing: flags plus positional arguments in their original order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ParsedArgs {
    /// Every `--flag` given.
    pub flags: Flags,
    /// Everything else, in order.
    pub positional: Vec<String>,
}

/// Removes `NAME=value` assignments from the argument list.
///
/// The list is scanned from the end toward the start. Any argument without a
/// leading `-` that contains `=` is an assignment and must be valid; anything
/// else stays in place, so the remaining arguments keep their relative order.
pub fn extract_variables(mut args: Vec<String>) -> Result<(Vec<String>, Variables), ArgError> {
    let mut variables = Variables::new();

    for i in (0..args.len()).rev() {
        let is_assignment = args
            .get(i)
            .is_some_and(|arg| !arg.starts_with('-') && arg.contains('='));
        if !is_assignment {
            continue;
        }

        let arg = args.remove(i);
        let (name, value) = ASSIGNMENT
            .captures(&arg)
            .and_then(|caps| Some((caps.get(1)?.as_str(), caps.get(2)?.as_str())))
            .ok_or_else(|| ArgError::InvalidAssignment(arg.clone()))?;

        log::debug!("Command-line variable {}={}", name, value);
        variables.insert(name.to_string(), value.to_string());
    }

    Ok((args, variables))
}

/// Splits arguments into flags and positionals.
///
/// # Logic:
/// - `--name=value` sets a value; `--name` sets a switch.
/// - A value-taking global flag given as `--name` consumes the next argument,
///   which must exist and must not be another `--flag`.
/// - A bare `--` ends flag parsing.
/// - Anything else, including single-dash tokens, is positional.
pub fn parse_flags(args: &[String]) -> Result<ParsedArgs, ArgError> {
    let mut parsed = ParsedArgs::default();
    let mut args_iter = args.iter().peekable();

    while let Some(arg) = args_iter.next() {
        if arg == "--" {
            parsed.positional.extend(args_iter.by_ref().cloned());
            break;
        }

        let Some(body) = arg.strip_prefix("--") else {
            parsed.positional.push(arg.clone());
            continue;
        };

        let (name, inline_value) = match body.split_once('=') {
            Some((name, value)) => (name, Some(value)),
            None => (body, None),
        };
        if name.is_empty() {
            return Err(ArgError::InvalidFlag(arg.clone()));
        }

        let takes_value = VALUE_FLAGS.contains(&name);
        match inline_value {
            Some("") if takes_value => return Err(ArgError::MissingValue(name.to_string())),
            Some(value) => parsed.flags.set_value(name, value),
            None if takes_value => {
                let value = args_iter
                    .next_if(|next| !next.starts_with("--"))
                    .ok_or_else(|| ArgError::MissingValue(name.to_string()))?;
                parsed.flags.set_value(name, value.as_str());
            }
            None => parsed.flags.set_switch(name),
        }
    }

    Ok(parsed)
}
