//! Command-line plugin resolution built with pluggable.
//!
//! Resolves a set of core plugins into an application order and prints it,
//! along with the resulting defaults table.
//!
//! ```text
//! resolve [--format pretty|compact|json] [--defaults <json>] <plugin>...
//! ```
//!
//! A `plugin=value` argument requests the plugin with a default value; the
//! value is parsed as JSON, falling back to a plain string.

mod logging;

pub use logging::{TracingFormat, init_tracing};

use core::fmt;

use pluggable_core_plugins::CorePlugins;
use pluggable_system::prelude::*;
use serde_json::Value;

/// Invalid command-line arguments.
#[derive(Debug, thiserror::Error)]
pub enum UsageError {
    /// No plugin was named.
    #[error("no plugins requested")]
    NoPlugins,

    /// A flag was given without its value.
    #[error("missing value for {0}")]
    MissingValue(&'static str),

    /// `--format` named an unknown format.
    #[error("unknown format '{0}': expected pretty, compact or json")]
    UnknownFormat(String),

    /// `--defaults` was not a JSON object.
    #[error("invalid defaults: {0}")]
    InvalidDefaults(#[from] serde_json::Error),
}

/// One plugin request from the command line.
#[derive(Debug, Clone, PartialEq)]
pub struct PluginArg {
    /// Plugin name.
    pub name: String,
    /// Default value given with `name=value`.
    pub default: Option<Value>,
}

impl PluginArg {
    fn parse(arg: &str) -> Self {
        match arg.split_once('=') {
            Some((name, value)) => Self {
                name: name.to_string(),
                default: Some(
                    serde_json::from_str(value).unwrap_or_else(|_| Value::from(value)),
                ),
            },
            None => Self {
                name: arg.to_string(),
                default: None,
            },
        }
    }
}

/// Parsed command line.
#[derive(Debug, Clone, PartialEq)]
pub struct Invocation {
    /// Log output format.
    pub format: TracingFormat,
    /// Defaults table seeded before the request.
    pub defaults: Options,
    /// Requested plugins.
    pub plugins: Vec<PluginArg>,
}

impl Invocation {
    /// Parses arguments, excluding the program name.
    ///
    /// # Errors
    ///
    /// Returns a [`UsageError`] for malformed arguments.
    pub fn parse<I, S>(args: I) -> Result<Self, UsageError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut format = TracingFormat::default();
        let mut defaults = Options::new();
        let mut plugins = Vec::new();

        let mut args = args.into_iter();
        while let Some(arg) = args.next() {
            match arg.as_ref() {
                "--format" => {
                    let value = args.next().ok_or(UsageError::MissingValue("--format"))?;
                    format = value.as_ref().parse()?;
                }
                "--defaults" => {
                    let value = args.next().ok_or(UsageError::MissingValue("--defaults"))?;
                    defaults = serde_json::from_str(value.as_ref())?;
                }
                other => plugins.push(PluginArg::parse(other)),
            }
        }

        if plugins.is_empty() {
            return Err(UsageError::NoPlugins);
        }
        Ok(Self {
            format,
            defaults,
            plugins,
        })
    }
}

/// Result of a resolution run.
#[derive(Debug, Clone)]
pub struct Report {
    /// Applied plugin names in order.
    pub order: Vec<String>,
    /// Defaults table after the request.
    pub defaults: Options,
}

impl fmt::Display for Report {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "order:")?;
        for (position, name) in self.order.iter().enumerate() {
            writeln!(f, "  {}. {}", position + 1, name)?;
        }
        match serde_json::to_string_pretty(&self.defaults) {
            Ok(defaults) => write!(f, "defaults: {defaults}"),
            Err(_) => write!(f, "defaults: {:?}", self.defaults),
        }
    }
}

/// Resolves the requested core plugins on a fresh host.
///
/// # Errors
///
/// Returns the [`ResolveError`] raised by resolution.
pub fn run(invocation: &Invocation, registry: &PluginRegistry) -> Result<Report, ResolveError> {
    CorePlugins::register(registry);
    tracing::debug!(
        plugins = invocation.plugins.len(),
        defaults = invocation.defaults.len(),
        "resolving command line request"
    );

    let mut host = ResolveHost::new(registry);
    let defaults = configure(&mut host, invocation.defaults.clone(), |request| {
        for plugin in &invocation.plugins {
            match &plugin.default {
                Some(default) => request.plugin_default(plugin.name.as_str(), default.clone()),
                None => request.plugin(plugin.name.as_str()),
            };
        }
    })
    .inspect_err(|e| tracing::warn!(error = %e, "resolution failed"))?;

    let order: Vec<String> = host
        .applied
        .iter()
        .map(|plugin| plugin.name().to_string())
        .collect();
    tracing::info!(order = ?order, "resolved plugins");

    Ok(Report { order, defaults })
}

/// Borrowing host used by [`run`].
struct ResolveHost<'a> {
    registry: &'a PluginRegistry,
    applied: Vec<Plugin>,
}

impl<'a> ResolveHost<'a> {
    fn new(registry: &'a PluginRegistry) -> Self {
        Self {
            registry,
            applied: Vec::new(),
        }
    }
}

impl Pluggable for ResolveHost<'_> {
    fn registry(&self) -> &PluginRegistry {
        self.registry
    }

    fn applied_plugins(&self) -> &[Plugin] {
        &self.applied
    }

    fn apply_order(&mut self, order: &[Plugin]) {
        let fresh: Vec<Plugin> = order
            .iter()
            .filter(|plugin| !self.applied.contains(plugin))
            .cloned()
            .collect();
        self.applied.splice(0..0, fresh);
    }

    fn display_name(&self) -> Option<&str> {
        Some("command line")
    }
}
