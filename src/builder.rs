use std::path::{Path, PathBuf};

use crate::error::ReqscopeError;
use crate::resolve::Resolver;
use crate::settings::{self, DEFAULT_ENV_PREFIX, SettingsInput};
use crate::types::{AmbiguityPolicy, ScriptFlow};

/// Builder for a [`Resolver`] whose settings come from layered sources.
///
/// ```ignore
/// let resolver = Resolver::builder()
///     .settings_file("reqscope.toml")
///     .script_flow(ScriptFlow::Sequential)
///     .build()?;
/// ```
///
/// Files are read at [`build()`](Self::build) time in the order they were
/// added, so a later file overrides an earlier one.
pub struct ResolverBuilder {
    files: Vec<PathBuf>,
    env_prefix: Option<String>,
    env_enabled: bool,
    env_vars: Option<Vec<(String, String)>>,
    strict: bool,
    overrides: Vec<(String, toml::Value)>,
}

impl Default for ResolverBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl ResolverBuilder {
    pub fn new() -> Self {
        Self {
            files: Vec::new(),
            env_prefix: None,
            env_enabled: true,
            env_vars: None,
            strict: true,
            overrides: Vec::new(),
        }
    }

    /// Add a settings file. A path that can't be read fails the build.
    pub fn settings_file(mut self, path: impl AsRef<Path>) -> Self {
        self.files.push(path.as_ref().to_path_buf());
        self
    }

    /// Override the environment variable prefix (default: `REQSCOPE`).
    pub fn env_prefix(mut self, prefix: &str) -> Self {
        self.env_prefix = Some(prefix.to_string());
        self
    }

    /// Disable environment variable loading entirely.
    pub fn no_env(mut self) -> Self {
        self.env_enabled = false;
        self
    }

    /// Read from these pairs instead of the process environment.
    pub fn env_vars(mut self, vars: Vec<(String, String)>) -> Self {
        self.env_vars = Some(vars);
        self
    }

    /// Enable or disable strict mode (default: `true`).
    /// In strict mode, unknown keys in settings files produce errors.
    pub fn strict(mut self, strict: bool) -> Self {
        self.strict = strict;
        self
    }

    /// Set a dotted settings key, e.g. `set("scripts.separator", "\n")`.
    /// Overrides beat files and environment; the last call for a key wins.
    pub fn set<V: Into<toml::Value>>(mut self, key: &str, value: V) -> Self {
        self.overrides.push((key.to_string(), value.into()));
        self
    }

    /// Like [`set`](Self::set), but `None` is ignored. Handy for optional CLI flags.
    pub fn set_opt<V: Into<toml::Value>>(self, key: &str, value: Option<V>) -> Self {
        match value {
            Some(v) => self.set(key, v),
            None => self,
        }
    }

    pub fn script_flow(self, flow: ScriptFlow) -> Self {
        self.set("scripts.flow", flow.as_str())
    }

    pub fn separator(self, separator: &str) -> Self {
        self.set("scripts.separator", separator)
    }

    pub fn ambiguity(self, policy: AmbiguityPolicy) -> Self {
        self.set("lookup.ambiguous", policy.as_str())
    }

    /// Shorthand for `ambiguity(AmbiguityPolicy::FirstMatch)`.
    pub fn first_match(self) -> Self {
        self.ambiguity(AmbiguityPolicy::FirstMatch)
    }

    fn effective_env_prefix(&self) -> Option<String> {
        if !self.env_enabled {
            return None;
        }
        Some(
            self.env_prefix
                .clone()
                .unwrap_or_else(|| DEFAULT_ENV_PREFIX.to_string()),
        )
    }

    fn read_files(&self) -> Result<Vec<(PathBuf, String)>, ReqscopeError> {
        self.files
            .iter()
            .map(|path| {
                std::fs::read_to_string(path)
                    .map(|content| (path.clone(), content))
                    .map_err(|e| ReqscopeError::IoError {
                        path: path.clone(),
                        source: e,
                    })
            })
            .collect()
    }

    /// Gather every layer and load the settings.
    pub fn load_settings(self) -> Result<settings::ResolverSettings, ReqscopeError> {
        let files = self.read_files()?;
        let env_prefix = self.effective_env_prefix();
        let env_vars = match (&env_prefix, self.env_vars) {
            (None, _) => Vec::new(),
            (Some(_), Some(vars)) => vars,
            (Some(_), None) => std::env::vars().collect(),
        };

        settings::load(SettingsInput {
            files,
            env_vars,
            env_prefix,
            overrides: self.overrides,
            strict: self.strict,
        })
    }

    pub fn build(self) -> Result<Resolver, ReqscopeError> {
        let settings = self.load_settings()?;
        tracing::debug!(
            flow = %settings.scripts.flow,
            ambiguous = %settings.lookup.ambiguous,
            "resolver settings loaded"
        );
        Ok(Resolver::new(settings))
    }
}
