use std::fs;
use std::sync::Arc;

use crate::error::ParseError;
use crate::locator::{self, Environment, SystemEnvironment};
use crate::store::IniFile;
use crate::substitute::{CommandRunner, Substitutor, SystemCommandRunner};

/// Locates, reads, and parses an ini-file.
///
/// The environment and command runner default to the real process environment and
/// [`SystemCommandRunner`]; substitution defaults to off.
#[derive(Debug, Clone)]
pub struct Loader {
    environment: Arc<dyn Environment>,
    runner: Arc<dyn CommandRunner>,
    substitution: bool,
}

impl Default for Loader {
    fn default() -> Self {
        Self::new()
    }
}

impl Loader {
    #[must_use]
    pub fn new() -> Self {
        Self {
            environment: Arc::new(SystemEnvironment),
            runner: Arc::new(SystemCommandRunner),
            substitution: false,
        }
    }

    /// Where path overrides such as `APP_INI` are looked up.
    #[must_use]
    pub fn with_environment(mut self, environment: Arc<dyn Environment>) -> Self {
        self.environment = environment;
        self
    }

    /// What runs `$(cmd ...)` values once substitution is enabled.
    #[must_use]
    pub fn with_command_runner(mut self, runner: Arc<dyn CommandRunner>) -> Self {
        self.runner = runner;
        self
    }

    /// Initial substitution flag of the loaded file. Only enable this for trusted files: a
    /// `$(cmd ...)` value runs `cmd`.
    #[must_use]
    pub fn with_substitution(mut self, enabled: bool) -> Self {
        self.substitution = enabled;
        self
    }

    /// Read and parse `filename`, honoring an environment override for bare filenames.
    ///
    /// # Errors
    ///
    /// Returns [`ParseError::ReadFailure`] if the resolved file cannot be read and
    /// [`ParseError::MalformedLine`] on the first line that is not a header, comment, or
    /// assignment.
    pub fn read(&self, filename: &str) -> Result<IniFile, ParseError> {
        let path = locator::resolve_filename(filename, self.environment.as_ref());
        tracing::debug!(path = %path.display(), "reading ini-file");

        let buffer = fs::read(&path).map_err(|source| ParseError::ReadFailure {
            path: path.clone(),
            source,
        })?;

        let mut ini = IniFile::parse(&buffer, &path)?
            .with_substitutor(Substitutor::new(Arc::clone(&self.runner)));
        ini.set_substitution(self.substitution);

        Ok(ini)
    }
}
