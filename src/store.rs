use std::borrow::Cow;
use std::collections::HashMap;

use crate::substitute::Substitutor;

/// Values keyed by section name, then entry name. The default section is `""`.
pub(crate) type Data = HashMap<String, HashMap<String, String>>;

/// The parsed contents of one ini-file.
///
/// Apart from the substitution flag the store is read-only once parsed.
#[derive(Debug, Clone)]
pub struct IniFile {
    sections: Vec<String>,
    data: Data,
    substitution: bool,
    substitutor: Substitutor,
}

impl IniFile {
    #[must_use]
    pub(crate) fn new(sections: Vec<String>, data: Data) -> Self {
        Self {
            sections,
            data,
            substitution: false,
            substitutor: Substitutor::default(),
        }
    }

    #[must_use]
    pub(crate) fn with_substitutor(mut self, substitutor: Substitutor) -> Self {
        self.substitutor = substitutor;
        self
    }

    /// Returns the value of `name` in `section` (use `""` for the unnamed section), or an empty
    /// string when there is no such entry.
    ///
    /// When substitution is enabled the stored value is passed through the [`Substitutor`]
    /// first.
    #[must_use]
    pub fn get(&self, section: &str, name: &str) -> Cow<'_, str> {
        self.try_get(section, name).unwrap_or_default()
    }

    /// Like [`IniFile::get`], but tells a missing entry apart from an empty one.
    #[must_use]
    pub fn try_get(&self, section: &str, name: &str) -> Option<Cow<'_, str>> {
        let raw = self.raw(section, name)?;

        Some(if self.substitution {
            self.substitutor.substitute(raw)
        } else {
            Cow::Borrowed(raw)
        })
    }

    #[must_use]
    pub fn contains(&self, section: &str, name: &str) -> bool {
        self.raw(section, name).is_some()
    }

    /// Section headers in the order they appear in the file, repeats included.
    #[must_use]
    pub fn sections(&self) -> &[String] {
        &self.sections
    }

    /// Enable or disable substitution for subsequent lookups.
    ///
    /// Enabling this on untrusted input allows that input to run arbitrary commands.
    pub fn set_substitution(&mut self, enabled: bool) {
        self.substitution = enabled;
    }

    #[must_use]
    pub fn substitution_enabled(&self) -> bool {
        self.substitution
    }

    fn raw(&self, section: &str, name: &str) -> Option<&str> {
        self.data
            .get(section)
            .and_then(|entries| entries.get(name))
            .map(String::as_str)
    }
}
