use std::collections::HashMap;
use std::ffi::{OsStr, OsString};
use std::fmt;
use std::path::{Path, PathBuf};

/// Source of environment variables consulted when locating a file.
pub trait Environment: fmt::Debug + Send + Sync {
    /// The raw value of `key`, which need not be valid UTF-8.
    fn var(&self, key: &str) -> Option<OsString>;
}

/// Reads from the process environment.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemEnvironment;

impl Environment for SystemEnvironment {
    fn var(&self, key: &str) -> Option<OsString> {
        std::env::var_os(key)
    }
}

impl Environment for HashMap<String, String> {
    fn var(&self, key: &str) -> Option<OsString> {
        self.get(key).map(OsString::from)
    }
}

impl Environment for HashMap<String, OsString> {
    fn var(&self, key: &str) -> Option<OsString> {
        self.get(key).cloned()
    }
}

/// Name of the variable that may redirect `filename`, e.g. `app.ini` becomes `APP_INI`.
#[must_use]
pub fn override_variable(filename: &str) -> String {
    filename.replace('.', "_").to_uppercase()
}

/// Resolve the path to read for `requested`.
///
/// Paths with a directory component are returned untouched. A bare filename is redirected to
/// the value of its override variable when that variable is set and non-empty.
#[must_use]
pub fn resolve_filename<E>(requested: &str, env: &E) -> PathBuf
where
    E: Environment + ?Sized,
{
    if Path::new(requested).file_name() != Some(OsStr::new(requested)) {
        return PathBuf::from(requested);
    }

    let key = override_variable(requested);
    match env.var(&key) {
        Some(path) if !path.is_empty() => {
            tracing::debug!(requested, variable = %key, path = ?path, "config path overridden by environment");
            PathBuf::from(path)
        }
        _ => PathBuf::from(requested),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn env(pairs: &[(&str, &str)]) -> HashMap<String, String> {
        pairs
            .iter()
            .map(|&(k, v)| (k.to_owned(), v.to_owned()))
            .collect()
    }

    #[test]
    fn variable_name() {
        assert_eq!(override_variable("app.ini"), "APP_INI");
        assert_eq!(override_variable("my.app.conf"), "MY_APP_CONF");
        assert_eq!(override_variable("settings"), "SETTINGS");
    }

    #[test]
    fn bare_name_is_redirected() {
        let env = env(&[("APP_INI", "/etc/myapp/app.ini")]);

        assert_eq!(
            resolve_filename("app.ini", &env),
            PathBuf::from("/etc/myapp/app.ini")
        );
    }

    #[test]
    fn empty_variable_is_ignored() {
        let env = env(&[("APP_INI", "")]);

        assert_eq!(resolve_filename("app.ini", &env), PathBuf::from("app.ini"));
    }

    #[test]
    fn unset_variable_keeps_name() {
        assert_eq!(
            resolve_filename("app.ini", &HashMap::<String, String>::new()),
            PathBuf::from("app.ini")
        );
    }

    #[test]
    fn path_with_directory_is_never_redirected() {
        let env = env(&[("APP_INI", "/elsewhere.ini"), ("CONF/APP_INI", "/nope.ini")]);

        assert_eq!(
            resolve_filename("conf/app.ini", &env),
            PathBuf::from("conf/app.ini")
        );
        assert_eq!(
            resolve_filename("./app.ini", &env),
            PathBuf::from("./app.ini")
        );
    }

    #[cfg(unix)]
    #[test]
    fn non_utf8_override_is_honored() {
        use std::os::unix::ffi::{OsStrExt, OsStringExt};

        let target = OsString::from_vec(b"/etc/app-\xFF.ini".to_vec());
        let env = HashMap::from([("APP_INI".to_owned(), target.clone())]);

        let resolved = resolve_filename("app.ini", &env);

        assert_eq!(resolved.as_os_str().as_bytes(), target.as_bytes());
    }
}
