//! Parse simple ini-files into a section/name keyed store.
//!
//! ```no_run
//! let ini = inifile::read("app.ini")?;
//! let host = ini.get("server", "host");
//! # Ok::<(), inifile::ParseError>(())
//! ```
//!
//! Values of the form `$(<path)` and `$(cmd args...)` can be replaced at lookup time by file
//! contents or command output. This is off unless [`IniFile::set_substitution`] or
//! [`Loader::with_substitution`] turns it on, and it must stay off for untrusted files since it
//! runs whatever command the file names.

#![warn(
    clippy::correctness,
    clippy::suspicious,
    clippy::complexity,
    clippy::perf,
    clippy::style,
    clippy::pedantic
)]

mod error;
mod loader;
mod locator;
mod parser;
mod store;
mod substitute;

use std::io::Read;
use std::path::Path;

pub use error::ParseError;
pub use loader::Loader;
pub use locator::{Environment, SystemEnvironment, override_variable, resolve_filename};
pub use store::IniFile;
pub use substitute::{CommandRunner, Pattern, Substitutor, SystemCommandRunner};

use parser::Parser;

/// Byte Order Mark (BOM) is used to signal the endianness of an encoding. The order `0xFF 0xFE`
/// strongly suggests that the encoding is using little-endian byte order.
///
/// <https://en.wikipedia.org/wiki/Byte_order_mark>
const BOM_LE: &[u8] = &[0xFF, 0xFE];
const BOM_UTF8: &[u8] = &[0xEF, 0xBB, 0xBF];

/// Read and parse `filename` using the process environment, with substitution disabled.
///
/// A bare filename such as `app.ini` is replaced by the value of `APP_INI` when that variable is
/// set and non-empty.
///
/// # Errors
///
/// See [`Loader::read`].
pub fn read(filename: &str) -> Result<IniFile, ParseError> {
    Loader::new().read(filename)
}

impl IniFile {
    /// Parse an in-memory ini-file. `path` is only used in error messages.
    ///
    /// # Errors
    ///
    /// Returns [`ParseError::MalformedLine`] for the first line that is not blank, a comment, a
    /// section header, or a `name = value` assignment.
    pub fn parse<P>(buffer: &[u8], path: P) -> Result<Self, ParseError>
    where
        P: AsRef<Path>,
    {
        let text = decode_data(buffer);
        Parser::new(&text, path.as_ref()).into_ini_file()
    }

    /// # Errors
    ///
    /// Returns [`ParseError::ReadFailure`] if `reader` fails, otherwise as [`IniFile::parse`].
    pub fn from_reader<R, P>(reader: &mut R, path: P) -> Result<Self, ParseError>
    where
        R: Read + ?Sized,
        P: AsRef<Path>,
    {
        let mut buffer = Vec::with_capacity(4096);
        reader
            .read_to_end(&mut buffer)
            .map_err(|source| ParseError::ReadFailure {
                path: path.as_ref().to_path_buf(),
                source,
            })?;

        Self::parse(&buffer, path)
    }
}

fn decode_data(data: &[u8]) -> String {
    if let Some(data) = data.strip_prefix(BOM_LE) {
        // Likely UTF-16 LE
        let chunks = data.chunks_exact(2);
        let dangling = !chunks.remainder().is_empty();
        let utf16 = chunks
            .map(|chunk| u16::from_le_bytes([chunk[0], chunk[1]]))
            .collect::<Vec<u16>>();

        let mut text = char::decode_utf16(utf16)
            .map(|c| c.unwrap_or(char::REPLACEMENT_CHARACTER))
            .collect::<String>();
        if dangling {
            text.push(char::REPLACEMENT_CHARACTER);
        }
        text
    } else {
        let data = data.strip_prefix(BOM_UTF8).unwrap_or(data);
        String::from_utf8_lossy(data).into_owned()
    }
}

#[cfg(test)]
mod tests {
    use std::io;
    use std::sync::Arc;

    use super::*;
    use crate::substitute::tests::RecordingRunner;

    #[test]
    fn parse_mixed_file() {
        let buffer = br#"
; global settings
name = "demo"

[server]
host = localhost   # inline comment
port = 8080

[database]
url = 'postgres://localhost/demo'
"#;

        let ini = IniFile::parse(buffer, "app.ini").expect("failed to parse hardcoded ini-file");

        assert_eq!(ini.sections(), ["server", "database"]);
        assert_eq!(ini.get("", "name"), "demo");
        assert_eq!(ini.get("server", "host"), "localhost");
        assert_eq!(ini.get("server", "port"), "8080");
        assert_eq!(ini.get("database", "url"), "postgres://localhost/demo");
    }

    #[test]
    fn malformed_line_stops_parse() {
        let buffer = b"[s]\nk = v\njusttext\n";

        let err = IniFile::parse(buffer, "app.ini").expect_err("line without '=' should fail");

        assert_eq!(err.to_string(), "unknown value in file app.ini in line 3");
    }

    #[test]
    fn utf8_bom_is_skipped() {
        let buffer = b"\xEF\xBB\xBF[s]\nk = v\n";

        let ini = IniFile::parse(buffer, "bom.ini").expect("failed to parse hardcoded ini-file");

        assert_eq!(ini.sections(), ["s"]);
    }

    #[test]
    fn utf16_le_is_decoded() {
        let mut buffer = BOM_LE.to_vec();
        buffer.extend("[s]\r\nk = v\r\n".encode_utf16().flat_map(u16::to_le_bytes));

        let ini = IniFile::parse(&buffer, "wide.ini").expect("failed to parse hardcoded ini-file");

        assert_eq!(ini.get("s", "k"), "v");
    }

    #[test]
    fn utf16_le_odd_trailing_byte_is_replaced() {
        let mut buffer = BOM_LE.to_vec();
        buffer.extend("k = v".encode_utf16().flat_map(u16::to_le_bytes));
        buffer.push(b'x');

        assert_eq!(decode_data(&buffer), "k = v\u{FFFD}");
    }

    #[test]
    fn from_reader_parses() {
        let mut reader = io::Cursor::new("[s]\nk = v\n");

        let ini = IniFile::from_reader(&mut reader, "cursor.ini")
            .expect("failed to parse hardcoded ini-file");

        assert_eq!(ini.get("s", "k"), "v");
    }

    #[derive(Debug)]
    struct BrokenReader;

    impl Read for BrokenReader {
        fn read(&mut self, _: &mut [u8]) -> io::Result<usize> {
            Err(io::Error::other("broken"))
        }
    }

    #[test]
    fn from_reader_failure_is_read_failure() {
        let err = IniFile::from_reader(&mut BrokenReader, "broken.ini")
            .expect_err("broken reader should fail");

        assert!(matches!(err, ParseError::ReadFailure { .. }));
    }

    #[test]
    fn substitution_gating() {
        let dir = tempfile::tempdir().expect("failed to create temp dir");
        let other = dir.path().join("otherfile");
        std::fs::write(&other, "X").expect("failed to write fixture");
        let raw = format!("$(<{})", other.display());
        let buffer = format!("value = {raw}\n");

        let mut ini =
            IniFile::parse(buffer.as_bytes(), "app.ini").expect("failed to parse fixture");

        assert_eq!(ini.get("", "value"), raw.as_str());

        ini.set_substitution(true);
        assert_eq!(ini.get("", "value"), "X");
    }

    #[test]
    fn substitution_of_missing_file_returns_raw() {
        let buffer = b"value = $(<definitely/not/here)\n";
        let mut ini = IniFile::parse(buffer, "app.ini")
            .expect("failed to parse fixture")
            .with_substitutor(Substitutor::new(Arc::new(RecordingRunner::failing())));

        ini.set_substitution(true);

        assert_eq!(ini.get("", "value"), "$(<definitely/not/here)");
    }

    #[test]
    fn store_is_shareable_across_threads() {
        let ini = Arc::new(IniFile::parse(b"[s]\nk = v\n", "app.ini").expect("fixture"));

        let handles = (0..4)
            .map(|_| {
                let ini = Arc::clone(&ini);
                std::thread::spawn(move || ini.get("s", "k").into_owned())
            })
            .collect::<Vec<_>>();

        for handle in handles {
            assert_eq!(handle.join().expect("reader thread panicked"), "v");
        }
    }
}
