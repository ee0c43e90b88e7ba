use std::collections::HashMap;
use std::path::Path;

use crate::error::ParseError;
use crate::store::{Data, IniFile};

/// Whitespace stripped from every line, including a trailing carriage return.
const LINE_TRIM: &[char] = &[' ', '\t', '\n', '\r'];
const SECTION_TRIM: &[char] = &['[', ']', ' ', '\t'];
const NAME_TRIM: &[char] = &[' ', '\t'];
const VALUE_TRIM: &[char] = &[' ', '\t', '\'', '"'];

/// Represents an on-going parse.
#[derive(Debug)]
pub(crate) struct Parser<'a> {
    text: &'a str,
    path: &'a Path,
    section: String,
    sections: Vec<String>,
    data: Data,
}

impl<'a> Parser<'a> {
    #[must_use]
    pub(crate) fn new(text: &'a str, path: &'a Path) -> Self {
        Self {
            text,
            path,
            section: String::new(),
            sections: Vec::with_capacity(16),
            data: Data::new(),
        }
    }
}

impl Parser<'_> {
    /// Consume every line, stopping at the first malformed one.
    pub(crate) fn into_ini_file(mut self) -> Result<IniFile, ParseError> {
        for (index, line) in self.text.split('\n').enumerate() {
            let line = strip_comment(line).trim_matches(LINE_TRIM);

            if line.is_empty() {
                continue;
            }

            if line.starts_with('[') {
                self.parse_section(line);
            } else {
                self.parse_entry(line, index + 1)?;
            }
        }

        tracing::debug!(
            path = %self.path.display(),
            sections = self.sections.len(),
            entries = self.data.values().map(HashMap::len).sum::<usize>(),
            "parsed ini-file"
        );

        Ok(IniFile::new(self.sections, self.data))
    }

    /// Headers are trimmed of brackets rather than matched, so `[name` still names a section.
    fn parse_section(&mut self, line: &str) {
        let name = line.trim_matches(SECTION_TRIM);
        tracing::trace!(section = name, "section");

        self.section = name.to_owned();
        self.sections.push(self.section.clone());
    }

    fn parse_entry(&mut self, line: &str, line_number: usize) -> Result<(), ParseError> {
        let Some(equal) = line.find('=').filter(|&i| i > 0) else {
            return Err(ParseError::MalformedLine {
                path: self.path.to_path_buf(),
                line: line_number,
            });
        };

        let name = line[..equal].trim_matches(NAME_TRIM);
        let value = line[equal + 1..].trim_matches(VALUE_TRIM);

        // Later assignments to the same key win.
        self.data
            .entry(self.section.clone())
            .or_default()
            .insert(name.to_owned(), value.to_owned());

        Ok(())
    }
}

/// Truncate at the first `#` or `;`, wherever it appears.
fn strip_comment(line: &str) -> &str {
    line.find(['#', ';']).map_or(line, |i| &line[..i])
}
