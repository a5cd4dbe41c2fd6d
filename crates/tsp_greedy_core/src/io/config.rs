use std::{fs, path::Path};

use crate::{Error, Result};

/// Key-value configuration file.
///
/// One entry per line, the key separated from its value by whitespace, `=` or
/// `:`. Blank lines and `#` comments (at line start or after whitespace) are
/// ignored; later duplicates win.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct ConfigFile {
    entries: Vec<(String, String)>,
}

impl ConfigFile {
    pub fn load(path: &Path) -> Result<Self> {
        let text = fs::read_to_string(path).map_err(|e| {
            Error::invalid_input(format!("failed to read config file {}: {e}", path.display()))
        })?;
        Ok(Self::parse(&text))
    }

    pub fn parse(text: &str) -> Self {
        let mut entries: Vec<(String, String)> = Vec::new();
        for line in text.lines() {
            let line = strip_comment(line).trim();
            if line.is_empty() {
                continue;
            }

            let (key, value) = match line.find(|c: char| c.is_whitespace() || c == '=' || c == ':') {
                Some(split) => {
                    let value = line[split..]
                        .trim_start_matches(|c: char| c.is_whitespace() || c == '=' || c == ':');
                    (&line[..split], value.trim())
                }
                None => (line, ""),
            };

            entries.retain(|(k, _)| k != key);
            entries.push((key.to_owned(), value.to_owned()));
        }
        Self { entries }
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.entries
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Drops a `#` comment that starts the line or follows whitespace; a `#`
/// inside a value (`data/run#2.tsp`) is kept.
fn strip_comment(line: &str) -> &str {
    let mut prev_is_space = true;
    for (idx, c) in line.char_indices() {
        if c == '#' && prev_is_space {
            return &line[..idx];
        }
        prev_is_space = c.is_whitespace();
    }
    line
}
