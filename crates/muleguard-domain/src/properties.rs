//! `.properties` text parsing.
//!
//! Follows the usual format rules: `#` and `!` comment lines, `=`, `:` or whitespace as the
//! key/value separator, trailing-backslash line continuation and backslash escapes
//! (including `\uXXXX`).

/// Ordered key/value pairs. Later duplicates are kept; [`Properties::get`] returns the last one.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Properties {
    entries: Vec<(String, String)>,
}

impl Properties {
    pub fn parse(text: &str) -> Self {
        let mut entries = Vec::new();
        for line in logical_lines(text) {
            let (key, value) = split_entry(&line);
            entries.push((unescape(&key), unescape(&value)));
        }
        Self { entries }
    }

    /// Simple `key<delimiter>value` lines, for files using a separator other than `=`.
    pub fn parse_with_delimiter(text: &str, delimiter: &str) -> Self {
        let entries = text
            .lines()
            .map(str::trim)
            .filter(|l| !is_comment(l))
            .filter_map(|l| l.split_once(delimiter))
            .map(|(k, v)| (k.trim().to_string(), v.trim().to_string()))
            .collect();
        Self { entries }
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.entries
            .iter()
            .rev()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    pub fn get_ignore_case(&self, key: &str) -> Option<&str> {
        self.entries
            .iter()
            .rev()
            .find(|(k, _)| k.eq_ignore_ascii_case(key))
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

pub fn is_comment(trimmed: &str) -> bool {
    trimmed.is_empty() || trimmed.starts_with('#') || trimmed.starts_with('!')
}

fn logical_lines(text: &str) -> Vec<String> {
    let mut out = Vec::new();
    let mut current: Option<String> = None;

    for raw in text.lines() {
        let line = raw.trim_start();
        let continuing = current.is_some();
        if !continuing && is_comment(line) {
            continue;
        }

        let (body, continues) = strip_continuation(line);
        let acc = current.get_or_insert_with(String::new);
        acc.push_str(body);

        if !continues {
            if let Some(done) = current.take() {
                out.push(done);
            }
        }
    }

    if let Some(rest) = current.take() {
        out.push(rest);
    }
    out
}

/// A line continues when it ends with an odd number of backslashes.
fn strip_continuation(line: &str) -> (&str, bool) {
    let trailing = line.bytes().rev().take_while(|b| *b == b'\\').count();
    if trailing % 2 == 1 {
        (&line[..line.len() - 1], true)
    } else {
        (line, false)
    }
}

fn split_entry(line: &str) -> (String, String) {
    let mut key = String::new();
    let mut chars = line.char_indices().peekable();
    let mut value_start = line.len();

    while let Some((i, c)) = chars.next() {
        match c {
            '\\' => {
                key.push(c);
                if let Some((_, next)) = chars.next() {
                    key.push(next);
                }
            }
            '=' | ':' => {
                value_start = i + c.len_utf8();
                break;
            }
            c if c.is_whitespace() => {
                let rest = line[i..].trim_start();
                let offset = line.len() - rest.len();
                value_start = match rest.chars().next() {
                    Some('=') | Some(':') => offset + 1,
                    _ => offset,
                };
                break;
            }
            _ => key.push(c),
        }
    }

    let value = line.get(value_start..).unwrap_or("").trim_start().to_string();
    (key, value)
}

fn unescape(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    let mut chars = s.chars();
    while let Some(c) = chars.next() {
        if c != '\\' {
            out.push(c);
            continue;
        }
        match chars.next() {
            Some('t') => out.push('\t'),
            Some('n') => out.push('\n'),
            Some('r') => out.push('\r'),
            Some('f') => out.push('\u{000C}'),
            Some('u') => {
                let hex: String = chars.clone().take(4).collect();
                match u32::from_str_radix(&hex, 16).ok().and_then(char::from_u32) {
                    Some(decoded) if hex.len() == 4 => {
                        out.push(decoded);
                        for _ in 0..4 {
                            chars.next();
                        }
                    }
                    _ => out.push('u'),
                }
            }
            Some(other) => out.push(other),
            None => {}
        }
    }
    out
}
