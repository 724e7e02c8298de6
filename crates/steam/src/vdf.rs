use std::fs;
use std::path::Path;

use crate::SteamError;

/// A node of a text KeyValues document (`.vdf`, `.acf`, `gameinfo.txt`).
///
/// Leaf nodes carry a value, object nodes carry children. Key lookups are
/// case-insensitive because Steam is not consistent about key casing
/// (`appid` vs `appID`, `apps` vs `Apps`).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeyValue {
    pub name: String,
    pub value: Option<String>,
    pub children: Vec<KeyValue>,
}

impl KeyValue {
    /// Returns the first child named `key`.
    pub fn get(&self, key: &str) -> Option<&KeyValue> {
        self.children
            .iter()
            .find(|c| c.name.eq_ignore_ascii_case(key))
    }

    /// Follows `keys` through nested objects.
    pub fn path(&self, keys: &[&str]) -> Option<&KeyValue> {
        keys.iter().try_fold(self, |node, key| node.get(key))
    }

    /// Returns the value of child `key`, if it is a leaf.
    pub fn str(&self, key: &str) -> Option<&str> {
        self.get(key)?.value.as_deref()
    }

    /// Returns the value of child `key` parsed as an unsigned integer.
    pub fn u64(&self, key: &str) -> Option<u64> {
        self.str(key)?.trim().parse().ok()
    }

    /// Returns child `key` as a boolean (`"1"` / `"true"`).
    pub fn bool(&self, key: &str) -> bool {
        matches!(self.str(key), Some(v) if v == "1" || v.eq_ignore_ascii_case("true"))
    }

    pub fn is_object(&self) -> bool {
        self.value.is_none()
    }
}

/// Reads and parses a text KeyValues file.
pub fn load_text_vdf(path: &Path) -> Result<KeyValue, SteamError> {
    let data = fs::read(path)
        .map_err(|e| SteamError::Io(format!("failed to read {}: {e}", path.display())))?;
    parse_text_vdf(&data)
}

/// Parses text KeyValues data. The document must start with one root key
/// whose value is an object.
pub fn parse_text_vdf(data: &[u8]) -> Result<KeyValue, SteamError> {
    // Skip a UTF-8 byte order mark.
    let data = data.strip_prefix(b"\xEF\xBB\xBF").unwrap_or(data);

    let (root, pos) = match read_token(data, 0)? {
        (Token::Str(name), pos) => (name, pos),
        (Token::Eof, _) => return Err(SteamError::Vdf("empty document".into())),
        (other, pos) => {
            return Err(SteamError::Vdf(format!(
                "expected root key at pos {pos}, got {other:?}"
            )));
        }
    };

    let pos = match read_token(data, pos)? {
        (Token::Open, pos) => pos,
        (other, pos) => {
            return Err(SteamError::Vdf(format!(
                "expected '{{' after root key '{root}' at pos {pos}, got {other:?}"
            )));
        }
    };

    let (children, _) = parse_object(data, pos)?;
    Ok(KeyValue {
        name: root,
        value: None,
        children,
    })
}

#[derive(Debug, PartialEq)]
enum Token {
    Str(String),
    Open,
    Close,
    Eof,
}

/// Parses object members until the matching `}`.
fn parse_object(data: &[u8], mut pos: usize) -> Result<(Vec<KeyValue>, usize), SteamError> {
    let mut children = Vec::new();

    loop {
        let (token, new_pos) = read_token(data, pos)?;
        pos = new_pos;

        let key = match token {
            Token::Close => return Ok((children, pos)),
            Token::Str(key) => key,
            Token::Open => {
                return Err(SteamError::Vdf(format!("unexpected '{{' at pos {pos}")));
            }
            Token::Eof => {
                return Err(SteamError::Vdf("unexpected end of data in object".into()));
            }
        };

        let (token, new_pos) = read_token(data, pos)?;
        pos = new_pos;

        match token {
            Token::Str(value) => children.push(KeyValue {
                name: key,
                value: Some(value),
                children: Vec::new(),
            }),
            Token::Open => {
                let (nested, new_pos) = parse_object(data, pos)?;
                pos = new_pos;
                children.push(KeyValue {
                    name: key,
                    value: None,
                    children: nested,
                });
            }
            Token::Close | Token::Eof => {
                return Err(SteamError::Vdf(format!("missing value for key '{key}'")));
            }
        }
    }
}

/// Reads the next token, skipping whitespace, `//` comments and
/// platform conditionals such as `[$WIN32]`.
fn read_token(data: &[u8], mut pos: usize) -> Result<(Token, usize), SteamError> {
    loop {
        while pos < data.len() && data[pos].is_ascii_whitespace() {
            pos += 1;
        }
        if pos >= data.len() {
            return Ok((Token::Eof, pos));
        }

        match data[pos] {
            b'/' if data.get(pos + 1) == Some(&b'/') => {
                while pos < data.len() && data[pos] != b'\n' {
                    pos += 1;
                }
            }
            b'[' => {
                while pos < data.len() && data[pos] != b']' {
                    pos += 1;
                }
                pos += 1;
            }
            b'{' => return Ok((Token::Open, pos + 1)),
            b'}' => return Ok((Token::Close, pos + 1)),
            b'"' => return read_quoted(data, pos + 1),
            _ => return Ok(read_bare(data, pos)),
        }
    }
}

/// Reads a quoted string starting after the opening quote.
fn read_quoted(data: &[u8], mut pos: usize) -> Result<(Token, usize), SteamError> {
    let start = pos;
    let mut buf = Vec::new();
    while pos < data.len() {
        match data[pos] {
            b'"' => {
                let s = String::from_utf8_lossy(&buf).into_owned();
                return Ok((Token::Str(s), pos + 1));
            }
            b'\\' if pos + 1 < data.len() => {
                let escaped = match data[pos + 1] {
                    b'n' => b'\n',
                    b't' => b'\t',
                    b'\\' => b'\\',
                    b'"' => b'"',
                    other => {
                        buf.push(b'\\');
                        other
                    }
                };
                buf.push(escaped);
                pos += 2;
            }
            b => {
                buf.push(b);
                pos += 1;
            }
        }
    }
    Err(SteamError::Vdf(format!(
        "unterminated string starting at pos {start}"
    )))
}

/// Reads an unquoted token up to whitespace or a structural character.
fn read_bare(data: &[u8], pos: usize) -> (Token, usize) {
    let start = pos;
    let mut end = pos;
    while end < data.len() && !data[end].is_ascii_whitespace() && !b"{}\"".contains(&data[end]) {
        end += 1;
    }
    let s = String::from_utf8_lossy(&data[start..end]).into_owned();
    (Token::Str(s), end)
}
