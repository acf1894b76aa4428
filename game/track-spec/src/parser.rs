use std::io::Read;

use arrayvec::ArrayString;

use crate::tokenizer::{tokenize_line, unquote, LineToken, Token};

/// Longest line the parser keeps, longer lines are cut.
pub const MAX_LINE_LEN: usize = 150;

/// A parameter of the current line, `key=value` or just `value`.
#[derive(Debug, Clone, PartialEq)]
pub struct KeyedParam {
    pub key: Option<String>,
    pub value: String,
}

/// Line oriented scanner for track description files.
///
/// ```text
/// // comment
/// [Room]              <- class declaration, `Room:` works too
/// Id 0                <- attribute `Id` with one parameter
/// Wall 2000, 0, 1     <- parameters are separated by spaces and/or commas
/// Object: x=1, name="wall"
/// ```
///
/// Nothing here fails hard. A scan that can't produce a value returns `None`
/// and [`TrackSpecParser::get_error_line`] tells which line was scanned last.
/// Whether a broken line ends the whole load is up to the caller.
#[derive(Debug)]
pub struct TrackSpecParser {
    source: String,
    next_line_offset: usize,

    line: ArrayString<MAX_LINE_LEN>,
    tokens: Vec<LineToken>,
    cursor: usize,
    line_number: usize,
    /// the current line starts a class but was read while looking for an attribute
    line_pending: bool,
}

impl TrackSpecParser {
    pub fn new(source: impl Into<String>) -> Self {
        Self {
            source: source.into(),
            next_line_offset: 0,
            line: ArrayString::new(),
            tokens: Vec::new(),
            cursor: 0,
            line_number: 0,
            line_pending: false,
        }
    }

    pub fn from_reader(mut reader: impl Read) -> std::io::Result<Self> {
        let mut source = String::new();
        reader.read_to_string(&mut source)?;
        Ok(Self::new(source))
    }

    /// Rewinds to the start of the input.
    pub fn reset(&mut self) {
        self.next_line_offset = 0;
        self.line.clear();
        self.tokens.clear();
        self.cursor = 0;
        self.line_number = 0;
        self.line_pending = false;
    }

    /// 1-based number of the line scanned last, 0 before the first scan.
    pub fn get_error_line(&self) -> usize {
        self.line_number
    }

    pub fn current_line(&self) -> &str {
        self.line.as_str()
    }

    fn read_new_line(&mut self) -> bool {
        if self.next_line_offset >= self.source.len() {
            return false;
        }
        let rest = &self.source[self.next_line_offset..];
        let (raw, consumed) = match rest.find('\n') {
            Some(end) => (&rest[..end], end + 1),
            None => (rest, rest.len()),
        };
        let raw = raw.strip_suffix('\r').unwrap_or(raw);
        let mut cut = raw.len().min(MAX_LINE_LEN);
        while !raw.is_char_boundary(cut) {
            cut -= 1;
        }
        self.line.clear();
        self.line.push_str(&raw[..cut]);
        let truncated = cut < raw.len();

        self.next_line_offset += consumed;
        self.line_number += 1;
        if truncated {
            log::warn!(
                target: "track_spec",
                "line {} is longer than {} bytes and was truncated",
                self.line_number,
                MAX_LINE_LEN
            );
        }

        tokenize_line(self.line.as_str(), &mut self.tokens);
        self.cursor = 0;
        self.line_pending = false;
        true
    }

    fn token_str(&self, token: &LineToken) -> &str {
        &self.line[token.span.clone()]
    }

    /// The class the current line declares and the index of the first token after it.
    fn line_class(&self) -> Option<(String, usize)> {
        let first = self.tokens.first()?;
        let text = self.token_str(first);
        match first.token? {
            Token::Class => Some((text[1..text.len() - 1].trim().to_string(), 1)),
            Token::Text => text
                .strip_suffix(':')
                .filter(|name| !name.is_empty())
                .map(|name| (name.to_string(), 1)),
            _ => None,
        }
    }

    /// Moves to the next line, whatever it contains. Returns `false` at the end of the input.
    pub fn get_next_line(&mut self) -> bool {
        if self.line_pending {
            self.line_pending = false;
            self.cursor = 0;
            return true;
        }
        self.read_new_line()
    }

    /// Skips forward to the next class declaration and returns its name.
    ///
    /// If `expected` is given, a different class is a parse error and `None` is returned.
    pub fn get_next_class(&mut self, expected: Option<&str>) -> Option<String> {
        loop {
            if self.line_pending {
                self.line_pending = false;
            } else if !self.read_new_line() {
                return None;
            }

            if let Some((name, next)) = self.line_class() {
                self.cursor = next;
                return match expected {
                    Some(expected) if expected != name => None,
                    _ => Some(name),
                };
            }
        }
    }

    /// Reads the next attribute line of the current class and returns the attribute name.
    ///
    /// Returns `None` at the end of the input, if the next line starts a new
    /// class (the line is kept for [`TrackSpecParser::get_next_class`]), if the
    /// line doesn't start with a name or if the name isn't `expected`.
    pub fn get_next_attrib(&mut self, expected: Option<&str>) -> Option<String> {
        loop {
            if self.line_pending || !self.read_new_line() {
                return None;
            }
            if self.tokens.is_empty() {
                continue;
            }
            if self.line_class().is_some() {
                self.line_pending = true;
                return None;
            }

            let first = &self.tokens[0];
            if first.token != Some(Token::Text) {
                return None;
            }
            let name = self.token_str(first).to_string();
            self.cursor = 1;
            return match expected {
                Some(expected) if expected != name => None,
                _ => Some(name),
            };
        }
    }

    /// `None` if the line has no parameters left, `Some(None)` if the next
    /// parameter is malformed.
    fn next_param(&mut self) -> Option<Option<KeyedParam>> {
        while self
            .tokens
            .get(self.cursor)
            .is_some_and(|token| token.token == Some(Token::Comma))
        {
            self.cursor += 1;
        }
        let first = self.tokens.get(self.cursor)?;

        let value_of = |token: &LineToken| -> Option<String> {
            let text = &self.line[token.span.clone()];
            match token.token? {
                Token::Text => Some(text.to_string()),
                Token::Quoted => Some(unquote(text)),
                _ => None,
            }
        };

        let param = match self.tokens.get(self.cursor + 1) {
            Some(next) if next.token == Some(Token::Equals) => {
                let key = (first.token == Some(Token::Text))
                    .then(|| self.token_str(first).to_string());
                let value = self.tokens.get(self.cursor + 2).and_then(value_of);
                self.cursor += 3;
                key.zip(value).map(|(key, value)| KeyedParam {
                    key: Some(key),
                    value,
                })
            }
            _ => {
                self.cursor += 1;
                value_of(first).map(|value| KeyedParam { key: None, value })
            }
        };
        if param.is_none() {
            // the rest of the line can't be trusted anymore
            self.cursor = self.tokens.len();
        }
        Some(param)
    }

    /// Next parameter as string, `default` if the line has none left.
    pub fn get_next_str_param(&mut self, default: Option<&str>) -> Option<String> {
        match self.next_param() {
            None => default.map(str::to_string),
            Some(param) => param.map(|param| param.value),
        }
    }

    /// Next parameter as number, `default` if the line has none left and
    /// `None` if the parameter is not a number.
    pub fn get_next_num_param(&mut self, default: f64) -> Option<f64> {
        match self.next_param() {
            None => Some(default),
            Some(param) => param.and_then(|param| param.value.trim().parse::<f64>().ok()),
        }
    }

    /// Next parameter together with its key, if it has one.
    pub fn get_next_keyed_param(&mut self) -> Option<KeyedParam> {
        self.next_param().flatten()
    }

    /// The unparsed rest of the current line, for attributes with their own syntax.
    pub fn get_params(&self) -> &str {
        match (self.tokens.get(self.cursor), self.tokens.last()) {
            (Some(first), Some(last)) => &self.line[first.span.start..last.span.end],
            _ => "",
        }
    }
}

#[cfg(test)]
mod test {
    use super::{KeyedParam, TrackSpecParser, MAX_LINE_LEN};

    #[test]
    fn object_line() {
        let mut parser = TrackSpecParser::new("Object: x=1, y=2.5, name=\"wall\"\n");
        assert_eq!(parser.get_error_line(), 0);
        assert_eq!(parser.get_next_class(None).as_deref(), Some("Object"));
        assert_eq!(parser.get_error_line(), 1);
        assert_eq!(parser.get_next_num_param(0.0), Some(1.0));
        assert_eq!(parser.get_next_num_param(0.0), Some(2.5));
        assert_eq!(parser.get_next_str_param(None).as_deref(), Some("wall"));
        assert_eq!(parser.get_error_line(), 1);
        // exhausted
        assert_eq!(parser.get_next_str_param(None), None);
        assert_eq!(parser.get_next_str_param(Some("none")).as_deref(), Some("none"));
        assert_eq!(parser.get_next_num_param(7.0), Some(7.0));
        assert_eq!(parser.get_next_class(None), None);
    }

    const TRACK: &str = "\
// test track
[Header]
Name \"Two rooms\"
Laps 3

[Room]
Id 0
Wall 0, 0
Wall 1000 0 1 // shared with room 1
[Room]
Id 1
";

    #[test]
    fn classes_and_attributes() {
        let mut parser = TrackSpecParser::new(TRACK);
        assert_eq!(parser.get_next_class(Some("Header")).as_deref(), Some("Header"));
        assert_eq!(parser.get_error_line(), 2);

        assert_eq!(parser.get_next_attrib(None).as_deref(), Some("Name"));
        assert_eq!(parser.get_next_str_param(None).as_deref(), Some("Two rooms"));
        assert_eq!(parser.get_next_attrib(Some("Laps")).as_deref(), Some("Laps"));
        assert_eq!(parser.get_next_num_param(1.0), Some(3.0));
        // blank line is skipped, the class line stays for the next class scan
        assert_eq!(parser.get_next_attrib(None), None);
        assert_eq!(parser.get_error_line(), 6);
        assert_eq!(parser.get_next_attrib(None), None);

        assert_eq!(parser.get_next_class(None).as_deref(), Some("Room"));
        assert_eq!(parser.get_error_line(), 6);
        assert_eq!(parser.get_next_attrib(Some("Id")).as_deref(), Some("Id"));
        assert_eq!(parser.get_next_num_param(-1.0), Some(0.0));
        assert_eq!(parser.get_next_attrib(Some("Wall")).as_deref(), Some("Wall"));
        assert_eq!(parser.get_params(), "0, 0");
        assert_eq!(parser.get_next_attrib(Some("Wall")).as_deref(), Some("Wall"));
        assert_eq!(parser.get_next_num_param(0.0), Some(1000.0));
        assert_eq!(parser.get_params(), "0 1");
        assert_eq!(parser.get_next_num_param(0.0), Some(0.0));
        assert_eq!(parser.get_next_num_param(-1.0), Some(1.0));
        assert_eq!(parser.get_params(), "");

        assert_eq!(parser.get_next_class(None).as_deref(), Some("Room"));
        assert_eq!(parser.get_error_line(), 10);

        parser.reset();
        assert_eq!(parser.get_error_line(), 0);
        assert_eq!(parser.get_next_class(None).as_deref(), Some("Header"));
    }

    #[test]
    fn unexpected_class_is_an_error() {
        let mut parser = TrackSpecParser::new(TRACK);
        assert_eq!(parser.get_next_class(Some("Room")), None);
        assert_eq!(parser.get_error_line(), 2);
    }

    #[test]
    fn malformed_parameters() {
        let mut parser = TrackSpecParser::new("Laps three 4\nName \"open\n");
        assert_eq!(parser.get_next_attrib(None).as_deref(), Some("Laps"));
        assert_eq!(parser.get_next_num_param(1.0), None);
        assert_eq!(parser.get_next_num_param(1.0), Some(4.0));

        assert_eq!(parser.get_next_attrib(None).as_deref(), Some("Name"));
        assert_eq!(parser.get_next_str_param(Some("default")), None);
        assert_eq!(parser.get_error_line(), 2);
        assert!(!parser.get_next_line());
    }

    #[test]
    fn keyed_parameters() {
        let mut parser = TrackSpecParser::new("Pickup kind=mine, 3, respawn = 5000");
        assert_eq!(parser.get_next_attrib(None).as_deref(), Some("Pickup"));
        assert_eq!(
            parser.get_next_keyed_param(),
            Some(KeyedParam {
                key: Some("kind".to_string()),
                value: "mine".to_string()
            })
        );
        assert_eq!(
            parser.get_next_keyed_param(),
            Some(KeyedParam {
                key: None,
                value: "3".to_string()
            })
        );
        assert_eq!(parser.get_next_num_param(0.0), Some(5000.0));
        assert_eq!(parser.get_next_keyed_param(), None);
    }

    #[test]
    fn long_lines_are_truncated() {
        let long = format!("Name {}", "x".repeat(400));
        let mut parser = TrackSpecParser::new(long);
        assert!(parser.get_next_line());
        assert_eq!(parser.current_line().len(), MAX_LINE_LEN);
    }
}
