/// The shape of one scanned value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenKind {
    /// Quoted string value.
    String,
    /// Start of a nested object; subsequent tokens are its pairs unless the
    /// caller skips past it.
    Object,
    /// `true` or `false` literal.
    Bool,
    /// Bare numeric literal.
    Number,
    /// No token produced: clean end of input or input the scanner cannot
    /// make sense of. Terminal either way.
    End,
}

/// One key/value pair produced by [`Scanner::next_token`].
///
/// Slices borrow from the scanned line. `value` is the raw text between the
/// quotes for [`TokenKind::String`] (no escape decoding) and empty for
/// [`TokenKind::Object`] and [`TokenKind::End`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Token<'a> {
    pub key: &'a str,
    pub value: &'a str,
    pub kind: TokenKind,
}

impl Token<'_> {
    fn end() -> Self {
        Token {
            key: "",
            value: "",
            kind: TokenKind::End,
        }
    }
}

/// Cursor over the unconsumed tail of one log line.
///
/// Each [`next_token`](Scanner::next_token) call consumes exactly one
/// key/value pair and moves the cursor forward; the scanner never rewinds
/// and never allocates. It is not a JSON parser: structural characters are
/// skipped positionally, and only the four value shapes legacy lines
/// actually contain are recognized.
pub struct Scanner<'a> {
    rest: &'a str,
}

impl<'a> Scanner<'a> {
    pub fn new(line: &'a str) -> Self {
        Scanner { rest: line }
    }

    /// The unconsumed remainder of the line.
    pub fn remaining(&self) -> &'a str {
        self.rest
    }

    /// Scans the next key/value pair.
    ///
    /// Returns a token with [`TokenKind::End`] when nothing more can be
    /// scanned; the cursor is left unchanged in that case.
    pub fn next_token(&mut self) -> Token<'a> {
        // A key is always a quoted string followed by a colon. Whatever sits
        // before the opening quote (braces, commas, whitespace) is skipped.
        let s = self.rest;
        let Some(q) = s.find('"') else {
            return Token::end();
        };
        let after_quote = &s[q + 1..];
        let Some(key_len) = find_closing_quote(after_quote) else {
            return Token::end();
        };
        let key = &after_quote[..key_len];

        let mut s = after_quote[key_len + 1..].trim_start();
        if !s.starts_with(':') {
            return Token::end();
        }
        s = s[1..].trim_start();

        // The first significant byte of the value decides its shape.
        match s.as_bytes().first().copied() {
            Some(b'"') => {
                let body = &s[1..];
                let Some(val_len) = find_closing_quote(body) else {
                    return Token::end();
                };
                self.rest = &body[val_len + 1..];
                Token {
                    key,
                    value: &body[..val_len],
                    kind: TokenKind::String,
                }
            }
            Some(b'{') => {
                // Leave the brace in place: the caller either walks the
                // nested pairs with further calls or skips the object.
                self.rest = s;
                Token {
                    key,
                    value: "",
                    kind: TokenKind::Object,
                }
            }
            Some(b't') | Some(b'f') => match split_bare_value(s) {
                Some((value, rest)) => {
                    self.rest = rest;
                    Token {
                        key,
                        value,
                        kind: TokenKind::Bool,
                    }
                }
                None => Token::end(),
            },
            Some(b'0'..=b'9') | Some(b'-') => match split_bare_value(s) {
                Some((value, rest)) => {
                    self.rest = rest;
                    Token {
                        key,
                        value,
                        kind: TokenKind::Number,
                    }
                }
                None => Token::end(),
            },
            _ => Token::end(),
        }
    }

    /// Consumes the nested object the cursor currently rests on, including
    /// its matching closing brace, so scanning can resume with the pair
    /// that follows it. Quotes are honored: braces inside string values do
    /// not unbalance the walk. On unbalanced input the cursor is drained.
    pub fn skip_object(&mut self) {
        let bytes = self.rest.as_bytes();
        let mut depth = 0usize;
        let mut in_string = false;
        let mut escaped = false;

        for (i, &b) in bytes.iter().enumerate() {
            if in_string {
                if escaped {
                    escaped = false;
                } else if b == b'\\' {
                    escaped = true;
                } else if b == b'"' {
                    in_string = false;
                }
                continue;
            }
            match b {
                b'"' => in_string = true,
                b'{' => depth += 1,
                b'}' => {
                    if depth <= 1 {
                        self.rest = &self.rest[i + 1..];
                        return;
                    }
                    depth -= 1;
                }
                _ => {}
            }
        }
        self.rest = "";
    }
}

/// Index of the next unescaped double quote in `s`, if any.
fn find_closing_quote(s: &str) -> Option<usize> {
    let bytes = s.as_bytes();
    let mut i = 0;
    while i < bytes.len() {
        match bytes[i] {
            b'\\' => i += 2,
            b'"' => return Some(i),
            _ => i += 1,
        }
    }
    None
}

/// Splits an unquoted literal (bool or number) from the text that follows
/// its `,` or `}` terminator.
fn split_bare_value(s: &str) -> Option<(&str, &str)> {
    let sep = s.find(|c| c == ',' || c == '}')?;
    Some((s[..sep].trim_end(), &s[sep + 1..]))
}
