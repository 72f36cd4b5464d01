//! Parser for text-encoded list literals such as `[1, 2, 3]` or
//! `['a', 2.5, None]`.
//!
//! The accepted grammar is the literal subset that upstream exports write:
//! integers (optional sign, `_` digit separators), floats with a fraction
//! and/or exponent, single or double quoted strings, `True`, `False`, `None`,
//! and nested lists. A trailing comma is allowed. Bare words and anything
//! else are rejected.
//!
//! Booleans are not integers here: `[True, False]` is a mixed list, where
//! legacy exports labelled it `category_list[int]`.

use std::{iter::Peekable, str::Chars};

#[derive(Debug, Clone, PartialEq)]
pub enum ListElement {
    Int(i64),
    Float(f64),
    Str(String),
    Bool(bool),
    None,
    List(Vec<ListElement>),
}

impl ListElement {
    pub fn as_number(&self) -> Option<f64> {
        match self {
            ListElement::Int(i) => Some(*i as f64),
            ListElement::Float(f) => Some(*f),
            _ => None,
        }
    }
}

/// Element kinds seen across one or more lists.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ElementKinds {
    pub ints: bool,
    pub floats: bool,
    pub others: bool,
}

impl ElementKinds {
    pub fn of(elements: &[ListElement]) -> Self {
        let mut kinds = Self::default();
        kinds.extend(elements);
        kinds
    }

    pub fn extend(&mut self, elements: &[ListElement]) {
        for element in elements {
            match element {
                ListElement::Int(_) => self.ints = true,
                ListElement::Float(_) => self.floats = true,
                _ => self.others = true,
            }
        }
    }

    pub fn only_ints(&self) -> bool {
        self.ints && !self.floats && !self.others
    }

    pub fn only_floats(&self) -> bool {
        self.floats && !self.ints && !self.others
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListSyntaxError {
    pub position: usize,
    pub message: &'static str,
}

/// True when the text is bracket-delimited; says nothing about whether the
/// content parses.
pub fn looks_like_list(value: &str) -> bool {
    value.starts_with('[') && value.ends_with(']')
}

pub fn parse_list(value: &str) -> Result<Vec<ListElement>, ListSyntaxError> {
    let mut parser = Parser {
        chars: value.chars().peekable(),
        position: 0,
    };
    parser.skip_whitespace();
    let list = parser.list()?;
    parser.skip_whitespace();
    if parser.chars.peek().is_some() {
        return Err(parser.error("trailing characters after list"));
    }
    Ok(list)
}

struct Parser<'a> {
    chars: Peekable<Chars<'a>>,
    position: usize,
}

impl Parser<'_> {
    fn error(&self, message: &'static str) -> ListSyntaxError {
        ListSyntaxError {
            position: self.position,
            message,
        }
    }

    fn bump(&mut self) -> Option<char> {
        let next = self.chars.next();
        if next.is_some() {
            self.position += 1;
        }
        next
    }

    fn skip_whitespace(&mut self) {
        while self.chars.peek().is_some_and(|c| c.is_whitespace()) {
            self.bump();
        }
    }

    fn expect(&mut self, wanted: char, message: &'static str) -> Result<(), ListSyntaxError> {
        match self.bump() {
            Some(c) if c == wanted => Ok(()),
            _ => Err(self.error(message)),
        }
    }

    fn list(&mut self) -> Result<Vec<ListElement>, ListSyntaxError> {
        self.expect('[', "expected '['")?;
        let mut elements = Vec::new();
        loop {
            self.skip_whitespace();
            if self.chars.peek() == Some(&']') {
                self.bump();
                return Ok(elements);
            }
            elements.push(self.element()?);
            self.skip_whitespace();
            match self.bump() {
                Some(',') => continue,
                Some(']') => return Ok(elements),
                _ => return Err(self.error("expected ',' or ']'")),
            }
        }
    }

    fn element(&mut self) -> Result<ListElement, ListSyntaxError> {
        match self.chars.peek().copied() {
            Some('[') => self.list().map(ListElement::List),
            Some(quote @ ('\'' | '"')) => self.string(quote).map(ListElement::Str),
            Some(c) if c.is_ascii_digit() || matches!(c, '-' | '+' | '.') => self.number(),
            Some(c) if c.is_alphabetic() => self.keyword(),
            _ => Err(self.error("unexpected character")),
        }
    }

    fn string(&mut self, quote: char) -> Result<String, ListSyntaxError> {
        self.bump();
        let mut out = String::new();
        loop {
            match self.bump() {
                Some('\\') => match self.bump() {
                    Some('n') => out.push('\n'),
                    Some('t') => out.push('\t'),
                    Some('r') => out.push('\r'),
                    Some('0') => out.push('\0'),
                    Some(other) => out.push(other),
                    None => return Err(self.error("unterminated escape")),
                },
                Some(c) if c == quote => return Ok(out),
                Some(c) => out.push(c),
                None => return Err(self.error("unterminated string")),
            }
        }
    }

    fn keyword(&mut self) -> Result<ListElement, ListSyntaxError> {
        let mut word = String::new();
        while let Some(c) = self.chars.peek().copied() {
            if c.is_alphanumeric() || c == '_' {
                word.push(c);
                self.bump();
            } else {
                break;
            }
        }
        match word.as_str() {
            "True" => Ok(ListElement::Bool(true)),
            "False" => Ok(ListElement::Bool(false)),
            "None" => Ok(ListElement::None),
            _ => Err(self.error("bare word is not a literal")),
        }
    }

    fn number(&mut self) -> Result<ListElement, ListSyntaxError> {
        let mut token = String::new();
        while let Some(c) = self.chars.peek().copied() {
            if c.is_ascii_alphanumeric() || matches!(c, '.' | '_' | '+' | '-') {
                token.push(c);
                self.bump();
            } else {
                break;
            }
        }
        parse_number_token(&token).ok_or_else(|| self.error("invalid numeric literal"))
    }
}

fn parse_number_token(token: &str) -> Option<ListElement> {
    let (sign, body) = match token.strip_prefix('-') {
        Some(rest) => ("-", rest),
        None => ("", token.strip_prefix('+').unwrap_or(token)),
    };
    if body.is_empty() || body.starts_with(['+', '-']) || body.contains("__") {
        return None;
    }
    if body.starts_with('_') || body.ends_with('_') {
        return None;
    }
    let cleaned = format!("{sign}{}", body.replace('_', ""));
    let is_float = body.contains(['.', 'e', 'E']);
    if is_float {
        let float_chars =
            |c: char| c.is_ascii_digit() || matches!(c, '.' | 'e' | 'E' | '+' | '-' | '_');
        if !body.chars().all(float_chars) {
            return None;
        }
        cleaned.parse::<f64>().ok().map(ListElement::Float)
    } else {
        if !body.chars().all(|c| c.is_ascii_digit() || c == '_') {
            return None;
        }
        // `007` is not a valid integer literal; `000` is.
        if body.starts_with('0') && !body.trim_start_matches(['0', '_']).is_empty() {
            return None;
        }
        cleaned.parse::<i64>().ok().map(ListElement::Int)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_integer_lists() {
        assert_eq!(
            parse_list("[1, -2, +3]").unwrap(),
            vec![ListElement::Int(1), ListElement::Int(-2), ListElement::Int(3)]
        );
    }

    #[test]
    fn parses_mixed_elements_and_nested_lists() {
        let parsed = parse_list("['a', \"b\", 2.5, 1e3, None, True, [1]]").unwrap();
        assert_eq!(
            parsed,
            vec![
                ListElement::Str("a".into()),
                ListElement::Str("b".into()),
                ListElement::Float(2.5),
                ListElement::Float(1000.0),
                ListElement::None,
                ListElement::Bool(true),
                ListElement::List(vec![ListElement::Int(1)]),
            ]
        );
    }

    #[test]
    fn allows_trailing_comma_and_empty_list() {
        assert_eq!(parse_list("[1,]").unwrap(), vec![ListElement::Int(1)]);
        assert!(parse_list("[ ]").unwrap().is_empty());
    }

    #[test]
    fn rejects_bare_words_and_malformed_input() {
        assert!(parse_list("[a, b]").is_err());
        assert!(parse_list("[1, 2").is_err());
        assert!(parse_list("[1 2]").is_err());
        assert!(parse_list("[1,,2]").is_err());
        assert!(parse_list("[1] x").is_err());
        assert!(parse_list("[007]").is_err());
        assert!(parse_list("['open]").is_err());
    }

    #[test]
    fn element_kinds_classify_lists() {
        let ints = parse_list("[1, 2]").unwrap();
        assert!(ElementKinds::of(&ints).only_ints());
        let floats = parse_list("[1.0, 2.5]").unwrap();
        assert!(ElementKinds::of(&floats).only_floats());
        let mixed = parse_list("[1, 2.5]").unwrap();
        let kinds = ElementKinds::of(&mixed);
        assert!(!kinds.only_ints() && !kinds.only_floats());
        let booleans = parse_list("[True]").unwrap();
        assert!(!ElementKinds::of(&booleans).only_ints());
    }

    #[test]
    fn looks_like_list_checks_brackets_only() {
        assert!(!looks_like_list("[nope"));
        assert!(looks_like_list("[nope]"));
    }
}
