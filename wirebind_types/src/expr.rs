use serde_derive::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// A native type expression as written in a data-access declaration.
///
/// Only `Ident`, `Selector`, `Pointer`, `Slice` and `Array` can be resolved
/// into a canonical name. The remaining variants exist so that declarations
/// using them can be rejected with a precise message instead of a parse error.
#[derive(Serialize, Deserialize, Debug, PartialEq, Eq, Hash, Clone)]
#[serde(try_from = "String", into = "String")]
pub enum TypeExpr {
    /// A bare identifier such as `int32` or `Book`.
    Ident(String),
    /// A qualified name such as `sql.NullString`.
    Selector { owner: Box<TypeExpr>, name: String },
    Pointer(Box<TypeExpr>),
    Slice(Box<TypeExpr>),
    /// Fixed-length array. The length is kept verbatim.
    Array { len: String, element: Box<TypeExpr> },
    Map { key: Box<TypeExpr>, value: Box<TypeExpr> },
    // Raw declared text, keyword included.
    Chan(String),
    Func(String),
    Interface(String),
    Struct(String),
    /// Variadic parameter `...T`.
    Ellipsis(Box<TypeExpr>),
}

impl TypeExpr {
    pub fn ident(name: impl Into<String>) -> Self {
        TypeExpr::Ident(name.into())
    }

    /// `package.Name`
    pub fn qualified(package: impl Into<String>, name: impl Into<String>) -> Self {
        TypeExpr::Selector {
            owner: Box::new(TypeExpr::Ident(package.into())),
            name: name.into(),
        }
    }

    pub fn pointer(self) -> Self {
        TypeExpr::Pointer(Box::new(self))
    }

    pub fn slice(self) -> Self {
        TypeExpr::Slice(Box::new(self))
    }

    /// Human readable name of the outermost shape, used in diagnostics.
    pub fn shape_name(&self) -> &'static str {
        match self {
            TypeExpr::Ident(_) => "identifier",
            TypeExpr::Selector { .. } => "selector",
            TypeExpr::Pointer(_) => "pointer",
            TypeExpr::Slice(_) => "slice",
            TypeExpr::Array { .. } => "array",
            TypeExpr::Map { .. } => "map",
            TypeExpr::Chan(_) => "channel",
            TypeExpr::Func(_) => "function",
            TypeExpr::Interface(_) => "interface",
            TypeExpr::Struct(_) => "struct literal",
            TypeExpr::Ellipsis(_) => "variadic",
        }
    }
}

impl fmt::Display for TypeExpr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TypeExpr::Ident(name) => write!(f, "{}", name),
            TypeExpr::Selector { owner, name } => write!(f, "{}.{}", owner, name),
            TypeExpr::Pointer(inner) => write!(f, "*{}", inner),
            TypeExpr::Slice(element) => write!(f, "[]{}", element),
            TypeExpr::Array { len, element } => write!(f, "[{}]{}", len, element),
            TypeExpr::Map { key, value } => write!(f, "map[{}]{}", key, value),
            TypeExpr::Chan(raw)
            | TypeExpr::Func(raw)
            | TypeExpr::Interface(raw)
            | TypeExpr::Struct(raw) => write!(f, "{}", raw),
            TypeExpr::Ellipsis(element) => write!(f, "...{}", element),
        }
    }
}

#[derive(Debug, Error, PartialEq, Eq, Clone)]
pub enum ParseTypeError {
    #[error("empty type expression")]
    Empty,

    #[error("unexpected '{found}' at offset {offset} in type '{input}'")]
    Unexpected {
        found: char,
        offset: usize,
        input: String,
    },

    #[error("unexpected end of type '{input}'")]
    UnexpectedEnd { input: String },
}

impl FromStr for TypeExpr {
    type Err = ParseTypeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.trim().is_empty() {
            return Err(ParseTypeError::Empty);
        }
        let mut parser = TypeParser { input: s, pos: 0 };
        let expr = parser.parse_type()?;
        parser.skip_ws();
        match parser.peek() {
            None => Ok(expr),
            Some(c) => Err(parser.unexpected(c)),
        }
    }
}

impl TryFrom<String> for TypeExpr {
    type Error = ParseTypeError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<TypeExpr> for String {
    fn from(expr: TypeExpr) -> Self {
        expr.to_string()
    }
}

/* Recursive descent over Go type syntax */
struct TypeParser<'a> {
    input: &'a str,
    pos: usize,
}

fn is_ident_start(c: char) -> bool {
    c.is_alphabetic() || c == '_'
}

fn is_ident_continue(c: char) -> bool {
    c.is_alphanumeric() || c == '_'
}

impl<'a> TypeParser<'a> {
    fn rest(&self) -> &'a str {
        &self.input[self.pos..]
    }

    fn peek(&self) -> Option<char> {
        self.rest().chars().next()
    }

    fn skip_ws(&mut self) {
        while let Some(c) = self.peek() {
            if !c.is_whitespace() {
                break;
            }
            self.pos += c.len_utf8();
        }
    }

    fn unexpected(&self, found: char) -> ParseTypeError {
        ParseTypeError::Unexpected {
            found,
            offset: self.pos,
            input: self.input.to_string(),
        }
    }

    fn end(&self) -> ParseTypeError {
        ParseTypeError::UnexpectedEnd {
            input: self.input.to_string(),
        }
    }

    fn expect(&mut self, expected: char) -> Result<(), ParseTypeError> {
        self.skip_ws();
        match self.peek() {
            Some(c) if c == expected => {
                self.pos += c.len_utf8();
                Ok(())
            }
            Some(c) => Err(self.unexpected(c)),
            None => Err(self.end()),
        }
    }

    fn take_ident(&mut self) -> &'a str {
        let start = self.pos;
        while let Some(c) = self.peek() {
            if !is_ident_continue(c) {
                break;
            }
            self.pos += c.len_utf8();
        }
        &self.input[start..self.pos]
    }

    /* Next non-whitespace character without consuming anything */
    fn peek_past_ws(&self) -> Option<char> {
        self.rest().trim_start().chars().next()
    }

    /* Consume text up to an unmatched ']' or the end, keeping brackets balanced */
    fn take_raw(&mut self) -> Result<String, ParseTypeError> {
        let start = self.pos;
        let mut stack: Vec<char> = Vec::new();
        while let Some(c) = self.peek() {
            match c {
                '(' => stack.push(')'),
                '[' => stack.push(']'),
                '{' => stack.push('}'),
                ')' | ']' | '}' => match stack.last() {
                    Some(&close) if close == c => {
                        stack.pop();
                    }
                    None if c == ']' => break,
                    _ => return Err(self.unexpected(c)),
                },
                _ => {}
            }
            self.pos += c.len_utf8();
        }
        if !stack.is_empty() {
            return Err(self.end());
        }
        Ok(self.input[start..self.pos].trim_end().to_string())
    }

    fn parse_type(&mut self) -> Result<TypeExpr, ParseTypeError> {
        self.skip_ws();
        let start = self.pos;
        let c = self.peek().ok_or_else(|| self.end())?;

        match c {
            '*' => {
                self.pos += 1;
                Ok(TypeExpr::Pointer(Box::new(self.parse_type()?)))
            }
            '[' => {
                self.pos += 1;
                self.skip_ws();
                if self.peek() == Some(']') {
                    self.pos += 1;
                    return Ok(TypeExpr::Slice(Box::new(self.parse_type()?)));
                }
                let len_start = self.pos;
                while let Some(c) = self.peek() {
                    if c == ']' {
                        break;
                    }
                    self.pos += c.len_utf8();
                }
                let len = self.input[len_start..self.pos].trim().to_string();
                self.expect(']')?;
                Ok(TypeExpr::Array {
                    len,
                    element: Box::new(self.parse_type()?),
                })
            }
            '.' if self.rest().starts_with("...") => {
                self.pos += 3;
                Ok(TypeExpr::Ellipsis(Box::new(self.parse_type()?)))
            }
            '<' if self.rest().starts_with("<-") => Ok(TypeExpr::Chan(self.take_raw()?)),
            c if is_ident_start(c) => {
                let ident = self.take_ident();
                match ident {
                    "map" if self.peek_past_ws() == Some('[') => {
                        self.expect('[')?;
                        let key = self.parse_type()?;
                        self.expect(']')?;
                        let value = self.parse_type()?;
                        Ok(TypeExpr::Map {
                            key: Box::new(key),
                            value: Box::new(value),
                        })
                    }
                    "chan" => {
                        self.pos = start;
                        Ok(TypeExpr::Chan(self.take_raw()?))
                    }
                    "func" if self.peek_past_ws() == Some('(') => {
                        self.pos = start;
                        Ok(TypeExpr::Func(self.take_raw()?))
                    }
                    "interface" if self.peek_past_ws() == Some('{') => {
                        self.pos = start;
                        Ok(TypeExpr::Interface(self.take_raw()?))
                    }
                    "struct" if self.peek_past_ws() == Some('{') => {
                        self.pos = start;
                        Ok(TypeExpr::Struct(self.take_raw()?))
                    }
                    _ => {
                        let mut expr = TypeExpr::Ident(ident.to_string());
                        while self.rest().starts_with('.')
                            && self.rest()[1..].chars().next().is_some_and(is_ident_start)
                        {
                            self.pos += 1;
                            let name = self.take_ident().to_string();
                            expr = TypeExpr::Selector {
                                owner: Box::new(expr),
                                name,
                            };
                        }
                        Ok(expr)
                    }
                }
            }
            c => Err(self.unexpected(c)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(s: &str) -> TypeExpr {
        s.parse().unwrap()
    }

    #[test]
    fn parses_qualified_names() {
        assert_eq!(parse("sql.NullString"), TypeExpr::qualified("sql", "NullString"));
        assert_eq!(
            parse("a.b.C"),
            TypeExpr::Selector {
                owner: Box::new(TypeExpr::qualified("a", "b")),
                name: "C".to_string(),
            }
        );
    }

    #[test]
    fn parses_pointer_and_slice_prefixes() {
        assert_eq!(
            parse("[]*sql.NullTime"),
            TypeExpr::qualified("sql", "NullTime").pointer().slice()
        );
        assert_eq!(parse("*[]byte"), TypeExpr::ident("byte").slice().pointer());
        assert_eq!(
            parse("[16]byte"),
            TypeExpr::Array {
                len: "16".to_string(),
                element: Box::new(TypeExpr::ident("byte")),
            }
        );
    }

    #[test]
    fn parses_unsupported_shapes() {
        assert!(matches!(parse("map[string]int"), TypeExpr::Map { .. }));
        assert!(matches!(parse("func(int) error"), TypeExpr::Func(_)));
        assert!(matches!(parse("chan int"), TypeExpr::Chan(_)));
        assert!(matches!(parse("<-chan int"), TypeExpr::Chan(_)));
        assert!(matches!(parse("interface{}"), TypeExpr::Interface(_)));
        assert!(matches!(parse("struct{ A int }"), TypeExpr::Struct(_)));
        assert!(matches!(parse("...string"), TypeExpr::Ellipsis(_)));
        assert!(matches!(parse("map[string]func()"), TypeExpr::Map { .. }));
    }

    #[test]
    fn display_round_trips_declared_text() {
        for text in [
            "int32",
            "sql.NullString",
            "*uuid.UUID",
            "[]*time.Time",
            "[4]int16",
            "map[string][]byte",
            "func(a int) (string, error)",
            "interface{ String() string }",
            "...net.IP",
        ] {
            assert_eq!(parse(text).to_string(), text);
        }
    }

    #[test]
    fn rejects_malformed_input() {
        assert_eq!("".parse::<TypeExpr>(), Err(ParseTypeError::Empty));
        assert!(matches!(
            "int32 extra".parse::<TypeExpr>(),
            Err(ParseTypeError::Unexpected { found: 'e', .. })
        ));
        assert!(matches!(
            "[]".parse::<TypeExpr>(),
            Err(ParseTypeError::UnexpectedEnd { .. })
        ));
        assert!(matches!(
            "map[string".parse::<TypeExpr>(),
            Err(ParseTypeError::UnexpectedEnd { .. })
        ));
    }

    #[test]
    fn deserializes_from_yaml_string() {
        let expr: TypeExpr = serde_yml::from_str("\"[]sql.NullInt64\"").unwrap();
        assert_eq!(expr, TypeExpr::qualified("sql", "NullInt64").slice());
    }
}
