/* Identifier case conversion shared by the schema and service emitters */

use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CaseForm {
  UpperCamel,
  LowerCamel,
  Snake,
  Kebab,
}

impl CaseForm {
  pub const ALL: [CaseForm; 4] = [CaseForm::UpperCamel, CaseForm::LowerCamel, CaseForm::Snake, CaseForm::Kebab];

  pub fn as_str(self) -> &'static str {
    match self {
      CaseForm::UpperCamel => "upper-camel",
      CaseForm::LowerCamel => "lower-camel",
      CaseForm::Snake => "snake",
      CaseForm::Kebab => "kebab",
    }
  }
}

impl fmt::Display for CaseForm {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.pad(self.as_str())
  }
}

impl FromStr for CaseForm {
  type Err = String;

  fn from_str(s: &str) -> Result<Self, Self::Err> {
    CaseForm::ALL
      .into_iter()
      .find(|form| form.as_str() == s)
      .ok_or_else(|| format!("unknown case form '{}' (expected upper-camel, lower-camel, snake or kebab)", s))
  }
}

/// Boundary before `cur` when it is an uppercase letter after a lowercase
/// letter or digit (`bookID` -> `book` | `ID`).
fn lower_or_digit_then_upper(prev: char, cur: char) -> bool {
  cur.is_uppercase() && (prev.is_lowercase() || prev.is_ascii_digit())
}

/// Boundary before `cur` when it ends an uppercase run and starts a word
/// (`HTTPServer` -> `HTTP` | `Server`).
fn acronym_then_word(prev: char, cur: char, next: Option<char>) -> bool {
  prev.is_uppercase() && cur.is_uppercase() && next.is_some_and(char::is_lowercase)
}

/// Split an identifier into words. Any non-alphanumeric character separates
/// words and is dropped.
pub fn split_words(input: &str) -> Vec<String> {
  let chars: Vec<char> = input.chars().collect();
  let mut words = Vec::new();
  let mut current = String::new();

  for (i, &cur) in chars.iter().enumerate() {
    if !cur.is_alphanumeric() {
      if !current.is_empty() {
        words.push(std::mem::take(&mut current));
      }
      continue;
    }

    if !current.is_empty() {
      let prev = chars[i - 1];
      let next = chars.get(i + 1).copied();
      if lower_or_digit_then_upper(prev, cur) || acronym_then_word(prev, cur, next) {
        words.push(std::mem::take(&mut current));
      }
    }
    current.push(cur);
  }

  if !current.is_empty() {
    words.push(current);
  }
  words
}

fn capitalize(word: &str) -> String {
  let mut chars = word.chars();
  match chars.next() {
    Some(first) => first.to_uppercase().chain(chars).collect(),
    None => String::new(),
  }
}

pub fn convert(form: CaseForm, input: &str) -> String {
  let words = split_words(input);
  match form {
    CaseForm::UpperCamel => words.iter().map(|w| capitalize(w)).collect(),
    CaseForm::LowerCamel => {
      let mut out = String::new();
      for (i, word) in words.iter().enumerate() {
        if i == 0 {
          out.push_str(&word.to_lowercase());
        } else {
          out.push_str(&capitalize(word));
        }
      }
      out
    }
    CaseForm::Snake => words.iter().map(|w| w.to_lowercase()).collect::<Vec<_>>().join("_"),
    CaseForm::Kebab => words.iter().map(|w| w.to_lowercase()).collect::<Vec<_>>().join("-"),
  }
}

pub fn to_upper_camel(input: &str) -> String {
  convert(CaseForm::UpperCamel, input)
}

pub fn to_lower_camel(input: &str) -> String {
  convert(CaseForm::LowerCamel, input)
}

pub fn to_snake(input: &str) -> String {
  convert(CaseForm::Snake, input)
}

pub fn to_kebab(input: &str) -> String {
  convert(CaseForm::Kebab, input)
}

/// Go identifier protoc-gen-go derives from a proto name: `_` followed by a
/// lowercase letter collapses, `_` before anything else is kept, a leading
/// `_` becomes `X`.
pub fn proto_camel_case(name: &str) -> String {
  let bytes = name.as_bytes();
  let mut out = Vec::with_capacity(bytes.len());
  let mut i = 0;

  while i < bytes.len() {
    let c = bytes[i];
    let next_lower = bytes.get(i + 1).is_some_and(u8::is_ascii_lowercase);
    match c {
      b'.' if next_lower => {}
      b'.' => out.push(b'_'),
      b'_' if i == 0 || bytes[i - 1] == b'.' => out.push(b'X'),
      b'_' if next_lower => {}
      c if c.is_ascii_digit() => out.push(c),
      c => {
        out.push(c.to_ascii_uppercase());
        while bytes.get(i + 1).is_some_and(u8::is_ascii_lowercase) {
          i += 1;
          out.push(bytes[i]);
        }
      }
    }
    i += 1;
  }
  /* Only ASCII bytes are rewritten, so multi-byte sequences survive intact */
  String::from_utf8(out).unwrap_or_else(|e| String::from_utf8_lossy(e.as_bytes()).into_owned())
}

/// Proto field name of a native field.
pub fn wire_field_name(native: &str) -> String {
  to_snake(native)
}

/// Go field name protoc-gen-go generates for a native field, also the suffix
/// of its `Get` accessor.
pub fn accessor_name(native: &str) -> String {
  proto_camel_case(&wire_field_name(native))
}
