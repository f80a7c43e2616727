//! Lazy tokenizer over a collapsed icon definition region.
//!
//! The tokenizer only looks for the field prefixes it was given. Everything
//! between recognised fields is skipped one character at a time, so unknown
//! properties (colours, clone settings, comments) never reach the parser.
//! Every [`Token::Field`] is followed by exactly one value token.

use super::extractor::ExtractError;
use crate::models::IconField;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Token {
    Field(IconField),
    Str(String),
    List(Vec<String>),
    Bool(bool),
}

pub struct Tokenizer<'a> {
    text: &'a str,
    fields: &'a [IconField],
    pos: usize,
    pending: Option<IconField>,
    finished: bool,
}

impl<'a> Tokenizer<'a> {
    pub fn new(text: &'a str, fields: &'a [IconField]) -> Self {
        Self {
            text,
            fields,
            pos: 0,
            pending: None,
            finished: false,
        }
    }

    /// Byte offset of the cursor within the region.
    pub fn position(&self) -> usize {
        self.pos
    }

    fn read_value(&mut self, field: IconField) -> Result<Token, ExtractError> {
        let start = self.pos;
        let rest = &self.text[start..];

        match rest.chars().next() {
            None => Err(ExtractError::MissingValue {
                field,
                offset: start,
            }),
            Some('\'') => {
                let (value, len) = read_quoted(rest, start)?;
                self.pos += len;
                Ok(Token::Str(value))
            }
            Some('[') => {
                let (values, len) = read_list(rest, start)?;
                self.pos += len;
                Ok(Token::List(values))
            }
            Some(_) => {
                let end = rest.find(' ').unwrap_or(rest.len());
                self.pos += end;
                match &rest[..end] {
                    "true" => Ok(Token::Bool(true)),
                    "false" => Ok(Token::Bool(false)),
                    other => Err(ExtractError::InvalidLiteral {
                        literal: other.to_string(),
                        offset: start,
                    }),
                }
            }
        }
    }
}

impl Iterator for Tokenizer<'_> {
    type Item = Result<Token, ExtractError>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.finished {
            return None;
        }

        if let Some(field) = self.pending.take() {
            let value = self.read_value(field);
            if value.is_err() {
                self.finished = true;
            }
            return Some(value);
        }

        while let Some(rest) = self.text.get(self.pos..).filter(|r| !r.is_empty()) {
            if let Some(field) = self
                .fields
                .iter()
                .copied()
                .find(|f| rest.starts_with(f.prefix()))
            {
                self.pos += field.prefix().len();
                self.pending = Some(field);
                return Some(Ok(Token::Field(field)));
            }

            self.pos += rest.chars().next().map_or(1, char::len_utf8);
        }

        self.finished = true;
        None
    }
}

/// Read `'...'` at the start of `rest`. Returns the content and the consumed length.
fn read_quoted(rest: &str, offset: usize) -> Result<(String, usize), ExtractError> {
    let body = &rest[1..];
    match body.find('\'') {
        Some(end) => Ok((body[..end].to_string(), end + 2)),
        None => Err(ExtractError::UnterminatedString { offset }),
    }
}

/// Read `[ 'a', 'b' ]` at the start of `rest`. Only flat lists of quoted strings.
fn read_list(rest: &str, offset: usize) -> Result<(Vec<String>, usize), ExtractError> {
    let mut values = Vec::new();
    let mut i = 1;

    loop {
        let Some(c) = rest[i..].chars().next() else {
            return Err(ExtractError::UnterminatedList { offset });
        };

        match c {
            ' ' | ',' => i += 1,
            ']' => return Ok((values, i + 1)),
            '\'' => {
                let (value, len) = read_quoted(&rest[i..], offset + i)?;
                values.push(value);
                i += len;
            }
            _ => return Err(ExtractError::MalformedList { offset: offset + i }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const FILE_FIELDS: &[IconField] = &[
        IconField::Name,
        IconField::FileExtensions,
        IconField::FileNames,
    ];

    fn tokens(text: &str) -> Result<Vec<Token>, ExtractError> {
        Tokenizer::new(text, FILE_FIELDS).collect()
    }

    #[test]
    fn test_name_and_list() {
        let toks = tokens("{ name: 'rust', fileExtensions: ['rs', 'ron'] },").unwrap();

        assert_eq!(
            toks,
            vec![
                Token::Field(IconField::Name),
                Token::Str("rust".to_string()),
                Token::Field(IconField::FileExtensions),
                Token::List(vec!["rs".to_string(), "ron".to_string()]),
            ]
        );
    }

    #[test]
    fn test_unrecognised_fields_are_skipped() {
        let toks = tokens("{ name: 'x', light: true, folderNames: ['y'] }").unwrap();
        assert_eq!(
            toks,
            vec![Token::Field(IconField::Name), Token::Str("x".to_string())]
        );
    }

    #[test]
    fn test_bool_literal() {
        let toks = tokens("fileNames: true }").unwrap();
        assert_eq!(toks[1], Token::Bool(true));
    }

    #[test]
    fn test_invalid_literal_stops_iteration() {
        let mut tokenizer = Tokenizer::new("fileNames: someVariable, { name: 'a' }", FILE_FIELDS);

        assert_eq!(
            tokenizer.next().unwrap().unwrap(),
            Token::Field(IconField::FileNames)
        );
        match tokenizer.next().unwrap() {
            Err(ExtractError::InvalidLiteral { literal, .. }) => {
                assert_eq!(literal, "someVariable,")
            }
            other => panic!("expected invalid literal, got {:?}", other),
        }
        assert!(tokenizer.next().is_none());
    }

    #[test]
    fn test_quote_inside_list_does_not_close_it() {
        let toks = tokens("fileNames: ['a]b', 'c']").unwrap();
        assert_eq!(
            toks[1],
            Token::List(vec!["a]b".to_string(), "c".to_string()])
        );
    }

    #[test]
    fn test_nested_list_rejected() {
        let err = tokens("fileNames: [['a']]").unwrap_err();
        assert!(matches!(err, ExtractError::MalformedList { .. }));
    }

    #[test]
    fn test_unterminated_values() {
        assert!(matches!(
            tokens("{ name: 'open").unwrap_err(),
            ExtractError::UnterminatedString { .. }
        ));
        assert!(matches!(
            tokens("fileNames: ['a'").unwrap_err(),
            ExtractError::UnterminatedList { .. }
        ));
        assert!(matches!(
            tokens("fileNames: ").unwrap_err(),
            ExtractError::MissingValue { .. }
        ));
    }

    #[test]
    fn test_non_ascii_text_is_skipped() {
        let toks = tokens("é { name: 'ü' }").unwrap();
        assert_eq!(toks[1], Token::Str("ü".to_string()));
    }
}
