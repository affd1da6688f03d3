//! XML property list reader.
//!
//! Builds a [`PlistValue`] tree from one XML plist document using
//! `quick_xml`'s event reader. Only the element set powermetrics emits is
//! understood. Anything after the closing `</plist>` is ignored.

use crate::utils::error::DecodeError;
use chrono::{DateTime, Utc};
use quick_xml::events::Event;
use quick_xml::Reader;
use std::collections::BTreeMap;

/// Keyed plist dictionary; a repeated key keeps its last value
pub type Dictionary = BTreeMap<String, PlistValue>;

/// One node of a decoded plist document
#[derive(Debug, Clone, PartialEq)]
pub enum PlistValue {
    Boolean(bool),
    Integer(i64),
    Real(f64),
    String(String),
    Date(DateTime<Utc>),
    /// Base64 payload of a `<data>` element, left undecoded
    Data(String),
    Array(Vec<PlistValue>),
    Dictionary(Dictionary),
}

impl PlistValue {
    /// Element name, used in type mismatch messages
    pub fn type_name(&self) -> &'static str {
        match self {
            Self::Boolean(_) => "boolean",
            Self::Integer(_) => "integer",
            Self::Real(_) => "real",
            Self::String(_) => "string",
            Self::Date(_) => "date",
            Self::Data(_) => "data",
            Self::Array(_) => "array",
            Self::Dictionary(_) => "dict",
        }
    }

    pub fn as_dictionary(&self) -> Option<&Dictionary> {
        match self {
            Self::Dictionary(dict) => Some(dict),
            _ => None,
        }
    }
}

/// Parse one plist document
///
/// **Public** - entry point used by the document decoder
///
/// # Errors
/// * `DecodeError::Xml` - XML syntax error
/// * `DecodeError::MissingRoot` - no `<plist>` element
/// * `DecodeError::Truncated` - input ended inside an element
/// * `DecodeError::InvalidLeaf` - a scalar could not be parsed
pub fn parse_document(bytes: &[u8]) -> Result<PlistValue, DecodeError> {
    let mut reader = PlistReader::new(bytes);

    // Prologue: skip text until the root element
    loop {
        match reader.next_token()? {
            Token::Open(name) if name == "plist" => break,
            Token::Empty(name) if name == "plist" => return Err(DecodeError::EmptyDocument),
            Token::Open(name) | Token::Empty(name) => {
                return Err(DecodeError::UnexpectedElement {
                    expected: "<plist>",
                    found: name,
                })
            }
            Token::Close(_) | Token::Eof => return Err(DecodeError::MissingRoot),
            Token::Text(_) => continue,
        }
    }

    let value = match reader.next_structural()? {
        Token::Open(name) => reader.parse_element(&name)?,
        Token::Empty(name) => parse_empty(&name)?,
        Token::Close(_) => return Err(DecodeError::EmptyDocument),
        Token::Text(text) => return Err(DecodeError::UnexpectedText(text)),
        Token::Eof => return Err(DecodeError::Truncated("plist".to_string())),
    };

    match reader.next_structural()? {
        Token::Close(name) if name == "plist" => Ok(value),
        Token::Eof => Err(DecodeError::Truncated("plist".to_string())),
        Token::Text(text) => Err(DecodeError::UnexpectedText(text)),
        Token::Open(name) | Token::Empty(name) | Token::Close(name) => {
            Err(DecodeError::UnexpectedElement {
                expected: "</plist>",
                found: name,
            })
        }
    }
}

/// Structural events we care about, with owned names
#[derive(Debug)]
enum Token {
    Open(String),
    Empty(String),
    Close(String),
    Text(String),
    Eof,
}

struct PlistReader<'a> {
    reader: Reader<&'a [u8]>,
    buf: Vec<u8>,
}

impl<'a> PlistReader<'a> {
    fn new(bytes: &'a [u8]) -> Self {
        let mut reader = Reader::from_reader(bytes);
        reader.trim_text(false);
        Self {
            reader,
            buf: Vec::new(),
        }
    }

    fn next_token(&mut self) -> Result<Token, DecodeError> {
        loop {
            self.buf.clear();
            let token = match self.reader.read_event_into(&mut self.buf)? {
                Event::Start(e) => Token::Open(element_name(e.name().as_ref())?),
                Event::Empty(e) => Token::Empty(element_name(e.name().as_ref())?),
                Event::End(e) => Token::Close(element_name(e.name().as_ref())?),
                Event::Text(e) => Token::Text(e.unescape()?.into_owned()),
                Event::CData(e) => Token::Text(String::from_utf8(e.into_inner().into_owned())?),
                Event::Eof => Token::Eof,
                // Declaration, doctype, comments, processing instructions
                _ => continue,
            };
            return Ok(token);
        }
    }

    /// Next token, skipping whitespace between elements
    fn next_structural(&mut self) -> Result<Token, DecodeError> {
        loop {
            match self.next_token()? {
                Token::Text(text) if text.trim().is_empty() => continue,
                token => return Ok(token),
            }
        }
    }

    /// Parse the element whose start tag was just read
    fn parse_element(&mut self, name: &str) -> Result<PlistValue, DecodeError> {
        match name {
            "dict" => self.parse_dict(),
            "array" => self.parse_array(),
            "string" => Ok(PlistValue::String(self.read_text(name)?)),
            "data" => Ok(PlistValue::Data(self.read_text(name)?)),
            "integer" => parse_integer(&self.read_text(name)?),
            "real" => parse_real(&self.read_text(name)?),
            "date" => parse_date(&self.read_text(name)?),
            "true" | "false" => {
                self.read_text(name)?;
                Ok(PlistValue::Boolean(name == "true"))
            }
            other => Err(DecodeError::UnexpectedElement {
                expected: "a plist value",
                found: other.to_string(),
            }),
        }
    }

    fn parse_dict(&mut self) -> Result<PlistValue, DecodeError> {
        let mut dict = Dictionary::new();

        loop {
            let key = match self.next_structural()? {
                Token::Close(name) if name == "dict" => return Ok(PlistValue::Dictionary(dict)),
                Token::Open(name) if name == "key" => self.read_text("key")?,
                Token::Empty(name) if name == "key" => String::new(),
                Token::Open(name) | Token::Empty(name) | Token::Close(name) => {
                    return Err(DecodeError::UnexpectedElement {
                        expected: "<key>",
                        found: name,
                    })
                }
                Token::Text(text) => return Err(DecodeError::UnexpectedText(text)),
                Token::Eof => return Err(DecodeError::Truncated("dict".to_string())),
            };

            let value = match self.next_structural()? {
                Token::Open(name) => self.parse_element(&name)?,
                Token::Empty(name) => parse_empty(&name)?,
                Token::Close(_) => return Err(DecodeError::MissingValue(key)),
                Token::Text(text) => return Err(DecodeError::UnexpectedText(text)),
                Token::Eof => return Err(DecodeError::Truncated("dict".to_string())),
            };

            dict.insert(key, value);
        }
    }

    fn parse_array(&mut self) -> Result<PlistValue, DecodeError> {
        let mut items = Vec::new();

        loop {
            match self.next_structural()? {
                Token::Close(name) if name == "array" => return Ok(PlistValue::Array(items)),
                Token::Open(name) => items.push(self.parse_element(&name)?),
                Token::Empty(name) => items.push(parse_empty(&name)?),
                Token::Close(name) => {
                    return Err(DecodeError::UnexpectedElement {
                        expected: "</array>",
                        found: name,
                    })
                }
                Token::Text(text) => return Err(DecodeError::UnexpectedText(text)),
                Token::Eof => return Err(DecodeError::Truncated("array".to_string())),
            }
        }
    }

    /// Collect character data up to the matching end tag, whitespace included
    fn read_text(&mut self, name: &str) -> Result<String, DecodeError> {
        let mut text = String::new();

        loop {
            match self.next_token()? {
                Token::Text(chunk) => text.push_str(&chunk),
                Token::Close(closing) if closing == name => return Ok(text),
                Token::Open(found) | Token::Empty(found) | Token::Close(found) => {
                    return Err(DecodeError::UnexpectedElement {
                        expected: "character data",
                        found,
                    })
                }
                Token::Eof => return Err(DecodeError::Truncated(name.to_string())),
            }
        }
    }
}

fn element_name(raw: &[u8]) -> Result<String, DecodeError> {
    Ok(String::from_utf8(raw.to_vec())?)
}

/// Value of a self-closing element such as `<true/>` or `<string/>`
fn parse_empty(name: &str) -> Result<PlistValue, DecodeError> {
    match name {
        "true" => Ok(PlistValue::Boolean(true)),
        "false" => Ok(PlistValue::Boolean(false)),
        "string" => Ok(PlistValue::String(String::new())),
        "data" => Ok(PlistValue::Data(String::new())),
        "dict" => Ok(PlistValue::Dictionary(Dictionary::new())),
        "array" => Ok(PlistValue::Array(Vec::new())),
        "integer" | "real" | "date" => Err(DecodeError::InvalidLeaf {
            element: leaf_name(name),
            value: String::new(),
        }),
        other => Err(DecodeError::UnexpectedElement {
            expected: "a plist value",
            found: other.to_string(),
        }),
    }
}

fn leaf_name(name: &str) -> &'static str {
    match name {
        "integer" => "integer",
        "real" => "real",
        _ => "date",
    }
}

fn parse_integer(text: &str) -> Result<PlistValue, DecodeError> {
    text.trim()
        .parse::<i64>()
        .map(PlistValue::Integer)
        .map_err(|_| DecodeError::InvalidLeaf {
            element: "integer",
            value: text.to_string(),
        })
}

fn parse_real(text: &str) -> Result<PlistValue, DecodeError> {
    text.trim()
        .parse::<f64>()
        .map(PlistValue::Real)
        .map_err(|_| DecodeError::InvalidLeaf {
            element: "real",
            value: text.to_string(),
        })
}

fn parse_date(text: &str) -> Result<PlistValue, DecodeError> {
    DateTime::parse_from_rfc3339(text.trim())
        .map(|date| PlistValue::Date(date.with_timezone(&Utc)))
        .map_err(|_| DecodeError::InvalidLeaf {
            element: "date",
            value: text.to_string(),
        })
}
