//! Positional argument validation
//!
//! Callers send an untyped JSON array; each operation declares a
//! [`Signature`] and only ever sees arguments that already match it.

use std::fmt;

use serde::Serialize;
use serde::ser::{SerializeStruct, Serializer};
use serde_json::Value;

use crate::{Error, Result};

/// JSON type name of a value, for error messages
#[must_use]
pub fn value_type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

/// Type name every parameter is declared with
pub const TEXT_TYPE: &str = "string";

/// A named positional parameter
///
/// Every operation argument is non-empty text.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Param {
    /// Parameter name
    pub name: &'static str,
}

impl Param {
    /// A text parameter
    #[must_use]
    pub const fn text(name: &'static str) -> Self {
        Self { name }
    }
}

impl Serialize for Param {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        let mut state = serializer.serialize_struct("Param", 2)?;
        state.serialize_field("name", self.name)?;
        state.serialize_field("type", TEXT_TYPE)?;
        state.end()
    }
}

/// Operation name plus its ordered parameter list
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Signature {
    /// Operation name
    pub name: &'static str,
    /// Ordered parameters
    pub params: &'static [Param],
}

impl fmt::Display for Signature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}(", self.name)?;
        for (i, param) in self.params.iter().enumerate() {
            if i > 0 {
                f.write_str(", ")?;
            }
            write!(f, "{}: {TEXT_TYPE}", param.name)?;
        }
        f.write_str(")")
    }
}

impl Signature {
    /// Check `args` against the declared parameters
    ///
    /// Extra trailing arguments are accepted and ignored.
    pub fn validate<'a>(&self, args: &'a [Value]) -> Result<Args<'a>> {
        if args.len() < self.params.len() {
            let expected = self.params[args.len()..]
                .iter()
                .map(|p| p.name)
                .collect::<Vec<_>>()
                .join(" or ");
            return Err(Error::MissingArgument {
                operation: self.name.to_string(),
                expected,
                signature: self.to_string(),
            });
        }

        for (param, value) in self.params.iter().zip(args) {
            match value.as_str() {
                Some(text) if text.is_empty() => {
                    return Err(Error::EmptyArgument {
                        param: param.name.to_string(),
                        signature: self.to_string(),
                    });
                }
                Some(_) => {}
                None => {
                    return Err(Error::WrongArgumentType {
                        param: param.name.to_string(),
                        expected: TEXT_TYPE.to_string(),
                        actual: value_type_name(value).to_string(),
                        signature: self.to_string(),
                    });
                }
            }
        }

        Ok(Args {
            values: &args[..self.params.len()],
        })
    }
}

/// Arguments that passed [`Signature::validate`]
#[derive(Debug, Clone, Copy)]
pub struct Args<'a> {
    values: &'a [Value],
}

impl<'a> Args<'a> {
    /// Number of declared arguments
    #[must_use]
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Whether the operation takes no arguments
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Raw argument at `index`
    #[must_use]
    pub fn get(&self, index: usize) -> Option<&'a Value> {
        self.values.get(index)
    }

    /// Text argument at `index`
    ///
    /// Validation guarantees declared string parameters are strings; anything
    /// else reads as empty.
    #[must_use]
    pub fn text(&self, index: usize) -> &'a str {
        self.get(index).and_then(Value::as_str).unwrap_or_default()
    }
}
