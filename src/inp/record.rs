//! Records and their fields
//!
//! A [`Record`] is one typed object of an object section: a junction, a curve,
//! a control rule. Records expose their fields by name through [`Record::get`]
//! and [`Record::set`], and are identified inside their section by a [`Key`]
//! built from their identifier fields.
//!
//! Concrete record structs hold plain Rust fields. The [`Field`] trait converts
//! those fields from tokens and to and from [`Value`]s, and the
//! [`impl_record!`](crate::impl_record) macro wires the named accessors.

use crate::inp::coercion::{infer_checked, Value};
use crate::inp::error::{SchemaError, ValidationError};
use crate::inp::lexing::Tokens;
use chrono::{NaiveDate, NaiveTime};
use std::any::Any;
use std::fmt;

/// Identity of a record within its section. Usually one name; some sections
/// (tags) use a composite.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Key(Vec<String>);

impl Key {
    pub fn new<I, S>(parts: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Key(parts.into_iter().map(Into::into).collect())
    }

    pub fn parts(&self) -> &[String] {
        &self.0
    }
}

impl fmt::Display for Key {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0.join("/"))
    }
}

impl From<&str> for Key {
    fn from(name: &str) -> Self {
        Key(vec![name.to_string()])
    }
}

impl From<String> for Key {
    fn from(name: String) -> Self {
        Key(vec![name])
    }
}

impl From<&Key> for Key {
    fn from(key: &Key) -> Self {
        key.clone()
    }
}

impl<const N: usize> From<[&str; N]> for Key {
    fn from(parts: [&str; N]) -> Self {
        Key::new(parts)
    }
}

/// Conversion between a record field's Rust type, its source token, and [`Value`].
pub trait Field: Sized {
    /// Parse a single source token. `None` means the token is not a valid value.
    fn from_token(token: &str) -> Option<Self>;

    fn to_value(&self) -> Value;

    /// Accept a value assigned through [`Record::set`].
    fn from_value(value: Value) -> Option<Self>;
}

impl Field for String {
    fn from_token(token: &str) -> Option<Self> {
        Some(token.to_string())
    }

    fn to_value(&self) -> Value {
        Value::Text(self.clone())
    }

    fn from_value(value: Value) -> Option<Self> {
        match value {
            Value::Text(text) => Some(text),
            Value::List(_) | Value::Missing => None,
            other => Some(other.render()),
        }
    }
}

impl Field for f64 {
    fn from_token(token: &str) -> Option<Self> {
        infer_checked(token).0.as_f64()
    }

    fn to_value(&self) -> Value {
        Value::Float(*self)
    }

    fn from_value(value: Value) -> Option<Self> {
        value.as_f64()
    }
}

impl Field for i64 {
    fn from_token(token: &str) -> Option<Self> {
        infer_checked(token).0.as_i64()
    }

    fn to_value(&self) -> Value {
        Value::Int(*self)
    }

    fn from_value(value: Value) -> Option<Self> {
        value.as_i64()
    }
}

impl Field for bool {
    fn from_token(token: &str) -> Option<Self> {
        infer_checked(token).0.as_bool()
    }

    fn to_value(&self) -> Value {
        Value::Bool(*self)
    }

    fn from_value(value: Value) -> Option<Self> {
        value.as_bool()
    }
}

impl Field for NaiveDate {
    fn from_token(token: &str) -> Option<Self> {
        match infer_checked(token).0 {
            Value::Date(date) => Some(date),
            _ => None,
        }
    }

    fn to_value(&self) -> Value {
        Value::Date(*self)
    }

    fn from_value(value: Value) -> Option<Self> {
        match value {
            Value::Date(date) => Some(date),
            _ => None,
        }
    }
}

impl Field for NaiveTime {
    fn from_token(token: &str) -> Option<Self> {
        match infer_checked(token).0 {
            Value::Time(time) => Some(time),
            _ => None,
        }
    }

    fn to_value(&self) -> Value {
        Value::Time(*self)
    }

    fn from_value(value: Value) -> Option<Self> {
        match value {
            Value::Time(time) => Some(time),
            _ => None,
        }
    }
}

/// Loosely typed field: whatever [`infer`](crate::inp::coercion::infer) makes of the token.
impl Field for Value {
    fn from_token(token: &str) -> Option<Self> {
        Some(crate::inp::coercion::infer(token))
    }

    fn to_value(&self) -> Value {
        self.clone()
    }

    fn from_value(value: Value) -> Option<Self> {
        Some(value)
    }
}

impl<T: Field> Field for Option<T> {
    fn from_token(token: &str) -> Option<Self> {
        T::from_token(token).map(Some)
    }

    fn to_value(&self) -> Value {
        match self {
            Some(inner) => inner.to_value(),
            None => Value::Missing,
        }
    }

    fn from_value(value: Value) -> Option<Self> {
        match value {
            Value::Missing => Some(None),
            other => T::from_value(other).map(Some),
        }
    }
}

impl<T: Field> Field for Vec<T> {
    fn from_token(_token: &str) -> Option<Self> {
        None
    }

    fn to_value(&self) -> Value {
        Value::List(self.iter().map(Field::to_value).collect())
    }

    fn from_value(value: Value) -> Option<Self> {
        match value {
            Value::List(items) => items.into_iter().map(T::from_value).collect(),
            _ => None,
        }
    }
}

impl<A: Field, B: Field> Field for (A, B) {
    fn from_token(_token: &str) -> Option<Self> {
        None
    }

    fn to_value(&self) -> Value {
        Value::List(vec![self.0.to_value(), self.1.to_value()])
    }

    fn from_value(value: Value) -> Option<Self> {
        match value {
            Value::List(items) if items.len() == 2 => {
                let mut items = items.into_iter();
                let a = A::from_value(items.next()?)?;
                let b = B::from_value(items.next()?)?;
                Some((a, b))
            }
            _ => None,
        }
    }
}

/// Positional reader over the tokens of one line.
///
/// ```text
/// let mut cursor = Cursor::new(tokens);
/// let name: String = cursor.required("Name")?;
/// let depth: f64 = cursor.optional("MaxDepth", 0.0)?;
/// cursor.finish()?;
/// ```
#[derive(Debug, Clone)]
pub struct Cursor<'a> {
    tokens: &'a [String],
    position: usize,
}

impl<'a> Cursor<'a> {
    pub fn new(tokens: &'a [String]) -> Self {
        Cursor {
            tokens,
            position: 0,
        }
    }

    /// Cursor over the first line of a group, or over nothing.
    pub fn first_line(lines: &'a [Tokens]) -> Self {
        Cursor::new(lines.first().map(Vec::as_slice).unwrap_or(&[]))
    }

    pub fn peek(&self) -> Option<&'a str> {
        self.tokens.get(self.position).map(String::as_str)
    }

    pub fn next_token(&mut self) -> Option<&'a str> {
        let token = self.peek()?;
        self.position += 1;
        Some(token)
    }

    pub fn remaining(&self) -> usize {
        self.tokens.len() - self.position
    }

    pub fn required<T: Field>(&mut self, field: &str) -> Result<T, SchemaError> {
        let token = self
            .next_token()
            .ok_or_else(|| SchemaError::missing(field))?;
        T::from_token(token).ok_or_else(|| SchemaError::invalid(field, token))
    }

    /// Like [`Cursor::required`], falling back to `default` once the line runs out.
    pub fn optional<T: Field>(&mut self, field: &str, default: T) -> Result<T, SchemaError> {
        if self.remaining() == 0 {
            Ok(default)
        } else {
            self.required(field)
        }
    }

    /// All tokens not yet consumed.
    pub fn rest(&mut self) -> &'a [String] {
        let rest = &self.tokens[self.position..];
        self.position = self.tokens.len();
        rest
    }

    /// Fail if tokens are left over.
    pub fn finish(self) -> Result<(), SchemaError> {
        if self.position < self.tokens.len() {
            Err(SchemaError::TooManyTokens {
                expected: self.position,
                found: self.tokens.len(),
            })
        } else {
            Ok(())
        }
    }
}

/// Parse `x y` pairs from a flat token list.
pub fn parse_pairs<A: Field, B: Field>(
    tokens: &[String],
    first: &str,
    second: &str,
) -> Result<Vec<(A, B)>, SchemaError> {
    let mut cursor = Cursor::new(tokens);
    let mut pairs = Vec::with_capacity(tokens.len() / 2);
    while cursor.remaining() > 0 {
        let a = cursor.required(first)?;
        let b = cursor.required(second)?;
        pairs.push((a, b));
    }
    Ok(pairs)
}

/// Static shape of a record type, generated by [`impl_record!`](crate::impl_record).
pub trait FieldSet {
    const KIND: &'static str;
    const FIELDS: &'static [&'static str];
    const IDENTIFIER: &'static [&'static str];
}

/// One typed object of an object section.
pub trait Record: fmt::Debug + Send + Sync + 'static {
    /// Record type name, e.g. `Junction`.
    fn kind(&self) -> &'static str;

    /// Field names in positional order.
    fn field_names(&self) -> &'static [&'static str];

    /// Names of the fields that make up the key.
    fn identifier(&self) -> &'static [&'static str];

    fn get(&self, field: &str) -> Result<Value, ValidationError>;

    fn set(&mut self, field: &str, value: Value) -> Result<(), ValidationError>;

    /// Lines of rendered tokens this record writes to a section body.
    fn to_tokens(&self) -> Vec<Tokens>;

    fn clone_record(&self) -> Box<dyn Record>;

    fn as_any(&self) -> &dyn Any;

    fn as_any_mut(&mut self) -> &mut dyn Any;

    fn key(&self) -> Key {
        Key::new(self.identifier().iter().map(|field| {
            self.get(field)
                .map(|value| value.render())
                .unwrap_or_default()
        }))
    }

    /// Every field value in positional order.
    fn values(&self) -> Vec<Value> {
        self.field_names()
            .iter()
            .map(|field| self.get(field).unwrap_or(Value::Missing))
            .collect()
    }
}

impl<'a> dyn Record + 'a {
    pub fn downcast_ref<T: Record>(&self) -> Option<&T> {
        self.as_any().downcast_ref::<T>()
    }

    pub fn downcast_mut<T: Record>(&mut self) -> Option<&mut T> {
        self.as_any_mut().downcast_mut::<T>()
    }
}

impl Clone for Box<dyn Record> {
    fn clone(&self) -> Self {
        self.clone_record()
    }
}

impl<'a> PartialEq for dyn Record + 'a {
    fn eq(&self, other: &Self) -> bool {
        self.kind() == other.kind() && self.values() == other.values()
    }
}

/// The default single-line layout: every field rendered in order, trailing
/// empty fields dropped.
pub fn flat_line<R: Record + ?Sized>(record: &R) -> Tokens {
    let mut line: Tokens = record
        .values()
        .iter()
        .map(Value::render)
        .collect();
    while line.last().is_some_and(|token| token.is_empty()) {
        line.pop();
    }
    line
}

/// Implement [`Record`] and [`FieldSet`] for a struct that already implements
/// [`RecordType`](crate::inp::schema::RecordType) and `Clone`.
///
/// ```text
/// impl_record! {
///     Junction {
///         kind: "Junction",
///         identifier: ["Name"],
///         fields: { "Name" => name, "Elevation" => elevation },
///     }
/// }
/// ```
#[macro_export]
macro_rules! impl_record {
    (
        $ty:ty {
            kind: $kind:literal,
            identifier: [$($id:literal),+ $(,)?],
            fields: { $($label:literal => $field:ident),+ $(,)? } $(,)?
        }
    ) => {
        impl $crate::inp::record::FieldSet for $ty {
            const KIND: &'static str = $kind;
            const FIELDS: &'static [&'static str] = &[$($label),+];
            const IDENTIFIER: &'static [&'static str] = &[$($id),+];
        }

        impl $crate::inp::record::Record for $ty {
            fn kind(&self) -> &'static str {
                $kind
            }

            fn field_names(&self) -> &'static [&'static str] {
                <Self as $crate::inp::record::FieldSet>::FIELDS
            }

            fn identifier(&self) -> &'static [&'static str] {
                <Self as $crate::inp::record::FieldSet>::IDENTIFIER
            }

            fn get(
                &self,
                field: &str,
            ) -> ::std::result::Result<$crate::inp::coercion::Value, $crate::inp::error::ValidationError> {
                match field {
                    $($label => Ok($crate::inp::record::Field::to_value(&self.$field)),)+
                    _ => Err($crate::inp::error::ValidationError::UnknownField {
                        record: $kind,
                        field: field.to_string(),
                    }),
                }
            }

            fn set(
                &mut self,
                field: &str,
                value: $crate::inp::coercion::Value,
            ) -> ::std::result::Result<(), $crate::inp::error::ValidationError> {
                match field {
                    $($label => {
                        self.$field = $crate::inp::record::Field::from_value(value.clone()).ok_or_else(|| {
                            $crate::inp::error::ValidationError::TypeMismatch {
                                record: $kind,
                                field: field.to_string(),
                                value,
                            }
                        })?;
                        Ok(())
                    })+
                    _ => Err($crate::inp::error::ValidationError::UnknownField {
                        record: $kind,
                        field: field.to_string(),
                    }),
                }
            }

            fn to_tokens(&self) -> ::std::vec::Vec<$crate::inp::lexing::Tokens> {
                $crate::inp::schema::RecordType::lines(self)
            }

            fn clone_record(&self) -> ::std::boxed::Box<dyn $crate::inp::record::Record> {
                ::std::boxed::Box::new(::std::clone::Clone::clone(self))
            }

            fn as_any(&self) -> &dyn ::std::any::Any {
                self
            }

            fn as_any_mut(&mut self) -> &mut dyn ::std::any::Any {
                self
            }
        }
    };
}

/// Declare a closed keyword enum that parses case-insensitively and renders in
/// its canonical spelling.
#[macro_export]
macro_rules! keyword_enum {
    (
        $(#[$meta:meta])*
        $vis:vis enum $name:ident {
            $($(#[$vmeta:meta])* $variant:ident => $text:literal),+ $(,)?
        }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
        $vis enum $name {
            $($(#[$vmeta])* $variant),+
        }

        impl $name {
            pub const ALL: &'static [$name] = &[$($name::$variant),+];

            pub fn as_str(&self) -> &'static str {
                match self {
                    $($name::$variant => $text),+
                }
            }

            pub fn parse(token: &str) -> ::std::option::Option<Self> {
                $(if token.eq_ignore_ascii_case($text) {
                    return ::std::option::Option::Some($name::$variant);
                })+
                ::std::option::Option::None
            }
        }

        impl ::std::fmt::Display for $name {
            fn fmt(&self, f: &mut ::std::fmt::Formatter<'_>) -> ::std::fmt::Result {
                f.write_str(self.as_str())
            }
        }

        impl $crate::inp::record::Field for $name {
            fn from_token(token: &str) -> ::std::option::Option<Self> {
                Self::parse(token)
            }

            fn to_value(&self) -> $crate::inp::coercion::Value {
                $crate::inp::coercion::Value::Text(self.as_str().to_string())
            }

            fn from_value(value: $crate::inp::coercion::Value) -> ::std::option::Option<Self> {
                match value {
                    $crate::inp::coercion::Value::Text(text) => Self::parse(&text),
                    _ => ::std::option::Option::None,
                }
            }
        }
    };
}
