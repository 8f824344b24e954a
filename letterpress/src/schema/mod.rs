//! Variable schemas
//!
//! A [`Schema`] describes the shape of one template variable (or of a
//! template's constructor arguments) and converts loosely-typed JSON input
//! into the value the template will see, so validation and normalization
//! happen in one pass.
//!
//! # Examples
//!
//! ```rust
//! use letterpress::schema::{Key, Schema};
//! use serde_json::json;
//!
//! let schema = Schema::dict([
//!     Key::new("name", Schema::string()),
//!     Key::new("age", Schema::int_range(Some(0), Some(150))),
//! ]);
//!
//! let value = schema.validate(&json!({"name": "Ada", "age": "36"})).unwrap();
//! assert_eq!(value, json!({"name": "Ada", "age": 36}));
//! assert_eq!(schema.to_string(), "<Dict(name=<String>, age=<Int(gte=0, lte=150)>)>");
//! ```

mod error;

use std::fmt;
use std::sync::LazyLock;

use regex::Regex;
use serde_json::{Map, Number, Value};

pub use error::SchemaError;

static EMAIL_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)^[a-z0-9.!#$%&'*+/=?^_`{|}~-]+@[a-z0-9](?:[a-z0-9-]{0,61}[a-z0-9])?(?:\.[a-z0-9](?:[a-z0-9-]{0,61}[a-z0-9])?)+$")
        .expect("email pattern is valid")
});

static URL_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)^https?://[a-z0-9.-]+(?::\d{1,5})?(?:[/?#]\S*)?$").expect("url pattern is valid")
});

/// Type and constraints of a single value
#[derive(Debug, Clone, PartialEq)]
pub enum Schema {
    /// Accepts any JSON value unchanged
    Any,

    /// A string, optionally bounded in length (counted in characters)
    String {
        /// Whether an empty or whitespace-only string is accepted
        allow_blank: bool,
        /// Minimum length
        min_length: usize,
        /// Maximum length
        max_length: Option<usize>,
    },

    /// An email address
    Email,

    /// An absolute http(s) URL
    Url,

    /// An integer within optional inclusive bounds
    Int {
        /// Lower bound
        gte: Option<i64>,
        /// Upper bound
        lte: Option<i64>,
    },

    /// A float within optional inclusive bounds
    Float {
        /// Lower bound
        gte: Option<f64>,
        /// Upper bound
        lte: Option<f64>,
    },

    /// A boolean
    Bool,

    /// One of a fixed set of strings
    Enum(Vec<String>),

    /// A homogeneous list
    List {
        /// Schema every item must satisfy
        item: Box<Schema>,
        /// Minimum number of items
        min_length: usize,
        /// Maximum number of items
        max_length: Option<usize>,
    },

    /// An object with declared keys; undeclared keys are rejected
    Dict(Vec<Key>),

    /// `null` or the inner schema
    Nullable(Box<Schema>),
}

/// A declared key of a [`Schema::Dict`]
#[derive(Debug, Clone, PartialEq)]
pub struct Key {
    /// Key name
    pub name: String,
    /// Schema of the value under this key
    pub schema: Schema,
    /// Whether the key may be absent
    pub optional: bool,
    /// Value used when the key is absent
    pub default: Option<Value>,
}

impl Key {
    /// Declare a required key
    #[must_use]
    pub fn new(name: impl Into<String>, schema: Schema) -> Self {
        Self {
            name: name.into(),
            schema,
            optional: false,
            default: None,
        }
    }

    /// Allow the key to be absent
    #[must_use]
    pub const fn optional(mut self) -> Self {
        self.optional = true;
        self
    }

    /// Use `value` when the key is absent
    #[must_use]
    pub fn default(mut self, value: Value) -> Self {
        self.default = Some(value);
        self
    }
}

impl Schema {
    /// Non-blank string of any length
    #[must_use]
    pub const fn string() -> Self {
        Self::String {
            allow_blank: false,
            min_length: 0,
            max_length: None,
        }
    }

    /// String that may be blank
    #[must_use]
    pub const fn blank_string() -> Self {
        Self::String {
            allow_blank: true,
            min_length: 0,
            max_length: None,
        }
    }

    /// Non-blank string bounded in length
    #[must_use]
    pub const fn string_len(min_length: usize, max_length: Option<usize>) -> Self {
        Self::String {
            allow_blank: false,
            min_length,
            max_length,
        }
    }

    /// Unbounded integer
    #[must_use]
    pub const fn int() -> Self {
        Self::Int {
            gte: None,
            lte: None,
        }
    }

    /// Integer within inclusive bounds
    #[must_use]
    pub const fn int_range(gte: Option<i64>, lte: Option<i64>) -> Self {
        Self::Int { gte, lte }
    }

    /// Unbounded float
    #[must_use]
    pub const fn float() -> Self {
        Self::Float {
            gte: None,
            lte: None,
        }
    }

    /// One of `choices`
    #[must_use]
    pub fn one_of<I, S>(choices: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::Enum(choices.into_iter().map(Into::into).collect())
    }

    /// List of `item` with no length bounds
    #[must_use]
    pub fn list(item: Self) -> Self {
        Self::List {
            item: Box::new(item),
            min_length: 0,
            max_length: None,
        }
    }

    /// List of `item` with length bounds
    #[must_use]
    pub fn list_len(item: Self, min_length: usize, max_length: Option<usize>) -> Self {
        Self::List {
            item: Box::new(item),
            min_length,
            max_length,
        }
    }

    /// Object with the given keys
    #[must_use]
    pub fn dict(keys: impl IntoIterator<Item = Key>) -> Self {
        Self::Dict(keys.into_iter().collect())
    }

    /// Empty object
    #[must_use]
    pub const fn empty_dict() -> Self {
        Self::Dict(Vec::new())
    }

    /// `null` or `self`
    #[must_use]
    pub fn nullable(self) -> Self {
        Self::Nullable(Box::new(self))
    }

    /// Check `value` and return its normalized form
    ///
    /// # Errors
    ///
    /// Returns [`SchemaError`] describing the first offending location.
    pub fn validate(&self, value: &Value) -> Result<Value, SchemaError> {
        match self {
            Self::Any => Ok(value.clone()),
            Self::String {
                allow_blank,
                min_length,
                max_length,
            } => validate_string(value, *allow_blank, *min_length, *max_length),
            Self::Email => {
                let text = expect_str(value)?;
                if EMAIL_RE.is_match(text) {
                    Ok(Value::String(text.to_string()))
                } else {
                    Err(SchemaError::new("value is not a valid email address"))
                }
            }
            Self::Url => {
                let text = expect_str(value)?;
                if URL_RE.is_match(text) {
                    Ok(Value::String(text.to_string()))
                } else {
                    Err(SchemaError::new("value is not a valid URL"))
                }
            }
            Self::Int { gte, lte } => validate_int(value, *gte, *lte),
            Self::Float { gte, lte } => validate_float(value, *gte, *lte),
            Self::Bool => validate_bool(value),
            Self::Enum(choices) => {
                let text = expect_str(value)?;
                if choices.iter().any(|choice| choice == text) {
                    Ok(Value::String(text.to_string()))
                } else {
                    Err(SchemaError::new(format!(
                        "value doesn't match any variant of {}",
                        choices.join(", ")
                    )))
                }
            }
            Self::List {
                item,
                min_length,
                max_length,
            } => validate_list(value, item, *min_length, *max_length),
            Self::Dict(keys) => validate_dict(value, keys),
            Self::Nullable(inner) => {
                if value.is_null() {
                    Ok(Value::Null)
                } else {
                    inner.validate(value)
                }
            }
        }
    }
}

fn expect_str(value: &Value) -> Result<&str, SchemaError> {
    value
        .as_str()
        .ok_or_else(|| SchemaError::new(format!("value is not a string, got {}", kind_of(value))))
}

const fn kind_of(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "list",
        Value::Object(_) => "dict",
    }
}

fn validate_string(
    value: &Value,
    allow_blank: bool,
    min_length: usize,
    max_length: Option<usize>,
) -> Result<Value, SchemaError> {
    let text = expect_str(value)?;
    if !allow_blank && text.trim().is_empty() {
        return Err(SchemaError::new("blank value is not allowed"));
    }
    let length = text.chars().count();
    if length < min_length {
        return Err(SchemaError::new(format!(
            "string is shorter than {min_length} characters"
        )));
    }
    if let Some(max_length) = max_length {
        if length > max_length {
            return Err(SchemaError::new(format!(
                "string is longer than {max_length} characters"
            )));
        }
    }
    Ok(Value::String(text.to_string()))
}

fn validate_int(value: &Value, gte: Option<i64>, lte: Option<i64>) -> Result<Value, SchemaError> {
    let number = match value {
        Value::Number(n) => n.as_i64().or_else(|| n.as_f64().and_then(whole_f64_to_i64)),
        Value::String(s) => s.trim().parse::<i64>().ok(),
        _ => None,
    }
    .ok_or_else(|| SchemaError::new("value is not int"))?;

    if let Some(gte) = gte {
        if number < gte {
            return Err(SchemaError::new(format!("value is less than {gte}")));
        }
    }
    if let Some(lte) = lte {
        if number > lte {
            return Err(SchemaError::new(format!("value is greater than {lte}")));
        }
    }
    Ok(Value::Number(number.into()))
}

// `i64::MAX as f64` rounds up to 2^63, so the upper bound is exclusive.
#[allow(clippy::cast_possible_truncation, clippy::cast_precision_loss)]
fn whole_f64_to_i64(f: f64) -> Option<i64> {
    let in_range = (i64::MIN as f64..i64::MAX as f64).contains(&f);
    (in_range && f.fract() == 0.0).then_some(f as i64)
}

fn validate_float(value: &Value, gte: Option<f64>, lte: Option<f64>) -> Result<Value, SchemaError> {
    let number = match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok(),
        _ => None,
    }
    .filter(|f| f.is_finite())
    .ok_or_else(|| SchemaError::new("value is not float"))?;

    if let Some(gte) = gte {
        if number < gte {
            return Err(SchemaError::new(format!("value is less than {gte}")));
        }
    }
    if let Some(lte) = lte {
        if number > lte {
            return Err(SchemaError::new(format!("value is greater than {lte}")));
        }
    }
    Number::from_f64(number)
        .map(Value::Number)
        .ok_or_else(|| SchemaError::new("value is not float"))
}

fn validate_bool(value: &Value) -> Result<Value, SchemaError> {
    match value {
        Value::Bool(b) => Ok(Value::Bool(*b)),
        Value::String(s) => match s.trim().to_ascii_lowercase().as_str() {
            "true" | "1" | "yes" | "on" => Ok(Value::Bool(true)),
            "false" | "0" | "no" | "off" => Ok(Value::Bool(false)),
            _ => Err(SchemaError::new("value should be True or False")),
        },
        _ => Err(SchemaError::new("value should be True or False")),
    }
}

fn validate_list(
    value: &Value,
    item: &Schema,
    min_length: usize,
    max_length: Option<usize>,
) -> Result<Value, SchemaError> {
    let items = value
        .as_array()
        .ok_or_else(|| SchemaError::new(format!("value is not a list, got {}", kind_of(value))))?;

    if items.len() < min_length {
        return Err(SchemaError::new(format!(
            "list length is less than {min_length}"
        )));
    }
    if let Some(max_length) = max_length {
        if items.len() > max_length {
            return Err(SchemaError::new(format!(
                "list length is greater than {max_length}"
            )));
        }
    }

    items
        .iter()
        .enumerate()
        .map(|(index, value)| item.validate(value).map_err(|e| e.at_index(index)))
        .collect::<Result<Vec<_>, _>>()
        .map(Value::Array)
}

fn validate_dict(value: &Value, keys: &[Key]) -> Result<Value, SchemaError> {
    let object = value
        .as_object()
        .ok_or_else(|| SchemaError::new(format!("value is not a dict, got {}", kind_of(value))))?;

    if let Some(extra) = object
        .keys()
        .find(|name| !keys.iter().any(|key| &key.name == *name))
    {
        return Err(SchemaError::new("is not allowed key").at_key(extra));
    }

    let mut result = Map::with_capacity(keys.len());
    for key in keys {
        match object.get(&key.name) {
            Some(value) => {
                let value = key.schema.validate(value).map_err(|e| e.at_key(&key.name))?;
                result.insert(key.name.clone(), value);
            }
            None => {
                if let Some(default) = &key.default {
                    result.insert(key.name.clone(), default.clone());
                } else if !key.optional {
                    return Err(SchemaError::new("is required").at_key(&key.name));
                }
            }
        }
    }
    Ok(Value::Object(result))
}

impl fmt::Display for Schema {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Any => f.write_str("<Any>"),
            Self::String {
                allow_blank,
                min_length,
                max_length,
            } => {
                let mut args = Vec::new();
                if *allow_blank {
                    args.push("blank".to_string());
                }
                if *min_length > 0 {
                    args.push(format!("min_length={min_length}"));
                }
                if let Some(max_length) = max_length {
                    args.push(format!("max_length={max_length}"));
                }
                write_with_args(f, "String", &args)
            }
            Self::Email => f.write_str("<Email>"),
            Self::Url => f.write_str("<URL>"),
            Self::Int { gte, lte } => write_with_args(f, "Int", &bounds(gte.as_ref(), lte.as_ref())),
            Self::Float { gte, lte } => {
                write_with_args(f, "Float", &bounds(gte.as_ref(), lte.as_ref()))
            }
            Self::Bool => f.write_str("<Bool>"),
            Self::Enum(choices) => {
                let quoted: Vec<String> = choices.iter().map(|c| format!("{c:?}")).collect();
                write!(f, "<Enum({})>", quoted.join(", "))
            }
            Self::List {
                item,
                min_length,
                max_length,
            } => {
                let mut args = Vec::new();
                if *min_length > 0 {
                    args.push(format!("min_length={min_length}"));
                }
                if let Some(max_length) = max_length {
                    args.push(format!("max_length={max_length}"));
                }
                if args.is_empty() {
                    write!(f, "<List({item})>")
                } else {
                    write!(f, "<List({} | {item})>", args.join(", "))
                }
            }
            Self::Dict(keys) => {
                let rendered: Vec<String> = keys
                    .iter()
                    .map(|key| {
                        let marker = if key.optional || key.default.is_some() {
                            "?"
                        } else {
                            ""
                        };
                        format!("{}{marker}={}", key.name, key.schema)
                    })
                    .collect();
                write!(f, "<Dict({})>", rendered.join(", "))
            }
            Self::Nullable(inner) => write!(f, "<Or(<Null>, {inner})>"),
        }
    }
}

fn bounds<T: fmt::Display>(gte: Option<&T>, lte: Option<&T>) -> Vec<String> {
    let mut args = Vec::new();
    if let Some(gte) = gte {
        args.push(format!("gte={gte}"));
    }
    if let Some(lte) = lte {
        args.push(format!("lte={lte}"));
    }
    args
}

fn write_with_args(f: &mut fmt::Formatter<'_>, name: &str, args: &[String]) -> fmt::Result {
    if args.is_empty() {
        write!(f, "<{name}>")
    } else {
        write!(f, "<{name}({})>", args.join(", "))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_string_rejects_blank() {
        let err = Schema::string().validate(&json!("   ")).unwrap_err();
        assert_eq!(err.to_string(), "blank value is not allowed");

        assert_eq!(
            Schema::blank_string().validate(&json!("")).unwrap(),
            json!("")
        );
    }

    #[test]
    fn test_string_length_bounds() {
        let schema = Schema::string_len(2, Some(4));
        assert!(schema.validate(&json!("a")).is_err());
        assert!(schema.validate(&json!("abcde")).is_err());
        assert_eq!(schema.validate(&json!("abc")).unwrap(), json!("abc"));
    }

    #[test]
    fn test_string_does_not_convert_numbers() {
        assert!(Schema::string().validate(&json!(12)).is_err());
    }

    #[test]
    fn test_int_converts_numeric_strings() {
        assert_eq!(Schema::int().validate(&json!("42")).unwrap(), json!(42));
        assert_eq!(Schema::int().validate(&json!(7.0)).unwrap(), json!(7));
        assert!(Schema::int().validate(&json!(7.5)).is_err());
        assert!(Schema::int().validate(&json!("seven")).is_err());
    }

    #[test]
    fn test_int_rejects_floats_outside_i64() {
        assert!(Schema::int().validate(&json!(1e300)).is_err());
        assert!(Schema::int().validate(&json!(-1e300)).is_err());
        assert!(Schema::int_range(None, Some(10)).validate(&json!(-1e300)).is_err());
        assert!(Schema::int().validate(&json!(9_223_372_036_854_775_808.0)).is_err());
        assert_eq!(Schema::int().validate(&json!(-4096.0)).unwrap(), json!(-4096));
    }

    #[test]
    fn test_int_bounds() {
        let schema = Schema::int_range(Some(1), Some(10));
        assert!(schema.validate(&json!(0)).is_err());
        assert!(schema.validate(&json!(11)).is_err());
        assert_eq!(schema.validate(&json!(10)).unwrap(), json!(10));
    }

    #[test]
    fn test_float_and_bool() {
        assert_eq!(Schema::float().validate(&json!("1.5")).unwrap(), json!(1.5));
        assert_eq!(Schema::Bool.validate(&json!("on")).unwrap(), json!(true));
        assert_eq!(Schema::Bool.validate(&json!("0")).unwrap(), json!(false));
        assert!(Schema::Bool.validate(&json!(1)).is_err());
    }

    #[test]
    fn test_email_and_url() {
        assert!(Schema::Email.validate(&json!("ada@example.com")).is_ok());
        assert!(Schema::Email.validate(&json!("not-an-email")).is_err());
        assert!(Schema::Url.validate(&json!("https://example.com/a?b=c")).is_ok());
        assert!(Schema::Url.validate(&json!("ftp://example.com")).is_err());
    }

    #[test]
    fn test_enum() {
        let schema = Schema::one_of(["red", "green"]);
        assert!(schema.validate(&json!("red")).is_ok());
        let err = schema.validate(&json!("blue")).unwrap_err();
        assert!(err.to_string().contains("red, green"));
    }

    #[test]
    fn test_dict_required_optional_and_default() {
        let schema = Schema::dict([
            Key::new("name", Schema::string()),
            Key::new("nickname", Schema::string()).optional(),
            Key::new("count", Schema::int()).default(json!(3)),
        ]);

        let value = schema.validate(&json!({"name": "Ada"})).unwrap();
        assert_eq!(value, json!({"name": "Ada", "count": 3}));

        let err = schema.validate(&json!({})).unwrap_err();
        assert_eq!(err.to_string(), "name: is required");
    }

    #[test]
    fn test_dict_rejects_extra_keys() {
        let schema = Schema::dict([Key::new("name", Schema::string())]);
        let err = schema
            .validate(&json!({"name": "Ada", "admin": true}))
            .unwrap_err();
        assert_eq!(err.to_string(), "admin: is not allowed key");
    }

    #[test]
    fn test_nested_error_path() {
        let schema = Schema::dict([Key::new(
            "items",
            Schema::list(Schema::dict([Key::new("qty", Schema::int_range(Some(1), None))])),
        )]);

        let err = schema
            .validate(&json!({"items": [{"qty": 1}, {"qty": 0}]}))
            .unwrap_err();
        assert_eq!(err.path(), "items[1].qty");
        assert_eq!(err.to_string(), "items[1].qty: value is less than 1");
    }

    #[test]
    fn test_list_bounds() {
        let schema = Schema::list_len(Schema::int(), 1, Some(2));
        assert!(schema.validate(&json!([])).is_err());
        assert!(schema.validate(&json!([1, 2, 3])).is_err());
        assert_eq!(schema.validate(&json!(["1", 2])).unwrap(), json!([1, 2]));
    }

    #[test]
    fn test_nullable() {
        let schema = Schema::Url.nullable();
        assert_eq!(schema.validate(&Value::Null).unwrap(), Value::Null);
        assert!(schema.validate(&json!("nope")).is_err());
    }

    #[test]
    fn test_display_repr() {
        assert_eq!(Schema::string().to_string(), "<String>");
        assert_eq!(Schema::blank_string().to_string(), "<String(blank)>");
        assert_eq!(Schema::int_range(Some(1), None).to_string(), "<Int(gte=1)>");
        assert_eq!(Schema::list(Schema::Email).to_string(), "<List(<Email>)>");
        assert_eq!(
            Schema::list_len(Schema::int(), 1, None).to_string(),
            "<List(min_length=1 | <Int>)>"
        );
        assert_eq!(
            Schema::one_of(["a", "b"]).to_string(),
            r#"<Enum("a", "b")>"#
        );
        assert_eq!(Schema::Url.nullable().to_string(), "<Or(<Null>, <URL>)>");
        assert_eq!(
            Schema::dict([
                Key::new("a", Schema::Bool),
                Key::new("b", Schema::Any).optional()
            ])
            .to_string(),
            "<Dict(a=<Bool>, b?=<Any>)>"
        );
    }
}
