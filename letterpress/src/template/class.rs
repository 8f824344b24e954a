//! Code-defined template classes

use std::fmt;

use rand::RngCore;
use serde_json::{Map, Value};

use crate::schema::{Key, Schema};

/// Generator for a single fake variable value
pub type FakeFn = fn(&mut dyn RngCore) -> Value;

/// Maps validated constructor arguments to template variables
pub type VariablesFn = fn(&Map<String, Value>) -> Map<String, Value>;

/// A named variable a template body may reference
#[derive(Clone)]
pub struct Variable {
    /// Name the template refers to
    pub name: String,
    /// Schema the value must satisfy
    pub schema: Schema,
    /// Value used when nothing else supplies one
    pub default: Option<Value>,
    /// Overrides schema-driven fake data
    pub fake: Option<FakeFn>,
}

impl Variable {
    /// Declare a variable
    #[must_use]
    pub fn new(name: impl Into<String>, schema: Schema) -> Self {
        Self {
            name: name.into(),
            schema,
            default: None,
            fake: None,
        }
    }

    /// Fall back to `value` when the variable is not supplied
    #[must_use]
    pub fn default(mut self, value: Value) -> Self {
        self.default = Some(value);
        self
    }

    /// Use `fake` to produce preview data for this variable
    #[must_use]
    pub const fn fake(mut self, fake: FakeFn) -> Self {
        self.fake = Some(fake);
        self
    }
}

impl fmt::Debug for Variable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Variable")
            .field("name", &self.name)
            .field("schema", &self.schema.to_string())
            .field("default", &self.default)
            .field("fake", &self.fake.is_some())
            .finish()
    }
}

/// A code-level email template definition
///
/// The stored record with the same [`name`](Self::name) supplies the
/// subject and body sources; the class decides which arguments application
/// code must pass and which variables those become.
pub trait TemplateClass: Send + Sync {
    /// Unique name, also the key of the stored record
    fn name(&self) -> &str;

    /// Human readable description
    fn description(&self) -> Option<&str> {
        None
    }

    /// Schema of the constructor arguments, always a [`Schema::Dict`]
    fn kwargs(&self) -> &Schema;

    /// Variables available to the subject and body
    fn variables(&self) -> &[Variable];

    /// Compute template variables from validated constructor arguments
    ///
    /// The default takes each variable from the argument of the same name,
    /// falling back to the variable's default.
    fn get_variables(&self, kwargs: &Map<String, Value>) -> Map<String, Value> {
        self.variables()
            .iter()
            .filter_map(|variable| {
                kwargs
                    .get(&variable.name)
                    .or(variable.default.as_ref())
                    .map(|value| (variable.name.clone(), value.clone()))
            })
            .collect()
    }

    /// Subject used when a record is first created
    fn default_subject(&self) -> &str {
        ""
    }

    /// Body used when a record is first created
    fn default_body(&self) -> &str {
        ""
    }
}

/// A [`TemplateClass`] assembled from declarations
///
/// # Examples
///
/// ```rust
/// use letterpress::schema::{Key, Schema};
/// use letterpress::template::{DeclaredTemplate, TemplateClass, Variable};
///
/// let welcome = DeclaredTemplate::new("welcome")
///     .description("Sent after sign up")
///     .kwarg(Key::new("name", Schema::string()))
///     .variable(Variable::new("name", Schema::string()));
///
/// assert_eq!(welcome.name(), "welcome");
/// assert_eq!(welcome.variables().len(), 1);
/// ```
#[derive(Debug, Clone)]
pub struct DeclaredTemplate {
    name: String,
    description: Option<String>,
    kwargs: Schema,
    variables: Vec<Variable>,
    mapper: Option<VariablesFn>,
    default_subject: String,
    default_body: String,
}

impl DeclaredTemplate {
    /// Start declaring a template with no arguments and no variables
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            description: None,
            kwargs: Schema::empty_dict(),
            variables: Vec::new(),
            mapper: None,
            default_subject: String::new(),
            default_body: String::new(),
        }
    }

    /// Set the description
    #[must_use]
    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Declare a constructor argument
    #[must_use]
    pub fn kwarg(mut self, key: Key) -> Self {
        if let Schema::Dict(keys) = &mut self.kwargs {
            keys.push(key);
        }
        self
    }

    /// Declare a variable
    #[must_use]
    pub fn variable(mut self, variable: Variable) -> Self {
        self.variables.push(variable);
        self
    }

    /// Replace the default argument-to-variable mapping
    #[must_use]
    pub const fn map_variables(mut self, mapper: VariablesFn) -> Self {
        self.mapper = Some(mapper);
        self
    }

    /// Seed subject and body for newly created records
    #[must_use]
    pub fn seed(mut self, subject: impl Into<String>, body: impl Into<String>) -> Self {
        self.default_subject = subject.into();
        self.default_body = body.into();
        self
    }
}

impl TemplateClass for DeclaredTemplate {
    fn name(&self) -> &str {
        &self.name
    }

    fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }

    fn kwargs(&self) -> &Schema {
        &self.kwargs
    }

    fn variables(&self) -> &[Variable] {
        &self.variables
    }

    fn get_variables(&self, kwargs: &Map<String, Value>) -> Map<String, Value> {
        let mut variables = self.mapper.map_or_else(Map::new, |mapper| mapper(kwargs));
        for variable in &self.variables {
            if variables.contains_key(&variable.name) {
                continue;
            }
            if let Some(value) = kwargs.get(&variable.name).or(variable.default.as_ref()) {
                variables.insert(variable.name.clone(), value.clone());
            }
        }
        variables
    }

    fn default_subject(&self) -> &str {
        &self.default_subject
    }

    fn default_body(&self) -> &str {
        &self.default_body
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_default_mapping_takes_kwargs_then_defaults() {
        let class = DeclaredTemplate::new("greeting")
            .kwarg(Key::new("name", Schema::string()))
            .variable(Variable::new("name", Schema::string()))
            .variable(Variable::new("greeting", Schema::string()).default(json!("Hello")));

        let mut kwargs = Map::new();
        kwargs.insert("name".into(), json!("Ada"));

        let variables = class.get_variables(&kwargs);
        assert_eq!(variables.get("name"), Some(&json!("Ada")));
        assert_eq!(variables.get("greeting"), Some(&json!("Hello")));
    }

    #[test]
    fn test_custom_mapper_wins() {
        fn shout(kwargs: &Map<String, Value>) -> Map<String, Value> {
            let mut out = Map::new();
            if let Some(name) = kwargs.get("name").and_then(Value::as_str) {
                out.insert("name".into(), json!(name.to_uppercase()));
            }
            out
        }

        let class = DeclaredTemplate::new("shout")
            .kwarg(Key::new("name", Schema::string()))
            .variable(Variable::new("name", Schema::string()))
            .map_variables(shout);

        let mut kwargs = Map::new();
        kwargs.insert("name".into(), json!("ada"));
        assert_eq!(class.get_variables(&kwargs).get("name"), Some(&json!("ADA")));
    }

    #[test]
    fn test_kwargs_schema_accumulates_keys() {
        let class = DeclaredTemplate::new("t")
            .kwarg(Key::new("a", Schema::int()))
            .kwarg(Key::new("b", Schema::Bool));
        assert_eq!(class.kwargs().to_string(), "<Dict(a=<Int>, b=<Bool>)>");
    }
}
