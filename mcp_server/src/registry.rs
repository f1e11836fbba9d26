//! Tool descriptors, argument validation, and the dispatch registry.
//!
//! A [`ToolDescriptor`] is pure metadata: the tool name, a human
//! description, and an ordered list of string parameters. Descriptors drive
//! both the `tools/list` discovery surface and the validation step that runs
//! before any handler is invoked.
//!
//! Registration happens through a [`RegistryBuilder`] while the server is
//! configuring; [`RegistryBuilder::build`] freezes it into a read-only
//! [`Registry`] for the serving lifetime. No tools are added or removed
//! after that point, so lookups need no locking.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use serde_json::{json, Map, Value};
use thiserror::Error;

use crate::config::{DefaultKey, Defaults};
use crate::envelope::{ToolError, ToolOutcome};

/// Wire type of a tool parameter. Every parameter in this server is a
/// string; the enum keeps schema rendering exhaustive.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParamKind {
    String,
}

impl ParamKind {
    fn schema_type(self) -> &'static str {
        match self {
            ParamKind::String => "string",
        }
    }
}

/// Declarative schema for one tool parameter.
#[derive(Debug, Clone)]
pub struct ParamSpec {
    pub name: String,
    pub kind: ParamKind,
    pub description: String,
    pub required: bool,
    /// Declared default, absent for required parameters.
    pub default: Option<String>,
    /// Process-wide configured value consulted when the argument is absent.
    pub fallback: Option<DefaultKey>,
}

impl ParamSpec {
    /// A required string parameter.
    pub fn required(name: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            kind: ParamKind::String,
            description: description.into(),
            required: true,
            default: None,
            fallback: None,
        }
    }

    /// An optional string parameter with a declared default.
    pub fn optional(
        name: impl Into<String>,
        description: impl Into<String>,
        default: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            kind: ParamKind::String,
            description: description.into(),
            required: false,
            default: Some(default.into()),
            fallback: None,
        }
    }

    /// Let validation fall back to a process-wide configured value when the
    /// argument is absent.
    pub fn with_fallback(mut self, key: DefaultKey) -> Self {
        self.fallback = Some(key);
        self
    }
}

/// Declarative schema for one tool. Immutable once constructed.
#[derive(Debug, Clone)]
pub struct ToolDescriptor {
    name: String,
    description: String,
    params: Vec<ParamSpec>,
}

impl ToolDescriptor {
    pub fn new(name: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            description: description.into(),
            params: Vec::new(),
        }
    }

    /// Append a parameter. Declaration order is preserved in the schema.
    pub fn param(mut self, param: ParamSpec) -> Self {
        self.params.push(param);
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    pub fn params(&self) -> &[ParamSpec] {
        &self.params
    }

    /// Render the JSON Schema advertised through `tools/list`.
    pub fn input_schema(&self) -> Value {
        let mut properties = Map::new();
        let mut required = Vec::new();
        for param in &self.params {
            let mut property = Map::new();
            property.insert("type".to_string(), json!(param.kind.schema_type()));
            property.insert("description".to_string(), json!(param.description));
            if let Some(default) = &param.default {
                property.insert("default".to_string(), json!(default));
            }
            properties.insert(param.name.clone(), Value::Object(property));
            if param.required {
                required.push(json!(param.name));
            }
        }

        let mut schema = Map::new();
        schema.insert("type".to_string(), json!("object"));
        schema.insert("properties".to_string(), Value::Object(properties));
        if !required.is_empty() {
            schema.insert("required".to_string(), Value::Array(required));
        }
        Value::Object(schema)
    }
}

/// Validated, defaulted arguments handed to a handler.
#[derive(Debug, Clone, Default)]
pub struct ToolArguments {
    values: HashMap<String, String>,
}

impl ToolArguments {
    /// Build arguments directly, bypassing validation. Intended for tests
    /// and for callers that validated elsewhere.
    pub fn from_pairs<I, K, V>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        Self {
            values: pairs
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        }
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        self.values.get(name).map(String::as_str)
    }

    /// Fetch a parameter that validation guarantees for this tool.
    pub fn require(&self, name: &str) -> Result<&str, ToolError> {
        self.get(name)
            .ok_or_else(|| ToolError::MissingParameter(name.to_string()))
    }
}

/// One invocable operation.
#[async_trait]
pub trait ToolHandler: Send + Sync {
    async fn call(&self, args: ToolArguments) -> Result<ToolOutcome, ToolError>;
}

/// Errors produced during tool registration.
#[derive(Debug, Error)]
pub enum RegistryError {
    /// Tool name collided with an existing registration.
    #[error("tool `{0}` is already registered")]
    DuplicateTool(String),
}

struct RegisteredTool {
    descriptor: ToolDescriptor,
    handler: Arc<dyn ToolHandler>,
}

/// Accumulates tool registrations during startup.
pub struct RegistryBuilder {
    defaults: Defaults,
    tools: Vec<RegisteredTool>,
    index: HashMap<String, usize>,
}

impl RegistryBuilder {
    pub fn new(defaults: Defaults) -> Self {
        Self {
            defaults,
            tools: Vec::new(),
            index: HashMap::new(),
        }
    }

    /// Bind a descriptor to its handler. Names must be unique across the
    /// whole registry.
    pub fn register(
        &mut self,
        descriptor: ToolDescriptor,
        handler: Arc<dyn ToolHandler>,
    ) -> Result<(), RegistryError> {
        if self.index.contains_key(descriptor.name()) {
            return Err(RegistryError::DuplicateTool(descriptor.name().to_string()));
        }
        self.index
            .insert(descriptor.name().to_string(), self.tools.len());
        self.tools.push(RegisteredTool { descriptor, handler });
        Ok(())
    }

    /// Freeze into the read-only registry served for the process lifetime.
    pub fn build(self) -> Registry {
        Registry {
            defaults: self.defaults,
            tools: self.tools,
            index: self.index,
        }
    }
}

/// Read-only mapping from tool name to (descriptor, handler), plus the
/// immutable process-wide defaults consulted during validation.
pub struct Registry {
    defaults: Defaults,
    tools: Vec<RegisteredTool>,
    index: HashMap<String, usize>,
}

impl Registry {
    pub fn len(&self) -> usize {
        self.tools.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tools.is_empty()
    }

    /// Descriptors in registration order.
    pub fn descriptors(&self) -> impl Iterator<Item = &ToolDescriptor> {
        self.tools.iter().map(|tool| &tool.descriptor)
    }

    fn get(&self, name: &str) -> Option<&RegisteredTool> {
        self.index.get(name).map(|&i| &self.tools[i])
    }

    /// Resolve one invocation: look up the tool, validate the raw arguments
    /// against its descriptor, and run the bound handler. Validation
    /// failures return before any backend work happens.
    pub async fn dispatch(
        &self,
        name: &str,
        arguments: &Map<String, Value>,
    ) -> Result<ToolOutcome, ToolError> {
        let tool = self
            .get(name)
            .ok_or_else(|| ToolError::UnknownTool(name.to_string()))?;
        let args = self.validate(&tool.descriptor, arguments)?;
        tool.handler.call(args).await
    }

    // Resolution order per parameter: explicit argument, declared default,
    // configured fallback. Required parameters must resolve to something.
    fn validate(
        &self,
        descriptor: &ToolDescriptor,
        arguments: &Map<String, Value>,
    ) -> Result<ToolArguments, ToolError> {
        let mut values = HashMap::new();
        for spec in descriptor.params() {
            let supplied = match arguments.get(&spec.name) {
                Some(Value::String(value)) => Some(value.clone()),
                Some(_) => {
                    return Err(ToolError::InvalidArgument(format!(
                        "parameter `{}` must be a string",
                        spec.name
                    )))
                }
                None => None,
            };
            let resolved = supplied.or_else(|| spec.default.clone()).or_else(|| {
                spec.fallback
                    .and_then(|key| self.defaults.get(key).map(str::to_owned))
            });
            match resolved {
                Some(value) => {
                    values.insert(spec.name.clone(), value);
                }
                None if spec.required => {
                    return Err(ToolError::MissingParameter(spec.name.clone()))
                }
                None => {}
            }
        }
        Ok(ToolArguments { values })
    }
}
