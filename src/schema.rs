//! Schema definitions and abstractions for structured prompt outputs, plus a
//! user-defined extraction schema with a field-level validator.

use crate::{
    data::{Extraction, ExampleData},
    exceptions::{LangExtractError, LangExtractResult},
};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Shared key for extraction arrays in JSON/YAML
pub const EXTRACTIONS_KEY: &str = "extractions";

/// Attributes for
pub const ATTRIBUTES_SUFFIX:&str = "_attributes";

/// Enumeration of constraint types
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConstraintType {
    None,
}

/// Represents a constraint for model output decoding
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Constraint {
    /// The type of constraint applied
    pub constraint_type: ConstraintType,
}

impl Default for Constraint {
    fn default() -> Self {
        Self {
            constraint_type: ConstraintType::None,
        }
    }
}

impl Constraint {
    /// Create a new constraint with no restrictions
    pub fn none() -> Self {
        Self::default()
    }
}

/// Abstract base trait for generating structured constraints from examples
pub trait BaseSchema: Send + Sync {
    /// Factory method to build a schema instance from example data
    fn from_examples(
        examples_data: &[ExampleData],
        attribute_suffix: &str,
    ) -> LangExtractResult<Box<dyn BaseSchema>>
    where
        Self: Sized;

    /// Convert schema to provider-specific configuration
    ///
    /// Returns a dictionary of provider kwargs (e.g., response_schema for Gemini).
    /// Should be a pure data mapping with no side effects.
    fn to_provider_config(&self) -> HashMap<String, serde_json::Value>;

    /// Whether the provider emits valid output without needing Markdown fences
    ///
    /// Returns true when the provider will emit syntactically valid JSON (or other
    /// machine-parseable format) without needing Markdown fences. This says
    /// nothing about attribute-level schema enforcement.
    fn supports_strict_mode(&self) -> bool;

    /// Hook to update schema state based on provider kwargs
    ///
    /// This allows schemas to adjust their behavior based on caller overrides.
    /// For example, FormatModeSchema uses this to sync its format when the caller
    /// overrides it, ensuring supports_strict_mode stays accurate.
    fn sync_with_provider_kwargs(&mut self, kwargs: &HashMap<String, serde_json::Value>) {
        // Default implementation does nothing
        let _ = kwargs;
    }

    /// Clone this schema instance
    fn clone_box(&self) -> Box<dyn BaseSchema>;
}

/// Generic schema for providers that support format modes (JSON/YAML)
///
/// This schema doesn't enforce structure, only output format. Useful for
/// providers that can guarantee syntactically valid JSON or YAML but don't
/// support field-level constraints.
#[derive(Debug, Clone)]
pub struct FormatModeSchema {
    format: String,
}

impl FormatModeSchema {
    /// Initialize with a format mode
    pub fn new(format_mode: &str) -> Self {
        Self {
            format: format_mode.to_string(),
        }
    }

    /// Get the current format
    pub fn format(&self) -> &str {
        &self.format
    }

    /// Set the format
    pub fn set_format(&mut self, format: String) {
        self.format = format;
    }
}

impl BaseSchema for FormatModeSchema {
    fn from_examples(
        _examples_data: &[ExampleData],
        _attribute_suffix: &str,
    ) -> LangExtractResult<Box<dyn BaseSchema>> {
        // Since format mode doesn't use examples for constraints,
        // this simply returns a JSON-mode instance
        Ok(Box::new(Self::new("json")))
    }

    fn to_provider_config(&self) -> HashMap<String, serde_json::Value> {
        let mut config = HashMap::new();
        config.insert("format".to_string(), serde_json::json!(self.format));
        config
    }

    fn supports_strict_mode(&self) -> bool {
        // JSON guarantees valid syntax, others may not
        self.format == "json"
    }

    fn sync_with_provider_kwargs(&mut self, kwargs: &HashMap<String, serde_json::Value>) {
        if let Some(format_value) = kwargs.get("format") {
            if let Some(format_str) = format_value.as_str() {
                self.format = format_str.to_string();
            }
        }
    }

    fn clone_box(&self) -> Box<dyn BaseSchema> {
        Box::new(self.clone())
    }
}

/// Declared type of a field's value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FieldType {
    String,
    Number,
    Boolean,
    Array,
    Object,
}

/// Declaration of a single attribute field within a [`ClassDefinition`].
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FieldDefinition {
    pub name: String,
    pub field_type: FieldType,
    pub required: bool,
    pub min_count: Option<usize>,
    pub max_count: Option<usize>,
    pub min_value: Option<f64>,
    pub max_value: Option<f64>,
    pub min_length: Option<usize>,
    pub max_length: Option<usize>,
    pub enum_values: Option<Vec<String>>,
}

impl FieldDefinition {
    pub fn new(name: impl Into<String>, field_type: FieldType) -> Self {
        Self {
            name: name.into(),
            field_type,
            required: false,
            min_count: None,
            max_count: None,
            min_value: None,
            max_value: None,
            min_length: None,
            max_length: None,
            enum_values: None,
        }
    }

    pub fn required(mut self) -> Self {
        self.required = true;
        self
    }

    pub fn with_enum(mut self, values: Vec<String>) -> Self {
        self.enum_values = Some(values);
        self
    }
}

/// Declaration of an extraction class: how many instances are allowed and
/// what attribute fields it may carry.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClassDefinition {
    pub name: String,
    pub min_count: Option<usize>,
    pub max_count: Option<usize>,
    pub fields: Vec<FieldDefinition>,
}

impl ClassDefinition {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            min_count: None,
            max_count: None,
            fields: Vec::new(),
        }
    }

    pub fn with_field(mut self, field: FieldDefinition) -> Self {
        self.fields.push(field);
        self
    }

    fn field(&self, name: &str) -> Option<&FieldDefinition> {
        self.fields.iter().find(|f| f.name == name)
    }
}

/// A user-defined extraction schema: the set of classes the model is
/// expected to produce, and constraints on each.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ExtractionSchema {
    pub classes: Vec<ClassDefinition>,
}

impl ExtractionSchema {
    pub fn new(classes: Vec<ClassDefinition>) -> Self {
        Self { classes }
    }

    pub fn class(&self, name: &str) -> Option<&ClassDefinition> {
        self.classes.iter().find(|c| c.name == name)
    }

    /// Exports the schema as a JSON Schema draft-07 document describing the
    /// shape the model's `{"extractions": [...]}` response must take.
    ///
    /// Each class becomes its own alternative under a `oneOf`, so the
    /// `extraction_class` enum carries only that class's name and the
    /// `attributes` object carries only that class's fields, bounds and
    /// enum values.
    pub fn to_json_schema(&self) -> serde_json::Value {
        let alternatives: Vec<serde_json::Value> =
            self.classes.iter().map(class_item_schema).collect();
        serde_json::json!({
            "$schema": "http://json-schema.org/draft-07/schema#",
            "type": "object",
            "properties": {
                EXTRACTIONS_KEY: {
                    "type": "array",
                    "items": { "oneOf": alternatives }
                }
            },
            "required": [EXTRACTIONS_KEY]
        })
    }
}

/// JSON Schema for a single attribute field, carrying its bounds/enum.
fn field_schema(field: &FieldDefinition) -> serde_json::Value {
    let mut schema = match field.field_type {
        FieldType::String => serde_json::json!({ "type": "string" }),
        FieldType::Number => serde_json::json!({ "type": "number" }),
        FieldType::Boolean => serde_json::json!({ "type": "boolean" }),
        FieldType::Array => serde_json::json!({ "type": "array" }),
        FieldType::Object => serde_json::json!({ "type": "object" }),
    };
    let obj = schema.as_object_mut().expect("field_schema always builds an object");
    if let Some(min) = field.min_value {
        obj.insert("minimum".to_string(), serde_json::json!(min));
    }
    if let Some(max) = field.max_value {
        obj.insert("maximum".to_string(), serde_json::json!(max));
    }
    if let Some(min) = field.min_length {
        obj.insert("minLength".to_string(), serde_json::json!(min));
    }
    if let Some(max) = field.max_length {
        obj.insert("maxLength".to_string(), serde_json::json!(max));
    }
    if let Some(min) = field.min_count {
        obj.insert("minItems".to_string(), serde_json::json!(min));
    }
    if let Some(max) = field.max_count {
        obj.insert("maxItems".to_string(), serde_json::json!(max));
    }
    if let Some(values) = &field.enum_values {
        obj.insert("enum".to_string(), serde_json::json!(values));
    }
    schema
}

/// JSON Schema for a single class's extraction item: its own
/// `extraction_class` enum (one value) plus its own attribute properties.
fn class_item_schema(class: &ClassDefinition) -> serde_json::Value {
    let mut properties = serde_json::Map::new();
    properties.insert(
        "extraction_class".to_string(),
        serde_json::json!({ "type": "string", "enum": [class.name.clone()] }),
    );
    properties.insert("extraction_text".to_string(), serde_json::json!({ "type": "string" }));
    properties.insert("confidence".to_string(), serde_json::json!({ "type": "number" }));

    if !class.fields.is_empty() {
        let mut attr_properties = serde_json::Map::new();
        let mut attr_required = Vec::new();
        for field in &class.fields {
            attr_properties.insert(field.name.clone(), field_schema(field));
            if field.required {
                attr_required.push(field.name.clone());
            }
        }
        let mut attributes_schema = serde_json::json!({
            "type": "object",
            "properties": attr_properties,
        });
        if !attr_required.is_empty() {
            attributes_schema["required"] = serde_json::json!(attr_required);
        }
        properties.insert("attributes".to_string(), attributes_schema);
    }

    serde_json::json!({
        "type": "object",
        "properties": properties,
        "required": ["extraction_class", "extraction_text"]
    })
}

/// Validates a batch of extractions against an [`ExtractionSchema`]: class
/// existence, field type/bounds/enum checks per extraction, and per-class
/// `min_count`/`max_count` enforced against the full document.
pub struct SchemaValidator<'a> {
    schema: &'a ExtractionSchema,
}

impl<'a> SchemaValidator<'a> {
    pub fn new(schema: &'a ExtractionSchema) -> Self {
        Self { schema }
    }

    /// Validates every extraction's class and fields, then the per-class
    /// counts across the whole document. Returns the first violation, if
    /// any; callers that need every violation should call
    /// `validate_extraction` per-item themselves.
    pub fn validate_document(&self, extractions: &[Extraction]) -> LangExtractResult<()> {
        for extraction in extractions {
            self.validate_extraction(extraction)?;
        }

        let mut counts: HashMap<&str, usize> = HashMap::new();
        for extraction in extractions {
            *counts.entry(extraction.extraction_class.as_str()).or_insert(0) += 1;
        }

        for class in &self.schema.classes {
            let count = counts.get(class.name.as_str()).copied().unwrap_or(0);
            if let Some(min) = class.min_count {
                if count < min {
                    return Err(LangExtractError::processing(format!(
                        "class '{}' has {} extractions, fewer than the required minimum {}",
                        class.name, count, min
                    )));
                }
            }
            if let Some(max) = class.max_count {
                if count > max {
                    return Err(LangExtractError::processing(format!(
                        "class '{}' has {} extractions, more than the allowed maximum {}",
                        class.name, count, max
                    )));
                }
            }
        }

        Ok(())
    }

    pub fn validate_extraction(&self, extraction: &Extraction) -> LangExtractResult<()> {
        let class = self.schema.class(&extraction.extraction_class).ok_or_else(|| {
            LangExtractError::not_found(format!(
                "extraction class '{}' is not declared in the schema",
                extraction.extraction_class
            ))
        })?;

        let Some(attributes) = &extraction.attributes else {
            if class.fields.iter().any(|f| f.required) {
                return Err(LangExtractError::processing(format!(
                    "class '{}' has required fields but extraction carries no attributes",
                    class.name
                )));
            }
            return Ok(());
        };

        for field in &class.fields {
            let value = attributes.get(&field.name);
            if field.required && value.is_none() {
                return Err(LangExtractError::processing(format!(
                    "field '{}' is required on class '{}'",
                    field.name, class.name
                )));
            }
            if let Some(value) = value {
                self.validate_field(class, field, value)?;
            }
        }

        Ok(())
    }

    fn validate_field(
        &self,
        class: &ClassDefinition,
        field: &FieldDefinition,
        value: &serde_json::Value,
    ) -> LangExtractResult<()> {
        let type_ok = match field.field_type {
            FieldType::String => value.is_string(),
            FieldType::Number => value.is_number(),
            FieldType::Boolean => value.is_boolean(),
            FieldType::Array => value.is_array(),
            FieldType::Object => value.is_object(),
        };
        if !type_ok {
            return Err(LangExtractError::processing(format!(
                "field '{}' on class '{}' expected type {:?}, got {}",
                field.name, class.name, field.field_type, value
            )));
        }

        if let Some(s) = value.as_str() {
            if let Some(min_len) = field.min_length {
                if s.len() < min_len {
                    return Err(LangExtractError::processing(format!(
                        "field '{}' is shorter than the minimum length {}",
                        field.name, min_len
                    )));
                }
            }
            if let Some(max_len) = field.max_length {
                if s.len() > max_len {
                    return Err(LangExtractError::processing(format!(
                        "field '{}' exceeds the maximum length {}",
                        field.name, max_len
                    )));
                }
            }
            if let Some(enum_values) = &field.enum_values {
                if !enum_values.iter().any(|v| v == s) {
                    return Err(LangExtractError::processing(format!(
                        "field '{}' value '{}' is not one of the allowed values {:?}",
                        field.name, s, enum_values
                    )));
                }
            }
        }

        if let Some(n) = value.as_f64() {
            if let Some(min) = field.min_value {
                if n < min {
                    return Err(LangExtractError::processing(format!(
                        "field '{}' value {} is below the minimum {}",
                        field.name, n, min
                    )));
                }
            }
            if let Some(max) = field.max_value {
                if n > max {
                    return Err(LangExtractError::processing(format!(
                        "field '{}' value {} is above the maximum {}",
                        field.name, n, max
                    )));
                }
            }
        }

        if let Some(arr) = value.as_array() {
            if let Some(min) = field.min_count {
                if arr.len() < min {
                    return Err(LangExtractError::processing(format!(
                        "field '{}' has {} elements, fewer than the required minimum {}",
                        field.name, arr.len(), min
                    )));
                }
            }
            if let Some(max) = field.max_count {
                if arr.len() > max {
                    return Err(LangExtractError::processing(format!(
                        "field '{}' has {} elements, more than the allowed maximum {}",
                        field.name, arr.len(), max
                    )));
                }
            }
        }

        let _ = class.field(&field.name);
        Ok(())
    }
}
