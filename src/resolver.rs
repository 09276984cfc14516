//! Output resolution and parsing functionality.

use crate::{
    data::{Extraction, FormatType},
    exceptions::{LangExtractError, LangExtractResult},
    ExtractConfig,
};
use serde_json::Value;
use std::fs;
use std::path::Path;
use uuid::Uuid;

/// Configuration for validation behavior
#[derive(Debug, Clone)]
pub struct ValidationConfig {
    /// Whether to require all expected fields to be present
    pub require_all_fields: bool,
    /// Whether to save raw model outputs to files
    pub save_raw_outputs: bool,
    /// Directory to save raw outputs (defaults to "./raw_outputs")
    pub raw_outputs_dir: String,
    /// Quality threshold for extractions (0.0 to 1.0)
    pub quality_threshold: f32,
}

impl Default for ValidationConfig {
    fn default() -> Self {
        Self {
            require_all_fields: false,
            save_raw_outputs: true,
            raw_outputs_dir: "./raw_outputs".to_string(),
            quality_threshold: 0.0,
        }
    }
}

/// Results of validation process
#[derive(Debug, Clone)]
pub struct ValidationResult {
    /// Whether validation passed
    pub is_valid: bool,
    /// Validation errors encountered
    pub errors: Vec<ValidationError>,
    /// Validation warnings
    pub warnings: Vec<ValidationWarning>,
    /// Path to saved raw output file
    pub raw_output_file: Option<String>,
}

/// Validation error details
#[derive(Debug, Clone)]
pub struct ValidationError {
    /// Error message
    pub message: String,
    /// Field path where error occurred
    pub field_path: Option<String>,
    /// Expected value or type
    pub expected: Option<String>,
    /// Actual value found
    pub actual: Option<String>,
}

/// Validation warning details
#[derive(Debug, Clone)]
pub struct ValidationWarning {
    /// Warning message
    pub message: String,
    /// Field path where warning occurred
    pub field_path: Option<String>,
}

/// Resolver for parsing language model outputs with validation
pub struct Resolver {
    /// Whether to expect fenced output
    fence_output: bool,
    /// Output format type
    format_type: FormatType,
    /// Validation configuration
    validation_config: ValidationConfig,
}

impl Resolver {
    /// Create a new resolver
    pub fn new(config: &ExtractConfig, fence_output: bool) -> LangExtractResult<Self> {
        let validation_config = ValidationConfig {
            save_raw_outputs: config.debug,
            ..Default::default()
        };

        if validation_config.save_raw_outputs {
            if let Err(e) = fs::create_dir_all(&validation_config.raw_outputs_dir) {
                log::warn!("Failed to create raw outputs directory: {}", e);
            }
        }

        Ok(Self {
            fence_output,
            format_type: config.format_type,
            validation_config,
        })
    }

    /// Create a new resolver with custom validation config
    pub fn with_validation_config(
        config: &ExtractConfig,
        fence_output: bool,
        validation_config: ValidationConfig,
    ) -> LangExtractResult<Self> {
        if validation_config.save_raw_outputs {
            if let Err(e) = fs::create_dir_all(&validation_config.raw_outputs_dir) {
                log::warn!("Failed to create raw outputs directory: {}", e);
            }
        }

        Ok(Self {
            fence_output,
            format_type: config.format_type,
            validation_config,
        })
    }

    /// Get whether this resolver expects fenced output
    pub fn fence_output(&self) -> bool {
        self.fence_output
    }

    /// Strip markdown code fences (```json ... ``` or ``` ... ```) if present.
    fn strip_fence(&self, response: &str) -> String {
        if !self.fence_output {
            return response.to_string();
        }
        let trimmed = response.trim();
        if let Some(rest) = trimmed.strip_prefix("```") {
            let rest = rest
                .strip_prefix("json")
                .or_else(|| rest.strip_prefix("yaml"))
                .unwrap_or(rest);
            let rest = rest.trim_start_matches(['\n', '\r']);
            if let Some(end) = rest.rfind("```") {
                return rest[..end].trim().to_string();
            }
            return rest.trim().to_string();
        }
        trimmed.to_string()
    }

    /// Save raw model output to a file for debugging/recovery
    pub fn save_raw_output(&self, raw_output: &str, metadata: Option<&str>) -> LangExtractResult<String> {
        if !self.validation_config.save_raw_outputs {
            return Err(LangExtractError::configuration("Raw output saving is disabled"));
        }

        let output_dir = Path::new(&self.validation_config.raw_outputs_dir);
        if !output_dir.exists() {
            fs::create_dir_all(output_dir).map_err(LangExtractError::IoError)?;
        }

        let timestamp = chrono::Utc::now().format("%Y%m%d_%H%M%S").to_string();
        let unique_id = Uuid::new_v4().to_string()[..8].to_string();
        let filename = format!("raw_output_{}_{}.txt", timestamp, unique_id);
        let filepath = output_dir.join(&filename);

        let mut content = String::new();
        content.push_str("=== Raw Model Output ===\n");
        content.push_str(&format!("Timestamp: {}\n", chrono::Utc::now().to_rfc3339()));
        if let Some(meta) = metadata {
            content.push_str(&format!("Metadata: {}\n", meta));
        }
        content.push_str(&format!("Format: {:?}\n", self.format_type));
        content.push_str(&format!("Content Length: {} chars\n", raw_output.len()));
        content.push_str("=== Output Content ===\n");
        content.push_str(raw_output);
        content.push_str("\n=== End Output ===\n");

        fs::write(&filepath, content).map_err(LangExtractError::IoError)?;

        let path_str = filepath.to_string_lossy().to_string();
        log::info!("Saved raw output to: {}", path_str);
        Ok(path_str)
    }

    /// Validate and parse model response with raw data preservation
    pub fn validate_and_parse(
        &self,
        raw_response: &str,
        expected_fields: &[String],
    ) -> LangExtractResult<(Vec<Extraction>, ValidationResult)> {
        let raw_file_path = if self.validation_config.save_raw_outputs {
            match self.save_raw_output(raw_response, Some("validation_parse")) {
                Ok(path) => Some(path),
                Err(e) => {
                    log::warn!("Failed to save raw output: {}", e);
                    None
                }
            }
        } else {
            None
        };

        let parse_result = self.parse_response(raw_response);

        let mut validation_result = match &parse_result {
            Ok(extractions) => self.validate_extractions(extractions, expected_fields),
            Err(parse_error) => ValidationResult {
                is_valid: false,
                errors: vec![ValidationError {
                    message: format!("Failed to parse response: {}", parse_error),
                    field_path: None,
                    expected: Some("{\"extractions\": [...]}".to_string()),
                    actual: Some("Unparseable content".to_string()),
                }],
                warnings: vec![],
                raw_output_file: raw_file_path.clone(),
            },
        };

        if validation_result.raw_output_file.is_none() {
            validation_result.raw_output_file = raw_file_path.clone();
        }

        match parse_result {
            Ok(extractions) => Ok((extractions, validation_result)),
            Err(e) => {
                match &validation_result.raw_output_file {
                    Some(path) => log::warn!("Parse failed but raw data saved to: {}", path),
                    None => log::warn!("Parse failed and no raw data was saved"),
                }
                Err(e)
            }
        }
    }

    /// Parse a model response into extractions, targeting `{"extractions": [...]}`.
    fn parse_response(&self, response: &str) -> LangExtractResult<Vec<Extraction>> {
        let stripped = self.strip_fence(response);

        if let Ok(json_value) = serde_json::from_str::<Value>(&stripped) {
            return self.parse_json_response(&json_value);
        }

        if let Some(json_start) = stripped.find('{') {
            if let Some(json_end) = stripped.rfind('}') {
                let json_str = &stripped[json_start..=json_end];
                if let Ok(json_value) = serde_json::from_str::<Value>(json_str) {
                    return self.parse_json_response(&json_value);
                }
            }
        }

        Err(LangExtractError::parsing(format!(
            "Could not parse response as JSON: {}",
            response
        )))
    }

    /// Parse the `{"extractions": [...]}` shape (or a bare top-level array
    /// of extraction objects, or a single flat object, as a tolerant
    /// fallback).
    fn parse_json_response(&self, json: &Value) -> LangExtractResult<Vec<Extraction>> {
        if let Some(obj) = json.as_object() {
            if let Some(array) = obj.get("extractions").and_then(|v| v.as_array()) {
                return Ok(self.parse_extraction_items_tolerant(array));
            }
        }

        if let Some(array) = json.as_array() {
            return Ok(self.parse_extraction_items_tolerant(array));
        }

        if json.is_object() {
            return Ok(vec![self.parse_extraction_item(json, 0)?]);
        }

        Err(LangExtractError::parsing(
            "Response did not contain an \"extractions\" array".to_string(),
        ))
    }

    /// Parses every element of an `extractions` array, silently dropping
    /// any element that fails to parse rather than failing the whole batch.
    fn parse_extraction_items_tolerant(&self, array: &[Value]) -> Vec<Extraction> {
        array
            .iter()
            .enumerate()
            .filter_map(|(index, item)| match self.parse_extraction_item(item, index) {
                Ok(extraction) => Some(extraction),
                Err(e) => {
                    log::warn!("dropping malformed extraction at index {}: {}", index, e);
                    None
                }
            })
            .collect()
    }

    /// Parse a single extraction object: `extraction_class`/`extraction_text`
    /// are required, `confidence` is copied if numeric, everything else
    /// folds into `attributes`.
    fn parse_extraction_item(&self, item: &Value, index: usize) -> LangExtractResult<Extraction> {
        let obj = item.as_object().ok_or_else(|| {
            LangExtractError::parsing(format!("Extraction at index {} is not an object", index))
        })?;

        let extraction_class = obj
            .get("extraction_class")
            .and_then(|v| v.as_str())
            .ok_or_else(|| {
                LangExtractError::parsing(format!(
                    "Extraction at index {} is missing required field \"extraction_class\"",
                    index
                ))
            })?;
        if extraction_class.trim().is_empty() {
            return Err(LangExtractError::parsing(format!(
                "Extraction at index {} has an empty \"extraction_class\"",
                index
            )));
        }

        let extraction_text = obj
            .get("extraction_text")
            .and_then(|v| v.as_str())
            .ok_or_else(|| {
                LangExtractError::parsing(format!(
                    "Extraction at index {} is missing required field \"extraction_text\"",
                    index
                ))
            })?;
        if extraction_text.trim().is_empty() {
            return Err(LangExtractError::parsing(format!(
                "Extraction at index {} has an empty \"extraction_text\"",
                index
            )));
        }

        let mut extraction = Extraction::new(extraction_class.to_string(), extraction_text.to_string());
        extraction.extraction_index = Some(index);

        if let Some(confidence) = obj.get("confidence").and_then(|v| v.as_f64()) {
            extraction.alignment_confidence = confidence as f32;
        }

        for (key, value) in obj {
            if matches!(key.as_str(), "extraction_class" | "extraction_text" | "confidence") {
                continue;
            }
            extraction.set_attribute(key.clone(), value.clone());
        }

        Ok(extraction)
    }

    /// Validate extractions against the expected field set.
    fn validate_extractions(&self, extractions: &[Extraction], expected_fields: &[String]) -> ValidationResult {
        let mut errors = Vec::new();
        let mut warnings = Vec::new();
        let mut is_valid = true;

        if self.validation_config.require_all_fields {
            let extraction_classes: std::collections::HashSet<_> =
                extractions.iter().map(|e| &e.extraction_class).collect();

            for expected_field in expected_fields {
                if !extraction_classes.contains(expected_field) {
                    errors.push(ValidationError {
                        message: format!("Required field '{}' is missing", expected_field),
                        field_path: Some(expected_field.clone()),
                        expected: Some("Present".to_string()),
                        actual: Some("Missing".to_string()),
                    });
                    is_valid = false;
                }
            }
        }

        for extraction in extractions {
            if extraction.extraction_text.trim().is_empty() {
                warnings.push(ValidationWarning {
                    message: format!("Empty extraction text for field '{}'", extraction.extraction_class),
                    field_path: Some(extraction.extraction_class.clone()),
                });
            }

            if extraction.extraction_text.len() > 1000 {
                warnings.push(ValidationWarning {
                    message: format!(
                        "Very long extraction text ({} chars) for field '{}'",
                        extraction.extraction_text.len(),
                        extraction.extraction_class
                    ),
                    field_path: Some(extraction.extraction_class.clone()),
                });
            }
        }

        if !expected_fields.is_empty() && extractions.len() < expected_fields.len() / 2 {
            warnings.push(ValidationWarning {
                message: format!(
                    "Low extraction count: found {} but expected around {}",
                    extractions.len(),
                    expected_fields.len()
                ),
                field_path: None,
            });
        }

        ValidationResult {
            is_valid: is_valid && errors.is_empty(),
            errors,
            warnings,
            raw_output_file: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ExtractConfig;
    use std::fs;
    use tempfile::TempDir;

    fn create_test_config() -> ExtractConfig {
        ExtractConfig {
            debug: true,
            ..Default::default()
        }
    }

    fn create_test_resolver() -> Resolver {
        let config = create_test_config();
        Resolver::new(&config, true).unwrap()
    }

    fn create_test_resolver_with_temp_dir(temp_dir: &TempDir) -> Resolver {
        let config = create_test_config();
        let validation_config = ValidationConfig {
            save_raw_outputs: true,
            raw_outputs_dir: temp_dir.path().to_string_lossy().to_string(),
            ..Default::default()
        };
        Resolver::with_validation_config(&config, true, validation_config).unwrap()
    }

    #[test]
    fn test_validation_config_default() {
        let config = ValidationConfig::default();
        assert!(!config.require_all_fields);
        assert!(config.save_raw_outputs);
        assert_eq!(config.raw_outputs_dir, "./raw_outputs");
        assert_eq!(config.quality_threshold, 0.0);
    }

    #[test]
    fn test_raw_output_saving() {
        let temp_dir = TempDir::new().unwrap();
        let resolver = create_test_resolver_with_temp_dir(&temp_dir);

        let test_output = r#"{"extractions": [{"extraction_class": "person", "extraction_text": "John Doe"}]}"#;
        let result = resolver.save_raw_output(test_output, Some("test_metadata"));

        assert!(result.is_ok());
        let file_path = result.unwrap();
        assert!(std::path::Path::new(&file_path).exists());

        let content = fs::read_to_string(&file_path).unwrap();
        assert!(content.contains("Raw Model Output"));
        assert!(content.contains("test_metadata"));
        assert!(content.contains(test_output));
    }

    #[test]
    fn test_parse_extractions_shape() {
        let resolver = create_test_resolver();
        let json_response = r#"{"extractions": [
            {"extraction_class": "person", "extraction_text": "John Doe", "confidence": 0.9, "role": "ceo"},
            {"extraction_class": "age", "extraction_text": "30"}
        ]}"#;

        let result = resolver.parse_response(json_response);
        assert!(result.is_ok());

        let extractions = result.unwrap();
        assert_eq!(extractions.len(), 2);

        let person = extractions.iter().find(|e| e.extraction_class == "person").unwrap();
        assert_eq!(person.extraction_text, "John Doe");
        assert!((person.alignment_confidence - 0.9).abs() < 1e-6);
        assert_eq!(person.get_attribute("role").and_then(|v| v.as_str()), Some("ceo"));

        let age = extractions.iter().find(|e| e.extraction_class == "age").unwrap();
        assert_eq!(age.extraction_text, "30");
    }

    #[test]
    fn test_parse_bare_array_of_extractions() {
        let resolver = create_test_resolver();
        let json_response = r#"[{"extraction_class": "name", "extraction_text": "Alice"}]"#;

        let result = resolver.parse_response(json_response);
        assert!(result.is_ok());
        let extractions = result.unwrap();
        assert_eq!(extractions.len(), 1);
        assert_eq!(extractions[0].extraction_class, "name");
    }

    #[test]
    fn test_parse_strips_fence() {
        let resolver = create_test_resolver();
        let fenced = "```json\n{\"extractions\": [{\"extraction_class\": \"x\", \"extraction_text\": \"y\"}]}\n```";

        let result = resolver.parse_response(fenced);
        assert!(result.is_ok());
        assert_eq!(result.unwrap().len(), 1);
    }

    #[test]
    fn test_parse_drops_element_missing_required_field() {
        let resolver = create_test_resolver();
        let json_response = r#"{"extractions": [
            {"extraction_class": "person"},
            {"extraction_class": "age", "extraction_text": "30"}
        ]}"#;

        let result = resolver.parse_response(json_response);
        assert!(result.is_ok());
        let extractions = result.unwrap();
        assert_eq!(extractions.len(), 1);
        assert_eq!(extractions[0].extraction_class, "age");
    }

    #[test]
    fn test_parse_drops_element_with_empty_extraction_text() {
        let resolver = create_test_resolver();
        let json_response = r#"{"extractions": [
            {"extraction_class": "person", "extraction_text": "  "},
            {"extraction_class": "age", "extraction_text": "30"}
        ]}"#;

        let result = resolver.parse_response(json_response);
        assert!(result.is_ok());
        let extractions = result.unwrap();
        assert_eq!(extractions.len(), 1);
        assert_eq!(extractions[0].extraction_class, "age");
    }

    #[test]
    fn test_parse_all_elements_malformed_yields_empty_not_error() {
        let resolver = create_test_resolver();
        let json_response = r#"{"extractions": [{"extraction_class": "person"}]}"#;

        let result = resolver.parse_response(json_response);
        assert!(result.is_ok());
        assert!(result.unwrap().is_empty());
    }

    #[test]
    fn test_parse_invalid_json() {
        let resolver = create_test_resolver();
        let invalid_response = r#"This is not JSON at all!"#;

        let result = resolver.parse_response(invalid_response);
        assert!(result.is_err());
    }

    #[test]
    fn test_validation_required_fields() {
        let resolver = create_test_resolver();
        let extractions = vec![Extraction::new("person".to_string(), "John".to_string())];
        let expected_fields = vec!["person".to_string(), "age".to_string()];

        let result = resolver.validate_extractions(&extractions, &expected_fields);
        assert!(result.is_valid);

        let config = create_test_config();
        let validation_config = ValidationConfig {
            require_all_fields: true,
            save_raw_outputs: false,
            ..Default::default()
        };
        let resolver = Resolver::with_validation_config(&config, true, validation_config).unwrap();
        let result = resolver.validate_extractions(&extractions, &expected_fields);
        assert!(!result.is_valid);
        assert_eq!(result.errors.len(), 1);
        assert!(result.errors[0].message.contains("age"));
    }

    #[test]
    fn test_validation_empty_extractions() {
        let resolver = create_test_resolver();
        let extractions = vec![
            Extraction::new("person".to_string(), "".to_string()),
            Extraction::new("age".to_string(), "25".to_string()),
        ];
        let expected_fields = vec!["person".to_string(), "age".to_string()];

        let result = resolver.validate_extractions(&extractions, &expected_fields);
        assert!(result.is_valid);
        assert_eq!(result.warnings.len(), 1);
        assert!(result.warnings[0].message.contains("Empty extraction text"));
    }

    #[test]
    fn test_validation_low_extraction_count() {
        let resolver = create_test_resolver();
        let extractions = vec![Extraction::new("person".to_string(), "John".to_string())];
        let expected_fields = vec![
            "person".to_string(),
            "age".to_string(),
            "city".to_string(),
            "email".to_string(),
        ];

        let result = resolver.validate_extractions(&extractions, &expected_fields);
        assert!(result.is_valid);
        assert!(!result.warnings.is_empty());
        assert!(result
            .warnings
            .iter()
            .any(|w| w.message.contains("Low extraction count")));
    }

    #[test]
    fn test_validate_and_parse_success() {
        let temp_dir = TempDir::new().unwrap();
        let resolver = create_test_resolver_with_temp_dir(&temp_dir);

        let valid_json = r#"{"extractions": [
            {"extraction_class": "person", "extraction_text": "John Doe"},
            {"extraction_class": "age", "extraction_text": "30"}
        ]}"#;
        let expected_fields = vec!["person".to_string(), "age".to_string()];

        let result = resolver.validate_and_parse(valid_json, &expected_fields);
        assert!(result.is_ok());

        let (extractions, validation_result) = result.unwrap();
        assert_eq!(extractions.len(), 2);
        assert!(validation_result.is_valid);
        assert!(validation_result.raw_output_file.is_some());

        let raw_file = validation_result.raw_output_file.unwrap();
        assert!(std::path::Path::new(&raw_file).exists());
    }

    #[test]
    fn test_validate_and_parse_parse_failure() {
        let temp_dir = TempDir::new().unwrap();
        let resolver = create_test_resolver_with_temp_dir(&temp_dir);

        let invalid_json = "This is definitely not JSON!";
        let expected_fields = vec!["person".to_string()];

        let result = resolver.validate_and_parse(invalid_json, &expected_fields);
        assert!(result.is_err());
    }
}
