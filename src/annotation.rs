//! Single-unit text annotation: prompt → infer → parse → validate → align.
//!
//! `Annotator` processes one piece of text (a whole document small enough to
//! fit in one request, or a single chunk) and returns its extractions with
//! char intervals local to that text. Chunking, multi-pass scheduling and
//! chunk-offset translation live in `multipass.rs`, which drives many
//! `Annotator` calls concurrently.

use crate::{
    alignment::{AlignmentOptions, TextAligner},
    data::{Extraction, FormatType},
    exceptions::LangExtractResult,
    inference::BaseLanguageModel,
    prompting::PromptTemplateStructured,
    resolver::Resolver,
};
use std::collections::HashMap;

/// Outcome of annotating one unit of text.
#[derive(Debug, Clone)]
pub struct AnnotationOutcome {
    pub extractions: Vec<Extraction>,
    pub aligned_count: usize,
    pub raw_output_file: Option<String>,
}

/// Drives a single language model through the prompt/infer/parse/align flow
/// for one unit of text.
pub struct Annotator {
    language_model: Box<dyn BaseLanguageModel>,
    prompt_template: PromptTemplateStructured,
    format_type: FormatType,
    fence_output: bool,
}

impl Annotator {
    pub fn new(
        language_model: Box<dyn BaseLanguageModel>,
        prompt_template: PromptTemplateStructured,
        format_type: FormatType,
        fence_output: bool,
    ) -> Self {
        Self {
            language_model,
            prompt_template,
            format_type,
            fence_output,
        }
    }

    pub fn format_type(&self) -> FormatType {
        self.format_type
    }

    pub fn fence_output(&self) -> bool {
        self.fence_output
    }

    pub fn model_id(&self) -> &str {
        self.language_model.model_id()
    }

    /// Annotate one unit of text: build the prompt, call the model, parse
    /// and validate the response, then align every extraction against
    /// `text`. Intervals in the result are local to `text` — translating
    /// them to document-global offsets is the caller's job when `text` is a
    /// chunk.
    pub async fn annotate_unit(
        &self,
        text: &str,
        resolver: &Resolver,
        additional_context: Option<&str>,
        debug: bool,
    ) -> LangExtractResult<AnnotationOutcome> {
        self.annotate_unit_with_alignment(text, resolver, additional_context, debug, true)
            .await
    }

    /// Same as [`Annotator::annotate_unit`], but lets the caller skip the
    /// alignment pass entirely (the multi-pass coordinator's `enable_alignment`
    /// flag). Skipped extractions keep `alignment_quality: None` and no
    /// char interval.
    pub async fn annotate_unit_with_alignment(
        &self,
        text: &str,
        resolver: &Resolver,
        additional_context: Option<&str>,
        debug: bool,
        align: bool,
    ) -> LangExtractResult<AnnotationOutcome> {
        let prompt = self.build_prompt(text, additional_context)?;

        if debug {
            log::debug!(
                "calling {} model {} ({} chars input)",
                self.language_model.provider_name(),
                self.language_model.model_id(),
                text.len()
            );
        }

        let mut kwargs = HashMap::new();
        kwargs.insert("temperature".to_string(), serde_json::json!(0.2));
        kwargs.insert("max_tokens".to_string(), serde_json::json!(1000));

        let outputs = self.language_model.infer_single(&prompt, &kwargs).await?;
        let response_text = outputs.first().map(|o| o.text()).unwrap_or("");

        let expected_fields: Vec<String> = self
            .prompt_template
            .examples
            .iter()
            .flat_map(|example| example.extractions.iter())
            .map(|extraction| extraction.extraction_class.clone())
            .collect::<std::collections::HashSet<_>>()
            .into_iter()
            .collect();

        let (mut extractions, validation_result) = match resolver.validate_and_parse(response_text, &expected_fields) {
            Ok(parsed) => parsed,
            Err(e) => {
                if debug {
                    log::debug!("failed to parse model response as structured data: {}", e);
                }
                let fallback = Extraction::new("raw_response".to_string(), response_text.to_string());
                return Ok(AnnotationOutcome {
                    extractions: vec![fallback],
                    aligned_count: 0,
                    raw_output_file: None,
                });
            }
        };

        if debug {
            for warning in &validation_result.warnings {
                log::debug!("validation warning: {}", warning.message);
            }
        }

        if !align {
            return Ok(AnnotationOutcome {
                aligned_count: 0,
                extractions,
                raw_output_file: validation_result.raw_output_file,
            });
        }

        let aligner = TextAligner::new(AlignmentOptions::default());
        let stats = aligner.align_extractions(&mut extractions, text).await?;

        Ok(AnnotationOutcome {
            extractions,
            aligned_count: stats.total - stats.unaligned,
            raw_output_file: validation_result.raw_output_file,
        })
    }

    fn build_prompt(&self, text: &str, additional_context: Option<&str>) -> LangExtractResult<String> {
        self.prompt_template.render(text, additional_context)
    }
}
