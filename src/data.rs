//! Core data model: intervals, alignment quality, extractions and documents.

use std::collections::HashMap;
use std::fmt;
use std::hash::{Hash, Hasher};

use serde::{Deserialize, Serialize};

use crate::interval::HalfOpenRange;

/// A half-open character span `[start_pos, end_pos)` into the source text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CharInterval {
    pub start_pos: Option<usize>,
    pub end_pos: Option<usize>,
}

impl CharInterval {
    pub fn new(start_pos: usize, end_pos: usize) -> Self {
        Self {
            start_pos: Some(start_pos),
            end_pos: Some(end_pos),
        }
    }

    pub fn length(&self) -> Option<usize> {
        match (self.start_pos, self.end_pos) {
            (Some(s), Some(e)) => Some(e.saturating_sub(s)),
            _ => None,
        }
    }

    fn as_range(&self) -> Option<(usize, usize)> {
        match (self.start_pos, self.end_pos) {
            (Some(s), Some(e)) => Some((s, e)),
            _ => None,
        }
    }

    pub fn contains(&self, other: &CharInterval) -> bool {
        match (self.as_range(), other.as_range()) {
            (Some(a), Some(b)) => RangeImpl(a).contains_range(&RangeImpl(b)),
            _ => false,
        }
    }

    pub fn overlaps_with(&self, other: &CharInterval) -> bool {
        match (self.as_range(), other.as_range()) {
            (Some(a), Some(b)) => RangeImpl(a).overlaps(&RangeImpl(b)),
            _ => false,
        }
    }

    pub fn union(&self, other: &CharInterval) -> Option<CharInterval> {
        match (self.as_range(), other.as_range()) {
            (Some(a), Some(b)) => {
                let (s, e) = crate::interval::union(a, b);
                Some(CharInterval::new(s, e))
            }
            _ => None,
        }
    }

    pub fn intersection(&self, other: &CharInterval) -> Option<CharInterval> {
        match (self.as_range(), other.as_range()) {
            (Some(a), Some(b)) => {
                crate::interval::intersection(a, b).map(|(s, e)| CharInterval::new(s, e))
            }
            _ => None,
        }
    }
}

/// A half-open token span `[start_token, end_token)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenInterval {
    pub start_token: usize,
    pub end_token: usize,
}

impl TokenInterval {
    pub fn new(start_token: usize, end_token: usize) -> Self {
        Self {
            start_token,
            end_token,
        }
    }

    pub fn length(&self) -> usize {
        self.end_token.saturating_sub(self.start_token)
    }

    pub fn contains(&self, other: &TokenInterval) -> bool {
        RangeImpl((self.start_token, self.end_token))
            .contains_range(&RangeImpl((other.start_token, other.end_token)))
    }

    pub fn overlaps_with(&self, other: &TokenInterval) -> bool {
        RangeImpl((self.start_token, self.end_token))
            .overlaps(&RangeImpl((other.start_token, other.end_token)))
    }

    pub fn union(&self, other: &TokenInterval) -> TokenInterval {
        let (s, e) = crate::interval::union(
            (self.start_token, self.end_token),
            (other.start_token, other.end_token),
        );
        TokenInterval::new(s, e)
    }

    pub fn intersection(&self, other: &TokenInterval) -> Option<TokenInterval> {
        crate::interval::intersection(
            (self.start_token, self.end_token),
            (other.start_token, other.end_token),
        )
        .map(|(s, e)| TokenInterval::new(s, e))
    }
}

struct RangeImpl(pub (usize, usize));
impl HalfOpenRange for RangeImpl {
    fn start(&self) -> usize {
        self.0 .0
    }
    fn end(&self) -> usize {
        self.0 .1
    }
}

/// Ordered alignment quality label, `none < approximate < partial < semantic
/// < fuzzy < exact`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AlignmentQuality {
    None,
    Approximate,
    Partial,
    Semantic,
    Fuzzy,
    Exact,
}

impl AlignmentQuality {
    /// Nominal score used for ordering and display (0/20/40/60/80/100).
    pub fn quality_score(&self) -> u8 {
        match self {
            AlignmentQuality::None => 0,
            AlignmentQuality::Approximate => 20,
            AlignmentQuality::Partial => 40,
            AlignmentQuality::Semantic => 60,
            AlignmentQuality::Fuzzy => 80,
            AlignmentQuality::Exact => 100,
        }
    }
}

impl fmt::Display for AlignmentQuality {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            AlignmentQuality::None => "none",
            AlignmentQuality::Approximate => "approximate",
            AlignmentQuality::Partial => "partial",
            AlignmentQuality::Semantic => "semantic",
            AlignmentQuality::Fuzzy => "fuzzy",
            AlignmentQuality::Exact => "exact",
        };
        write!(f, "{}", s)
    }
}

impl Default for AlignmentQuality {
    fn default() -> Self {
        AlignmentQuality::None
    }
}

/// Result produced by an [`crate::alignment::Aligner`] for a single
/// extraction-text-to-source-span attempt.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AlignmentResult {
    pub quality: AlignmentQuality,
    pub confidence: f32,
    pub score: f32,
    pub method: String,
}

impl AlignmentResult {
    pub fn new(quality: AlignmentQuality, confidence: f32, score: f32, method: impl Into<String>) -> Self {
        Self {
            quality,
            confidence: confidence.clamp(0.0, 1.0),
            score,
            method: method.into(),
        }
    }

    pub fn none() -> Self {
        Self {
            quality: AlignmentQuality::None,
            confidence: 0.0,
            score: 0.0,
            method: "unaligned".to_string(),
        }
    }

    /// `quality >= semantic (60) AND confidence >= 0.7`.
    pub fn is_well_grounded(&self) -> bool {
        self.quality.quality_score() >= 60 && self.confidence >= 0.7
    }
}

/// A single extracted span with its class, grounded text and metadata.
///
/// Immutable after installation into an [`AnnotatedDocument`]: callers build
/// it up with the setter methods, then it is treated as read-only once
/// attached.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Extraction {
    pub extraction_class: String,
    pub extraction_text: String,
    pub char_interval: Option<CharInterval>,
    #[serde(skip)]
    pub token_interval: Option<TokenInterval>,
    pub alignment_quality: AlignmentQuality,
    pub alignment_confidence: f32,
    /// Which chunk of the source document this extraction came from.
    pub chunk_index: Option<usize>,
    pub group_index: Option<usize>,
    pub extraction_index: Option<usize>,
    pub description: Option<String>,
    pub attributes: Option<HashMap<String, serde_json::Value>>,
}

impl Extraction {
    pub fn new(extraction_class: String, extraction_text: String) -> Self {
        Self {
            extraction_class,
            extraction_text,
            char_interval: None,
            token_interval: None,
            alignment_quality: AlignmentQuality::None,
            alignment_confidence: 0.0,
            chunk_index: None,
            group_index: None,
            extraction_index: None,
            description: None,
            attributes: None,
        }
    }

    pub fn with_char_interval(mut self, interval: CharInterval) -> Self {
        self.char_interval = Some(interval);
        self
    }

    pub fn set_char_interval(&mut self, interval: CharInterval) {
        self.char_interval = Some(interval);
    }

    pub fn set_alignment(&mut self, result: &AlignmentResult) {
        self.alignment_quality = result.quality;
        self.alignment_confidence = result.confidence;
    }

    pub fn set_attribute(&mut self, key: String, value: serde_json::Value) {
        self.attributes
            .get_or_insert_with(HashMap::new)
            .insert(key, value);
    }

    pub fn get_attribute(&self, key: &str) -> Option<&serde_json::Value> {
        self.attributes.as_ref().and_then(|a| a.get(key))
    }

    pub fn is_well_grounded(&self) -> bool {
        self.alignment_quality.quality_score() >= 60 && self.alignment_confidence >= 0.7
    }

    pub fn overlaps_with(&self, other: &Extraction) -> bool {
        match (&self.char_interval, &other.char_interval) {
            (Some(a), Some(b)) => a.overlaps_with(b),
            _ => false,
        }
    }
}

/// A source document plus any additional context passed to the model.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Document {
    pub text: String,
    pub additional_context: Option<String>,
    pub document_id: Option<String>,
}

impl Document {
    pub fn new(text: String) -> Self {
        Self {
            text,
            additional_context: None,
            document_id: None,
        }
    }

    pub fn with_additional_context(mut self, context: String) -> Self {
        self.additional_context = Some(context);
        self
    }

    /// Deterministic id derived from `(text, additional_context)` so that
    /// re-processing the same source always yields the same document id.
    pub fn get_document_id(&mut self) -> String {
        if let Some(id) = &self.document_id {
            return id.clone();
        }
        let id = document_id_for(&self.text, self.additional_context.as_deref());
        self.document_id = Some(id.clone());
        id
    }
}

/// Deterministic document id: `doc_<16 hex chars>` from a stable hash of the
/// text and any additional context.
pub fn document_id_for(text: &str, additional_context: Option<&str>) -> String {
    let mut hasher = std::collections::hash_map::DefaultHasher::new();
    text.hash(&mut hasher);
    additional_context.unwrap_or("").hash(&mut hasher);
    format!("doc_{:016x}", hasher.finish())
}

/// Summary statistics attached to an [`AnnotatedDocument`].
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DocumentStats {
    pub total_extractions: usize,
    pub well_grounded_count: usize,
    pub classes: HashMap<String, usize>,
}

/// The final extraction result for a document: source text plus every
/// extraction found, in deterministic order.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnnotatedDocument {
    pub document_id: Option<String>,
    pub extractions: Option<Vec<Extraction>>,
    pub text: Option<String>,
    #[serde(default)]
    pub stats: DocumentStats,
}

impl AnnotatedDocument {
    pub fn new(text: String) -> Self {
        Self {
            document_id: None,
            extractions: None,
            text: Some(text),
            stats: DocumentStats::default(),
        }
    }

    pub fn add_extraction(&mut self, extraction: Extraction) {
        let is_grounded = extraction.is_well_grounded();
        let class = extraction.extraction_class.clone();
        self.extractions
            .get_or_insert_with(Vec::new)
            .push(extraction);
        self.stats.total_extractions += 1;
        if is_grounded {
            self.stats.well_grounded_count += 1;
        }
        *self.stats.classes.entry(class).or_insert(0) += 1;
    }

    pub fn extraction_count(&self) -> usize {
        self.extractions.as_ref().map_or(0, |e| e.len())
    }

    pub fn extractions_by_class(&self, class: &str) -> Vec<&Extraction> {
        self.extractions
            .as_ref()
            .map(|exts| exts.iter().filter(|e| e.extraction_class == class).collect())
            .unwrap_or_default()
    }

    /// Sorts extractions into the deterministic ordering required by the
    /// multi-pass coordinator: `(chunk_index, group_index, extraction_index)`.
    pub fn sort_deterministic(&mut self) {
        if let Some(exts) = &mut self.extractions {
            exts.sort_by_key(|e| (e.chunk_index.unwrap_or(0), e.group_index.unwrap_or(0), e.extraction_index.unwrap_or(0)));
        }
    }
}

/// Output serialization format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FormatType {
    Json,
    Yaml,
}

impl fmt::Display for FormatType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FormatType::Json => write!(f, "json"),
            FormatType::Yaml => write!(f, "yaml"),
        }
    }
}

impl std::str::FromStr for FormatType {
    type Err = crate::exceptions::LangExtractError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "json" => Ok(FormatType::Json),
            "yaml" | "yml" => Ok(FormatType::Yaml),
            other => Err(crate::exceptions::LangExtractError::invalid_input(format!(
                "Unknown format type: {}",
                other
            ))),
        }
    }
}

/// A single few-shot example: source text plus the extractions it should
/// produce.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExampleData {
    pub text: String,
    pub extractions: Vec<Extraction>,
}

impl ExampleData {
    pub fn new(text: String, extractions: Vec<Extraction>) -> Self {
        Self { text, extractions }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn char_interval_overlap_and_length() {
        let a = CharInterval::new(0, 10);
        let b = CharInterval::new(5, 15);
        assert!(a.overlaps_with(&b));
        assert_eq!(a.length(), Some(10));
        assert_eq!(a.intersection(&b), Some(CharInterval::new(5, 10)));
        assert_eq!(a.union(&b), Some(CharInterval::new(0, 15)));
    }

    #[test]
    fn token_interval_contains() {
        let outer = TokenInterval::new(0, 10);
        let inner = TokenInterval::new(2, 5);
        assert!(outer.contains(&inner));
        assert!(!inner.contains(&outer));
    }

    #[test]
    fn alignment_quality_ordering() {
        assert!(AlignmentQuality::Exact > AlignmentQuality::Fuzzy);
        assert!(AlignmentQuality::Fuzzy > AlignmentQuality::Semantic);
        assert!(AlignmentQuality::Semantic > AlignmentQuality::Partial);
        assert!(AlignmentQuality::Partial > AlignmentQuality::Approximate);
        assert!(AlignmentQuality::Approximate > AlignmentQuality::None);
        assert_eq!(AlignmentQuality::Exact.quality_score(), 100);
    }

    #[test]
    fn alignment_result_well_grounded_gate() {
        let grounded = AlignmentResult::new(AlignmentQuality::Semantic, 0.7, 0.9, "exact");
        assert!(grounded.is_well_grounded());

        let low_confidence = AlignmentResult::new(AlignmentQuality::Exact, 0.5, 0.9, "exact");
        assert!(!low_confidence.is_well_grounded());

        let low_quality = AlignmentResult::new(AlignmentQuality::Partial, 0.9, 0.9, "fuzzy");
        assert!(!low_quality.is_well_grounded());
    }

    #[test]
    fn extraction_creation_and_attributes() {
        let mut extraction = Extraction::new("person".to_string(), "John Doe".to_string());
        extraction.set_attribute("role".to_string(), serde_json::json!("engineer"));
        assert_eq!(
            extraction.get_attribute("role"),
            Some(&serde_json::json!("engineer"))
        );
        assert!(!extraction.is_well_grounded());
    }

    #[test]
    fn extraction_overlap() {
        let mut a = Extraction::new("x".to_string(), "foo".to_string());
        a.set_char_interval(CharInterval::new(0, 5));
        let mut b = Extraction::new("y".to_string(), "bar".to_string());
        b.set_char_interval(CharInterval::new(3, 8));
        assert!(a.overlaps_with(&b));
    }

    #[test]
    fn document_id_is_deterministic() {
        let mut doc1 = Document::new("hello world".to_string());
        let mut doc2 = Document::new("hello world".to_string());
        assert_eq!(doc1.get_document_id(), doc2.get_document_id());

        let mut doc3 = Document::new("different text".to_string());
        assert_ne!(doc1.get_document_id(), doc3.get_document_id());
    }

    #[test]
    fn document_id_distinguishes_additional_context() {
        let mut with_ctx = Document::new("hello".to_string()).with_additional_context("ctx".to_string());
        let mut without_ctx = Document::new("hello".to_string());
        assert_ne!(with_ctx.get_document_id(), without_ctx.get_document_id());
    }

    #[test]
    fn annotated_document_stats() {
        let mut doc = AnnotatedDocument::new("hello world".to_string());
        let mut e = Extraction::new("greeting".to_string(), "hello".to_string());
        e.alignment_quality = AlignmentQuality::Exact;
        e.alignment_confidence = 0.9;
        doc.add_extraction(e);
        assert_eq!(doc.extraction_count(), 1);
        assert_eq!(doc.stats.well_grounded_count, 1);
        assert_eq!(doc.extractions_by_class("greeting").len(), 1);
    }

    #[test]
    fn format_type_roundtrip() {
        use std::str::FromStr;
        assert_eq!(FormatType::from_str("json").unwrap(), FormatType::Json);
        assert_eq!(FormatType::from_str("YAML").unwrap(), FormatType::Yaml);
        assert!(FormatType::from_str("xml").is_err());
        assert_eq!(FormatType::Json.to_string(), "json");
    }

    #[test]
    fn example_data_serialization_roundtrip() {
        let example = ExampleData::new(
            "John Doe is 30".to_string(),
            vec![Extraction::new("person".to_string(), "John Doe".to_string())],
        );
        let json = serde_json::to_string(&example).unwrap();
        let back: ExampleData = serde_json::from_str(&json).unwrap();
        assert_eq!(back.text, example.text);
        assert_eq!(back.extractions.len(), 1);
    }
}
