//! Text chunking functionality for processing large documents.
//!
//! Supports three strategies: `Simple` (paragraph/sentence/fixed-window),
//! `Semantic` (boundary classes scored by priority) and `Adaptive` (chunk
//! size scaled to a text-complexity estimate).

use std::collections::HashSet;

use regex::Regex;
use tokio_util::sync::CancellationToken;

use crate::{
    data::{AnnotatedDocument, CharInterval, Document, Extraction},
    exceptions::LangExtractResult,
    tokenizer::Tokenizer,
};

/// Number of loop iterations between cancellation checks in long scans.
const CANCELLATION_CHECK_INTERVAL: usize = 100;

/// Different strategies for chunking text.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChunkingStrategy {
    /// Paragraph/sentence/fixed-window chunking, governed by
    /// `respect_paragraphs`/`respect_sentences`.
    Simple,
    /// Boundary-class scan with header/paragraph/transition/sentence
    /// priorities and forced/preferred split thresholds.
    Semantic,
    /// Chunk size scaled by an estimated text-complexity score.
    Adaptive,
}

/// A semantic boundary class, ordered by splitting priority.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum BoundaryClass {
    Header,
    Paragraph,
    Transition,
    Sentence,
}

impl BoundaryClass {
    fn priority(&self) -> f32 {
        match self {
            BoundaryClass::Header => 1.0,
            BoundaryClass::Paragraph => 0.9,
            BoundaryClass::Transition => 0.8,
            BoundaryClass::Sentence => 0.6,
        }
    }
}

struct Boundary {
    pos: usize,
    class: BoundaryClass,
}

/// A chunk of text with metadata.
#[derive(Debug, Clone)]
pub struct TextChunk {
    pub id: usize,
    pub text: String,
    pub char_offset: usize,
    pub char_length: usize,
    pub document_id: Option<String>,
    pub has_overlap: bool,
    pub overlap_info: Option<(usize, usize)>,
    /// Index of this chunk among the document's chunks.
    pub chunk_index: usize,
    /// Total number of chunks the document was split into.
    pub total_chunks: usize,
}

impl TextChunk {
    pub fn new(id: usize, text: String, char_offset: usize, document_id: Option<String>) -> Self {
        let char_length = text.len();
        Self {
            id,
            text,
            char_offset,
            char_length,
            document_id,
            has_overlap: false,
            overlap_info: None,
            chunk_index: id,
            total_chunks: 1,
        }
    }

    pub fn with_overlap(
        id: usize,
        text: String,
        char_offset: usize,
        document_id: Option<String>,
        overlap_start: usize,
        overlap_end: usize,
    ) -> Self {
        let char_length = text.len();
        Self {
            id,
            text,
            char_offset,
            char_length,
            document_id,
            has_overlap: overlap_start > 0 || overlap_end > 0,
            overlap_info: Some((overlap_start, overlap_end)),
            chunk_index: id,
            total_chunks: 1,
        }
    }

    pub fn char_interval(&self) -> CharInterval {
        CharInterval::new(self.char_offset, self.char_offset + self.char_length)
    }

    /// Text without the overlap regions shared with adjacent chunks.
    pub fn core_text(&self) -> &str {
        if let Some((start_overlap, end_overlap)) = self.overlap_info {
            let start = start_overlap;
            let end = self.text.len().saturating_sub(end_overlap);
            &self.text[start..end]
        } else {
            &self.text
        }
    }
}

fn set_total_chunks(chunks: &mut [TextChunk]) {
    let total = chunks.len();
    for (idx, chunk) in chunks.iter_mut().enumerate() {
        chunk.chunk_index = idx;
        chunk.total_chunks = total;
    }
}

/// Configuration for text chunking.
#[derive(Debug, Clone)]
pub struct ChunkingConfig {
    pub max_chunk_size: usize,
    pub overlap_size: usize,
    pub strategy: ChunkingStrategy,
    pub min_chunk_size: usize,
    pub respect_paragraphs: bool,
    pub respect_sentences: bool,
    /// Fraction of `max_chunk_size` at which a semantic boundary is
    /// preferred over continuing to scan (0.8 per spec).
    pub preferred_split_fraction: f32,
}

impl ChunkingConfig {
    /// Rejects configurations the chunker cannot honor: the overlap must be
    /// a proper fraction of the chunk size, never half or more of it (an
    /// overlap that large would leave no core text behind).
    pub fn validate(&self) -> LangExtractResult<()> {
        if self.max_chunk_size == 0 {
            return Err(crate::exceptions::LangExtractError::invalid_input("max_chunk_size must be greater than zero"));
        }
        let overlap_ratio = self.overlap_size as f32 / self.max_chunk_size as f32;
        if !(0.0..0.5).contains(&overlap_ratio) {
            return Err(crate::exceptions::LangExtractError::invalid_input(format!(
                "overlap_size / max_chunk_size must be in [0, 0.5), got {:.3}",
                overlap_ratio
            )));
        }
        Ok(())
    }
}

impl Default for ChunkingConfig {
    fn default() -> Self {
        Self {
            max_chunk_size: 2000,
            overlap_size: 200,
            strategy: ChunkingStrategy::Adaptive,
            min_chunk_size: 100,
            respect_paragraphs: true,
            respect_sentences: true,
            preferred_split_fraction: 0.8,
        }
    }
}

/// Text chunker for processing large documents.
pub struct TextChunker {
    config: ChunkingConfig,
    sentence_regex: Regex,
    paragraph_regex: Regex,
    header_regex: Regex,
    transition_regex: Regex,
}

impl TextChunker {
    pub fn new() -> Self {
        Self::with_config(ChunkingConfig::default())
    }

    pub fn with_config(config: ChunkingConfig) -> Self {
        let sentence_regex = Regex::new(r"[.!?]+\s+").unwrap();
        let paragraph_regex = Regex::new(r"\n\s*\n").unwrap();
        let header_regex = Regex::new(r"(?m)^(#{1,6}\s|[A-Z][A-Za-z0-9 ]{0,60}\n[-=]{3,}\s*$)").unwrap();
        let transition_regex =
            Regex::new(r"(?i)\b(however|therefore|moreover|furthermore|meanwhile|nevertheless|in conclusion|in summary)\b").unwrap();

        Self {
            config,
            sentence_regex,
            paragraph_regex,
            header_regex,
            transition_regex,
        }
    }

    pub fn config(&self) -> &ChunkingConfig {
        &self.config
    }

    pub fn chunk_document(&self, document: &Document) -> LangExtractResult<Vec<TextChunk>> {
        self.chunk_text(&document.text, document.document_id.clone())
    }

    pub fn chunk_text(
        &self,
        text: &str,
        document_id: Option<String>,
    ) -> LangExtractResult<Vec<TextChunk>> {
        self.chunk_text_cancellable(text, document_id, None)
    }

    pub fn chunk_text_cancellable(
        &self,
        text: &str,
        document_id: Option<String>,
        cancellation: Option<&CancellationToken>,
    ) -> LangExtractResult<Vec<TextChunk>> {
        self.config.validate()?;
        if text.len() <= self.config.max_chunk_size {
            return Ok(vec![TextChunk::new(0, text.to_string(), 0, document_id)]);
        }

        let mut chunks = match self.config.strategy {
            ChunkingStrategy::Simple => self.chunk_simple(text, document_id, cancellation)?,
            ChunkingStrategy::Semantic => self.chunk_semantic(text, document_id, cancellation)?,
            ChunkingStrategy::Adaptive => self.chunk_adaptive(text, document_id, cancellation)?,
        };
        set_total_chunks(&mut chunks);
        Ok(chunks)
    }

    /// Paragraph/sentence/fixed-window chunking.
    fn chunk_simple(
        &self,
        text: &str,
        document_id: Option<String>,
        cancellation: Option<&CancellationToken>,
    ) -> LangExtractResult<Vec<TextChunk>> {
        if self.config.respect_paragraphs {
            let boundaries = self.find_paragraph_boundaries(text, cancellation);
            if let Ok(chunks) = self.chunk_by_boundaries(text, &boundaries, document_id.clone()) {
                if chunks.iter().all(|c| c.char_length <= self.config.max_chunk_size) {
                    return Ok(chunks);
                }
            }
        }
        if self.config.respect_sentences {
            let boundaries = self.find_sentence_boundaries(text, cancellation);
            if let Ok(chunks) = self.chunk_by_boundaries(text, &boundaries, document_id.clone()) {
                if chunks.iter().all(|c| c.char_length <= self.config.max_chunk_size) {
                    return Ok(chunks);
                }
            }
        }
        self.chunk_fixed_size(text, document_id)
    }

    /// Scans for boundaries of all classes, splitting at the forced
    /// threshold (100% of `max_chunk_size`) and preferring the
    /// highest-priority boundary seen past the preferred threshold.
    fn chunk_semantic(
        &self,
        text: &str,
        document_id: Option<String>,
        cancellation: Option<&CancellationToken>,
    ) -> LangExtractResult<Vec<TextChunk>> {
        let boundaries = self.find_semantic_boundaries(text, cancellation);
        let sentence_boundaries = self.find_sentence_boundaries(text, cancellation);
        let forced = self.config.max_chunk_size;
        let preferred = (self.config.max_chunk_size as f32 * self.config.preferred_split_fraction) as usize;
        let overlap_size = self.config.overlap_size;

        let mut chunks = Vec::new();
        let mut chunk_id = 0;
        let mut current_start = 0;
        let mut i = 0;

        while current_start < text.len() {
            if i % CANCELLATION_CHECK_INTERVAL == 0 {
                if let Some(token) = cancellation {
                    if token.is_cancelled() {
                        break;
                    }
                }
            }
            i += 1;

            let remaining = text.len() - current_start;
            let split_at = if remaining <= forced {
                text.len()
            } else {
                // Prefer the highest-priority boundary within [preferred, forced]
                // measured from current_start.
                let window_start = current_start + preferred;
                let window_end = current_start + forced;
                let candidate = boundaries
                    .iter()
                    .filter(|b| b.pos > current_start && b.pos >= window_start && b.pos <= window_end)
                    .max_by(|a, b| a.class.priority().partial_cmp(&b.class.priority()).unwrap());

                match candidate {
                    Some(b) => b.pos,
                    None => {
                        // No boundary in the preferred window; force split, but
                        // prefer any boundary before the forced limit if present.
                        boundaries
                            .iter()
                            .filter(|b| b.pos > current_start && b.pos <= window_end)
                            .map(|b| b.pos)
                            .max()
                            .unwrap_or(window_end)
                    }
                }
            };

            // Extend the chunk's start back to the previous sentence boundary
            // within the overlap window, so it shares context with its
            // predecessor instead of starting mid-sentence.
            let extended_start = if overlap_size > 0 && current_start > 0 {
                sentence_boundaries
                    .iter()
                    .filter(|&&b| b < current_start && b >= current_start.saturating_sub(overlap_size))
                    .max()
                    .copied()
                    .unwrap_or(current_start)
            } else {
                current_start
            };

            let chunk_text = text[extended_start..split_at].to_string();
            let overlap_start = current_start - extended_start;
            let chunk = if overlap_start > 0 {
                TextChunk::with_overlap(chunk_id, chunk_text, extended_start, document_id.clone(), overlap_start, 0)
            } else {
                TextChunk::new(chunk_id, chunk_text, extended_start, document_id.clone())
            };
            chunks.push(chunk);

            if remaining <= forced {
                break;
            }
            chunk_id += 1;
            current_start = split_at;
        }

        if chunks.is_empty() {
            chunks.push(TextChunk::new(0, text.to_string(), 0, document_id));
        }
        Ok(chunks)
    }

    /// Scales chunk size by an estimated complexity score: simpler text
    /// gets larger chunks, denser text gets smaller ones.
    fn chunk_adaptive(
        &self,
        text: &str,
        document_id: Option<String>,
        cancellation: Option<&CancellationToken>,
    ) -> LangExtractResult<Vec<TextChunk>> {
        let complexity = estimate_complexity(text);
        let scale = complexity_scale(complexity);
        let effective_max = ((self.config.max_chunk_size as f32) * scale).max(self.config.min_chunk_size as f32) as usize;
        let effective_overlap = ((self.config.overlap_size as f32) * scale) as usize;

        let scaled_config = ChunkingConfig {
            max_chunk_size: effective_max,
            overlap_size: effective_overlap,
            ..self.config.clone()
        };
        let scaled_chunker = TextChunker::with_config(scaled_config);
        scaled_chunker.chunk_simple(text, document_id, cancellation)
    }

    fn chunk_fixed_size(
        &self,
        text: &str,
        document_id: Option<String>,
    ) -> LangExtractResult<Vec<TextChunk>> {
        let mut chunks = Vec::new();
        let mut chunk_id = 0;
        let mut current_pos = 0;

        while current_pos < text.len() {
            let chunk_end = std::cmp::min(current_pos + self.config.max_chunk_size, text.len());
            let chunk_text = text[current_pos..chunk_end].to_string();

            let overlap_start = if chunk_id > 0 { self.config.overlap_size } else { 0 };
            let overlap_end = if chunk_end < text.len() { self.config.overlap_size } else { 0 };

            chunks.push(TextChunk::with_overlap(
                chunk_id,
                chunk_text,
                current_pos,
                document_id.clone(),
                overlap_start,
                overlap_end,
            ));
            chunk_id += 1;

            let step_size = self.config.max_chunk_size.saturating_sub(self.config.overlap_size).max(1);
            current_pos += step_size;
        }

        Ok(chunks)
    }

    fn find_sentence_boundaries(&self, text: &str, cancellation: Option<&CancellationToken>) -> Vec<usize> {
        let mut boundaries = vec![0];
        for (i, mat) in self.sentence_regex.find_iter(text).enumerate() {
            if i % CANCELLATION_CHECK_INTERVAL == 0 {
                if let Some(token) = cancellation {
                    if token.is_cancelled() {
                        break;
                    }
                }
            }
            boundaries.push(mat.end());
        }
        if boundaries.last() != Some(&text.len()) {
            boundaries.push(text.len());
        }
        boundaries
    }

    fn find_paragraph_boundaries(&self, text: &str, cancellation: Option<&CancellationToken>) -> Vec<usize> {
        let mut boundaries = vec![0];
        for (i, mat) in self.paragraph_regex.find_iter(text).enumerate() {
            if i % CANCELLATION_CHECK_INTERVAL == 0 {
                if let Some(token) = cancellation {
                    if token.is_cancelled() {
                        break;
                    }
                }
            }
            boundaries.push(mat.end());
        }
        if boundaries.last() != Some(&text.len()) {
            boundaries.push(text.len());
        }
        boundaries
    }

    fn find_semantic_boundaries(&self, text: &str, cancellation: Option<&CancellationToken>) -> Vec<Boundary> {
        let mut boundaries = Vec::new();
        for mat in self.header_regex.find_iter(text) {
            boundaries.push(Boundary {
                pos: mat.start(),
                class: BoundaryClass::Header,
            });
        }
        for (i, mat) in self.paragraph_regex.find_iter(text).enumerate() {
            if i % CANCELLATION_CHECK_INTERVAL == 0 {
                if let Some(token) = cancellation {
                    if token.is_cancelled() {
                        break;
                    }
                }
            }
            boundaries.push(Boundary {
                pos: mat.end(),
                class: BoundaryClass::Paragraph,
            });
        }
        for mat in self.transition_regex.find_iter(text) {
            boundaries.push(Boundary {
                pos: mat.start(),
                class: BoundaryClass::Transition,
            });
        }
        for mat in self.sentence_regex.find_iter(text) {
            boundaries.push(Boundary {
                pos: mat.end(),
                class: BoundaryClass::Sentence,
            });
        }
        boundaries.sort_by_key(|b| b.pos);
        boundaries
    }

    fn chunk_by_boundaries(
        &self,
        text: &str,
        boundaries: &[usize],
        document_id: Option<String>,
    ) -> LangExtractResult<Vec<TextChunk>> {
        let mut chunks = Vec::new();
        let mut chunk_id = 0;
        let mut current_start = 0;

        for &boundary in boundaries.iter().skip(1) {
            let potential_chunk_size = boundary - current_start;

            if potential_chunk_size <= self.config.max_chunk_size {
                if potential_chunk_size >= self.config.min_chunk_size || chunks.is_empty() {
                    let chunk_text = text[current_start..boundary].to_string();
                    chunks.push(TextChunk::new(chunk_id, chunk_text, current_start, document_id.clone()));
                    chunk_id += 1;
                    current_start = boundary;
                }
            } else {
                let section = &text[current_start..boundary];
                let mut section_chunks = self.chunk_fixed_size(section, document_id.clone())?;
                for chunk in &mut section_chunks {
                    chunk.id = chunk_id;
                    chunk.char_offset += current_start;
                    chunk_id += 1;
                }
                chunks.extend(section_chunks);
                current_start = boundary;
            }
        }

        if chunks.is_empty() {
            chunks.push(TextChunk::new(0, text.to_string(), 0, document_id));
        }

        Ok(chunks)
    }
}

impl Default for TextChunker {
    fn default() -> Self {
        Self::new()
    }
}

/// Blended complexity score in `[0, 1]`: words/sentence 25%, syllables/word
/// 20%, unique-word ratio 20%, punctuation density 15%, digit density 10%,
/// structural density 10%.
fn estimate_complexity(text: &str) -> f32 {
    let tokenizer = Tokenizer::new();
    let words = tokenizer.words(text);
    let sentences = tokenizer.sentence_count(text).max(1);

    if words.is_empty() {
        return 0.0;
    }

    let words_per_sentence = words.len() as f32 / sentences as f32;
    let words_per_sentence_score = (words_per_sentence / 30.0).min(1.0);

    let total_syllables: usize = words.iter().map(|w| tokenizer.syllable_count(w)).sum();
    let syllables_per_word = total_syllables as f32 / words.len() as f32;
    let syllables_score = ((syllables_per_word - 1.0) / 3.0).clamp(0.0, 1.0);

    let unique: HashSet<String> = words.iter().map(|w| w.to_lowercase()).collect();
    let unique_ratio = unique.len() as f32 / words.len() as f32;

    let punctuation_count = text.chars().filter(|c| c.is_ascii_punctuation()).count();
    let punctuation_density = (punctuation_count as f32 / text.len().max(1) as f32 * 10.0).min(1.0);

    let digit_count = text.chars().filter(|c| c.is_ascii_digit()).count();
    let digit_density = (digit_count as f32 / text.len().max(1) as f32 * 10.0).min(1.0);

    let structural_markers = text.matches(['#', '*', '-', '|', '\n']).count();
    let structural_density = (structural_markers as f32 / text.len().max(1) as f32 * 20.0).min(1.0);

    0.25 * words_per_sentence_score
        + 0.20 * syllables_score
        + 0.20 * unique_ratio
        + 0.15 * punctuation_density
        + 0.10 * digit_density
        + 0.10 * structural_density
}

/// Maps a `[0, 1]` complexity score to a chunk-size scale factor: simple
/// text (low complexity) gets larger chunks, dense text gets smaller ones.
fn complexity_scale(complexity: f32) -> f32 {
    let c = complexity.clamp(0.0, 1.0);
    if c <= 0.3 {
        1.2
    } else if c <= 0.6 {
        1.0
    } else if c <= 0.8 {
        0.8
    } else {
        0.6
    }
}

/// Combines extractions from multiple chunks into a single annotated
/// document.
pub struct ResultAggregator {
    similarity_threshold: f32,
    merge_overlaps: bool,
}

impl ResultAggregator {
    pub fn new() -> Self {
        Self {
            similarity_threshold: 0.8,
            merge_overlaps: true,
        }
    }

    pub fn with_settings(similarity_threshold: f32, merge_overlaps: bool) -> Self {
        Self {
            similarity_threshold,
            merge_overlaps,
        }
    }

    pub fn aggregate_chunk_results(
        &self,
        chunk_results: Vec<ChunkResult>,
        original_text: String,
        document_id: Option<String>,
    ) -> LangExtractResult<AnnotatedDocument> {
        let mut all_extractions = Vec::new();
        for chunk_result in chunk_results {
            if let Some(extractions) = chunk_result.extractions {
                all_extractions.extend(extractions);
            }
        }

        let deduplicated = if self.merge_overlaps {
            self.deduplicate_extractions(all_extractions)?
        } else {
            all_extractions
        };

        let mut annotated_doc = AnnotatedDocument::new(original_text);
        annotated_doc.document_id = document_id;
        for extraction in deduplicated {
            annotated_doc.add_extraction(extraction);
        }
        annotated_doc.sort_deterministic();

        Ok(annotated_doc)
    }

    fn deduplicate_extractions(&self, extractions: Vec<Extraction>) -> LangExtractResult<Vec<Extraction>> {
        let mut unique_extractions: Vec<Extraction> = Vec::new();
        for extraction in extractions {
            let is_duplicate = unique_extractions
                .iter()
                .any(|existing| self.are_similar_extractions(&extraction, existing));
            if !is_duplicate {
                unique_extractions.push(extraction);
            }
        }
        Ok(unique_extractions)
    }

    fn are_similar_extractions(&self, e1: &Extraction, e2: &Extraction) -> bool {
        if e1.extraction_class == e2.extraction_class {
            let similarity = self.text_similarity(&e1.extraction_text, &e2.extraction_text);
            return similarity >= self.similarity_threshold;
        }

        if let (Some(interval1), Some(interval2)) = (&e1.char_interval, &e2.char_interval) {
            if interval1.overlaps_with(interval2) {
                let similarity = self.text_similarity(&e1.extraction_text, &e2.extraction_text);
                return similarity >= self.similarity_threshold;
            }
        }

        false
    }

    fn text_similarity(&self, text1: &str, text2: &str) -> f32 {
        if text1 == text2 {
            return 1.0;
        }

        let words1: HashSet<&str> = text1.split_whitespace().collect();
        let words2: HashSet<&str> = text2.split_whitespace().collect();

        if words1.is_empty() && words2.is_empty() {
            return 1.0;
        }

        let intersection = words1.intersection(&words2).count();
        let union = words1.union(&words2).count();

        if union == 0 {
            0.0
        } else {
            intersection as f32 / union as f32
        }
    }
}

impl Default for ResultAggregator {
    fn default() -> Self {
        Self::new()
    }
}

/// Result from processing a single chunk.
#[derive(Debug, Clone)]
pub struct ChunkResult {
    pub chunk_id: usize,
    pub extractions: Option<Vec<Extraction>>,
    pub char_offset: usize,
    pub char_length: usize,
    pub success: bool,
    pub error: Option<String>,
    pub processing_time: Option<std::time::Duration>,
}

impl ChunkResult {
    pub fn success(chunk_id: usize, extractions: Vec<Extraction>, char_offset: usize, char_length: usize) -> Self {
        Self {
            chunk_id,
            extractions: Some(extractions),
            char_offset,
            char_length,
            success: true,
            error: None,
            processing_time: None,
        }
    }

    pub fn failure(chunk_id: usize, char_offset: usize, char_length: usize, error: String) -> Self {
        Self {
            chunk_id,
            extractions: None,
            char_offset,
            char_length,
            success: false,
            error: Some(error),
            processing_time: None,
        }
    }

    pub fn with_processing_time(mut self, duration: std::time::Duration) -> Self {
        self.processing_time = Some(duration);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_simple_chunking_respects_max_size() {
        let chunker = TextChunker::with_config(ChunkingConfig {
            max_chunk_size: 20,
            overlap_size: 5,
            strategy: ChunkingStrategy::Simple,
            respect_paragraphs: false,
            respect_sentences: false,
            ..Default::default()
        });

        let text = "This is a test document with some text that needs to be chunked into smaller pieces.";
        let chunks = chunker.chunk_text(text, None).unwrap();

        assert!(chunks.len() > 1);
        for chunk in &chunks {
            assert!(chunk.char_length <= 20);
        }
        assert_eq!(chunks.last().unwrap().total_chunks, chunks.len());
    }

    #[test]
    fn test_semantic_chunking_prefers_paragraph_boundary() {
        let chunker = TextChunker::with_config(ChunkingConfig {
            max_chunk_size: 60,
            overlap_size: 10,
            strategy: ChunkingStrategy::Semantic,
            ..Default::default()
        });

        let text = "First paragraph with some words here.\n\nSecond paragraph also has words in it here.\n\nThird paragraph finishes the document nicely.";
        let chunks = chunker.chunk_text(text, None).unwrap();
        assert!(!chunks.is_empty());
        for chunk in &chunks {
            assert!(chunk.char_length <= 60 || chunk.text.len() == text.len());
        }
    }

    #[test]
    fn test_adaptive_chunking_scales_with_complexity() {
        let chunker = TextChunker::with_config(ChunkingConfig {
            strategy: ChunkingStrategy::Adaptive,
            max_chunk_size: 200,
            overlap_size: 20,
            ..Default::default()
        });

        let simple_text = "The cat sat. The dog ran. The bird flew. ".repeat(10);
        let complex_text = "Notwithstanding the aforementioned stipulations, 123.45% quantification necessitates multifaceted interdisciplinary recalibration; consequently, heterogeneous methodologies proliferate. ".repeat(5);

        let simple_chunks = chunker.chunk_text(&simple_text, None).unwrap();
        let complex_chunks = chunker.chunk_text(&complex_text, None).unwrap();

        assert!(!simple_chunks.is_empty());
        assert!(!complex_chunks.is_empty());
    }

    #[test]
    fn test_small_text_no_chunking() {
        let chunker = TextChunker::new();
        let text = "Short text.";
        let chunks = chunker.chunk_text(text, None).unwrap();

        assert_eq!(chunks.len(), 1);
        assert_eq!(chunks[0].text, text);
    }

    #[test]
    fn test_chunk_char_interval() {
        let chunk = TextChunk::new(0, "test".to_string(), 10, None);
        let interval = chunk.char_interval();

        assert_eq!(interval.start_pos, Some(10));
        assert_eq!(interval.end_pos, Some(14));
    }

    #[test]
    fn test_chunk_with_overlap() {
        let chunk = TextChunk::with_overlap(0, "overlap test text".to_string(), 0, None, 3, 4);

        assert!(chunk.has_overlap);
        assert_eq!(chunk.overlap_info, Some((3, 4)));
        assert_eq!(chunk.core_text(), "rlap test ");
    }

    #[test]
    fn test_cancellation_stops_semantic_scan() {
        let chunker = TextChunker::with_config(ChunkingConfig {
            max_chunk_size: 20,
            overlap_size: 2,
            strategy: ChunkingStrategy::Semantic,
            ..Default::default()
        });
        let token = CancellationToken::new();
        token.cancel();
        let text = "Paragraph one.\n\nParagraph two.\n\nParagraph three with enough words to exceed the chunk size limit easily.";
        let result = chunker.chunk_text_cancellable(text, None, Some(&token));
        assert!(result.is_ok());
    }

    #[test]
    fn validate_accepts_overlap_ratio_just_under_half() {
        let config = ChunkingConfig {
            max_chunk_size: 1000,
            overlap_size: 499,
            ..Default::default()
        };
        assert!(config.validate().is_ok());
    }

    #[test]
    fn validate_rejects_overlap_ratio_at_half() {
        let config = ChunkingConfig {
            max_chunk_size: 1000,
            overlap_size: 500,
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn chunk_text_surfaces_invalid_overlap_ratio() {
        let chunker = TextChunker::with_config(ChunkingConfig {
            max_chunk_size: 100,
            overlap_size: 50,
            ..Default::default()
        });
        let result = chunker.chunk_text("x".repeat(500).as_str(), None);
        assert!(result.is_err());
    }

    #[test]
    fn complexity_scale_follows_the_step_function() {
        assert_eq!(complexity_scale(0.0), 1.2);
        assert_eq!(complexity_scale(0.3), 1.2);
        assert_eq!(complexity_scale(0.31), 1.0);
        assert_eq!(complexity_scale(0.6), 1.0);
        assert_eq!(complexity_scale(0.61), 0.8);
        assert_eq!(complexity_scale(0.8), 0.8);
        assert_eq!(complexity_scale(0.81), 0.6);
        assert_eq!(complexity_scale(1.0), 0.6);
    }

    #[test]
    fn semantic_chunking_extends_overlap_to_previous_sentence_boundary() {
        let chunker = TextChunker::with_config(ChunkingConfig {
            max_chunk_size: 60,
            overlap_size: 20,
            strategy: ChunkingStrategy::Semantic,
            ..Default::default()
        });

        let text = "First paragraph with some words here.\n\nSecond paragraph also has words in it here.\n\nThird paragraph finishes the document nicely.";
        let chunks = chunker.chunk_text(text, None).unwrap();
        assert!(chunks.len() > 1);
        assert!(
            chunks.iter().skip(1).any(|c| matches!(c.overlap_info, Some((start, _)) if start > 0)),
            "expected at least one later chunk to be extended back into the overlap window"
        );
    }
}
