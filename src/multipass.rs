//! Multi-pass extraction coordinator.
//!
//! Drives a document through `1..=max_passes` passes of chunk fan-out,
//! merging each pass's extractions into a running accumulator until the
//! configured [`PassStrategy`] says to stop. Chunk workers run concurrently
//! within a pass (bounded by `concurrent_chunks`); passes themselves run
//! sequentially, since later passes can use earlier ones' results to build
//! refinement context.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};

use futures::stream::{self, StreamExt};
use tokio::sync::Semaphore;
use tokio_util::sync::CancellationToken;

use crate::{
    annotation::Annotator,
    chunking::{ChunkingConfig, TextChunk, TextChunker},
    data::{AnnotatedDocument, CharInterval, Extraction},
    exceptions::{LangExtractError, LangExtractResult},
    resolver::Resolver,
};

/// When the coordinator stops running additional passes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PassStrategy {
    /// Stop after exactly `max_passes`.
    Fixed,
    /// Stop once pass-over-pass improvement falls below `improvement_threshold`,
    /// but never before `min_passes`.
    Adaptive,
    /// Stop once the merged result's mean confidence reaches `quality_threshold`.
    QualityDriven,
    /// Stop once the union of extraction spans covers `quality_threshold` of the text.
    CoverageDriven,
}

/// How extractions from successive passes are combined into the running result.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MergeStrategy {
    /// Append every new extraction; rely on overlap-resolution downstream.
    Union,
    /// Keep the higher-confidence extraction among same-class, overlapping spans.
    HighestConfidence,
    /// Keep `(class, text)` pairs that a majority of passes agree on.
    Voting,
    /// Coalesce overlapping same-class spans to their union.
    OverlapResolution,
}

/// `passOptions`: everything that governs one multi-pass extraction request.
#[derive(Debug, Clone)]
pub struct MultiPassConfig {
    pub max_passes: usize,
    pub min_passes: usize,
    pub improvement_threshold: f32,
    pub quality_threshold: f32,
    pub concurrent_chunks: usize,
    pub pass_strategy: PassStrategy,
    pub merge_strategy: MergeStrategy,
    pub enable_chunking: bool,
    pub enable_alignment: bool,
    pub enable_caching: bool,
    pub chunking: ChunkingConfig,
}

impl Default for MultiPassConfig {
    fn default() -> Self {
        Self {
            max_passes: 2,
            min_passes: 1,
            improvement_threshold: 0.1,
            quality_threshold: 0.3,
            concurrent_chunks: 4,
            pass_strategy: PassStrategy::Adaptive,
            merge_strategy: MergeStrategy::OverlapResolution,
            enable_chunking: true,
            enable_alignment: true,
            enable_caching: true,
            chunking: ChunkingConfig::default(),
        }
    }
}

/// Per-chunk metrics recorded during a pass.
#[derive(Debug, Clone)]
pub struct ChunkMetrics {
    pub chunk_id: usize,
    pub size: usize,
    pub extractions_found: usize,
    pub processing_time: Duration,
    pub alignment_success: bool,
    pub quality_score: f32,
}

/// Per-pass metrics.
#[derive(Debug, Clone, Default)]
pub struct PassMetrics {
    pub chunks_processed: usize,
    pub extractions_found: usize,
    pub mean_confidence: f32,
    pub processing_time: Duration,
    pub improvement_score: f32,
    pub error_count: usize,
}

/// Terminal aggregate recorded once the pass loop stops.
#[derive(Debug, Clone, Default)]
pub struct AggregateMetrics {
    pub total_passes: usize,
    pub total_chunks: usize,
    pub total_extractions: usize,
    pub overall_confidence: f32,
    pub coverage_improvement: f32,
    pub quality_score: f32,
}

/// Everything the coordinator records about one request.
#[derive(Debug, Clone, Default)]
pub struct MultiPassMetrics {
    pub passes: Vec<PassMetrics>,
    pub chunks: Vec<ChunkMetrics>,
    pub aggregate: AggregateMetrics,
}

/// One extraction carried by the accumulator, tagged with the pass and
/// chunk it came from (needed by voting and boundary reconciliation).
#[derive(Debug, Clone)]
struct TrackedExtraction {
    extraction: Extraction,
    chunk_id: usize,
    pass_number: usize,
}

/// A provider/transport failure terminates the whole pass; anything else
/// (a single chunk's output failing to parse, align, or validate) is
/// recorded against that chunk and the rest of the pass keeps going.
fn is_fatal_pass_error(error: &LangExtractError) -> bool {
    error.is_inference_error() || error.is_network_error() || error.is_timeout()
}

fn normalized_key(extraction: &Extraction) -> (String, String) {
    (
        extraction.extraction_class.to_lowercase(),
        extraction.extraction_text.trim().to_lowercase(),
    )
}

fn span(extraction: &Extraction) -> Option<(usize, usize)> {
    let ci = extraction.char_interval.as_ref()?;
    Some((ci.start_pos?, ci.end_pos?))
}

fn spans_overlap_majority(a: (usize, usize), b: (usize, usize)) -> bool {
    let inter_start = a.0.max(b.0);
    let inter_end = a.1.min(b.1);
    if inter_end <= inter_start {
        return false;
    }
    let inter_len = (inter_end - inter_start) as f32;
    let shorter = (a.1 - a.0).min(b.1 - b.0).max(1) as f32;
    inter_len / shorter >= 0.5
}

/// Drives the full extraction of one document across chunks and passes.
pub struct MultiPassCoordinator {
    config: MultiPassConfig,
    annotator: Arc<Annotator>,
    resolver: Arc<Resolver>,
    chunker: TextChunker,
}

impl MultiPassCoordinator {
    pub fn new(config: MultiPassConfig, annotator: Annotator, resolver: Resolver) -> Self {
        let chunker = TextChunker::with_config(config.chunking.clone());
        Self {
            config,
            annotator: Arc::new(annotator),
            resolver: Arc::new(resolver),
            chunker,
        }
    }

    pub fn config(&self) -> &MultiPassConfig {
        &self.config
    }

    /// Runs the full pass loop over `text` and returns the merged document
    /// plus the metrics recorded along the way.
    pub async fn extract(
        &self,
        text: &str,
        additional_context: Option<&str>,
        debug: bool,
        cancellation: Option<&CancellationToken>,
    ) -> LangExtractResult<(AnnotatedDocument, MultiPassMetrics)> {
        let chunks = self.build_chunks(text)?;
        let mut metrics = MultiPassMetrics::default();
        let mut accumulator: Vec<TrackedExtraction> = Vec::new();
        let mut chunk_memo: HashMap<String, Vec<Extraction>> = HashMap::new();

        let mut pass_number = 0usize;
        loop {
            pass_number += 1;

            if let Some(token) = cancellation {
                if token.is_cancelled() {
                    return self.finish_on_cancellation(text, &chunks, accumulator, metrics, pass_number);
                }
            }

            let pass_started = Instant::now();
            let refinement_context = self.build_refinement_context(&accumulator, additional_context);

            let (pass_results, chunk_metrics, error_count) = self
                .run_pass(&chunks, pass_number, refinement_context.as_deref(), &mut chunk_memo, cancellation, debug)
                .await?;

            let previous_total = accumulator.len();
            let reconciled = reconcile_chunk_boundaries(pass_results, &chunks);
            accumulator.extend(reconciled);
            accumulator = self.merge(accumulator);

            let new_total = accumulator.len();
            let improvement_score = if previous_total == 0 {
                if new_total > 0 {
                    1.0
                } else {
                    0.0
                }
            } else {
                (new_total.saturating_sub(previous_total)) as f32 / previous_total as f32
            };

            let mean_confidence = mean_confidence(&accumulator);
            metrics.passes.push(PassMetrics {
                chunks_processed: chunks.len(),
                extractions_found: new_total,
                mean_confidence,
                processing_time: pass_started.elapsed(),
                improvement_score,
                error_count,
            });
            metrics.chunks.extend(chunk_metrics);

            if debug {
                log::debug!(
                    "pass {}: {} extractions, mean confidence {:.2}, improvement {:.2}",
                    pass_number,
                    new_total,
                    mean_confidence,
                    improvement_score
                );
            }

            if self.should_stop(pass_number, improvement_score, mean_confidence, &accumulator, text) {
                break;
            }
            if pass_number >= self.config.max_passes {
                break;
            }
        }

        metrics.aggregate = self.build_aggregate(pass_number, chunks.len(), &accumulator, text);

        let document = self.build_document(text, accumulator);
        Ok((document, metrics))
    }

    fn build_chunks(&self, text: &str) -> LangExtractResult<Vec<TextChunk>> {
        if !self.config.enable_chunking {
            return Ok(vec![TextChunk::new(0, text.to_string(), 0, None)]);
        }
        self.chunker.chunk_text(text, None)
    }

    /// Runs every chunk of one pass through a bounded worker pool and
    /// returns `(extractions, chunk_metrics, error_count)`.
    async fn run_pass(
        &self,
        chunks: &[TextChunk],
        pass_number: usize,
        refinement_context: Option<&str>,
        chunk_memo: &mut HashMap<String, Vec<Extraction>>,
        cancellation: Option<&CancellationToken>,
        debug: bool,
    ) -> LangExtractResult<(Vec<TrackedExtraction>, Vec<ChunkMetrics>, usize)> {
        let semaphore = Arc::new(Semaphore::new(self.config.concurrent_chunks.max(1)));
        let refinement_context = refinement_context.map(|s| s.to_string());
        let annotator = Arc::clone(&self.annotator);
        let resolver = Arc::clone(&self.resolver);
        let align = self.config.enable_alignment;
        let enable_caching = self.config.enable_caching;

        let results: Vec<LangExtractResult<(usize, Vec<Extraction>, ChunkMetrics)>> = stream::iter(chunks.iter().cloned().enumerate())
            .map(|(chunk_index, chunk)| {
                let semaphore = Arc::clone(&semaphore);
                let annotator = Arc::clone(&annotator);
                let resolver = Arc::clone(&resolver);
                let refinement_context = refinement_context.clone();
                let cancelled = cancellation.map(|t| t.is_cancelled()).unwrap_or(false);
                let cached = if enable_caching { chunk_memo.get(&chunk.text).cloned() } else { None };

                async move {
                    let _permit = semaphore.acquire().await.expect("semaphore closed");
                    let started = Instant::now();

                    if cancelled {
                        return Ok((
                            chunk_index,
                            Vec::new(),
                            ChunkMetrics {
                                chunk_id: chunk.id,
                                size: chunk.char_length,
                                extractions_found: 0,
                                processing_time: started.elapsed(),
                                alignment_success: false,
                                quality_score: 0.0,
                            },
                        ));
                    }

                    let raw_extractions = if let Some(cached) = cached {
                        cached
                    } else {
                        let outcome = annotator
                            .annotate_unit_with_alignment(chunk.core_text(), &resolver, refinement_context.as_deref(), debug, align)
                            .await?;
                        outcome.extractions
                    };

                    let mut globalised = Vec::with_capacity(raw_extractions.len());
                    let mut alignment_success = true;
                    for (i, mut extraction) in raw_extractions.into_iter().enumerate() {
                        extraction.chunk_index = Some(chunk.chunk_index);
                        extraction.extraction_index.get_or_insert(i);
                        if let Some(ci) = extraction.char_interval.clone() {
                            if let (Some(s), Some(e)) = (ci.start_pos, ci.end_pos) {
                                extraction.set_char_interval(CharInterval::new(s + chunk.char_offset, e + chunk.char_offset));
                            }
                        } else {
                            alignment_success = false;
                        }
                        globalised.push(extraction);
                    }

                    let quality_score = if globalised.is_empty() {
                        0.0
                    } else {
                        globalised.iter().map(|e| e.alignment_quality.quality_score() as f32 / 100.0).sum::<f32>() / globalised.len() as f32
                    };

                    Ok((
                        chunk_index,
                        globalised,
                        ChunkMetrics {
                            chunk_id: chunk.id,
                            size: chunk.char_length,
                            extractions_found: 0, // filled in by the caller once known
                            processing_time: started.elapsed(),
                            alignment_success,
                            quality_score,
                        },
                    ))
                }
            })
            .buffer_unordered(self.config.concurrent_chunks.max(1))
            .collect()
            .await;

        let mut tracked = Vec::new();
        let mut chunk_metrics = Vec::new();
        let mut error_count = 0;

        for outcome in results {
            match outcome {
                Ok((chunk_index, extractions, mut metric)) => {
                    metric.extractions_found = extractions.len();
                    if self.config.enable_caching {
                        chunk_memo.insert(chunks[chunk_index].text.clone(), extractions.clone());
                    }
                    chunk_metrics.push(metric);
                    for extraction in extractions {
                        tracked.push(TrackedExtraction {
                            extraction,
                            chunk_id: chunks[chunk_index].id,
                            pass_number,
                        });
                    }
                }
                Err(e) if is_fatal_pass_error(&e) => {
                    log::debug!("pass {} aborted by fatal provider error: {}", pass_number, e);
                    return Err(e);
                }
                Err(e) => {
                    error_count += 1;
                    if debug {
                        log::debug!("chunk processing failed during pass {}: {}", pass_number, e);
                    }
                }
            }
        }

        tracked.sort_by_key(|t| (t.extraction.chunk_index.unwrap_or(0), t.extraction.group_index.unwrap_or(0), t.extraction.extraction_index.unwrap_or(0)));

        Ok((tracked, chunk_metrics, error_count))
    }

    fn build_refinement_context(&self, accumulator: &[TrackedExtraction], additional_context: Option<&str>) -> Option<String> {
        if accumulator.is_empty() {
            return additional_context.map(|s| s.to_string());
        }

        let mut by_class: HashMap<String, Vec<String>> = HashMap::new();
        for tracked in accumulator {
            by_class.entry(tracked.extraction.extraction_class.clone()).or_default().push(tracked.extraction.extraction_text.clone());
        }

        let mut summary = String::from("Previously found extractions (avoid duplicating, look for more):\n");
        let mut classes: Vec<&String> = by_class.keys().collect();
        classes.sort();
        for class in classes {
            let texts = &by_class[class];
            summary.push_str(&format!("- {}: {}\n", class, texts.join(", ")));
        }

        match additional_context {
            Some(ctx) => Some(format!("{}\n\n{}", ctx, summary)),
            None => Some(summary),
        }
    }

    fn should_stop(&self, pass_number: usize, improvement_score: f32, mean_confidence: f32, accumulator: &[TrackedExtraction], text: &str) -> bool {
        match self.config.pass_strategy {
            PassStrategy::Fixed => pass_number >= self.config.max_passes,
            PassStrategy::Adaptive => pass_number >= self.config.min_passes && improvement_score < self.config.improvement_threshold,
            PassStrategy::QualityDriven => mean_confidence >= self.config.quality_threshold,
            PassStrategy::CoverageDriven => coverage_fraction(accumulator, text) >= self.config.quality_threshold,
        }
    }

    fn merge(&self, accumulator: Vec<TrackedExtraction>) -> Vec<TrackedExtraction> {
        match self.config.merge_strategy {
            MergeStrategy::Union => accumulator,
            MergeStrategy::HighestConfidence => merge_highest_confidence(accumulator),
            MergeStrategy::Voting => merge_voting(accumulator, self.config.max_passes),
            MergeStrategy::OverlapResolution => merge_overlap_resolution(accumulator),
        }
    }

    fn build_aggregate(&self, total_passes: usize, total_chunks: usize, accumulator: &[TrackedExtraction], text: &str) -> AggregateMetrics {
        AggregateMetrics {
            total_passes,
            total_chunks,
            total_extractions: accumulator.len(),
            overall_confidence: mean_confidence(accumulator),
            coverage_improvement: coverage_fraction(accumulator, text),
            quality_score: mean_quality(accumulator),
        }
    }

    fn build_document(&self, text: &str, accumulator: Vec<TrackedExtraction>) -> AnnotatedDocument {
        let mut document = AnnotatedDocument::new(text.to_string());
        for tracked in accumulator {
            document.add_extraction(tracked.extraction);
        }
        document.sort_deterministic();
        document
    }

    fn finish_on_cancellation(
        &self,
        text: &str,
        chunks: &[TextChunk],
        accumulator: Vec<TrackedExtraction>,
        mut metrics: MultiPassMetrics,
        pass_number: usize,
    ) -> LangExtractResult<(AnnotatedDocument, MultiPassMetrics)> {
        metrics.aggregate = self.build_aggregate(pass_number.saturating_sub(1), chunks.len(), &accumulator, text);
        Err(LangExtractError::timeout(format!(
            "multi-pass extraction cancelled after {} completed pass(es); {} extractions retained",
            metrics.aggregate.total_passes, metrics.aggregate.total_extractions
        )))
    }
}

fn mean_confidence(accumulator: &[TrackedExtraction]) -> f32 {
    if accumulator.is_empty() {
        return 0.0;
    }
    accumulator.iter().map(|t| t.extraction.alignment_confidence).sum::<f32>() / accumulator.len() as f32
}

fn mean_quality(accumulator: &[TrackedExtraction]) -> f32 {
    if accumulator.is_empty() {
        return 0.0;
    }
    accumulator.iter().map(|t| t.extraction.alignment_quality.quality_score() as f32 / 100.0).sum::<f32>() / accumulator.len() as f32
}

fn coverage_fraction(accumulator: &[TrackedExtraction], text: &str) -> f32 {
    if text.is_empty() {
        return 1.0;
    }
    let mut spans: Vec<(usize, usize)> = accumulator.iter().filter_map(|t| span(&t.extraction)).collect();
    if spans.is_empty() {
        return 0.0;
    }
    spans.sort_by_key(|s| s.0);

    let mut covered = 0usize;
    let mut current = spans[0];
    for &(start, end) in &spans[1..] {
        if start <= current.1 {
            current.1 = current.1.max(end);
        } else {
            covered += current.1 - current.0;
            current = (start, end);
        }
    }
    covered += current.1 - current.0;

    (covered as f32 / text.len() as f32).min(1.0)
}

/// Deduplicates extractions that land in the overlap region shared by two
/// adjacent chunks: when the same `(class, text)` comes from both
/// neighbours, keep the one whose span is fully contained in exactly one
/// chunk, else keep the higher-confidence one.
fn reconcile_chunk_boundaries(extractions: Vec<TrackedExtraction>, chunks: &[TextChunk]) -> Vec<TrackedExtraction> {
    let chunk_by_id: HashMap<usize, &TextChunk> = chunks.iter().map(|c| (c.id, c)).collect();
    let mut by_key: HashMap<(String, String), Vec<usize>> = HashMap::new();
    for (i, tracked) in extractions.iter().enumerate() {
        by_key.entry(normalized_key(&tracked.extraction)).or_default().push(i);
    }

    let mut drop = vec![false; extractions.len()];
    for indices in by_key.values() {
        if indices.len() < 2 {
            continue;
        }
        for window in indices.windows(2) {
            let (a, b) = (window[0], window[1]);
            let (Some(chunk_a), Some(chunk_b)) = (chunk_by_id.get(&extractions[a].chunk_id), chunk_by_id.get(&extractions[b].chunk_id)) else {
                continue;
            };
            if chunk_a.id == chunk_b.id {
                continue;
            }
            let (Some(span_a), Some(span_b)) = (span(&extractions[a].extraction), span(&extractions[b].extraction)) else {
                continue;
            };

            if !is_in_overlap(chunk_a, span_a) && !is_in_overlap(chunk_b, span_b) {
                continue;
            }

            let contained_in_a = chunk_a.char_interval().contains(&CharInterval::new(span_a.0, span_a.1));
            let contained_in_b = chunk_b.char_interval().contains(&CharInterval::new(span_b.0, span_b.1));

            if contained_in_a && !contained_in_b {
                drop[b] = true;
            } else if contained_in_b && !contained_in_a {
                drop[a] = true;
            } else if extractions[a].extraction.alignment_confidence >= extractions[b].extraction.alignment_confidence {
                drop[b] = true;
            } else {
                drop[a] = true;
            }
        }
    }

    extractions.into_iter().enumerate().filter_map(|(i, t)| if drop[i] { None } else { Some(t) }).collect()
}

fn is_in_overlap(chunk: &TextChunk, span: (usize, usize)) -> bool {
    let Some((overlap_start, overlap_end)) = chunk.overlap_info else {
        return false;
    };
    let local_start = span.0.saturating_sub(chunk.char_offset);
    local_start < overlap_start || local_start >= chunk.char_length.saturating_sub(overlap_end)
}

fn merge_highest_confidence(accumulator: Vec<TrackedExtraction>) -> Vec<TrackedExtraction> {
    let mut kept: Vec<TrackedExtraction> = Vec::new();
    'outer: for candidate in accumulator {
        for existing in kept.iter_mut() {
            if existing.extraction.extraction_class != candidate.extraction.extraction_class {
                continue;
            }
            let (Some(a), Some(b)) = (span(&existing.extraction), span(&candidate.extraction)) else {
                continue;
            };
            if !spans_overlap_majority(a, b) {
                continue;
            }
            let candidate_wins = candidate.extraction.alignment_confidence > existing.extraction.alignment_confidence
                || (candidate.extraction.alignment_confidence == existing.extraction.alignment_confidence
                    && candidate.extraction.alignment_quality > existing.extraction.alignment_quality)
                || (candidate.extraction.alignment_confidence == existing.extraction.alignment_confidence
                    && candidate.extraction.alignment_quality == existing.extraction.alignment_quality
                    && b.0 < a.0);
            if candidate_wins {
                *existing = candidate;
            }
            continue 'outer;
        }
        kept.push(candidate);
    }
    kept
}

fn merge_voting(accumulator: Vec<TrackedExtraction>, max_passes: usize) -> Vec<TrackedExtraction> {
    let mut groups: HashMap<(String, String), Vec<TrackedExtraction>> = HashMap::new();
    for tracked in accumulator {
        groups.entry(normalized_key(&tracked.extraction)).or_default().push(tracked);
    }

    let quorum = (max_passes as f32 / 2.0).ceil() as usize;
    let mut merged = Vec::new();
    for (_key, mut group) in groups {
        let passes: std::collections::HashSet<usize> = group.iter().map(|t| t.pass_number).collect();
        if passes.len() < quorum.max(1) {
            continue;
        }
        let mean_conf = group.iter().map(|t| t.extraction.alignment_confidence).sum::<f32>() / group.len() as f32;
        group.sort_by_key(|t| std::cmp::Reverse(t.extraction.alignment_quality));
        let mut winner = group.remove(0);
        winner.extraction.alignment_confidence = mean_conf;
        merged.push(winner);
    }
    merged
}

fn merge_overlap_resolution(accumulator: Vec<TrackedExtraction>) -> Vec<TrackedExtraction> {
    let mut merged: Vec<TrackedExtraction> = Vec::new();
    'outer: for candidate in accumulator {
        for existing in merged.iter_mut() {
            if existing.extraction.extraction_class != candidate.extraction.extraction_class {
                continue;
            }
            let (Some(a), Some(b)) = (span(&existing.extraction), span(&candidate.extraction)) else {
                continue;
            };
            if a.0 >= b.1 || b.0 >= a.1 {
                continue;
            }
            let union_start = a.0.min(b.0);
            let union_end = a.1.max(b.1);
            existing.extraction.set_char_interval(CharInterval::new(union_start, union_end));
            if candidate.extraction.alignment_confidence > existing.extraction.alignment_confidence {
                existing.extraction.alignment_confidence = candidate.extraction.alignment_confidence;
                existing.extraction.alignment_quality = candidate.extraction.alignment_quality;
            }
            continue 'outer;
        }
        merged.push(candidate);
    }
    merged
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::{CharInterval, Extraction};

    fn extraction_at(class: &str, text: &str, start: usize, end: usize, confidence: f32) -> Extraction {
        let mut e = Extraction::new(class.to_string(), text.to_string());
        e.set_char_interval(CharInterval::new(start, end));
        e.alignment_confidence = confidence;
        e
    }

    #[test]
    fn highest_confidence_keeps_the_stronger_overlap() {
        let weak = TrackedExtraction {
            extraction: extraction_at("name", "Alice", 0, 5, 0.4),
            chunk_id: 0,
            pass_number: 1,
        };
        let strong = TrackedExtraction {
            extraction: extraction_at("name", "Alice", 0, 5, 0.9),
            chunk_id: 0,
            pass_number: 2,
        };
        let merged = merge_highest_confidence(vec![weak, strong]);
        assert_eq!(merged.len(), 1);
        assert_eq!(merged[0].extraction.alignment_confidence, 0.9);
    }

    #[test]
    fn overlap_resolution_coalesces_same_class_spans() {
        let a = TrackedExtraction {
            extraction: extraction_at("name", "Alice Sm", 0, 8, 0.5),
            chunk_id: 0,
            pass_number: 1,
        };
        let b = TrackedExtraction {
            extraction: extraction_at("name", "ice Smith", 3, 12, 0.6),
            chunk_id: 0,
            pass_number: 1,
        };
        let merged = merge_overlap_resolution(vec![a, b]);
        assert_eq!(merged.len(), 1);
        let interval = merged[0].extraction.char_interval.as_ref().unwrap();
        assert_eq!((interval.start_pos, interval.end_pos), (Some(0), Some(12)));
    }

    #[test]
    fn voting_requires_quorum() {
        let one_pass = TrackedExtraction {
            extraction: extraction_at("name", "Alice", 0, 5, 0.8),
            chunk_id: 0,
            pass_number: 1,
        };
        let merged = merge_voting(vec![one_pass], 3);
        assert!(merged.is_empty(), "a single pass shouldn't satisfy a quorum of 2");
    }

    #[test]
    fn coverage_fraction_merges_overlapping_spans() {
        let text = "0123456789";
        let accumulator = vec![
            TrackedExtraction {
                extraction: extraction_at("a", "01234", 0, 5, 0.5),
                chunk_id: 0,
                pass_number: 1,
            },
            TrackedExtraction {
                extraction: extraction_at("b", "34567", 3, 8, 0.5),
                chunk_id: 0,
                pass_number: 1,
            },
        ];
        assert_eq!(coverage_fraction(&accumulator, text), 0.8);
    }

    #[test]
    fn default_config_uses_adaptive_strategy() {
        let config = MultiPassConfig::default();
        assert_eq!(config.pass_strategy, PassStrategy::Adaptive);
        assert_eq!(config.merge_strategy, MergeStrategy::OverlapResolution);
    }
}
