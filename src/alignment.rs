//! Text-to-span alignment: grounding extracted text back into the source.
//!
//! An [`Aligner`] takes extracted text and a source document and returns an
//! [`AlignmentResult`] plus the matched [`CharInterval`], if any. `
//! ExactAligner` handles identical/normalized matches; `FuzzyAligner` uses
//! Levenshtein distance over sliding windows for near matches; `MultiAligner`
//! composes a priority-ordered registry of aligners.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};

use tokio::sync::RwLock;
use tokio_util::sync::CancellationToken;

use crate::data::{AlignmentQuality, AlignmentResult, CharInterval, Extraction};
use crate::exceptions::{LangExtractError, LangExtractResult};

/// Long scans (Levenshtein fill, sliding-window search) poll the
/// cancellation token and the per-call timeout this often.
const CANCELLATION_CHECK_INTERVAL: usize = 100;

/// Options controlling how extracted text is normalized before matching.
#[derive(Debug, Clone)]
pub struct AlignmentOptions {
    pub case_sensitive: bool,
    pub ignore_whitespace_differences: bool,
    pub ignore_punctuation: bool,
    pub max_search_window: usize,
    pub fuzzy_max_distance_ratio: f32,
    /// Occurrences scoring below this are rejected as low-confidence rather
    /// than returned.
    pub min_confidence: f32,
    /// Maximum number of candidate occurrences considered before truncating.
    pub max_candidates: usize,
    /// Wall-clock budget for a single `align` call.
    pub timeout: Duration,
}

impl Default for AlignmentOptions {
    fn default() -> Self {
        Self {
            case_sensitive: false,
            ignore_whitespace_differences: true,
            ignore_punctuation: false,
            max_search_window: 10_000,
            fuzzy_max_distance_ratio: 0.3,
            min_confidence: 0.5,
            max_candidates: 10,
            timeout: Duration::from_secs(2),
        }
    }
}

/// Backward-compatible name kept from the teacher's configuration surface.
pub type AlignmentConfig = AlignmentOptions;

/// An algorithm that attempts to locate `extraction_text` inside `source`.
pub trait Aligner: Send + Sync {
    fn name(&self) -> &str;

    fn align(
        &self,
        extraction_text: &str,
        source: &str,
        options: &AlignmentOptions,
    ) -> Option<(CharInterval, AlignmentResult)> {
        self.align_cancellable(extraction_text, source, options, None)
    }

    fn align_cancellable(
        &self,
        extraction_text: &str,
        source: &str,
        options: &AlignmentOptions,
        cancellation: Option<&CancellationToken>,
    ) -> Option<(CharInterval, AlignmentResult)>;
}

/// Per-character mapping from a position in the normalized text back to its
/// original index, built during normalization so that match offsets found in
/// normalized space translate exactly (not proportionally) back to the
/// original text.
struct Normalized {
    text: String,
    /// `index_map[i]` is the original-text byte offset of `text`'s i-th
    /// character (plus one trailing entry equal to `original.len()`).
    index_map: Vec<usize>,
}

fn normalize(text: &str, options: &AlignmentOptions) -> Normalized {
    let mut out = String::with_capacity(text.len());
    let mut index_map = Vec::with_capacity(text.len() + 1);
    let mut prev_was_space = false;

    for (byte_idx, ch) in text.char_indices() {
        let mapped = if !options.case_sensitive {
            ch.to_lowercase().next().unwrap_or(ch)
        } else {
            ch
        };

        if options.ignore_punctuation && mapped.is_ascii_punctuation() {
            continue;
        }

        if options.ignore_whitespace_differences && mapped.is_whitespace() {
            if prev_was_space {
                continue;
            }
            out.push(' ');
            index_map.push(byte_idx);
            prev_was_space = true;
            continue;
        }
        prev_was_space = false;
        out.push(mapped);
        index_map.push(byte_idx);
    }
    index_map.push(text.len());

    Normalized { text: out, index_map }
}

/// Exact-match aligner: tries identity, then progressively looser
/// normalization, returning the first hit with a scaled confidence score.
pub struct ExactAligner;

impl ExactAligner {
    pub fn new() -> Self {
        Self
    }

    fn map_range(norm: &Normalized, start: usize, end: usize) -> (usize, usize) {
        let orig_start = norm.index_map.get(start).copied().unwrap_or(0);
        let orig_end = norm
            .index_map
            .get(end)
            .copied()
            .unwrap_or_else(|| norm.index_map.last().copied().unwrap_or(0));
        (orig_start, orig_end)
    }
}

impl Default for ExactAligner {
    fn default() -> Self {
        Self::new()
    }
}

/// Collapses runs of whitespace to a single space (no leading/trailing trim).
fn collapse_whitespace(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut prev_space = false;
    for ch in text.chars() {
        if ch.is_whitespace() {
            if !prev_space {
                out.push(' ');
            }
            prev_space = true;
        } else {
            out.push(ch);
            prev_space = false;
        }
    }
    out
}

fn strip_punctuation(text: &str) -> String {
    text.chars().filter(|c| !c.is_ascii_punctuation()).collect()
}

fn fold_case(text: &str) -> String {
    text.chars().flat_map(|c| c.to_lowercase()).collect()
}

impl Aligner for ExactAligner {
    fn name(&self) -> &str {
        "exact"
    }

    fn align_cancellable(
        &self,
        extraction_text: &str,
        source: &str,
        options: &AlignmentOptions,
        cancellation: Option<&CancellationToken>,
    ) -> Option<(CharInterval, AlignmentResult)> {
        if extraction_text.is_empty() {
            return None;
        }

        let deadline = Instant::now() + options.timeout;
        let norm_source = normalize(source, options);
        let norm_extraction = normalize(extraction_text, options);
        if norm_extraction.text.is_empty() {
            return None;
        }

        // Find every occurrence of the normalized extraction in the
        // normalized source (overlapping occurrences included), classifying
        // each by which normalizations were actually needed to match it.
        let mut candidates: Vec<(usize, usize, f32, &'static str)> = Vec::new();
        let mut search_start = 0usize;
        let mut iterations = 0usize;
        while let Some(rel_pos) = norm_source.text[search_start..].find(&norm_extraction.text) {
            iterations += 1;
            if iterations % CANCELLATION_CHECK_INTERVAL == 0 {
                if let Some(token) = cancellation {
                    if token.is_cancelled() {
                        break;
                    }
                }
                if Instant::now() >= deadline {
                    break;
                }
            }

            let pos = search_start + rel_pos;
            let end = pos + norm_extraction.text.len();
            let (orig_start, orig_end) = Self::map_range(&norm_source, pos, end);
            let matched = &source[orig_start..orig_end];
            let (score, label) = classify_exact_match(extraction_text, matched, options);
            candidates.push((orig_start, orig_end, score, label));

            search_start = pos + 1;
            if search_start >= norm_source.text.len() {
                break;
            }
        }

        if candidates.is_empty() {
            return None;
        }

        // Best score first, ties broken by earlier position.
        candidates.sort_by(|a, b| b.2.partial_cmp(&a.2).unwrap().then(a.0.cmp(&b.0)));
        candidates.truncate(options.max_candidates.max(1));

        let (start, end, score, label) = candidates[0];
        if score < options.min_confidence {
            return None;
        }

        let interval = CharInterval::new(start, end);
        Some((interval, AlignmentResult::new(AlignmentQuality::Exact, score, score, label)))
    }
}

/// Classifies a found occurrence by which normalization axis actually made
/// it differ from `extraction_text`, rather than by which synthetic search
/// tier happened to surface it.
fn classify_exact_match(extraction_text: &str, matched: &str, options: &AlignmentOptions) -> (f32, &'static str) {
    if matched == extraction_text {
        return (1.0, "exact_identical");
    }

    let base_a = if options.case_sensitive { extraction_text.to_string() } else { fold_case(extraction_text) };
    let base_b = if options.case_sensitive { matched.to_string() } else { fold_case(matched) };
    if !options.case_sensitive && base_a == base_b {
        return (0.98, "exact_case_insensitive");
    }

    if options.ignore_whitespace_differences {
        let ws_a = collapse_whitespace(&base_a);
        let ws_b = collapse_whitespace(&base_b);
        if ws_a == ws_b {
            return (0.95, "exact_whitespace_normalized");
        }
        if options.ignore_punctuation {
            let p_a = strip_punctuation(&ws_a);
            let p_b = strip_punctuation(&ws_b);
            if p_a == p_b {
                return (0.92, "exact_punctuation_normalized");
            }
        }
    } else if options.ignore_punctuation {
        let p_a = strip_punctuation(&base_a);
        let p_b = strip_punctuation(&base_b);
        if p_a == p_b {
            return (0.92, "exact_punctuation_normalized");
        }
    }

    (0.0, "no_match")
}

/// Sliding-window Levenshtein-distance aligner for near matches.
pub struct FuzzyAligner {
    #[allow(dead_code)]
    options: AlignmentOptions,
}

impl FuzzyAligner {
    pub fn new() -> Self {
        Self {
            options: AlignmentOptions::default(),
        }
    }

    pub fn with_options(options: AlignmentOptions) -> Self {
        Self { options }
    }

    fn levenshtein(a: &str, b: &str) -> usize {
        Self::levenshtein_cancellable(a, b, None)
    }

    fn levenshtein_cancellable(a: &str, b: &str, cancellation: Option<&CancellationToken>) -> usize {
        let a: Vec<char> = a.chars().collect();
        let b: Vec<char> = b.chars().collect();
        let (n, m) = (a.len(), b.len());
        let mut prev: Vec<usize> = (0..=m).collect();
        let mut curr = vec![0usize; m + 1];

        'outer: for i in 1..=n {
            curr[0] = i;
            for j in 1..=m {
                if (i * m + j) % CANCELLATION_CHECK_INTERVAL == 0 {
                    if let Some(token) = cancellation {
                        if token.is_cancelled() {
                            break 'outer;
                        }
                    }
                }
                let cost = if a[i - 1] == b[j - 1] { 0 } else { 1 };
                curr[j] = (prev[j] + 1).min(curr[j - 1] + 1).min(prev[j - 1] + cost);
            }
            std::mem::swap(&mut prev, &mut curr);
        }
        prev[m]
    }

    fn quality_for_distance(distance: usize, len: usize) -> AlignmentQuality {
        if distance == 0 {
            return AlignmentQuality::Exact;
        }
        let ratio = distance as f32 / len.max(1) as f32;
        if ratio <= 0.1 {
            AlignmentQuality::Fuzzy
        } else if ratio <= 0.3 {
            AlignmentQuality::Partial
        } else {
            AlignmentQuality::Approximate
        }
    }
}

impl Default for FuzzyAligner {
    fn default() -> Self {
        Self::new()
    }
}

impl Aligner for FuzzyAligner {
    fn name(&self) -> &str {
        "fuzzy"
    }

    fn align_cancellable(
        &self,
        extraction_text: &str,
        source: &str,
        options: &AlignmentOptions,
        cancellation: Option<&CancellationToken>,
    ) -> Option<(CharInterval, AlignmentResult)> {
        let needle_len = extraction_text.chars().count();
        if needle_len == 0 {
            return None;
        }

        let deadline = Instant::now() + options.timeout;
        let max_distance = ((needle_len as f32) * options.fuzzy_max_distance_ratio).ceil() as usize;
        let source_chars: Vec<char> = source.chars().collect();
        let source_len = source_chars.len();

        let window_min = needle_len.saturating_sub(max_distance).max(1);
        let window_max = (needle_len + max_distance).min(source_len);

        let mut best: Option<(usize, usize, usize, f32)> = None; // (start_char, end_char, distance, similarity)

        let search_bound = options.max_search_window.min(source_len);
        let mut start = 0usize;
        let mut iterations = 0usize;
        'scan: while start < search_bound {
            for window_len in window_min..=window_max {
                iterations += 1;
                if iterations % CANCELLATION_CHECK_INTERVAL == 0 {
                    if let Some(token) = cancellation {
                        if token.is_cancelled() {
                            break 'scan;
                        }
                    }
                    if Instant::now() >= deadline {
                        break 'scan;
                    }
                }

                let end = start + window_len;
                if end > source_len {
                    break;
                }
                let candidate: String = source_chars[start..end].iter().collect();
                let distance = Self::levenshtein_cancellable(extraction_text, &candidate, cancellation);
                if distance > max_distance {
                    continue;
                }
                let length_similarity =
                    1.0 - (needle_len as f32 - window_len as f32).abs() / needle_len.max(window_len).max(1) as f32;
                let s = 1.0 - distance as f32 / needle_len.max(window_len).max(1) as f32;
                let similarity = 0.8 * s + 0.2 * length_similarity;

                let better = match &best {
                    None => true,
                    Some((_, _, best_distance, best_similarity)) => {
                        distance < *best_distance
                            || (distance == *best_distance && similarity > *best_similarity)
                    }
                };
                if better {
                    best = Some((start, end, distance, similarity));
                }
            }
            start += 1;
        }

        let (start_char, end_char, distance, similarity) = best?;
        let byte_start: usize = source_chars[..start_char].iter().map(|c| c.len_utf8()).sum();
        let byte_end: usize = source_chars[..end_char].iter().map(|c| c.len_utf8()).sum();

        let quality = Self::quality_for_distance(distance, needle_len);
        let interval = CharInterval::new(byte_start, byte_end);
        Some((
            interval,
            AlignmentResult::new(quality, similarity.clamp(0.0, 1.0), similarity, self.name()),
        ))
    }
}

/// Strategy for picking among multiple aligner results in [`MultiAligner`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SelectionStrategy {
    BestScore,
    FirstFound,
    MostConfident,
    ExactPreferred,
    PositionBased,
}

struct RegisteredAligner {
    priority: i32,
    aligner: Arc<dyn Aligner>,
}

/// Priority-ordered registry of aligners, composing results according to a
/// [`SelectionStrategy`].
pub struct MultiAligner {
    aligners: RwLock<Vec<RegisteredAligner>>,
    options: AlignmentOptions,
}

impl MultiAligner {
    pub fn new(options: AlignmentOptions) -> Self {
        Self {
            aligners: RwLock::new(Vec::new()),
            options,
        }
    }

    /// Registry seeded with the standard exact (priority 100) then fuzzy
    /// (priority 50) aligners.
    pub fn with_defaults() -> Self {
        let seeded = vec![
            RegisteredAligner {
                priority: 100,
                aligner: Arc::new(ExactAligner::new()) as Arc<dyn Aligner>,
            },
            RegisteredAligner {
                priority: 50,
                aligner: Arc::new(FuzzyAligner::new()) as Arc<dyn Aligner>,
            },
        ];
        Self {
            aligners: RwLock::new(seeded),
            options: AlignmentOptions::default(),
        }
    }

    pub async fn register(&self, priority: i32, aligner: Arc<dyn Aligner>) {
        let mut guard = self.aligners.write().await;
        guard.push(RegisteredAligner { priority, aligner });
        guard.sort_by(|a, b| b.priority.cmp(&a.priority));
    }

    async fn snapshot(&self) -> Vec<Arc<dyn Aligner>> {
        let guard = self.aligners.read().await;
        guard.iter().map(|r| r.aligner.clone()).collect()
    }

    /// Runs every registered aligner and returns the single best result per
    /// `strategy`.
    pub async fn align_with_best(
        &self,
        extraction_text: &str,
        source: &str,
        strategy: SelectionStrategy,
    ) -> Option<(CharInterval, AlignmentResult)> {
        self.align_with_best_cancellable(extraction_text, source, strategy, None).await
    }

    pub async fn align_with_best_cancellable(
        &self,
        extraction_text: &str,
        source: &str,
        strategy: SelectionStrategy,
        cancellation: Option<&CancellationToken>,
    ) -> Option<(CharInterval, AlignmentResult)> {
        let results = self.align_with_all_cancellable(extraction_text, source, cancellation).await;
        select_best(results, strategy)
    }

    /// Runs every registered aligner and returns all results it produced.
    pub async fn align_with_all(
        &self,
        extraction_text: &str,
        source: &str,
    ) -> Vec<(CharInterval, AlignmentResult)> {
        self.align_with_all_cancellable(extraction_text, source, None).await
    }

    pub async fn align_with_all_cancellable(
        &self,
        extraction_text: &str,
        source: &str,
        cancellation: Option<&CancellationToken>,
    ) -> Vec<(CharInterval, AlignmentResult)> {
        let aligners = self.snapshot().await;
        aligners
            .iter()
            .filter_map(|a| a.align_cancellable(extraction_text, source, &self.options, cancellation))
            .collect()
    }
}

fn select_best(
    mut results: Vec<(CharInterval, AlignmentResult)>,
    strategy: SelectionStrategy,
) -> Option<(CharInterval, AlignmentResult)> {
    if results.is_empty() {
        return None;
    }
    match strategy {
        SelectionStrategy::FirstFound => Some(results.remove(0)),
        SelectionStrategy::BestScore => results
            .into_iter()
            .max_by(|a, b| a.1.score.partial_cmp(&b.1.score).unwrap()),
        SelectionStrategy::MostConfident => results
            .into_iter()
            .max_by(|a, b| a.1.confidence.partial_cmp(&b.1.confidence).unwrap()),
        SelectionStrategy::ExactPreferred => results
            .iter()
            .find(|(_, r)| r.quality == AlignmentQuality::Exact)
            .cloned()
            .or_else(|| {
                results
                    .into_iter()
                    .max_by(|a, b| a.1.quality.cmp(&b.1.quality))
            }),
        SelectionStrategy::PositionBased => results
            .into_iter()
            .min_by_key(|(interval, _)| interval.start_pos.unwrap_or(usize::MAX)),
    }
}

/// Legacy name kept from the teacher's public surface: a convenience
/// wrapper that aligns a batch of extractions against a document using the
/// default exact-then-fuzzy registry.
pub struct TextAligner {
    multi: MultiAligner,
    strategy: SelectionStrategy,
}

impl TextAligner {
    pub fn new(config: AlignmentConfig) -> Self {
        Self {
            multi: MultiAligner::new(config),
            strategy: SelectionStrategy::ExactPreferred,
        }
    }

    pub async fn align_extractions(
        &self,
        extractions: &mut [Extraction],
        source: &str,
    ) -> LangExtractResult<AlignmentStats> {
        self.align_extractions_cancellable(extractions, source, None).await
    }

    pub async fn align_extractions_cancellable(
        &self,
        extractions: &mut [Extraction],
        source: &str,
        cancellation: Option<&CancellationToken>,
    ) -> LangExtractResult<AlignmentStats> {
        let mut stats = AlignmentStats::default();
        for extraction in extractions.iter_mut() {
            stats.total += 1;
            match self
                .multi
                .align_with_best_cancellable(&extraction.extraction_text, source, self.strategy, cancellation)
                .await
            {
                Some((interval, result)) => {
                    extraction.set_char_interval(interval);
                    extraction.set_alignment(&result);
                    match result.quality {
                        AlignmentQuality::Exact => stats.exact += 1,
                        AlignmentQuality::Fuzzy | AlignmentQuality::Semantic => stats.fuzzy += 1,
                        AlignmentQuality::Partial | AlignmentQuality::Approximate => stats.lesser += 1,
                        AlignmentQuality::None => stats.unaligned += 1,
                    }
                }
                None => {
                    extraction.set_alignment(&AlignmentResult::none());
                    stats.unaligned += 1;
                }
            }
        }
        Ok(stats)
    }
}

/// Statistics describing how a batch of extractions aligned.
#[derive(Debug, Clone, Default)]
pub struct AlignmentStats {
    pub total: usize,
    pub exact: usize,
    pub fuzzy: usize,
    pub lesser: usize,
    pub greater: usize,
    pub unaligned: usize,
}

impl AlignmentStats {
    pub fn success_rate(&self) -> f32 {
        if self.total == 0 {
            return 0.0;
        }
        (self.total - self.unaligned) as f32 / self.total as f32
    }

    pub fn exact_match_rate(&self) -> f32 {
        if self.total == 0 {
            return 0.0;
        }
        self.exact as f32 / self.total as f32
    }
}

/// Raised when alignment selection is ambiguous (two aligners tie with no
/// tiebreak available).
pub fn ambiguous_alignment_error(extraction_text: &str) -> LangExtractError {
    let mut details = HashMap::new();
    details.insert("extraction_text".to_string(), extraction_text.to_string());
    LangExtractError::Ambiguous {
        message: format!("multiple equally-ranked alignments for '{}'", extraction_text),
        details,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn exact_aligner_finds_identical_text() {
        let aligner = ExactAligner::new();
        let options = AlignmentOptions::default();
        let (interval, result) = aligner
            .align("brown fox", "the quick brown fox jumps", &options)
            .unwrap();
        assert_eq!(interval.start_pos, Some(10));
        assert_eq!(result.quality, AlignmentQuality::Exact);
        assert_eq!(result.score, 1.0);
    }

    #[test]
    fn exact_aligner_handles_case_difference() {
        let aligner = ExactAligner::new();
        let options = AlignmentOptions::default();
        let (_, result) = aligner.align("BROWN FOX", "the quick brown fox", &options).unwrap();
        assert_eq!(result.quality, AlignmentQuality::Exact);
        assert!(result.score < 1.0);
    }

    #[test]
    fn fuzzy_aligner_finds_near_match() {
        let aligner = FuzzyAligner::new();
        let options = AlignmentOptions::default();
        let (_, result) = aligner
            .align("brown fax", "the quick brown fox jumps", &options)
            .unwrap();
        assert!(result.quality >= AlignmentQuality::Partial);
    }

    #[test]
    fn levenshtein_distance_is_correct() {
        assert_eq!(FuzzyAligner::levenshtein("kitten", "sitting"), 3);
        assert_eq!(FuzzyAligner::levenshtein("same", "same"), 0);
    }

    #[tokio::test]
    async fn multi_aligner_prefers_exact_over_fuzzy() {
        let registry = MultiAligner::with_defaults();
        let (_, result) = registry
            .align_with_best("brown fox", "the quick brown fox jumps", SelectionStrategy::ExactPreferred)
            .await
            .unwrap();
        assert_eq!(result.quality, AlignmentQuality::Exact);
    }

    #[tokio::test]
    async fn multi_aligner_falls_back_to_fuzzy() {
        let registry = MultiAligner::with_defaults();
        let (_, result) = registry
            .align_with_best("brown fax", "the quick brown fox jumps", SelectionStrategy::ExactPreferred)
            .await
            .unwrap();
        assert!(result.quality < AlignmentQuality::Exact);
    }

    #[tokio::test]
    async fn text_aligner_batches_extractions() {
        let aligner = TextAligner::new(AlignmentConfig::default());
        let mut extractions = vec![Extraction::new("animal".to_string(), "brown fox".to_string())];
        let stats = aligner
            .align_extractions(&mut extractions, "the quick brown fox jumps")
            .await
            .unwrap();
        assert_eq!(stats.total, 1);
        assert_eq!(stats.exact, 1);
        assert_eq!(extractions[0].alignment_quality, AlignmentQuality::Exact);
    }

    #[test]
    fn exact_aligner_scores_combined_case_and_whitespace_difference() {
        let aligner = ExactAligner::new();
        let options = AlignmentOptions::default();
        let (_, result) = aligner
            .align("BROWN   FOX", "the quick brown fox jumps", &options)
            .unwrap();
        assert_eq!(result.method, "exact_whitespace_normalized");
        assert!((result.score - 0.95).abs() < 1e-6);
    }

    #[test]
    fn exact_aligner_finds_every_occurrence_and_prefers_earliest_on_tie() {
        let aligner = ExactAligner::new();
        let options = AlignmentOptions::default();
        let (interval, result) = aligner.align("fox", "a fox, another fox, a third fox", &options).unwrap();
        assert_eq!(interval.start_pos, Some(2));
        assert_eq!(result.score, 1.0);
    }

    #[test]
    fn exact_aligner_rejects_matches_below_min_confidence() {
        let aligner = ExactAligner::new();
        let options = AlignmentOptions {
            min_confidence: 0.99,
            ..AlignmentOptions::default()
        };
        // The only occurrence scores 0.95 (whitespace-normalized), below the
        // 0.99 gate, so the match is rejected outright rather than returned.
        let result = aligner.align("BROWN   FOX", "the quick brown fox jumps", &options);
        assert!(result.is_none());
    }

    #[test]
    fn exact_aligner_truncates_candidates_to_max_candidates() {
        let aligner = ExactAligner::new();
        let options = AlignmentOptions {
            max_candidates: 1,
            min_confidence: 0.0,
            ..AlignmentOptions::default()
        };
        let (interval, _) = aligner.align("fox", "a fox, another fox, a third fox", &options).unwrap();
        assert_eq!(interval.start_pos, Some(2));
    }

    #[test]
    fn fuzzy_aligner_cancellation_stops_the_scan_before_the_match() {
        let aligner = FuzzyAligner::new();
        let options = AlignmentOptions::default();
        let token = CancellationToken::new();
        token.cancel();
        // Padding that shares no characters with the needle, followed far
        // later by a near match: an already-cancelled token must break the
        // scan before the window ever reaches the real match.
        let padding = "xyz".repeat(20);
        let source = format!("{}the quick brown fox jumps", padding);
        let result = aligner.align_cancellable("brown fax", &source, &options, Some(&token));
        assert!(result.is_none());
    }

    #[test]
    fn fuzzy_aligner_timeout_stops_the_scan_before_the_match() {
        let aligner = FuzzyAligner::new();
        let options = AlignmentOptions {
            timeout: Duration::from_nanos(1),
            ..AlignmentOptions::default()
        };
        std::thread::sleep(Duration::from_millis(5));
        let padding = "xyz".repeat(20);
        let source = format!("{}the quick brown fox jumps", padding);
        let result = aligner.align("brown fax", &source, &options);
        assert!(result.is_none());
    }
}
