//! Cascading, accumulative exclusion filters.
//!
//! A [`FilterStack`] is owned by each container in the catalog (a database
//! filters its schemas, a schema its tables, a table its columns). Filters
//! only ever hide items: the underlying collection is never touched, and the
//! visible subset is recomputed from the full collection every time a new
//! filter is stacked on.
//!
//! An item is hidden when any of the following holds:
//!
//! - its name is in any of the accumulated name lists,
//! - any accumulated pattern matches the start of its name,
//! - an embedding spec is set and the item's similarity to the reference
//!   embedding is at or below the threshold.
//!
//! Pinned items (primary and foreign key columns) are never hidden.

use regex::Regex;
use std::collections::BTreeSet;

/// Errors raised while stacking a filter.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum FilterError {
    /// No criterion was supplied.
    #[error("a filter needs at least one of: name list, regex pattern, embedding")]
    InvalidArgument,

    /// The regex pattern does not compile.
    #[error("invalid filter pattern '{pattern}': {reason}")]
    InvalidPattern { pattern: String, reason: String },
}

/// Something a [`FilterStack`] can hide.
pub trait Filterable {
    /// Original name, matched against name lists and patterns.
    fn name(&self) -> &str;

    /// Embedding vector, if one has been computed.
    fn embedding(&self) -> Option<&[f32]> {
        None
    }

    /// Whether the item must stay visible no matter which filters are active.
    fn is_pinned(&self) -> bool {
        false
    }
}

/// Similarity filter against a reference embedding (usually the embedded
/// natural-language question).
#[derive(Debug, Clone, PartialEq)]
pub struct EmbeddingSpec {
    /// The question the reference embedding was computed from.
    pub question: String,
    /// Reference embedding.
    pub embedding: Vec<f32>,
    /// Items scoring at or below this value are hidden.
    pub threshold: f32,
}

impl EmbeddingSpec {
    pub fn new(question: impl Into<String>, embedding: Vec<f32>, threshold: f32) -> Self {
        Self {
            question: question.into(),
            embedding,
            threshold,
        }
    }

    /// Dot-product similarity between the reference and `other`.
    pub fn similarity(&self, other: &[f32]) -> f32 {
        self.embedding
            .iter()
            .zip(other)
            .map(|(a, b)| a * b)
            .sum()
    }

    fn hides(&self, item: Option<&[f32]>) -> bool {
        match item {
            Some(embedding) => self.similarity(embedding) <= self.threshold,
            None => false,
        }
    }
}

/// Criteria for one `apply` call.
#[derive(Debug, Clone, Default)]
pub struct FilterCriteria {
    pub names: Option<Vec<String>>,
    pub pattern: Option<String>,
    pub embedding: Option<EmbeddingSpec>,
}

impl FilterCriteria {
    /// Exclude items by exact name.
    pub fn names<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            names: Some(names.into_iter().map(Into::into).collect()),
            ..Self::default()
        }
    }

    /// Exclude items whose name matches a regex pattern.
    pub fn pattern(pattern: impl Into<String>) -> Self {
        Self {
            pattern: Some(pattern.into()),
            ..Self::default()
        }
    }

    /// Exclude items dissimilar to a reference embedding.
    pub fn embedding(spec: EmbeddingSpec) -> Self {
        Self {
            embedding: Some(spec),
            ..Self::default()
        }
    }

    fn is_empty(&self) -> bool {
        self.names.is_none() && self.pattern.is_none() && self.embedding.is_none()
    }
}

#[derive(Debug, Clone)]
enum FilterSpec {
    Names(BTreeSet<String>),
    Pattern { source: String, regex: Regex },
}

/// Accumulated filter state for one container.
#[derive(Debug, Clone, Default)]
pub struct FilterStack {
    specs: Vec<FilterSpec>,
    embedding: Option<EmbeddingSpec>,
    active: bool,
    kept: Vec<usize>,
}

impl FilterStack {
    pub fn new() -> Self {
        Self::default()
    }

    /// Stack a new filter and recompute the visible subset of `items`.
    ///
    /// Name lists and patterns accumulate; an embedding spec replaces the
    /// previous one. Nothing is changed when the criteria are invalid.
    pub fn apply<T: Filterable>(
        &mut self,
        items: &[T],
        criteria: FilterCriteria,
    ) -> Result<(), FilterError> {
        if criteria.is_empty() {
            return Err(FilterError::InvalidArgument);
        }

        let compiled = match &criteria.pattern {
            Some(pattern) => Some(compile_pattern(pattern)?),
            None => None,
        };

        if let Some(names) = criteria.names {
            self.specs
                .push(FilterSpec::Names(names.into_iter().collect()));
        }
        if let (Some(source), Some(regex)) = (criteria.pattern, compiled) {
            self.specs.push(FilterSpec::Pattern { source, regex });
        }
        if let Some(spec) = criteria.embedding {
            self.embedding = Some(spec);
        }

        self.active = true;
        self.refresh(items);
        Ok(())
    }

    /// Recompute the visible subset from scratch against every stacked filter.
    pub fn refresh<T: Filterable>(&mut self, items: &[T]) {
        if !self.active {
            self.kept.clear();
            return;
        }

        let hidden_names: BTreeSet<&str> = self
            .specs
            .iter()
            .filter_map(|spec| match spec {
                FilterSpec::Names(names) => Some(names.iter().map(String::as_str)),
                FilterSpec::Pattern { .. } => None,
            })
            .flatten()
            .collect();

        let patterns: Vec<&Regex> = self
            .specs
            .iter()
            .filter_map(|spec| match spec {
                FilterSpec::Pattern { regex, .. } => Some(regex),
                FilterSpec::Names(_) => None,
            })
            .collect();

        self.kept = items
            .iter()
            .enumerate()
            .filter(|(_, item)| {
                if item.is_pinned() {
                    return true;
                }
                let name = item.name();
                if hidden_names.contains(name) || patterns.iter().any(|re| re.is_match(name)) {
                    return false;
                }
                !self
                    .embedding
                    .as_ref()
                    .is_some_and(|spec| spec.hides(item.embedding()))
            })
            .map(|(index, _)| index)
            .collect();

        tracing::trace!(
            filters = self.specs.len(),
            kept = self.kept.len(),
            total = items.len(),
            "Recomputed filtered subset"
        );
    }

    /// Drop every filter and mark the stack inactive.
    pub fn release(&mut self) {
        self.specs.clear();
        self.embedding = None;
        self.active = false;
        self.kept.clear();
    }

    pub fn is_active(&self) -> bool {
        self.active
    }

    /// Number of stacked name/pattern filters.
    pub fn len(&self) -> usize {
        self.specs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.specs.is_empty() && self.embedding.is_none()
    }

    /// The current embedding spec, if any.
    pub fn embedding_spec(&self) -> Option<&EmbeddingSpec> {
        self.embedding.as_ref()
    }

    /// Stacked patterns, in the order they were applied.
    pub fn patterns(&self) -> impl Iterator<Item = &str> {
        self.specs.iter().filter_map(|spec| match spec {
            FilterSpec::Pattern { source, .. } => Some(source.as_str()),
            FilterSpec::Names(_) => None,
        })
    }

    /// Items left visible: the kept subset when active, everything otherwise.
    pub fn visible<'a, T>(&self, items: &'a [T]) -> Vec<&'a T> {
        if self.active {
            self.kept.iter().filter_map(|&i| items.get(i)).collect()
        } else {
            items.iter().collect()
        }
    }

    /// Names of the items currently hidden, in collection order.
    pub fn excluded_names<T: Filterable>(&self, items: &[T]) -> Vec<String> {
        if !self.active {
            return Vec::new();
        }
        let kept: BTreeSet<usize> = self.kept.iter().copied().collect();
        items
            .iter()
            .enumerate()
            .filter(|(index, _)| !kept.contains(index))
            .map(|(_, item)| item.name().to_string())
            .collect()
    }
}

/// Check that a pattern compiles without stacking it anywhere.
pub fn validate_pattern(pattern: &str) -> Result<(), FilterError> {
    compile_pattern(pattern).map(|_| ())
}

/// Patterns match from the start of a name, not anywhere inside it.
fn compile_pattern(pattern: &str) -> Result<Regex, FilterError> {
    Regex::new(&format!("^(?:{pattern})")).map_err(|e| FilterError::InvalidPattern {
        pattern: pattern.to_string(),
        reason: e.to_string(),
    })
}
