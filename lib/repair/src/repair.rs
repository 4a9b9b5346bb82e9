use crate::index::{EntityIndex, IndexEntry, IndexError, SearchField};
use crate::similarity::{normalize_term, sequence_ratio};
use graphdesk_model::PrefixTable;
use regex::Regex;
use std::collections::{BTreeMap, HashSet};
use std::sync::LazyLock;

/// Similarity thresholds for accepting a replacement.
///
/// Character-level near-misses (a typo in a local name) are held to a much
/// higher bar than matches derived from a question's topic words, which are
/// inherently noisier but must still clear a floor.
#[derive(Clone, Copy, Debug)]
pub struct RepairConfig {
    /// Minimum score for replacing a local name with a near-miss from the
    /// same namespace, or from the unscoped fallback search.
    pub exact_threshold: f64,
    /// Minimum score for replacing a predicate based on the question focus.
    pub focus_threshold: f64,
}

impl Default for RepairConfig {
    fn default() -> Self {
        Self {
            exact_threshold: 0.6,
            focus_threshold: 0.35,
        }
    }
}

/// The rewritten query together with the replacements that were applied.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct RepairOutcome {
    pub query: String,
    pub replacements: BTreeMap<String, String>,
}

static PREFIXED_TERM: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\b([A-Za-z_][A-Za-z0-9_\-]*):([A-Za-z_][A-Za-z0-9_\-.]*)\b").unwrap()
});

static FIRST_PREDICATE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^\S+\s+([A-Za-z_][A-Za-z0-9_\-]*:[A-Za-z_][A-Za-z0-9_\-.]*)\s+.+").unwrap()
});

static CONTINUED_PREDICATE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^([A-Za-z_][A-Za-z0-9_\-]*:[A-Za-z_][A-Za-z0-9_\-.]*)\s+.+").unwrap()
});

static QUESTION_WORDS: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"[a-zA-Z]+").unwrap());

const STOPWORDS: &[&str] = &[
    "a", "an", "the", "of", "to", "in", "on", "for", "with", "and", "or", "by", "from", "which",
    "what", "who", "where", "when", "how", "is", "are", "was", "were", "be", "been", "that",
    "this", "these", "those",
];

/// Replaces prefixed names that do not exist in the target graph with the
/// closest name that does, using the entity index as the source of truth.
///
/// Per term, in order: an unknown prefix is skipped; an exact index hit needs
/// no repair; otherwise the namespace-scoped candidates are scored, then (for
/// predicate-position terms with an accompanying question) candidates matching
/// the question focus, then an unscoped index search mapped back to prefixed
/// names. Any index failure skips the affected term only; the repair is
/// best-effort and never fails as a whole.
///
/// Accepted replacements are applied as whole-word textual substitutions over
/// the original query text.
pub async fn repair_query(
    query: &str,
    graph: Option<&str>,
    question: Option<&str>,
    prefixes: &PrefixTable,
    index: &dyn EntityIndex,
    config: RepairConfig,
) -> RepairOutcome {
    let mut replacements = BTreeMap::new();
    if prefixes.is_empty() {
        return RepairOutcome {
            query: query.to_owned(),
            replacements,
        };
    }

    let predicate_terms = extract_predicate_terms(query);
    let repairer = Repairer {
        graph,
        question: question.unwrap_or(""),
        focus: question.map(question_focus).unwrap_or_default(),
        prefixes,
        index,
        config,
    };

    for (prefix, local) in extract_prefixed_terms(query) {
        let term = format!("{prefix}:{local}");
        if replacements.contains_key(&term) {
            continue;
        }
        let is_predicate = predicate_terms.contains(&term);
        match repairer.repair_term(&prefix, &local, is_predicate).await {
            Ok(Some(replacement)) if replacement != term => {
                replacements.insert(term, replacement);
            }
            // A failed index lookup short-circuits this one term.
            Ok(_) | Err(_) => {}
        }
    }

    RepairOutcome {
        query: apply_replacements(query, &replacements),
        replacements,
    }
}

struct Repairer<'a> {
    graph: Option<&'a str>,
    question: &'a str,
    focus: String,
    prefixes: &'a PrefixTable,
    index: &'a dyn EntityIndex,
    config: RepairConfig,
}

impl Repairer<'_> {
    async fn repair_term(
        &self,
        prefix: &str,
        local: &str,
        is_predicate: bool,
    ) -> Result<Option<String>, IndexError> {
        let Some(namespace) = self.prefixes.namespace(prefix) else {
            return Ok(None);
        };
        let iri = format!("{namespace}{local}");
        if self.exact_match(&iri).await? {
            return Ok(None);
        }
        if let Some(best) = self.namespace_near_miss(namespace, local).await? {
            return Ok(Some(format!("{prefix}:{best}")));
        }
        if is_predicate && !self.focus.is_empty() {
            if let Some(best) = self.question_focus_match(namespace, local).await? {
                return Ok(Some(format!("{prefix}:{best}")));
            }
        }
        self.unscoped_match(local).await
    }

    async fn exact_match(&self, iri: &str) -> Result<bool, IndexError> {
        let hits = self.index.search(iri, SearchField::Iri, self.graph).await?;
        Ok(hits.iter().any(|hit| hit.iri == iri))
    }

    /// Scores every indexed IRI under the namespace against the local name.
    async fn namespace_near_miss(
        &self,
        namespace: &str,
        local: &str,
    ) -> Result<Option<String>, IndexError> {
        let hits = self
            .index
            .search(namespace, SearchField::Iri, self.graph)
            .await?;
        let target = normalize_term(local);
        let mut best: Option<&str> = None;
        let mut best_score = 0.0;
        for hit in &hits {
            let Some(candidate) = hit.iri.strip_prefix(namespace) else {
                continue;
            };
            let score = sequence_ratio(&target, &normalize_term(candidate));
            if score > best_score {
                best = Some(candidate);
                best_score = score;
            }
        }
        match best {
            Some(candidate)
                if best_score >= self.config.exact_threshold
                    && normalize_term(candidate) != target =>
            {
                Ok(Some(candidate.to_owned()))
            }
            _ => Ok(None),
        }
    }

    /// Scores namespace entities against the question focus, taking the best
    /// of label and local-name similarity for each candidate.
    async fn question_focus_match(
        &self,
        namespace: &str,
        local: &str,
    ) -> Result<Option<String>, IndexError> {
        let mut entities = self
            .namespace_entities(&self.focus, SearchField::Label, namespace)
            .await?;
        if entities.is_empty() {
            entities = self
                .namespace_entities(&self.focus, SearchField::Iri, namespace)
                .await?;
        }
        if entities.is_empty() {
            return Ok(None);
        }

        let question_norm = {
            let normalized = normalize_term(&self.focus);
            if normalized.is_empty() {
                normalize_term(self.question)
            } else {
                normalized
            }
        };
        let mut best: Option<&str> = None;
        let mut best_score = 0.0;
        for entity in &entities {
            let Some(candidate) = entity.iri.strip_prefix(namespace) else {
                continue;
            };
            let label = entity
                .label
                .as_deref()
                .filter(|label| !label.is_empty())
                .unwrap_or(candidate);
            let score = sequence_ratio(&question_norm, &normalize_term(label))
                .max(sequence_ratio(&question_norm, &normalize_term(candidate)));
            if score > best_score {
                best = Some(candidate);
                best_score = score;
            }
        }
        match best {
            Some(candidate)
                if best_score >= self.config.focus_threshold && candidate != local =>
            {
                Ok(Some(candidate.to_owned()))
            }
            _ => Ok(None),
        }
    }

    async fn namespace_entities(
        &self,
        text: &str,
        field: SearchField,
        namespace: &str,
    ) -> Result<Vec<IndexEntry>, IndexError> {
        let hits = self.index.search(text, field, self.graph).await?;
        Ok(hits
            .into_iter()
            .filter(|hit| hit.iri.starts_with(namespace))
            .collect())
    }

    /// Last resort: an unscoped search by the local name over both fields,
    /// mapped back to prefixed names through the reverse namespace lookup.
    async fn unscoped_match(&self, local: &str) -> Result<Option<String>, IndexError> {
        let mut seen = HashSet::new();
        let mut prefixed = Vec::new();
        for field in [SearchField::Label, SearchField::Iri] {
            for hit in self.index.search(local, field, self.graph).await? {
                if seen.insert(hit.iri.clone()) {
                    if let Some(name) = self.prefixes.compact(&hit.iri) {
                        prefixed.push(name);
                    }
                }
            }
        }

        let target = normalize_term(local);
        let mut best: Option<&String> = None;
        let mut best_score = 0.0;
        for candidate in &prefixed {
            let candidate_local = candidate
                .split_once(':')
                .map_or(candidate.as_str(), |(_, local)| local);
            let score = sequence_ratio(&target, &normalize_term(candidate_local));
            if score > best_score {
                best = Some(candidate);
                best_score = score;
            }
        }
        match best {
            Some(candidate) if best_score >= self.config.exact_threshold => {
                Ok(Some(candidate.clone()))
            }
            _ => Ok(None),
        }
    }
}

/// All `prefix:local` terms in the query body, in order of appearance.
/// `PREFIX` and `BASE` declaration lines are not part of the body.
fn extract_prefixed_terms(query: &str) -> Vec<(String, String)> {
    let mut terms = Vec::new();
    for line in query.lines() {
        let stripped = line.trim().to_ascii_uppercase();
        if stripped.starts_with("PREFIX") || stripped.starts_with("BASE") {
            continue;
        }
        for caps in PREFIXED_TERM.captures_iter(line) {
            terms.push((caps[1].to_owned(), caps[2].to_owned()));
        }
    }
    terms
}

/// Terms occurring in predicate position, found by splitting each
/// triple-pattern line on `;` and matching the predicate slot of each part.
fn extract_predicate_terms(query: &str) -> HashSet<String> {
    let mut predicates = HashSet::new();
    for line in query.lines() {
        let stripped = line.trim();
        let upper = stripped.to_ascii_uppercase();
        if stripped.is_empty() || upper.starts_with("PREFIX") || upper.starts_with("BASE") {
            continue;
        }
        let parts: Vec<&str> = stripped
            .split(';')
            .map(str::trim)
            .filter(|part| !part.is_empty())
            .collect();
        let Some((first, rest)) = parts.split_first() else {
            continue;
        };
        if let Some(caps) = FIRST_PREDICATE.captures(first) {
            predicates.insert(caps[1].to_owned());
        }
        for part in rest {
            if let Some(caps) = CONTINUED_PREDICATE.captures(part) {
                predicates.insert(caps[1].to_owned());
            }
        }
    }
    predicates
}

/// The question with stopwords removed, joined back into a focus string.
fn question_focus(question: &str) -> String {
    QUESTION_WORDS
        .find_iter(&question.to_lowercase())
        .map(|word| word.as_str())
        .filter(|word| !STOPWORDS.contains(word))
        .collect::<Vec<_>>()
        .join(" ")
}

fn apply_replacements(query: &str, replacements: &BTreeMap<String, String>) -> String {
    let mut updated = query.to_owned();
    for (old, new) in replacements {
        let pattern = format!(r"\b{}\b", regex::escape(old));
        if let Ok(re) = Regex::new(&pattern) {
            updated = re.replace_all(&updated, regex::NoExpand(new)).into_owned();
        }
    }
    updated
}
