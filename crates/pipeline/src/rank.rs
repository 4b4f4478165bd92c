use harvest_protocol::{
    salience_key, Concept, ConceptRecord, PartTitle, ResultByPage, ResultByTopic, ENTITY_ID_PREFIX,
};

pub const DEFAULT_CONCEPT_LIMIT: usize = 20;

/// Which extracted concepts make it into the by-page result.
#[derive(Clone, Debug, PartialEq)]
pub struct RankPolicy {
    /// Cut applied after sorting and before the prefix filter.
    pub limit: usize,
    pub id_prefix: String,
    /// Keep only concepts strictly above this salience.
    pub min_salience: Option<f64>,
}

impl Default for RankPolicy {
    fn default() -> Self {
        Self {
            limit: DEFAULT_CONCEPT_LIMIT,
            id_prefix: ENTITY_ID_PREFIX.to_string(),
            min_salience: None,
        }
    }
}

/// Sorts by salience (highest first), truncates to `policy.limit`, then drops
/// concepts outside the identifier prefix or under the salience floor. Equal
/// saliences keep their response order.
pub fn rank_concepts(mut concepts: Vec<Concept>, policy: &RankPolicy) -> Vec<Concept> {
    concepts.sort_by(|a, b| b.salience.total_cmp(&a.salience));
    concepts.truncate(policy.limit);
    concepts.retain(|c| {
        c.concept_id.starts_with(policy.id_prefix.as_str())
            && policy.min_salience.map_or(true, |min| c.salience > min)
    });
    concepts
}

/// Appends ranked concepts under `"Page - Part"`. The bucket is created on the first
/// retained concept, so parts without any leave no trace.
pub fn record_part(by_page: &mut ResultByPage, title: &PartTitle, ranked: &[Concept]) {
    if ranked.is_empty() {
        return;
    }
    let bucket = by_page.entry(title.to_string()).or_default();
    bucket.extend(
        ranked
            .iter()
            .map(|concept| ConceptRecord::new(title.clone(), concept)),
    );
}

/// Rekeys every record under its concept and then its salience. A later record with
/// the same concept and salience replaces the earlier one.
pub fn by_topic(by_page: &ResultByPage) -> ResultByTopic {
    let mut topics = ResultByTopic::new();
    for record in by_page.values().flatten() {
        topics
            .entry(record.concept.clone())
            .or_default()
            .insert(salience_key(record.salience), record.title.clone());
    }
    topics
}

/// Distinct concept identifiers in first-seen order.
pub fn concept_ids(by_page: &ResultByPage) -> Vec<String> {
    let ids: indexmap::IndexSet<&str> = by_page
        .values()
        .flatten()
        .filter_map(ConceptRecord::concept_id)
        .collect();
    ids.into_iter().map(str::to_string).collect()
}
