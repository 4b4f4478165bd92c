use anyhow::Result;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Knowledge-base entity identifiers start with this prefix ("Q42"); property
/// identifiers ("P31") do not.
pub const ENTITY_ID_PREFIX: &str = "Q";

/// A named sub-section of a wiki page.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct Part {
    pub name: String,
    /// Raw, unsanitized section content as served by the GraphQL service.
    #[serde(rename = "unsafe", default)]
    pub content: String,
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Concept {
    pub phrase: String,
    pub concept_id: String,
    pub salience: f64,
}

impl Concept {
    pub fn is_entity(&self) -> bool {
        self.concept_id.starts_with(ENTITY_ID_PREFIX)
    }

    pub fn label(&self) -> String {
        format!("{} ({})", self.phrase, self.concept_id)
    }
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct KeyPhrase {
    pub phrase: String,
    #[serde(default)]
    pub salience: Option<f64>,
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct MentionOffset {
    pub start_offset: u64,
    pub end_offset: u64,
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Entity {
    #[serde(rename = "type", default)]
    pub kind: Option<String>,
    #[serde(default)]
    pub mention: Option<String>,
    #[serde(default)]
    pub normalized: Option<String>,
    #[serde(default)]
    pub count: Option<u64>,
    #[serde(default)]
    pub mention_offsets: Vec<MentionOffset>,
    #[serde(default)]
    pub entity_id: Option<String>,
    #[serde(default)]
    pub confidence: Option<f64>,
    #[serde(default)]
    pub salience: Option<f64>,
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct Category {
    pub label: String,
    #[serde(default)]
    pub confidence: Option<f64>,
}

/// Subset of the NLU response body the harvester consumes. Which lists are populated
/// depends on the endpoint that produced it.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Default)]
pub struct NluResponse {
    #[serde(default)]
    pub concepts: Vec<Concept>,
    #[serde(default)]
    pub keyphrases: Vec<KeyPhrase>,
    #[serde(default)]
    pub entities: Vec<Entity>,
    #[serde(default)]
    pub categories: Vec<Category>,
}

#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[serde(rename_all = "snake_case")]
pub enum NluEndpoint {
    #[default]
    Topics,
    Entities,
    Categories,
}

impl NluEndpoint {
    pub const fn as_str(self) -> &'static str {
        match self {
            NluEndpoint::Topics => "topics",
            NluEndpoint::Entities => "entities",
            NluEndpoint::Categories => "categories",
        }
    }
}

impl fmt::Display for NluEndpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for NluEndpoint {
    type Err = anyhow::Error;

    fn from_str(raw: &str) -> Result<Self> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "topics" => Ok(Self::Topics),
            "entities" => Ok(Self::Entities),
            "categories" => Ok(Self::Categories),
            other => anyhow::bail!(
                "Unsupported NLU endpoint '{other}' (expected 'topics', 'entities' or 'categories')"
            ),
        }
    }
}

/// Origin of a concept record: which page and which of its parts.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq, Hash)]
pub struct PartTitle {
    pub page: String,
    pub part: String,
}

impl PartTitle {
    pub fn new(page: impl Into<String>, part: impl Into<String>) -> Self {
        Self {
            page: page.into(),
            part: part.into(),
        }
    }
}

impl fmt::Display for PartTitle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} - {}", self.page, self.part)
    }
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct ConceptRecord {
    pub title: PartTitle,
    pub concept: String,
    pub salience: f64,
}

impl ConceptRecord {
    pub fn new(title: PartTitle, concept: &Concept) -> Self {
        Self {
            title,
            concept: concept.label(),
            salience: concept.salience,
        }
    }

    /// Identifier recovered from the `"<phrase> (<id>)"` label.
    pub fn concept_id(&self) -> Option<&str> {
        let (_, tail) = self.concept.rsplit_once(" (")?;
        tail.strip_suffix(')').filter(|id| !id.is_empty())
    }
}

/// `"Page - Part"` → ranked concept records, in the order parts were processed.
pub type ResultByPage = IndexMap<String, Vec<ConceptRecord>>;

/// Concept label → salience (as a decimal string) → origin title.
pub type ResultByTopic = IndexMap<String, IndexMap<String, PartTitle>>;

/// Renders a salience score the way JavaScript's `Number#toString` does, since these
/// strings are object keys in the topics file: plain decimals in `[1e-6, 1e21)`,
/// exponent form (`1e-7`, `1.5e+21`) outside it.
pub fn salience_key(salience: f64) -> String {
    if salience.is_nan() {
        return "NaN".to_string();
    }
    if salience.is_infinite() {
        let sign = if salience < 0.0 { "-" } else { "" };
        return format!("{sign}Infinity");
    }
    if salience == 0.0 {
        return "0".to_string();
    }
    let magnitude = salience.abs();
    if (1e-6..1e21).contains(&magnitude) {
        return format!("{salience}");
    }
    let exp = format!("{salience:e}");
    match exp.split_once('e') {
        Some((mantissa, power)) if !power.starts_with('-') => format!("{mantissa}e+{power}"),
        _ => exp,
    }
}
