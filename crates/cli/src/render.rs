use crate::flags::OutputFormat;
use anyhow::{Context as AnyhowContext, Result};
use harvest_protocol::{salience_key, Category, Concept, Entity, KeyPhrase, PartTitle};
use indexmap::IndexMap;
use serde::Serialize;

/// How many concepts (before the id filter) `collectconcepts` looks at.
pub(crate) const COLLECT_LIMIT: usize = 10;

/// Column headers plus stringified cells, shared by the table and CSV renderers.
#[derive(Debug, Default, PartialEq)]
pub(crate) struct Rows {
    pub headers: Vec<&'static str>,
    pub rows: Vec<Vec<String>>,
}

#[derive(Debug, Serialize, PartialEq)]
pub(crate) struct CollectedConcept {
    pub concept: String,
    pub salience: f64,
}

pub(crate) fn keyphrase_rows(keyphrases: &[KeyPhrase]) -> Rows {
    Rows {
        headers: vec!["phrase", "salience"],
        rows: keyphrases
            .iter()
            .map(|k| vec![k.phrase.clone(), opt_number(k.salience)])
            .collect(),
    }
}

pub(crate) fn concept_rows(concepts: &[Concept]) -> Rows {
    Rows {
        headers: vec!["phrase", "conceptId", "salience"],
        rows: concepts
            .iter()
            .map(|c| {
                vec![
                    c.phrase.clone(),
                    c.concept_id.clone(),
                    salience_key(c.salience),
                ]
            })
            .collect(),
    }
}

/// Entities sorted by mention count, most frequent first. Offsets and the normalized
/// form are left out.
pub(crate) fn entity_rows(mut entities: Vec<Entity>) -> Rows {
    entities.sort_by(|a, b| b.count.cmp(&a.count));
    Rows {
        headers: vec!["type", "mention", "count", "entityId", "confidence", "salience"],
        rows: entities
            .into_iter()
            .map(|e| {
                vec![
                    e.kind.unwrap_or_default(),
                    e.mention.unwrap_or_default(),
                    e.count.map(|c| c.to_string()).unwrap_or_default(),
                    e.entity_id.unwrap_or_default(),
                    opt_number(e.confidence),
                    opt_number(e.salience),
                ]
            })
            .collect(),
    }
}

pub(crate) fn category_rows(categories: &[Category]) -> Rows {
    Rows {
        headers: vec!["label", "confidence"],
        rows: categories
            .iter()
            .map(|c| vec![c.label.clone(), opt_number(c.confidence)])
            .collect(),
    }
}

/// `{"Page - Part": [{"concept": "phrase (Q..)", "salience": s}]}` over the first ten
/// concepts, entity ids only. A part without any entity concept renders as `{}`.
pub(crate) fn collect_concepts(
    title: &PartTitle,
    concepts: &[Concept],
) -> IndexMap<String, Vec<CollectedConcept>> {
    let mut out: IndexMap<String, Vec<CollectedConcept>> = IndexMap::new();
    for concept in concepts.iter().take(COLLECT_LIMIT) {
        if !concept.is_entity() {
            continue;
        }
        out.entry(title.to_string())
            .or_default()
            .push(CollectedConcept {
                concept: concept.label(),
                salience: concept.salience,
            });
    }
    out
}

/// Table or CSV; `collectconcepts` only means something for topics and is handled by
/// the caller, anything else reaching here falls back to a table.
pub(crate) fn render_rows(format: OutputFormat, rows: &Rows) -> Result<String> {
    match format {
        OutputFormat::Csv => render_csv(rows),
        OutputFormat::Table | OutputFormat::Collectconcepts => Ok(render_table(rows)),
    }
}

pub(crate) fn render_table(rows: &Rows) -> String {
    let mut widths: Vec<usize> = rows.headers.iter().map(|h| h.chars().count()).collect();
    let cells: Vec<Vec<String>> = rows
        .rows
        .iter()
        .map(|row| row.iter().map(|c| escape_cell(&one_line(c))).collect())
        .collect();
    for row in &cells {
        for (i, cell) in row.iter().enumerate() {
            if let Some(w) = widths.get_mut(i) {
                *w = (*w).max(cell.chars().count());
            }
        }
    }

    let mut md = String::new();
    push_row(&mut md, rows.headers.iter().copied(), &widths);
    md.push('|');
    for w in &widths {
        md.push_str(&"-".repeat(w + 2));
        md.push('|');
    }
    md.push('\n');
    for row in &cells {
        push_row(&mut md, row.iter().map(String::as_str), &widths);
    }
    md.truncate(md.trim_end().len());
    md
}

/// Values only, one line per row, no header line.
pub(crate) fn render_csv(rows: &Rows) -> Result<String> {
    let mut writer = csv::WriterBuilder::new()
        .has_headers(false)
        .from_writer(Vec::new());
    for row in &rows.rows {
        writer.write_record(row).context("Failed to encode CSV row")?;
    }
    let bytes = writer.into_inner().context("Failed to flush CSV output")?;
    let text = String::from_utf8(bytes).context("CSV output is not UTF-8")?;
    Ok(text.trim_end().to_string())
}

fn push_row<'a>(md: &mut String, cells: impl Iterator<Item = &'a str>, widths: &[usize]) {
    md.push('|');
    for (cell, w) in cells.zip(widths) {
        let pad = w.saturating_sub(cell.chars().count());
        md.push(' ');
        md.push_str(cell);
        md.push_str(&" ".repeat(pad));
        md.push_str(" |");
    }
    md.push('\n');
}

fn opt_number(value: Option<f64>) -> String {
    value.map(salience_key).unwrap_or_default()
}

fn one_line(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

fn escape_cell(text: &str) -> String {
    text.replace('|', "\\|")
}
