use crate::error::Result;
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::path::{Path, PathBuf};

pub const DEFAULT_OUT_DIR: &str = "data";
pub const DEFAULT_RUN_NAME: &str = "output";

/// Where a run's JSON documents land: `<dir>/<name>-parts.json` and friends.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct OutputTarget {
    pub dir: PathBuf,
    pub name: String,
}

impl Default for OutputTarget {
    fn default() -> Self {
        Self::new(DEFAULT_OUT_DIR, DEFAULT_RUN_NAME)
    }
}

impl OutputTarget {
    pub fn new(dir: impl Into<PathBuf>, name: impl Into<String>) -> Self {
        Self {
            dir: dir.into(),
            name: name.into(),
        }
    }

    pub fn parts_path(&self) -> PathBuf {
        self.file("parts")
    }

    pub fn topics_path(&self) -> PathBuf {
        self.file("topics")
    }

    pub fn labels_path(&self) -> PathBuf {
        self.file("labels")
    }

    fn file(&self, kind: &str) -> PathBuf {
        self.dir.join(format!("{}-{kind}.json", self.name))
    }
}

/// Writes `value` as two-space indented JSON, replacing any previous file.
pub async fn write_json<T: Serialize>(path: &Path, value: &T) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        tokio::fs::create_dir_all(parent).await?;
    }
    let mut text = serde_json::to_string_pretty(value)?;
    text.push('\n');
    tokio::fs::write(path, text).await?;
    Ok(())
}

pub async fn read_json<T: DeserializeOwned>(path: &Path) -> Result<T> {
    let bytes = tokio::fs::read(path).await?;
    Ok(serde_json::from_slice(&bytes)?)
}

/// Same as [`write_json`], but failures are logged and reported as `None`.
pub async fn write_json_logged<T: Serialize>(path: &Path, value: &T) -> Option<PathBuf> {
    log::info!(target: "output", "Writing to file: {}", path.display());
    match write_json(path, value).await {
        Ok(()) => Some(path.to_path_buf()),
        Err(err) => {
            log::error!(target: "output", "Error writing to file at {}: {err}", path.display());
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use harvest_protocol::{ConceptRecord, PartTitle, ResultByPage};
    use pretty_assertions::assert_eq;

    #[test]
    fn paths_follow_run_name() {
        let target = OutputTarget::new("data", "fruits");
        assert_eq!(target.parts_path(), PathBuf::from("data/fruits-parts.json"));
        assert_eq!(target.topics_path(), PathBuf::from("data/fruits-topics.json"));
        assert_eq!(target.labels_path(), PathBuf::from("data/fruits-labels.json"));
    }

    #[tokio::test]
    async fn by_page_round_trips_through_disk() {
        let dir = tempfile::tempdir().unwrap();
        let target = OutputTarget::new(dir.path().join("nested"), "output");

        let mut by_page = ResultByPage::new();
        by_page.insert(
            "Banana - Cultivation".to_string(),
            vec![
                ConceptRecord {
                    title: PartTitle::new("Banana", "Cultivation"),
                    concept: "banana (Q503)".to_string(),
                    salience: 0.8,
                },
                ConceptRecord {
                    title: PartTitle::new("Banana", "Cultivation"),
                    concept: "India (Q668)".to_string(),
                    salience: 0.25,
                },
            ],
        );
        by_page.insert("Apple - History".to_string(), Vec::new());

        write_json(&target.parts_path(), &by_page).await.unwrap();
        let back: ResultByPage = read_json(&target.parts_path()).await.unwrap();
        assert_eq!(back, by_page);
        let keys: Vec<_> = back.keys().cloned().collect();
        assert_eq!(keys, vec!["Banana - Cultivation", "Apple - History"]);
    }

    #[tokio::test]
    async fn full_precision_saliences_survive_the_file() {
        let dir = tempfile::tempdir().unwrap();
        let target = OutputTarget::new(dir.path(), "output");
        let saliences = [
            0.9856906946328695,
            0.1 + 0.2,
            0.000_123_456_789_012_345_67,
            f64::EPSILON,
        ];

        let mut by_page = ResultByPage::new();
        by_page.insert(
            "Apple - History".to_string(),
            saliences
                .iter()
                .map(|&salience| ConceptRecord {
                    title: PartTitle::new("Apple", "History"),
                    concept: "fruit (Q3314483)".to_string(),
                    salience,
                })
                .collect(),
        );

        write_json(&target.parts_path(), &by_page).await.unwrap();
        let back: ResultByPage = read_json(&target.parts_path()).await.unwrap();
        let read: Vec<u64> = back["Apple - History"]
            .iter()
            .map(|r| r.salience.to_bits())
            .collect();
        let written: Vec<u64> = saliences.iter().map(|s| s.to_bits()).collect();
        assert_eq!(read, written);
        assert_eq!(back, by_page);
    }

    #[tokio::test]
    async fn write_failure_is_reported_not_raised() {
        let dir = tempfile::tempdir().unwrap();
        // A regular file where a directory is expected.
        let blocker = dir.path().join("blocker");
        std::fs::write(&blocker, "x").unwrap();
        let path = blocker.join("out-parts.json");
        assert_eq!(write_json_logged(&path, &ResultByPage::new()).await, None);
    }
}
