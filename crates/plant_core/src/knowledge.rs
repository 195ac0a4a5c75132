//! Static advice per class label, loaded once at startup.

use crate::error::{Error, Result};
use crate::job::Job;
use crate::labels::{ClassLabel, LabelSet};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

pub const NO_ADVICE: &str = "No specific advice available.";
pub const NO_MEDICINE: &str = "No specific medicine information available.";
pub const MISSING_MEDICINE: &str = "N/A";

/// One record of `knowledge_base.json`. Absent, `null` and empty fields all
/// fall back to placeholder text on lookup.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct KnowledgeEntry {
    #[serde(default)]
    pub advice: Option<String>,
    #[serde(default)]
    pub medicine: Option<String>,
}

/// Any value found under a label key.
#[derive(Deserialize)]
#[serde(untagged)]
enum RawEntry {
    Record(KnowledgeEntry),
    Other(serde_json::Value),
}

/// Text shown for a diagnosed label.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Advice {
    pub advice: String,
    pub medicine: String,
    /// False when the label had no entry and placeholders were used.
    pub found: bool,
}

#[derive(Debug, Clone, Default)]
pub struct KnowledgeBase {
    entries: HashMap<String, KnowledgeEntry>,
}

impl KnowledgeBase {
    pub fn from_json_str(json: &str) -> Result<Self> {
        Self::parse(json, Path::new(""))
    }

    /// Read and parse the knowledge base file. An empty object counts as a
    /// failed load.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let raw = fs::read_to_string(path)?;
        let kb = Self::parse(&raw, path)?;
        tracing::info!(
            "Knowledge base loaded: {} entries from {}",
            kb.len(),
            path.display()
        );
        Ok(kb)
    }

    /// `null` entries count as missing; any other non-record value is kept
    /// as an entry without text.
    fn parse(json: &str, origin: &Path) -> Result<Self> {
        let raw: HashMap<String, RawEntry> = serde_json::from_str(json)?;
        if raw.is_empty() {
            return Err(Error::KnowledgeBaseEmpty(origin.to_path_buf()));
        }
        let entries = raw
            .into_iter()
            .filter_map(|(label, entry)| match entry {
                RawEntry::Record(record) => Some((label, record)),
                RawEntry::Other(serde_json::Value::Null) => None,
                RawEntry::Other(value) => {
                    tracing::warn!("Knowledge base entry for {label} is not a record: {value}");
                    Some((label, KnowledgeEntry::default()))
                }
            })
            .collect();
        Ok(Self { entries })
    }

    /// Load on a worker thread and warn about labels without advice.
    pub fn load_in_background(path: PathBuf, labels: LabelSet) -> Job<KnowledgeBase> {
        Job::spawn("knowledge-base", move || {
            let kb = Self::load(&path).inspect_err(|e| {
                tracing::error!("Error loading knowledge base {}: {e}", path.display());
            })?;
            for label in kb.missing_labels(&labels) {
                tracing::warn!("No knowledge base entry for {label}");
            }
            Ok(kb)
        })
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Advice for `label`, or placeholder text when there is no entry.
    pub fn lookup(&self, label: &ClassLabel) -> Advice {
        match self.entries.get(label.as_str()) {
            Some(entry) => Advice {
                advice: text_or(entry.advice.as_deref(), NO_ADVICE),
                medicine: text_or(entry.medicine.as_deref(), NO_MEDICINE),
                found: true,
            },
            None => Advice {
                advice: format!("Detailed information not found for: {label}"),
                medicine: MISSING_MEDICINE.to_string(),
                found: false,
            },
        }
    }

    /// Labels the classifier can produce that have no entry.
    pub fn missing_labels<'a>(&self, labels: &'a LabelSet) -> Vec<&'a ClassLabel> {
        labels
            .iter()
            .filter(|l| !self.entries.contains_key(l.as_str()))
            .collect()
    }
}

fn text_or(value: Option<&str>, fallback: &str) -> String {
    match value {
        Some(text) if !text.is_empty() => text.to_string(),
        _ => fallback.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::{NamedTempFile, tempdir};

    const SAMPLE: &str = r#"{
        "Apple___Apple_scab": {"advice": "Remove fallen leaves.", "medicine": "Captan"},
        "Apple___healthy": {"advice": "Keep it up."}
    }"#;

    #[test]
    fn lookup_returns_stored_text_exactly() -> Result<()> {
        let kb = KnowledgeBase::from_json_str(SAMPLE)?;
        let advice = kb.lookup(&ClassLabel::new("Apple___Apple_scab"));
        assert!(advice.found);
        assert_eq!(advice.advice, "Remove fallen leaves.");
        assert_eq!(advice.medicine, "Captan");
        Ok(())
    }

    #[test]
    fn missing_field_uses_fallback_text() -> Result<()> {
        let kb = KnowledgeBase::from_json_str(SAMPLE)?;
        let advice = kb.lookup(&ClassLabel::new("Apple___healthy"));
        assert!(advice.found);
        assert_eq!(advice.advice, "Keep it up.");
        assert_eq!(advice.medicine, NO_MEDICINE);
        Ok(())
    }

    #[test]
    fn missing_label_uses_placeholder() -> Result<()> {
        let kb = KnowledgeBase::from_json_str(SAMPLE)?;
        let advice = kb.lookup(&ClassLabel::new("Tomato___Leaf_Mold"));
        assert!(!advice.found);
        assert_eq!(
            advice.advice,
            "Detailed information not found for: Tomato___Leaf_Mold"
        );
        assert_eq!(advice.medicine, "N/A");
        Ok(())
    }

    #[test]
    fn empty_object_is_a_failed_load() {
        assert!(matches!(
            KnowledgeBase::from_json_str("{}"),
            Err(Error::KnowledgeBaseEmpty(_))
        ));
    }

    #[test]
    fn load_reads_file() -> Result<()> {
        let mut file = NamedTempFile::new()?;
        file.write_all(SAMPLE.as_bytes())?;
        let kb = KnowledgeBase::load(file.path())?;
        assert_eq!(kb.len(), 2);
        Ok(())
    }

    #[test]
    fn null_fields_use_fallback_text() -> Result<()> {
        let kb = KnowledgeBase::from_json_str(
            r#"{"Apple___healthy": {"advice": null, "medicine": "x"},
                "Apple___Black_rot": {"advice": "", "medicine": null}}"#,
        )?;
        let healthy = kb.lookup(&ClassLabel::new("Apple___healthy"));
        assert_eq!(healthy.advice, NO_ADVICE);
        assert_eq!(healthy.medicine, "x");
        let rot = kb.lookup(&ClassLabel::new("Apple___Black_rot"));
        assert_eq!(rot.advice, NO_ADVICE);
        assert_eq!(rot.medicine, NO_MEDICINE);
        Ok(())
    }

    #[test]
    fn non_record_entries_do_not_fail_the_load() -> Result<()> {
        let kb = KnowledgeBase::from_json_str(
            r#"{"Apple___healthy": "see website",
                "Apple___Black_rot": null,
                "Apple___Apple_scab": {"advice": "Rake leaves.", "medicine": "Captan"}}"#,
        )?;
        assert_eq!(kb.len(), 2);
        let healthy = kb.lookup(&ClassLabel::new("Apple___healthy"));
        assert!(healthy.found);
        assert_eq!(healthy.advice, NO_ADVICE);
        assert_eq!(healthy.medicine, NO_MEDICINE);
        let rot = kb.lookup(&ClassLabel::new("Apple___Black_rot"));
        assert!(!rot.found);
        assert_eq!(rot.medicine, MISSING_MEDICINE);
        assert_eq!(
            kb.lookup(&ClassLabel::new("Apple___Apple_scab")).advice,
            "Rake leaves."
        );
        Ok(())
    }

    #[test]
    fn empty_file_error_names_the_file() -> Result<()> {
        let mut file = NamedTempFile::new()?;
        file.write_all(b"{}")?;
        match KnowledgeBase::load(file.path()) {
            Err(Error::KnowledgeBaseEmpty(path)) => assert_eq!(path, file.path()),
            other => panic!("expected an empty knowledge base error, got {other:?}"),
        }
        Ok(())
    }

    #[test]
    fn load_reports_missing_file() -> Result<()> {
        let dir = tempdir()?;
        let err = KnowledgeBase::load(dir.path().join("absent.json")).unwrap_err();
        assert!(matches!(err, Error::Io(_)));
        Ok(())
    }

    #[test]
    fn load_reports_malformed_json() -> Result<()> {
        let mut file = NamedTempFile::new()?;
        file.write_all(b"{\"Apple___healthy\": ")?;
        assert!(matches!(KnowledgeBase::load(file.path()), Err(Error::Json(_))));
        Ok(())
    }

    #[test]
    fn missing_labels_lists_uncovered_classes() -> Result<()> {
        let kb = KnowledgeBase::from_json_str(SAMPLE)?;
        let labels = LabelSet::plant_village();
        let missing = kb.missing_labels(&labels);
        assert_eq!(missing.len(), 36);
        assert!(missing.iter().all(|l| l.as_str() != "Apple___healthy"));
        Ok(())
    }

    #[test]
    fn background_load_resolves() -> Result<()> {
        let mut file = NamedTempFile::new()?;
        file.write_all(SAMPLE.as_bytes())?;
        let job = KnowledgeBase::load_in_background(
            file.path().to_path_buf(),
            LabelSet::plant_village(),
        );
        assert_eq!(job.wait()?.len(), 2);
        Ok(())
    }

    #[test]
    fn bundled_knowledge_base_covers_every_class() -> Result<()> {
        let path = Path::new(env!("CARGO_MANIFEST_DIR")).join("../../assets/knowledge_base.json");
        let kb = KnowledgeBase::load(path)?;
        assert!(kb.missing_labels(&LabelSet::plant_village()).is_empty());
        Ok(())
    }
}
