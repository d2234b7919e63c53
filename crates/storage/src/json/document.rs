use std::collections::BTreeMap;

use fakefinder_core::model::ImagePairDraft;
use serde::{Deserialize, Serialize};

use crate::repository::StorageError;

/// Descriptive header written by the mapping tool. Informational only.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CatalogMetadata {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub total_images: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub real_count: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fake_count: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub generated_at: Option<String>,
}

/// One pair entry in the `pairs` array.
///
/// Paths may be given directly (`real`/`fake`, or `real_path`/`fake_path`) or
/// indirectly through `real_key`/`fake_key` into the document's `images` map.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PairRecord {
    #[serde(default)]
    pub id: String,
    #[serde(default, alias = "real_path", skip_serializing_if = "Option::is_none")]
    pub real: Option<String>,
    #[serde(default, alias = "fake_path", skip_serializing_if = "Option::is_none")]
    pub fake: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub real_key: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fake_key: Option<String>,
}

/// Top-level catalog document. `pairs` is the only required field.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CatalogDocument {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metadata: Option<CatalogMetadata>,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub images: BTreeMap<String, String>,
    pub pairs: Vec<PairRecord>,
}

impl CatalogDocument {
    /// Parse a document from JSON text.
    ///
    /// # Errors
    ///
    /// Returns `StorageError::Serialization` for malformed JSON or a missing `pairs` field.
    pub fn from_json(raw: &str) -> Result<Self, StorageError> {
        Ok(serde_json::from_str(raw)?)
    }

    /// Render the document as pretty-printed JSON.
    ///
    /// # Errors
    ///
    /// Returns `StorageError::Serialization` if encoding fails.
    pub fn to_json_pretty(&self) -> Result<String, StorageError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Resolve every record into a draft, looking keys up in `images` where needed.
    ///
    /// Unresolvable paths become empty strings so pair validation rejects that record
    /// rather than the whole document.
    #[must_use]
    pub fn into_drafts(self) -> Vec<ImagePairDraft> {
        let images = self.images;
        let resolve = |direct: Option<String>, key: Option<String>| {
            direct
                .or_else(|| key.and_then(|key| images.get(&key).cloned()))
                .unwrap_or_default()
        };

        self.pairs
            .into_iter()
            .map(|record| {
                let real = resolve(record.real, record.real_key);
                let fake = resolve(record.fake, record.fake_key);
                ImagePairDraft::new(record.id, real, fake)
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const MAPPING: &str = r#"{
        "metadata": {
            "total_images": 4,
            "real_count": 2,
            "fake_count": 2,
            "generated_at": "2024-01-01"
        },
        "images": {
            "real_0": "images/k3j9x0a1b2c3.jpg",
            "fake_0": "images/p0o9i8u7y6t5.jpg",
            "real_1": "images/zz11yy22xx33.jpg",
            "fake_1": "images/qq44ww55ee66.jpg"
        },
        "pairs": [
            {
                "id": "pair_0",
                "real": "images/k3j9x0a1b2c3.jpg",
                "fake": "images/p0o9i8u7y6t5.jpg",
                "real_key": "real_0",
                "fake_key": "fake_0"
            },
            { "id": "pair_1", "real_key": "real_1", "fake_key": "fake_1" }
        ]
    }"#;

    #[test]
    fn parses_mapping_tool_output() {
        let doc = CatalogDocument::from_json(MAPPING).unwrap();
        assert_eq!(doc.metadata.as_ref().unwrap().real_count, Some(2));

        let drafts = doc.into_drafts();
        assert_eq!(drafts.len(), 2);
        assert_eq!(drafts[0].real_path, "images/k3j9x0a1b2c3.jpg");
        assert_eq!(drafts[1].real_path, "images/zz11yy22xx33.jpg");
        assert_eq!(drafts[1].fake_path, "images/qq44ww55ee66.jpg");
    }

    #[test]
    fn accepts_path_aliases() {
        let doc = CatalogDocument::from_json(
            r#"{ "pairs": [ { "id": "a", "real_path": "r.jpg", "fake_path": "f.jpg" } ] }"#,
        )
        .unwrap();
        let drafts = doc.into_drafts();
        assert_eq!(drafts[0].real_path, "r.jpg");
        assert_eq!(drafts[0].fake_path, "f.jpg");
    }

    #[test]
    fn missing_pairs_field_is_a_serialization_error() {
        let err = CatalogDocument::from_json(r#"{ "metadata": {} }"#).unwrap_err();
        assert!(matches!(err, StorageError::Serialization(_)));
    }

    #[test]
    fn unresolvable_key_yields_empty_path() {
        let doc =
            CatalogDocument::from_json(r#"{ "pairs": [ { "id": "a", "real_key": "nope", "fake": "f.jpg" } ] }"#)
                .unwrap();
        let drafts = doc.into_drafts();
        assert_eq!(drafts[0].real_path, "");
        assert!(drafts[0].clone().validate().is_err());
    }

    #[test]
    fn pretty_json_parses_back() {
        let doc = CatalogDocument {
            metadata: None,
            images: BTreeMap::new(),
            pairs: vec![PairRecord {
                id: "pair_0".into(),
                real: Some("r.jpg".into()),
                fake: Some("f.jpg".into()),
                ..PairRecord::default()
            }],
        };
        let json = doc.to_json_pretty().unwrap();
        assert!(!json.contains("metadata"));
        assert_eq!(CatalogDocument::from_json(&json).unwrap(), doc);
    }
}
