use crate::core::{Record, SplitFile, Storage};
use crate::utils::error::Result;
use std::collections::HashSet;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FileNaming {
    /// Take the name from a record field, falling back to the position.
    IdField(String),
    /// Always name by position.
    Index,
}

/// 為每筆記錄產生唯一、可安全當作檔名的名稱
#[derive(Debug)]
pub struct FileNamer {
    naming: FileNaming,
    fallback_prefix: String,
    /// Lowercased, so `S1` and `s1` do not collide on case-insensitive file systems.
    used: HashSet<String>,
}

impl FileNamer {
    pub fn new(naming: FileNaming, fallback_prefix: impl Into<String>) -> Self {
        Self {
            naming,
            fallback_prefix: fallback_prefix.into(),
            used: HashSet::new(),
        }
    }

    /// Returns the file stem (no extension) for the record at `index`.
    pub fn name_for(&mut self, record: &Record, index: usize) -> String {
        let preferred = match &self.naming {
            FileNaming::IdField(field) => record
                .text_field(field)
                .and_then(|raw| sanitize_file_stem(&raw)),
            FileNaming::Index => None,
        };
        let base = preferred.unwrap_or_else(|| format!("{}_{}", self.fallback_prefix, index));

        let mut candidate = base.clone();
        let mut attempt = 0;
        while self.used.contains(&candidate.to_lowercase()) {
            candidate = if attempt == 0 {
                format!("{}_{}", base, index)
            } else {
                format!("{}_{}_{}", base, index, attempt)
            };
            attempt += 1;
        }

        if candidate != base {
            tracing::warn!(
                "Duplicate file name '{}' for entry {}, using '{}'",
                base,
                index,
                candidate
            );
        }
        self.used.insert(candidate.to_lowercase());
        candidate
    }
}

/// Keeps `[A-Za-z0-9._-]`, replaces everything else with `_` and strips
/// leading dots. `None` when nothing usable is left.
pub fn sanitize_file_stem(raw: &str) -> Option<String> {
    let cleaned: String = raw
        .trim()
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || matches!(c, '.' | '_' | '-') {
                c
            } else {
                '_'
            }
        })
        .collect();
    let cleaned = cleaned.trim_start_matches('.');

    if cleaned.is_empty() || cleaned.chars().all(|c| c == '_') {
        None
    } else {
        Some(cleaned.to_string())
    }
}

/// 將單筆記錄寫成 `<dir>/<stem>.json`（縮排 JSON），目錄不存在時自動建立
pub async fn split_record<S: Storage>(
    storage: &S,
    dir: &str,
    record: &Record,
    file_stem: &str,
) -> Result<SplitFile> {
    let file_name = format!("{}.json", file_stem);
    let dir = dir.trim_end_matches('/');
    let relative_path = if dir.is_empty() {
        file_name.clone()
    } else {
        format!("{}/{}", dir, file_name)
    };

    let bytes = serde_json::to_vec_pretty(record)?;
    storage.write_file(&relative_path, &bytes).await?;
    tracing::debug!("Wrote split file {} ({} bytes)", relative_path, bytes.len());

    Ok(SplitFile {
        file_name,
        path: storage.resolve(&relative_path),
        relative_path,
        bytes,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::test_support::MockStorage;
    use crate::domain::model::SAMPLE_ID_FIELD;
    use serde_json::json;

    fn record(value: serde_json::Value) -> Record {
        serde_json::from_value(value).unwrap()
    }

    #[test]
    fn test_sanitize_file_stem() {
        assert_eq!(sanitize_file_stem("S1").as_deref(), Some("S1"));
        assert_eq!(sanitize_file_stem("../etc/passwd").as_deref(), Some("_etc_passwd"));
        assert_eq!(sanitize_file_stem("sample 7/a").as_deref(), Some("sample_7_a"));
        assert_eq!(sanitize_file_stem("HG-001.v2").as_deref(), Some("HG-001.v2"));
        assert!(sanitize_file_stem("   ").is_none());
        assert!(sanitize_file_stem("//").is_none());
        assert!(sanitize_file_stem("..").is_none());
    }

    #[test]
    fn test_id_field_with_positional_fallback() {
        let mut namer = FileNamer::new(FileNaming::IdField(SAMPLE_ID_FIELD.to_string()), "Sample");

        assert_eq!(namer.name_for(&record(json!({"Sample ID": "S1"})), 0), "S1");
        assert_eq!(namer.name_for(&record(json!({"other": true})), 1), "Sample_1");
        assert_eq!(namer.name_for(&record(json!({"Sample ID": ""})), 2), "Sample_2");
    }

    #[test]
    fn test_names_are_unique_within_run() {
        let mut namer = FileNamer::new(FileNaming::IdField(SAMPLE_ID_FIELD.to_string()), "Sample");

        let first = namer.name_for(&record(json!({"Sample ID": "S1"})), 0);
        let second = namer.name_for(&record(json!({"Sample ID": "S1"})), 1);
        let collides_with_fallback = namer.name_for(&record(json!({"Sample ID": "Sample_3"})), 2);
        let fallback = namer.name_for(&record(json!({})), 3);

        let names: HashSet<_> = [&first, &second, &collides_with_fallback, &fallback]
            .into_iter()
            .collect();
        assert_eq!(names.len(), 4);
        assert_eq!(second, "S1_1");
        assert_eq!(fallback, "Sample_3_3");
    }

    #[test]
    fn test_names_differing_only_in_case_are_kept_apart() {
        let mut namer = FileNamer::new(FileNaming::IdField(SAMPLE_ID_FIELD.to_string()), "Sample");

        assert_eq!(namer.name_for(&record(json!({"Sample ID": "S1"})), 0), "S1");
        assert_eq!(namer.name_for(&record(json!({"Sample ID": "s1"})), 1), "s1_1");
        assert_eq!(namer.name_for(&record(json!({"Sample ID": "S1_1"})), 2), "S1_1_2");
    }

    #[test]
    fn test_index_naming_ignores_field() {
        let mut namer = FileNamer::new(FileNaming::Index, "file");
        assert_eq!(namer.name_for(&record(json!({"Sample ID": "S1"})), 4), "file_4");
    }

    #[tokio::test]
    async fn test_split_file_round_trips_record() {
        let storage = MockStorage::new();
        let original = record(json!({
            "Sample ID": "S1",
            "Patient DID": "did:x:1",
            "Variants": [{"chrom": "7", "pos": 117559590}]
        }));

        let split = split_record(&storage, "split_json_files/", &original, "S1")
            .await
            .unwrap();

        assert_eq!(split.file_name, "S1.json");
        assert_eq!(split.relative_path, "split_json_files/S1.json");

        let written = storage.get_file("split_json_files/S1.json").await.unwrap();
        assert_eq!(written, split.bytes);
        let parsed: Record = serde_json::from_slice(&written).unwrap();
        assert_eq!(parsed, original);
        assert!(String::from_utf8(written).unwrap().contains("\n  \"Sample ID\""));
    }
}
