//! CSV export and import of tag change records.
//!
//! Columns: `ResourceGroup,VMName,ResourceId,OldTags,NewTags`, tag columns
//! holding compact JSON objects.

use crate::models::tags::{TagChange, TagMap};
use crate::Result;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// One CSV row.
#[derive(Debug, Serialize, Deserialize)]
struct TagChangeRow {
    #[serde(rename = "ResourceGroup")]
    resource_group: String,
    #[serde(rename = "VMName")]
    vm_name: String,
    #[serde(rename = "ResourceId")]
    resource_id: String,
    #[serde(rename = "OldTags")]
    old_tags: String,
    #[serde(rename = "NewTags")]
    new_tags: String,
}

impl From<&TagChange> for TagChangeRow {
    fn from(c: &TagChange) -> Self {
        Self {
            resource_group: c.resource_group.clone(),
            vm_name: c.vm_name.clone(),
            resource_id: c.resource_id.clone(),
            old_tags: c.old_tags.to_json(),
            new_tags: c.new_tags.to_json(),
        }
    }
}

/// Write tag changes to a CSV file.
pub fn write_tag_csv(path: &Path, changes: &[TagChange]) -> Result<()> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() && !parent.exists() {
            std::fs::create_dir_all(parent)?;
        }
    }

    let mut writer = csv::Writer::from_path(path)?;
    if changes.is_empty() {
        writer.write_record(["ResourceGroup", "VMName", "ResourceId", "OldTags", "NewTags"])?;
    }
    for change in changes {
        writer.serialize(TagChangeRow::from(change))?;
    }
    writer.flush()?;

    tracing::info!("Tag changes saved to {:?}", path);
    Ok(())
}

/// Read tag changes back from a CSV file.
pub fn read_tag_csv(path: &Path) -> Result<Vec<TagChange>> {
    if !path.exists() {
        return Err(crate::Error::PathNotFound(path.display().to_string()));
    }

    let mut reader = csv::Reader::from_path(path)?;
    let mut changes = Vec::new();

    for (idx, row) in reader.deserialize::<TagChangeRow>().enumerate() {
        let line = idx + 2;
        let row = row.map_err(|e| crate::Error::InvalidCsv(format!("row {}: {}", line, e)))?;

        if row.resource_id.trim().is_empty() {
            return Err(crate::Error::InvalidCsv(format!(
                "row {}: empty ResourceId",
                line
            )));
        }

        let old_tags = TagMap::from_json(&row.old_tags).map_err(|e| {
            crate::Error::InvalidCsv(format!("row {}: OldTags is not a JSON object: {}", line, e))
        })?;
        let new_tags = TagMap::from_json(&row.new_tags).map_err(|e| {
            crate::Error::InvalidCsv(format!("row {}: NewTags is not a JSON object: {}", line, e))
        })?;

        changes.push(TagChange {
            resource_group: row.resource_group,
            vm_name: row.vm_name,
            resource_id: row.resource_id,
            old_tags,
            new_tags,
        });
    }

    Ok(changes)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn change(id: &str, old: &[(&str, &str)], new: &[(&str, &str)]) -> TagChange {
        TagChange {
            resource_group: "rg".to_string(),
            vm_name: id.trim_start_matches("/vm/").to_string(),
            resource_id: id.to_string(),
            old_tags: old.iter().copied().collect(),
            new_tags: new.iter().copied().collect(),
        }
    }

    #[test]
    fn test_csv_layout() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("tagged.csv");
        let changes = vec![
            change("/vm/a", &[], &[("owner", "alice")]),
            change("/vm/b", &[("env", "prod")], &[("env", "prod"), ("owner", "alice")]),
        ];

        write_tag_csv(&path, &changes).unwrap();
        let content = std::fs::read_to_string(&path).unwrap();
        let lines: Vec<_> = content.lines().collect();

        assert_eq!(lines[0], "ResourceGroup,VMName,ResourceId,OldTags,NewTags");
        assert_eq!(lines[1], r#"rg,a,/vm/a,{},"{""owner"":""alice""}""#);
        assert_eq!(lines.len(), 3);

        assert_eq!(read_tag_csv(&path).unwrap(), changes);
    }

    #[test]
    fn test_empty_export_keeps_header() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("empty.csv");

        write_tag_csv(&path, &[]).unwrap();
        let content = std::fs::read_to_string(&path).unwrap();
        assert_eq!(content.trim(), "ResourceGroup,VMName,ResourceId,OldTags,NewTags");
        assert!(read_tag_csv(&path).unwrap().is_empty());
    }

    #[test]
    fn test_invalid_json_rejected() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("bad.csv");
        std::fs::write(
            &path,
            "ResourceGroup,VMName,ResourceId,OldTags,NewTags\nrg,a,/vm/a,not-json,{}\n",
        )
        .unwrap();

        assert!(matches!(read_tag_csv(&path), Err(crate::Error::InvalidCsv(_))));
    }

    #[test]
    fn test_missing_column_rejected() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("short.csv");
        std::fs::write(&path, "ResourceGroup,VMName,ResourceId\nrg,a,/vm/a\n").unwrap();

        assert!(matches!(read_tag_csv(&path), Err(crate::Error::InvalidCsv(_))));
    }
}
