use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A file picked for upload; only its metadata is held
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LabFile {
    pub id: Uuid,
    pub name: String,
    pub size_bytes: u64,
    pub content_type: Option<String>,
}

impl LabFile {
    pub fn new(name: impl Into<String>, size_bytes: u64) -> Self {
        Self {
            id: Uuid::new_v4(),
            name: name.into(),
            size_bytes,
            content_type: None,
        }
    }

    pub fn with_content_type(mut self, content_type: impl Into<String>) -> Self {
        self.content_type = Some(content_type.into());
        self
    }

    /// Size in whole kilobytes, rounded to nearest
    pub fn size_kb(&self) -> u64 {
        (self.size_bytes as f64 / 1024.0).round() as u64
    }

    pub fn size_label(&self) -> String {
        format!("{} KB", self.size_kb())
    }
}

/// Ordered list of files awaiting transfer
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LabUpload {
    files: Vec<LabFile>,
}

impl LabUpload {
    pub fn files(&self) -> &[LabFile] {
        &self.files
    }

    pub fn len(&self) -> usize {
        self.files.len()
    }

    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }

    pub fn total_bytes(&self) -> u64 {
        self.files.iter().map(|f| f.size_bytes).sum()
    }

    /// Return a copy with `files` appended in order
    pub fn with_files(&self, files: impl IntoIterator<Item = LabFile>) -> Self {
        let mut next = self.clone();
        next.files.extend(files);
        next
    }

    /// Return a copy without the file with `id`
    pub fn without_file(&self, id: Uuid) -> Self {
        Self {
            files: self.files.iter().filter(|f| f.id != id).cloned().collect(),
        }
    }
}
