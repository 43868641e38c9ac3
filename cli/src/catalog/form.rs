//! Outgoing form payloads.
//!
//! A payload is the exact field list a create/update sends, plus an image
//! upload only when the user picked a new file.

use serde_json::{Map, Value};
use std::path::Path;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageUpload {
    pub file_name: String,
    pub bytes: Vec<u8>,
}

impl ImageUpload {
    pub async fn read(path: &Path) -> std::io::Result<Self> {
        let bytes = tokio::fs::read(path).await?;
        let file_name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| "image".to_string());
        Ok(ImageUpload { file_name, bytes })
    }

    pub fn mime_type(&self) -> &'static str {
        let ext = Path::new(&self.file_name)
            .extension()
            .map(|e| e.to_string_lossy().to_lowercase())
            .unwrap_or_default();
        match ext.as_str() {
            "png" => "image/png",
            "jpg" | "jpeg" => "image/jpeg",
            "gif" => "image/gif",
            "webp" => "image/webp",
            "svg" => "image/svg+xml",
            _ => "application/octet-stream",
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FormPayload {
    fields: Vec<(String, String)>,
    image: Option<ImageUpload>,
}

impl FormPayload {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn field(mut self, key: &str, value: impl Into<String>) -> Self {
        self.fields.push((key.to_string(), value.into()));
        self
    }

    pub fn with_image(mut self, image: ImageUpload) -> Self {
        self.image = Some(image);
        self
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.fields
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    pub fn fields(&self) -> &[(String, String)] {
        &self.fields
    }

    pub fn image(&self) -> Option<&ImageUpload> {
        self.image.as_ref()
    }

    /// Field list as a flat JSON object, for submissions without a file.
    pub fn to_json(&self) -> Value {
        let map: Map<String, Value> = self
            .fields
            .iter()
            .map(|(k, v)| (k.clone(), Value::String(v.clone())))
            .collect();
        Value::Object(map)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fields_keep_insertion_order() {
        let form = FormPayload::new().field("name", "Shoes").field("status", "active");
        assert_eq!(form.get("name"), Some("Shoes"));
        assert_eq!(form.get("image"), None);
        assert_eq!(form.fields()[1].0, "status");
        assert_eq!(
            form.to_json(),
            serde_json::json!({ "name": "Shoes", "status": "active" })
        );
    }

    #[test]
    fn mime_follows_extension() {
        let img = |name: &str| ImageUpload {
            file_name: name.to_string(),
            bytes: vec![],
        };
        assert_eq!(img("a.PNG").mime_type(), "image/png");
        assert_eq!(img("a.jpeg").mime_type(), "image/jpeg");
        assert_eq!(img("noext").mime_type(), "application/octet-stream");
    }

    #[tokio::test]
    async fn reads_image_from_disk() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("shoe.png");
        std::fs::write(&path, [1u8, 2, 3]).unwrap();

        let upload = ImageUpload::read(&path).await.unwrap();
        assert_eq!(upload.file_name, "shoe.png");
        assert_eq!(upload.bytes, vec![1, 2, 3]);
    }
}
