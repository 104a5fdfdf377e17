use crate::clip::{SoundClip, TextClip, VideoClip};
use crate::error::Result;
use crate::ops;
use crate::units::Px;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Everything the host persists: the three clip collections and the lane
/// list per type. Lane 0 always exists.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Document {
    pub name: String,
    pub video: Vec<VideoClip>,
    pub text: Vec<TextClip>,
    pub sound: Vec<SoundClip>,
    pub video_lanes: Vec<usize>,
    pub text_lanes: Vec<usize>,
    pub sound_lanes: Vec<usize>,
}

impl Document {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            video: vec![],
            text: vec![],
            sound: vec![],
            video_lanes: vec![0],
            text_lanes: vec![0],
            sound_lanes: vec![0],
        }
    }

    /// Latest `position + duration` across all three collections.
    pub fn content_end(&self) -> Px {
        ops::content_end(&self.video)
            .max(ops::content_end(&self.text))
            .max(ops::content_end(&self.sound))
    }

    /// Save as pretty-printed JSON. Appends the `.stagecut` extension when
    /// missing.
    pub fn save_to_file(&self, path: impl AsRef<Path>) -> Result<()> {
        let path = ensure_extension(path.as_ref());
        let json = serde_json::to_string_pretty(self)?;
        std::fs::write(path, json)?;
        Ok(())
    }

    pub fn load_from_file(path: impl AsRef<Path>) -> Result<Self> {
        let data = std::fs::read_to_string(path.as_ref())?;
        let doc: Document = serde_json::from_str(&data)?;
        Ok(doc)
    }
}

impl Default for Document {
    fn default() -> Self {
        Self::new("Untitled")
    }
}

fn ensure_extension(path: &Path) -> std::path::PathBuf {
    if path.extension().and_then(|e| e.to_str()) == Some("stagecut") {
        path.to_path_buf()
    } else {
        let mut p = path.to_path_buf();
        let mut name = p.file_name().unwrap_or_default().to_os_string();
        name.push(".stagecut");
        p.set_file_name(name);
        p
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;
    use uuid::Uuid;

    #[test]
    fn new_document_has_lane_zero_everywhere() {
        let doc = Document::new("Test");
        assert_eq!(doc.video_lanes, vec![0]);
        assert_eq!(doc.text_lanes, vec![0]);
        assert_eq!(doc.sound_lanes, vec![0]);
        assert_eq!(doc.content_end(), Px::ZERO);
    }

    #[test]
    fn content_end_spans_all_collections() {
        let mut doc = Document::new("Test");
        doc.video
            .push(VideoClip::new(Uuid::new_v4(), "v", Px(0.0), Px(100.0)));
        doc.sound
            .push(SoundClip::new(Uuid::new_v4(), "s", Px(500.0), Px(300.0)));
        assert_eq!(doc.content_end(), Px(800.0));
    }

    #[test]
    fn save_load_roundtrip() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("project.stagecut");

        let mut doc = Document::new("Roundtrip");
        doc.video
            .push(VideoClip::new(Uuid::new_v4(), "clip.mp4", Px(0.0), Px(200.0)));
        doc.text
            .push(TextClip::new(Uuid::new_v4(), "Title", Px(80.0), Px(120.0)));
        doc.sound
            .push(SoundClip::new(Uuid::new_v4(), "bgm.wav", Px(0.0), Px(400.0)));

        doc.save_to_file(&path).unwrap();
        let loaded = Document::load_from_file(&path).unwrap();
        assert_eq!(doc, loaded);
    }

    #[test]
    fn extension_appended_if_missing() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("no_ext");

        let doc = Document::new("ExtTest");
        doc.save_to_file(&path).unwrap();

        let expected = dir.path().join("no_ext.stagecut");
        assert!(expected.exists());
        let loaded = Document::load_from_file(&expected).unwrap();
        assert_eq!(doc, loaded);
    }

    #[test]
    fn load_nonexistent_file_returns_error() {
        assert!(Document::load_from_file("/tmp/does_not_exist_stagecut_test.stagecut").is_err());
    }
}
