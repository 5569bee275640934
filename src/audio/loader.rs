use std::path::Path;

use serde::de::DeserializeOwned;

use crate::audio::types::AudioAnalysis;
use crate::error::{AnalysisError, Result};

/// Loads audio analysis documents written by the external analyzer
pub struct AudioAnalysisLoader;

impl AudioAnalysisLoader {
    /// Load and validate an audio analysis JSON file
    pub async fn load<P: AsRef<Path>>(path: P) -> Result<AudioAnalysis> {
        let path = path.as_ref();
        let analysis: AudioAnalysis = read_json(path).await?;
        analysis.validate()?;
        Ok(analysis)
    }

    /// Parse an audio analysis from a JSON string
    pub fn from_json(json: &str) -> Result<AudioAnalysis> {
        let analysis: AudioAnalysis =
            serde_json::from_str(json).map_err(|e| AnalysisError::LoadFailed {
                path: "<inline>".to_string(),
                reason: e.to_string(),
            })?;
        analysis.validate()?;
        Ok(analysis)
    }

    /// Check if a file looks like an analysis document
    pub fn is_format_supported(extension: &str) -> bool {
        extension.eq_ignore_ascii_case("json")
    }
}

/// Read a JSON document, reporting failures as `AnalysisError::LoadFailed`
pub(crate) async fn read_json<T: DeserializeOwned>(path: &Path) -> Result<T> {
    let content = tokio::fs::read_to_string(path)
        .await
        .map_err(|e| AnalysisError::LoadFailed {
            path: path.display().to_string(),
            reason: e.to_string(),
        })?;

    let value = serde_json::from_str(&content).map_err(|e| AnalysisError::LoadFailed {
        path: path.display().to_string(),
        reason: e.to_string(),
    })?;
    Ok(value)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::EditError;
    use std::io::Write;
    use tempfile::tempdir;

    #[test]
    fn test_format_support() {
        assert!(AudioAnalysisLoader::is_format_supported("json"));
        assert!(AudioAnalysisLoader::is_format_supported("JSON"));
        assert!(!AudioAnalysisLoader::is_format_supported("wav"));
    }

    #[tokio::test]
    async fn test_load_from_file() {
        let temp_dir = tempdir().unwrap();
        let file_path = temp_dir.path().join("audio.json");

        let mut file = std::fs::File::create(&file_path).unwrap();
        file.write_all(br#"{"beats": [{"time": 0.0, "strength": 1.0}, {"time": 0.5, "strength": 0.4}], "tempo": 120, "totalDuration": 4.0}"#)
            .unwrap();

        let analysis = AudioAnalysisLoader::load(&file_path).await.unwrap();
        assert_eq!(analysis.beats.len(), 2);
        assert_eq!(analysis.duration(), 4.0);
    }

    #[tokio::test]
    async fn test_missing_file() {
        let temp_dir = tempdir().unwrap();
        let result = AudioAnalysisLoader::load(temp_dir.path().join("missing.json")).await;

        if let Err(EditError::Analysis(AnalysisError::LoadFailed { path, .. })) = result {
            assert!(path.ends_with("missing.json"));
        } else {
            panic!("Expected LoadFailed error");
        }
    }

    #[test]
    fn test_empty_beats_rejected() {
        let result = AudioAnalysisLoader::from_json(r#"{"beats": [], "tempo": 90}"#);
        assert!(matches!(result, Err(EditError::Analysis(AnalysisError::NoBeats))));
    }
}
