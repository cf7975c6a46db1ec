//! Model bundle: artifact resolution and best-effort loading
//!
//! The bundle is built once at process start and shared read-only across all
//! requests. Each artifact loads independently; a missing or corrupt file
//! leaves its slot unset and is reported through [`ModelBundle::status`]
//! rather than failing startup.

use crate::labels::LabelDecoder;
use crate::model::{CommentModel, ModelArtifact};
use crate::vectorizer::TfidfVectorizer;
use serde::de::DeserializeOwned;
use std::path::{Path, PathBuf};
use tracing::{info, warn};
use vidpulse_core::{ArtifactStatus, Error, Result};

/// Vectorizer artifact filename within the models directory
pub const VECTORIZER_FILE: &str = "tfidf_vectorizer.json";

/// Classifier artifact filename within the models directory
pub const MODEL_FILE: &str = "sentiment_model.json";

/// Label decoder artifact filename within the models directory
pub const LABELS_FILE: &str = "label_encoder.json";

/// Resolved locations of the three artifacts
#[derive(Debug, Clone)]
pub struct ArtifactPaths {
    pub vectorizer: PathBuf,
    pub model: PathBuf,
    pub labels: PathBuf,
}

impl ArtifactPaths {
    /// Resolve the conventional artifact filenames inside `dir`
    pub fn in_dir(dir: impl AsRef<Path>) -> Self {
        let dir = dir.as_ref();
        Self {
            vectorizer: dir.join(VECTORIZER_FILE),
            model: dir.join(MODEL_FILE),
            labels: dir.join(LABELS_FILE),
        }
    }
}

/// Loaded prediction artifacts, immutable after construction
pub struct ModelBundle {
    pub(crate) vectorizer: Option<TfidfVectorizer>,
    pub(crate) model: Option<Box<dyn CommentModel>>,
    pub(crate) labels: Option<LabelDecoder>,
}

impl ModelBundle {
    /// Build a bundle from already-constructed parts (tests, offline tools)
    pub fn new(
        vectorizer: Option<TfidfVectorizer>,
        model: Option<Box<dyn CommentModel>>,
        labels: Option<LabelDecoder>,
    ) -> Self {
        Self {
            vectorizer,
            model,
            labels,
        }
    }

    /// A bundle with nothing loaded
    pub fn unloaded() -> Self {
        Self::new(None, None, None)
    }

    /// Best-effort load from a models directory.
    ///
    /// Failures are logged and leave the matching slot unset; the pipeline
    /// then refuses to run until the process is restarted with usable
    /// artifacts.
    pub fn load(dir: impl AsRef<Path>) -> Self {
        let paths = ArtifactPaths::in_dir(&dir);

        let vectorizer = match load_json::<TfidfVectorizer>(&paths.vectorizer) {
            Ok(vectorizer) => {
                info!(
                    path = %paths.vectorizer.display(),
                    vocabulary = vectorizer.vocabulary_size(),
                    "loaded vectorizer artifact"
                );
                Some(vectorizer)
            }
            Err(e) => {
                warn!(path = %paths.vectorizer.display(), "vectorizer artifact unavailable: {e}");
                None
            }
        };

        let model = match load_json::<ModelArtifact>(&paths.model) {
            Ok(artifact) => {
                let model = artifact.into_model();
                info!(
                    path = %paths.model.display(),
                    model = model.name(),
                    classes = model.num_classes(),
                    "loaded classifier artifact"
                );
                Some(model)
            }
            Err(e) => {
                warn!(path = %paths.model.display(), "classifier artifact unavailable: {e}");
                None
            }
        };

        let labels = match load_json::<LabelDecoder>(&paths.labels) {
            Ok(labels) => {
                info!(
                    path = %paths.labels.display(),
                    classes = labels.len(),
                    "loaded label decoder artifact"
                );
                Some(labels)
            }
            Err(e) => {
                warn!(path = %paths.labels.display(), "label decoder artifact unavailable: {e}");
                None
            }
        };

        Self::new(vectorizer, model, labels)
    }

    /// Which artifacts are present
    pub fn status(&self) -> ArtifactStatus {
        ArtifactStatus {
            vectorizer: self.vectorizer.is_some(),
            classifier: self.model.is_some(),
            label_decoder: self.labels.is_some(),
        }
    }

    /// Runtime name of the loaded classifier, if any
    pub fn model_name(&self) -> Option<&'static str> {
        self.model.as_deref().map(CommentModel::name)
    }
}

fn load_json<T: DeserializeOwned>(path: &Path) -> Result<T> {
    let content = std::fs::read_to_string(path)?;
    serde_json::from_str(&content).map_err(Error::from)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::MultinomialNb;

    fn write_artifacts(dir: &Path) {
        let vectorizer = TfidfVectorizer::fit(&["good stuff", "bad stuff"]);
        std::fs::write(
            dir.join(VECTORIZER_FILE),
            serde_json::to_string(&vectorizer).unwrap(),
        )
        .unwrap();

        let features = vectorizer.transform_batch(&["good stuff", "bad stuff"]);
        let model = MultinomialNb::fit(&features, &[1, 0], 2, 1.0).unwrap();
        std::fs::write(
            dir.join(MODEL_FILE),
            serde_json::to_string(&ModelArtifact::MultinomialNb(model)).unwrap(),
        )
        .unwrap();

        let labels = LabelDecoder::new(vec!["negative".to_string(), "positive".to_string()]);
        std::fs::write(
            dir.join(LABELS_FILE),
            serde_json::to_string(&labels).unwrap(),
        )
        .unwrap();
    }

    #[test]
    fn loads_all_artifacts_from_directory() {
        let dir = tempfile::tempdir().unwrap();
        write_artifacts(dir.path());

        let bundle = ModelBundle::load(dir.path());
        let status = bundle.status();
        assert!(status.vectorizer);
        assert!(status.classifier);
        assert!(status.label_decoder);
        assert!(status.ready());
        assert_eq!(bundle.model_name(), Some("MultinomialNb"));
    }

    #[test]
    fn missing_files_degrade_only_their_slot() {
        let dir = tempfile::tempdir().unwrap();
        write_artifacts(dir.path());
        std::fs::remove_file(dir.path().join(MODEL_FILE)).unwrap();

        let bundle = ModelBundle::load(dir.path());
        let status = bundle.status();
        assert!(status.vectorizer);
        assert!(!status.classifier);
        assert!(status.label_decoder);
        assert!(!status.ready());
    }

    #[test]
    fn corrupt_artifact_degrades_like_a_missing_one() {
        let dir = tempfile::tempdir().unwrap();
        write_artifacts(dir.path());
        std::fs::write(dir.path().join(VECTORIZER_FILE), "not json").unwrap();

        let bundle = ModelBundle::load(dir.path());
        assert!(!bundle.status().vectorizer);
        assert!(bundle.status().classifier);
    }

    #[test]
    fn empty_directory_yields_unloaded_bundle() {
        let dir = tempfile::tempdir().unwrap();
        let bundle = ModelBundle::load(dir.path());
        assert!(!bundle.status().ready());
        assert!(bundle.model_name().is_none());
    }

    #[test]
    fn artifact_paths_use_conventional_names() {
        let paths = ArtifactPaths::in_dir("models");
        assert!(paths.vectorizer.ends_with(VECTORIZER_FILE));
        assert!(paths.model.ends_with(MODEL_FILE));
        assert!(paths.labels.ends_with(LABELS_FILE));
    }
}
