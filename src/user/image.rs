//! Profile image references and their storage.

use std::path::{Component, Path, PathBuf};

use async_trait::async_trait;
use tokio::io::AsyncWriteExt;
use rand::distributions::{Alphanumeric, DistString};
use rand::rngs::OsRng;
use serde::{Deserialize, Serialize};
use url::Url;
use validator::ValidationError;

use crate::error::Result;
use crate::user::User;

/// Directory profile images are uploaded to.
pub const UPLOAD_TO: &str = "profiles";
const MAX_LENGTH: usize = 100;
const SUFFIX_LENGTH: usize = 7;
/// Longest file name whose suffixed form still fits in [`MAX_LENGTH`].
const MAX_NAME_LENGTH: usize =
    MAX_LENGTH - UPLOAD_TO.len() - 1 - (SUFFIX_LENGTH + 1);

/// Relative path of an uploaded image, e.g. `profiles/jdoe.png`.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ImageRef(String);

impl ImageRef {
    /// Wrap a stored path.
    pub fn new(path: impl Into<String>) -> Self {
        Self(path.into())
    }

    /// Returns the same string as a string slice `&str`.
    #[inline]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Public URL of the image below `media_url`.
    pub fn url(&self, media_url: &str) -> std::result::Result<Url, url::ParseError> {
        let mut base = Url::parse(media_url)?;
        if !base.path().ends_with('/') {
            let path = format!("{}/", base.path());
            base.set_path(&path);
        }
        base.join(&self.0)
    }
}

pub(crate) fn validate_image(image: &ImageRef) -> std::result::Result<(), ValidationError> {
    let path = Path::new(image.as_str());
    let relative = path
        .components()
        .all(|c| matches!(c, Component::Normal(_)));

    if image.as_str().is_empty() || image.as_str().len() > MAX_LENGTH || !relative {
        return Err(ValidationError::new("invalid_image"));
    }

    Ok(())
}

/// Stores uploaded binaries and hands back a reference.
#[async_trait]
pub trait FileStorage: Send + Sync {
    /// Persist `content` near `path_hint`, never overwriting an existing file.
    async fn store(&self, content: &[u8], path_hint: &str) -> Result<ImageRef>;
}

/// Storage on the local filesystem, below a media root.
#[derive(Debug, Clone)]
pub struct LocalFileStorage {
    root: PathBuf,
}

impl LocalFileStorage {
    /// Create a new [`LocalFileStorage`].
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Absolute location of a stored reference.
    pub fn path(&self, image: &ImageRef) -> PathBuf {
        self.root.join(image.as_str())
    }
}

/// Keep only the file name of `hint`, with anything unusual replaced.
fn file_name(hint: &str) -> String {
    let name = Path::new(hint)
        .file_name()
        .and_then(|n| n.to_str())
        .unwrap_or_default();

    let cleaned: String = name
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || matches!(c, '.' | '-' | '_') {
                c
            } else {
                '_'
            }
        })
        .collect();

    match cleaned.trim_start_matches('.') {
        "" => "image".to_owned(),
        name => truncate(name),
    }
}

/// Shorten the stem of an ASCII `name` to [`MAX_NAME_LENGTH`], keeping the
/// extension when it is short.
fn truncate(name: &str) -> String {
    if name.len() <= MAX_NAME_LENGTH {
        return name.to_owned();
    }

    match name.rsplit_once('.') {
        Some((stem, ext)) if !stem.is_empty() && ext.len() < MAX_NAME_LENGTH / 2 => {
            let stem = &stem[..stem.len().min(MAX_NAME_LENGTH - ext.len() - 1)];
            format!("{stem}.{ext}")
        },
        _ => name[..MAX_NAME_LENGTH].to_owned(),
    }
}

fn with_suffix(name: &str) -> String {
    let suffix = Alphanumeric.sample_string(&mut OsRng, SUFFIX_LENGTH);
    match name.rsplit_once('.') {
        Some((stem, ext)) => format!("{stem}_{suffix}.{ext}"),
        None => format!("{name}_{suffix}"),
    }
}

#[async_trait]
impl FileStorage for LocalFileStorage {
    async fn store(&self, content: &[u8], path_hint: &str) -> Result<ImageRef> {
        let directory = self.root.join(UPLOAD_TO);
        tokio::fs::create_dir_all(&directory).await?;

        let base = file_name(path_hint);
        let mut name = base.clone();
        let mut file = loop {
            match tokio::fs::OpenOptions::new()
                .write(true)
                .create_new(true)
                .open(directory.join(&name))
                .await
            {
                Ok(file) => break file,
                Err(err) if err.kind() == std::io::ErrorKind::AlreadyExists => {
                    name = with_suffix(&base);
                },
                Err(err) => return Err(err.into()),
            }
        };
        file.write_all(content).await?;
        file.flush().await?;

        let image = ImageRef::new(format!("{UPLOAD_TO}/{name}"));
        tracing::debug!(image = image.as_str(), size = content.len(), "image stored");
        Ok(image)
    }
}

impl User {
    /// Store `content` and point the profile at it.
    ///
    /// The profile itself is not persisted.
    pub async fn upload_image(
        &mut self,
        storage: &dyn FileStorage,
        content: &[u8],
        filename: &str,
    ) -> Result<()> {
        self.image = Some(storage.store(content, filename).await?);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::user::tests::user;
    use validator::Validate;

    fn temp_root() -> PathBuf {
        let dir = Alphanumeric.sample_string(&mut OsRng, 12);
        std::env::temp_dir().join(format!("sdis-users-{dir}"))
    }

    #[test]
    fn test_url() {
        let image = ImageRef::new("profiles/jdoe.png");

        assert_eq!(
            image.url("https://media.example.org/files").unwrap().as_str(),
            "https://media.example.org/files/profiles/jdoe.png"
        );
        assert_eq!(
            image.url("https://media.example.org/").unwrap().as_str(),
            "https://media.example.org/profiles/jdoe.png"
        );
    }

    #[test]
    fn test_file_name() {
        assert_eq!(file_name("../../etc/passwd"), "passwd");
        assert_eq!(file_name("my photo.png"), "my_photo.png");
        assert_eq!(file_name(".hidden"), "hidden");
        assert_eq!(file_name(""), "image");
    }

    #[test]
    fn test_long_file_name_is_shortened() {
        let name = file_name(&format!("{}.png", "a".repeat(120)));
        assert_eq!(name.len(), MAX_NAME_LENGTH);
        assert!(name.ends_with(".png"));

        let suffixed = format!("{UPLOAD_TO}/{}", with_suffix(&name));
        assert_eq!(suffixed.len(), MAX_LENGTH);

        assert_eq!(file_name(&"b".repeat(150)).len(), MAX_NAME_LENGTH);
    }

    #[test]
    fn test_validate_image() {
        let mut user = user("jdoe");
        user.image = Some(ImageRef::new("profiles/jdoe.png"));
        assert!(user.validate().is_ok());

        user.image = Some(ImageRef::new("../outside.png"));
        assert!(user.validate().is_err());

        user.image = Some(ImageRef::new("/absolute.png"));
        assert!(user.validate().is_err());
    }

    #[tokio::test]
    async fn test_local_storage_never_overwrites() {
        let root = temp_root();
        let storage = LocalFileStorage::new(&root);

        let first = storage.store(b"first", "face.png").await.unwrap();
        let second = storage.store(b"second", "face.png").await.unwrap();

        assert_eq!(first.as_str(), "profiles/face.png");
        assert_ne!(first, second);
        assert!(second.as_str().starts_with("profiles/face_"));
        assert!(second.as_str().ends_with(".png"));
        assert_eq!(tokio::fs::read(storage.path(&first)).await.unwrap(), b"first");
        assert_eq!(tokio::fs::read(storage.path(&second)).await.unwrap(), b"second");

        tokio::fs::remove_dir_all(root).await.unwrap();
    }

    #[tokio::test]
    async fn test_upload_long_name_stays_valid() {
        let root = temp_root();
        let storage = LocalFileStorage::new(&root);
        let mut user = user("jdoe");
        let filename = format!("{}.png", "a".repeat(120));

        user.upload_image(&storage, b"png", &filename).await.unwrap();
        user.upload_image(&storage, b"png", &filename).await.unwrap();

        let image = user.image.clone().unwrap();
        assert!(image.as_str().len() <= MAX_LENGTH);
        assert!(user.validate().is_ok());
        tokio::fs::remove_dir_all(root).await.unwrap();
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_concurrent_uploads_never_overwrite() {
        let root = temp_root();
        let storage = std::sync::Arc::new(LocalFileStorage::new(&root));

        let tasks: Vec<_> = (0..32u8)
            .map(|i| {
                let storage = storage.clone();
                tokio::spawn(async move {
                    let image = storage.store(&[i], "face.png").await.unwrap();
                    (i, image)
                })
            })
            .collect();

        let mut names = std::collections::HashSet::new();
        for task in tasks {
            let (i, image) = task.await.unwrap();
            assert_eq!(tokio::fs::read(storage.path(&image)).await.unwrap(), [i]);
            assert!(names.insert(image));
        }
        assert_eq!(names.len(), 32);

        tokio::fs::remove_dir_all(root).await.unwrap();
    }

    #[tokio::test]
    async fn test_upload_image() {
        let root = temp_root();
        let storage = LocalFileStorage::new(&root);
        let mut user = user("jdoe");

        user.upload_image(&storage, b"png", "jdoe.png").await.unwrap();

        assert_eq!(user.image, Some(ImageRef::new("profiles/jdoe.png")));
        tokio::fs::remove_dir_all(root).await.unwrap();
    }
}
