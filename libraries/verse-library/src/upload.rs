//! Song upload
//!
//! Uploads artwork and audio to blob storage, then writes the catalog
//! record under a millisecond timestamp key.

use crate::{context::LibraryContext, submit::SubmitLock};
use tracing::{info, warn};
use verse_core::{paths, Result, Track, TrackId, TrackRecord, VerseError};

/// A file picked by the user
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BlobFile {
    pub name: String,
    pub content_type: String,
    pub bytes: Vec<u8>,
}

impl BlobFile {
    pub fn new(name: impl Into<String>, content_type: impl Into<String>, bytes: Vec<u8>) -> Self {
        Self {
            name: name.into(),
            content_type: content_type.into(),
            bytes,
        }
    }

    /// No file name or no content
    pub fn is_empty(&self) -> bool {
        self.name.trim().is_empty() || self.bytes.is_empty()
    }
}

/// Upload form fields
#[derive(Debug, Clone, Default)]
pub struct UploadForm {
    pub name: String,
    pub artist: String,
    /// Free-text label, e.g. "03:45"
    pub duration: String,
    pub image: Option<BlobFile>,
    pub media: Option<BlobFile>,
}

impl UploadForm {
    pub fn validate(&self) -> Result<()> {
        let has_file = |file: &Option<BlobFile>| file.as_ref().is_some_and(|f| !f.is_empty());

        if self.name.trim().is_empty()
            || self.artist.trim().is_empty()
            || self.duration.trim().is_empty()
            || !has_file(&self.image)
            || !has_file(&self.media)
        {
            return Err(VerseError::invalid_input("Please fill in all fields."));
        }
        Ok(())
    }
}

/// Catalog upload service
pub struct UploadService {
    ctx: LibraryContext,
    lock: SubmitLock,
}

impl UploadService {
    pub fn new(ctx: LibraryContext) -> Self {
        Self {
            ctx,
            lock: SubmitLock::new("upload"),
        }
    }

    /// Whether an upload is in flight (the submit button is disabled)
    pub fn is_uploading(&self) -> bool {
        self.lock.is_busy()
    }

    /// Upload both files and publish the catalog record
    pub async fn upload(&self, form: UploadForm) -> Result<Track> {
        form.validate()?;
        let _guard = self.lock.acquire()?;

        let UploadForm {
            name,
            artist,
            duration,
            image: Some(image),
            media: Some(media),
        } = form
        else {
            return Err(VerseError::invalid_input("Please fill in all fields."));
        };

        let image_path = paths::album_image_blob(&image.name);
        let media_path = paths::music_file_blob(&media.name);

        let blobs = self.ctx.blobs();
        blobs
            .upload(&image_path, image.bytes, &image.content_type)
            .await
            .inspect_err(|e| warn!(error = %e, path = %image_path, "Artwork upload failed"))?;
        blobs
            .upload(&media_path, media.bytes, &media.content_type)
            .await
            .inspect_err(|e| warn!(error = %e, path = %media_path, "Audio upload failed"))?;

        let record = TrackRecord {
            music_name: name.trim().to_string(),
            artist_name: artist.trim().to_string(),
            duration: duration.trim().to_string(),
            album_image_url: blobs.download_url(&image_path).await?,
            music_file_url: blobs.download_url(&media_path).await?,
        };

        let key = chrono::Utc::now().timestamp_millis().to_string();
        self.ctx
            .store()
            .set(&paths::catalog_entry(&key), serde_json::to_value(&record)?)
            .await
            .inspect_err(|e| warn!(error = %e, key = %key, "Catalog write failed"))?;

        info!(key = %key, name = %record.music_name, "Song uploaded");
        Ok(Track::from_record(TrackId::new(key), record))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn form() -> UploadForm {
        UploadForm {
            name: "Teardrop".into(),
            artist: "Massive Attack".into(),
            duration: "05:29".into(),
            image: Some(BlobFile::new("teardrop.jpg", "image/jpeg", vec![1])),
            media: Some(BlobFile::new("teardrop.mp3", "audio/mpeg", vec![2, 3])),
        }
    }

    #[test]
    fn complete_form_is_valid() {
        assert!(form().validate().is_ok());
    }

    #[test]
    fn every_field_is_required() {
        let cases = [
            UploadForm { name: " ".into(), ..form() },
            UploadForm { artist: String::new(), ..form() },
            UploadForm { duration: String::new(), ..form() },
            UploadForm { image: None, ..form() },
            UploadForm {
                media: Some(BlobFile::new("empty.mp3", "audio/mpeg", Vec::new())),
                ..form()
            },
        ];

        for case in cases {
            assert!(matches!(case.validate(), Err(VerseError::InvalidInput(_))));
        }
    }
}
