//! URL builders for templates.

use mediadesk_core::config::{ImageConfig, StorageConfig};
use mediadesk_core::AppResult;
use mediadesk_storage::{ImageRequest, ImageType};

/// Builds public URLs for stored files and image variants.
#[derive(Debug, Clone)]
pub struct MediaLinks {
    public_url: String,
    cache_dir: String,
}

impl MediaLinks {
    /// Creates a link builder rooted at `public_url`.
    pub fn new(public_url: impl Into<String>, cache_dir: impl Into<String>) -> Self {
        Self {
            public_url: public_url.into().trim_end_matches('/').to_string(),
            cache_dir: cache_dir.into(),
        }
    }

    /// Creates a link builder from configuration.
    pub fn from_config(storage: &StorageConfig, images: &ImageConfig) -> Self {
        Self::new(storage.public_url.clone(), images.cache_dir.clone())
    }

    /// URL of the stored file.
    pub fn file_url(&self, path: &str) -> String {
        format!("{}/{}", self.public_url, path.trim_start_matches('/'))
    }

    /// URL of an image variant. Requests the original satisfies resolve to
    /// the file URL; everything else points into the cache namespace.
    pub fn image_url(
        &self,
        path: &str,
        size: &str,
        format: &str,
        image_type: &str,
    ) -> AppResult<String> {
        let source = ImageType::from_path(path)?;
        let request = ImageRequest::parse(size, format, image_type)?;
        if request.is_passthrough(source) {
            return Ok(self.file_url(path));
        }

        // `?` marks a free axis in the size token and must not start a query.
        let [size, format, image_type] = request.segments();
        Ok(format!(
            "{}/{}/{}/{format}/{image_type}/{}",
            self.public_url,
            self.cache_dir,
            size.replace('?', "%3F"),
            path.trim_start_matches('/')
        ))
    }
}

#[cfg(test)]
mod tests {
    use mediadesk_core::ErrorKind;

    use super::*;

    fn links() -> MediaLinks {
        MediaLinks::from_config(&StorageConfig::default(), &ImageConfig::default())
    }

    #[test]
    fn test_file_url() {
        assert_eq!(links().file_url("docs/a.pdf"), "/public/media/docs/a.pdf");
        assert_eq!(
            MediaLinks::new("https://cdn.example.com/media/", "_cache").file_url("/a.png"),
            "https://cdn.example.com/media/a.png"
        );
    }

    #[test]
    fn test_image_url_fast_path() {
        let links = links();
        assert_eq!(
            links.image_url("images/a.jpg", "default", "default", "default").unwrap(),
            "/public/media/images/a.jpg"
        );
        assert_eq!(
            links.image_url("images/a.png", "default", "default", "png").unwrap(),
            "/public/media/images/a.png"
        );
    }

    #[test]
    fn test_image_url_cache_path() {
        assert_eq!(
            links().image_url("images/a.jpg", "200x?", "default", "jpg").unwrap(),
            "/public/media/_cache/200x%3F/default/jpg/images/a.jpg"
        );
        assert_eq!(
            links().image_url("images/a.jpg", "default", "default", "png").unwrap(),
            "/public/media/_cache/default/default/png/images/a.jpg"
        );
    }

    #[test]
    fn test_image_url_rejects_unsupported_types() {
        let err = links()
            .image_url("docs/a.pdf", "default", "default", "default")
            .unwrap_err();
        assert_eq!(err.kind, ErrorKind::UnsupportedImageType);

        let err = links()
            .image_url("images/a.jpg", "default", "default", "webp")
            .unwrap_err();
        assert_eq!(err.kind, ErrorKind::UnsupportedImageType);
    }
}
