//! File Storage - 文件系统指南存储实现
//!
//! 实现 GuideStoragePort trait

use async_trait::async_trait;
use std::path::{Path, PathBuf};
use tokio::fs;

use crate::application::ports::{GuideStoragePort, StorageError, StoredGuide};
use crate::domain::guide::{Protocol, UploadedImage};
use crate::domain::image::sniff_image_mime;

pub const PROTOCOL_FILE: &str = "protocol.json";
const ORIGINAL_STEM: &str = "original";
const MATERIALS_STEM: &str = "materials";

/// 按图片内容决定扩展名
fn image_extension(bytes: &[u8]) -> &'static str {
    match sniff_image_mime(bytes) {
        Ok("image/jpeg") => "jpg",
        Ok("image/webp") => "webp",
        Ok("image/gif") => "gif",
        Ok("image/bmp") => "bmp",
        _ => "png",
    }
}

/// 文件系统指南存储，一个实例对应一个指南目录
pub struct FileGuideStorage {
    guide_dir: PathBuf,
}

impl FileGuideStorage {
    /// 创建存储，目录不存在时自动创建
    pub async fn new(guide_dir: impl AsRef<Path>) -> Result<Self, StorageError> {
        let guide_dir = guide_dir.as_ref().to_path_buf();

        fs::create_dir_all(&guide_dir)
            .await
            .map_err(|e| StorageError::IoError(e.to_string()))?;

        Ok(Self { guide_dir })
    }

    async fn write(&self, file_name: &str, data: &[u8]) -> Result<PathBuf, StorageError> {
        let path = self.guide_dir.join(file_name);
        fs::write(&path, data)
            .await
            .map_err(|e| StorageError::IoError(format!("{}: {}", path.display(), e)))?;

        tracing::debug!(
            path = %path.display(),
            size_bytes = data.len(),
            "File written"
        );
        Ok(path)
    }

    async fn write_image(&self, stem: &str, data: &[u8]) -> Result<PathBuf, StorageError> {
        self.write(&format!("{}.{}", stem, image_extension(data)), data)
            .await
    }

    /// 查找 `original.*`
    async fn find_original(&self) -> Result<PathBuf, StorageError> {
        let mut entries = fs::read_dir(&self.guide_dir)
            .await
            .map_err(|e| StorageError::IoError(e.to_string()))?;

        while let Some(entry) = entries
            .next_entry()
            .await
            .map_err(|e| StorageError::IoError(e.to_string()))?
        {
            let path = entry.path();
            if path.file_stem().and_then(|s| s.to_str()) == Some(ORIGINAL_STEM) {
                return Ok(path);
            }
        }

        Err(StorageError::FileNotFound(format!(
            "{}/{}.*",
            self.guide_dir.display(),
            ORIGINAL_STEM
        )))
    }
}

#[async_trait]
impl GuideStoragePort for FileGuideStorage {
    fn guide_dir(&self) -> &Path {
        &self.guide_dir
    }

    async fn save_guide(
        &self,
        protocol: &Protocol,
        original: &UploadedImage,
    ) -> Result<PathBuf, StorageError> {
        let json = serde_json::to_vec_pretty(protocol)
            .map_err(|e| StorageError::SerializationError(e.to_string()))?;
        self.write(PROTOCOL_FILE, &json).await?;
        self.write_image(ORIGINAL_STEM, original.bytes()).await?;

        if let Some(materials) = &protocol.materials_image {
            self.write_image(MATERIALS_STEM, materials).await?;
        }

        let mut images = 0;
        for step in &protocol.steps {
            if let Some(image) = &step.image {
                self.write_image(&format!("step-{}", step.id), image).await?;
                images += 1;
            }
        }

        tracing::info!(
            protocol_id = %protocol.id,
            guide_dir = %self.guide_dir.display(),
            step_images = images,
            "Guide saved"
        );

        Ok(self.guide_dir.clone())
    }

    async fn load_guide(&self) -> Result<StoredGuide, StorageError> {
        let protocol_path = self.guide_dir.join(PROTOCOL_FILE);
        let json = match fs::read(&protocol_path).await {
            Ok(data) => data,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return Err(StorageError::FileNotFound(protocol_path.display().to_string()));
            }
            Err(e) => return Err(StorageError::IoError(e.to_string())),
        };
        let protocol: Protocol = serde_json::from_slice(&json)
            .map_err(|e| StorageError::SerializationError(e.to_string()))?;

        let original_path = self.find_original().await?;
        let bytes = fs::read(&original_path)
            .await
            .map_err(|e| StorageError::IoError(e.to_string()))?;
        let original = UploadedImage::from_bytes(bytes)
            .map_err(|e| StorageError::SerializationError(e.to_string()))?;

        tracing::debug!(
            protocol_id = %protocol.id,
            original = %original_path.display(),
            "Guide loaded"
        );

        Ok(StoredGuide { protocol, original })
    }

    async fn save_file(&self, file_name: &str, data: &[u8]) -> Result<PathBuf, StorageError> {
        self.write(file_name, data).await
    }
}
