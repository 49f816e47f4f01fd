//! Guide Storage Port - 出站端口
//!
//! 一份指南落盘为一个目录：protocol.json、原图、步骤配图、朗读音频与导出页面

use async_trait::async_trait;
use std::path::{Path, PathBuf};
use thiserror::Error;

use crate::domain::guide::{Protocol, UploadedImage};

/// 指南存储错误
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("File not found: {0}")]
    FileNotFound(String),

    #[error("IO error: {0}")]
    IoError(String),

    #[error("Serialization error: {0}")]
    SerializationError(String),
}

/// 已保存的指南
#[derive(Debug, Clone)]
pub struct StoredGuide {
    pub protocol: Protocol,
    pub original: UploadedImage,
}

/// Guide Storage Port
#[async_trait]
pub trait GuideStoragePort: Send + Sync {
    /// 指南目录
    fn guide_dir(&self) -> &Path;

    /// 保存 protocol.json、原图以及所有已有的配图
    async fn save_guide(
        &self,
        protocol: &Protocol,
        original: &UploadedImage,
    ) -> Result<PathBuf, StorageError>;

    /// 读回 protocol.json 与原图（不含配图）
    async fn load_guide(&self) -> Result<StoredGuide, StorageError>;

    /// 在指南目录下写入任意文件
    async fn save_file(&self, file_name: &str, data: &[u8]) -> Result<PathBuf, StorageError>;
}
