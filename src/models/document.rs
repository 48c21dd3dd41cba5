//! 文档类型与上传请求

use std::fmt;
use std::path::Path;

use bytes::Bytes;

use crate::error::{AppError, AppResult, InvalidFileError};

/// 三种上传流程
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DocumentKind {
    /// 简历优化（生成 classic / modern 两个版本）
    CvEnhancement,
    /// 求职信生成
    CoverLetter,
    /// LinkedIn 资料优化（不产生会话）
    LinkedIn,
}

impl DocumentKind {
    pub fn upload_path(&self) -> &'static str {
        match self {
            DocumentKind::CvEnhancement => "/resume/upload-resume",
            DocumentKind::CoverLetter => "/cover/generate-cover-letter",
            DocumentKind::LinkedIn => "/linkedin/generate-linkedin",
        }
    }

    pub fn download_path(&self) -> Option<&'static str> {
        match self {
            DocumentKind::CvEnhancement => Some("/resume/download"),
            DocumentKind::CoverLetter => Some("/cover/download"),
            DocumentKind::LinkedIn => None,
        }
    }

    /// 只有求职信流程提供预览图接口
    pub fn images_path(&self) -> Option<&'static str> {
        match self {
            DocumentKind::CoverLetter => Some("/cover/images"),
            _ => None,
        }
    }

    pub fn delete_session_path(&self) -> Option<&'static str> {
        match self {
            DocumentKind::CvEnhancement => Some("/resume/delete-session/"),
            DocumentKind::CoverLetter => Some("/cover/delete-session/"),
            DocumentKind::LinkedIn => None,
        }
    }

    /// 上传成功后是否由服务端创建会话
    pub fn has_session(&self) -> bool {
        self.download_path().is_some()
    }

    /// 是否接受附加的职位信息表单
    pub fn accepts_details(&self) -> bool {
        matches!(self, DocumentKind::CoverLetter)
    }
}

impl fmt::Display for DocumentKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            DocumentKind::CvEnhancement => "简历优化",
            DocumentKind::CoverLetter => "求职信",
            DocumentKind::LinkedIn => "LinkedIn",
        };
        write!(f, "{}", name)
    }
}

/// 待上传的单个文件
#[derive(Debug, Clone)]
pub struct UploadFile {
    pub file_name: String,
    pub media_type: String,
    pub bytes: Bytes,
}

impl UploadFile {
    pub fn new(
        file_name: impl Into<String>,
        media_type: impl Into<String>,
        bytes: impl Into<Bytes>,
    ) -> Self {
        Self {
            file_name: file_name.into(),
            media_type: media_type.into(),
            bytes: bytes.into(),
        }
    }

    /// 从磁盘读取文件，类型按扩展名推断
    pub async fn from_path(path: impl AsRef<Path>) -> AppResult<Self> {
        let path = path.as_ref();
        let bytes = tokio::fs::read(path)
            .await
            .map_err(|e| AppError::file_read_failed(path, e))?;

        let file_name = path
            .file_name()
            .map(|name| name.to_string_lossy().to_string())
            .unwrap_or_else(|| "upload".to_string());

        Ok(Self::new(file_name, media_type_for(path), bytes))
    }

    pub fn size(&self) -> u64 {
        self.bytes.len() as u64
    }

    /// 校验类型和大小
    pub fn validate(
        &self,
        accepted_media_type: &str,
        max_bytes: u64,
    ) -> Result<(), InvalidFileError> {
        if self.media_type != accepted_media_type {
            return Err(InvalidFileError::UnsupportedMediaType {
                file_name: self.file_name.clone(),
                media_type: self.media_type.clone(),
                expected: accepted_media_type.to_string(),
            });
        }
        if self.bytes.is_empty() {
            return Err(InvalidFileError::Empty {
                file_name: self.file_name.clone(),
            });
        }
        if self.size() > max_bytes {
            return Err(InvalidFileError::TooLarge {
                file_name: self.file_name.clone(),
                size: self.size(),
                max: max_bytes,
            });
        }
        Ok(())
    }
}

fn media_type_for(path: &Path) -> &'static str {
    match path
        .extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| ext.to_ascii_lowercase())
        .as_deref()
    {
        Some("pdf") => "application/pdf",
        Some("png") => "image/png",
        Some("jpg") | Some("jpeg") => "image/jpeg",
        Some("txt") => "text/plain",
        _ => "application/octet-stream",
    }
}

/// 求职信流程附带的职位信息
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CoverLetterDetails {
    pub company: String,
    pub location: String,
    pub job_title: String,
    pub job_description: String,
}

impl CoverLetterDetails {
    /// 按表单字段名展开
    pub fn fields(&self) -> [(&'static str, &str); 4] {
        [
            ("company", self.company.as_str()),
            ("location", self.location.as_str()),
            ("job_title", self.job_title.as_str()),
            ("job_description", self.job_description.as_str()),
        ]
    }
}

/// 一次上传请求
#[derive(Debug, Clone)]
pub struct UploadRequest {
    pub file: UploadFile,
    pub details: Option<CoverLetterDetails>,
}

impl UploadRequest {
    pub fn new(file: UploadFile) -> Self {
        Self {
            file,
            details: None,
        }
    }

    pub fn with_details(mut self, details: CoverLetterDetails) -> Self {
        self.details = Some(details);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pdf(size: usize) -> UploadFile {
        UploadFile::new("cv.pdf", "application/pdf", vec![b'%'; size])
    }

    #[test]
    fn test_validate_accepts_pdf_within_limit() {
        assert!(pdf(2 * 1024 * 1024)
            .validate("application/pdf", 10 * 1024 * 1024)
            .is_ok());
    }

    #[test]
    fn test_validate_rejects_wrong_type() {
        let file = UploadFile::new("cv.docx", "application/msword", vec![1, 2, 3]);
        let err = file.validate("application/pdf", 1024).unwrap_err();
        assert!(matches!(err, InvalidFileError::UnsupportedMediaType { .. }));
    }

    #[test]
    fn test_validate_rejects_oversized_and_empty() {
        assert!(matches!(
            pdf(11).validate("application/pdf", 10),
            Err(InvalidFileError::TooLarge { size: 11, max: 10, .. })
        ));
        assert!(matches!(
            pdf(0).validate("application/pdf", 10),
            Err(InvalidFileError::Empty { .. })
        ));
    }

    #[test]
    fn test_media_type_from_extension() {
        assert_eq!(media_type_for(Path::new("a/Resume.PDF")), "application/pdf");
        assert_eq!(media_type_for(Path::new("notes")), "application/octet-stream");
    }

    #[test]
    fn test_only_cover_letter_has_images_and_details() {
        assert!(DocumentKind::CoverLetter.accepts_details());
        assert!(DocumentKind::CoverLetter.images_path().is_some());
        assert!(!DocumentKind::CvEnhancement.accepts_details());
        assert!(DocumentKind::CvEnhancement.images_path().is_none());
        assert!(!DocumentKind::LinkedIn.has_session());
    }
}
