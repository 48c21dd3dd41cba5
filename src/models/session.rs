//! 服务端会话数据
//!
//! 上传成功后服务端返回 session_id 和若干产物文件名，
//! 这里把不同流程的响应体统一解析为 [`Session`]。

use std::fmt;

use serde::Deserialize;

use crate::error::MalformedResponseError;
use crate::models::DocumentKind;

/// 服务端分配的会话 ID
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct SessionId(String);

impl SessionId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for SessionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// 逻辑名 → 文件名
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArtifactRef {
    pub name: String,
    pub filename: String,
}

impl ArtifactRef {
    pub fn new(name: impl Into<String>, filename: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            filename: filename.into(),
        }
    }
}

/// 简历流程附带返回的联系方式
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ContactInfo {
    pub email: Option<String>,
    pub phone: Option<String>,
}

/// 一个服务端会话
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Session {
    pub id: SessionId,
    pub artifacts: Vec<ArtifactRef>,
    pub contact: ContactInfo,
}

impl Session {
    pub fn new(id: SessionId, artifacts: Vec<ArtifactRef>) -> Self {
        Self {
            id,
            artifacts,
            contact: ContactInfo::default(),
        }
    }

    /// 按逻辑名查找产物
    pub fn artifact(&self, name: &str) -> Option<&ArtifactRef> {
        self.artifacts.iter().find(|a| a.name == name)
    }

    /// 解析上传接口的响应体
    pub fn from_upload_body(
        kind: DocumentKind,
        body: &[u8],
    ) -> Result<Self, MalformedResponseError> {
        let endpoint = kind.upload_path().to_string();
        match kind {
            DocumentKind::CvEnhancement => {
                let payload: ResumeUploadPayload = parse(&endpoint, body)?;
                let id = required_id(&endpoint, payload.session_id)?;
                let artifacts = collect_artifacts(&[
                    ("classic", payload.classic_resume_url),
                    ("modern", payload.modern_resume_url),
                ]);
                non_empty(&endpoint, &artifacts)?;
                Ok(Self {
                    id,
                    artifacts,
                    contact: ContactInfo {
                        email: payload.email,
                        phone: payload.phone,
                    },
                })
            }
            DocumentKind::CoverLetter => {
                let payload: CoverLetterUploadPayload = parse(&endpoint, body)?;
                let id = required_id(&endpoint, payload.session_id)?;
                let artifacts =
                    collect_artifacts(&[("cover_letter", payload.cover_letter_filename)]);
                non_empty(&endpoint, &artifacts)?;
                Ok(Self::new(id, artifacts))
            }
            DocumentKind::LinkedIn => Err(MalformedResponseError::MissingSessionId { endpoint }),
        }
    }
}

#[derive(Debug, Deserialize)]
struct ResumeUploadPayload {
    #[serde(default)]
    session_id: Option<serde_json::Value>,
    #[serde(default)]
    classic_resume_url: Option<String>,
    #[serde(default)]
    modern_resume_url: Option<String>,
    #[serde(default)]
    email: Option<String>,
    #[serde(default)]
    phone: Option<String>,
}

#[derive(Debug, Deserialize)]
struct CoverLetterUploadPayload {
    #[serde(default)]
    session_id: Option<serde_json::Value>,
    #[serde(default)]
    cover_letter_filename: Option<String>,
}

fn parse<T: serde::de::DeserializeOwned>(
    endpoint: &str,
    body: &[u8],
) -> Result<T, MalformedResponseError> {
    serde_json::from_slice(body).map_err(|e| MalformedResponseError::InvalidJson {
        endpoint: endpoint.to_string(),
        source: e,
    })
}

/// session_id 可能是字符串也可能是数字
fn required_id(
    endpoint: &str,
    raw: Option<serde_json::Value>,
) -> Result<SessionId, MalformedResponseError> {
    let id = match raw {
        Some(serde_json::Value::String(s)) => s,
        Some(serde_json::Value::Number(n)) => n.to_string(),
        _ => String::new(),
    };
    if id.trim().is_empty() {
        return Err(MalformedResponseError::MissingSessionId {
            endpoint: endpoint.to_string(),
        });
    }
    Ok(SessionId::new(id))
}

fn collect_artifacts(candidates: &[(&str, Option<String>)]) -> Vec<ArtifactRef> {
    candidates
        .iter()
        .filter_map(|(name, filename)| {
            filename
                .as_deref()
                .filter(|f| is_usable_filename(f))
                .map(|f| ArtifactRef::new(*name, f))
        })
        .collect()
}

/// 前端序列化遗留的 "undefined" / "null" 也视为缺失
fn is_usable_filename(filename: &str) -> bool {
    let trimmed = filename.trim();
    !trimmed.is_empty() && trimmed != "undefined" && trimmed != "null"
}

fn non_empty(endpoint: &str, artifacts: &[ArtifactRef]) -> Result<(), MalformedResponseError> {
    if artifacts.is_empty() {
        return Err(MalformedResponseError::MissingArtifacts {
            endpoint: endpoint.to_string(),
        });
    }
    Ok(())
}
