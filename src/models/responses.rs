//! 其他接口的响应结构

use serde::{Deserialize, Serialize};

use crate::error::MalformedResponseError;

/// LinkedIn 优化结果
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LinkedInProfile {
    pub tag_line: String,
    pub profile_summary: String,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub phone: Option<String>,
}

impl LinkedInProfile {
    pub fn from_body(endpoint: &str, body: &[u8]) -> Result<Self, MalformedResponseError> {
        let raw: serde_json::Value =
            serde_json::from_slice(body).map_err(|e| MalformedResponseError::InvalidJson {
                endpoint: endpoint.to_string(),
                source: e,
            })?;

        for field in ["tag_line", "profile_summary"] {
            if raw.get(field).and_then(|v| v.as_str()).is_none() {
                return Err(MalformedResponseError::MissingField {
                    endpoint: endpoint.to_string(),
                    field,
                });
            }
        }

        serde_json::from_value(raw).map_err(|e| MalformedResponseError::InvalidJson {
            endpoint: endpoint.to_string(),
            source: e,
        })
    }
}

/// 预览图接口的响应，兼容三种形状
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum ImagesPayload {
    Wrapped { images: ImageList },
    Bare(Vec<String>),
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum ImageList {
    Many(Vec<String>),
    One(String),
}

/// 解析预览图列表，无法识别时返回 None
pub fn parse_preview_images(body: &[u8]) -> Option<Vec<String>> {
    let payload: ImagesPayload = serde_json::from_slice(body).ok()?;
    let images = match payload {
        ImagesPayload::Wrapped {
            images: ImageList::Many(images),
        } => images,
        ImagesPayload::Wrapped {
            images: ImageList::One(image),
        } => vec![image],
        ImagesPayload::Bare(images) => images,
    };
    Some(images)
}

/// 登录接口返回的令牌
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct AccessToken {
    pub access_token: String,
    #[serde(default = "default_token_type")]
    pub token_type: String,
}

fn default_token_type() -> String {
    "bearer".to_string()
}
