//! 上传流程状态

use std::fmt::Display;

/// 上传流程状态
///
/// ```text
/// Idle → FileSelected → Uploading → AwaitingArtifacts → PreviewReady
///            ↑               │               │               │
///            └──── 出错 ─────┴───────────────┘               │
/// Idle ←──────────────────── 关闭 ───────────────────────────┘
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FlowState {
    Idle,
    FileSelected,
    Uploading,
    AwaitingArtifacts,
    PreviewReady,
}

impl FlowState {
    /// 是否有请求正在进行
    pub fn is_in_flight(&self) -> bool {
        matches!(self, FlowState::Uploading | FlowState::AwaitingArtifacts)
    }

    /// 是否允许更换待上传文件
    pub fn accepts_file(&self) -> bool {
        matches!(self, FlowState::Idle | FlowState::FileSelected)
    }
}

impl Display for FlowState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            FlowState::Idle => "Idle",
            FlowState::FileSelected => "FileSelected",
            FlowState::Uploading => "Uploading",
            FlowState::AwaitingArtifacts => "AwaitingArtifacts",
            FlowState::PreviewReady => "PreviewReady",
        };
        write!(f, "{}", name)
    }
}
