//! 同步流程统一错误处理
//!
//! 提供结构化错误类型和错误处理机制

use thiserror::Error;

/// 同步错误类型
#[derive(Error, Debug, Clone)]
pub enum SyncError {
    /// 网络/HTTP错误（含超时后的传输失败）
    #[error("网络错误: {0}")]
    Transport(String),

    /// 超时错误
    #[error("操作超时: {0}")]
    Timeout(String),

    /// 分页完整性错误（服务端声明的总数无法到达、响应结构不符）
    #[error("数据完整性错误: {0}")]
    Integrity(String),

    /// 翻译结果校验错误（字段集合与请求不一致）
    #[error("翻译结果校验失败: {0}")]
    Validation(String),

    /// 凭证错误（缺失或无效的API密钥）
    #[error("凭证错误: {0}")]
    Credential(String),

    /// 速率限制错误
    #[error("请求速率过快，已达到限制")]
    RateLimited,

    /// 解析错误
    #[error("解析错误: {0}")]
    Parse(String),

    /// 配置错误
    #[error("配置错误: {0}")]
    Config(String),

    /// 内部错误
    #[error("内部错误: {0}")]
    Internal(String),
}

impl SyncError {
    /// 检查错误是否可重试
    pub fn is_retryable(&self) -> bool {
        match self {
            SyncError::Transport(_) => true,
            SyncError::Timeout(_) => true,
            SyncError::RateLimited => false, // 需要等待
            SyncError::Integrity(_) => false,
            SyncError::Validation(_) => false,
            SyncError::Credential(_) => false,
            SyncError::Parse(_) => false,
            SyncError::Config(_) => false,
            SyncError::Internal(_) => false,
        }
    }

    /// 获取错误类别
    pub fn category(&self) -> ErrorCategory {
        match self {
            SyncError::Transport(_) => ErrorCategory::Network,
            SyncError::Timeout(_) => ErrorCategory::Timeout,
            SyncError::Integrity(_) => ErrorCategory::Integrity,
            SyncError::Validation(_) => ErrorCategory::Validation,
            SyncError::Credential(_) => ErrorCategory::Credential,
            SyncError::RateLimited => ErrorCategory::RateLimit,
            SyncError::Parse(_) => ErrorCategory::Parsing,
            SyncError::Config(_) => ErrorCategory::Configuration,
            SyncError::Internal(_) => ErrorCategory::Internal,
        }
    }
}

/// 错误类别
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorCategory {
    Network,
    Timeout,
    Integrity,
    Validation,
    Credential,
    RateLimit,
    Parsing,
    Configuration,
    Internal,
}

impl From<reqwest::Error> for SyncError {
    fn from(error: reqwest::Error) -> Self {
        if error.is_timeout() {
            SyncError::Timeout(error.to_string())
        } else {
            SyncError::Transport(error.to_string())
        }
    }
}

impl From<serde_json::Error> for SyncError {
    fn from(error: serde_json::Error) -> Self {
        SyncError::Parse(format!("JSON解析错误: {}", error))
    }
}

impl From<toml::de::Error> for SyncError {
    fn from(error: toml::de::Error) -> Self {
        SyncError::Config(format!("TOML解析错误: {}", error))
    }
}

impl From<url::ParseError> for SyncError {
    fn from(error: url::ParseError) -> Self {
        SyncError::Config(format!("URL解析错误: {}", error))
    }
}

/// 错误结果类型别名
pub type SyncResult<T> = Result<T, SyncError>;
