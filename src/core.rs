//! 核心类型：工作流上下文与运行选项
//!
//! 原始工具把凭证、词汇表等状态散落在全局会话里，这里统一收敛为
//! 显式传递的上下文对象，核心操作不读取任何环境全局状态。

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::{SyncError, SyncResult};
use crate::translation::glossary::Glossary;
use crate::translation::rules::RuleSet;

/// 服务端允许的最大分页大小
pub const DEFAULT_PAGE_SIZE: usize = 100;
/// 顺序模式下相邻请求之间的默认间隔
pub const DEFAULT_PACING_MS: u64 = 1000;
/// 上游HTTP调用的默认超时
pub const DEFAULT_TIMEOUT_SECS: u64 = 60;
/// 并行模式默认工作线程数
pub const DEFAULT_MAX_WORKERS: usize = 4;
/// 并行模式允许的工作线程上限
pub const MAX_WORKERS_LIMIT: usize = 10;

/// 访问凭证集合
#[derive(Debug, Clone, Default)]
pub struct Credentials {
    /// 内容平台的Bearer令牌
    pub platform_token: String,
    /// 翻译服务的API密钥
    pub translator_key: String,
    /// 可选的方言专用翻译服务密钥
    pub dialect_key: Option<String>,
}

impl Credentials {
    /// 在发起任何网络调用前做的快速检查
    pub fn validate(&self) -> SyncResult<()> {
        if self.platform_token.trim().is_empty() {
            return Err(SyncError::Credential(
                "缺少内容平台API令牌（需要pages:read权限）".to_string(),
            ));
        }
        if self.translator_key.trim().is_empty() {
            return Err(SyncError::Credential("缺少翻译服务API密钥".to_string()));
        }
        Ok(())
    }
}

/// 工作流上下文
///
/// 一次翻译运行所需的全部输入：站点、凭证、词汇表和提示规则。
/// 词汇表与规则在运行期间只读，可在并发工作线程间共享。
#[derive(Debug, Clone)]
pub struct WorkflowContext {
    pub site_id: String,
    pub credentials: Credentials,
    pub glossary: Glossary,
    pub rules: RuleSet,
}

impl WorkflowContext {
    pub fn new(site_id: &str, credentials: Credentials) -> Self {
        Self {
            site_id: site_id.to_string(),
            credentials,
            glossary: Glossary::with_defaults(),
            rules: RuleSet::default(),
        }
    }

    /// 校验上下文完整性
    pub fn validate(&self) -> SyncResult<()> {
        if self.site_id.trim().is_empty() {
            return Err(SyncError::Config("站点ID不能为空".to_string()));
        }
        self.credentials.validate()
    }
}

/// 调度模式
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunMode {
    /// 一次处理一个语言目标，请求之间带间隔
    Sequential,
    /// 有界工作池并发处理
    Parallel { max_workers: usize },
}

impl Default for RunMode {
    fn default() -> Self {
        RunMode::Sequential
    }
}

/// 运行选项
#[derive(Debug, Clone)]
pub struct WorkflowOptions {
    pub mode: RunMode,
    /// 分页抓取时的单页大小
    pub page_size: usize,
    /// 顺序模式下相邻请求之间的间隔（尊重上游速率限制）
    pub pacing: Duration,
    /// 每个上游HTTP调用的超时
    pub request_timeout: Duration,
}

impl Default for WorkflowOptions {
    fn default() -> Self {
        Self {
            mode: RunMode::default(),
            page_size: DEFAULT_PAGE_SIZE,
            pacing: Duration::from_millis(DEFAULT_PACING_MS),
            request_timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
        }
    }
}

impl WorkflowOptions {
    /// 默认并发配置
    pub fn parallel() -> Self {
        Self {
            mode: RunMode::Parallel {
                max_workers: DEFAULT_MAX_WORKERS,
            },
            ..Self::default()
        }
    }

    /// 校验选项
    pub fn validate(&self) -> SyncResult<()> {
        if self.page_size == 0 {
            return Err(SyncError::Config("分页大小不能为0".to_string()));
        }
        if let RunMode::Parallel { max_workers } = self.mode {
            if max_workers == 0 {
                return Err(SyncError::Config("并发工作数不能为0".to_string()));
            }
            if max_workers > MAX_WORKERS_LIMIT {
                return Err(SyncError::Config(format!(
                    "并发工作数 {} 超过上限 {}",
                    max_workers, MAX_WORKERS_LIMIT
                )));
            }
        }
        Ok(())
    }
}

/// 语言目标
///
/// `id` 是写回端点使用的平台标识，`tag` 是翻译提示使用的语言代码。
/// 平台对页面与CMS条目使用两套标识命名空间，二者统一映射到 `id`。
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LocaleTarget {
    pub id: String,
    pub tag: String,
    pub name: String,
    #[serde(default)]
    pub is_default: bool,
}

impl LocaleTarget {
    pub fn new(id: &str, tag: &str, name: &str, is_default: bool) -> Self {
        Self {
            id: id.to_string(),
            tag: tag.to_string(),
            name: name.to_string(),
            is_default,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_credentials_fail_fast() {
        let creds = Credentials::default();
        assert!(matches!(creds.validate(), Err(SyncError::Credential(_))));

        let creds = Credentials {
            platform_token: "tok".into(),
            translator_key: String::new(),
            dialect_key: None,
        };
        assert!(matches!(creds.validate(), Err(SyncError::Credential(_))));
    }

    #[test]
    fn worker_bounds_are_enforced() {
        let mut options = WorkflowOptions::default();
        options.mode = RunMode::Parallel { max_workers: 0 };
        assert!(options.validate().is_err());

        options.mode = RunMode::Parallel {
            max_workers: MAX_WORKERS_LIMIT + 1,
        };
        assert!(options.validate().is_err());

        options.mode = RunMode::Parallel { max_workers: 4 };
        assert!(options.validate().is_ok());
        assert!(WorkflowOptions::parallel().validate().is_ok());
    }

    #[test]
    fn default_options_are_valid() {
        assert!(WorkflowOptions::default().validate().is_ok());
        assert_eq!(WorkflowOptions::default().page_size, DEFAULT_PAGE_SIZE);
    }
}
