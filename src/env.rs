//! 统一的环境变量管理
//!
//! 提供类型安全、可验证的环境变量访问，CLI在构建上下文时使用

use std::env;
use std::fmt;

/// 环境变量解析错误
#[derive(Debug, Clone)]
pub struct EnvError {
    pub variable: String,
    pub message: String,
}

impl fmt::Display for EnvError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Environment variable '{}': {}",
            self.variable, self.message
        )
    }
}

impl std::error::Error for EnvError {}

pub type EnvResult<T> = Result<T, EnvError>;

/// 环境变量访问器特性
pub trait EnvVar<T> {
    const NAME: &'static str;
    const DESCRIPTION: &'static str;

    fn parse(value: &str) -> EnvResult<T>;

    fn get() -> EnvResult<T> {
        match env::var(Self::NAME) {
            Ok(value) => Self::parse(&value),
            Err(_) => Err(EnvError {
                variable: Self::NAME.to_string(),
                message: "Required environment variable not set".to_string(),
            }),
        }
    }

    fn get_optional() -> Option<T> {
        Self::get().ok()
    }
}

fn parse_string(name: &str, value: &str) -> EnvResult<String> {
    if value.trim().is_empty() {
        Err(EnvError {
            variable: name.to_string(),
            message: "Value must not be empty".to_string(),
        })
    } else {
        Ok(value.trim().to_string())
    }
}

/// 站点ID
pub struct SiteId;
impl EnvVar<String> for SiteId {
    const NAME: &'static str = "SITELINGO_SITE_ID";
    const DESCRIPTION: &'static str = "Unique identifier of the platform site";

    fn parse(value: &str) -> EnvResult<String> {
        parse_string(Self::NAME, value)
    }
}

/// 内容平台API令牌
pub struct PlatformToken;
impl EnvVar<String> for PlatformToken {
    const NAME: &'static str = "SITELINGO_PLATFORM_TOKEN";
    const DESCRIPTION: &'static str = "Bearer token for the content platform API";

    fn parse(value: &str) -> EnvResult<String> {
        parse_string(Self::NAME, value)
    }
}

/// 翻译服务API密钥
pub struct TranslatorKey;
impl EnvVar<String> for TranslatorKey {
    const NAME: &'static str = "SITELINGO_TRANSLATOR_KEY";
    const DESCRIPTION: &'static str = "API key for the chat-completion translation service";

    fn parse(value: &str) -> EnvResult<String> {
        parse_string(Self::NAME, value)
    }
}

/// 方言专用翻译服务密钥（可选）
pub struct DialectKey;
impl EnvVar<String> for DialectKey {
    const NAME: &'static str = "SITELINGO_DIALECT_KEY";
    const DESCRIPTION: &'static str =
        "Optional API key for the alternative provider routed for one dialect";

    fn parse(value: &str) -> EnvResult<String> {
        parse_string(Self::NAME, value)
    }
}

/// 并发工作数
pub struct MaxWorkers;
impl EnvVar<usize> for MaxWorkers {
    const NAME: &'static str = "SITELINGO_MAX_WORKERS";
    const DESCRIPTION: &'static str = "Bounded worker-pool size for parallel mode (2-10)";

    fn parse(value: &str) -> EnvResult<usize> {
        value.parse::<usize>().map_err(|_| EnvError {
            variable: Self::NAME.to_string(),
            message: format!("Invalid worker count '{}'", value),
        })
    }
}

/// 日志级别
pub struct LogLevel;
impl EnvVar<String> for LogLevel {
    const NAME: &'static str = "SITELINGO_LOG_LEVEL";
    const DESCRIPTION: &'static str = "Log level: trace, debug, info, warn, error";

    fn get() -> EnvResult<String> {
        match env::var(Self::NAME) {
            Ok(value) => Self::parse(&value),
            Err(_) => Ok("info".to_string()),
        }
    }

    fn parse(value: &str) -> EnvResult<String> {
        match value.to_lowercase().as_str() {
            "trace" | "debug" | "info" | "warn" | "error" => Ok(value.to_lowercase()),
            _ => Err(EnvError {
                variable: Self::NAME.to_string(),
                message: format!(
                    "Invalid log level '{}'. Use: trace, debug, info, warn, error",
                    value
                ),
            }),
        }
    }
}
