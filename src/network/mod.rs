//! # 网络模块
//!
//! 这个模块包含与内容平台API通信相关的功能：
//!
//! - `client` - 带认证的HTTP会话、站点资源列举
//! - `paging` - 穷举式分页抓取

pub mod client;
pub mod paging;

// Re-export commonly used items for convenience
pub use client::ApiClient;
pub use paging::{fetch_all, CollectionPage, FetchOutcome, Pagination};
