//! 穷举式分页抓取
//!
//! 平台的集合类端点按 offset/limit 分页，第一页返回权威的总数。
//! 这里负责把所有页拼成完整集合，并处理服务端行为异常的两种情况：
//! 短页提前返回（停止并警告，不假装完整）和总数永远无法到达
//! （有界请求数，超出即判定完整性错误）。

use std::future::Future;

use serde::Deserialize;

use crate::error::{SyncError, SyncResult};

/// 单次抓取允许的最大页请求数，防止行为异常的服务端造成死循环
const MAX_PAGE_REQUESTS: usize = 1000;

/// 分页元信息
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Pagination {
    #[serde(default)]
    pub total: usize,
    #[serde(default)]
    pub offset: usize,
    #[serde(default)]
    pub limit: usize,
}

/// 一页原始条目，合并进完整集合后即丢弃
#[derive(Debug, Clone)]
pub struct CollectionPage<T> {
    pub items: Vec<T>,
    pub pagination: Pagination,
}

/// 抓取结果
///
/// `complete` 为 false 表示服务端在到达总数前返回了短页，
/// 调用方看到的是部分数据而不是静默截断。
#[derive(Debug)]
pub struct FetchOutcome<T> {
    pub items: Vec<T>,
    pub total: usize,
    pub complete: bool,
}

/// 穷举抓取一个分页集合
///
/// `fetch_page(offset, limit)` 由调用方注入，便于对不同端点复用，
/// 也便于测试时用桩数据驱动。
pub async fn fetch_all<T, F, Fut>(page_size: usize, mut fetch_page: F) -> SyncResult<FetchOutcome<T>>
where
    F: FnMut(usize, usize) -> Fut,
    Fut: Future<Output = SyncResult<CollectionPage<T>>>,
{
    if page_size == 0 {
        return Err(SyncError::Config("分页大小不能为0".to_string()));
    }

    let first = fetch_page(0, page_size).await?;
    let total = first.pagination.total;
    tracing::debug!(total, page_size, "fetch-page: 首页返回 {} 条", first.items.len());

    if total == 0 {
        return Ok(FetchOutcome {
            items: Vec::new(),
            total: 0,
            complete: true,
        });
    }

    let mut items = first.items;
    let max_pages = total.div_ceil(page_size).saturating_add(1).min(MAX_PAGE_REQUESTS);
    let mut pages_fetched = 1usize;

    // 首页短于预期时同样适用“停止并警告”策略
    if items.len() < page_size.min(total) {
        tracing::warn!(
            fetched = items.len(),
            total,
            "fetch-page: 服务端在到达总数前返回短页，保留已取部分"
        );
        return Ok(FetchOutcome {
            items,
            total,
            complete: false,
        });
    }

    while items.len() < total {
        if pages_fetched >= max_pages {
            return Err(SyncError::Integrity(format!(
                "已请求 {} 页仍未到达服务端声明的总数 {}（已取 {} 条）",
                pages_fetched,
                total,
                items.len()
            )));
        }

        let offset = items.len();
        let expected = page_size.min(total - items.len());
        let page = fetch_page(offset, page_size).await?;
        pages_fetched += 1;

        tracing::debug!(
            offset,
            total,
            fetched = items.len() + page.items.len(),
            "fetch-page: 第 {} 页返回 {} 条",
            pages_fetched,
            page.items.len()
        );

        let got = page.items.len();
        items.extend(page.items);

        if got < expected {
            tracing::warn!(
                fetched = items.len(),
                total,
                "fetch-page: 服务端在到达总数前返回短页，保留已取部分"
            );
            return Ok(FetchOutcome {
                items,
                total,
                complete: false,
            });
        }
    }

    Ok(FetchOutcome {
        items,
        total,
        complete: true,
    })
}
