//! 核心响应处理模块
//!
//! 列表接口默认返回完整数组；配置了页大小时改为分页信封
//! `{count, next, previous, results}`，页码从 1 开始。

use serde::Serialize;

use super::error::CoreError;

/// 分页响应
#[derive(Debug, Serialize)]
pub struct Page<T> {
    pub count: usize,
    pub next: Option<String>,
    pub previous: Option<String>,
    pub results: Vec<T>,
}

/// 列表响应：未分页时是裸数组
#[derive(Debug, Serialize)]
#[serde(untagged)]
pub enum Listing<T> {
    All(Vec<T>),
    Paged(Page<T>),
}

/// 按页切分，`page` 为原始查询参数（支持 `last`）
pub fn paginate<T>(
    items: Vec<T>,
    page: Option<&str>,
    page_size: usize,
    collection_url: &str,
) -> Result<Page<T>, CoreError> {
    let count = items.len();
    let page_size = page_size.max(1);
    let num_pages = count.div_ceil(page_size).max(1);

    let number = match page {
        None => 1,
        Some("last") => num_pages,
        Some(raw) => raw.parse::<usize>().map_err(|_| CoreError::InvalidPage)?,
    };
    if number == 0 || number > num_pages {
        return Err(CoreError::InvalidPage);
    }

    let start = (number - 1) * page_size;
    let results: Vec<T> = items.into_iter().skip(start).take(page_size).collect();

    let next = (number < num_pages).then(|| format!("{}?page={}", collection_url, number + 1));
    let previous = match number {
        1 => None,
        2 => Some(collection_url.to_string()),
        n => Some(format!("{}?page={}", collection_url, n - 1)),
    };

    Ok(Page {
        count,
        next,
        previous,
        results,
    })
}
