use serde::{Deserialize, Serialize};
use std::ops::Range;

pub const DEFAULT_PAGE_SIZE: usize = 50;
pub const DEFAULT_WINDOW_SIZE: usize = 5;

/// 依總筆數與目前頁碼算出的頁面資訊（不儲存，每次重算）
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Page {
    pub current_page: usize,
    pub page_size: usize,
    pub total_items: usize,
    pub total_pages: usize,
    pub start_index: usize,
    pub end_index: usize,
}

impl Page {
    /// 計算頁面；頁碼超出範圍時自動夾回 `[1, total_pages]`
    pub fn compute(total_items: usize, page_size: usize, requested_page: usize) -> Self {
        let page_size = page_size.max(1);
        let total_pages = total_pages(total_items, page_size);
        let current_page = requested_page.clamp(1, total_pages);
        let start_index = ((current_page - 1) * page_size).min(total_items);
        let end_index = start_index.saturating_add(page_size).min(total_items);

        Self {
            current_page,
            page_size,
            total_items,
            total_pages,
            start_index,
            end_index,
        }
    }

    pub fn range(&self) -> Range<usize> {
        self.start_index..self.end_index
    }

    pub fn slice<'a, T>(&self, items: &'a [T]) -> &'a [T] {
        let end = self.end_index.min(items.len());
        let start = self.start_index.min(end);
        &items[start..end]
    }

    pub fn is_first(&self) -> bool {
        self.current_page == 1
    }

    pub fn is_last(&self) -> bool {
        self.current_page == self.total_pages
    }

    /// 頁碼按鈕範圍，以目前頁為中心，碰到邊界時整段平移
    pub fn window(&self, window_size: usize) -> Range<usize> {
        page_window(self.current_page, self.total_pages, window_size)
    }
}

pub fn total_pages(total_items: usize, page_size: usize) -> usize {
    total_items.div_ceil(page_size.max(1)).max(1)
}

/// 回傳半開區間 `start..end` 的頁碼
pub fn page_window(current_page: usize, total_pages: usize, window_size: usize) -> Range<usize> {
    let total_pages = total_pages.max(1);
    let window_size = window_size.clamp(1, total_pages);
    let current_page = current_page.clamp(1, total_pages);

    let half = window_size / 2;
    let mut start = current_page.saturating_sub(half).max(1);
    let end = start.saturating_add(window_size - 1).min(total_pages);
    // 靠近最後一頁時往前補滿
    start = start.min(end - (window_size - 1));

    start..end.saturating_add(1)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "action", content = "page")]
pub enum PageAction {
    First,
    Prev,
    Next,
    Last,
    Goto(usize),
}

/// 分頁狀態機，初始在第 1 頁
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageState {
    pub current: usize,
}

impl Default for PageState {
    fn default() -> Self {
        Self { current: 1 }
    }
}

impl PageState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn at(page: usize) -> Self {
        Self {
            current: page.max(1),
        }
    }

    pub fn apply(self, action: PageAction, total_pages: usize) -> Self {
        let total_pages = total_pages.max(1);
        let current = self.current.clamp(1, total_pages);
        let next = match action {
            PageAction::First => 1,
            PageAction::Prev => current.saturating_sub(1).max(1),
            PageAction::Next => current.saturating_add(1).min(total_pages),
            PageAction::Last => total_pages,
            PageAction::Goto(page) => page.clamp(1, total_pages),
        };
        Self { current: next }
    }

    pub fn page(&self, total_items: usize, page_size: usize) -> Page {
        Page::compute(total_items, page_size, self.current)
    }
}
