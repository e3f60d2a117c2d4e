use crate::core::filter::{category_options, filter_items, CategoryLevel, FilterState, SearchMode};
use crate::core::paginator::{
    total_pages, Page, PageAction, PageState, DEFAULT_PAGE_SIZE, DEFAULT_WINDOW_SIZE,
};
use crate::domain::model::CatalogItem;
use serde::{Deserialize, Serialize};
use std::ops::Range;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct BrowserSettings {
    pub page_size: usize,
    pub window_size: usize,
    pub search_mode: SearchMode,
}

impl Default for BrowserSettings {
    fn default() -> Self {
        Self {
            page_size: DEFAULT_PAGE_SIZE,
            window_size: DEFAULT_WINDOW_SIZE,
            search_mode: SearchMode::Name,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BrowserAction {
    Toggle(CategoryLevel, String),
    Search(String),
    ResetFilters,
    Page(PageAction),
}

/// 一個使用者的瀏覽狀態：篩選條件與目前頁碼
///
/// 狀態只透過 [`CatalogBrowser::apply`] 產生新值，不同 session 之間不共用。
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CatalogBrowser {
    pub filter: FilterState,
    pub page: PageState,
}

/// 單次畫面所需的全部資料
#[derive(Debug, Clone)]
pub struct BrowserView<'a> {
    pub items: Vec<&'a CatalogItem>,
    pub page: Page,
    pub window: Range<usize>,
    pub main_options: Vec<String>,
    pub sub1_options: Vec<String>,
    pub sub2_options: Vec<String>,
}

impl BrowserView<'_> {
    pub fn total_matches(&self) -> usize {
        self.page.total_items
    }
}

impl CatalogBrowser {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_filter(filter: FilterState) -> Self {
        Self {
            filter,
            page: PageState::new(),
        }
    }

    /// 套用一個使用者動作；任何改變篩選條件的動作都會回到第 1 頁
    pub fn apply(
        &self,
        action: BrowserAction,
        catalog: &[CatalogItem],
        settings: &BrowserSettings,
    ) -> Self {
        let filter = match action {
            BrowserAction::Page(page_action) => {
                let matches = filter_items(catalog, &self.filter, settings.search_mode).len();
                return Self {
                    filter: self.filter.clone(),
                    page: self
                        .page
                        .apply(page_action, total_pages(matches, settings.page_size)),
                };
            }
            BrowserAction::Toggle(level, value) => self.filter.toggled(level, &value),
            BrowserAction::Search(search) => self.filter.with_search(search),
            BrowserAction::ResetFilters => FilterState::reset(),
        };

        tracing::debug!(?filter, "Filter changed, returning to first page");
        Self::with_filter(filter)
    }

    pub fn view<'a>(&self, catalog: &'a [CatalogItem], settings: &BrowserSettings) -> BrowserView<'a> {
        let matches = filter_items(catalog, &self.filter, settings.search_mode);
        let page = self.page.page(matches.len(), settings.page_size);
        let window = page.window(settings.window_size);
        let items = page.slice(&matches).to_vec();

        BrowserView {
            items,
            page,
            window,
            main_options: category_options(catalog, &self.filter, CategoryLevel::Main),
            sub1_options: category_options(catalog, &self.filter, CategoryLevel::Sub1),
            sub2_options: category_options(catalog, &self.filter, CategoryLevel::Sub2),
        }
    }
}
