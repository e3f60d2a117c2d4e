use crate::domain::model::CatalogItem;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CategoryLevel {
    Main,
    Sub1,
    Sub2,
}

impl CategoryLevel {
    fn value_of(self, item: &CatalogItem) -> &str {
        match self {
            CategoryLevel::Main => &item.main_category,
            CategoryLevel::Sub1 => &item.sub_category_1,
            CategoryLevel::Sub2 => &item.sub_category_2,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "cli", derive(clap::ValueEnum))]
#[serde(rename_all = "snake_case")]
pub enum SearchMode {
    /// 只比對品名
    #[default]
    Name,
    /// 拆成多個關鍵字，比對品名、分類與單位的組合字串
    #[cfg_attr(feature = "cli", value(alias = "all_fields"))]
    AllFields,
}

/// 目前套用的分類與搜尋條件
///
/// 所有修改方法都回傳新的狀態，原狀態不變。
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FilterState {
    pub main: BTreeSet<String>,
    pub sub1: BTreeSet<String>,
    pub sub2: BTreeSet<String>,
    pub search: String,
}

impl FilterState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn selected(&self, level: CategoryLevel) -> &BTreeSet<String> {
        match level {
            CategoryLevel::Main => &self.main,
            CategoryLevel::Sub1 => &self.sub1,
            CategoryLevel::Sub2 => &self.sub2,
        }
    }

    fn selected_mut(&mut self, level: CategoryLevel) -> &mut BTreeSet<String> {
        match level {
            CategoryLevel::Main => &mut self.main,
            CategoryLevel::Sub1 => &mut self.sub1,
            CategoryLevel::Sub2 => &mut self.sub2,
        }
    }

    /// 勾選/取消勾選某個分類值
    pub fn toggled(&self, level: CategoryLevel, value: &str) -> Self {
        let mut next = self.clone();
        let set = next.selected_mut(level);
        if !set.remove(value) {
            set.insert(value.to_string());
        }
        next
    }

    pub fn with_selected<I, S>(&self, level: CategoryLevel, values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut next = self.clone();
        next.selected_mut(level)
            .extend(values.into_iter().map(Into::into));
        next
    }

    pub fn with_search(&self, search: impl Into<String>) -> Self {
        Self {
            search: search.into(),
            ..self.clone()
        }
    }

    pub fn reset() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.main.is_empty()
            && self.sub1.is_empty()
            && self.sub2.is_empty()
            && self.search.trim().is_empty()
    }
}

fn level_matches(state: &FilterState, level: CategoryLevel, item: &CatalogItem) -> bool {
    let selected = state.selected(level);
    selected.is_empty() || selected.contains(level.value_of(item))
}

/// 預先處理過的搜尋條件
#[derive(Debug, Clone)]
struct SearchQuery {
    mode: SearchMode,
    phrase: String,
    terms: Vec<String>,
}

impl SearchQuery {
    fn parse(search: &str, mode: SearchMode) -> Option<Self> {
        let phrase = search.trim().to_lowercase();
        if phrase.is_empty() {
            return None;
        }
        let terms = phrase.split_whitespace().map(str::to_string).collect();
        Some(Self {
            mode,
            phrase,
            terms,
        })
    }

    fn matches(&self, item: &CatalogItem) -> bool {
        match self.mode {
            SearchMode::Name => item.name.to_lowercase().contains(&self.phrase),
            SearchMode::AllFields => {
                let haystack = [
                    item.name.as_str(),
                    item.main_category.as_str(),
                    item.sub_category_1.as_str(),
                    item.sub_category_2.as_str(),
                    item.unit.as_str(),
                ]
                .join(" ")
                .to_lowercase();
                self.terms.iter().all(|term| haystack.contains(term.as_str()))
            }
        }
    }
}

/// 依分類與搜尋條件篩選目錄，保留原本順序
pub fn filter_items<'a>(
    catalog: &'a [CatalogItem],
    state: &FilterState,
    mode: SearchMode,
) -> Vec<&'a CatalogItem> {
    let query = SearchQuery::parse(&state.search, mode);

    catalog
        .iter()
        .filter(|item| {
            level_matches(state, CategoryLevel::Main, item)
                && level_matches(state, CategoryLevel::Sub1, item)
                && level_matches(state, CategoryLevel::Sub2, item)
                && query.as_ref().map_or(true, |q| q.matches(item))
        })
        .collect()
}

fn distinct_values<'a, I>(items: I, level: CategoryLevel) -> Vec<String>
where
    I: Iterator<Item = &'a CatalogItem>,
{
    items
        .map(|item| level.value_of(item))
        .filter(|value| !value.trim().is_empty())
        .map(str::to_string)
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect()
}

/// 計算某一層可勾選的選項（已排序、去重）
///
/// 第一層列出所有主分類；第二層只列出已選主分類底下的值，
/// 第三層只列出已選第二層底下的值。上層未選時不做限制。
pub fn category_options(
    catalog: &[CatalogItem],
    state: &FilterState,
    level: CategoryLevel,
) -> Vec<String> {
    let parent = match level {
        CategoryLevel::Main => None,
        CategoryLevel::Sub1 => Some(CategoryLevel::Main),
        CategoryLevel::Sub2 => Some(CategoryLevel::Sub1),
    };

    match parent {
        Some(parent) if !state.selected(parent).is_empty() => distinct_values(
            catalog
                .iter()
                .filter(|item| level_matches(state, parent, item)),
            level,
        ),
        _ => distinct_values(catalog.iter(), level),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn catalog() -> Vec<CatalogItem> {
        vec![
            CatalogItem::new("Product 1", "Electronics", "Phones", "Android", 199.0, "nos"),
            CatalogItem::new("Product 12", "Electronics", "Phones", "iOS", 899.0, "nos"),
            CatalogItem::new("Product 120", "Electronics", "Laptops", "Ultrabook", 1299.0, "nos"),
            CatalogItem::new("Product 12 Case", "Accessories", "Phones", "Cases", 19.0, "nos"),
            CatalogItem::new("Portland Cement", "Civil", "Binders", "", 420.0, "bag"),
            CatalogItem::new("River Sand", "Civil", "Aggregates", "Fine", 1800.0, "cum"),
        ]
    }

    fn names(items: &[&CatalogItem]) -> Vec<String> {
        items.iter().map(|i| i.name.clone()).collect()
    }

    #[test]
    fn test_empty_filter_returns_catalog_in_order() {
        let catalog = catalog();
        let result = filter_items(&catalog, &FilterState::new(), SearchMode::Name);
        assert_eq!(result.len(), catalog.len());
        for (got, expected) in result.iter().zip(catalog.iter()) {
            assert_eq!(*got, expected);
        }
    }

    #[test]
    fn test_main_category_only() {
        let catalog = catalog();
        let state = FilterState::new().toggled(CategoryLevel::Main, "Civil");
        let result = filter_items(&catalog, &state, SearchMode::Name);
        assert_eq!(names(&result), vec!["Portland Cement", "River Sand"]);
        assert!(result.iter().all(|i| i.main_category == "Civil"));
    }

    #[test]
    fn test_levels_are_conjunctive_with_search() {
        let catalog = catalog();
        let state = FilterState::new()
            .toggled(CategoryLevel::Main, "Electronics")
            .toggled(CategoryLevel::Sub1, "Phones")
            .with_search("Product 12");
        let result = filter_items(&catalog, &state, SearchMode::Name);
        // "Product 12 Case" 屬於 Accessories，"Product 120" 屬於 Laptops
        assert_eq!(names(&result), vec!["Product 12"]);
    }

    #[test]
    fn test_search_is_case_insensitive() {
        let catalog = catalog();
        let lower = filter_items(
            &catalog,
            &FilterState::new().with_search("cement"),
            SearchMode::Name,
        );
        let upper = filter_items(
            &catalog,
            &FilterState::new().with_search("CEMENT"),
            SearchMode::Name,
        );
        assert_eq!(lower, upper);
        assert_eq!(names(&lower), vec!["Portland Cement"]);
    }

    #[test]
    fn test_blank_search_is_no_constraint() {
        let catalog = catalog();
        let result = filter_items(
            &catalog,
            &FilterState::new().with_search("   "),
            SearchMode::AllFields,
        );
        assert_eq!(result.len(), catalog.len());
    }

    #[test]
    fn test_all_fields_terms_match_in_any_order() {
        let catalog = catalog();
        let state = FilterState::new().with_search("fine civil");
        let result = filter_items(&catalog, &state, SearchMode::AllFields);
        assert_eq!(names(&result), vec!["River Sand"]);

        // 品名模式下同樣的字串不會命中
        let result = filter_items(&catalog, &state, SearchMode::Name);
        assert!(result.is_empty());
    }

    #[test]
    fn test_toggle_twice_deselects() {
        let state = FilterState::new()
            .toggled(CategoryLevel::Sub2, "Fine")
            .toggled(CategoryLevel::Sub2, "Fine");
        assert!(state.is_empty());
    }

    #[test]
    fn test_unknown_selection_yields_empty_result() {
        let catalog = catalog();
        let state = FilterState::new().toggled(CategoryLevel::Main, "Plumbing");
        assert!(filter_items(&catalog, &state, SearchMode::Name).is_empty());
    }

    #[test]
    fn test_sub1_options_follow_main_selection() {
        let catalog = catalog();
        let all = category_options(&catalog, &FilterState::new(), CategoryLevel::Sub1);
        assert_eq!(all, vec!["Aggregates", "Binders", "Laptops", "Phones"]);

        let state = FilterState::new().toggled(CategoryLevel::Main, "Electronics");
        let narrowed = category_options(&catalog, &state, CategoryLevel::Sub1);
        assert_eq!(narrowed, vec!["Laptops", "Phones"]);
        // 選了主分類不會自動勾選子分類
        assert!(state.sub1.is_empty());
    }

    #[test]
    fn test_sub2_options_follow_sub1_selection_and_skip_blanks() {
        let catalog = catalog();
        let all = category_options(&catalog, &FilterState::new(), CategoryLevel::Sub2);
        assert_eq!(
            all,
            vec!["Android", "Cases", "Fine", "Ultrabook", "iOS"]
        );

        let state = FilterState::new().toggled(CategoryLevel::Sub1, "Phones");
        let narrowed = category_options(&catalog, &state, CategoryLevel::Sub2);
        assert_eq!(narrowed, vec!["Android", "Cases", "iOS"]);
    }

    #[test]
    fn test_main_options_ignore_selection() {
        let catalog = catalog();
        let state = FilterState::new().toggled(CategoryLevel::Main, "Civil");
        assert_eq!(
            category_options(&catalog, &state, CategoryLevel::Main),
            vec!["Accessories", "Civil", "Electronics"]
        );
    }
}
