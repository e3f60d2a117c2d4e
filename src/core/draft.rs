use crate::core::estimate::find_catalog_item;
use crate::domain::model::{CatalogItem, Estimate, Markups};
use crate::utils::error::{EstimateError, Result};
use crate::utils::validation::{parse_amount, validate_amount};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// 數量或單價，可寫成數字或字串（例如 "1,200.50"）
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum AmountInput {
    Number(f64),
    Text(String),
}

impl AmountInput {
    pub fn resolve(&self, field_name: &str) -> Result<f64> {
        match self {
            AmountInput::Number(value) => validate_amount(field_name, *value),
            AmountInput::Text(text) => parse_amount(field_name, text),
        }
    }
}

impl From<f64> for AmountInput {
    fn from(value: f64) -> Self {
        AmountInput::Number(value)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum DraftEntry {
    Standard {
        item: String,
        quantity: AmountInput,
    },
    Custom {
        name: String,
        #[serde(default)]
        unit: String,
        rate: AmountInput,
        quantity: AmountInput,
    },
    Subheading {
        title: String,
    },
}

/// 估價單草稿檔（TOML）
///
/// ```toml
/// heading = "Compound wall"
///
/// [[items]]
/// type = "subheading"
/// title = "Foundation"
///
/// [[items]]
/// type = "standard"
/// item = "Portland Cement"
/// quantity = 12
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Draft {
    pub heading: String,
    pub date: Option<NaiveDate>,
    #[serde(default)]
    pub items: Vec<DraftEntry>,
}

impl Draft {
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(&path)?;
        Self::from_toml_str(&content)
    }

    pub fn from_toml_str(content: &str) -> Result<Self> {
        toml::from_str(content).map_err(|e| EstimateError::ConfigError {
            message: format!("Draft parsing error: {}", e),
        })
    }

    /// 對照目錄把草稿轉成估價單；任何一列有誤就回傳錯誤並指出列號
    pub fn resolve(
        &self,
        catalog: &[CatalogItem],
        markups: Markups,
        today: NaiveDate,
    ) -> Result<Estimate> {
        let mut estimate = Estimate::new(&self.heading, self.date.unwrap_or(today), markups);

        for (index, entry) in self.items.iter().enumerate() {
            let line = index + 1;
            let added = match entry {
                DraftEntry::Standard { item, quantity } => {
                    let catalog_item =
                        find_catalog_item(catalog, item).map_err(|e| at_line(line, e))?;
                    let quantity = quantity.resolve("Quantity").map_err(|e| at_line(line, e))?;
                    estimate.add_catalog_item(catalog_item, quantity)
                }
                DraftEntry::Custom {
                    name,
                    unit,
                    rate,
                    quantity,
                } => {
                    let rate = rate.resolve("Rate").map_err(|e| at_line(line, e))?;
                    let quantity = quantity.resolve("Quantity").map_err(|e| at_line(line, e))?;
                    estimate.add_custom_item(name, unit, rate, quantity)
                }
                DraftEntry::Subheading { title } => estimate.add_subheading(title),
            };
            added.map_err(|e| at_line(line, e))?;
        }

        tracing::debug!(
            "Resolved draft '{}' into {} lines ({} priced)",
            estimate.heading,
            estimate.items.len(),
            estimate.priced_count()
        );
        Ok(estimate)
    }
}

fn at_line(line: usize, error: EstimateError) -> EstimateError {
    match error {
        EstimateError::ValidationError { message } => EstimateError::ValidationError {
            message: format!("line {}: {}", line, message),
        },
        EstimateError::UnknownCatalogItem { name, .. } => EstimateError::UnknownCatalogItem {
            name,
            line: Some(line),
        },
        other => other,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::model::LineItem;

    fn catalog() -> Vec<CatalogItem> {
        vec![
            CatalogItem::new("Portland Cement", "Civil", "Binders", "", 400.0, "bag"),
            CatalogItem::new("River Sand", "Civil", "Aggregates", "Fine", 1800.0, "cum"),
        ]
    }

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 6, 30).unwrap()
    }

    #[test]
    fn test_resolve_mixed_draft() {
        let draft = Draft::from_toml_str(
            r#"
heading = "Compound wall"
date = "2024-05-01"

[[items]]
type = "subheading"
title = "Foundation"

[[items]]
type = "standard"
item = "portland cement"
quantity = 12

[[items]]
type = "custom"
name = "Labour"
unit = "day"
rate = "1,200"
quantity = "2.5"
"#,
        )
        .unwrap();

        let estimate = draft.resolve(&catalog(), Markups::default(), today()).unwrap();
        assert_eq!(estimate.date, NaiveDate::from_ymd_opt(2024, 5, 1).unwrap());
        assert_eq!(estimate.items.len(), 3);
        assert_eq!(
            estimate.items[1],
            LineItem::Standard {
                name: "Portland Cement".to_string(),
                unit: "bag".to_string(),
                rate: 400.0,
                quantity: 12.0,
            }
        );
        assert_eq!(estimate.items[2].cost(), Some(3000.0));
    }

    #[test]
    fn test_missing_date_uses_today() {
        let draft = Draft::from_toml_str("heading = \"Empty\"").unwrap();
        let estimate = draft.resolve(&catalog(), Markups::default(), today()).unwrap();
        assert_eq!(estimate.date, today());
        assert!(estimate.items.is_empty());
    }

    #[test]
    fn test_non_numeric_quantity_reports_line() {
        let draft = Draft::from_toml_str(
            r#"
heading = "Bad"

[[items]]
type = "standard"
item = "River Sand"
quantity = "two"
"#,
        )
        .unwrap();

        let err = draft
            .resolve(&catalog(), Markups::default(), today())
            .unwrap_err();
        assert!(err.to_string().contains("line 1"));
        assert!(err.to_string().contains("must be a number"));
    }

    #[test]
    fn test_unknown_item_reports_line() {
        let draft = Draft {
            heading: "x".to_string(),
            date: None,
            items: vec![
                DraftEntry::Subheading {
                    title: "Flooring".to_string(),
                },
                DraftEntry::Standard {
                    item: "Granite".to_string(),
                    quantity: 1.0.into(),
                },
            ],
        };

        let err = draft
            .resolve(&catalog(), Markups::default(), today())
            .unwrap_err();
        assert!(matches!(
            &err,
            EstimateError::UnknownCatalogItem { name, line: Some(2) } if name == "Granite"
        ));
        assert!(err.to_string().contains("line 2: Granite"));
    }

    #[test]
    fn test_unknown_entry_type_is_a_parse_error() {
        let result = Draft::from_toml_str(
            r#"
heading = "x"
[[items]]
type = "discount"
"#,
        );
        assert!(matches!(result, Err(EstimateError::ConfigError { .. })));
    }
}
