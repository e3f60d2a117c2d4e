use crate::domain::model::{CatalogItem, Estimate, EstimateRow, LineItem, Markups, Totals};
use crate::utils::error::{EstimateError, Result};
use crate::utils::validation::{validate_amount, validate_non_empty_string};
use chrono::NaiveDate;

impl Estimate {
    pub fn new(heading: impl Into<String>, date: NaiveDate, markups: Markups) -> Self {
        Self {
            heading: heading.into(),
            date,
            items: Vec::new(),
            markups,
        }
    }

    /// 由目錄加入一筆項目，單價與單位沿用目錄資料
    pub fn add_catalog_item(&mut self, item: &CatalogItem, quantity: f64) -> Result<()> {
        let quantity = validate_amount("Quantity", quantity)?;
        let rate = validate_amount("Unit Price", item.unit_price)?;
        self.items.push(LineItem::Standard {
            name: item.name.clone(),
            unit: item.unit.clone(),
            rate,
            quantity,
        });
        Ok(())
    }

    pub fn add_custom_item(
        &mut self,
        name: &str,
        unit: &str,
        rate: f64,
        quantity: f64,
    ) -> Result<()> {
        if name.trim().is_empty() {
            return Err(EstimateError::validation("Item name cannot be empty"));
        }
        let rate = validate_amount("Rate", rate)?;
        let quantity = validate_amount("Quantity", quantity)?;
        self.items.push(LineItem::Custom {
            name: name.trim().to_string(),
            unit: unit.trim().to_string(),
            rate,
            quantity,
        });
        Ok(())
    }

    pub fn add_subheading(&mut self, title: &str) -> Result<()> {
        validate_non_empty_string("subheading", title)
            .map_err(|_| EstimateError::validation("Subheading cannot be empty"))?;
        self.items.push(LineItem::Subheading {
            title: title.trim().to_string(),
        });
        Ok(())
    }

    fn check_index(&self, index: usize) -> Result<()> {
        if index >= self.items.len() {
            return Err(EstimateError::validation(format!(
                "Line {} does not exist (estimate has {} lines)",
                index + 1,
                self.items.len()
            )));
        }
        Ok(())
    }

    pub fn remove(&mut self, index: usize) -> Result<LineItem> {
        self.check_index(index)?;
        Ok(self.items.remove(index))
    }

    pub fn move_item(&mut self, from: usize, to: usize) -> Result<()> {
        self.check_index(from)?;
        self.check_index(to)?;
        let item = self.items.remove(from);
        self.items.insert(to, item);
        Ok(())
    }

    pub fn set_quantity(&mut self, index: usize, new_quantity: f64) -> Result<()> {
        self.check_index(index)?;
        let new_quantity = validate_amount("Quantity", new_quantity)?;
        match &mut self.items[index] {
            LineItem::Standard { quantity, .. } | LineItem::Custom { quantity, .. } => {
                *quantity = new_quantity;
                Ok(())
            }
            LineItem::Subheading { title } => Err(EstimateError::validation(format!(
                "Subheading '{}' has no quantity",
                title
            ))),
        }
    }

    pub fn priced_count(&self) -> usize {
        self.items.iter().filter(|item| item.is_priced()).count()
    }

    pub fn totals(&self) -> Totals {
        let subtotal: f64 = self.items.iter().filter_map(LineItem::cost).sum();
        let gst = subtotal * self.markups.gst_rate;
        let contingency = subtotal * self.markups.contingency_rate;

        Totals {
            subtotal,
            gst,
            contingency,
            grand_total: subtotal + gst + contingency,
        }
    }

    /// 依序編號，小標題不佔序號
    pub fn numbered_rows(&self) -> Vec<EstimateRow<'_>> {
        let mut serial = 0;
        self.items
            .iter()
            .map(|item| match item {
                LineItem::Standard {
                    name,
                    unit,
                    rate,
                    quantity,
                }
                | LineItem::Custom {
                    name,
                    unit,
                    rate,
                    quantity,
                } => {
                    serial += 1;
                    EstimateRow::Priced {
                        serial,
                        name,
                        unit,
                        rate: *rate,
                        quantity: *quantity,
                        cost: rate * quantity,
                    }
                }
                LineItem::Subheading { title } => EstimateRow::Subheading { title },
            })
            .collect()
    }
}

/// 以品名找目錄項目：先精確比對，再忽略大小寫
pub fn find_catalog_item<'a>(catalog: &'a [CatalogItem], name: &str) -> Result<&'a CatalogItem> {
    let wanted = name.trim();
    catalog
        .iter()
        .find(|item| item.name == wanted)
        .or_else(|| {
            let lowered = wanted.to_lowercase();
            catalog
                .iter()
                .find(|item| item.name.to_lowercase() == lowered)
        })
        .ok_or_else(|| EstimateError::UnknownCatalogItem {
            name: wanted.to_string(),
            line: None,
        })
}

/// 金額顯示為兩位小數
pub fn format_amount(value: f64) -> String {
    format!("{:.2}", value)
}

/// 0.18 -> "18%"，0.125 -> "12.5%"
pub fn format_rate(rate: f64) -> String {
    let percent = (rate * 10000.0).round() / 100.0;
    if percent.fract() == 0.0 {
        format!("{:.0}%", percent)
    } else {
        format!("{}%", percent)
    }
}
