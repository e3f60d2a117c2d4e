use crate::domain::model::CatalogItem;
use crate::domain::ports::CatalogSource;
use crate::utils::error::{EstimateError, Result};
use crate::utils::validation::parse_amount;
use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use std::path::PathBuf;

/// CSV 中的原始一列，單價先以字串讀入再解析
#[derive(Debug, Deserialize)]
struct CatalogRow {
    #[serde(rename = "Item Name")]
    name: String,
    #[serde(rename = "Main Category", default)]
    main_category: Option<String>,
    #[serde(rename = "Sub Category 1", default)]
    sub_category_1: Option<String>,
    #[serde(rename = "Sub Category 2", default)]
    sub_category_2: Option<String>,
    #[serde(rename = "Unit Price")]
    unit_price: String,
    #[serde(rename = "Unit", default)]
    unit: Option<String>,
}

impl CatalogRow {
    fn into_item(self) -> Result<CatalogItem> {
        let name = self.name.trim().to_string();
        if name.is_empty() {
            return Err(EstimateError::validation("Item Name is empty"));
        }
        let unit_price = parse_amount("Unit Price", &self.unit_price)?;
        let clean = |value: Option<String>| value.map(|v| v.trim().to_string()).unwrap_or_default();

        Ok(CatalogItem {
            name,
            main_category: clean(self.main_category),
            sub_category_1: clean(self.sub_category_1),
            sub_category_2: clean(self.sub_category_2),
            unit_price,
            unit: clean(self.unit),
        })
    }
}

/// 解析目錄 CSV；格式錯誤的列記錄警告後略過
pub fn parse_catalog_csv(data: &[u8]) -> Result<Vec<CatalogItem>> {
    let mut reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::Headers)
        .flexible(true)
        .from_reader(data);

    let mut items = Vec::new();
    let mut skipped = 0usize;

    for (index, row) in reader.deserialize::<CatalogRow>().enumerate() {
        // 第 1 列是表頭
        let line = index + 2;
        match row.map_err(EstimateError::from).and_then(CatalogRow::into_item) {
            Ok(item) => items.push(item),
            Err(e) => {
                skipped += 1;
                tracing::warn!("Skipping catalog row {}: {}", line, e);
            }
        }
    }

    if items.is_empty() {
        return Err(EstimateError::processing(format!(
            "Catalog has no usable rows ({} skipped)",
            skipped
        )));
    }

    tracing::debug!(
        "Parsed {} catalog items ({} rows skipped)",
        items.len(),
        skipped
    );
    Ok(items)
}

#[derive(Debug, Clone)]
pub struct CsvFileCatalog {
    path: PathBuf,
}

impl CsvFileCatalog {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

#[async_trait]
impl CatalogSource for CsvFileCatalog {
    async fn load(&self) -> Result<Vec<CatalogItem>> {
        tracing::debug!("Reading catalog file: {}", self.path.display());
        let data = tokio::fs::read(&self.path).await?;
        parse_catalog_csv(&data)
    }

    fn describe(&self) -> String {
        self.path.display().to_string()
    }
}

/// 從 URL 下載 CSV（例如試算表的「發布為 CSV」連結）
#[derive(Debug, Clone)]
pub struct HttpCatalog {
    url: String,
    client: Client,
}

impl HttpCatalog {
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            client: Client::new(),
        }
    }
}

#[async_trait]
impl CatalogSource for HttpCatalog {
    async fn load(&self) -> Result<Vec<CatalogItem>> {
        tracing::debug!("Downloading catalog from: {}", self.url);
        let response = self.client.get(&self.url).send().await?;
        tracing::debug!("Catalog response status: {}", response.status());

        let response = response.error_for_status()?;
        let body = response.bytes().await?;
        parse_catalog_csv(&body)
    }

    fn describe(&self) -> String {
        self.url.clone()
    }
}

/// 依來源字串選擇實作：http(s) 開頭視為網址，其餘當作本機檔案
pub fn catalog_source_for(source: &str) -> Box<dyn CatalogSource> {
    if source.starts_with("http://") || source.starts_with("https://") {
        Box::new(HttpCatalog::new(source))
    } else {
        Box::new(CsvFileCatalog::new(source))
    }
}

#[async_trait]
impl CatalogSource for Box<dyn CatalogSource> {
    async fn load(&self) -> Result<Vec<CatalogItem>> {
        (**self).load().await
    }

    fn describe(&self) -> String {
        (**self).describe()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use httpmock::prelude::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    const CATALOG_CSV: &str = "\
Item Name,Main Category,Sub Category 1,Sub Category 2,Unit Price,Unit
Portland Cement,Civil,Binders,OPC 53,420,bag
River Sand,Civil,Aggregates,,\"1,800.00\",cum
Broken row,Civil,Aggregates,,not-a-price,cum
LED Panel 2x2,Electrical,Lighting,Indoor,1450.5,nos
";

    #[test]
    fn test_parse_catalog_csv() {
        let items = parse_catalog_csv(CATALOG_CSV.as_bytes()).unwrap();
        assert_eq!(items.len(), 3);
        assert_eq!(items[0].name, "Portland Cement");
        assert_eq!(items[1].unit_price, 1800.0);
        assert_eq!(items[1].sub_category_2, "");
        assert_eq!(items[2].main_category, "Electrical");
        assert_eq!(items[2].unit_price, 1450.5);
    }

    #[test]
    fn test_parse_catalog_without_usable_rows() {
        let data = "Item Name,Unit Price\nNothing,abc\n";
        assert!(matches!(
            parse_catalog_csv(data.as_bytes()),
            Err(EstimateError::ProcessingError { .. })
        ));
    }

    #[tokio::test]
    async fn test_file_catalog() {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(CATALOG_CSV.as_bytes()).unwrap();

        let source = CsvFileCatalog::new(file.path());
        let items = source.load().await.unwrap();
        assert_eq!(items.len(), 3);
    }

    #[tokio::test]
    async fn test_missing_file_is_io_error() {
        let source = CsvFileCatalog::new("/definitely/not/here/items.csv");
        assert!(matches!(source.load().await, Err(EstimateError::IoError(_))));
    }

    #[tokio::test]
    async fn test_http_catalog() {
        let server = MockServer::start();
        let catalog_mock = server.mock(|when, then| {
            when.method(GET).path("/items.csv");
            then.status(200)
                .header("Content-Type", "text/csv")
                .body(CATALOG_CSV);
        });

        let source = catalog_source_for(&server.url("/items.csv"));
        let items = source.load().await.unwrap();

        catalog_mock.assert();
        assert_eq!(items.len(), 3);
        assert!(source.describe().ends_with("/items.csv"));
    }

    #[tokio::test]
    async fn test_http_catalog_error_status() {
        let server = MockServer::start();
        let catalog_mock = server.mock(|when, then| {
            when.method(GET).path("/gone.csv");
            then.status(404);
        });

        let source = HttpCatalog::new(server.url("/gone.csv"));
        let result = source.load().await;

        catalog_mock.assert();
        assert!(matches!(result, Err(EstimateError::HttpError(_))));
    }
}
