use crate::domain::model::{
    CatalogItem, Markups, OutputFormat, PdfLayoutOptions, RenderedEstimate,
};
use crate::utils::error::Result;
use async_trait::async_trait;

pub trait Storage: Send + Sync {
    fn write_file(
        &self,
        path: &str,
        data: &[u8],
    ) -> impl std::future::Future<Output = Result<()>> + Send;
}

pub trait ConfigProvider: Send + Sync {
    fn output_path(&self) -> &str;
    fn output_formats(&self) -> Vec<OutputFormat>;
    fn file_stem(&self) -> &str;
    fn zip_output(&self) -> bool;
    fn markups(&self) -> Markups;
    fn pdf_options(&self) -> PdfLayoutOptions;
}

/// 提供目錄資料的來源（本機檔案或 HTTP）
#[async_trait]
pub trait CatalogSource: Send + Sync {
    async fn load(&self) -> Result<Vec<CatalogItem>>;
    fn describe(&self) -> String;
}

#[async_trait]
pub trait Pipeline: Send + Sync {
    async fn extract(&self) -> Result<Vec<CatalogItem>>;
    async fn transform(&self, catalog: Vec<CatalogItem>) -> Result<RenderedEstimate>;
    async fn load(&self, rendered: RenderedEstimate) -> Result<String>;
}
