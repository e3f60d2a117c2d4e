use crate::core::draft::Draft;
use crate::core::pdf::render_pdf;
use crate::core::sheet::render_csv;
use crate::core::{CatalogSource, ConfigProvider, Pipeline, Storage};
use crate::domain::model::{
    CatalogItem, Estimate, OutputFormat, RenderedDocument, RenderedEstimate, Totals,
};
use crate::utils::error::Result;
use chrono::NaiveDate;
use serde::Serialize;
use std::io::Write;
use zip::write::{FileOptions, ZipWriter};

#[derive(Serialize)]
struct JsonExport<'a> {
    estimate: &'a Estimate,
    totals: &'a Totals,
}

/// 目錄 → 草稿 → 估價單文件 → 輸出
pub struct EstimatePipeline<S: Storage, K: CatalogSource, C: ConfigProvider> {
    storage: S,
    catalog: K,
    config: C,
    draft: Draft,
    today: NaiveDate,
}

impl<S: Storage, K: CatalogSource, C: ConfigProvider> EstimatePipeline<S, K, C> {
    pub fn new(storage: S, catalog: K, config: C, draft: Draft) -> Self {
        Self {
            storage,
            catalog,
            config,
            draft,
            today: chrono::Local::now().date_naive(),
        }
    }

    /// 草稿沒有日期時使用的日期
    pub fn with_today(mut self, today: NaiveDate) -> Self {
        self.today = today;
        self
    }

    fn file_name(&self, format: OutputFormat) -> String {
        format!("{}.{}", self.config.file_stem(), format.extension())
    }

    fn render(
        &self,
        format: OutputFormat,
        estimate: &Estimate,
        totals: &Totals,
    ) -> Result<RenderedDocument> {
        let bytes = match format {
            OutputFormat::Csv => render_csv(estimate, totals)?,
            OutputFormat::Pdf => render_pdf(estimate, totals, &self.config.pdf_options())?,
            OutputFormat::Json => serde_json::to_vec_pretty(&JsonExport { estimate, totals })?,
        };

        Ok(RenderedDocument {
            file_name: self.file_name(format),
            bytes,
        })
    }

    fn bundle(documents: &[RenderedDocument]) -> Result<Vec<u8>> {
        let mut zip = ZipWriter::new(std::io::Cursor::new(Vec::new()));

        for document in documents {
            zip.start_file::<_, ()>(document.file_name.as_str(), FileOptions::default())?;
            zip.write_all(&document.bytes)?;
        }

        let cursor = zip.finish()?;
        Ok(cursor.into_inner())
    }
}

#[async_trait::async_trait]
impl<S: Storage, K: CatalogSource, C: ConfigProvider> Pipeline for EstimatePipeline<S, K, C> {
    async fn extract(&self) -> Result<Vec<CatalogItem>> {
        tracing::debug!("Loading catalog from: {}", self.catalog.describe());
        self.catalog.load().await
    }

    async fn transform(&self, catalog: Vec<CatalogItem>) -> Result<RenderedEstimate> {
        let estimate = self
            .draft
            .resolve(&catalog, self.config.markups(), self.today)?;
        let totals = estimate.totals();

        let documents = self
            .config
            .output_formats()
            .into_iter()
            .map(|format| self.render(format, &estimate, &totals))
            .collect::<Result<Vec<_>>>()?;

        Ok(RenderedEstimate {
            estimate,
            totals,
            documents,
        })
    }

    async fn load(&self, rendered: RenderedEstimate) -> Result<String> {
        let base = self.config.output_path().trim_end_matches('/');

        if self.config.zip_output() {
            let zip_name = format!("{}.zip", self.config.file_stem());
            tracing::debug!(
                "Creating ZIP file with {} files",
                rendered.documents.len()
            );
            let zip_data = Self::bundle(&rendered.documents)?;

            tracing::debug!("Writing ZIP file ({} bytes) to storage", zip_data.len());
            self.storage.write_file(&zip_name, &zip_data).await?;
            return Ok(format!("{}/{}", base, zip_name));
        }

        for document in &rendered.documents {
            self.storage
                .write_file(&document.file_name, &document.bytes)
                .await?;
            tracing::info!("📄 Wrote {}/{}", base, document.file_name);
        }

        Ok(base.to_string())
    }
}
