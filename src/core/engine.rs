use crate::core::Pipeline;
use crate::utils::error::Result;

pub struct EstimateEngine<P: Pipeline> {
    pipeline: P,
}

impl<P: Pipeline> EstimateEngine<P> {
    pub fn new(pipeline: P) -> Self {
        Self { pipeline }
    }

    pub async fn run(&self) -> Result<String> {
        tracing::info!("Starting estimate export...");

        // Extract
        let catalog = self.pipeline.extract().await?;
        tracing::info!("📚 Loaded {} catalog items", catalog.len());

        // Transform
        let rendered = self.pipeline.transform(catalog).await?;
        tracing::info!(
            "🧮 '{}': {} lines, subtotal {:.2}, grand total {:.2}",
            rendered.estimate.heading,
            rendered.estimate.items.len(),
            rendered.totals.subtotal,
            rendered.totals.grand_total
        );

        // Load
        let output_path = self.pipeline.load(rendered).await?;
        tracing::info!("📁 Output saved to: {}", output_path);

        Ok(output_path)
    }
}
