use clap::Parser;
use estimate_draft::config::cli::{BrowseArgs, BuildArgs, Command};
use estimate_draft::core::estimate::{format_amount, format_rate};
use estimate_draft::core::{CatalogSource, Pipeline};
use estimate_draft::utils::error::EstimateError;
use estimate_draft::utils::{
    logger,
    validation::{validate_required_field, Validate},
};
use estimate_draft::{
    catalog_source_for, BrowserAction, BrowserView, CatalogBrowser, CliConfig, Draft,
    EstimateConfig, EstimateEngine, EstimatePipeline, LocalStorage, PageAction,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = CliConfig::parse();

    // 初始化日誌
    if cli.log_json {
        logger::init_json_logger(cli.verbose);
    } else {
        logger::init_cli_logger(cli.verbose);
    }

    tracing::info!("🚀 Starting estimate-draft");
    if cli.verbose {
        tracing::debug!("CLI config: {:?}", cli);
    }

    let config = load_config(cli.config.as_deref());

    let result = match &cli.command {
        Command::Browse(args) => run_browse(args, config).await,
        Command::Build(args) => run_build(args, config).await,
    };

    if let Err(e) = result {
        // 記錄詳細錯誤信息
        tracing::error!(
            "❌ Command failed: {} (Category: {:?}, Severity: {:?})",
            e,
            e.category(),
            e.severity()
        );
        tracing::error!("💡 Recovery suggestion: {}", e.recovery_suggestion());

        eprintln!("❌ {}", e.user_friendly_message());
        eprintln!("💡 建議: {}", e.recovery_suggestion());

        // 根據錯誤嚴重程度決定退出碼
        std::process::exit(e.exit_code());
    }

    Ok(())
}

fn load_config(path: Option<&str>) -> EstimateConfig {
    let Some(path) = path else {
        tracing::debug!("No configuration file given, using defaults");
        return EstimateConfig::default();
    };

    tracing::info!("📁 Loading configuration from: {}", path);
    match EstimateConfig::from_file(path) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("❌ Failed to load config file '{}': {}", path, e);
            eprintln!("💡 Make sure the file exists and is valid TOML format");
            std::process::exit(1);
        }
    }
}

async fn run_browse(args: &BrowseArgs, mut config: EstimateConfig) -> Result<(), EstimateError> {
    args.apply_to(&mut config);
    config.validate()?;

    let source = validate_required_field("catalog.source", &config.catalog.source)?;
    let catalog = catalog_source_for(source).load().await?;
    tracing::info!("📚 Loaded {} catalog items", catalog.len());

    let browser = CatalogBrowser::with_filter(args.filter_state()).apply(
        BrowserAction::Page(PageAction::Goto(args.page)),
        &catalog,
        &config.browser,
    );
    let view = browser.view(&catalog, &config.browser);

    display_view(&view);
    Ok(())
}

fn display_view(view: &BrowserView<'_>) {
    println!(
        "🔎 {} matching items (page {} of {})",
        view.total_matches(),
        view.page.current_page,
        view.page.total_pages
    );

    for (offset, item) in view.items.iter().enumerate() {
        println!(
            "  {:>5}. {} | {} > {} > {} | {} @ {}",
            view.page.start_index + offset + 1,
            item.name,
            item.main_category,
            item.sub_category_1,
            item.sub_category_2,
            item.unit,
            format_amount(item.unit_price)
        );
    }

    let pages: Vec<String> = view
        .window
        .clone()
        .map(|page| {
            if page == view.page.current_page {
                format!("[{}]", page)
            } else {
                page.to_string()
            }
        })
        .collect();
    println!("📄 Pages: {}", pages.join(" "));

    println!("📂 Main categories: {}", view.main_options.join(", "));
    println!("📂 Sub categories 1: {}", view.sub1_options.join(", "));
    println!("📂 Sub categories 2: {}", view.sub2_options.join(", "));
}

async fn run_build(args: &BuildArgs, mut config: EstimateConfig) -> Result<(), EstimateError> {
    args.apply_to(&mut config);
    config.validate()?;
    tracing::info!("✅ Configuration loaded and validated successfully");

    let source = validate_required_field("catalog.source", &config.catalog.source)?.clone();
    tracing::info!("📝 Loading draft from: {}", args.draft);
    let draft = Draft::from_file(&args.draft)?;

    display_config_summary(&config, &source, args);

    let storage = LocalStorage::new(config.output.path.clone());
    let pipeline = EstimatePipeline::new(storage, catalog_source_for(&source), config, draft);

    if args.dry_run {
        tracing::info!("🔍 DRY RUN MODE - No files will be written");
        let catalog = pipeline.extract().await?;
        let rendered = pipeline.transform(catalog).await?;

        println!("🧮 {}", rendered.estimate.heading);
        println!("  Subtotal: {}", format_amount(rendered.totals.subtotal));
        println!(
            "  GST ({}): {}",
            format_rate(rendered.estimate.markups.gst_rate),
            format_amount(rendered.totals.gst)
        );
        println!(
            "  Contingency ({}): {}",
            format_rate(rendered.estimate.markups.contingency_rate),
            format_amount(rendered.totals.contingency)
        );
        println!("  Grand Total: {}", format_amount(rendered.totals.grand_total));
        for document in &rendered.documents {
            println!(
                "  Would write {} ({} bytes)",
                document.file_name,
                document.bytes.len()
            );
        }
        return Ok(());
    }

    let engine = EstimateEngine::new(pipeline);
    let output_path = engine.run().await?;

    tracing::info!("✅ Estimate exported successfully!");
    println!("✅ Estimate exported successfully!");
    println!("📁 Output saved to: {}", output_path);
    Ok(())
}

fn display_config_summary(config: &EstimateConfig, source: &str, args: &BuildArgs) {
    println!("📋 Configuration Summary:");
    println!("  Catalog: {}", source);
    println!("  Draft: {}", args.draft);
    println!("  Output: {}", config.output.path);
    println!("  Formats: {}", config.output.formats.join(", "));
    println!("  ZIP: {}", config.output.zip);
    println!(
        "  GST: {}  Contingency: {}",
        format_rate(config.markups.gst_rate),
        format_rate(config.markups.contingency_rate)
    );

    if let Some(watermark) = &config.output.watermark {
        println!("  Watermark: {}", watermark);
    }
    if args.dry_run {
        println!("  🔍 DRY RUN MODE ENABLED");
    }
}
