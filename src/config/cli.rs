use crate::config::toml_config::EstimateConfig;
use crate::core::filter::{CategoryLevel, FilterState, SearchMode};
use clap::{Args, Parser, Subcommand};

#[derive(Debug, Clone, Parser)]
#[command(name = "estimate-draft")]
#[command(about = "Draft construction estimates from a priced catalog")]
pub struct CliConfig {
    /// Path to TOML configuration file
    #[arg(short, long, global = true)]
    pub config: Option<String>,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Emit logs as JSON lines
    #[arg(long, global = true)]
    pub log_json: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Clone, Subcommand)]
pub enum Command {
    /// Filter and page through the catalog
    Browse(BrowseArgs),
    /// Build an estimate from a draft file and export it
    Build(BuildArgs),
}

#[derive(Debug, Clone, Default, Args)]
pub struct BrowseArgs {
    /// Catalog CSV path or http(s) URL
    #[arg(long)]
    pub catalog: Option<String>,

    /// Main category to select (repeatable)
    #[arg(long)]
    pub main: Vec<String>,

    /// Sub category 1 to select (repeatable)
    #[arg(long)]
    pub sub1: Vec<String>,

    /// Sub category 2 to select (repeatable)
    #[arg(long)]
    pub sub2: Vec<String>,

    /// Case-insensitive search text
    #[arg(short, long)]
    pub search: Option<String>,

    #[arg(long, value_enum)]
    pub search_mode: Option<SearchMode>,

    /// Page to show (clamped to the available range)
    #[arg(short, long, default_value = "1")]
    pub page: usize,

    #[arg(long)]
    pub page_size: Option<usize>,
}

impl BrowseArgs {
    pub fn apply_to(&self, config: &mut EstimateConfig) {
        if let Some(catalog) = &self.catalog {
            config.catalog.source = Some(catalog.clone());
        }
        if let Some(mode) = self.search_mode {
            config.browser.search_mode = mode;
        }
        if let Some(page_size) = self.page_size {
            config.browser.page_size = page_size;
        }
    }

    pub fn filter_state(&self) -> FilterState {
        FilterState::new()
            .with_selected(CategoryLevel::Main, self.main.iter().cloned())
            .with_selected(CategoryLevel::Sub1, self.sub1.iter().cloned())
            .with_selected(CategoryLevel::Sub2, self.sub2.iter().cloned())
            .with_search(self.search.clone().unwrap_or_default())
    }
}

#[derive(Debug, Clone, Default, Args)]
pub struct BuildArgs {
    /// Catalog CSV path or http(s) URL
    #[arg(long)]
    pub catalog: Option<String>,

    /// Draft estimate (TOML)
    #[arg(short, long)]
    pub draft: String,

    /// Output directory
    #[arg(short, long)]
    pub output: Option<String>,

    /// Output formats: csv, pdf, json
    #[arg(long, value_delimiter = ',')]
    pub formats: Vec<String>,

    /// Bundle all documents into one ZIP archive
    #[arg(long)]
    pub zip: bool,

    /// Watermark text printed on every PDF page
    #[arg(long)]
    pub watermark: Option<String>,

    /// Resolve and total the draft without writing files
    #[arg(long)]
    pub dry_run: bool,
}

impl BuildArgs {
    pub fn apply_to(&self, config: &mut EstimateConfig) {
        if let Some(catalog) = &self.catalog {
            config.catalog.source = Some(catalog.clone());
        }
        if let Some(output) = &self.output {
            config.output.path = output.clone();
        }
        if !self.formats.is_empty() {
            config.output.formats = self.formats.clone();
        }
        if self.zip {
            config.output.zip = true;
        }
        if let Some(watermark) = &self.watermark {
            config.output.watermark = Some(watermark.clone());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_browse_command() {
        let cli = CliConfig::try_parse_from([
            "estimate-draft",
            "browse",
            "--catalog",
            "items.csv",
            "--main",
            "Electronics",
            "--sub1",
            "Phones",
            "--search",
            "Product 12",
            "--page",
            "3",
        ])
        .unwrap();

        let Command::Browse(args) = cli.command else {
            panic!("expected browse command");
        };
        let filter = args.filter_state();
        assert!(filter.main.contains("Electronics"));
        assert!(filter.sub1.contains("Phones"));
        assert!(filter.sub2.is_empty());
        assert_eq!(filter.search, "Product 12");
        assert_eq!(args.page, 3);

        let mut config = EstimateConfig::default();
        args.apply_to(&mut config);
        assert_eq!(config.catalog_source(), Some("items.csv"));
        assert_eq!(config.browser.search_mode, SearchMode::Name);
    }

    #[test]
    fn test_build_overrides_config() {
        let cli = CliConfig::try_parse_from([
            "estimate-draft",
            "--verbose",
            "build",
            "--draft",
            "wall.toml",
            "--formats",
            "pdf,json",
            "--zip",
            "--output",
            "out",
        ])
        .unwrap();
        assert!(cli.verbose);

        let Command::Build(args) = cli.command else {
            panic!("expected build command");
        };
        let mut config = EstimateConfig::default();
        args.apply_to(&mut config);

        assert_eq!(config.output.formats, vec!["pdf", "json"]);
        assert!(config.output.zip);
        assert_eq!(config.output.path, "out");
        assert!(!args.dry_run);
    }

    #[test]
    fn test_search_mode_flag() {
        let mode_of = |value: &str| {
            CliConfig::try_parse_from(["estimate-draft", "browse", "--search-mode", value]).map(
                |cli| match cli.command {
                    Command::Browse(args) => args.search_mode,
                    Command::Build(_) => None,
                },
            )
        };

        assert_eq!(mode_of("name").unwrap(), Some(SearchMode::Name));
        assert_eq!(mode_of("all-fields").unwrap(), Some(SearchMode::AllFields));
        assert_eq!(mode_of("all_fields").unwrap(), Some(SearchMode::AllFields));
        assert!(mode_of("fuzzy").is_err());

        let cli = CliConfig::try_parse_from([
            "estimate-draft",
            "browse",
            "--search-mode",
            "all-fields",
        ])
        .unwrap();
        let Command::Browse(args) = cli.command else {
            panic!("expected browse command");
        };
        let mut config = EstimateConfig::default();
        args.apply_to(&mut config);
        assert_eq!(config.browser.search_mode, SearchMode::AllFields);
    }
}
