use estimate_draft::adapters::catalog::parse_catalog_csv;
use estimate_draft::{
    BrowserAction, BrowserSettings, CatalogBrowser, CatalogItem, CategoryLevel, PageAction,
    SearchMode,
};

fn generated_catalog(count: usize) -> Vec<CatalogItem> {
    let groups = [
        ("Electronics", "Phones", "Android"),
        ("Electronics", "Laptops", "Ultrabook"),
        ("Furniture", "Chairs", "Office"),
        ("Furniture", "Tables", "Dining"),
    ];

    (1..=count)
        .map(|i| {
            let (main, sub1, sub2) = groups[i % groups.len()];
            CatalogItem::new(format!("Product {}", i), main, sub1, sub2, 10.0 * i as f64, "nos")
        })
        .collect()
}

#[test]
fn test_browse_large_catalog_first_and_last_page() {
    let catalog = generated_catalog(5000);
    let settings = BrowserSettings::default();

    let browser = CatalogBrowser::new();
    let view = browser.view(&catalog, &settings);
    assert_eq!(view.page.total_pages, 100);
    assert_eq!(view.page.range(), 0..50);
    assert_eq!(view.items.len(), 50);
    assert_eq!(view.window, 1..6);

    let browser = browser.apply(BrowserAction::Page(PageAction::Last), &catalog, &settings);
    let view = browser.view(&catalog, &settings);
    assert_eq!(view.page.current_page, 100);
    assert_eq!(view.page.range(), 4950..5000);
    assert_eq!(view.items.last().unwrap().name, "Product 5000");
    assert_eq!(view.window, 96..101);
}

#[test]
fn test_browse_narrowing_filters_then_search() {
    let catalog = generated_catalog(5000);
    let settings = BrowserSettings::default();

    let browser = CatalogBrowser::new()
        .apply(
            BrowserAction::Page(PageAction::Goto(7)),
            &catalog,
            &settings,
        )
        .apply(
            BrowserAction::Toggle(CategoryLevel::Main, "Electronics".into()),
            &catalog,
            &settings,
        );
    assert_eq!(browser.page.current, 1);

    let view = browser.view(&catalog, &settings);
    assert_eq!(view.total_matches(), 2500);
    assert_eq!(view.sub1_options, vec!["Laptops", "Phones"]);

    let browser = browser
        .apply(
            BrowserAction::Toggle(CategoryLevel::Sub1, "Phones".into()),
            &catalog,
            &settings,
        )
        .apply(BrowserAction::Search("Product 12".into()), &catalog, &settings);
    let view = browser.view(&catalog, &settings);

    assert!(view.total_matches() > 0);
    for item in &view.items {
        assert!(item.name.contains("Product 12"));
        assert_eq!(item.main_category, "Electronics");
        assert_eq!(item.sub_category_1, "Phones");
    }
    assert_eq!(view.sub2_options, vec!["Android"]);
}

#[test]
fn test_browse_everything_filtered_out() {
    let catalog = generated_catalog(120);
    let settings = BrowserSettings::default();

    let browser = CatalogBrowser::new().apply(
        BrowserAction::Search("no such product".into()),
        &catalog,
        &settings,
    );
    let view = browser.view(&catalog, &settings);

    assert_eq!(view.total_matches(), 0);
    assert_eq!(view.page.total_pages, 1);
    assert_eq!(view.page.range(), 0..0);
    assert!(view.items.is_empty());
    assert_eq!(view.window, 1..2);
}

#[test]
fn test_browse_clamps_requested_page() {
    let catalog = generated_catalog(130);
    let settings = BrowserSettings::default();

    let far = CatalogBrowser::new()
        .apply(
            BrowserAction::Page(PageAction::Goto(9999)),
            &catalog,
            &settings,
        )
        .view(&catalog, &settings);
    let last = CatalogBrowser::new()
        .apply(BrowserAction::Page(PageAction::Goto(3)), &catalog, &settings)
        .view(&catalog, &settings);

    assert_eq!(far.page, last.page);
    assert_eq!(far.items, last.items);
}

#[test]
fn test_browse_all_fields_search_from_csv() {
    let csv = "\
Item Name,Main Category,Sub Category 1,Sub Category 2,Unit Price,Unit
Portland Cement,Civil,Binders,OPC 53,420,bag
White Cement,Civil,Binders,White,780,bag
Copper Wire,Electrical,Wiring,Copper,2150,coil
";
    let catalog = parse_catalog_csv(csv.as_bytes()).unwrap();

    let by_name = BrowserSettings::default();
    let all_fields = BrowserSettings {
        search_mode: SearchMode::AllFields,
        ..BrowserSettings::default()
    };

    let browser = CatalogBrowser::new().apply(
        BrowserAction::Search("binders cement".into()),
        &catalog,
        &all_fields,
    );
    assert_eq!(browser.view(&catalog, &all_fields).total_matches(), 2);
    assert_eq!(browser.view(&catalog, &by_name).total_matches(), 0);

    let reset = browser.apply(BrowserAction::ResetFilters, &catalog, &all_fields);
    assert!(reset.filter.is_empty());
    assert_eq!(reset.view(&catalog, &all_fields).total_matches(), 3);
}
