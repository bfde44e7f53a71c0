//! Product catalog loaded from markdown files.
//!
//! Each product lives in `{content_dir}/products/{handle}.md`: YAML
//! frontmatter carries the structured fields, the markdown body is the
//! tasting note rendered on the product page.
//!
//! ```markdown
//! ---
//! title: Barolo DOCG
//! category: red-wine
//! price: "54.00"
//! vintage: 2019
//! region: Piedmont, Italy
//! abv: 14.0
//! featured: true
//! ---
//! Tar and roses, firm tannins...
//! ```

use std::path::Path;
use std::str::FromStr;
use std::sync::Arc;

use cellar_door_core::{CurrencyCode, Price, ProductCategory};
use comrak::{Options, markdown_to_html};
use gray_matter::{Matter, ParsedEntity, engine::YAML};
use rust_decimal::Decimal;
use serde::Deserialize;

/// Default bottle size when frontmatter omits `volume_ml`.
const DEFAULT_VOLUME_ML: u32 = 750;

/// Frontmatter metadata for a product file.
#[derive(Debug, Clone, Deserialize)]
struct ProductMeta {
    title: String,
    category: String,
    price: String,
    #[serde(default)]
    summary: Option<String>,
    #[serde(default)]
    vintage: Option<u16>,
    #[serde(default)]
    region: Option<String>,
    #[serde(default)]
    abv: Option<f32>,
    #[serde(default)]
    volume_ml: Option<u32>,
    #[serde(default)]
    featured: bool,
    #[serde(default)]
    image: Option<String>,
}

/// A product ready for display.
#[derive(Debug, Clone)]
pub struct Product {
    pub handle: String,
    pub title: String,
    pub category: ProductCategory,
    pub price: Price,
    pub summary: Option<String>,
    pub vintage: Option<u16>,
    pub region: Option<String>,
    pub abv: Option<f32>,
    pub volume_ml: u32,
    pub featured: bool,
    pub image: Option<String>,
    pub description_html: String,
}

/// In-memory product catalog, cheap to clone.
#[derive(Debug, Clone, Default)]
pub struct Catalog {
    products: Arc<Vec<Product>>,
}

impl Catalog {
    /// Load all products from `{content_dir}/products`.
    ///
    /// Files that fail to parse are logged and skipped so one bad listing
    /// cannot take the shop down.
    ///
    /// # Errors
    ///
    /// Returns an error if the products directory exists but cannot be read.
    pub fn load(content_dir: &Path) -> Result<Self, CatalogError> {
        let dir = content_dir.join("products");
        let mut products = Vec::new();

        if !dir.exists() {
            tracing::warn!("Products directory does not exist: {:?}", dir);
            return Ok(Self::default());
        }

        let entries = std::fs::read_dir(&dir).map_err(|e| CatalogError::Io(e.to_string()))?;

        for entry in entries.flatten() {
            let path = entry.path();
            if path.extension().is_some_and(|ext| ext == "md") {
                match load_product(&path) {
                    Ok(product) => {
                        tracing::debug!("Loaded product: {}", product.handle);
                        products.push(product);
                    }
                    Err(e) => {
                        tracing::error!("Failed to load product {:?}: {}", path, e);
                    }
                }
            }
        }

        tracing::info!(count = products.len(), "Product catalog loaded");
        Ok(Self::from_products(products))
    }

    /// Build a catalog from already-constructed products.
    #[must_use]
    pub fn from_products(mut products: Vec<Product>) -> Self {
        products.sort_by(|a, b| {
            a.category
                .cmp(&b.category)
                .then_with(|| a.title.cmp(&b.title))
        });
        Self {
            products: Arc::new(products),
        }
    }

    /// Look up a product by handle.
    #[must_use]
    pub fn get(&self, handle: &str) -> Option<&Product> {
        self.products.iter().find(|p| p.handle == handle)
    }

    /// All products, ordered by category then title.
    #[must_use]
    pub fn all(&self) -> &[Product] {
        &self.products
    }

    /// Products in one category.
    pub fn in_category(&self, category: ProductCategory) -> impl Iterator<Item = &Product> {
        self.products.iter().filter(move |p| p.category == category)
    }

    /// Featured products for the home page.
    #[must_use]
    pub fn featured(&self, limit: usize) -> Vec<&Product> {
        self.products.iter().filter(|p| p.featured).take(limit).collect()
    }

    /// Number of products loaded.
    #[must_use]
    pub fn len(&self) -> usize {
        self.products.len()
    }

    /// Whether the catalog is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.products.is_empty()
    }
}

/// Whether a string is usable as a product handle (`[a-z0-9-]+`).
///
/// Handles appear in URLs and in the cart cookie, so the alphabet is narrow.
#[must_use]
pub fn is_valid_handle(handle: &str) -> bool {
    !handle.is_empty()
        && handle.len() <= 64
        && handle
            .bytes()
            .all(|b| b.is_ascii_lowercase() || b.is_ascii_digit() || b == b'-')
}

/// Parse a product from markdown source.
///
/// # Errors
///
/// Returns an error if the handle is invalid, the frontmatter is missing or
/// malformed, or the price is not a positive decimal.
pub fn parse_product(handle: &str, source: &str) -> Result<Product, CatalogError> {
    if !is_valid_handle(handle) {
        return Err(CatalogError::Parse(format!("invalid handle '{handle}'")));
    }

    let matter = Matter::<YAML>::new();
    let parsed: ParsedEntity<ProductMeta> = matter
        .parse(source)
        .map_err(|e| CatalogError::Parse(format!("Failed to parse frontmatter: {e}")))?;
    let meta = parsed
        .data
        .ok_or_else(|| CatalogError::Parse("Missing frontmatter".to_string()))?;

    let category = ProductCategory::from_str(meta.category.trim())
        .map_err(|e| CatalogError::Parse(e.to_string()))?;

    let amount = Decimal::from_str(meta.price.trim())
        .map_err(|e| CatalogError::Parse(format!("invalid price '{}': {e}", meta.price)))?;
    if amount <= Decimal::ZERO {
        return Err(CatalogError::Parse(format!(
            "price must be positive (got {amount})"
        )));
    }

    Ok(Product {
        handle: handle.to_string(),
        title: meta.title,
        category,
        price: Price::new(amount, CurrencyCode::USD),
        summary: meta.summary,
        vintage: meta.vintage,
        region: meta.region,
        abv: meta.abv,
        volume_ml: meta.volume_ml.unwrap_or(DEFAULT_VOLUME_ML),
        featured: meta.featured,
        image: meta.image,
        description_html: render_markdown(&parsed.content),
    })
}

/// Load a single product from a markdown file.
fn load_product(path: &Path) -> Result<Product, CatalogError> {
    let source = std::fs::read_to_string(path).map_err(|e| CatalogError::Io(e.to_string()))?;

    let handle = path
        .file_stem()
        .and_then(|s| s.to_str())
        .ok_or_else(|| CatalogError::Parse("Invalid filename".to_string()))?;

    parse_product(handle, &source)
}

/// Render markdown to HTML with GitHub Flavored Markdown support.
///
/// Raw HTML in product copy is dropped by comrak.
fn render_markdown(content: &str) -> String {
    let mut options = Options::default();
    options.extension.strikethrough = true;
    options.extension.table = true;
    options.extension.autolink = true;
    options.extension.superscript = true;

    markdown_to_html(content, &options)
}

/// Catalog loading errors
#[derive(Debug, thiserror::Error)]
pub enum CatalogError {
    #[error("IO error: {0}")]
    Io(String),
    #[error("Parse error: {0}")]
    Parse(String),
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    const BAROLO: &str = "---\n\
title: Barolo DOCG\n\
category: red-wine\n\
price: \"54.00\"\n\
vintage: 2019\n\
region: Piedmont, Italy\n\
featured: true\n\
---\n\
Tar and *roses*.\n";

    #[test]
    fn test_parse_product() {
        let product = parse_product("barolo-2019", BAROLO).unwrap();
        assert_eq!(product.title, "Barolo DOCG");
        assert_eq!(product.category, ProductCategory::RedWine);
        assert_eq!(product.price.to_string(), "$54.00");
        assert_eq!(product.vintage, Some(2019));
        assert_eq!(product.volume_ml, 750);
        assert!(product.featured);
        assert!(product.description_html.contains("<em>roses</em>"));
    }

    #[test]
    fn test_parse_product_rejects_bad_price() {
        let source = BAROLO.replace("\"54.00\"", "\"free\"");
        assert!(matches!(
            parse_product("barolo-2019", &source),
            Err(CatalogError::Parse(_))
        ));

        let source = BAROLO.replace("\"54.00\"", "\"0\"");
        assert!(parse_product("barolo-2019", &source).is_err());
    }

    #[test]
    fn test_parse_product_requires_frontmatter() {
        assert!(parse_product("plain", "Just some words.").is_err());
    }

    #[test]
    fn test_parse_product_rejects_bad_handle() {
        assert!(parse_product("Barolo 2019", BAROLO).is_err());
        assert!(parse_product("barolo|2019", BAROLO).is_err());
    }

    #[test]
    fn test_is_valid_handle() {
        assert!(is_valid_handle("islay-single-malt-12"));
        assert!(!is_valid_handle(""));
        assert!(!is_valid_handle("Caps"));
        assert!(!is_valid_handle("a:b"));
    }

    #[test]
    fn test_catalog_orders_and_filters() {
        let barolo = parse_product("barolo-2019", BAROLO).unwrap();
        let mut chablis = barolo.clone();
        chablis.handle = "chablis".to_string();
        chablis.title = "Chablis".to_string();
        chablis.category = ProductCategory::WhiteWine;
        chablis.featured = false;
        let mut amarone = barolo.clone();
        amarone.handle = "amarone".to_string();
        amarone.title = "Amarone".to_string();

        let catalog = Catalog::from_products(vec![chablis, barolo, amarone]);
        let handles: Vec<_> = catalog.all().iter().map(|p| p.handle.as_str()).collect();
        assert_eq!(handles, ["amarone", "barolo-2019", "chablis"]);
        assert_eq!(catalog.in_category(ProductCategory::WhiteWine).count(), 1);
        assert_eq!(catalog.featured(1).len(), 1);
        assert!(catalog.get("chablis").is_some());
        assert!(catalog.get("merlot").is_none());
    }

    #[test]
    fn test_load_missing_directory_is_empty() {
        let catalog = Catalog::load(Path::new("/nonexistent/cellar-door")).unwrap();
        assert!(catalog.is_empty());
    }

    #[test]
    fn test_load_bundled_content() {
        let dir = Path::new(env!("CARGO_MANIFEST_DIR")).join("content");
        let catalog = Catalog::load(&dir).unwrap();
        assert!(!catalog.is_empty());
        assert!(catalog.all().iter().all(|p| is_valid_handle(&p.handle)));
    }
}
