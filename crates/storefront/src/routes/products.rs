//! Product route handlers.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use cellar_door_core::ProductCategory;
use serde::Deserialize;
use tracing::instrument;

use crate::catalog::Product;
use crate::filters;
use crate::state::AppState;

/// Product display data for templates.
#[derive(Clone)]
pub struct ProductView {
    pub handle: String,
    pub title: String,
    pub category: String,
    pub price: String,
    pub summary: Option<String>,
    pub vintage: Option<u16>,
    pub region: Option<String>,
    pub abv: Option<f32>,
    pub volume_ml: u32,
    pub image: Option<String>,
    pub description_html: String,
}

impl From<&Product> for ProductView {
    fn from(product: &Product) -> Self {
        Self {
            handle: product.handle.clone(),
            title: product.title.clone(),
            category: product.category.label().to_string(),
            price: product.price.to_string(),
            summary: product.summary.clone(),
            vintage: product.vintage,
            region: product.region.clone(),
            abv: product.abv,
            volume_ml: product.volume_ml,
            image: product.image.clone(),
            description_html: product.description_html.clone(),
        }
    }
}

/// Category tab for the listing page.
#[derive(Clone)]
pub struct CategoryTab {
    pub slug: &'static str,
    pub label: &'static str,
    pub active: bool,
}

/// Listing filter query.
#[derive(Debug, Deserialize)]
pub struct ListingQuery {
    pub category: Option<String>,
}

/// Product listing page template.
#[derive(Template, WebTemplate)]
#[template(path = "products/index.html")]
pub struct ProductsIndexTemplate {
    pub products: Vec<ProductView>,
    pub tabs: Vec<CategoryTab>,
    pub showing_all: bool,
}

/// Product detail page template.
#[derive(Template, WebTemplate)]
#[template(path = "products/show.html")]
pub struct ProductShowTemplate {
    pub product: ProductView,
}

/// Unknown product page template.
#[derive(Template, WebTemplate)]
#[template(path = "products/not_found.html")]
pub struct ProductNotFoundTemplate {
    pub handle: String,
}

/// Display the product listing, optionally filtered by `?category=`.
///
/// An unknown category shows everything rather than an empty page.
#[instrument(skip(state))]
pub async fn index(
    State(state): State<AppState>,
    Query(query): Query<ListingQuery>,
) -> impl IntoResponse {
    let selected = query
        .category
        .as_deref()
        .and_then(|slug| slug.parse::<ProductCategory>().ok());

    let products: Vec<ProductView> = match selected {
        Some(category) => state
            .catalog()
            .in_category(category)
            .map(ProductView::from)
            .collect(),
        None => state.catalog().all().iter().map(ProductView::from).collect(),
    };

    let tabs = ProductCategory::ALL
        .iter()
        .map(|category| CategoryTab {
            slug: category.slug(),
            label: category.label(),
            active: selected == Some(*category),
        })
        .collect();

    ProductsIndexTemplate {
        products,
        tabs,
        showing_all: selected.is_none(),
    }
}

/// Display a single product.
#[instrument(skip(state))]
pub async fn show(State(state): State<AppState>, Path(handle): Path<String>) -> Response {
    match state.catalog().get(&handle) {
        Some(product) => ProductShowTemplate {
            product: ProductView::from(product),
        }
        .into_response(),
        None => {
            tracing::debug!(%handle, "Unknown product requested");
            (StatusCode::NOT_FOUND, ProductNotFoundTemplate { handle }).into_response()
        }
    }
}
