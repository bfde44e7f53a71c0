//! Home page route handler.

use askama::Template;
use askama_web::WebTemplate;
use axum::{extract::State, response::IntoResponse};
use cellar_door_core::ProductCategory;
use tracing::instrument;

use crate::filters;
use crate::routes::products::ProductView;
use crate::state::AppState;

/// Number of featured bottles shown on the home page.
const FEATURED_LIMIT: usize = 4;

/// Category link shown under the hero.
#[derive(Clone)]
pub struct CategoryLink {
    pub slug: &'static str,
    pub label: &'static str,
    pub count: usize,
}

/// Home page template.
#[derive(Template, WebTemplate)]
#[template(path = "home.html")]
pub struct HomeTemplate {
    pub featured: Vec<ProductView>,
    pub categories: Vec<CategoryLink>,
}

/// Display the home page.
#[instrument(skip(state))]
pub async fn home(State(state): State<AppState>) -> impl IntoResponse {
    let catalog = state.catalog();

    let featured = catalog
        .featured(FEATURED_LIMIT)
        .into_iter()
        .map(ProductView::from)
        .collect();

    // Only link categories that have stock
    let categories = ProductCategory::ALL
        .iter()
        .map(|category| CategoryLink {
            slug: category.slug(),
            label: category.label(),
            count: catalog.in_category(*category).count(),
        })
        .filter(|link| link.count > 0)
        .collect();

    HomeTemplate {
        featured,
        categories,
    }
}
