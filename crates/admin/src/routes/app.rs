//! Embedded app page served for every other path.

use askama::Template;
use axum::{
    extract::{Query, State},
    http::{Method, Uri},
    response::{IntoResponse, Redirect, Response},
};
use serde::Deserialize;
use tracing::instrument;

use thanks_core::ShopDomain;

use super::render;
use crate::error::AppError;
use crate::middleware::reauth_path;
use crate::state::AppState;

/// The embedded settings page.
#[derive(Template)]
#[template(path = "index.html")]
pub struct IndexTemplate {
    pub api_key: String,
    pub shop: String,
    pub host: String,
}

#[derive(Debug, Deserialize)]
pub struct PageParams {
    pub shop: Option<String>,
    pub host: Option<String>,
}

/// GET * - Render the app page for an installed shop.
///
/// Shops that have not completed OAuth are sent to `/auth`.
#[instrument(skip(state))]
pub async fn page(
    State(state): State<AppState>,
    method: Method,
    uri: Uri,
    Query(params): Query<PageParams>,
) -> Result<Response, AppError> {
    if method != Method::GET && method != Method::HEAD {
        return Err(AppError::NotFound(uri.path().to_string()));
    }

    let shop = params.shop.unwrap_or_default();
    let installed = match ShopDomain::parse(&shop) {
        Ok(domain) => state.shops().get_shop(&domain).await?.is_some(),
        Err(_) => false,
    };
    if !installed {
        return Ok(Redirect::to(&reauth_path(&shop)).into_response());
    }

    let template = IndexTemplate {
        api_key: state.config().shopify.api_key.clone(),
        shop,
        host: params.host.unwrap_or_default(),
    };
    Ok(render(&template)?.into_response())
}
