use crate::handlers::error::PageError;
use crate::handlers::{notice_text, validation_message};
use crate::models::{ProductEditForm, ProductForm, SearchQuery, StockAdjustForm};
use crate::AppState;
use askama::Template;
use axum::{
    extract::{Path, Query, State},
    response::{IntoResponse, Redirect, Response},
    Form,
};
use billing_core::format::{fixed2, quantity};
use billing_core::search::filter_by_name;
use billing_core::Product;
use validator::Validate;

/// Product as listed on the stock page.
pub struct ProductRow {
    pub id: String,
    pub name: String,
    pub hsn_code: String,
    pub stock: String,
    pub rate: String,
}

impl From<&Product> for ProductRow {
    fn from(p: &Product) -> Self {
        Self {
            id: p.id.clone(),
            name: p.name.clone(),
            hsn_code: p.hsn_code.clone(),
            stock: quantity(p.stock_quantity),
            rate: fixed2(p.default_rate_per_kg),
        }
    }
}

#[derive(Template)]
#[template(path = "pages/stock.html")]
pub struct StockTemplate {
    pub current_page: &'static str,
    pub products: Vec<ProductRow>,
    pub total: usize,
    pub q: String,
    pub notice: Option<&'static str>,
    pub error: Option<String>,
    pub form: ProductForm,
}

#[derive(Template)]
#[template(path = "pages/product_edit.html")]
pub struct ProductEditTemplate {
    pub current_page: &'static str,
    pub id: String,
    pub stock: String,
    pub form: ProductEditForm,
    pub error: Option<String>,
}

async fn render_list(
    state: &AppState,
    q: &str,
    notice: Option<&'static str>,
    error: Option<String>,
    form: ProductForm,
) -> StockTemplate {
    let (all, error) = match state.api.list_products().await {
        Ok(products) => (products, error),
        Err(e) => {
            tracing::error!(error = %e, "failed to load products");
            (Vec::new(), error.or_else(|| Some(e.user_message())))
        }
    };

    StockTemplate {
        current_page: "stock",
        total: all.len(),
        products: filter_by_name(&all, q)
            .into_iter()
            .map(ProductRow::from)
            .collect(),
        q: q.trim().to_string(),
        notice,
        error,
        form,
    }
}

pub async fn list_products_page(
    State(state): State<AppState>,
    Query(query): Query<SearchQuery>,
) -> impl IntoResponse {
    render_list(
        &state,
        &query.q,
        notice_text(&query.notice),
        None,
        ProductForm::default(),
    )
    .await
}

pub async fn create_product(
    State(state): State<AppState>,
    Form(form): Form<ProductForm>,
) -> Response {
    if let Err(errors) = form.validate() {
        let message = validation_message(&errors);
        return render_list(&state, "", None, Some(message), form)
            .await
            .into_response();
    }

    match state.api.create_product(&form.clone().into_new_product()).await {
        Ok(created) => {
            tracing::info!(product_id = %created.id, "product created");
            Redirect::to("/stock?notice=product_created").into_response()
        }
        Err(e) => {
            tracing::error!(error = %e, "failed to create product");
            render_list(&state, "", None, Some(e.user_message()), form)
                .await
                .into_response()
        }
    }
}

pub async fn edit_product_page(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<ProductEditTemplate, PageError> {
    let product = state.api.get_product(&id).await?;
    Ok(ProductEditTemplate {
        current_page: "stock",
        id,
        stock: quantity(product.stock_quantity),
        form: ProductEditForm {
            name: product.name,
            hsn_code: product.hsn_code,
            default_rate_per_kg: fixed2(product.default_rate_per_kg),
        },
        error: None,
    })
}

pub async fn update_product(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Form(form): Form<ProductEditForm>,
) -> Response {
    let error = match form.validate() {
        Err(errors) => validation_message(&errors),
        Ok(()) => {
            let update = form.clone().into_update();
            if update.is_empty() {
                "No changes to save".to_string()
            } else {
                match state.api.update_product(&id, &update).await {
                    Ok(_) => {
                        tracing::info!(product_id = %id, "product updated");
                        return Redirect::to("/stock?notice=product_updated").into_response();
                    }
                    Err(e) => {
                        tracing::error!(product_id = %id, error = %e, "failed to update product");
                        e.user_message()
                    }
                }
            }
        }
    };

    let stock = match state.api.get_product(&id).await {
        Ok(p) => quantity(p.stock_quantity),
        Err(_) => "-".to_string(),
    };
    ProductEditTemplate {
        current_page: "stock",
        id,
        stock,
        form,
        error: Some(error),
    }
    .into_response()
}

/// Add to or remove from a product's stock. Negative quantities are removals.
pub async fn adjust_stock(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Form(form): Form<StockAdjustForm>,
) -> Response {
    let error = match form.validate() {
        Err(errors) => validation_message(&errors),
        Ok(()) => match state.api.adjust_stock(&id, form.delta()).await {
            Ok(adjusted) => {
                tracing::info!(
                    product_id = %id,
                    delta = %form.delta(),
                    stock = %adjusted.stock_quantity,
                    "stock adjusted"
                );
                return Redirect::to("/stock?notice=stock_updated").into_response();
            }
            Err(e) => {
                tracing::error!(product_id = %id, error = %e, "failed to adjust stock");
                e.user_message()
            }
        },
    };

    render_list(&state, "", None, Some(error), ProductForm::default())
        .await
        .into_response()
}

pub async fn delete_product(State(state): State<AppState>, Path(id): Path<String>) -> Response {
    match state.api.delete_product(&id).await {
        Ok(_) => {
            tracing::info!(product_id = %id, "product deleted");
            Redirect::to("/stock?notice=product_deleted").into_response()
        }
        Err(e) => {
            tracing::error!(product_id = %id, error = %e, "failed to delete product");
            render_list(&state, "", None, Some(e.user_message()), ProductForm::default())
                .await
                .into_response()
        }
    }
}
