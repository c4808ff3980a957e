use crate::handlers::error::PageError;
use crate::handlers::{notice_text, validation_message};
use crate::models::{BuyerForm, SearchQuery};
use crate::AppState;
use askama::Template;
use axum::{
    extract::{Path, Query, State},
    response::{IntoResponse, Redirect, Response},
    Form,
};
use billing_core::search::filter_by_name;
use billing_core::Buyer;
use validator::Validate;

#[derive(Template)]
#[template(path = "pages/buyers.html")]
pub struct BuyersTemplate {
    pub current_page: &'static str,
    pub buyers: Vec<Buyer>,
    pub total: usize,
    pub q: String,
    pub notice: Option<&'static str>,
    pub error: Option<String>,
    pub form: BuyerForm,
}

#[derive(Template)]
#[template(path = "pages/buyer_edit.html")]
pub struct BuyerEditTemplate {
    pub current_page: &'static str,
    pub id: String,
    pub form: BuyerForm,
    pub error: Option<String>,
}

async fn render_list(
    state: &AppState,
    q: &str,
    notice: Option<&'static str>,
    error: Option<String>,
    form: BuyerForm,
) -> BuyersTemplate {
    let (all, error) = match state.api.list_buyers().await {
        Ok(buyers) => (buyers, error),
        Err(e) => {
            tracing::error!(error = %e, "failed to load buyers");
            (Vec::new(), error.or_else(|| Some(e.user_message())))
        }
    };

    BuyersTemplate {
        current_page: "buyers",
        total: all.len(),
        buyers: filter_by_name(&all, q).into_iter().cloned().collect(),
        q: q.trim().to_string(),
        notice,
        error,
        form,
    }
}

pub async fn list_buyers_page(
    State(state): State<AppState>,
    Query(query): Query<SearchQuery>,
) -> impl IntoResponse {
    render_list(
        &state,
        &query.q,
        notice_text(&query.notice),
        None,
        BuyerForm::default(),
    )
    .await
}

pub async fn create_buyer(State(state): State<AppState>, Form(form): Form<BuyerForm>) -> Response {
    if let Err(errors) = form.validate() {
        let message = validation_message(&errors);
        return render_list(&state, "", None, Some(message), form)
            .await
            .into_response();
    }

    match state.api.create_buyer(&form.clone().into_new_buyer()).await {
        Ok(created) => {
            tracing::info!(buyer_id = %created.id, "buyer created");
            Redirect::to("/buyers?notice=buyer_created").into_response()
        }
        Err(e) => {
            tracing::error!(error = %e, "failed to create buyer");
            render_list(&state, "", None, Some(e.user_message()), form)
                .await
                .into_response()
        }
    }
}

pub async fn edit_buyer_page(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<BuyerEditTemplate, PageError> {
    let buyer = state.api.get_buyer(&id).await?;
    Ok(BuyerEditTemplate {
        current_page: "buyers",
        id,
        form: BuyerForm {
            name: buyer.name,
            address: buyer.address,
            gstin: buyer.gstin,
        },
        error: None,
    })
}

pub async fn update_buyer(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Form(form): Form<BuyerForm>,
) -> Response {
    let error = match form.validate() {
        Err(errors) => validation_message(&errors),
        Ok(()) => match state.api.update_buyer(&id, &form.clone().into_new_buyer()).await {
            Ok(_) => {
                tracing::info!(buyer_id = %id, "buyer updated");
                return Redirect::to("/buyers?notice=buyer_updated").into_response();
            }
            Err(e) => {
                tracing::error!(buyer_id = %id, error = %e, "failed to update buyer");
                e.user_message()
            }
        },
    };

    BuyerEditTemplate {
        current_page: "buyers",
        id,
        form,
        error: Some(error),
    }
    .into_response()
}

pub async fn delete_buyer(State(state): State<AppState>, Path(id): Path<String>) -> Response {
    match state.api.delete_buyer(&id).await {
        Ok(_) => {
            tracing::info!(buyer_id = %id, "buyer deleted");
            Redirect::to("/buyers?notice=buyer_deleted").into_response()
        }
        Err(e) => {
            tracing::error!(buyer_id = %id, error = %e, "failed to delete buyer");
            render_list(&state, "", None, Some(e.user_message()), BuyerForm::default())
                .await
                .into_response()
        }
    }
}
