use crate::models::{StatementDocument, StatementQuery};
use crate::AppState;
use askama::Template;
use axum::{
    extract::{Query, State},
    response::IntoResponse,
};
use billing_core::statement::parse_filter;
use billing_core::{Buyer, StatementFilter};

#[derive(Template)]
#[template(path = "pages/statement.html")]
pub struct StatementTemplate {
    pub current_page: &'static str,
    pub buyers: Vec<Buyer>,
    pub buyer_id: String,
    pub start_date: String,
    pub end_date: String,
    pub preview: Option<StatementDocument>,
    /// Query string carried over to the print and PDF links.
    pub filter_query: String,
    pub error: Option<String>,
}

/// `?start_date=..&end_date=..` for the bounds that are set, or "".
pub fn filter_query(filter: &StatementFilter) -> String {
    let pairs: Vec<String> = filter
        .query_pairs()
        .into_iter()
        .map(|(key, value)| format!("{key}={value}"))
        .collect();
    if pairs.is_empty() {
        String::new()
    } else {
        format!("?{}", pairs.join("&"))
    }
}

pub async fn statement_page(
    State(state): State<AppState>,
    Query(query): Query<StatementQuery>,
) -> impl IntoResponse {
    let mut errors = Vec::new();

    let buyers = match state.api.list_buyers().await {
        Ok(buyers) => buyers,
        Err(e) => {
            tracing::error!(error = %e, "failed to load buyers for statements");
            errors.push(e.user_message());
            Vec::new()
        }
    };

    let buyer_id = query.buyer_id.trim().to_string();
    let mut preview = None;
    let mut query_string = String::new();

    if !buyer_id.is_empty() {
        match parse_filter(Some(&query.start_date), Some(&query.end_date)) {
            Err(e) => errors.push(e.to_string()),
            Ok(filter) => {
                query_string = filter_query(&filter);
                match state.api.get_statement(&buyer_id, &filter).await {
                    Ok(mut statement) => {
                        statement.filter = filter;
                        preview = Some(StatementDocument::new(
                            &statement,
                            &state.seller,
                            state.today(),
                        ));
                    }
                    Err(e) => {
                        tracing::error!(buyer_id = %buyer_id, error = %e, "failed to load statement");
                        errors.push(e.user_message());
                    }
                }
            }
        }
    }

    StatementTemplate {
        current_page: "statement",
        buyers,
        buyer_id,
        start_date: query.start_date.trim().to_string(),
        end_date: query.end_date.trim().to_string(),
        preview,
        filter_query: query_string,
        error: (!errors.is_empty()).then(|| errors.join("; ")),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    #[test]
    fn filter_query_only_includes_set_bounds() {
        assert_eq!(filter_query(&StatementFilter::default()), "");
        let filter = StatementFilter {
            start_date: NaiveDate::from_ymd_opt(2025, 4, 1),
            end_date: None,
        };
        assert_eq!(filter_query(&filter), "?start_date=2025-04-01");
    }
}
