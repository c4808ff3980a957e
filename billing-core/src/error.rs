use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum Error {
    #[error("Missing fields: {}", .0.join(", "))]
    MissingFields(Vec<&'static str>),

    #[error("Invalid {field} format. Use YYYY-MM-DD")]
    InvalidDate { field: &'static str },

    #[error("end_date must not be before start_date")]
    InvertedDateRange,
}
