//! Relational read model over the document-shaped store.
//!
//! Derived views (subscriber counts, watch history) are computed at query
//! time by explicit stage lists instead of denormalized counters.

use async_trait::async_trait;
use serde::Serialize;

use crate::error::AppError;

#[cfg(test)]
pub(crate) mod memory;
pub mod pipeline;
pub mod plans;
mod source;

pub use pipeline::{Expr, Filter, Pipeline, Stage};

/// A camelCase JSON object as produced by the public record types.
pub type Document = serde_json::Map<String, serde_json::Value>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Collection {
    Users,
    Subscriptions,
    Videos,
}

impl Collection {
    pub fn as_str(self) -> &'static str {
        match self {
            Collection::Users => "users",
            Collection::Subscriptions => "subscriptions",
            Collection::Videos => "videos",
        }
    }
}

#[async_trait]
pub trait CollectionSource: Send + Sync {
    async fn fetch(&self, collection: Collection, filter: &Filter)
    -> Result<Vec<Document>, AppError>;
}

pub fn to_document<T: Serialize>(record: &T) -> Result<Document, AppError> {
    match serde_json::to_value(record) {
        Ok(serde_json::Value::Object(map)) => Ok(map),
        Ok(_) => Err(AppError::internal("record did not serialize to an object")),
        Err(err) => {
            tracing::error!(error = %err, "record serialization failed");
            Err(AppError::internal("record serialization failed"))
        }
    }
}
