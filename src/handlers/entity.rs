//! Resource CRUD handlers: thin axum adapters over the synthesized handler.

use crate::error::ApiError;
use crate::response;
use crate::synth::ResourceHandler;
use axum::{
    extract::{Path, Query, State},
    http::HeaderMap,
    Json,
};
use serde_json::Value;
use std::collections::HashMap;
use std::sync::Arc;

pub async fn list(
    State(handler): State<Arc<ResourceHandler>>,
    headers: HeaderMap,
    Query(params): Query<HashMap<String, String>>,
) -> Result<impl axum::response::IntoResponse, ApiError> {
    let rows = handler.list(&headers, &params).await?;
    Ok(response::success_many(rows))
}

pub async fn create(
    State(handler): State<Arc<ResourceHandler>>,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> Result<impl axum::response::IntoResponse, ApiError> {
    let row = handler.create(&headers, body).await?;
    Ok(response::success_created(row))
}

pub async fn retrieve(
    State(handler): State<Arc<ResourceHandler>>,
    headers: HeaderMap,
    Path(id): Path<String>,
) -> Result<impl axum::response::IntoResponse, ApiError> {
    let row = handler.retrieve(&headers, &id).await?;
    Ok(response::success_one(row))
}

pub async fn update(
    State(handler): State<Arc<ResourceHandler>>,
    headers: HeaderMap,
    Path(id): Path<String>,
    Json(body): Json<Value>,
) -> Result<impl axum::response::IntoResponse, ApiError> {
    let row = handler.update(&headers, &id, body).await?;
    Ok(response::success_one(row))
}

pub async fn delete(
    State(handler): State<Arc<ResourceHandler>>,
    headers: HeaderMap,
    Path(id): Path<String>,
) -> Result<impl axum::response::IntoResponse, ApiError> {
    handler.delete(&headers, &id).await?;
    Ok(axum::http::StatusCode::NO_CONTENT)
}
