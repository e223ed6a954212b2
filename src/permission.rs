//! Permission policy slot, checked before every resource operation.

use crate::error::ApiError;
use axum::http::HeaderMap;

/// The five resource operations a handler exposes.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Operation {
    List,
    Retrieve,
    Create,
    Update,
    Delete,
}

impl Operation {
    pub fn is_write(self) -> bool {
        matches!(self, Operation::Create | Operation::Update | Operation::Delete)
    }
}

/// Pluggable permission check. All policies on a resource must pass.
pub trait Permission: Send + Sync {
    fn check(&self, op: Operation, headers: &HeaderMap) -> Result<(), ApiError>;
}

/// Default policy: everything allowed.
pub struct AllowAny;

impl Permission for AllowAny {
    fn check(&self, _op: Operation, _headers: &HeaderMap) -> Result<(), ApiError> {
        Ok(())
    }
}

/// Gate write operations behind a static header token. Reads stay open.
pub struct WriteRequiresToken {
    pub header: &'static str,
    pub token: String,
}

impl Permission for WriteRequiresToken {
    fn check(&self, op: Operation, headers: &HeaderMap) -> Result<(), ApiError> {
        if !op.is_write() {
            return Ok(());
        }
        let presented = headers.get(self.header).and_then(|v| v.to_str().ok());
        if presented == Some(self.token.as_str()) {
            Ok(())
        } else {
            Err(ApiError::Forbidden("write token missing or invalid".into()))
        }
    }
}
