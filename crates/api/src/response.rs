//! Shared response envelope for resource endpoints.
//!
//! Resource reads and writes answer `{ "data": ... }`. The delivery endpoints
//! answer their report object directly.

use serde::Serialize;

/// Standard `{ "data": T }` response envelope.
#[derive(Debug, Serialize)]
pub struct DataResponse<T: Serialize> {
    pub data: T,
}
