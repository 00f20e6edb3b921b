//! Service status endpoint.

use serde::Serialize;

use crate::http::{Reply, Request};
use crate::routing::{Controller, DeclareError, HandlerError, RouteBinding};

#[derive(Debug, Serialize)]
pub struct ServiceStatus {
    pub name: &'static str,
    pub version: &'static str,
}

/// `GET /api/v1/status`
pub struct StatusController;

impl Controller for StatusController {
    fn name(&self) -> &str {
        "status"
    }

    fn routes(&self) -> Result<Vec<RouteBinding>, DeclareError> {
        Ok(vec![RouteBinding::get("/api/v1/status", get_status)])
    }
}

pub async fn get_status(_request: Request, _wildcards: Vec<String>) -> Result<Reply, HandlerError> {
    let status = ServiceStatus {
        name: env!("CARGO_PKG_NAME"),
        version: env!("CARGO_PKG_VERSION"),
    };
    Ok(Reply::envelope("ok", Some(status))?)
}
