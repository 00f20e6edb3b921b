//! Echo endpoints, handy for checking routing from the outside.

use serde_json::json;

use crate::http::{Reply, Request};
use crate::routing::{Controller, DeclareError, HandlerError, RouteBinding};

/// `GET /api/v1/echo/%` and `POST /api/v1/echo`
pub struct EchoController;

impl Controller for EchoController {
    fn name(&self) -> &str {
        "echo"
    }

    fn routes(&self) -> Result<Vec<RouteBinding>, DeclareError> {
        Ok(vec![
            RouteBinding::get("/api/v1/echo/%", echo_segment),
            RouteBinding::post("/api/v1/echo", echo_body),
        ])
    }
}

/// Reply with the captured segment.
pub async fn echo_segment(
    _request: Request,
    wildcards: Vec<String>,
) -> Result<Reply, HandlerError> {
    let segment = wildcards.into_iter().next();
    Ok(Reply::envelope("ok", segment)?)
}

/// Reply with the request body, which must be JSON.
pub async fn echo_body(request: Request, _wildcards: Vec<String>) -> Result<Reply, HandlerError> {
    let data: serde_json::Value = serde_json::from_slice(request.body())?;
    Ok(Reply::envelope(
        "ok",
        Some(json!({
            "remote": request.remote_addr().to_string(),
            "body": data,
        })),
    )?)
}
