use axum::{
    body::{Body, to_bytes},
    http::{Request, header},
    middleware::Next,
    response::Response,
};
use tracing::error;

/// At most this much of a failed response body makes it into the log line.
const BODY_LOG_LIMIT: usize = 1024;

pub async fn log_errors(req: Request<Body>, next: Next) -> Response {
    let method = req.method().clone();
    let path = req.uri().path().to_string();

    let response = next.run(req).await;

    if response.status().is_server_error() {
        let (mut parts, body) = response.into_parts();
        let bytes = match to_bytes(body, BODY_LOG_LIMIT).await {
            Ok(b) => b,
            Err(e) => {
                error!(%method, path, "Failed to read error response body: {}", e);
                return Response::from_parts(parts, Body::empty());
            }
        };

        error!(
            status = %parts.status,
            %method,
            path,
            body = %String::from_utf8_lossy(&bytes),
            "Request failed with a server error"
        );

        // Rebuild the body after reading it for the log line.
        parts.headers.remove(header::CONTENT_LENGTH);
        Response::from_parts(parts, Body::from(bytes))
    } else {
        response
    }
}
