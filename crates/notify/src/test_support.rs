//! Local HTTP stubs for provider tests.

use std::sync::{Arc, Mutex};

use axum::http::StatusCode;
use axum::Router;

/// Serve `router` on an ephemeral localhost port and return its base URL.
pub(crate) async fn serve(router: Router) -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, router).await.unwrap();
    });
    format!("http://{addr}")
}

/// Answer every request with `status` and `body`, recording request bodies.
pub(crate) async fn fixed(
    status: StatusCode,
    body: &'static str,
) -> (String, Arc<Mutex<Vec<String>>>) {
    let seen = Arc::new(Mutex::new(Vec::new()));
    let recorded = seen.clone();
    let router = Router::new().fallback(move |request_body: String| {
        let recorded = recorded.clone();
        async move {
            recorded.lock().unwrap().push(request_body);
            (status, body)
        }
    });
    (serve(router).await, seen)
}
