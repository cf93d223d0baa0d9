use axum::http::StatusCode;

pub async fn greeting() -> &'static str {
    "Hello World!"
}

pub async fn health() -> StatusCode {
    StatusCode::OK
}
