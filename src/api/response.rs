use axum::Json;
use serde::Serialize;

/// `{"status":"success","data":...}`
#[derive(Serialize, Debug)]
pub struct Success<T> {
    pub status: &'static str,
    pub data: T,
}

pub fn success<T: Serialize>(data: T) -> Json<Success<T>> {
    Json(Success {
        status: "success",
        data,
    })
}
