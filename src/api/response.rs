use actix_web::HttpResponse;
use serde::Serialize;

/// Success body shared by every endpoint.
#[derive(Serialize)]
pub struct Envelope<'a, T> {
    pub message: &'a str,
    pub data: T,
}

pub fn ok<T: Serialize>(message: &str, data: T) -> HttpResponse {
    HttpResponse::Ok().json(Envelope { message, data })
}

pub fn created<T: Serialize>(message: &str, data: T) -> HttpResponse {
    HttpResponse::Created().json(Envelope { message, data })
}
