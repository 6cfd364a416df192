use actix_web::{HttpResponse, error::InternalError, web};
use serde_json::json;

use crate::handlers;

/// Wire up the HTTP routes.
pub fn configure(cfg: &mut web::ServiceConfig) {
    let query_config = web::QueryConfig::default().error_handler(|err, _req| {
        let body = json!({ "error": err.to_string() });
        InternalError::from_response(err, HttpResponse::BadRequest().json(body)).into()
    });

    cfg.app_data(query_config)
        .route("/health", web::get().to(handlers::health))
        .service(
            web::scope("/api")
                .route("/app/to-school", web::get().to(handlers::app_to_school))
                .route("/app/to-home", web::get().to(handlers::app_to_home))
                .route("/cycle/to-school", web::get().to(handlers::cycle_to_school))
                .route("/cycle/to-home", web::get().to(handlers::cycle_to_home)),
        );
}
