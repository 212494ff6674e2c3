use actix_cors::Cors;
use actix_web::{dev::Server, post, web, App, HttpResponse, HttpServer, Responder};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use crate::application::{
    CatalogUseCase, ConsultationIntakeUseCase, ConsultationRequest, LeadIntakeUseCase, LeadRequest,
    Scope,
};
use crate::domain::error::AppError;
use crate::domain::listing::Listing;

pub struct AppState {
    pub catalog: CatalogUseCase,
    pub leads: Option<LeadIntakeUseCase>,
    pub consultations: Option<ConsultationIntakeUseCase>,
}

#[derive(Deserialize)]
pub struct QueryRequest {
    #[serde(default)]
    pub scope: String,
}

#[derive(Serialize)]
struct QueryResponse {
    object: &'static str,
    results: Vec<Listing>,
    has_more: bool,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    errors: Vec<crate::application::use_cases::catalog::PartitionError>,
}

#[derive(Serialize)]
struct SubmitResponse {
    ok: bool,
    id: String,
}

#[derive(Serialize)]
struct ErrorBody {
    error: String,
}

fn error_response(err: AppError) -> HttpResponse {
    let body = ErrorBody {
        error: err.to_string(),
    };
    match err {
        AppError::ValidationError(_) => HttpResponse::BadRequest().json(body),
        _ => HttpResponse::InternalServerError().json(body),
    }
}

#[post("/notion/query")]
async fn query_catalog(
    data: web::Data<Arc<AppState>>,
    req: web::Json<QueryRequest>,
) -> impl Responder {
    let scope = Scope::parse(&req.scope);
    match data.catalog.fetch(scope).await {
        Ok(outcome) => HttpResponse::Ok().json(QueryResponse {
            object: "list",
            results: outcome.listings,
            has_more: false,
            errors: outcome.errors,
        }),
        Err(err) => {
            tracing::error!(error = %err, "Catalog query failed");
            error_response(err)
        }
    }
}

#[post("/notion/lead")]
async fn submit_lead(data: web::Data<Arc<AppState>>, req: web::Json<LeadRequest>) -> impl Responder {
    let Some(leads) = data.leads.as_ref() else {
        return error_response(AppError::ConfigError(
            "Lead database is not configured".to_string(),
        ));
    };
    match leads.submit(req.into_inner()).await {
        Ok(id) => HttpResponse::Ok().json(SubmitResponse { ok: true, id }),
        Err(err) => {
            tracing::error!(error = %err, "Lead submission failed");
            error_response(err)
        }
    }
}

#[post("/notion/consultation")]
async fn submit_consultation(
    data: web::Data<Arc<AppState>>,
    req: web::Json<ConsultationRequest>,
) -> impl Responder {
    let Some(consultations) = data.consultations.as_ref() else {
        return error_response(AppError::ConfigError(
            "Consultation database is not configured".to_string(),
        ));
    };
    match consultations.submit(req.into_inner()).await {
        Ok(id) => HttpResponse::Ok().json(SubmitResponse { ok: true, id }),
        Err(err) => {
            tracing::error!(error = %err, "Consultation submission failed");
            error_response(err)
        }
    }
}

pub fn start_server(state: Arc<AppState>, port: u16) -> std::io::Result<Server> {
    let state = web::Data::new(state);

    let server = HttpServer::new(move || {
        let cors = Cors::permissive(); // Public site API; browsers call it directly

        App::new().wrap(cors).app_data(state.clone()).service(
            web::scope("/api")
                .service(query_catalog)
                .service(submit_lead)
                .service(submit_consultation),
        )
    })
    .bind(("0.0.0.0", port))?
    .run();

    Ok(server)
}

#[cfg(test)]
mod tests {
    use super::*;
    use actix_web::{test, App};
    use async_trait::async_trait;
    use std::collections::BTreeMap;

    use crate::application::use_cases::record_normalizer::RecordNormalizer;
    use crate::domain::error::Result;
    use crate::domain::property::{OutboundProperty, PropertyKind, SchemaMap, SourcePage};
    use crate::infrastructure::notion::ContentStore;

    struct FakeStore;

    #[async_trait]
    impl ContentStore for FakeStore {
        async fn query_pages(&self, _database_id: &str) -> Result<Vec<SourcePage>> {
            let page: SourcePage = serde_json::from_value(serde_json::json!({
                "id": "page-1",
                "properties": {
                    "Название": {"type": "title", "title": [{"plain_text": "Вилла"}]},
                    "Цена": {"type": "number", "number": 120000.0}
                }
            }))
            .unwrap();
            Ok(vec![page])
        }

        async fn fetch_schema(&self, _database_id: &str) -> Result<SchemaMap> {
            Ok([
                ("Имя".to_string(), PropertyKind::Title),
                ("Телефон".to_string(), PropertyKind::PhoneNumber),
            ]
            .into_iter()
            .collect())
        }

        async fn create_page(
            &self,
            _database_id: &str,
            _properties: BTreeMap<String, OutboundProperty>,
        ) -> Result<String> {
            Ok("created-id".to_string())
        }
    }

    fn state() -> Arc<AppState> {
        let store: Arc<dyn ContentStore> = Arc::new(FakeStore);
        Arc::new(AppState {
            catalog: CatalogUseCase::new(
                Arc::clone(&store),
                Arc::new(RecordNormalizer::new()),
                Some("sale-db".to_string()),
                None,
                None,
            ),
            leads: Some(LeadIntakeUseCase::new(
                Arc::clone(&store),
                "leads-db".to_string(),
            )),
            consultations: None,
        })
    }

    #[actix_web::test]
    async fn test_query_returns_list_envelope() {
        let app = test::init_service(
            App::new()
                .app_data(web::Data::new(state()))
                .service(web::scope("/api").service(query_catalog)),
        )
        .await;

        let req = test::TestRequest::post()
            .uri("/api/notion/query")
            .set_json(serde_json::json!({"scope": "sale"}))
            .to_request();
        let body: serde_json::Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(body["object"], "list");
        assert_eq!(body["has_more"], false);
        assert_eq!(body["results"][0]["title"], "Вилла");
    }

    #[actix_web::test]
    async fn test_lead_validation_maps_to_400() {
        let app = test::init_service(
            App::new()
                .app_data(web::Data::new(state()))
                .service(web::scope("/api").service(submit_lead)),
        )
        .await;

        let req = test::TestRequest::post()
            .uri("/api/notion/lead")
            .set_json(serde_json::json!({"name": "Анна", "phone": ""}))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), actix_web::http::StatusCode::BAD_REQUEST);
    }

    #[actix_web::test]
    async fn test_lead_accepted() {
        let app = test::init_service(
            App::new()
                .app_data(web::Data::new(state()))
                .service(web::scope("/api").service(submit_lead)),
        )
        .await;

        let req = test::TestRequest::post()
            .uri("/api/notion/lead")
            .set_json(serde_json::json!({"name": "Анна", "phone": "+79161234567"}))
            .to_request();
        let body: serde_json::Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(body["ok"], true);
        assert_eq!(body["id"], "created-id");
    }

    #[actix_web::test]
    async fn test_unconfigured_intake_is_500() {
        let app = test::init_service(
            App::new()
                .app_data(web::Data::new(state()))
                .service(web::scope("/api").service(submit_consultation)),
        )
        .await;

        let req = test::TestRequest::post()
            .uri("/api/notion/consultation")
            .set_json(serde_json::json!({"name": "Анна", "phone": "+79161234567"}))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(
            resp.status(),
            actix_web::http::StatusCode::INTERNAL_SERVER_ERROR
        );
    }
}
