use actix_cors::Cors;
use actix_web::{web, App, HttpResponse, HttpServer, Result as ActixResult};
use docseek_core::{QueryService, DEFAULT_K};
use docseek_resources::{filter_by_name, ResourceProvider, ResourceRecord};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{info, warn};
use uuid::Uuid;

use crate::sessions::{BrowserView, SessionStore};

/// Shared, read-mostly state handed to every handler
pub struct AppState {
    pub search: Arc<QueryService>,
    pub provider: Arc<dyn ResourceProvider>,
    pub resource_group: String,
    pub sessions: SessionStore,
}

impl AppState {
    pub fn new(
        search: Arc<QueryService>,
        provider: Arc<dyn ResourceProvider>,
        resource_group: impl Into<String>,
    ) -> Self {
        Self::with_sessions(search, provider, resource_group, SessionStore::new())
    }

    pub fn with_sessions(
        search: Arc<QueryService>,
        provider: Arc<dyn ResourceProvider>,
        resource_group: impl Into<String>,
        sessions: SessionStore,
    ) -> Self {
        Self {
            search,
            provider,
            resource_group: resource_group.into(),
            sessions,
        }
    }

    async fn fetch_resources(&self) -> Result<Vec<ResourceRecord>, String> {
        self.provider
            .list_resources(&self.resource_group)
            .await
            .map_err(|e| {
                warn!("Listing resources of {} failed: {}", self.resource_group, e);
                e.to_string()
            })
    }
}

#[derive(Deserialize)]
struct SearchParams {
    query: Option<String>,
    k: Option<String>,
    /// Topic appended to the query text (Sugerencias, Ideas, Reclamos)
    categoria: Option<String>,
}

/// Query text actually searched: a blank query stays blank so it is
/// rejected, otherwise a non-blank category is appended after a space
fn compose_query(query: &str, categoria: Option<&str>) -> String {
    match categoria.map(str::trim) {
        Some(categoria) if !categoria.is_empty() && !query.trim().is_empty() => {
            format!("{} {}", query, categoria)
        }
        _ => query.to_string(),
    }
}

#[derive(Serialize)]
struct SearchResult {
    documento: String,
    similitud: f32,
}

#[derive(Serialize)]
struct SearchResults {
    consulta: String,
    resultados: Vec<SearchResult>,
}

#[derive(Deserialize)]
struct ResourceParams {
    search: Option<String>,
}

#[derive(Serialize)]
struct ResourceList {
    resources: Vec<ResourceRecord>,
}

#[derive(Deserialize)]
struct SessionSearchRequest {
    #[serde(default)]
    search: String,
    threshold: Option<f32>,
}

#[derive(Deserialize)]
struct SelectTypeRequest {
    #[serde(rename = "type")]
    resource_type: String,
}

#[derive(Deserialize)]
struct ThresholdRequest {
    threshold: f32,
}

pub struct RestApi;

impl RestApi {
    pub async fn start(state: Arc<AppState>, bind: &str, port: u16) -> std::io::Result<()> {
        let data = web::Data::from(state);
        info!("Listening on {}:{}", bind, port);

        HttpServer::new(move || {
            let cors = Cors::default()
                .allow_any_origin()
                .allow_any_method()
                .allow_any_header()
                .max_age(3600);

            App::new()
                .wrap(cors)
                .app_data(data.clone())
                .configure(Self::configure)
        })
        .bind((bind, port))?
        .run()
        .await
    }

    /// Register every route; shared by the server and the handler tests
    pub fn configure(cfg: &mut web::ServiceConfig) {
        cfg.route("/health", web::get().to(health))
            .service(web::resource(["/buscar", "/buscar/"]).route(web::get().to(search_documents)))
            .service(
                web::resource(["/azure-resources", "/azure-resources/"])
                    .route(web::get().to(list_resources)),
            )
            .route("/sessions", web::post().to(create_session))
            .route("/sessions/{id}", web::get().to(get_session))
            .route("/sessions/{id}", web::delete().to(delete_session))
            .route("/sessions/{id}/search", web::post().to(search_session))
            .route("/sessions/{id}/type", web::post().to(select_type))
            .route("/sessions/{id}/threshold", web::put().to(set_threshold));
    }
}

fn error_body(message: impl ToString) -> serde_json::Value {
    serde_json::json!({ "error": message.to_string() })
}

fn session_not_found() -> HttpResponse {
    HttpResponse::NotFound().json(error_body("Session not found"))
}

fn parse_session_id(raw: &str) -> Option<Uuid> {
    Uuid::parse_str(raw).ok()
}

async fn health(state: web::Data<AppState>) -> ActixResult<HttpResponse> {
    Ok(HttpResponse::Ok().json(serde_json::json!({
        "status": "ok",
        "documents": state.search.len(),
        "dimension": state.search.dim(),
    })))
}

async fn search_documents(
    state: web::Data<AppState>,
    params: web::Query<SearchParams>,
) -> ActixResult<HttpResponse> {
    let query = compose_query(
        params.query.as_deref().unwrap_or_default(),
        params.categoria.as_deref(),
    );

    let k = match params.k.as_deref() {
        None => DEFAULT_K.min(state.search.len()),
        Some(raw) => match raw.trim().parse::<i64>() {
            Ok(k) => match state.search.validate_k(k) {
                Ok(k) => k,
                Err(e) => return Ok(HttpResponse::BadRequest().json(error_body(e))),
            },
            Err(_) => {
                return Ok(HttpResponse::BadRequest()
                    .json(error_body(format!("Invalid k: {:?} is not an integer", raw))))
            }
        },
    };

    match state.search.search(&query, k) {
        Ok(response) => Ok(HttpResponse::Ok().json(SearchResults {
            consulta: response.query,
            resultados: response
                .hits
                .into_iter()
                .map(|hit| SearchResult {
                    documento: hit.document,
                    similitud: hit.score,
                })
                .collect(),
        })),
        Err(e) => Ok(HttpResponse::BadRequest().json(error_body(e))),
    }
}

async fn list_resources(
    state: web::Data<AppState>,
    params: web::Query<ResourceParams>,
) -> ActixResult<HttpResponse> {
    match state.fetch_resources().await {
        Ok(records) => Ok(HttpResponse::Ok().json(ResourceList {
            resources: filter_by_name(records, params.search.as_deref()),
        })),
        Err(e) => Ok(HttpResponse::Ok().json(error_body(e))),
    }
}

async fn create_session(state: web::Data<AppState>) -> ActixResult<HttpResponse> {
    let id = state.sessions.create();
    Ok(HttpResponse::Ok().json(serde_json::json!({ "session_id": id })))
}

async fn get_session(
    state: web::Data<AppState>,
    path: web::Path<String>,
) -> ActixResult<HttpResponse> {
    let view = parse_session_id(&path)
        .and_then(|id| state.sessions.with(&id, |browser| BrowserView::from(&*browser)));

    match view {
        Some(view) => Ok(HttpResponse::Ok().json(view)),
        None => Ok(session_not_found()),
    }
}

async fn delete_session(
    state: web::Data<AppState>,
    path: web::Path<String>,
) -> ActixResult<HttpResponse> {
    match parse_session_id(&path) {
        Some(id) if state.sessions.remove(&id) => {
            Ok(HttpResponse::Ok().json(serde_json::json!({ "result": true })))
        }
        _ => Ok(session_not_found()),
    }
}

async fn search_session(
    state: web::Data<AppState>,
    path: web::Path<String>,
    req: web::Json<SessionSearchRequest>,
) -> ActixResult<HttpResponse> {
    let id = match parse_session_id(&path).filter(|id| state.sessions.contains(id)) {
        Some(id) => id,
        None => return Ok(session_not_found()),
    };

    let term = req.search.trim();
    // Inventory is fetched fresh for every search; the session lock is not held meanwhile
    let records = if term.is_empty() {
        Vec::new()
    } else {
        match state.fetch_resources().await {
            Ok(records) => records,
            Err(e) => return Ok(HttpResponse::Ok().json(error_body(e))),
        }
    };

    let view = state.sessions.with(&id, |browser| {
        if let Some(threshold) = req.threshold {
            browser.set_threshold(threshold);
        }
        browser.search(term, records);
        BrowserView::from(&*browser)
    });

    match view {
        Some(view) => Ok(HttpResponse::Ok().json(view)),
        None => Ok(session_not_found()),
    }
}

async fn select_type(
    state: web::Data<AppState>,
    path: web::Path<String>,
    req: web::Json<SelectTypeRequest>,
) -> ActixResult<HttpResponse> {
    let outcome = parse_session_id(&path).and_then(|id| {
        state.sessions.with(&id, |browser| {
            let selected = browser.select_type(&req.resource_type).map(|_| ());
            selected.map(|()| BrowserView::from(&*browser))
        })
    });

    match outcome {
        Some(Ok(view)) => Ok(HttpResponse::Ok().json(view)),
        Some(Err(e)) => Ok(HttpResponse::BadRequest().json(error_body(e))),
        None => Ok(session_not_found()),
    }
}

async fn set_threshold(
    state: web::Data<AppState>,
    path: web::Path<String>,
    req: web::Json<ThresholdRequest>,
) -> ActixResult<HttpResponse> {
    let view = parse_session_id(&path).and_then(|id| {
        state.sessions.with(&id, |browser| {
            browser.set_threshold(req.threshold);
            BrowserView::from(&*browser)
        })
    });

    match view {
        Some(view) => Ok(HttpResponse::Ok().json(view)),
        None => Ok(session_not_found()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use actix_web::{http::StatusCode, test};
    use async_trait::async_trait;
    use docseek_core::{Corpus, HashingEncoder};
    use docseek_resources::{ResourceError, StaticProvider};
    use serde_json::{json, Value};

    struct FailingProvider;

    #[async_trait]
    impl ResourceProvider for FailingProvider {
        async fn list_resources(
            &self,
            _resource_group: &str,
        ) -> docseek_resources::Result<Vec<ResourceRecord>> {
            Err(ResourceError::CommandFailed {
                status: "exit status: 1".to_string(),
                stderr: "Please run 'az login' to setup account.".to_string(),
            })
        }
    }

    fn state_with(provider: Arc<dyn ResourceProvider>) -> web::Data<AppState> {
        let corpus = Corpus::from_documents([
            "Firewall perimeter config",
            "VPN gateway setup",
            "Quarterly strategy memo on cloud costs",
            "Incident report for the frontend load balancer",
        ]);
        let search = QueryService::new(corpus, Box::new(HashingEncoder::default())).unwrap();
        web::Data::new(AppState::new(Arc::new(search), provider, "RSGYAPE001"))
    }

    fn inventory() -> Arc<dyn ResourceProvider> {
        Arc::new(StaticProvider::new(vec![
            ResourceRecord::new("vm1", "VM", "East US").with_id("/r/vm1-vm"),
            ResourceRecord::new("vm1", "Disk", "East US").with_id("/r/vm1-disk"),
            ResourceRecord::new("web-frontend", "Microsoft.Web/sites", "West Europe"),
        ]))
    }

    macro_rules! app {
        ($state:expr) => {
            test::init_service(App::new().app_data($state).configure(RestApi::configure)).await
        };
    }

    #[actix_web::test]
    async fn test_buscar() {
        let app = app!(state_with(inventory()));
        let req = test::TestRequest::get()
            .uri("/buscar/?query=Firewall&k=1")
            .to_request();
        let body: Value = test::call_and_read_body_json(&app, req).await;

        assert_eq!(body["consulta"], "Firewall");
        let results = body["resultados"].as_array().unwrap();
        assert_eq!(results.len(), 1);
        assert_eq!(results[0]["documento"], "Firewall perimeter config");
        assert!(results[0]["similitud"].as_f64().unwrap() > 0.0);
    }

    #[actix_web::test]
    async fn test_buscar_default_k() {
        let app = app!(state_with(inventory()));
        let req = test::TestRequest::get().uri("/buscar/?query=vpn").to_request();
        let body: Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(body["resultados"].as_array().unwrap().len(), DEFAULT_K);
    }

    #[actix_web::test]
    async fn test_buscar_appends_categoria() {
        let app = app!(state_with(inventory()));
        let req = test::TestRequest::get()
            .uri("/buscar/?query=firewall&k=2&categoria=Reclamos")
            .to_request();
        let body: Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(body["consulta"], "firewall Reclamos");
        assert_eq!(body["resultados"].as_array().unwrap().len(), 2);

        // A blank category leaves the query as typed
        let req = test::TestRequest::get()
            .uri("/buscar/?query=firewall&k=1&categoria=")
            .to_request();
        let body: Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(body["consulta"], "firewall");
    }

    #[actix_web::test]
    async fn test_buscar_categoria_does_not_rescue_blank_query() {
        let app = app!(state_with(inventory()));
        let req = test::TestRequest::get()
            .uri("/buscar/?query=%20&k=1&categoria=Ideas")
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    }

    #[::core::prelude::v1::test]
    fn test_compose_query() {
        assert_eq!(compose_query("vpn", None), "vpn");
        assert_eq!(compose_query("vpn", Some("Ideas")), "vpn Ideas");
        assert_eq!(compose_query("vpn", Some("  ")), "vpn");
        assert_eq!(compose_query("", Some("Ideas")), "");
    }

    #[actix_web::test]
    async fn test_buscar_rejects_bad_input() {
        let app = app!(state_with(inventory()));
        for uri in [
            "/buscar/?k=1",
            "/buscar/?query=%20&k=1",
            "/buscar/?query=vpn&k=0",
            "/buscar/?query=vpn&k=-2",
            "/buscar/?query=vpn&k=99",
            "/buscar/?query=vpn&k=three",
        ] {
            let resp = test::call_service(&app, test::TestRequest::get().uri(uri).to_request()).await;
            assert_eq!(resp.status(), StatusCode::BAD_REQUEST, "{}", uri);
            let body: Value = test::read_body_json(resp).await;
            assert!(body["error"].is_string(), "{}", uri);
        }
    }

    #[actix_web::test]
    async fn test_azure_resources() {
        let app = app!(state_with(inventory()));
        let req = test::TestRequest::get().uri("/azure-resources/").to_request();
        let body: Value = test::call_and_read_body_json(&app, req).await;
        let resources = body["resources"].as_array().unwrap();
        assert_eq!(resources.len(), 3);
        assert_eq!(resources[0]["id"], "/r/vm1-vm");
        assert_eq!(resources[0]["type"], "VM");
        assert_eq!(resources[2]["id"], Value::Null);

        let req = test::TestRequest::get()
            .uri("/azure-resources/?search=WEB")
            .to_request();
        let body: Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(body["resources"].as_array().unwrap().len(), 1);
    }

    #[actix_web::test]
    async fn test_azure_resources_error_is_payload() {
        let app = app!(state_with(Arc::new(FailingProvider)));
        let resp = test::call_service(
            &app,
            test::TestRequest::get().uri("/azure-resources/").to_request(),
        )
        .await;
        assert_eq!(resp.status(), StatusCode::OK);
        let body: Value = test::read_body_json(resp).await;
        assert!(body["error"].as_str().unwrap().contains("az login"));
        assert!(body.get("resources").is_none());
    }

    #[actix_web::test]
    async fn test_health() {
        let app = app!(state_with(inventory()));
        let req = test::TestRequest::get().uri("/health").to_request();
        let body: Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(body["status"], "ok");
        assert_eq!(body["documents"], 4);
    }

    #[actix_web::test]
    async fn test_session_flow() {
        let app = app!(state_with(inventory()));

        let req = test::TestRequest::post().uri("/sessions").to_request();
        let created: Value = test::call_and_read_body_json(&app, req).await;
        let id = created["session_id"].as_str().unwrap().to_string();

        let req = test::TestRequest::get().uri(&format!("/sessions/{}", id)).to_request();
        let view: Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(view["state"], "idle");

        let req = test::TestRequest::post()
            .uri(&format!("/sessions/{}/search", id))
            .set_json(json!({ "search": "vm1" }))
            .to_request();
        let view: Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(view["state"], "awaiting_type");
        assert_eq!(view["type_options"], json!(["VM", "Disk"]));
        assert_eq!(view["matched"], 2);

        let req = test::TestRequest::post()
            .uri(&format!("/sessions/{}/type", id))
            .set_json(json!({ "type": "Disk" }))
            .to_request();
        let view: Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(view["state"], "ranked");
        assert_eq!(view["type_filter"], "Disk");
        assert_eq!(view["best_match"]["type"], "Disk");
        assert_eq!(view["best_match"]["similarity"], 1.0);
        assert_eq!(view["matched"], 1);

        let req = test::TestRequest::put()
            .uri(&format!("/sessions/{}/threshold", id))
            .set_json(json!({ "threshold": 1.0 }))
            .to_request();
        let view: Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(view["state"], "ranked");
        assert_eq!(view["matched"], 1);

        let req = test::TestRequest::delete()
            .uri(&format!("/sessions/{}", id))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::OK);

        let req = test::TestRequest::get().uri(&format!("/sessions/{}", id)).to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    }

    #[actix_web::test]
    async fn test_session_select_type_without_ambiguity() {
        let app = app!(state_with(inventory()));
        let req = test::TestRequest::post().uri("/sessions").to_request();
        let created: Value = test::call_and_read_body_json(&app, req).await;
        let id = created["session_id"].as_str().unwrap().to_string();

        let req = test::TestRequest::post()
            .uri(&format!("/sessions/{}/type", id))
            .set_json(json!({ "type": "VM" }))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    }

    #[actix_web::test]
    async fn test_session_search_provider_failure() {
        let app = app!(state_with(Arc::new(FailingProvider)));
        let req = test::TestRequest::post().uri("/sessions").to_request();
        let created: Value = test::call_and_read_body_json(&app, req).await;
        let id = created["session_id"].as_str().unwrap().to_string();

        let req = test::TestRequest::post()
            .uri(&format!("/sessions/{}/search", id))
            .set_json(json!({ "search": "vm1" }))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::OK);
        let body: Value = test::read_body_json(resp).await;
        assert!(body["error"].is_string());
    }

    #[actix_web::test]
    async fn test_unknown_session() {
        let app = app!(state_with(inventory()));
        for uri in ["/sessions/not-a-uuid", "/sessions/00000000-0000-0000-0000-000000000000"] {
            let resp = test::call_service(&app, test::TestRequest::get().uri(uri).to_request()).await;
            assert_eq!(resp.status(), StatusCode::NOT_FOUND);
        }
    }
}
