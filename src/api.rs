//! REST API for the box selection service.
//!
//! Exposes the single-box and multi-box packers over HTTP. Uses Axum as the
//! web framework, supports CORS and publishes an OpenAPI document.

use axum::extract::rejection::JsonRejection;
use axum::extract::{Json, State};
use axum::{
    Router,
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
};
use serde::{Deserialize, Serialize};
#[allow(unused_imports)]
use serde_json::json;
use std::sync::OnceLock;
use tower_http::cors::{Any, CorsLayer};
use utoipa::{OpenApi, ToSchema};

use crate::config::{ApiConfig, OptimizerConfig};
use crate::grouping::total_quantity;
use crate::model::{BoxRecord, ItemId, ItemRecord, PlacedItem};
use crate::optimizer::{
    MultiBoxOutcome, PackError, Shipment, SingleBoxOutcome, pack_multi_box, pack_single_box,
};

#[derive(Clone)]
struct ApiState {
    optimizer_config: OptimizerConfig,
}

static OPENAPI_DOC: OnceLock<utoipa::openapi::OpenApi> = OnceLock::new();

fn openapi_doc() -> &'static utoipa::openapi::OpenApi {
    OPENAPI_DOC.get_or_init(ApiDoc::openapi)
}

/// Request structure for both packing endpoints.
#[derive(Deserialize, Clone, ToSchema)]
#[schema(
    example = json!({
        "items": [
            {
                "identity": 17,
                "name": "Aluminium rail",
                "length_mm": 1000.0,
                "width_mm": 20.0,
                "height_mm": 40.0,
                "weight_g": 750.0,
                "quantity": 2
            },
            { "name": "Bracket", "length_mm": 60.0, "width_mm": 40.0, "height_mm": 5.0, "weight_g": 30.0 }
        ]
    })
)]
pub struct PackRequest {
    pub items: Vec<ItemRecord>,
}

/// Single placed unit in the response.
///
/// # Fields
/// * `identity` / `name` - Copied from the originating item
/// * `position` - Minimum corner (x, y, z) inside the box
/// * `dims` - Oriented extents (x = box width, y = box height, z = box length)
#[derive(Serialize, ToSchema, Debug, Clone, PartialEq)]
pub struct PlacementRecord {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub identity: Option<ItemId>,
    pub name: String,
    #[schema(value_type = [f64; 3], example = json!([0.0, 0.0, 0.0]))]
    pub position: [f64; 3],
    #[schema(value_type = [f64; 3], example = json!([20.0, 40.0, 1000.0]))]
    pub dims: [f64; 3],
}

impl PlacementRecord {
    fn from_placed(items: &[ItemRecord], placed: &PlacedItem) -> Self {
        let item = &items[placed.source];
        Self {
            identity: item.identity.clone(),
            name: item.name.clone(),
            position: placed.position.as_array(),
            dims: placed.dims.as_array(),
        }
    }
}

fn placement_records(items: &[ItemRecord], placed: &[PlacedItem]) -> Vec<PlacementRecord> {
    placed
        .iter()
        .map(|p| PlacementRecord::from_placed(items, p))
        .collect()
}

/// Response of `POST /pack/single`.
///
/// `box` is absent when no catalog box holds every item.
#[derive(Serialize, ToSchema, Debug)]
#[serde(rename_all = "camelCase")]
pub struct SingleBoxResponse {
    pub success: bool,
    #[serde(rename = "box")]
    pub box_record: Option<BoxRecord>,
    pub packed_items: Vec<ItemRecord>,
    pub unfit_items: Vec<ItemRecord>,
    pub placements: Vec<PlacementRecord>,
}

impl SingleBoxResponse {
    fn from_outcome(items: &[ItemRecord], outcome: SingleBoxOutcome) -> Self {
        Self {
            success: outcome.success,
            placements: placement_records(items, &outcome.placements),
            box_record: outcome.box_record,
            packed_items: outcome.packed_items,
            unfit_items: outcome.unfit_items,
        }
    }
}

/// One box of a multi-box response.
#[derive(Serialize, ToSchema, Debug)]
#[serde(rename_all = "camelCase")]
pub struct ShipmentResponse {
    #[serde(rename = "box")]
    pub box_record: BoxRecord,
    pub packed_items: Vec<ItemRecord>,
    pub placements: Vec<PlacementRecord>,
}

impl ShipmentResponse {
    fn from_shipment(items: &[ItemRecord], shipment: Shipment) -> Self {
        Self {
            placements: placement_records(items, &shipment.placements),
            box_record: shipment.box_record,
            packed_items: shipment.packed_items,
        }
    }
}

/// Response of `POST /pack/multi`.
#[derive(Serialize, ToSchema, Debug)]
#[serde(rename_all = "camelCase")]
pub struct MultiBoxResponse {
    pub success: bool,
    pub shipments: Vec<ShipmentResponse>,
    pub unfit_items: Vec<ItemRecord>,
}

impl MultiBoxResponse {
    fn from_outcome(items: &[ItemRecord], outcome: MultiBoxOutcome) -> Self {
        Self {
            success: outcome.success,
            shipments: outcome
                .shipments
                .into_iter()
                .map(|shipment| ShipmentResponse::from_shipment(items, shipment))
                .collect(),
            unfit_items: outcome.unfit_items,
        }
    }
}

/// Active box catalog, in the same shape accepted by the catalog file.
#[derive(Serialize, ToSchema)]
pub struct CatalogResponse {
    pub boxes: Vec<BoxRecord>,
}

#[derive(Serialize, ToSchema)]
struct ErrorResponse {
    error: String,
    details: String,
}

impl ErrorResponse {
    fn new(error: impl Into<String>, details: impl Into<String>) -> Self {
        Self {
            error: error.into(),
            details: details.into(),
        }
    }
}

fn error_response(
    status: StatusCode,
    error: impl Into<String>,
    details: impl Into<String>,
) -> Response {
    (status, Json(ErrorResponse::new(error, details))).into_response()
}

fn json_deserialize_error(err: JsonRejection) -> Response {
    error_response(
        StatusCode::UNPROCESSABLE_ENTITY,
        "Invalid JSON data",
        err.to_string(),
    )
}

fn pack_error(err: PackError) -> Response {
    error_response(
        StatusCode::UNPROCESSABLE_ENTITY,
        "Invalid input data",
        err.to_string(),
    )
}

fn task_error(err: tokio::task::JoinError) -> Response {
    eprintln!("❌ Packing task aborted: {err}");
    error_response(
        StatusCode::INTERNAL_SERVER_ERROR,
        "Packing task failed",
        err.to_string(),
    )
}

fn parse_pack_request(
    payload: Result<Json<PackRequest>, JsonRejection>,
) -> Result<Vec<ItemRecord>, Response> {
    match payload {
        Ok(Json(request)) => Ok(request.items),
        Err(err) => Err(json_deserialize_error(err)),
    }
}

#[derive(OpenApi)]
#[openapi(
    paths(handle_pack_single, handle_pack_multi, serve_catalog),
    components(
        schemas(
            PackRequest,
            ItemRecord,
            ItemId,
            BoxRecord,
            PlacementRecord,
            SingleBoxResponse,
            ShipmentResponse,
            MultiBoxResponse,
            CatalogResponse,
            ErrorResponse
        )
    ),
    tags((name = "packing", description = "Endpoints for box selection and packing"))
)]
struct ApiDoc;

fn router(state: ApiState) -> Router {
    let cors = CorsLayer::new()
        .allow_methods(Any)
        .allow_origin(Any)
        .allow_headers(Any);

    Router::new()
        .route("/pack/single", post(handle_pack_single))
        .route("/pack/multi", post(handle_pack_multi))
        .route("/catalog", get(serve_catalog))
        .route("/docs/openapi.json", get(serve_openapi_json))
        .layer(cors)
        .with_state(state)
}

/// Starts the API server on the configured address.
///
/// Blocks until the server is terminated.
pub async fn start_api_server(config: ApiConfig, optimizer_config: OptimizerConfig) {
    let app = router(ApiState { optimizer_config });

    let addr = config.socket_addr();
    let listener = match tokio::net::TcpListener::bind(addr).await {
        Ok(listener) => listener,
        Err(err) => {
            panic!("❌ Could not bind API server to {}: {}", addr, err);
        }
    };

    println!(
        "🚀 Server running on http://{}:{}",
        config.display_host(),
        config.port()
    );
    if config.binds_to_all_interfaces() && config.uses_default_host() {
        println!("💡 Local access: http://localhost:{}", config.port());
    }
    println!("📦 API Endpoints:");
    println!("   - POST /pack/single");
    println!("   - POST /pack/multi");
    println!("   - GET /catalog");
    println!("📑 Documentation:");
    println!("   - GET /docs/openapi.json");

    if let Err(err) = axum::serve(listener, app).await {
        eprintln!("❌ API server terminated with an error: {err}");
    }
}

/// Handler for POST /pack/single.
///
/// Finds the most preferred catalog box that holds every item.
#[utoipa::path(
    post,
    path = "/pack/single",
    request_body = PackRequest,
    responses(
        (status = 200, description = "Box selection result; success is false when nothing fits", body = SingleBoxResponse),
        (
            status = UNPROCESSABLE_ENTITY,
            description = "Malformed request or invalid item measurements",
            body = ErrorResponse
        )
    ),
    tag = "packing"
)]
async fn handle_pack_single(
    State(state): State<ApiState>,
    payload: Result<Json<PackRequest>, JsonRejection>,
) -> impl IntoResponse {
    let items = match parse_pack_request(payload) {
        Ok(items) => items,
        Err(response) => return response,
    };

    println!(
        "📥 New single-box request: {} items, {} units",
        items.len(),
        total_quantity(&items)
    );

    let catalog = state.optimizer_config.catalog();
    let packing_config = state.optimizer_config.packing_config();
    let result = tokio::task::spawn_blocking(move || {
        pack_single_box(&items, &catalog, &packing_config)
            .map(|outcome| SingleBoxResponse::from_outcome(&items, outcome))
    })
    .await;

    let response = match result {
        Ok(Ok(response)) => response,
        Ok(Err(err)) => return pack_error(err),
        Err(err) => return task_error(err),
    };

    match &response.box_record {
        Some(record) => println!(
            "📦 Result: '{}' with {} placed units",
            record.name,
            response.placements.len()
        ),
        None => println!(
            "📦 Result: no single box fits, {} unfit units",
            total_quantity(&response.unfit_items)
        ),
    }

    (StatusCode::OK, Json(response)).into_response()
}

/// Handler for POST /pack/multi.
///
/// Distributes the items over as few, as compact boxes as possible.
#[utoipa::path(
    post,
    path = "/pack/multi",
    request_body = PackRequest,
    responses(
        (status = 200, description = "Shipments and items no box can hold", body = MultiBoxResponse),
        (
            status = UNPROCESSABLE_ENTITY,
            description = "Malformed request",
            body = ErrorResponse
        )
    ),
    tag = "packing"
)]
async fn handle_pack_multi(
    State(state): State<ApiState>,
    payload: Result<Json<PackRequest>, JsonRejection>,
) -> impl IntoResponse {
    let items = match parse_pack_request(payload) {
        Ok(items) => items,
        Err(response) => return response,
    };

    println!(
        "📥 New multi-box request: {} items, {} units",
        items.len(),
        total_quantity(&items)
    );

    let catalog = state.optimizer_config.catalog();
    let packing_config = state.optimizer_config.packing_config();
    let result = tokio::task::spawn_blocking(move || {
        let outcome = pack_multi_box(&items, &catalog, &packing_config);
        MultiBoxResponse::from_outcome(&items, outcome)
    })
    .await;

    let response = match result {
        Ok(response) => response,
        Err(err) => return task_error(err),
    };

    println!(
        "📦 Result: {} shipments, {} unfit units",
        response.shipments.len(),
        total_quantity(&response.unfit_items)
    );

    (StatusCode::OK, Json(response)).into_response()
}

/// Handler for GET /catalog.
#[utoipa::path(
    get,
    path = "/catalog",
    responses((status = 200, description = "Boxes currently offered", body = CatalogResponse)),
    tag = "packing"
)]
async fn serve_catalog(State(state): State<ApiState>) -> impl IntoResponse {
    Json(CatalogResponse {
        boxes: state.optimizer_config.catalog().boxes().to_vec(),
    })
}

async fn serve_openapi_json() -> impl IntoResponse {
    Json(openapi_doc())
}
