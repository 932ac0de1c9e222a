//! REST API for the room planner.
//!
//! Exposes the arrangement search, the fit check and the furniture catalog
//! over HTTP. Uses Axum as the web framework and supports CORS.

use std::sync::{Arc, OnceLock};

use axum::extract::rejection::JsonRejection;
use axum::extract::{Json, State};
use axum::response::sse::{Event, KeepAlive, Sse};
use axum::{
    Router,
    http::StatusCode,
    response::{Html, IntoResponse, Response},
    routing::{get, post},
};
use serde::{Deserialize, Serialize};
#[allow(unused_imports)]
use serde_json::json;
use tokio::sync::mpsc;
use tokio_stream::StreamExt;
use tokio_stream::wrappers::ReceiverStream;
use tower_http::cors::{Any, CorsLayer};
use tracing::{error, info};
use utoipa::{OpenApi, ToSchema};

use crate::config::{ApiConfig, OptimizerConfig};
use crate::model::{
    FeatureKind, FurnitureDimensions, FurnitureItem, Placement, RoomDimensions, RoomFeature,
    RoomLayout, Rotation, ValidationError, Wall,
};
use crate::optimizer::{
    ArrangeEvent, ArrangementConfig, ArrangementResult, TrialOrdering, arrange_with_config,
    arrange_with_progress, does_furniture_fit_with_config,
};
use crate::types::Vec2;

#[derive(Clone)]
struct ApiState {
    optimizer_config: OptimizerConfig,
    catalog: Arc<Vec<FurnitureItem>>,
}

/// Highest `max_iterations` a single request may ask for.
const MAX_REQUEST_ITERATIONS: usize = 1_000;

static OPENAPI_DOC: OnceLock<utoipa::openapi::OpenApi> = OnceLock::new();

// SRI hashes verified against https://unpkg.com/swagger-ui-dist@5.17.14/ on 2025-10-29.
const SWAGGER_UI_HTML: &str = r##"<!DOCTYPE html>
<html lang="en">
    <head>
        <meta charset="utf-8" />
        <title>place-it-now API Docs</title>
        <link
            rel="stylesheet"
            href="https://unpkg.com/swagger-ui-dist@5.17.14/swagger-ui.css"
            integrity="sha384-wxLW6kwyHktdDGr6Pv1zgm/VGJh99lfUbzSn6HNHBENZlCN7W602k9VkGdxuFvPn"
            crossorigin="anonymous"
        />
    </head>
    <body>
        <div id="swagger-ui"></div>
        <script
            src="https://unpkg.com/swagger-ui-dist@5.17.14/swagger-ui-bundle.js"
            integrity="sha384-wmyclcVGX/WhUkdkATwhaK1X1JtiNrr2EoYJ+diV3vj4v6OC5yCeSu+yW13SYJep"
            crossorigin="anonymous"
        ></script>
        <script
            src="https://unpkg.com/swagger-ui-dist@5.17.14/swagger-ui-standalone-preset.js"
            integrity="sha384-2YH8WDRaj7V2OqU/trsmzSagmk/E2SutiCsGkdgoQwC9pNUJV1u/141DHB6jgs8t"
            crossorigin="anonymous"
        ></script>
        <script>
            window.onload = function () {
                const ui = SwaggerUIBundle({
                    url: "/docs/openapi.json",
                    dom_id: "#swagger-ui",
                    presets: [SwaggerUIBundle.presets.apis, SwaggerUIStandalonePreset],
                    layout: "StandaloneLayout",
                });
                window.ui = ui;
            };
        </script>
    </body>
    </html>"##;

fn openapi_doc() -> &'static utoipa::openapi::OpenApi {
    OPENAPI_DOC.get_or_init(ApiDoc::openapi)
}

/// Request structure for the arrangement endpoints.
#[derive(Deserialize, ToSchema)]
#[schema(
    example = json!({
        "room": { "width": 4.0, "length": 5.0, "height": 2.8 },
        "features": [
            { "type": "door", "wall": "south", "position": 0.5, "width": 0.9, "height": 2.0 }
        ],
        "furniture": [
            {
                "id": "bed-single",
                "name": "Single Bed",
                "category": "bed",
                "dimensions": { "width": 0.9, "length": 2.0, "height": 0.5 },
                "price": "TSh 250,000"
            }
        ],
        "max_iterations": 100
    })
)]
pub struct ArrangeRequest {
    pub room: RoomDimensions,
    #[serde(default)]
    pub features: Vec<RoomFeature>,
    #[serde(default)]
    pub furniture: Vec<FurnitureItem>,
    #[serde(default)]
    #[schema(nullable = true)]
    pub max_iterations: Option<usize>,
    /// Enables shuffled trials with this seed.
    #[serde(default)]
    #[schema(nullable = true)]
    pub shuffle_seed: Option<u64>,
}

#[derive(Debug)]
struct ValidatedArrangeRequest {
    layout: RoomLayout,
    furniture: Vec<FurnitureItem>,
    max_iterations: Option<usize>,
    shuffle_seed: Option<u64>,
}

impl ValidatedArrangeRequest {
    /// Merges the request's overrides into `base` and checks the room grid.
    fn arrangement_config(
        &self,
        base: ArrangementConfig,
    ) -> Result<ArrangementConfig, RequestValidationError> {
        let mut builder = ArrangementConfig::builder()
            .grid_step(base.grid_step)
            .epsilon(base.epsilon)
            .max_iterations(self.max_iterations.unwrap_or(base.max_iterations))
            .trial_ordering(base.trial_ordering);
        if let Some(seed) = self.shuffle_seed {
            builder = builder.trial_ordering(TrialOrdering::Shuffled { seed });
        }
        let config = builder.build();
        config
            .check_grid(&self.layout.dimensions)
            .map_err(RequestValidationError::InvalidRoom)?;
        Ok(config)
    }
}

#[derive(Debug)]
enum RequestValidationError {
    InvalidRoom(ValidationError),
    InvalidFeature(ValidationError),
    InvalidFurniture(ValidationError),
    InvalidSearch(ValidationError),
}

impl std::fmt::Display for RequestValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RequestValidationError::InvalidRoom(err)
            | RequestValidationError::InvalidFeature(err)
            | RequestValidationError::InvalidFurniture(err)
            | RequestValidationError::InvalidSearch(err) => write!(f, "{}", err),
        }
    }
}

impl RequestValidationError {
    fn title(&self) -> &'static str {
        match self {
            RequestValidationError::InvalidRoom(_) => "Invalid room",
            RequestValidationError::InvalidFeature(_) => "Invalid room feature",
            RequestValidationError::InvalidFurniture(_) => "Invalid furniture item",
            RequestValidationError::InvalidSearch(_) => "Invalid search settings",
        }
    }
}

fn validate_furniture(
    items: Vec<FurnitureItem>,
) -> Result<Vec<FurnitureItem>, RequestValidationError> {
    items
        .into_iter()
        .map(FurnitureItem::validated)
        .collect::<Result<Vec<_>, _>>()
        .map_err(RequestValidationError::InvalidFurniture)
}

impl ArrangeRequest {
    fn into_validated(self) -> Result<ValidatedArrangeRequest, RequestValidationError> {
        let dimensions = self
            .room
            .validated()
            .map_err(RequestValidationError::InvalidRoom)?;

        let features = self
            .features
            .into_iter()
            .map(RoomFeature::validated)
            .collect::<Result<Vec<_>, _>>()
            .map_err(RequestValidationError::InvalidFeature)?;

        if let Some(iterations) = self.max_iterations {
            if iterations > MAX_REQUEST_ITERATIONS {
                return Err(RequestValidationError::InvalidSearch(
                    ValidationError::TooManyIterations(format!(
                        "{} requested, at most {} allowed",
                        iterations, MAX_REQUEST_ITERATIONS
                    )),
                ));
            }
        }

        Ok(ValidatedArrangeRequest {
            layout: RoomLayout::new(dimensions, features),
            furniture: validate_furniture(self.furniture)?,
            max_iterations: self.max_iterations,
            shuffle_seed: self.shuffle_seed,
        })
    }
}

/// A placement as consumed by renderers.
#[derive(Serialize, Deserialize, ToSchema)]
pub struct PlacementDto {
    pub item: FurnitureItem,
    /// `[x, 0, z]` of the south-west corner of the rotated footprint
    #[schema(example = json!([1.0, 0.0, 4.0]))]
    pub position: [f64; 3],
    /// `[0, yaw, 0]` with yaw a multiple of π/2
    #[serde(default)]
    #[schema(example = json!([0.0, 1.5707963267948966, 0.0]))]
    pub rotation: [f64; 3],
    #[serde(default)]
    pub score: f64,
}

impl From<Placement> for PlacementDto {
    fn from(placement: Placement) -> Self {
        Self {
            position: placement.position(),
            rotation: placement.rotation.to_euler(),
            score: placement.score,
            item: placement.item,
        }
    }
}

impl PlacementDto {
    fn into_placement(self) -> Result<Placement, ValidationError> {
        Ok(Placement::new(
            self.item.validated()?,
            Vec2::new(self.position[0], self.position[2]),
            Rotation::from_yaw(self.rotation[1]),
            self.score,
        ))
    }
}

#[derive(Serialize, ToSchema)]
pub struct UnplacedDto {
    pub item: FurnitureItem,
    pub reason_code: String,
    pub reason: String,
}

/// Response structure of the arrangement endpoint.
#[derive(Serialize, ToSchema)]
pub struct ArrangeResponse {
    pub placements: Vec<PlacementDto>,
    pub unplaced: Vec<UnplacedDto>,
    pub total_score: f64,
    pub is_complete: bool,
    pub coverage_percent: f64,
}

impl ArrangeResponse {
    pub fn from_result(result: ArrangementResult, room: &RoomDimensions) -> Self {
        let coverage_percent = result.coverage_percent(room);
        let is_complete = result.is_complete();
        let ArrangementResult {
            placements,
            unplaced,
            total_score,
            ..
        } = result;

        Self {
            placements: placements.into_iter().map(PlacementDto::from).collect(),
            unplaced: unplaced
                .into_iter()
                .map(|entry| UnplacedDto {
                    reason_code: entry.reason.code().to_string(),
                    reason: entry.reason.to_string(),
                    item: entry.item,
                })
                .collect(),
            total_score,
            is_complete,
            coverage_percent,
        }
    }
}

/// Request structure for the fit check.
#[derive(Deserialize, ToSchema)]
pub struct FitsRequest {
    pub room: RoomDimensions,
    pub item: FurnitureItem,
    #[serde(default)]
    pub existing: Vec<PlacementDto>,
}

#[derive(Serialize, Deserialize, ToSchema)]
pub struct FitsResponse {
    pub fits: bool,
}

#[derive(Serialize, ToSchema)]
struct ErrorResponse {
    error: String,
    details: String,
}

fn error_response(
    status: StatusCode,
    error: impl Into<String>,
    details: impl Into<String>,
) -> Response {
    (
        status,
        Json(ErrorResponse {
            error: error.into(),
            details: details.into(),
        }),
    )
        .into_response()
}

fn json_deserialize_error(err: JsonRejection) -> Response {
    error_response(
        StatusCode::UNPROCESSABLE_ENTITY,
        "Invalid JSON data",
        err.to_string(),
    )
}

fn validation_error(err: RequestValidationError) -> Response {
    error_response(StatusCode::UNPROCESSABLE_ENTITY, err.title(), err.to_string())
}

fn parse_arrange_request(
    payload: Result<Json<ArrangeRequest>, JsonRejection>,
) -> Result<ValidatedArrangeRequest, Response> {
    let Json(payload) = payload.map_err(json_deserialize_error)?;
    payload.into_validated().map_err(validation_error)
}

#[derive(OpenApi)]
#[openapi(
    paths(handle_arrange, handle_arrange_stream, handle_fits, handle_catalog),
    components(
        schemas(
            ArrangeRequest,
            ArrangeResponse,
            PlacementDto,
            UnplacedDto,
            FitsRequest,
            FitsResponse,
            ErrorResponse,
            ArrangeEvent,
            RoomDimensions,
            RoomFeature,
            FeatureKind,
            Wall,
            FurnitureItem,
            FurnitureDimensions
        )
    ),
    tags((name = "planning", description = "Furniture arrangement endpoints"))
)]
struct ApiDoc;

/// Builds the application router.
pub fn router(optimizer_config: OptimizerConfig, catalog: Vec<FurnitureItem>) -> Router {
    let cors = CorsLayer::new()
        .allow_methods(Any)
        .allow_origin(Any)
        .allow_headers(Any);

    let state = ApiState {
        optimizer_config,
        catalog: Arc::new(catalog),
    };

    Router::new()
        .route("/arrange", post(handle_arrange))
        .route("/arrange_stream", post(handle_arrange_stream))
        .route("/fits", post(handle_fits))
        .route("/catalog", get(handle_catalog))
        .route("/docs/openapi.json", get(serve_openapi_json))
        .route("/docs", get(serve_openapi_ui))
        .layer(cors)
        .with_state(state)
}

/// Starts the API server and serves until it terminates.
pub async fn start_api_server(
    config: ApiConfig,
    optimizer_config: OptimizerConfig,
    catalog: Vec<FurnitureItem>,
) -> std::io::Result<()> {
    let app = router(optimizer_config, catalog);

    let addr = config.socket_addr();
    let listener = tokio::net::TcpListener::bind(addr).await?;

    info!(
        "🚀 Server running on http://{}:{}",
        config.display_host(),
        config.port()
    );
    if config.binds_to_all_interfaces() {
        info!("💡 Local access: http://localhost:{}", config.port());
    }
    info!("🛋️ Endpoints: POST /arrange, POST /arrange_stream, POST /fits, GET /catalog");
    info!("📑 Documentation: GET /docs, GET /docs/openapi.json");

    axum::serve(listener, app).await
}

/// Handler for POST /arrange.
///
/// Runs the arrangement search and returns the best arrangement found,
/// including items that could not be placed.
#[utoipa::path(
    post,
    path = "/arrange",
    request_body = ArrangeRequest,
    responses(
        (status = 200, description = "Arrangement computed", body = ArrangeResponse),
        (status = UNPROCESSABLE_ENTITY, description = "Invalid room or furniture", body = ErrorResponse)
    ),
    tag = "planning"
)]
async fn handle_arrange(
    State(state): State<ApiState>,
    payload: Result<Json<ArrangeRequest>, JsonRejection>,
) -> Response {
    let request = match parse_arrange_request(payload) {
        Ok(request) => request,
        Err(response) => return response,
    };

    let config = match request.arrangement_config(state.optimizer_config.arrangement_config()) {
        Ok(config) => config,
        Err(err) => return validation_error(err),
    };
    info!(
        items = request.furniture.len(),
        features = request.layout.features.len(),
        trials = config.max_iterations,
        "📥 New arrangement request"
    );

    let ValidatedArrangeRequest {
        layout, furniture, ..
    } = request;
    let room = layout.dimensions;

    let outcome =
        tokio::task::spawn_blocking(move || arrange_with_config(&furniture, &layout, config)).await;

    match outcome {
        Ok(result) => {
            info!(
                placed = result.placed_count(),
                unplaced = result.unplaced_count(),
                total_score = result.total_score,
                "🛋️ Arrangement ready"
            );
            (
                StatusCode::OK,
                Json(ArrangeResponse::from_result(result, &room)),
            )
                .into_response()
        }
        Err(err) => {
            error!(error = %err, "arrangement task failed");
            error_response(
                StatusCode::INTERNAL_SERVER_ERROR,
                "Arrangement failed",
                err.to_string(),
            )
        }
    }
}

/// Handler for POST /arrange_stream (SSE).
///
/// Streams search events as they happen so a client can animate the search.
#[utoipa::path(
    post,
    path = "/arrange_stream",
    request_body = ArrangeRequest,
    responses(
        (status = 200, description = "Streams arrangement events", content_type = "text/event-stream", body = String),
        (status = UNPROCESSABLE_ENTITY, description = "Invalid room or furniture", body = ErrorResponse)
    ),
    tag = "planning"
)]
async fn handle_arrange_stream(
    State(state): State<ApiState>,
    payload: Result<Json<ArrangeRequest>, JsonRejection>,
) -> Response {
    let request = match parse_arrange_request(payload) {
        Ok(request) => request,
        Err(response) => return response,
    };

    let config = match request.arrangement_config(state.optimizer_config.arrangement_config()) {
        Ok(config) => config,
        Err(err) => return validation_error(err),
    };
    let ValidatedArrangeRequest {
        layout, furniture, ..
    } = request;

    let (tx, rx) = mpsc::channel::<String>(32);

    tokio::task::spawn_blocking(move || {
        let _ = arrange_with_progress(&furniture, &layout, config, |evt| {
            if let Ok(json) = serde_json::to_string(evt) {
                // A closed receiver means the client left; remaining events are discarded.
                let _ = tx.blocking_send(json);
            }
        });
    });

    let stream = ReceiverStream::new(rx)
        .map(|msg| Ok::<_, std::convert::Infallible>(Event::default().data(msg)));
    Sse::new(stream)
        .keep_alive(
            KeepAlive::new()
                .interval(std::time::Duration::from_secs(10))
                .text("keep-alive"),
        )
        .into_response()
}

/// Handler for POST /fits.
///
/// Answers whether an item fits anywhere in the room next to existing furniture.
#[utoipa::path(
    post,
    path = "/fits",
    request_body = FitsRequest,
    responses(
        (status = 200, description = "Fit check result", body = FitsResponse),
        (status = UNPROCESSABLE_ENTITY, description = "Invalid room or furniture", body = ErrorResponse)
    ),
    tag = "planning"
)]
async fn handle_fits(
    State(state): State<ApiState>,
    payload: Result<Json<FitsRequest>, JsonRejection>,
) -> Response {
    let Json(request) = match payload {
        Ok(payload) => payload,
        Err(err) => return json_deserialize_error(err),
    };

    let room = match request.room.validated() {
        Ok(room) => room,
        Err(err) => return validation_error(RequestValidationError::InvalidRoom(err)),
    };
    let item = match request.item.validated() {
        Ok(item) => item,
        Err(err) => return validation_error(RequestValidationError::InvalidFurniture(err)),
    };
    let existing = match request
        .existing
        .into_iter()
        .map(PlacementDto::into_placement)
        .collect::<Result<Vec<_>, _>>()
    {
        Ok(existing) => existing,
        Err(err) => return validation_error(RequestValidationError::InvalidFurniture(err)),
    };

    let config = state.optimizer_config.arrangement_config();
    if let Err(err) = config.check_grid(&room) {
        return validation_error(RequestValidationError::InvalidRoom(err));
    }

    let outcome = tokio::task::spawn_blocking(move || {
        does_furniture_fit_with_config(&item, &room, &existing, &config)
    })
    .await;

    match outcome {
        Ok(fits) => (StatusCode::OK, Json(FitsResponse { fits })).into_response(),
        Err(err) => {
            error!(error = %err, "fit check task failed");
            error_response(
                StatusCode::INTERNAL_SERVER_ERROR,
                "Fit check failed",
                err.to_string(),
            )
        }
    }
}

/// Handler for GET /catalog.
#[utoipa::path(
    get,
    path = "/catalog",
    responses((status = 200, description = "Furniture catalog", body = [FurnitureItem])),
    tag = "planning"
)]
async fn handle_catalog(State(state): State<ApiState>) -> Json<Vec<FurnitureItem>> {
    Json(state.catalog.as_ref().clone())
}

async fn serve_openapi_json() -> impl IntoResponse {
    Json(openapi_doc())
}

async fn serve_openapi_ui() -> impl IntoResponse {
    Html(SWAGGER_UI_HTML)
}
