// 🌐 Web Surface - HTML form plus a small JSON API
//
// Routes:
//   GET  /               form with default values
//   POST /predict        form submission, re-rendered with the result line
//   GET  /api/health     health check
//   GET  /api/features   ordered features, categories and bounds
//   GET  /api/artifacts  loaded artifact manifest
//   POST /api/predict    JSON prediction

use crate::error::{ErrorKind, PredictError};
use crate::features::{CategoricalFeature, Feature, UserInput};
use crate::models::ModelKind;
use crate::predictor::{Prediction, PredictionContext};
use axum::{
    extract::State,
    http::StatusCode,
    response::{Html, IntoResponse, Json},
    routing::{get, post},
    Form, Router,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use uuid::Uuid;

/// Shared application state. The context is immutable, so no lock.
#[derive(Clone)]
pub struct AppState {
    ctx: Arc<PredictionContext>,
}

impl AppState {
    pub fn new(ctx: PredictionContext) -> Self {
        AppState { ctx: Arc::new(ctx) }
    }
}

// ============================================================================
// API TYPES
// ============================================================================

/// API Response wrapper
#[derive(Debug, Serialize, Deserialize)]
pub struct ApiResponse<T> {
    pub success: bool,
    pub data: Option<T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl<T> ApiResponse<T> {
    fn ok(data: T) -> Self {
        Self {
            success: true,
            data: Some(data),
            error: None,
        }
    }

    fn err(message: String) -> Self {
        Self {
            success: false,
            data: None,
            error: Some(message),
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct PredictRequest {
    pub model: ModelKind,
    pub input: UserInput,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct PredictionResponse {
    pub request_id: Uuid,
    pub model: ModelKind,
    pub label: u8,
    pub prediction: String,
    pub line: String,
    pub encoded: Vec<f64>,
}

impl PredictionResponse {
    fn new(request_id: Uuid, prediction: &Prediction) -> Self {
        Self {
            request_id,
            model: prediction.model,
            label: prediction.label.class(),
            prediction: prediction.label.message().to_string(),
            line: prediction.line(),
            encoded: prediction.encoded.as_slice().to_vec(),
        }
    }
}

#[derive(Debug, Serialize)]
struct FeatureResponse {
    name: &'static str,
    label: &'static str,
    index: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    categories: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    min: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    max: Option<i64>,
}

/// Form body posted by the HTML page. Every field arrives as raw text so a
/// bad value is reported on the re-rendered page instead of rejected by the extractor.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct PredictForm {
    pub age: String,
    pub workclass: String,
    pub education: String,
    pub marital_status: String,
    pub occupation: String,
    pub relationship: String,
    pub race: String,
    pub sex: String,
    pub hours_per_week: String,
    pub model: String,
}

impl PredictForm {
    /// Prefill from a typed record, e.g. the page defaults
    pub fn from_input(input: &UserInput) -> Self {
        PredictForm {
            age: input.age.to_string(),
            workclass: input.workclass.clone(),
            education: input.education.clone(),
            marital_status: input.marital_status.clone(),
            occupation: input.occupation.clone(),
            relationship: input.relationship.clone(),
            race: input.race.clone(),
            sex: input.sex.clone(),
            hours_per_week: input.hours_per_week.to_string(),
            model: String::new(),
        }
    }

    pub fn category(&self, feature: CategoricalFeature) -> &str {
        match feature {
            CategoricalFeature::Workclass => &self.workclass,
            CategoricalFeature::Education => &self.education,
            CategoricalFeature::MaritalStatus => &self.marital_status,
            CategoricalFeature::Occupation => &self.occupation,
            CategoricalFeature::Relationship => &self.relationship,
            CategoricalFeature::Race => &self.race,
            CategoricalFeature::Sex => &self.sex,
        }
    }

    /// Parse the raw fields into a typed record and the chosen model
    pub fn parse(&self) -> Result<(UserInput, ModelKind), PredictError> {
        let model = self
            .model
            .parse::<ModelKind>()
            .map_err(|reason| PredictError::InvalidField {
                field: "model",
                value: self.model.clone(),
                reason,
            })?;

        let input = UserInput {
            age: parse_whole_number("age", &self.age)?,
            workclass: self.workclass.clone(),
            education: self.education.clone(),
            marital_status: self.marital_status.clone(),
            occupation: self.occupation.clone(),
            relationship: self.relationship.clone(),
            race: self.race.clone(),
            sex: self.sex.clone(),
            hours_per_week: parse_whole_number("hours-per-week", &self.hours_per_week)?,
        };
        Ok((input, model))
    }
}

fn parse_whole_number(field: &'static str, raw: &str) -> Result<i64, PredictError> {
    raw.trim()
        .parse::<i64>()
        .map_err(|_| PredictError::InvalidField {
            field,
            value: raw.to_string(),
            reason: "expected a whole number".to_string(),
        })
}

// ============================================================================
// PREDICTION (shared by both surfaces)
// ============================================================================

/// Run one prediction inside a request span; failures are logged, never raised
fn run_prediction(
    ctx: &PredictionContext,
    request_id: Uuid,
    input: &UserInput,
    model: ModelKind,
) -> Result<Prediction, PredictError> {
    let span = tracing::info_span!("predict", %request_id, model = %model);
    let _guard = span.enter();

    match ctx.predict(input, model) {
        Ok(prediction) => {
            tracing::info!(label = %prediction.label, "prediction served");
            Ok(prediction)
        }
        Err(e) => {
            tracing::warn!(kind = ?e.kind(), error = %e, "prediction withheld");
            Err(e)
        }
    }
}

fn status_for(err: &PredictError) -> StatusCode {
    match err.kind() {
        ErrorKind::Input | ErrorKind::Transform | ErrorKind::MissingEncoderKey => {
            StatusCode::UNPROCESSABLE_ENTITY
        }
        ErrorKind::Artifact => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

// ============================================================================
// API Handlers
// ============================================================================

/// GET /api/health - Health check
async fn health_check() -> impl IntoResponse {
    Json(ApiResponse::ok("OK"))
}

/// GET /api/features - Features in vector order
async fn get_features(State(state): State<AppState>) -> impl IntoResponse {
    let features: Vec<FeatureResponse> = Feature::ALL
        .iter()
        .map(|feature| {
            let bounds = feature.bounds();
            FeatureResponse {
                name: feature.column(),
                label: feature.label(),
                index: feature.index(),
                categories: feature
                    .categorical()
                    .map(|cat| state.ctx.categories(cat).to_vec()),
                min: bounds.map(|(min, _)| min),
                max: bounds.map(|(_, max)| max),
            }
        })
        .collect();

    Json(ApiResponse::ok(features))
}

/// GET /api/artifacts - What the server is serving
async fn get_artifacts(State(state): State<AppState>) -> impl IntoResponse {
    Json(ApiResponse::ok(state.ctx.manifest().clone()))
}

/// POST /api/predict - JSON prediction
async fn api_predict(
    State(state): State<AppState>,
    Json(request): Json<PredictRequest>,
) -> impl IntoResponse {
    let request_id = Uuid::new_v4();

    match run_prediction(&state.ctx, request_id, &request.input, request.model) {
        Ok(prediction) => (
            StatusCode::OK,
            Json(ApiResponse::ok(PredictionResponse::new(request_id, &prediction))),
        )
            .into_response(),
        Err(e) => (
            status_for(&e),
            Json(ApiResponse::<PredictionResponse>::err(e.user_message())),
        )
            .into_response(),
    }
}

// ============================================================================
// HTML Handlers
// ============================================================================

/// GET / - Empty form
async fn serve_index(State(state): State<AppState>) -> impl IntoResponse {
    let form = PredictForm::from_input(&state.ctx.default_input());
    Html(render_page(&state.ctx, &form, None))
}

/// POST /predict - Form submission
async fn submit_form(
    State(state): State<AppState>,
    Form(form): Form<PredictForm>,
) -> impl IntoResponse {
    let request_id = Uuid::new_v4();

    let outcome = match form.parse() {
        Ok((input, model)) => run_prediction(&state.ctx, request_id, &input, model),
        Err(e) => {
            tracing::warn!(%request_id, error = %e, "form rejected");
            Err(e)
        }
    }
    .map(|p| p.line())
    .map_err(|e| e.user_message());

    Html(render_page(&state.ctx, &form, Some(outcome)))
}

// ============================================================================
// HTML RENDERING
// ============================================================================

fn escape_html(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            other => out.push(other),
        }
    }
    out
}

fn number_field(html: &mut String, feature: Feature, name: &str, value: &str) {
    let (min, max) = feature.bounds().unwrap_or((i64::MIN, i64::MAX));
    html.push_str(&format!(
        "<label>{label}<input type=\"number\" name=\"{name}\" min=\"{min}\" max=\"{max}\" step=\"1\" value=\"{value}\" required></label>\n",
        label = feature.label(),
        value = escape_html(value),
    ));
}

fn select_field(html: &mut String, ctx: &PredictionContext, feature: CategoricalFeature, selected: &str) {
    html.push_str(&format!(
        r#"<label>{}<select name="{}">"#,
        feature.label(),
        feature.field_name()
    ));
    for class in ctx.categories(feature) {
        let escaped = escape_html(class);
        let marker = if class == selected { " selected" } else { "" };
        html.push_str(&format!(r#"<option value="{0}"{1}>{0}</option>"#, escaped, marker));
    }
    html.push_str("</select></label>\n");
}

/// Whole page: form keeps the submitted values, result or error below it
pub fn render_page(
    ctx: &PredictionContext,
    form: &PredictForm,
    outcome: Option<Result<String, String>>,
) -> String {
    let mut html = String::new();
    html.push_str(concat!(
        "<!DOCTYPE html>\n<html lang=\"en\">\n<head>\n",
        "<meta charset=\"utf-8\">\n<title>Income Prediction App</title>\n",
        "<style>body{font-family:sans-serif;max-width:40rem;margin:2rem auto}",
        "label{display:block;margin:.5rem 0}input,select{margin-left:.5rem}",
        ".result{font-weight:bold}.error{color:#b00020}</style>\n",
        "</head>\n<body>\n<h1>Income Prediction App</h1>\n",
        "<form method=\"post\" action=\"/predict\">\n",
    ));

    number_field(&mut html, Feature::Age, "age", &form.age);
    for feature in CategoricalFeature::ALL {
        select_field(&mut html, ctx, feature, form.category(feature));
    }
    number_field(&mut html, Feature::HoursPerWeek, "hours_per_week", &form.hours_per_week);

    for model in ModelKind::ALL {
        html.push_str(&format!(
            "<button type=\"submit\" name=\"model\" value=\"{}\">{}</button>\n",
            model.as_str(),
            model.action_label()
        ));
    }
    html.push_str("</form>\n");

    match outcome {
        Some(Ok(line)) => {
            html.push_str(&format!("<p class=\"result\">{}</p>\n", escape_html(&line)));
        }
        Some(Err(message)) => {
            html.push_str(&format!("<p class=\"error\">{}</p>\n", escape_html(&message)));
        }
        None => {}
    }

    html.push_str("</body>\n</html>\n");
    html
}

// ============================================================================
// ROUTER
// ============================================================================

pub fn router(state: AppState) -> Router {
    let api_routes = Router::new()
        .route("/health", get(health_check))
        .route("/features", get(get_features))
        .route("/artifacts", get(get_artifacts))
        .route("/predict", post(api_predict))
        .with_state(state.clone());

    Router::new()
        .route("/", get(serve_index))
        .route("/predict", post(submit_form))
        .with_state(state)
        .nest("/api", api_routes)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
}

// ============================================================================
// TESTS
// ============================================================================
