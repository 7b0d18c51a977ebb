use crate::errors::AppError;
use crate::form::{self, FORM_FIELDS};
use crate::map::hospital_map;
use crate::models::{ApiResponse, PatientRecord, PredictionResult};
use crate::predictor;
use crate::render::{render_page, FormValues, Notice, Page};
use actix_web::error::JsonPayloadError;
use actix_web::http::StatusCode;
use actix_web::{web, HttpRequest, HttpResponse, Responder};
use diabetes_inferences::InferenceModel;
use log::{error, info, warn};
use std::time::Instant;

pub type ModelData = web::Data<InferenceModel>;

const JSON_LIMIT: usize = 64 * 1024;

/// Registers the page and the JSON API.
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.route("/", web::get().to(index))
        .route("/", web::post().to(submit))
        .service(
            web::scope("/api")
                .app_data(
                    web::JsonConfig::default()
                        .limit(JSON_LIMIT)
                        .error_handler(json_error),
                )
                .route("/health", web::get().to(health_check))
                .route("/model-info", web::get().to(model_info))
                .route("/form", web::get().to(form_schema))
                .route("/map", web::get().to(map_view))
                .route("/predict", web::post().to(predict)),
        );
}

pub async fn not_found() -> impl Responder {
    HttpResponse::NotFound().json(ApiResponse::<()>::error("Endpoint not found"))
}

/// Answers unreadable JSON bodies with the error envelope.
pub fn json_error(err: JsonPayloadError, req: &HttpRequest) -> actix_web::Error {
    warn!("Rejected {} body: {}", req.path(), err);
    AppError::from(err).into()
}

fn page_response(status: StatusCode, values: FormValues<'_>, notice: Option<&Notice>) -> HttpResponse {
    let map = hospital_map();
    let html = render_page(&Page {
        values,
        notice,
        map: &map,
    });
    HttpResponse::build(status)
        .content_type("text/html; charset=utf-8")
        .body(html)
}

async fn index() -> impl Responder {
    page_response(StatusCode::OK, FormValues::Record(&PatientRecord::default()), None)
}

/// Runs the blocking model query off the async workers.
async fn run_prediction(model: ModelData, record: PatientRecord) -> Result<PredictionResult, AppError> {
    let result = web::block(move || predictor::predict(&model, &record)).await??;
    Ok(result)
}

async fn submit(model: ModelData, fields: web::Form<Vec<(String, String)>>) -> impl Responder {
    let record = match form::collect(&fields) {
        Ok(record) => record,
        Err(e) => {
            warn!("Rejected form submission: {}", e);
            let notice = Notice::Error(AppError::from(e).to_string());
            return page_response(
                StatusCode::BAD_REQUEST,
                FormValues::Submitted(&fields),
                Some(&notice),
            );
        }
    };

    match run_prediction(model, record).await {
        Ok(result) => page_response(
            StatusCode::OK,
            FormValues::Record(&record),
            Some(&Notice::Prediction(result)),
        ),
        Err(e) => {
            error!("Prediction failed: {}", e);
            page_response(
                StatusCode::INTERNAL_SERVER_ERROR,
                FormValues::Record(&record),
                Some(&Notice::Error(e.to_string())),
            )
        }
    }
}

async fn health_check() -> impl Responder {
    HttpResponse::Ok().json(ApiResponse::success("✅ Diabetes prediction API"))
}

async fn model_info(model: ModelData) -> impl Responder {
    HttpResponse::Ok().json(ApiResponse::success(model.info()))
}

async fn form_schema() -> impl Responder {
    HttpResponse::Ok().json(ApiResponse::success(FORM_FIELDS))
}

async fn map_view() -> impl Responder {
    HttpResponse::Ok().json(ApiResponse::success(hospital_map()))
}

async fn predict(
    model: ModelData,
    record: web::Json<PatientRecord>,
) -> Result<HttpResponse, AppError> {
    let started = Instant::now();
    let record = record.into_inner();
    if let Err(e) = form::validate(&record) {
        warn!("Rejected prediction request: {}", e);
        return Err(e.into());
    }

    info!("New prediction request");
    let result = run_prediction(model, record).await?;
    Ok(HttpResponse::Ok().json(ApiResponse::success(result).timed(started)))
}
