use actix_cors::Cors;
use actix_files::Files;
use actix_web::middleware::{DefaultHeaders, Logger};
use actix_web::{http::header, web, App, HttpServer};
use diabetes_inferences::InferenceModel;
use diabetes_predictor::config::ServerConfig;
use diabetes_predictor::routes;
use log::{error, info};

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .format_timestamp_millis()
        .format_module_path(false)
        .init();

    info!("🚀 Starting the diabetes prediction service");

    let config = ServerConfig::from_env();

    // Without a model there is nothing to serve.
    let model = match InferenceModel::load(&config.model_path) {
        Ok(model) => {
            info!("✅ Model loaded: {}", model.info().detail);
            model
        }
        Err(e) => {
            error!("❌ {}", e);
            return Err(std::io::Error::other(format!(
                "failed to load model artifact: {e}"
            )));
        }
    };
    let model_data = web::Data::new(model);

    let bind_address = config.bind_address();
    let allowed_origins = config.allowed_origins.clone();
    let static_dir = config.static_dir.clone();

    info!("🌐 Server listening on: http://{}", bind_address);
    info!("👷 Workers: {}", config.workers);
    info!("🔒 CORS origins: {}", allowed_origins.join(", "));
    info!("🔧 Routes:");
    info!("   GET  /                 - Prediction form and hospital map");
    info!("   POST /                 - Submit the form");
    info!("   GET  /api/health       - Health check");
    info!("   GET  /api/model-info   - Loaded model");
    info!("   GET  /api/form         - Form fields");
    info!("   GET  /api/map          - Hospital map");
    info!("   POST /api/predict      - JSON prediction");

    HttpServer::new(move || {
        let cors = allowed_origins
            .iter()
            .fold(Cors::default(), |cors, origin| cors.allowed_origin(origin))
            .allowed_methods(vec!["GET", "POST"])
            .allowed_headers(vec![header::CONTENT_TYPE])
            .max_age(3600);

        App::new()
            .wrap(Logger::default())
            .wrap(DefaultHeaders::new().add(("X-Content-Type-Options", "nosniff")))
            .wrap(cors)
            .app_data(model_data.clone())
            .configure(routes::configure)
            .service(Files::new("/static", &static_dir).prefer_utf8(true))
            .default_service(web::route().to(routes::not_found))
    })
    .workers(config.workers)
    .bind(&bind_address)?
    .run()
    .await
}
