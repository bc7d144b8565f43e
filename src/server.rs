use crate::card;
use crate::config::Config;
use crate::error::{ErrorKind, GenerationError};
use crate::models::{GenerationRequest, GenerationResult};
use crate::page::{render_page, PageView};
use crate::studio::{Studio, SubmitOutcome};
use actix_web::http::header::{self, ContentDisposition, DispositionParam, DispositionType};
use actix_web::http::StatusCode;
use actix_web::{middleware, web, App, HttpResponse, HttpServer, Responder};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tokio::sync::RwLock;

pub struct AppState {
    pub studio: Arc<Studio>,
    pub http: reqwest::Client,
    last_form: RwLock<GenerationRequest>,
}

impl AppState {
    pub fn new(studio: Arc<Studio>) -> Self {
        Self {
            studio,
            http: reqwest::Client::new(),
            last_form: RwLock::new(GenerationRequest::default()),
        }
    }
}

#[derive(Deserialize)]
struct FormInput {
    #[serde(default)]
    prompt: String,
    #[serde(default)]
    archetype: Option<String>,
    #[serde(default)]
    aspect_ratio: Option<String>,
}

impl FormInput {
    fn into_request(self) -> Result<GenerationRequest, String> {
        let mut request = GenerationRequest::new(self.prompt);
        if let Some(archetype) = self.archetype.filter(|a| !a.is_empty()) {
            request = request.with_archetype(archetype.parse()?);
        }
        if let Some(ratio) = self.aspect_ratio.filter(|r| !r.is_empty()) {
            request = request.with_aspect_ratio(ratio.parse()?);
        }
        Ok(request)
    }
}

#[derive(Serialize)]
struct ErrorBody {
    kind: ErrorKind,
    message: String,
}

#[derive(Serialize)]
struct StatusBody {
    busy: bool,
    message: Option<&'static str>,
    error: Option<String>,
}

pub fn error_status(err: &GenerationError) -> StatusCode {
    match err.kind() {
        ErrorKind::Authentication => StatusCode::UNAUTHORIZED,
        ErrorKind::RateLimited => StatusCode::TOO_MANY_REQUESTS,
        ErrorKind::ContentPolicy => StatusCode::UNPROCESSABLE_ENTITY,
        ErrorKind::MissingImageData | ErrorKind::Unknown => StatusCode::BAD_GATEWAY,
    }
}

pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.route("/", web::get().to(index))
        .route("/generate", web::post().to(generate_form))
        .route("/download/{id}", web::get().to(download))
        .service(
            web::scope("/api")
                .route("/generate", web::post().to(generate_json))
                .route("/gallery", web::get().to(gallery))
                .route("/status", web::get().to(status)),
        );
}

async fn index(state: web::Data<AppState>) -> impl Responder {
    let form = state.last_form.read().await.clone();
    let entries = state.studio.gallery().entries().await;
    let busy_message = state.studio.busy_message().await;
    let error = state.studio.last_error().await;

    let html = render_page(&PageView {
        form: &form,
        busy_message,
        error: error.as_deref(),
        entries: &entries,
    });
    HttpResponse::Ok()
        .content_type(header::ContentType::html())
        .body(html)
}

async fn generate_form(
    state: web::Data<AppState>,
    input: web::Form<FormInput>,
) -> impl Responder {
    let request = match input.into_inner().into_request() {
        Ok(request) => request,
        Err(e) => return HttpResponse::BadRequest().body(e),
    };

    if state.studio.spawn_submit(request.clone()) {
        *state.last_form.write().await = request;
    } else {
        log::debug!("Form submission dropped while busy");
    }

    HttpResponse::SeeOther()
        .insert_header((header::LOCATION, "/"))
        .finish()
}

async fn generate_json(
    state: web::Data<AppState>,
    request: web::Json<GenerationRequest>,
) -> impl Responder {
    match state.studio.submit(request.into_inner()).await {
        SubmitOutcome::Recorded(result) => HttpResponse::Ok().json(result),
        SubmitOutcome::Busy => HttpResponse::Conflict().json(StatusBody {
            busy: true,
            message: state.studio.busy_message().await,
            error: None,
        }),
        SubmitOutcome::Failed(err) => HttpResponse::build(error_status(&err)).json(ErrorBody {
            kind: err.kind(),
            message: err.user_message(),
        }),
    }
}

async fn gallery(state: web::Data<AppState>) -> impl Responder {
    let entries: Vec<GenerationResult> = state.studio.gallery().entries().await;
    HttpResponse::Ok().json(entries)
}

async fn status(state: web::Data<AppState>) -> impl Responder {
    HttpResponse::Ok().json(StatusBody {
        busy: state.studio.is_busy(),
        message: state.studio.busy_message().await,
        error: state.studio.last_error().await,
    })
}

async fn download(state: web::Data<AppState>, path: web::Path<String>) -> impl Responder {
    let id = path.into_inner();
    let Some(entry) = state.studio.gallery().get(&id).await else {
        return HttpResponse::NotFound().body(format!("No image with id {}", id));
    };

    match card::download(&state.http, &entry.image_reference, &entry.id).await {
        Ok(download) => HttpResponse::Ok()
            .content_type(download.content_type)
            .insert_header(ContentDisposition {
                disposition: DispositionType::Attachment,
                parameters: vec![DispositionParam::Filename(download.filename)],
            })
            .body(download.bytes),
        Err(e) => {
            log::error!("❌ Download of {} failed: {}", id, e);
            HttpResponse::BadGateway().body(e.to_string())
        }
    }
}

pub async fn run(config: &Config, studio: Arc<Studio>) -> std::io::Result<()> {
    let state = web::Data::new(AppState::new(studio));

    HttpServer::new(move || {
        App::new()
            .app_data(state.clone())
            .wrap(middleware::Logger::default())
            .configure(configure)
    })
    .bind(config.bind_address())?
    .run()
    .await
}
