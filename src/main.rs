use actix_web::{get, web, App, HttpResponse, HttpServer, Responder};
use serde::Deserialize;
use splunk_otel::instrumentation::splunkhttp::{with_otel_opts, OtelOption, SplunkHttp};
use std::{env, io};
use tracing::{info, warn};

#[derive(Deserialize)]
struct HelloQuery {
    user: Option<String>,
}

#[get("/")]
#[tracing::instrument(skip(query), fields(user))]
async fn hello(query: web::Query<HelloQuery>) -> impl Responder {
    let user = query.user.as_deref().unwrap_or("anonymous");
    tracing::Span::current().record("user", user);
    info!(user = user, "Hello endpoint called");
    HttpResponse::Ok().body(format!("Hello, {}!", user))
}

#[get("/health")]
async fn health() -> impl Responder {
    HttpResponse::Ok().body("ok")
}

#[tokio::main]
async fn main() -> io::Result<()> {
    // Endpoints come from SPLUNK_REALM or OTEL_EXPORTER_OTLP_* variables
    let sdk = splunk_otel::distro::init().map_err(io::Error::other)?;

    let port: u16 = env::var("PORT")
        .unwrap_or_else(|_| "8080".to_string())
        .parse()
        .map_err(|e| io::Error::new(io::ErrorKind::InvalidInput, format!("PORT: {e}")))?;

    info!("Starting server on port {}", port);

    let result = HttpServer::new(|| {
        App::new()
            .wrap(SplunkHttp::new(
                "splunk-otel-demo",
                [with_otel_opts([
                    OtelOption::filter(|req| req.path() != "/health"),
                    OtelOption::span_name_formatter(|_, req| {
                        format!(
                            "{} {}",
                            req.method(),
                            req.match_pattern().unwrap_or_else(|| req.path().to_string())
                        )
                    }),
                ])],
            ))
            .service(hello)
            .service(health)
    })
    .bind(("0.0.0.0", port))?
    .run()
    .await;

    if let Err(e) = sdk.shutdown() {
        warn!(error = %e, "telemetry shutdown failed");
    }
    result
}
