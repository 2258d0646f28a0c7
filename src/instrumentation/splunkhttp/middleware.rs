use std::future::{ready, Ready};
use std::sync::Arc;

use actix_web::body::{EitherBody, MessageBody};
use actix_web::dev::{forward_ready, Service, ServiceRequest, ServiceResponse, Transform};
use actix_web::http::header::{HeaderMap, HeaderName, HeaderValue};
use actix_web::Error;
use futures_util::future::LocalBoxFuture;
use opentelemetry::propagation::Extractor;
use opentelemetry::trace::{SpanContext, TraceContextExt};
use opentelemetry_semantic_conventions::attribute::HTTP_RESPONSE_STATUS_CODE;
use tracing::{debug, Instrument, Span};
use tracing_opentelemetry::OpenTelemetrySpanExt;

use crate::instrumentation::splunkhttp::config::{Config, HttpOption};

pub const SERVER_TIMING_HEADER: &str = "server-timing";
pub const EXPOSE_HEADERS_HEADER: &str = "access-control-expose-headers";

/// `Server-Timing` value carrying the W3C trace context of `span_context`
pub fn trace_parent_header(span_context: &SpanContext) -> String {
    format!(
        r#"traceparent;desc="00-{:032x}-{:016x}-{:02x}""#,
        span_context.trace_id(),
        span_context.span_id(),
        span_context.trace_flags().to_u8()
    )
}

/// Middleware tracing each request in a server span and, unless disabled,
/// returning its trace context in the `Server-Timing` response header.
///
/// ```rust,ignore
/// App::new()
///     .wrap(SplunkHttp::new("my-service", [with_server_timing(true)]))
///     .service(hello)
/// ```
#[derive(Debug, Clone)]
pub struct SplunkHttp {
    operation: Arc<str>,
    config: Arc<Config>,
}

impl SplunkHttp {
    /// Configure from the process environment, then `opts`
    pub fn new(operation: impl Into<String>, opts: impl IntoIterator<Item = HttpOption>) -> Self {
        Self::from_config(operation, Config::new(opts))
    }

    /// Use an already built `config`
    pub fn from_config(operation: impl Into<String>, config: Config) -> Self {
        Self {
            operation: Arc::from(operation.into()),
            config: Arc::new(config),
        }
    }

    /// Configuration applied to every request
    pub fn config(&self) -> &Config {
        &self.config
    }
}

impl<S, B> Transform<S, ServiceRequest> for SplunkHttp
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    S::Future: 'static,
    B: MessageBody + 'static,
{
    type Response = ServiceResponse<EitherBody<B>>;
    type Error = Error;
    type Transform = SplunkHttpMiddleware<S>;
    type InitError = ();
    type Future = Ready<Result<Self::Transform, Self::InitError>>;

    fn new_transform(&self, service: S) -> Self::Future {
        ready(Ok(SplunkHttpMiddleware {
            service,
            operation: self.operation.clone(),
            config: self.config.clone(),
        }))
    }
}

pub struct SplunkHttpMiddleware<S> {
    service: S,
    operation: Arc<str>,
    config: Arc<Config>,
}

impl<S> SplunkHttpMiddleware<S> {
    fn request_span(&self, req: &ServiceRequest) -> Span {
        let name = self.config.span_name(&self.operation, req);
        let route = req.match_pattern().unwrap_or_else(|| req.path().to_string());
        let user_agent = req
            .headers()
            .get("user-agent")
            .and_then(|v| v.to_str().ok())
            .unwrap_or_default();

        let span = tracing::info_span!(
            "HTTP request",
            otel.name = %name,
            otel.kind = "server",
            otel.status_code = tracing::field::Empty,
            http.request.method = %req.method(),
            http.route = %route,
            url.path = %req.path(),
            url.scheme = %req.connection_info().scheme(),
            user_agent.original = %user_agent,
            http.response.status_code = tracing::field::Empty,
            exception.message = tracing::field::Empty,
        );

        let parent = opentelemetry::global::get_text_map_propagator(|propagator| {
            propagator.extract(&HeaderMapExtractor(req.headers()))
        });

        if self.config.public_endpoint() {
            let remote = parent.span().span_context().clone();
            if remote.is_valid() {
                span.add_link(remote);
            }
        } else {
            if let Err(err) = span.set_parent(parent) {
                debug!(error = ?err, "failed to set parent context");
            }
        }

        span
    }
}

impl<S, B> Service<ServiceRequest> for SplunkHttpMiddleware<S>
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    S::Future: 'static,
    B: MessageBody + 'static,
{
    type Response = ServiceResponse<EitherBody<B>>;
    type Error = Error;
    type Future = LocalBoxFuture<'static, Result<Self::Response, Self::Error>>;

    forward_ready!(service);

    fn call(&self, req: ServiceRequest) -> Self::Future {
        if !self.config.should_trace(&req) {
            let fut = self.service.call(req);
            return Box::pin(async move { fut.await.map(ServiceResponse::map_into_left_body) });
        }

        let span = self.request_span(&req);
        let server_timing = if self.config.server_timing_enabled {
            let span_context = span.context().span().span_context().clone();
            span_context
                .is_valid()
                .then(|| trace_parent_header(&span_context))
        } else {
            None
        };

        let http_req = req.request().clone();
        let fut = span.in_scope(|| self.service.call(req));

        Box::pin(async move {
            let mut res = match fut.instrument(span.clone()).await {
                Ok(res) => res.map_into_left_body(),
                Err(err) => {
                    span.record("otel.status_code", "ERROR");
                    span.record("exception.message", tracing::field::display(&err));
                    // Render the error here so the response still carries the header
                    ServiceResponse::from_err(err, http_req).map_into_right_body()
                }
            };

            let status = res.status();
            span.record(HTTP_RESPONSE_STATUS_CODE, i64::from(status.as_u16()));
            if status.is_server_error() {
                span.record("otel.status_code", "ERROR");
            }
            if let Some(value) = server_timing {
                add_server_timing(res.headers_mut(), &value);
            }
            Ok(res)
        })
    }
}

fn add_server_timing(headers: &mut HeaderMap, value: &str) {
    let Ok(value) = HeaderValue::from_str(value) else {
        return;
    };
    headers.append(
        HeaderName::from_static(EXPOSE_HEADERS_HEADER),
        HeaderValue::from_static("Server-Timing"),
    );
    headers.append(HeaderName::from_static(SERVER_TIMING_HEADER), value);
}

struct HeaderMapExtractor<'a>(&'a HeaderMap);

impl Extractor for HeaderMapExtractor<'_> {
    fn get(&self, key: &str) -> Option<&str> {
        self.0.get(key).and_then(|v| v.to_str().ok())
    }

    fn keys(&self) -> Vec<&str> {
        self.0.keys().map(|k| k.as_str()).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::instrumentation::splunkhttp::config::{
        with_otel_opts, with_server_timing, OtelOption,
    };
    use actix_web::test::{call_service, init_service, TestRequest};
    use actix_web::{web, App, HttpResponse};
    use opentelemetry::trace::{SpanId, TraceFlags, TraceId, TraceState, TracerProvider as _};
    use opentelemetry_sdk::propagation::TraceContextPropagator;
    use opentelemetry_sdk::trace::{InMemorySpanExporter, SdkTracerProvider};
    use std::collections::HashMap;
    use tracing_subscriber::layer::SubscriberExt;

    const TRACE_PARENT: &str = "00-4bf92f3577b34da6a3ce929d0e0e4736-00f067aa0ba902b7-01";

    fn config(opts: Vec<HttpOption>) -> Config {
        Config::with_env(&HashMap::<&str, &str>::new(), opts)
    }

    fn tracing_setup() -> (
        InMemorySpanExporter,
        SdkTracerProvider,
        tracing::subscriber::DefaultGuard,
    ) {
        opentelemetry::global::set_text_map_propagator(TraceContextPropagator::new());
        let exporter = InMemorySpanExporter::default();
        let provider = SdkTracerProvider::builder()
            .with_simple_exporter(exporter.clone())
            .build();
        let layer = tracing_opentelemetry::layer().with_tracer(provider.tracer("splunkhttp-test"));
        let guard = tracing::subscriber::set_default(tracing_subscriber::registry().with(layer));
        (exporter, provider, guard)
    }

    fn header<'a, B>(res: &'a ServiceResponse<B>, name: &str) -> Option<&'a str> {
        res.headers().get(name).and_then(|v| v.to_str().ok())
    }

    #[test]
    fn trace_parent_header_formats_w3c_values() {
        let span_context = SpanContext::new(
            TraceId::from_hex("4bf92f3577b34da6a3ce929d0e0e4736").unwrap(),
            SpanId::from_hex("00f067aa0ba902b7").unwrap(),
            TraceFlags::SAMPLED,
            true,
            TraceState::default(),
        );

        assert_eq!(
            trace_parent_header(&span_context),
            r#"traceparent;desc="00-4bf92f3577b34da6a3ce929d0e0e4736-00f067aa0ba902b7-01""#
        );
    }

    #[actix_web::test]
    async fn adds_server_timing_header() {
        let (_exporter, _provider, _guard) = tracing_setup();
        let app = init_service(
            App::new()
                .wrap(SplunkHttp::from_config("test", config(vec![])))
                .route("/", web::get().to(HttpResponse::Ok)),
        )
        .await;

        let res = call_service(&app, TestRequest::get().uri("/").to_request()).await;

        let timing = header(&res, SERVER_TIMING_HEADER).unwrap();
        assert!(timing.starts_with(r#"traceparent;desc="00-"#));
        assert!(timing.ends_with(r#"-01""#));
        assert_eq!(header(&res, EXPOSE_HEADERS_HEADER), Some("Server-Timing"));
    }

    #[actix_web::test]
    async fn server_timing_continues_incoming_trace() {
        let (_exporter, _provider, _guard) = tracing_setup();
        let app = init_service(
            App::new()
                .wrap(SplunkHttp::from_config("test", config(vec![])))
                .route("/", web::get().to(HttpResponse::Ok)),
        )
        .await;

        let req = TestRequest::get()
            .uri("/")
            .insert_header(("traceparent", TRACE_PARENT))
            .to_request();
        let res = call_service(&app, req).await;

        let timing = header(&res, SERVER_TIMING_HEADER).unwrap();
        assert!(timing.starts_with(r#"traceparent;desc="00-4bf92f3577b34da6a3ce929d0e0e4736-"#));
        assert!(!timing.contains("00f067aa0ba902b7"));
    }

    #[actix_web::test]
    async fn disabled_server_timing_omits_header() {
        let (_exporter, _provider, _guard) = tracing_setup();
        let app = init_service(
            App::new()
                .wrap(SplunkHttp::from_config(
                    "test",
                    config(vec![with_server_timing(false)]),
                ))
                .route("/", web::get().to(HttpResponse::Ok)),
        )
        .await;

        let res = call_service(&app, TestRequest::get().uri("/").to_request()).await;

        assert!(res.status().is_success());
        assert_eq!(header(&res, SERVER_TIMING_HEADER), None);
        assert_eq!(header(&res, EXPOSE_HEADERS_HEADER), None);
    }

    #[actix_web::test]
    async fn no_header_without_opentelemetry_layer() {
        let app = init_service(
            App::new()
                .wrap(SplunkHttp::from_config("test", config(vec![])))
                .route("/", web::get().to(HttpResponse::Ok)),
        )
        .await;

        let res = call_service(&app, TestRequest::get().uri("/").to_request()).await;

        assert!(res.status().is_success());
        assert_eq!(header(&res, SERVER_TIMING_HEADER), None);
    }

    #[actix_web::test]
    async fn filtered_requests_are_not_traced() {
        let (exporter, _provider, _guard) = tracing_setup();
        let opts = vec![with_otel_opts([OtelOption::filter(|req| {
            req.path() != "/health"
        })])];
        let app = init_service(
            App::new()
                .wrap(SplunkHttp::from_config("test", config(opts)))
                .route("/health", web::get().to(HttpResponse::Ok)),
        )
        .await;

        let res =
            call_service(&app, TestRequest::get().uri("/health").to_request()).await;

        assert_eq!(header(&res, SERVER_TIMING_HEADER), None);
        assert!(exporter.get_finished_spans().unwrap().is_empty());
    }

    #[actix_web::test]
    async fn exports_server_span_named_by_formatter() {
        let (exporter, _provider, _guard) = tracing_setup();
        let opts = vec![with_otel_opts([OtelOption::span_name_formatter(
            |operation, req| format!("{operation} {}", req.method()),
        )])];
        let app = init_service(
            App::new()
                .wrap(SplunkHttp::from_config("orders", config(opts)))
                .route("/orders", web::get().to(HttpResponse::InternalServerError)),
        )
        .await;

        let res =
            call_service(&app, TestRequest::get().uri("/orders").to_request()).await;
        assert!(res.status().is_server_error());
        drop(res);

        let spans = exporter.get_finished_spans().unwrap();
        assert_eq!(spans.len(), 1);
        let span = &spans[0];
        assert_eq!(span.name, "orders GET");
        assert_eq!(span.span_kind, opentelemetry::trace::SpanKind::Server);
        assert!(matches!(span.status, opentelemetry::trace::Status::Error { .. }));
        assert!(span.attributes.iter().any(|kv| {
            kv.key.as_str() == HTTP_RESPONSE_STATUS_CODE && kv.value == opentelemetry::Value::I64(500)
        }));
    }

    #[actix_web::test]
    async fn error_responses_carry_server_timing() {
        let (exporter, _provider, _guard) = tracing_setup();
        let app = init_service(
            App::new()
                .wrap_fn(|_req, _srv| async {
                    Err::<ServiceResponse, _>(actix_web::error::ErrorUnauthorized("no token"))
                })
                .wrap(SplunkHttp::from_config("test", config(vec![])))
                .route("/", web::get().to(HttpResponse::Ok)),
        )
        .await;

        let res = call_service(&app, TestRequest::get().uri("/").to_request()).await;
        assert_eq!(res.status(), actix_web::http::StatusCode::UNAUTHORIZED);
        let timing = header(&res, SERVER_TIMING_HEADER).unwrap().to_string();
        assert_eq!(header(&res, EXPOSE_HEADERS_HEADER), Some("Server-Timing"));
        drop(res);

        let spans = exporter.get_finished_spans().unwrap();
        assert_eq!(spans.len(), 1);
        let span = &spans[0];
        assert!(timing.contains(&format!("{:032x}", span.span_context.trace_id())));
        assert!(matches!(span.status, opentelemetry::trace::Status::Error { .. }));
        assert!(span.attributes.iter().any(|kv| {
            kv.key.as_str() == HTTP_RESPONSE_STATUS_CODE && kv.value == opentelemetry::Value::I64(401)
        }));
    }

    #[actix_web::test]
    async fn public_endpoint_links_incoming_trace() {
        let (exporter, _provider, _guard) = tracing_setup();
        let opts = vec![with_otel_opts([OtelOption::PublicEndpoint])];
        let app = init_service(
            App::new()
                .wrap(SplunkHttp::from_config("test", config(opts)))
                .route("/", web::get().to(HttpResponse::Ok)),
        )
        .await;

        let req = TestRequest::get()
            .uri("/")
            .insert_header(("traceparent", TRACE_PARENT))
            .to_request();
        let res = call_service(&app, req).await;
        let timing = header(&res, SERVER_TIMING_HEADER).unwrap().to_string();
        drop(res);

        assert!(!timing.contains("4bf92f3577b34da6a3ce929d0e0e4736"));
        let spans = exporter.get_finished_spans().unwrap();
        assert_eq!(spans.len(), 1);
        assert_eq!(
            spans[0].links.links[0].span_context.trace_id(),
            TraceId::from_hex("4bf92f3577b34da6a3ce929d0e0e4736").unwrap()
        );
    }
}
