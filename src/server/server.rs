use bytes::Bytes;
use chrono_tz::Tz;
use http_body_util::{BodyExt, Full, Limited};
use hyper::{
    body::{Body, Incoming},
    server::conn::http1,
    service::Service,
    Method, Request, Response, StatusCode,
};
use hyper_util::rt::TokioIo;
use serde::{Deserialize, Serialize};
use tokio::net::TcpListener;
use tracing::{debug, error, info, warn};
use url_escape::decode;

use std::{collections::HashMap, future::Future, pin::Pin};

use crate::{
    config::parse_timezone,
    error::Error,
    timing::{instant::EvaluationInstant, schedule::WeeklySchedule, status::OpenStatus},
};

use super::response::{NowResponse, StatusResponse};

/// Largest request body accepted by /api/status.
pub const MAX_BODY_BYTES: usize = 64 * 1024;

/// The Server
///
/// Answers "is this place open now?" for the front end. The place's opening hours are posted
/// with every request; nothing is stored between requests.
///
/// This struct implements the `Service` trait from `hyper`, so each connection gets its own
/// clone. It only carries the time zone used when a request does not bring its own instant.
#[derive(Clone, Debug)]
pub struct Server {
    timezone: Tz,
}

/// The body of a /api/status request.
#[derive(Deserialize, Debug)]
struct StatusRequest {
    #[serde(default, alias = "openingHours")]
    opening_hours: Option<WeeklySchedule>,
    #[serde(default)]
    now: Option<EvaluationInstant>,
}

impl Server {
    pub fn setup(timezone: Tz) -> Self {
        Self { timezone }
    }

    pub fn timezone(&self) -> Tz {
        self.timezone
    }

    /// Parses the query parameters and returns a `hashmap` of key pair values
    /// Returns `None` if the parameters are malformed
    fn parse_params(text: &str) -> Option<HashMap<String, String>> {
        let mut map: HashMap<String, String> = HashMap::new();
        for pairs in text.split('&') {
            let mut iterator = pairs.split('=');
            map.insert(
                iterator.next()?.to_string(),
                decode(iterator.next()?).to_string(),
            );
        }
        Some(map)
    }

    /// Evaluates a /api/status body.
    ///
    /// Uses the instant from the body when there is one, otherwise samples the wall clock in
    /// the server's time zone.
    pub fn evaluate(&self, body: &[u8]) -> Result<StatusResponse, Error> {
        let request: StatusRequest = serde_json::from_slice(body)?;
        let now = request
            .now
            .unwrap_or_else(|| EvaluationInstant::now_in(self.timezone));
        let status = OpenStatus::evaluate(request.opening_hours.as_ref(), now);
        debug!(
            periods = request.opening_hours.as_ref().map_or(0, |s| s.periods().len()),
            day = now.day(),
            time = now.time(),
            "{}",
            status.label()
        );
        Ok(StatusResponse::new(status, now))
    }

    /// The /api/status API endpoint.
    ///
    /// Reads the whole body (up to `MAX_BODY_BYTES`) and hands it to `evaluate`. Bodies that
    /// cannot be read or parsed are a 400.
    async fn status<B>(self, req: Request<B>) -> Result<Response<Full<Bytes>>, hyper::Error>
    where
        B: Body,
        B::Error: std::error::Error + Send + Sync + 'static,
    {
        let body = match Limited::new(req.into_body(), MAX_BODY_BYTES).collect().await {
            Ok(collected) => collected.to_bytes(),
            Err(err) => {
                warn!("Could not read request body: {err}");
                return Self::bad_request("Body unreadable or too large.");
            }
        };

        match self.evaluate(&body) {
            Ok(result) => Self::ok_data(result),
            Err(err) => {
                warn!("Rejected status request: {err}");
                Self::bad_request(&err.to_string())
            }
        }
    }

    /// The /api/now API endpoint.
    ///
    /// Returns the current day and HHMM time in the server's zone, or in the zone named by the
    /// optional `tz` parameter.
    fn current_instant(&self, query: Option<&str>) -> Result<Response<Full<Bytes>>, hyper::Error> {
        let timezone = match query {
            None => self.timezone,
            Some(params) => {
                let Some(map) = Self::parse_params(params) else {
                    return Self::bad_request("Malformed Parameters.");
                };
                match map.get("tz") {
                    None => self.timezone,
                    Some(name) => match parse_timezone(name) {
                        Ok(timezone) => timezone,
                        Err(err) => return Self::bad_request(&err.to_string()),
                    },
                }
            }
        };

        let instant = EvaluationInstant::now_in(timezone);
        Self::ok_data(NowResponse::new(timezone.name().to_string(), instant))
    }

    async fn route<B>(self, req: Request<B>) -> Result<Response<Full<Bytes>>, hyper::Error>
    where
        B: Body,
        B::Error: std::error::Error + Send + Sync + 'static,
    {
        let method = req.method().clone();
        let path = req.uri().path().to_string();
        debug!(%method, %path, "Request");

        match (method, path.as_str()) {
            (Method::POST, "/api/status") => self.status(req).await,
            (Method::GET, "/api/now") => self.current_instant(req.uri().query()),
            _ => Self::not_found(""),
        }
    }

    fn respond(status: StatusCode, body: Bytes) -> Result<Response<Full<Bytes>>, hyper::Error> {
        let has_body = !body.is_empty();
        let mut res = Response::new(Full::new(body));
        *res.status_mut() = status;
        if has_body {
            res.headers_mut().insert(
                hyper::header::CONTENT_TYPE,
                hyper::header::HeaderValue::from_static("application/json"),
            );
        }
        Ok(res)
    }

    fn error_body(message: &str) -> Bytes {
        Bytes::from(serde_json::json!({ "error": message }).to_string())
    }

    /// Return a 200 OK response with the data provided.
    fn ok_data<T: Serialize>(body: T) -> Result<Response<Full<Bytes>>, hyper::Error> {
        match serde_json::to_vec(&body) {
            Ok(data) => Self::respond(StatusCode::OK, Bytes::from(data)),
            Err(err) => Self::server_error(&err.to_string()),
        }
    }

    /// Return a 500 Internal Server Error response with the message provided.
    fn server_error(message: &str) -> Result<Response<Full<Bytes>>, hyper::Error> {
        error!("{message}");
        Self::respond(StatusCode::INTERNAL_SERVER_ERROR, Self::error_body(message))
    }

    /// Return a 404 Not Found response with the message provided. Leave it empty for no message.
    fn not_found(message: &str) -> Result<Response<Full<Bytes>>, hyper::Error> {
        let body = if message.is_empty() {
            Bytes::new()
        } else {
            Self::error_body(message)
        };
        Self::respond(StatusCode::NOT_FOUND, body)
    }

    /// Return a 400 Bad Request response with the message provided.
    fn bad_request(message: &str) -> Result<Response<Full<Bytes>>, hyper::Error> {
        Self::respond(StatusCode::BAD_REQUEST, Self::error_body(message))
    }
}

impl Service<Request<Incoming>> for Server {
    type Response = Response<Full<Bytes>>;
    type Error = hyper::Error;
    type Future = Pin<Box<dyn Future<Output = Result<Self::Response, Self::Error>> + Send>>;

    fn call(&self, req: Request<Incoming>) -> Self::Future {
        Box::pin(self.clone().route(req))
    }
}

/// Accepts connections forever, one task per connection.
pub async fn serve(listener: TcpListener, server: Server) {
    loop {
        let (stream, peer) = match listener.accept().await {
            Ok(connection) => connection,
            Err(err) => {
                warn!("Could not accept connection: {err}");
                continue;
            }
        };
        let io = TokioIo::new(stream);
        let server_clone = server.clone();
        tokio::spawn(async move {
            if let Err(err) = http1::Builder::new()
                .serve_connection(io, server_clone)
                .await
            {
                info!("Connection from {peer} ended with an error: {err}");
            }
        });
    }
}
