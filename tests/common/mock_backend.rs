#![allow(dead_code)]

//! Stand-in booking backend served by rocket on a loopback port.
//!
//! It speaks the same endpoints and field names as the real service, issues JWT
//! bearer tokens for its one seeded user and records every request it receives
//! so tests can assert on what the client actually sent.

use std::net::{Ipv4Addr, TcpListener};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use rocket::config::{LogLevel, Shutdown as ShutdownConfig};
use rocket::form::Form;
use rocket::http::{ContentType, Status};
use rocket::request::{FromRequest, Outcome};
use rocket::serde::json::{json, Json, Value};
use rocket::{get, post, routes, FromForm, Request, Shutdown, State};
use serde::{Deserialize, Serialize};

pub const JWT_SECRET: &str = "mock-backend-secret";
pub const USER_EMAIL: &str = "olena@example.com";
pub const USER_PASSWORD: &str = "secret123";
pub const USER_NAME: &str = "Olena Shevchenko";
pub const BOOKING_REF: &str = "ABC123";
pub const LAST_NAME: &str = "Shevchenko";
pub const TAKEN_SEAT: &str = "13C";

#[derive(Debug, Clone, PartialEq)]
pub struct RecordedRequest {
    pub method: &'static str,
    pub path: String,
    pub content_type: Option<String>,
    pub authorization: Option<String>,
    pub body: Value,
}

#[derive(Debug, Default)]
pub struct BackendState {
    requests: Mutex<Vec<RecordedRequest>>,
    pub broken_airports: AtomicBool,
}

impl BackendState {
    fn record(&self, request: RecordedRequest) {
        self.requests.lock().unwrap().push(request);
    }

    pub fn requests(&self) -> Vec<RecordedRequest> {
        self.requests.lock().unwrap().clone()
    }

    pub fn requests_to(&self, path: &str) -> Vec<RecordedRequest> {
        self.requests()
            .into_iter()
            .filter(|r| r.path == path)
            .collect()
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    pub sub: i32, // user_id
    pub exp: usize,
}

pub fn generate_token(user_id: i32) -> String {
    let expiration = chrono::Utc::now()
        .checked_add_signed(chrono::Duration::hours(24))
        .expect("valid timestamp")
        .timestamp() as usize;
    encode(
        &Header::default(),
        &Claims {
            sub: user_id,
            exp: expiration,
        },
        &EncodingKey::from_secret(JWT_SECRET.as_bytes()),
    )
    .expect("token encodes")
}

#[derive(Debug)]
pub struct AuthenticatedUser {
    pub user_id: i32,
    pub header: String,
}

#[rocket::async_trait]
impl<'r> FromRequest<'r> for AuthenticatedUser {
    type Error = ();

    async fn from_request(request: &'r Request<'_>) -> Outcome<Self, Self::Error> {
        let header = match request.headers().get_one("Authorization") {
            Some(header) if header.starts_with("Bearer ") => header.to_string(),
            _ => return Outcome::Error((Status::Unauthorized, ())),
        };

        match decode::<Claims>(
            &header[7..],
            &DecodingKey::from_secret(JWT_SECRET.as_bytes()),
            &Validation::default(),
        ) {
            Ok(token) => Outcome::Success(AuthenticatedUser {
                user_id: token.claims.sub,
                header,
            }),
            Err(_) => Outcome::Error((Status::Unauthorized, ())),
        }
    }
}

type Reply = (Status, (ContentType, String));

fn json_reply(status: Status, body: Value) -> Reply {
    (status, (ContentType::JSON, body.to_string()))
}

fn text_reply(status: Status, body: &str) -> Reply {
    (status, (ContentType::Plain, body.to_string()))
}

fn user_json() -> Value {
    json!({"full_name": USER_NAME, "email": USER_EMAIL, "phone": "+380441234567"})
}

fn flight_42() -> Value {
    json!({
        "id": 42,
        "plane_id": 7,
        "departure_airport": 1,
        "arrival_airport": 2,
        "departure_time": "2025-06-15 08:00:00",
        "arrival_time": "2025-06-15 10:30:00",
        "status": 1,
        "price": 129.5
    })
}

fn flight_43() -> Value {
    json!({
        "id": 43,
        "plane_id": 8,
        "departure_airport": 1,
        "arrival_airport": 2,
        "departure_time": "2025-06-15 18:00:00",
        "arrival_time": "2025-06-15 20:30:00",
        "status": 5
    })
}

#[get("/airports")]
fn airports(backend: &State<Arc<BackendState>>) -> Reply {
    backend.record(RecordedRequest {
        method: "GET",
        path: "/airports".into(),
        content_type: None,
        authorization: None,
        body: Value::Null,
    });
    if backend.broken_airports.load(Ordering::SeqCst) {
        return text_reply(Status::Ok, "<html>maintenance</html>");
    }
    json_reply(
        Status::Ok,
        json!([
            {"id": 1, "name": "Boryspil", "code": "KBP", "city": "Kyiv", "country": "Ukraine"},
            {"id": 2, "name": "Heathrow", "code": "LHR", "city": "London", "country": "UK"},
            {"id": 3, "name": "Charles de Gaulle", "code": "CDG", "city": "Paris", "country": "France"}
        ]),
    )
}

#[post("/flights/search", data = "<body>")]
fn search_flights(body: Json<Value>, backend: &State<Arc<BackendState>>) -> Reply {
    let body = body.into_inner();
    backend.record(RecordedRequest {
        method: "POST",
        path: "/flights/search".into(),
        content_type: Some("application/json".into()),
        authorization: None,
        body: body.clone(),
    });

    if body["status"] != json!(1) {
        return json_reply(
            Status::BadRequest,
            json!({"message": "Only planned flights can be searched"}),
        );
    }
    let departure_time = body["departure_time"].as_str().unwrap_or_default();
    if chrono::NaiveDateTime::parse_from_str(departure_time, "%Y-%m-%d %H:%M:%S").is_err() {
        return json_reply(Status::BadRequest, json!({"message": "Bad departure_time"}));
    }

    let flights = match (body["departure_airport"].as_i64(), body["arrival_airport"].as_i64()) {
        (Some(1), Some(2)) => json!([flight_42(), flight_43()]),
        (Some(3), _) | (_, Some(3)) => {
            return json_reply(
                Status::ServiceUnavailable,
                json!({"message": "Paris schedule is being updated"}),
            )
        }
        _ => json!([]),
    };
    json_reply(Status::Ok, flights)
}

#[derive(Debug, Deserialize)]
struct Credentials {
    email: String,
    password: String,
}

#[post("/auth/login", data = "<body>")]
fn login(body: Json<Value>, backend: &State<Arc<BackendState>>) -> Reply {
    let body = body.into_inner();
    backend.record(RecordedRequest {
        method: "POST",
        path: "/auth/login".into(),
        content_type: Some("application/json".into()),
        authorization: None,
        body: body.clone(),
    });
    match serde_json::from_value::<Credentials>(body) {
        Ok(c) if c.email == USER_EMAIL && c.password == USER_PASSWORD => json_reply(
            Status::Ok,
            json!({"token": generate_token(1), "user": user_json()}),
        ),
        _ => json_reply(
            Status::Unauthorized,
            json!({"message": "Invalid email or password"}),
        ),
    }
}

#[post("/auth/register", data = "<body>")]
fn register(body: Json<Value>, backend: &State<Arc<BackendState>>) -> Reply {
    let body = body.into_inner();
    backend.record(RecordedRequest {
        method: "POST",
        path: "/auth/register".into(),
        content_type: Some("application/json".into()),
        authorization: None,
        body: body.clone(),
    });
    if body["email"] == json!(USER_EMAIL) {
        return json_reply(Status::Conflict, json!({"message": "Email already registered"}));
    }
    json_reply(
        Status::Ok,
        json!({
            "token": generate_token(2),
            "user": {"full_name": body["full_name"], "email": body["email"], "phone": body["phone"]}
        }),
    )
}

#[get("/auth/me")]
fn me(user: AuthenticatedUser, backend: &State<Arc<BackendState>>) -> Reply {
    backend.record(RecordedRequest {
        method: "GET",
        path: "/auth/me".into(),
        content_type: None,
        authorization: Some(user.header),
        body: Value::Null,
    });
    json_reply(Status::Ok, user_json())
}

#[get("/bookings")]
fn bookings(user: AuthenticatedUser, backend: &State<Arc<BackendState>>) -> Reply {
    backend.record(RecordedRequest {
        method: "GET",
        path: "/bookings".into(),
        content_type: None,
        authorization: Some(user.header),
        body: Value::Null,
    });
    if user.user_id != 1 {
        return json_reply(Status::Ok, json!([]));
    }
    json_reply(
        Status::Ok,
        json!([{
            "id": 7,
            "booking_ref": BOOKING_REF,
            "seat_number": "3A",
            "status": "Booked",
            "flight_id": 42,
            "departure_time": "2025-06-15 08:00:00",
            "departure_airport_code": "KBP",
            "arrival_airport_code": "LHR"
        }]),
    )
}

#[derive(Debug, FromForm)]
struct BookingFields {
    passenger_name: String,
    email: String,
    flight_id: String,
    seat: String,
}

#[post("/", data = "<form>")]
fn book_flight(
    form: Form<BookingFields>,
    content_type: Option<&ContentType>,
    backend: &State<Arc<BackendState>>,
) -> Reply {
    backend.record(RecordedRequest {
        method: "POST",
        path: "/".into(),
        content_type: content_type.map(|ct| ct.to_string()),
        authorization: None,
        body: json!({
            "passenger_name": form.passenger_name,
            "email": form.email,
            "flight_id": form.flight_id,
            "seat": form.seat,
        }),
    });
    if form.seat == TAKEN_SEAT {
        return text_reply(Status::Conflict, "Seat 13C is already taken");
    }
    text_reply(
        Status::Ok,
        &format!(
            "Booking successful for {} on flight {}",
            form.passenger_name, form.flight_id
        ),
    )
}

#[get("/bookings/<reference>?<last_name>")]
fn find_booking(
    reference: String,
    last_name: Option<String>,
    backend: &State<Arc<BackendState>>,
) -> Reply {
    let path = format!("/bookings/{}", reference);
    backend.record(RecordedRequest {
        method: "GET",
        path,
        content_type: None,
        authorization: None,
        body: json!({"last_name": last_name}),
    });
    if reference != BOOKING_REF || last_name.as_deref() != Some(LAST_NAME) {
        return json_reply(Status::NotFound, json!({"message": "Booking not found"}));
    }
    json_reply(
        Status::Ok,
        json!({
            "id": 7,
            "booking_ref": BOOKING_REF,
            "seat_number": "3A",
            "status": "Booked",
            "flights": [
                {"id": 42, "departure_airport_code": "KBP", "arrival_airport_code": "LHR",
                 "departure_time": "2025-06-15 08:00:00", "status": 1, "seat_number": "3A"},
                {"id": 44, "departure_airport_code": "LHR", "arrival_airport_code": "KBP",
                 "departure_time": "2025-06-22 09:15:00", "status": 4, "seat_number": "5B"}
            ]
        }),
    )
}

#[post("/checkin", data = "<body>")]
fn checkin(body: Json<Value>, backend: &State<Arc<BackendState>>) -> Reply {
    let body = body.into_inner();
    backend.record(RecordedRequest {
        method: "POST",
        path: "/checkin".into(),
        content_type: Some("application/json".into()),
        authorization: None,
        body: body.clone(),
    });
    if body["flight_id"] == json!(42) {
        json_reply(Status::Ok, json!({"success": true, "message": "Checked in"}))
    } else {
        json_reply(
            Status::Conflict,
            json!({"message": "Check-in is closed for this flight"}),
        )
    }
}

pub struct MockBackend {
    pub base_url: String,
    pub state: Arc<BackendState>,
    shutdown: Shutdown,
}

fn free_port() -> std::io::Result<u16> {
    let listener = TcpListener::bind((Ipv4Addr::LOCALHOST, 0))?;
    Ok(listener.local_addr()?.port())
}

impl MockBackend {
    pub async fn start() -> anyhow::Result<Self> {
        let port = free_port()?;
        let state = Arc::new(BackendState::default());
        let config = rocket::Config {
            address: Ipv4Addr::LOCALHOST.into(),
            port,
            log_level: LogLevel::Off,
            shutdown: ShutdownConfig {
                ctrlc: false,
                ..Default::default()
            },
            ..rocket::Config::debug_default()
        };

        let rocket = rocket::custom(config)
            .manage(state.clone())
            .mount(
                "/",
                routes![
                    airports,
                    search_flights,
                    login,
                    register,
                    me,
                    bookings,
                    book_flight,
                    find_booking,
                    checkin
                ],
            )
            .ignite()
            .await
            .map_err(|e| anyhow::anyhow!("mock backend failed to ignite: {}", e.kind()))?;
        let shutdown = rocket.shutdown();
        tokio::spawn(async move {
            if let Err(e) = rocket.launch().await {
                eprintln!("mock backend stopped: {}", e.kind());
            }
        });

        for _ in 0..100 {
            if tokio::net::TcpStream::connect((Ipv4Addr::LOCALHOST, port)).await.is_ok() {
                return Ok(MockBackend {
                    base_url: format!("http://127.0.0.1:{}", port),
                    state,
                    shutdown,
                });
            }
            tokio::time::sleep(Duration::from_millis(20)).await;
        }
        anyhow::bail!("mock backend did not start listening on port {}", port)
    }

    /// Base URL of a port nothing listens on.
    pub fn unreachable_url() -> String {
        let port = free_port().expect("free port");
        format!("http://127.0.0.1:{}", port)
    }

    pub fn stop(self) {
        self.shutdown.notify();
    }
}
