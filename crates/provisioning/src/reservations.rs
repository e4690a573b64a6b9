//! The external reservation source.
//!
//! Reservations live in the wider property-management system; this subsystem
//! only ever asks one question of it: who arrives on a given date. The
//! trait keeps the distribution run testable with an in-memory double.

use async_trait::async_trait;
use chrono::NaiveDate;
use serde::Deserialize;

use lockdesk_core::types::{DbId, Timestamp};

/// A confirmed stay as reported by the reservation system.
#[derive(Debug, Clone, Deserialize)]
pub struct Reservation {
    pub reservation_id: String,
    pub listing_id: DbId,
    pub guest_name: String,
    pub phone: String,
    pub arrival: Timestamp,
    pub departure: Timestamp,
    pub status: String,
}

impl Reservation {
    /// Only confirmed stays get entry codes.
    pub fn is_confirmed(&self) -> bool {
        self.status == "confirmed"
    }
}

/// Errors from the reservation source. An unreachable source is the one
/// fatal condition for a distribution run.
#[derive(Debug, thiserror::Error)]
pub enum ReservationSourceError {
    #[error("Reservation source unavailable: {0}")]
    Unavailable(String),

    #[error("Reservation source error ({status}): {body}")]
    Api { status: u16, body: String },
}

impl From<reqwest::Error> for ReservationSourceError {
    fn from(err: reqwest::Error) -> Self {
        ReservationSourceError::Unavailable(err.to_string())
    }
}

/// Read access to the external reservation system.
#[async_trait]
pub trait ReservationSource: Send + Sync {
    /// All reservations with the given arrival date, any status.
    async fn arriving_on(&self, date: NaiveDate)
        -> Result<Vec<Reservation>, ReservationSourceError>;
}

/// HTTP implementation against the property-management API.
pub struct HttpReservationSource {
    client: reqwest::Client,
    base_url: String,
    api_token: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ReservationsResponse {
    reservations: Vec<Reservation>,
}

impl HttpReservationSource {
    pub fn new(client: reqwest::Client, base_url: String, api_token: Option<String>) -> Self {
        Self {
            client,
            base_url,
            api_token,
        }
    }
}

#[async_trait]
impl ReservationSource for HttpReservationSource {
    async fn arriving_on(
        &self,
        date: NaiveDate,
    ) -> Result<Vec<Reservation>, ReservationSourceError> {
        let mut request = self
            .client
            .get(format!("{}/reservations", self.base_url))
            .query(&[("arrival_date", date.format("%Y-%m-%d").to_string())]);
        if let Some(token) = &self.api_token {
            request = request.bearer_auth(token);
        }

        let response = request.send().await?;
        let status = response.status();
        if !status.is_success() {
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "<unreadable body>".to_string());
            if status.is_server_error() {
                return Err(ReservationSourceError::Unavailable(format!(
                    "Reservation source returned {status}"
                )));
            }
            return Err(ReservationSourceError::Api {
                status: status.as_u16(),
                body,
            });
        }

        let body: ReservationsResponse = response.json().await?;
        Ok(body.reservations)
    }
}
