use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Seat-hold request submitted to the remote booking collaborator. Carries
/// exactly the selected seat codes and the locally computed total.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HoldRequest {
    pub route_code: String,
    pub seat_codes: Vec<String>,
    pub total_amount: u64,
    pub travel_date: NaiveDate,
    pub session_id: Uuid,
}

/// A granted hold. Transient: it exists only to feed invoice issuance.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Booking {
    pub booking_code: String,
    pub seat_codes: Vec<String>,
    pub total_amount: u64,
    pub customer_code: String,
    /// Server-side hold expiry, when the collaborator reports one.
    pub expires_at: Option<DateTime<Utc>>,
}

/// Hold response: either a booking, or the definitive word that some of
/// the requested seats were already taken by another buyer.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE", tag = "status")]
pub enum HoldOutcome {
    Confirmed(Booking),
    Rejected { seat_codes: Vec<String> },
}

#[async_trait]
pub trait BookingClient: Send + Sync {
    /// Request a hold on specific seats for a route/date.
    async fn create_hold(
        &self,
        request: &HoldRequest,
    ) -> Result<HoldOutcome, Box<dyn std::error::Error + Send + Sync>>;

    /// Release a previously granted hold (user-initiated cancellation).
    async fn cancel_booking(
        &self,
        booking_code: &str,
    ) -> Result<(), Box<dyn std::error::Error + Send + Sync>>;
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum PaymentMethod {
    Online,
    Cash,
}

impl PaymentMethod {
    pub fn as_tag(&self) -> &'static str {
        match self {
            PaymentMethod::Online => "Online",
            PaymentMethod::Cash => "Cash",
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InvoiceRequest {
    pub customer_code: String,
    pub customer_name: String,
    pub customer_email: String,
    pub customer_phone: String,
    pub route_code: String,
    pub origin: String,
    pub destination: String,
    pub seat_codes: Vec<String>,
    pub unit_price: u64,
    pub seat_count: usize,
    pub total_amount: u64,
    pub payment_method: PaymentMethod,
    pub travel_date: NaiveDate,
}

/// Terminal artifact of the purchase saga.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Invoice {
    pub invoice_code: String,
    pub total_amount: u64,
}

#[async_trait]
pub trait InvoiceClient: Send + Sync {
    async fn create_invoice(
        &self,
        request: &InvoiceRequest,
    ) -> Result<Invoice, Box<dyn std::error::Error + Send + Sync>>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hold_outcome_serialization() {
        let outcome = HoldOutcome::Rejected { seat_codes: vec!["A03".to_string()] };
        let json = serde_json::to_string(&outcome).unwrap();
        assert!(json.contains("\"REJECTED\""));

        let parsed: HoldOutcome = serde_json::from_str(&json).unwrap();
        match parsed {
            HoldOutcome::Rejected { seat_codes } => assert_eq!(seat_codes, vec!["A03"]),
            other => panic!("unexpected outcome: {:?}", other),
        }
    }

    #[test]
    fn test_payment_method_tag() {
        assert_eq!(PaymentMethod::Online.as_tag(), "Online");
        assert_eq!(PaymentMethod::Cash.as_tag(), "Cash");
    }
}
