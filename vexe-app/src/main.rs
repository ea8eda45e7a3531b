use std::sync::Arc;

use async_trait::async_trait;
use chrono::{NaiveDate, NaiveTime, Utc};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use vexe_catalog::pricing::format_vnd;
use vexe_core::booking::{
    Booking, BookingClient, HoldOutcome, HoldRequest, Invoice, InvoiceClient, InvoiceRequest,
};
use vexe_core::config::WorkflowConfig;
use vexe_core::identity::{
    AuthTokenGate, CustomerProfile, IdentityClient, InMemoryTokenStore, TokenStore,
};
use vexe_core::route::{
    Route, RouteCatalogClient, RouteSearchRequest, ScheduleTag, Seat, VehicleInfo,
};
use vexe_order::filter::TimeBucket;
use vexe_order::orchestrator::BookingWorkflow;

type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Canned catalog standing in for the remote route/schedule service.
struct DemoCatalog {
    routes: Vec<Route>,
}

impl DemoCatalog {
    fn seeded() -> Self {
        let seats = (1..=34)
            .map(|n| Seat { code: format!("A{:02}", n), booked: n % 7 == 0, held: false })
            .collect();
        let routes = vec![Route {
            code: "TX001".to_string(),
            origin: "Hà Nội".to_string(),
            destination: "Đà Nẵng".to_string(),
            departure_time: NaiveTime::from_hms_opt(7, 30, 0),
            arrival_time: NaiveTime::from_hms_opt(19, 0, 0),
            duration: Some("11h30".to_string()),
            distance_km: 760.0,
            vehicle: Some(VehicleInfo { kind: "Giường nằm".to_string(), code: Some("XE001".to_string()) }),
            fare: Some(350000),
            schedule: ScheduleTag::Daily,
            seats,
        }];
        Self { routes }
    }
}

#[async_trait]
impl RouteCatalogClient for DemoCatalog {
    async fn search(&self, request: &RouteSearchRequest) -> Result<Vec<Route>, BoxError> {
        Ok(self
            .routes
            .iter()
            .filter(|r| r.origin == request.origin && r.destination == request.destination)
            .cloned()
            .collect())
    }

    async fn list_all(&self) -> Result<Vec<Route>, BoxError> {
        Ok(self.routes.clone())
    }

    async fn route_detail(&self, route_code: &str, _date: NaiveDate) -> Result<Route, BoxError> {
        self.routes
            .iter()
            .find(|r| r.code == route_code)
            .cloned()
            .ok_or_else(|| format!("route not found: {}", route_code).into())
    }
}

struct DemoBooking;

#[async_trait]
impl BookingClient for DemoBooking {
    async fn create_hold(&self, request: &HoldRequest) -> Result<HoldOutcome, BoxError> {
        Ok(HoldOutcome::Confirmed(Booking {
            booking_code: format!("DV{}", Utc::now().timestamp()),
            seat_codes: request.seat_codes.clone(),
            total_amount: request.total_amount,
            customer_code: "KH001".to_string(),
            expires_at: Some(Utc::now() + chrono::Duration::minutes(10)),
        }))
    }

    async fn cancel_booking(&self, _booking_code: &str) -> Result<(), BoxError> {
        Ok(())
    }
}

struct DemoInvoices;

#[async_trait]
impl InvoiceClient for DemoInvoices {
    async fn create_invoice(&self, request: &InvoiceRequest) -> Result<Invoice, BoxError> {
        Ok(Invoice {
            invoice_code: format!("HD{}", Utc::now().timestamp()),
            total_amount: request.total_amount,
        })
    }
}

struct DemoIdentity;

#[async_trait]
impl IdentityClient for DemoIdentity {
    async fn fetch_profile(&self, _token: &str) -> Result<CustomerProfile, BoxError> {
        Ok(CustomerProfile {
            customer_code: Some("KH001".to_string()),
            name: Some("Nguyễn Văn A".to_string()),
            email: Some("a@vexe.vn".to_string()),
            phone: Some("0901234567".to_string()),
        })
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "vexe_order=debug,vexe_app=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = WorkflowConfig::load().unwrap_or_default();

    let store = Arc::new(InMemoryTokenStore::with_token("demo-session-token"));
    let gate = AuthTokenGate::new(store as Arc<dyn TokenStore>);

    let mut workflow = BookingWorkflow::new(
        Arc::new(DemoCatalog::seeded()),
        Arc::new(DemoBooking),
        Arc::new(DemoInvoices),
        Arc::new(DemoIdentity),
        gate,
        config,
    );

    let travel_date = Utc::now().date_naive();

    let found = workflow.search("Hà Nội", "Đà Nẵng", travel_date).await?;
    tracing::info!(found, "routes found");

    let morning = workflow.visible_routes(&[TimeBucket::Morning]);
    tracing::info!(visible = morning.len(), "after morning filter");

    workflow.select_route("TX001").await?;
    let plan = workflow.seat_plan()?;
    tracing::info!(
        lower = plan.lower.len(),
        upper = plan.upper.len(),
        "seat plan rendered"
    );

    workflow.toggle_seat("A01")?;
    workflow.toggle_seat("A03")?;
    tracing::info!(total = %format_vnd(workflow.total()), "selection priced");

    let booking = workflow.confirm_selection().await?;
    tracing::info!(booking_code = %booking.booking_code, "seats held");

    let invoice = workflow.pay().await?;
    println!(
        "Thanh toán thành công! Mã hóa đơn: {}. Tổng tiền: {}",
        invoice.invoice_code,
        format_vnd(invoice.total_amount)
    );

    Ok(())
}
