use std::future::Future;
use std::mem;
use std::sync::Arc;

use chrono::{DateTime, NaiveDate, Utc};
use tokio::time::timeout;
use uuid::Uuid;

use vexe_catalog::layout::{LayoutError, SeatPlan};
use vexe_catalog::pricing::{format_vnd, PricingCalculator};
use vexe_core::booking::{
    Booking, BookingClient, HoldOutcome, HoldRequest, Invoice, InvoiceClient, InvoiceRequest,
};
use vexe_core::config::WorkflowConfig;
use vexe_core::identity::{AuthTokenGate, CustomerProfile, IdentityClient};
use vexe_core::route::{Route, RouteCatalogClient, RouteSearchRequest};

use crate::filter::{filter_by_time, TimeBucket};
use crate::models::{BookingDraft, WorkflowStage};
use crate::selection::{SelectionError, SelectionState};

#[derive(Debug, thiserror::Error)]
pub enum WorkflowError {
    #[error("Transport failure during {stage}: {message}")]
    Transport { stage: &'static str, message: String },

    #[error("Request timed out during {stage}")]
    Timeout { stage: &'static str },

    #[error("Route {0} has no available seats")]
    NoSeatsAvailable(String),

    #[error("Sign-in required before selecting a route")]
    SignInRequired,

    #[error("Route {0} is not in the current result list")]
    RouteNotFound(String),

    #[error("Cannot confirm an empty selection")]
    EmptySelection,

    #[error("Seat {0} is not part of the rendered layout")]
    UnknownSeat(String),

    #[error("Seats no longer available: {}", .rejected.join(", "))]
    SeatsTaken { rejected: Vec<String> },

    #[error("Operation not valid in stage {0:?}")]
    InvalidStage(WorkflowStage),

    #[error(transparent)]
    Layout(#[from] LayoutError),
}

impl From<SelectionError> for WorkflowError {
    fn from(err: SelectionError) -> Self {
        match err {
            SelectionError::UnknownSeat(code) => WorkflowError::UnknownSeat(code),
        }
    }
}

impl WorkflowError {
    /// Human-readable notice for the end user, in the UI locale.
    pub fn user_message(&self) -> String {
        match self {
            WorkflowError::Transport { stage: "search", .. } => {
                "Không thể tải danh sách tuyến xe. Vui lòng thử lại sau.".to_string()
            }
            WorkflowError::Transport { stage: "route detail", .. } => {
                "Không thể tải thông tin ghế. Vui lòng thử lại!".to_string()
            }
            WorkflowError::Transport { stage: "hold", .. } => {
                "Đặt vé thất bại. Vui lòng thử lại!".to_string()
            }
            WorkflowError::Transport { stage: "invoice", .. } => {
                "Xác nhận thanh toán thất bại. Vui lòng thử lại!".to_string()
            }
            WorkflowError::Transport { stage: "cancel", .. } => {
                "Hủy đặt vé thất bại. Vui lòng thử lại!".to_string()
            }
            WorkflowError::Transport { .. } => "Đã xảy ra lỗi. Vui lòng thử lại!".to_string(),
            WorkflowError::Timeout { .. } => {
                "Yêu cầu quá thời gian chờ. Vui lòng thử lại!".to_string()
            }
            WorkflowError::NoSeatsAvailable(_) => "Chuyến xe đã hết chỗ trống.".to_string(),
            WorkflowError::SignInRequired => "Vui lòng đăng nhập để đặt vé!".to_string(),
            WorkflowError::EmptySelection => "Vui lòng chọn ít nhất 1 ghế!".to_string(),
            WorkflowError::SeatsTaken { rejected } => format!(
                "Ghế {} đã có người đặt. Vui lòng chọn ghế khác.",
                rejected.join(", ")
            ),
            WorkflowError::RouteNotFound(_)
            | WorkflowError::UnknownSeat(_)
            | WorkflowError::InvalidStage(_)
            | WorkflowError::Layout(_) => "Đã xảy ra lỗi. Vui lòng thử lại!".to_string(),
        }
    }
}

/// Per-stage workflow state. Each variant carries exactly the data that
/// stage is allowed to see; transitions replace the whole variant.
enum State {
    Idle,
    RouteListed {
        routes: Vec<Route>,
        travel_date: NaiveDate,
    },
    SeatSelection {
        routes: Vec<Route>,
        travel_date: NaiveDate,
        route: Route,
        selection: SelectionState,
    },
    BookingConfirmed {
        routes: Vec<Route>,
        travel_date: NaiveDate,
        route: Route,
        draft: BookingDraft,
        booking: Booking,
    },
    Completed {
        invoice: Invoice,
    },
}

/// Drives the purchase saga: search → route detail → seat hold → invoice.
///
/// Every network step is bounded by the configured timeout. No stage
/// proceeds past a failure; each failure returns the workflow to the
/// stage's entry state. All transitions take `&mut self`, so two stages
/// can never run concurrently for the same session.
pub struct BookingWorkflow {
    catalog: Arc<dyn RouteCatalogClient>,
    booking: Arc<dyn BookingClient>,
    invoices: Arc<dyn InvoiceClient>,
    identity: Arc<dyn IdentityClient>,
    gate: AuthTokenGate,
    config: WorkflowConfig,
    pricing: PricingCalculator,
    session_id: Uuid,
    state: State,
}

impl BookingWorkflow {
    pub fn new(
        catalog: Arc<dyn RouteCatalogClient>,
        booking: Arc<dyn BookingClient>,
        invoices: Arc<dyn InvoiceClient>,
        identity: Arc<dyn IdentityClient>,
        gate: AuthTokenGate,
        config: WorkflowConfig,
    ) -> Self {
        let pricing = PricingCalculator::new(config.fares.clone());
        Self {
            catalog,
            booking,
            invoices,
            identity,
            gate,
            config,
            pricing,
            session_id: Uuid::new_v4(),
            state: State::Idle,
        }
    }

    pub fn session_id(&self) -> Uuid {
        self.session_id
    }

    pub fn stage(&self) -> WorkflowStage {
        match &self.state {
            State::Idle => WorkflowStage::Searching,
            State::RouteListed { .. } => WorkflowStage::RouteListed,
            State::SeatSelection { .. } => WorkflowStage::SeatSelection,
            State::BookingConfirmed { .. } => WorkflowStage::BookingConfirmed,
            State::Completed { .. } => WorkflowStage::Completed,
        }
    }

    /// Run one collaborator call under the step timeout.
    async fn step<T, F>(&self, stage: &'static str, fut: F) -> Result<T, WorkflowError>
    where
        F: Future<Output = Result<T, Box<dyn std::error::Error + Send + Sync>>>,
    {
        match timeout(self.config.network.step_timeout(), fut).await {
            Ok(Ok(value)) => Ok(value),
            Ok(Err(err)) => {
                tracing::warn!(stage, error = %err, "collaborator call failed");
                Err(WorkflowError::Transport { stage, message: err.to_string() })
            }
            Err(_) => {
                tracing::warn!(stage, "collaborator call timed out");
                Err(WorkflowError::Timeout { stage })
            }
        }
    }

    /// Submit a search. Allowed from any stage; a fresh result list
    /// replaces whatever came before, clearing route context and
    /// selection. On failure the previous state is kept so the user can
    /// simply resubmit.
    pub async fn search(
        &mut self,
        origin: &str,
        destination: &str,
        travel_date: NaiveDate,
    ) -> Result<usize, WorkflowError> {
        let request = RouteSearchRequest {
            origin: origin.to_string(),
            destination: destination.to_string(),
            travel_date,
        };
        let routes = self.step("search", self.catalog.search(&request)).await?;
        tracing::info!(origin, destination, %travel_date, count = routes.len(), "search completed");
        let count = routes.len();
        self.state = State::RouteListed { routes, travel_date };
        Ok(count)
    }

    /// Load the full schedule listing instead of searching.
    pub async fn browse_schedule(&mut self, travel_date: NaiveDate) -> Result<usize, WorkflowError> {
        let routes = self.step("search", self.catalog.list_all()).await?;
        tracing::info!(count = routes.len(), "schedule listing loaded");
        let count = routes.len();
        self.state = State::RouteListed { routes, travel_date };
        Ok(count)
    }

    pub fn routes(&self) -> Option<&[Route]> {
        match &self.state {
            State::RouteListed { routes, .. }
            | State::SeatSelection { routes, .. }
            | State::BookingConfirmed { routes, .. } => Some(routes),
            _ => None,
        }
    }

    /// Apply the time-of-day filter to the listed routes. Pure view; the
    /// result set itself is unchanged and the filter is reversible.
    pub fn visible_routes(&self, buckets: &[TimeBucket]) -> Vec<&Route> {
        match &self.state {
            State::RouteListed { routes, .. } => filter_by_time(routes, buckets),
            _ => Vec::new(),
        }
    }

    /// Choose a route from the listed results and fetch its seat layout.
    /// Routes with no free seats are rejected locally, and a missing
    /// credential aborts before any network call.
    pub async fn select_route(&mut self, route_code: &str) -> Result<(), WorkflowError> {
        let travel_date = match &self.state {
            State::RouteListed { routes, travel_date } => {
                let listed = routes
                    .iter()
                    .find(|r| r.code == route_code)
                    .ok_or_else(|| WorkflowError::RouteNotFound(route_code.to_string()))?;
                if listed.available_seat_count() == 0 {
                    return Err(WorkflowError::NoSeatsAvailable(route_code.to_string()));
                }
                *travel_date
            }
            _ => return Err(WorkflowError::InvalidStage(self.stage())),
        };

        if !self.gate.has_credential() {
            tracing::info!(route_code, "route selection blocked, sign-in required");
            return Err(WorkflowError::SignInRequired);
        }

        let route = self
            .step("route detail", self.catalog.route_detail(route_code, travel_date))
            .await?;

        let unit_price = self.pricing.unit_price(&route);
        let selection = SelectionState::new(&route, unit_price);
        tracing::info!(
            route_code,
            seats = route.seats.len(),
            unit_price = %format_vnd(unit_price),
            "seat layout fetched"
        );

        if let State::RouteListed { routes, travel_date } = mem::replace(&mut self.state, State::Idle)
        {
            self.state = State::SeatSelection { routes, travel_date, route, selection };
        }
        Ok(())
    }

    /// Classified, ordered seat map for rendering.
    pub fn seat_plan(&self) -> Result<SeatPlan, WorkflowError> {
        match &self.state {
            State::SeatSelection { route, selection, .. } => {
                Ok(SeatPlan::build(&route.seats, selection.selected(), &self.config.seat_plan)?)
            }
            _ => Err(WorkflowError::InvalidStage(self.stage())),
        }
    }

    pub fn toggle_seat(&mut self, seat_code: &str) -> Result<bool, WorkflowError> {
        match &mut self.state {
            State::SeatSelection { selection, .. } => Ok(selection.toggle(seat_code)?),
            _ => Err(WorkflowError::InvalidStage(self.stage())),
        }
    }

    pub fn selection(&self) -> Option<&SelectionState> {
        match &self.state {
            State::SeatSelection { selection, .. } => Some(selection),
            _ => None,
        }
    }

    /// Current selection total; zero outside seat selection.
    pub fn total(&self) -> u64 {
        match &self.state {
            State::SeatSelection { selection, .. } => selection.total(),
            _ => 0,
        }
    }

    /// Whether the confirm control should be enabled.
    pub fn can_confirm(&self) -> bool {
        match &self.state {
            State::SeatSelection { selection, .. } => !selection.is_empty(),
            _ => false,
        }
    }

    /// Close the seat dialog: selection is discarded and the workflow
    /// returns to the listed routes. No compensating network call; there
    /// is no hold yet at this point.
    pub fn dismiss_seat_dialog(&mut self) {
        if matches!(self.state, State::SeatSelection { .. }) {
            if let State::SeatSelection { routes, travel_date, .. } =
                mem::replace(&mut self.state, State::Idle)
            {
                self.state = State::RouteListed { routes, travel_date };
            }
        }
    }

    /// Confirm the selection: build the draft and submit the hold. The
    /// request carries exactly the chosen seat codes and the locally
    /// computed total. A conflict expunges the rejected seats and leaves
    /// the user back at seat selection with the rest intact.
    pub async fn confirm_selection(&mut self) -> Result<Booking, WorkflowError> {
        let draft = match &self.state {
            State::SeatSelection { route, travel_date, selection, .. } => {
                if selection.is_empty() {
                    return Err(WorkflowError::EmptySelection);
                }
                BookingDraft::new(
                    route.code.clone(),
                    selection.selected().to_vec(),
                    *travel_date,
                    selection.unit_price(),
                )
            }
            _ => return Err(WorkflowError::InvalidStage(self.stage())),
        };

        let request = HoldRequest {
            route_code: draft.route_code.clone(),
            seat_codes: draft.seat_codes.clone(),
            total_amount: draft.total_price,
            travel_date: draft.travel_date,
            session_id: self.session_id,
        };

        let outcome = self.step("hold", self.booking.create_hold(&request)).await?;

        match outcome {
            HoldOutcome::Rejected { seat_codes } => {
                tracing::warn!(rejected = ?seat_codes, "hold conflict, seats lost to another buyer");
                if let State::SeatSelection { selection, .. } = &mut self.state {
                    selection.mark_rejected(&seat_codes);
                }
                Err(WorkflowError::SeatsTaken { rejected: seat_codes })
            }
            HoldOutcome::Confirmed(booking) => {
                if booking.total_amount != draft.total_price {
                    tracing::warn!(
                        requested = draft.total_price,
                        granted = booking.total_amount,
                        "server returned a different total than requested"
                    );
                }
                tracing::info!(
                    booking_code = %booking.booking_code,
                    total = %format_vnd(booking.total_amount),
                    "hold confirmed"
                );
                if let State::SeatSelection { routes, travel_date, route, .. } =
                    mem::replace(&mut self.state, State::Idle)
                {
                    self.state = State::BookingConfirmed {
                        routes,
                        travel_date,
                        route,
                        draft,
                        booking: booking.clone(),
                    };
                }
                Ok(booking)
            }
        }
    }

    pub fn booking(&self) -> Option<&Booking> {
        match &self.state {
            State::BookingConfirmed { booking, .. } => Some(booking),
            _ => None,
        }
    }

    /// Server-side hold expiry, when the booking collaborator reports one.
    pub fn hold_expires_at(&self) -> Option<DateTime<Utc>> {
        self.booking().and_then(|b| b.expires_at)
    }

    /// Issue the invoice. Profile fetch is best-effort; blanks render as
    /// not-provided. On failure the booking survives and payment can be
    /// retried. On success all working state is cleared.
    pub async fn pay(&mut self) -> Result<Invoice, WorkflowError> {
        let request = match &self.state {
            State::BookingConfirmed { route, travel_date, draft, booking, .. } => {
                let profile = self.fetch_profile_best_effort().await;
                InvoiceRequest {
                    customer_code: booking.customer_code.clone(),
                    customer_name: profile.name_or_default(),
                    customer_email: profile.email_or_default(),
                    customer_phone: profile.phone_or_default(),
                    route_code: route.code.clone(),
                    origin: route.origin.clone(),
                    destination: route.destination.clone(),
                    seat_codes: booking.seat_codes.clone(),
                    unit_price: draft.unit_price,
                    seat_count: booking.seat_codes.len(),
                    total_amount: booking.total_amount,
                    payment_method: self.config.payment_method,
                    travel_date: *travel_date,
                }
            }
            _ => return Err(WorkflowError::InvalidStage(self.stage())),
        };

        let invoice = self.step("invoice", self.invoices.create_invoice(&request)).await?;

        tracing::info!(
            invoice_code = %invoice.invoice_code,
            total = %format_vnd(invoice.total_amount),
            "invoice issued"
        );
        self.state = State::Completed { invoice: invoice.clone() };
        Ok(invoice)
    }

    /// Abandon a confirmed booking before paying, releasing the held
    /// seats. On success the user is back at the route list; failure
    /// leaves the booking intact for another attempt.
    pub async fn cancel_payment(&mut self) -> Result<(), WorkflowError> {
        let booking_code = match &self.state {
            State::BookingConfirmed { booking, .. } => booking.booking_code.clone(),
            _ => return Err(WorkflowError::InvalidStage(self.stage())),
        };

        self.step("cancel", self.booking.cancel_booking(&booking_code)).await?;

        tracing::info!(%booking_code, "booking cancelled, seats released");
        if let State::BookingConfirmed { routes, travel_date, .. } =
            mem::replace(&mut self.state, State::Idle)
        {
            self.state = State::RouteListed { routes, travel_date };
        }
        Ok(())
    }

    pub fn invoice(&self) -> Option<&Invoice> {
        match &self.state {
            State::Completed { invoice } => Some(invoice),
            _ => None,
        }
    }

    async fn fetch_profile_best_effort(&self) -> CustomerProfile {
        let Some(token) = self.gate.token() else {
            return CustomerProfile::default();
        };
        match self.step("profile", self.identity.fetch_profile(&token)).await {
            Ok(profile) => profile,
            Err(err) => {
                tracing::warn!(error = %err, "profile fetch failed, continuing without it");
                CustomerProfile::default()
            }
        }
    }
}
