//! REST layer: axum handlers mapping the public DTOs in `shared` onto the
//! domain services.

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    routing::{delete, get, post},
    Json, Router,
};
use serde::Deserialize;
use std::sync::Arc;
use tracing::info;

use crate::domain::commands::cart::UpdateQuantityCommand;
use crate::domain::commands::checkout::SubmitDetailsCommand;
use crate::domain::commands::forum::CreateForumPostCommand;
use crate::domain::guidance_service::{GeminiClient, GuidanceClient};
use crate::domain::models::cart::CartLine as DomainCartLine;
use crate::domain::models::catalog::{
    CatalogItem as DomainCatalogItem, CategoryTab as DomainCategoryTab,
    DonationCategory as DomainDonationCategory,
};
use crate::domain::models::checkout::{
    CheckoutStep as DomainCheckoutStep, PaymentMethod as DomainPaymentMethod,
};
use crate::domain::payment::{ChargeOutcome, PaymentGateway, SimulatedGateway};
use crate::domain::{
    AdminService, CartService, CatalogService, CheckoutService, DonationFlowService,
    EventService, ForumService, GuidanceService, SelectionService, SessionService,
    SharingService,
};

/// Application state shared across handlers: one instance of every domain
/// service, wired together once at startup.
#[derive(Clone)]
pub struct AppState {
    pub catalog: CatalogService,
    pub cart: CartService,
    pub selection: SelectionService,
    pub checkout: CheckoutService,
    pub flow: DonationFlowService,
    pub events: EventService,
    pub sharing: SharingService,
    pub forum: ForumService,
    pub session: SessionService,
    pub guidance: GuidanceService,
    pub admin: AdminService,
}

impl AppState {
    /// Wire up the full service graph with explicit collaborators. Tests
    /// inject canned gateways/clients here.
    pub fn new(gateway: Arc<dyn PaymentGateway>, guidance_client: Arc<dyn GuidanceClient>) -> Self {
        let flow = DonationFlowService::new();
        let catalog = CatalogService::new();
        let cart = CartService::new(flow.clone());
        let selection = SelectionService::new(catalog.clone(), cart.clone());
        let checkout = CheckoutService::new(cart.clone(), flow.clone(), gateway);
        let events = EventService::new();
        let sharing = SharingService::new();
        let forum = ForumService::new();
        let session = SessionService::new();
        let guidance = GuidanceService::new(guidance_client);
        let admin = AdminService::new(
            events.clone(),
            catalog.clone(),
            sharing.clone(),
            forum.clone(),
        );
        Self {
            catalog,
            cart,
            selection,
            checkout,
            flow,
            events,
            sharing,
            forum,
            session,
            guidance,
            admin,
        }
    }

    /// Production wiring: simulated payment gateway plus the Gemini
    /// guidance client with whatever credential the process has.
    pub fn with_defaults(guidance_api_key: Option<String>) -> Self {
        Self::new(
            Arc::new(SimulatedGateway::new()),
            Arc::new(GeminiClient::new(guidance_api_key)),
        )
    }
}

/// Build the API router.
pub fn routes(state: AppState) -> Router {
    Router::new()
        .route("/catalog", get(list_catalog))
        .route("/cart", get(get_cart).delete(clear_cart))
        .route("/cart/lines", post(add_cart_line).patch(update_quantity))
        .route("/cart/lines/:unique_id", delete(remove_cart_line))
        .route("/donation/step", get(donation_step))
        .route("/donation/enter", post(enter_donation_section))
        .route("/donation/view-cart", post(view_cart))
        .route("/donation/continue-shopping", post(continue_shopping))
        .route("/donation/checkout", post(begin_checkout))
        .route("/donation/back", post(back_to_cart))
        .route("/selection", get(get_selection).delete(cancel_selection))
        .route("/selection/open", post(open_selection))
        .route("/selection/preset", post(choose_preset))
        .route("/selection/custom", post(enter_custom_amount))
        .route("/selection/quantity", post(set_selection_quantity))
        .route("/selection/installment", post(set_installment))
        .route("/selection/confirm", post(confirm_selection))
        .route("/checkout", get(checkout_state))
        .route("/checkout/details", post(submit_details))
        .route("/checkout/back", post(back_to_details))
        .route("/checkout/confirm", post(confirm_payment))
        .route("/events", get(list_events))
        .route("/events/calendar/:year/:month", get(calendar_month))
        .route("/sharing", get(list_sharing).post(submit_sharing))
        .route("/sharing/:id/react", post(react_to_sharing))
        .route("/forum", get(list_forum).post(create_forum_post))
        .route("/session", get(current_session))
        .route("/session/login", post(login))
        .route("/session/logout", post(logout))
        .route("/chat", get(chat_transcript).post(chat))
        .route("/admin/records", post(admin_save).delete(admin_delete))
        .with_state(state)
}

// ---------------------------------------------------------------------
// DTO mapping
// ---------------------------------------------------------------------

fn category_to_dto(category: DomainDonationCategory) -> shared::DonationCategory {
    match category {
        DomainDonationCategory::Construction => shared::DonationCategory::Construction,
        DomainDonationCategory::Dharma => shared::DonationCategory::Dharma,
        DomainDonationCategory::Charity => shared::DonationCategory::Charity,
        DomainDonationCategory::Academy => shared::DonationCategory::Academy,
    }
}

fn tab_from_dto(tab: shared::CategoryTab) -> DomainCategoryTab {
    match tab {
        shared::CategoryTab::All => DomainCategoryTab::All,
        shared::CategoryTab::General => DomainCategoryTab::General,
        shared::CategoryTab::Ceremony => DomainCategoryTab::Ceremony,
        shared::CategoryTab::Construction => DomainCategoryTab::Construction,
    }
}

fn method_from_dto(method: shared::PaymentMethod) -> DomainPaymentMethod {
    match method {
        shared::PaymentMethod::Credit => DomainPaymentMethod::Credit,
        shared::PaymentMethod::Etransfer => DomainPaymentMethod::Etransfer,
    }
}

fn step_to_dto(step: DomainCheckoutStep) -> shared::CheckoutStep {
    match step {
        DomainCheckoutStep::Details => shared::CheckoutStep::Details,
        DomainCheckoutStep::Review => shared::CheckoutStep::Review,
        DomainCheckoutStep::Confirmation => shared::CheckoutStep::Confirmation,
    }
}

fn catalog_item_to_dto(item: DomainCatalogItem) -> shared::CatalogItem {
    shared::CatalogItem {
        id: item.id,
        title: item.title,
        description: item.description,
        min_amount: item.min_amount,
        image: item.image,
        category: category_to_dto(item.category),
        allow_installment: item.allow_installment,
    }
}

fn cart_line_to_dto(line: DomainCartLine) -> shared::CartLine {
    shared::CartLine {
        unique_id: line.unique_id,
        item_id: line.item_id,
        title: line.title,
        description: line.description,
        min_amount: line.min_amount,
        image: line.image,
        category: category_to_dto(line.category),
        allow_installment: line.allow_installment,
        selected_amount: line.selected_amount,
        quantity: line.quantity,
        is_installment: line.is_installment,
    }
}

fn cart_summary(cart: &CartService) -> shared::CartSummary {
    shared::CartSummary {
        lines: cart.lines().into_iter().map(cart_line_to_dto).collect(),
        total: cart.total(),
        item_count: cart.item_count(),
    }
}

fn checkout_view_to_dto(
    view: crate::domain::checkout_service::CheckoutView,
) -> shared::CheckoutStateResponse {
    shared::CheckoutStateResponse {
        step: step_to_dto(view.step),
        lines: view.lines.into_iter().map(cart_line_to_dto).collect(),
        total: view.total,
        error: view.error,
    }
}

// ---------------------------------------------------------------------
// Catalog
// ---------------------------------------------------------------------

/// Query parameters for the catalog listing.
#[derive(Debug, Deserialize)]
pub struct CatalogQuery {
    pub tab: Option<shared::CategoryTab>,
}

pub async fn list_catalog(
    State(state): State<AppState>,
    Query(query): Query<CatalogQuery>,
) -> impl IntoResponse {
    let tab = query.tab.unwrap_or_default();
    info!("GET /api/catalog - tab: {:?}", tab);
    let items: Vec<shared::CatalogItem> = state
        .catalog
        .list(tab_from_dto(tab))
        .into_iter()
        .map(catalog_item_to_dto)
        .collect();
    Json(items)
}

// ---------------------------------------------------------------------
// Cart
// ---------------------------------------------------------------------

pub async fn get_cart(State(state): State<AppState>) -> impl IntoResponse {
    Json(cart_summary(&state.cart))
}

pub async fn add_cart_line(
    State(state): State<AppState>,
    Json(request): Json<shared::AddToCartRequest>,
) -> impl IntoResponse {
    info!("POST /api/cart/lines - item: {}", request.item_id);
    let Some(item) = state.catalog.get(&request.item_id) else {
        return (StatusCode::NOT_FOUND, "Unknown catalog item").into_response();
    };
    match state
        .cart
        .add_line(&item, request.amount, request.quantity, request.is_installment)
    {
        Some(line) => (StatusCode::CREATED, Json(cart_line_to_dto(line))).into_response(),
        None => (StatusCode::BAD_REQUEST, "Amount must be positive").into_response(),
    }
}

pub async fn update_quantity(
    State(state): State<AppState>,
    Json(request): Json<shared::UpdateQuantityRequest>,
) -> impl IntoResponse {
    info!(
        "PATCH /api/cart/lines - line: {}, quantity: {}",
        request.unique_id, request.quantity
    );
    state.cart.update_quantity(UpdateQuantityCommand {
        unique_id: request.unique_id,
        requested_quantity: request.quantity,
    });
    Json(cart_summary(&state.cart))
}

pub async fn remove_cart_line(
    State(state): State<AppState>,
    Path(unique_id): Path<String>,
) -> impl IntoResponse {
    state.cart.remove_line(&unique_id);
    Json(cart_summary(&state.cart))
}

pub async fn clear_cart(State(state): State<AppState>) -> impl IntoResponse {
    state.cart.clear();
    StatusCode::NO_CONTENT
}

// ---------------------------------------------------------------------
// Donation flow
// ---------------------------------------------------------------------

fn step_response(state: &AppState) -> Json<shared::DonationStepResponse> {
    Json(shared::DonationStepResponse {
        step: state.flow.current(),
    })
}

pub async fn donation_step(State(state): State<AppState>) -> impl IntoResponse {
    step_response(&state)
}

/// Entering the donate section from the site navigation always lands on
/// the marketplace, never mid-checkout.
pub async fn enter_donation_section(State(state): State<AppState>) -> impl IntoResponse {
    state.flow.reset_to_marketplace();
    step_response(&state)
}

pub async fn view_cart(State(state): State<AppState>) -> impl IntoResponse {
    state.flow.view_cart();
    step_response(&state)
}

pub async fn continue_shopping(State(state): State<AppState>) -> impl IntoResponse {
    state.flow.continue_shopping();
    step_response(&state)
}

pub async fn begin_checkout(State(state): State<AppState>) -> impl IntoResponse {
    info!("POST /api/donation/checkout");
    state.flow.begin_checkout(state.cart.is_empty());
    state.checkout.begin();
    step_response(&state)
}

/// "Back" from checkout step 1: the draft is discarded.
pub async fn back_to_cart(State(state): State<AppState>) -> impl IntoResponse {
    state.checkout.abandon();
    step_response(&state)
}

// ---------------------------------------------------------------------
// Marketplace selection
// ---------------------------------------------------------------------

#[derive(Debug, Deserialize)]
pub struct OpenSelectionRequest {
    pub item_id: String,
}

#[derive(Debug, Deserialize)]
pub struct PresetRequest {
    pub multiplier: u32,
}

#[derive(Debug, Deserialize)]
pub struct CustomAmountRequest {
    pub text: String,
}

#[derive(Debug, Deserialize)]
pub struct SelectionQuantityRequest {
    pub quantity: u32,
}

#[derive(Debug, Deserialize)]
pub struct InstallmentRequest {
    pub is_installment: bool,
}

/// Snapshot of the open selection session for display.
#[derive(Debug, serde::Serialize)]
pub struct SelectionResponse {
    pub item: shared::CatalogItem,
    pub amount: i64,
    pub custom_amount: Option<String>,
    pub quantity: u32,
    pub is_installment: bool,
    pub total: i64,
}

fn selection_response(state: &AppState) -> Option<SelectionResponse> {
    state.selection.current().map(|session| SelectionResponse {
        amount: session.amount,
        custom_amount: session.custom_amount.clone(),
        quantity: session.quantity,
        is_installment: session.is_installment,
        total: session.total(),
        item: catalog_item_to_dto(session.item),
    })
}

fn selection_or_500(state: &AppState) -> axum::response::Response {
    match selection_response(state) {
        Some(response) => Json(response).into_response(),
        None => StatusCode::INTERNAL_SERVER_ERROR.into_response(),
    }
}

pub async fn get_selection(State(state): State<AppState>) -> impl IntoResponse {
    match selection_response(&state) {
        Some(response) => Json(response).into_response(),
        None => (StatusCode::NOT_FOUND, "No selection session open").into_response(),
    }
}

pub async fn open_selection(
    State(state): State<AppState>,
    Json(request): Json<OpenSelectionRequest>,
) -> impl IntoResponse {
    info!("POST /api/selection/open - item: {}", request.item_id);
    match state.selection.open(&request.item_id) {
        Ok(_) => selection_or_500(&state),
        Err(e) => (StatusCode::NOT_FOUND, e.to_string()).into_response(),
    }
}

pub async fn choose_preset(
    State(state): State<AppState>,
    Json(request): Json<PresetRequest>,
) -> impl IntoResponse {
    match state.selection.choose_preset(request.multiplier) {
        Ok(()) => selection_or_500(&state),
        Err(e) => (StatusCode::BAD_REQUEST, e.to_string()).into_response(),
    }
}

pub async fn enter_custom_amount(
    State(state): State<AppState>,
    Json(request): Json<CustomAmountRequest>,
) -> impl IntoResponse {
    match state.selection.enter_custom(&request.text) {
        Ok(()) => selection_or_500(&state),
        Err(e) => (StatusCode::BAD_REQUEST, e.to_string()).into_response(),
    }
}

pub async fn set_selection_quantity(
    State(state): State<AppState>,
    Json(request): Json<SelectionQuantityRequest>,
) -> impl IntoResponse {
    match state.selection.set_quantity(request.quantity) {
        Ok(()) => selection_or_500(&state),
        Err(e) => (StatusCode::BAD_REQUEST, e.to_string()).into_response(),
    }
}

pub async fn set_installment(
    State(state): State<AppState>,
    Json(request): Json<InstallmentRequest>,
) -> impl IntoResponse {
    match state.selection.set_installment(request.is_installment) {
        Ok(()) => selection_or_500(&state),
        Err(e) => (StatusCode::BAD_REQUEST, e.to_string()).into_response(),
    }
}

pub async fn confirm_selection(State(state): State<AppState>) -> impl IntoResponse {
    match state.selection.confirm() {
        Ok(line) => (StatusCode::CREATED, Json(cart_line_to_dto(line))).into_response(),
        Err(e) => (StatusCode::BAD_REQUEST, e.to_string()).into_response(),
    }
}

pub async fn cancel_selection(State(state): State<AppState>) -> impl IntoResponse {
    state.selection.cancel();
    StatusCode::NO_CONTENT
}

// ---------------------------------------------------------------------
// Checkout
// ---------------------------------------------------------------------

fn checkout_or_500(state: &AppState) -> axum::response::Response {
    match state.checkout.view() {
        Some(view) => Json(checkout_view_to_dto(view)).into_response(),
        None => StatusCode::INTERNAL_SERVER_ERROR.into_response(),
    }
}

pub async fn checkout_state(State(state): State<AppState>) -> impl IntoResponse {
    match state.checkout.view() {
        Some(view) => Json(checkout_view_to_dto(view)).into_response(),
        None => (StatusCode::NOT_FOUND, "No checkout session in progress").into_response(),
    }
}

pub async fn submit_details(
    State(state): State<AppState>,
    Json(request): Json<shared::CheckoutDetailsRequest>,
) -> impl IntoResponse {
    info!("POST /api/checkout/details - donor: {}", request.donor_name);
    let command = SubmitDetailsCommand {
        donor_name: request.donor_name,
        email: request.email,
        phone: request.phone,
        address: request.address,
        wishes: request.wishes,
        receipt_needed: request.receipt_needed,
        payment_method: method_from_dto(request.payment_method),
    };
    match state.checkout.submit_details(command) {
        Ok(()) => checkout_or_500(&state),
        // Validation failures are also reflected in the checkout view's
        // error field; the status code is for API callers.
        Err(e) => (StatusCode::BAD_REQUEST, e.to_string()).into_response(),
    }
}

pub async fn back_to_details(State(state): State<AppState>) -> impl IntoResponse {
    match state.checkout.back_to_details() {
        Ok(()) => checkout_or_500(&state),
        Err(e) => (StatusCode::BAD_REQUEST, e.to_string()).into_response(),
    }
}

pub async fn confirm_payment(State(state): State<AppState>) -> impl IntoResponse {
    info!("POST /api/checkout/confirm");
    match state.checkout.confirm_payment().await {
        Ok(outcome) => {
            let step = state
                .checkout
                .view()
                .map(|view| step_to_dto(view.step))
                .unwrap_or(shared::CheckoutStep::Review);
            let (approved, message) = match outcome {
                ChargeOutcome::Approved => (true, "随喜功德，礼成圆满。".to_string()),
                ChargeOutcome::Declined(reason) | ChargeOutcome::Error(reason) => (false, reason),
            };
            Json(shared::ConfirmPaymentResponse {
                approved,
                step,
                message,
            })
            .into_response()
        }
        Err(e) => (StatusCode::CONFLICT, e.to_string()).into_response(),
    }
}

// ---------------------------------------------------------------------
// Events
// ---------------------------------------------------------------------

pub async fn list_events(State(state): State<AppState>) -> impl IntoResponse {
    Json(state.events.list())
}

pub async fn calendar_month(
    State(state): State<AppState>,
    Path((year, month)): Path<(i32, u32)>,
) -> impl IntoResponse {
    info!("GET /api/events/calendar/{year}/{month}");
    match state.events.month_grid(year, month) {
        Ok(grid) => Json(grid).into_response(),
        Err(e) => (StatusCode::BAD_REQUEST, e.to_string()).into_response(),
    }
}

// ---------------------------------------------------------------------
// Sharing
// ---------------------------------------------------------------------

pub async fn list_sharing(State(state): State<AppState>) -> impl IntoResponse {
    Json(state.sharing.list())
}

#[derive(Debug, Deserialize)]
pub struct SubmitSharingRequest {
    pub title: String,
    pub tag: String,
    pub content: String,
    pub image: Option<String>,
}

pub async fn submit_sharing(
    State(state): State<AppState>,
    Json(request): Json<SubmitSharingRequest>,
) -> impl IntoResponse {
    let Some(user) = state.session.current() else {
        return (StatusCode::UNAUTHORIZED, "Login required").into_response();
    };
    match state.sharing.submit(
        request.title,
        user.name,
        request.tag,
        request.content,
        request.image,
    ) {
        Ok(post) => (StatusCode::CREATED, Json(post)).into_response(),
        Err(e) => (StatusCode::BAD_REQUEST, e.to_string()).into_response(),
    }
}

pub async fn react_to_sharing(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(request): Json<shared::ReactRequest>,
) -> impl IntoResponse {
    match state.sharing.react(&id, request.kind) {
        Ok(reactions) => Json(reactions).into_response(),
        Err(e) => (StatusCode::NOT_FOUND, e.to_string()).into_response(),
    }
}

// ---------------------------------------------------------------------
// Forum
// ---------------------------------------------------------------------

pub async fn list_forum(State(state): State<AppState>) -> impl IntoResponse {
    if !state.session.is_logged_in() {
        return (StatusCode::UNAUTHORIZED, "Login required").into_response();
    }
    Json(state.forum.list()).into_response()
}

pub async fn create_forum_post(
    State(state): State<AppState>,
    Json(request): Json<shared::CreateForumPostRequest>,
) -> impl IntoResponse {
    let Some(user) = state.session.current() else {
        return (StatusCode::UNAUTHORIZED, "Login required").into_response();
    };
    let command = CreateForumPostCommand {
        title: request.title,
        content: request.content,
        author: user.name,
        category: request.category,
    };
    match state.forum.create_post(command) {
        Ok(post) => (StatusCode::CREATED, Json(post)).into_response(),
        Err(e) => (StatusCode::BAD_REQUEST, e.to_string()).into_response(),
    }
}

// ---------------------------------------------------------------------
// Session
// ---------------------------------------------------------------------

pub async fn current_session(State(state): State<AppState>) -> impl IntoResponse {
    match state.session.current() {
        Some(user) => Json(user).into_response(),
        None => (StatusCode::NOT_FOUND, "Not logged in").into_response(),
    }
}

pub async fn login(
    State(state): State<AppState>,
    Json(request): Json<shared::LoginRequest>,
) -> impl IntoResponse {
    info!("POST /api/session/login - email: {}", request.email);
    if request.email.trim().is_empty() {
        return (StatusCode::BAD_REQUEST, "Email is required").into_response();
    }
    let user = state.session.login(&request.name, &request.email);
    Json(user).into_response()
}

pub async fn logout(State(state): State<AppState>) -> impl IntoResponse {
    state.session.logout();
    StatusCode::NO_CONTENT
}

// ---------------------------------------------------------------------
// Guidance chat
// ---------------------------------------------------------------------

pub async fn chat(
    State(state): State<AppState>,
    Json(request): Json<shared::ChatRequest>,
) -> impl IntoResponse {
    let reply = state.guidance.ask(&request.message).await;
    Json(shared::ChatResponse { reply })
}

pub async fn chat_transcript(State(state): State<AppState>) -> impl IntoResponse {
    Json(state.guidance.transcript())
}

// ---------------------------------------------------------------------
// Admin
// ---------------------------------------------------------------------

#[derive(Debug, serde::Serialize)]
pub struct AdminSaveResponse {
    pub id: String,
}

pub async fn admin_save(
    State(state): State<AppState>,
    Json(draft): Json<shared::AdminDraft>,
) -> impl IntoResponse {
    match state.admin.save(draft) {
        Ok(id) => Json(AdminSaveResponse { id }).into_response(),
        Err(e) => (StatusCode::BAD_REQUEST, e.to_string()).into_response(),
    }
}

#[derive(Debug, Deserialize)]
pub struct AdminDeleteRequest {
    pub kind: shared::AdminEntityKind,
    pub id: String,
}

pub async fn admin_delete(
    State(state): State<AppState>,
    Json(request): Json<AdminDeleteRequest>,
) -> impl IntoResponse {
    match state.admin.delete(request.kind, &request.id) {
        Ok(()) => StatusCode::NO_CONTENT.into_response(),
        Err(e) => (StatusCode::NOT_FOUND, e.to_string()).into_response(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::guidance_service::GuidanceClient;
    use async_trait::async_trait;
    use axum::body::Body;
    use axum::http::Request;
    use std::time::Duration;
    use tower::ServiceExt;

    struct CannedGuidance;

    #[async_trait]
    impl GuidanceClient for CannedGuidance {
        async fn generate_guidance(&self, _prompt: &str) -> String {
            "阿弥陀佛。".to_string()
        }
    }

    fn test_state() -> AppState {
        AppState::new(
            Arc::new(SimulatedGateway::with_delay(Duration::ZERO)),
            Arc::new(CannedGuidance),
        )
    }

    fn api(state: AppState) -> Router {
        Router::new().nest("/api", routes(state))
    }

    async fn body_json(response: axum::response::Response) -> serde_json::Value {
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn test_catalog_tab_filter() {
        let app = api(test_state());
        let response = app
            .oneshot(
                Request::builder()
                    .uri("/api/catalog?tab=CEREMONY")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let items = body_json(response).await;
        assert_eq!(items.as_array().unwrap().len(), 2);
    }

    #[tokio::test]
    async fn test_add_line_rejects_non_positive_amount() {
        let app = api(test_state());
        let response = app
            .oneshot(
                Request::builder()
                    .method("POST")
                    .uri("/api/cart/lines")
                    .header("content-type", "application/json")
                    .body(Body::from(r#"{"item_id":"light","amount":0,"quantity":1}"#))
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_cart_summary_reflects_added_line() {
        let state = test_state();
        let item = state.catalog.get("light").unwrap();
        state.cart.add_line(&item, 200, 3, false).unwrap();

        let app = api(state);
        let response = app
            .oneshot(
                Request::builder()
                    .uri("/api/cart")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        let summary = body_json(response).await;
        assert_eq!(summary["total"], 600);
        assert_eq!(summary["item_count"], 3);
    }

    #[tokio::test]
    async fn test_forum_requires_login() {
        let app = api(test_state());
        let response = app
            .oneshot(
                Request::builder()
                    .uri("/api/forum")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn test_forum_visible_after_login() {
        let state = test_state();
        state.session.login("慧心", "huixin@example.com");
        let app = api(state);
        let response = app
            .oneshot(
                Request::builder()
                    .uri("/api/forum")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(body_json(response).await.as_array().unwrap().len(), 3);
    }

    #[tokio::test]
    async fn test_checkout_round_trip_over_http() {
        let state = test_state();
        let item = state.catalog.get("light").unwrap();
        state.cart.add_line(&item, 100, 2, false).unwrap();
        let app = api(state.clone());

        let response = app
            .clone()
            .oneshot(
                Request::builder()
                    .method("POST")
                    .uri("/api/donation/checkout")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let response = app
            .clone()
            .oneshot(
                Request::builder()
                    .method("POST")
                    .uri("/api/checkout/details")
                    .header("content-type", "application/json")
                    .body(Body::from(
                        r#"{"donor_name":"陈美玲","email":"mei@example.com","payment_method":"credit"}"#,
                    ))
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(body_json(response).await["step"], "REVIEW");

        let response = app
            .oneshot(
                Request::builder()
                    .method("POST")
                    .uri("/api/checkout/confirm")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let confirmation = body_json(response).await;
        assert_eq!(confirmation["approved"], true);
        assert_eq!(confirmation["step"], "CONFIRMATION");
        assert_eq!(state.cart.item_count(), 0);
    }

    #[tokio::test]
    async fn test_chat_returns_client_reply() {
        let app = api(test_state());
        let response = app
            .oneshot(
                Request::builder()
                    .method("POST")
                    .uri("/api/chat")
                    .header("content-type", "application/json")
                    .body(Body::from(r#"{"message":"师父好"}"#))
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(body_json(response).await["reply"], "阿弥陀佛。");
    }
}
