use serde::{Deserialize, Serialize};

/// Donation category assigned to a catalog offering.
///
/// Carries no business rule of its own - it is only used for the
/// marketplace category tabs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DonationCategory {
    Construction,
    Dharma,
    Charity,
    Academy,
}

/// A donation offering a visitor may contribute toward.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CatalogItem {
    pub id: String,
    pub title: String,
    pub description: String,
    /// Floor for any pledge against this item. Always positive.
    pub min_amount: i64,
    pub image: Option<String>,
    pub category: DonationCategory,
    /// When true the marketplace selector may expose an installment checkbox.
    #[serde(default)]
    pub allow_installment: bool,
}

/// Marketplace category filter tabs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum CategoryTab {
    #[default]
    All,
    /// Charity and academy offerings.
    General,
    /// Dharma service offerings.
    Ceremony,
    Construction,
}

/// One concrete pledge instance pending checkout.
///
/// Catalog fields are copied at add-time, so later edits to the catalog do
/// not retroactively change an existing line.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CartLine {
    /// Generated at add-time, unique per line.
    pub unique_id: String,
    pub item_id: String,
    pub title: String,
    pub description: String,
    pub min_amount: i64,
    pub image: Option<String>,
    pub category: DonationCategory,
    pub allow_installment: bool,
    /// Per-unit pledge amount chosen by the user. Always positive.
    pub selected_amount: i64,
    /// Positive integer, minimum 1.
    pub quantity: u32,
    /// Only meaningful when the source item allows installment.
    pub is_installment: bool,
}

/// Snapshot of the cart returned by GET /api/cart.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CartSummary {
    pub lines: Vec<CartLine>,
    /// Sum over all lines of selected_amount * quantity.
    pub total: i64,
    /// Sum over all lines of quantity (used for the cart badge).
    pub item_count: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AddToCartRequest {
    pub item_id: String,
    pub amount: i64,
    pub quantity: u32,
    #[serde(default)]
    pub is_installment: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UpdateQuantityRequest {
    pub unique_id: String,
    /// Requested quantity. Values below 1 are clamped to 1, never rejected.
    pub quantity: i64,
}

/// The three-way state sequencing marketplace browsing, cart review and
/// checkout inside the donate section.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum DonationStep {
    #[default]
    Marketplace,
    Cart,
    Checkout,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DonationStepResponse {
    pub step: DonationStep,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PaymentMethod {
    Credit,
    Etransfer,
}

/// Donor details submitted on checkout step 1.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CheckoutDetailsRequest {
    pub donor_name: String,
    pub email: String,
    #[serde(default)]
    pub phone: String,
    #[serde(default)]
    pub address: String,
    /// Dedication message, free text.
    #[serde(default)]
    pub wishes: String,
    #[serde(default)]
    pub receipt_needed: bool,
    pub payment_method: PaymentMethod,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum CheckoutStep {
    Details,
    Review,
    Confirmation,
}

/// Current checkout state as shown to the client.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CheckoutStateResponse {
    pub step: CheckoutStep,
    /// Cart snapshot taken when checkout began.
    pub lines: Vec<CartLine>,
    pub total: i64,
    /// Set when the last transition was rejected (validation or decline).
    pub error: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConfirmPaymentResponse {
    pub approved: bool,
    pub step: CheckoutStep,
    pub message: String,
}

/// Category of a temple event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EventCategory {
    Ceremony,
    Meditation,
    Class,
    Festival,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TempleEvent {
    pub id: String,
    pub title: String,
    /// YYYY-MM-DD
    pub date: String,
    pub time: String,
    pub location: String,
    pub description: String,
    pub category: EventCategory,
}

/// Type of calendar day for explicit rendering logic.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CalendarDayType {
    /// Empty padding day before the start of the month.
    PaddingBefore,
    /// Actual day within the month.
    MonthDay,
}

/// A single cell of the event calendar grid.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CalendarDay {
    /// 1-based day of month; 0 for padding cells.
    pub day: u32,
    pub day_type: CalendarDayType,
    pub events: Vec<TempleEvent>,
}

/// A calendar month with its event data.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CalendarMonth {
    pub month: u32,
    pub year: i32,
    pub days: Vec<CalendarDay>,
    /// 0 = Sunday, 1 = Monday, etc.
    pub first_day_of_week: u32,
}

/// Reaction counters on a sharing post. Plain counters, no per-user
/// tracking.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Reactions {
    pub sadhu: u32,
    pub rejoice: u32,
    pub zen: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReactionKind {
    Sadhu,
    Rejoice,
    Zen,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SharingPost {
    pub id: String,
    pub title: String,
    pub author: String,
    /// YYYY-MM-DD
    pub date: String,
    pub content: String,
    pub tag: String,
    pub image: Option<String>,
    #[serde(default)]
    pub reactions: Reactions,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReactRequest {
    pub kind: ReactionKind,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ForumCategory {
    Notice,
    Recruit,
    Qna,
    Sharing,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ForumPost {
    pub id: String,
    pub title: String,
    pub author: String,
    /// YYYY-MM-DD
    pub date: String,
    pub category: ForumCategory,
    pub content: String,
    pub replies: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CreateForumPostRequest {
    pub title: String,
    pub content: String,
    pub category: ForumCategory,
}

/// Logged-in visitor. Login accepts any email/password pair.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct User {
    pub name: String,
    pub email: String,
    pub is_logged_in: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoginRequest {
    /// Display name; falls back to the local part of the email.
    #[serde(default)]
    pub name: String,
    pub email: String,
    pub password: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChatRole {
    User,
    Model,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: ChatRole,
    pub text: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatRequest {
    pub message: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatResponse {
    pub reply: String,
}

/// Editing draft for the admin dashboard, one typed variant per entity
/// kind. The active tab selects the variant, so field shapes never leak
/// between unrelated entity types.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AdminDraft {
    Event(EventDraft),
    Catalog(CatalogDraft),
    Sharing(SharingDraft),
    Forum(ForumDraft),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EventDraft {
    /// Present when editing an existing record, absent when creating.
    pub id: Option<String>,
    pub title: String,
    pub date: String,
    pub time: String,
    pub location: String,
    pub description: String,
    pub category: EventCategory,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CatalogDraft {
    pub id: Option<String>,
    pub title: String,
    pub description: String,
    pub min_amount: i64,
    pub image: Option<String>,
    pub category: DonationCategory,
    #[serde(default)]
    pub allow_installment: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SharingDraft {
    pub id: Option<String>,
    pub title: String,
    pub author: String,
    pub date: String,
    pub tag: String,
    pub image: Option<String>,
    pub content: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ForumDraft {
    pub id: Option<String>,
    pub title: String,
    pub author: String,
    pub category: ForumCategory,
    pub content: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AdminEntityKind {
    Event,
    Catalog,
    Sharing,
    Forum,
}
