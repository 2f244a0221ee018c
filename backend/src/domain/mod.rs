//! Domain layer: in-memory services for the temple portal.
//!
//! Every service owns its state behind an `Arc<Mutex<...>>` and exposes
//! narrow mutation methods; nothing here touches HTTP or serialization of
//! the public DTOs.

pub mod admin_service;
pub mod cart_service;
pub mod catalog_service;
pub mod checkout_service;
pub mod commands;
pub mod donation_flow;
pub mod event_service;
pub mod forum_service;
pub mod guidance_service;
pub mod models;
pub mod payment;
pub mod selection_service;
pub mod session_service;
pub mod sharing_service;

pub use admin_service::AdminService;
pub use cart_service::CartService;
pub use catalog_service::CatalogService;
pub use checkout_service::CheckoutService;
pub use donation_flow::DonationFlowService;
pub use event_service::EventService;
pub use forum_service::ForumService;
pub use guidance_service::{GeminiClient, GuidanceService};
pub use payment::SimulatedGateway;
pub use selection_service::SelectionService;
pub use session_service::SessionService;
pub use sharing_service::SharingService;
