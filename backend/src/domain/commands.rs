//! Domain-level command and query types.
//!
//! These structs are used by services inside the domain layer and are
//! **not** exposed over the public API. The REST layer is responsible for
//! mapping the public DTOs defined in the `shared` crate to these internal
//! types.

pub mod cart {
    /// Request to change the quantity of an existing cart line.
    ///
    /// The requested value is signed on purpose: callers may ask for zero
    /// or a negative quantity and the store clamps to a floor of 1.
    #[derive(Debug, Clone)]
    pub struct UpdateQuantityCommand {
        pub unique_id: String,
        pub requested_quantity: i64,
    }
}

pub mod checkout {
    use crate::domain::models::checkout::PaymentMethod;

    /// Donor details submitted on checkout step 1.
    #[derive(Debug, Clone)]
    pub struct SubmitDetailsCommand {
        pub donor_name: String,
        pub email: String,
        pub phone: String,
        pub address: String,
        pub wishes: String,
        pub receipt_needed: bool,
        pub payment_method: PaymentMethod,
    }
}

pub mod forum {
    use shared::ForumCategory;

    /// Input for creating a new forum post. The author comes from the
    /// active session, not from the client payload.
    #[derive(Debug, Clone)]
    pub struct CreateForumPostCommand {
        pub title: String,
        pub content: String,
        pub author: String,
        pub category: ForumCategory,
    }
}
