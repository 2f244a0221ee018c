//! Domain models for the donation subsystem.

pub mod cart;
pub mod catalog;
pub mod checkout;
