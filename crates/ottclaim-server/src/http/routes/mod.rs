pub mod admin;
pub mod automation;
pub mod claims;
pub mod health;
pub mod payment;
