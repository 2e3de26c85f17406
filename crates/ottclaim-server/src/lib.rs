//! `OTTclaim` server library.
//!
//! Customers claim a promotional OTT subscription against a purchased
//! product's activation code, pay a processing fee, and receive a
//! redeemable key by email and WhatsApp. Admins manage keys, sales records
//! and the fulfillment automation over a token-protected HTTP API.

pub mod auth;
pub mod claims;
pub mod fulfillment;
pub mod http;
pub mod notifications;
mod outbound;
pub mod payment;
pub mod storage;
