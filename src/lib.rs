//! Course Academy - storefront backend for selling video courses
//!
//! This crate turns completed Stripe checkouts into accounts, course grants,
//! orders and confirmation emails, starts checkout and billing portal
//! sessions, and gates lesson content by ownership.

pub mod adapters;
pub mod application;
pub mod config;
pub mod domain;
pub mod ports;
