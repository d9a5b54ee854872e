//! Application layer orchestrating charges.
//!
//! [`builder::ChargeBuilder`] turns a configured charge into exactly one processor request, and
//! [`service::ChargeService`] runs batch orders through it and records the outcome.

pub mod builder;
pub mod service;
