//! Domain types for one-off charges and the ports the charge flow talks through.

pub mod customer;
pub mod discount;
pub mod invoice;
pub mod money;
pub mod order;
pub mod payment;
pub mod ports;
pub mod record;
pub mod request;
