//! Thin NATS wrapper shared by the gateway and the workers.
//!
//! The gateway uses request/reply to reach workers; workers subscribe to
//! their RPC subjects and publish replies to the inbox carried by each
//! request.

mod client;

pub use client::{NatsClient, Subscriber};
