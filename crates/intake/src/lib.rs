//! # Intake
//!
//! Client-streaming agreement intake protocol.
//!
//! Responsibilities:
//! - `TcpIntakeClient`: stream a batch of agreements to a satellite and
//!   receive the settlement summary on close
//! - `IntakeServer`: in-process satellite endpoint for tests and demos
//!   (idempotent settlement, scriptable rejections)
//! - `MockIntake`: in-memory client for unit tests, no sockets involved

mod client;
mod mock;
mod server;
mod wire;

pub use client::{TcpIntakeClient, TcpIntakeStream};
pub use contracts::{AgreementMessage, IntakeClient, IntakeStream, SettlementSummary};
pub use mock::{MockIntake, MockIntakeStream};
pub use server::IntakeServer;
pub use wire::MAX_FRAME_LEN;
