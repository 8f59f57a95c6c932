//! Checkout orchestration for the food-order service.
//!
//! The flow is a strictly ordered pipeline:
//! 1. Validate the untrusted request
//! 2. Resolve catalog records for every referenced id
//! 3. Reconcile prices server-side (client amounts are discarded)
//! 4. Dispatch payment (cash is a no-op; online calls the gateway)
//! 5. Persist the order aggregate top-down, with a best-effort
//!    compensating delete of the order row if a later write fails
//!
//! A notification is emitted after the order row exists; its failure is
//! logged and swallowed, never surfaced.

pub mod coordinator;
pub mod error;
pub mod resolver;

pub use coordinator::{CheckoutReceipt, CheckoutSaga, CheckoutSettings, PaymentReceipt};
pub use error::CheckoutError;
pub use resolver::resolve;
