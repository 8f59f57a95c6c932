//! Payment gateway integration for the checkout service.
//!
//! The [`PaymentGateway`] trait covers the two-call protocol (bearer token
//! acquisition, then order submission); [`PesapalGateway`] is the HTTP
//! implementation and [`InMemoryGateway`] the test double. [`dispatch`]
//! branches on the payment method and produces the initial order status.

pub mod dispatch;
pub mod error;
pub mod gateway;
pub mod memory;
pub mod pesapal;

pub use dispatch::{AWAITING_PAYMENT_STATUS, PaymentOutcome, PaymentSettings, dispatch};
pub use error::{PaymentError, Result};
pub use gateway::{BillingAddress, GatewayOrderRequest, GatewayOrderResponse, PaymentGateway};
pub use memory::InMemoryGateway;
pub use pesapal::{PesapalConfig, PesapalGateway};
