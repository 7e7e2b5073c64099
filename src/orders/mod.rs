pub mod order;
pub mod service;

pub use order::{NewOrder, Order, OrderInput, OrderItem, OrderPatch, OrderStatus};
pub use service::{OrderError, OrderPage, OrderService};
