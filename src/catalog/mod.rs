pub mod listing;
pub mod product;
pub mod service;

pub use product::{Category, NewProduct, Product, ProductInput, ProductPatch};
pub use service::{ProductError, ProductPage, ProductService};
