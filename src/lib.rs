pub mod catalog;
pub mod config;
pub mod error;
pub mod handlers;
pub mod imaging;
pub mod orders;
pub mod response;
pub mod slug;
pub mod store;

#[cfg(test)]
pub mod testing;
