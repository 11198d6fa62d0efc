//! # Commands Module
//!
//! Everything a storefront front end calls.
//!
//! ## Command Organization
//! ```text
//! commands/
//! ├── mod.rs       ◄─── You are here (exports)
//! ├── cart.rs      ◄─── get_cart, add_to_cart, remove_from_cart
//! ├── wishlist.rs  ◄─── add_to_wishlist
//! └── checkout.rs  ◄─── checkout_store, get_order
//! ```
//!
//! ## State Injection
//! Each command takes only the state it needs:
//! ```rust,ignore
//! // Only needs cart
//! fn get_cart(cart: &CartState)
//!
//! // Needs database and cart
//! async fn add_to_cart(db: &DbState, cart: &CartState, ...)
//!
//! // Needs the session to know who is signed in
//! async fn add_to_wishlist(db: &DbState, session: &Session, ...)
//! ```

pub mod cart;
pub mod checkout;
pub mod wishlist;
