//! farmchain library crate.
//!
//! Device-capability acquisition for the FarmChain add-product flow: a camera
//! session for product photos, a one-shot location probe for the farm
//! position, and the screen that hands their results to the product form.

pub mod add_product;
pub mod camera;
pub mod capability;
pub mod config;
pub mod location;
pub mod product;
