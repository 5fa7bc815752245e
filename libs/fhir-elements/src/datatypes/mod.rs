//! Complex datatypes

pub mod coding;
pub mod extension;
pub mod human_name;
pub mod meta;
pub mod quantity;

pub use coding::*;
pub use extension::*;
pub use human_name::*;
pub use meta::*;
pub use quantity::*;
