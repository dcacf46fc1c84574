mod builder;
mod canvas;
mod config;
mod error;
mod item;
mod node;
mod palette;
mod position;
mod session;
mod transfer;

pub use crate::builder::*;
pub use crate::canvas::*;
pub use crate::config::*;
pub use crate::error::*;
pub use crate::item::*;
pub use crate::node::*;
pub use crate::palette::*;
pub use crate::position::*;
pub use crate::session::*;
pub use crate::transfer::*;
