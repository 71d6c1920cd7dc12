pub extern crate bincode;
pub extern crate euclid;
pub extern crate serde;
pub extern crate serde_json;

pub mod camera;
mod codec;
pub mod coordinator;
mod message;
pub mod model;
pub mod participant;
mod types;

pub use codec::*;
pub use coordinator::{Session, SessionSnapshot};
pub use message::*;
pub use types::*;
