pub mod catalog;
pub mod components;
pub mod config;
pub mod environment;
pub mod error;
pub mod frame;
pub mod interp;
pub mod quaternion;
pub mod rigid_body;
pub mod util;
pub mod vessel;
