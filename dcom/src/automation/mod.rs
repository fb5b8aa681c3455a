pub use collaborators::*;
pub use config::*;
pub use manager::*;
pub use memory::*;
pub use policy::*;

mod collaborators;
mod config;
mod manager;
mod memory;
mod policy;
