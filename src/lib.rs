mod database {
    pub mod actions;
    pub mod error;
    pub mod export;
    pub mod form;
    pub mod schema;
    pub mod store;
}
mod config;
mod constants;

pub use actions::*;
pub use config::*;
pub use constants::*;
pub use database::*;
pub use store::*;
