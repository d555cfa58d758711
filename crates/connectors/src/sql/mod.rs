pub mod error;
pub mod ident;
pub mod postgres;
