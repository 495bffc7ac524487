//! Command implementations.

mod resolve;

pub use resolve::{
    ResolveArgs,
    resolve,
};
