//! URL template interpolation and navigation dispatch for configurable links.

mod error;
mod interpolate;
mod navigate;

pub use error::NavError;
pub use interpolate::interpolate_string;
pub use navigate::{
    NavigationContext, NavigationTarget, Navigator, interpolate_url, navigate, resolve_target,
};
