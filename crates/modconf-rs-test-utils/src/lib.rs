//! Test helpers shared across modconf crates.

pub mod navigation;
pub mod sources;

pub use navigation::{RecordedNavigation, RecordingNavigator};
pub use sources::{SourceGate, StubSource};
