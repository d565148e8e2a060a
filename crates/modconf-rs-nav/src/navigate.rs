//! Dispatch of configured links to in-app or full-page navigation.

use crate::{NavError, interpolate_string};
use log::debug;
use serde::{Deserialize, Serialize};

/// Base URLs substituted into link templates.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NavigationContext {
    /// Available as `${spaBase}`.
    pub spa_base: String,
    /// Available as `${appBase}`.
    pub app_base: String,
    /// Available as `${appSpaBase}`. Targets under it stay in the app.
    pub app_spa_base: String,
}

impl NavigationContext {
    fn params(&self) -> [(&'static str, &str); 3] {
        [
            ("spaBase", self.spa_base.as_str()),
            ("appBase", self.app_base.as_str()),
            ("appSpaBase", self.app_spa_base.as_str()),
        ]
    }
}

/// Where a resolved link leads.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NavigationTarget {
    /// A route handled by the single-page app router.
    Spa(String),
    /// Any other URL, loaded as a full page.
    External(String),
}

impl NavigationTarget {
    /// The interpolated URL.
    pub fn url(&self) -> &str {
        match self {
            Self::Spa(url) | Self::External(url) => url,
        }
    }
}

/// Performs navigation on behalf of `navigate`.
pub trait Navigator {
    /// Route within the single-page app.
    fn navigate_to_url(&self, url: &str);

    /// Load a URL as a full page.
    fn assign(&self, url: &str);
}

/// Interpolate the base URL placeholders in `to`.
pub fn interpolate_url(to: &str, ctx: &NavigationContext) -> Result<String, NavError> {
    interpolate_string(to, ctx.params())
}

/// Interpolate `to` and decide whether it stays inside the app.
pub fn resolve_target(to: &str, ctx: &NavigationContext) -> Result<NavigationTarget, NavError> {
    let url = interpolate_url(to, ctx)?;
    if !ctx.app_spa_base.is_empty() && url.starts_with(&ctx.app_spa_base) {
        Ok(NavigationTarget::Spa(url))
    } else {
        Ok(NavigationTarget::External(url))
    }
}

/// Resolve `to` and hand it to the matching `navigator` method.
pub fn navigate(
    to: &str,
    ctx: &NavigationContext,
    navigator: &dyn Navigator,
) -> Result<NavigationTarget, NavError> {
    let target = resolve_target(to, ctx)?;
    debug!("navigating (to={to}, target={target:?})");
    match &target {
        NavigationTarget::Spa(url) => navigator.navigate_to_url(url),
        NavigationTarget::External(url) => navigator.assign(url),
    }
    Ok(target)
}
