//! Route guard for the admin area.

use crate::catalog::{self, Resource};
use crate::session::Session;

pub const LOGIN_PATH: &str = "/admin/login";
pub const DASHBOARD_PATH: &str = "/admin/dashboard";
const ADMIN_PREFIX: &str = "/admin";

#[derive(Debug, Clone, PartialEq)]
pub enum Route {
    Login,
    Dashboard,
    Resource(&'static Resource),
    /// Any other page under `/admin`
    Other(String),
}

#[derive(Debug, Clone, PartialEq)]
pub enum Navigation {
    Allow(Route),
    /// `from` is the location the user tried to reach. Login never reads it.
    Redirect { to: &'static str, from: Option<String> },
    NotFound(String),
}

fn normalize(path: &str) -> String {
    let trimmed = path.trim();
    let without_query = trimmed.split(['?', '#']).next().unwrap_or("");
    let stripped = without_query.trim_end_matches('/');
    if stripped.is_empty() {
        DASHBOARD_PATH.to_string()
    } else if stripped.starts_with('/') {
        stripped.to_string()
    } else {
        format!("/{}", stripped)
    }
}

/// Map a normalized path to its route, `None` outside the admin area
pub fn route_for(path: &str) -> Option<Route> {
    let path = normalize(path);
    if path == LOGIN_PATH {
        return Some(Route::Login);
    }
    if path == DASHBOARD_PATH || path == ADMIN_PREFIX {
        return Some(Route::Dashboard);
    }
    let rest = path.strip_prefix("/admin/")?;
    Some(match catalog::find(rest) {
        Some(resource) => Route::Resource(resource),
        None => Route::Other(path),
    })
}

/// Decide what happens when `path` is opened with the given session
pub fn resolve(path: &str, session: &Session) -> Navigation {
    resolve_with(path, session.is_authenticated())
}

pub fn resolve_with(path: &str, authenticated: bool) -> Navigation {
    let normalized = normalize(path);
    let route = match route_for(&normalized) {
        Some(route) => route,
        None => return Navigation::NotFound(normalized),
    };

    match (route, authenticated) {
        (Route::Login, true) => Navigation::Redirect {
            to: DASHBOARD_PATH,
            from: None,
        },
        (Route::Login, false) => Navigation::Allow(Route::Login),
        (_, false) => Navigation::Redirect {
            to: LOGIN_PATH,
            from: Some(normalized),
        },
        (route, true) => Navigation::Allow(route),
    }
}
