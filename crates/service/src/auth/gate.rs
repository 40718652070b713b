//! Route access decided from the session flag alone.

use std::fmt;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Route {
    Login,
    Register,
    Dashboard,
    AddRecord,
    ViewRecords,
    EditProfile,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Access {
    Allow(Route),
    Redirect(Route),
}

impl Route {
    pub const ALL: [Route; 6] = [
        Route::Login,
        Route::Register,
        Route::Dashboard,
        Route::AddRecord,
        Route::ViewRecords,
        Route::EditProfile,
    ];

    pub fn path(self) -> &'static str {
        match self {
            Route::Login => "/login",
            Route::Register => "/register",
            Route::Dashboard => "/dashboard",
            Route::AddRecord => "/add-record",
            Route::ViewRecords => "/view-records",
            Route::EditProfile => "/edit-profile",
        }
    }

    /// Exact path match; `None` for `/` and anything unknown.
    pub fn from_path(path: &str) -> Option<Route> {
        let path = path.trim();
        let path = if path.len() > 1 { path.trim_end_matches('/') } else { path };
        Route::ALL.into_iter().find(|r| r.path() == path)
    }

    /// Pages only meant for signed-out visitors.
    pub fn is_public(self) -> bool { matches!(self, Route::Login | Route::Register) }
}

impl fmt::Display for Route {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result { f.write_str(self.path()) }
}

/// One routing step for `path`.
pub fn resolve(path: &str, authenticated: bool) -> Access {
    match Route::from_path(path) {
        None => Access::Redirect(Route::Dashboard),
        Some(r) if r.is_public() && authenticated => Access::Redirect(Route::Dashboard),
        Some(r) if !r.is_public() && !authenticated => Access::Redirect(Route::Login),
        Some(r) => Access::Allow(r),
    }
}

/// Follow redirects until a page is allowed.
pub fn settle(path: &str, authenticated: bool) -> Route {
    let mut access = resolve(path, authenticated);
    // 最多两跳：未知路径 -> /dashboard -> /login
    for _ in 0..Route::ALL.len() {
        match access {
            Access::Allow(r) => return r,
            Access::Redirect(r) => access = resolve(r.path(), authenticated),
        }
    }
    if authenticated { Route::Dashboard } else { Route::Login }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn protected_pages_need_a_session() {
        assert_eq!(resolve("/dashboard", false), Access::Redirect(Route::Login));
        assert_eq!(resolve("/edit-profile", true), Access::Allow(Route::EditProfile));
        assert_eq!(resolve("/view-records/", true), Access::Allow(Route::ViewRecords));
    }

    #[test]
    fn public_pages_bounce_signed_in_users() {
        assert_eq!(resolve("/login", true), Access::Redirect(Route::Dashboard));
        assert_eq!(resolve("/register", false), Access::Allow(Route::Register));
    }

    #[test]
    fn unknown_paths_go_to_dashboard_then_login() {
        assert_eq!(resolve("/", false), Access::Redirect(Route::Dashboard));
        assert_eq!(resolve("/nope", true), Access::Redirect(Route::Dashboard));
        assert_eq!(settle("/nope", false), Route::Login);
        assert_eq!(settle("/", true), Route::Dashboard);
        assert_eq!(settle("/add-record", true), Route::AddRecord);
    }
}
