use crate::session::Session;

/// Client-side routes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[non_exhaustive]
pub enum Route {
    Root,
    Login,
    Register,
    Home,
    About,
    Contact,
    Payment,
}

impl Route {
    pub const ALL: [Self; 7] = [
        Self::Root,
        Self::Login,
        Self::Register,
        Self::Home,
        Self::About,
        Self::Contact,
        Self::Payment,
    ];

    #[must_use]
    pub fn path(self) -> &'static str {
        match self {
            Self::Root => "/",
            Self::Login => "/login",
            Self::Register => "/register",
            Self::Home => "/home",
            Self::About => "/about",
            Self::Contact => "/contact",
            Self::Payment => "/payment",
        }
    }

    /// Exact match on the path, ignoring a trailing slash and any query string.
    #[must_use]
    pub fn from_path(path: &str) -> Option<Self> {
        let path = path.split(['?', '#']).next().unwrap_or_default();
        let trimmed = match path.trim_end_matches('/') {
            "" => "/",
            p => p,
        };
        Self::ALL.into_iter().find(|r| r.path() == trimmed)
    }

    /// Routes that require a token.
    #[must_use]
    pub fn is_protected(self) -> bool {
        matches!(self, Self::Home | Self::About | Self::Contact | Self::Payment)
    }
}

impl std::fmt::Display for Route {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.path())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GuardDecision {
    Render(Route),
    Redirect(Route),
}

/// Decide what to show for `route` given whether a token is present.
///
/// `/` always forwards to the login view.
#[must_use]
pub fn guard(route: Route, has_token: bool) -> GuardDecision {
    match route {
        Route::Root => GuardDecision::Redirect(Route::Login),
        r if r.is_protected() && !has_token => GuardDecision::Redirect(Route::Login),
        r => GuardDecision::Render(r),
    }
}

/// Route guard bound to a session.
///
/// The store is read on every check, not cached. An expired token that is
/// still present lets the route render; the next request's 401 cleans up.
#[derive(Debug, Clone)]
pub struct RouteGuard {
    session: Session,
}

impl RouteGuard {
    #[must_use]
    pub fn new(session: Session) -> Self {
        Self { session }
    }

    #[must_use]
    pub fn check(&self, route: Route) -> GuardDecision {
        let decision = guard(route, self.session.is_authenticated());
        if let GuardDecision::Redirect(to) = decision {
            tracing::debug!(from = %route, to = %to, "Route guard redirect");
        }
        decision
    }

    /// Check a raw path; unknown paths yield `None`.
    #[must_use]
    pub fn check_path(&self, path: &str) -> Option<GuardDecision> {
        Route::from_path(path).map(|r| self.check(r))
    }

    /// Check and, on a redirect, perform the navigation. Returns the route to render.
    pub fn enter(&self, route: Route) -> Option<Route> {
        match self.check(route) {
            GuardDecision::Render(r) => Some(r),
            GuardDecision::Redirect(to) => {
                self.session.navigate(to.path());
                None
            }
        }
    }
}
