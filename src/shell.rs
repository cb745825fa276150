use once_cell::sync::Lazy;
use tokio::sync::watch;
use url::form_urlencoded;

use crate::session::SessionStore;

pub const DEFAULT_ADMIN_NAME: &str = "Admin";
pub const DEFAULT_ADMIN_EMAIL: &str = "admin@example.com";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Route {
    SignIn,
    Dashboard,
    Users,
    Transactions,
    Tasks,
    Settings,
    HelpCenter,
    NotFound,
}

impl Route {
    pub fn path(&self) -> &'static str {
        match self {
            Route::SignIn => "/sign-in",
            Route::Dashboard => "/",
            Route::Users => "/users",
            Route::Transactions => "/transactions",
            Route::Tasks => "/tasks",
            Route::Settings => "/settings",
            Route::HelpCenter => "/help-center",
            Route::NotFound => "/404",
        }
    }

    /// Query string and trailing slash are ignored.
    pub fn from_path(path: &str) -> Route {
        let path = path.split(['?', '#']).next().unwrap_or_default();
        let path = match path.trim_end_matches('/') {
            "" => "/",
            trimmed => trimmed,
        };
        match path {
            "/sign-in" => Route::SignIn,
            "/" => Route::Dashboard,
            "/users" => Route::Users,
            "/transactions" => Route::Transactions,
            "/tasks" => Route::Tasks,
            "/settings" | "/settings/profile" => Route::Settings,
            "/help-center" => Route::HelpCenter,
            _ => Route::NotFound,
        }
    }

    pub fn is_public(&self) -> bool {
        matches!(self, Route::SignIn | Route::NotFound)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Navigation {
    Render(Route),
    Redirect(String),
}

/// Decide what a visit to `path` shows given the authentication flag.
pub fn guard(authenticated: bool, path: &str) -> Navigation {
    let route = Route::from_path(path);
    match (route, authenticated) {
        (Route::SignIn, true) => {
            Navigation::Redirect(after_sign_in(redirect_target(path).as_deref()))
        }
        (route, _) if route.is_public() => Navigation::Render(route),
        (route, true) => Navigation::Render(route),
        (_, false) => Navigation::Redirect(sign_in_path(path)),
    }
}

pub fn sign_in_path(from: &str) -> String {
    let from: String = form_urlencoded::byte_serialize(from.as_bytes()).collect();
    format!("{}?redirect={from}", Route::SignIn.path())
}

/// Where a fresh login lands: the page that sent the operator to sign-in,
/// when it is a guarded route, otherwise the dashboard.
pub fn after_sign_in(target: Option<&str>) -> String {
    target
        .filter(|path| !Route::from_path(path).is_public())
        .unwrap_or(Route::Dashboard.path())
        .to_string()
}

/// The `redirect` parameter of a sign-in URL, decoded.
pub fn redirect_target(sign_in_url: &str) -> Option<String> {
    let (_, query) = sign_in_url.split_once('?')?;
    form_urlencoded::parse(query.as_bytes())
        .find(|(k, _)| k == "redirect")
        .map(|(_, v)| v.into_owned())
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NavItem {
    pub title: &'static str,
    pub url: Option<&'static str>,
    pub items: Vec<NavItem>,
}

impl NavItem {
    fn link(title: &'static str, route: Route) -> Self {
        NavItem {
            title,
            url: Some(route.path()),
            items: Vec::new(),
        }
    }

    pub fn is_active(&self, route: Route) -> bool {
        self.url == Some(route.path()) || self.items.iter().any(|i| i.is_active(route))
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NavGroup {
    pub title: &'static str,
    pub items: Vec<NavItem>,
}

pub static SIDEBAR: Lazy<Vec<NavGroup>> = Lazy::new(|| {
    vec![
        NavGroup {
            title: "General",
            items: vec![
                NavItem::link("Dashboard", Route::Dashboard),
                NavItem::link("Tasks", Route::Tasks),
                NavItem::link("Users", Route::Users),
                NavItem::link("Transactions", Route::Transactions),
            ],
        },
        NavGroup {
            title: "Other",
            items: vec![
                NavItem {
                    title: "Settings",
                    url: None,
                    items: vec![NavItem::link("Profile", Route::Settings)],
                },
                NavItem::link("Help Center", Route::HelpCenter),
            ],
        },
    ]
});

/// Who the header says is signed in.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Identity {
    pub name: String,
    pub email: String,
}

impl Identity {
    pub fn of(session: &SessionStore) -> Self {
        match session.admin() {
            Some(admin) => Identity {
                name: admin.username,
                email: admin.email,
            },
            None => Identity {
                name: DEFAULT_ADMIN_NAME.to_string(),
                email: DEFAULT_ADMIN_EMAIL.to_string(),
            },
        }
    }
}

pub struct Shell {
    session: SessionStore,
    changes: watch::Receiver<bool>,
    current: Route,
    current_path: String,
}

impl Shell {
    pub fn new(session: SessionStore) -> Self {
        let changes = session.subscribe();
        Shell {
            session,
            changes,
            current: Route::SignIn,
            current_path: Route::SignIn.path().to_string(),
        }
    }

    pub fn current(&self) -> Route {
        self.current
    }

    /// Follow redirects until a route renders.
    pub fn navigate(&mut self, path: &str) -> Route {
        let mut path = path.to_string();
        loop {
            match guard(self.session.is_authenticated(), &path) {
                Navigation::Render(route) => {
                    tracing::debug!(%path, ?route, "render");
                    self.current = route;
                    self.current_path = path;
                    return route;
                }
                Navigation::Redirect(to) => {
                    tracing::debug!(from = %path, %to, "redirect");
                    path = to;
                }
            }
        }
    }

    pub fn current_path(&self) -> &str {
        &self.current_path
    }

    /// Re-run the guard after a session transition. Returns the new route
    /// when the transition moved the operator somewhere else.
    pub fn on_session_change(&mut self) -> Option<Route> {
        if !self.changes.has_changed().unwrap_or(false) {
            return None;
        }
        let authenticated = *self.changes.borrow_and_update();
        let before = self.current;
        let path = self.current_path.clone();
        let after = self.navigate(&path);
        if !authenticated {
            tracing::info!(from = %path, "signed out, back to sign-in");
        }
        (after != before).then_some(after)
    }

    pub fn identity(&self) -> Identity {
        Identity::of(&self.session)
    }

    pub fn sidebar(&self) -> &'static [NavGroup] {
        &SIDEBAR
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;
    use uuid::Uuid;

    use crate::models::{Admin, UserRole};

    #[rstest]
    #[case("/")]
    #[case("/users")]
    #[case("/transactions?page=2")]
    #[case("/tasks/")]
    #[case("/settings")]
    #[case("/help-center")]
    fn guarded_routes_redirect_when_signed_out(#[case] path: &str) {
        let Navigation::Redirect(to) = guard(false, path) else {
            panic!("{path} rendered without a session");
        };
        assert!(to.starts_with("/sign-in?redirect="));
        assert_eq!(redirect_target(&to).as_deref(), Some(path));
    }

    #[rstest]
    #[case(true, "/sign-in", Navigation::Redirect("/".into()))]
    #[case(true, "/sign-in?redirect=%2Fusers", Navigation::Redirect("/users".into()))]
    #[case(true, "/sign-in?redirect=%2Fsign-in", Navigation::Redirect("/".into()))]
    #[case(false, "/sign-in", Navigation::Render(Route::SignIn))]
    #[case(true, "/users", Navigation::Render(Route::Users))]
    #[case(false, "/nowhere", Navigation::Render(Route::NotFound))]
    fn guard_table(#[case] authenticated: bool, #[case] path: &str, #[case] expected: Navigation) {
        assert_eq!(guard(authenticated, path), expected);
    }

    #[test]
    fn header_falls_back_to_placeholder_identity() {
        let session = SessionStore::in_memory();
        let identity = Identity::of(&session);
        assert_eq!(identity.name, "Admin");
        assert_eq!(identity.email, "admin@example.com");
    }

    #[test]
    fn sidebar_marks_nested_items_active() {
        let other = &SIDEBAR[1];
        assert_eq!(other.title, "Other");
        assert!(other.items[0].is_active(Route::Settings));
        assert!(!other.items[0].is_active(Route::Users));
    }

    #[test]
    fn losing_the_session_returns_to_sign_in() {
        let session = SessionStore::in_memory();
        let mut shell = Shell::new(session.clone());
        assert_eq!(shell.navigate("/tasks"), Route::SignIn);

        session
            .set_auth(
                "tok",
                Admin {
                    id: Uuid::new_v4(),
                    username: "floor".into(),
                    email: "floor@brokecoin.io".into(),
                    role: UserRole::Admin,
                },
            )
            .unwrap();
        assert_eq!(shell.on_session_change(), Some(Route::Tasks));
        assert_eq!(shell.identity().name, "floor");

        session.reset().unwrap();
        assert_eq!(shell.on_session_change(), Some(Route::SignIn));
        assert_eq!(
            redirect_target(shell.current_path()).as_deref(),
            Some("/tasks")
        );
    }
}
