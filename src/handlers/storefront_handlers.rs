use askama::Template;
use askama_web::WebTemplate;
use axum::response::IntoResponse;

/// Navigation entry shared by every page.
pub struct NavLink {
    pub href: &'static str,
    pub label: &'static str,
    pub active: bool,
}

fn nav(current: &str) -> Vec<NavLink> {
    [("/", "Home"), ("/browse", "Browse"), ("/login", "Login")]
        .into_iter()
        .map(|(href, label)| NavLink {
            href,
            label,
            active: href == current,
        })
        .collect()
}

#[derive(Template, WebTemplate)]
#[template(path = "index.html")]
struct LandingTemplate {
    nav: Vec<NavLink>,
}

#[derive(Template, WebTemplate)]
#[template(path = "login.html")]
struct LoginTemplate {
    nav: Vec<NavLink>,
}

#[derive(Template, WebTemplate)]
#[template(path = "browse.html")]
struct BrowseTemplate {
    nav: Vec<NavLink>,
}

pub async fn landing_page() -> impl IntoResponse {
    LandingTemplate { nav: nav("/") }
}

pub async fn login_page() -> impl IntoResponse {
    LoginTemplate { nav: nav("/login") }
}

pub async fn browse_page() -> impl IntoResponse {
    BrowseTemplate { nav: nav("/browse") }
}
