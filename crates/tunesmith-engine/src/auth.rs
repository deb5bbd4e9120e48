//! Post-replay authentication check.
//!
//! The only signal available after replaying a session is where the login
//! page sends the browser. Both strategies are heuristics over that URL.

use serde::{Deserialize, Serialize};
use url::Url;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum AuthCheck {
    /// Authenticated when the page redirected away from the login path
    /// while staying on the same host.
    #[default]
    LeftLoginPage,
    /// Authenticated when the final URL contains `marker`.
    UrlContains { marker: String },
}

impl AuthCheck {
    pub fn is_authenticated(&self, final_url: &str, login_url: &str) -> bool {
        match self {
            AuthCheck::UrlContains { marker } => final_url.contains(marker.as_str()),
            AuthCheck::LeftLoginPage => {
                let (Ok(current), Ok(login)) = (Url::parse(final_url), Url::parse(login_url))
                else {
                    return false;
                };
                current.host_str() == login.host_str()
                    && normalized_path(&current) != normalized_path(&login)
            }
        }
    }
}

fn normalized_path(url: &Url) -> &str {
    let path = url.path().trim_end_matches('/');
    if path.is_empty() { "/" } else { path }
}
