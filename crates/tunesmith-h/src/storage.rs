//! Conversion between CDP cookies/local storage and the session file shape.

use chromiumoxide::cdp::browser_protocol::network::{
    Cookie as CdpCookie, CookieParam, CookieSameSite, TimeSinceEpoch,
};
use tunesmith_engine::backend::BrowserError;
use tunesmith_engine::protocol::{Cookie, OriginState, SameSite};

pub fn cookie_from_cdp(cookie: CdpCookie) -> Cookie {
    Cookie {
        name: cookie.name,
        value: cookie.value,
        domain: Some(cookie.domain),
        path: Some(cookie.path),
        expires: Some(if cookie.session { -1.0 } else { cookie.expires }),
        http_only: Some(cookie.http_only),
        secure: Some(cookie.secure),
        same_site: cookie.same_site.map(|s| match s {
            CookieSameSite::Strict => SameSite::Strict,
            CookieSameSite::Lax => SameSite::Lax,
            CookieSameSite::None => SameSite::None,
        }),
    }
}

/// Build the CDP parameter for a stored cookie. Cookies without a domain
/// cannot be scoped and yield `None`.
pub fn cookie_to_cdp(cookie: &Cookie) -> Result<Option<CookieParam>, BrowserError> {
    let Some(domain) = cookie.domain.as_deref() else {
        return Ok(None);
    };

    let path = cookie.path.clone().unwrap_or_else(|| "/".to_string());
    let mut builder = CookieParam::builder()
        .name(cookie.name.clone())
        .value(cookie.value.clone())
        .path(path.clone());

    // A leading dot marks a domain cookie; anything else was host-only and is
    // re-scoped through a URL so Chromium keeps it host-only.
    if domain.starts_with('.') {
        builder = builder.domain(domain);
    } else {
        let scheme = if cookie.secure == Some(true) { "https" } else { "http" };
        builder = builder.url(format!("{}://{}{}", scheme, domain, path));
    }

    if let Some(secure) = cookie.secure {
        builder = builder.secure(secure);
    }
    if let Some(http_only) = cookie.http_only {
        builder = builder.http_only(http_only);
    }
    if let Some(same_site) = cookie.same_site {
        builder = builder.same_site(match same_site {
            SameSite::Strict => CookieSameSite::Strict,
            SameSite::Lax => CookieSameSite::Lax,
            SameSite::None => CookieSameSite::None,
        });
    }
    // Negative expiry marks a session cookie
    if let Some(expires) = cookie.expires.filter(|e| *e >= 0.0) {
        builder = builder.expires(TimeSinceEpoch::new(expires));
    }

    builder
        .build()
        .map(Some)
        .map_err(|e| BrowserError::Storage(format!("Invalid cookie {}: {}", cookie.name, e)))
}

/// Expression that serializes the current origin's local storage. Other
/// origins' storage is not reachable from the page. Opaque origins
/// (about:blank, data:) report an empty list.
pub const READ_LOCAL_STORAGE: &str = r#"JSON.stringify((() => {
    try {
        return {
            origin: location.origin,
            localStorage: Object.keys(localStorage).map(k => ({ name: k, value: localStorage.getItem(k) }))
        };
    } catch (e) {
        return { origin: location.origin, localStorage: [] };
    }
})())"#;

/// Script run on every new document that seeds local storage for one origin.
pub fn restore_local_storage_script(origin: &OriginState) -> Result<String, BrowserError> {
    let target = serde_json::to_string(&origin.origin)?;
    let entries = serde_json::to_string(
        &origin
            .local_storage
            .iter()
            .map(|e| (e.name.as_str(), e.value.as_str()))
            .collect::<Vec<_>>(),
    )?;
    Ok(format!(
        "(() => {{ if (location.origin !== {target}) return; \
         try {{ for (const [k, v] of {entries}) localStorage.setItem(k, v); }} catch (e) {{}} }})();"
    ))
}

/// Expression returning the text content of the first match as a JSON string.
pub fn text_content_expression(selector: &str) -> Result<String, BrowserError> {
    let selector = serde_json::to_string(selector)?;
    Ok(format!(
        "JSON.stringify({{ text: document.querySelector({selector})?.textContent ?? null }})"
    ))
}
