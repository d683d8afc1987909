// Browser helpers: query string, join link, clipboard, logging setup.

use wasm_bindgen_futures::JsFuture;
use web_sys::{Url, UrlSearchParams};

use crate::config::{LOG_LEVEL_PARAM, MAX_GOALS_PARAM};
use crate::state::session::{IS_HOST_PARAM, SESSION_ID_PARAM};
use crate::state::{LaunchParams, SessionDescriptor};

const KNOWN_PARAMS: [&str; 4] = [SESSION_ID_PARAM, IS_HOST_PARAM, LOG_LEVEL_PARAM, MAX_GOALS_PARAM];

pub fn init_logging(level: log::Level) {
    console_error_panic_hook::set_once();
    wasm_logger::init(wasm_logger::Config::new(level));
}

pub fn launch_params_from_location() -> LaunchParams {
    let search = web_sys::window()
        .and_then(|w| w.location().search().ok())
        .unwrap_or_default();
    let Ok(params) = UrlSearchParams::new_with_str(&search) else {
        return LaunchParams::default();
    };
    LaunchParams::from_pairs(
        KNOWN_PARAMS
            .iter()
            .filter_map(|key| params.get(key).map(|value| (*key, value))),
    )
}

/// Current page URL with the joiner query set.
pub fn join_link(session: &SessionDescriptor) -> Option<String> {
    let href = web_sys::window()?.location().href().ok()?;
    let url = Url::new(&href).ok()?;
    let query = url.search_params();
    for (key, value) in session.join_query() {
        query.set(key, value);
    }
    Some(url.href())
}

/// Best effort; the outcome is only reported, never retried.
pub fn copy_to_clipboard(text: String, done: impl FnOnce(bool) + 'static) {
    let Some(window) = web_sys::window() else {
        done(false);
        return;
    };
    let promise = window.navigator().clipboard().write_text(&text);
    wasm_bindgen_futures::spawn_local(async move {
        match JsFuture::from(promise).await {
            Ok(_) => {
                log::debug!("join link copied");
                done(true);
            }
            Err(e) => {
                log::warn!("clipboard write failed: {e:?}");
                done(false);
            }
        }
    });
}

/// Back to the chooser: drops the session from the query, keeping settings
/// such as the log level, and reloads.
pub fn restart_without_session() {
    let Some(window) = web_sys::window() else {
        return;
    };
    let location = window.location();
    let kept = launch_params_from_location().without_session();
    let Some(url) = location.href().ok().and_then(|href| Url::new(&href).ok()) else {
        log::error!("could not read the page url");
        return;
    };
    let query = url.search_params();
    for key in KNOWN_PARAMS {
        query.delete(key);
    }
    for (key, value) in kept.pairs() {
        query.set(key, value);
    }
    if let Err(e) = location.assign(&url.href()) {
        log::error!("could not leave session: {e:?}");
    }
}
