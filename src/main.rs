mod components;
mod config;
mod engine;
mod error;
mod model;
mod render;
mod state;
mod util;

use components::app::{App, AppProps};
use config::AppConfig;

fn main() {
    let params = util::launch_params_from_location();
    let config = AppConfig::from_launch_params(&params);
    util::init_logging(config.log_level);
    log::debug!("starting with {config:?}");
    yew::Renderer::<App>::with_props(AppProps { params, config }).render();
}
