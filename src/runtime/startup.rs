use std::cell::RefCell;
use std::rc::Rc;
use std::sync::Arc;
use std::time::Duration;

use reqwest::blocking::Client;
use tracing::info;

use crate::app::App;
use crate::config;
use crate::controller::{Controller, ControllerObserver, ControllerOptions, ThreadExecutor};
use crate::engine::RodioEngine;
use crate::search::HttpSearchClient;

/// Wire the search client, audio engine, controller and app model together.
///
/// A non-empty `initial_query` is typed into the search box and searched
/// right away.
pub fn build(
    settings: &config::Settings,
    initial_query: &str,
) -> Result<(Rc<RefCell<App>>, Controller<RodioEngine>), Box<dyn std::error::Error>> {
    let client = HttpSearchClient::new(&settings.search)?;

    let media_http = Client::builder()
        .user_agent(settings.search.user_agent.as_str())
        .timeout(Duration::from_secs(settings.search.timeout_secs))
        .build()?;
    let engine = RodioEngine::new(media_http)?;

    let mut controller = Controller::new(
        engine,
        Arc::new(client),
        Box::new(ThreadExecutor),
        ControllerOptions::from(settings),
    );

    let app = Rc::new(RefCell::new(App::new(initial_query)));
    let observer: Rc<dyn ControllerObserver> = app.clone();
    controller.set_observer(Rc::downgrade(&observer));

    if !initial_query.is_empty() {
        info!(query = initial_query, "searching initial query");
        controller.search(initial_query);
    }

    Ok((app, controller))
}
