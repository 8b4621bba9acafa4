//! Application context: owns the view and the controller, built once.

use std::sync::Arc;

use tokio::sync::Mutex;
use tracing::info;

use crate::{
    config::{ConfigError, Settings},
    controller::InteractionController,
    store::{HttpRemoteStore, RemoteStore},
    view::View,
};

pub struct App {
    view: Arc<Mutex<View>>,
    controller: InteractionController,
}

impl App {
    /// Lists trainers once and renders a card for each, in response order.
    /// A failed listing leaves the view empty; the store has already
    /// reported it.
    pub async fn launch(store: Arc<dyn RemoteStore>) -> Self {
        let view = Arc::new(Mutex::new(View::new()));
        let controller = InteractionController::new(store.clone(), view.clone());

        let trainers = store.list_trainers().await.unwrap_or_default();
        {
            let mut view = view.lock().await;
            for trainer in &trainers {
                view.render_trainer(trainer);
            }
        }
        info!(trainers = trainers.len(), "rendered trainer cards");

        Self { view, controller }
    }

    pub async fn connect(settings: &Settings) -> Result<Self, ConfigError> {
        let base_url = settings.validated_base_url()?;
        info!(%base_url, "launching trainer roster");
        Ok(Self::launch(Arc::new(HttpRemoteStore::new(base_url))).await)
    }

    pub fn controller(&self) -> &InteractionController {
        &self.controller
    }

    pub fn view(&self) -> &Arc<Mutex<View>> {
        &self.view
    }

    pub async fn html(&self) -> String {
        self.view.lock().await.to_html()
    }

    pub async fn outline(&self) -> Vec<String> {
        self.view.lock().await.outline()
    }
}

#[cfg(test)]
#[path = "tests/app_tests.rs"]
mod tests;
