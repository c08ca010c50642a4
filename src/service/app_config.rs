use chrono::Utc;

use super::Engine;
use crate::app::App;
use crate::app_config::AppConfig;
use crate::query::router::{app_config_list_plan, installed_apps_plan, AppConfigFilter};
use crate::query::{paginate, Page, PageRequest};
use crate::storage::{ChangeSet, ItemKey, ItemStore};
use crate::Result;

impl<S: ItemStore> Engine<S> {
    pub async fn app_config(&self, platform: &str, app_id: &str) -> Result<Option<AppConfig>> {
        self.find::<AppConfig>(&ItemKey::new(platform, app_id)).await
    }

    pub async fn app_config_list(
        &self,
        filter: &AppConfigFilter,
        request: PageRequest,
    ) -> Result<Page<AppConfig>> {
        let plan = app_config_list_plan(filter);
        paginate::<AppConfig, S>(self.store(), &plan, request)
    }

    /// Create, or replace the configuration document of an existing record.
    pub async fn insert_update_app_config(
        &self,
        platform: &str,
        app_id: &str,
        configuration: serde_json::Value,
    ) -> Result<AppConfig> {
        let key = ItemKey::new(platform, app_id);
        let now = Utc::now();

        if self.find::<AppConfig>(&key).await?.is_some() {
            let changes = ChangeSet::touched(now).json("configuration", Some(&configuration))?;
            self.store().update::<AppConfig>(&key, &changes)?;
            tracing::debug!("App config {} updated", key);
        } else {
            self.store()
                .save(&AppConfig::new(platform, app_id, configuration, now))?;
            tracing::info!("App config {} created", key);
        }

        self.fetch::<AppConfig>(&key).await
    }

    /// Hard delete, refused (`false`) while an installed app still uses it.
    pub async fn delete_app_config(&self, platform: &str, app_id: &str) -> Result<bool> {
        let key = ItemKey::new(platform, app_id);
        let config = self.fetch::<AppConfig>(&key).await?;

        let plan = installed_apps_plan(&config.platform, &config.app_id);
        let installed = self.store().count::<App>(&plan.access, plan.filter.as_ref())?;
        if installed > 0 {
            tracing::info!(
                "Refusing to delete app config {}: {} installed app(s)",
                key,
                installed
            );
            return Ok(false);
        }

        self.store().delete::<AppConfig>(&key)?;
        Ok(true)
    }
}
