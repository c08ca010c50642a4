use async_graphql::{Context, Object, Result};
use chrono::{DateTime, Utc};

use super::types::{AppConfigListType, AppConfigType, AppListType, AppType, ThreadListType, ThreadType};
use super::SharedEngine;
use crate::app::AppStatus;
use crate::monitor::monitored;
use crate::query::{AppConfigFilter, AppFilter, ThreadFilter};

pub struct QueryRoot;

#[Object]
impl QueryRoot {
    async fn ping(&self, ctx: &Context<'_>) -> Result<String> {
        Ok(ctx.data::<SharedEngine>()?.ping())
    }

    async fn app(
        &self,
        ctx: &Context<'_>,
        app_id: String,
        target_id: String,
    ) -> Result<Option<AppType>> {
        let engine = ctx.data::<SharedEngine>()?;
        let view = monitored("app", engine.app(&app_id, &target_id)).await?;
        Ok(view.map(AppType::from))
    }

    async fn app_list(
        &self,
        ctx: &Context<'_>,
        page_number: Option<i64>,
        limit: Option<i64>,
        app_id: Option<String>,
        target_id: Option<String>,
        platform: Option<String>,
        statuses: Option<Vec<String>>,
    ) -> Result<AppListType> {
        let engine = ctx.data::<SharedEngine>()?;
        let page = monitored("appList", async {
            let statuses = statuses
                .unwrap_or_default()
                .iter()
                .map(|s| s.parse::<AppStatus>())
                .collect::<crate::Result<Vec<_>>>()?;
            let filter = AppFilter { app_id, target_id, platform, statuses };
            engine
                .app_list(&filter, engine.page_request(page_number, limit))
                .await
        })
        .await?;
        Ok(page.into())
    }

    async fn app_config(
        &self,
        ctx: &Context<'_>,
        platform: String,
        app_id: String,
    ) -> Result<Option<AppConfigType>> {
        let engine = ctx.data::<SharedEngine>()?;
        let config = monitored("appConfig", engine.app_config(&platform, &app_id)).await?;
        Ok(config.map(AppConfigType::from))
    }

    async fn app_config_list(
        &self,
        ctx: &Context<'_>,
        page_number: Option<i64>,
        limit: Option<i64>,
        platform: Option<String>,
        app_id: Option<String>,
    ) -> Result<AppConfigListType> {
        let engine = ctx.data::<SharedEngine>()?;
        let filter = AppConfigFilter { platform, app_id };
        let page = monitored(
            "appConfigList",
            engine.app_config_list(&filter, engine.page_request(page_number, limit)),
        )
        .await?;
        Ok(page.into())
    }

    async fn thread(
        &self,
        ctx: &Context<'_>,
        platform: String,
        thread_uuid: String,
    ) -> Result<Option<ThreadType>> {
        let engine = ctx.data::<SharedEngine>()?;
        let thread = monitored("thread", engine.thread(&platform, &thread_uuid)).await?;
        Ok(thread.map(ThreadType::from))
    }

    async fn thread_list(
        &self,
        ctx: &Context<'_>,
        platform: String,
        page_number: Option<i64>,
        limit: Option<i64>,
        app_id: Option<String>,
        user_id: Option<String>,
        created_at: Option<DateTime<Utc>>,
    ) -> Result<ThreadListType> {
        let engine = ctx.data::<SharedEngine>()?;
        let filter = ThreadFilter {
            platform: Some(platform),
            app_id,
            user_id,
            created_at,
        };
        let page = monitored(
            "threadList",
            engine.thread_list(&filter, engine.page_request(page_number, limit)),
        )
        .await?;
        Ok(page.into())
    }
}
