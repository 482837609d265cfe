use std::{collections::HashMap, fs, path::Path, time::Duration};

use anyhow::Context;
use url::Url;

use crate::{
    controller::NavigationSettings,
    navigation::{DEFAULT_BREAKPOINT, HEADER_OFFSET, SCROLL_DURATION},
    page::{region::RegionRegistry, Page},
};

pub const SETTINGS_FILE: &str = "console.toml";

#[derive(Debug, Clone, PartialEq)]
pub struct ConsoleSettings {
    pub base_url: String,
    /// Page fetched at startup for its meta tags and controls.
    pub start_path: String,
    /// Used when the start page carries no CSRF meta tags.
    pub csrf_header: Option<String>,
    pub csrf_token: Option<String>,
    /// Base actions of single containers, keyed by element id.
    pub region_actions: HashMap<String, String>,
    pub breakpoint: f64,
    pub header_offset: f64,
    pub scroll_duration_ms: u64,
    pub queue_capacity: usize,
    pub log_filter: String,
}

impl Default for ConsoleSettings {
    fn default() -> Self {
        Self {
            base_url: "http://127.0.0.1:8080/".into(),
            start_path: String::new(),
            csrf_header: None,
            csrf_token: None,
            region_actions: HashMap::new(),
            breakpoint: DEFAULT_BREAKPOINT,
            header_offset: HEADER_OFFSET,
            scroll_duration_ms: SCROLL_DURATION.as_millis() as u64,
            queue_capacity: 64,
            log_filter: "info".into(),
        }
    }
}

impl ConsoleSettings {
    pub fn base_url(&self) -> anyhow::Result<Url> {
        Url::parse(&self.base_url).with_context(|| format!("invalid base url '{}'", self.base_url))
    }

    pub fn region_overrides(&self) -> anyhow::Result<HashMap<String, Url>> {
        let base = self.base_url()?;
        self.region_actions
            .iter()
            .map(|(region, action)| {
                let url = base.join(action).with_context(|| {
                    format!("invalid action '{action}' for region '{region}'")
                })?;
                Ok((region.clone(), url))
            })
            .collect()
    }

    pub fn navigation(&self) -> NavigationSettings {
        NavigationSettings {
            breakpoint: self.breakpoint,
            header_offset: self.header_offset,
            scroll_duration: Duration::from_millis(self.scroll_duration_ms),
        }
    }

    /// Page with every container bound to its base action.
    pub fn build_page(&self) -> anyhow::Result<Page> {
        let base = self.base_url()?;
        let regions = RegionRegistry::new(&base, &self.region_overrides()?);
        Ok(Page::new(base, regions))
    }
}

/// Defaults, then `console.toml` in the working directory, then the
/// environment.
pub fn load_settings() -> anyhow::Result<ConsoleSettings> {
    load_settings_from(Path::new(SETTINGS_FILE), |key| std::env::var(key).ok())
}

pub fn load_settings_from(
    path: &Path,
    env: impl Fn(&str) -> Option<String>,
) -> anyhow::Result<ConsoleSettings> {
    let mut settings = ConsoleSettings::default();

    if let Ok(raw) = fs::read_to_string(path) {
        apply_file(&mut settings, &raw)
            .with_context(|| format!("failed to read settings from '{}'", path.display()))?;
    }
    apply_env(&mut settings, env);

    Ok(settings)
}

fn apply_file(settings: &mut ConsoleSettings, raw: &str) -> anyhow::Result<()> {
    let table: toml::Table = toml::from_str(raw)?;
    let text = |key: &str| table.get(key).and_then(|v| v.as_str()).map(str::to_string);
    let number = |key: &str| {
        table
            .get(key)
            .and_then(|v| v.as_float().or_else(|| v.as_integer().map(|i| i as f64)))
    };

    if let Some(v) = text("base_url") {
        settings.base_url = v;
    }
    if let Some(v) = text("start_path") {
        settings.start_path = v;
    }
    if let Some(v) = text("csrf_header") {
        settings.csrf_header = Some(v);
    }
    if let Some(v) = text("csrf_token") {
        settings.csrf_token = Some(v);
    }
    if let Some(v) = number("breakpoint") {
        settings.breakpoint = v;
    }
    if let Some(v) = number("header_offset") {
        settings.header_offset = v;
    }
    if let Some(v) = table.get("scroll_duration_ms").and_then(|v| v.as_integer()) {
        settings.scroll_duration_ms = u64::try_from(v).context("scroll_duration_ms is negative")?;
    }
    if let Some(v) = table.get("queue_capacity").and_then(|v| v.as_integer()) {
        settings.queue_capacity = usize::try_from(v).context("queue_capacity is negative")?;
    }
    if let Some(v) = text("log_filter") {
        settings.log_filter = v;
    }
    if let Some(actions) = table.get("actions").and_then(|v| v.as_table()) {
        for (region, action) in actions {
            if let Some(action) = action.as_str() {
                settings
                    .region_actions
                    .insert(region.clone(), action.to_string());
            }
        }
    }
    Ok(())
}

fn apply_env(settings: &mut ConsoleSettings, env: impl Fn(&str) -> Option<String>) {
    if let Some(v) = env("CONSOLE_BASE_URL") {
        settings.base_url = v;
    }
    if let Some(v) = env("APP__BASE_URL") {
        settings.base_url = v;
    }

    if let Some(v) = env("APP__START_PATH") {
        settings.start_path = v;
    }

    if let Some(v) = env("CONSOLE_CSRF_HEADER") {
        settings.csrf_header = Some(v);
    }
    if let Some(v) = env("CONSOLE_CSRF_TOKEN") {
        settings.csrf_token = Some(v);
    }

    if let Some(v) = env("APP__BREAKPOINT") {
        if let Ok(parsed) = v.parse::<f64>() {
            settings.breakpoint = parsed;
        }
    }
    if let Some(v) = env("APP__HEADER_OFFSET") {
        if let Ok(parsed) = v.parse::<f64>() {
            settings.header_offset = parsed;
        }
    }
    if let Some(v) = env("APP__SCROLL_DURATION_MS") {
        if let Ok(parsed) = v.parse::<u64>() {
            settings.scroll_duration_ms = parsed;
        }
    }
    if let Some(v) = env("APP__QUEUE_CAPACITY") {
        if let Ok(parsed) = v.parse::<usize>() {
            settings.queue_capacity = parsed;
        }
    }

    if let Some(v) = env("RUST_LOG") {
        settings.log_filter = v;
    }
    if let Some(v) = env("APP__LOG_FILTER") {
        settings.log_filter = v;
    }
}

#[cfg(test)]
#[path = "tests/config_tests.rs"]
mod tests;
