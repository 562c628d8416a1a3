//! Settings table and the in-app switchboard.

use anyhow::Result;
use clap::Subcommand;
use dracin_model::{
    AppAd, AppAnnounce, AppConfig, FeatureToggle, ListQuery, settings_entries,
};
use serde_json::Value;

use super::{Context, render};

#[derive(Subcommand, Debug)]
pub enum SettingsAction {
    List,
    Get { key: String },
    /// Store a value; valid JSON is stored as-is, anything else as a string
    Set { key: String, value: String },
    Delete { key: String },
}

#[derive(Subcommand, Debug)]
pub enum AppAction {
    /// Show the switchboard, or flip the global toggles
    Config {
        #[arg(long)]
        active: Option<bool>,
        #[arg(long)]
        live: Option<bool>,
    },
    Ads {
        #[arg(long = "type")]
        kind: Option<String>,
        #[arg(long)]
        status: Option<String>,
        #[arg(long)]
        page: Option<u32>,
    },
    Announces {
        #[arg(long)]
        page: Option<u32>,
    },
}

/// Interpret CLI input as JSON when it parses, otherwise as a plain string.
pub fn parse_setting_value(raw: &str) -> Value {
    serde_json::from_str(raw).unwrap_or_else(|_| Value::String(raw.to_string()))
}

fn compact(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

pub async fn settings(ctx: &Context, action: SettingsAction) -> Result<()> {
    const SCOPE: &str = "settings";
    match action {
        SettingsAction::List => {
            ctx.show_flash(SCOPE);
            let map = ctx.client.list_settings().await?;
            if ctx.json {
                return render::print_json(&map);
            }
            let entries = settings_entries(map);
            render::print_list(false, &entries, &["KEY", "VALUE"], |entry| {
                vec![entry.key.clone(), compact(&entry.value)]
            })
        }
        SettingsAction::Get { key } => {
            let setting = ctx.client.get_setting(&key).await?;
            if ctx.json {
                return render::print_json(&setting);
            }
            println!("{}", compact(&setting.value));
            Ok(())
        }
        SettingsAction::Set { key, value } => {
            let ack = ctx
                .client
                .put_setting(&key, parse_setting_value(&value))
                .await?;
            ctx.acknowledged(SCOPE, &ack);
            Ok(())
        }
        SettingsAction::Delete { key } => {
            let ack = ctx.client.delete_setting(&key).await?;
            ctx.acknowledged(SCOPE, &ack);
            Ok(())
        }
    }
}

fn toggle(feature: &FeatureToggle) -> String {
    let state = if feature.is_enable { "on" } else { "off" };
    match &feature.id {
        Some(id) => format!("{state} (#{id})"),
        None => state.to_string(),
    }
}

fn print_config(config: &AppConfig) {
    render::print_fields(&[
        ("active", render::yes_no(config.global.is_active).into()),
        ("live", render::yes_no(config.global.is_live).into()),
        ("notification", toggle(&config.notification)),
        ("ads", toggle(&config.ads)),
        ("redirect", toggle(&config.redirect)),
        ("announce", toggle(&config.announce)),
    ]);
}

fn ad_row(ad: &AppAd) -> Vec<String> {
    vec![
        ad.id.to_string(),
        ad.unit_name.clone(),
        render::or_dash(ad.kind.as_deref()),
        render::or_dash(ad.status.as_deref()),
        render::or_dash(ad.app_id.as_deref()),
    ]
}

fn announce_row(announce: &AppAnnounce) -> Vec<String> {
    vec![
        announce.id.to_string(),
        announce.unit_name.clone(),
        render::or_dash(announce.unit_description.as_deref()),
    ]
}

pub async fn app(ctx: &Context, action: AppAction) -> Result<()> {
    const SCOPE: &str = "app";
    match action {
        AppAction::Config { active, live } => {
            ctx.show_flash(SCOPE);
            let mut config = ctx.client.app_config().await?;
            if active.is_some() || live.is_some() {
                if let Some(active) = active {
                    config.global.is_active = active;
                }
                if let Some(live) = live {
                    config.global.is_live = live;
                }
                let ack = ctx.client.update_app_config(&config).await?;
                ctx.acknowledged(SCOPE, &ack);
            }
            if ctx.json {
                return render::print_json(&config);
            }
            print_config(&config);
            Ok(())
        }
        AppAction::Ads { kind, status, page } => {
            let query = ListQuery {
                page,
                kind,
                status,
                ..Default::default()
            };
            let page = ctx.client.list_ads(&query).await?;
            render::print_page(
                ctx.json,
                &page,
                &["ID", "UNIT", "TYPE", "STATUS", "APP ID"],
                ad_row,
            )
        }
        AppAction::Announces { page } => {
            let query = ListQuery {
                page,
                ..Default::default()
            };
            let page = ctx.client.list_announces(&query).await?;
            render::print_page(
                ctx.json,
                &page,
                &["ID", "UNIT", "DESCRIPTION"],
                announce_row,
            )
        }
    }
}
