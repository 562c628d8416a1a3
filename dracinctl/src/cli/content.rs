//! Users and the content catalogue.

use anyhow::Result;
use clap::{Args, Subcommand};
use dracin_model::{
    ContentQuery, Episode, ResourceId, Series, Tag, TagPayload, User, UserQuery,
    UserUpdate,
};

use super::{Context, render};

#[derive(Args, Debug, Default)]
pub struct Paging {
    #[arg(long)]
    pub page: Option<u32>,
    #[arg(long)]
    pub per_page: Option<u32>,
    /// Search term
    #[arg(long, short)]
    pub q: Option<String>,
}

impl Paging {
    fn content_query(self, series_id: Option<ResourceId>) -> ContentQuery {
        ContentQuery {
            page: self.page,
            per_page: self.per_page,
            q: self.q,
            series_id,
        }
    }
}

#[derive(Subcommand, Debug)]
pub enum UserAction {
    List {
        #[command(flatten)]
        paging: Paging,
        #[arg(long)]
        premium: Option<bool>,
        #[arg(long)]
        disabled: Option<bool>,
        #[arg(long)]
        sort: Option<String>,
    },
    Get { id: ResourceId },
    Disable { id: ResourceId },
    Enable { id: ResourceId },
    Delete { id: ResourceId },
}

#[derive(Subcommand, Debug)]
pub enum SeriesAction {
    List {
        #[command(flatten)]
        paging: Paging,
    },
    Get { id: ResourceId },
    Delete { id: ResourceId },
}

#[derive(Subcommand, Debug)]
pub enum EpisodeAction {
    List {
        #[command(flatten)]
        paging: Paging,
        #[arg(long)]
        series: Option<ResourceId>,
    },
}

#[derive(Subcommand, Debug)]
pub enum TagAction {
    List {
        #[command(flatten)]
        paging: Paging,
    },
    Create {
        name: String,
        #[arg(long)]
        slug: Option<String>,
        #[arg(long)]
        description: Option<String>,
        /// Alternative spelling (repeatable)
        #[arg(long = "alias")]
        aliases: Vec<String>,
    },
    Delete { id: ResourceId },
}

fn user_row(user: &User) -> Vec<String> {
    vec![
        user.id.to_string(),
        render::or_dash(user.email.as_deref()),
        render::or_dash(user.display_name.as_deref()),
        render::yes_no(user.is_premium).to_string(),
        render::or_dash(user.premium_until.as_deref()),
        render::yes_no(user.disabled).to_string(),
    ]
}

pub async fn users(ctx: &Context, action: UserAction) -> Result<()> {
    const SCOPE: &str = "users";
    match action {
        UserAction::List {
            paging,
            premium,
            disabled,
            sort,
        } => {
            ctx.show_flash(SCOPE);
            let query = UserQuery {
                page: paging.page,
                per_page: paging.per_page,
                q: paging.q,
                disabled,
                is_premium: premium,
                sort,
            };
            let page = ctx.client.list_users(&query).await?;
            render::print_page(
                ctx.json,
                &page,
                &["ID", "EMAIL", "NAME", "PREMIUM", "UNTIL", "DISABLED"],
                user_row,
            )
        }
        UserAction::Get { id } => {
            let user = ctx.client.get_user(&id).await?;
            if ctx.json {
                return render::print_json(&user);
            }
            render::print_fields(&[
                ("id", user.id.to_string()),
                ("email", render::or_dash(user.email.as_deref())),
                ("name", render::or_dash(user.display_name.as_deref())),
                ("premium", render::yes_no(user.is_premium).into()),
                ("premium until", render::or_dash(user.premium_until.as_deref())),
                ("disabled", render::yes_no(user.disabled).into()),
                ("created", render::or_dash(user.created_at.as_deref())),
            ]);
            Ok(())
        }
        UserAction::Disable { id } => set_disabled(ctx, &id, true).await,
        UserAction::Enable { id } => set_disabled(ctx, &id, false).await,
        UserAction::Delete { id } => {
            let ack = ctx.client.delete_user(&id).await?;
            ctx.acknowledged(SCOPE, &ack);
            Ok(())
        }
    }
}

async fn set_disabled(ctx: &Context, id: &ResourceId, disabled: bool) -> Result<()> {
    let update = UserUpdate {
        disabled: Some(disabled),
        ..Default::default()
    };
    let ack = ctx.client.update_user(id, &update).await?;
    ctx.acknowledged("users", &ack);
    Ok(())
}

fn series_row(series: &Series) -> Vec<String> {
    vec![
        series.id.to_string(),
        series.name.clone(),
        render::or_dash(series.key.as_deref()),
        render::or_dash(series.episode_count),
        render::or_dash(series.uploaded_at.as_deref()),
    ]
}

pub async fn series(ctx: &Context, action: SeriesAction) -> Result<()> {
    const SCOPE: &str = "series";
    match action {
        SeriesAction::List { paging } => {
            ctx.show_flash(SCOPE);
            let page = ctx.client.list_series(&paging.content_query(None)).await?;
            render::print_page(
                ctx.json,
                &page,
                &["ID", "NAME", "KEY", "EPISODES", "UPLOADED"],
                series_row,
            )
        }
        SeriesAction::Get { id } => {
            let series = ctx.client.get_series(&id).await?;
            if ctx.json {
                return render::print_json(&series);
            }
            let tags: Vec<&str> = series.tags.iter().map(|t| t.name.as_str()).collect();
            render::print_fields(&[
                ("id", series.id.to_string()),
                ("name", series.name.clone()),
                ("key", render::or_dash(series.key.as_deref())),
                ("source", render::or_dash(series.source.as_deref())),
                ("episodes", render::or_dash(series.episode_count)),
                ("uploaded", render::or_dash(series.uploaded_at.as_deref())),
                ("tags", if tags.is_empty() { "-".into() } else { tags.join(", ") }),
            ]);
            Ok(())
        }
        SeriesAction::Delete { id } => {
            let ack = ctx.client.delete_series(&id).await?;
            ctx.acknowledged(SCOPE, &ack);
            Ok(())
        }
    }
}

fn episode_row(episode: &Episode) -> Vec<String> {
    vec![
        episode.id.to_string(),
        render::or_dash(episode.series_id.as_ref()),
        render::or_dash(episode.episode_number),
        render::or_dash(episode.filename.as_deref()),
        episode
            .size
            .map_or_else(|| "-".to_string(), render::format_bytes),
    ]
}

pub async fn episodes(ctx: &Context, action: EpisodeAction) -> Result<()> {
    match action {
        EpisodeAction::List { paging, series } => {
            ctx.show_flash("episodes");
            let page = ctx
                .client
                .list_episodes(&paging.content_query(series))
                .await?;
            render::print_page(
                ctx.json,
                &page,
                &["ID", "SERIES", "EP", "FILE", "SIZE"],
                episode_row,
            )
        }
    }
}

fn tag_row(tag: &Tag) -> Vec<String> {
    vec![
        tag.id.to_string(),
        tag.name.clone(),
        render::or_dash(tag.slug.as_deref()),
        tag.aliases.join(", "),
    ]
}

pub async fn tags(ctx: &Context, action: TagAction) -> Result<()> {
    const SCOPE: &str = "tags";
    match action {
        TagAction::List { paging } => {
            ctx.show_flash(SCOPE);
            let page = ctx.client.list_tags(&paging.content_query(None)).await?;
            render::print_page(
                ctx.json,
                &page,
                &["ID", "NAME", "SLUG", "ALIASES"],
                tag_row,
            )
        }
        TagAction::Create {
            name,
            slug,
            description,
            aliases,
        } => {
            let payload = TagPayload {
                name: Some(name),
                slug,
                description,
                aliases: (!aliases.is_empty()).then_some(aliases),
            };
            let ack = ctx.client.create_tag(&payload).await?;
            ctx.acknowledged(SCOPE, &ack);
            Ok(())
        }
        TagAction::Delete { id } => {
            let ack = ctx.client.delete_tag(&id).await?;
            ctx.acknowledged(SCOPE, &ack);
            Ok(())
        }
    }
}
