//! Orders, plans and providers.

use std::fs;
use std::io::Write as _;
use std::path::PathBuf;

use anyhow::{Context as _, Result};
use clap::Subcommand;
use dracin_model::{
    OrderQuery, PaymentOrder, PaymentPlan, PaymentProvider, ResourceId,
};
use tracing::info;

use super::{Context, render};

const SCOPE: &str = "orders";

#[derive(Subcommand, Debug)]
pub enum OrderAction {
    List {
        #[command(flatten)]
        filters: OrderFilters,
        #[arg(long)]
        page: Option<u32>,
        #[arg(long)]
        per_page: Option<u32>,
        #[arg(long, short)]
        q: Option<String>,
    },
    Get { id: ResourceId },
    /// Re-check the order with its payment provider
    Sync { id: ResourceId },
    Cancel { id: ResourceId },
    /// Download matching orders as CSV
    Export {
        #[command(flatten)]
        filters: OrderFilters,
        /// Write to this file instead of stdout
        #[arg(long, short)]
        output: Option<PathBuf>,
    },
}

#[derive(clap::Args, Debug, Default)]
pub struct OrderFilters {
    #[arg(long)]
    pub status: Option<String>,
    #[arg(long)]
    pub provider: Option<String>,
    /// Created on or after (YYYY-MM-DD)
    #[arg(long)]
    pub from: Option<String>,
    /// Created on or before (YYYY-MM-DD)
    #[arg(long)]
    pub to: Option<String>,
}

impl OrderFilters {
    fn into_query(self) -> OrderQuery {
        OrderQuery {
            status: self.status,
            provider: self.provider,
            created_from: self.from,
            created_to: self.to,
            ..Default::default()
        }
    }
}

#[derive(Subcommand, Debug)]
pub enum PlanAction {
    List {
        #[arg(long)]
        active_only: bool,
    },
}

#[derive(Subcommand, Debug)]
pub enum ProviderAction {
    List,
}

fn amount(value: f64, currency: Option<&str>) -> String {
    format!("{} {value:.0}", currency.unwrap_or(dracin_model::payments::DEFAULT_CURRENCY))
}

fn order_row(order: &PaymentOrder) -> Vec<String> {
    let user = order
        .user
        .as_ref()
        .and_then(|u| u.email.clone().or_else(|| u.display_name.clone()));
    vec![
        order.id.to_string(),
        render::or_dash(order.invoice_number.as_deref()),
        render::or_dash(user),
        amount(order.amount, order.currency.as_deref()),
        render::or_dash(order.provider.as_deref()),
        render::or_dash(order.status.as_deref()),
        render::or_dash(order.created_at.as_deref()),
    ]
}

pub async fn orders(ctx: &Context, action: OrderAction) -> Result<()> {
    match action {
        OrderAction::List {
            filters,
            page,
            per_page,
            q,
        } => {
            ctx.show_flash(SCOPE);
            let query = OrderQuery {
                page,
                per_page,
                q,
                ..filters.into_query()
            };
            let page = ctx.client.list_orders(&query).await?;
            render::print_page(
                ctx.json,
                &page,
                &["ID", "INVOICE", "USER", "AMOUNT", "PROVIDER", "STATUS", "CREATED"],
                order_row,
            )
        }
        OrderAction::Get { id } => {
            let order = ctx.client.get_order(&id).await?;
            if ctx.json {
                return render::print_json(&order);
            }
            let user = order.user.as_ref().and_then(|u| u.email.clone());
            render::print_fields(&[
                ("id", order.id.to_string()),
                ("invoice", render::or_dash(order.invoice_number.as_deref())),
                ("user", render::or_dash(user)),
                ("amount", amount(order.amount, order.currency.as_deref())),
                ("provider", render::or_dash(order.provider.as_deref())),
                ("method", render::or_dash(order.method.as_deref())),
                ("status", render::or_dash(order.status.as_deref())),
                ("payment url", render::or_dash(order.payment_url.as_deref())),
                ("premium until", render::or_dash(order.premium_until.as_deref())),
                ("paid", render::or_dash(order.paid_at.as_deref())),
                ("expires", render::or_dash(order.expires_at.as_deref())),
                ("created", render::or_dash(order.created_at.as_deref())),
            ]);
            Ok(())
        }
        OrderAction::Sync { id } => {
            let ack = ctx.client.sync_order(&id).await?;
            ctx.acknowledged(SCOPE, &ack);
            Ok(())
        }
        OrderAction::Cancel { id } => {
            let ack = ctx.client.cancel_order(&id).await?;
            ctx.acknowledged(SCOPE, &ack);
            Ok(())
        }
        OrderAction::Export { filters, output } => {
            let csv = ctx.client.export_orders(&filters.into_query()).await?;
            match output {
                Some(path) => {
                    fs::write(&path, &csv)
                        .with_context(|| format!("writing {}", path.display()))?;
                    info!(path = %path.display(), bytes = csv.len(), "orders exported");
                    println!("{} ({})", path.display(), render::format_bytes(csv.len() as u64));
                }
                None => std::io::stdout()
                    .write_all(&csv)
                    .context("writing CSV to stdout")?,
            }
            Ok(())
        }
    }
}

fn plan_row(plan: &PaymentPlan) -> Vec<String> {
    let duration = match (plan.duration_count, plan.period.as_deref()) {
        (Some(count), Some(period)) => format!("{count} {period}"),
        (None, Some(period)) => period.to_string(),
        _ => "-".to_string(),
    };
    vec![
        plan.id.to_string(),
        plan.label.clone(),
        amount(plan.amount, plan.currency.as_deref()),
        duration,
        render::or_dash(plan.code.as_deref()),
        render::yes_no(plan.active).to_string(),
    ]
}

pub async fn plans(ctx: &Context, action: PlanAction) -> Result<()> {
    match action {
        PlanAction::List { active_only } => {
            ctx.show_flash("plans");
            let plans = ctx.client.list_plans(active_only).await?;
            render::print_list(
                ctx.json,
                &plans,
                &["ID", "LABEL", "AMOUNT", "DURATION", "CODE", "ACTIVE"],
                plan_row,
            )
        }
    }
}

fn provider_row(provider: &PaymentProvider) -> Vec<String> {
    let methods: Vec<&str> =
        provider.methods.iter().map(|m| m.code.as_str()).collect();
    vec![
        provider.id.to_string(),
        provider.code.clone(),
        render::or_dash(provider.name.as_deref()),
        render::or_dash(provider.status.as_deref()),
        render::yes_no(provider.selected).to_string(),
        methods.join(", "),
    ]
}

pub async fn providers(ctx: &Context, action: ProviderAction) -> Result<()> {
    match action {
        ProviderAction::List => {
            ctx.show_flash("providers");
            let providers = ctx.client.list_providers().await?;
            render::print_list(
                ctx.json,
                &providers,
                &["ID", "CODE", "NAME", "STATUS", "SELECTED", "METHODS"],
                provider_row,
            )
        }
    }
}
