use std::sync::Arc;

use anyhow::Context;
use pharmacy_catalog_admin::core::config::Config;
use pharmacy_catalog_admin::features::categories::models::{Category, DragItem, DragMove};
use pharmacy_catalog_admin::features::categories::services::{
    Notifier, ReorderOutcome, TracingNotifier,
};
use pharmacy_catalog_admin::features::categories::{
    AdminApiClient, MutationGateway, Reconciler, TreeStore,
};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use uuid::Uuid;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env file BEFORE initializing logger so RUST_LOG is available
    let _ = dotenvy::dotenv();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = Config::from_env().map_err(|e| anyhow::anyhow!(e))?;
    tracing::info!(
        "Configuration loaded (admin API: {})",
        config.admin_api.base_url
    );

    let api = Arc::new(AdminApiClient::new(config.admin_api.clone())?);
    let notifier: Arc<dyn Notifier> = Arc::new(TracingNotifier);
    let gateway = Arc::new(MutationGateway::new(
        api,
        TreeStore::shared(),
        Arc::clone(&notifier),
    ));
    let reconciler = Reconciler::new(gateway, notifier, config.reorder.clone());

    reconciler.refresh().await?;

    let args: Vec<String> = std::env::args().skip(1).collect();
    if let Some(movement) = parse_move(&args)? {
        match reconciler.on_drag_end(movement).await? {
            ReorderOutcome::Unchanged => tracing::info!("Nothing to move"),
            ReorderOutcome::Persisted => tracing::info!("New order saved"),
            ReorderOutcome::RolledBack { reason } => {
                anyhow::bail!("Reorder was rolled back: {}", reason)
            }
        }
    }

    print_outline(&reconciler.snapshot().await);
    Ok(())
}

fn parse_id(value: Option<&String>, name: &str) -> anyhow::Result<Uuid> {
    let value = value.with_context(|| format!("missing <{}>", name))?;
    Uuid::parse_str(value).with_context(|| format!("invalid <{}>: {}", name, value))
}

/// `move-category <active> <over>` or
/// `move-subcategory <active> <active-parent> <over> <over-parent>`
fn parse_move(args: &[String]) -> anyhow::Result<Option<DragMove>> {
    match args.first().map(String::as_str) {
        None => Ok(None),
        Some("move-category") => Ok(Some(DragMove::new(
            DragItem::Category {
                id: parse_id(args.get(1), "active")?,
            },
            DragItem::Category {
                id: parse_id(args.get(2), "over")?,
            },
        ))),
        Some("move-subcategory") => Ok(Some(DragMove::new(
            DragItem::Subcategory {
                id: parse_id(args.get(1), "active")?,
                parent_id: parse_id(args.get(2), "active-parent")?,
            },
            DragItem::Subcategory {
                id: parse_id(args.get(3), "over")?,
                parent_id: parse_id(args.get(4), "over-parent")?,
            },
        ))),
        Some(other) => anyhow::bail!("unknown command: {}", other),
    }
}

fn print_outline(tree: &[Category]) {
    for (position, category) in tree.iter().enumerate() {
        println!(
            "{:>3}. {} [{}] {}{}",
            position + 1,
            category.name,
            category.slug,
            category.id,
            if category.is_active { "" } else { " (inactive)" }
        );
        for subcategory in &category.subcategories {
            println!(
                "       - {} [{}] {}{}",
                subcategory.name,
                subcategory.slug,
                subcategory.id,
                if subcategory.is_active {
                    ""
                } else {
                    " (inactive)"
                }
            );
        }
    }
}
