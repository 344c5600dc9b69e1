use std::sync::Arc;

use anyhow::Context;

use watchdesk_app::{DemoDashboard, Fixture};
use watchdesk_core::ProviderConfig;
use watchdesk_dialog::HeadlessSurface;
use watchdesk_router::GuardConfig;

/// Usage: `watchdesk [FIXTURE.json] [PATH...]`
///
/// Replays the given paths, or the fixture's own navigations when none are
/// given, and logs where each one landed.
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    watchdesk_observability::init();

    let mut args = std::env::args().skip(1);
    let fixture = match args.next() {
        Some(path) => Fixture::load(&path).with_context(|| format!("loading fixture {path}"))?,
        None => {
            tracing::warn!("no fixture given; using the built-in demo session");
            Fixture::demo().context("parsing built-in demo fixture")?
        }
    };
    let requested: Vec<String> = args.collect();

    let config = GuardConfig::from_env().context("reading guard configuration")?;
    match ProviderConfig::from_env() {
        Ok(provider) => tracing::info!(
            project_id = %provider.project_id,
            "provider configured; replay still uses the in-memory session"
        ),
        Err(err) => tracing::warn!(%err, "provider not configured; using in-memory session"),
    }

    let surface = Arc::new(HeadlessSurface::new());
    let (dashboard, _, _) = DemoDashboard::from_fixture(&fixture, config, surface.clone())
        .context("building route table")?;

    let paths = if requested.is_empty() {
        fixture.navigations.clone()
    } else {
        requested
    };

    for path in &paths {
        match dashboard.visit(path).await {
            Ok(navigation) => {
                let outcome = serde_json::to_string(&navigation.hops)?;
                tracing::info!(
                    requested = %path,
                    landed = %navigation.landed,
                    redirected = navigation.was_redirected(),
                    hops = %outcome,
                    "replayed navigation"
                );
            }
            Err(err) => tracing::error!(requested = %path, %err, "navigation failed"),
        }
    }

    tracing::info!(
        visited = paths.len(),
        toasts = surface.attached().len(),
        current = ?dashboard.current(),
        "replay finished"
    );
    Ok(())
}
