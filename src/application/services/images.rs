use futures::StreamExt;
use serde::Serialize;
use tracing::{debug, info, warn};

use crate::domain::input::InputRecord;
use crate::domain::locator::ResourceLocator;
use crate::domain::resolver::{ProbeState, Resolver};
use crate::infrastructure::image_source::{ImageSource, LoadOutcome};

/// Outcome of probing every extension candidate for one guía.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Resolution {
    pub guia: String,
    /// Every URL tried, in order. The last one is the resolved URL on success.
    pub attempts: Vec<String>,
    pub url: Option<String>,
    pub state: ProbeState,
}

#[derive(Debug, Clone, Serialize)]
pub struct RecordResolution {
    pub ssc: String,
    pub guia: String,
    pub pdf_url: String,
    pub image: Resolution,
}

/// Drive a resolver to a terminal state, feeding it load outcomes from `source`.
#[tracing::instrument(skip(source, locator))]
pub async fn resolve_image(
    source: &dyn ImageSource,
    locator: &ResourceLocator,
    guia: &str,
) -> Resolution {
    resolve_with(source, locator, Resolver::new(guia)).await
}

pub(crate) async fn resolve_with(
    source: &dyn ImageSource,
    locator: &ResourceLocator,
    mut resolver: Resolver,
) -> Resolution {
    let mut attempts = Vec::new();
    resolver.arm();

    while !resolver.state().is_terminal() {
        let Some(url) = resolver.current_url(locator) else {
            break;
        };

        match source.load(&url).await {
            LoadOutcome::Loaded => resolver.succeed(),
            LoadOutcome::Failed => resolver.fail(),
        }
        debug!(url = %url, state = ?resolver.state(), "probed image candidate");
        attempts.push(url);
    }

    let url = resolver.current_url(locator);
    match &url {
        Some(url) => info!(guia = resolver.guia(), url = %url, "image resolved"),
        None => warn!(
            guia = resolver.guia(),
            attempts = attempts.len(),
            "no image found for any extension"
        ),
    }

    Resolution {
        guia: resolver.guia().to_string(),
        attempts,
        url,
        state: resolver.state(),
    }
}

/// Resolve a batch of records, at most `concurrency` at a time, keeping input order.
pub async fn resolve_records(
    source: &dyn ImageSource,
    locator: &ResourceLocator,
    records: &[InputRecord],
    concurrency: usize,
) -> Vec<RecordResolution> {
    futures::stream::iter(records)
        .map(|record| async move {
            let image = resolve_image(source, locator, &record.guia).await;
            RecordResolution {
                ssc: record.ssc.clone(),
                guia: record.guia.clone(),
                pdf_url: locator.pdf_url(&record.ssc),
                image,
            }
        })
        .buffered(concurrency.max(1))
        .collect()
        .await
}
