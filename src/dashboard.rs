use futures::future::join_all;
use serde::Serialize;
use tracing::warn;

use crate::api::Backend;
use crate::catalog::Resource;

#[derive(Debug, Clone, Serialize)]
pub struct ResourceCount {
    pub slug: &'static str,
    pub name: &'static str,
    pub count: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// Record count per resource, fetched concurrently.
/// One failing resource does not hide the others.
pub async fn summarize<B: Backend>(backend: &B, resources: &'static [Resource]) -> Vec<ResourceCount> {
    let fetches = resources.iter().map(|resource| async move {
        match backend.list(resource).await {
            Ok(records) => ResourceCount {
                slug: resource.slug,
                name: resource.name,
                count: Some(records.len()),
                error: None,
            },
            Err(e) => {
                warn!("Dashboard could not load {}: {}", resource.slug, e);
                ResourceCount {
                    slug: resource.slug,
                    name: resource.name,
                    count: None,
                    error: Some(e.to_string()),
                }
            }
        }
    });
    join_all(fetches).await
}
