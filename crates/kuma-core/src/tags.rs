//! Tag name → id resolution
//!
//! Tags are unique by name within the monitor service, but every API
//! operation wants an id. The resolver memoizes name→id lookups for the
//! duration of a run so repeated groups cost no extra remote calls.

use crate::error::Result;
use crate::model::TagId;
use crate::session::Session;
use crate::traits::MonitorService;
use std::collections::HashMap;
use tracing::{debug, info};

/// In-run tag id cache
///
/// Single-threaded use only; concurrent creation races are not guarded.
#[derive(Debug, Default)]
pub struct TagResolver {
    cache: HashMap<String, TagId>,
}

impl TagResolver {
    pub fn new() -> Self {
        Self::default()
    }

    /// Resolve a tag name to its id, creating the tag if absent
    ///
    /// A duplicate-create error is treated as "already exists" and
    /// resolved by re-querying the tag listing.
    pub async fn get_or_create<S: MonitorService>(
        &mut self,
        session: &Session<S>,
        name: &str,
    ) -> Result<TagId> {
        if let Some(&id) = self.cache.get(name) {
            debug!("Tag '{}' resolved from cache (id {})", name, id);
            return Ok(id);
        }

        if let Some(id) = self.lookup(session, name).await? {
            self.cache.insert(name.to_string(), id);
            return Ok(id);
        }

        match session.invoke(|s| Box::pin(s.create_tag(name))).await {
            Ok(tag) => {
                info!("Created tag '{}' (id {})", name, tag.id);
                self.cache.insert(name.to_string(), tag.id);
                Ok(tag.id)
            }
            Err(e) if e.is_duplicate() => {
                debug!("Tag '{}' created concurrently, re-querying", name);
                let id = self
                    .lookup(session, name)
                    .await?
                    .ok_or(e)?;
                self.cache.insert(name.to_string(), id);
                Ok(id)
            }
            Err(e) => Err(e),
        }
    }

    async fn lookup<S: MonitorService>(
        &self,
        session: &Session<S>,
        name: &str,
    ) -> Result<Option<TagId>> {
        let tags = session.invoke(|s| Box::pin(s.tags())).await?;
        Ok(tags.into_iter().find(|t| t.name == name).map(|t| t.id))
    }
}
