//! Admin dashboard domain logic: typed CRUD over the four content kinds.
//!
//! Each entity kind gets its own draft variant, selected by the active
//! tab, so field shapes never leak between unrelated entity types.

use anyhow::{anyhow, Result};
use log::info;
use shared::{AdminDraft, AdminEntityKind, ForumPost, SharingPost, TempleEvent};
use std::time::{SystemTime, UNIX_EPOCH};

use crate::domain::catalog_service::CatalogService;
use crate::domain::event_service::EventService;
use crate::domain::forum_service::ForumService;
use crate::domain::models::catalog::{CatalogItem, DonationCategory};
use crate::domain::sharing_service::SharingService;

#[derive(Clone)]
pub struct AdminService {
    events: EventService,
    catalog: CatalogService,
    sharing: SharingService,
    forum: ForumService,
}

impl AdminService {
    pub fn new(
        events: EventService,
        catalog: CatalogService,
        sharing: SharingService,
        forum: ForumService,
    ) -> Self {
        Self {
            events,
            catalog,
            sharing,
            forum,
        }
    }

    /// Save a draft: update when its id matches an existing record,
    /// insert with a fresh id otherwise. Returns the record id.
    pub fn save(&self, draft: AdminDraft) -> Result<String> {
        match draft {
            AdminDraft::Event(draft) => {
                let id = draft.id.unwrap_or_else(generate_id);
                self.events.upsert(TempleEvent {
                    id: id.clone(),
                    title: draft.title,
                    date: draft.date,
                    time: draft.time,
                    location: draft.location,
                    description: draft.description,
                    category: draft.category,
                })?;
                info!("Admin: saved event '{id}'");
                Ok(id)
            }
            AdminDraft::Catalog(draft) => {
                let id = draft.id.unwrap_or_else(generate_id);
                self.catalog.upsert(CatalogItem {
                    id: id.clone(),
                    title: draft.title,
                    description: draft.description,
                    min_amount: draft.min_amount,
                    image: draft.image,
                    category: category_from_dto(draft.category),
                    allow_installment: draft.allow_installment,
                })?;
                info!("Admin: saved catalog item '{id}'");
                Ok(id)
            }
            AdminDraft::Sharing(draft) => {
                let id = draft.id.unwrap_or_else(generate_id);
                let existing = self
                    .sharing
                    .list()
                    .into_iter()
                    .find(|post| post.id == id);
                self.sharing.upsert(SharingPost {
                    id: id.clone(),
                    title: draft.title,
                    author: draft.author,
                    date: draft.date,
                    content: draft.content,
                    tag: draft.tag,
                    image: draft.image,
                    // Edits must not wipe the counters a post has earned.
                    reactions: existing.map(|post| post.reactions).unwrap_or_default(),
                })?;
                info!("Admin: saved sharing post '{id}'");
                Ok(id)
            }
            AdminDraft::Forum(draft) => {
                let id = draft.id.unwrap_or_else(generate_id);
                let existing = self.forum.list().into_iter().find(|post| post.id == id);
                self.forum.upsert(ForumPost {
                    id: id.clone(),
                    title: draft.title,
                    author: draft.author,
                    date: existing
                        .as_ref()
                        .map(|post| post.date.clone())
                        .unwrap_or_else(|| chrono::Local::now().format("%Y-%m-%d").to_string()),
                    category: draft.category,
                    content: draft.content,
                    replies: existing.map(|post| post.replies).unwrap_or(0),
                })?;
                info!("Admin: saved forum post '{id}'");
                Ok(id)
            }
        }
    }

    pub fn delete(&self, kind: AdminEntityKind, id: &str) -> Result<()> {
        let removed = match kind {
            AdminEntityKind::Event => self.events.remove(id),
            AdminEntityKind::Catalog => self.catalog.remove(id),
            AdminEntityKind::Sharing => self.sharing.remove(id),
            AdminEntityKind::Forum => self.forum.remove(id),
        };
        if removed {
            info!("Admin: deleted {kind:?} '{id}'");
            Ok(())
        } else {
            Err(anyhow!("No {kind:?} record with id '{id}'"))
        }
    }
}

fn generate_id() -> String {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis())
        .unwrap_or_default()
        .to_string()
}

fn category_from_dto(category: shared::DonationCategory) -> DonationCategory {
    match category {
        shared::DonationCategory::Construction => DonationCategory::Construction,
        shared::DonationCategory::Dharma => DonationCategory::Dharma,
        shared::DonationCategory::Charity => DonationCategory::Charity,
        shared::DonationCategory::Academy => DonationCategory::Academy,
    }
}
