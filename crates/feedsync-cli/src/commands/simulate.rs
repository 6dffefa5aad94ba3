//! `feedsync simulate`: one profile edit against in-memory collaborators.

use anyhow::{Context, Result};
use chrono::{Duration, Utc};
use clap::Args;
use feedsync_application::ProfileEditUseCase;
use feedsync_core::cache::QueryKey;
use feedsync_core::config::FeedsyncConfig;
use feedsync_core::feed::{FeedItem, FeedPage, PaginatedCollection};
use feedsync_core::user::{OwnerSnapshot, ProfileEditRequest, UserId, UserRecord};
use feedsync_infrastructure::avatar_file::load_avatar_payload;
use feedsync_infrastructure::{
    ChannelNotifier, InMemoryAvatarStore, InMemoryProfileRepository, InMemoryQueryCache,
    RefreshSignal,
};
use std::path::PathBuf;
use std::sync::Arc;
use uuid::Uuid;

#[derive(Args, Debug)]
pub struct SimulateArgs {
    /// New biography text
    #[arg(long)]
    pub bio: String,

    /// New display name (defaults to the current one)
    #[arg(long)]
    pub display_name: Option<String>,

    /// Image file to upload as the new avatar
    #[arg(long)]
    pub avatar: Option<PathBuf>,

    /// Make the profile write fail
    #[arg(long)]
    pub fail_profile: bool,

    /// Make the avatar upload fail
    #[arg(long)]
    pub fail_upload: bool,

    /// Start a feed fetch before the edit and resolve it afterwards with
    /// pre-edit data
    #[arg(long)]
    pub in_flight: bool,
}

const AVATAR_BASE_URL: &str = "https://cdn.feedsync.local/avatars";

fn signed_in_user() -> UserRecord {
    UserRecord {
        id: UserId::new("u1"),
        username: "alice".to_string(),
        display_name: "Alice".to_string(),
        bio: "Writes about caches.".to_string(),
        avatar_url: Some("old.png".to_string()),
    }
}

fn other_user() -> OwnerSnapshot {
    OwnerSnapshot {
        id: UserId::new("u2"),
        username: "bob".to_string(),
        display_name: "Bob".to_string(),
        bio: "Mostly lurks.".to_string(),
        avatar_url: Some("bob.png".to_string()),
    }
}

fn snapshot_of(record: &UserRecord) -> OwnerSnapshot {
    OwnerSnapshot {
        id: record.id.clone(),
        username: record.username.clone(),
        display_name: record.display_name.clone(),
        bio: record.bio.clone(),
        avatar_url: record.avatar_url.clone(),
    }
}

/// Builds a feed of `pages` pages, alternating authors.
fn demo_feed(pages: usize, per_page: usize) -> PaginatedCollection {
    let authors = [snapshot_of(&signed_in_user()), other_user()];
    let mut collection = PaginatedCollection::new();
    let mut param = None;

    for page in 0..pages {
        let items = (0..per_page)
            .map(|i| FeedItem {
                id: Uuid::new_v4().to_string(),
                content: format!("post {} on page {}", i, page),
                created_at: Utc::now() - Duration::minutes((page * per_page + i) as i64),
                owner: authors[(page + i) % authors.len()].clone(),
            })
            .collect();
        let next = (page + 1 < pages).then(|| format!("cursor-{}", page + 1));
        collection.push_page(param.take(), FeedPage::new(items, next.clone()));
        param = next;
    }

    collection
}

fn feed_keys() -> Vec<QueryKey> {
    vec![
        QueryKey::new(["post-feed", "for-you"]),
        QueryKey::new(["post-feed", "following"]),
        QueryKey::new(["post-feed", "user-posts", "u1"]),
    ]
}

pub async fn run(args: SimulateArgs, config: &FeedsyncConfig) -> Result<()> {
    let user = signed_in_user();
    let repository = Arc::new(InMemoryProfileRepository::new(user.clone()));
    let uploader = Arc::new(InMemoryAvatarStore::new(AVATAR_BASE_URL));
    let cache = Arc::new(InMemoryQueryCache::new());
    for key in feed_keys() {
        cache.insert(key, demo_feed(3, 4)).await;
    }
    // Registered but never fetched
    cache.register(QueryKey::new(["post-feed", "trending"])).await;

    if args.fail_profile {
        repository.fail_next();
    }
    if args.fail_upload {
        uploader.fail_next();
    }

    let (notifier, mut notifications) = ChannelNotifier::new();
    let refresh = Arc::new(RefreshSignal::new());
    let usecase = ProfileEditUseCase::new(
        repository,
        uploader,
        cache.clone(),
        Arc::new(notifier),
        refresh.clone(),
        config,
    );

    let mut request = ProfileEditRequest::new(
        args.display_name.unwrap_or_else(|| user.display_name.clone()),
        args.bio,
    );
    if let Some(path) = &args.avatar {
        let payload = load_avatar_payload(path)
            .await
            .with_context(|| format!("Failed to load avatar {}", path.display()))?;
        request = request.with_avatar(payload);
    }

    let probe_key = QueryKey::new(["post-feed", "for-you"]);
    let stale_fetch = if args.in_flight {
        Some(cache.begin_fetch(probe_key.clone()).await?)
    } else {
        None
    };

    let outcome = usecase.submit_profile_edit(request).await;

    if let Some(ticket) = stale_fetch {
        let stored = cache.complete_fetch(ticket, demo_feed(3, 4)).await?;
        println!(
            "In-flight fetch for {} {}",
            probe_key,
            if stored { "overwrote the cache" } else { "was discarded" }
        );
    }

    println!("{}", serde_json::to_string_pretty(&outcome)?);

    while let Ok(notification) = notifications.try_recv() {
        match notification.reason {
            Some(reason) => println!(
                "[{:?}] {} ({})",
                notification.kind, notification.message, reason
            ),
            None => println!("[{:?}] {}", notification.kind, notification.message),
        }
    }
    println!("Refresh requests: {}", refresh.request_count());

    for key in feed_keys() {
        let Some(collection) = cache.get(&key).await else {
            continue;
        };
        let owned: Vec<_> = collection
            .items()
            .filter(|item| item.owner.id == user.id)
            .collect();
        let summary = owned
            .first()
            .map(|item| {
                format!(
                    "bio={:?} avatar={:?}",
                    item.owner.bio,
                    item.owner.avatar_url.as_deref().unwrap_or("-")
                )
            })
            .unwrap_or_else(|| "no items".to_string());
        println!("{} ({} items by {}): {}", key, owned.len(), user.id, summary);
    }

    Ok(())
}
