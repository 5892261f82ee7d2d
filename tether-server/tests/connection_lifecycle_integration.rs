use anyhow::Result;
use chrono::Utc;
use uuid::Uuid;

use tether_server::db::repositories::{ConnectionRepository, PostRepository};
use tether_server::db::Database;
use tether_types::{ConnectionStatus, Post};

fn fresh_db() -> Result<Database> {
    let db = Database::in_memory()?;
    db.seed_test_data()?;
    Ok(db)
}

fn user(n: u32) -> Uuid {
    Uuid::parse_str(&format!("550e8400-e29b-41d4-a716-4466554400{:02}", n)).unwrap()
}

/// Full lifecycle: request, accept, and the effect on both users' feeds.
#[tokio::test]
async fn test_accept_flow_opens_feeds_both_ways() -> Result<()> {
    let db = fresh_db()?;
    let connections = ConnectionRepository::new(db.pool.clone());
    let posts = PostRepository::new(db.pool.clone());

    let dave = user(4);
    let erin = user(5);

    // No relationship yet: erin's posts are invisible to dave
    let peers = connections.accepted_counterpart_ids(&dave)?;
    assert!(!peers.contains(&erin));

    let request_id = connections.create_request(&dave, &erin, Some("We met at RustConf"))?;
    let pending = connections.get_by_id(&request_id)?.unwrap();
    assert_eq!(pending.status, ConnectionStatus::Pending);
    assert_eq!(pending.message.as_deref(), Some("We met at RustConf"));

    // A pending request grants nothing
    assert!(!connections.accepted_counterpart_ids(&dave)?.contains(&erin));

    assert_eq!(connections.respond(&request_id, ConnectionStatus::Accepted)?, 1);

    // Acceptance is symmetric: each sees the other's posts
    let dave_peers = connections.accepted_counterpart_ids(&dave)?;
    let erin_peers = connections.accepted_counterpart_ids(&erin)?;
    assert!(dave_peers.contains(&erin));
    assert!(erin_peers.contains(&dave));

    let dave_feed = posts.get_feed(&dave_peers, 0, 50)?;
    assert!(dave_feed.iter().all(|p| p.author_id != dave));
    assert!(dave_feed.iter().any(|p| p.author_id == erin));

    Ok(())
}

/// A declined request stays declined and keeps the pair occupied.
#[tokio::test]
async fn test_decline_is_terminal_and_blocks_reconnection() -> Result<()> {
    let db = fresh_db()?;
    let connections = ConnectionRepository::new(db.pool.clone());

    let carol = user(3);
    let erin = user(5);

    let request_id = connections.create_request(&carol, &erin, None)?;
    assert_eq!(connections.respond(&request_id, ConnectionStatus::Declined)?, 1);

    // The terminal state cannot be flipped
    assert_eq!(connections.respond(&request_id, ConnectionStatus::Accepted)?, 0);
    let row = connections.get_by_id(&request_id)?.unwrap();
    assert_eq!(row.status, ConnectionStatus::Declined);

    // Either party looking for a fresh start still finds the old row,
    // which is what the API-level duplicate check keys on
    assert!(connections.find_between(&erin, &carol)?.is_some());
    assert!(connections.find_between(&carol, &erin)?.is_some());

    Ok(())
}

/// The feed over seeded data: only accepted connections' posts, newest
/// first, paginated, never the viewer's own.
#[tokio::test]
async fn test_feed_assembly_over_seeded_graph() -> Result<()> {
    let db = fresh_db()?;
    let connections = ConnectionRepository::new(db.pool.clone());
    let posts = PostRepository::new(db.pool.clone());

    let alice = user(1);

    // Seed graph: alice is connected to bob and carol; dave is only pending
    let peers = connections.accepted_counterpart_ids(&alice)?;
    assert_eq!(peers.len(), 2);
    assert!(peers.contains(&user(2)));
    assert!(peers.contains(&user(3)));

    let feed = posts.get_feed(&peers, 0, 50)?;
    assert!(!feed.is_empty());
    assert!(feed.iter().all(|p| peers.contains(&p.author_id)));
    assert!(feed.iter().all(|p| p.author_id != alice));
    assert!(feed.windows(2).all(|w| w[0].created_at >= w[1].created_at));

    // Pagination walks the same ordering without gaps or overlaps
    let page1 = posts.get_feed(&peers, 0, 1)?;
    let page2 = posts.get_feed(&peers, 1, 1)?;
    assert_eq!(page1.len(), 1);
    assert_eq!(page2.len(), 1);
    assert_ne!(page1[0].id, page2[0].id);
    assert_eq!(page1[0].id, feed[0].id);

    Ok(())
}

/// New posts by a connection surface in the feed immediately; the join
/// happens at read time.
#[tokio::test]
async fn test_new_post_appears_in_connection_feed() -> Result<()> {
    let db = fresh_db()?;
    let connections = ConnectionRepository::new(db.pool.clone());
    let posts = PostRepository::new(db.pool.clone());

    let alice = user(1);
    let bob = user(2);

    let post = Post {
        id: Uuid::new_v4(),
        author_id: bob,
        author_name: String::new(),
        content: "Shipped the new release today".to_string(),
        created_at: Utc::now(),
        like_count: 0,
        comment_count: 0,
        viewer_has_liked: None,
    };
    posts.create(&post)?;

    let peers = connections.accepted_counterpart_ids(&alice)?;
    let feed = posts.get_feed(&peers, 0, 50)?;

    assert_eq!(feed[0].id, post.id);
    assert_eq!(feed[0].author_name, "Bob Okafor");

    Ok(())
}
