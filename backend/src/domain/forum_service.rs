//! Volunteer forum domain logic.

use anyhow::{anyhow, Result};
use chrono::Local;
use log::info;
use shared::{ForumCategory, ForumPost};
use std::sync::{Arc, Mutex};
use std::time::{SystemTime, UNIX_EPOCH};

use crate::domain::commands::forum::CreateForumPostCommand;

/// In-memory forum post store, newest first.
#[derive(Clone)]
pub struct ForumService {
    posts: Arc<Mutex<Vec<ForumPost>>>,
}

impl ForumService {
    pub fn new() -> Self {
        Self {
            posts: Arc::new(Mutex::new(seed_posts())),
        }
    }

    pub fn list(&self) -> Vec<ForumPost> {
        self.posts.lock().unwrap().clone()
    }

    /// Create a post with a generated id, today's date and a zero reply
    /// count. Blank title or content is rejected.
    pub fn create_post(&self, command: CreateForumPostCommand) -> Result<ForumPost> {
        if command.title.trim().is_empty() || command.content.trim().is_empty() {
            return Err(anyhow!("Title and content are required"));
        }
        let now_millis = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_millis())
            .unwrap_or_default();
        let post = ForumPost {
            id: now_millis.to_string(),
            title: command.title,
            author: if command.author.trim().is_empty() {
                "Anonymous".to_string()
            } else {
                command.author
            },
            date: Local::now().format("%Y-%m-%d").to_string(),
            category: command.category,
            content: command.content,
            replies: 0,
        };
        info!("Forum: created post '{}'", post.id);
        self.posts.lock().unwrap().insert(0, post.clone());
        Ok(post)
    }

    /// Insert or replace a post, keyed by id. Used by the admin editor.
    pub fn upsert(&self, post: ForumPost) -> Result<()> {
        if post.title.trim().is_empty() {
            return Err(anyhow!("Title cannot be empty"));
        }
        let mut posts = self.posts.lock().unwrap();
        match posts.iter_mut().find(|existing| existing.id == post.id) {
            Some(existing) => *existing = post,
            None => posts.insert(0, post),
        }
        Ok(())
    }

    pub fn remove(&self, id: &str) -> bool {
        let mut posts = self.posts.lock().unwrap();
        let before = posts.len();
        posts.retain(|post| post.id != id);
        posts.len() < before
    }
}

impl Default for ForumService {
    fn default() -> Self {
        Self::new()
    }
}

fn seed_posts() -> Vec<ForumPost> {
    vec![
        ForumPost {
            id: "f1".to_string(),
            title: "【招募】观音诞法会需要现场引导义工".to_string(),
            author: "弘法组".to_string(),
            date: "2024-03-01".to_string(),
            category: ForumCategory::Recruit,
            content: "下周日观音诞法会，现急需5名师兄协助现场秩序引导及签到工作。".to_string(),
            replies: 5,
        },
        ForumPost {
            id: "f2".to_string(),
            title: "请问初级禅修班报名还有名额吗？".to_string(),
            author: "慧心".to_string(),
            date: "2024-03-05".to_string(),
            category: ForumCategory::Qna,
            content: "想带朋友一起参加下个月的禅修班，不知道是否还能报名？感恩。".to_string(),
            replies: 2,
        },
        ForumPost {
            id: "f3".to_string(),
            title: "大寮清理积水，感恩几位师兄的付出".to_string(),
            author: "后勤组".to_string(),
            date: "2024-02-28".to_string(),
            category: ForumCategory::Sharing,
            content: "昨日暴雨，感恩张师兄、李师兄冒雨清理疏通，保证了道场的整洁。".to_string(),
            replies: 12,
        },
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    fn command(title: &str, content: &str) -> CreateForumPostCommand {
        CreateForumPostCommand {
            title: title.to_string(),
            content: content.to_string(),
            author: "慧心".to_string(),
            category: ForumCategory::Qna,
        }
    }

    #[test]
    fn test_create_post_prepends_newest_first() {
        let service = ForumService::new();
        let post = service.create_post(command("新问题", "内容")).unwrap();
        let list = service.list();
        assert_eq!(list[0].id, post.id);
        assert_eq!(list[0].replies, 0);
        assert_eq!(list.len(), 4);
    }

    #[test]
    fn test_blank_title_or_content_rejected() {
        let service = ForumService::new();
        assert!(service.create_post(command("  ", "内容")).is_err());
        assert!(service.create_post(command("标题", "")).is_err());
        assert_eq!(service.list().len(), 3);
    }

    #[test]
    fn test_blank_author_falls_back_to_anonymous() {
        let service = ForumService::new();
        let mut cmd = command("标题", "内容");
        cmd.author = String::new();
        let post = service.create_post(cmd).unwrap();
        assert_eq!(post.author, "Anonymous");
    }

    #[test]
    fn test_remove_by_id() {
        let service = ForumService::new();
        assert!(service.remove("f2"));
        assert!(!service.remove("f2"));
        assert_eq!(service.list().len(), 2);
    }
}
