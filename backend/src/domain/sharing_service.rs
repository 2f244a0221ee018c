//! Sharing section domain logic: testimonial posts and their reaction
//! counters.

use anyhow::{anyhow, Result};
use chrono::Local;
use log::info;
use shared::{ReactionKind, Reactions, SharingPost};
use std::sync::{Arc, Mutex};
use std::time::{SystemTime, UNIX_EPOCH};

/// In-memory store of sharing posts. Reactions are plain counters with no
/// per-user tracking - any visitor may react any number of times.
#[derive(Clone)]
pub struct SharingService {
    posts: Arc<Mutex<Vec<SharingPost>>>,
}

impl SharingService {
    pub fn new() -> Self {
        Self {
            posts: Arc::new(Mutex::new(seed_posts())),
        }
    }

    pub fn list(&self) -> Vec<SharingPost> {
        self.posts.lock().unwrap().clone()
    }

    /// Increment one reaction counter on a post.
    pub fn react(&self, id: &str, kind: ReactionKind) -> Result<Reactions> {
        let mut posts = self.posts.lock().unwrap();
        let post = posts
            .iter_mut()
            .find(|post| post.id == id)
            .ok_or_else(|| anyhow!("Unknown sharing post '{id}'"))?;
        match kind {
            ReactionKind::Sadhu => post.reactions.sadhu += 1,
            ReactionKind::Rejoice => post.reactions.rejoice += 1,
            ReactionKind::Zen => post.reactions.zen += 1,
        }
        Ok(post.reactions)
    }

    /// Submit a new testimonial (user dashboard). Date defaults to today
    /// and counters start at zero.
    pub fn submit(&self, title: String, author: String, tag: String, content: String, image: Option<String>) -> Result<SharingPost> {
        if title.trim().is_empty() || content.trim().is_empty() {
            return Err(anyhow!("Title and content are required"));
        }
        let now_millis = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_millis())
            .unwrap_or_default();
        let post = SharingPost {
            id: now_millis.to_string(),
            title,
            author,
            date: Local::now().format("%Y-%m-%d").to_string(),
            content,
            tag,
            image,
            reactions: Reactions::default(),
        };
        info!("Sharing: submitted '{}'", post.id);
        self.posts.lock().unwrap().insert(0, post.clone());
        Ok(post)
    }

    /// Insert or replace a post, keyed by id. Used by the admin editor.
    pub fn upsert(&self, post: SharingPost) -> Result<()> {
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

impl Default for SharingService {
    fn default() -> Self {
        Self::new()
    }
}

fn seed_posts() -> Vec<SharingPost> {
    vec![
        SharingPost {
            id: "s1".to_string(),
            title: "在忙碌都市中找到内心的宁静".to_string(),
            author: "王慧心".to_string(),
            date: "2024-03-15".to_string(),
            tag: "禅修心得".to_string(),
            image: None,
            content: "自从参加了初级禅修班，学会了每天花十分钟观照呼吸，不再被情绪牵着走。"
                .to_string(),
            reactions: Reactions {
                sadhu: 12,
                rejoice: 5,
                zen: 3,
            },
        },
        SharingPost {
            id: "s2".to_string(),
            title: "《广论》学习改变了我的家庭关系".to_string(),
            author: "李志强".to_string(),
            date: "2024-02-28".to_string(),
            tag: "课程感悟".to_string(),
            image: None,
            content: "学习关于念死无常和业果的章节后，我开始反思自己对待家人的态度，更愿意倾听与付出。"
                .to_string(),
            reactions: Reactions {
                sadhu: 20,
                rejoice: 8,
                zen: 10,
            },
        },
        SharingPost {
            id: "s3".to_string(),
            title: "义工初体验：在大寮洗碗的修行".to_string(),
            author: "张明".to_string(),
            date: "2024-01-20".to_string(),
            tag: "义工日志".to_string(),
            image: None,
            content: "师兄告诉我，洗碗也是洗心。每一次擦拭碗盘，都是在擦拭自己内心的尘垢。"
                .to_string(),
            reactions: Reactions {
                sadhu: 33,
                rejoice: 2,
                zen: 5,
            },
        },
        SharingPost {
            id: "s4".to_string(),
            title: "点一盏心灯，照亮前程".to_string(),
            author: "陈美玲".to_string(),
            date: "2024-01-01".to_string(),
            tag: "法会随笔".to_string(),
            image: None,
            content: "看着大殿里万灯齐明的壮观景象，祈愿这盏灯能照亮所有在黑暗中迷茫的众生。"
                .to_string(),
            reactions: Reactions {
                sadhu: 45,
                rejoice: 12,
                zen: 8,
            },
        },
        SharingPost {
            id: "s5".to_string(),
            title: "抄经的静定力量".to_string(),
            author: "刘伟".to_string(),
            date: "2023-12-10".to_string(),
            tag: "修学日记".to_string(),
            image: None,
            content: "一笔一划地书写《心经》，脑海中的杂念随着墨迹沉淀下来，做事更加从容。"
                .to_string(),
            reactions: Reactions {
                sadhu: 15,
                rejoice: 4,
                zen: 2,
            },
        },
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_react_increments_only_the_chosen_counter() {
        let service = SharingService::new();
        let before = service.list()[0].reactions;
        let after = service.react("s1", ReactionKind::Sadhu).unwrap();
        assert_eq!(after.sadhu, before.sadhu + 1);
        assert_eq!(after.rejoice, before.rejoice);
        assert_eq!(after.zen, before.zen);
    }

    #[test]
    fn test_react_on_unknown_post_fails() {
        let service = SharingService::new();
        assert!(service.react("nope", ReactionKind::Zen).is_err());
    }

    #[test]
    fn test_repeated_reactions_keep_counting() {
        // No per-user throttling: the counter just increments.
        let service = SharingService::new();
        let base = service.list()[0].reactions.zen;
        for _ in 0..3 {
            service.react("s1", ReactionKind::Zen).unwrap();
        }
        assert_eq!(service.list()[0].reactions.zen, base + 3);
    }

    #[test]
    fn test_submit_prepends_with_fresh_counters() {
        let service = SharingService::new();
        let post = service
            .submit(
                "新的心得".to_string(),
                "学员".to_string(),
                "修学日记".to_string(),
                "内容".to_string(),
                None,
            )
            .unwrap();
        let list = service.list();
        assert_eq!(list[0].id, post.id);
        assert_eq!(list[0].reactions, Reactions::default());
    }

    #[test]
    fn test_submit_requires_title_and_content() {
        let service = SharingService::new();
        assert!(service
            .submit(String::new(), "a".into(), "t".into(), "c".into(), None)
            .is_err());
        assert!(service
            .submit("t".into(), "a".into(), "t".into(), "  ".into(), None)
            .is_err());
    }
}
