//! Catalog registry: the seed list of donation offerings plus the admin
//! mutations that maintain it.

use anyhow::{anyhow, Result};
use log::info;
use std::sync::{Arc, Mutex};

use crate::domain::models::catalog::{CatalogItem, CategoryTab, DonationCategory};

/// Registry of donation offerings. Read-only from the cart's perspective;
/// admin edits never touch existing cart lines because lines copy the
/// catalog fields at add-time.
#[derive(Clone)]
pub struct CatalogService {
    items: Arc<Mutex<Vec<CatalogItem>>>,
}

impl CatalogService {
    pub fn new() -> Self {
        Self {
            items: Arc::new(Mutex::new(seed_items())),
        }
    }

    /// List offerings under a marketplace tab.
    pub fn list(&self, tab: CategoryTab) -> Vec<CatalogItem> {
        self.items
            .lock()
            .unwrap()
            .iter()
            .filter(|item| item.category.in_tab(tab))
            .cloned()
            .collect()
    }

    pub fn get(&self, id: &str) -> Option<CatalogItem> {
        self.items
            .lock()
            .unwrap()
            .iter()
            .find(|item| item.id == id)
            .cloned()
    }

    /// Insert or replace an offering, keyed by id. Used by the admin
    /// editor.
    pub fn upsert(&self, item: CatalogItem) -> Result<()> {
        item.validate().map_err(|e| anyhow!(e))?;
        let mut items = self.items.lock().unwrap();
        match items.iter_mut().find(|existing| existing.id == item.id) {
            Some(existing) => {
                info!("Catalog: updated '{}'", item.id);
                *existing = item;
            }
            None => {
                info!("Catalog: added '{}'", item.id);
                items.push(item);
            }
        }
        Ok(())
    }

    /// Remove an offering by id.
    pub fn remove(&self, id: &str) -> bool {
        let mut items = self.items.lock().unwrap();
        let before = items.len();
        items.retain(|item| item.id != id);
        items.len() < before
    }
}

impl Default for CatalogService {
    fn default() -> Self {
        Self::new()
    }
}

/// The six seed offerings carried over from the temple's launch content.
fn seed_items() -> Vec<CatalogItem> {
    vec![
        CatalogItem {
            id: "light".to_string(),
            title: "全年光明灯 (Light Offering)".to_string(),
            description: "燃灯供佛，破除黑暗，增长智慧。祈愿阖家福慧增长，前途光明。($100/年)"
                .to_string(),
            min_amount: 100,
            image: Some("https://manjuwisdom.org/images/kongmengteng.jpg".to_string()),
            category: DonationCategory::Dharma,
            allow_installment: false,
        },
        CatalogItem {
            id: "buddha".to_string(),
            title: "供养琉璃佛像 (Crystal Buddha)".to_string(),
            description: "庄严道场，供养万尊琉璃佛像。功德主芳名将永久留存于佛像座下。"
                .to_string(),
            min_amount: 500,
            image: Some("https://manjuwisdom.org/images/buddha.jpg".to_string()),
            category: DonationCategory::Construction,
            allow_installment: true,
        },
        CatalogItem {
            id: "academy".to_string(),
            title: "佛学教育助学金".to_string(),
            description: "支持寺院课程开发、经典翻译与贫困学生学费减免，培育僧才与弘法人才。"
                .to_string(),
            min_amount: 50,
            image: Some("https://images.unsplash.com/photo-1434030216411".to_string()),
            category: DonationCategory::Academy,
            allow_installment: false,
        },
        CatalogItem {
            id: "general".to_string(),
            title: "建寺安僧与弘法基金".to_string(),
            description: "护持道场日常运作，安顿僧众生活，举办弘法利生之活动。".to_string(),
            min_amount: 20,
            image: Some("https://images.unsplash.com/photo-1598555235282".to_string()),
            category: DonationCategory::Charity,
            allow_installment: false,
        },
        CatalogItem {
            id: "flower".to_string(),
            title: "佛前供花 (Flower Offering)".to_string(),
            description: "愿此香花云，遍满十方界。供养佛前花，以此功德庄严身相。".to_string(),
            min_amount: 30,
            image: Some("https://manjuwisdom.org/images/flower.jpg".to_string()),
            category: DonationCategory::Dharma,
            allow_installment: false,
        },
        CatalogItem {
            id: "brick".to_string(),
            title: "建寺功德砖".to_string(),
            description: "添砖加瓦，共建如来之家。每一块砖都是您护持正法的见证。".to_string(),
            min_amount: 100,
            image: Some("https://pei.gebis.org/images/brick.jpg".to_string()),
            category: DonationCategory::Construction,
            allow_installment: false,
        },
    ]
}
