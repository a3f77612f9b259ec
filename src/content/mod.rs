//! Static learning-center catalog: articles and guides with category
//! filtering and an optional link back to a catalog program.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Category {
    Science,
    Recovery,
    Device,
}

impl Category {
    pub fn label(&self) -> &'static str {
        match self {
            Category::Science => "Science",
            Category::Recovery => "Recovery",
            Category::Device => "Device",
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum MediaKind {
    Article,
    Video,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Article {
    pub id: String,
    pub title: String,
    pub description: String,
    pub category: Category,
    pub read_time_min: u32,
    pub author: String,
    pub hero_image: String,
    #[serde(rename = "type")]
    pub kind: MediaKind,
    pub related_program_id: Option<String>,
    pub featured: bool,
}

pub fn articles() -> Vec<Article> {
    vec![
        Article {
            id: "1".to_string(),
            title: "The Science of Contrast Therapy".to_string(),
            description: "Understanding how alternating hot and cold temperatures accelerate recovery through vascular pumping.".to_string(),
            category: Category::Science,
            read_time_min: 5,
            author: "Dr. Recovery".to_string(),
            hero_image: "https://images.unsplash.com/photo-1576091160399-112ba8d25d1d?w=800&q=80".to_string(),
            kind: MediaKind::Article,
            related_program_id: Some("official-1".to_string()),
            featured: true,
        },
        Article {
            id: "2".to_string(),
            title: "Optimal Recovery Timing".to_string(),
            description: "When to use cold therapy vs heat therapy for maximum benefit.".to_string(),
            category: Category::Recovery,
            read_time_min: 4,
            author: "Sarah Chen".to_string(),
            hero_image: "https://images.unsplash.com/photo-1571019613454-1cb2f99b2d8b?w=800&q=80".to_string(),
            kind: MediaKind::Article,
            related_program_id: None,
            featured: false,
        },
        Article {
            id: "3".to_string(),
            title: "Device Setup Guide".to_string(),
            description: "Step-by-step instructions for getting the most out of your 3Covery device.".to_string(),
            category: Category::Device,
            read_time_min: 3,
            author: "3Covery Team".to_string(),
            hero_image: "https://images.unsplash.com/photo-1581091226825-a6a2a5aee158?w=800&q=80".to_string(),
            kind: MediaKind::Video,
            related_program_id: None,
            featured: false,
        },
        Article {
            id: "4".to_string(),
            title: "Compression Therapy Benefits".to_string(),
            description: "How pneumatic compression enhances circulation and reduces muscle soreness.".to_string(),
            category: Category::Science,
            read_time_min: 6,
            author: "Dr. James Wilson".to_string(),
            hero_image: "https://images.unsplash.com/photo-1571019614242-c5c5dee9f50b?w=800&q=80".to_string(),
            kind: MediaKind::Article,
            related_program_id: Some("official-2".to_string()),
            featured: false,
        },
    ]
}

/// Articles in a category, or every article when no filter is given.
pub fn articles_in(category: Option<Category>) -> Vec<Article> {
    articles()
        .into_iter()
        .filter(|article| category.map_or(true, |wanted| article.category == wanted))
        .collect()
}

pub fn featured_article() -> Option<Article> {
    articles().into_iter().find(|article| article.featured)
}

pub fn article_by_id(id: &str) -> Option<Article> {
    articles().into_iter().find(|article| article.id == id)
}
