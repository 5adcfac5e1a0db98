use super::models::NormalizedEvent;
use super::ordering::ALL_CATEGORIES;

/// Category half of a search
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CategoryFilter {
    All,
    Only(String),
}

impl From<&str> for CategoryFilter {
    fn from(category: &str) -> Self {
        if category.is_empty() || category == ALL_CATEGORIES {
            CategoryFilter::All
        } else {
            CategoryFilter::Only(category.to_string())
        }
    }
}

/// Free-text query plus category, matched against a batch
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EventQuery {
    needle: String,
    category: CategoryFilter,
}

impl EventQuery {
    pub fn new(query: &str, category: &str) -> Self {
        Self {
            needle: query.to_lowercase(),
            category: CategoryFilter::from(category),
        }
    }

    /// Query that matches everything
    pub fn everything() -> Self {
        Self::new("", ALL_CATEGORIES)
    }

    /// Case-insensitive substring match on title, description or
    /// location, and an exact tag match unless the category is `all`
    pub fn matches(&self, event: &NormalizedEvent) -> bool {
        let matches_text = self.needle.is_empty()
            || [&event.title, &event.description, &event.location]
                .iter()
                .any(|field| field.to_lowercase().contains(&self.needle));

        let matches_category = match &self.category {
            CategoryFilter::All => true,
            CategoryFilter::Only(tag) => event.tag == *tag,
        };

        matches_text && matches_category
    }
}
