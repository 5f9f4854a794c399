#![forbid(unsafe_code)]

//! Items shown on the cards.
//!
//! Items are supplied once when a stack is built and never change while the
//! stack lives. The [`ItemId`] is the rotation key: the ordering engine only
//! ever moves ids around, the payload rides along untouched.

use std::fmt;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Stable identifier of an item within one stack.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(transparent))]
pub struct ItemId(pub u32);

impl fmt::Display for ItemId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

impl From<u32> for ItemId {
    fn from(id: u32) -> Self {
        Self(id)
    }
}

/// An application-supplied card payload.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Item {
    pub id: ItemId,
    pub title: String,
    /// Image reference, opaque to the core (URL, asset key, path).
    pub image: String,
    #[cfg_attr(
        feature = "serde",
        serde(default, skip_serializing_if = "Option::is_none")
    )]
    pub description: Option<String>,
}

impl Item {
    /// Create an item without a description.
    #[must_use]
    pub fn new(id: impl Into<ItemId>, title: impl Into<String>, image: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            title: title.into(),
            image: image.into(),
            description: None,
        }
    }

    /// Attach a description (builder pattern).
    #[must_use]
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// The four gradient cards of the stock demo stack.
    #[must_use]
    pub fn demo_set() -> Vec<Item> {
        vec![
            Item::new(1, "State 1", "gradient-new.png")
                .with_description("Purple to pink gradient blend"),
            Item::new(2, "State 2", "gradient-smooth.png")
                .with_description("Smooth gradient transition"),
            Item::new(3, "State 3", "gradient-flow.png")
                .with_description("Organic flowing color blend"),
            Item::new(4, "State 4", "gradient-blend.png")
                .with_description("Blue and coral gradient blend"),
        ]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn demo_set_has_unique_ids() {
        let items = Item::demo_set();
        assert_eq!(items.len(), 4);
        let mut ids: Vec<_> = items.iter().map(|i| i.id).collect();
        ids.sort();
        ids.dedup();
        assert_eq!(ids.len(), 4);
    }

    #[test]
    fn builder_sets_description() {
        let item = Item::new(7, "Seven", "seven.png").with_description("lucky");
        assert_eq!(item.id, ItemId(7));
        assert_eq!(item.description.as_deref(), Some("lucky"));
    }

    #[test]
    fn id_display() {
        assert_eq!(ItemId(3).to_string(), "#3");
    }
}
