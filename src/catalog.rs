//! Prompt catalog: story categories and their canned prompts.
//!
//! The catalog is plain data. It is built once at startup, either from the
//! built-in content or from `[[catalog]]` tables in the config file, and
//! handed to the sidebar as a whole.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};

/// Built-in story categories, in display order.
const BUILTIN: &[(&str, &[&str])] = &[
    (
        "Comic Stories",
        &[
            "Tell me a story about two funny rabbits who discover a secret carrot cave",
            "Tell me a comic story about a lazy lion who hates waking up",
            "Tell me a comic story about a monkey who wants to be a king",
            "Tell me a funny story about a cat who thinks he can fly",
            "Tell me a comic story about a buffalo who joins a dance class",
        ],
    ),
    (
        "Adventure",
        &[
            "Tell me an adventure story about a boy who finds a talking map",
            "Tell me a story about a forest adventure with hidden treasure",
            "Tell me a story about two friends who travel in a flying boat",
            "Tell me an adventure story about a glowing mountain",
            "Tell me an adventure story about a girl searching for a golden feather",
        ],
    ),
    (
        "Moral Stories",
        &[
            "Tell me a moral story about honesty",
            "Tell me a moral story about helping others",
            "Tell me a moral story about sharing",
            "Tell me a moral story about respecting elders",
            "Tell me a moral story about friendship",
        ],
    ),
    (
        "Festival Tales",
        &[
            "Tell me a Diwali story for kids",
            "Tell me a Christmas story for kids",
            "Tell me an Eid story for kids",
            "Tell me a Sankranti story for kids",
            "Tell me a Holi story for kids",
        ],
    ),
    (
        "Animal Stories",
        &[
            "Tell me a story about a clever fox and a kind deer",
            "Tell me a story about a brave baby elephant",
            "Tell me a story about a parrot and a squirrel who become friends",
            "Tell me a story about a tiger who learns to share",
            "Tell me a story about a dog who becomes a hero",
        ],
    ),
    (
        "Space / Sci-Fi",
        &[
            "Tell me a story about two kids who visit Mars",
            "Tell me a story about a robot who wants to learn music",
            "Tell me a story about a space zoo",
            "Tell me a story about a glowing alien who needs help",
            "Tell me a story about a spaceship made of candy",
        ],
    ),
    (
        "Magic / Fantasy",
        &[
            "Tell me a story about a magical talking tree",
            "Tell me a story about a girl with a flying umbrella",
            "Tell me a story about a wizard and a tiny dragon",
            "Tell me a story about a magical rainbow bridge",
            "Tell me a fantasy story about a wish-granting river",
        ],
    ),
    (
        "Bedtime Calm",
        &[
            "Tell me a slow bedtime story with moon and stars",
            "Tell me a bedtime story about clouds and dreams",
            "Tell me a bedtime story about a sleepy panda",
            "Tell me a bedtime story about a floating island",
            "Tell me a bedtime story about a baby whale",
        ],
    ),
    (
        "Funny Stories",
        &[
            "Tell me a funny story about a talking potato",
            "Tell me a funny story about a dancing goat",
            "Tell me a funny story about slippers that run away",
            "Tell me a funny story about a fish who tells jokes",
            "Tell me a funny story about a penguin who hates snow",
        ],
    ),
    (
        "Friendship",
        &[
            "Tell me a story about four friends who save their village",
            "Tell me a story about best friends who never give up",
            "Tell me a story about two friends who build a secret clubhouse",
            "Tell me a story about friendship and trust",
            "Tell me a story about friends who learn to work together",
        ],
    ),
];

/// A category as it appears in the config file.
#[derive(Debug, Clone, Default, Deserialize, Serialize, PartialEq, Eq)]
#[serde(default)]
pub struct CategoryConfig {
    pub name: String,
    pub prompts: Vec<String>,
}

/// A named group of prompts.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Category {
    pub name: String,
    pub prompts: Vec<String>,
}

/// Ordered, read-only collection of prompt categories.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PromptCatalog {
    categories: Vec<Category>,
}

impl PromptCatalog {
    /// The built-in catalog: ten categories of five prompts each.
    pub fn builtin() -> Self {
        let categories = BUILTIN
            .iter()
            .map(|(name, prompts)| Category {
                name: name.to_string(),
                prompts: prompts.iter().map(|p| p.to_string()).collect(),
            })
            .collect();
        Self { categories }
    }

    /// Build a catalog from config tables.
    ///
    /// Categories keep their declared order. Blank names, empty categories and
    /// repeated names are dropped. Falls back to the built-in catalog when
    /// nothing usable is left.
    pub fn from_config(entries: &[CategoryConfig]) -> Self {
        let mut seen = HashSet::new();
        let mut categories = Vec::new();

        for entry in entries {
            let name = entry.name.trim();
            if name.is_empty() {
                tracing::warn!("skipping catalog entry without a name");
                continue;
            }
            if !seen.insert(name.to_string()) {
                tracing::warn!(category = name, "skipping duplicate catalog category");
                continue;
            }

            let prompts: Vec<String> = entry
                .prompts
                .iter()
                .map(|p| p.trim())
                .filter(|p| !p.is_empty())
                .map(str::to_string)
                .collect();
            if prompts.is_empty() {
                tracing::warn!(category = name, "skipping catalog category without prompts");
                continue;
            }

            categories.push(Category {
                name: name.to_string(),
                prompts,
            });
        }

        if categories.is_empty() {
            Self::builtin()
        } else {
            Self { categories }
        }
    }

    /// All categories in declared order.
    pub fn categories(&self) -> &[Category] {
        &self.categories
    }

    /// Look up a category by name.
    pub fn get(&self, name: &str) -> Option<&Category> {
        self.categories.iter().find(|c| c.name == name)
    }

    /// Index of the category with the given name.
    pub fn position(&self, name: &str) -> Option<usize> {
        self.categories.iter().position(|c| c.name == name)
    }

    pub fn len(&self) -> usize {
        self.categories.len()
    }

    pub fn is_empty(&self) -> bool {
        self.categories.is_empty()
    }
}

impl Default for PromptCatalog {
    fn default() -> Self {
        Self::builtin()
    }
}
