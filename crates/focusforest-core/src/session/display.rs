//! Presentation-facing derived values.
//!
//! None of these hold state; a renderer calls them with values taken from a
//! [`SessionSnapshot`](super::SessionSnapshot).

use serde::{Deserialize, Serialize};

/// Smallest tree size, at 0% progress.
pub const TREE_BASE_SIZE: f64 = 48.0;
/// Largest tree size, at 100% progress.
pub const TREE_MAX_SIZE: f64 = 120.0;

pub const COMPLETION_TITLE: &str = "Congratulations!";
pub const COMPLETION_MESSAGE: &str = "Your tree has grown fully. Great work on staying focused!";
pub const WITHER_MESSAGE: &str = "You left before the session ended. Your tree has withered.";
pub const WARNING_MESSAGE: &str = "Leaving now will wither your tree. Continue focusing or leave?";
pub const EMPTY_FOREST_MESSAGE: &str =
    "Your forest is empty. Complete a focus session to grow your first tree!";

/// Which tree visual to draw.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GrowthStage {
    /// Under half way: a two-leaf sprout.
    Sapling,
    /// Half way or more: a full conifer.
    Tree,
    Withered,
}

impl GrowthStage {
    /// Pick the stage for a progress fraction in `[0, 1]`.
    pub fn for_progress(fraction: f64, withering: bool) -> Self {
        if withering {
            GrowthStage::Withered
        } else if fraction < 0.5 {
            GrowthStage::Sapling
        } else {
            GrowthStage::Tree
        }
    }
}

/// `M:SS`, minutes unpadded: `25:00`, `0:09`.
pub fn format_time(secs: u64) -> String {
    format!("{}:{:02}", secs / 60, secs % 60)
}

/// Label of the forest button, e.g. `Your Forest (3 trees)`.
pub fn forest_label(trees: usize) -> String {
    format!("Your Forest ({trees} trees)")
}

/// Tree size interpolated linearly between the base and max size.
pub fn tree_size(fraction: f64) -> f64 {
    let f = fraction.clamp(0.0, 1.0);
    TREE_BASE_SIZE + f * (TREE_MAX_SIZE - TREE_BASE_SIZE)
}
