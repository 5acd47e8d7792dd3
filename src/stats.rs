use crate::entity::{EntityId, Role};
use crate::interaction::Kill;
use glam::DVec2;
use std::collections::VecDeque;

/// Maximum number of kill feed items
pub const MAX_KILL_FEED_ITEMS: usize = 5;
/// Lifetime of a kill feed item in simulated milliseconds
pub const KILL_FEED_DURATION_MS: f64 = 5000.0;
/// Items start fading after this many milliseconds
pub const KILL_FEED_FADE_MS: f64 = 1000.0;

#[derive(Clone, Debug)]
pub struct KillFeedItem {
    pub eater: EntityId,
    pub eater_role: Role,
    pub eaten: EntityId,
    pub at_ms: f64,
    pub position: DVec2,
}

impl KillFeedItem {
    /// Display opacity at `now_ms`: opaque at first, then a linear fade.
    pub fn alpha(&self, now_ms: f64) -> f32 {
        let age = now_ms - self.at_ms;
        if age <= KILL_FEED_FADE_MS {
            1.0
        } else {
            let fade = (age - KILL_FEED_FADE_MS) / (KILL_FEED_DURATION_MS - KILL_FEED_FADE_MS);
            (1.0 - fade).clamp(0.0, 1.0) as f32
        }
    }
}

/// Running population counts and recent deaths.
#[derive(Clone, Debug, Default)]
pub struct ScoreBoard {
    pub kill_feed: VecDeque<KillFeedItem>,
    pub total_kills: usize,
    pub predator_count: usize,
    pub prey_count: usize,
}

impl ScoreBoard {
    pub fn new() -> Self {
        ScoreBoard {
            kill_feed: VecDeque::with_capacity(MAX_KILL_FEED_ITEMS),
            ..Default::default()
        }
    }

    #[inline]
    pub fn add_kill(&mut self, kill: &Kill, at_ms: f64) {
        let item = KillFeedItem {
            eater: kill.eater,
            eater_role: kill.eater_role,
            eaten: kill.eaten,
            at_ms,
            position: kill.position,
        };

        if self.kill_feed.len() >= MAX_KILL_FEED_ITEMS {
            self.kill_feed.pop_front();
        }
        self.kill_feed.push_back(item);
        self.total_kills += 1;
    }

    #[inline]
    pub fn update_counts(&mut self, predators: usize, prey: usize) {
        self.predator_count = predators;
        self.prey_count = prey;
    }

    pub fn cleanup_old_kills(&mut self, now_ms: f64) {
        while let Some(item) = self.kill_feed.front() {
            if now_ms - item.at_ms > KILL_FEED_DURATION_MS {
                self.kill_feed.pop_front();
            } else {
                break;
            }
        }
    }
}
