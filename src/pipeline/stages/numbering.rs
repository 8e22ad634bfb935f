//! Channel numbering stage
//!
//! With a starting number every emitted channel is renumbered contiguously in
//! emission order. Without one the source numbers stand.

use tracing::debug;

use crate::models::Channel;

pub struct NumberingStage {
    starting_channel_number: Option<u32>,
}

impl NumberingStage {
    pub fn new(starting_channel_number: Option<u32>) -> Self {
        Self {
            starting_channel_number,
        }
    }

    pub fn process(&self, channels: &mut [Channel]) {
        let Some(start) = self.starting_channel_number else {
            return;
        };

        let mut next = start;
        for channel in channels.iter_mut() {
            channel.number = Some(next);
            next = next.saturating_add(1);
        }
        debug!("Assigned channel numbers {}..{} to {} channels", start, next, channels.len());
    }
}
