use std::collections::{BTreeMap, HashMap};

use crate::host::{ActorId, MessageText, Messenger, TitleUpdate};
use crate::scheduler::{PeriodicTask, TaskId, TickScheduler};

/// Coalesces `bigtitle`/`subtitle` directives into one title packet per actor
/// per tick. Later pushes within a tick overwrite earlier ones.
#[derive(Debug, Default)]
pub struct TitleBatcher {
    titles: HashMap<ActorId, MessageText>,
    subtitles: HashMap<ActorId, MessageText>,
    task: Option<TaskId>,
}

impl TitleBatcher {
    pub fn new() -> Self {
        Self::default()
    }

    /// Install the per-tick flush, cancelling any flush installed before.
    pub fn enable(&mut self, scheduler: &mut TickScheduler, period_millis: u64) {
        self.disable(scheduler);
        self.task = Some(scheduler.schedule_repeating(period_millis, PeriodicTask::FlushTitles));
    }

    pub fn disable(&mut self, scheduler: &mut TickScheduler) {
        if let Some(task) = self.task.take() {
            scheduler.cancel(task);
        }
    }

    pub fn is_enabled(&self) -> bool {
        self.task.is_some()
    }

    pub fn push_title(&mut self, actor: &ActorId, text: MessageText) {
        self.titles.insert(actor.clone(), text);
    }

    pub fn push_subtitle(&mut self, actor: &ActorId, text: MessageText) {
        self.subtitles.insert(actor.clone(), text);
    }

    pub fn has_pending(&self, actor: &ActorId) -> bool {
        self.titles.contains_key(actor) || self.subtitles.contains_key(actor)
    }

    pub(crate) fn forget(&mut self, actor: &ActorId) {
        self.titles.remove(actor);
        self.subtitles.remove(actor);
    }

    /// Send one merged update per actor with anything pending, then clear
    /// both maps. Returns how many packets went out.
    pub fn flush(&mut self, messenger: &dyn Messenger) -> usize {
        let mut merged: BTreeMap<ActorId, TitleUpdate> = BTreeMap::new();
        for (actor, text) in self.titles.drain() {
            merged.entry(actor).or_default().title = Some(text);
        }
        for (actor, text) in self.subtitles.drain() {
            merged.entry(actor).or_default().subtitle = Some(text);
        }
        for (actor, update) in &merged {
            messenger.send_title(actor, update);
        }
        merged.len()
    }
}

#[cfg(test)]
mod tests {
    use std::rc::Rc;

    use super::*;
    use crate::recording::{HostEvent, RecordingHost};

    fn text(value: &str) -> MessageText {
        MessageText::Formatted(value.to_string())
    }

    #[test]
    fn title_and_subtitle_merge_into_one_packet() {
        let host = Rc::new(RecordingHost::new());
        let steve = ActorId::new("steve");
        let mut batcher = TitleBatcher::new();

        batcher.push_title(&steve, text("Welcome"));
        batcher.push_subtitle(&steve, text("to the shop"));
        assert_eq!(batcher.flush(&*host), 1);

        assert_eq!(
            host.events(),
            vec![HostEvent::Title {
                actor: steve.clone(),
                update: TitleUpdate {
                    title: Some(text("Welcome")),
                    subtitle: Some(text("to the shop")),
                },
            }]
        );
        assert!(!batcher.has_pending(&steve));
    }

    #[test]
    fn last_write_wins_within_a_tick() {
        let host = Rc::new(RecordingHost::new());
        let steve = ActorId::new("steve");
        let mut batcher = TitleBatcher::new();

        batcher.push_title(&steve, text("first"));
        batcher.push_title(&steve, text("second"));
        batcher.flush(&*host);

        assert_eq!(
            host.events(),
            vec![HostEvent::Title {
                actor: steve,
                update: TitleUpdate {
                    title: Some(text("second")),
                    subtitle: None,
                },
            }]
        );
    }

    #[test]
    fn lone_subtitle_still_sends_and_empty_flush_is_silent() {
        let host = Rc::new(RecordingHost::new());
        let alex = ActorId::new("alex");
        let steve = ActorId::new("steve");
        let mut batcher = TitleBatcher::new();

        batcher.push_subtitle(&alex, text("just a subtitle"));
        batcher.push_title(&steve, text("just a title"));
        assert_eq!(batcher.flush(&*host), 2);
        assert_eq!(batcher.flush(&*host), 0);
        assert_eq!(host.events().len(), 2);
    }

    #[test]
    fn enabling_twice_keeps_a_single_flush_task() {
        let mut scheduler = TickScheduler::new();
        let mut batcher = TitleBatcher::new();
        batcher.enable(&mut scheduler, 50);
        batcher.enable(&mut scheduler, 50);
        assert!(batcher.is_enabled());
        assert_eq!(scheduler.len(), 1);

        batcher.disable(&mut scheduler);
        assert!(!batcher.is_enabled());
        assert!(scheduler.is_empty());
    }

    #[test]
    fn forgetting_an_actor_drops_pending_text() {
        let host = Rc::new(RecordingHost::new());
        let steve = ActorId::new("steve");
        let mut batcher = TitleBatcher::new();
        batcher.push_title(&steve, text("bye"));
        batcher.forget(&steve);
        assert_eq!(batcher.flush(&*host), 0);
        assert!(host.events().is_empty());
    }
}
