use std::collections::{BTreeMap, HashMap};

use crate::actions::Continuation;
use crate::host::{ActionOutcome, ActorId};
use crate::menu::MenuId;

/// Length of one host tick in milliseconds.
pub const TICK_MILLIS: u64 = 50;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct TaskId(u64);

/// Work that fires once when its due time is reached.
#[derive(Debug)]
pub enum ScheduledTask {
    Resume {
        continuation: Continuation,
        outcome: ActionOutcome,
    },
    CloseMenu {
        actor: ActorId,
        menu: MenuId,
    },
    Periodic(PeriodicTask),
}

/// Work that re-arms itself after every run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PeriodicTask {
    FlushTitles,
}

#[derive(Debug)]
enum Entry {
    Once(ScheduledTask),
    Every { period: u64, task: PeriodicTask },
}

/// Time-ordered callback queue drained by the host's tick loop.
///
/// Entries due at the same instant run in the order they were scheduled.
#[derive(Debug, Default)]
pub struct TickScheduler {
    now: u64,
    next_id: u64,
    queue: BTreeMap<(u64, TaskId), Entry>,
    due_by_id: HashMap<TaskId, u64>,
}

impl TickScheduler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Milliseconds elapsed since the scheduler was created.
    pub fn now(&self) -> u64 {
        self.now
    }

    pub fn schedule(&mut self, delay_millis: u64, task: ScheduledTask) -> TaskId {
        let due = self.now.saturating_add(delay_millis);
        self.insert(due, Entry::Once(task))
    }

    /// Run `task` every `period_millis`, first after one period.
    pub fn schedule_repeating(&mut self, period_millis: u64, task: PeriodicTask) -> TaskId {
        let period = period_millis.max(1);
        let due = self.now.saturating_add(period);
        self.insert(due, Entry::Every { period, task })
    }

    pub fn cancel(&mut self, id: TaskId) -> bool {
        match self.due_by_id.remove(&id) {
            Some(due) => self.queue.remove(&(due, id)).is_some(),
            None => false,
        }
    }

    pub fn is_scheduled(&self, id: TaskId) -> bool {
        self.due_by_id.contains_key(&id)
    }

    pub fn len(&self) -> usize {
        self.queue.len()
    }

    pub fn is_empty(&self) -> bool {
        self.queue.is_empty()
    }

    /// Pop the earliest task due at or before `until`, moving the clock to
    /// its due time. Periodic entries are re-armed before being returned.
    pub fn pop_due(&mut self, until: u64) -> Option<ScheduledTask> {
        let (&(due, id), _) = self.queue.first_key_value()?;
        if due > until {
            return None;
        }
        let entry = self.queue.remove(&(due, id))?;
        self.now = self.now.max(due);
        match entry {
            Entry::Once(task) => {
                self.due_by_id.remove(&id);
                Some(task)
            }
            Entry::Every { period, task } => {
                let next = due.saturating_add(period);
                self.queue.insert((next, id), Entry::Every { period, task });
                self.due_by_id.insert(id, next);
                Some(ScheduledTask::Periodic(task))
            }
        }
    }

    /// Move the clock forward without running anything.
    pub fn set_now(&mut self, now: u64) {
        self.now = self.now.max(now);
    }

    fn insert(&mut self, due: u64, entry: Entry) -> TaskId {
        let id = TaskId(self.next_id);
        self.next_id = self.next_id.wrapping_add(1);
        self.queue.insert((due, id), entry);
        self.due_by_id.insert(id, due);
        id
    }
}
