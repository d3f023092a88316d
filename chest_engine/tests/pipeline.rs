use std::cell::RefCell;
use std::collections::BTreeMap;
use std::rc::Rc;

use chest_engine::host::MessageText;
use chest_engine::menu::{
    BoundItem, ClickEvent, ClickKind, ItemAction, ItemResponse, MenuDefinition,
};
use chest_engine::recording::{HostEvent, RecordingHost};
use chest_engine::{ActorId, EngineConfig, Host, MenuEngine};
use chest_formats::SlotPos;

/// Item that remembers who clicked it and answers with a canned chain.
struct Counter {
    clicks: RefCell<Vec<(ActorId, ClickKind)>>,
}

impl BoundItem for Counter {
    fn fire(&self, actor: &ActorId, click: &ClickEvent) -> ItemResponse {
        self.clicks.borrow_mut().push((actor.clone(), click.kind()));
        let count = self.clicks.borrow().len();
        ItemResponse {
            directives: vec![format!("tell: click {count}"), "delay: 1".to_string()],
            action: if count >= 2 {
                ItemAction::CloseMenu
            } else {
                ItemAction::Keep
            },
        }
    }
}

#[test]
fn custom_items_drive_the_directive_pipeline() {
    let counter = Rc::new(Counter {
        clicks: RefCell::new(Vec::new()),
    });
    let mut items: BTreeMap<SlotPos, Rc<dyn BoundItem>> = BTreeMap::new();
    items.insert(SlotPos::new(3, 2), counter.clone());
    let definition = Rc::new(MenuDefinition::new("Counter", 3, items).expect("valid menu"));

    let recorder = Rc::new(RecordingHost::new());
    let config = EngineConfig {
        tick_millis: 20,
        ..EngineConfig::default()
    };
    let mut engine = MenuEngine::new(config, Host::shared(recorder.clone()));
    let alex = ActorId::new("alex");
    let slot = SlotPos::new(3, 2);

    engine.open_menu(&alex, &definition);
    let first = engine
        .click_slot(&alex, slot, ClickKind::Secondary)
        .expect("menu is open");
    assert!(!first.close_requested);
    assert!(engine.is_busy(&alex));

    engine.tick();
    assert!(!engine.is_busy(&alex));

    let second = engine
        .click_slot(&alex, slot, ClickKind::Primary)
        .expect("menu is open");
    assert!(second.close_requested);
    engine.tick();

    assert!(engine.menu(&alex).is_none());
    assert_eq!(
        counter.clicks.borrow().as_slice(),
        &[
            (alex.clone(), ClickKind::Secondary),
            (alex.clone(), ClickKind::Primary)
        ]
    );
    assert_eq!(
        recorder.take_events(),
        vec![
            HostEvent::Message {
                actor: alex.clone(),
                text: MessageText::Formatted("click 1".to_string()),
            },
            HostEvent::Message {
                actor: alex.clone(),
                text: MessageText::Formatted("click 2".to_string()),
            },
            HostEvent::MenuClosed {
                actor: alex.clone()
            },
        ]
    );
}

#[test]
fn actors_keep_independent_chains() {
    let recorder = Rc::new(RecordingHost::new());
    let mut engine = MenuEngine::new(EngineConfig::default(), Host::shared(recorder.clone()));
    let alex = ActorId::new("alex");
    let steve = ActorId::new("steve");

    engine.submit_commands(&alex, &["delay: 1", "broadcast: alex done"]);
    engine.submit_commands(&steve, &["delay: 3", "broadcast: steve done"]);
    assert_eq!(engine.busy_actors(), vec![alex.clone(), steve.clone()]);

    engine.tick();
    assert_eq!(engine.busy_actors(), vec![steve.clone()]);
    engine.advance(100);
    assert!(engine.busy_actors().is_empty());

    let broadcasts: Vec<HostEvent> = recorder.take_events();
    assert_eq!(
        broadcasts,
        vec![
            HostEvent::Broadcast {
                text: MessageText::Formatted("alex done".to_string())
            },
            HostEvent::Broadcast {
                text: MessageText::Formatted("steve done".to_string())
            },
        ]
    );
}
