//! End-to-end behavior of the engine: resolution, the guard/action pipeline,
//! persistence and lifecycle hooks.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};
use switchyard::builder::{GraphBuilder, GraphDefinition, Registry, TransitionBuilder};
use switchyard::context::{Context, IdentityBuilder};
use switchyard::core::{Identifier, State, StateKind, TransitionRecord};
use switchyard::effects::{action_fn, try_guard_fn, Action, BoxError, Guard};
use switchyard::machine::{MachineHooks, StateMachine};
use switchyard::persistence::{KeyValueAdapter, MemoryAdapter, MemoryStore, PersistenceAdapter};
use switchyard::{EngineError, Graph};

fn machine_for<E: 'static>(
    graph: Graph<E>,
    identifier: Identifier,
    entity: E,
    adapter: Arc<dyn PersistenceAdapter>,
) -> StateMachine<E>
where
    E: Clone + Send + Sync,
{
    let context = Context::new(
        identifier,
        move |_: &Identifier| -> Result<E, BoxError> { Ok(entity.clone()) },
        adapter,
    );
    StateMachine::new(Arc::new(graph), context)
}

// shop

fn shop() -> Graph<Identifier> {
    GraphBuilder::new()
        .initial("basket")
        .final_state("complete")
        .transition(TransitionBuilder::new().from("basket").to("customerdata").on("Checkout"))
        .unwrap()
        .transition(
            TransitionBuilder::new()
                .from("customerdata")
                .to("shipping")
                .on("ChooseHowToShip"),
        )
        .unwrap()
        .transition(TransitionBuilder::new().from("shipping").to("payment").on("ChooseHowToPay"))
        .unwrap()
        .transition(TransitionBuilder::new().from("payment").to("complete").on("ready"))
        .unwrap()
        .build()
        .unwrap()
}

fn shop_machine(adapter: Arc<dyn PersistenceAdapter>) -> StateMachine<Identifier> {
    let context = Context::new(Identifier::new("1", "shop"), IdentityBuilder, adapter);
    StateMachine::new(Arc::new(shop()), context)
}

#[test]
fn shop_checkout_moves_to_customer_data() {
    let mut machine = shop_machine(Arc::new(MemoryAdapter::new()));

    assert_eq!(machine.current_state().unwrap(), "basket");
    assert!(machine.handle("Checkout").unwrap());
    assert_eq!(machine.current_state().unwrap(), "customerdata");
}

#[test]
fn shop_event_for_other_state_returns_false() {
    let mut machine = shop_machine(Arc::new(MemoryAdapter::new()));

    assert!(!machine.handle("ready").unwrap());
    assert_eq!(machine.current_state().unwrap(), "basket");
    assert!(machine.history().unwrap().is_empty());
}

#[test]
fn shop_runs_to_completion() {
    let mut machine = shop_machine(Arc::new(MemoryAdapter::new()));

    for event in ["Checkout", "ChooseHowToShip", "ChooseHowToPay", "ready"] {
        assert!(machine.handle(event).unwrap(), "{event} should be handled");
    }

    assert!(machine.is_final().unwrap());
    assert_eq!(
        machine.history().unwrap().get_path(),
        vec!["basket", "customerdata", "shipping", "payment", "complete"]
    );
    let last = machine.history().unwrap().last().cloned().unwrap();
    assert_eq!(last.transition, "payment_to_complete");
    assert_eq!(last.event.as_deref(), Some("ready"));
}

#[test]
fn shop_state_is_shared_through_a_session_store() {
    let session = Arc::new(MemoryStore::new());
    let adapter = || -> Arc<dyn PersistenceAdapter> {
        Arc::new(KeyValueAdapter::new(Arc::clone(&session)).with_prefix("session."))
    };

    let mut first = shop_machine(adapter());
    assert!(first.add_to_backend().unwrap());
    assert!(first.handle("Checkout").unwrap());

    // a second request sees the state written by the first
    let mut second = shop_machine(adapter());
    assert!(!second.add_to_backend().unwrap());
    assert_eq!(second.current_state().unwrap(), "customerdata");
    assert!(second.handle("ChooseHowToShip").unwrap());
    assert_eq!(second.history().unwrap().len(), 2);
}

// traffic light

#[derive(Clone)]
struct TrafficLight {
    color: &'static str,
    last_switch: Instant,
}

const SWITCH_INTERVAL: Duration = Duration::from_millis(50);

struct SwitchTo(&'static str);

impl Action<TrafficLight> for SwitchTo {
    fn effect(&self, light: &mut TrafficLight) -> Result<(), BoxError> {
        light.color = self.0;
        light.last_switch = Instant::now();
        Ok(())
    }

    fn name(&self) -> &str {
        self.0
    }
}

fn traffic_light() -> Graph<TrafficLight> {
    let mut builder = GraphBuilder::new().initial("green");
    for (from, to) in [("green", "orange"), ("orange", "red"), ("red", "green")] {
        builder = builder
            .transition(
                TransitionBuilder::new()
                    .from(from)
                    .to(to)
                    .on("switch")
                    .when(|light: &TrafficLight| light.last_switch.elapsed() >= SWITCH_INTERVAL)
                    .action(Arc::new(SwitchTo(to))),
            )
            .unwrap();
    }
    builder.build().unwrap()
}

#[test]
fn traffic_light_waits_for_interval() {
    let light = TrafficLight {
        color: "green",
        last_switch: Instant::now(),
    };
    let mut machine = machine_for(
        traffic_light(),
        Identifier::new("crossing-1", "light"),
        light,
        Arc::new(MemoryAdapter::new()),
    );

    assert!(!machine.handle("switch").unwrap());
    assert_eq!(machine.entity().unwrap().color, "green");

    thread::sleep(SWITCH_INTERVAL + Duration::from_millis(20));

    assert!(machine.handle("switch").unwrap());
    assert_eq!(machine.current_state().unwrap(), "orange");
    assert_eq!(machine.entity().unwrap().color, "orange");

    // the action reset the timer
    assert!(!machine.handle("switch").unwrap());
}

// arena

#[derive(Clone)]
struct Fighter {
    energy: u32,
    moves: Vec<String>,
}

fn arena() -> Graph<Fighter> {
    let record = |tag: &'static str| -> Arc<dyn Action<Fighter>> {
        Arc::new(action_fn(move |f: &mut Fighter| {
            f.moves.push(tag.to_string());
            Ok(())
        }))
    };

    GraphBuilder::new()
        .initial("start")
        .transition(TransitionBuilder::new().from("start").to("normal"))
        .unwrap()
        .transition(TransitionBuilder::new().from("normal").to("fighting").on("attack"))
        .unwrap()
        .transition(
            TransitionBuilder::new()
                .from("regex:/.*/")
                .to("super")
                .on("power")
                .when(|f: &Fighter| f.energy > 50)
                .action(record("super")),
        )
        .unwrap()
        .transition(
            TransitionBuilder::new()
                .from("not-regex:/start|normal/")
                .to("posing")
                .on("power")
                .action(record("posing")),
        )
        .unwrap()
        .build()
        .unwrap()
}

fn fighter(energy: u32, state: &str) -> StateMachine<Fighter> {
    let adapter = Arc::new(MemoryAdapter::new());
    let id = Identifier::new("ryu", "arena");
    adapter.add(&id, state).unwrap();
    machine_for(
        arena(),
        id,
        Fighter {
            energy,
            moves: Vec::new(),
        },
        adapter,
    )
}

#[test]
fn wildcard_precedence_follows_registration_order() {
    let mut strong = fighter(90, "fighting");
    assert!(strong.handle("power").unwrap());
    assert_eq!(strong.current_state().unwrap(), "super");
    assert_eq!(strong.entity().unwrap().moves, vec!["super"]);

    let mut weak = fighter(10, "fighting");
    assert!(weak.handle("power").unwrap());
    assert_eq!(weak.current_state().unwrap(), "posing");
    assert_eq!(weak.entity().unwrap().moves, vec!["posing"]);
}

#[test]
fn excluded_state_only_sees_include_wildcard() {
    let mut weak = fighter(10, "normal");
    assert!(!weak.handle("power").unwrap());
    assert_eq!(weak.current_state().unwrap(), "normal");

    let mut strong = fighter(90, "normal");
    assert!(strong.handle("power").unwrap());
    assert_eq!(strong.current_state().unwrap(), "super");
}

#[test]
fn wildcard_transition_by_concrete_name() {
    let mut machine = fighter(90, "fighting");

    assert!(machine.can_transition("fighting_to_super").unwrap());
    assert!(machine.transition("fighting_to_super").unwrap());

    let last = machine.history().unwrap().last().cloned().unwrap();
    assert_eq!(last.transition, "fighting_to_super");
    assert_eq!(last.event.as_deref(), Some("power"));
}

#[test]
fn run_takes_unconditional_transition_only() {
    let mut machine = fighter(90, "start");

    assert!(machine.run().unwrap());
    assert_eq!(machine.current_state().unwrap(), "normal");
    assert!(!machine.run().unwrap());
}

#[test]
fn veto_hook_rejects_passing_guard() {
    struct NoSuperInTournament {
        vetoes: Arc<AtomicUsize>,
    }

    impl MachineHooks<Fighter> for NoSuperInTournament {
        fn on_check_can_transition(
            &mut self,
            _: &Identifier,
            _: &Fighter,
            record: &TransitionRecord,
        ) -> bool {
            if record.to == "super" {
                self.vetoes.fetch_add(1, Ordering::SeqCst);
                return false;
            }
            true
        }
    }

    let vetoes = Arc::new(AtomicUsize::new(0));
    let mut machine = fighter(90, "fighting").with_hooks(NoSuperInTournament {
        vetoes: Arc::clone(&vetoes),
    });

    assert!(machine.handle("power").unwrap());
    assert_eq!(machine.current_state().unwrap(), "posing");
    assert_eq!(vetoes.load(Ordering::SeqCst), 1);
}

// faults

#[test]
fn action_fault_leaves_state_unchanged() {
    let graph = GraphBuilder::new()
        .initial("payment")
        .transition(
            TransitionBuilder::new()
                .from("payment")
                .to("complete")
                .on("ready")
                .action(Arc::new(
                    action_fn(|attempts: &mut u32| {
                        *attempts += 1;
                        Err("gateway timeout".into())
                    })
                    .named("charge"),
                )),
        )
        .unwrap()
        .build()
        .unwrap();
    let mut machine = machine_for(
        graph,
        Identifier::new("1", "order"),
        0u32,
        Arc::new(MemoryAdapter::new()),
    );

    let err = machine.handle("ready").unwrap_err();
    assert!(err.is_fault());
    match &err {
        EngineError::Action(action) => {
            assert_eq!(action.action, "charge");
            assert_eq!(action.source.to_string(), "gateway timeout");
        }
        other => panic!("expected action fault, got {other:?}"),
    }

    assert_eq!(machine.current_state().unwrap(), "payment");
    assert!(machine.history().unwrap().is_empty());
    // the effect is not rolled back
    assert_eq!(*machine.entity().unwrap(), 1);
}

#[test]
fn guard_fault_propagates() {
    let graph = GraphBuilder::new()
        .initial("payment")
        .transition(
            TransitionBuilder::new()
                .from("payment")
                .to("complete")
                .on("ready")
                .guard(Arc::new(
                    try_guard_fn(|_: &u32| Err("ledger unavailable".into())).named("IsPaid"),
                )),
        )
        .unwrap()
        .build()
        .unwrap();
    let mut machine = machine_for(
        graph,
        Identifier::new("1", "order"),
        0u32,
        Arc::new(MemoryAdapter::new()),
    );

    let err = machine.handle("ready").unwrap_err();
    assert!(matches!(&err, EngineError::Guard(guard) if guard.guard == "IsPaid"));
    assert_eq!(machine.current_state().unwrap(), "payment");
}

#[test]
fn entity_build_failure_is_a_fault() {
    let context = Context::new(
        Identifier::new("404", "shop"),
        |id: &Identifier| -> Result<Identifier, BoxError> {
            Err(format!("no order {}", id.entity_id()).into())
        },
        Arc::new(MemoryAdapter::new()),
    );
    let mut machine = StateMachine::new(Arc::new(shop()), context);

    let err = machine.handle("Checkout").unwrap_err();
    assert!(matches!(err, EngineError::Entity(_)));
    assert_eq!(machine.current_state().unwrap(), "basket");
}

#[test]
fn missing_initial_state_is_a_configuration_error() {
    let graph = GraphBuilder::new()
        .transition(TransitionBuilder::new().from("a").to("b"))
        .unwrap()
        .build()
        .unwrap();
    let context = Context::new(
        Identifier::new("1", "plain"),
        IdentityBuilder,
        Arc::new(MemoryAdapter::new()),
    );
    let machine = StateMachine::new(Arc::new(graph), context);

    let err = machine.current_state().unwrap_err();
    assert!(matches!(err, EngineError::NoInitialState));
    assert!(err.is_configuration());
}

// bulk loading

#[derive(Clone, Default)]
struct Order {
    items: u32,
    mails: Vec<String>,
}

fn shop_registry() -> Registry<Order> {
    Registry::new()
        .with_guard("HasItems", || {
            Arc::new(switchyard::effects::guard_fn(|o: &Order| o.items > 0).named("HasItems"))
        })
        .with_action("SendConfirmation", || {
            Arc::new(action_fn(|o: &mut Order| {
                o.mails.push("confirmation".to_string());
                Ok(())
            }))
        })
}

const SHOP_DEFINITION: &str = r#"{
    "machine": "shop",
    "transitions": [
        {
            "from": "basket", "to": "customerdata", "guard": "HasItems",
            "event": "Checkout", "from_kind": "initial"
        },
        { "from": "customerdata", "to": "shipping", "event": "ChooseHowToShip" },
        { "from": "shipping", "to": "payment", "event": "ChooseHowToPay" },
        {
            "from": "payment", "to": "complete", "action": "SendConfirmation",
            "event": "ready", "to_kind": "final"
        },
        { "from": "not-regex:/complete/", "to": "basket", "event": "Cancel", "name": "cancel" }
    ]
}"#;

#[test]
fn loaded_definition_drives_machine() {
    let graph = GraphDefinition::from_json_str(SHOP_DEFINITION)
        .unwrap()
        .load(&shop_registry())
        .unwrap();
    assert_eq!(graph.initial_state().unwrap().name(), "basket");
    assert_eq!(graph.kind_of("complete"), StateKind::Final);

    let mut machine = machine_for(
        graph,
        Identifier::new("1", "shop"),
        Order::default(),
        Arc::new(MemoryAdapter::new()),
    );
    assert!(!machine.can_handle("Checkout").unwrap());
    assert!(!machine.handle("Checkout").unwrap());
    machine.entity().unwrap().items = 2;
    assert!(machine.handle("Checkout").unwrap());

    assert!(machine.transition("cancel").unwrap());
    assert_eq!(machine.current_state().unwrap(), "basket");

    for event in ["Checkout", "ChooseHowToShip", "ChooseHowToPay", "ready"] {
        assert!(machine.handle(event).unwrap());
    }
    assert!(machine.is_final().unwrap());
    assert_eq!(machine.entity().unwrap().mails, vec!["confirmation"]);
    assert!(!machine.handle("Cancel").unwrap());
}

#[test]
fn invalid_definition_reports_every_problem() {
    let json = r#"{
        "transitions": [
            { "from": "basket", "to": "customerdata", "guard": "IsLoggedIn" },
            { "from": "regex:/(/", "to": "basket" },
            { "from": "payment", "to": "complete", "action": "Ship" }
        ]
    }"#;

    let result = GraphDefinition::from_json_str(json)
        .unwrap()
        .load(&shop_registry());

    match result {
        Err(EngineError::InvalidConfiguration(errors)) => assert_eq!(errors.len(), 3),
        Err(other) => panic!("expected invalid configuration, got {other:?}"),
        Ok(_) => panic!("definition should be rejected"),
    }
}

// resume

#[test]
fn machine_resumes_from_snapshot() {
    let adapter = Arc::new(MemoryAdapter::new());
    let mut machine = shop_machine(adapter.clone());
    machine.handle("Checkout").unwrap();
    machine.handle("ChooseHowToShip").unwrap();

    let json = adapter.snapshot().unwrap().to_json().unwrap();
    drop(machine);

    let snapshot = switchyard::checkpoint::Snapshot::from_json(&json).unwrap();
    let restored = Arc::new(MemoryAdapter::restore(snapshot).unwrap());
    let mut resumed = shop_machine(restored);

    assert_eq!(resumed.current_state().unwrap(), "shipping");
    assert!(resumed.handle("ChooseHowToPay").unwrap());
    assert_eq!(
        resumed.history().unwrap().get_path(),
        vec!["basket", "customerdata", "shipping", "payment"]
    );
}

#[test]
fn state_callbacks_see_transition_records() {
    let entered = Arc::new(AtomicUsize::new(0));
    let counter = Arc::clone(&entered);
    let graph = GraphBuilder::new()
        .state(State::new("idle", StateKind::Initial))
        .state(State::normal("busy").on_entry(move |id, record| {
            assert_eq!(id.machine(), "worker");
            assert_eq!(record.from, "idle");
            counter.fetch_add(1, Ordering::SeqCst);
        }))
        .transition(TransitionBuilder::new().from("idle").to("busy").on("work"))
        .unwrap()
        .transition(TransitionBuilder::new().from("busy").to("idle").on("rest"))
        .unwrap()
        .build()
        .unwrap();
    let context = Context::new(
        Identifier::new("1", "worker"),
        IdentityBuilder,
        Arc::new(MemoryAdapter::new()),
    );
    let mut machine = StateMachine::new(Arc::new(graph), context);

    machine.handle("work").unwrap();
    machine.handle("rest").unwrap();
    machine.handle("work").unwrap();

    assert_eq!(entered.load(Ordering::SeqCst), 2);
}

#[test]
fn registry_instantiates_named_guards() {
    let registry = shop_registry();
    let guard = registry.guard("HasItems").unwrap();

    assert_eq!(guard.name(), "HasItems");
    assert!(!guard.applies(&Order::default()).unwrap());
}
