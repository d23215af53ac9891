//! End-to-end progression scenarios driven through the engine facade.

use std::sync::Arc;

use skilltree_core::{
    Action, ActionOutcome, CombineKind, CombineOperator, Connection, DepleteAction,
    DescriptorId, DescriptorRegistry, DowngradeAction, Engine, EngineConfig, Graph, GraphId,
    GrantPointsAction, GridDimensions, Node, NodeState, NumericKind, Scalar, SetPlayerLevelAction,
    Stat, UpgradeAction, ValueDescriptor, ValueKind,
};

fn registry() -> Arc<DescriptorRegistry> {
    let mut registry = DescriptorRegistry::new();
    registry
        .register(
            ValueDescriptor::new(
                DescriptorId(1),
                "Damage",
                "DMG",
                NumericKind::Integer,
                ValueKind::Absolute,
                None,
                None,
            )
            .unwrap(),
        )
        .unwrap();
    Arc::new(registry)
}

fn stat(registry: &DescriptorRegistry) -> Stat {
    Stat::new(
        Arc::clone(registry.get(DescriptorId(1)).unwrap()),
        Scalar::Int(10),
        Scalar::Int(5),
        3,
        CombineKind::Value,
        CombineOperator::Add,
    )
}

/// A (max 3) feeding B (max 2) over a one-way connection.
fn chain_engine(two_way: bool) -> Engine {
    let registry = registry();
    let mut engine = Engine::new(EngineConfig::default(), Arc::clone(&registry));
    let id = GraphId(1);
    let graph = Graph::new(
        id,
        "Combat",
        GridDimensions {
            columns: 2,
            rows: 1,
        },
        vec![
            Node::new(0, "strike", "Strike", "A basic strike.", 3, vec![stat(&registry)]),
            Node::new(
                1,
                "flurry",
                "Flurry",
                "A flurry of strikes.",
                2,
                vec![stat(&registry)],
            ),
        ],
        vec![Connection::new(id, 0, 1, two_way)],
    )
    .unwrap();
    engine.add_graph(graph).unwrap();
    engine
}

fn node_state(engine: &Engine, position: u32) -> NodeState {
    engine
        .state()
        .graph(GraphId(1))
        .unwrap()
        .node(position)
        .unwrap()
        .state()
}

fn node_level(engine: &Engine, position: u32) -> u32 {
    engine
        .state()
        .graph(GraphId(1))
        .unwrap()
        .node(position)
        .unwrap()
        .current_level()
}

/// Pool plus invested levels never leaves the system.
fn assert_points_conserved(engine: &Engine, granted: u32) {
    let spent = engine.state().graph(GraphId(1)).unwrap().points_spent();
    assert_eq!(engine.state().player.point_pool + spent, granted);
}

#[test]
fn full_progression_walkthrough() {
    let mut engine = chain_engine(false);
    engine
        .execute(Action::GrantPoints(GrantPointsAction { amount: 5 }))
        .unwrap();

    // Strike starts reachable, Flurry gated behind it.
    assert_eq!(node_state(&engine, 0), NodeState::Unlocked);
    assert_eq!(node_state(&engine, 1), NodeState::Locked);

    // Buy one level of Strike: it becomes obtained and frees Flurry.
    let outcome = engine
        .execute(Action::Upgrade(UpgradeAction {
            graph: GraphId(1),
            node: 0,
            amount: 1,
        }))
        .unwrap();
    let ActionOutcome::Upgrade(upgraded) = outcome else {
        panic!("expected an upgrade outcome");
    };
    assert_eq!(upgraded.unlocked, vec![1]);
    assert_eq!(engine.state().player.point_pool, 4);
    assert_eq!(node_state(&engine, 1), NodeState::Unlocked);
    assert_points_conserved(&engine, 5);

    // Max out Flurry.
    engine
        .execute(Action::Upgrade(UpgradeAction {
            graph: GraphId(1),
            node: 1,
            amount: 2,
        }))
        .unwrap();
    assert_eq!(node_state(&engine, 1), NodeState::Maxed);
    assert_eq!(engine.state().player.point_pool, 2);
    assert_points_conserved(&engine, 5);

    // Spend the rest on Strike.
    engine
        .execute(Action::Upgrade(UpgradeAction {
            graph: GraphId(1),
            node: 0,
            amount: 2,
        }))
        .unwrap();
    assert_eq!(node_level(&engine, 0), 3);
    assert_eq!(node_state(&engine, 0), NodeState::Maxed);
    assert_eq!(engine.state().player.point_pool, 0);
    assert_points_conserved(&engine, 5);

    // Stats scaled with the levels: 10 + 5 * (level - 1).
    let graph = engine.state().graph(GraphId(1)).unwrap();
    assert_eq!(graph.node(0).unwrap().stats()[0].current_value(), Scalar::Int(20));
    assert_eq!(graph.node(1).unwrap().stats()[0].current_value(), Scalar::Int(15));

    // Draining Strike cascades into Flurry, which loses its only support.
    let outcome = engine
        .execute(Action::Downgrade(DowngradeAction {
            graph: GraphId(1),
            node: 0,
            amount: 3,
            forced: false,
        }))
        .unwrap();
    let ActionOutcome::Downgrade(downgraded) = outcome else {
        panic!("expected a downgrade outcome");
    };
    assert_eq!(downgraded.points_refunded, 3);
    assert_eq!(downgraded.depleted, vec![1]);
    assert_eq!(downgraded.cascade_refunded, 2);

    assert_eq!(node_state(&engine, 0), NodeState::Unlocked);
    assert_eq!(node_state(&engine, 1), NodeState::Locked);
    assert_eq!(engine.state().player.point_pool, 5);
    assert_points_conserved(&engine, 5);
}

#[test]
fn two_way_connections_gate_neither_endpoint() {
    let engine = chain_engine(true);
    assert_eq!(node_state(&engine, 0), NodeState::Unlocked);
    assert_eq!(node_state(&engine, 1), NodeState::Unlocked);
}

#[test]
fn obtaining_the_far_end_of_a_two_way_edge_works_backwards() {
    let mut engine = chain_engine(true);
    engine
        .execute(Action::GrantPoints(GrantPointsAction { amount: 2 }))
        .unwrap();

    // Flurry first, without ever touching Strike.
    engine
        .execute(Action::Upgrade(UpgradeAction {
            graph: GraphId(1),
            node: 1,
            amount: 2,
        }))
        .unwrap();
    assert_eq!(node_state(&engine, 1), NodeState::Maxed);
    assert_eq!(node_state(&engine, 0), NodeState::Unlocked);
}

#[test]
fn deplete_is_a_single_step_full_refund() {
    let mut engine = chain_engine(false);
    engine
        .execute(Action::GrantPoints(GrantPointsAction { amount: 3 }))
        .unwrap();
    engine
        .execute(Action::Upgrade(UpgradeAction {
            graph: GraphId(1),
            node: 0,
            amount: 3,
        }))
        .unwrap();
    assert_eq!(engine.state().player.point_pool, 0);

    engine
        .execute(Action::Deplete(DepleteAction {
            graph: GraphId(1),
            node: 0,
        }))
        .unwrap();
    assert_eq!(engine.state().player.point_pool, 3);
    assert_eq!(node_level(&engine, 0), 0);
    assert_points_conserved(&engine, 3);
}

#[test]
fn deplete_works_even_when_downgrades_are_disabled() {
    let registry = registry();
    let mut engine = Engine::new(
        EngineConfig {
            allow_downgrade: false,
            ..EngineConfig::default()
        },
        Arc::clone(&registry),
    );
    let id = GraphId(1);
    let graph = Graph::new(
        id,
        "Combat",
        GridDimensions::default(),
        vec![Node::new(0, "strike", "Strike", "A basic strike.", 3, vec![stat(&registry)])],
        vec![],
    )
    .unwrap();
    engine.add_graph(graph).unwrap();

    engine
        .execute(Action::GrantPoints(GrantPointsAction { amount: 2 }))
        .unwrap();
    engine
        .execute(Action::Upgrade(UpgradeAction {
            graph: id,
            node: 0,
            amount: 2,
        }))
        .unwrap();

    // Player downgrades are off, but deplete is a system revocation.
    engine
        .execute(Action::Downgrade(DowngradeAction {
            graph: id,
            node: 0,
            amount: 1,
            forced: false,
        }))
        .unwrap_err();
    engine
        .execute(Action::Deplete(DepleteAction { graph: id, node: 0 }))
        .unwrap();
    assert_eq!(node_level(&engine, 0), 0);
    assert_eq!(engine.state().player.point_pool, 2);
}

#[test]
fn player_level_drop_revokes_gated_progress() {
    let registry = registry();
    let mut engine = Engine::new(EngineConfig::default(), Arc::clone(&registry));
    let id = GraphId(1);
    let graph = Graph::new(
        id,
        "Mastery",
        GridDimensions::default(),
        vec![
            Node::new(0, "focus", "Focus", "Deep focus.", 3, vec![stat(&registry)])
                .with_requirements(5, 0),
        ],
        vec![],
    )
    .unwrap();
    engine.add_graph(graph).unwrap();

    engine
        .execute(Action::SetPlayerLevel(SetPlayerLevelAction { level: 5 }))
        .unwrap();
    engine
        .execute(Action::GrantPoints(GrantPointsAction { amount: 2 }))
        .unwrap();
    engine
        .execute(Action::Upgrade(UpgradeAction {
            graph: id,
            node: 0,
            amount: 2,
        }))
        .unwrap();
    assert_eq!(engine.state().player.point_pool, 0);

    // Dropping below the requirement depletes the node and refunds it.
    let outcome = engine
        .execute(Action::SetPlayerLevel(SetPlayerLevelAction { level: 3 }))
        .unwrap();
    let ActionOutcome::SetPlayerLevel(changed) = outcome else {
        panic!("expected a player level outcome");
    };
    assert_eq!(changed.depleted, vec![(id, 0)]);
    assert_eq!(changed.points_refunded, 2);
    assert_eq!(engine.state().player.point_pool, 2);
}

#[test]
fn tree_points_gate_holds_while_support_remains() {
    // X gates on 2 points spent elsewhere in the tree.
    let registry = registry();
    let mut engine = Engine::new(EngineConfig::default(), Arc::clone(&registry));
    let id = GraphId(1);
    let graph = Graph::new(
        id,
        "Mastery",
        GridDimensions::default(),
        vec![
            Node::new(0, "base", "Base", "Foundation.", 3, vec![stat(&registry)]),
            Node::new(1, "apex", "Apex", "The apex.", 1, vec![stat(&registry)])
                .with_requirements(0, 2),
        ],
        vec![],
    )
    .unwrap();
    engine.add_graph(graph).unwrap();
    engine
        .execute(Action::GrantPoints(GrantPointsAction { amount: 4 }))
        .unwrap();

    engine
        .execute(Action::Upgrade(UpgradeAction {
            graph: id,
            node: 0,
            amount: 2,
        }))
        .unwrap();
    engine
        .execute(Action::Upgrade(UpgradeAction {
            graph: id,
            node: 1,
            amount: 1,
        }))
        .unwrap();
    assert_eq!(node_state(&engine, 1), NodeState::Maxed);

    // One point of support remains after a partial downgrade: not enough.
    let outcome = engine
        .execute(Action::Downgrade(DowngradeAction {
            graph: id,
            node: 0,
            amount: 1,
            forced: false,
        }))
        .unwrap();
    let ActionOutcome::Downgrade(downgraded) = outcome else {
        panic!("expected a downgrade outcome");
    };
    assert_eq!(downgraded.depleted, vec![1]);
    assert_eq!(engine.state().player.point_pool, 3);
    assert_eq!(node_state(&engine, 1), NodeState::Locked);
}
