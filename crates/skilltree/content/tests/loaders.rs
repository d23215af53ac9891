//! Loader tests over inline RON/TOML fixtures.

use skilltree_content::loaders::{DescriptorLoader, GraphLoader};
use skilltree_content::specs::{DescriptorSpec, GraphSpec};
use skilltree_core::{DescriptorId, EngineConfig, NodeState, Scalar};

const DESCRIPTORS_RON: &str = r#"
[
    (
        id: 1,
        display_name: "Damage",
        abbreviation: "DMG",
        numeric_kind: integer,
        value_kind: absolute,
    ),
    (
        id: 2,
        display_name: "Critical Chance",
        abbreviation: "CRIT",
        numeric_kind: float,
        value_kind: percent,
        min: Float(0.0),
        max: Float(100.0),
    ),
]
"#;

const GRAPH_RON: &str = r#"
(
    id: 1,
    display_name: "Combat",
    grid_columns: 2,
    grid_rows: 1,
    nodes: [
        (
            position_index: 0,
            key: "strike",
            display_name: "Strike",
            description: "A basic strike.",
            max_level: 3,
            windup: 2,
            cooldown: 4,
            stats: [
                (descriptor: 1, initial_value: Int(10), scaling: Int(5)),
            ],
        ),
        (
            position_index: 1,
            key: "flurry",
            display_name: "Flurry",
            description: "A flurry of strikes.",
            max_level: 2,
            tree_points_requirement: 1,
            stats: [
                (descriptor: 1, initial_value: Int(4), scaling: Int(2)),
                (descriptor: 2, initial_value: Float(5.0), scaling: Float(1.5)),
            ],
        ),
    ],
    connections: [
        (node_a: 0, node_b: 1),
    ],
)
"#;

fn registry() -> skilltree_core::DescriptorRegistry {
    let specs: Vec<DescriptorSpec> = ron::from_str(DESCRIPTORS_RON).unwrap();
    DescriptorLoader::build(specs).unwrap()
}

#[test]
fn descriptors_parse_and_register() {
    let registry = registry();
    assert_eq!(registry.len(), 2);

    let crit = registry.get(DescriptorId(2)).unwrap();
    assert_eq!(crit.display_name(), "Critical Chance");
    // Bounds were kept and will clamp stat values.
    let clamped = crit.clamp(Scalar::Float(150.0));
    assert_eq!(clamped.value, Scalar::Float(100.0));
}

#[test]
fn duplicate_descriptor_ids_fail_to_build() {
    let specs: Vec<DescriptorSpec> = ron::from_str(
        r#"[
            (id: 1, display_name: "A", abbreviation: "A", numeric_kind: integer, value_kind: absolute),
            (id: 1, display_name: "B", abbreviation: "B", numeric_kind: integer, value_kind: absolute),
        ]"#,
    )
    .unwrap();
    let err = DescriptorLoader::build(specs).unwrap_err();
    assert!(err.to_string().contains("'B'"));
}

#[test]
fn graph_parses_resolves_and_validates() {
    let registry = registry();
    let spec: GraphSpec = ron::from_str(GRAPH_RON).unwrap();
    let graph = GraphLoader::build(spec, &registry).unwrap();

    assert_eq!(graph.nodes().len(), 2);
    assert_eq!(graph.total_points(), 5);

    let strike = graph.node_by_key("strike").unwrap();
    assert_eq!(strike.windup(), skilltree_core::Tick(2));
    assert_eq!(strike.cooldown(), skilltree_core::Tick(4));
    assert_eq!(strike.state(), NodeState::Locked);

    let flurry = graph.node_by_key("flurry").unwrap();
    assert_eq!(flurry.tree_points_requirement, 1);
    assert_eq!(flurry.stats().len(), 2);
    // The one-way connection gates flurry behind strike.
    assert!(graph.can_unlock(0));
    assert!(!graph.can_unlock(1));
}

#[test]
fn unknown_descriptor_references_are_rejected() {
    let registry = registry();
    let spec: GraphSpec = ron::from_str(
        r#"(
            id: 1,
            display_name: "Broken",
            nodes: [
                (
                    position_index: 0,
                    key: "ghost",
                    display_name: "Ghost",
                    description: "References nothing.",
                    max_level: 1,
                    stats: [ (descriptor: 99, initial_value: Int(1), scaling: Int(0)) ],
                ),
            ],
        )"#,
    )
    .unwrap();

    let err = GraphLoader::build(spec, &registry).unwrap_err();
    assert!(err.to_string().contains("unknown descriptor id 99"));
}

#[test]
fn dangling_connection_endpoints_are_rejected() {
    let registry = registry();
    let spec: GraphSpec = ron::from_str(
        r#"(
            id: 1,
            display_name: "Broken",
            nodes: [
                (
                    position_index: 0,
                    key: "strike",
                    display_name: "Strike",
                    description: "A basic strike.",
                    max_level: 1,
                    stats: [ (descriptor: 1, initial_value: Int(1), scaling: Int(0)) ],
                ),
            ],
            connections: [ (node_a: 0, node_b: 9) ],
        )"#,
    )
    .unwrap();

    let err = GraphLoader::build(spec, &registry).unwrap_err();
    assert!(err.to_string().contains("malformed"));
}

#[test]
fn settings_parse_with_defaults_for_missing_keys() {
    let config: EngineConfig = toml::from_str(
        r#"
        allow_downgrade = false
        strict_stat_value_types = true
        "#,
    )
    .unwrap();

    assert!(!config.allow_downgrade);
    assert!(config.strict_stat_value_types);
    // Unset keys fall back to defaults.
    assert!(!config.changes_require_confirmation);
    assert_eq!(config.max_unit_level, EngineConfig::DEFAULT_MAX_UNIT_LEVEL);
}

#[test]
fn factory_builds_an_engine_from_a_data_directory() {
    use skilltree_content::ContentFactory;
    use std::fs;

    let dir = std::env::temp_dir().join(format!("skilltree-content-{}", std::process::id()));
    let graphs = dir.join("graphs");
    fs::create_dir_all(&graphs).unwrap();
    fs::write(dir.join("settings.toml"), "allow_downgrade = true\n").unwrap();
    fs::write(dir.join("descriptors.ron"), DESCRIPTORS_RON).unwrap();
    fs::write(graphs.join("combat.ron"), GRAPH_RON).unwrap();

    let engine = ContentFactory::new(&dir).build_engine().unwrap();
    assert_eq!(engine.state().graphs().len(), 1);
    assert_eq!(engine.registry().len(), 2);
    // The unlock pass already ran for the enabled graph.
    let graph = engine.state().graphs().first().unwrap();
    assert_eq!(graph.node(0).unwrap().state(), NodeState::Unlocked);

    fs::remove_dir_all(&dir).ok();
}
