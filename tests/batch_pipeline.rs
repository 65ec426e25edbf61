//! End-to-end tests: description loading, zygote rewiring, and batch runs.
//!
//! Run with: `RUST_LOG=graphlife=debug cargo test -- --nocapture` to see the
//! batch logs.

use graphlife::life::batch::run_experiment;
use graphlife::life::topology::mutate_zygote;
use graphlife::{
    BatchConfig, BatchRunner, ExperimentConfig, Graph, GraphAutomaton, GraphDescription,
    LiveSet, MutationConfig, TransitionRule,
};
use rand::rngs::StdRng;
use rand::SeedableRng;

// ─── helpers ─────────────────────────────────────────────────────────────────

fn init_logging() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

fn batch(num_workers: usize) -> BatchConfig {
    BatchConfig {
        max_steps: 4000,
        num_workers,
        ..BatchConfig::default()
    }
}

fn random_torus_states(n: usize, count: usize, seed: u64) -> Vec<LiveSet> {
    let mut rng = StdRng::seed_from_u64(seed);
    graphlife::random_states(&mut rng, count, n * n, 0.3).unwrap()
}

// ─── batch runner ────────────────────────────────────────────────────────────

#[test]
fn test_worker_count_does_not_change_results() {
    init_logging();
    let graph = Graph::torus(6);
    let states = random_torus_states(6, 100, 17);

    let single = {
        let zygote = GraphAutomaton::new(&graph, TransitionRule::Classical);
        BatchRunner::new(zygote, batch(1)).unwrap().run(&states).unwrap()
    };
    let pooled = {
        let zygote = GraphAutomaton::new(&graph, TransitionRule::Classical);
        BatchRunner::new(zygote, batch(4)).unwrap().run(&states).unwrap()
    };

    assert_eq!(single, pooled);
    assert_eq!(single.len(), 100);
}

#[test]
fn test_histogram_accounts_for_every_sample() {
    init_logging();
    let graph = Graph::torus(5);
    let states = random_torus_states(5, 60, 3);
    let zygote = GraphAutomaton::new(&graph, TransitionRule::Density { mu: 0.4 });
    let config = BatchConfig {
        bucket_width: 0.05,
        num_buckets: 4,
        ..batch(3)
    };

    let report = BatchRunner::new(zygote, config).unwrap().run(&states).unwrap();
    assert_eq!(report.histogram.total(), 60);
    assert_eq!(report.histogram.counts().len(), 4);

    let out_of_range = report
        .entropies()
        .into_iter()
        .filter(|&h| report.histogram.bucket_index(h).is_none())
        .count() as u64;
    assert_eq!(report.histogram.overflow(), out_of_range);
}

#[test]
fn test_every_run_is_bounded_and_normalized() {
    let graph = Graph::torus(5);
    let states = random_torus_states(5, 30, 9);
    let zygote = GraphAutomaton::new(&graph, TransitionRule::default());
    let report = BatchRunner::new(zygote, batch(2)).unwrap().run(&states).unwrap();

    for run in &report.runs {
        assert!(run.steps_observed <= 4000);
        assert!((0.0..=1.0).contains(&run.entropy));
        if let Some(cycle) = run.cycle {
            assert!(cycle.begin < cycle.end);
            assert_eq!(cycle.end, run.steps_observed);
        }
    }
}

#[test]
fn test_empty_state_stream_yields_empty_report() {
    let graph = Graph::torus(3);
    let zygote = GraphAutomaton::new(&graph, TransitionRule::Classical);
    let report = BatchRunner::new(zygote, batch(2)).unwrap().run_str("\n").unwrap();
    assert!(report.is_empty());
    assert_eq!(report.histogram.total(), 0);
    assert_eq!(report.mean_entropy(), None);
}

// ─── descriptions and mutation ───────────────────────────────────────────────

#[test]
fn test_rewired_description_keeps_degrees() {
    init_logging();
    let mut graph = Graph::torus(5);
    let config = MutationConfig {
        seed: 21,
        rewire: 25,
        ..MutationConfig::default()
    };
    mutate_zygote(&mut graph, &config).unwrap();

    let live = LiveSet::from_indices(25, [0, 6, 12]);
    let json = GraphDescription::from_graph(&graph, &live)
        .to_json_string()
        .unwrap();
    let (restored, restored_live) = GraphDescription::from_json_str(&json)
        .unwrap()
        .resolve()
        .unwrap();

    assert_eq!(restored, graph);
    assert_eq!(restored_live, live);
    assert!((0..25).all(|v| restored.degree(v) == 8));
    assert_eq!(restored.n_edges(), Graph::torus(5).n_edges());
}

#[test]
fn test_description_state_seeds_simulation() {
    let doc = r#"{
        "vertices": [
            {"name": "a", "state": true},
            {"name": "b", "state": true},
            {"name": "c", "state": true},
            {"name": "d"}
        ],
        "edges": [
            {"s": "a", "t": "b"}, {"s": "b", "t": "c"},
            {"s": "c", "t": "a"}, {"s": "c", "t": "d"}
        ]
    }"#;
    let (graph, live) = GraphDescription::from_json_str(doc).unwrap().resolve().unwrap();
    let zygote = GraphAutomaton::new(&graph, TransitionRule::Classical);
    let report = BatchRunner::new(zygote, batch(1)).unwrap().run(&[live]).unwrap();

    // a and b have two live neighbors and stay; c has two live of three and
    // stays; d sees one and stays dead. The start state is already fixed.
    let run = &report.runs[0];
    assert_eq!(run.cycle_begin(), Some(0));
    assert_eq!(run.cycle_length(), Some(1));
    assert_eq!(run.entropy, 0.0);
}

// ─── configuration ───────────────────────────────────────────────────────────

#[test]
fn test_experiment_from_toml() {
    init_logging();
    let config = ExperimentConfig::from_toml_str(
        r#"
        [rule]
        kind = "classical"

        [batch]
        max_steps = 1000
        num_workers = 2
        bucket_width = 0.01
        num_buckets = 101

        [mutation]
        seed = 4
        rewire = 12
        "#,
    )
    .unwrap();

    // The 3x3 torus is complete and cannot be rewired, so use 4x4.
    let states = "0000010000000000\n1110000000000000\n0000000000000000\n";
    let (graph, report) = run_experiment(Graph::torus(4), states, &config).unwrap();
    assert!(graph.is_consistent());
    assert_eq!(report.len(), 3);
    assert_eq!(report.histogram.total(), 3);
    assert_eq!(report.histogram.counts().len(), 101);
}

#[test]
fn test_bad_state_aborts_experiment() {
    let config = ExperimentConfig {
        batch: batch(2),
        ..ExperimentConfig::default()
    };
    let result = run_experiment(Graph::torus(3), "000010000\n00x010000\n", &config);
    assert!(result.is_err());
}
