//! Python bindings, built with the `python` feature.
//!
//! Graphs cross the boundary as JSON descriptions and states as `'0'/'1'`
//! strings. Batch results come back as dicts of numpy arrays.

use numpy::PyArray1;
use pyo3::exceptions::PyValueError;
use pyo3::prelude::*;
use pyo3::types::PyDict;
use pyo3::wrap_pyfunction;

use crate::config::{BatchConfig, MutationConfig};
use crate::description::GraphDescription;
use crate::error::GraphLifeError;
use crate::life::batch::{default_mu_grid, BatchRunner};
use crate::life::topology::mutate_zygote;
use crate::life::{GraphAutomaton, TrajectoryAnalyzer, TransitionRule};
use crate::states::parse_states;

fn to_py_err(e: GraphLifeError) -> PyErr {
    PyValueError::new_err(e.to_string())
}

/// Read a rule from a dict such as `{"kind": "density", "mu": 0.3}`.
///
/// A missing dict means the default rule. Every parameter of the named
/// family must be present.
fn rule_from_dict(rule: Option<&PyDict>) -> PyResult<TransitionRule> {
    let cfg = match rule {
        Some(cfg) => cfg,
        None => return Ok(TransitionRule::default()),
    };

    let kind: String = match cfg.get_item("kind")? {
        Some(value) => value.extract()?,
        None => return Err(PyValueError::new_err("rule dict needs a \"kind\" entry")),
    };
    let count = |key: &str| -> PyResult<usize> {
        match cfg.get_item(key)? {
            Some(value) => value.extract::<usize>(),
            None => Err(PyValueError::new_err(format!("{} rule needs \"{}\"", kind, key))),
        }
    };

    match kind.as_str() {
        "classical" => Ok(TransitionRule::Classical),
        "density" => {
            let mu = match cfg.get_item("mu")? {
                Some(value) => value.extract::<f64>()?,
                None => return Err(PyValueError::new_err("density rule needs \"mu\"")),
            };
            if !mu.is_finite() {
                return Err(PyValueError::new_err(format!("mu must be finite, got {}", mu)));
            }
            Ok(TransitionRule::Density { mu })
        }
        "underpopulation" => Ok(TransitionRule::Underpopulation {
            birth: count("birth")?,
            survive: count("survive")?,
        }),
        "overpopulation" => Ok(TransitionRule::Overpopulation {
            birth: count("birth")?,
            survive: count("survive")?,
        }),
        "modified_conway" => Ok(TransitionRule::ModifiedConway {
            low: count("low")?,
            exact: count("exact")?,
            high: count("high")?,
        }),
        other => Err(PyValueError::new_err(format!("unknown rule kind: {}", other))),
    }
}

/// Simulate a batch of initial states over one graph.
///
/// # Arguments
/// * `description` - JSON graph description
/// * `states` - One `'0'/'1'` string per simulation
/// * `rule` - Rule dict; defaults to overpopulation(birth=2, survive=3)
/// * `max_steps` - Maximum states observed per simulation
/// * `num_workers` - Simulations run concurrently per cohort
///
/// # Returns
/// * Dict with `entropy`, `steps`, `cycle_begin`, `cycle_length` (-1 when no
///   cycle was found), `histogram`, and `overflow`
#[pyfunction]
#[pyo3(signature = (description, states, rule=None, max_steps=4000, num_workers=None, bucket_width=0.001, num_buckets=61))]
fn simulate_batch<'py>(
    py: Python<'py>,
    description: &str,
    states: Vec<String>,
    rule: Option<&PyDict>,
    max_steps: usize,
    num_workers: Option<usize>,
    bucket_width: f64,
    num_buckets: usize,
) -> PyResult<&'py PyDict> {
    let rule = rule_from_dict(rule)?;
    let (graph, _) = GraphDescription::from_json_str(description)
        .and_then(|d| d.resolve())
        .map_err(to_py_err)?;

    let defaults = BatchConfig::default();
    let config = BatchConfig {
        max_steps,
        num_workers: num_workers.unwrap_or(defaults.num_workers),
        bucket_width,
        num_buckets,
    };

    let text = states.join("\n");
    let report = py
        .allow_threads(|| {
            let zygote = GraphAutomaton::new(&graph, rule);
            BatchRunner::new(zygote, config)?.run_str(&text)
        })
        .map_err(to_py_err)?;

    let signed = |values: Vec<Option<usize>>| -> Vec<i64> {
        values
            .into_iter()
            .map(|v| v.map_or(-1, |x| x as i64))
            .collect()
    };
    let steps: Vec<i64> = report.steps().into_iter().map(|s| s as i64).collect();

    let dict = PyDict::new(py);
    dict.set_item("entropy", PyArray1::from_vec(py, report.entropies()))?;
    dict.set_item("steps", PyArray1::from_vec(py, steps))?;
    dict.set_item("cycle_begin", PyArray1::from_vec(py, signed(report.cycle_begins())))?;
    dict.set_item("cycle_length", PyArray1::from_vec(py, signed(report.cycle_lengths())))?;
    dict.set_item(
        "histogram",
        PyArray1::from_vec(py, report.histogram.counts().to_vec()),
    )?;
    dict.set_item("overflow", report.histogram.overflow())?;
    Ok(dict)
}

/// Run one trajectory and return it frame by frame.
///
/// Without `state`, the live flags stored in the description are used.
#[pyfunction]
#[pyo3(signature = (description, state=None, rule=None, max_steps=4000))]
fn simulate_one<'py>(
    py: Python<'py>,
    description: &str,
    state: Option<&str>,
    rule: Option<&PyDict>,
    max_steps: usize,
) -> PyResult<&'py PyDict> {
    let rule = rule_from_dict(rule)?;
    let (graph, stored) = GraphDescription::from_json_str(description)
        .and_then(|d| d.resolve())
        .map_err(to_py_err)?;

    let mut automaton = GraphAutomaton::new(&graph, rule);
    let loaded = match state {
        Some(state) => automaton.set_state_str(state),
        None => automaton.set_state(stored),
    };
    loaded.map_err(to_py_err)?;

    let trajectory = TrajectoryAnalyzer::new(max_steps).run(&mut automaton);
    let result = trajectory.to_result().map_err(to_py_err)?;
    let frames: Vec<String> = trajectory.frames().iter().map(|f| f.to_string()).collect();

    let dict = PyDict::new(py);
    dict.set_item("entropy", result.entropy)?;
    dict.set_item("steps", result.steps_observed)?;
    dict.set_item("cycle_begin", result.cycle_begin())?;
    dict.set_item("cycle_length", result.cycle_length())?;
    dict.set_item("frames", frames)?;
    Ok(dict)
}

/// Apply topology mutations to a description and return the new JSON.
///
/// Live flags are carried over unchanged.
#[pyfunction]
#[pyo3(signature = (description, seed, rewire, add=0, remove=0, max_attempts=10000))]
fn rewire_description(
    description: &str,
    seed: u64,
    rewire: usize,
    add: usize,
    remove: usize,
    max_attempts: usize,
) -> PyResult<String> {
    let (mut graph, live) = GraphDescription::from_json_str(description)
        .and_then(|d| d.resolve())
        .map_err(to_py_err)?;
    let config = MutationConfig {
        seed,
        rewire,
        add,
        remove,
        max_attempts,
    };
    config.validate().map_err(|e| to_py_err(e.into()))?;
    mutate_zygote(&mut graph, &config).map_err(to_py_err)?;
    GraphDescription::from_graph(&graph, &live)
        .to_json_string()
        .map_err(to_py_err)
}

/// Mean attractor entropy under the density rule for each threshold.
///
/// # Returns
/// * Tuple of (mu values, mean entropies)
#[pyfunction]
#[pyo3(signature = (description, states, mus=None, max_steps=4000, num_workers=None))]
fn density_sweep<'py>(
    py: Python<'py>,
    description: &str,
    states: Vec<String>,
    mus: Option<Vec<f64>>,
    max_steps: usize,
    num_workers: Option<usize>,
) -> PyResult<(&'py PyArray1<f64>, &'py PyArray1<f64>)> {
    let (graph, _) = GraphDescription::from_json_str(description)
        .and_then(|d| d.resolve())
        .map_err(to_py_err)?;
    let mus = mus.unwrap_or_else(default_mu_grid);

    let defaults = BatchConfig::default();
    let config = BatchConfig {
        max_steps,
        num_workers: num_workers.unwrap_or(defaults.num_workers),
        ..defaults
    };

    let text = states.join("\n");
    let points = py
        .allow_threads(|| {
            let states = parse_states(&text, graph.n_vertices())?;
            let zygote = GraphAutomaton::new(&graph, TransitionRule::default());
            BatchRunner::new(zygote, config)?.density_sweep(&states, &mus)
        })
        .map_err(to_py_err)?;

    let xs: Vec<f64> = points.iter().map(|p| p.mu).collect();
    let ys: Vec<f64> = points.iter().map(|p| p.mean_entropy).collect();
    Ok((PyArray1::from_vec(py, xs), PyArray1::from_vec(py, ys)))
}

/// Python module definition
#[pymodule]
fn graphlife_rust(_py: Python, m: &PyModule) -> PyResult<()> {
    m.add_function(wrap_pyfunction!(simulate_batch, m)?)?;
    m.add_function(wrap_pyfunction!(simulate_one, m)?)?;
    m.add_function(wrap_pyfunction!(rewire_description, m)?)?;
    m.add_function(wrap_pyfunction!(density_sweep, m)?)?;
    Ok(())
}
