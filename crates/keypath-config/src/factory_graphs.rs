//! Built-in graphs bundled with the library.
//!
//! - **enter_key** - the full nine-stage path of an Enter key press, from the
//!   key switch to the CPU executing the application's handler
//! - **interrupt_path** - the first three stages only, with explicit edges

use crate::GraphFile;

/// Names of all built-in graphs.
pub const FACTORY_GRAPH_NAMES: &[&str] = &["enter_key", "interrupt_path"];

const ENTER_KEY: &str = r#"
name = "What Happens When You Press Enter?"
description = "Keyboard scan to CPU execute: every stage a key press passes through."
start = "keyboard"

[chain]
edge_latency_ms = 170.0
step_ms = 25.0

[[nodes]]
id = "keyboard"
label = "Keyboard"
kind = "hardware"
tooltip = "A key press generates an electrical scan signal."
base_latency_ms = 110.0
ops_cost = 420
position = [90.0, 90.0]

[[nodes]]
id = "keyboard_controller"
label = "Keyboard Controller"
kind = "hardware"
tooltip = "Firmware/controller translates scan code and raises an interrupt."
base_latency_ms = 130.0
ops_cost = 880
position = [290.0, 90.0]

[[nodes]]
id = "hardware_interrupt"
label = "Hardware Interrupt"
kind = "hardware"
tooltip = "CPU is notified that input is ready via an interrupt line."
base_latency_ms = 90.0
ops_cost = 1350
position = [500.0, 90.0]

[[nodes]]
id = "kernel_input_handler"
label = "Kernel Input Handler"
kind = "kernel"
tooltip = "Kernel interrupt service routine reads and normalizes key data."
base_latency_ms = 170.0
ops_cost = 2200
position = [700.0, 150.0]

[[nodes]]
id = "scheduler"
label = "Scheduler"
kind = "kernel"
tooltip = "Scheduler decides which waiting thread should process the event."
base_latency_ms = 150.0
ops_cost = 1900
position = [700.0, 330.0]

[[nodes]]
id = "application_layer"
label = "Application Layer"
kind = "application"
tooltip = "Target app receives Enter and executes its handler logic."
base_latency_ms = 180.0
ops_cost = 2700
position = [500.0, 390.0]

[[nodes]]
id = "cpu_fetch"
label = "CPU Fetch"
kind = "cpu"
tooltip = "Instruction bytes are fetched from cache or memory."
base_latency_ms = 120.0
ops_cost = 1600
position = [300.0, 390.0]

[[nodes]]
id = "cpu_decode"
label = "CPU Decode"
kind = "cpu"
tooltip = "Control logic decodes opcode and required operands."
base_latency_ms = 110.0
ops_cost = 1700
position = [140.0, 320.0]

[[nodes]]
id = "cpu_execute"
label = "CPU Execute"
kind = "cpu"
tooltip = "ALU/units execute operations and commit architectural changes."
base_latency_ms = 130.0
ops_cost = 2400
position = [90.0, 210.0]
"#;

const INTERRUPT_PATH: &str = r#"
name = "Interrupt Path"
description = "Key switch to kernel input handler."

[simulation]
speed = 0.5
seed = 1

[[nodes]]
id = "keyboard"
label = "Keyboard"
kind = "hardware"
tooltip = "A key press generates an electrical scan signal."
base_latency_ms = 110.0
ops_cost = 420
position = [90.0, 90.0]

[[nodes]]
id = "hardware_interrupt"
label = "Hardware Interrupt"
kind = "hardware"
tooltip = "CPU is notified that input is ready via an interrupt line."
base_latency_ms = 90.0
ops_cost = 1350
position = [500.0, 90.0]

[[nodes]]
id = "kernel_input_handler"
label = "Kernel Input Handler"
kind = "kernel"
tooltip = "Kernel interrupt service routine reads and normalizes key data."
base_latency_ms = 170.0
ops_cost = 2200
position = [700.0, 150.0]

[[edges]]
id = "irq_line"
from = "keyboard"
to = "hardware_interrupt"
latency_ms = 300.0

[[edges]]
from = "hardware_interrupt"
to = "kernel_input_handler"
latency_ms = 195.0
"#;

const FACTORY_GRAPHS_TOML: &[(&str, &str)] =
    &[("enter_key", ENTER_KEY), ("interrupt_path", INTERRUPT_PATH)];

/// Get all built-in graphs.
///
/// # Example
///
/// ```rust
/// use keypath_config::factory_graphs;
///
/// for graph in factory_graphs() {
///     println!("{}: {} stages", graph.name, graph.len());
/// }
/// ```
pub fn factory_graphs() -> Vec<GraphFile> {
    FACTORY_GRAPHS_TOML
        .iter()
        .filter_map(|(_, toml)| GraphFile::from_toml(toml).ok())
        .collect()
}

/// Get a built-in graph by identifier or display name (case-insensitive).
///
/// # Example
///
/// ```rust
/// use keypath_config::get_factory_graph;
///
/// let graph = get_factory_graph("enter_key").unwrap();
/// assert_eq!(graph.len(), 9);
/// ```
pub fn get_factory_graph(name: &str) -> Option<GraphFile> {
    let name_lower = name.to_lowercase();

    if let Some((_, toml)) = FACTORY_GRAPHS_TOML
        .iter()
        .find(|(id, _)| id.to_lowercase() == name_lower)
    {
        return GraphFile::from_toml(toml).ok();
    }

    factory_graphs()
        .into_iter()
        .find(|graph| graph.name.to_lowercase() == name_lower)
}

/// Get the identifiers of all built-in graphs.
pub fn factory_graph_names() -> Vec<&'static str> {
    FACTORY_GRAPHS_TOML.iter().map(|(name, _)| *name).collect()
}

/// Check if a name refers to a built-in graph.
///
/// ```rust
/// use keypath_config::is_factory_graph;
///
/// assert!(is_factory_graph("Enter_Key"));
/// assert!(!is_factory_graph("escape_key"));
/// ```
pub fn is_factory_graph(name: &str) -> bool {
    get_factory_graph(name).is_some()
}
