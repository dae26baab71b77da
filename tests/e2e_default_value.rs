//! Scenario 3 — default value path: a stage parameter with no incoming edge
//! is seeded from its IR default, and the node runs as soon as the bound
//! parameter produces, without waiting on the unbound one.

use std::rc::Rc;

use arc_runtime::state::Config;
use arc_runtime::types::ir::{ChannelBindings, Edge, Function, IrModule, Node as IrNode, Param};
use arc_runtime::{Handle, Kind, Series, State, Type};

fn module() -> Rc<IrModule> {
    Rc::new(IrModule {
        functions: vec![
            Function {
                name: "source".to_string(),
                inputs: vec![],
                outputs: vec![Param::new("out", Type::scalar(Kind::I32))],
            },
            Function {
                name: "add".to_string(),
                inputs: vec![
                    Param::new("x", Type::scalar(Kind::I32)),
                    Param::with_default("y", Type::scalar(Kind::I32), serde_json::json!(5)),
                ],
                outputs: vec![Param::new("out", Type::scalar(Kind::I32))],
            },
        ],
        nodes: vec![
            IrNode {
                key: "up".to_string(),
                node_type: "source".to_string(),
                inputs: vec![],
                outputs: vec!["out".to_string()],
                channels: ChannelBindings::default(),
            },
            IrNode {
                key: "add".to_string(),
                node_type: "add".to_string(),
                inputs: vec!["x".to_string(), "y".to_string()],
                outputs: vec!["out".to_string()],
                channels: ChannelBindings::default(),
            },
        ],
        edges: vec![Edge {
            source: Handle::new("up", "out"),
            target: Handle::new("add", "x"),
        }],
        strata: vec![vec!["up".to_string()], vec!["add".to_string()]],
    })
}

#[test]
fn unbound_parameter_uses_its_declared_default() {
    arc_runtime::test_utils::init_test_logging();
    let state = State::new(Config {
        ir: module(),
        channel_digests: vec![],
    });
    let up = state.node("up");
    let add = state.node("add");

    arc_runtime::test_phase!("push x = 7, y stays at its synthetic default");
    up.set_output(0, Series::one(7_i32), Series::one(1_i64));
    let ran = add.refresh_inputs();
    arc_runtime::assert_with_log!(ran, "add runs once x is bound", true, ran);

    let x = add.input(0).at::<i32>(0).expect("x scalar");
    let y = add.input(1).at::<i32>(0).expect("y scalar, from default");
    arc_runtime::assert_with_log!(x == 7, "x carries the pushed value", 7, x);
    arc_runtime::assert_with_log!(y == 5, "y carries the IR default", 5, y);

    let result = x + y;
    add.set_output(0, Series::one(result), Series::one(1_i64));
    arc_runtime::assert_with_log!(result == 12, "x + default(y) == 12", 12, result);
    arc_runtime::test_complete!("default_value");
}
