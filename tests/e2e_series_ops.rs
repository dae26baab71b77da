//! Scenario 4 — series ops: building a series through the handle table and
//! applying an elementwise scalar op, the shape every `series_*` host binding
//! reduces to once its handle arguments are resolved.

use std::rc::Rc;

use arc_runtime::state::Config;
use arc_runtime::types::ir::IrModule;
use arc_runtime::types::series::scalar_op;
use arc_runtime::{Kind, Series, State, Type};

fn empty_module() -> Rc<IrModule> {
    Rc::new(IrModule {
        functions: vec![],
        nodes: vec![],
        edges: vec![],
        strata: vec![],
    })
}

#[test]
fn scalar_multiply_through_the_handle_table() {
    arc_runtime::test_utils::init_test_logging();
    let state = State::new(Config {
        ir: empty_module(),
        channel_digests: vec![],
    });

    arc_runtime::test_phase!("series_create_empty_f64(3) then set(a, i, v)");
    let mut a = Series::empty(Type::scalar(Kind::F64));
    a.write(1.0_f64);
    a.write(2.0_f64);
    a.write(3.0_f64);
    let handle_a = state.series_store(a);

    arc_runtime::test_phase!("series_element_mul_f64(a, 2.0)");
    let a = state.series_get(handle_a).expect("handle_a resolves");
    let b = scalar_op(&a, 2.0, false, |x, y| x * y);
    let handle_b = state.series_store(b);

    let b = state.series_get(handle_b).expect("handle_b resolves");
    arc_runtime::assert_with_log!(b.len() == 3, "b keeps a's length", 3, b.len());
    let first = b.at::<f64>(0).expect("b[0]");
    let last = b.at::<f64>(2).expect("b[2]");
    arc_runtime::assert_with_log!(first == 2.0, "series_index_f64(b, 0) == 2.0", 2.0, first);
    arc_runtime::assert_with_log!(last == 6.0, "series_index_f64(b, 2) == 6.0", 6.0, last);
    arc_runtime::test_complete!("series_ops");
}
