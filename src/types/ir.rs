//! The compiled Arc module's wire IR: functions, nodes, edges, and strata.

use serde::{Deserialize, Serialize};

use super::{Handle, Type};

/// A named, typed input or output of a [`Function`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct Param {
    /// The parameter's name, unique within its function's inputs or outputs.
    pub name: String,
    /// The parameter's declared type.
    #[serde(rename = "type")]
    pub ty: Type,
    /// The default value literal, used when an input has no bound edge and no
    /// default can be synthesised from `ty` alone (e.g. `string`, `chan`).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default: Option<serde_json::Value>,
}

impl Param {
    /// A parameter with no default literal.
    #[must_use]
    pub fn new(name: impl Into<String>, ty: Type) -> Self {
        Self {
            name: name.into(),
            ty,
            default: None,
        }
    }

    /// A parameter carrying a default-value literal.
    #[must_use]
    pub fn with_default(name: impl Into<String>, ty: Type, default: serde_json::Value) -> Self {
        Self {
            name: name.into(),
            ty,
            default: Some(default),
        }
    }
}

/// A stage signature: the WASM-exported function's name plus its ordered
/// input and output parameter lists.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct Function {
    /// The function's name; must match a WASM export of the same name.
    pub name: String,
    /// Ordered input parameters.
    pub inputs: Vec<Param>,
    /// Ordered output parameters.
    pub outputs: Vec<Param>,
}

impl Function {
    /// Looks up an input parameter by name.
    #[must_use]
    pub fn input(&self, name: &str) -> Option<&Param> {
        self.inputs.iter().find(|p| p.name == name)
    }

    /// Looks up an output parameter by name.
    #[must_use]
    pub fn output(&self, name: &str) -> Option<&Param> {
        self.outputs.iter().find(|p| p.name == name)
    }
}

/// Which external channels feed a node's inputs and receive its outputs.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct ChannelBindings {
    /// Channel key to bound input parameter name.
    #[serde(default)]
    pub read: std::collections::BTreeMap<u32, String>,
    /// Output parameter name to bound channel key.
    #[serde(default)]
    pub write: std::collections::BTreeMap<String, u32>,
}

/// One instantiation of a [`Function`] within a module graph.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct Node {
    /// The node's unique key within its module.
    pub key: String,
    /// The name of the [`Function`] this node instantiates.
    #[serde(rename = "type")]
    pub node_type: String,
    /// Ordered input parameter names, matching the function signature.
    pub inputs: Vec<String>,
    /// Ordered output parameter names, matching the function signature.
    pub outputs: Vec<String>,
    /// Channel bindings for this node's inputs and outputs.
    #[serde(default)]
    pub channels: ChannelBindings,
}

/// A data dependency: `source`'s value feeds `target`'s input slot.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct Edge {
    /// The producing node/output-parameter pair.
    pub source: Handle,
    /// The consuming node/input-parameter pair.
    pub target: Handle,
}

/// A compiled Arc module: function library, node instances, data edges, and
/// the topological execution order.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct IrModule {
    /// The function library, keyed by name implicitly via [`Function::name`].
    pub functions: Vec<Function>,
    /// Node instances.
    pub nodes: Vec<Node>,
    /// Data edges between node output and input slots.
    pub edges: Vec<Edge>,
    /// Topological layers: each inner list is a set of node keys that may run
    /// in any relative order; outer order is the execution order between
    /// layers. The reference runtime iterates each layer in declared order.
    pub strata: Vec<Vec<String>>,
}

impl IrModule {
    /// Looks up a function by name.
    #[must_use]
    pub fn function(&self, name: &str) -> Option<&Function> {
        self.functions.iter().find(|f| f.name == name)
    }

    /// Looks up a node by key.
    #[must_use]
    pub fn node(&self, key: &str) -> Option<&Node> {
        self.nodes.iter().find(|n| n.key == key)
    }

    /// All edges whose target is `(node_key, param_name)`.
    pub fn edges_into<'a>(
        &'a self,
        node_key: &'a str,
        param_name: &'a str,
    ) -> impl Iterator<Item = &'a Edge> + 'a {
        self.edges
            .iter()
            .filter(move |e| e.target.node_key == node_key && e.target.param_name == param_name)
    }

    /// Iterates node keys in execution order: strata in declared order, nodes
    /// within a stratum in declared order.
    pub fn execution_order(&self) -> impl Iterator<Item = &str> {
        self.strata.iter().flatten().map(String::as_str)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Kind;

    fn sample_module() -> IrModule {
        IrModule {
            functions: vec![Function {
                name: "add".to_string(),
                inputs: vec![
                    Param::new("x", Type::scalar(Kind::F64)),
                    Param::new("y", Type::scalar(Kind::F64)),
                ],
                outputs: vec![Param::new("out", Type::scalar(Kind::F64))],
            }],
            nodes: vec![Node {
                key: "n1".to_string(),
                node_type: "add".to_string(),
                inputs: vec!["x".to_string(), "y".to_string()],
                outputs: vec!["out".to_string()],
                channels: ChannelBindings {
                    read: [(1, "x".to_string())].into_iter().collect(),
                    write: [("out".to_string(), 2)].into_iter().collect(),
                },
            }],
            edges: vec![],
            strata: vec![vec!["n1".to_string()]],
        }
    }

    #[test]
    fn function_lookup_by_name() {
        let m = sample_module();
        assert!(m.function("add").is_some());
        assert!(m.function("missing").is_none());
    }

    #[test]
    fn node_lookup_by_key() {
        let m = sample_module();
        assert_eq!(m.node("n1").unwrap().node_type, "add");
    }

    #[test]
    fn execution_order_flattens_strata() {
        let m = sample_module();
        let order: Vec<&str> = m.execution_order().collect();
        assert_eq!(order, vec!["n1"]);
    }

    #[test]
    fn edges_into_filters_by_target() {
        let mut m = sample_module();
        m.edges.push(Edge {
            source: Handle::new("n0", "out"),
            target: Handle::new("n1", "y"),
        });
        let matches: Vec<_> = m.edges_into("n1", "y").collect();
        assert_eq!(matches.len(), 1);
        assert_eq!(matches[0].source.node_key, "n0");
    }

    #[test]
    fn wire_round_trip_through_json() {
        let m = sample_module();
        let json = serde_json::to_string(&m).unwrap();
        let back: IrModule = serde_json::from_str(&json).unwrap();
        assert_eq!(m, back);
    }
}
