//! Builder for Earth Engine expression graphs.
//!
//! Computations are described as a tree of [`Value`]s and lowered into the
//! REST wire form, an [`Expression`] holding a flat table of [`Node`]s keyed
//! by id with `result` naming the root. Function bodies are hoisted into the
//! table and referenced by id, as the REST API requires.
//!
//! ```text
//! {"result": "1",
//!  "values": {"0": {...body...},
//!             "1": {"functionInvocationValue": {"functionName": "...", "arguments": {...}}}}}
//! ```

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;

/// A node of the expression tree being built.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Constant(JsonValue),
    Call {
        function: String,
        arguments: BTreeMap<String, Value>,
    },
    Argument(String),
    Function {
        argument_names: Vec<String>,
        body: Box<Value>,
    },
    Array(Vec<Value>),
    Dictionary(BTreeMap<String, Value>),
}

impl Value {
    pub fn constant(value: impl Into<JsonValue>) -> Self {
        Value::Constant(value.into())
    }

    pub fn null() -> Self {
        Value::Constant(JsonValue::Null)
    }

    /// Invoke a named server-side algorithm.
    pub fn call<'a>(function: &str, arguments: impl IntoIterator<Item = (&'a str, Value)>) -> Self {
        Value::Call {
            function: function.to_string(),
            arguments: arguments
                .into_iter()
                .map(|(name, value)| (name.to_string(), value))
                .collect(),
        }
    }

    /// Invoke an algorithm that takes no arguments.
    pub fn invoke(function: &str) -> Self {
        Value::Call {
            function: function.to_string(),
            arguments: BTreeMap::new(),
        }
    }

    pub fn argument(name: &str) -> Self {
        Value::Argument(name.to_string())
    }

    /// A single-argument function, as taken by `Collection.map`.
    pub fn function(argument: &str, body: Value) -> Self {
        Value::Function {
            argument_names: vec![argument.to_string()],
            body: Box::new(body),
        }
    }

    pub fn array(values: impl IntoIterator<Item = Value>) -> Self {
        Value::Array(values.into_iter().collect())
    }

    pub fn strings<S: AsRef<str>>(values: &[S]) -> Self {
        Value::Array(
            values
                .iter()
                .map(|s| Value::constant(s.as_ref()))
                .collect(),
        )
    }
}

/// Wire form of a value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Node {
    ConstantValue(JsonValue),
    FunctionInvocationValue(FunctionInvocation),
    ArgumentReference(String),
    FunctionDefinitionValue(FunctionDefinition),
    ArrayValue { values: Vec<Node> },
    DictionaryValue { values: BTreeMap<String, Node> },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FunctionInvocation {
    pub function_name: String,
    pub arguments: BTreeMap<String, Node>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FunctionDefinition {
    pub argument_names: Vec<String>,
    /// Id of the body in the expression's value table.
    pub body: String,
}

/// A complete expression as sent to the REST API.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Expression {
    pub result: String,
    pub values: BTreeMap<String, Node>,
}

impl Expression {
    pub fn new(root: Value) -> Self {
        let mut values = BTreeMap::new();
        let node = lower(root, &mut values);
        let result = values.len().to_string();
        values.insert(result.clone(), node);
        Self { result, values }
    }

    pub fn root(&self) -> Option<&Node> {
        self.values.get(&self.result)
    }

    /// Names of every algorithm invoked anywhere in the graph.
    pub fn function_names(&self) -> Vec<&str> {
        let mut names = Vec::new();
        for node in self.values.values() {
            collect_names(node, &mut names);
        }
        names
    }

    pub fn invokes(&self, function: &str) -> bool {
        self.function_names().contains(&function)
    }

    /// Every constant in the graph.
    pub fn constants(&self) -> Vec<&JsonValue> {
        let mut constants = Vec::new();
        for node in self.values.values() {
            collect_constants(node, &mut constants);
        }
        constants
    }
}

fn lower(value: Value, table: &mut BTreeMap<String, Node>) -> Node {
    match value {
        Value::Constant(v) => Node::ConstantValue(v),
        Value::Argument(name) => Node::ArgumentReference(name),
        Value::Call {
            function,
            arguments,
        } => Node::FunctionInvocationValue(FunctionInvocation {
            function_name: function,
            arguments: arguments
                .into_iter()
                .map(|(name, value)| (name, lower(value, table)))
                .collect(),
        }),
        Value::Function {
            argument_names,
            body,
        } => {
            let body = lower(*body, table);
            let id = table.len().to_string();
            table.insert(id.clone(), body);
            Node::FunctionDefinitionValue(FunctionDefinition {
                argument_names,
                body: id,
            })
        }
        Value::Array(values) => Node::ArrayValue {
            values: values.into_iter().map(|v| lower(v, table)).collect(),
        },
        Value::Dictionary(values) => Node::DictionaryValue {
            values: values
                .into_iter()
                .map(|(k, v)| (k, lower(v, table)))
                .collect(),
        },
    }
}

fn collect_names<'a>(node: &'a Node, names: &mut Vec<&'a str>) {
    match node {
        Node::FunctionInvocationValue(call) => {
            names.push(&call.function_name);
            for arg in call.arguments.values() {
                collect_names(arg, names);
            }
        }
        Node::ArrayValue { values } => values.iter().for_each(|v| collect_names(v, names)),
        Node::DictionaryValue { values } => values.values().for_each(|v| collect_names(v, names)),
        _ => {}
    }
}

fn collect_constants<'a>(node: &'a Node, out: &mut Vec<&'a JsonValue>) {
    match node {
        Node::ConstantValue(v) => out.push(v),
        Node::FunctionInvocationValue(call) => {
            call.arguments.values().for_each(|v| collect_constants(v, out))
        }
        Node::ArrayValue { values } => values.iter().for_each(|v| collect_constants(v, out)),
        Node::DictionaryValue { values } => values.values().for_each(|v| collect_constants(v, out)),
        _ => {}
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_single_invocation_wire_form() {
        let expr = Expression::new(Value::call(
            "ImageCollection.load",
            [("id", Value::constant("MODIS/006/MOD10A1"))],
        ));

        assert_eq!(
            serde_json::to_value(&expr).unwrap(),
            json!({
                "result": "0",
                "values": {
                    "0": {
                        "functionInvocationValue": {
                            "functionName": "ImageCollection.load",
                            "arguments": {"id": {"constantValue": "MODIS/006/MOD10A1"}}
                        }
                    }
                }
            })
        );
    }

    #[test]
    fn test_function_body_is_hoisted() {
        let body = Value::call("Image.select", [("input", Value::argument("image"))]);
        let expr = Expression::new(Value::call(
            "Collection.map",
            [
                ("collection", Value::null()),
                ("baseAlgorithm", Value::function("image", body)),
            ],
        ));

        assert_eq!(expr.result, "1");
        assert_eq!(expr.values.len(), 2);
        let wire = serde_json::to_value(&expr).unwrap();
        assert_eq!(
            wire["values"]["1"]["functionInvocationValue"]["arguments"]["baseAlgorithm"],
            json!({"functionDefinitionValue": {"argumentNames": ["image"], "body": "0"}})
        );
        assert_eq!(
            wire["values"]["0"]["functionInvocationValue"]["arguments"]["input"],
            json!({"argumentReference": "image"})
        );
        assert!(expr.invokes("Image.select"));
        assert!(expr.invokes("Collection.map"));
    }

    #[test]
    fn test_arrays_and_constants() {
        let expr = Expression::new(Value::array([Value::constant(1.5), Value::constant("a")]));
        assert_eq!(
            serde_json::to_value(&expr).unwrap()["values"]["0"],
            json!({"arrayValue": {"values": [{"constantValue": 1.5}, {"constantValue": "a"}]}})
        );
        assert_eq!(expr.constants(), vec![&json!(1.5), &json!("a")]);
    }
}
