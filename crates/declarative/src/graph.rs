//! Stack graph - declarations, exports and the edges between them
//!
//! Edges are never declared explicitly. Referencing another declaration's
//! output through an [`Input`] is what makes one node depend on another.

use crate::error::{Error, Result};
use crate::eval::{ResolvedOutputs, evaluate};
use crate::planner::ExecutionPlan;
use crate::resource::{Declaration, Resource};
use crate::types::{Input, OutputRef};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::{BTreeMap, BTreeSet, HashMap};

/// Handle to a declared node, used to reference its outputs
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Handle {
    name: String,
}

impl Handle {
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Deferred reference to one of this node's outputs
    pub fn output(&self, path: &str) -> Input {
        Input::output(&self.name, path)
    }
}

/// A named stack output
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Export {
    pub value: Input,
    #[serde(default)]
    pub secret: bool,
}

/// Ordered set of declarations plus the stack's exports
#[derive(Debug, Default)]
pub struct StackGraph {
    declarations: Vec<Declaration>,
    index: HashMap<String, usize>,
    exports: BTreeMap<String, Export>,
}

impl StackGraph {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a resource
    ///
    /// Every referenced resource must already be declared, so a graph built
    /// through `declare` is acyclic by construction.
    pub fn declare(&mut self, resource: &dyn Resource) -> Result<Handle> {
        self.insert(Declaration::from_resource(resource))
    }

    fn insert(&mut self, decl: Declaration) -> Result<Handle> {
        if self.index.contains_key(&decl.name) {
            return Err(Error::DuplicateName { name: decl.name });
        }
        if let Some(missing) = decl
            .dependencies()
            .into_iter()
            .find(|d| !self.index.contains_key(*d))
        {
            return Err(Error::UnknownReference {
                from: decl.name.clone(),
                to: missing.to_string(),
            });
        }

        log::debug!(
            "Declared {} ({}), depends on {:?}",
            decl.name,
            decl.type_token,
            decl.dependencies()
        );

        let handle = Handle {
            name: decl.name.clone(),
        };
        self.index.insert(decl.name.clone(), self.declarations.len());
        self.declarations.push(decl);
        Ok(handle)
    }

    /// Publish a stack output
    pub fn export(&mut self, name: &str, value: Input, secret: bool) -> Result<()> {
        self.check_references(name, &value)?;
        self.exports
            .insert(name.to_string(), Export { value, secret });
        Ok(())
    }

    fn check_references(&self, from: &str, input: &Input) -> Result<()> {
        match input
            .references()
            .into_iter()
            .find(|r| !self.index.contains_key(&r.resource))
        {
            Some(missing) => Err(Error::UnknownReference {
                from: from.to_string(),
                to: missing.resource.clone(),
            }),
            None => Ok(()),
        }
    }

    /// Rebuild a graph from declarations in any order
    ///
    /// Unlike [`StackGraph::declare`], forward references are allowed here, so
    /// the result is checked for unknown names and cycles before returning.
    pub fn from_declarations(
        declarations: Vec<Declaration>,
        exports: BTreeMap<String, Export>,
    ) -> Result<Self> {
        let mut graph = Self::new();
        for decl in declarations {
            if graph.index.contains_key(&decl.name) {
                return Err(Error::DuplicateName { name: decl.name });
            }
            graph.index.insert(decl.name.clone(), graph.declarations.len());
            graph.declarations.push(decl);
        }

        for decl in &graph.declarations {
            for dep in decl.dependencies() {
                if !graph.index.contains_key(dep) {
                    return Err(Error::UnknownReference {
                        from: decl.name.clone(),
                        to: dep.to_string(),
                    });
                }
            }
        }
        for (name, export) in &exports {
            graph.check_references(name, &export.value)?;
        }
        graph.exports = exports;

        // Ordering fails on cycles
        graph.plan()?;
        Ok(graph)
    }

    pub fn get(&self, name: &str) -> Option<&Declaration> {
        self.index.get(name).map(|&i| &self.declarations[i])
    }

    /// Position of a declaration in declaration order
    pub fn position(&self, name: &str) -> Option<usize> {
        self.index.get(name).copied()
    }

    pub fn declarations(&self) -> &[Declaration] {
        &self.declarations
    }

    pub fn exports(&self) -> &BTreeMap<String, Export> {
        &self.exports
    }

    pub fn len(&self) -> usize {
        self.declarations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.declarations.is_empty()
    }

    /// Declarations of a given type token
    pub fn of_type<'a>(&'a self, type_token: &'a str) -> impl Iterator<Item = &'a Declaration> {
        self.declarations
            .iter()
            .filter(move |d| d.type_token == type_token)
    }

    /// Names of the declarations that reference `name`
    pub fn dependents(&self, name: &str) -> BTreeSet<&str> {
        self.declarations
            .iter()
            .filter(|d| d.dependencies().contains(name))
            .map(|d| d.name.as_str())
            .collect()
    }

    /// `name` plus everything it transitively depends on
    pub fn closure(&self, name: &str) -> Result<BTreeSet<String>> {
        self.walk(name, |current| {
            self.get(current)
                .map(|d| d.dependencies().into_iter().map(str::to_string).collect())
                .unwrap_or_default()
        })
    }

    /// `name` plus everything that transitively depends on it
    pub fn dependent_closure(&self, name: &str) -> Result<BTreeSet<String>> {
        self.walk(name, |current| {
            self.dependents(current)
                .into_iter()
                .map(str::to_string)
                .collect()
        })
    }

    fn walk(
        &self,
        name: &str,
        next: impl Fn(&str) -> Vec<String>,
    ) -> Result<BTreeSet<String>> {
        if !self.index.contains_key(name) {
            return Err(Error::UnknownTarget(name.to_string()));
        }
        let mut seen = BTreeSet::new();
        let mut stack = vec![name.to_string()];
        while let Some(current) = stack.pop() {
            if seen.insert(current.clone()) {
                stack.extend(next(&current));
            }
        }
        Ok(seen)
    }

    /// Every output reference consumed by a declaration or export
    pub fn consumed_outputs(&self) -> BTreeSet<&OutputRef> {
        self.declarations
            .iter()
            .flat_map(Declaration::references)
            .chain(self.exports.values().flat_map(|e| e.value.references()))
            .collect()
    }

    /// Whether any output of `name` is consumed anywhere
    pub fn is_consumed(&self, name: &str) -> bool {
        self.consumed_outputs().iter().any(|r| r.resource == name)
    }

    /// Whether an input is derived from an output the producer marks secret
    pub fn derives_from_secret(&self, input: &Input) -> bool {
        input.references().iter().any(|r| {
            self.get(&r.resource)
                .is_some_and(|d| d.is_secret_output(r.property()))
        })
    }

    /// Compute the apply order
    pub fn plan(&self) -> Result<ExecutionPlan> {
        ExecutionPlan::from_graph(self)
    }

    /// Evaluate every export against engine-resolved outputs
    pub fn evaluate_exports(&self, resolved: &ResolvedOutputs) -> Result<BTreeMap<String, Value>> {
        self.exports
            .iter()
            .map(|(name, export)| Ok((name.clone(), evaluate(&export.value, resolved)?)))
            .collect()
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::types::Inputs;
    use serde_json::json;

    #[derive(Debug)]
    pub(crate) struct Node {
        pub name: &'static str,
        pub deps: Vec<&'static str>,
    }

    impl Resource for Node {
        fn name(&self) -> &str {
            self.name
        }

        fn type_token(&self) -> &'static str {
            "test:index:Node"
        }

        fn inputs(&self) -> Inputs {
            self.deps
                .iter()
                .map(|d| (format!("{d}Name"), Input::output(*d, "name")))
                .collect()
        }

        fn secret_outputs(&self) -> &'static [&'static str] {
            &["secret"]
        }
    }

    pub(crate) fn node(name: &'static str, deps: &[&'static str]) -> Node {
        Node {
            name,
            deps: deps.to_vec(),
        }
    }

    #[test]
    fn test_declare_registers_edges() {
        let mut graph = StackGraph::new();
        let rg = graph.declare(&node("rg", &[])).unwrap();
        graph.declare(&node("cluster", &["rg"])).unwrap();

        assert_eq!(rg.name(), "rg");
        assert_eq!(graph.len(), 2);
        assert_eq!(graph.dependents("rg").into_iter().collect::<Vec<_>>(), vec!["cluster"]);
        assert_eq!(graph.position("cluster"), Some(1));
    }

    #[test]
    fn test_declare_rejects_forward_reference() {
        let mut graph = StackGraph::new();
        let err = graph.declare(&node("cluster", &["rg"])).unwrap_err();
        assert!(matches!(
            err,
            Error::UnknownReference { ref from, ref to } if from == "cluster" && to == "rg"
        ));
        assert!(graph.is_empty());
    }

    #[test]
    fn test_declare_rejects_duplicates() {
        let mut graph = StackGraph::new();
        graph.declare(&node("rg", &[])).unwrap();
        let err = graph.declare(&node("rg", &[])).unwrap_err();
        assert!(matches!(err, Error::DuplicateName { .. }));
    }

    #[test]
    fn test_export_must_reference_declared_nodes() {
        let mut graph = StackGraph::new();
        let err = graph
            .export("kubeconfig", Input::output("creds", "value"), false)
            .unwrap_err();
        assert!(matches!(err, Error::UnknownReference { .. }));
    }

    #[test]
    fn test_from_declarations_allows_any_order() {
        let decls = vec![
            Declaration::from_resource(&node("cluster", &["rg"])),
            Declaration::from_resource(&node("rg", &[])),
        ];
        let graph = StackGraph::from_declarations(decls, BTreeMap::new()).unwrap();
        assert_eq!(graph.plan().unwrap().order(), vec!["rg", "cluster"]);
    }

    #[test]
    fn test_from_declarations_detects_cycles() {
        let decls = vec![
            Declaration::from_resource(&node("a", &["b"])),
            Declaration::from_resource(&node("b", &["a"])),
            Declaration::from_resource(&node("c", &[])),
        ];
        let err = StackGraph::from_declarations(decls, BTreeMap::new()).unwrap_err();
        match err {
            Error::Cycle(stuck) => assert_eq!(stuck, vec!["a".to_string(), "b".to_string()]),
            other => panic!("expected cycle, got {other}"),
        }
    }

    #[test]
    fn test_from_declarations_rejects_unknown_reference() {
        let decls = vec![Declaration::from_resource(&node("a", &["ghost"]))];
        let err = StackGraph::from_declarations(decls, BTreeMap::new()).unwrap_err();
        assert!(matches!(err, Error::UnknownReference { ref to, .. } if to == "ghost"));
    }

    #[test]
    fn test_closure_follows_transitive_dependencies() {
        let mut graph = StackGraph::new();
        graph.declare(&node("rg", &[])).unwrap();
        graph.declare(&node("key", &[])).unwrap();
        graph.declare(&node("cluster", &["rg", "key"])).unwrap();
        graph.declare(&node("creds", &["cluster", "rg"])).unwrap();
        graph.declare(&node("other", &[])).unwrap();

        let closure = graph.closure("creds").unwrap();
        assert_eq!(
            closure.into_iter().collect::<Vec<_>>(),
            vec!["cluster", "creds", "key", "rg"]
        );
        assert!(matches!(
            graph.closure("missing").unwrap_err(),
            Error::UnknownTarget(_)
        ));
    }

    #[test]
    fn test_dependent_closure_follows_consumers() {
        let mut graph = StackGraph::new();
        graph.declare(&node("rg", &[])).unwrap();
        graph.declare(&node("key", &[])).unwrap();
        graph.declare(&node("cluster", &["rg", "key"])).unwrap();
        graph.declare(&node("creds", &["cluster"])).unwrap();
        graph.declare(&node("other", &[])).unwrap();

        assert_eq!(
            graph.dependent_closure("key").unwrap().into_iter().collect::<Vec<_>>(),
            vec!["cluster", "creds", "key"]
        );
        assert_eq!(
            graph.dependent_closure("creds").unwrap().into_iter().collect::<Vec<_>>(),
            vec!["creds"]
        );
        assert!(matches!(
            graph.dependent_closure("missing").unwrap_err(),
            Error::UnknownTarget(_)
        ));
    }

    #[test]
    fn test_consumption_and_secrets() {
        let mut graph = StackGraph::new();
        let pw = graph.declare(&node("password", &[])).unwrap();
        graph.declare(&node("unused", &[])).unwrap();
        graph.declare(&node("app", &["password"])).unwrap();

        assert!(graph.is_consumed("password"));
        assert!(!graph.is_consumed("unused"));
        assert!(graph.derives_from_secret(&pw.output("secret")));
        assert!(!graph.derives_from_secret(&pw.output("name")));
    }

    #[test]
    fn test_evaluate_exports() {
        let mut graph = StackGraph::new();
        let rg = graph.declare(&node("rg", &[])).unwrap();
        graph.export("rgName", rg.output("name"), false).unwrap();

        let mut resolved = ResolvedOutputs::new();
        resolved.insert("rg", json!({"name": "k8s1234"}));

        let values = graph.evaluate_exports(&resolved).unwrap();
        assert_eq!(values["rgName"], json!("k8s1234"));
    }
}
