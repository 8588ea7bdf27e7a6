use petgraph::stable_graph::StableDiGraph;

use crate::error::{EngineError, EngineResult};

use super::types::{ExecGraph, ExecNode, NodeIndexMap, ResourceChange};

/// Build the operation DAG from a set of planned resource changes.
///
/// One node per resource, an edge from each `depends_on` source, and an edge
/// from the root sentinel to every node with no other incoming edge. A
/// `depends_on` entry naming an unknown resource id is a configuration error.
pub fn build_graph(changes: Vec<ResourceChange>) -> EngineResult<ExecGraph> {
    let mut graph = StableDiGraph::new();
    let root_idx = graph.add_node(ExecNode::Root);
    let mut node_index_map = NodeIndexMap::new();

    let mut dependencies = Vec::with_capacity(changes.len());
    for change in changes {
        let id = change.resource.id.clone();
        if node_index_map.contains_key(&id) {
            return Err(EngineError::DuplicateResourceId(id));
        }
        dependencies.push((id.clone(), change.resource.depends_on.clone()));
        let idx = graph.add_node(ExecNode::Resource {
            resource: change.resource,
            action: change.action,
        });
        node_index_map.insert(id, idx);
    }

    for (id, depends_on) in dependencies {
        let idx = node_index_map[&id];
        for dependency in depends_on {
            let dep_idx =
                node_index_map
                    .get(&dependency)
                    .ok_or_else(|| EngineError::UnknownDependency {
                        resource: id.clone(),
                        dependency: dependency.clone(),
                    })?;
            // Repeated depends_on entries must not create parallel edges, or
            // the walker would enqueue the dependent once per edge.
            if !graph.contains_edge(*dep_idx, idx) {
                graph.add_edge(*dep_idx, idx, ());
            }
        }
    }

    // Attach the root sentinel to every entry node.
    for idx in node_index_map.values() {
        if graph
            .neighbors_directed(*idx, petgraph::Direction::Incoming)
            .count()
            == 0
        {
            graph.add_edge(root_idx, *idx, ());
        }
    }

    Ok(ExecGraph {
        graph,
        root_idx,
        node_index_map,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::resource::{ActionType, Resource};

    fn change(id: &str, depends_on: &[&str]) -> ResourceChange {
        let mut resource = Resource::new(id, "kubernetes");
        resource.depends_on = depends_on.iter().map(|s| s.to_string()).collect();
        ResourceChange::new(resource, ActionType::Create)
    }

    #[test]
    fn test_build_diamond_graph() {
        let graph = build_graph(vec![
            change("jack", &[]),
            change("pony", &["jack"]),
            change("eric", &["jack"]),
            change("lily", &["pony", "eric"]),
        ])
        .unwrap();

        assert_eq!(graph.resource_count(), 4);
        // jack is the only entry node, so root has exactly one outgoing edge.
        let root_out = graph
            .graph
            .neighbors_directed(graph.root_idx, petgraph::Direction::Outgoing)
            .count();
        assert_eq!(root_out, 1);

        let lily_in = graph
            .graph
            .neighbors_directed(graph.node_index_map["lily"], petgraph::Direction::Incoming)
            .count();
        assert_eq!(lily_in, 2);
    }

    #[test]
    fn test_independent_resources_all_hang_off_root() {
        let graph = build_graph(vec![change("a", &[]), change("b", &[])]).unwrap();
        let root_out = graph
            .graph
            .neighbors_directed(graph.root_idx, petgraph::Direction::Outgoing)
            .count();
        assert_eq!(root_out, 2);
    }

    #[test]
    fn test_repeated_depends_on_entries_create_single_edge() {
        let graph = build_graph(vec![change("jack", &[]), change("pony", &["jack", "jack"])])
            .unwrap();
        let pony_in = graph
            .graph
            .neighbors_directed(graph.node_index_map["pony"], petgraph::Direction::Incoming)
            .count();
        assert_eq!(pony_in, 1);
    }

    #[test]
    fn test_unknown_dependency_is_configuration_error() {
        let err = build_graph(vec![change("eric", &["ghost"])]).unwrap_err();
        assert_eq!(
            err,
            EngineError::UnknownDependency {
                resource: "eric".into(),
                dependency: "ghost".into()
            }
        );
    }

    #[test]
    fn test_duplicate_resource_id_is_configuration_error() {
        let err = build_graph(vec![change("jack", &[]), change("jack", &[])]).unwrap_err();
        assert_eq!(err, EngineError::DuplicateResourceId("jack".into()));
    }

    #[test]
    fn test_get_node_returns_resource_node() {
        let graph = build_graph(vec![change("jack", &[])]).unwrap();
        let node = graph.get_node("jack").unwrap();
        assert_eq!(node.id(), "jack");
    }
}
