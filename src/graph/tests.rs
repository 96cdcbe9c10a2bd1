//! Graph-level scenarios over all stores together

use super::*;
use crate::error::{GraphError, StoreKind};
use crate::storage::Value;
use tempfile::TempDir;

fn new_graph(dir: &TempDir) -> Graph {
    Graph::create(dir.path().join("g"), "g", GraphOptions::default()).unwrap()
}

fn reopen(dir: &TempDir, graph: Graph) -> Graph {
    graph.close().unwrap();
    Graph::open(dir.path().join("g"), "g").unwrap()
}

// ============================================================================
// Labels
// ============================================================================

mod label_tests {
    use super::*;

    #[test]
    fn test_refcount_scenario() {
        let dir = TempDir::new().unwrap();
        let mut g = new_graph(&dir);

        // id 1 belongs to the root class name
        assert_eq!(g.find_label(ROOT_CLASS).unwrap().unwrap().id, 1);

        assert_eq!(g.add_label("user").unwrap(), 2);
        assert_eq!(g.add_label("user").unwrap(), 2);
        assert_eq!(g.label(2).unwrap().refs, 2);

        assert_eq!(g.remove_label("user").unwrap(), Some(1));
        assert!(g.find_label("user").unwrap().is_some());

        assert_eq!(g.remove_label("user").unwrap(), Some(0));
        assert!(g.find_label("user").unwrap().is_none());

        assert_eq!(g.add_label("group").unwrap(), 2);
    }

    #[test]
    fn test_edge_labels_are_shared_and_released() {
        let dir = TempDir::new().unwrap();
        let mut g = new_graph(&dir);
        let a = g.add_vertex(ROOT_CLASS).unwrap();
        let b = g.add_vertex(ROOT_CLASS).unwrap();

        let e1 = g.add_edge(a.id, b.id, "knows").unwrap();
        let e2 = g.add_edge(b.id, a.id, "knows").unwrap();
        assert_eq!(e1.label, e2.label);
        assert_eq!(g.label(e1.label).unwrap().refs, 2);

        g.remove_edge(e1.id).unwrap();
        assert_eq!(g.label(e2.label).unwrap().refs, 1);
        g.remove_edge(e2.id).unwrap();
        assert!(g.find_label("knows").unwrap().is_none());
    }

    #[test]
    fn test_rename_follows_every_user() {
        let dir = TempDir::new().unwrap();
        let mut g = new_graph(&dir);
        let a = g.add_vertex(ROOT_CLASS).unwrap();
        let b = g.add_vertex(ROOT_CLASS).unwrap();
        let e = g.add_edge(a.id, b.id, "knows").unwrap();
        g.out_edges(a.id).unwrap();

        let id = g.rename_label("knows", "follows-with-a-much-longer-name").unwrap();
        assert_eq!(id, e.label);
        assert_eq!(g.edge_label(&e).unwrap(), "follows-with-a-much-longer-name");
        assert!(g.out_edges(a.id).unwrap().contains_key("follows-with-a-much-longer-name"));

        let mut g = reopen(&dir, g);
        let e = g.edge(e.id).unwrap().unwrap();
        assert_eq!(g.edge_label(&e).unwrap(), "follows-with-a-much-longer-name");

        g.add_label("likes").unwrap();
        let err = g.rename_label("likes", "follows-with-a-much-longer-name").unwrap_err();
        assert!(matches!(err, GraphError::LabelExists(_)));
    }

    #[test]
    fn test_in_order_listing() {
        let dir = TempDir::new().unwrap();
        let mut g = new_graph(&dir);
        for value in ["zeta", "alpha", "mu"] {
            g.add_label(value).unwrap();
        }
        let values: Vec<String> = g.labels().unwrap().into_iter().map(|(_, v, _)| v).collect();
        assert_eq!(values, vec!["Vertex", "alpha", "mu", "zeta"]);
    }
}

// ============================================================================
// Edges
// ============================================================================

mod edge_tests {
    use super::*;

    #[test]
    fn test_out_list_unlink_middle_and_head() {
        let dir = TempDir::new().unwrap();
        let mut g = new_graph(&dir);
        let v = g.add_vertex(ROOT_CLASS).unwrap();
        let targets: Vec<u32> = (0..3).map(|_| g.add_vertex(ROOT_CLASS).unwrap().id).collect();

        // pushed at the head: the list reads e3 -> e2 -> e1
        let e1 = g.add_edge(v.id, targets[0], "link").unwrap().id;
        let e2 = g.add_edge(v.id, targets[1], "link").unwrap().id;
        let e3 = g.add_edge(v.id, targets[2], "link").unwrap().id;
        assert_eq!(g.edge_chain(v.id, Direction::Out).unwrap(), vec![e3, e2, e1]);

        g.remove_edge(e2).unwrap();
        assert_eq!(g.edge_chain(v.id, Direction::Out).unwrap(), vec![e3, e1]);
        assert!(g.edge_chain(targets[1], Direction::In).unwrap().is_empty());

        g.remove_edge(e3).unwrap();
        assert_eq!(g.vertex(v.id).unwrap().unwrap().first_out, e1);
        assert_eq!(g.edge_chain(v.id, Direction::Out).unwrap(), vec![e1]);
        assert_eq!(g.edge(e3).unwrap(), None);
    }

    #[test]
    fn test_in_list_unlink() {
        let dir = TempDir::new().unwrap();
        let mut g = new_graph(&dir);
        let hub = g.add_vertex(ROOT_CLASS).unwrap().id;
        let sources: Vec<u32> = (0..3).map(|_| g.add_vertex(ROOT_CLASS).unwrap().id).collect();
        let edges: Vec<u32> = sources.iter().map(|&s| g.add_edge(s, hub, "points").unwrap().id).collect();

        g.remove_edge(edges[1]).unwrap();
        assert_eq!(g.edge_chain(hub, Direction::In).unwrap(), vec![edges[2], edges[0]]);
        assert_eq!(g.in_edges(hub).unwrap()["points"].len(), 2);
    }

    #[test]
    fn test_self_loop_sits_in_both_lists() {
        let dir = TempDir::new().unwrap();
        let mut g = new_graph(&dir);
        let v = g.add_vertex(ROOT_CLASS).unwrap().id;
        let other = g.add_vertex(ROOT_CLASS).unwrap().id;

        let out = g.add_edge(v, other, "a").unwrap().id;
        let looped = g.add_edge(v, v, "self").unwrap().id;
        let inbound = g.add_edge(other, v, "b").unwrap().id;

        assert_eq!(g.edge_chain(v, Direction::Out).unwrap(), vec![looped, out]);
        assert_eq!(g.edge_chain(v, Direction::In).unwrap(), vec![inbound, looped]);

        g.remove_edge(looped).unwrap();
        assert_eq!(g.edge_chain(v, Direction::Out).unwrap(), vec![out]);
        assert_eq!(g.edge_chain(v, Direction::In).unwrap(), vec![inbound]);
        assert!(g.find_label("self").unwrap().is_none());
    }

    #[test]
    fn test_edge_maps_group_by_label() {
        let dir = TempDir::new().unwrap();
        let mut g = new_graph(&dir);
        let v = g.add_vertex(ROOT_CLASS).unwrap().id;
        let w = g.add_vertex(ROOT_CLASS).unwrap().id;

        let k1 = g.add_edge(v, w, "knows").unwrap().id;
        g.out_edges(v).unwrap();
        let k2 = g.add_edge(v, w, "knows").unwrap().id;
        let l = g.add_edge(v, w, "likes").unwrap().id;

        let out = g.out_edges(v).unwrap().clone();
        assert_eq!(out["knows"].iter().copied().collect::<Vec<_>>(), vec![k1, k2]);
        assert_eq!(out["likes"].iter().copied().collect::<Vec<_>>(), vec![l]);

        g.remove_edge(l).unwrap();
        assert!(!g.out_edges(v).unwrap().contains_key("likes"));
    }

    #[test]
    fn test_missing_endpoints() {
        let dir = TempDir::new().unwrap();
        let mut g = new_graph(&dir);
        let v = g.add_vertex(ROOT_CLASS).unwrap().id;
        assert!(matches!(g.add_edge(v, 99, "x"), Err(GraphError::VertexNotFound(99))));
        assert!(matches!(g.remove_edge(7), Err(GraphError::EdgeNotFound(7))));
        // the failed add took no label reference
        assert!(g.find_label("x").unwrap().is_none());
    }
}

// ============================================================================
// Vertices
// ============================================================================

mod vertex_tests {
    use super::*;

    #[test]
    fn test_remove_vertex_cascades() {
        let dir = TempDir::new().unwrap();
        let mut g = new_graph(&dir);
        let v = g.add_vertex(ROOT_CLASS).unwrap().id;
        let w = g.add_vertex(ROOT_CLASS).unwrap().id;

        let e_out = g.add_edge(v, w, "knows").unwrap().id;
        let e_in = g.add_edge(w, v, "knows").unwrap().id;
        let e_loop = g.add_edge(v, v, "self").unwrap().id;
        g.set_attribute(Owner::Vertex(v), "name", Value::Text("alice".into())).unwrap();
        g.set_attribute(Owner::Edge(e_out), "since", Value::Integer(2020)).unwrap();

        g.remove_vertex(v).unwrap();

        assert_eq!(g.vertex(v).unwrap(), None);
        for e in [e_out, e_in, e_loop] {
            assert_eq!(g.edge(e).unwrap(), None);
        }
        assert!(g.edge_chain(w, Direction::Out).unwrap().is_empty());
        assert!(g.edge_chain(w, Direction::In).unwrap().is_empty());
        for value in ["knows", "self", "name", "since"] {
            assert!(g.find_label(value).unwrap().is_none(), "{value} should be released");
        }
        assert_eq!(g.stats().attribute_free_ids, 2);
        assert_eq!(g.class(1).unwrap().count, 1);
        assert!(!g.has_vertex(ROOT_CLASS, v).unwrap());
    }

    #[test]
    fn test_vertex_ids_are_recycled() {
        let dir = TempDir::new().unwrap();
        let mut g = new_graph(&dir);
        let a = g.add_vertex(ROOT_CLASS).unwrap().id;
        g.add_vertex(ROOT_CLASS).unwrap();
        g.remove_vertex(a).unwrap();
        assert_eq!(g.add_vertex(ROOT_CLASS).unwrap().id, a);
        assert!(matches!(g.remove_vertex(50), Err(GraphError::VertexNotFound(50))));
    }
}

// ============================================================================
// Attributes
// ============================================================================

mod attribute_tests {
    use super::*;
    use proptest::prelude::*;
    use std::collections::BTreeSet;

    #[test]
    fn test_set_overwrites_in_place() {
        let dir = TempDir::new().unwrap();
        let mut g = new_graph(&dir);
        let owner = Owner::Vertex(g.add_vertex(ROOT_CLASS).unwrap().id);

        let first = g.set_attribute(owner, "age", Value::Integer(30)).unwrap();
        let second = g.set_attribute(owner, "age", Value::Real(30.5)).unwrap();
        assert_eq!(first.id, second.id);
        assert_eq!(g.attribute(owner, "age").unwrap(), Some(Value::Real(30.5)));
        assert_eq!(g.attribute_chain(owner).unwrap(), vec![first.id]);
        assert_eq!(g.find_label("age").unwrap().unwrap().refs, 1);
    }

    #[test]
    fn test_text_values_release_old_rows() {
        let dir = TempDir::new().unwrap();
        let mut g = new_graph(&dir);
        let owner = Owner::Vertex(g.add_vertex(ROOT_CLASS).unwrap().id);

        g.set_attribute(owner, "name", Value::Text("alice".into())).unwrap();
        let free_before = g.stats().text_free_runs;
        g.set_attribute(owner, "name", Value::Text("bob".into())).unwrap();
        assert_eq!(g.stats().text_free_runs, free_before + 1);

        let mut g = reopen(&dir, g);
        assert_eq!(g.attribute(owner, "name").unwrap(), Some(Value::Text("bob".into())));
    }

    #[test]
    fn test_remove_head_and_middle() {
        let dir = TempDir::new().unwrap();
        let mut g = new_graph(&dir);
        let owner = Owner::Vertex(g.add_vertex(ROOT_CLASS).unwrap().id);

        let a = g.set_attribute(owner, "a", Value::Integer(1)).unwrap().id;
        let b = g.set_attribute(owner, "b", Value::Boolean(true)).unwrap().id;
        let c = g.set_attribute(owner, "c", Value::List(4)).unwrap().id;
        assert_eq!(g.attribute_chain(owner).unwrap(), vec![c, b, a]);

        assert!(g.remove_attribute(owner, b).unwrap());
        assert_eq!(g.attribute_chain(owner).unwrap(), vec![c, a]);

        assert!(g.remove_attribute_by_key(owner, "c").unwrap());
        assert_eq!(g.vertex(1).unwrap().unwrap().first_attribute, a);
        assert!(!g.remove_attribute_by_key(owner, "c").unwrap());
        assert!(!g.remove_attribute(owner, 999).unwrap());
    }

    #[test]
    fn test_edge_attributes() {
        let dir = TempDir::new().unwrap();
        let mut g = new_graph(&dir);
        let v = g.add_vertex(ROOT_CLASS).unwrap().id;
        let e = g.add_edge(v, v, "self").unwrap().id;
        let owner = Owner::Edge(e);

        g.set_attribute(owner, "weight", Value::Real(0.75)).unwrap();
        let mut g = reopen(&dir, g);
        assert_eq!(g.attribute(owner, "weight").unwrap(), Some(Value::Real(0.75)));
        assert_eq!(g.attributes(owner).unwrap().len(), 1);
        assert!(matches!(
            g.set_attribute(Owner::Edge(42), "weight", Value::Integer(1)),
            Err(GraphError::EdgeNotFound(42))
        ));
    }

    #[derive(Debug, Clone)]
    enum Op {
        Set(u8, i64),
        Remove(u8),
    }

    fn op() -> impl Strategy<Value = Op> {
        prop_oneof![
            3 => (0u8..12, any::<i64>()).prop_map(|(k, v)| Op::Set(k, v)),
            2 => (0u8..12).prop_map(Op::Remove),
        ]
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(24))]

        #[test]
        fn prop_chain_matches_key_map(ops in prop::collection::vec(op(), 1..60)) {
            let dir = TempDir::new().unwrap();
            let mut g = new_graph(&dir);
            let owner = Owner::Vertex(g.add_vertex(ROOT_CLASS).unwrap().id);

            for op in ops {
                match op {
                    Op::Set(k, v) => {
                        g.set_attribute(owner, &format!("key-{k}"), Value::Integer(v)).unwrap();
                    }
                    Op::Remove(k) => {
                        g.remove_attribute_by_key(owner, &format!("key-{k}")).unwrap();
                    }
                }

                let chain = g.attribute_chain(owner).unwrap();
                let unique: BTreeSet<u32> = chain.iter().copied().collect();
                prop_assert_eq!(unique.len(), chain.len());

                let mapped: BTreeSet<u32> = g.attributes(owner).unwrap().values().copied().collect();
                prop_assert_eq!(mapped, unique);
            }
        }
    }
}

// ============================================================================
// Classes
// ============================================================================

mod class_tests {
    use super::*;

    #[test]
    fn test_root_class_installed() {
        let dir = TempDir::new().unwrap();
        let mut g = new_graph(&dir);
        let root = g.find_class(ROOT_CLASS).unwrap().unwrap();
        assert_eq!(root.id, 1);
        assert_eq!(root.label, 1);
        assert!(dir.path().join("g").join("idx").join("Vertex.idx.gl").exists());
    }

    #[test]
    fn test_membership_is_recursive() {
        let dir = TempDir::new().unwrap();
        let mut g = new_graph(&dir);
        g.add_class("user", ROOT_CLASS).unwrap();
        g.add_class("admin", "user").unwrap();
        let v = g.add_vertex("admin").unwrap().id;

        assert!(g.has_vertex("admin", v).unwrap());
        assert!(g.has_vertex("user", v).unwrap());
        assert!(g.has_vertex(ROOT_CLASS, v).unwrap());
        assert_eq!(g.class_vertices("admin").unwrap(), vec![v]);
        assert!(g.class_vertices("user").unwrap().is_empty());

        let mut g = reopen(&dir, g);
        assert!(g.has_vertex(ROOT_CLASS, v).unwrap());
        assert_eq!(g.find_class("admin").unwrap().unwrap().count, 1);
    }

    #[test]
    fn test_remove_class_rules() {
        let dir = TempDir::new().unwrap();
        let mut g = new_graph(&dir);
        g.add_class("user", ROOT_CLASS).unwrap();
        let admin = g.add_class("admin", "user").unwrap();
        let v = g.add_vertex("admin").unwrap().id;

        assert!(matches!(g.remove_class("user"), Err(GraphError::ClassInUse(_))));
        assert!(matches!(g.remove_class("admin"), Err(GraphError::ClassInUse(_))));
        assert!(matches!(g.remove_class(ROOT_CLASS), Err(GraphError::ClassInUse(_))));

        g.remove_vertex(v).unwrap();
        g.remove_class("admin").unwrap();
        assert!(g.find_class("admin").unwrap().is_none());
        assert!(g.sub_classes("user").unwrap().is_empty());

        let guest = g.add_class("guest", ROOT_CLASS).unwrap();
        assert_eq!(guest.id, admin.id);
        let subs: Vec<u8> = g.sub_classes(ROOT_CLASS).unwrap().iter().map(|c| c.id).collect();
        assert_eq!(subs, vec![guest.id, 2]);
    }

    #[test]
    fn test_duplicate_and_unknown_classes() {
        let dir = TempDir::new().unwrap();
        let mut g = new_graph(&dir);
        g.add_class("user", ROOT_CLASS).unwrap();
        assert!(matches!(g.add_class("user", ROOT_CLASS), Err(GraphError::ClassExists(_))));
        assert!(matches!(g.add_class("x", "nope"), Err(GraphError::ClassNotFound(_))));
        assert!(matches!(g.add_vertex("nope"), Err(GraphError::ClassNotFound(_))));
    }

    #[test]
    fn test_renamed_class_keeps_members() {
        let dir = TempDir::new().unwrap();
        let mut g = new_graph(&dir);
        g.add_class("user", ROOT_CLASS).unwrap();
        let v = g.add_vertex("user").unwrap().id;

        g.rename_label("user", "member").unwrap();
        assert_eq!(g.class_vertices("member").unwrap(), vec![v]);
        assert!(dir.path().join("g").join("idx").join("member.idx.gl").exists());
        assert!(!dir.path().join("g").join("idx").join("user.idx.gl").exists());
    }

    #[test]
    fn test_class_names_stay_inside_graph() {
        let dir = TempDir::new().unwrap();
        let mut g = new_graph(&dir);

        for name in ["../../escaped", "a/b", "a\\b", "..", ""] {
            assert!(matches!(g.add_class(name, ROOT_CLASS), Err(GraphError::InvalidName(_))));
            assert!(g.find_label(name).unwrap().is_none());
        }
        assert!(g.sub_classes(ROOT_CLASS).unwrap().is_empty());

        g.add_class("user", ROOT_CLASS).unwrap();
        assert!(matches!(g.rename_label("user", "../user"), Err(GraphError::InvalidName(_))));
        assert!(g.find_class("user").unwrap().is_some());

        // plain labels are not file names
        g.add_label("x").unwrap();
        g.rename_label("x", "a/b").unwrap();

        g.write().unwrap();
        assert!(!dir.path().join("escaped.idx.gl").exists());
    }

    #[test]
    fn test_failed_index_create_leaves_no_class() {
        let dir = TempDir::new().unwrap();
        let mut g = new_graph(&dir);
        let idx = dir.path().join("g").join("idx");
        std::fs::remove_dir_all(&idx).unwrap();

        let err = g.add_class("user", ROOT_CLASS).unwrap_err();
        assert!(matches!(err, GraphError::Io { store: StoreKind::ClassIndex, .. }));
        assert!(g.find_class("user").unwrap().is_none());
        assert!(g.find_label("user").unwrap().is_none());
        assert!(g.sub_classes(ROOT_CLASS).unwrap().is_empty());

        std::fs::create_dir(&idx).unwrap();
        let user = g.add_class("user", ROOT_CLASS).unwrap();
        assert_eq!(user.id, 2);
        assert_eq!(g.sub_classes(ROOT_CLASS).unwrap().len(), 1);
    }

    #[test]
    fn test_failed_index_rename_still_resets_caches() {
        let dir = TempDir::new().unwrap();
        let mut g = new_graph(&dir);
        g.add_class("user", ROOT_CLASS).unwrap();
        let v = g.add_vertex("user").unwrap().id;
        let owner = Owner::Vertex(v);
        g.set_attribute(owner, "user", Value::Integer(1)).unwrap();

        // a non-empty directory where the renamed index should go
        let blocker = dir.path().join("g").join("idx").join("member.idx.gl");
        std::fs::create_dir(&blocker).unwrap();
        std::fs::write(blocker.join("keep"), b"x").unwrap();

        let err = g.rename_label("user", "member").unwrap_err();
        assert!(matches!(err, GraphError::Io { store: StoreKind::ClassIndex, op: "rename", .. }));

        g.set_attribute(owner, "member", Value::Integer(2)).unwrap();
        assert_eq!(g.attribute_chain(owner).unwrap().len(), 1);
        assert_eq!(g.attribute(owner, "member").unwrap(), Some(Value::Integer(2)));
        assert_eq!(g.attribute(owner, "user").unwrap(), None);
    }
}

// ============================================================================
// Persistence
// ============================================================================

mod persistence_tests {
    use super::*;

    #[test]
    fn test_full_reload() {
        let dir = TempDir::new().unwrap();
        let mut g = new_graph(&dir);
        g.add_class("user", ROOT_CLASS).unwrap();
        let a = g.add_vertex("user").unwrap().id;
        let b = g.add_vertex("user").unwrap().id;
        let e = g.add_edge(a, b, "knows").unwrap().id;
        g.set_attribute(Owner::Vertex(a), "name", Value::Text("alice".into())).unwrap();
        g.set_attribute(Owner::Vertex(a), "admin", Value::Boolean(false)).unwrap();
        assert!(g.has_unflushed());

        let mut g = reopen(&dir, g);
        assert!(!g.has_unflushed());
        assert_eq!(g.edge_chain(a, Direction::Out).unwrap(), vec![e]);
        assert_eq!(g.edge_chain(b, Direction::In).unwrap(), vec![e]);
        assert_eq!(g.attribute(Owner::Vertex(a), "name").unwrap(), Some(Value::Text("alice".into())));
        assert_eq!(g.attribute(Owner::Vertex(a), "admin").unwrap(), Some(Value::Boolean(false)));
        assert_eq!(g.vertex(a).unwrap().unwrap().class, g.find_class("user").unwrap().unwrap().id);

        // allocators continue where they left off
        assert_eq!(g.add_vertex("user").unwrap().id, b + 1);
    }

    #[test]
    fn test_options_survive_reopen() {
        let dir = TempDir::new().unwrap();
        let options = GraphOptions::default().row_size(32).extension("db");
        let mut g = Graph::create(dir.path().join("g"), "g", options).unwrap();
        let v = g.add_vertex(ROOT_CLASS).unwrap().id;
        g.set_attribute(Owner::Vertex(v), "bio", Value::Text("x".repeat(100))).unwrap();
        assert!(dir.path().join("g").join("vertex.db").exists());

        let mut g = reopen(&dir, g);
        assert_eq!(g.options().row_size, 32);
        assert_eq!(g.metadata().name, "g");
        assert_eq!(g.attribute(Owner::Vertex(v), "bio").unwrap(), Some(Value::Text("x".repeat(100))));
    }

    #[test]
    fn test_unusable_row_size_rejected() {
        let dir = TempDir::new().unwrap();
        let options = GraphOptions { row_size: 0, ..GraphOptions::default() };
        let err = Graph::create(dir.path().join("g"), "g", options).unwrap_err();
        assert!(matches!(err, GraphError::InvalidFormat(_)));
        assert!(!dir.path().join("g").exists());

        let g = new_graph(&dir);
        g.close().unwrap();
        let meta = dir.path().join("g").join("metadata.json");
        let text = std::fs::read_to_string(&meta).unwrap().replace("\"row_size\": 16", "\"row_size\": 0");
        std::fs::write(&meta, text).unwrap();
        assert!(matches!(Graph::open(dir.path().join("g"), "g"), Err(GraphError::InvalidFormat(_))));
    }

    #[test]
    fn test_create_existing_and_open_missing() {
        let dir = TempDir::new().unwrap();
        let g = new_graph(&dir);
        g.close().unwrap();
        assert!(matches!(
            Graph::create(dir.path().join("g"), "g", GraphOptions::default()),
            Err(GraphError::GraphExists(_))
        ));
        assert!(matches!(Graph::open(dir.path().join("nope"), "nope"), Err(GraphError::GraphNotFound(_))));
    }

    #[test]
    fn test_destroy_removes_directory() {
        let dir = TempDir::new().unwrap();
        let mut g = new_graph(&dir);
        g.add_vertex(ROOT_CLASS).unwrap();
        g.destroy().unwrap();
        assert!(!dir.path().join("g").exists());
    }
}
