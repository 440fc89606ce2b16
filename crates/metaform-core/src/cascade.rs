//! Cascading-delete planning over the schema catalog.
//!
//! Deleting a record must remove every record that transitively references
//! it through a foreign key, children before parents. This module is the
//! pure planning half: it derives foreign-key edges from relationship
//! declarations, topologically orders the discovered schemas, and assembles
//! a [`DeletePlan`]. Dependent discovery and execution live with the
//! services that own a backend connection.

use crate::catalog::{Cardinality, SchemaDef};
use crate::error::Error;
use std::collections::{BTreeMap, BTreeSet};

/// A foreign-key edge: `child_schema.fk_field` references `parent_schema`.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
pub struct FkEdge {
    /// Schema being referenced.
    pub parent_schema: String,
    /// Schema holding the foreign key.
    pub child_schema: String,
    /// Column on the child that stores the parent's id.
    pub fk_field: String,
}

/// One schema's deletions within a plan.
#[derive(Debug, Clone, PartialEq)]
pub struct DeleteStep {
    /// Schema whose records are deleted in this step.
    pub schema_name: String,
    /// Backing table of that schema.
    pub table_name: String,
    /// Ids to delete.
    pub record_ids: Vec<String>,
    /// Schemas whose steps must run before this one.
    pub depends_on: Vec<String>,
}

/// Ordered deletion steps, children before parents.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DeletePlan {
    /// Steps in execution order.
    pub steps: Vec<DeleteStep>,
}

impl DeletePlan {
    /// Total number of records the plan would delete.
    pub fn total_records(&self) -> usize {
        self.steps.iter().map(|step| step.record_ids.len()).sum()
    }
}

/// Derive every foreign-key edge declared in the catalog.
///
/// Both declaration styles contribute: a parent's one-to-many relationship
/// (resolving the child-side key through
/// [`RelationshipDef::resolve_fk_field`](crate::catalog::RelationshipDef::resolve_fk_field))
/// and a child's many-to-one relationship (using its source field). The two
/// usually describe the same column, so edges are deduplicated. Edges to
/// schemas missing from the catalog are dropped; they cannot be discovered
/// or deleted.
pub fn fk_edges(catalog: &[SchemaDef]) -> Vec<FkEdge> {
    let by_name: BTreeMap<&str, &SchemaDef> =
        catalog.iter().map(|s| (s.name.as_str(), s)).collect();

    let mut edges = BTreeSet::new();
    for schema in catalog {
        for rel in &schema.relationships {
            match rel.cardinality {
                Cardinality::OneToMany => {
                    if let Some(child) = by_name.get(rel.target_schema.as_str()) {
                        edges.insert(FkEdge {
                            parent_schema: schema.name.clone(),
                            child_schema: child.name.clone(),
                            fk_field: rel.resolve_fk_field(schema, child),
                        });
                    }
                }
                Cardinality::ManyToOne => {
                    if by_name.contains_key(rel.target_schema.as_str()) {
                        if let Some(source) = &rel.source_field {
                            edges.insert(FkEdge {
                                parent_schema: rel.target_schema.clone(),
                                child_schema: schema.name.clone(),
                                fk_field: source.clone(),
                            });
                        }
                    }
                }
                _ => {}
            }
        }
    }
    edges.into_iter().collect()
}

/// Build the dependency graph: each parent schema maps to the set of child
/// schemas that must be deleted before it.
pub fn dependency_graph(catalog: &[SchemaDef]) -> BTreeMap<String, BTreeSet<String>> {
    let mut graph: BTreeMap<String, BTreeSet<String>> = BTreeMap::new();
    for edge in fk_edges(catalog) {
        graph
            .entry(edge.parent_schema)
            .or_default()
            .insert(edge.child_schema);
    }
    graph
}

/// Topologically order the discovered schemas, children before parents.
///
/// Kahn's algorithm restricted to the discovered set; ready schemas are
/// emitted in name order so the result is deterministic. Self-references are
/// ignored (a schema's own records delete together in one step). A cycle
/// among distinct schemas cannot be ordered safely and is an error.
pub fn order_deletions(
    discovered: &BTreeSet<String>,
    graph: &BTreeMap<String, BTreeSet<String>>,
) -> Result<Vec<String>, Error> {
    let mut pending: BTreeMap<&str, BTreeSet<&str>> = discovered
        .iter()
        .map(|schema| {
            let deps: BTreeSet<&str> = graph
                .get(schema)
                .map(|children| {
                    children
                        .iter()
                        .filter(|child| *child != schema && discovered.contains(*child))
                        .map(String::as_str)
                        .collect()
                })
                .unwrap_or_default();
            (schema.as_str(), deps)
        })
        .collect();

    let mut order = Vec::with_capacity(discovered.len());
    while !pending.is_empty() {
        let ready: Vec<&str> = pending
            .iter()
            .filter(|(_, deps)| deps.is_empty())
            .map(|(schema, _)| *schema)
            .collect();
        if ready.is_empty() {
            let cycle = pending.keys().map(|s| s.to_string()).collect();
            return Err(Error::CyclicDependency { cycle });
        }
        for schema in ready {
            pending.remove(schema);
            for deps in pending.values_mut() {
                deps.remove(schema);
            }
            order.push(schema.to_string());
        }
    }
    Ok(order)
}

/// Assemble a plan for the discovered records, ordered for safe execution.
pub fn build_plan(
    catalog: &[SchemaDef],
    discovered: &BTreeMap<String, Vec<String>>,
    graph: &BTreeMap<String, BTreeSet<String>>,
) -> Result<DeletePlan, Error> {
    let names: BTreeSet<String> = discovered.keys().cloned().collect();
    let by_name: BTreeMap<&str, &SchemaDef> =
        catalog.iter().map(|s| (s.name.as_str(), s)).collect();

    let steps = order_deletions(&names, graph)?
        .into_iter()
        .map(|name| {
            let depends_on = graph
                .get(&name)
                .map(|children| {
                    children
                        .iter()
                        .filter(|child| **child != name && names.contains(*child))
                        .cloned()
                        .collect()
                })
                .unwrap_or_default();
            DeleteStep {
                table_name: by_name
                    .get(name.as_str())
                    .map_or_else(|| name.clone(), |s| s.table_name()),
                record_ids: discovered[&name].clone(),
                depends_on,
                schema_name: name,
            }
        })
        .collect();

    Ok(DeletePlan { steps })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::{FieldDef, FieldKind, RelationshipDef};

    fn catalog() -> Vec<SchemaDef> {
        // Invoice -< LineItem -< Adjustment, declared from both sides.
        vec![
            SchemaDef::page("Invoice")
                .with_field(FieldDef::primary_key("id"))
                .with_relationship(RelationshipDef::one_to_many(
                    "line_items",
                    "LineItem",
                    "invoice_id",
                )),
            SchemaDef::component("LineItem")
                .with_field(FieldDef::primary_key("id"))
                .with_field(FieldDef::new("invoice_id", FieldKind::Uuid))
                .with_relationship(RelationshipDef::many_to_one(
                    "invoice",
                    "invoice_id",
                    "Invoice",
                ))
                .with_relationship(RelationshipDef::one_to_many(
                    "adjustments",
                    "Adjustment",
                    "line_item_id",
                )),
            SchemaDef::component("Adjustment")
                .with_field(FieldDef::primary_key("id"))
                .with_field(FieldDef::new("line_item_id", FieldKind::Uuid)),
        ]
    }

    #[test]
    fn test_fk_edges_deduplicate_both_declaration_styles() {
        let edges = fk_edges(&catalog());

        assert_eq!(
            edges,
            vec![
                FkEdge {
                    parent_schema: "Invoice".to_string(),
                    child_schema: "LineItem".to_string(),
                    fk_field: "invoice_id".to_string(),
                },
                FkEdge {
                    parent_schema: "LineItem".to_string(),
                    child_schema: "Adjustment".to_string(),
                    fk_field: "line_item_id".to_string(),
                },
            ]
        );
    }

    #[test]
    fn test_fk_edges_skip_unknown_targets() {
        let orphan = vec![SchemaDef::page("Invoice")
            .with_field(FieldDef::primary_key("id"))
            .with_relationship(RelationshipDef::one_to_many(
                "line_items",
                "Missing",
                "invoice_id",
            ))];

        assert!(fk_edges(&orphan).is_empty());
    }

    #[test]
    fn test_dependency_graph() {
        let graph = dependency_graph(&catalog());

        assert_eq!(
            graph["Invoice"],
            BTreeSet::from(["LineItem".to_string()])
        );
        assert_eq!(
            graph["LineItem"],
            BTreeSet::from(["Adjustment".to_string()])
        );
        assert!(!graph.contains_key("Adjustment"));
    }

    #[test]
    fn test_order_is_children_first() {
        let graph = dependency_graph(&catalog());
        let discovered = BTreeSet::from([
            "Invoice".to_string(),
            "LineItem".to_string(),
            "Adjustment".to_string(),
        ]);

        assert_eq!(
            order_deletions(&discovered, &graph).unwrap(),
            vec!["Adjustment", "LineItem", "Invoice"]
        );
    }

    #[test]
    fn test_order_restricted_to_discovered_set() {
        let graph = dependency_graph(&catalog());
        let discovered = BTreeSet::from(["Invoice".to_string(), "LineItem".to_string()]);

        assert_eq!(
            order_deletions(&discovered, &graph).unwrap(),
            vec!["LineItem", "Invoice"]
        );
    }

    #[test]
    fn test_order_diamond_is_deterministic() {
        let mut graph: BTreeMap<String, BTreeSet<String>> = BTreeMap::new();
        graph.insert(
            "A".to_string(),
            BTreeSet::from(["B".to_string(), "C".to_string()]),
        );
        graph.insert("B".to_string(), BTreeSet::from(["D".to_string()]));
        graph.insert("C".to_string(), BTreeSet::from(["D".to_string()]));
        let discovered = BTreeSet::from([
            "A".to_string(),
            "B".to_string(),
            "C".to_string(),
            "D".to_string(),
        ]);

        assert_eq!(
            order_deletions(&discovered, &graph).unwrap(),
            vec!["D", "B", "C", "A"]
        );
    }

    #[test]
    fn test_self_reference_orders_alone() {
        let mut graph: BTreeMap<String, BTreeSet<String>> = BTreeMap::new();
        graph.insert("Category".to_string(), BTreeSet::from(["Category".to_string()]));
        let discovered = BTreeSet::from(["Category".to_string()]);

        assert_eq!(
            order_deletions(&discovered, &graph).unwrap(),
            vec!["Category"]
        );
    }

    #[test]
    fn test_cycle_is_an_error() {
        let mut graph: BTreeMap<String, BTreeSet<String>> = BTreeMap::new();
        graph.insert("A".to_string(), BTreeSet::from(["B".to_string()]));
        graph.insert("B".to_string(), BTreeSet::from(["A".to_string()]));
        let discovered = BTreeSet::from(["A".to_string(), "B".to_string()]);

        match order_deletions(&discovered, &graph).unwrap_err() {
            Error::CyclicDependency { cycle } => {
                assert_eq!(cycle, vec!["A".to_string(), "B".to_string()]);
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_build_plan() {
        let catalog = catalog();
        let graph = dependency_graph(&catalog);
        let mut discovered = BTreeMap::new();
        discovered.insert("Invoice".to_string(), vec!["inv-1".to_string()]);
        discovered.insert(
            "LineItem".to_string(),
            vec!["li-1".to_string(), "li-2".to_string()],
        );
        discovered.insert("Adjustment".to_string(), vec!["adj-1".to_string()]);

        let plan = build_plan(&catalog, &discovered, &graph).unwrap();

        assert_eq!(plan.total_records(), 4);
        assert_eq!(
            plan.steps
                .iter()
                .map(|s| s.schema_name.as_str())
                .collect::<Vec<_>>(),
            vec!["Adjustment", "LineItem", "Invoice"]
        );
        assert_eq!(plan.steps[0].table_name, "adjustment");
        assert!(plan.steps[0].depends_on.is_empty());
        assert_eq!(plan.steps[1].depends_on, vec!["Adjustment".to_string()]);
        assert_eq!(plan.steps[2].record_ids, vec!["inv-1".to_string()]);
    }
}
