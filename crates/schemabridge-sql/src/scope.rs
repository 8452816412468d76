//! Name resolution scopes.
//!
//! Every query level gets a [`Scope`] holding the relations of its FROM
//! clause; a query's WITH clause adds CTE definitions to the scope its body
//! sees. CTEs and derived tables are recorded as [`CteDependency`] records
//! and resolve columns by walking back through the relations they read.

use schemabridge_core::TranslationMap;
use serde::Serialize;
use std::collections::{BTreeMap, BTreeSet};
use std::rc::Rc;

/// What a CTE or derived table reads and defines.
///
/// All names are proper (normalized) names.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct CteDependency {
    /// CTE name or derived table alias.
    pub name: String,

    /// Relations its body reads, as written (`schema.table`, `table` or a
    /// CTE name).
    pub tables: Vec<String>,

    /// Columns referenced through each qualifier.
    pub columns: BTreeMap<String, BTreeSet<String>>,

    /// Output column aliases it defines.
    pub aliases: BTreeSet<String>,
}

/// What a FROM-clause relation stands for.
#[derive(Debug, Clone)]
pub(crate) enum Source {
    /// Catalog table, by proper names.
    Table { schema: String, table: String },
    /// CTE or derived table.
    Virtual(Rc<VirtualRelation>),
    /// Not in the translation map.
    Unknown,
}

/// A CTE or derived table together with the relations it reads.
#[derive(Debug, Default)]
pub(crate) struct VirtualRelation {
    pub dependency: CteDependency,
    pub sources: Vec<Source>,
}

impl VirtualRelation {
    pub fn merge(&mut self, other: VirtualRelation) {
        self.dependency.tables.extend(other.dependency.tables);
        for (qualifier, columns) in other.dependency.columns {
            self.dependency
                .columns
                .entry(qualifier)
                .or_default()
                .extend(columns);
        }
        self.dependency.aliases.extend(other.dependency.aliases);
        self.sources.extend(other.sources);
    }
}

/// Outcome of looking a column up through a relation.
#[derive(Debug, PartialEq, Eq)]
pub(crate) enum Lookup<'m> {
    /// Catalog column; holds its original name.
    Found(&'m str),
    /// Output alias of a CTE or derived table; left as written.
    Alias,
    Missing,
}

impl Source {
    /// Resolve a proper column name through this relation.
    ///
    /// Virtual relations are built from already-resolved sources, so the
    /// walk always terminates.
    pub fn column<'m>(&self, map: &'m TranslationMap, column: &str) -> Lookup<'m> {
        match self {
            Source::Table { schema, table } => map
                .column(schema, table, column)
                .map_or(Lookup::Missing, Lookup::Found),
            Source::Virtual(relation) => {
                if relation.dependency.aliases.contains(column) {
                    return Lookup::Alias;
                }
                relation
                    .sources
                    .iter()
                    .map(|source| source.column(map, column))
                    .find(|lookup| *lookup != Lookup::Missing)
                    .unwrap_or(Lookup::Missing)
            }
            Source::Unknown => Lookup::Missing,
        }
    }
}

/// A relation in a FROM clause.
#[derive(Debug)]
pub(crate) struct Relation {
    /// Name it is referenced by: its alias, else its bare name.
    pub key: String,
    /// Name as written, for dependency records.
    pub written: String,
    pub source: Source,
    /// Original table name, when the relation is an unaliased catalog table
    /// and qualifiers naming it must be renamed too.
    pub qualifier_original: Option<String>,
}

/// One level of name resolution.
#[derive(Debug, Default)]
pub(crate) struct Scope<'p> {
    parent: Option<&'p Scope<'p>>,
    ctes: Vec<(String, Rc<VirtualRelation>)>,
    pub relations: Vec<Relation>,
    pub output_aliases: BTreeSet<String>,
}

impl<'p> Scope<'p> {
    pub fn child(parent: Option<&'p Scope<'p>>) -> Self {
        Self {
            parent,
            ..Self::default()
        }
    }

    pub fn define_cte(&mut self, name: String, relation: Rc<VirtualRelation>) {
        self.ctes.push((name, relation));
    }

    /// This scope and its parents, innermost first.
    pub fn ancestors(&self) -> impl Iterator<Item = &Scope<'p>> {
        std::iter::successors(Some(self), |scope| scope.parent)
    }

    /// Innermost CTE named `name`; later definitions shadow earlier ones.
    pub fn cte(&self, name: &str) -> Option<Rc<VirtualRelation>> {
        self.ancestors().find_map(|scope| {
            scope
                .ctes
                .iter()
                .rev()
                .find(|(cte, _)| cte == name)
                .map(|(_, relation)| Rc::clone(relation))
        })
    }

    /// Innermost relation referenced as `key`.
    pub fn relation(&self, key: &str) -> Option<&Relation> {
        self.ancestors()
            .find_map(|scope| scope.relations.iter().find(|r| r.key == key))
    }

    /// Every relation in scope, innermost first.
    pub fn visible_relations(&self) -> impl Iterator<Item = &Relation> {
        self.ancestors().flat_map(|scope| scope.relations.iter())
    }

    /// Record of this scope's level, for a CTE or derived table built on it.
    pub fn to_virtual(&self, qualified: &[(String, String)]) -> VirtualRelation {
        let mut dependency = CteDependency {
            tables: self
                .relations
                .iter()
                .filter(|r| !r.written.is_empty())
                .map(|r| r.written.clone())
                .collect(),
            aliases: self.output_aliases.clone(),
            ..CteDependency::default()
        };
        for (qualifier, column) in qualified {
            dependency
                .columns
                .entry(qualifier.clone())
                .or_default()
                .insert(column.clone());
        }
        VirtualRelation {
            dependency,
            sources: self.relations.iter().map(|r| r.source.clone()).collect(),
        }
    }
}
