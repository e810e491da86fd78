//! Aggregation compiler for requests with reference columns
//!
//! Stage order of the shared prefix:
//! 1. External criteria, matched against the raw documents
//! 2. Per resolved reference column: pairs projection, pair extraction,
//!    identifier extraction, left-outer lookup into the resolved alias
//! 3. Global search
//! 4. One match stage per searched column
//!
//! The count pipeline ends the prefix with a count stage; the result
//! pipeline ends it with sort, skip and limit.

use crate::config::{alias_padding_problem, TableConfig};
use crate::criteria::{ExternalCriteria, Filter};
use crate::observability::Logger;
use crate::request::{Column, TableRequest};

use super::alias::FieldNames;
use super::errors::{CompileError, CompileResult};
use super::pipeline::{Expression, Lookup, Pipeline, Projection, Stage};
use super::search::{column_fragment, search_fragment, sort_keys};

/// Identifier field of referenced documents
const FOREIGN_ID_FIELD: &str = "_id";

/// A reference column and the alias its joined documents are stored under
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedReference {
    /// Field path of the reference column
    pub field: String,
    /// Collision-free field receiving the joined documents
    pub alias: String,
    pub collection: String,
}

/// Compiled pair of pipelines sharing one filtering prefix
#[derive(Debug, Clone, PartialEq)]
pub struct AggregationPlan {
    /// Prefix followed by a count stage
    pub count: Pipeline,
    /// Prefix followed by sort, skip and limit
    pub result: Pipeline,
    pub references: Vec<ResolvedReference>,
}

impl AggregationPlan {
    /// Returns the resolved alias of a reference column
    pub fn alias_for(&self, field: &str) -> Option<&str> {
        alias_of(&self.references, field)
    }
}

fn alias_of<'r>(references: &'r [ResolvedReference], field: &str) -> Option<&'r str> {
    references
        .iter()
        .find(|r| r.field == field)
        .map(|r| r.alias.as_str())
}

/// Compiler for the reference-resolving aggregation path
#[derive(Debug, Clone)]
pub struct ReferenceCompiler {
    id_position: i64,
    padding: String,
    count_field: String,
}

impl ReferenceCompiler {
    /// Fails when the alias padding cannot build top-level field names
    pub fn new(config: &TableConfig) -> CompileResult<Self> {
        if let Some(reason) = alias_padding_problem(&config.alias_padding) {
            return Err(CompileError::invalid_padding(&config.alias_padding, reason));
        }

        Ok(Self {
            id_position: config.reference_id_position,
            padding: config.alias_padding.clone(),
            count_field: config.count_field.clone(),
        })
    }

    /// Compiles a request into count and result pipelines
    pub fn compile_plan(
        &self,
        request: &TableRequest,
        criteria: &ExternalCriteria,
    ) -> CompileResult<AggregationPlan> {
        let mut prefix: Vec<Stage> = criteria.fragments().cloned().map(Stage::Match).collect();

        let references = self.resolve_references(request, &mut prefix)?;

        if let Some(global) = Self::global_clause(request, &references) {
            prefix.push(Stage::Match(global));
        }

        for column in &request.columns {
            if !column.has_column_search() {
                continue;
            }
            if let Some(clause) = Self::column_clause(column, &references) {
                prefix.push(Stage::Match(clause));
            }
        }

        let mut count = Pipeline::new(prefix.clone());
        count.push(Stage::Count(self.count_field.clone()));

        let mut result = Pipeline::new(prefix);
        let keys = sort_keys(request, |column| Self::sort_target(column, &references));
        if !keys.is_empty() {
            result.push(Stage::Sort(keys));
        }
        result.push(Stage::Skip(request.start));
        if let Some(limit) = request.limit() {
            result.push(Stage::Limit(limit));
        }

        let joined = references.len().to_string();
        let stages = result.len().to_string();
        Logger::trace(
            "TABLE_COMPILE_REFERENCE",
            &[("references", joined.as_str()), ("stages", stages.as_str())],
        );

        Ok(AggregationPlan {
            count,
            result,
            references,
        })
    }

    /// Emits the join stages for every reference column that is searched or
    /// sorted on, and returns the alias assigned to each.
    fn resolve_references(
        &self,
        request: &TableRequest,
        stages: &mut Vec<Stage>,
    ) -> CompileResult<Vec<ResolvedReference>> {
        let mut names = FieldNames::from_columns(&request.columns);
        let mut retained: Vec<String> = Vec::new();
        for column in &request.columns {
            retain(&mut retained, column.base_field());
        }

        let mut references = Vec::new();
        for column in request.columns.iter().filter(|c| c.needs_resolution()) {
            // A later column with the same path replaces this one
            let shadowed = request
                .column(&column.data)
                .map_or(false, |last| !std::ptr::eq(last, column));
            if shadowed {
                continue;
            }

            let collection = column
                .reference_collection
                .as_deref()
                .map(str::trim)
                .filter(|c| !c.is_empty())
                .ok_or_else(|| CompileError::reference_unbound(&column.data))?;

            // Dotted paths would nest the generated fields inside a retained field
            let base = column.data.replace('.', &self.padding);
            let alias = names.resolve_alias(&base, &self.padding)?;
            let pairs = format!("{}fk_arr", alias);
            let pair = format!("{}fk_obj", alias);
            let id = format!("{}id", alias);
            for name in [&alias, &pairs, &pair, &id] {
                names.insert(name);
            }

            stages.push(project(
                &retained,
                &pairs,
                Expression::ObjectToArray(column.data.clone()),
            ));
            stages.push(project(
                &retained,
                &pair,
                Expression::ArrayElemAt(pairs.clone(), self.id_position),
            ));
            stages.push(project(
                &retained,
                &id,
                Expression::Field(format!("{}.v", pair)),
            ));
            stages.push(Stage::Lookup(Lookup {
                from: collection.to_string(),
                local_field: id,
                foreign_field: FOREIGN_ID_FIELD.to_string(),
                as_field: alias.clone(),
            }));

            // Later projections must keep the joined documents
            retain(&mut retained, &alias);

            references.push(ResolvedReference {
                field: column.data.clone(),
                alias,
                collection: collection.to_string(),
            });
        }

        Ok(references)
    }

    fn global_clause(request: &TableRequest, references: &[ResolvedReference]) -> Option<Filter> {
        if !request.search.has_text() {
            return None;
        }

        let mut fragments = Vec::new();
        for column in request.columns.iter().filter(|c| c.searchable) {
            if !column.reference {
                fragments.push(search_fragment(&column.data, &request.search));
                continue;
            }
            if let Some(alias) = alias_of(references, &column.data) {
                for field in &column.reference_fields {
                    let target = format!("{}.{}", alias, field);
                    fragments.push(search_fragment(&target, &request.search));
                }
            }
        }

        Filter::any(fragments)
    }

    /// Per-column clause; the fields of a reference column are OR-combined.
    /// A searched reference column without fields matches nothing.
    fn column_clause(column: &Column, references: &[ResolvedReference]) -> Option<Filter> {
        if !column.reference {
            return Some(column_fragment(&column.data, &column.search));
        }

        let alias = alias_of(references, &column.data)?;
        if column.reference_fields.is_empty() {
            Logger::warn("TABLE_SEARCH_UNMATCHABLE", &[("column", column.data.as_str())]);
            // No joined field can satisfy the search
            return Some(Filter::in_list(FOREIGN_ID_FIELD, Vec::new()));
        }
        let fragments = column
            .reference_fields
            .iter()
            .map(|field| column_fragment(&format!("{}.{}", alias, field), &column.search))
            .collect();

        Filter::any(fragments)
    }

    fn sort_target(column: &Column, references: &[ResolvedReference]) -> Option<String> {
        if !column.reference {
            return Some(column.data.clone());
        }

        let alias = alias_of(references, &column.data)?;
        let order_field = column.reference_order_field.as_ref()?;
        Some(format!("{}.{}", alias, order_field))
    }
}

fn retain(retained: &mut Vec<String>, field: &str) {
    let base = field.split('.').next().unwrap_or(field);
    if base != FOREIGN_ID_FIELD && !retained.iter().any(|r| r == base) {
        retained.push(base.to_string());
    }
}

fn project(retained: &[String], field: &str, expression: Expression) -> Stage {
    Stage::Project(Projection {
        include: retained.to_vec(),
        field: field.to_string(),
        expression,
    })
}
