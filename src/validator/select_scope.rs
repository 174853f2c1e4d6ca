use indexmap::IndexMap;
use tracing::trace;

use crate::{
    ast::{ColumnRef, NameMatcher, Select, SqlExpr, WindowSpec},
    catalog::{SchemaProvider, TableSchema},
    validator::{Scope, ValidatorError},
};

/// Scope of a single SELECT: the tables of its FROM clause and its WINDOW clause.
pub struct SelectScope<'a> {
    select: &'a Select,
    /// visible name (alias or table) -> schema
    collections: IndexMap<String, &'a TableSchema>,
    matcher: NameMatcher,
    aggregating: bool,
}

impl<'a> SelectScope<'a> {
    pub fn new(select: &'a Select, schemas: &'a dyn SchemaProvider, matcher: NameMatcher) -> Result<Self, ValidatorError> {
        let mut collections = IndexMap::new();
        for table in &select.from {
            let schema = schemas.schema_of(&table.name)
                .ok_or_else(|| ValidatorError::UnknownCollection(table.name.clone()))?;
            collections.insert(table.visible_name().to_string(), schema);
        }
        Ok(Self { select, collections, matcher, aggregating: false })
    }

    /// Mark this scope as the scope of a grouped (or DISTINCT) select.
    pub fn aggregating(mut self, aggregating: bool) -> Self {
        self.aggregating = aggregating;
        self
    }

    /// Columns a `*` or `t.*` stands for, fully qualified, in FROM order.
    pub fn star_columns(&self, star: &ColumnRef) -> Result<Vec<ColumnRef>, ValidatorError> {
        let collections: Vec<(&String, &'a TableSchema)> = match star.names.as_slice() {
            [] => self.collections.iter().map(|(visible, schema)| (visible, *schema)).collect(),
            [collection] => vec![self.collection(collection)
                .ok_or_else(|| ValidatorError::UnknownCollection(collection.clone()))?],
            _ => return Err(ValidatorError::UnknownCollection(star.names.join("."))),
        };
        Ok(collections.into_iter()
            .flat_map(|(visible, schema)| {
                schema.columns.iter().map(move |c| ColumnRef::qualified(visible.clone(), c.clone()).with_span(star.span))
            })
            .collect())
    }

    fn collection(&self, name: &str) -> Option<(&String, &'a TableSchema)> {
        self.collections.get_key_value(name)
            .or_else(|| self.collections.iter().find(|(visible, _)| self.matcher.matches(visible, name)))
            .map(|(visible, schema)| (visible, *schema))
    }

    fn qualify_in(&self, collection: &str, name: &str, column: &ColumnRef) -> Result<ColumnRef, ValidatorError> {
        let (visible, schema) = self.collection(collection)
            .ok_or_else(|| ValidatorError::UnknownCollection(collection.to_string()))?;
        let canonical = schema.get(name, self.matcher).ok_or_else(|| ValidatorError::UnknownColumn {
            name: format!("{}.{}", collection, name),
            candidates: schema.columns.iter().cloned().collect(),
        })?;
        Ok(ColumnRef::qualified(visible.clone(), canonical).with_span(column.span))
    }

    fn qualify_unqualified(&self, name: &str, column: &ColumnRef) -> Result<ColumnRef, ValidatorError> {
        // search each visible collection's schema for this column
        let mut matches: Vec<(&String, &str)> = Vec::new();
        for (visible, schema) in &self.collections {
            if let Some(canonical) = schema.get(name, self.matcher) {
                matches.push((visible, canonical));
            }
        }
        match matches.as_slice() {
            [] => Err(ValidatorError::UnknownColumn {
                name: name.to_string(),
                candidates: self.collections.iter()
                    .flat_map(|(visible, schema)| schema.columns.iter().map(move |c| format!("{}.{}", visible, c)))
                    .collect(),
            }),
            [(visible, canonical)] => Ok(ColumnRef::qualified((*visible).clone(), *canonical).with_span(column.span)),
            _ => Err(ValidatorError::AmbiguousColumn {
                name: name.to_string(),
                matches: matches.iter().map(|(coll, col)| ((*coll).clone(), col.to_string())).collect(),
            }),
        }
    }
}

impl Scope for SelectScope<'_> {
    fn fully_qualify(&self, column: &ColumnRef) -> Result<ColumnRef, ValidatorError> {
        trace!(column = %column, "qualifying");
        if column.is_star() {
            return match column.names.as_slice() {
                [] => Ok(column.clone()),
                [collection] => {
                    let (visible, _) = self.collection(collection)
                        .ok_or_else(|| ValidatorError::UnknownCollection(collection.clone()))?;
                    Ok(ColumnRef::qualified_star(visible.clone()).with_span(column.span))
                }
                _ => Err(ValidatorError::UnknownCollection(column.names.join("."))),
            };
        }
        match column.names.as_slice() {
            [name] => self.qualify_unqualified(name, column),
            [collection, name] => self.qualify_in(collection, name, column),
            _ => Err(ValidatorError::UnknownColumn { name: column.to_string(), candidates: vec![] }),
        }
    }

    fn lookup_window(&self, name: &str) -> Result<&WindowSpec, ValidatorError> {
        self.select.windows.iter()
            .find(|w| w.name.as_deref().is_some_and(|n| self.matcher.matches(n, name)))
            .ok_or_else(|| ValidatorError::UnknownWindow(name.to_string()))
    }

    fn operand_scope(&self, _call: &SqlExpr) -> &dyn Scope {
        self
    }

    fn aggregating_select(&self) -> Option<&Select> {
        if self.aggregating { Some(self.select) } else { None }
    }
}
