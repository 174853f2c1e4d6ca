// SELECT DISTINCT e.deptno AS d, SUM(e.sal) AS total, RANK() OVER w
// FROM emp e
// WHERE e.sal > 1000
// GROUP BY e.deptno
// HAVING COUNT(*) > 3
// WINDOW w AS (PARTITION BY e.deptno ORDER BY e.sal)
// ORDER BY total DESC

use std::fmt;

use crate::ast::{write_identifier, NameMatcher, Span, SqlExpr, WindowSpec};

/// A table in the FROM clause, visible under its alias when it has one.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct TableRef {
    pub name: String,
    pub alias: Option<String>,
}

impl TableRef {
    pub fn new(name: impl Into<String>, alias: Option<&str>) -> Self {
        Self { name: name.into(), alias: alias.map(str::to_string) }
    }

    /// Name the table is referenced by inside the query.
    pub fn visible_name(&self) -> &str {
        self.alias.as_deref().unwrap_or(&self.name)
    }
}

impl fmt::Display for TableRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write_identifier(f, &self.name)?;
        if let Some(alias) = &self.alias {
            write!(f, " ")?;
            write_identifier(f, alias)?;
        }
        Ok(())
    }
}

#[derive(Clone, PartialEq, Eq, Hash, Default)]
pub struct Select {
    pub distinct: bool,
    pub select_list: Vec<SqlExpr>,
    pub from: Vec<TableRef>,
    pub criteria: Option<SqlExpr>,
    pub group_by: Vec<SqlExpr>,
    pub having: Option<SqlExpr>,
    pub windows: Vec<WindowSpec>,
    pub order_by: Vec<SqlExpr>,
    pub span: Span,
}

impl Select {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn distinct(mut self) -> Self {
        self.distinct = true;
        self
    }

    pub fn select(mut self, items: Vec<SqlExpr>) -> Self {
        self.select_list = items;
        self
    }

    pub fn from_table(mut self, name: &str, alias: Option<&str>) -> Self {
        self.from.push(TableRef::new(name, alias));
        self
    }

    pub fn filter(mut self, criteria: SqlExpr) -> Self {
        self.criteria = Some(criteria);
        self
    }

    pub fn group_by(mut self, items: Vec<SqlExpr>) -> Self {
        self.group_by = items;
        self
    }

    pub fn having(mut self, condition: SqlExpr) -> Self {
        self.having = Some(condition);
        self
    }

    pub fn window(mut self, window: WindowSpec) -> Self {
        self.windows.push(window);
        self
    }

    pub fn order_by(mut self, items: Vec<SqlExpr>) -> Self {
        self.order_by = items;
        self
    }

    pub fn with_span(mut self, span: Span) -> Self {
        self.span = span;
        self
    }

    pub fn equals_deep(&self, other: &Select, matcher: NameMatcher) -> bool {
        let same_opt = |a: &Option<SqlExpr>, b: &Option<SqlExpr>| match (a, b) {
            (Some(a), Some(b)) => a.equals_deep(b, matcher),
            (None, None) => true,
            _ => false,
        };
        self.distinct == other.distinct
            && self.from.len() == other.from.len()
            && self.from.iter().zip(&other.from).all(|(a, b)| {
                matcher.matches(&a.name, &b.name) && match (&a.alias, &b.alias) {
                    (Some(x), Some(y)) => matcher.matches(x, y),
                    (None, None) => true,
                    _ => false,
                }
            })
            && SqlExpr::all_equal_deep(&self.select_list, &other.select_list, matcher)
            && same_opt(&self.criteria, &other.criteria)
            && SqlExpr::all_equal_deep(&self.group_by, &other.group_by, matcher)
            && same_opt(&self.having, &other.having)
            && self.windows.len() == other.windows.len()
            && self.windows.iter().zip(&other.windows).all(|(a, b)| a.equals_deep(b, matcher))
            && SqlExpr::all_equal_deep(&self.order_by, &other.order_by, matcher)
    }
}

impl fmt::Display for Select {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "SELECT ")?;
        if self.distinct {
            write!(f, "DISTINCT ")?;
        }
        write!(f, "{}", SqlExpr::join(&self.select_list))?;
        if !self.from.is_empty() {
            let tables = self.from.iter().map(|t| t.to_string()).collect::<Vec<_>>().join(", ");
            write!(f, " FROM {}", tables)?;
        }
        if let Some(criteria) = &self.criteria {
            write!(f, " WHERE {}", criteria)?;
        }
        if !self.group_by.is_empty() {
            write!(f, " GROUP BY {}", SqlExpr::join(&self.group_by))?;
        }
        if let Some(having) = &self.having {
            write!(f, " HAVING {}", having)?;
        }
        if !self.windows.is_empty() {
            let windows = self.windows.iter()
                .map(|w| format!("{} AS {}", w.name.as_deref().unwrap_or_default(), w))
                .collect::<Vec<_>>()
                .join(", ");
            write!(f, " WINDOW {}", windows)?;
        }
        if !self.order_by.is_empty() {
            write!(f, " ORDER BY {}", SqlExpr::join(&self.order_by))?;
        }
        Ok(())
    }
}

impl fmt::Debug for Select {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Select({})", self)
    }
}
