//! Declarative description of a list view's base query.

use sea_orm::sea_query::{Alias, Asterisk, Expr, JoinType, Query, SelectStatement};
use serde::{Deserialize, Serialize};

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum JoinKind {
    #[default]
    Left,
    Inner,
    Right,
}

impl From<JoinKind> for JoinType {
    fn from(kind: JoinKind) -> Self {
        match kind {
            JoinKind::Left => JoinType::LeftJoin,
            JoinKind::Inner => JoinType::InnerJoin,
            JoinKind::Right => JoinType::RightJoin,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct JoinSource {
    #[serde(default)]
    pub kind: JoinKind,
    pub table: String,
    #[serde(default)]
    pub alias: Option<String>,
    /// Raw join condition, e.g. `p.pid = e.pid`.
    pub on: String,
}

/// `SELECT <select> FROM <from> [AS alias] <joins> [WHERE <where>]`.
///
/// Expressions in `select`, `on` and `where` are raw SQL; table names and
/// aliases are quoted.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct TableSource {
    pub from: String,
    #[serde(default)]
    pub alias: Option<String>,
    /// Selected expressions; empty selects `*`.
    #[serde(default)]
    pub select: Vec<String>,
    #[serde(default)]
    pub joins: Vec<JoinSource>,
    #[serde(default, rename = "where")]
    pub filter: Option<String>,
}

impl TableSource {
    pub fn new(from: impl Into<String>) -> Self {
        Self {
            from: from.into(),
            alias: None,
            select: Vec::new(),
            joins: Vec::new(),
            filter: None,
        }
    }

    pub fn alias(mut self, alias: impl Into<String>) -> Self {
        self.alias = Some(alias.into());
        self
    }

    pub fn select<I, S>(mut self, exprs: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.select.extend(exprs.into_iter().map(Into::into));
        self
    }

    pub fn join(mut self, kind: JoinKind, table: impl Into<String>, on: impl Into<String>) -> Self {
        self.joins.push(JoinSource {
            kind,
            table: table.into(),
            alias: None,
            on: on.into(),
        });
        self
    }

    pub fn filter(mut self, filter: impl Into<String>) -> Self {
        self.filter = Some(filter.into());
        self
    }

    pub fn to_select(&self) -> SelectStatement {
        let mut stmt = Query::select();

        if self.select.is_empty() {
            stmt.column(Asterisk);
        } else {
            for e in &self.select {
                stmt.expr(Expr::cust(e.as_str()));
            }
        }

        match &self.alias {
            Some(alias) => stmt.from_as(Alias::new(&self.from), Alias::new(alias)),
            None => stmt.from(Alias::new(&self.from)),
        };

        for j in &self.joins {
            let on = Expr::cust(j.on.as_str());
            match &j.alias {
                Some(alias) => {
                    stmt.join_as(j.kind.into(), Alias::new(&j.table), Alias::new(alias), on)
                }
                None => stmt.join(j.kind.into(), Alias::new(&j.table), on),
            };
        }

        if let Some(filter) = self.filter.as_deref().filter(|f| !f.trim().is_empty()) {
            stmt.and_where(Expr::cust(filter));
        }

        stmt
    }
}
