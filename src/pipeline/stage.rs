//! Pipeline Stage Descriptors
//!
//! Typed building blocks of an aggregation pipeline. Every stage,
//! predicate, expression and accumulator is a tagged variant, so a
//! pipeline that type-checks is well-formed. Strings only appear when a
//! stage is rendered to MQL JSON for a store.
//!
//! # Rendering
//!
//! ```text
//! Stage::Match(pred)        → {"$match": {...}}
//! Stage::Unwind(path)       → {"$unwind": "$path"}
//! Stage::Group(group)       → {"$group": {"_id": key, name: {"$acc": expr}, ...}}
//! Stage::Sort(keys)         → {"$sort": {path: 1 | -1, ...}}
//! Stage::Limit(n)           → {"$limit": n}
//! Stage::Project(fields)    → {"$project": {...}}
//! Stage::AddFields(fields)  → {"$addFields": {...}}
//! ```

use serde_json::{json, Map, Value};
use std::borrow::Cow;

/// A dotted path to a field inside a document, without the leading `$`
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct FieldPath(Cow<'static, str>);

impl FieldPath {
    /// Create a path usable in `const` items
    pub const fn from_static(path: &'static str) -> Self {
        Self(Cow::Borrowed(path))
    }

    /// Create a path from an owned string
    pub fn new(path: impl Into<String>) -> Self {
        Self(Cow::Owned(path.into()))
    }

    /// The dotted path
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// The path as a field reference (`$a.b`)
    pub fn reference(&self) -> String {
        format!("${}", self.0)
    }

    /// Path segments
    pub fn segments(&self) -> impl Iterator<Item = &str> {
        self.0.split('.')
    }
}

impl From<&'static str> for FieldPath {
    fn from(path: &'static str) -> Self {
        Self::from_static(path)
    }
}

impl From<String> for FieldPath {
    fn from(path: String) -> Self {
        Self::new(path)
    }
}

impl std::fmt::Display for FieldPath {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Comparison operators usable in match predicates
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operator {
    /// Equal to
    Eq,
    /// Not equal to
    Ne,
    /// Greater than
    Gt,
    /// Greater than or equal to
    Gte,
    /// Less than
    Lt,
    /// Less than or equal to
    Lte,
}

impl Operator {
    /// MQL operator name
    pub fn mql_name(&self) -> &'static str {
        match self {
            Self::Eq => "$eq",
            Self::Ne => "$ne",
            Self::Gt => "$gt",
            Self::Gte => "$gte",
            Self::Lt => "$lt",
            Self::Lte => "$lte",
        }
    }
}

impl std::fmt::Display for Operator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Eq => write!(f, "="),
            Self::Ne => write!(f, "!="),
            Self::Gt => write!(f, ">"),
            Self::Gte => write!(f, ">="),
            Self::Lt => write!(f, "<"),
            Self::Lte => write!(f, "<="),
        }
    }
}

/// A boolean condition over a single input document
#[derive(Debug, Clone, PartialEq)]
pub enum Predicate {
    /// `field <op> value`
    Compare {
        field: FieldPath,
        op: Operator,
        value: Value,
    },
    /// Field value is one of the listed values
    In(FieldPath, Vec<Value>),
    /// Field value is none of the listed values
    NotIn(FieldPath, Vec<Value>),
    /// All sub-predicates hold
    And(Vec<Predicate>),
}

impl Predicate {
    /// Create a comparison predicate
    pub fn compare(field: impl Into<FieldPath>, op: Operator, value: impl Into<Value>) -> Self {
        Self::Compare {
            field: field.into(),
            op,
            value: value.into(),
        }
    }

    /// `field == value`
    pub fn eq(field: impl Into<FieldPath>, value: impl Into<Value>) -> Self {
        Self::compare(field, Operator::Eq, value)
    }

    /// `field != value`
    pub fn ne(field: impl Into<FieldPath>, value: impl Into<Value>) -> Self {
        Self::compare(field, Operator::Ne, value)
    }

    /// `field >= value`
    pub fn gte(field: impl Into<FieldPath>, value: impl Into<Value>) -> Self {
        Self::compare(field, Operator::Gte, value)
    }

    /// `field NOT IN values`
    pub fn not_in<V: Into<Value>>(
        field: impl Into<FieldPath>,
        values: impl IntoIterator<Item = V>,
    ) -> Self {
        Self::NotIn(field.into(), values.into_iter().map(Into::into).collect())
    }

    /// `field IN values`
    pub fn one_of<V: Into<Value>>(
        field: impl Into<FieldPath>,
        values: impl IntoIterator<Item = V>,
    ) -> Self {
        Self::In(field.into(), values.into_iter().map(Into::into).collect())
    }

    /// Conjunction of `self` and `other`, flattening nested conjunctions
    pub fn and(self, other: Predicate) -> Self {
        let mut clauses = match self {
            Self::And(clauses) => clauses,
            single => vec![single],
        };
        match other {
            Self::And(more) => clauses.extend(more),
            single => clauses.push(single),
        }
        Self::And(clauses)
    }

    /// Render as an MQL query document
    pub fn to_mql(&self) -> Value {
        match self {
            Self::Compare { field, op, value } => {
                json!({ field.as_str(): { op.mql_name(): value } })
            }
            Self::In(field, values) => json!({ field.as_str(): { "$in": values } }),
            Self::NotIn(field, values) => json!({ field.as_str(): { "$nin": values } }),
            Self::And(clauses) => {
                let rendered: Vec<Value> = clauses.iter().map(Predicate::to_mql).collect();
                json!({ "$and": rendered })
            }
        }
    }
}

/// An aggregation expression evaluated against one document
#[derive(Debug, Clone, PartialEq)]
pub enum Expr {
    /// Value at a field path
    Field(FieldPath),
    /// Constant value
    Literal(Value),
    /// Equality of two expressions
    Eq(Box<Expr>, Box<Expr>),
    /// `if when { then } else { otherwise }`
    Cond {
        when: Box<Expr>,
        then: Box<Expr>,
        otherwise: Box<Expr>,
    },
    /// Element of an array expression; negative indexes count from the end
    ArrayElemAt(Box<Expr>, i64),
}

impl Expr {
    pub fn field(path: impl Into<FieldPath>) -> Self {
        Self::Field(path.into())
    }

    pub fn literal(value: impl Into<Value>) -> Self {
        Self::Literal(value.into())
    }

    pub fn eq(left: Expr, right: Expr) -> Self {
        Self::Eq(Box::new(left), Box::new(right))
    }

    pub fn cond(when: Expr, then: Expr, otherwise: Expr) -> Self {
        Self::Cond {
            when: Box::new(when),
            then: Box::new(then),
            otherwise: Box::new(otherwise),
        }
    }

    pub fn array_elem_at(array: Expr, index: i64) -> Self {
        Self::ArrayElemAt(Box::new(array), index)
    }

    /// `1` when `path == value`, else `0`
    pub fn indicator(path: impl Into<FieldPath>, value: impl Into<Value>) -> Self {
        Self::cond(
            Self::eq(Self::field(path), Self::literal(value)),
            Self::literal(1),
            Self::literal(0),
        )
    }

    /// Render as an MQL aggregation expression
    pub fn to_mql(&self) -> Value {
        match self {
            Self::Field(path) => Value::String(path.reference()),
            // A bare string starting with `$` would be read back as a field path
            Self::Literal(Value::String(s)) if s.starts_with('$') => json!({ "$literal": s }),
            Self::Literal(value) => value.clone(),
            Self::Eq(left, right) => json!({ "$eq": [left.to_mql(), right.to_mql()] }),
            Self::Cond {
                when,
                then,
                otherwise,
            } => json!({ "$cond": [when.to_mql(), then.to_mql(), otherwise.to_mql()] }),
            Self::ArrayElemAt(array, index) => {
                json!({ "$arrayElemAt": [array.to_mql(), index] })
            }
        }
    }
}

/// A per-group aggregate computation
#[derive(Debug, Clone, PartialEq)]
pub enum Accumulator {
    /// Sum of numeric values
    Sum(Expr),
    /// Average of numeric values
    Avg(Expr),
    /// Largest value
    Max(Expr),
    /// Smallest value
    Min(Expr),
    /// Value from the first document of the group
    First(Expr),
}

impl Accumulator {
    /// Number of documents in the group
    pub fn count() -> Self {
        Self::Sum(Expr::literal(1))
    }

    pub fn sum(path: impl Into<FieldPath>) -> Self {
        Self::Sum(Expr::field(path))
    }

    pub fn avg(path: impl Into<FieldPath>) -> Self {
        Self::Avg(Expr::field(path))
    }

    pub fn max(path: impl Into<FieldPath>) -> Self {
        Self::Max(Expr::field(path))
    }

    pub fn first(path: impl Into<FieldPath>) -> Self {
        Self::First(Expr::field(path))
    }

    /// MQL accumulator name
    pub fn mql_name(&self) -> &'static str {
        match self {
            Self::Sum(_) => "$sum",
            Self::Avg(_) => "$avg",
            Self::Max(_) => "$max",
            Self::Min(_) => "$min",
            Self::First(_) => "$first",
        }
    }

    /// The expression fed to the accumulator
    pub fn expr(&self) -> &Expr {
        match self {
            Self::Sum(e) | Self::Avg(e) | Self::Max(e) | Self::Min(e) | Self::First(e) => e,
        }
    }

    pub fn to_mql(&self) -> Value {
        json!({ self.mql_name(): self.expr().to_mql() })
    }
}

/// What the group stage groups by
#[derive(Debug, Clone, PartialEq)]
pub enum GroupKey {
    /// Every document in one bucket (`_id: null`)
    None,
    /// Value of a field
    Field(FieldPath),
    /// Value of a computed expression
    Computed(Expr),
}

impl GroupKey {
    pub fn to_mql(&self) -> Value {
        match self {
            Self::None => Value::Null,
            Self::Field(path) => Value::String(path.reference()),
            Self::Computed(expr) => expr.to_mql(),
        }
    }
}

/// A group stage: key plus named accumulators, in output order
#[derive(Debug, Clone, PartialEq)]
pub struct Group {
    pub key: GroupKey,
    pub accumulators: Vec<(String, Accumulator)>,
}

impl Group {
    pub fn to_mql(&self) -> Value {
        let mut body = Map::new();
        body.insert("_id".to_string(), self.key.to_mql());
        for (name, acc) in &self.accumulators {
            body.insert(name.clone(), acc.to_mql());
        }
        Value::Object(body)
    }

    /// Look up an accumulator by output name
    pub fn accumulator(&self, name: &str) -> Option<&Accumulator> {
        self.accumulators
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, acc)| acc)
    }
}

/// Sort direction
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortOrder {
    Ascending,
    Descending,
}

impl SortOrder {
    fn to_mql(self) -> Value {
        match self {
            Self::Ascending => json!(1),
            Self::Descending => json!(-1),
        }
    }
}

/// How a projection treats one output field
#[derive(Debug, Clone, PartialEq)]
pub enum ProjectField {
    /// Keep the input field
    Include,
    /// Drop the input field
    Exclude,
    /// Set the field to an expression's value
    Computed(Expr),
}

impl ProjectField {
    fn to_mql(&self) -> Value {
        match self {
            Self::Include => json!(1),
            Self::Exclude => json!(0),
            Self::Computed(expr) => expr.to_mql(),
        }
    }
}

/// One stage of an aggregation pipeline
#[derive(Debug, Clone, PartialEq)]
pub enum Stage {
    Match(Predicate),
    Unwind(FieldPath),
    Group(Group),
    Sort(Vec<(FieldPath, SortOrder)>),
    Limit(u64),
    Project(Vec<(String, ProjectField)>),
    AddFields(Vec<(String, Expr)>),
}

impl Stage {
    /// Sort descending on a single field
    pub fn sort_desc(path: impl Into<FieldPath>) -> Self {
        Self::Sort(vec![(path.into(), SortOrder::Descending)])
    }

    /// MQL stage name
    pub fn name(&self) -> &'static str {
        match self {
            Self::Match(_) => "$match",
            Self::Unwind(_) => "$unwind",
            Self::Group(_) => "$group",
            Self::Sort(_) => "$sort",
            Self::Limit(_) => "$limit",
            Self::Project(_) => "$project",
            Self::AddFields(_) => "$addFields",
        }
    }

    /// Render as a single-key MQL stage document
    pub fn to_mql(&self) -> Value {
        let body = match self {
            Self::Match(pred) => pred.to_mql(),
            Self::Unwind(path) => Value::String(path.reference()),
            Self::Group(group) => group.to_mql(),
            Self::Sort(keys) => Value::Object(
                keys.iter()
                    .map(|(path, order)| (path.to_string(), order.to_mql()))
                    .collect(),
            ),
            Self::Limit(n) => json!(n),
            Self::Project(fields) => Value::Object(
                fields
                    .iter()
                    .map(|(name, field)| (name.clone(), field.to_mql()))
                    .collect(),
            ),
            Self::AddFields(fields) => Value::Object(
                fields
                    .iter()
                    .map(|(name, expr)| (name.clone(), expr.to_mql()))
                    .collect(),
            ),
        };
        json!({ self.name(): body })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_field_path_reference() {
        let path = FieldPath::from_static("stats.kills");
        assert_eq!(path.reference(), "$stats.kills");
        assert_eq!(path.segments().collect::<Vec<_>>(), vec!["stats", "kills"]);
    }

    #[test]
    fn test_predicate_and_flattens() {
        let pred = Predicate::eq("a", 1)
            .and(Predicate::ne("b", "x"))
            .and(Predicate::eq("c", true).and(Predicate::gte("d", 2)));

        match pred {
            Predicate::And(clauses) => assert_eq!(clauses.len(), 4),
            other => panic!("expected conjunction, got {:?}", other),
        }
    }

    #[test]
    fn test_predicate_rendering() {
        assert_eq!(
            Predicate::ne("result", "Remake").to_mql(),
            json!({"result": {"$ne": "Remake"}})
        );
        assert_eq!(
            Predicate::not_in("gamemode", [800, 810]).to_mql(),
            json!({"gamemode": {"$nin": [800, 810]}})
        );
        assert_eq!(
            Predicate::one_of("role", ["TOP", "JUNGLE"]).to_mql(),
            json!({"role": {"$in": ["TOP", "JUNGLE"]}})
        );
    }

    #[test]
    fn test_indicator_expression() {
        assert_eq!(
            Expr::indicator("result", "Win").to_mql(),
            json!({"$cond": [{"$eq": ["$result", "Win"]}, 1, 0]})
        );
    }

    #[test]
    fn test_dollar_string_literal_is_escaped() {
        assert_eq!(
            Expr::literal("$notAField").to_mql(),
            json!({"$literal": "$notAField"})
        );
        assert_eq!(Expr::literal("plain").to_mql(), json!("plain"));
    }

    #[test]
    fn test_group_rendering_keeps_accumulator_order() {
        let group = Group {
            key: GroupKey::Computed(Expr::array_elem_at(Expr::field("champion.roles"), 0)),
            accumulators: vec![
                ("count".to_string(), Accumulator::count()),
                ("kills".to_string(), Accumulator::sum("stats.kills")),
            ],
        };

        let rendered = Stage::Group(group).to_mql();
        let body = rendered["$group"].as_object().unwrap();
        let keys: Vec<&String> = body.keys().collect();
        assert_eq!(keys, vec!["_id", "count", "kills"]);
        assert_eq!(
            body["_id"],
            json!({"$arrayElemAt": ["$champion.roles", 0]})
        );
        assert_eq!(body["count"], json!({"$sum": 1}));
    }

    #[test]
    fn test_group_none_key_renders_null() {
        let group = Group {
            key: GroupKey::None,
            accumulators: vec![],
        };
        assert_eq!(group.to_mql(), json!({"_id": null}));
    }

    #[test]
    fn test_stage_rendering() {
        assert_eq!(
            Stage::Unwind("allyTeam".into()).to_mql(),
            json!({"$unwind": "$allyTeam"})
        );
        assert_eq!(
            Stage::sort_desc("count").to_mql(),
            json!({"$sort": {"count": -1}})
        );
        assert_eq!(Stage::Limit(5).to_mql(), json!({"$limit": 5}));
        assert_eq!(
            Stage::Project(vec![
                ("_id".to_string(), ProjectField::Exclude),
                ("role".to_string(), ProjectField::Computed(Expr::field("_id"))),
                ("count".to_string(), ProjectField::Include),
            ])
            .to_mql(),
            json!({"$project": {"_id": 0, "role": "$_id", "count": 1}})
        );
    }
}
