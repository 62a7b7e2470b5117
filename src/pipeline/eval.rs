//! In-memory Pipeline Evaluation
//!
//! Runs a [`PipelineSpec`] over JSON documents with MongoDB-like semantics,
//! for stores that keep their records in process.
//!
//! # Semantics
//!
//! - A missing field reads as `null`. `$eq null`, `$ne` and `$nin` match
//!   documents without the field.
//! - Ordering comparisons (`$gt`, `$gte`, ...) only match values of the
//!   same type class (number/number, string/string).
//! - Numbers compare by value, so `1 == 1.0`.
//! - Strings that both parse as RFC 3339 timestamps compare as instants.
//! - Groups are emitted in order of first appearance and `$sort` is
//!   stable, so evaluation is deterministic.

use crate::pipeline::composer::PipelineSpec;
use crate::pipeline::error::{PipelineError, PipelineResult};
use crate::pipeline::stage::{
    Accumulator, Expr, FieldPath, Group, GroupKey, Operator, Predicate, ProjectField, SortOrder,
    Stage,
};
use chrono::DateTime;
use serde_json::{Map, Number, Value};
use std::cmp::Ordering;
use std::collections::HashMap;

/// A stored or intermediate document
pub type Document = Map<String, Value>;

/// Run every stage of `pipeline` over `docs`
pub fn evaluate(
    pipeline: &PipelineSpec,
    docs: impl IntoIterator<Item = Document>,
) -> PipelineResult<Vec<Document>> {
    let mut docs: Vec<Document> = docs.into_iter().collect();
    for stage in pipeline.stages() {
        docs = apply_stage(stage, docs)?;
    }
    Ok(docs)
}

/// Run one stage
pub fn apply_stage(stage: &Stage, docs: Vec<Document>) -> PipelineResult<Vec<Document>> {
    match stage {
        Stage::Match(predicate) => Ok(docs
            .into_iter()
            .filter(|doc| matches(predicate, doc))
            .collect()),
        Stage::Unwind(path) => Ok(exec_unwind(docs, path)),
        Stage::Group(group) => exec_group(docs, group),
        Stage::Sort(keys) => Ok(exec_sort(docs, keys)),
        Stage::Limit(n) => Ok(docs.into_iter().take(*n as usize).collect()),
        Stage::Project(fields) => docs
            .into_iter()
            .map(|doc| exec_project(doc, fields))
            .collect(),
        Stage::AddFields(fields) => docs
            .into_iter()
            .map(|mut doc| {
                for (name, expr) in fields {
                    let value = eval_expr(expr, &doc)?;
                    set_field(&mut doc, &FieldPath::new(name.clone()), value);
                }
                Ok(doc)
            })
            .collect(),
    }
}

/// Read the value at a dotted path
pub fn resolve_field<'a>(doc: &'a Document, path: &FieldPath) -> Option<&'a Value> {
    let mut segments = path.segments();
    let mut current = doc.get(segments.next()?)?;
    for segment in segments {
        current = current.as_object()?.get(segment)?;
    }
    Some(current)
}

/// Write a value at a dotted path, creating intermediate objects
pub fn set_field(doc: &mut Document, path: &FieldPath, value: Value) {
    let segments: Vec<&str> = path.segments().collect();
    let Some((last, parents)) = segments.split_last() else {
        return;
    };

    let mut current = doc;
    for segment in parents {
        let entry = current
            .entry(segment.to_string())
            .or_insert_with(|| Value::Object(Map::new()));
        if !entry.is_object() {
            *entry = Value::Object(Map::new());
        }
        current = match entry {
            Value::Object(map) => map,
            _ => return,
        };
    }
    current.insert(last.to_string(), value);
}

/// Whether a document satisfies a predicate
pub fn matches(predicate: &Predicate, doc: &Document) -> bool {
    match predicate {
        Predicate::Compare { field, op, value } => {
            let actual = resolve_field(doc, field).unwrap_or(&Value::Null);
            match op {
                Operator::Eq => compare_values(actual, value) == Ordering::Equal,
                Operator::Ne => compare_values(actual, value) != Ordering::Equal,
                Operator::Gt | Operator::Gte | Operator::Lt | Operator::Lte => {
                    if type_class(actual) != type_class(value) || actual.is_null() {
                        return false;
                    }
                    let ord = compare_values(actual, value);
                    match op {
                        Operator::Gt => ord == Ordering::Greater,
                        Operator::Gte => ord != Ordering::Less,
                        Operator::Lt => ord == Ordering::Less,
                        _ => ord != Ordering::Greater,
                    }
                }
            }
        }
        Predicate::In(field, values) => {
            let actual = resolve_field(doc, field).unwrap_or(&Value::Null);
            values
                .iter()
                .any(|v| compare_values(actual, v) == Ordering::Equal)
        }
        Predicate::NotIn(field, values) => {
            let actual = resolve_field(doc, field).unwrap_or(&Value::Null);
            values
                .iter()
                .all(|v| compare_values(actual, v) != Ordering::Equal)
        }
        Predicate::And(clauses) => clauses.iter().all(|clause| matches(clause, doc)),
    }
}

/// Evaluate an aggregation expression against a document
pub fn eval_expr(expr: &Expr, doc: &Document) -> PipelineResult<Value> {
    match expr {
        Expr::Field(path) => Ok(resolve_field(doc, path).cloned().unwrap_or(Value::Null)),
        Expr::Literal(value) => Ok(value.clone()),
        Expr::Eq(left, right) => {
            let l = eval_expr(left, doc)?;
            let r = eval_expr(right, doc)?;
            Ok(Value::Bool(compare_values(&l, &r) == Ordering::Equal))
        }
        Expr::Cond {
            when,
            then,
            otherwise,
        } => {
            if is_truthy(&eval_expr(when, doc)?) {
                eval_expr(then, doc)
            } else {
                eval_expr(otherwise, doc)
            }
        }
        Expr::ArrayElemAt(array, index) => match eval_expr(array, doc)? {
            Value::Null => Ok(Value::Null),
            Value::Array(items) => {
                let len = items.len() as i64;
                let idx = if *index < 0 { len + index } else { *index };
                if idx < 0 || idx >= len {
                    Ok(Value::Null)
                } else {
                    Ok(items[idx as usize].clone())
                }
            }
            other => Err(PipelineError::Evaluation(format!(
                "$arrayElemAt expects an array, found {}",
                type_name(&other)
            ))),
        },
    }
}

/// Total order over JSON values, following BSON type order
/// (null < numbers < strings < objects < arrays < booleans)
pub fn compare_values(a: &Value, b: &Value) -> Ordering {
    let class = type_class(a).cmp(&type_class(b));
    if class != Ordering::Equal {
        return class;
    }

    match (a, b) {
        (Value::Number(x), Value::Number(y)) => compare_numbers(x, y),
        (Value::String(x), Value::String(y)) => compare_strings(x, y),
        (Value::Bool(x), Value::Bool(y)) => x.cmp(y),
        (Value::Array(x), Value::Array(y)) => {
            for (l, r) in x.iter().zip(y.iter()) {
                let ord = compare_values(l, r);
                if ord != Ordering::Equal {
                    return ord;
                }
            }
            x.len().cmp(&y.len())
        }
        (Value::Object(x), Value::Object(y)) => {
            for ((lk, lv), (rk, rv)) in x.iter().zip(y.iter()) {
                let ord = lk.cmp(rk).then_with(|| compare_values(lv, rv));
                if ord != Ordering::Equal {
                    return ord;
                }
            }
            x.len().cmp(&y.len())
        }
        _ => Ordering::Equal,
    }
}

fn compare_numbers(x: &Number, y: &Number) -> Ordering {
    match (x.as_i64(), y.as_i64()) {
        (Some(a), Some(b)) => a.cmp(&b),
        _ => {
            let a = x.as_f64().unwrap_or(f64::NAN);
            let b = y.as_f64().unwrap_or(f64::NAN);
            a.partial_cmp(&b).unwrap_or(Ordering::Equal)
        }
    }
}

fn compare_strings(x: &str, y: &str) -> Ordering {
    if let (Ok(a), Ok(b)) = (DateTime::parse_from_rfc3339(x), DateTime::parse_from_rfc3339(y)) {
        return a.cmp(&b);
    }
    x.cmp(y)
}

fn type_class(value: &Value) -> u8 {
    match value {
        Value::Null => 0,
        Value::Number(_) => 1,
        Value::String(_) => 2,
        Value::Object(_) => 3,
        Value::Array(_) => 4,
        Value::Bool(_) => 5,
    }
}

fn type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Object(_) => "object",
        Value::Array(_) => "array",
        Value::Bool(_) => "bool",
    }
}

fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().map(|f| f != 0.0).unwrap_or(true),
        _ => true,
    }
}

fn exec_unwind(docs: Vec<Document>, path: &FieldPath) -> Vec<Document> {
    let mut result = Vec::new();
    for doc in docs {
        match resolve_field(&doc, path).cloned() {
            Some(Value::Array(items)) => {
                for item in items {
                    let mut unwound = doc.clone();
                    set_field(&mut unwound, path, item);
                    result.push(unwound);
                }
            }
            None | Some(Value::Null) => {}
            // A scalar behaves like a one-element array
            Some(_) => result.push(doc),
        }
    }
    result
}

/// Running state of one accumulator within one group
enum AccumulatorState {
    Sum { int: i64, float: f64, is_float: bool },
    Avg { sum: f64, count: u64 },
    Extreme(Option<Value>),
    First(Option<Value>),
}

impl AccumulatorState {
    fn new(acc: &Accumulator) -> Self {
        match acc {
            Accumulator::Sum(_) => Self::Sum {
                int: 0,
                float: 0.0,
                is_float: false,
            },
            Accumulator::Avg(_) => Self::Avg { sum: 0.0, count: 0 },
            Accumulator::Max(_) | Accumulator::Min(_) => Self::Extreme(None),
            Accumulator::First(_) => Self::First(None),
        }
    }

    fn update(&mut self, acc: &Accumulator, value: Value) {
        match self {
            Self::Sum {
                int,
                float,
                is_float,
            } => {
                if let Value::Number(n) = &value {
                    match n.as_i64() {
                        Some(i) if !*is_float => match int.checked_add(i) {
                            Some(total) => *int = total,
                            None => {
                                *is_float = true;
                                *float = *int as f64 + i as f64;
                            }
                        },
                        _ => {
                            if !*is_float {
                                *is_float = true;
                                *float = *int as f64;
                            }
                            *float += n.as_f64().unwrap_or(0.0);
                        }
                    }
                }
            }
            Self::Avg { sum, count } => {
                if let Some(n) = value.as_f64() {
                    *sum += n;
                    *count += 1;
                }
            }
            Self::Extreme(current) => {
                if value.is_null() {
                    return;
                }
                let wanted = match acc {
                    Accumulator::Min(_) => Ordering::Less,
                    _ => Ordering::Greater,
                };
                let replace = match current {
                    None => true,
                    Some(cur) => compare_values(&value, cur) == wanted,
                };
                if replace {
                    *current = Some(value);
                }
            }
            Self::First(current) => {
                if current.is_none() {
                    *current = Some(value);
                }
            }
        }
    }

    fn finish(self) -> Value {
        match self {
            Self::Sum {
                int,
                float,
                is_float,
            } => {
                if is_float {
                    float_value(float)
                } else {
                    Value::from(int)
                }
            }
            Self::Avg { sum, count } => {
                if count == 0 {
                    Value::Null
                } else {
                    float_value(sum / count as f64)
                }
            }
            Self::Extreme(v) | Self::First(v) => v.unwrap_or(Value::Null),
        }
    }
}

fn float_value(n: f64) -> Value {
    Number::from_f64(n).map(Value::Number).unwrap_or(Value::Null)
}

fn group_key(key: &GroupKey, doc: &Document) -> PipelineResult<Value> {
    match key {
        GroupKey::None => Ok(Value::Null),
        GroupKey::Field(path) => Ok(resolve_field(doc, path).cloned().unwrap_or(Value::Null)),
        GroupKey::Computed(expr) => eval_expr(expr, doc),
    }
}

fn exec_group(docs: Vec<Document>, group: &Group) -> PipelineResult<Vec<Document>> {
    let mut index: HashMap<String, usize> = HashMap::new();
    let mut buckets: Vec<(Value, Vec<AccumulatorState>)> = Vec::new();

    for doc in &docs {
        let key = group_key(&group.key, doc)?;
        let canonical = canonical_key(&key);

        let slot = match index.get(&canonical) {
            Some(&slot) => slot,
            None => {
                let states = group
                    .accumulators
                    .iter()
                    .map(|(_, acc)| AccumulatorState::new(acc))
                    .collect();
                buckets.push((key, states));
                index.insert(canonical, buckets.len() - 1);
                buckets.len() - 1
            }
        };

        let states = &mut buckets[slot].1;
        for ((_, acc), state) in group.accumulators.iter().zip(states.iter_mut()) {
            let value = eval_expr(acc.expr(), doc)?;
            state.update(acc, value);
        }
    }

    Ok(buckets
        .into_iter()
        .map(|(key, states)| {
            let mut out = Document::new();
            out.insert("_id".to_string(), key);
            for ((name, _), state) in group.accumulators.iter().zip(states) {
                out.insert(name.clone(), state.finish());
            }
            out
        })
        .collect())
}

/// Key string under which equal group keys collide (`1` and `1.0` included)
fn canonical_key(key: &Value) -> String {
    match key {
        Value::Number(n) => match n.as_f64() {
            Some(f) if f.fract() == 0.0 && f.abs() < 9.0e15 => format!("n:{}", f as i64),
            _ => format!("n:{}", n),
        },
        other => other.to_string(),
    }
}

fn exec_sort(mut docs: Vec<Document>, keys: &[(FieldPath, SortOrder)]) -> Vec<Document> {
    docs.sort_by(|a, b| {
        for (path, order) in keys {
            let av = resolve_field(a, path).unwrap_or(&Value::Null);
            let bv = resolve_field(b, path).unwrap_or(&Value::Null);
            let ord = match order {
                SortOrder::Ascending => compare_values(av, bv),
                SortOrder::Descending => compare_values(av, bv).reverse(),
            };
            if ord != Ordering::Equal {
                return ord;
            }
        }
        Ordering::Equal
    });
    docs
}

fn exec_project(doc: Document, fields: &[(String, ProjectField)]) -> PipelineResult<Document> {
    // `_id` may be excluded from an inclusion projection and included in an
    // exclusion one; on its own, `_id: 1` is still an inclusion
    let includes_other = fields.iter().any(|(name, field)| match field {
        ProjectField::Include => name != "_id",
        ProjectField::Computed(_) => true,
        ProjectField::Exclude => false,
    });
    let excludes_other = fields
        .iter()
        .any(|(name, field)| name != "_id" && matches!(field, ProjectField::Exclude));
    let includes_id = fields
        .iter()
        .any(|(name, field)| name == "_id" && matches!(field, ProjectField::Include));
    let inclusion = includes_other || (includes_id && !excludes_other);

    if !inclusion {
        let mut out = doc;
        for (name, field) in fields {
            if matches!(field, ProjectField::Exclude) {
                out.remove(name.as_str());
            }
        }
        return Ok(out);
    }

    let id_excluded = fields
        .iter()
        .any(|(name, field)| name == "_id" && matches!(field, ProjectField::Exclude));

    let mut out = Document::new();
    if !id_excluded {
        if let Some(id) = doc.get("_id") {
            out.insert("_id".to_string(), id.clone());
        }
    }
    for (name, field) in fields {
        match field {
            ProjectField::Include => {
                let path = FieldPath::new(name.clone());
                if let Some(value) = resolve_field(&doc, &path) {
                    let value = value.clone();
                    set_field(&mut out, &path, value);
                }
            }
            ProjectField::Computed(expr) => {
                let value = eval_expr(expr, &doc)?;
                out.insert(name.clone(), value);
            }
            ProjectField::Exclude => {}
        }
    }
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn doc(value: Value) -> Document {
        match value {
            Value::Object(map) => map,
            other => panic!("not an object: {}", other),
        }
    }

    #[test]
    fn test_resolve_nested_and_missing() {
        let d = doc(json!({"stats": {"kills": 7}}));
        assert_eq!(
            resolve_field(&d, &FieldPath::from_static("stats.kills")),
            Some(&json!(7))
        );
        assert_eq!(resolve_field(&d, &FieldPath::from_static("stats.gold")), None);
        assert_eq!(resolve_field(&d, &FieldPath::from_static("role.x")), None);
    }

    #[test]
    fn test_set_field_creates_parents() {
        let mut d = Document::new();
        set_field(&mut d, &FieldPath::from_static("a.b"), json!(1));
        assert_eq!(Value::Object(d), json!({"a": {"b": 1}}));
    }

    #[test]
    fn test_match_semantics() {
        let d = doc(json!({"result": "Win", "gamemode": 420, "count": 2}));

        assert!(matches(&Predicate::eq("result", "Win"), &d));
        assert!(matches(&Predicate::ne("result", "Remake"), &d));
        assert!(matches(&Predicate::not_in("gamemode", [800, 810]), &d));
        assert!(!matches(&Predicate::not_in("gamemode", [420]), &d));
        assert!(matches(&Predicate::one_of("gamemode", [420.0]), &d));
        assert!(matches(&Predicate::gte("count", 2), &d));
        assert!(!matches(&Predicate::gte("count", 3), &d));
        // Missing field: equal to null, never ordered
        assert!(matches(&Predicate::eq("role", Value::Null), &d));
        assert!(matches(&Predicate::ne("role", "NONE"), &d));
        assert!(!matches(&Predicate::gte("missing", 0), &d));
        // Ordering comparisons do not cross types
        assert!(!matches(&Predicate::gte("result", 0), &d));
    }

    #[test]
    fn test_compare_values_type_order() {
        assert_eq!(compare_values(&json!(null), &json!(0)), Ordering::Less);
        assert_eq!(compare_values(&json!(5), &json!("a")), Ordering::Less);
        assert_eq!(compare_values(&json!(1), &json!(1.0)), Ordering::Equal);
        assert_eq!(compare_values(&json!(2.5), &json!(2)), Ordering::Greater);
        assert_eq!(compare_values(&json!(true), &json!([1])), Ordering::Greater);
    }

    #[test]
    fn test_compare_rfc3339_strings_as_instants() {
        let earlier = json!("2024-01-15T14:35:42Z");
        let later = json!("2024-01-15T14:35:42.500Z");
        assert_eq!(compare_values(&earlier, &later), Ordering::Less);
    }

    #[test]
    fn test_array_elem_at() {
        let d = doc(json!({"roles": ["Mage", "Support"], "name": "x"}));
        let at = |i| eval_expr(&Expr::array_elem_at(Expr::field("roles"), i), &d).unwrap();
        assert_eq!(at(0), json!("Mage"));
        assert_eq!(at(-1), json!("Support"));
        assert_eq!(at(5), Value::Null);

        let missing = eval_expr(&Expr::array_elem_at(Expr::field("nope"), 0), &d).unwrap();
        assert_eq!(missing, Value::Null);

        let err = eval_expr(&Expr::array_elem_at(Expr::field("name"), 0), &d).unwrap_err();
        assert!(matches!(err, PipelineError::Evaluation(_)));
    }

    #[test]
    fn test_group_accumulators() {
        let docs = vec![
            doc(json!({"k": "a", "v": 1, "f": 1.5, "d": "2024-01-01T00:00:00Z"})),
            doc(json!({"k": "b", "v": 10, "f": 2.0, "d": "2024-03-01T00:00:00Z"})),
            doc(json!({"k": "a", "v": 2, "f": 2.5, "d": "2024-02-01T00:00:00Z"})),
            doc(json!({"k": "a", "f": "n/a"})),
        ];
        let group = Group {
            key: GroupKey::Field("k".into()),
            accumulators: vec![
                ("n".to_string(), Accumulator::count()),
                ("sum".to_string(), Accumulator::sum("v")),
                ("fsum".to_string(), Accumulator::sum("f")),
                ("avg".to_string(), Accumulator::avg("f")),
                ("last".to_string(), Accumulator::max("d")),
                ("first".to_string(), Accumulator::first("v")),
            ],
        };

        let out = exec_group(docs, &group).unwrap();
        assert_eq!(out.len(), 2);
        assert_eq!(out[0]["_id"], json!("a"));
        assert_eq!(out[0]["n"], json!(3));
        assert_eq!(out[0]["sum"], json!(3));
        assert_eq!(out[0]["fsum"], json!(4.0));
        assert_eq!(out[0]["avg"], json!(2.0));
        assert_eq!(out[0]["last"], json!("2024-02-01T00:00:00Z"));
        assert_eq!(out[0]["first"], json!(1));
        assert_eq!(out[1]["_id"], json!("b"));
        assert_eq!(out[1]["n"], json!(1));
    }

    #[test]
    fn test_group_numeric_keys_collide() {
        let docs = vec![doc(json!({"k": 1})), doc(json!({"k": 1.0}))];
        let group = Group {
            key: GroupKey::Field("k".into()),
            accumulators: vec![("n".to_string(), Accumulator::count())],
        };
        let out = exec_group(docs, &group).unwrap();
        assert_eq!(out.len(), 1);
        assert_eq!(out[0]["n"], json!(2));
    }

    #[test]
    fn test_avg_with_no_numbers_is_null() {
        let group = Group {
            key: GroupKey::None,
            accumulators: vec![("avg".to_string(), Accumulator::avg("x"))],
        };
        let out = exec_group(vec![doc(json!({"y": 1}))], &group).unwrap();
        assert_eq!(out[0]["_id"], Value::Null);
        assert_eq!(out[0]["avg"], Value::Null);
    }

    #[test]
    fn test_unwind() {
        let docs = vec![
            doc(json!({"id": 1, "xs": [{"a": 1}, {"a": 2}]})),
            doc(json!({"id": 2, "xs": []})),
            doc(json!({"id": 3})),
            doc(json!({"id": 4, "xs": {"a": 9}})),
        ];
        let out = exec_unwind(docs, &FieldPath::from_static("xs"));
        assert_eq!(out.len(), 3);
        assert_eq!(out[0]["xs"], json!({"a": 1}));
        assert_eq!(out[1]["xs"], json!({"a": 2}));
        assert_eq!(out[2]["id"], json!(4));
    }

    #[test]
    fn test_sort_desc_is_stable() {
        let docs = vec![
            doc(json!({"id": "a", "count": 1})),
            doc(json!({"id": "b", "count": 3})),
            doc(json!({"id": "c", "count": 1})),
        ];
        let out = exec_sort(
            docs,
            &[(FieldPath::from_static("count"), SortOrder::Descending)],
        );
        let ids: Vec<&Value> = out.iter().map(|d| &d["id"]).collect();
        assert_eq!(ids, vec!["b", "a", "c"]);
    }

    #[test]
    fn test_project_inclusion_renames_id() {
        let d = doc(json!({"_id": "TOP", "count": 4, "wins": 2, "losses": 2, "extra": 1}));
        let out = exec_project(
            d,
            &[
                ("_id".to_string(), ProjectField::Exclude),
                ("role".to_string(), ProjectField::Computed(Expr::field("_id"))),
                ("count".to_string(), ProjectField::Include),
                ("wins".to_string(), ProjectField::Include),
            ],
        )
        .unwrap();
        assert_eq!(Value::Object(out), json!({"role": "TOP", "count": 4, "wins": 2}));
    }

    #[test]
    fn test_project_id_only_is_inclusion() {
        let d = doc(json!({"_id": 1, "a": 2}));
        let out = exec_project(d, &[("_id".to_string(), ProjectField::Include)]).unwrap();
        assert_eq!(Value::Object(out), json!({"_id": 1}));
    }

    #[test]
    fn test_project_exclusion_keeps_included_id() {
        let d = doc(json!({"_id": 1, "a": 2, "b": 3}));
        let out = exec_project(
            d,
            &[
                ("_id".to_string(), ProjectField::Include),
                ("b".to_string(), ProjectField::Exclude),
            ],
        )
        .unwrap();
        assert_eq!(Value::Object(out), json!({"_id": 1, "a": 2}));
    }

    #[test]
    fn test_project_exclusion() {
        let d = doc(json!({"_id": 1, "a": 1, "b": 2}));
        let out = exec_project(d, &[("b".to_string(), ProjectField::Exclude)]).unwrap();
        assert_eq!(Value::Object(out), json!({"_id": 1, "a": 1}));
    }

    #[test]
    fn test_add_fields_and_limit() {
        let docs = vec![
            doc(json!({"x": "a", "y": "a"})),
            doc(json!({"x": "a", "y": "b"})),
        ];
        let stage = Stage::AddFields(vec![(
            "same".to_string(),
            Expr::eq(Expr::field("x"), Expr::field("y")),
        )]);
        let out = apply_stage(&stage, docs).unwrap();
        assert_eq!(out[0]["same"], json!(true));
        assert_eq!(out[1]["same"], json!(false));

        let out = apply_stage(&Stage::Limit(1), out).unwrap();
        assert_eq!(out.len(), 1);
    }
}
