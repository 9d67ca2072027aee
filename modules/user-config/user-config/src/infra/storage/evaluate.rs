//! In-process query evaluation shared by the repository adapters.
//!
//! Records are matched against a JSON rendering of themselves, so condition
//! keys are dotted paths such as `data.color` or `tags.env`.

use std::cmp::Ordering;
use std::collections::BTreeMap;

use serde_json::{Map, Number, Value};
use time::OffsetDateTime;
use time::format_description::well_known::Rfc3339;
use user_config_sdk::{
    AggregateField, AggregateOperator, Condition, Operator, Page, Query, Sort, StatQuery,
    UserConfig, UserConfigsPage,
};

use crate::domain::error::DomainError;

fn to_document(record: &UserConfig) -> Result<Value, DomainError> {
    serde_json::to_value(record).map_err(|e| DomainError::database(e.to_string()))
}

fn lookup<'a>(doc: &'a Value, path: &str) -> Option<&'a Value> {
    path.split('.')
        .try_fold(doc, |current, segment| current.as_object()?.get(segment))
        .filter(|v| !v.is_null())
}

fn timestamp(value: &str) -> Option<OffsetDateTime> {
    OffsetDateTime::parse(value, &Rfc3339).ok()
}

/// Numbers compare by value, strings that are both RFC 3339 timestamps
/// compare as instants.
fn compare(a: &Value, b: &Value) -> Option<Ordering> {
    match (a, b) {
        (Value::Number(x), Value::Number(y)) => x.as_f64()?.partial_cmp(&y.as_f64()?),
        (Value::String(x), Value::String(y)) => match (timestamp(x), timestamp(y)) {
            (Some(tx), Some(ty)) => Some(tx.cmp(&ty)),
            _ => Some(x.cmp(y)),
        },
        (Value::Bool(x), Value::Bool(y)) => Some(x.cmp(y)),
        _ => None,
    }
}

fn equals(a: &Value, b: &Value) -> bool {
    match compare(a, b) {
        Some(ord) => ord == Ordering::Equal,
        None => a == b,
    }
}

fn is_member(field: Option<&Value>, set: &Value) -> bool {
    let field = field.unwrap_or(&Value::Null);
    set.as_array()
        .is_some_and(|items| items.iter().any(|item| equals(field, item)))
}

fn type_rank(value: Option<&Value>) -> u8 {
    match value {
        None | Some(Value::Null) => 0,
        Some(Value::Bool(_)) => 1,
        Some(Value::Number(_)) => 2,
        Some(Value::String(_)) => 3,
        Some(Value::Array(_)) => 4,
        Some(Value::Object(_)) => 5,
    }
}

/// Total order used for sorting: missing < bool < number < string < array < object.
fn sort_order(a: Option<&Value>, b: Option<&Value>) -> Ordering {
    match (a, b) {
        (Some(x), Some(y)) => compare(x, y).unwrap_or_else(|| type_rank(a).cmp(&type_rank(b))),
        _ => type_rank(a).cmp(&type_rank(b)),
    }
}

fn contains(field: &Value, needle: &Value) -> bool {
    match (field, needle) {
        (Value::String(haystack), Value::String(n)) => {
            haystack.to_lowercase().contains(&n.to_lowercase())
        }
        (Value::Array(items), n) => items.contains(n),
        _ => false,
    }
}

fn matches_condition(doc: &Value, cond: &Condition) -> bool {
    let field = lookup(doc, &cond.key);
    let expected = &cond.value;

    match cond.operator {
        Operator::Eq => equals(field.unwrap_or(&Value::Null), expected),
        Operator::Not => !equals(field.unwrap_or(&Value::Null), expected),
        Operator::In => is_member(field, expected),
        Operator::NotIn => !is_member(field, expected),
        Operator::Contain => field.is_some_and(|f| contains(f, expected)),
        Operator::NotContain => !field.is_some_and(|f| contains(f, expected)),
        Operator::Lt => field.and_then(|f| compare(f, expected)) == Some(Ordering::Less),
        Operator::Lte => matches!(
            field.and_then(|f| compare(f, expected)),
            Some(Ordering::Less | Ordering::Equal)
        ),
        Operator::Gt => field.and_then(|f| compare(f, expected)) == Some(Ordering::Greater),
        Operator::Gte => matches!(
            field.and_then(|f| compare(f, expected)),
            Some(Ordering::Greater | Ordering::Equal)
        ),
        Operator::Exists => field.is_some() == expected.as_bool().unwrap_or(true),
    }
}

fn matches(doc: &Value, filter: &[Condition], filter_or: &[Condition]) -> bool {
    filter.iter().all(|c| matches_condition(doc, c))
        && (filter_or.is_empty() || filter_or.iter().any(|c| matches_condition(doc, c)))
}

fn to_usize(n: u64) -> usize {
    usize::try_from(n).unwrap_or(usize::MAX)
}

fn paginate<T>(items: Vec<T>, page: Option<Page>) -> Vec<T> {
    let Some(page) = page else {
        return items;
    };
    let skip = to_usize(page.start.unwrap_or(1).saturating_sub(1));
    let take = page.limit.map_or(usize::MAX, to_usize);
    items.into_iter().skip(skip).take(take).collect()
}

fn sort_docs<T>(items: &mut [(Value, T)], sort: Option<&Sort>) {
    if let Some(sort) = sort {
        items.sort_by(|(a, _), (b, _)| {
            let ord = sort_order(lookup(a, &sort.key), lookup(b, &sort.key));
            if sort.desc { ord.reverse() } else { ord }
        });
    }
}

fn filtered(
    records: Vec<UserConfig>,
    filter: &[Condition],
    filter_or: &[Condition],
) -> Result<Vec<(Value, UserConfig)>, DomainError> {
    let mut out = Vec::new();
    for record in records {
        let doc = to_document(&record)?;
        if matches(&doc, filter, filter_or) {
            out.push((doc, record));
        }
    }
    Ok(out)
}

/// Apply filters, sort and pagination of a list query.
pub fn select(records: Vec<UserConfig>, query: &Query) -> Result<UserConfigsPage, DomainError> {
    let mut matched = filtered(records, &query.filter, &query.filter_or)?;
    let total_count = u64::try_from(matched.len()).unwrap_or(u64::MAX);

    sort_docs(&mut matched, query.sort.as_ref());
    let items = paginate(matched, query.page)
        .into_iter()
        .map(|(_, record)| record)
        .collect();

    Ok(UserConfigsPage { items, total_count })
}

struct Group<'a> {
    keys: Vec<Value>,
    docs: Vec<&'a Value>,
}

fn number(value: f64) -> Value {
    Number::from_f64(value).map_or(Value::Null, Value::Number)
}

fn count_value(n: usize) -> Value {
    Value::from(u64::try_from(n).unwrap_or(u64::MAX))
}

fn aggregate_field(field: &AggregateField, docs: &[&Value]) -> Value {
    let key = field.key.as_deref().unwrap_or_default();
    let values: Vec<&Value> = docs.iter().filter_map(|d| lookup(d, key)).collect();
    let numbers: Vec<&Number> = values
        .iter()
        .filter_map(|v| match v {
            Value::Number(n) => Some(n),
            _ => None,
        })
        .collect();

    match field.operator {
        AggregateOperator::Count => count_value(docs.len()),
        AggregateOperator::Sum => {
            let ints: Option<Vec<i64>> = numbers.iter().map(|n| n.as_i64()).collect();
            match ints.and_then(|v| v.into_iter().try_fold(0_i64, i64::checked_add)) {
                Some(total) => Value::from(total),
                None => number(numbers.iter().filter_map(|n| n.as_f64()).sum()),
            }
        }
        AggregateOperator::Average => {
            if numbers.is_empty() {
                return Value::Null;
            }
            let sum: f64 = numbers.iter().filter_map(|n| n.as_f64()).sum();
            let count = f64::from(u32::try_from(numbers.len()).unwrap_or(u32::MAX));
            number(sum / count)
        }
        AggregateOperator::Min => values
            .iter()
            .min_by(|a, b| sort_order(Some(**a), Some(**b)))
            .map_or(Value::Null, |v| (*v).clone()),
        AggregateOperator::Max => values
            .iter()
            .max_by(|a, b| sort_order(Some(**a), Some(**b)))
            .map_or(Value::Null, |v| (*v).clone()),
        AggregateOperator::AddToSet => {
            let mut set: Vec<Value> = Vec::new();
            for v in values {
                if !set.contains(v) {
                    set.push(v.clone());
                }
            }
            Value::Array(set)
        }
    }
}

/// Group the matching records and compute one output row per group.
///
/// Rows are ordered by their group key values unless the query sorts by an
/// output column. No matching records yields no rows.
pub fn aggregate(records: Vec<UserConfig>, query: &StatQuery) -> Result<Vec<Value>, DomainError> {
    let matched = filtered(records, &query.filter, &query.filter_or)?;
    if matched.is_empty() {
        return Ok(Vec::new());
    }

    let layout = &query.aggregate;
    let mut groups: BTreeMap<String, Group<'_>> = BTreeMap::new();
    for (doc, _) in &matched {
        let keys: Vec<Value> = layout
            .group_by
            .iter()
            .map(|g| lookup(doc, &g.key).cloned().unwrap_or(Value::Null))
            .collect();
        let group_id = Value::Array(keys.clone()).to_string();
        groups
            .entry(group_id)
            .or_insert_with(|| Group {
                keys,
                docs: Vec::new(),
            })
            .docs
            .push(doc);
    }

    let mut rows: Vec<(Value, ())> = groups
        .into_values()
        .map(|group| {
            let mut row = Map::new();
            for (g, value) in layout.group_by.iter().zip(group.keys) {
                row.insert(g.name.clone(), value);
            }
            for field in &layout.fields {
                row.insert(field.name.clone(), aggregate_field(field, &group.docs));
            }
            (Value::Object(row), ())
        })
        .collect();

    sort_docs(&mut rows, query.sort.as_ref());
    Ok(paginate(rows, query.page)
        .into_iter()
        .map(|(row, ())| row)
        .collect())
}

/// Keep only the projected fields of a record.
///
/// Identity fields and timestamps are always present; `data` and `tags` are
/// emptied unless selected.
#[must_use]
pub fn project(mut record: UserConfig, only: Option<&[String]>) -> UserConfig {
    if let Some(only) = only {
        let selected = |field: &str| only.iter().any(|f| f == field);
        if !selected("data") {
            record.data = Map::new();
        }
        if !selected("tags") {
            record.tags = BTreeMap::new();
        }
    }
    record
}
