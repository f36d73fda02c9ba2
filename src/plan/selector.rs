//! Index selection.
//!
//! Given the predicates of one query, pick the access path (base table,
//! secondary index or scan) and split the predicates into a key condition and
//! filter conditions. Planning never fails: predicates it cannot use are
//! reported in [`QueryPlan::dropped_predicates`].

use crate::{
    common::{self, codec::ValueCodec, condition::Term, value::Value},
    error::BuildError,
    plan::predicate::{self, DropReason, DroppedPredicate, Predicate},
    schema::{
        composite,
        index::{CompositeKey, KeySpec, SecondaryIndex},
        operator::OperatorType,
        table::TableSchema,
    },
};

use aws_sdk_dynamodb::types;
use indexmap::{IndexMap, IndexSet};
use std::{collections, fmt, slice};

/// Access path of a planned request.
#[derive(Clone, Debug, Eq, Hash, PartialEq)]
pub enum Target {
    /// Query against the base table.
    Table,
    /// Query against the named secondary index.
    Index(String),
    /// Scan of the base table, or of the named index.
    Scan {
        /// Index to scan.
        index: Option<String>,
    },
}

impl Target {
    /// Name of the index the request runs against, if any.
    pub fn index_name(&self) -> Option<&str> {
        match self {
            Self::Table | Self::Scan { index: None } => None,
            Self::Index(name) | Self::Scan { index: Some(name) } => Some(name),
        }
    }

    /// Whether the request is a scan.
    pub const fn is_scan(&self) -> bool {
        matches!(self, Self::Scan { .. })
    }
}

impl fmt::Display for Target {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Table => f.write_str("table"),
            Self::Index(name) => write!(f, "index {name}"),
            Self::Scan { index: None } => f.write_str("scan"),
            Self::Scan { index: Some(name) } => write!(f, "scan of index {name}"),
        }
    }
}

/// Hash key term: always an equality.
#[derive(Clone, Debug, PartialEq)]
pub struct KeyTerm {
    /// Physical key attribute.
    pub attribute: String,
    /// Placeholder identifier.
    pub identifier: String,
    /// Key value; composite keys hold their resolved string.
    pub value: Value,
}

/// Range key term.
#[derive(Clone, Debug, PartialEq)]
pub struct RangeTerm {
    /// Physical key attribute.
    pub attribute: String,
    /// Placeholder identifier.
    pub identifier: String,
    /// Range-capable operator.
    pub operator: OperatorType,
    /// Operands.
    pub values: Vec<Value>,
}

/// Key condition of a query.
#[derive(Clone, Debug, PartialEq)]
pub struct KeyCondition {
    /// Hash key equality.
    pub hash: KeyTerm,
    /// Optional range key term.
    pub range: Option<RangeTerm>,
}

impl fmt::Display for KeyCondition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} = {}", self.hash.attribute, self.hash.value)?;
        if let Some(range) = &self.range {
            f.write_str(common::AND)?;
            predicate::fmt_condition(f, &range.attribute, range.operator, &range.values)?;
        }
        Ok(())
    }
}

/// Filter applied after the key condition or the scan.
#[derive(Clone, Debug, PartialEq)]
pub struct FilterCondition {
    /// Attribute name.
    pub attribute: String,
    /// Placeholder identifier.
    pub identifier: String,
    /// Operator, legal for the attribute's type.
    pub operator: OperatorType,
    /// Operands, count checked against the operator.
    pub values: Vec<Value>,
}

impl fmt::Display for FilterCondition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        predicate::fmt_condition(f, &self.attribute, self.operator, &self.values)
    }
}

/// Access path for one query.
#[derive(Clone, Debug, PartialEq)]
pub struct QueryPlan {
    /// Where the request runs.
    pub target: Target,
    /// Key condition; `None` for scans.
    pub key_condition: Option<KeyCondition>,
    /// Filters, in predicate order.
    pub filter_conditions: Vec<FilterCondition>,
    /// Predicates left out, in predicate order.
    pub dropped_predicates: Vec<DroppedPredicate>,
}

/// Expression strings and placeholder maps of a rendered plan.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Expressions {
    /// `KeyConditionExpression`; `None` for scans.
    pub key_condition_expression: Option<String>,
    /// `FilterExpression`.
    pub filter_expression: Option<String>,
    /// `ExpressionAttributeNames`.
    pub expression_attribute_names: Option<collections::HashMap<String, String>>,
    /// `ExpressionAttributeValues`.
    pub expression_attribute_values: Option<collections::HashMap<String, types::AttributeValue>>,
}

fn non_empty(expression: String) -> Option<String> {
    Some(expression).filter(|expression| !expression.is_empty())
}

impl QueryPlan {
    /// Render the plan into expression strings, encoding values with `codec`.
    ///
    /// Key terms come first, then filters; one placeholder counter runs
    /// across both so every value placeholder is unique.
    pub fn render<C: ValueCodec + ?Sized>(&self, codec: &C) -> Result<Expressions, BuildError> {
        let mut index = 0;
        let mut expressions = Expressions::default();

        if let Some(key_condition) = &self.key_condition {
            let mut terms = vec![Term {
                attribute: &key_condition.hash.attribute,
                identifier: &key_condition.hash.identifier,
                operator: OperatorType::Eq,
                values: slice::from_ref(&key_condition.hash.value),
            }];
            if let Some(range) = &key_condition.range {
                terms.push(Term {
                    attribute: &range.attribute,
                    identifier: &range.identifier,
                    operator: range.operator,
                    values: &range.values,
                });
            }
            let operation = Term::get_expression_operation(&terms, codec, &mut index)?;
            expressions.key_condition_expression = non_empty(operation.merge_into(
                &mut expressions.expression_attribute_names,
                &mut expressions.expression_attribute_values,
            ));
        }

        let terms: Vec<_> = self
            .filter_conditions
            .iter()
            .map(|filter| Term {
                attribute: &filter.attribute,
                identifier: &filter.identifier,
                operator: filter.operator,
                values: &filter.values,
            })
            .collect();
        let operation = Term::get_expression_operation(&terms, codec, &mut index)?;
        expressions.filter_expression = non_empty(operation.merge_into(
            &mut expressions.expression_attribute_names,
            &mut expressions.expression_attribute_values,
        ));
        Ok(expressions)
    }
}

struct Candidate {
    target: Target,
    hash_key: KeySpec,
    range_key: Option<KeySpec>,
}

struct Selection {
    target: Target,
    key_condition: KeyCondition,
    consumed: IndexSet<usize>,
}

/// First predicate on `attribute` usable as a key equality.
fn find_equality<'p>(
    schema: &TableSchema,
    predicates: &'p [Predicate],
    attribute: &str,
) -> Option<(usize, &'p Value)> {
    let field = schema.field(attribute)?;
    if !field.allows(OperatorType::Eq) {
        return None;
    }
    predicates
        .iter()
        .enumerate()
        .find_map(|(position, predicate)| match predicate.values.as_slice() {
            [value] if predicate.attribute == attribute && predicate.operator == OperatorType::Eq => {
                Some((position, value))
            }
            _ => None,
        })
}

/// Resolve a composite key from equality predicates on all its attribute parts.
fn match_composite(
    schema: &TableSchema,
    predicates: &[Predicate],
    key: &CompositeKey,
) -> Option<(String, Vec<usize>)> {
    let mut supplied = IndexMap::new();
    let mut positions = Vec::new();
    for attribute in key.non_constant_parts() {
        let (position, value) = find_equality(schema, predicates, attribute)?;
        supplied.insert(attribute, value);
        positions.push(position);
    }
    let resolved = composite::build(&key.parts, |name| supplied.get(name).copied()).ok()?;
    Some((resolved, positions))
}

fn match_hash(
    schema: &TableSchema,
    predicates: &[Predicate],
    spec: &KeySpec,
) -> Option<(KeyTerm, Vec<usize>)> {
    match spec {
        KeySpec::Simple(name) => {
            let (position, value) = find_equality(schema, predicates, name)?;
            let identifier = schema.identifier_of(name)?.to_string();
            let term = KeyTerm {
                attribute: name.clone(),
                identifier,
                value: value.clone(),
            };
            Some((term, vec![position]))
        }
        KeySpec::Composite(key) => {
            let (resolved, positions) = match_composite(schema, predicates, key)?;
            let term = KeyTerm {
                attribute: key.name.clone(),
                identifier: key.identifier.clone(),
                value: Value::String(resolved),
            };
            Some((term, positions))
        }
    }
}

fn match_range(
    schema: &TableSchema,
    predicates: &[Predicate],
    spec: &KeySpec,
    consumed: &IndexSet<usize>,
) -> Option<(RangeTerm, Vec<usize>)> {
    match spec {
        KeySpec::Simple(name) => {
            let field = schema.field(name)?;
            let (position, predicate) =
                predicates.iter().enumerate().find(|(position, predicate)| {
                    !consumed.contains(position)
                        && predicate.attribute == *name
                        && predicate.operator.is_range_capable()
                        && predicate.operator.accepts_arity(predicate.values.len())
                        && field.allows(predicate.operator)
                })?;
            let term = RangeTerm {
                attribute: name.clone(),
                identifier: field.identifier.clone(),
                operator: predicate.operator,
                values: predicate.values.clone(),
            };
            Some((term, vec![position]))
        }
        // composite parts may reuse equalities already consumed by the hash key
        KeySpec::Composite(key) => {
            let (resolved, positions) = match_composite(schema, predicates, key)?;
            let term = RangeTerm {
                attribute: key.name.clone(),
                identifier: key.identifier.clone(),
                operator: OperatorType::Eq,
                values: vec![Value::String(resolved)],
            };
            Some((term, positions))
        }
    }
}

fn candidates(schema: &TableSchema) -> Vec<Candidate> {
    let table = Candidate {
        target: Target::Table,
        hash_key: KeySpec::Simple(schema.hash_key().to_string()),
        range_key: schema
            .range_key()
            .map(|range_key| KeySpec::Simple(range_key.to_string())),
    };
    let indexes = schema.secondary_indexes().iter().map(|index| Candidate {
        target: Target::Index(index.name.clone()),
        hash_key: index.hash_key.clone(),
        range_key: index.range_key.clone(),
    });
    std::iter::once(table).chain(indexes).collect()
}

fn select(schema: &TableSchema, predicates: &[Predicate]) -> Option<Selection> {
    let mut best: Option<(usize, Selection)> = None;
    for candidate in candidates(schema) {
        let Some((hash, hash_positions)) = match_hash(schema, predicates, &candidate.hash_key)
        else {
            continue;
        };
        let mut consumed: IndexSet<usize> = hash_positions.into_iter().collect();
        let range = candidate
            .range_key
            .as_ref()
            .and_then(|spec| match_range(schema, predicates, spec, &consumed))
            .map(|(range, positions)| {
                consumed.extend(positions);
                range
            });
        let score = 2 + usize::from(range.is_some());
        let selection = Selection {
            key_condition: KeyCondition { hash, range },
            consumed,
            target: candidate.target,
        };
        if selection.target == Target::Table {
            return Some(selection);
        }
        if best.as_ref().is_none_or(|(best_score, _)| score > *best_score) {
            best = Some((score, selection));
        }
    }
    best.map(|(_, selection)| selection)
}

/// Turn every predicate not in `consumed` into a filter, or drop it.
pub(crate) fn filters(
    schema: &TableSchema,
    predicates: &[Predicate],
    consumed: &IndexSet<usize>,
) -> (Vec<FilterCondition>, Vec<DroppedPredicate>) {
    let mut filter_conditions = Vec::new();
    let mut dropped_predicates = Vec::new();
    for (position, predicate) in predicates.iter().enumerate() {
        if consumed.contains(&position) {
            continue;
        }
        let reason = match schema.field(&predicate.attribute) {
            None => DropReason::UnknownAttribute,
            Some(field) if !field.allows(predicate.operator) => DropReason::OperatorNotAllowed,
            Some(_) if !predicate.operator.accepts_arity(predicate.values.len()) => {
                DropReason::Arity
            }
            Some(field) => {
                filter_conditions.push(FilterCondition {
                    attribute: predicate.attribute.clone(),
                    identifier: field.identifier.clone(),
                    operator: predicate.operator,
                    values: predicate.values.clone(),
                });
                continue;
            }
        };
        #[cfg(feature = "tracing")]
        tracing::debug!(predicate = %predicate, %reason, "dropped predicate");
        dropped_predicates.push(DroppedPredicate {
            predicate: predicate.clone(),
            reason,
        });
    }
    (filter_conditions, dropped_predicates)
}

/// Plan a query.
///
/// The base table wins whenever its hash key is satisfied. Otherwise the
/// secondary index with the best score wins (2 for a satisfied hash key, 1
/// more for a satisfied range key), ties going to the index declared first.
/// With no satisfiable key the plan is a scan of the base table.
///
/// ```rust
/// use dynamodb_gen::{
///     plan::{predicate::Predicate, selector::{self, Target}},
///     schema::{operator::OperatorType, table::TableSchema},
/// };
///
/// let schema = TableSchema::from_json_str(r#"{
///     "table_name": "users",
///     "hash_key": "user_id",
///     "attributes": [
///         {"name": "user_id", "type": "S"},
///         {"name": "status", "type": "S"}
///     ],
///     "secondary_indexes": [{"name": "by_status", "hash_key": "status"}]
/// }"#).unwrap();
/// let predicates = [Predicate::new("status", OperatorType::Eq, vec!["active".into()])];
/// let plan = selector::plan_query(&schema, &predicates);
/// assert_eq!(plan.target, Target::Index("by_status".to_string()));
/// assert_eq!(plan.key_condition.unwrap().to_string(), "status = active");
/// ```
#[cfg_attr(
    feature = "tracing",
    tracing::instrument(
        name = "dynamodb_gen.plan_query",
        skip_all,
        fields(table = schema.table_name(), predicates = predicates.len())
    )
)]
pub fn plan_query(schema: &TableSchema, predicates: &[Predicate]) -> QueryPlan {
    let (target, key_condition, consumed) = match select(schema, predicates) {
        Some(selection) => (
            selection.target,
            Some(selection.key_condition),
            selection.consumed,
        ),
        None => (Target::Scan { index: None }, None, IndexSet::new()),
    };
    let (filter_conditions, dropped_predicates) = filters(schema, predicates, &consumed);
    #[cfg(feature = "tracing")]
    tracing::debug!(
        access_path = %target,
        filters = filter_conditions.len(),
        dropped = dropped_predicates.len(),
        "planned query"
    );
    QueryPlan {
        target,
        key_condition,
        filter_conditions,
        dropped_predicates,
    }
}

/// Plan a scan of the base table or of `index`: every predicate is checked as a filter.
#[cfg_attr(
    feature = "tracing",
    tracing::instrument(
        name = "dynamodb_gen.plan_scan",
        skip_all,
        fields(table = schema.table_name(), predicates = predicates.len())
    )
)]
pub fn plan_scan(
    schema: &TableSchema,
    index: Option<&SecondaryIndex>,
    predicates: &[Predicate],
) -> QueryPlan {
    let (filter_conditions, dropped_predicates) = filters(schema, predicates, &IndexSet::new());
    QueryPlan {
        target: Target::Scan {
            index: index.map(|index| index.name.clone()),
        },
        key_condition: None,
        filter_conditions,
        dropped_predicates,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{common::codec::DynamoCodec, error::CodecError, fixtures};

    use rstest::rstest;

    fn eq(attribute: &str, value: impl Into<Value>) -> Predicate {
        Predicate::new(attribute, OperatorType::Eq, vec![value.into()])
    }

    fn dropped(predicate: Predicate, reason: DropReason) -> DroppedPredicate {
        DroppedPredicate { predicate, reason }
    }

    #[rstest]
    #[case::base_table(
        vec![eq("user_id", "u1")],
        Target::Table,
        Some("user_id = u1")
    )]
    #[case::index_over_scan(
        vec![eq("status", "active")],
        Target::Index("by_status".to_string()),
        Some("status = active")
    )]
    #[case::composite_key(
        vec![eq("category", "tech"), eq("is_published", 1)],
        Target::Index("by_category".to_string()),
        Some("category#is_published = tech#1")
    )]
    #[case::unsatisfiable(
        vec![Predicate::new("score", OperatorType::Gt, vec![1.5.into()])],
        Target::Scan { index: None },
        None
    )]
    #[case::range_key(
        vec![
            eq("status", "active"),
            Predicate::new("createdAt", OperatorType::Between, vec![1.into(), 9.into()]),
        ],
        Target::Index("by_status".to_string()),
        Some("status = active AND createdAt BETWEEN 1 AND 9")
    )]
    #[case::higher_score_beats_declaration_order(
        vec![
            eq("email", "a@b.c"),
            eq("category", "tech"),
            eq("is_published", 1),
            Predicate::new("createdAt", OperatorType::Gt, vec![5.into()]),
        ],
        Target::Index("by_category".to_string()),
        Some("category#is_published = tech#1 AND createdAt > 5")
    )]
    #[case::base_table_preferred(
        vec![
            eq("status", "active"),
            Predicate::new("createdAt", OperatorType::Gt, vec![5.into()]),
            eq("user_id", "u1"),
        ],
        Target::Table,
        Some("user_id = u1")
    )]
    #[case::hash_key_needs_equality(
        vec![Predicate::new("user_id", OperatorType::BeginsWith, vec!["u".into()])],
        Target::Scan { index: None },
        None
    )]
    #[case::composite_key_needs_every_part(
        vec![eq("category", "tech")],
        Target::Scan { index: None },
        None
    )]
    #[case::composite_value_with_separator(
        vec![eq("category", "a#b"), eq("is_published", 1)],
        Target::Scan { index: None },
        None
    )]
    fn test_plan_target(
        #[case] predicates: Vec<Predicate>,
        #[case] expected_target: Target,
        #[case] expected_key_condition: Option<&str>,
    ) {
        let schema = fixtures::users_schema();
        let plan = plan_query(&schema, &predicates);
        assert_eq!(plan.target, expected_target);
        assert_eq!(
            plan.key_condition.map(|key_condition| key_condition.to_string()),
            expected_key_condition.map(str::to_string)
        );
    }

    fn events_schema() -> TableSchema {
        TableSchema::from_json_str(
            r#"{
                "table_name": "events",
                "hash_key": "pk",
                "range_key": "sk",
                "attributes": [
                    {"name": "pk", "type": "S"},
                    {"name": "sk", "type": "N"},
                    {"name": "g", "type": "S"}
                ]
            }"#,
        )
        .unwrap()
    }

    #[rstest]
    #[case::range_key_between(
        vec![
            eq("pk", "a"),
            Predicate::new("sk", OperatorType::Ne, vec![2.into()]),
            eq("g", "x"),
            Predicate::new("sk", OperatorType::Between, vec![1.into(), 3.into()]),
        ],
        Target::Table,
        Some("pk = a AND sk BETWEEN 1 AND 3"),
        vec!["sk <> 2", "g = x"]
    )]
    #[case::range_key_own_operator(
        vec![eq("pk", "a"), Predicate::new("sk", OperatorType::Gte, vec![5.into()])],
        Target::Table,
        Some("pk = a AND sk >= 5"),
        vec![]
    )]
    #[case::non_range_operator_filters(
        vec![eq("pk", "a"), Predicate::new("sk", OperatorType::Ne, vec![2.into()])],
        Target::Table,
        Some("pk = a"),
        vec!["sk <> 2"]
    )]
    #[case::range_key_without_hash(
        vec![Predicate::new("sk", OperatorType::Gt, vec![5.into()])],
        Target::Scan { index: None },
        None,
        vec!["sk > 5"]
    )]
    fn test_plan_table_range_key(
        #[case] predicates: Vec<Predicate>,
        #[case] expected_target: Target,
        #[case] expected_key_condition: Option<&str>,
        #[case] expected_filters: Vec<&str>,
    ) {
        let schema = events_schema();
        let plan = plan_query(&schema, &predicates);
        assert_eq!(plan.target, expected_target);
        assert_eq!(
            plan.key_condition.map(|key_condition| key_condition.to_string()),
            expected_key_condition.map(str::to_string)
        );
        let filters: Vec<_> = plan
            .filter_conditions
            .iter()
            .map(FilterCondition::to_string)
            .collect();
        assert_eq!(filters, expected_filters);
        assert!(plan.dropped_predicates.is_empty());
    }

    #[test]
    fn test_ties_go_to_first_declared_index() {
        // by_status and by_user_status both resolve from the status equality
        let schema = fixtures::users_schema();
        let plan = plan_query(&schema, &[eq("status", "active")]);
        assert_eq!(plan.target, Target::Index("by_status".to_string()));
        assert!(plan.filter_conditions.is_empty());
        assert!(plan.dropped_predicates.is_empty());
    }

    #[test]
    fn test_composite_key_term() {
        let schema = fixtures::users_schema();
        let plan = plan_query(&schema, &[eq("category", "tech"), eq("is_published", 1)]);
        let key_condition = plan.key_condition.unwrap();
        assert_eq!(
            key_condition.hash,
            KeyTerm {
                attribute: "category#is_published".to_string(),
                identifier: "category_is_published".to_string(),
                value: Value::from("tech#1"),
            }
        );
        assert_eq!(key_condition.range, None);
        assert!(plan.filter_conditions.is_empty());
    }

    #[rstest]
    #[case::operator_not_allowed(
        vec![
            eq("user_id", "u1"),
            Predicate::new("tags", OperatorType::Between, vec![1.into(), 2.into()]),
        ],
        vec![],
        vec![dropped(
            Predicate::new("tags", OperatorType::Between, vec![1.into(), 2.into()]),
            DropReason::OperatorNotAllowed,
        )]
    )]
    #[case::unknown_attribute(
        vec![eq("user_id", "u1"), eq("nickname", "x")],
        vec![],
        vec![dropped(eq("nickname", "x"), DropReason::UnknownAttribute)]
    )]
    #[case::arity(
        vec![eq("user_id", "u1"), Predicate::new("status", OperatorType::In, vec![])],
        vec![],
        vec![dropped(
            Predicate::new("status", OperatorType::In, vec![]),
            DropReason::Arity,
        )]
    )]
    #[case::boolean_ordering(
        vec![
            eq("user_id", "u1"),
            Predicate::new("verified", OperatorType::Gt, vec![true.into()]),
            eq("verified", true),
        ],
        vec!["verified = true"],
        vec![dropped(
            Predicate::new("verified", OperatorType::Gt, vec![true.into()]),
            DropReason::OperatorNotAllowed,
        )]
    )]
    #[case::filters_and_drops_keep_input_order(
        vec![
            eq("nickname", "x"),
            Predicate::new("score", OperatorType::Gte, vec![2.into()]),
            Predicate::new("tags", OperatorType::Contains, vec!["rust".into()]),
            Predicate::new("profile", OperatorType::Eq, vec!["x".into()]),
            Predicate::new("avatar", OperatorType::Exists, vec![]),
        ],
        vec!["score >= 2", "tags CONTAINS rust", "avatar EXISTS"],
        vec![
            dropped(eq("nickname", "x"), DropReason::UnknownAttribute),
            dropped(
                Predicate::new("profile", OperatorType::Eq, vec!["x".into()]),
                DropReason::OperatorNotAllowed,
            ),
        ]
    )]
    fn test_plan_filters(
        #[case] predicates: Vec<Predicate>,
        #[case] expected_filters: Vec<&str>,
        #[case] expected_dropped: Vec<DroppedPredicate>,
    ) {
        let schema = fixtures::users_schema();
        let plan = plan_query(&schema, &predicates);
        let filters: Vec<_> = plan
            .filter_conditions
            .iter()
            .map(FilterCondition::to_string)
            .collect();
        assert_eq!(filters, expected_filters);
        assert_eq!(plan.dropped_predicates, expected_dropped);
    }

    #[test]
    fn test_dropped_predicates_leave_a_valid_plan() {
        let schema = fixtures::users_schema();
        let predicates = [
            eq("status", "active"),
            Predicate::new("tags", OperatorType::Between, vec![1.into(), 2.into()]),
        ];
        let plan = plan_query(&schema, &predicates);
        assert_eq!(plan.target, Target::Index("by_status".to_string()));
        assert_eq!(plan.dropped_predicates.len(), 1);
        assert!(plan.render(&DynamoCodec).is_ok());
    }

    #[test]
    fn test_plan_is_deterministic() {
        let schema = fixtures::users_schema();
        let predicates = [
            eq("status", "active"),
            Predicate::new("createdAt", OperatorType::Lt, vec![100.into()]),
            Predicate::new("score", OperatorType::In, vec![1.into(), 2.into(), 3.into()]),
            eq("nickname", "x"),
        ];
        let first = plan_query(&schema, &predicates);
        let second = plan_query(&schema, &predicates);
        assert_eq!(first, second);
        assert_eq!(
            first.render(&DynamoCodec).unwrap(),
            second.render(&DynamoCodec).unwrap()
        );
    }

    #[rstest]
    #[case::range_key(
        vec![
            eq("status", "active"),
            Predicate::new("createdAt", OperatorType::Between, vec![1.into(), 9.into()]),
        ],
        Expressions {
            key_condition_expression: Some(
                "#status = :status_eq0 AND #created_at BETWEEN :created_at_between1 AND :created_at_between2"
                    .to_string()
            ),
            filter_expression: None,
            expression_attribute_names: Some(collections::HashMap::from([
                ("#status".to_string(), "status".to_string()),
                ("#created_at".to_string(), "createdAt".to_string()),
            ])),
            expression_attribute_values: Some(collections::HashMap::from([
                (":status_eq0".to_string(), types::AttributeValue::S("active".to_string())),
                (":created_at_between1".to_string(), types::AttributeValue::N("1".to_string())),
                (":created_at_between2".to_string(), types::AttributeValue::N("9".to_string())),
            ])),
        }
    )]
    #[case::composite_key(
        vec![eq("category", "tech"), eq("is_published", 1)],
        Expressions {
            key_condition_expression: Some(
                "#category_is_published = :category_is_published_eq0".to_string()
            ),
            filter_expression: None,
            expression_attribute_names: Some(collections::HashMap::from([
                ("#category_is_published".to_string(), "category#is_published".to_string()),
            ])),
            expression_attribute_values: Some(collections::HashMap::from([
                (
                    ":category_is_published_eq0".to_string(),
                    types::AttributeValue::S("tech#1".to_string()),
                ),
            ])),
        }
    )]
    #[case::key_then_filters(
        vec![
            eq("user_id", "u1"),
            Predicate::new("score", OperatorType::Gt, vec![1.5.into()]),
            Predicate::new("email", OperatorType::BeginsWith, vec!["a".into()]),
        ],
        Expressions {
            key_condition_expression: Some("#user_id = :user_id_eq0".to_string()),
            filter_expression: Some(
                "#score > :score_gt1 AND begins_with(#email, :email_begins_with2)".to_string()
            ),
            expression_attribute_names: Some(collections::HashMap::from([
                ("#user_id".to_string(), "user_id".to_string()),
                ("#score".to_string(), "score".to_string()),
                ("#email".to_string(), "email".to_string()),
            ])),
            expression_attribute_values: Some(collections::HashMap::from([
                (":user_id_eq0".to_string(), types::AttributeValue::S("u1".to_string())),
                (":score_gt1".to_string(), types::AttributeValue::N("1.5".to_string())),
                (":email_begins_with2".to_string(), types::AttributeValue::S("a".to_string())),
            ])),
        }
    )]
    #[case::scan(
        vec![
            Predicate::new("status", OperatorType::NotIn, vec!["a".into(), "b".into()]),
            Predicate::new("profile", OperatorType::NotExists, vec![]),
        ],
        Expressions {
            key_condition_expression: None,
            filter_expression: Some(
                "NOT (#status IN (:status_not_in0, :status_not_in1)) AND attribute_not_exists(#profile)"
                    .to_string()
            ),
            expression_attribute_names: Some(collections::HashMap::from([
                ("#status".to_string(), "status".to_string()),
                ("#profile".to_string(), "profile".to_string()),
            ])),
            expression_attribute_values: Some(collections::HashMap::from([
                (":status_not_in0".to_string(), types::AttributeValue::S("a".to_string())),
                (":status_not_in1".to_string(), types::AttributeValue::S("b".to_string())),
            ])),
        }
    )]
    #[case::nothing(vec![], Expressions::default())]
    fn test_render(#[case] predicates: Vec<Predicate>, #[case] expected: Expressions) {
        let schema = fixtures::users_schema();
        let plan = plan_query(&schema, &predicates);
        assert_eq!(plan.render(&DynamoCodec).unwrap(), expected);
    }

    #[test]
    fn test_render_reports_encoding_failure() {
        let schema = fixtures::users_schema();
        let predicates = [
            eq("user_id", "u1"),
            Predicate::new("score", OperatorType::Gt, vec![f64::NAN.into()]),
        ];
        let plan = plan_query(&schema, &predicates);
        assert!(matches!(
            plan.render(&DynamoCodec),
            Err(BuildError::Encode {
                attribute,
                source: CodecError::NonFiniteNumber(_),
            }) if attribute == "score"
        ));
    }

    #[test]
    fn test_plan_scan() {
        let schema = fixtures::users_schema();
        let index = schema.index("by_email");
        let plan = plan_scan(&schema, index, &[eq("user_id", "u1"), eq("nickname", "x")]);
        assert_eq!(
            plan.target,
            Target::Scan {
                index: Some("by_email".to_string()),
            }
        );
        assert_eq!(plan.target.index_name(), Some("by_email"));
        assert!(plan.target.is_scan());
        assert_eq!(plan.key_condition, None);
        assert_eq!(plan.filter_conditions.len(), 1);
        assert_eq!(plan.dropped_predicates.len(), 1);
    }

    #[rstest]
    #[case::table(Target::Table, "table", None)]
    #[case::index(Target::Index("by_status".to_string()), "index by_status", Some("by_status"))]
    #[case::scan(Target::Scan { index: None }, "scan", None)]
    fn test_target(
        #[case] target: Target,
        #[case] expected_display: &str,
        #[case] expected_index: Option<&str>,
    ) {
        assert_eq!(target.to_string(), expected_display);
        assert_eq!(target.index_name(), expected_index);
    }
}
