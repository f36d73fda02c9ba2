//! Fluent builders collecting predicates and request options.
//!
//! ```rust
//! use dynamodb_gen::{
//!     common::codec::DynamoCodec,
//!     plan::builder::QueryBuilder,
//!     read::Request,
//!     schema::table::TableSchema,
//! };
//!
//! let schema = TableSchema::from_json_str(r#"{
//!     "table_name": "users",
//!     "hash_key": "user_id",
//!     "attributes": [
//!         {"name": "user_id", "type": "S"},
//!         {"name": "age", "type": "N"}
//!     ]
//! }"#).unwrap();
//! let request = QueryBuilder::new(&schema)
//!     .eq("user_id", "u1")
//!     .gte("age", 18)
//!     .limit(10)
//!     .build(&DynamoCodec)
//!     .unwrap();
//! let Request::Query(query) = request else { panic!("expected a query") };
//! assert_eq!(query.key_condition_expression, "#user_id = :user_id_eq0");
//! assert_eq!(query.read_input.filter_expression.as_deref(), Some("#age >= :age_gte1"));
//! ```

use crate::{
    common::{codec::ValueCodec, value::Value},
    error::BuildError,
    plan::{
        predicate::Predicate,
        selector::{self, Expressions, QueryPlan, Target},
    },
    read::{self, common::ReadInput},
    schema::{index::SecondaryIndex, operator::OperatorType, table::TableSchema},
};

/// Generates one helper per single-operand operator.
macro_rules! single_value_operators {
    ($($(#[$doc:meta])* $name:ident => $operator:ident,)*) => {
        $(
            $(#[$doc])*
            pub fn $name(self, attribute: impl Into<String>, value: impl Into<Value>) -> Self {
                self.with(attribute, OperatorType::$operator, vec![value.into()])
            }
        )*
    };
}

/// Generates the helpers shared by both builders.
macro_rules! predicate_helpers {
    () => {
        /// Add a predicate.
        pub fn with(
            mut self,
            attribute: impl Into<String>,
            operator: OperatorType,
            values: Vec<Value>,
        ) -> Self {
            self.predicates
                .push(Predicate::new(attribute, operator, values));
            self
        }

        single_value_operators! {
            /// Equal to.
            eq => Eq,
            /// Not equal to.
            ne => Ne,
            /// Greater than.
            gt => Gt,
            /// Less than.
            lt => Lt,
            /// Greater than or equal to.
            gte => Gte,
            /// Less than or equal to.
            lte => Lte,
            /// Contains the value (substring or set member).
            contains => Contains,
            /// Does not contain the value.
            not_contains => NotContains,
            /// Starts with the prefix.
            begins_with => BeginsWith,
        }

        /// Between `low` and `high`, inclusive.
        pub fn between(
            self,
            attribute: impl Into<String>,
            low: impl Into<Value>,
            high: impl Into<Value>,
        ) -> Self {
            self.with(
                attribute,
                OperatorType::Between,
                vec![low.into(), high.into()],
            )
        }

        /// Equal to one of `values`.
        pub fn is_in<V: Into<Value>>(
            self,
            attribute: impl Into<String>,
            values: impl IntoIterator<Item = V>,
        ) -> Self {
            let values = values.into_iter().map(Into::into).collect();
            self.with(attribute, OperatorType::In, values)
        }

        /// Equal to none of `values`.
        pub fn not_in<V: Into<Value>>(
            self,
            attribute: impl Into<String>,
            values: impl IntoIterator<Item = V>,
        ) -> Self {
            let values = values.into_iter().map(Into::into).collect();
            self.with(attribute, OperatorType::NotIn, values)
        }

        /// The attribute is present.
        pub fn exists(self, attribute: impl Into<String>) -> Self {
            self.with(attribute, OperatorType::Exists, Vec::new())
        }

        /// The attribute is absent.
        pub fn not_exists(self, attribute: impl Into<String>) -> Self {
            self.with(attribute, OperatorType::NotExists, Vec::new())
        }

        /// Maximum number of items evaluated per page.
        pub fn limit(mut self, limit: i32) -> Self {
            self.limit = Some(limit);
            self
        }

        /// Strongly consistent read.
        pub fn consistent_read(mut self, consistent_read: bool) -> Self {
            self.consistent_read = Some(consistent_read);
            self
        }
    };
}

/// Builds a Query, or a Scan when no key can be satisfied.
#[derive(Clone, Debug)]
pub struct QueryBuilder<'a> {
    schema: &'a TableSchema,
    predicates: Vec<Predicate>,
    limit: Option<i32>,
    scan_index_forward: Option<bool>,
    consistent_read: Option<bool>,
}

impl<'a> QueryBuilder<'a> {
    /// Start a query on `schema`'s table.
    pub fn new(schema: &'a TableSchema) -> Self {
        Self {
            schema,
            predicates: Vec::new(),
            limit: None,
            scan_index_forward: None,
            consistent_read: None,
        }
    }

    predicate_helpers!();

    /// Ascending order when `true`, descending when `false`.
    pub fn scan_index_forward(mut self, scan_index_forward: bool) -> Self {
        self.scan_index_forward = Some(scan_index_forward);
        self
    }

    /// Predicates collected so far.
    pub fn predicates(&self) -> &[Predicate] {
        &self.predicates
    }

    /// Plan the query.
    pub fn plan(&self) -> QueryPlan {
        selector::plan_query(self.schema, &self.predicates)
    }

    /// Plan the query and render it into a request.
    #[cfg_attr(
        feature = "tracing",
        tracing::instrument(
            name = "dynamodb_gen.query_builder.build",
            skip_all,
            fields(table = self.schema.table_name()),
            err
        )
    )]
    pub fn build<C: ValueCodec + ?Sized>(self, codec: &C) -> Result<read::Request, BuildError> {
        let plan = self.plan();
        let Expressions {
            key_condition_expression,
            filter_expression,
            expression_attribute_names,
            expression_attribute_values,
        } = plan.render(codec)?;
        let read_input = ReadInput {
            consistent_read: self.consistent_read,
            expression_attribute_names,
            expression_attribute_values,
            filter_expression,
            index_name: plan.target.index_name().map(str::to_string),
            limit: self.limit,
            table_name: self.schema.table_name().to_string(),
            ..Default::default()
        };
        let request = match (plan.target, key_condition_expression) {
            (Target::Table | Target::Index(_), Some(key_condition_expression)) => {
                read::Request::Query(read::query::QueryInput {
                    key_condition_expression,
                    read_input,
                    scan_index_forward: self.scan_index_forward,
                })
            }
            _ => read::Request::Scan(read::scan::ScanInput {
                read_input,
                ..Default::default()
            }),
        };
        Ok(request)
    }
}

/// Builds a Scan of the table or of one index.
#[derive(Clone, Debug)]
pub struct ScanBuilder<'a> {
    schema: &'a TableSchema,
    index: Option<&'a SecondaryIndex>,
    predicates: Vec<Predicate>,
    limit: Option<i32>,
    consistent_read: Option<bool>,
    segment: Option<(i32, i32)>,
}

impl<'a> ScanBuilder<'a> {
    /// Start a scan of `schema`'s table.
    pub fn new(schema: &'a TableSchema) -> Self {
        Self {
            schema,
            index: None,
            predicates: Vec::new(),
            limit: None,
            consistent_read: None,
            segment: None,
        }
    }

    predicate_helpers!();

    /// Scan `index` instead of the table.
    pub fn index(mut self, index: &'a SecondaryIndex) -> Self {
        self.index = Some(index);
        self
    }

    /// Scan only `segment` of `total_segments` of a parallel scan.
    pub fn segment(mut self, segment: i32, total_segments: i32) -> Self {
        self.segment = Some((segment, total_segments));
        self
    }

    /// Predicates collected so far.
    pub fn predicates(&self) -> &[Predicate] {
        &self.predicates
    }

    /// Plan the scan.
    pub fn plan(&self) -> QueryPlan {
        selector::plan_scan(self.schema, self.index, &self.predicates)
    }

    /// Plan the scan and render it into a request.
    #[cfg_attr(
        feature = "tracing",
        tracing::instrument(
            name = "dynamodb_gen.scan_builder.build",
            skip_all,
            fields(table = self.schema.table_name()),
            err
        )
    )]
    pub fn build<C: ValueCodec + ?Sized>(self, codec: &C) -> Result<read::Request, BuildError> {
        let plan = self.plan();
        let expressions = plan.render(codec)?;
        let read_input = ReadInput {
            consistent_read: self.consistent_read,
            expression_attribute_names: expressions.expression_attribute_names,
            expression_attribute_values: expressions.expression_attribute_values,
            filter_expression: expressions.filter_expression,
            index_name: plan.target.index_name().map(str::to_string),
            limit: self.limit,
            table_name: self.schema.table_name().to_string(),
            ..Default::default()
        };
        Ok(read::Request::Scan(read::scan::ScanInput {
            read_input,
            segment: self.segment.map(|(segment, _)| segment),
            total_segments: self.segment.map(|(_, total_segments)| total_segments),
        }))
    }
}
