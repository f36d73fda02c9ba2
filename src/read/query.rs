use crate::{error::ReadError, read};

use aws_sdk_dynamodb::{Client, types};

/// Query request rendered from a plan.
///
/// ```rust,no_run
/// use aws_sdk_dynamodb::Client;
/// use dynamodb_gen::read;
///
/// # async fn example(client: &Client) -> Result<(), Box<dyn std::error::Error>> {
/// let query = read::query::QueryInput {
///     key_condition_expression: "#user_id = :user_id_eq0".to_string(),
///     read_input: read::common::ReadInput {
///         table_name: "users".to_string(),
///         ..Default::default()
///     },
///     ..Default::default()
/// };
/// let output = query.send(client).await?;
/// println!("{} items", output.count);
/// # Ok(())
/// # }
/// ```
#[derive(Clone, Debug, Default, PartialEq)]
pub struct QueryInput {
    /// Key condition expression.
    pub key_condition_expression: String,
    /// Settings shared with scans.
    pub read_input: read::common::ReadInput,
    /// Ascending when `true` or unset, descending when `false`.
    pub scan_index_forward: Option<bool>,
}

impl QueryInput {
    /// Execute the query, following every page.
    #[cfg_attr(
        feature = "tracing",
        tracing::instrument(
            name = "dynamodb_gen.query",
            skip_all,
            fields(
                table = %self.read_input.table_name,
                index = ?self.read_input.index_name,
            ),
            err
        )
    )]
    pub async fn send(self, client: &Client) -> Result<read::common::ReadOutput, ReadError> {
        let builder = client
            .query()
            .key_condition_expression(self.key_condition_expression)
            .set_scan_index_forward(self.scan_index_forward);
        let mut paginator = crate::apply_read_input!(builder, self.read_input)
            .into_paginator()
            .send();
        crate::get_paginated_output!(paginator)
    }

    /// Ask for the consumed capacity of every page.
    pub fn with_consumed_capacity(mut self, detail: types::ReturnConsumedCapacity) -> Self {
        self.read_input.return_consumed_capacity = Some(detail);
        self
    }
}
