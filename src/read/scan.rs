use crate::{error::ReadError, read};

use aws_sdk_dynamodb::{Client, types};

/// Scan request rendered from a plan.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct ScanInput {
    /// Settings shared with queries.
    pub read_input: read::common::ReadInput,
    /// Segment of a parallel scan, 0-indexed.
    pub segment: Option<i32>,
    /// Number of segments of a parallel scan.
    pub total_segments: Option<i32>,
}

impl ScanInput {
    /// Execute the scan, following every page.
    #[cfg_attr(
        feature = "tracing",
        tracing::instrument(
            name = "dynamodb_gen.scan",
            skip_all,
            fields(
                table = %self.read_input.table_name,
                index = ?self.read_input.index_name,
                segment = ?self.segment,
            ),
            err
        )
    )]
    pub async fn send(self, client: &Client) -> Result<read::common::ReadOutput, ReadError> {
        let builder = client
            .scan()
            .set_segment(self.segment)
            .set_total_segments(self.total_segments);
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
