//! Test fixtures and data factories

use litellm_batch::{BatchRequest, BatchResult, BatchUsage};

/// `count` requests with ids `req-1..=req-count`
pub fn requests(count: usize) -> Vec<BatchRequest> {
    (1..=count)
        .map(|i| BatchRequest::new(format!("req-{}", i), format!("prompt {}", i)))
        .collect()
}

/// One successful result per request, echoing the prompt
pub fn results_for(requests: &[BatchRequest]) -> Vec<BatchResult> {
    requests
        .iter()
        .map(|request| {
            BatchResult::succeeded(
                request.correlation_id.clone(),
                format!("answer to {}", request.user_prompt),
                Some(BatchUsage {
                    input_tokens: 10,
                    output_tokens: 5,
                }),
            )
        })
        .collect()
}

/// Sorted correlation ids of `results`
pub fn correlation_ids(results: &[BatchResult]) -> Vec<String> {
    let mut ids: Vec<String> = results.iter().map(|r| r.correlation_id.clone()).collect();
    ids.sort();
    ids
}
