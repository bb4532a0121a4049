//! Builds the `structuredQuery` body of a `documents:runQuery` request.

use serde_json::{json, Value};

use super::codec::encode_value;
use crate::backend::storage::document::{Direction, DocumentQuery, FieldFilter, FilterOp};

fn operator(op: FilterOp) -> &'static str {
    match op {
        FilterOp::Equal => "EQUAL",
        FilterOp::GreaterOrEqual => "GREATER_THAN_OR_EQUAL",
        FilterOp::LessOrEqual => "LESS_THAN_OR_EQUAL",
        FilterOp::In => "IN",
    }
}

fn field_filter(filter: &FieldFilter, documents_root: &str) -> Value {
    json!({
        "fieldFilter": {
            "field": { "fieldPath": filter.field },
            "op": operator(filter.op),
            "value": encode_value(&filter.value, documents_root),
        }
    })
}

pub fn structured_query(query: &DocumentQuery, documents_root: &str) -> Value {
    let mut structured = json!({
        "from": [ { "collectionId": query.collection } ],
    });

    let mut filters: Vec<Value> = query
        .filters
        .iter()
        .map(|filter| field_filter(filter, documents_root))
        .collect();
    match filters.len() {
        0 => {}
        1 => structured["where"] = filters.remove(0),
        _ => {
            structured["where"] = json!({
                "compositeFilter": { "op": "AND", "filters": filters }
            })
        }
    }

    if let Some((field, direction)) = &query.order_by {
        let direction = match direction {
            Direction::Ascending => "ASCENDING",
            Direction::Descending => "DESCENDING",
        };
        structured["orderBy"] = json!([ { "field": { "fieldPath": field }, "direction": direction } ]);
    }

    if let Some(limit) = query.limit {
        structured["limit"] = json!(limit);
    }

    json!({ "structuredQuery": structured })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::storage::document::FieldValue;

    const ROOT: &str = "projects/demo/databases/(default)/documents";

    #[test]
    fn test_single_filter_is_not_wrapped() {
        let query = DocumentQuery::collection("customer_complain").where_eq("complaint_status", "pending");
        let body = structured_query(&query, ROOT);

        let filter = &body["structuredQuery"]["where"]["fieldFilter"];
        assert_eq!(filter["field"]["fieldPath"], "complaint_status");
        assert_eq!(filter["op"], "EQUAL");
        assert_eq!(filter["value"]["stringValue"], "pending");
    }

    #[test]
    fn test_composite_filter_order_and_limit() {
        let query = DocumentQuery::collection("bookings")
            .where_in(
                "provider_id",
                vec![FieldValue::reference("customer", "p1"), FieldValue::reference("customer", "p2")],
            )
            .where_eq("status", "Pending")
            .order_by("date", Direction::Descending)
            .limit(200);
        let body = structured_query(&query, ROOT);
        let structured = &body["structuredQuery"];

        assert_eq!(structured["from"][0]["collectionId"], "bookings");
        assert_eq!(structured["where"]["compositeFilter"]["op"], "AND");
        let in_filter = &structured["where"]["compositeFilter"]["filters"][0]["fieldFilter"];
        assert_eq!(in_filter["op"], "IN");
        assert_eq!(in_filter["value"]["arrayValue"]["values"].as_array().map(|v| v.len()), Some(2));
        assert_eq!(structured["orderBy"][0]["direction"], "DESCENDING");
        assert_eq!(structured["limit"], 200);
    }
}
