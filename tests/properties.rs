use std::collections::BTreeMap;

use condq::operator::EQUAL;
use condq::{split, Kind, OpSet, Parser, Value};
use proptest::prelude::*;

// Clause text that never contains the delimiter, quotes or backslashes
fn plain_clause() -> impl Strategy<Value = String> {
    "[a-z0-9=<> ,.]{0,8}"
}

fn plain_clauses() -> impl Strategy<Value = Vec<String>> {
    (
        prop::collection::vec(plain_clause(), 0..6),
        "[a-z0-9=<>,.][a-z0-9=<> ,.]{0,7}",
    )
        .prop_map(|(mut xs, last)| {
            xs.push(last);
            xs
        })
}

proptest! {
    #[test]
    fn split_then_join_round_trips(clauses in plain_clauses(), delim in prop_oneof![Just("&"), Just(";"), Just("\n"), Just("||")]) {
        let input = clauses.join(delim);
        let split = split(&input, delim);
        prop_assert_eq!(split.join(delim), input.clone());
        prop_assert_eq!(split, clauses.iter().map(String::as_str).collect::<Vec<_>>());
    }

    #[test]
    fn quoted_delimiters_never_split(before in "[a-z=]{0,6}", inside in "[a-z&; ]{0,10}", after in "[a-z=]{1,6}") {
        let input = format!("{}\"{}\"&{}", before, inside, after);
        let expected = format!("{}\"{}\"", before, inside);
        prop_assert_eq!(split(&input, "&"), vec![expected.as_str(), after.as_str()]);
    }

    #[test]
    fn escaped_delimiters_and_quotes_never_count(parts in prop::collection::vec("[a-z]{1,5}", 1..5)) {
        let escaped = parts.join("\\&\\\"");
        let input = format!("{}&tail", escaped);
        prop_assert_eq!(split(&input, "&"), vec![escaped.as_str(), "tail"]);
    }

    #[test]
    fn unterminated_quote_swallows_the_rest(head in "[a-z=]{1,6}", rest in "[a-z&]{0,12}") {
        let input = format!("{}&x=\"{}", head, rest);
        let tail = format!("x=\"{}", rest);
        prop_assert_eq!(split(&input, "&"), vec![head.as_str(), tail.as_str()]);
    }

    #[test]
    fn decoding_is_idempotent(n in prop::collection::vec(any::<i64>(), 1..5), x in any::<f64>().prop_filter("finite", |x| x.is_finite())) {
        let ints = n.iter().map(i64::to_string).collect::<Vec<_>>().join(" , ");
        prop_assert_eq!(Kind::IntList.decode(&ints).unwrap(), Kind::IntList.decode(&ints).unwrap());
        prop_assert_eq!(Kind::IntList.decode(&ints).unwrap(), Value::IntList(n));

        let text = x.to_string();
        prop_assert_eq!(Kind::Float.decode(&text).unwrap(), Value::Float(x));
    }

    #[test]
    fn text_list_trims_and_keeps_order(items in prop::collection::vec("[a-z]{1,5}", 1..6), pad in " {0,3}") {
        let input = items.iter().map(|s| format!("{pad}{s}{pad}")).collect::<Vec<_>>().join(",");
        prop_assert_eq!(Kind::TextList.decode(&input).unwrap(), Value::TextList(items));
    }

    // every key/value pair of a query string comes back under its own key
    #[test]
    fn query_parameters(values in prop::collection::btree_map("[a-zA-Z]{1,6}", "[a-zA-Z]{0,6}", 0..8)) {
        let values: BTreeMap<String, String> = values;
        let mut p = Parser::new("&");
        let handles: Vec<_> = values
            .keys()
            .map(|k| (k.clone(), p.text(k.as_str(), OpSet::new([EQUAL]))))
            .collect();

        let query = values
            .iter()
            .map(|(k, v)| format!("{}={}", k, v))
            .collect::<Vec<_>>()
            .join("&");

        let parsed = p.parse(&query).unwrap();
        for (key, handle) in handles {
            prop_assert_eq!(parsed[handle].op(), &EQUAL);
            prop_assert_eq!(parsed[handle].key(), key.as_str());
            let expected = Value::Text(values[&key].clone());
            prop_assert_eq!(parsed.value(handle), Some(&expected));
        }
    }
}
