//! Integration tests for StringQuery export and parsing.

use std::sync::Arc;

use chrono::NaiveDate;
use search_condition::{
    BagEntry, CompareOperator, FieldConfig, FieldSet, FieldType, GroupLogical, PatternMatch,
    PatternMatchType, Range, SearchCondition, SearchConditionBuilder, SearchError,
    StringQueryExporter, StringQueryParser, Value, ValueKinds, ValuesBag, ValuesGroup,
};

fn fields() -> Arc<FieldSet> {
    FieldSet::builder()
        .add("id", FieldType::Integer)
        .add_with("name", FieldType::Text, |f| {
            f.with_label("customer-name").with_value_kinds(ValueKinds::all())
        })
        .add("price", FieldType::Decimal)
        .add("birthday", FieldType::Date)
        .add("updated", FieldType::DateTime)
        .add("created", FieldType::Timestamp)
        .add("active", FieldType::Boolean)
        .build_shared()
}

fn round_trip(condition: &SearchCondition) -> SearchCondition {
    let text = StringQueryExporter::new().export(condition).unwrap();
    StringQueryParser::new(Arc::clone(condition.field_set()))
        .parse(&text)
        .unwrap_or_else(|e| panic!("failed to parse '{}': {}", text, e))
}

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

#[test]
fn test_round_trip_every_value_kind() {
    let condition = SearchConditionBuilder::new(fields())
        .field("id", |b| {
            b.simple(2)
                .simple(-5)
                .excluded(3)
                .range(Range::inclusive(10, 20))
                .range(Range::new(30, 40, false, true))
                .excluded_range(Range::new(50, 60, true, false))
                .compare(CompareOperator::Greater, 100)
                .compare(CompareOperator::LowerOrEqual, 500)
                .compare(CompareOperator::NotEqual, 250)
        })
        .field("name", |b| {
            b.simple("plain")
                .pattern(PatternMatch::new("foo", PatternMatchType::Contains))
                .pattern(PatternMatch::case_insensitive("bar", PatternMatchType::NotStartsWith))
                .pattern(PatternMatch::new("^a.*z$", PatternMatchType::Regex))
                .pattern(PatternMatch::new("end", PatternMatchType::NotEndsWith))
                .pattern(PatternMatch::case_insensitive("Exact", PatternMatchType::Equals))
        })
        .field("price", |b| {
            b.simple(Value::decimal("100.10").unwrap())
                .range(Range::inclusive(
                    Value::decimal("-1.5").unwrap(),
                    Value::decimal("99999999999999999999.99").unwrap(),
                ))
        })
        .field("birthday", |b| {
            b.range(Range::inclusive(date(2000, 1, 1), date(2000, 12, 31)))
                .compare(CompareOperator::Lower, date(1990, 6, 15))
        })
        .field("updated", |b| {
            b.simple(date(2001, 1, 15).and_hms_opt(10, 30, 0).unwrap().and_utc())
        })
        .field("created", |b| b.simple(date(2001, 1, 15).and_hms_opt(0, 0, 0).unwrap().and_utc()))
        .field("active", |b| b.simple(true).excluded(false))
        .build()
        .unwrap();

    assert_eq!(round_trip(&condition), condition);
}

#[test]
fn test_round_trip_nested_groups() {
    let condition = SearchConditionBuilder::with_logical(fields(), GroupLogical::Or)
        .group(GroupLogical::Or, |g| {
            g.field("id", |b| b.simple(1))
                .group(GroupLogical::And, |g| {
                    g.field("id", |b| b.simple(2))
                        .field("active", |b| b.simple(true))
                })
                .group(GroupLogical::Or, |g| g.field("id", |b| b.simple(3)))
        })
        .group(GroupLogical::And, |g| g.field("name", |b| b.simple("x")))
        .field("price", |b| b.simple(Value::decimal("1").unwrap()))
        .build()
        .unwrap();

    let parsed = round_trip(&condition);
    assert_eq!(parsed, condition);
    assert_eq!(parsed.values_group().logical(), GroupLogical::Or);
    assert_eq!(parsed.values_group().groups()[0].groups()[1].logical(), GroupLogical::Or);
}

#[test]
fn test_round_trip_leading_subgroup() {
    for root in [GroupLogical::And, GroupLogical::Or] {
        for child in [GroupLogical::And, GroupLogical::Or] {
            let condition = SearchConditionBuilder::with_logical(fields(), root)
                .group(child, |g| g.field("id", |b| b.simple(7)))
                .group(GroupLogical::And, |g| g.field("id", |b| b.simple(8)))
                .build()
                .unwrap();
            assert_eq!(round_trip(&condition), condition, "{:?}/{:?}", root, child);
        }
    }
}

#[test]
fn test_round_trip_empty_or_groups() {
    let condition = SearchConditionBuilder::new(fields())
        .field("name", |b| b.simple("x"))
        .group(GroupLogical::Or, |g| g)
        .build()
        .unwrap();
    assert_eq!(
        StringQueryExporter::new().export(&condition).unwrap(),
        "customer-name: x; *(  );"
    );
    let parsed = round_trip(&condition);
    assert_eq!(parsed, condition);
    assert_eq!(parsed.values_group().groups()[0].logical(), GroupLogical::Or);

    let empty_or = SearchConditionBuilder::with_logical(fields(), GroupLogical::Or)
        .build()
        .unwrap();
    assert_eq!(round_trip(&empty_or).values_group().logical(), GroupLogical::Or);

    let nested = SearchConditionBuilder::with_logical(fields(), GroupLogical::Or)
        .group(GroupLogical::Or, |g| g)
        .build()
        .unwrap();
    assert_eq!(StringQueryExporter::new().export(&nested).unwrap(), "* *(  );");
    let parsed = round_trip(&nested);
    assert_eq!(parsed, nested);
    assert_eq!(parsed.values_group().logical(), GroupLogical::Or);
    assert_eq!(parsed.values_group().groups()[0].logical(), GroupLogical::Or);
}

#[test]
fn test_round_trip_structural_characters() {
    let tricky = [
        "semi;colon",
        "say \"hi\"",
        "with space",
        "a,b",
        "(paren)",
        "~tilde",
        "!bang",
        "x=y",
        "",
        "tab\there",
        "ünïcödé",
    ];

    let condition = SearchConditionBuilder::new(fields())
        .field("name", |b| {
            tricky.iter().fold(b, |b, v| {
                b.simple(*v)
                    .pattern(PatternMatch::new(*v, PatternMatchType::Contains))
            })
        })
        .build()
        .unwrap();

    assert_eq!(round_trip(&condition), condition);
}

#[test]
fn test_export_quotes_structural_values() {
    let condition = SearchConditionBuilder::new(fields())
        .field("name", |b| b.simple("a;b").simple("say \"hi\""))
        .build()
        .unwrap();

    assert_eq!(
        StringQueryExporter::new().export(&condition).unwrap(),
        "customer-name: \"a;b\", \"say \"\"hi\"\"\";"
    );
}

#[test]
fn test_export_bag_order() {
    let condition = SearchConditionBuilder::new(fields())
        .field("id", |b| {
            b.compare(CompareOperator::Greater, 1)
                .excluded_range(Range::inclusive(5, 6))
                .range(Range::inclusive(3, 4))
                .excluded(2)
                .simple(1)
        })
        .build()
        .unwrap();

    assert_eq!(
        StringQueryExporter::new().export(&condition).unwrap(),
        "id: 1, !2, 3 ~ 4, !5 ~ 6, > 1;"
    );
}

#[test]
fn test_export_unknown_field() {
    let mut group = ValuesGroup::new(GroupLogical::And);
    let mut bag = ValuesBag::new();
    bag.add_simple_value(1);
    group.add_field("ghost", bag);

    let condition = SearchCondition::new_unchecked(fields(), group);
    assert_eq!(
        StringQueryExporter::new().export(&condition),
        Err(SearchError::UnknownField("ghost".to_string()))
    );
}

#[test]
fn test_export_skips_empty_bags() {
    let mut group = ValuesGroup::new(GroupLogical::Or);
    group.add_field("id", ValuesBag::new());
    let condition = SearchCondition::new(fields(), group).unwrap();

    assert_eq!(StringQueryExporter::new().export(&condition).unwrap(), "*");
}

#[test]
fn test_custom_label_resolver_round_trip() {
    let resolver = |f: &FieldConfig| format!("f-{}", f.name());
    let condition = SearchConditionBuilder::new(fields())
        .field("id", |b| b.simple(4))
        .build()
        .unwrap();

    let text = StringQueryExporter::with_label_resolver(resolver)
        .export(&condition)
        .unwrap();
    assert_eq!(text, "f-id: 4;");

    let parsed = StringQueryParser::with_label_resolver(fields(), resolver)
        .parse(&text)
        .unwrap();
    assert_eq!(parsed, condition);
}

#[test]
fn test_parse_rejects_unsupported_kind() {
    let result = StringQueryParser::new(fields()).parse("active: true ~ false");
    assert!(matches!(result, Err(SearchError::UnsupportedValueKind { .. })));

    let result = StringQueryParser::new(fields()).parse("active: maybe");
    assert!(matches!(result, Err(SearchError::InvalidValue { .. })));

    let result = StringQueryParser::new(fields()).parse("id: ~* 1");
    assert!(matches!(result, Err(SearchError::UnsupportedValueKind { .. })));
}

#[test]
fn test_parse_reports_position() {
    let err = StringQueryParser::new(fields())
        .parse("id: 1; name: x y")
        .unwrap_err();
    match err {
        SearchError::Parse { position, .. } => assert_eq!(position, 15),
        other => panic!("unexpected error: {}", other),
    }
}

#[test]
fn test_bag_entries_follow_export_order() {
    let condition = StringQueryParser::new(fields())
        .parse("id: > 5, 1, !2")
        .unwrap();
    let bag = condition.values_group().field("id").unwrap();
    let kinds: Vec<_> = bag.entries().map(|e| e.kind()).collect();
    assert_eq!(kinds, vec!["simple value", "excluded value", "comparison"]);
    assert!(matches!(bag.entries().next(), Some(BagEntry::Simple(Value::Integer(1)))));
}

#[cfg(feature = "serde")]
#[test]
fn test_values_group_serde_round_trip() {
    let condition = SearchConditionBuilder::new(fields())
        .field("id", |b| b.simple(1).range(Range::inclusive(2, 3)))
        .group(GroupLogical::Or, |g| {
            g.field("name", |b| b.pattern(PatternMatch::new("x", PatternMatchType::Contains)))
        })
        .build()
        .unwrap();

    let json = serde_json::to_string(condition.values_group()).unwrap();
    let back: ValuesGroup = serde_json::from_str(&json).unwrap();
    assert_eq!(&back, condition.values_group());
}
