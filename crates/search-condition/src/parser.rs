//! StringQuery parser implementation using nom.
//!
//! Reads the notation written by [`StringQueryExporter`](crate::StringQueryExporter)
//! back into a [`SearchCondition`]. Parsing happens in two passes: a syntax
//! pass producing raw text tokens, then a typing pass that resolves labels
//! against the field set and converts each value to its field type.
//!
//! ```text
//! query     = ws [ "*" ] body ws
//! body      = { ws ( group | field ) ws }
//! group     = [ "*" ] "(" ws body ws ")" ws [ ";" ]
//! field     = label ws ":" ws [ value { ws "," ws value } ] ws ( ";" | &")" | EOF )
//! value     = pattern | compare | "!" range | "!" scalar | range | scalar
//! pattern   = "~" [ "i" ] [ "!" ] ( "*" | ">" | "<" | "?" | "=" ) ws scalar
//! compare   = ( "<>" | "<=" | ">=" | "<" | ">" | "=" ) ws scalar
//! range     = [ "]" ] scalar ws "~" ws scalar [ "[" ]
//! scalar    = '"' { '""' | any-but-quote } '"' | bare
//! ```
//!
//! A root `*` directly followed by `(` is read as the marker of an OR
//! subgroup, not of the root group.

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use nom::{
    branch::alt,
    bytes::complete::{tag, take_while1},
    character::complete::{char, multispace0, none_of, one_of},
    combinator::{all_consuming, cut, eof, map, not, opt, peek, value},
    multi::{fold_many0, many0, separated_list0},
    sequence::{delimited, pair, preceded, terminated},
    IResult,
};
use tracing::debug;

use crate::condition::{GroupLogical, SearchCondition, ValuesBag, ValuesGroup};
use crate::error::{SearchError, SearchResult};
use crate::exporter::{default_label_resolver, LabelResolver, STRUCTURAL_CHARS};
use crate::field::{FieldConfig, FieldSet};
use crate::value::{Compare, CompareOperator, PatternMatch, PatternMatchType, Range};

// ============================================================================
// Raw syntax tree
// ============================================================================

#[derive(Debug, Clone, PartialEq)]
struct RawRange {
    lower: String,
    upper: String,
    inclusive_lower: bool,
    inclusive_upper: bool,
}

#[derive(Debug, Clone, PartialEq)]
enum RawValue {
    Simple(String),
    Excluded(String),
    Range(RawRange),
    ExcludedRange(RawRange),
    Compare(CompareOperator, String),
    Pattern {
        pattern_type: PatternMatchType,
        case_insensitive: bool,
        value: String,
    },
}

#[derive(Debug, Clone, PartialEq)]
enum RawItem {
    Field { label: String, values: Vec<RawValue> },
    Group(RawGroup),
}

#[derive(Debug, Clone, PartialEq)]
struct RawGroup {
    logical: GroupLogical,
    items: Vec<RawItem>,
}

// ============================================================================
// Public entry point
// ============================================================================

/// Parses StringQuery text into search conditions.
///
/// Fields may be referenced by their resolved label or by their name.
///
/// ```rust
/// use search_condition::{FieldSet, FieldType, StringQueryParser, Value};
///
/// let fields = FieldSet::builder().add("id", FieldType::Integer).build_shared();
/// let condition = StringQueryParser::new(fields).parse("id: 2, 5").unwrap();
///
/// let bag = condition.values_group().field("id").unwrap();
/// assert_eq!(bag.simple_values(), &[Value::Integer(2), Value::Integer(5)]);
/// ```
#[derive(Clone)]
pub struct StringQueryParser {
    field_set: Arc<FieldSet>,
    label_resolver: LabelResolver,
}

impl fmt::Debug for StringQueryParser {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StringQueryParser")
            .field("fields", &self.field_set.len())
            .finish_non_exhaustive()
    }
}

impl StringQueryParser {
    /// Creates a parser accepting each field's `label` option or name.
    pub fn new(field_set: Arc<FieldSet>) -> Self {
        Self {
            field_set,
            label_resolver: default_label_resolver(),
        }
    }

    /// Creates a parser with a custom label resolver.
    pub fn with_label_resolver<F>(field_set: Arc<FieldSet>, resolver: F) -> Self
    where
        F: Fn(&FieldConfig) -> String + Send + Sync + 'static,
    {
        Self {
            field_set,
            label_resolver: Arc::new(resolver),
        }
    }

    /// Parses a query.
    ///
    /// Empty input yields an empty condition. The result is validated like
    /// a built condition.
    pub fn parse(&self, input: &str) -> SearchResult<SearchCondition> {
        let raw = match all_consuming(query)(input) {
            Ok((_, raw)) => raw,
            Err(nom::Err::Error(e)) | Err(nom::Err::Failure(e)) => {
                let position = input.len() - e.input.len();
                return Err(SearchError::Parse {
                    position,
                    message: format!("unexpected input at: '{}'", truncate(e.input, 20)),
                });
            }
            Err(nom::Err::Incomplete(_)) => {
                return Err(SearchError::Parse {
                    position: input.len(),
                    message: "incomplete input".to_string(),
                });
            }
        };

        let labels: HashMap<String, String> = self
            .field_set
            .all()
            .map(|f| ((self.label_resolver)(f), f.name().to_string()))
            .collect();

        let group = self.convert_group(raw, &labels)?;
        debug!(
            length = input.len(),
            values = group.count_values(),
            "parsed string query"
        );
        SearchCondition::new(Arc::clone(&self.field_set), group)
    }

    fn resolve_field<'a>(
        &'a self,
        label: &str,
        labels: &HashMap<String, String>,
    ) -> SearchResult<&'a FieldConfig> {
        match labels.get(label) {
            Some(name) => self.field_set.get(name),
            None => self.field_set.get(label),
        }
    }

    fn convert_group(
        &self,
        raw: RawGroup,
        labels: &HashMap<String, String>,
    ) -> SearchResult<ValuesGroup> {
        let mut group = ValuesGroup::new(raw.logical);

        for item in raw.items {
            match item {
                RawItem::Field { label, values } => {
                    let field = self.resolve_field(&label, labels)?;
                    let bag = Self::convert_values(field, values)?;
                    group.add_field(field.name(), bag);
                }
                RawItem::Group(nested) => {
                    group.add_group(self.convert_group(nested, labels)?);
                }
            }
        }

        Ok(group)
    }

    fn convert_values(field: &FieldConfig, values: Vec<RawValue>) -> SearchResult<ValuesBag> {
        let name = field.name();
        let field_type = field.field_type();
        let convert_range = |raw: RawRange| -> SearchResult<Range> {
            Ok(Range::new(
                field_type.parse_value(name, &raw.lower)?,
                field_type.parse_value(name, &raw.upper)?,
                raw.inclusive_lower,
                raw.inclusive_upper,
            ))
        };

        let mut bag = ValuesBag::new();
        for raw in values {
            match raw {
                RawValue::Simple(v) => bag.add_simple_value(field_type.parse_value(name, &v)?),
                RawValue::Excluded(v) => bag.add_excluded_value(field_type.parse_value(name, &v)?),
                RawValue::Range(r) => bag.add_range(convert_range(r)?),
                RawValue::ExcludedRange(r) => bag.add_excluded_range(convert_range(r)?),
                RawValue::Compare(operator, v) => {
                    bag.add_comparison(Compare::new(operator, field_type.parse_value(name, &v)?))
                }
                RawValue::Pattern {
                    pattern_type,
                    case_insensitive,
                    value,
                } => bag.add_pattern_match(PatternMatch {
                    value,
                    pattern_type,
                    case_insensitive,
                }),
            }
        }
        Ok(bag)
    }
}

fn truncate(s: &str, max_len: usize) -> &str {
    match s.char_indices().nth(max_len) {
        Some((idx, _)) => &s[..idx],
        None => s,
    }
}

// ============================================================================
// Lexical helpers
// ============================================================================

fn ws(input: &str) -> IResult<&str, &str> {
    multispace0(input)
}

fn sym<'a>(c: char) -> impl FnMut(&'a str) -> IResult<&'a str, char> {
    char(c)
}

fn is_bare_char(c: char) -> bool {
    !c.is_whitespace() && !STRUCTURAL_CHARS.contains(&c)
}

fn bare(input: &str) -> IResult<&str, String> {
    map(take_while1(is_bare_char), String::from)(input)
}

fn quoted(input: &str) -> IResult<&str, String> {
    delimited(
        sym('"'),
        fold_many0(
            alt((value('"', tag("\"\"")), none_of("\""))),
            String::new,
            |mut acc: String, c: char| {
                acc.push(c);
                acc
            },
        ),
        sym('"'),
    )(input)
}

fn scalar(input: &str) -> IResult<&str, String> {
    alt((quoted, bare))(input)
}

fn label(input: &str) -> IResult<&str, &str> {
    take_while1(|c: char| is_bare_char(c) && c != ':')(input)
}

// ============================================================================
// Values
// ============================================================================

fn range(input: &str) -> IResult<&str, RawRange> {
    let (input, open) = opt(sym(']'))(input)?;
    let (input, lower) = scalar(input)?;
    let (input, _) = delimited(ws, sym('~'), ws)(input)?;
    let (input, upper) = scalar(input)?;
    let (input, close) = opt(sym('['))(input)?;

    Ok((
        input,
        RawRange {
            lower,
            upper,
            inclusive_lower: open.is_none(),
            inclusive_upper: close.is_none(),
        },
    ))
}

fn compare_operator(input: &str) -> IResult<&str, CompareOperator> {
    alt((
        value(CompareOperator::NotEqual, tag("<>")),
        value(CompareOperator::LowerOrEqual, tag("<=")),
        value(CompareOperator::GreaterOrEqual, tag(">=")),
        value(CompareOperator::Lower, tag("<")),
        value(CompareOperator::Greater, tag(">")),
        value(CompareOperator::Equal, tag("=")),
    ))(input)
}

fn compare(input: &str) -> IResult<&str, RawValue> {
    let (input, operator) = compare_operator(input)?;
    let (input, value) = preceded(ws, scalar)(input)?;
    Ok((input, RawValue::Compare(operator, value)))
}

fn pattern(input: &str) -> IResult<&str, RawValue> {
    let (input, _) = sym('~')(input)?;
    let (input, case_insensitive) = opt(sym('i'))(input)?;
    let (input, negated) = opt(sym('!'))(input)?;
    let (input, symbol) = one_of::<_, _, nom::error::Error<&str>>("*><?=")(input)?;
    let (input, value) = preceded(ws, scalar)(input)?;

    let pattern_type = match symbol {
        '>' => PatternMatchType::StartsWith,
        '<' => PatternMatchType::EndsWith,
        '?' => PatternMatchType::Regex,
        '=' => PatternMatchType::Equals,
        _ => PatternMatchType::Contains,
    };
    let pattern_type = if negated.is_some() {
        pattern_type.negated()
    } else {
        pattern_type
    };

    Ok((
        input,
        RawValue::Pattern {
            pattern_type,
            case_insensitive: case_insensitive.is_some(),
            value,
        },
    ))
}

fn raw_value(input: &str) -> IResult<&str, RawValue> {
    alt((
        pattern,
        compare,
        map(preceded(sym('!'), range), RawValue::ExcludedRange),
        map(preceded(sym('!'), scalar), RawValue::Excluded),
        map(range, RawValue::Range),
        map(scalar, RawValue::Simple),
    ))(input)
}

// ============================================================================
// Structure
// ============================================================================

fn part_end(input: &str) -> IResult<&str, ()> {
    alt((
        value((), sym(';')),
        value((), peek(sym(')'))),
        value((), eof),
    ))(input)
}

fn field_part(input: &str) -> IResult<&str, RawItem> {
    let (input, label) = label(input)?;
    let (input, _) = delimited(ws, sym(':'), ws)(input)?;
    // a label and its colon commit to a field part; errors past here are final
    let (input, values) = cut(terminated(
        separated_list0(delimited(ws, sym(','), ws), raw_value),
        preceded(ws, part_end),
    ))(input)?;

    Ok((
        input,
        RawItem::Field {
            label: label.to_string(),
            values,
        },
    ))
}

fn group_part(input: &str) -> IResult<&str, RawItem> {
    let (input, (marker, _)) = pair(opt(sym('*')), sym('('))(input)?;
    let (input, items) = body(input)?;
    let (input, _) = preceded(ws, sym(')'))(input)?;
    let (input, _) = preceded(ws, opt(sym(';')))(input)?;

    let logical = if marker.is_some() {
        GroupLogical::Or
    } else {
        GroupLogical::And
    };
    Ok((input, RawItem::Group(RawGroup { logical, items })))
}

fn body(input: &str) -> IResult<&str, Vec<RawItem>> {
    many0(delimited(ws, alt((group_part, field_part)), ws))(input)
}

fn query(input: &str) -> IResult<&str, RawGroup> {
    let (input, _) = ws(input)?;
    let (input, marker) = opt(terminated(sym('*'), not(sym('('))))(input)?;
    let (input, items) = body(input)?;
    let (input, _) = ws(input)?;

    let logical = if marker.is_some() {
        GroupLogical::Or
    } else {
        GroupLogical::And
    };
    Ok((input, RawGroup { logical, items }))
}
