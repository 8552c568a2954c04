use std::io::{self, Read};
use std::str::FromStr;

use clap::Parser as _;
use condq::{Kind, OpSet, Parser, ParserConfig, Zone};
use miette::{Diagnostic, IntoDiagnostic};
use slog::{o, Discard, Drain, Logger};
use thiserror::Error;

/// Extract typed conditions from a delimited query string
#[derive(clap::Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// condition to extract, as key:kind[:op,op,...]; kinds are
    /// text, list, int, ints, float, bool and time; ops default to `=`
    #[arg(short, long = "cond", required = true)]
    conditions: Vec<ConditionSpec>,

    /// clause delimiter
    #[arg(short, long, default_value = "&")]
    delimiter: String,

    /// zone for time conditions: UTC, local, an IANA name like Asia/Tokyo,
    /// or an offset like +09:00
    #[arg(long, default_value = "UTC")]
    tz: Zone,

    /// reject operator lists where a shorter operator shadows a longer one
    #[arg(long)]
    strict: bool,

    /// print results as JSON
    #[cfg(feature = "json")]
    #[arg(long)]
    json: bool,

    /// log matching decisions to stderr
    #[arg(short, long)]
    verbose: bool,

    /// query to parse, read from stdin when omitted
    query: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Error, Diagnostic)]
enum ConditionSpecError {
    #[error("condition '{0}' has no kind")]
    #[diagnostic(
        code(condq::condition_spec),
        help("write conditions as key:kind[:op,op,...]")
    )]
    MissingKind(String),

    #[error("condition '{0}' has an empty key")]
    #[diagnostic(code(condq::condition_spec))]
    EmptyKey(String),

    #[error("condition '{spec}': {reason}")]
    #[diagnostic(code(condq::condition_spec))]
    UnknownKind { spec: String, reason: String },
}

#[derive(Debug, Clone, PartialEq)]
struct ConditionSpec {
    key: String,
    kind: Kind,
    ops: Vec<String>,
}

impl FromStr for ConditionSpec {
    type Err = ConditionSpecError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut parts = s.splitn(3, ':');
        let key = parts.next().unwrap_or_default();
        let kind = parts
            .next()
            .ok_or_else(|| ConditionSpecError::MissingKind(s.to_owned()))?;

        if key.is_empty() {
            return Err(ConditionSpecError::EmptyKey(s.to_owned()));
        }

        let kind = kind
            .trim()
            .parse::<Kind>()
            .map_err(|reason| ConditionSpecError::UnknownKind {
                spec: s.to_owned(),
                reason,
            })?;

        let ops = match parts.next() {
            Some(ops) if !ops.is_empty() => ops.split(',').map(str::to_owned).collect(),
            _ => vec!["=".to_owned()],
        };

        Ok(ConditionSpec {
            key: key.to_owned(),
            kind,
            ops,
        })
    }
}

fn logger(verbose: bool) -> Logger {
    if !verbose {
        return Logger::root(Discard, o!());
    }

    let plain = slog_term::PlainSyncDecorator::new(std::io::stderr());
    Logger::root(slog_term::FullFormat::new(plain).build().fuse(), o!())
}

fn build_parser(args: &Args, logger: Logger) -> miette::Result<Parser> {
    let config = ParserConfig::default()
        .delimiter(args.delimiter.as_str())
        .default_zone(args.tz)
        .logger(logger);
    let mut parser = Parser::with_config(config);

    for spec in &args.conditions {
        let set = if args.strict {
            OpSet::strict(spec.ops.iter().cloned())?
        } else {
            OpSet::new(spec.ops.iter().cloned())
        };

        match spec.kind {
            Kind::Timestamp(_) => parser.timestamp(spec.key.as_str(), set, None),
            kind => parser.register(spec.key.as_str(), set, kind),
        };
    }

    Ok(parser)
}

#[cfg(feature = "json")]
fn render_json(parser: &Parser, parsed: &condq::Parsed) -> serde_json::Result<String> {
    #[derive(serde::Serialize)]
    struct Row<'a> {
        condition: &'a str,
        kind: String,
        matched: bool,
        op: Option<&'a condq::Op>,
        value: Option<&'a condq::Value>,
    }

    let rows: Vec<Row<'_>> = parser
        .conditions()
        .map(|(handle, cond)| Row {
            condition: cond.key(),
            kind: cond.kind().to_string(),
            matched: parsed.is_set(handle),
            op: parsed.get(handle).filter(|s| s.is_matched()).map(|s| s.op()),
            value: parsed.value(handle),
        })
        .collect();

    serde_json::to_string_pretty(&rows)
}

fn print_text(parser: &Parser, parsed: &condq::Parsed) {
    for (handle, cond) in parser.conditions() {
        let sink = &parsed[handle];
        if sink.is_matched() {
            println!("{} {} {}", cond.key(), sink.op(), sink.value());
        } else {
            println!("{} <unset>", cond.key());
        }
    }
}

fn main() -> miette::Result<()> {
    let args = Args::parse();
    let parser = build_parser(&args, logger(args.verbose))?;

    let query = match &args.query {
        Some(q) => q.clone(),
        None => {
            let mut buf = String::new();
            io::stdin().read_to_string(&mut buf).into_diagnostic()?;
            buf
        }
    };

    let parsed = parser.parse(&query)?;

    #[cfg(feature = "json")]
    if args.json {
        println!("{}", render_json(&parser, &parsed).into_diagnostic()?);
        return Ok(());
    }

    print_text(&parser, &parsed);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_condition_spec() {
        let cases = vec![
            (
                "id:int",
                ConditionSpec {
                    key: "id".into(),
                    kind: Kind::Int,
                    ops: vec!["=".into()],
                },
            ),
            (
                "age:int:<=,>=,=",
                ConditionSpec {
                    key: "age".into(),
                    kind: Kind::Int,
                    ops: vec!["<=".into(), ">=".into(), "=".into()],
                },
            ),
            (
                "ts:time:",
                ConditionSpec {
                    key: "ts".into(),
                    kind: Kind::Timestamp(Zone::Utc),
                    ops: vec!["=".into()],
                },
            ),
        ];

        for (input, expected) in cases {
            assert_eq!(input.parse::<ConditionSpec>().unwrap(), expected, "Failed for: {}", input);
        }
    }

    #[test]
    fn test_condition_spec_errors() {
        assert_eq!(
            "id".parse::<ConditionSpec>(),
            Err(ConditionSpecError::MissingKind("id".into()))
        );
        assert_eq!(
            ":int".parse::<ConditionSpec>(),
            Err(ConditionSpecError::EmptyKey(":int".into()))
        );
        assert!(matches!(
            "id:uuid".parse::<ConditionSpec>(),
            Err(ConditionSpecError::UnknownKind { .. })
        ));
    }

    #[test]
    fn test_build_parser_from_args() {
        let args = Args::try_parse_from([
            "condq",
            "-c",
            "n:ints",
            "-c",
            "ts:time",
            "--tz",
            "Asia/Tokyo",
            "n=1, 2&ts=2020-12-26 14:20:33",
        ])
        .unwrap();

        let parser = build_parser(&args, logger(false)).unwrap();
        let parsed = parser.parse(args.query.as_deref().unwrap()).unwrap();
        let values: Vec<String> = parsed.iter().map(|(_, s)| s.value().to_string()).collect();
        assert_eq!(values, vec!["[1, 2]", "2020-12-26 14:20:33 +09:00"]);
    }

    #[test]
    fn test_strict_flag_rejects_shadowing() {
        let args = Args::try_parse_from(["condq", "--strict", "-c", "n:int:<,<=", "n<=1"]).unwrap();
        assert!(build_parser(&args, logger(false)).is_err());

        let args = Args::try_parse_from(["condq", "-c", "n:int:<,<=", "n<1"]).unwrap();
        assert!(build_parser(&args, logger(false)).is_ok());
    }

    #[cfg(feature = "json")]
    #[test]
    fn test_json_rows_for_matched_and_unset() {
        let args = Args::try_parse_from([
            "condq", "--json", "-c", "n:ints:>=,=", "-c", "ts:time", "-c", "name:text", "n>=1,2&name=x",
        ])
        .unwrap();
        let parser = build_parser(&args, logger(false)).unwrap();
        let parsed = parser.parse(args.query.as_deref().unwrap()).unwrap();

        let out = render_json(&parser, &parsed).unwrap();
        let rows: serde_json::Value = serde_json::from_str(&out).unwrap();
        assert_eq!(
            rows,
            serde_json::json!([
                {"condition": "n", "kind": "ints", "matched": true, "op": ">=", "value": [1, 2]},
                {"condition": "ts", "kind": "time(UTC)", "matched": false, "op": null, "value": null},
                {"condition": "name", "kind": "text", "matched": true, "op": "=", "value": "x"},
            ])
        );
    }
}
