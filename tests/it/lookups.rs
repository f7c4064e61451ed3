// Copyright 2023 Datafuse Labs.
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

use std::sync::Arc;

use jsonfallback::Backend;
use jsonfallback::Column;
use jsonfallback::ColumnCompiler;
use jsonfallback::ConnectionInfo;
use jsonfallback::DefaultEncoder;
use jsonfallback::Error;
use jsonfallback::Fragment;
use jsonfallback::JsonAdapter;
use jsonfallback::JsonExtract;
use jsonfallback::JsonField;
use jsonfallback::KeyPath;
use jsonfallback::LookupExpr;
use jsonfallback::Object;
use jsonfallback::SqlParam;
use jsonfallback::Value;

fn compile(lookup: &LookupExpr<Column>, connection: &ConnectionInfo) -> Result<Fragment, Error> {
    lookup.as_sql(&mut ColumnCompiler::new(connection), connection)
}

fn text(v: &str) -> SqlParam {
    SqlParam::Text(v.to_string())
}

fn json(v: impl Into<Value>) -> SqlParam {
    SqlParam::Json(JsonAdapter::new(v.into(), Arc::new(DefaultEncoder)))
}

fn object(members: &[(&str, Value)]) -> Value {
    let mut obj = Object::new();
    for (k, v) in members {
        obj.insert(k.to_string(), v.clone());
    }
    Value::Object(obj)
}

#[test]
fn test_has_key() {
    let field = JsonField::new("data");
    let lookup = field.lookup("has_key", "title").unwrap();

    let sql = compile(&lookup, &ConnectionInfo::postgresql()).unwrap();
    assert_eq!(sql.sql, r#""data" ? %s"#);
    assert_eq!(sql.params, vec![text("title")]);

    let sql = compile(&lookup, &ConnectionInfo::mysql(&[8, 0])).unwrap();
    assert_eq!(sql.sql, "JSON_CONTAINS_PATH(`data`, 'one', %s)");
    assert_eq!(sql.params, vec![text("$.title")]);

    let sql = compile(&field.lookup("has_key", "0").unwrap(), &ConnectionInfo::mysql(&[8, 0]))
        .unwrap();
    assert_eq!(sql.params, vec![text(r#"$."0""#)]);
}

#[test]
fn test_has_keys() {
    let field = JsonField::new("data");
    let all = field.lookup("has_keys", vec!["a", "b c"]).unwrap();
    let any = field.key("meta").lookup("has_any_keys", vec!["a", "b"]).unwrap();

    let pg = ConnectionInfo::postgresql();
    let sql = compile(&all, &pg).unwrap();
    assert_eq!(sql.sql, r#""data" ?& %s"#);
    assert_eq!(
        sql.params,
        vec![SqlParam::TextArray(vec!["a".to_string(), "b c".to_string()])]
    );
    let sql = compile(&any, &pg).unwrap();
    assert_eq!(sql.sql, r#"("data" -> %s) ?| %s"#);
    assert_eq!(
        sql.params,
        vec![
            text("meta"),
            SqlParam::TextArray(vec!["a".to_string(), "b".to_string()])
        ]
    );

    let mysql = ConnectionInfo::mysql(&[5, 7, 22]);
    let sql = compile(&all, &mysql).unwrap();
    assert_eq!(sql.sql, "JSON_CONTAINS_PATH(`data`, 'all', %s, %s)");
    assert_eq!(sql.params, vec![text("$.a"), text(r#"$."b c""#)]);
    let sql = compile(&any, &mysql).unwrap();
    assert_eq!(sql.sql, "JSON_CONTAINS_PATH(`data`, 'one', %s, %s)");
    assert_eq!(sql.params, vec![text("$.meta.a"), text("$.meta.b")]);
}

#[test]
fn test_exact() {
    let field = JsonField::new("data");
    let doc = object(&[("author", Value::from("Rowling"))]);
    let whole = field.lookup("exact", doc.clone()).unwrap();

    let sql = compile(&whole, &ConnectionInfo::postgresql()).unwrap();
    assert_eq!(sql.sql, r#""data" = %s"#);
    assert_eq!(sql.params, vec![json(doc.clone())]);

    let sql = compile(&whole, &ConnectionInfo::mysql(&[5, 7])).unwrap();
    assert_eq!(sql.sql, "`data` = CAST(%s AS JSON)");
    assert_eq!(sql.params, vec![text(r#"{"author": "Rowling"}"#)]);

    let sql = compile(&whole, &ConnectionInfo::mariadb(&[10, 3])).unwrap();
    assert_eq!(sql.sql, "`data` = %s");
    assert_eq!(sql.params, vec![text(r#"{"author": "Rowling"}"#)]);
}

#[test]
fn test_exact_on_key_path() {
    let field = JsonField::new("data");
    let mysql = ConnectionInfo::mysql(&[8, 0]);

    let year = field.key("year").lookup("exact", 1997).unwrap();
    let sql = compile(&year, &ConnectionInfo::postgresql()).unwrap();
    assert_eq!(sql.sql, r#"("data" -> %s) = %s"#);
    assert_eq!(sql.params, vec![text("year"), json(1997)]);
    let sql = compile(&year, &mysql).unwrap();
    assert_eq!(sql.sql, "JSON_EXTRACT(`data`, %s) = %s");
    assert_eq!(sql.params, vec![text("$.year"), SqlParam::Int(1997)]);

    let title = field.key("title").lookup("exact", "Harry Potter").unwrap();
    let sql = compile(&title, &mysql).unwrap();
    assert_eq!(sql.params, vec![text("$.title"), text("Harry Potter")]);

    let tags = field.key("tags").lookup("exact", vec!["a"]).unwrap();
    let sql = compile(&tags, &mysql).unwrap();
    assert_eq!(sql.sql, "JSON_EXTRACT(`data`, %s) = CAST(%s AS JSON)");
    assert_eq!(sql.params, vec![text("$.tags"), text(r#"["a"]"#)]);

    let missing = field.key("sequel").lookup("exact", Value::Null).unwrap();
    let sql = compile(&missing, &mysql).unwrap();
    assert_eq!(sql.sql, "JSON_EXTRACT(`data`, %s) = CAST(%s AS JSON)");
    assert_eq!(sql.params, vec![text("$.sequel"), text("null")]);

    let flag = field.key("flag").lookup("exact", true).unwrap();
    let sql = compile(&flag, &mysql).unwrap();
    assert_eq!(sql.sql, "JSON_EXTRACT(`data`, %s) = CAST(%s AS JSON)");
    assert_eq!(sql.params, vec![text("$.flag"), text("true")]);
    let sql = compile(&flag, &ConnectionInfo::mariadb(&[10, 5])).unwrap();
    assert_eq!(sql.sql, "JSON_EXTRACT(`data`, %s) = %s");
    assert_eq!(sql.params, vec![text("$.flag"), text("true")]);
    let sql = compile(&flag, &ConnectionInfo::postgresql()).unwrap();
    assert_eq!(sql.params, vec![text("flag"), json(true)]);

    let nested = field.key("a").key(0).key("b").lookup("exact", "x").unwrap();
    let sql = compile(&nested, &ConnectionInfo::postgresql()).unwrap();
    assert_eq!(sql.sql, r#"((("data" -> %s) -> %s) -> %s) = %s"#);
    assert_eq!(
        sql.params,
        vec![text("a"), SqlParam::Int(0), text("b"), json("x")]
    );
    let sql = compile(&nested, &mysql).unwrap();
    assert_eq!(sql.params, vec![text("$.a[0].b"), text("x")]);
}

#[test]
fn test_containment() {
    let field = JsonField::new("data");
    let doc = object(&[("author", Value::from("Rowling"))]);
    let contains = field.lookup("contains", doc.clone()).unwrap();
    let contained_by = field.key("a").lookup("contained_by", doc.clone()).unwrap();

    let pg = ConnectionInfo::postgresql();
    let sql = compile(&contains, &pg).unwrap();
    assert_eq!(sql.sql, r#""data" @> %s"#);
    assert_eq!(sql.params, vec![json(doc.clone())]);
    let sql = compile(&contained_by, &pg).unwrap();
    assert_eq!(sql.sql, r#"("data" -> %s) <@ %s"#);
    assert_eq!(sql.params, vec![text("a"), json(doc)]);

    let mysql = ConnectionInfo::mysql(&[8, 0]);
    let sql = compile(&contains, &mysql).unwrap();
    assert_eq!(sql.sql, "JSON_CONTAINS(`data`, %s)");
    assert_eq!(sql.params, vec![text(r#"{"author": "Rowling"}"#)]);

    // the document comes first, and so does its parameter
    let sql = compile(&contained_by, &mysql).unwrap();
    assert_eq!(sql.sql, "JSON_CONTAINS(%s, JSON_EXTRACT(`data`, %s))");
    assert_eq!(
        sql.params,
        vec![text(r#"{"author": "Rowling"}"#), text("$.a")]
    );
}

#[test]
fn test_text_lookups() {
    let field = JsonField::new("data");
    let pg = ConnectionInfo::postgresql();
    let mysql = ConnectionInfo::mysql(&[8, 0]);
    let cases = [
        (
            "icontains",
            r#"LOWER(("data" ->> %s)) LIKE LOWER(%s)"#,
            "LOWER(JSON_UNQUOTE(JSON_EXTRACT(`data`, %s))) LIKE LOWER(%s)",
            "%50\\%%",
        ),
        (
            "startswith",
            r#"("data" ->> %s) LIKE %s"#,
            "JSON_UNQUOTE(JSON_EXTRACT(`data`, %s)) LIKE BINARY %s",
            "50\\%%",
        ),
        (
            "iendswith",
            r#"LOWER(("data" ->> %s)) LIKE LOWER(%s)"#,
            "LOWER(JSON_UNQUOTE(JSON_EXTRACT(`data`, %s))) LIKE LOWER(%s)",
            "%50\\%",
        ),
        (
            "iexact",
            r#"LOWER(("data" ->> %s)) = LOWER(%s)"#,
            "LOWER(JSON_UNQUOTE(JSON_EXTRACT(`data`, %s))) = LOWER(%s)",
            "50%",
        ),
        (
            "regex",
            r#"("data" ->> %s) ~ %s"#,
            "JSON_UNQUOTE(JSON_EXTRACT(`data`, %s)) REGEXP BINARY %s",
            "50%",
        ),
        (
            "iregex",
            r#"("data" ->> %s) ~* %s"#,
            "LOWER(JSON_UNQUOTE(JSON_EXTRACT(`data`, %s))) REGEXP %s",
            "50%",
        ),
    ];
    for (name, rich, function, pattern) in cases {
        let lookup = field.key("price").lookup(name, "50%").unwrap();

        let sql = compile(&lookup, &pg).unwrap();
        assert_eq!(sql.sql, rich, "{name}");
        assert_eq!(sql.params, vec![text("price"), text(pattern)], "{name}");

        let sql = compile(&lookup, &mysql).unwrap();
        assert_eq!(sql.sql, function, "{name}");
        assert_eq!(sql.params, vec![text("$.price"), text(pattern)], "{name}");
    }
}

#[test]
fn test_regex_lookups() {
    let field = JsonField::new("data");
    let pattern = r"^\D+$";
    let regex = field.key("code").lookup("regex", pattern).unwrap();
    let iregex = field.key("code").lookup("iregex", pattern).unwrap();
    let params = vec![text("$.code"), text(pattern)];

    for connection in [
        ConnectionInfo::mysql(&[8, 0, 30]),
        ConnectionInfo::new("default", "mysql"),
    ] {
        let sql = compile(&regex, &connection).unwrap();
        assert_eq!(
            sql.sql,
            "REGEXP_LIKE(JSON_UNQUOTE(JSON_EXTRACT(`data`, %s)), %s, 'c')"
        );
        assert_eq!(sql.params, params);
        let sql = compile(&iregex, &connection).unwrap();
        assert_eq!(
            sql.sql,
            "REGEXP_LIKE(JSON_UNQUOTE(JSON_EXTRACT(`data`, %s)), %s, 'i')"
        );
        assert_eq!(sql.params, params);
    }

    for connection in [
        ConnectionInfo::mysql(&[5, 7, 22]),
        ConnectionInfo::mariadb(&[10, 5]),
    ] {
        let sql = compile(&regex, &connection).unwrap();
        assert_eq!(
            sql.sql,
            "JSON_UNQUOTE(JSON_EXTRACT(`data`, %s)) REGEXP BINARY %s"
        );
        assert_eq!(sql.params, params);
        let sql = compile(&iregex, &connection).unwrap();
        assert_eq!(
            sql.sql,
            "LOWER(JSON_UNQUOTE(JSON_EXTRACT(`data`, %s))) REGEXP %s"
        );
        assert_eq!(sql.params, params);
    }

    let pg = ConnectionInfo::postgresql();
    let sql = compile(&regex, &pg).unwrap();
    assert_eq!(sql.sql, r#"("data" ->> %s) ~ %s"#);
    assert_eq!(sql.params, vec![text("code"), text(pattern)]);
    let sql = compile(&iregex, &pg).unwrap();
    assert_eq!(sql.sql, r#"("data" ->> %s) ~* %s"#);
    assert_eq!(sql.params, vec![text("code"), text(pattern)]);
}

#[test]
fn test_percent_in_column_name() {
    let field = JsonField::new("pct%s");
    let lookup = field.lookup("has_key", "a").unwrap();

    let sql = compile(&lookup, &ConnectionInfo::mysql(&[8, 0])).unwrap();
    assert_eq!(sql.sql, "JSON_CONTAINS_PATH(`pct%%s`, 'one', %s)");
    assert_eq!(sql.params, vec![text("$.a")]);
    assert_eq!(sql.placeholder_count(), sql.params.len());

    let sql = compile(&lookup, &ConnectionInfo::postgresql()).unwrap();
    assert_eq!(sql.sql, r#""pct%%s" ? %s"#);
    assert_eq!(sql.params, vec![text("a")]);
    assert_eq!(sql.placeholder_count(), sql.params.len());
}

#[test]
fn test_text_lookup_on_number() {
    let field = JsonField::new("data");
    let lookup = field.key("year").lookup("startswith", 19).unwrap();
    let sql = compile(&lookup, &ConnectionInfo::mysql(&[8, 0])).unwrap();
    assert_eq!(sql.params, vec![text("$.year"), text("19%")]);
}

#[test]
fn test_ordering() {
    let field = JsonField::new("data");
    let lookup = field.key("year").lookup("lt", 2000).unwrap();

    let sql = compile(&lookup, &ConnectionInfo::postgresql()).unwrap();
    assert_eq!(sql.sql, r#"("data" -> %s) < %s"#);
    assert_eq!(sql.params, vec![text("year"), json(2000)]);

    let sql = compile(&lookup, &ConnectionInfo::mysql(&[8, 0])).unwrap();
    assert_eq!(sql.sql, "JSON_EXTRACT(`data`, %s) < %s");
    assert_eq!(sql.params, vec![text("$.year"), SqlParam::Int(2000)]);

    let gte = field.key("rating").lookup("gte", 4.5).unwrap();
    let sql = compile(&gte, &ConnectionInfo::mysql(&[8, 0])).unwrap();
    assert_eq!(sql.sql, "JSON_EXTRACT(`data`, %s) >= %s");
    assert_eq!(sql.params, vec![text("$.rating"), SqlParam::Float(4.5)]);

    let whole = field.lookup("gt", 1).unwrap();
    let sql = compile(&whole, &ConnectionInfo::postgresql()).unwrap();
    assert_eq!(sql.sql, r#""data" > %s"#);
    assert_eq!(
        compile(&whole, &ConnectionInfo::mysql(&[8, 0])),
        Err(Error::UnsupportedOperator {
            operator: "gt",
            backend: Backend::FunctionJson,
        })
    );
}

#[test]
fn test_isnull() {
    let field = JsonField::new("data").nullable(true);
    let lookup = field.lookup("isnull", true).unwrap();
    assert_eq!(
        compile(&lookup, &ConnectionInfo::sqlite()).unwrap().sql,
        r#""data" IS NULL"#
    );
    let lookup = field.lookup("isnull", false).unwrap();
    assert_eq!(
        compile(&lookup, &ConnectionInfo::mysql(&[8, 0])).unwrap().sql,
        "`data` IS NOT NULL"
    );

    let lookup = field.key("a").lookup("isnull", true).unwrap();
    assert_eq!(
        compile(&lookup, &ConnectionInfo::postgresql()),
        Err(Error::UnsupportedOperator {
            operator: "isnull",
            backend: Backend::RichJson,
        })
    );
}

#[test]
fn test_whole_value_refusal() {
    let field = JsonField::new("data");
    for name in [
        "range",
        "in",
        "iexact",
        "icontains",
        "startswith",
        "istartswith",
        "endswith",
        "iendswith",
        "search",
        "regex",
        "iregex",
    ] {
        let err = field.lookup(name, "x").unwrap_err();
        assert!(matches!(err, Error::LookupNotImplemented(op) if op == name), "{name}");
    }
    assert_eq!(
        field.lookup("startswith", "x").unwrap_err().to_string(),
        "Lookup 'startswith' doesn't work with JSON fields"
    );

    // members accept them, the gate refuses what has no translation
    let lookup = field.key("a").lookup("in", vec![1, 2]).unwrap();
    assert_eq!(
        compile(&lookup, &ConnectionInfo::postgresql()),
        Err(Error::UnsupportedOperator {
            operator: "in",
            backend: Backend::RichJson,
        })
    );
}

#[test]
fn test_operand_types() {
    let field = JsonField::new("data");
    assert_eq!(
        field.lookup("has_key", 1).unwrap_err(),
        Error::UnsupportedOperandType {
            operator: "has_key",
            expected: "string values",
        }
    );
    assert!(field.lookup("has_keys", Value::Array(vec![])).is_err());
    assert!(field.lookup("has_any_keys", vec![1, 2]).is_err());
    assert!(field.lookup("isnull", "yes").is_err());
    assert!(field.key("a").lookup("regex", 1).is_err());
    assert!(field.key("a").lookup("range", vec![1, 2, 3]).is_err());
    assert!(field.key("a").lookup("range", vec![1, 2]).is_ok());
    assert_eq!(
        field.lookup("length", 1).unwrap_err(),
        Error::UnknownLookup("length".to_string())
    );
}

#[test]
fn test_expression_operand() {
    let field = JsonField::new("data").with_table("book");
    let lookup = field
        .reference()
        .lookup_expr("exact", Column::qualified("shelf", "data"))
        .unwrap();

    let pg = ConnectionInfo::postgresql();
    let sql = compile(&lookup, &pg).unwrap();
    assert_eq!(sql.sql, r#""book"."data" = "shelf"."data""#);
    assert!(sql.params.is_empty());

    let mysql = ConnectionInfo::mysql(&[8, 0]);
    let lookup = field
        .key("a")
        .lookup_expr("contained_by", Column::new("other"))
        .unwrap();
    let sql = compile(&lookup, &mysql).unwrap();
    assert_eq!(
        sql.sql,
        "JSON_CONTAINS(`other`, JSON_EXTRACT(`book`.`data`, %s))"
    );

    assert_eq!(
        field
            .key("a")
            .lookup_expr("startswith", Column::new("other"))
            .unwrap_err(),
        Error::UnsupportedOperandType {
            operator: "startswith",
            expected: "literal values",
        }
    );
}

#[test]
fn test_closure_compiler() {
    let field = JsonField::new("data");
    let lookup = field.key("title").lookup("exact", "x").unwrap();
    let mysql = ConnectionInfo::mysql(&[8, 0]);
    let mut compiler =
        |c: &Column| -> Result<Fragment, Error> { Ok(Fragment::raw(format!("t0.{}", c.name))) };
    let sql = lookup.as_sql(&mut compiler, &mysql).unwrap();
    assert_eq!(sql.sql, "JSON_EXTRACT(t0.data, %s) = %s");
}

#[test]
fn test_filter_chain() {
    let field = JsonField::new("data");
    let mysql = ConnectionInfo::mysql(&[8, 0]);

    let lookup = field.filter("title__icontains", "potter").unwrap();
    let sql = compile(&lookup, &mysql).unwrap();
    assert_eq!(
        sql.sql,
        "LOWER(JSON_UNQUOTE(JSON_EXTRACT(`data`, %s))) LIKE LOWER(%s)"
    );
    assert_eq!(sql.params, vec![text("$.title"), text("%potter%")]);

    let lookup = field.filter("tags__0", "magic").unwrap();
    let sql = compile(&lookup, &mysql).unwrap();
    assert_eq!(sql.sql, "JSON_EXTRACT(`data`, %s) = %s");
    assert_eq!(sql.params, vec![text("$.tags[0]"), text("magic")]);

    assert!(matches!(
        field.filter("icontains", "x"),
        Err(Error::LookupNotImplemented("icontains"))
    ));
}

#[test]
fn test_key_path_expression() {
    let field = JsonField::new("data");
    let reference = field.key("a").key(0);

    let pg = ConnectionInfo::postgresql();
    let sql = reference.as_sql(&mut ColumnCompiler::new(&pg), &pg).unwrap();
    assert_eq!(sql.sql, r#"(("data" -> %s) -> %s)"#);
    assert_eq!(sql.params, vec![text("a"), SqlParam::Int(0)]);

    let mysql = ConnectionInfo::mysql(&[8, 0]);
    let sql = reference
        .as_sql(&mut ColumnCompiler::new(&mysql), &mysql)
        .unwrap();
    assert_eq!(sql.sql, "JSON_EXTRACT(`data`, %s)");
    assert_eq!(sql.params, vec![text("$.a[0]")]);

    let sqlite = ConnectionInfo::sqlite();
    assert_eq!(
        reference.as_sql(&mut ColumnCompiler::new(&sqlite), &sqlite),
        Err(Error::UnsupportedOperator {
            operator: "key_transform",
            backend: Backend::Generic,
        })
    );
}

#[test]
fn test_json_extract() {
    let extract = JsonExtract::new(Column::new("data"), KeyPath::from_tokens(["a", "0", "b"]));

    let pg = ConnectionInfo::postgresql();
    let sql = extract.as_sql(&mut ColumnCompiler::new(&pg), &pg).unwrap();
    assert_eq!(sql.sql, r#"("data" #> %s)"#);
    assert_eq!(sql.params, vec![text("{a,0,b}")]);

    let mysql = ConnectionInfo::mysql(&[8, 0]);
    let sql = extract
        .as_sql(&mut ColumnCompiler::new(&mysql), &mysql)
        .unwrap();
    assert_eq!(sql.sql, "JSON_EXTRACT(`data`, %s)");
    assert_eq!(sql.params, vec![text("$.a[0].b")]);

    let sqlite = ConnectionInfo::sqlite();
    assert!(extract
        .as_sql(&mut ColumnCompiler::new(&sqlite), &sqlite)
        .is_err());
}

#[test]
fn test_generic_backend() {
    let field = JsonField::new("data");
    let sqlite = ConnectionInfo::sqlite();
    for lookup in [
        field.lookup("has_key", "title").unwrap(),
        field.lookup("exact", 1).unwrap(),
        field.lookup("contains", vec![1]).unwrap(),
        field.key("title").lookup("startswith", "H").unwrap(),
    ] {
        let err = compile(&lookup, &sqlite).unwrap_err();
        assert!(
            matches!(err, Error::UnsupportedOperator { backend: Backend::Generic, .. }),
            "{err}"
        );
    }
}
