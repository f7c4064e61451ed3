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

use chrono::NaiveDate;
use jsonfallback::ConnectionInfo;
use jsonfallback::Error;
use jsonfallback::IsoEncoder;
use jsonfallback::JsonField;
use jsonfallback::Level;
use jsonfallback::Settings;
use jsonfallback::SqlParam;
use jsonfallback::Stored;
use jsonfallback::Value;
use jsonfallback::Version;
use jsonfallback::E001;
use jsonfallback::E002;

#[test]
fn test_db_type() {
    let field = JsonField::new("data");
    assert_eq!(field.db_type(&ConnectionInfo::postgresql()), "jsonb");
    assert_eq!(field.db_type(&ConnectionInfo::mysql(&[5, 7])), "json");
    assert_eq!(field.db_type(&ConnectionInfo::mysql(&[5, 6, 40])), "longtext");
    assert_eq!(field.db_type(&ConnectionInfo::mariadb(&[10, 2, 7])), "json");
    assert_eq!(field.db_type(&ConnectionInfo::mariadb(&[10, 2, 6])), "longtext");
    assert_eq!(field.db_type(&ConnectionInfo::new("default", "mysql")), "json");
    assert_eq!(field.db_type(&ConnectionInfo::sqlite()), "text");
}

#[test]
fn test_storage() {
    let field = JsonField::new("data");
    let mysql = ConnectionInfo::mysql(&[8, 0]);
    let value = Value::from(vec![1, 2]);

    let param = field.to_storage(Some(&value), &mysql).unwrap();
    assert_eq!(param, SqlParam::Text("[1, 2]".to_string()));
    assert_eq!(field.to_storage(None, &mysql).unwrap(), SqlParam::Null);

    assert_eq!(field.from_storage("[1, 2]").unwrap(), Some(value.clone()));
    assert_eq!(field.from_storage(value.clone()).unwrap(), Some(value));
    assert_eq!(field.from_storage(None::<&str>).unwrap(), None);
    assert!(matches!(
        field.from_storage("[1, "),
        Err(Error::MalformedValue(_))
    ));
}

#[test]
fn test_default() {
    let field = JsonField::new("data").with_default(Value::Object(Default::default()));
    assert_eq!(field.get_default(), Some(Value::Object(Default::default())));
    let param = field
        .to_storage(None, &ConnectionInfo::sqlite())
        .unwrap();
    assert_eq!(param, SqlParam::Text("{}".to_string()));

    assert_eq!(JsonField::new("data").get_default(), None);
}

#[test]
fn test_validate() {
    let date = Value::from(NaiveDate::from_ymd_opt(2020, 2, 29).unwrap());
    let field = JsonField::new("data");
    assert!(matches!(field.validate(&date), Err(Error::Unserializable(_))));
    assert!(field.validate(&Value::from("plain")).is_ok());

    let field = field.with_encoder(Arc::new(IsoEncoder));
    assert!(field.validate(&date).is_ok());
    let param = field
        .to_storage(Some(&date), &ConnectionInfo::mysql(&[8, 0]))
        .unwrap();
    assert_eq!(param, SqlParam::Text(r#""2020-02-29""#.to_string()));
}

#[test]
fn test_check_nullable_field() {
    let field = JsonField::new("data").with_table("book").nullable(true);
    let diagnostics = field.check(&[
        ConnectionInfo::postgresql(),
        ConnectionInfo::mysql(&[8, 0]),
    ]);
    assert_eq!(diagnostics.len(), 1);
    assert_eq!(diagnostics[0].id, E001);
    assert_eq!(diagnostics[0].level, Level::Error);
    assert_eq!(diagnostics[0].obj.as_deref(), Some("book.data"));

    assert!(field.check(&[ConnectionInfo::postgresql()]).is_empty());
    assert!(JsonField::new("data")
        .check(&[ConnectionInfo::mysql(&[8, 0])])
        .is_empty());
}

#[test]
fn test_check_server_version() {
    let field = JsonField::new("data");
    let old = [
        ConnectionInfo::mysql(&[5, 6]),
        ConnectionInfo::mariadb(&[10, 1]),
    ];
    let diagnostics = field.check(&old);
    assert_eq!(diagnostics.len(), 1);
    assert_eq!(diagnostics[0].id, E002);
    assert!(diagnostics[0]
        .hint
        .as_deref()
        .is_some_and(|hint| hint.contains("MySQL 5.7+ or MariaDB 10.2.7+")));

    // one connection meeting the minimum is enough
    let mixed = [
        ConnectionInfo::mysql(&[5, 6]),
        ConnectionInfo::new("replica", "django.db.backends.mysql")
            .with_version(Version::new(&[10, 2, 7]))
            .with_mariadb(true),
    ];
    assert!(field.check(&mixed).is_empty());

    let field = field.nullable(true);
    let ids = field
        .check(&old)
        .into_iter()
        .map(|d| d.id)
        .collect::<Vec<_>>();
    assert_eq!(ids, vec![E001, E002]);
}

#[test]
fn test_check_from_settings() {
    let settings = Settings::from_json(
        r#"{
            "databases": {
                "default": {"engine": "django.db.backends.mysql", "version": "5.5.5-10.1.44-MariaDB"},
                "other": {"engine": "django.db.backends.sqlite3"}
            }
        }"#,
    )
    .unwrap();
    let connections = settings.connections().unwrap();
    assert!(connections[0].is_mariadb());
    assert_eq!(connections[0].version(), Some(&Version::new(&[10, 1, 44])));

    let diagnostics = JsonField::new("data").check(&connections);
    assert_eq!(diagnostics.len(), 1);
    assert_eq!(diagnostics[0].id, E002);
}

#[test]
fn test_stored_conversions() {
    assert_eq!(Stored::from("1"), Stored::Text("1".to_string()));
    assert_eq!(Stored::from(Some(Value::from(1))), Stored::Decoded(Value::from(1)));
}
