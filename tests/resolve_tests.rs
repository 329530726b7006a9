//! End-to-end resolution against fragment directories on disk.
//!
//! Every test resolves as of Monday 2026-10-19, so the calendar layers are
//! `day/Monday.json`, `date/October-19.json`, `date/2026-October-19.json`,
//! `month/October.json` and `month/2026-October.json`.

use chrono::NaiveDate;
use serde_json::Value;
use std::fs;
use std::path::Path;
use stream_config::calendar::CalendarTokens;
use stream_config::cli::resolve::{ResolveArgs, run_resolve};
use stream_config::config::Config;
use stream_config::pipeline::{IncludePrecedence, Settings};
use stream_config::schema::{Profile, ProfileName};
use stream_config::source::DirSource;
use stream_config::{DiagnosticCode, Engine, ResolveRequest, Resolved};
use tempfile::TempDir;

/// Write a fragment under the temp root, creating its directory.
fn write(root: &Path, relative: &str, json: &str) {
    let path = root.join(relative);
    fs::create_dir_all(path.parent().unwrap()).unwrap();
    fs::write(path, json).unwrap();
}

fn monday() -> CalendarTokens {
    CalendarTokens::for_date(NaiveDate::from_ymd_opt(2026, 10, 19).unwrap())
}

fn resolve_with(root: &Path, profile: Profile, settings: Settings, request: ResolveRequest) -> Resolved {
    let engine = Engine::new(profile, settings);
    let source = DirSource::new(root, engine.profile().layout.clone());
    engine.resolve(&source, &request).expect("resolve failed")
}

fn resolve_stream(root: &Path, topic: &str) -> Resolved {
    resolve_with(
        root,
        Profile::stream().unwrap(),
        Settings::default(),
        ResolveRequest::new(topic, monday()),
    )
}

fn tags(resolved: &Resolved) -> Vec<String> {
    resolved.record.get_list("streamtags").unwrap().to_vec()
}

fn has_code(resolved: &Resolved, code: DiagnosticCode) -> bool {
    resolved.diagnostics.iter().any(|d| d.code == code)
}

#[test]
fn test_missing_topic_uses_fallback_tags() {
    let temp = TempDir::new().unwrap();
    write(temp.path(), "global.json", r#"{"titlesuffix": "Live"}"#);

    let resolved = resolve_stream(temp.path(), "Some Unknown Game");

    assert!(!resolved.topic_found);
    assert_eq!(tags(&resolved), vec!["English", "Variety"]);
    assert_eq!(resolved.record.get_bool("gamefound"), Some(false));
    assert_eq!(resolved.record.get_str("gamename"), Some("Some Unknown Game"));
    assert_eq!(resolved.record.get_str("titlesuffix"), Some("Live"));
    assert!(
        resolved
            .diagnostics
            .iter()
            .any(|d| d.code == DiagnosticCode::SourceAbsent && d.message.contains("Some Unknown Game"))
    );
}

#[test]
fn test_empty_root_resolves_to_defaults() {
    let temp = TempDir::new().unwrap();

    let resolved = resolve_stream(temp.path(), "Hades");
    let record = &resolved.record;

    assert_eq!(record.get_str("mode"), Some("standard"));
    assert_eq!(record.get_str("sign"), Some("default"));
    assert_eq!(record.get_int("maxqueue"), Some(25));
    assert_eq!(record.get_int("redeemcost"), Some(-1));
    assert_eq!(record.get_bool("chaos"), Some(true));
    assert_eq!(record.get_bool("mature"), Some(false));
    // Global, topic, and five calendar layers are all absent
    let absent = resolved
        .diagnostics
        .iter()
        .filter(|d| d.code == DiagnosticCode::SourceAbsent)
        .count();
    assert_eq!(absent, 7);
}

#[test]
fn test_invalid_mode_falls_back_to_standard() {
    let temp = TempDir::new().unwrap();
    write(temp.path(), "games/Hades.json", r#"{"mode": "Turbo", "streamtags": ["Roguelike"]}"#);

    let resolved = resolve_stream(temp.path(), "Hades");

    assert_eq!(resolved.record.get_str("mode"), Some("standard"));
    assert_eq!(tags(&resolved), vec!["Roguelike", "English"]);
    assert!(has_code(&resolved, DiagnosticCode::InvalidEnum));
}

#[test]
fn test_mode_is_case_insensitive_and_applies_rules() {
    let temp = TempDir::new().unwrap();
    write(temp.path(), "games/Hades.json", r#"{"streamtags": ["Roguelike"]}"#);
    write(temp.path(), "day/Monday.json", r#"{"mode": "  Chill "}"#);

    let resolved = resolve_stream(temp.path(), "Hades");

    assert_eq!(resolved.record.get_str("mode"), Some("chill"));
    assert_eq!(tags(&resolved), vec!["Roguelike", "Chill", "Cozy"]);
    assert_eq!(resolved.record.get_bool("chaos"), Some(false));
    assert_eq!(resolved.record.get_bool("tts"), Some(true));
    assert!(!has_code(&resolved, DiagnosticCode::InvalidEnum));
}

#[test]
fn test_mode_survives_layers_that_omit_it() {
    let temp = TempDir::new().unwrap();
    write(temp.path(), "global.json", r#"{"mode": "chill"}"#);
    write(temp.path(), "games/Hades.json", r#"{"streamtags": ["Roguelike"]}"#);
    write(temp.path(), "month/October.json", r#"{"maxqueue": 10}"#);

    let resolved = resolve_stream(temp.path(), "Hades");

    assert_eq!(resolved.record.get_str("mode"), Some("chill"));
    assert_eq!(tags(&resolved), vec!["Roguelike", "Chill", "Cozy"]);
    assert_eq!(resolved.record.get_bool("chaos"), Some(false));
    assert_eq!(resolved.record.get_int("maxqueue"), Some(10));
}

#[test]
fn test_caller_mode_replaces_layer_mode() {
    let temp = TempDir::new().unwrap();
    write(temp.path(), "global.json", r#"{"mode": "chill"}"#);
    write(temp.path(), "games/Celeste.json", "{}");

    let resolved = resolve_with(
        temp.path(),
        Profile::stream().unwrap(),
        Settings::default(),
        ResolveRequest::new("Celeste", monday()).with_mode("speedrun"),
    );

    assert_eq!(resolved.record.get_str("mode"), Some("speedrun"));
    assert_eq!(tags(&resolved), vec!["Speedrun"]);
    for toggle in ["chaos", "tts", "soundalerts"] {
        assert_eq!(resolved.record.get_bool(toggle), Some(false), "{toggle}");
    }
    assert_eq!(resolved.record.get_bool("clips"), Some(true));
}

#[test]
fn test_tags_are_capped_at_ten() {
    let temp = TempDir::new().unwrap();
    write(temp.path(), "global.json", r#"{"streamtags": ["A1", "A2", "A3", "A4", "A5"]}"#);
    write(temp.path(), "games/Hades.json", r#"{"streamtags": ["B1", "B2", "B3", "B4", "B5"]}"#);
    write(temp.path(), "month/October.json", r#"{"streamtags": ["C1", "C2", "C3", "C4", "C5"]}"#);

    let resolved = resolve_stream(temp.path(), "Hades");

    assert_eq!(
        tags(&resolved),
        vec!["A1", "A2", "A3", "A4", "A5", "B1", "B2", "B3", "B4", "B5"]
    );
    let capped: Vec<_> = resolved
        .diagnostics
        .iter()
        .filter(|d| d.code == DiagnosticCode::CountCapped)
        .collect();
    assert_eq!(capped.len(), 1);
    assert_eq!(capped[0].field.as_deref(), Some("streamtags"));
}

#[test]
fn test_tags_dedup_ignoring_whitespace() {
    let temp = TempDir::new().unwrap();
    write(temp.path(), "global.json", r#"{"streamtags": ["Foo Bar"]}"#);
    write(temp.path(), "games/Hades.json", r#"{"streamtags": ["FooBar", " Foo  Bar "]}"#);

    let resolved = resolve_stream(temp.path(), "Hades");

    assert_eq!(tags(&resolved), vec!["FooBar", "English"]);
}

#[test]
fn test_toggle_and_or_semantics_across_layers() {
    let temp = TempDir::new().unwrap();
    write(temp.path(), "global.json", r#"{"chaos": false, "mature": false}"#);
    write(temp.path(), "games/Hades.json", r#"{"chaos": true, "clips": true}"#);
    write(temp.path(), "date/2026-October-19.json", r#"{"mature": true}"#);

    let resolved = resolve_stream(temp.path(), "Hades");

    // Default-true toggles stay off once any layer turns them off
    assert_eq!(resolved.record.get_bool("chaos"), Some(false));
    assert_eq!(resolved.record.get_bool("clips"), Some(true));
    // Default-false toggles stay on once any layer turns them on
    assert_eq!(resolved.record.get_bool("mature"), Some(true));
    assert_eq!(resolved.record.get_bool("subonly"), Some(false));
}

#[test]
fn test_numeric_and_string_policies() {
    let temp = TempDir::new().unwrap();
    write(
        temp.path(),
        "global.json",
        r#"{"redeemcost": 100, "cooldownseconds": 30, "maxqueue": 20, "raidminimum": 5, "titlesuffix": "Live", "sign": "Welcome"}"#,
    );
    write(
        temp.path(),
        "games/Hades.json",
        r#"{"redeemcost": -1, "cooldownseconds": 10, "maxqueue": 40, "raidminimum": 0, "titlesuffix": "Hades run", "sign": "default"}"#,
    );
    write(temp.path(), "month/2026-October.json", r#"{"redeemcost": 50, "maxqueue": 12, "raidminimum": 3}"#);

    let resolved = resolve_stream(temp.path(), "Hades");
    let record = &resolved.record;

    assert_eq!(record.get_int("redeemcost"), Some(50));
    assert_eq!(record.get_int("cooldownseconds"), Some(30));
    assert_eq!(record.get_int("maxqueue"), Some(12));
    assert_eq!(record.get_int("raidminimum"), Some(3));
    assert_eq!(record.get_str("titlesuffix"), Some("Live | Hades run"));
    assert_eq!(record.get_str("sign"), Some("Welcome"));
}

#[test]
fn test_sentinel_keeps_earlier_value() {
    let temp = TempDir::new().unwrap();
    write(temp.path(), "global.json", r#"{"redeemcost": 100}"#);
    write(temp.path(), "day/Monday.json", r#"{"redeemcost": -1}"#);

    let resolved = resolve_stream(temp.path(), "Hades");

    assert_eq!(resolved.record.get_int("redeemcost"), Some(100));
}

#[test]
fn test_on_call_disables_interruptions() {
    let temp = TempDir::new().unwrap();
    write(temp.path(), "games/Hades.json", r#"{"chaos": true}"#);

    let resolved = resolve_with(
        temp.path(),
        Profile::stream().unwrap(),
        Settings::default(),
        ResolveRequest::new("Hades", monday()).on_call(true),
    );

    for toggle in ["chaos", "tts", "soundalerts"] {
        assert_eq!(resolved.record.get_bool(toggle), Some(false), "{toggle}");
    }
    assert_eq!(resolved.record.get_bool("clips"), Some(true));
}

#[test]
fn test_include_cycle_terminates() {
    let temp = TempDir::new().unwrap();
    write(temp.path(), "games/Hades.json", r#"{"include": "a", "titlesuffix": "game"}"#);
    write(temp.path(), "includes/a.json", r#"{"include": "b", "streamtags": ["FromA"]}"#);
    write(temp.path(), "includes/b.json", r#"{"include": "a", "streamtags": ["FromB"]}"#);

    let resolved = resolve_stream(temp.path(), "Hades");

    assert_eq!(tags(&resolved), vec!["FromB", "FromA", "English"]);
    assert_eq!(resolved.record.get_str("titlesuffix"), Some("game"));
    assert!(has_code(&resolved, DiagnosticCode::IncludeCycleAvoided));
    assert!(resolved.record.include().is_none());
}

#[test]
fn test_include_cannot_escape_include_dir() {
    let temp = TempDir::new().unwrap();
    write(temp.path(), "secret.json", r#"{"sign": "leaked"}"#);
    write(temp.path(), "games/Hades.json", r#"{"include": "../secret"}"#);

    let resolved = resolve_stream(temp.path(), "Hades");

    assert_eq!(resolved.record.get_str("sign"), Some("default"));
    assert!(
        resolved
            .diagnostics
            .iter()
            .any(|d| d.code == DiagnosticCode::SourceAbsent && d.message.contains(".._secret.json"))
    );
}

#[test]
fn test_include_strongest_precedence() {
    let temp = TempDir::new().unwrap();
    write(temp.path(), "games/Hades.json", r#"{"include": "shared", "sign": "game"}"#);
    write(temp.path(), "includes/shared.json", r#"{"sign": "shared"}"#);

    let weakest = resolve_stream(temp.path(), "Hades");
    assert_eq!(weakest.record.get_str("sign"), Some("game"));

    let strongest = resolve_with(
        temp.path(),
        Profile::stream().unwrap(),
        Settings {
            include_precedence: IncludePrecedence::Strongest,
            ..Settings::default()
        },
        ResolveRequest::new("Hades", monday()),
    );
    assert_eq!(strongest.record.get_str("sign"), Some("shared"));
}

#[test]
fn test_malformed_fields_are_skipped() {
    let temp = TempDir::new().unwrap();
    write(temp.path(), "global.json", r#"{"maxqueue": "lots", "titlesuffix": "Live"}"#);
    write(temp.path(), "day/Monday.json", "not json at all");

    let resolved = resolve_stream(temp.path(), "Hades");

    assert_eq!(resolved.record.get_int("maxqueue"), Some(25));
    assert_eq!(resolved.record.get_str("titlesuffix"), Some("Live"));
    let malformed = resolved
        .diagnostics
        .iter()
        .filter(|d| d.code == DiagnosticCode::DecodeMalformed)
        .count();
    assert_eq!(malformed, 2);
}

#[test]
fn test_reserved_characters_in_topic() {
    let temp = TempDir::new().unwrap();
    write(temp.path(), "games/Hades_ II.json", r#"{"streamtags": ["Roguelike"]}"#);

    let resolved = resolve_stream(temp.path(), "  Hades: II ");

    assert!(resolved.topic_found);
    assert_eq!(resolved.record.get_str("gamename"), Some("Hades: II"));
    assert_eq!(tags(&resolved), vec!["Roguelike", "English"]);
}

#[test]
fn test_output_json_shape() {
    let temp = TempDir::new().unwrap();
    write(temp.path(), "games/Hades.json", r#"{"include": "shared"}"#);

    let resolved = resolve_stream(temp.path(), "Hades");
    let text = serde_json::to_string(&resolved.record).unwrap();
    let json: Value = serde_json::from_str(&text).unwrap();

    assert!(json.get("include").is_none());
    assert_eq!(json["gamefound"], Value::Bool(true));
    assert_eq!(json["gamename"], "Hades");
    // Keys are written in field-table order
    let streamtags = text.find("\"streamtags\"").unwrap();
    let chaos = text.find("\"chaos\"").unwrap();
    let gamename = text.find("\"gamename\"").unwrap();
    assert!(streamtags < chaos && chaos < gamename);
}

#[test]
fn test_model_profile_found() {
    let temp = TempDir::new().unwrap();
    write(temp.path(), "Panda.json", r#"{"bonk": false, "software": "VNyan"}"#);

    let resolved = resolve_with(
        temp.path(),
        Profile::model().unwrap(),
        Settings::default(),
        ResolveRequest::new("Panda.vrm", monday()),
    );
    let record = &resolved.record;

    assert!(resolved.topic_found);
    assert_eq!(record.get_bool("configfound"), Some(true));
    assert_eq!(record.get_str("modelfilename"), Some("Panda"));
    assert_eq!(record.get_str("software"), Some("VNyan"));
    assert_eq!(record.get_bool("bonk"), Some(false));
    assert_eq!(record.get_bool("boop"), Some(true));
    // Only the topic layer is read
    assert_eq!(resolved.diagnostics.len(), 0);
}

#[test]
fn test_model_profile_missing_disables_everything() {
    let temp = TempDir::new().unwrap();
    let profile = Profile::model().unwrap();
    let toggles: Vec<&str> = profile.toggles().collect();

    let resolved = resolve_with(
        temp.path(),
        profile,
        Settings::default(),
        ResolveRequest::new("Unknown.vrm", monday()),
    );

    assert_eq!(resolved.record.get_bool("configfound"), Some(false));
    assert_eq!(resolved.record.get_str("modelfilename"), Some("Unknown"));
    assert_eq!(toggles.len(), 22);
    for toggle in toggles {
        assert_eq!(resolved.record.get_bool(toggle), Some(false), "{toggle}");
    }
}

#[test]
fn test_run_resolve_writes_output_file() {
    let temp = TempDir::new().unwrap();
    write(temp.path(), "games/Hades.json", r#"{"titlesuffix": "Hades run"}"#);
    let out = temp.path().join("out").join("config.json");

    let mut config = Config::default();
    config.engine.root = temp.path().to_path_buf();
    config.engine.profile = ProfileName::Stream;

    let args = ResolveArgs {
        topic: "Hades".to_string(),
        day_override: None,
        date_override: None,
        on: NaiveDate::from_ymd_opt(2026, 10, 19),
        mode: None,
        on_call: false,
        out: Some(out.clone()),
        no_write_file: false,
        diagnostics: false,
    };
    let resolved = run_resolve(&config, &args).unwrap();

    let written: Value = serde_json::from_str(&fs::read_to_string(&out).unwrap()).unwrap();
    assert_eq!(written, serde_json::to_value(&resolved.record).unwrap());
    assert_eq!(written["titlesuffix"], "Hades run");
    assert_eq!(written["gamefound"], true);
}

#[test]
fn test_run_resolve_can_skip_output_file() {
    let temp = TempDir::new().unwrap();
    let out = temp.path().join("config.json");

    let mut config = Config::default();
    config.engine.root = temp.path().to_path_buf();
    config.output.path = out.clone();

    let args = ResolveArgs {
        topic: "Hades".to_string(),
        day_override: Some("Saturday".to_string()),
        date_override: None,
        on: None,
        mode: None,
        on_call: false,
        out: None,
        no_write_file: true,
        diagnostics: false,
    };
    run_resolve(&config, &args).unwrap();

    assert!(!out.exists());
}
