//! End-to-end: a TOML config, a directory of observations, and the composed store.

use chrono::{TimeZone, Utc};
use chronoscope_core::{ChronoscopeConfig, MemberFailurePolicy, ResourceStore};
use chronoscope_gateway::{build_store, FsStore};
use chronoscope_query::format::from_csv;
use chronoscope_query::TemporalStore;
use std::path::Path;
use std::sync::Arc;

const TEMPORAL: &str = "<> a <https://solid.ti.rw.fau.de/public/ns/tc#TemporalContainer> .";

fn observation(ts: &str, value: &str, property: &str) -> String {
    format!(
        r#"@prefix sosa: <http://www.w3.org/ns/sosa/> .
           <#obs> a sosa:Observation ;
               sosa:observedProperty <http://pod.example/props/{property}> ;
               sosa:resultTime "{ts}" ;
               sosa:hasResult [ <http://qudt.org/vocab/unit/numericValue> {value} ] ."#
    )
}

fn write_pod(root: &Path) {
    let room = root.join("room");
    std::fs::create_dir_all(&room).unwrap();
    std::fs::write(room.join(".meta"), TEMPORAL).unwrap();
    let readings = [
        ("a.ttl", "2024-03-01T06:00:00Z", "18.5", "temperature"),
        ("b.ttl", "2024-03-01T12:00:00Z", "22", "temperature"),
        ("c.ttl", "2024-03-01T18:00:00Z", "20.5", "temperature"),
        ("d.ttl", "2024-03-01T12:00:00Z", "55", "humidity"),
    ];
    for (name, ts, value, property) in readings {
        std::fs::write(room.join(name), observation(ts, value, property)).unwrap();
    }
}

fn config(root: &Path, extra: &str) -> ChronoscopeConfig {
    let toml = format!(
        "[server]\nroot = {:?}\nbase_url = \"http://pod.example\"\n{}",
        root.display().to_string(),
        extra
    );
    ChronoscopeConfig::from_toml(&toml).unwrap()
}

#[tokio::test]
async fn absolute_window_over_one_property() {
    let tmp = tempfile::tempdir().unwrap();
    write_pod(tmp.path());
    let store = build_store(&config(tmp.path(), "")).unwrap();

    let rep = store
        .get_representation(
            &"http://pod.example/room/?observedProperty=http%3A%2F%2Fpod.example%2Fprops%2Ftemperature&intervalAbsoluteEnd=2024-03-01T10:00:00Z&intervalAbsoluteStart=2024-03-01T20:00:00Z"
                .into(),
            &Default::default(),
            None,
        )
        .await
        .unwrap();
    let values: Vec<String> = from_csv(&rep.data.read_to_string().await.unwrap())
        .into_iter()
        .map(|r| r.value)
        .collect();
    assert_eq!(values, vec!["22", "20.5"]);
}

#[tokio::test]
async fn relative_window_against_fixed_clock() {
    let tmp = tempfile::tempdir().unwrap();
    write_pod(tmp.path());
    let config = config(tmp.path(), "");
    let files: Arc<dyn ResourceStore> = Arc::new(FsStore::new(tmp.path(), config.base_url()));
    let temporal = TemporalStore::new(files, config.temporal.clone());

    let now = Utc.with_ymd_and_hms(2024, 3, 2, 0, 0, 0).unwrap();
    let rep = temporal
        .evaluate(
            &"http://pod.example/room/?intervalEnd=PT8H&operator=diamond".into(),
            &Default::default(),
            None,
            now,
        )
        .await
        .unwrap();
    assert_eq!(rep.data.read_to_string().await.unwrap(), "true");

    let rep = temporal
        .evaluate(
            &"http://pod.example/room/?intervalEnd=PT8H&value=lt_20&operator=box".into(),
            &Default::default(),
            None,
            now,
        )
        .await
        .unwrap();
    assert_eq!(rep.data.read_to_string().await.unwrap(), "false");
}

#[tokio::test]
async fn skip_policy_from_config() {
    let tmp = tempfile::tempdir().unwrap();
    write_pod(tmp.path());
    std::fs::write(tmp.path().join("room").join("e.ttl"), "not turtle at all").unwrap();

    let strict = build_store(&config(tmp.path(), "")).unwrap();
    assert!(strict
        .get_representation(&"http://pod.example/room/?value=gt_0".into(), &Default::default(), None)
        .await
        .is_err());

    let config = config(tmp.path(), "[temporal]\nmember_failure = \"skip\"\n");
    assert_eq!(config.temporal.member_failure, MemberFailurePolicy::Skip);
    let lenient = build_store(&config).unwrap();
    let rep = lenient
        .get_representation(&"http://pod.example/room/?value=gt_0".into(), &Default::default(), None)
        .await
        .unwrap();
    assert_eq!(from_csv(&rep.data.read_to_string().await.unwrap()).len(), 4);
}

#[tokio::test]
async fn disabled_index_serves_container() {
    let tmp = tempfile::tempdir().unwrap();
    write_pod(tmp.path());
    std::fs::write(tmp.path().join("room").join("index.html"), "<p>room</p>").unwrap();

    let config = config(tmp.path(), "[index]\nenabled = false\n");
    let store = build_store(&config).unwrap();
    let rep = store
        .get_representation(&"http://pod.example/room/".into(), &Default::default(), None)
        .await
        .unwrap();
    assert_eq!(rep.metadata.content_type(), Some("text/turtle"));
}

#[tokio::test]
async fn query_target_keeps_explicit_default_port() {
    let tmp = tempfile::tempdir().unwrap();
    write_pod(tmp.path());
    let toml = format!(
        "[server]\nroot = {:?}\nbase_url = \"http://localhost:80/\"\n",
        tmp.path().display().to_string()
    );
    let store = build_store(&ChronoscopeConfig::from_toml(&toml).unwrap()).unwrap();

    let plain = store
        .get_representation(&"http://localhost:80/room/".into(), &Default::default(), None)
        .await
        .unwrap();
    plain.data.release();

    let rep = store
        .get_representation(
            &"http://localhost:80/room/?value=22".into(),
            &Default::default(),
            None,
        )
        .await
        .unwrap();
    let rows = from_csv(&rep.data.read_to_string().await.unwrap());
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0].value, "22");
}
