//! End-to-end flows through the service layer.

use std::fs;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::{Duration, SystemTime, UNIX_EPOCH};

use hn_analysis::{CancellationToken, DispatchOptions, Dispatcher, HostCapabilities};
use hn_app::*;
use hn_results::testing::FakeRun;
use hn_results::{ResultsSource, RESULTS_OUT_KEY};
use hn_storage::{ManualClock, PrivateAppStorage};

const DAY: Duration = Duration::from_secs(24 * 60 * 60);

fn unique_temp_dir(prefix: &str) -> PathBuf {
    let mut dir = std::env::temp_dir();
    let nanos = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_nanos();
    dir.push(format!("{}_{}_{}", prefix, std::process::id(), nanos));
    dir
}

struct TempDir(PathBuf);

impl Drop for TempDir {
    fn drop(&mut self) {
        let _ = fs::remove_dir_all(&self.0);
    }
}

fn config_in(dir: &TempDir) -> AppConfig {
    AppConfig {
        storage_root: Some(dir.0.join("apps")),
        heartbeat_file: Some(dir.0.join("heartbeats.json")),
        ..AppConfig::default()
    }
}

const NETWORK: &str = r#"
name: review
nodes:
  - { id: 1, label: R1, kind: reservoir }
  - { id: 2, label: j2, kind: junction }
  - { id: 3, label: J3, kind: junction }
  - { id: 4, label: T4, kind: tank }
  - { id: 5, label: a5, kind: junction }
  - { id: 6, label: J6, kind: junction }
  - { id: 7, label: J7, kind: junction }
links:
  - { id: 10, label: P10, kind: pipe, start: 1, end: 3 }
  - { id: 11, label: V11, kind: valve, start: 6, end: 7 }
"#;

#[test]
fn orphan_review_from_network_file() {
    let dir = TempDir(unique_temp_dir("hn_app_review"));
    fs::create_dir_all(&dir.0).unwrap();
    let path = dir.0.join("net.yaml");
    fs::write(&path, NETWORK).unwrap();

    let network = load_network(&path).unwrap();
    let model = build_model(&network).unwrap();

    for options in [DispatchOptions::default(), DispatchOptions::inline()] {
        let orphans = review_orphans(&model, &Dispatcher::detect(), &options, None).unwrap();
        let labels: Vec<_> = orphans.iter().map(|o| o.label.as_str()).collect();
        assert_eq!(labels, ["T4", "V11", "a5", "j2"]);
    }
}

#[test]
fn cancelled_review_reports_cancellation() {
    let network: NetworkDef = serde_yaml::from_str(NETWORK).unwrap();
    let model = build_model(&network).unwrap();
    let token = CancellationToken::new();
    token.cancel();

    let err = review_orphans(
        &model,
        &Dispatcher::new(HostCapabilities::inline_only()),
        &DispatchOptions::default(),
        Some(&token),
    )
    .unwrap_err();
    assert!(err.is_cancelled());
}

#[test]
fn network_file_round_trips() {
    let dir = TempDir(unique_temp_dir("hn_app_network"));
    fs::create_dir_all(&dir.0).unwrap();
    let path = dir.0.join("net.yaml");

    let network: NetworkDef = serde_yaml::from_str(NETWORK).unwrap();
    save_network(&path, &network).unwrap();
    assert_eq!(load_network(&path).unwrap(), network);
}

#[test]
fn imported_results_can_be_stepped_through() {
    let dir = TempDir(unique_temp_dir("hn_app_session"));
    fs::create_dir_all(&dir.0).unwrap();
    let run = FakeRun::small();
    let artifacts = run.artifacts(true);
    let out_path = dir.0.join("run.out");
    fs::write(&out_path, &artifacts.results_out).unwrap();
    let tank_path = dir.0.join("tanks.bin");
    let tank_bytes: Vec<u8> = artifacts
        .tank_volumes
        .unwrap()
        .iter()
        .flat_map(|v| v.to_le_bytes())
        .collect();
    fs::write(&tank_path, tank_bytes).unwrap();

    let instance = AppInstance::start(&config_in(&dir)).unwrap();
    let metadata = import_results(instance.storage(), &out_path, Some(&tank_path), None).unwrap();
    assert!(instance.storage().size(RESULTS_OUT_KEY).is_some());

    let mut session = SimulationSession::open(instance.storage(), Some(&metadata)).unwrap();
    assert_eq!(session.timestep_count(), 4);
    assert_eq!(session.timestep_labels(), ["00:00", "01:00", "02:00", "03:00"]);
    assert!(session.previous().unwrap().is_none());

    let second = session.next().unwrap().unwrap();
    assert_eq!(second.index(), 1);
    assert_eq!(
        second.tank("T1").unwrap().volume,
        FakeRun::tank_volume(1, 0)
    );

    session.go_to(3).unwrap();
    assert!(!session.can_go_next());
    assert!(session.next().unwrap().is_none());
    assert!(session.go_to(9).is_err());
    assert_eq!(session.current_index(), 3);
    assert_eq!(session.previous().unwrap().unwrap().index(), 2);

    let reopened = SimulationSession::open(instance.storage(), None).unwrap();
    assert_eq!(reopened.timestep_count(), 4);
}

#[test]
fn startup_sweep_removes_stale_sessions() {
    let dir = TempDir(unique_temp_dir("hn_app_sweep"));
    let config = config_in(&dir);
    let clock = ManualClock::at(1_700_000_000_000);

    let old = AppInstance::start_with_clock(&config, Arc::new(clock.clone())).unwrap();
    old.storage().save("results.out", b"old").unwrap();
    let old_id = old.app_id().to_string();

    clock.advance(15 * DAY);
    let fresh = AppInstance::start_with_clock(&config, Arc::new(clock.clone())).unwrap();
    assert_ne!(fresh.app_id(), old_id);
    assert!(!fresh.root().dir().join(&old_id).exists());
    assert_eq!(fresh.heartbeats().last_access(&old_id).unwrap(), None);
}

#[test]
fn recent_sessions_survive_startup() {
    let dir = TempDir(unique_temp_dir("hn_app_keep"));
    let config = config_in(&dir);
    let clock = ManualClock::at(1_700_000_000_000);

    let first = AppInstance::start_with_clock(&config, Arc::new(clock.clone())).unwrap();
    first.storage().save("results.out", b"keep").unwrap();

    clock.advance(DAY);
    let second = AppInstance::start_with_clock(&config, Arc::new(clock.clone())).unwrap();
    let report = second.sweep().unwrap();
    assert_eq!(report.kept, vec![first.app_id().to_string()]);

    let attached = AppInstance::attach(&config, first.app_id()).unwrap();
    assert_eq!(attached.storage().read_slice("results.out", 0, 4), Some(b"keep".to_vec()));

    attached.clear().unwrap();
    assert_eq!(attached.storage().size("results.out"), None);
}

#[test]
fn corrupt_heartbeat_file_does_not_block_startup() {
    let dir = TempDir(unique_temp_dir("hn_app_corrupt"));
    let config = config_in(&dir);
    let clock = ManualClock::at(1_700_000_000_000);

    let earlier = AppInstance::start_with_clock(&config, Arc::new(clock.clone())).unwrap();
    earlier.storage().save("results.out", b"old").unwrap();
    let earlier_id = earlier.app_id().to_string();
    fs::write(dir.0.join("heartbeats.json"), "{ truncated").unwrap();

    let instance = AppInstance::start_with_clock(&config, Arc::new(clock.clone())).unwrap();
    assert!(dir.0.join("heartbeats.json.corrupt").exists());
    assert_eq!(
        instance.heartbeats().last_access(&earlier_id).unwrap(),
        Some(1_700_000_000_000)
    );
    instance.storage().save("results.out", b"data").unwrap();
    assert_eq!(
        instance.heartbeats().last_access(instance.app_id()).unwrap(),
        Some(1_700_000_000_000)
    );

    clock.advance(15 * DAY);
    let later = AppInstance::start_with_clock(&config, Arc::new(clock.clone())).unwrap();
    assert!(!later.root().dir().join(&earlier_id).exists());
    assert!(!later.root().dir().join(instance.app_id()).exists());
}
