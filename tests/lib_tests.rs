use clap::Parser;
use mlvbatch::engine::{
    Cli, Invocation, JobRunner, collect_jobs, handle_run, has_accepted_extension,
    last_import_directory,
};
use mlvbatch::error::ConvertResult;
use mlvbatch::pipeline::{BatchOptions, NoopObserver, run_batch};
use mlvbatch::{
    ChromaSmoothing, ConfigSnapshot, ConversionJob, ConvertError, FailureKind, JobOutcome,
    JobState, OutputFormat, SettingsStore,
};
use std::ffi::OsString;
use std::path::{Path, PathBuf};
use std::sync::Arc;

// --- OutputFormat / ChromaSmoothing ---

#[test]
fn test_output_format_parse() {
    assert_eq!("dng".parse::<OutputFormat>().unwrap(), OutputFormat::Dng);
    assert_eq!(" RAW ".parse::<OutputFormat>().unwrap(), OutputFormat::Raw);
    assert!(matches!(
        "".parse::<OutputFormat>(),
        Err(ConvertError::ConfigurationInvalid(_))
    ));
    assert!(matches!(
        "tiff".parse::<OutputFormat>(),
        Err(ConvertError::ConfigurationInvalid(_))
    ));
}

#[test]
fn test_chroma_smoothing_parse_and_flag() {
    assert_eq!("".parse::<ChromaSmoothing>().unwrap(), ChromaSmoothing::None);
    assert_eq!("none".parse::<ChromaSmoothing>().unwrap(), ChromaSmoothing::None);
    assert_eq!(ChromaSmoothing::None.flag(), None);
    assert_eq!(
        "2x2".parse::<ChromaSmoothing>().unwrap().flag().as_deref(),
        Some("--cs2x2")
    );
    assert_eq!(ChromaSmoothing::FiveByFive.flag().as_deref(), Some("--cs5x5"));
    assert!("4x4".parse::<ChromaSmoothing>().is_err());
}

#[test]
fn test_snapshot_requires_absolute_dir() {
    assert!(ConfigSnapshot::new(OutputFormat::Dng, "relative/out", ChromaSmoothing::None).is_err());
    assert!(ConfigSnapshot::parse("raw", "  ", "").is_err());
    let snap = ConfigSnapshot::parse("raw", "/out", "3x3").unwrap();
    assert_eq!(snap.format(), OutputFormat::Raw);
    assert_eq!(snap.smoothing(), ChromaSmoothing::ThreeByThree);
}

// --- ConversionJob ---

#[test]
fn test_job_from_path_uses_file_name() {
    let job = ConversionJob::from_path(Path::new("/in/clip1.MLV")).unwrap();
    assert_eq!(job.name, "clip1.MLV");
    assert_eq!(job.source, PathBuf::from("/in/clip1.MLV"));
    assert!(ConversionJob::from_path(Path::new("/")).is_none());
}

// --- JobOutcome / JobState ---

#[test]
fn test_outcome_from_error_keeps_kind_and_message() {
    let outcome: JobOutcome = ConvertError::OutputCollision {
        path: PathBuf::from("/out/clip2"),
    }
    .into();
    match outcome {
        JobOutcome::Failure { kind, message } => {
            assert_eq!(kind, FailureKind::OutputCollision);
            assert!(message.contains("/out/clip2"));
        }
        JobOutcome::Success => panic!("expected failure"),
    }
}

#[test]
fn test_job_state_from_outcome() {
    assert_eq!(JobState::from(&JobOutcome::Success), JobState::Succeeded);
    let failed: JobOutcome = ConvertError::invalid("x").into();
    assert_eq!(JobState::from(&failed), JobState::Failed);
    assert!(JobState::Failed.is_terminal());
    assert!(!JobState::Running.is_terminal());
}

// --- input collection ---

#[test]
fn test_has_accepted_extension() {
    assert!(has_accepted_extension(Path::new("a/clip.MLV")));
    assert!(has_accepted_extension(Path::new("a/clip.mlv")));
    assert!(!has_accepted_extension(Path::new("a/clip.Mlv")));
    assert!(!has_accepted_extension(Path::new("a/clip.mov")));
    assert!(!has_accepted_extension(Path::new("a/clip")));
}

#[test]
fn test_collect_jobs_walks_directories_and_dedupes() {
    let root = tempfile::tempdir().unwrap();
    let card = root.path().join("card");
    std::fs::create_dir_all(card.join("DCIM")).unwrap();
    for name in ["b.MLV", "a.MLV", "notes.txt"] {
        std::fs::write(card.join(name), b"").unwrap();
    }
    std::fs::write(card.join("DCIM").join("c.mlv"), b"").unwrap();

    let jobs = collect_jobs(&[card.clone(), card.join("a.MLV")]).unwrap();
    let names: Vec<&str> = jobs.iter().map(|j| j.name.as_str()).collect();
    assert_eq!(names, vec!["c.mlv", "a.MLV", "b.MLV"]);
    assert!(jobs.iter().all(|j| j.source.is_absolute()));
}

#[test]
fn test_collect_jobs_missing_input_is_error() {
    let root = tempfile::tempdir().unwrap();
    assert!(collect_jobs(&[root.path().join("missing.MLV")]).is_err());
}

#[cfg(unix)]
#[test]
fn test_collect_jobs_skips_non_utf8_names() {
    use std::ffi::OsStr;
    use std::os::unix::ffi::OsStrExt;

    let root = tempfile::tempdir().unwrap();
    let garbled = root.path().join(OsStr::from_bytes(b"clip\xff.MLV"));
    std::fs::write(&garbled, b"").unwrap();
    std::fs::write(root.path().join("good.MLV"), b"").unwrap();

    assert!(ConversionJob::from_path(&garbled).is_none());
    let jobs = collect_jobs(&[root.path().to_path_buf()]).unwrap();
    let names: Vec<&str> = jobs.iter().map(|j| j.name.as_str()).collect();
    assert_eq!(names, vec!["good.MLV"]);
}

#[test]
fn test_last_import_directory() {
    let jobs = vec![
        ConversionJob::new("a.MLV", "/cards/A/a.MLV"),
        ConversionJob::new("b.MLV", "/cards/B/b.MLV"),
    ];
    assert_eq!(last_import_directory(&jobs), Some(PathBuf::from("/cards/B")));
    assert_eq!(last_import_directory(&[]), None);
}

// --- report ---

struct FailOnB;

impl JobRunner for FailOnB {
    fn run(&self, invocation: &Invocation) -> ConvertResult<()> {
        if invocation.args_lossy().iter().any(|a| a.ends_with("b.MLV")) {
            Err(ConvertError::ProcessExitedNonZero {
                status: "code 2".to_string(),
            })
        } else {
            Ok(())
        }
    }
}

#[test]
fn test_report_rows_sorted_with_failure_detail() {
    let jobs = vec![
        ConversionJob::new("b.MLV", "/in/b.MLV"),
        ConversionJob::new("a.MLV", "/in/a.MLV"),
    ];
    let snap = ConfigSnapshot::new(OutputFormat::Raw, "/out", ChromaSmoothing::None).unwrap();
    let result = run_batch(
        jobs,
        &snap,
        &BatchOptions::new("/opt/mlv_dump", 2),
        Arc::new(FailOnB),
        &mut NoopObserver,
    )
    .unwrap();

    let rows = result.report();
    assert_eq!(rows.len(), 2);
    assert_eq!(rows[0].name, "a.MLV");
    assert_eq!(rows[0].status, "success");
    assert!(rows[0].kind.is_none());
    assert_eq!(rows[1].status, "failure");
    assert_eq!(rows[1].kind, Some(FailureKind::ProcessExitedNonZero));

    let json = serde_json::to_value(&rows).unwrap();
    assert_eq!(json[1]["kind"], "process_exited_non_zero");
    assert!(json[0].get("message").is_none());
}

// --- convert command ---

#[cfg(unix)]
fn system_binary(name: &str) -> PathBuf {
    ["/usr/bin", "/bin"]
        .iter()
        .map(|d| Path::new(d).join(name))
        .find(|p| p.exists())
        .unwrap_or_else(|| panic!("{name} not found"))
}

/// Temp card with two clips plus a settings file pointing at `<root>/stored`.
#[cfg(unix)]
struct CliFixture {
    root: tempfile::TempDir,
}

#[cfg(unix)]
impl CliFixture {
    fn new() -> Self {
        let root = tempfile::tempdir().unwrap();
        let card = root.path().join("card");
        std::fs::create_dir_all(&card).unwrap();
        for name in ["a.MLV", "b.MLV"] {
            std::fs::write(card.join(name), b"").unwrap();
        }
        let mut store = SettingsStore::new(root.path().join("settings.toml"));
        store.set_theme("dark");
        store.set_output_directory(&root.path().join("stored"));
        store.set_output_type(OutputFormat::Dng);
        store.save().unwrap();
        Self { root }
    }

    fn path(&self, rel: &str) -> PathBuf {
        self.root.path().join(rel)
    }

    /// `mlvbatch convert <extra..> --converter <binary> <card>` with this fixture's settings.
    fn convert(&self, binary: &str, extra: &[OsString]) -> anyhow::Result<bool> {
        let mut argv: Vec<OsString> = vec![
            "mlvbatch".into(),
            "--settings".into(),
            self.path("settings.toml").into(),
            "--log-file".into(),
            self.path("mlvbatch.log").into(),
            "convert".into(),
        ];
        argv.extend(extra.iter().cloned());
        argv.extend([
            "--converter".into(),
            system_binary(binary).into(),
            self.path("card").into(),
        ]);
        handle_run(&Cli::parse_from(argv))
    }

    fn stored(&self) -> SettingsStore {
        SettingsStore::open(self.path("settings.toml")).unwrap()
    }
}

#[cfg(unix)]
#[test]
fn test_convert_flags_override_and_persist_settings() {
    let fx = CliFixture::new();
    let out = fx.path("out");
    let all_ok = fx
        .convert(
            "true",
            &["-o".into(), out.clone().into(), "-f".into(), "raw".into(), "-j".into(), "2".into()],
        )
        .unwrap();
    assert!(all_ok);

    let store = fx.stored();
    assert_eq!(store.output_directory(), out.to_string_lossy());
    assert_eq!(store.output_type(), "raw");
    assert_eq!(store.import_directory(), fx.path("card").to_string_lossy());
    assert_eq!(store.theme(), "dark");
}

#[cfg(unix)]
#[test]
fn test_convert_no_save_leaves_settings_file_untouched() {
    let fx = CliFixture::new();
    let before = std::fs::read(fx.path("settings.toml")).unwrap();
    let all_ok = fx
        .convert(
            "true",
            &[
                "--no-save".into(),
                "-o".into(),
                fx.path("out").into(),
                "-f".into(),
                "raw".into(),
            ],
        )
        .unwrap();
    assert!(all_ok);
    assert_eq!(std::fs::read(fx.path("settings.toml")).unwrap(), before);
}

#[cfg(unix)]
#[test]
fn test_convert_reports_failure_when_a_job_fails() {
    let fx = CliFixture::new();
    let all_ok = fx.convert("false", &["--report".into()]).unwrap();
    assert!(!all_ok);

    // Stored settings apply: DNG into <root>/stored, one fresh directory per clip.
    let stored = fx.path("stored");
    assert!(stored.join("a").is_dir());
    assert!(stored.join("b").is_dir());

    let report = std::fs::read_to_string(stored.join("mlvbatch.report.json")).unwrap();
    let rows: serde_json::Value = serde_json::from_str(&report).unwrap();
    let rows = rows.as_array().unwrap();
    assert_eq!(rows.len(), 2);
    assert!(
        rows.iter()
            .all(|r| r["status"] == "failure" && r["kind"] == "process_exited_non_zero")
    );
}
