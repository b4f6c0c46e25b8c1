//! End-to-end export tests against a temporary output directory.

use progen_core::{FileRole, Settings};
use progen_export::{exporter_for, ExportContext};
use progen_resolver::{ProjectDescription, SourceGroup, ToolId};
use progen_targets::Target;
use serde_yaml::{Mapping, Value};
use std::collections::BTreeMap;
use std::fs;
use tempfile::TempDir;

fn sample_target() -> Target {
    let mcu: Mapping =
        serde_yaml::from_str("{core: cortex-m4f, vendor: Freescale, fpu_convention: hard}")
            .unwrap();
    let mut tools = BTreeMap::new();
    tools.insert(
        "uvision".to_string(),
        serde_yaml::from_str::<Value>("{TargetOption: {Device: MK64FN1M0VLL12}}").unwrap(),
    );
    tools.insert(
        "iar".to_string(),
        serde_yaml::from_str::<Value>("{OGChipSelectEditMenu: {state: [MK64FN1M0xxx12]}}")
            .unwrap(),
    );
    tools.insert("gcc".to_string(), Value::Null);
    Target::from_record("frdm-k64f", mcu, tools).unwrap()
}

fn sample_project(output: &std::path::Path) -> ProjectDescription {
    let mut group = SourceGroup::default();
    group.add(FileRole::C, "src/main.c".to_string());
    let mut project = ProjectDescription {
        name: "blinky".to_string(),
        includes: vec!["inc".to_string()],
        macros: vec!["BOARD=1".to_string()],
        linker_file: Some("linker/app.ld".to_string()),
        target_name: "frdm-k64f".to_string(),
        debugger: "cmsis-dap".to_string(),
        build_dir: "build".to_string(),
        ..ProjectDescription::default()
    };
    project.output_dir.path = output.to_string_lossy().into_owned();
    project.output_dir.rel_path = "../../".to_string();
    project.output_dir.hops = 2;
    project.source_groups.insert("default".to_string(), group);
    project
}

#[test]
fn test_make_export_writes_makefile() {
    let dir = TempDir::new().unwrap();
    let output = dir.path().join("out");
    let target = sample_target();
    let settings = Settings::from_env();
    let project = sample_project(&output);
    let ctx = ExportContext {
        project: &project,
        target: &target,
        settings: &settings,
    };

    let generated = exporter_for(ToolId::MakeGccArm).export(&ctx).unwrap();
    assert_eq!(generated.path, output);
    assert_eq!(generated.files, vec![output.join("Makefile")]);
    let makefile = fs::read_to_string(output.join("Makefile")).unwrap();
    assert!(makefile.contains("blinky"));
    assert!(makefile.contains("-mcpu=cortex-m4"));
}

#[test]
fn test_export_is_idempotent() {
    let dir = TempDir::new().unwrap();
    let output = dir.path().join("out");
    let target = sample_target();
    let settings = Settings::from_env();
    let project = sample_project(&output);
    let ctx = ExportContext {
        project: &project,
        target: &target,
        settings: &settings,
    };

    exporter_for(ToolId::MakeGccArm).export(&ctx).unwrap();
    let first = fs::read(output.join("Makefile")).unwrap();
    exporter_for(ToolId::MakeGccArm).export(&ctx).unwrap();
    let second = fs::read(output.join("Makefile")).unwrap();
    assert_eq!(first, second);

    let entries: Vec<_> = fs::read_dir(&output).unwrap().collect();
    assert_eq!(entries.len(), 1, "no stale files accumulate");
}

#[test]
fn test_uvision_export_writes_project_file() {
    let dir = TempDir::new().unwrap();
    let output = dir.path().join("out");
    let target = sample_target();
    let settings = Settings::from_env();
    let mut project = sample_project(&output);
    project.linker_file = Some("linker/app.sct".to_string());
    let ctx = ExportContext {
        project: &project,
        target: &target,
        settings: &settings,
    };

    let generated = exporter_for(ToolId::Uvision5).export(&ctx).unwrap();
    assert_eq!(generated.files, vec![output.join("blinky.uvprojx")]);
    let rendered = fs::read_to_string(output.join("blinky.uvprojx")).unwrap();
    assert!(rendered.contains("MK64FN1M0VLL12"));
    assert!(rendered.contains("<SchemaVersion>2.1</SchemaVersion>"));
}

#[test]
fn test_iar_export_writes_project_and_workspace() {
    let dir = TempDir::new().unwrap();
    let output = dir.path().join("out");
    let target = sample_target();
    let settings = Settings::from_env();
    let mut project = sample_project(&output);
    project.linker_file = Some("linker/app.icf".to_string());
    let ctx = ExportContext {
        project: &project,
        target: &target,
        settings: &settings,
    };

    let generated = exporter_for(ToolId::IarArm).export(&ctx).unwrap();
    assert_eq!(
        generated.files,
        vec![output.join("blinky.ewp"), output.join("blinky.eww")]
    );
}

#[test]
fn test_eclipse_export_writes_cdt_files_and_makefile() {
    let dir = TempDir::new().unwrap();
    let output = dir.path().join("out");
    let target = sample_target();
    let settings = Settings::from_env();
    let project = sample_project(&output);
    let ctx = ExportContext {
        project: &project,
        target: &target,
        settings: &settings,
    };

    let generated = exporter_for(ToolId::EclipseMakeGccArm).export(&ctx).unwrap();
    assert_eq!(
        generated.files,
        vec![
            output.join(".project"),
            output.join(".cproject"),
            output.join("Makefile")
        ]
    );
}

#[test]
fn test_sublime_export_writes_project_and_makefile() {
    let dir = TempDir::new().unwrap();
    let output = dir.path().join("out");
    let target = sample_target();
    let settings = Settings::from_env();
    let project = sample_project(&output);
    let ctx = ExportContext {
        project: &project,
        target: &target,
        settings: &settings,
    };

    let generated = exporter_for(ToolId::SublimeMakeGccArm).export(&ctx).unwrap();
    assert_eq!(
        generated.files,
        vec![
            output.join("blinky.sublime-project"),
            output.join("Makefile")
        ]
    );
}
