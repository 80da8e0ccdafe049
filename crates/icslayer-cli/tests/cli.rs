use std::path::{Path, PathBuf};

use assert_cmd::Command;
use etherparse::PacketBuilder;
use predicates::prelude::PredicateBooleanExt;
use predicates::str::contains;
use serde_json::Value;
use tempfile::TempDir;

fn cmd() -> Command {
    Command::new(assert_cmd::cargo::cargo_bin!("icslayer"))
}

fn tcp_frame(src_port: u16, dst_port: u16, payload: &[u8]) -> Vec<u8> {
    let builder = PacketBuilder::ethernet2([2, 0, 0, 0, 0, 1], [2, 0, 0, 0, 0, 2])
        .ipv4([192, 168, 1, 10], [192, 168, 1, 20], 64)
        .tcp(src_port, dst_port, 1, 8192);
    let mut frame = Vec::with_capacity(builder.size(payload.len()));
    builder.write(&mut frame, payload).expect("build frame");
    frame
}

/// Legacy little-endian pcap, one frame per second.
fn write_pcap(path: &Path, frames: &[Vec<u8>]) {
    let mut out = Vec::new();
    out.extend_from_slice(&0xa1b2_c3d4u32.to_le_bytes());
    out.extend_from_slice(&2u16.to_le_bytes());
    out.extend_from_slice(&4u16.to_le_bytes());
    out.extend_from_slice(&[0u8; 8]);
    out.extend_from_slice(&65535u32.to_le_bytes());
    out.extend_from_slice(&1u32.to_le_bytes());
    for (index, frame) in frames.iter().enumerate() {
        out.extend_from_slice(&(index as u32).to_le_bytes());
        out.extend_from_slice(&0u32.to_le_bytes());
        out.extend_from_slice(&(frame.len() as u32).to_le_bytes());
        out.extend_from_slice(&(frame.len() as u32).to_le_bytes());
        out.extend_from_slice(frame);
    }
    std::fs::write(path, out).expect("write capture");
}

/// One well-formed Modbus request and one truncated response.
fn modbus_capture(dir: &TempDir) -> PathBuf {
    let request = [
        0x57, 0xde, 0x00, 0x00, 0x00, 0x08, 0xff, 0x0f, 0x00, 0x05, 0x00, 0x01, 0x01, 0x00,
    ];
    let path = dir.path().join("modbus.pcap");
    write_pcap(
        &path,
        &[
            tcp_frame(40000, 502, &request),
            tcp_frame(502, 40000, &[0x57, 0xde, 0x00]),
        ],
    );
    path
}

fn clean_capture(dir: &TempDir) -> PathBuf {
    let request = [
        0x00, 0x01, 0x00, 0x00, 0x00, 0x08, 0x01, 0x03, 0x00, 0x00, 0x00, 0x02, 0x00, 0x00,
    ];
    let path = dir.path().join("clean.pcap");
    write_pcap(&path, &[tcp_frame(40000, 502, &request)]);
    path
}

fn stdout_json(assert: &assert_cmd::assert::Assert) -> Value {
    let stdout = String::from_utf8(assert.get_output().stdout.clone()).expect("utf8 stdout");
    serde_json::from_str(&stdout).expect("valid json")
}

#[test]
fn missing_input_shows_error_and_hint() {
    let temp = TempDir::new().expect("tempdir");
    cmd()
        .args(["pcap", "dissect"])
        .arg(temp.path().join("missing.pcapng"))
        .arg("-o")
        .arg(temp.path().join("report.json"))
        .assert()
        .code(2)
        .stderr(contains("error:").and(contains("hint:")));
}

#[test]
fn stdout_outputs_report() {
    let temp = TempDir::new().expect("tempdir");
    let assert = cmd()
        .args(["pcap", "dissect"])
        .arg(modbus_capture(&temp))
        .arg("--stdout")
        .assert()
        .success();
    let json = stdout_json(&assert);
    assert_eq!(json["tool"]["name"], "icslayer");
    assert_eq!(json["capture_summary"]["packets_total"], 2);
    assert_eq!(json["protocols"][0]["protocol"], "modbustcp");
    assert_eq!(
        json["packets"][0]["layers"][0]["summary"],
        "MODBUS TCP/ IP ADU Layer, transaction identifier: 22494, length: 8, unit identifier: 255, function code: 15, reference number: 5, bit count: 1, byte count: 1, data: 0"
    );
}

#[test]
fn summary_only_and_port_override() {
    let temp = TempDir::new().expect("tempdir");
    let input = modbus_capture(&temp);

    let assert = cmd()
        .args(["pcap", "dissect"])
        .arg(&input)
        .args(["--stdout", "--summary-only"])
        .assert()
        .success();
    let json = stdout_json(&assert);
    assert!(json.get("packets").is_none());
    assert_eq!(json["protocols"][0]["packets"], 1);

    let assert = cmd()
        .args(["pcap", "dissect"])
        .arg(&input)
        .args(["--stdout", "--modbus-port", "5020"])
        .assert()
        .success();
    let json = stdout_json(&assert);
    assert_eq!(json["protocols"].as_array().map(Vec::len), Some(0));
}

#[test]
fn stdout_and_report_conflict() {
    let temp = TempDir::new().expect("tempdir");
    cmd()
        .args(["pcap", "dissect"])
        .arg(modbus_capture(&temp))
        .arg("--stdout")
        .arg("-o")
        .arg(temp.path().join("report.json"))
        .assert()
        .failure();
}

#[test]
fn pretty_and_compact_conflict() {
    let temp = TempDir::new().expect("tempdir");
    cmd()
        .args(["pcap", "dissect"])
        .arg(modbus_capture(&temp))
        .args(["--stdout", "--pretty", "--compact"])
        .assert()
        .failure();
}

#[test]
fn report_file_written_and_quiet_suppresses_ok() {
    let temp = TempDir::new().expect("tempdir");
    let input = clean_capture(&temp);
    let report = temp.path().join("out").join("report.json");

    cmd()
        .args(["pcap", "dissect"])
        .arg(&input)
        .arg("-o")
        .arg(&report)
        .assert()
        .success()
        .stderr(contains("OK: report written"));
    let written: Value =
        serde_json::from_str(&std::fs::read_to_string(&report).expect("read report"))
            .expect("valid json");
    assert_eq!(written["report_version"], 1);

    cmd()
        .args(["pcap", "dissect"])
        .arg(&input)
        .arg("-o")
        .arg(&report)
        .arg("--quiet")
        .assert()
        .success()
        .stderr(contains("OK:").not());
}

#[test]
fn report_path_must_differ_from_input() {
    let temp = TempDir::new().expect("tempdir");
    let input = clean_capture(&temp);
    cmd()
        .args(["pcap", "dissect"])
        .arg(&input)
        .arg("-o")
        .arg(&input)
        .assert()
        .code(2)
        .stderr(contains("must differ from input"));
}

#[test]
fn list_violations_outputs_ids() {
    let temp = TempDir::new().expect("tempdir");
    cmd()
        .args(["pcap", "dissect"])
        .arg(modbus_capture(&temp))
        .args(["--stdout", "--list-violations"])
        .assert()
        .success()
        .stderr(contains("ICS-MODBUS-TOO-SHORT"));
}

#[test]
fn strict_fails_only_when_violations_present() {
    let temp = TempDir::new().expect("tempdir");
    cmd()
        .args(["pcap", "dissect"])
        .arg(modbus_capture(&temp))
        .args(["--stdout", "--strict"])
        .assert()
        .code(2)
        .stderr(contains("compliance violations detected"));

    cmd()
        .args(["pcap", "dissect"])
        .arg(clean_capture(&temp))
        .args(["--stdout", "--strict"])
        .assert()
        .success();
}

#[test]
fn glob_must_match_exactly_one_file() {
    let temp = TempDir::new().expect("tempdir");
    modbus_capture(&temp);
    let pattern = temp.path().join("mod*.pcap");
    cmd()
        .args(["pcap", "dissect"])
        .arg(&pattern)
        .arg("--stdout")
        .assert()
        .success();

    clean_capture(&temp);
    cmd()
        .args(["pcap", "dissect"])
        .arg(temp.path().join("*.pcap"))
        .arg("--stdout")
        .assert()
        .code(2)
        .stderr(contains("multiple files match"));
}

#[test]
fn unsupported_extension_is_rejected() {
    let temp = TempDir::new().expect("tempdir");
    let input = temp.path().join("capture.txt");
    std::fs::write(&input, b"not a capture").expect("write");
    cmd()
        .args(["pcap", "dissect"])
        .arg(&input)
        .arg("--stdout")
        .assert()
        .code(2)
        .stderr(contains("unsupported input format"));
}

#[test]
fn decode_prints_one_line_per_layer() {
    cmd()
        .args(["decode", "pndcp", "fefe0500 01000001 0001 0004 02050000"])
        .assert()
        .success()
        .stdout(
            contains("PN-DCP Layer, frame id: 65278, service id: 5")
                .and(contains("DPC data length: 4\nPayload Layer, Data length: 4\n")),
        );

    cmd()
        .args(["decode", "hart-ip", "0x0100000000020008"])
        .assert()
        .success()
        .stdout(contains("message id: session initiate, status: 0, sequence number: 2"));
}

#[test]
fn decode_rejects_short_or_bad_input() {
    cmd()
        .args(["decode", "modbus", "0001"])
        .assert()
        .code(2)
        .stderr(contains("header too short").and(contains("at least 14 bytes")));
    cmd()
        .args(["decode", "modbus", "xyz"])
        .assert()
        .code(2)
        .stderr(contains("invalid hex input"));
    cmd().args(["decode", "s7comm", "00"]).assert().failure();
}

#[test]
fn layout_prints_field_tables() {
    cmd()
        .args(["layout", "modbus"])
        .assert()
        .success()
        .stdout(
            contains("Modbus/TCP (14 bytes, big-endian)")
                .and(contains("transaction_id"))
                .and(contains("PN-DCP").not()),
        );
    cmd()
        .arg("layout")
        .assert()
        .success()
        .stdout(contains("HART-IP").and(contains("Modbus/TCP")).and(contains("PN-DCP")));
    cmd().args(["layout", "payload"]).assert().code(2);
}
