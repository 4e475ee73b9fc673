use std::process::Command;

fn bastion(args: &[&str]) -> std::process::Output {
    Command::new(env!("CARGO_BIN_EXE_bastion"))
        .args(args)
        .env("RUST_LOG", "warn")
        .output()
        .expect("failed to run the bastion binary")
}

#[test]
fn json_summary_is_reproducible_for_a_seed() {
    let args = ["--seed", "42", "--duration", "20", "--json"];
    let first = bastion(&args);
    let second = bastion(&args);
    assert!(first.status.success(), "{}", String::from_utf8_lossy(&first.stderr));
    assert_eq!(first.stdout, second.stdout);

    let summary: serde_json::Value =
        serde_json::from_slice(&first.stdout).expect("summary is json");
    assert_eq!(summary["seed"], 42);
    assert_eq!(summary["rows"], 12);
    assert_eq!(summary["cols"], 12);
    assert_eq!(summary["map_digest"].as_str().map(str::len), Some(64));
    assert!(summary["waves_started"].as_u64() >= Some(1));
}

#[test]
fn exported_layouts_can_be_fed_back() {
    let scenario = std::env::temp_dir().join("bastion-layout-scenario.toml");
    let mut text = String::from("[map]\nrows = 6\ncols = 8\nseed = 3\n");
    for column in 0..8 {
        text.push_str(&format!(
            "\n[[towers]]\nkind = \"Arrow\"\ncolumn = {column}\nrow = 0\n"
        ));
    }
    std::fs::write(&scenario, text).expect("write scenario");
    let scenario = scenario.to_str().expect("utf-8 temp path");

    let exported = bastion(&["--scenario", scenario, "--duration", "0", "--json", "--export-layout"]);
    assert!(exported.status.success(), "{}", String::from_utf8_lossy(&exported.stderr));
    let stdout = String::from_utf8(exported.stdout).expect("utf-8 output");
    let (layout, json) = stdout.split_once('\n').expect("layout line then summary");
    assert!(layout.starts_with("bastion:v1:8x6:"));
    let original: serde_json::Value = serde_json::from_str(json).expect("summary is json");

    let rebuilt = bastion(&[
        "--rows", "6", "--cols", "8", "--seed", "3", "--duration", "0", "--json", "--layout", layout,
    ]);
    assert!(rebuilt.status.success(), "{}", String::from_utf8_lossy(&rebuilt.stderr));
    let summary: serde_json::Value =
        serde_json::from_slice(&rebuilt.stdout).expect("summary is json");
    assert_eq!(summary["towers"], original["towers"]);
    assert_eq!(summary["gold"], original["gold"]);
    assert_eq!(summary["rejections"], 0);
}

#[test]
fn mismatched_layouts_are_refused() {
    let output = bastion(&["--rows", "5", "--cols", "5", "--layout", "bastion:v1:6x3:eyJ0b3dlcnMiOltdfQ"]);
    assert!(!output.status.success());
    assert!(String::from_utf8_lossy(&output.stderr).contains("6x3"));
}
