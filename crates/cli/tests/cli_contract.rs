use assert_cmd::cargo::cargo_bin_cmd;
use predicates::prelude::*;
use serde_json::Value;
use std::path::Path;

fn areascope() -> assert_cmd::Command {
    let mut cmd = cargo_bin_cmd!("areascope");
    cmd.env_remove("AREASCOPE_DATA_DIR").env_remove("AREASCOPE_LOG");
    cmd
}

fn json_stdout(assert: assert_cmd::assert::Assert) -> Value {
    let stdout = assert.get_output().stdout.clone();
    serde_json::from_slice(&stdout).expect("stdout should contain valid json")
}

fn save_square(data_dir: &Path, name: &str) {
    areascope()
        .arg("--data-dir")
        .arg(data_dir)
        .args(["polygon", "--planar", "--save", "--name", name])
        .args(["--point", "0,0", "--point", "100,0", "--point", "100,100", "--point", "0,100"])
        .assert()
        .success();
}

#[test]
fn planar_polygon_reports_area_and_perimeter() {
    let value = json_stdout(
        areascope()
            .args(["polygon", "--planar"])
            .args(["--point", "0,0", "--point", "10,0", "--point", "10,10", "--point", "0,10"])
            .assert()
            .success(),
    );

    assert_eq!(value["type"], "polygon");
    assert_eq!(value["mode"], "planar");
    assert_eq!(value["area"].as_f64(), Some(100.0));
    assert_eq!(value["perimeter"].as_f64(), Some(40.0));
    assert_eq!(value["name"], "Untitled Measurement");
    assert!(value["distance"].is_null());
    assert!(value["area_summary"].is_null());
    assert!(value["comparisons"].is_null());
}

#[test]
fn planar_line_reports_distance() {
    let value = json_stdout(
        areascope()
            .args(["line", "--planar", "--point", "0,0", "--point", "3,4"])
            .assert()
            .success(),
    );

    assert_eq!(value["type"], "line");
    assert_eq!(value["distance"].as_f64(), Some(5.0));
    assert!(value["area"].is_null());
}

#[test]
fn circle_area_uses_pi_r_squared() {
    let value = json_stdout(
        areascope()
            .args(["circle", "--center", "-73.97,40.78", "--radius", "50"])
            .assert()
            .success(),
    );

    let area = value["area"].as_f64().expect("area should be a number");
    let perimeter = value["perimeter"].as_f64().expect("perimeter should be a number");
    assert!((area - 7_853.981_633_974_483).abs() < 1e-6);
    assert!((perimeter - 314.159_265_358_979_3).abs() < 1e-6);
    assert_eq!(value["radius"].as_f64(), Some(50.0));
}

#[test]
fn geographic_polygon_accepts_negative_coordinates() {
    let value = json_stdout(
        areascope()
            .args(["polygon", "--location", "Central Park"])
            .args(["--point", "-73.981,40.768", "--point", "-73.958,40.800"])
            .args(["--point", "-73.949,40.797", "--point", "-73.973,40.764"])
            .assert()
            .success(),
    );

    let area = value["area"].as_f64().expect("area should be a number");
    assert!(area > 2_000_000.0 && area < 5_000_000.0, "unexpected area {area}");
    assert_eq!(value["location"], "Central Park");
    let hectares = value["area_summary"]["hectares"].as_f64().expect("hectares should be set");
    assert!((hectares - area / 10_000.0).abs() < 1e-6);
}

#[test]
fn projected_coordinates_are_measured_on_the_sphere() {
    let value = json_stdout(
        areascope()
            .args(["line", "--projected", "--point", "0,0", "--point", "0,1000"])
            .assert()
            .success(),
    );

    assert_eq!(value["mode"], "geographic");
    let distance = value["distance"].as_f64().expect("distance should be a number");
    assert!((distance - 1_000.0).abs() < 1.0, "unexpected distance {distance}");
}

#[test]
fn degenerate_polygon_is_rejected() {
    areascope()
        .args(["polygon", "--planar", "--point", "0,0", "--point", "1,1"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("invalid geometry"));
}

#[test]
fn zero_radius_is_rejected() {
    areascope()
        .args(["circle", "--center", "0,0", "--radius", "0"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("invalid geometry"));
}

#[test]
fn compare_reports_units_and_comparisons() {
    let value = json_stdout(areascope().args(["compare", "--area", "10000"]).assert().success());

    assert_eq!(value["area"]["hectares"].as_f64(), Some(1.0));
    assert_eq!(value["area"]["square_kilometers"].as_f64(), Some(0.01));
    assert_eq!(value["comparisons"]["city_blocks"].as_f64(), Some(0.5));
}

#[test]
fn compare_rejects_negative_area() {
    areascope()
        .args(["compare", "--area", "-1"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("invalid input"));
}

#[test]
fn saved_measurements_show_up_in_history() {
    let temp = tempfile::tempdir().expect("temp dir should be created");
    save_square(temp.path(), "North lot");
    save_square(temp.path(), "South lot");

    assert!(temp.path().join("history.json").exists());

    areascope()
        .arg("--data-dir")
        .arg(temp.path())
        .args(["history", "list"])
        .assert()
        .success()
        .stdout(predicate::str::starts_with(
            "1\tpolygon\t10000.00 sq units\tUnknown location\tSouth lot",
        ))
        .stdout(predicate::str::contains(
            "0\tpolygon\t10000.00 sq units\tUnknown location\tNorth lot",
        ));

    let shown = json_stdout(
        areascope()
            .arg("--data-dir")
            .arg(temp.path())
            .args(["history", "show", "0"])
            .assert()
            .success(),
    );
    assert_eq!(shown["name"], "North lot");
    assert_eq!(shown["area"].as_f64(), Some(10_000.0));
}

#[test]
fn history_delete_and_clear() {
    let temp = tempfile::tempdir().expect("temp dir should be created");
    save_square(temp.path(), "First");
    save_square(temp.path(), "Second");

    areascope()
        .arg("--data-dir")
        .arg(temp.path())
        .args(["history", "delete", "5"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("no measurement at index 5"));

    areascope()
        .arg("--data-dir")
        .arg(temp.path())
        .args(["history", "delete", "0"])
        .assert()
        .success()
        .stdout(predicate::str::contains("deleted 0 (First)"));

    let exported = json_stdout(
        areascope()
            .arg("--data-dir")
            .arg(temp.path())
            .args(["history", "export"])
            .assert()
            .success(),
    );
    let names: Vec<_> = exported
        .as_array()
        .expect("export should be an array")
        .iter()
        .map(|m| m["name"].as_str().unwrap_or_default().to_owned())
        .collect();
    assert_eq!(names, ["Second"]);

    areascope()
        .arg("--data-dir")
        .arg(temp.path())
        .args(["history", "clear"])
        .assert()
        .success()
        .stdout(predicate::str::contains("cleared 1 measurements"));

    areascope()
        .arg("--data-dir")
        .arg(temp.path())
        .args(["history", "list"])
        .assert()
        .success()
        .stdout(predicate::str::contains("No measurements yet"));
}

#[test]
fn history_exports_csv_file() {
    let temp = tempfile::tempdir().expect("temp dir should be created");
    save_square(temp.path(), "Lot");
    let output_path = temp.path().join("out/history.csv");

    areascope()
        .env("AREASCOPE_DATA_DIR", temp.path())
        .args(["history", "export", "--format", "csv", "--output"])
        .arg(&output_path)
        .assert()
        .success();

    let content = std::fs::read_to_string(&output_path).expect("csv should be written");
    let mut lines = content.lines();
    let header = lines.next().expect("csv should have a header");
    insta::assert_snapshot!(header, @"ID,Type,Mode,Name,Location,Area (m2),Perimeter (m),Distance (m),Radius (m),Hectares,Acres,Kilometers,Label X,Label Y,Vertices,Tags,Favorite,Created");

    let row = lines.next().expect("csv should have one row");
    assert!(row.contains(",polygon,planar,Lot,,10000,400,"), "unexpected row {row}");
    assert!(lines.next().is_none());
}

#[test]
fn version_prints_package_version() {
    areascope()
        .arg("version")
        .assert()
        .success()
        .stdout(predicate::str::contains(env!("CARGO_PKG_VERSION")));
}
