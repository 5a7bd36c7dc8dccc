//! End-to-end tests for the `vpucost` binary.

use assert_cmd::Command;
use predicates::prelude::*;

fn vpucost() -> Command {
    Command::cargo_bin("vpucost").expect("vpucost binary")
}

/// A well-formed 3x3 convolution query.
fn conv_args() -> Vec<&'static str> {
    vec![
        "--device",
        "VPU_2_7",
        "--width",
        "56",
        "--height",
        "56",
        "--input-channels",
        "64",
        "--output-channels",
        "64",
        "--kernel",
        "3",
        "--padding",
        "1",
    ]
}

#[test]
fn dpu_cycles_prints_one_metric_line() {
    vpucost()
        .args(conv_args())
        .assert()
        .success()
        .stdout(predicate::str::contains("DPU execution cycles:"));
}

#[test]
fn dpu_utilization_target() {
    vpucost()
        .args(conv_args())
        .args(["--target", "utilization"])
        .assert()
        .success()
        .stdout(predicate::str::contains("DPU execution utilization:"));
}

#[test]
fn dma_power_target() {
    vpucost()
        .args(conv_args())
        .args(["--mode", "DMA", "--target", "power"])
        .assert()
        .success()
        .stdout(predicate::str::contains("DMA execution power:"));
}

#[test]
fn verbose_dumps_the_descriptor() {
    vpucost()
        .args(conv_args())
        .arg("--verbose")
        .assert()
        .success()
        .stdout(predicate::str::contains(
            "====================== Operation ======================",
        ))
        .stdout(predicate::str::contains("device = VPUDevice.VPU_2_7"))
        .stdout(predicate::str::contains(
            "execution_order = ExecutionMode.CUBOID_8x16",
        ));
}

#[test]
fn missing_model_warns_but_still_answers() {
    vpucost()
        .args(conv_args())
        .assert()
        .success()
        .stderr(predicate::str::contains("cost model not initialized"));
}

#[test]
fn inconsistent_dma_geometry_fails_with_axis_diagnostic() {
    vpucost()
        .args([
            "--device",
            "VPU_2_7",
            "--width",
            "1",
            "--height",
            "1",
            "--input-channels",
            "16",
            "--output-channels",
            "16",
            "--padding",
            "2",
            "--mode",
            "DMA",
        ])
        .assert()
        .failure()
        .stderr(predicate::str::contains("axis"))
        .stderr(predicate::str::contains("not positive"));
}

#[test]
fn unknown_device_is_a_usage_error() {
    vpucost()
        .args([
            "--device",
            "VPU_9_9",
            "--width",
            "56",
            "--height",
            "56",
            "--input-channels",
            "64",
            "--output-channels",
            "64",
        ])
        .assert()
        .failure()
        .code(2)
        .stderr(predicate::str::contains("expected one of"));
}

#[test]
fn out_of_range_sparsity_is_rejected() {
    vpucost()
        .args(conv_args())
        .args(["--act-sparsity", "1.5"])
        .assert()
        .failure()
        .code(2)
        .stderr(predicate::str::contains("within [0, 1]"));
}

#[test]
fn legacy_device_float16_selects_vector_fp16() {
    vpucost()
        .args([
            "--device",
            "VPU_2_0",
            "--width",
            "16",
            "--height",
            "16",
            "--input-channels",
            "16",
            "--output-channels",
            "16",
            "--input-dtype",
            "FLOAT16",
            "--verbose",
        ])
        .assert()
        .success()
        .stdout(predicate::str::contains(
            "execution_order = ExecutionMode.VECTOR_FP16",
        ));
}
