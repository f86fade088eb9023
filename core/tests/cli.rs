use skullstrip_core::io::minc;
use skullstrip_core::{SegmentedVolume, Volume, VolumeGeometry, VoxelType};
use std::path::Path;
use std::process::Command;
use tempfile::TempDir;

fn skullstrip() -> Command {
    Command::new(env!("CARGO_BIN_EXE_skullstrip"))
}

/// Writes a 40^3 MINC volume with a bright ball of radius 15 voxels
fn write_ball(path: &Path, z_spacing: f64) {
    let n = 40;
    let geometry = VolumeGeometry::new([n, n, n], [2.0, 2.0, z_spacing], [-40.0, -40.0, -40.0]);
    let mut data = vec![5.0; geometry.voxel_count()];
    for k in 0..n {
        for j in 0..n {
            for i in 0..n {
                let (x, y, z) = (i as f64 - 20.0, j as f64 - 20.0, k as f64 - 20.0);
                if x * x + y * y + z * z <= 225.0 {
                    data[geometry.index(i, j, k)] = 100.0;
                }
            }
        }
    }
    let volume = Volume::new(geometry, VoxelType::Short { signed: true }, data).unwrap();
    let all = vec![1; geometry.voxel_count()];
    minc::write_volume(&SegmentedVolume::from_mask(&volume, all).unwrap(), path).unwrap();
}

#[test]
fn test_missing_argument_prints_usage() {
    let output = skullstrip().output().unwrap();

    assert_eq!(output.status.code(), Some(1));
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("Usage"), "stderr: {}", stderr);
}

#[test]
fn test_help_exits_cleanly() {
    let output = skullstrip().arg("--help").output().unwrap();
    assert_eq!(output.status.code(), Some(0));
    assert!(String::from_utf8_lossy(&output.stdout).contains("Usage"));
}

#[test]
fn test_unsupported_format_exits_with_error() {
    let temp_dir = TempDir::new().unwrap();
    let input = temp_dir.path().join("brain.nii");
    std::fs::write(&input, b"nifti").unwrap();

    let output = skullstrip()
        .arg(&input)
        .current_dir(temp_dir.path())
        .output()
        .unwrap();

    assert_eq!(output.status.code(), Some(1));
    assert!(String::from_utf8_lossy(&output.stderr).contains("Unsupported format"));
}

#[test]
fn test_writes_outputs_to_working_directory() {
    let input_dir = TempDir::new().unwrap();
    let work_dir = TempDir::new().unwrap();
    let input = input_dir.path().join("subject01.mnc");
    write_ball(&input, 2.0);

    let output = skullstrip()
        .arg(&input)
        .current_dir(work_dir.path())
        .output()
        .unwrap();

    assert!(
        output.status.success(),
        "stderr: {}",
        String::from_utf8_lossy(&output.stderr)
    );
    let mesh = work_dir.path().join("subject01_mesh.vtk");
    let seg = work_dir.path().join("subject01_seg.mnc");
    assert!(mesh.is_file());
    assert!(seg.is_file());
    assert!(!input_dir.path().join("subject01_mesh.vtk").exists());

    let original = minc::read_volume(&input).unwrap();
    let segmented = minc::read_volume(&seg).unwrap();
    assert_eq!(segmented.geometry(), original.geometry());

    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("BT=0.50"));
}
