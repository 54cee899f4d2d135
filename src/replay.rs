//! JSONL pose-trace loading for the session replay driver.
//!
//! One JSON object per line:
//! `{"t_ms": 1234.5, "keypoints": [{"x":..,"y":..,"z":..,"score":..,"name":..}, ...]}`
//! The trace stands in for the browser-side pose-estimation callback, so the
//! pipeline can be exercised end-to-end without a camera.

use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::pose::{Keypoint, Pose, PoseModel};

/// One recorded inference result.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TraceFrame {
    pub t_ms: f64,
    pub keypoints: Vec<Keypoint>,
}

/// Load a JSONL trace. Blank lines are skipped; a malformed line aborts
/// with its line number in the error context.
pub fn load_trace<P: AsRef<Path>>(path: P) -> Result<Vec<TraceFrame>> {
    let content = fs::read_to_string(&path)
        .with_context(|| format!("failed to read trace {:?}", path.as_ref()))?;

    let mut frames = Vec::new();
    for (lineno, line) in content.lines().enumerate() {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        let frame: TraceFrame = serde_json::from_str(line)
            .with_context(|| format!("malformed trace line {}", lineno + 1))?;
        frames.push(frame);
    }
    Ok(frames)
}

/// Convert a trace frame into a typed pose.
///
/// None when the keypoint count does not match the model schema; the driver
/// skips such frames instead of failing the session.
pub fn to_pose(model: PoseModel, frame: &TraceFrame) -> Option<Pose> {
    Pose::new(model, frame.keypoints.clone())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn movenet_line(t_ms: f64) -> String {
        let keypoints: Vec<String> = (0..17)
            .map(|i| format!(r#"{{"x":{}.0,"y":0.0,"z":0.0,"score":0.9}}"#, i))
            .collect();
        format!(r#"{{"t_ms":{},"keypoints":[{}]}}"#, t_ms, keypoints.join(","))
    }

    #[test]
    fn test_load_trace_skips_blank_lines() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "{}", movenet_line(0.0)).unwrap();
        writeln!(file).unwrap();
        writeln!(file, "{}", movenet_line(33.3)).unwrap();

        let frames = load_trace(file.path()).unwrap();
        assert_eq!(frames.len(), 2);
        assert_eq!(frames[0].t_ms, 0.0);
        assert_eq!(frames[1].t_ms, 33.3);
        assert_eq!(frames[0].keypoints.len(), 17);
    }

    #[test]
    fn test_load_trace_reports_malformed_line() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "{}", movenet_line(0.0)).unwrap();
        writeln!(file, "not json").unwrap();

        let err = load_trace(file.path()).unwrap_err();
        assert!(format!("{:#}", err).contains("line 2"));
    }

    #[test]
    fn test_to_pose_checks_schema() {
        let frame = TraceFrame {
            t_ms: 0.0,
            keypoints: vec![Keypoint::default(); 17],
        };
        assert!(to_pose(PoseModel::MoveNet, &frame).is_some());
        assert!(to_pose(PoseModel::BlazePose, &frame).is_none());
    }

    #[test]
    fn test_keypoint_name_round_trip() {
        let json = r#"{"x":0.1,"y":0.2,"z":0.3,"score":0.8,"name":"left_knee"}"#;
        let kp: Keypoint = serde_json::from_str(json).unwrap();
        assert_eq!(kp.name.as_deref(), Some("left_knee"));

        let json = r#"{"x":0.1,"y":0.2,"z":0.3,"score":0.8}"#;
        let kp: Keypoint = serde_json::from_str(json).unwrap();
        assert!(kp.name.is_none());
    }
}
