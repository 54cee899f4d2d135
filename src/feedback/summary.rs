use crate::exercise::ExerciseKind;
use crate::pose::{joint_angle, Landmark, Pose};
use crate::window::Frame;

/// 窓の先頭/末尾フレームから抽出した関節角度サマリ
///
/// 左右の主要角度は種別により膝角度または股関節屈曲角。
/// 座標系は姿勢モデル準拠 (yは下向きが正)。
#[derive(Debug, Clone, PartialEq)]
pub struct MotionSummary {
    pub kind: ExerciseKind,
    /// 先頭フレームから末尾フレームまでの経過秒数
    pub span_secs: f32,
    pub left_start_deg: f32,
    pub left_end_deg: f32,
    pub right_start_deg: f32,
    pub right_end_deg: f32,
    /// 腰中点の沈み込み量 (squat/lunge のみ。正 = 下がった)
    pub hip_drop: Option<f32>,
}

impl MotionSummary {
    /// 終了時点の左右角度差 (度)
    pub fn asymmetry_deg(&self) -> f32 {
        (self.left_end_deg - self.right_end_deg).abs()
    }
}

/// 先頭・末尾フレームからサマリを抽出する
///
/// 必要な関節が欠損または低信頼度なら None。その場合サイクルは
/// スキップされ、次のフレームで再評価される (エラーではない)。
pub fn extract(
    kind: ExerciseKind,
    first: &Frame,
    last: &Frame,
    score_threshold: f32,
) -> Option<MotionSummary> {
    let span_secs = ((last.timestamp_ms - first.timestamp_ms) / 1000.0) as f32;

    let (left_start_deg, right_start_deg, left_end_deg, right_end_deg) = match kind {
        ExerciseKind::LegRaise => (
            hip_flexion_deg(&first.pose, Side::Left, score_threshold)?,
            hip_flexion_deg(&first.pose, Side::Right, score_threshold)?,
            hip_flexion_deg(&last.pose, Side::Left, score_threshold)?,
            hip_flexion_deg(&last.pose, Side::Right, score_threshold)?,
        ),
        _ => (
            knee_deg(&first.pose, Side::Left, score_threshold)?,
            knee_deg(&first.pose, Side::Right, score_threshold)?,
            knee_deg(&last.pose, Side::Left, score_threshold)?,
            knee_deg(&last.pose, Side::Right, score_threshold)?,
        ),
    };

    let hip_drop = match kind {
        ExerciseKind::Squat | ExerciseKind::Lunge => {
            Some(hip_mid_y(&last.pose, score_threshold)? - hip_mid_y(&first.pose, score_threshold)?)
        }
        _ => None,
    };

    Some(MotionSummary {
        kind,
        span_secs,
        left_start_deg,
        left_end_deg,
        right_start_deg,
        right_end_deg,
        hip_drop,
    })
}

#[derive(Clone, Copy)]
enum Side {
    Left,
    Right,
}

/// 膝角度: ヒップ-ひざ-足首のなす角
fn knee_deg(pose: &Pose, side: Side, threshold: f32) -> Option<f32> {
    let (hip, knee, ankle) = match side {
        Side::Left => (Landmark::LeftHip, Landmark::LeftKnee, Landmark::LeftAnkle),
        Side::Right => (Landmark::RightHip, Landmark::RightKnee, Landmark::RightAnkle),
    };
    landmark_angle(pose, hip, knee, ankle, threshold)
}

/// 股関節屈曲角: 肩-ヒップ-ひざのなす角 (脚の挙上量の指標)
fn hip_flexion_deg(pose: &Pose, side: Side, threshold: f32) -> Option<f32> {
    let (shoulder, hip, knee) = match side {
        Side::Left => (Landmark::LeftShoulder, Landmark::LeftHip, Landmark::LeftKnee),
        Side::Right => (Landmark::RightShoulder, Landmark::RightHip, Landmark::RightKnee),
    };
    landmark_angle(pose, shoulder, hip, knee, threshold)
}

fn landmark_angle(
    pose: &Pose,
    a: Landmark,
    b: Landmark,
    c: Landmark,
    threshold: f32,
) -> Option<f32> {
    let a = pose.visible_point(a, threshold)?;
    let b = pose.visible_point(b, threshold)?;
    let c = pose.visible_point(c, threshold)?;
    joint_angle(a, b, c)
}

/// 左右ヒップ中点のy座標
fn hip_mid_y(pose: &Pose, threshold: f32) -> Option<f32> {
    let left = pose.visible_point(Landmark::LeftHip, threshold)?;
    let right = pose.visible_point(Landmark::RightHip, threshold)?;
    Some((left.y + right.y) / 2.0)
}
