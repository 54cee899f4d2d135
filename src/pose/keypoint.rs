use nalgebra::Point3;
use serde::{Deserialize, Serialize};

/// 可視判定のデフォルト信頼度閾値
/// 閾値以下のキーポイントは角度計算に使ってはならない
pub const DEFAULT_SCORE_THRESHOLD: f32 = 0.5;

/// 姿勢推定モデルの種別
///
/// キーポイントのインデックスの意味はモデルスキーマごとに異なる。
/// モデル間でインデックスを混在させてはならない。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PoseModel {
    /// MoveNet (COCO 17キーポイント)
    MoveNet,
    /// BlazePose (33ランドマーク, 3D座標あり)
    BlazePose,
}

impl PoseModel {
    /// スキーマのキーポイント数
    pub fn keypoint_count(&self) -> usize {
        match self {
            Self::MoveNet => 17,
            Self::BlazePose => 33,
        }
    }

    /// 設定の名前から解決
    pub fn parse(name: &str) -> Option<Self> {
        match name {
            "movenet" => Some(Self::MoveNet),
            "blazepose" => Some(Self::BlazePose),
            _ => None,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Self::MoveNet => "movenet",
            Self::BlazePose => "blazepose",
        }
    }

    /// 意味ランドマーク → スキーマ内インデックス
    ///
    /// BlazePose は 23/24 が左/右ヒップ、25/26 が左/右ひざ、
    /// 27/28 が左/右足首 (MediaPipe 標準スキーマ)。
    pub fn index_of(&self, landmark: Landmark) -> usize {
        use Landmark::*;
        match self {
            Self::MoveNet => match landmark {
                Nose => 0,
                LeftEye => 1,
                RightEye => 2,
                LeftEar => 3,
                RightEar => 4,
                LeftShoulder => 5,
                RightShoulder => 6,
                LeftElbow => 7,
                RightElbow => 8,
                LeftWrist => 9,
                RightWrist => 10,
                LeftHip => 11,
                RightHip => 12,
                LeftKnee => 13,
                RightKnee => 14,
                LeftAnkle => 15,
                RightAnkle => 16,
            },
            Self::BlazePose => match landmark {
                Nose => 0,
                LeftEye => 2,
                RightEye => 5,
                LeftEar => 7,
                RightEar => 8,
                LeftShoulder => 11,
                RightShoulder => 12,
                LeftElbow => 13,
                RightElbow => 14,
                LeftWrist => 15,
                RightWrist => 16,
                LeftHip => 23,
                RightHip => 24,
                LeftKnee => 25,
                RightKnee => 26,
                LeftAnkle => 27,
                RightAnkle => 28,
            },
        }
    }
}

/// 両モデルに共通する意味ランドマーク
///
/// 運動ロジックは生のインデックスではなくこの列挙型を使う
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Landmark {
    Nose,
    LeftEye,
    RightEye,
    LeftEar,
    RightEar,
    LeftShoulder,
    RightShoulder,
    LeftElbow,
    RightElbow,
    LeftWrist,
    RightWrist,
    LeftHip,
    RightHip,
    LeftKnee,
    RightKnee,
    LeftAnkle,
    RightAnkle,
}

/// 単一キーポイント (3D座標 + 信頼度)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Keypoint {
    pub x: f32,
    pub y: f32,
    pub z: f32,
    /// 信頼度スコア (0.0〜1.0)
    pub score: f32,
    /// ランドマーク名 (モデルが付与する場合のみ)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
}

impl Keypoint {
    pub fn new(x: f32, y: f32, z: f32, score: f32) -> Self {
        Self {
            x,
            y,
            z,
            score,
            name: None,
        }
    }

    /// 信頼度が閾値を超えているか
    pub fn is_visible(&self, threshold: f32) -> bool {
        self.score > threshold
    }

    pub fn point(&self) -> Point3<f32> {
        Point3::new(self.x, self.y, self.z)
    }
}

impl Default for Keypoint {
    fn default() -> Self {
        Self {
            x: 0.0,
            y: 0.0,
            z: 0.0,
            score: 0.0,
            name: None,
        }
    }
}

/// 1フレーム分の姿勢
///
/// キーポイント数はモデルスキーマと常に一致する (構築時に検証)
#[derive(Debug, Clone, PartialEq)]
pub struct Pose {
    model: PoseModel,
    keypoints: Vec<Keypoint>,
}

impl Pose {
    /// キーポイント数がスキーマと一致しない場合は None
    pub fn new(model: PoseModel, keypoints: Vec<Keypoint>) -> Option<Self> {
        if keypoints.len() != model.keypoint_count() {
            return None;
        }
        Some(Self { model, keypoints })
    }

    pub fn model(&self) -> PoseModel {
        self.model
    }

    pub fn get(&self, landmark: Landmark) -> &Keypoint {
        &self.keypoints[self.model.index_of(landmark)]
    }

    /// 可視ランドマークの3D座標。閾値以下または欠損なら None
    pub fn visible_point(&self, landmark: Landmark, threshold: f32) -> Option<Point3<f32>> {
        let kp = self.get(landmark);
        if kp.is_visible(threshold) {
            Some(kp.point())
        } else {
            None
        }
    }
}
