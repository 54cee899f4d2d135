use anyhow::Result;
use serde::Deserialize;
use std::fs;
use std::path::Path;

use crate::exercise::ExerciseKind;

#[derive(Debug, Deserialize, Clone, Default)]
pub struct Config {
    #[serde(default)]
    pub pose: PoseConfig,
    #[serde(default)]
    pub window: WindowConfig,
    #[serde(default)]
    pub feedback: FeedbackConfig,
    #[serde(default)]
    pub llm: LlmConfig,
}

#[derive(Debug, Deserialize, Clone)]
pub struct PoseConfig {
    /// 姿勢推定モデル ("movenet" | "blazepose")
    #[serde(default = "default_model")]
    pub model: String,
    /// キーポイント可視判定の信頼度閾値
    #[serde(default = "default_score_threshold")]
    pub score_threshold: f32,
}

fn default_model() -> String { "blazepose".to_string() }
fn default_score_threshold() -> f32 { 0.5 }

impl Default for PoseConfig {
    fn default() -> Self {
        Self {
            model: default_model(),
            score_threshold: default_score_threshold(),
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
pub struct WindowConfig {
    /// フレーム窓の幅 (ms)
    #[serde(default = "default_window_ms")]
    pub window_ms: f64,
    /// フィードバック判定に必要な最小フレーム数
    #[serde(default = "default_min_frames")]
    pub min_frames: usize,
}

fn default_window_ms() -> f64 { 10_000.0 }
fn default_min_frames() -> usize { 10 }

impl Default for WindowConfig {
    fn default() -> Self {
        Self {
            window_ms: default_window_ms(),
            min_frames: default_min_frames(),
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
pub struct FeedbackConfig {
    /// 運動種別ごとのフィードバック間隔 (秒)
    #[serde(default = "default_squat_interval")]
    pub squat_interval_secs: u32,
    #[serde(default = "default_lunge_interval")]
    pub lunge_interval_secs: u32,
    #[serde(default = "default_leg_raise_interval")]
    pub leg_raise_interval_secs: u32,
    #[serde(default = "default_leg_extension_interval")]
    pub leg_extension_interval_secs: u32,
    #[serde(default = "default_hamstring_curl_interval")]
    pub hamstring_curl_interval_secs: u32,
    /// 未知種別のフォールバック間隔 (秒)
    #[serde(default = "default_generic_interval")]
    pub generic_interval_secs: u32,
    /// 左右差をプロンプトで指摘する閾値 (度)
    #[serde(default = "default_asymmetry_threshold")]
    pub asymmetry_threshold_deg: f32,
}

fn default_squat_interval() -> u32 { 15 }
fn default_lunge_interval() -> u32 { 15 }
fn default_leg_raise_interval() -> u32 { 10 }
fn default_leg_extension_interval() -> u32 { 12 }
fn default_hamstring_curl_interval() -> u32 { 12 }
fn default_generic_interval() -> u32 { 15 }
fn default_asymmetry_threshold() -> f32 { 15.0 }

impl Default for FeedbackConfig {
    fn default() -> Self {
        Self {
            squat_interval_secs: default_squat_interval(),
            lunge_interval_secs: default_lunge_interval(),
            leg_raise_interval_secs: default_leg_raise_interval(),
            leg_extension_interval_secs: default_leg_extension_interval(),
            hamstring_curl_interval_secs: default_hamstring_curl_interval(),
            generic_interval_secs: default_generic_interval(),
            asymmetry_threshold_deg: default_asymmetry_threshold(),
        }
    }
}

impl FeedbackConfig {
    /// 種別に対応するフィードバック間隔
    pub fn interval_secs(&self, kind: ExerciseKind) -> u32 {
        match kind {
            ExerciseKind::Squat => self.squat_interval_secs,
            ExerciseKind::Lunge => self.lunge_interval_secs,
            ExerciseKind::LegRaise => self.leg_raise_interval_secs,
            ExerciseKind::LegExtension => self.leg_extension_interval_secs,
            ExerciseKind::HamstringCurl => self.hamstring_curl_interval_secs,
            ExerciseKind::Generic => self.generic_interval_secs,
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
pub struct LlmConfig {
    /// generateContent エンドポイントURL
    #[serde(default = "default_endpoint")]
    pub endpoint: String,
    /// APIキー。空文字ならURLに付与しない
    #[serde(default)]
    pub api_key: String,
    /// 応答待ちタイムアウト (秒)
    #[serde(default = "default_llm_timeout")]
    pub timeout_secs: u64,
}

fn default_endpoint() -> String {
    "https://generativelanguage.googleapis.com/v1/models/gemini-pro:generateContent".to_string()
}
fn default_llm_timeout() -> u64 { 30 }

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            endpoint: default_endpoint(),
            api_key: String::new(),
            timeout_secs: default_llm_timeout(),
        }
    }
}

impl Config {
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = fs::read_to_string(path)?;
        let config: Config = toml::from_str(&content)?;
        Ok(config)
    }

    /// 設定ファイルが無い/壊れている場合はデフォルトを返す
    pub fn load_or_default<P: AsRef<Path>>(path: P) -> Self {
        match Self::load(&path) {
            Ok(config) => config,
            Err(e) => {
                tracing::debug!(
                    "config {:?} not loaded ({}), using defaults",
                    path.as_ref(),
                    e
                );
                Config::default()
            }
        }
    }
}
