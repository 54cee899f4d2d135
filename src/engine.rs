use crate::config::{Config, FeedbackConfig};
use crate::exercise::ExerciseKind;
use crate::feedback::cycle::FeedbackCycle;
use crate::feedback::{prompt, summary};
use crate::pose::{Pose, PoseModel};
use crate::window::{Frame, FrameWindow};

/// LLMへ送るフィードバック要求
///
/// エンジンはIOを行わない。要求はドライバが非同期に送信し、
/// 結果を世代タグ付きで on_feedback に返す。
#[derive(Debug, Clone)]
pub struct FeedbackRequest {
    pub generation: u64,
    pub prompt: String,
}

/// 運動セッション1回分のコーチングエンジン
///
/// フレーム列を消費してフレーム窓に蓄積し、クールダウンと
/// 最小フレーム数の条件がそろったときだけフィードバック要求を生成する。
/// 状態は単一の所有者 (ドライバ) からのみ触られる前提。
pub struct CoachEngine {
    model: PoseModel,
    kind: ExerciseKind,
    window: FrameWindow,
    cycle: FeedbackCycle,
    min_frames: usize,
    score_threshold: f32,
    feedback: FeedbackConfig,
}

impl CoachEngine {
    pub fn new(model: PoseModel, kind: ExerciseKind, config: &Config) -> Self {
        Self {
            model,
            kind,
            window: FrameWindow::new(config.window.window_ms),
            cycle: FeedbackCycle::new(),
            min_frames: config.window.min_frames,
            score_threshold: config.pose.score_threshold,
            feedback: config.feedback.clone(),
        }
    }

    /// 姿勢フレームを1枚処理する
    ///
    /// 発火条件 (クールダウン経過・最小フレーム数・非飛行中) は
    /// push+evict が完了した後の窓に対して評価する。
    /// 必要な関節が欠損している場合は要求を出さず、クールダウンも
    /// 消費しない (次のフレームで再評価)。
    pub fn on_frame(&mut self, timestamp_ms: f64, pose: &Pose) -> Option<FeedbackRequest> {
        if pose.model() != self.model {
            tracing::debug!(
                "frame with {} schema dropped (engine expects {})",
                pose.model().name(),
                self.model.name()
            );
            return None;
        }
        if !self.window.push(Frame::new(timestamp_ms, pose.clone())) {
            return None;
        }

        if self.window.len() < self.min_frames {
            return None;
        }
        let interval_secs = self.feedback.interval_secs(self.kind);
        if !self.cycle.ready(timestamp_ms, interval_secs) {
            return None;
        }

        let snapshot = self.window.snapshot();
        let first = snapshot.first()?;
        let last = snapshot.last()?;
        let summary = summary::extract(self.kind, first, last, self.score_threshold)?;
        let prompt = prompt::build_prompt(&summary, self.feedback.asymmetry_threshold_deg);

        let generation = self.cycle.fire(timestamp_ms, interval_secs);
        tracing::debug!(
            "feedback requested for {} (generation {})",
            self.kind.name(),
            generation
        );
        Some(FeedbackRequest { generation, prompt })
    }

    /// 飛行中だった要求の結果を受け取る
    ///
    /// 成功時は窓をリセットして公開テキストを返す。
    /// 失敗時はログに残して窓を保持する (再試行は次のクールダウン満了)。
    /// 世代が古い応答 (完了前に種別/モデルが切り替わった) は破棄する。
    pub fn on_feedback(
        &mut self,
        generation: u64,
        result: anyhow::Result<String>,
    ) -> Option<String> {
        if !self.cycle.finish(generation) {
            tracing::debug!("stale feedback response discarded (generation {})", generation);
            return None;
        }
        match result {
            Ok(text) => {
                self.window.reset();
                Some(text)
            }
            Err(e) => {
                tracing::warn!("feedback request failed: {:#}", e);
                None
            }
        }
    }

    /// 運動種別の切り替え
    ///
    /// 窓とサイクル状態を同時にリセットし、飛行中の応答を失効させる
    pub fn set_exercise(&mut self, kind: ExerciseKind) {
        self.kind = kind;
        self.window.reset();
        self.cycle.invalidate();
    }

    /// 姿勢モデルの切り替え。以後は旧スキーマのフレームを受け付けない
    pub fn set_model(&mut self, model: PoseModel) {
        self.model = model;
        self.window.reset();
        self.cycle.invalidate();
    }

    /// 1秒ごとのカウントダウン (独立したティックから呼ばれる)
    pub fn tick_second(&mut self) {
        self.cycle.tick_second();
    }

    /// UI向けのクールダウン残秒数
    pub fn cooldown_remaining_secs(&self) -> u32 {
        self.cycle.cooldown_remaining_secs()
    }

    pub fn exercise(&self) -> ExerciseKind {
        self.kind
    }

    pub fn model(&self) -> PoseModel {
        self.model
    }

    pub fn window(&self) -> &FrameWindow {
        &self.window
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pose::Keypoint;
    use anyhow::anyhow;

    /// 指定した膝角度の下半身を持つBlazePoseを組み立てる
    fn blaze_pose(left_knee_deg: f32, right_knee_deg: f32, hips_visible: bool) -> Pose {
        let mut kps = vec![Keypoint::default(); PoseModel::BlazePose.keypoint_count()];
        let hip_score = if hips_visible { 0.9 } else { 0.0 };

        for (side_x, knee_deg, shoulder, hip, knee, ankle) in [
            (-0.2f32, left_knee_deg, 11usize, 23usize, 25usize, 27usize),
            (0.2, right_knee_deg, 12, 24, 26, 28),
        ] {
            let theta = knee_deg.to_radians();
            kps[shoulder] = Keypoint::new(side_x, -0.5, 0.0, 0.9);
            kps[hip] = Keypoint::new(side_x, 0.0, 0.0, hip_score);
            kps[knee] = Keypoint::new(side_x, 0.4, 0.0, 0.9);
            kps[ankle] = Keypoint::new(
                side_x + 0.4 * theta.sin(),
                0.4 - 0.4 * theta.cos(),
                0.0,
                0.9,
            );
        }
        Pose::new(PoseModel::BlazePose, kps).unwrap()
    }

    fn movenet_pose() -> Pose {
        let kps = vec![Keypoint::default(); PoseModel::MoveNet.keypoint_count()];
        Pose::new(PoseModel::MoveNet, kps).unwrap()
    }

    fn squat_engine() -> CoachEngine {
        CoachEngine::new(PoseModel::BlazePose, ExerciseKind::Squat, &Config::default())
    }

    #[test]
    fn test_no_request_until_min_frames() {
        let mut engine = squat_engine();
        let pose = blaze_pose(170.0, 172.0, true);
        for i in 0..9 {
            assert!(engine.on_frame(i as f64 * 1000.0, &pose).is_none());
        }
        // 10フレーム目で条件がそろう
        assert!(engine.on_frame(9000.0, &pose).is_some());
    }

    #[test]
    fn test_fires_once_per_interval() {
        let mut engine = squat_engine();
        let pose = blaze_pose(170.0, 172.0, true);
        let mut fired_at = Vec::new();

        for i in 0..40 {
            let t = i as f64 * 1000.0;
            if let Some(request) = engine.on_frame(t, &pose) {
                fired_at.push(t);
                // 応答を即時に返して次のサイクルへ
                assert!(engine.on_feedback(request.generation, Ok("ok".to_string())).is_some());
            }
        }

        // 初回は10フレーム目 (9s)、以後はちょうど15秒間隔で発火
        assert_eq!(fired_at, vec![9000.0, 24_000.0, 39_000.0]);
    }

    #[test]
    fn test_no_second_request_while_in_flight() {
        let mut engine = squat_engine();
        let pose = blaze_pose(170.0, 172.0, true);

        let mut request = None;
        for i in 0..60 {
            let t = i as f64 * 1000.0;
            if let Some(r) = engine.on_frame(t, &pose) {
                assert!(request.is_none(), "second request issued at {}ms while in flight", t);
                request = Some(r);
            }
        }
        let request = request.unwrap();

        // 応答後は再び発火できる
        assert!(engine.on_feedback(request.generation, Ok("ok".to_string())).is_some());
        let mut fired_again = false;
        for i in 60..90 {
            if engine.on_frame(i as f64 * 1000.0, &pose).is_some() {
                fired_again = true;
                break;
            }
        }
        assert!(fired_again);
    }

    #[test]
    fn test_squat_prompt_embeds_window_edge_angles() {
        let mut engine = squat_engine();
        let mut request = None;

        // 9.8秒かけて膝角度 170→95 / 172→98 のスクワット
        for i in 0..10 {
            let t = i as f64 * (9800.0 / 9.0);
            let f = i as f32 / 9.0;
            let pose = blaze_pose(170.0 + (95.0 - 170.0) * f, 172.0 + (98.0 - 172.0) * f, true);
            if let Some(r) = engine.on_frame(t, &pose) {
                request = Some(r);
            }
        }

        let request = request.expect("trigger should fire on the 10th frame");
        assert!(request.prompt.contains("95.0"));
        assert!(request.prompt.contains("98.0"));
        assert!(request.prompt.contains("squat"));

        // 応答が解決したら窓はリセットされる
        let text = engine.on_feedback(request.generation, Ok("keep it up".to_string()));
        assert_eq!(text.as_deref(), Some("keep it up"));
        assert!(engine.window().is_empty());
    }

    #[test]
    fn test_missing_hips_skip_cycle_and_keep_window() {
        let mut engine = squat_engine();
        let pose = blaze_pose(170.0, 172.0, false);

        for i in 0..10 {
            assert!(engine.on_frame(i as f64 * 1000.0, &pose).is_none());
        }
        // 要求は出ないが窓は次のサイクルのために保持される
        assert_eq!(engine.window().len(), 10);
        assert_eq!(engine.cooldown_remaining_secs(), 0);
    }

    #[test]
    fn test_sink_failure_keeps_window_and_cooldown() {
        let mut engine = squat_engine();
        let pose = blaze_pose(170.0, 172.0, true);

        let mut request = None;
        for i in 0..10 {
            if let Some(r) = engine.on_frame(i as f64 * 1000.0, &pose) {
                request = Some(r);
            }
        }
        let request = request.unwrap();

        // 失敗時: 公開テキストなし、窓は破棄されない
        assert!(engine
            .on_feedback(request.generation, Err(anyhow!("connection refused")))
            .is_none());
        assert_eq!(engine.window().len(), 10);

        // クールダウンは消費済みなので間隔満了までは再発火しない
        let mut fired_at = None;
        for i in 10..40 {
            let t = i as f64 * 1000.0;
            if engine.on_frame(t, &pose).is_some() {
                fired_at = Some(t);
                break;
            }
        }
        assert_eq!(fired_at, Some(24_000.0));
    }

    #[test]
    fn test_exercise_switch_resets_window_and_cooldown() {
        let mut engine = squat_engine();
        let pose = blaze_pose(170.0, 172.0, true);
        for i in 0..5 {
            engine.on_frame(i as f64 * 1000.0, &pose);
        }

        engine.set_exercise(ExerciseKind::Lunge);
        assert!(engine.window().snapshot().is_empty());
        assert_eq!(engine.cooldown_remaining_secs(), 0);
        assert_eq!(engine.exercise(), ExerciseKind::Lunge);
    }

    #[test]
    fn test_exercise_switch_invalidates_in_flight_response() {
        let mut engine = squat_engine();
        let pose = blaze_pose(170.0, 172.0, true);

        let mut request = None;
        for i in 0..10 {
            if let Some(r) = engine.on_frame(i as f64 * 1000.0, &pose) {
                request = Some(r);
            }
        }
        let request = request.unwrap();

        engine.set_exercise(ExerciseKind::LegRaise);
        // 切替前の応答は破棄される
        assert!(engine
            .on_feedback(request.generation, Ok("stale".to_string()))
            .is_none());
        assert!(engine.window().is_empty());
    }

    #[test]
    fn test_mismatched_model_frames_are_dropped() {
        let mut engine = squat_engine();
        assert!(engine.on_frame(0.0, &movenet_pose()).is_none());
        assert_eq!(engine.window().len(), 0);

        engine.set_model(PoseModel::MoveNet);
        assert!(engine.on_frame(1000.0, &movenet_pose()).is_none());
        assert_eq!(engine.window().len(), 1);
    }

    #[test]
    fn test_cooldown_observable_counts_down() {
        let mut engine = squat_engine();
        let pose = blaze_pose(170.0, 172.0, true);
        for i in 0..10 {
            engine.on_frame(i as f64 * 1000.0, &pose);
        }
        assert_eq!(engine.cooldown_remaining_secs(), 15);

        engine.tick_second();
        engine.tick_second();
        engine.tick_second();
        assert_eq!(engine.cooldown_remaining_secs(), 12);
    }
}
